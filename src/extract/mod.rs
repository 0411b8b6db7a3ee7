//! Extraction pipeline: paginate, normalize, export, deliver.
//!
//! Subjects are processed strictly in the order supplied. A failure to
//! deliver or mirror one subject's artifact does not abort the remaining
//! subjects, and the artifact is deleted after the delivery attempt
//! regardless of its outcome.

pub mod normalizer;
pub mod writer;

use std::path::Path;

use tracing::error;

use crate::adapters::Messenger;
use crate::api::ApiClient;
use crate::domain::{ContentRecord, ContentType, Subject};

pub use normalizer::normalize_page;
pub use writer::{artifact_name, remove_artifact, write_artifact};

/// Human label for a subject ID, falling back to `Subject_<id>` when the
/// ID was not in the cached subject list.
pub fn subject_label(subjects: &[Subject], subject_id: &str) -> String {
    subjects
        .iter()
        .find(|s| s.id == subject_id)
        .map(|s| s.name.clone())
        .unwrap_or_else(|| format!("Subject_{subject_id}"))
}

/// Walk every content page for one subject, normalizing as pages arrive.
/// Stops at the first empty page.
pub async fn collect_subject_records(
    api: &ApiClient,
    token: &str,
    batch_id: &str,
    subject_id: &str,
    content_type: ContentType,
) -> Vec<ContentRecord> {
    let mut records = Vec::new();
    let mut page = 1u32;

    loop {
        let items = api
            .content_page(batch_id, subject_id, page, token, content_type)
            .await;
        if items.is_empty() {
            break;
        }
        records.extend(normalize_page(&items, content_type));
        page += 1;
    }

    records
}

/// Run the full extraction for every subject ID in sequence: collect
/// records, write the artifact, deliver it to the requester, optionally
/// mirror it to the operator channel, then delete it.
#[allow(clippy::too_many_arguments)]
pub async fn run_extraction(
    api: &ApiClient,
    chat: &dyn Messenger,
    mirror: Option<&dyn Messenger>,
    token: &str,
    batch_id: &str,
    subject_ids: &[String],
    subjects: &[Subject],
    content_type: ContentType,
    download_dir: &Path,
) {
    for subject_id in subject_ids {
        let records =
            collect_subject_records(api, token, batch_id, subject_id, content_type).await;

        if records.is_empty() {
            notify(chat, &format!("No content found for subject ID {subject_id}.")).await;
            continue;
        }

        let label = subject_label(subjects, subject_id);
        let path = match write_artifact(download_dir, batch_id, &label, &records) {
            Ok(path) => path,
            Err(e) => {
                error!(error = %e, subject_id, "failed to write artifact");
                notify(chat, &format!("Failed to export contents for {label}.")).await;
                continue;
            }
        };

        match chat
            .send_document(&path, &format!("Contents for {label}."))
            .await
        {
            Ok(()) => {
                if let Some(mirror) = mirror {
                    let caption = format!("Contents for {label} saved and sent to the user.");
                    if let Err(e) = mirror.send_document(&path, &caption).await {
                        error!(error = %e, subject_id, "failed to mirror artifact");
                        notify(chat, &format!("Error sending file to log channel for {label}."))
                            .await;
                    }
                }
            }
            Err(e) => {
                error!(error = %e, subject_id, "failed to deliver artifact");
                notify(chat, &format!("Error sending file for {label}.")).await;
            }
        }

        remove_artifact(&path);
    }
}

/// Status messages are best-effort: a broken chat must not stop the walk
/// over the remaining subjects.
async fn notify(chat: &dyn Messenger, text: &str) {
    if let Err(e) = chat.send_text(text).await {
        error!(error = %e, "failed to send status message");
    }
}
