//! Reshapes raw content-listing items into `(title, url)` records.
//!
//! Pure and stateless: the same input page always yields the same records.
//! Items missing the fields their rule requires are skipped silently.

use crate::domain::{ContentRecord, ContentType, RawItem};

// DppSolution videos are published as progressive-download manifests; the
// streaming variant lives on a different CDN host with an HLS manifest.
// Literal substring substitution, mirroring the upstream URL scheme.
const DOWNLOAD_HOST_TOKEN: &str = "d1d34p8vz63oiq";
const STREAMING_HOST_TOKEN: &str = "d26g5bnklkwsh4";
const DOWNLOAD_EXT_TOKEN: &str = "mpd";
const STREAMING_EXT_TOKEN: &str = "m3u8";

/// Extract records from one page of raw items under the rules of the
/// selected content type.
pub fn normalize_page(items: &[RawItem], content_type: ContentType) -> Vec<ContentRecord> {
    let mut records = Vec::new();

    for item in items {
        match content_type {
            ContentType::ExercisesNotesVideos => {
                let url = item.url.trim();
                if !url.is_empty() {
                    records.push(ContentRecord {
                        title: item.topic.clone(),
                        url: url.to_string(),
                    });
                }
            }
            ContentType::Notes => {
                // First homework entry, first attachment only.
                if let Some(homework) = item.homework.first() {
                    if let Some(attachment) = homework.attachments.first() {
                        records.push(ContentRecord {
                            title: homework.topic.clone(),
                            url: format!("{}{}", attachment.base_url, attachment.key),
                        });
                    }
                }
            }
            ContentType::DppNotes => {
                // Every homework entry contributes a record (first attachment
                // each), so one item may emit several.
                for homework in &item.homework {
                    if let Some(attachment) = homework.attachments.first() {
                        records.push(ContentRecord {
                            title: homework.topic.clone(),
                            url: format!("{}{}", attachment.base_url, attachment.key),
                        });
                    }
                }
            }
            ContentType::DppSolution => {
                let url = rewrite_streaming_url(&item.url);
                records.push(ContentRecord {
                    title: item.topic.clone(),
                    url,
                });
            }
        }
    }

    records
}

/// Convert a progressive-download link into its streaming-manifest variant.
/// Plain substring replacement: URLs without the source tokens pass through
/// unchanged.
fn rewrite_streaming_url(url: &str) -> String {
    url.replace(DOWNLOAD_HOST_TOKEN, STREAMING_HOST_TOKEN)
        .replace(DOWNLOAD_EXT_TOKEN, STREAMING_EXT_TOKEN)
        .trim()
        .to_string()
}
