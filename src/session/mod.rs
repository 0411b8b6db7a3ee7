//! The staged conversational flow.
//!
//! Four stages, each gated on the prior one: token, batch, subjects,
//! content type. Every stage variant carries only the fields that are valid
//! once it is reached, so a later stage can never read an unset field.
//! There is no back transition; any stage failure ends the session and the
//! user restarts from the token prompt.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::adapters::Messenger;
use crate::api::{ApiClient, ApiError};
use crate::domain::{Batch, ContentType, Subject};
use crate::extract;

/// What the dispatcher should do with the session after an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep the session and wait for the next input.
    Continue,
    /// The conversation is over; drop the session.
    Done,
}

/// Everything a session needs besides the user's input.
pub struct SessionContext<'a> {
    pub api: &'a ApiClient,
    /// The requesting user's chat.
    pub chat: &'a dyn Messenger,
    /// Optional operator channel that receives artifact copies.
    pub mirror: Option<&'a dyn Messenger>,
    pub download_dir: &'a Path,
    /// Offer the content-type menu; when false, `default_content_type`
    /// is used right after subject selection.
    pub content_type_menu: bool,
    pub default_content_type: ContentType,
}

enum Stage {
    AwaitToken,
    AwaitBatch {
        token: String,
    },
    AwaitSubjects {
        token: String,
        batch_id: String,
        subjects: Vec<Subject>,
    },
    AwaitContentType {
        token: String,
        batch_id: String,
        subjects: Vec<Subject>,
        subject_ids: Vec<String>,
    },
    Done,
}

pub struct Session {
    stage: Stage,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Split an `&`-separated subject list, trimming each ID and dropping
/// empty pieces.
pub fn parse_subject_ids(input: &str) -> Vec<String> {
    input
        .split('&')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Session {
    pub fn new() -> Self {
        Self {
            stage: Stage::AwaitToken,
        }
    }

    /// Advance the session on a plain text input.
    pub async fn on_message(&mut self, text: &str, ctx: &SessionContext<'_>) -> Result<Flow> {
        match std::mem::replace(&mut self.stage, Stage::Done) {
            Stage::AwaitToken => self.handle_token(text, ctx).await,
            Stage::AwaitBatch { token } => self.handle_batch(text, token, ctx).await,
            Stage::AwaitSubjects {
                token,
                batch_id,
                subjects,
            } => {
                self.handle_subjects(text, token, batch_id, subjects, ctx)
                    .await
            }
            // Text while a menu is pending (or after the end) is ignored;
            // the stage is restored untouched.
            stage @ Stage::AwaitContentType { .. } => {
                self.stage = stage;
                Ok(Flow::Continue)
            }
            Stage::Done => Ok(Flow::Done),
        }
    }

    /// Advance the session on an inline-menu selection.
    pub async fn on_selection(&mut self, data: &str, ctx: &SessionContext<'_>) -> Result<Flow> {
        match std::mem::replace(&mut self.stage, Stage::Done) {
            Stage::AwaitContentType {
                token,
                batch_id,
                subjects,
                subject_ids,
            } => {
                if data == "cancel" {
                    ctx.chat.send_text("Operation cancelled.").await?;
                    return Ok(Flow::Done);
                }

                let Some(content_type) = ContentType::parse(data) else {
                    self.stage = Stage::AwaitContentType {
                        token,
                        batch_id,
                        subjects,
                        subject_ids,
                    };
                    ctx.chat.send_text("Unknown option, pick a button.").await?;
                    return Ok(Flow::Continue);
                };

                extract_and_deliver(ctx, &token, &batch_id, &subjects, &subject_ids, content_type)
                    .await?;
                Ok(Flow::Done)
            }
            // Selections are only meaningful while the menu is pending.
            stage => {
                self.stage = stage;
                Ok(Flow::Continue)
            }
        }
    }

    async fn handle_token(&mut self, text: &str, ctx: &SessionContext<'_>) -> Result<Flow> {
        let token = text.trim().to_string();

        ctx.chat
            .send_text("Fetching your batches. Please wait...")
            .await?;

        let batches = match ctx.api.list_batches(&token).await {
            Ok(batches) => batches,
            Err(ApiError::Auth) => {
                ctx.chat
                    .send_text("Invalid or expired token. Please provide a valid token.")
                    .await?;
                return Ok(Flow::Done);
            }
            Err(ApiError::Transport(_)) => {
                ctx.chat
                    .send_text("Failed to fetch batches. Please check your token and try again.")
                    .await?;
                return Ok(Flow::Done);
            }
        };

        if batches.is_empty() {
            ctx.chat
                .send_text("No batches found. Please check your token.")
                .await?;
            return Ok(Flow::Done);
        }

        info!(count = batches.len(), "batches listed");
        ctx.chat
            .send_text(&format!(
                "Your batches:\n\n{}\nSend the batch ID to proceed:",
                format_batches(&batches)
            ))
            .await?;

        self.stage = Stage::AwaitBatch { token };
        Ok(Flow::Continue)
    }

    async fn handle_batch(
        &mut self,
        text: &str,
        token: String,
        ctx: &SessionContext<'_>,
    ) -> Result<Flow> {
        let batch_id = text.trim().to_string();

        let subjects = ctx.api.subjects(&batch_id, &token).await;
        if subjects.is_empty() {
            ctx.chat
                .send_text("No subjects found for this batch.")
                .await?;
            return Ok(Flow::Done);
        }

        let listing = subjects
            .iter()
            .map(|s| format!("{}: {}", s.id, s.name))
            .collect::<Vec<_>>()
            .join("\n");

        ctx.chat
            .send_text(&format!(
                "Subjects found:\n{listing}\n\nSend the subject ID(s) to fetch contents \
                 (separate multiple IDs with '&'):"
            ))
            .await?;

        self.stage = Stage::AwaitSubjects {
            token,
            batch_id,
            subjects,
        };
        Ok(Flow::Continue)
    }

    async fn handle_subjects(
        &mut self,
        text: &str,
        token: String,
        batch_id: String,
        subjects: Vec<Subject>,
        ctx: &SessionContext<'_>,
    ) -> Result<Flow> {
        let subject_ids = parse_subject_ids(text);
        if subject_ids.is_empty() {
            ctx.chat
                .send_text("No subject IDs recognized. Send the subject ID(s), separated with '&'.")
                .await?;
            self.stage = Stage::AwaitSubjects {
                token,
                batch_id,
                subjects,
            };
            return Ok(Flow::Continue);
        }

        if !ctx.content_type_menu {
            extract_and_deliver(
                ctx,
                &token,
                &batch_id,
                &subjects,
                &subject_ids,
                ctx.default_content_type,
            )
            .await?;
            return Ok(Flow::Done);
        }

        let mut options: Vec<(String, String)> = ContentType::ALL
            .iter()
            .map(|t| (t.label().to_string(), t.as_str().to_string()))
            .collect();
        options.push(("Cancel".to_string(), "cancel".to_string()));

        ctx.chat
            .send_menu("Choose the type of content to extract:", &options)
            .await?;

        self.stage = Stage::AwaitContentType {
            token,
            batch_id,
            subjects,
            subject_ids,
        };
        Ok(Flow::Continue)
    }
}

fn format_batches(batches: &[Batch]) -> String {
    batches
        .iter()
        .map(|b| {
            format!(
                "Batch ID: {}\nBatch name: {}\nPrice: {}\n",
                b.id,
                b.name,
                b.price()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

async fn extract_and_deliver(
    ctx: &SessionContext<'_>,
    token: &str,
    batch_id: &str,
    subjects: &[Subject],
    subject_ids: &[String],
    content_type: ContentType,
) -> Result<()> {
    ctx.chat
        .send_text(&format!(
            "Extracting content type: {}. Please wait...",
            content_type.as_str()
        ))
        .await?;

    extract::run_extraction(
        ctx.api,
        ctx.chat,
        ctx.mirror,
        token,
        batch_id,
        subject_ids,
        subjects,
        content_type,
        ctx.download_dir,
    )
    .await;

    Ok(())
}
