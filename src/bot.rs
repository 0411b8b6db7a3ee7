//! Update dispatch loop: routes Telegram updates to per-chat sessions.
//!
//! One session per chat, created by the entry command and dropped when the
//! flow finishes, is cancelled, or fails. Sessions never share state; an
//! unhandled error terminates only the session it came from.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::adapters::telegram::{TelegramChat, TelegramClient, Update};
use crate::adapters::Messenger;
use crate::api::ApiClient;
use crate::config::Config;
use crate::session::{Flow, Session, SessionContext};

/// Command that starts a new extraction conversation.
const ENTRY_COMMAND: &str = "/pw";

/// Long-poll timeout for getUpdates.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Back-off after a failed poll before retrying.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);

pub struct Bot {
    client: TelegramClient,
    api: ApiClient,
    config: Config,
    sessions: HashMap<i64, Session>,
}

impl Bot {
    pub fn new(config: Config) -> Result<Self> {
        anyhow::ensure!(
            !config.bot_token.is_empty(),
            "bot_token is not configured (config file or COURSEGRAB_BOT_TOKEN)"
        );

        std::fs::create_dir_all(&config.download_dir).with_context(|| {
            format!(
                "Failed to create download directory: {}",
                config.download_dir.display()
            )
        })?;

        let client = TelegramClient::new(config.bot_token.clone());
        let api = ApiClient::new(&config.api)?;

        Ok(Self {
            client,
            api,
            config,
            sessions: HashMap::new(),
        })
    }

    /// Poll for updates forever, dispatching each to its chat's session.
    pub async fn run(mut self) -> Result<()> {
        info!(
            menu = self.config.enable_content_type_menu,
            mirror = self.config.log_chat_id.is_some(),
            "bot started"
        );

        let mut offset = 0i64;
        loop {
            let updates = match self.client.get_updates(offset, POLL_TIMEOUT_SECS).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, "update poll failed, retrying");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);
                if let Err(e) = self.handle_update(update).await {
                    // The failing session has already been dropped; the user
                    // must restart. Keep the operator informed.
                    error!(error = %e, "session terminated by unhandled error");
                    self.report_to_operator(&format!("Error: {e:#}")).await;
                }
            }
        }
    }

    async fn handle_update(&mut self, update: Update) -> Result<()> {
        if let Some(message) = update.message {
            let Some(text) = message.text else {
                return Ok(());
            };
            return self.handle_text(message.chat.id, &text).await;
        }

        if let Some(query) = update.callback_query {
            // Ack is best-effort; a stale query must not kill the session.
            if let Err(e) = self.client.answer_callback_query(&query.id).await {
                warn!(error = %e, "failed to answer callback query");
            }

            let (Some(chat_id), Some(data)) =
                (query.message.as_ref().map(|m| m.chat.id), query.data)
            else {
                return Ok(());
            };
            return self.handle_selection(chat_id, &data).await;
        }

        Ok(())
    }

    async fn handle_text(&mut self, chat_id: i64, text: &str) -> Result<()> {
        let chat = self.chat(chat_id);

        if text.trim() == ENTRY_COMMAND {
            // Restarting the command abandons any session in progress.
            self.sessions.insert(chat_id, Session::new());
            chat.send_text("Send your authentication token:").await?;
            return Ok(());
        }

        let Some(mut session) = self.sessions.remove(&chat_id) else {
            return Ok(());
        };

        let mirror = self.mirror_chat();
        let ctx = self.context(&chat, mirror.as_ref());
        let flow = session.on_message(text, &ctx).await?;
        if flow == Flow::Continue {
            self.sessions.insert(chat_id, session);
        }
        Ok(())
    }

    async fn handle_selection(&mut self, chat_id: i64, data: &str) -> Result<()> {
        let Some(mut session) = self.sessions.remove(&chat_id) else {
            return Ok(());
        };

        let chat = self.chat(chat_id);
        let mirror = self.mirror_chat();
        let ctx = self.context(&chat, mirror.as_ref());
        let flow = session.on_selection(data, &ctx).await?;
        if flow == Flow::Continue {
            self.sessions.insert(chat_id, session);
        }
        Ok(())
    }

    fn chat(&self, chat_id: i64) -> TelegramChat {
        TelegramChat::new(self.client.clone(), chat_id)
    }

    fn mirror_chat(&self) -> Option<TelegramChat> {
        self.config.log_chat_id.map(|id| self.chat(id))
    }

    fn context<'a>(
        &'a self,
        chat: &'a TelegramChat,
        mirror: Option<&'a TelegramChat>,
    ) -> SessionContext<'a> {
        SessionContext {
            api: &self.api,
            chat,
            mirror: mirror.map(|m| m as &dyn Messenger),
            download_dir: &self.config.download_dir,
            content_type_menu: self.config.enable_content_type_menu,
            default_content_type: self.config.default_content_type,
        }
    }

    async fn report_to_operator(&self, text: &str) {
        if let Some(chat) = self.mirror_chat() {
            if let Err(e) = chat.send_text(text).await {
                error!(error = %e, "failed to report error to operator channel");
            }
        }
    }
}
