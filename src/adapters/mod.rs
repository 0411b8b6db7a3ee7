//! Chat transport interfaces.
//!
//! The session flow talks to the user through the [`Messenger`] trait so the
//! conversational logic can be exercised without a live Telegram connection.

pub mod telegram;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

pub use telegram::{TelegramChat, TelegramClient};

/// One side of a conversation: a destination that accepts text, inline
/// menus, and documents.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a plain text message.
    async fn send_text(&self, text: &str) -> Result<()>;

    /// Send a message with one inline button per `(label, callback data)`
    /// pair.
    async fn send_menu(&self, text: &str, options: &[(String, String)]) -> Result<()>;

    /// Send a file with a caption.
    async fn send_document(&self, path: &Path, caption: &str) -> Result<()>;
}
