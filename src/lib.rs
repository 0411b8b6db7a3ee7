//! coursegrab - Telegram bot that extracts downloadable resource links
//! from course batches on an educational-content API.
//!
//! # Flow
//!
//! A user starts the conversation with `/pw`, supplies a bearer token, picks
//! one of their enrolled batches, picks one or more subjects, and picks a
//! content type. The bot pages through the content-listing endpoint,
//! reshapes each item into a `title: url` line, and sends back one text
//! file per subject (optionally mirrored to an operator channel).
//!
//! # Modules
//!
//! - `api`: authenticated client for the upstream REST API
//! - `domain`: batches, subjects, raw items, content records
//! - `extract`: normalizer, export writer, extraction pipeline
//! - `session`: the staged conversational state machine
//! - `adapters`: chat transport (`Messenger` trait, Telegram)
//! - `bot`: update polling and per-chat session dispatch
//! - `cli`: `run` / `extract` / `config` commands
//!
//! # Usage
//!
//! ```bash
//! # Start the bot
//! coursegrab run
//!
//! # Headless extraction
//! coursegrab extract --token "$TOKEN" --batch B1 --subjects 'S1&S2'
//! ```

pub mod adapters;
pub mod api;
pub mod bot;
pub mod cli;
pub mod config;
pub mod domain;
pub mod extract;
pub mod session;

// Re-export main types at crate root for convenience
pub use api::{ApiClient, ApiError};
pub use config::{ApiSettings, Config};
pub use domain::{Batch, ContentRecord, ContentType, RawItem, Subject};
pub use session::{Flow, Session, SessionContext};

// Chat transport
pub use adapters::{Messenger, TelegramChat, TelegramClient};
