//! Configuration for coursegrab.
//!
//! Sources (highest priority first):
//! 1. Environment variables (COURSEGRAB_*)
//! 2. Config file (`coursegrab.yaml` in the working directory, or `--config`)
//! 3. Built-in defaults
//!
//! Every field except `bot_token` has a default; the token is only required
//! when the bot itself is started.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::ContentType;

/// Default config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "coursegrab.yaml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Telegram bot token.
    pub bot_token: String,

    /// Upstream content API settings.
    pub api: ApiSettings,

    /// Directory where export artifacts are written before delivery.
    pub download_dir: PathBuf,

    /// Operator chat that receives artifact copies and error reports.
    pub log_chat_id: Option<i64>,

    /// Offer the four content-type choices before extraction. When disabled,
    /// extraction starts right after subject selection using
    /// `default_content_type`.
    pub enable_content_type_menu: bool,

    /// Content type used when the menu is disabled.
    pub default_content_type: ContentType,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api: ApiSettings::default(),
            download_dir: PathBuf::from("downloads"),
            log_chat_id: None,
            enable_content_type_menu: true,
            default_content_type: ContentType::ExercisesNotesVideos,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,

    /// Fixed client identifier required by the upstream API.
    pub client_id: String,

    /// Fixed user-agent required by the upstream API.
    pub user_agent: String,

    /// Per-request timeout.
    pub timeout_seconds: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.penpencil.xyz".to_string(),
            client_id: "5eb393ee95fab7468a79d189".to_string(),
            user_agent: "Android".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Config {
    /// Load configuration: explicit path if given, else `coursegrab.yaml`
    /// in the working directory if present, else defaults. Environment
    /// overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => {
                let default_path = PathBuf::from(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(token) = std::env::var("COURSEGRAB_BOT_TOKEN") {
            self.bot_token = token;
        }
        if let Ok(base) = std::env::var("COURSEGRAB_API_BASE") {
            self.api.base_url = base;
        }
        if let Ok(dir) = std::env::var("COURSEGRAB_DOWNLOAD_DIR") {
            self.download_dir = PathBuf::from(dir);
        }
        if let Ok(chat) = std::env::var("COURSEGRAB_LOG_CHAT_ID") {
            let id = chat
                .parse::<i64>()
                .context("COURSEGRAB_LOG_CHAT_ID must be an integer chat ID")?;
            self.log_chat_id = Some(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "https://api.penpencil.xyz");
        assert_eq!(config.api.client_id, "5eb393ee95fab7468a79d189");
        assert_eq!(config.api.user_agent, "Android");
        assert_eq!(config.download_dir, PathBuf::from("downloads"));
        assert!(config.enable_content_type_menu);
        assert!(config.log_chat_id.is_none());
        assert_eq!(
            config.default_content_type,
            ContentType::ExercisesNotesVideos
        );
    }

    #[test]
    fn test_config_file_parsing() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("coursegrab.yaml");
        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(
            file,
            r#"
bot_token: "123:abc"
download_dir: ./exports
log_chat_id: -1002385500773
enable_content_type_menu: false
default_content_type: DppNotes
api:
  timeout_seconds: 5
"#
        )
        .unwrap();

        let config = Config::from_file(&config_path).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert_eq!(config.download_dir, PathBuf::from("./exports"));
        assert_eq!(config.log_chat_id, Some(-1002385500773));
        assert!(!config.enable_content_type_menu);
        assert_eq!(config.default_content_type, ContentType::DppNotes);
        assert_eq!(config.api.timeout_seconds, 5);
        // Unspecified API fields keep their defaults.
        assert_eq!(config.api.user_agent, "Android");
    }
}
