//! Command-line interface for coursegrab.
//!
//! `run` starts the Telegram bot; `extract` runs the same pipeline headless
//! for scripting; `config` prints the resolved configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::api::ApiClient;
use crate::bot::Bot;
use crate::config::Config;
use crate::domain::ContentType;
use crate::extract;
use crate::session::parse_subject_ids;

/// coursegrab - extract downloadable resource links from course batches
#[derive(Parser, Debug)]
#[command(name = "coursegrab")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file (default: ./coursegrab.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the Telegram bot
    Run,

    /// Extract contents without the bot; artifacts stay in the download
    /// directory
    Extract {
        /// Bearer token for the upstream API
        #[arg(short, long, env = "COURSEGRAB_TOKEN")]
        token: String,

        /// Batch ID
        #[arg(short, long)]
        batch: String,

        /// Subject ID(s), separated with '&'
        #[arg(short, long)]
        subjects: String,

        /// Content type to extract
        #[arg(long, value_enum, default_value = "exercises-notes-videos")]
        content_type: ContentTypeArg,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Content type for CLI (maps to ContentType)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ContentTypeArg {
    /// Video lectures and exercises
    #[value(name = "exercises-notes-videos")]
    Exercises,

    /// Lecture notes
    Notes,

    /// Daily practice problem notes
    #[value(name = "DppNotes")]
    DppNotes,

    /// Daily practice problem solutions
    #[value(name = "DppSolution")]
    DppSolution,
}

impl From<ContentTypeArg> for ContentType {
    fn from(t: ContentTypeArg) -> Self {
        match t {
            ContentTypeArg::Exercises => ContentType::ExercisesNotesVideos,
            ContentTypeArg::Notes => ContentType::Notes,
            ContentTypeArg::DppNotes => ContentType::DppNotes,
            ContentTypeArg::DppSolution => ContentType::DppSolution,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        let config = Config::load(self.config.as_deref())?;

        match self.command {
            Commands::Run => Bot::new(config)?.run().await,
            Commands::Extract {
                token,
                batch,
                subjects,
                content_type,
            } => run_headless(config, &token, &batch, &subjects, content_type.into()).await,
            Commands::Config => {
                println!("{config:#?}");
                Ok(())
            }
        }
    }
}

/// One-shot extraction: paginate and normalize exactly like the bot, but
/// print artifact paths instead of delivering files, and keep them on disk.
async fn run_headless(
    config: Config,
    token: &str,
    batch_id: &str,
    subjects_arg: &str,
    content_type: ContentType,
) -> Result<()> {
    let subject_ids = parse_subject_ids(subjects_arg);
    anyhow::ensure!(!subject_ids.is_empty(), "No subject IDs given");

    std::fs::create_dir_all(&config.download_dir).with_context(|| {
        format!(
            "Failed to create download directory: {}",
            config.download_dir.display()
        )
    })?;

    let api = ApiClient::new(&config.api)?;
    let subjects = api.subjects(batch_id, token).await;

    for subject_id in &subject_ids {
        let records =
            extract::collect_subject_records(&api, token, batch_id, subject_id, content_type)
                .await;

        if records.is_empty() {
            println!("No content found for subject ID {subject_id}.");
            continue;
        }

        let label = extract::subject_label(&subjects, subject_id);
        let path = extract::write_artifact(&config.download_dir, batch_id, &label, &records)?;
        println!("{} ({} records)", path.display(), records.len());
    }

    Ok(())
}
