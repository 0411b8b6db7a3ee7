//! Authenticated client for the upstream content API.
//!
//! Three read-only GET endpoints under a fixed base host, authenticated with
//! a user-supplied bearer token plus a fixed client identifier and user-agent
//! (upstream requirements, carried in configuration). Responses arrive as
//! JSON with a top-level `data` field.
//!
//! Error contract:
//! - Batch listing distinguishes auth failures from transport failures and
//!   keeps partial results when pagination breaks after at least one page.
//! - Subject and content lookups degrade to an empty sequence on any
//!   failure; callers treat "empty" as "nothing there".

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::ApiSettings;
use crate::domain::{Batch, ContentType, RawItem, Subject};

/// Failures surfaced by the batch-listing call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The token was rejected (HTTP 401). Any partial listing is discarded.
    #[error("invalid or expired token")]
    Auth,

    /// Network failure or a non-success response before any page succeeded.
    #[error("upstream request failed: {0}")]
    Transport(String),
}

/// Standard response envelope of the upstream API.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    data: Option<T>,
}

/// Subject list nested inside the batch-details response.
#[derive(Debug, Default, Deserialize)]
struct BatchDetails {
    #[serde(default)]
    subjects: Vec<Subject>,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    user_agent: String,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client_id: settings.client_id.clone(),
            user_agent: settings.user_agent.clone(),
        })
    }

    async fn get(
        &self,
        url: &str,
        token: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<reqwest::Response, reqwest::Error> {
        self.http
            .get(url)
            .query(query)
            .header("authorization", format!("Bearer {token}"))
            .header("client-id", &self.client_id)
            .header("user-agent", &self.user_agent)
            .send()
            .await
    }

    /// List every batch the token is enrolled in, walking pages from 1 until
    /// a page comes back empty.
    ///
    /// HTTP 401 aborts immediately with [`ApiError::Auth`] and discards any
    /// accumulated pages. Any other failure stops the walk: accumulated
    /// batches are returned if at least one page had succeeded, otherwise
    /// the call fails with [`ApiError::Transport`].
    pub async fn list_batches(&self, token: &str) -> std::result::Result<Vec<Batch>, ApiError> {
        let url = format!("{}/v3/batches/my-batches", self.base_url);
        let mut batches = Vec::new();

        for page in 1u32.. {
            let query = [("page", page.to_string()), ("mode", "1".to_string())];
            let response = self
                .get(&url, token, &query)
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;

            match response.status() {
                StatusCode::OK => {}
                StatusCode::UNAUTHORIZED => return Err(ApiError::Auth),
                status => {
                    warn!(%status, page, "batch listing stopped on non-success status");
                    if batches.is_empty() {
                        return Err(ApiError::Transport(format!(
                            "status {status} on page {page}"
                        )));
                    }
                    return Ok(batches);
                }
            }

            let envelope: Envelope<Vec<Batch>> = response
                .json()
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?;

            let data = envelope.data.unwrap_or_default();
            if data.is_empty() {
                break;
            }
            debug!(page, count = data.len(), "fetched batch page");
            batches.extend(data);
        }

        Ok(batches)
    }

    /// Fetch the subjects of one batch. Any failure degrades to an empty
    /// list; the user-facing contract does not distinguish "no subjects"
    /// from "lookup failed".
    pub async fn subjects(&self, batch_id: &str, token: &str) -> Vec<Subject> {
        let url = format!("{}/v3/batches/{}/details", self.base_url, batch_id);

        let response = match self.get(&url, token, &[]).await {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, batch_id, "subject lookup failed");
                return Vec::new();
            }
        };

        if response.status() != StatusCode::OK {
            error!(status = %response.status(), batch_id, "subject lookup returned non-success");
            return Vec::new();
        }

        match response.json::<Envelope<BatchDetails>>().await {
            Ok(envelope) => envelope.data.unwrap_or_default().subjects,
            Err(e) => {
                error!(error = %e, batch_id, "failed to decode subject listing");
                Vec::new()
            }
        }
    }

    /// Fetch one page of content items for a subject. Any failure degrades
    /// to an empty page, which callers interpret as "no more pages".
    pub async fn content_page(
        &self,
        batch_id: &str,
        subject_id: &str,
        page: u32,
        token: &str,
        content_type: ContentType,
    ) -> Vec<RawItem> {
        let url = format!(
            "{}/v2/batches/{}/subject/{}/contents",
            self.base_url, batch_id, subject_id
        );
        let query = [
            ("page", page.to_string()),
            ("contentType", content_type.as_str().to_string()),
        ];

        let response = match self.get(&url, token, &query).await {
            Ok(r) => r,
            Err(e) => {
                error!(error = %e, subject_id, page, "content page fetch failed");
                return Vec::new();
            }
        };

        if response.status() != StatusCode::OK {
            error!(status = %response.status(), subject_id, page, "content page returned non-success");
            return Vec::new();
        }

        match response.json::<Envelope<Vec<RawItem>>>().await {
            Ok(envelope) => envelope.data.unwrap_or_default(),
            Err(e) => {
                error!(error = %e, subject_id, page, "failed to decode content page");
                Vec::new()
            }
        }
    }
}
