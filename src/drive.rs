//! Google Drive document source.
//!
//! Downloads files the user picked in Drive and hands them to the pipeline
//! as [`SourceFile`]s, exactly like local uploads. Acquiring the OAuth
//! access token (and the picker UI) happens outside Docent; the client is
//! given a ready bearer token.
//!
//! Each download is two requests against the Drive v3 API:
//!
//! | Request | Purpose |
//! |---------|---------|
//! | `GET /files/{id}?fields=name,mimeType` | name and MIME type |
//! | `GET /files/{id}?alt=media` | raw content |

use anyhow::{bail, Result};
use serde::Deserialize;
use thiserror::Error;

use crate::config::DriveConfig;
use crate::models::SourceFile;

#[derive(Debug, Error)]
pub enum DriveError {
    #[error("Failed to fetch file metadata ({0})")]
    Metadata(u16),
    #[error("Failed to download file content ({0})")]
    Content(u16),
    #[error("{0}")]
    Http(String),
}

/// A file chosen in the Drive picker.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveFile {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileMetadata {
    name: String,
    #[serde(default)]
    mime_type: String,
}

pub struct DriveClient {
    endpoint: String,
    access_token: String,
    client: reqwest::Client,
}

impl DriveClient {
    pub fn new(endpoint: &str, access_token: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Builds a client with the token read from `config.token_env`.
    pub fn from_config(config: &DriveConfig) -> Result<Self> {
        match std::env::var(&config.token_env) {
            Ok(token) if !token.is_empty() => Ok(Self::new(&config.endpoint, token)),
            _ => bail!(
                "Google Drive access token not set (expected in {})",
                config.token_env
            ),
        }
    }

    /// Fetches a file's metadata and content.
    pub async fn download(&self, file_id: &str) -> Result<SourceFile, DriveError> {
        let url = format!("{}/files/{}", self.endpoint, file_id);

        let resp = self
            .client
            .get(&url)
            .query(&[("fields", "name,mimeType")])
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| DriveError::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(DriveError::Metadata(resp.status().as_u16()));
        }
        let metadata: FileMetadata = resp
            .json()
            .await
            .map_err(|e| DriveError::Http(e.to_string()))?;

        let resp = self
            .client
            .get(&url)
            .query(&[("alt", "media")])
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| DriveError::Http(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(DriveError::Content(resp.status().as_u16()));
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| DriveError::Http(e.to_string()))?;

        tracing::debug!(file_id, name = %metadata.name, bytes = bytes.len(), "downloaded drive file");
        Ok(SourceFile::new(
            metadata.name,
            metadata.mime_type,
            bytes.to_vec(),
        ))
    }
}
