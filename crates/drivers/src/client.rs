use std::path::{Path, PathBuf};

use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("cannot read {path:?}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server rejected upload: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// Client for the upload server. Built once from configuration and passed
/// by reference to whoever needs it.
#[derive(Debug, Clone)]
pub struct UploadClient {
    http: reqwest::Client,
    base_url: String,
}

impl UploadClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn push(
        &self,
        project: &str,
        files: &[PathBuf],
    ) -> Result<UploadResponse, ClientError> {
        let mut form = Form::new().text("project", project.to_string());
        for path in files {
            form = form.part("files", file_part(path).await?);
        }

        let url = format!("{}/api/upload", self.base_url);
        debug!(url = %url, project, files = files.len(), "posting upload");
        let response: UploadResponse = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await?
            .json()
            .await?;

        if response.success {
            Ok(response)
        } else {
            Err(ClientError::Rejected(
                response.error.unwrap_or(response.message),
            ))
        }
    }
}

async fn file_part(path: &Path) -> Result<Part, ClientError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|error| ClientError::Read {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(Part::bytes(data).file_name(name))
}
