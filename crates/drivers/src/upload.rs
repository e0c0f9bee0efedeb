//! Upload HTTP boundary: accepts multipart uploads into per-project folders.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use folio_domain::UploadPolicy;
use serde::Serialize;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

#[derive(Clone)]
pub struct UploadState {
    pub uploads_root: Arc<PathBuf>,
    pub policy: Arc<UploadPolicy>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("{0}")]
    BadRequest(String),

    /// `stored` names the files that did reach their final place before
    /// the failure.
    #[error("storage error: {message}")]
    Storage { message: String, stored: Vec<String> },
}

impl UploadError {
    fn storage(error: impl std::fmt::Display) -> Self {
        UploadError::Storage {
            message: error.to_string(),
            stored: Vec::new(),
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let (status, message, stored) = match &self {
            UploadError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Upload rejected", &[][..]),
            UploadError::Storage { stored, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Upload failed",
                stored.as_slice(),
            ),
        };
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
            "message": message,
            "stored": stored,
        });
        (status, Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct Envelope<T> {
    success: bool,
    data: T,
    message: String,
}

impl<T> Envelope<T> {
    fn ok(data: T, message: impl Into<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message: message.into(),
        })
    }
}

#[derive(Debug, Serialize)]
struct StoredFile {
    name: String,
    size: usize,
    path: String,
}

#[derive(Debug, Serialize)]
struct UploadReceipt {
    project: String,
    files: Vec<StoredFile>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub fn build_router(state: UploadState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/projects", get(list_projects))
        .route("/api/upload", post(upload_files))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(state: UploadState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);
    info!(addr = %addr, "starting upload server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received Ctrl+C, shutting down upload server");
        })
        .await?;
    Ok(())
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn list_projects(State(state): State<UploadState>) -> Json<Envelope<Vec<String>>> {
    let projects = state.policy.projects.clone();
    let message = format!("{} projects accept uploads", projects.len());
    Envelope::ok(projects, message)
}

async fn upload_files(
    State(state): State<UploadState>,
    mut multipart: Multipart,
) -> Result<Json<Envelope<UploadReceipt>>, UploadError> {
    let mut project = None;
    let mut files: Vec<(String, Bytes)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|error| UploadError::BadRequest(format!("multipart error: {error}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "project" => {
                let value = field
                    .text()
                    .await
                    .map_err(|error| UploadError::BadRequest(format!("unreadable project: {error}")))?;
                project = Some(value.trim().to_string());
            }
            "files" => {
                let raw_name = field.file_name().unwrap_or("").to_string();
                let name = sanitize_file_name(&raw_name).ok_or_else(|| {
                    UploadError::BadRequest(format!("invalid file name: {raw_name:?}"))
                })?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|error| UploadError::BadRequest(format!("failed to read file: {error}")))?;
                // a repeated name keeps the last part
                match files.iter_mut().find(|(existing, _)| *existing == name) {
                    Some(slot) => slot.1 = data,
                    None => files.push((name, data)),
                }
            }
            other => warn!(field = other, "ignoring unknown multipart field"),
        }
    }

    let project = project
        .filter(|project| !project.is_empty())
        .ok_or_else(|| UploadError::BadRequest("missing project field".to_string()))?;
    if !state.policy.accepts(&project) {
        return Err(UploadError::BadRequest(format!("unknown project: {project}")));
    }
    if files.is_empty() {
        return Err(UploadError::BadRequest("no files uploaded".to_string()));
    }

    let project_dir = state.uploads_root.join(&project);
    tokio::fs::create_dir_all(&project_dir)
        .await
        .map_err(UploadError::storage)?;

    let staged = stage_files(&project_dir, &files).await?;
    let committed = commit_staged(&project_dir, &staged).await?;

    let stored: Vec<StoredFile> = files
        .iter()
        .zip(committed)
        .map(|((name, data), path)| {
            info!(project = %project, file = %name, size = data.len(), "stored upload");
            StoredFile {
                name: name.clone(),
                size: data.len(),
                path: path.display().to_string(),
            }
        })
        .collect();

    let message = format!("Uploaded {} file(s) to {}", stored.len(), project);
    Ok(Envelope::ok(
        UploadReceipt {
            project,
            files: stored,
        },
        message,
    ))
}

fn staging_path(project_dir: &Path, name: &str) -> PathBuf {
    project_dir.join(format!(".{name}.part"))
}

/// Writes every file under a hidden staging name. On failure, nothing
/// staged so far is left behind.
async fn stage_files(
    project_dir: &Path,
    files: &[(String, Bytes)],
) -> Result<Vec<(String, PathBuf)>, UploadError> {
    let mut staged = Vec::with_capacity(files.len());
    for (name, data) in files {
        let temp = staging_path(project_dir, name);
        if let Err(error) = tokio::fs::write(&temp, data).await {
            warn!(file = %name, %error, "failed to stage upload");
            let _ = tokio::fs::remove_file(&temp).await;
            discard(staged.iter().map(|(_, path)| path)).await;
            return Err(UploadError::storage(format!("{name}: {error}")));
        }
        staged.push((name.clone(), temp));
    }
    Ok(staged)
}

/// Moves staged files to their final names. A failed rename discards the
/// rest and reports which files were already in place.
async fn commit_staged(
    project_dir: &Path,
    staged: &[(String, PathBuf)],
) -> Result<Vec<PathBuf>, UploadError> {
    let mut committed = Vec::with_capacity(staged.len());
    for (index, (name, temp)) in staged.iter().enumerate() {
        let target = project_dir.join(name);
        if let Err(error) = tokio::fs::rename(temp, &target).await {
            warn!(file = %name, %error, "failed to store upload");
            discard(staged[index..].iter().map(|(_, path)| path)).await;
            return Err(UploadError::Storage {
                message: format!("{name}: {error}"),
                stored: staged[..index].iter().map(|(name, _)| name.clone()).collect(),
            });
        }
        committed.push(target);
    }
    Ok(committed)
}

async fn discard<'a>(paths: impl Iterator<Item = &'a PathBuf>) {
    for path in paths {
        if let Err(error) = tokio::fs::remove_file(path).await {
            warn!(file = %path.display(), %error, "failed to remove staged upload");
        }
    }
}

/// Reduces a client-supplied name to its final component. Separators from
/// either platform are honoured.
fn sanitize_file_name(raw: &str) -> Option<String> {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if last.is_empty() || last == "." || last == ".." {
        return None;
    }
    Path::new(last)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
}
