//! Runtime configuration: built-in defaults, overlaid by `FOLIO_*`
//! environment variables, overlaid by command-line flags.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use folio_domain::{DomainError, SiteProfile};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("inbox {inbox:?} and processed root {processed:?} must not overlap")]
    OverlappingRoots { inbox: PathBuf, processed: PathBuf },

    #[error("cannot read site profile {path:?}: {message}")]
    ProfileUnreadable { path: PathBuf, message: String },

    #[error(transparent)]
    Profile(#[from] DomainError),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Env: `FOLIO_INBOX_DIR`
    pub inbox_dir: PathBuf,
    /// Env: `FOLIO_PROCESSED_DIR`
    pub processed_dir: PathBuf,
    /// Env: `FOLIO_GALLERY_INPUT_DIR`
    pub gallery_input_dir: PathBuf,
    /// Env: `FOLIO_GALLERY_OUTPUT_DIR`
    pub gallery_output_dir: PathBuf,
    /// Prefix joined with each image file name in gallery pages.
    /// Env: `FOLIO_IMAGE_BASE_URL`
    pub image_base_url: String,
    /// Env: `FOLIO_CASE_STUDIES_DIR`
    pub case_studies_dir: PathBuf,
    /// Env: `FOLIO_UPLOADS_DIR`
    pub uploads_dir: PathBuf,
    /// Env: `FOLIO_HTTP_ADDR`
    pub http_addr: SocketAddr,
    /// Base URL the `push` client talks to.
    /// Env: `FOLIO_UPLOAD_URL`
    pub upload_url: String,
    /// Env: `FOLIO_POLL_INTERVAL_MS`
    pub poll_interval: Duration,
    /// Unset means external tools may run for as long as they need.
    /// Env: `FOLIO_TOOL_TIMEOUT_SECS`
    pub tool_timeout: Option<Duration>,
    /// Env: `FOLIO_FFMPEG`
    pub ffmpeg: PathBuf,
    /// Env: `FOLIO_FFPROBE`
    pub ffprobe: PathBuf,
    /// Alternative `site.toml`; the compiled-in profile is used when unset.
    /// Env: `FOLIO_PROFILE`
    pub profile_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            inbox_dir: PathBuf::from("inbox"),
            processed_dir: PathBuf::from("processed"),
            gallery_input_dir: PathBuf::from("gallery-images"),
            gallery_output_dir: PathBuf::from("galleries"),
            image_base_url: "images/".to_string(),
            case_studies_dir: PathBuf::from("case-studies"),
            uploads_dir: PathBuf::from("uploads"),
            http_addr: ([127, 0, 0, 1], 3001).into(),
            upload_url: "http://127.0.0.1:3001".to_string(),
            poll_interval: Duration::from_millis(500),
            tool_timeout: None,
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            profile_path: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup("FOLIO_INBOX_DIR") {
            config.inbox_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("FOLIO_PROCESSED_DIR") {
            config.processed_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("FOLIO_GALLERY_INPUT_DIR") {
            config.gallery_input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("FOLIO_GALLERY_OUTPUT_DIR") {
            config.gallery_output_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("FOLIO_IMAGE_BASE_URL") {
            config.image_base_url = url;
        }
        if let Some(dir) = lookup("FOLIO_CASE_STUDIES_DIR") {
            config.case_studies_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("FOLIO_UPLOADS_DIR") {
            config.uploads_dir = PathBuf::from(dir);
        }
        if let Some(addr) = lookup("FOLIO_HTTP_ADDR") {
            match addr.parse::<SocketAddr>() {
                Ok(parsed) => config.http_addr = parsed,
                Err(_) => warn!(value = %addr, "invalid FOLIO_HTTP_ADDR, using default"),
            }
        }
        if let Some(url) = lookup("FOLIO_UPLOAD_URL") {
            config.upload_url = url;
        }
        if let Some(raw) = lookup("FOLIO_POLL_INTERVAL_MS") {
            match raw.parse::<u64>() {
                Ok(millis) if millis > 0 => config.poll_interval = Duration::from_millis(millis),
                _ => warn!(value = %raw, "invalid FOLIO_POLL_INTERVAL_MS, using default"),
            }
        }
        if let Some(raw) = lookup("FOLIO_TOOL_TIMEOUT_SECS") {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => config.tool_timeout = Some(Duration::from_secs(secs)),
                _ => warn!(value = %raw, "invalid FOLIO_TOOL_TIMEOUT_SECS, tools run unbounded"),
            }
        }
        if let Some(path) = lookup("FOLIO_FFMPEG") {
            config.ffmpeg = PathBuf::from(path);
        }
        if let Some(path) = lookup("FOLIO_FFPROBE") {
            config.ffprobe = PathBuf::from(path);
        }
        if let Some(path) = lookup("FOLIO_PROFILE") {
            config.profile_path = Some(PathBuf::from(path));
        }

        config
    }

    pub fn load_profile(&self) -> Result<SiteProfile, ConfigError> {
        let Some(path) = &self.profile_path else {
            return Ok(SiteProfile::builtin()?);
        };
        let raw = fs::read_to_string(path).map_err(|error| ConfigError::ProfileUnreadable {
            path: path.clone(),
            message: error.to_string(),
        })?;
        Ok(SiteProfile::from_toml_str(&raw)?)
    }

    /// The watcher only sees the inbox's top level, but a processed root
    /// inside the inbox (or the other way round) would still feed outputs
    /// back into intake.
    pub fn ensure_disjoint_roots(&self) -> Result<(), ConfigError> {
        let inbox = resolve(&self.inbox_dir);
        let processed = resolve(&self.processed_dir);
        if inbox.starts_with(&processed) || processed.starts_with(&inbox) {
            return Err(ConfigError::OverlappingRoots {
                inbox: self.inbox_dir.clone(),
                processed: self.processed_dir.clone(),
            });
        }
        Ok(())
    }
}

fn resolve(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
