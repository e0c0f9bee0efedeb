use std::path::{Path, PathBuf};

use folio_domain::{MediaKind, MetadataRecord};

use crate::ApplicationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub file_size: u64,
    pub kind: MediaKind,
}

impl ScannedFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FileScanSummary {
    pub scanned_files: usize,
    pub supported_files: usize,
    /// Every regular file, in directory enumeration order.
    pub files: Vec<ScannedFile>,
}

pub trait FileScanner: Send + Sync {
    /// Lists the top-level files of `folder` without sorting them.
    fn scan(&self, folder: &Path) -> Result<FileScanSummary, ApplicationError>;

    fn describe(&self, path: &Path) -> Result<ScannedFile, ApplicationError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDerivatives {
    pub produced: Vec<String>,
    pub width: u32,
    pub height: u32,
    pub format: String,
}

/// Produces the fixed derivative set for one source into `output_dir`.
pub trait DerivativeGenerator: Send + Sync {
    /// Removes every output of an earlier run so a new set replaces it.
    fn clear_outputs(&self, output_dir: &Path) -> Result<(), ApplicationError>;

    fn generate_image_derivatives(
        &self,
        source: &Path,
        output_dir: &Path,
        base_name: &str,
    ) -> Result<ImageDerivatives, ApplicationError>;

    fn generate_video_derivatives(
        &self,
        source: &Path,
        output_dir: &Path,
        base_name: &str,
    ) -> Result<Vec<String>, ApplicationError>;
}

pub trait MediaProbe: Send + Sync {
    fn probe(&self, source: &Path) -> Result<serde_json::Value, ApplicationError>;
}

pub trait MetadataStore: Send + Sync {
    fn write_metadata(
        &self,
        output_dir: &Path,
        base_name: &str,
        record: &MetadataRecord,
    ) -> Result<PathBuf, ApplicationError>;
}

/// Moves a processed source out of the inbox.
pub trait SourceArchive: Send + Sync {
    fn archive(&self, source: &Path, processed_root: &Path) -> Result<PathBuf, ApplicationError>;
}

pub trait PageStore: Send + Sync {
    fn read_page(&self, path: &Path) -> Result<Option<String>, ApplicationError>;

    fn write_page(&self, path: &Path, contents: &str) -> Result<(), ApplicationError>;
}

pub trait Clock: Send + Sync {
    fn now_timestamp_string(&self) -> String;
}

/// Runs one intake item to completion. Failures are reported in the outcome,
/// never returned.
pub trait IntakeHandler: Send + Sync {
    fn handle(&self, item: &crate::IntakeItem) -> crate::ProcessOutcome;
}
