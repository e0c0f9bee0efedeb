use std::io::ErrorKind;
use std::path::Path;

use folio_application::{ApplicationError, FileScanSummary, FileScanner, ScannedFile};
use folio_domain::{detect_media_kind, MediaKind};
use walkdir::WalkDir;

#[derive(Debug, Default)]
pub struct WalkdirFileScanner;

impl FileScanner for WalkdirFileScanner {
    fn scan(&self, folder: &Path) -> Result<FileScanSummary, ApplicationError> {
        if !folder.is_dir() {
            return Err(ApplicationError::InvalidInput(format!(
                "folder does not exist or is not a directory: {}",
                folder.display()
            )));
        }

        let mut summary = FileScanSummary::default();

        for entry in WalkDir::new(folder)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }

            summary.scanned_files += 1;
            let file = self.describe(entry.path())?;
            if file.kind != MediaKind::Unsupported {
                summary.supported_files += 1;
            }
            summary.files.push(file);
        }

        Ok(summary)
    }

    fn describe(&self, path: &Path) -> Result<ScannedFile, ApplicationError> {
        let metadata = path.metadata().map_err(|error| match error.kind() {
            ErrorKind::NotFound => ApplicationError::NotFound(path.display().to_string()),
            _ => ApplicationError::Io(format!("cannot stat {}: {error}", path.display())),
        })?;
        if !metadata.is_file() {
            return Err(ApplicationError::InvalidInput(format!(
                "not a regular file: {}",
                path.display()
            )));
        }

        let canonical = path
            .canonicalize()
            .map_err(|error| ApplicationError::Io(error.to_string()))?;

        Ok(ScannedFile {
            kind: detect_media_kind(&canonical),
            path: canonical,
            file_size: metadata.len(),
        })
    }
}
