use std::fs;
use std::path::{Path, PathBuf};

use folio_application::{ApplicationError, SourceArchive};
use tracing::debug;

/// Moves processed sources to `<processed_root>/<file name>`.
#[derive(Debug, Default)]
pub struct FsSourceArchive;

impl SourceArchive for FsSourceArchive {
    fn archive(&self, source: &Path, processed_root: &Path) -> Result<PathBuf, ApplicationError> {
        let file_name = source.file_name().ok_or_else(|| {
            ApplicationError::InvalidInput(format!("source has no file name: {}", source.display()))
        })?;
        fs::create_dir_all(processed_root)
            .map_err(|error| ApplicationError::Io(error.to_string()))?;
        let destination = processed_root.join(file_name);

        if fs::rename(source, &destination).is_err() {
            // rename fails across filesystems
            fs::copy(source, &destination)
                .map_err(|error| ApplicationError::Io(format!("copy failed: {error}")))?;
            fs::remove_file(source)
                .map_err(|error| ApplicationError::Io(format!("remove failed: {error}")))?;
        }

        debug!(from = %source.display(), to = %destination.display(), "archived source");
        Ok(destination)
    }
}
