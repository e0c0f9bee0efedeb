use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use folio_application::{ApplicationError, PageStore};

#[derive(Debug, Default)]
pub struct FsPageStore;

impl PageStore for FsPageStore {
    fn read_page(&self, path: &Path) -> Result<Option<String>, ApplicationError> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(ApplicationError::Io(error.to_string())),
        }
    }

    fn write_page(&self, path: &Path, contents: &str) -> Result<(), ApplicationError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|error| ApplicationError::Io(error.to_string()))?;
        }
        fs::write(path, contents).map_err(|error| ApplicationError::Io(error.to_string()))
    }
}
