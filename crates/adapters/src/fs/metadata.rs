use std::fs;
use std::path::{Path, PathBuf};

use folio_application::{ApplicationError, MetadataStore};
use folio_domain::{metadata_file_name, MetadataRecord};

#[derive(Debug, Default)]
pub struct JsonMetadataStore;

impl MetadataStore for JsonMetadataStore {
    fn write_metadata(
        &self,
        output_dir: &Path,
        base_name: &str,
        record: &MetadataRecord,
    ) -> Result<PathBuf, ApplicationError> {
        fs::create_dir_all(output_dir).map_err(|error| ApplicationError::Io(error.to_string()))?;
        let path = output_dir.join(metadata_file_name(base_name));
        let json = serde_json::to_string_pretty(record)
            .map_err(|error| ApplicationError::Persistence(error.to_string()))?;
        fs::write(&path, json).map_err(|error| ApplicationError::Io(error.to_string()))?;
        Ok(path)
    }
}
