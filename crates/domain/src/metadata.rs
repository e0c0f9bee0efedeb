use serde::{Deserialize, Serialize};

/// Source media attributes stored in the sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceAttributes {
    Image {
        width: u32,
        height: u32,
        format: String,
    },
    /// Raw probe output, or `{ "error": "..." }` when probing failed.
    Video { metadata: serde_json::Value },
}

impl SourceAttributes {
    pub fn probe_failed(message: impl Into<String>) -> Self {
        Self::Video {
            metadata: serde_json::json!({ "error": message.into() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub original_filename: String,
    pub project: String,
    pub tags: Vec<String>,
    /// When the source was offered to the intake queue.
    pub discovered_at: String,
    pub processed_at: String,
    pub source: SourceAttributes,
    pub derivatives: Vec<String>,
}
