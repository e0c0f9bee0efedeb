use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Unsupported,
}

/// One file discovered in the inbox. `discovered_at` is when it was offered
/// for processing, which can be well before processing starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub base_name: String,
    pub extension: String,
    pub file_size: u64,
    pub discovered_at: String,
}

impl SourceFile {
    pub fn new(path: PathBuf, file_size: u64, discovered_at: String) -> Self {
        let (base_name, extension) = split_file_name(&path);
        Self {
            path,
            base_name,
            extension,
            file_size,
            discovered_at,
        }
    }

    pub fn kind(&self) -> MediaKind {
        detect_media_kind(&self.path)
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default()
    }
}

pub fn detect_media_kind(path: &Path) -> MediaKind {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return MediaKind::Unsupported;
    };

    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "webp" => MediaKind::Image,
        "mp4" | "mov" | "avi" => MediaKind::Video,
        _ => MediaKind::Unsupported,
    }
}

/// Splits a path into its base name (no extension) and lowercased extension.
pub fn split_file_name(path: &Path) -> (String, String) {
    let base_name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    (base_name, extension)
}
