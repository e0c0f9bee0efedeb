use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ProcessSourceCommand {
    pub path: PathBuf,
    pub processed_root: PathBuf,
    /// Defaults to the time processing starts.
    pub discovered_at: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ScanFolderCommand {
    pub folder: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordTableChoice {
    Intake,
    Gallery,
}

#[derive(Debug, Clone)]
pub struct ClassifyNameCommand {
    pub name: String,
    pub table: KeywordTableChoice,
}

#[derive(Debug, Clone)]
pub struct BuildGalleriesCommand {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub image_base_url: String,
}

#[derive(Debug, Clone)]
pub struct InjectNavigationCommand {
    pub pages_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    Processed {
        source: PathBuf,
        project: String,
        output_dir: PathBuf,
        derivatives: Vec<String>,
    },
    Unsupported {
        source: PathBuf,
    },
    Failed {
        source: PathBuf,
        error: String,
    },
}

impl ProcessOutcome {
    pub fn source(&self) -> &std::path::Path {
        match self {
            Self::Processed { source, .. }
            | Self::Unsupported { source }
            | Self::Failed { source, .. } => source,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GalleryReport {
    pub scanned_images: usize,
    pub pages: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationReport {
    pub updated: usize,
    pub unchanged: usize,
    pub missing: Vec<String>,
    pub skipped: Vec<String>,
}
