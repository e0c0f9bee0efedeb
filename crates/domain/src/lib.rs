mod classify;
mod derivative;
mod error;
mod gallery;
mod media;
mod metadata;
mod nav;
mod profile;

pub use classify::{classify, classify_project, classify_tags, ClassificationResult, KeywordRule, KeywordTable};
pub use derivative::{
    cover_plan, derivative_file_name, fit_inside, metadata_file_name, CoverPlan, DerivativeSpec,
    Fit, IMAGE_DERIVATIVES, IMAGE_EXTENSION, IMAGE_QUALITY, VIDEO_CODEC, VIDEO_CRF,
    VIDEO_EXTENSION, VIDEO_OPTIMIZED_NAME, VIDEO_PRESET, VIDEO_THUMBNAIL,
    VIDEO_THUMBNAIL_OFFSET_SECS,
};
pub use error::DomainError;
pub use gallery::{
    escape_html, gallery_file_name, group_by_project, render_project_gallery, title_case,
    title_from_filename, GalleryProject,
};
pub use media::{detect_media_kind, split_file_name, MediaKind, SourceFile};
pub use metadata::{MetadataRecord, SourceAttributes};
pub use nav::{inject_navigation, neighbors, render_navigation, Neighbors, NAV_MARKER};
pub use profile::{NavigationOrder, SiteProfile, UploadPolicy, SUPPORTED_PROFILE_VERSION};
