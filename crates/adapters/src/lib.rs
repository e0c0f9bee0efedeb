pub mod fs;
pub mod intake;
pub mod media;
pub mod presenters;

pub use fs::{
    FsPageStore, FsSourceArchive, JsonMetadataStore, PollingDirectoryWatcher, SystemClock,
    WalkdirFileScanner, WatchEvent, WatchEventKind, WatchHandle,
};
pub use intake::BackgroundIntakeWorker;
pub use media::{FfprobeMediaProbe, MediaDerivativeGenerator, VideoTools};
pub use presenters::{
    present_classification, present_gallery_report, present_navigation_report, present_outcome,
};
