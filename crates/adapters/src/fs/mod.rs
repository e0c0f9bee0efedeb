mod archive;
mod clock;
mod metadata;
mod pages;
mod scanner;
mod watcher;

pub use archive::FsSourceArchive;
pub use clock::SystemClock;
pub use metadata::JsonMetadataStore;
pub use pages::FsPageStore;
pub use scanner::WalkdirFileScanner;
pub use watcher::{PollingDirectoryWatcher, WatchEvent, WatchEventKind, WatchHandle};
