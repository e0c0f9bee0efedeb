mod error;
mod intake;
mod ports;
mod service;
mod use_cases;

pub use error::ApplicationError;
pub use intake::{IntakeItem, IntakeQueue, Offer, QueueState};
pub use ports::{
    Clock, DerivativeGenerator, FileScanSummary, FileScanner, ImageDerivatives, IntakeHandler,
    MediaProbe, MetadataStore, PageStore, ScannedFile, SourceArchive,
};
pub use service::{ApplicationService, IntakeJob};
pub use use_cases::{
    BuildGalleriesCommand, ClassifyNameCommand, GalleryReport, InjectNavigationCommand,
    KeywordTableChoice, NavigationReport, ProcessOutcome, ProcessSourceCommand,
    ScanFolderCommand,
};
