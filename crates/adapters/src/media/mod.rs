mod images;
mod process;
mod video;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use folio_application::{ApplicationError, DerivativeGenerator, ImageDerivatives, MediaProbe};
use tracing::debug;

pub use video::VideoTools;

/// Image derivatives through the `image` crate, video derivatives through ffmpeg.
#[derive(Debug, Clone, Default)]
pub struct MediaDerivativeGenerator {
    video: VideoTools,
}

impl MediaDerivativeGenerator {
    pub fn new(video: VideoTools) -> Self {
        Self { video }
    }
}

impl DerivativeGenerator for MediaDerivativeGenerator {
    fn clear_outputs(&self, output_dir: &Path) -> Result<(), ApplicationError> {
        match fs::remove_dir_all(output_dir) {
            Ok(()) => {
                debug!(dir = %output_dir.display(), "removed previous outputs");
                Ok(())
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(ApplicationError::Io(format!(
                "cannot clear {}: {error}",
                output_dir.display()
            ))),
        }
    }

    fn generate_image_derivatives(
        &self,
        source: &Path,
        output_dir: &Path,
        base_name: &str,
    ) -> Result<ImageDerivatives, ApplicationError> {
        images::generate_image_derivatives(source, output_dir, base_name)
    }

    fn generate_video_derivatives(
        &self,
        source: &Path,
        output_dir: &Path,
        base_name: &str,
    ) -> Result<Vec<String>, ApplicationError> {
        self.video.generate(source, output_dir, base_name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FfprobeMediaProbe {
    video: VideoTools,
}

impl FfprobeMediaProbe {
    pub fn new(video: VideoTools) -> Self {
        Self { video }
    }
}

impl MediaProbe for FfprobeMediaProbe {
    fn probe(&self, source: &Path) -> Result<serde_json::Value, ApplicationError> {
        self.video.probe(source)
    }
}
