use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use folio_application::ApplicationError;
use folio_domain::{
    derivative_file_name, IMAGE_EXTENSION, VIDEO_CODEC, VIDEO_CRF, VIDEO_EXTENSION,
    VIDEO_OPTIMIZED_NAME, VIDEO_PRESET, VIDEO_THUMBNAIL, VIDEO_THUMBNAIL_OFFSET_SECS,
};

use tokio::process::Command;

use super::process::run_tool;

/// Locations of the external video tools.
#[derive(Debug, Clone)]
pub struct VideoTools {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub timeout: Option<Duration>,
}

impl Default for VideoTools {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            timeout: None,
        }
    }
}

impl VideoTools {
    pub(crate) fn generate(
        &self,
        source: &Path,
        output_dir: &Path,
        base_name: &str,
    ) -> Result<Vec<String>, ApplicationError> {
        fs::create_dir_all(output_dir).map_err(|error| ApplicationError::Io(error.to_string()))?;

        let thumbnail = derivative_file_name(base_name, VIDEO_THUMBNAIL.name, IMAGE_EXTENSION);
        self.ffmpeg(thumbnail_args(source, &output_dir.join(&thumbnail)))?;

        let optimized = derivative_file_name(base_name, VIDEO_OPTIMIZED_NAME, VIDEO_EXTENSION);
        self.ffmpeg(transcode_args(source, &output_dir.join(&optimized)))?;

        Ok(vec![thumbnail, optimized])
    }

    pub(crate) fn probe(&self, source: &Path) -> Result<serde_json::Value, ApplicationError> {
        let mut command = Command::new(&self.ffprobe);
        command
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(source);
        let output = run_tool(command, self.timeout)?;
        serde_json::from_slice(&output.stdout)
            .map_err(|error| ApplicationError::Decode(format!("ffprobe output: {error}")))
    }

    fn ffmpeg(&self, args: Vec<OsString>) -> Result<(), ApplicationError> {
        let mut command = Command::new(&self.ffmpeg);
        command.args(args);
        run_tool(command, self.timeout).map(|_| ())
    }
}

fn thumbnail_args(source: &Path, output: &Path) -> Vec<OsString> {
    let (width, height) = (VIDEO_THUMBNAIL.width, VIDEO_THUMBNAIL.height);
    let filter = format!(
        "scale={width}:{height}:force_original_aspect_ratio=increase,crop={width}:{height}"
    );
    let mut args = common_args();
    args.extend([
        "-ss".into(),
        VIDEO_THUMBNAIL_OFFSET_SECS.to_string().into(),
        "-i".into(),
        source.as_os_str().to_owned(),
        "-frames:v".into(),
        "1".into(),
        "-vf".into(),
        filter.into(),
        output.as_os_str().to_owned(),
    ]);
    args
}

fn transcode_args(source: &Path, output: &Path) -> Vec<OsString> {
    let mut args = common_args();
    args.extend([
        "-i".into(),
        source.as_os_str().to_owned(),
        "-c:v".into(),
        VIDEO_CODEC.into(),
        "-crf".into(),
        VIDEO_CRF.to_string().into(),
        "-preset".into(),
        VIDEO_PRESET.into(),
        "-c:a".into(),
        "aac".into(),
        "-movflags".into(),
        "+faststart".into(),
        output.as_os_str().to_owned(),
    ]);
    args
}

fn common_args() -> Vec<OsString> {
    vec![
        "-hide_banner".into(),
        "-loglevel".into(),
        "error".into(),
        "-y".into(),
    ]
}
