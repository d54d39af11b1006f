/*!
 * Format normalization: timed-text tracks to SRT.
 *
 * The actual codec conversion is delegated to an external converter
 * (ffmpeg by default). This module owns destination naming and turns
 * converter failures into a logged "no result".
 */

use async_trait::async_trait;
use log::{debug, error, info};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

use crate::app_config::ConverterConfig;
use crate::errors::ConversionError;
use crate::file_utils::{FileManager, SubtitleFormat};

/// External tool able to transcode a subtitle file into SRT
#[async_trait]
pub trait SubtitleConverter: Send + Sync + Debug {
    /// Convert `source` into an SRT file at `destination`
    async fn convert(&self, source: &Path, destination: &Path) -> Result<(), ConversionError>;
}

/// Converter backed by the ffmpeg command line tool
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    /// ffmpeg executable name or path
    binary: PathBuf,
    /// Maximum time a single conversion may take
    timeout: Duration,
}

impl FfmpegConverter {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(&config.ffmpeg_path, Duration::from_secs(config.timeout_secs))
    }

    /// Filter ffmpeg stderr down to the lines that describe the failure,
    /// dropping the version banner and stream metadata
    fn filter_ffmpeg_stderr(stderr: &str) -> String {
        let noise_prefixes = [
            "ffmpeg version",
            "built with",
            "configuration:",
            "lib",
            "Input #",
            "Metadata:",
            "Duration:",
            "Stream #",
            "Output #",
            "Stream mapping:",
            "Press [q]",
            "size=",
        ];

        let meaningful: Vec<&str> = stderr
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !noise_prefixes.iter().any(|p| line.starts_with(p)))
            .collect();

        if meaningful.is_empty() {
            "unknown ffmpeg error (stderr was empty after filtering)".to_string()
        } else {
            meaningful.join("\n")
        }
    }
}

impl Default for FfmpegConverter {
    fn default() -> Self {
        Self::from_config(&ConverterConfig::default())
    }
}

#[async_trait]
impl SubtitleConverter for FfmpegConverter {
    async fn convert(&self, source: &Path, destination: &Path) -> Result<(), ConversionError> {
        let ffmpeg_future = Command::new(&self.binary)
            .arg("-y")
            .arg("-i")
            .arg(source)
            .arg(destination)
            .kill_on_drop(true)
            .output();

        let output = tokio::select! {
            result = ffmpeg_future => result?,
            _ = tokio::time::sleep(self.timeout) => {
                return Err(ConversionError::Timeout(self.timeout.as_secs()));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConversionError::Failed {
                status: output.status.to_string(),
                stderr: Self::filter_ffmpeg_stderr(&stderr),
            });
        }

        Ok(())
    }
}

/// Turns any supported subtitle file into an SRT file path
#[derive(Debug)]
pub struct FormatNormalizer {
    converter: Box<dyn SubtitleConverter>,
}

impl FormatNormalizer {
    pub fn new(converter: Box<dyn SubtitleConverter>) -> Self {
        Self { converter }
    }

    /// Produce the SRT path for `path`, converting when needed
    ///
    /// SRT input is returned as-is. VTT input is converted next to the
    /// source with its extension replaced. The source file is never removed.
    pub async fn try_normalize(&self, path: &Path) -> Result<PathBuf, ConversionError> {
        match SubtitleFormat::from_path(path) {
            Some(SubtitleFormat::Srt) => Ok(path.to_path_buf()),
            Some(SubtitleFormat::Vtt) => {
                let destination = FileManager::srt_path_for(path);
                debug!("Converting {} -> {}", path.display(), destination.display());
                self.converter.convert(path, &destination).await?;
                info!("Converted subtitles to: {}", destination.display());
                Ok(destination)
            }
            None => Err(ConversionError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Like [`try_normalize`](Self::try_normalize) but logs failures and
    /// returns `None`, so the caller can skip the remaining stages
    pub async fn normalize(&self, path: &Path) -> Option<PathBuf> {
        match self.try_normalize(path).await {
            Ok(srt) => Some(srt),
            Err(e) => {
                error!("Error converting {} to srt: {}", path.display(), e);
                None
            }
        }
    }
}
