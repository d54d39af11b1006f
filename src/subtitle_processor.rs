use std::fmt;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context};
use log::{debug, warn};

use crate::errors::SubtitleError;
use crate::file_utils::FileManager;

// @module: Subtitle data model and SRT rendering

// @const: SRT or WebVTT timestamp regex, hours optional
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:([0-9]{1,2}):)?([0-9]{2}):([0-9]{2})[,.]([0-9]{3})$").expect("timestamp regex is valid")
});

/// Block separator in the SRT wire format
pub const BLOCK_SEPARATOR: &str = "\n\n";

// @struct: Single cleaned subtitle block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleBlock {
    // @field: 1-based sequence number
    pub index: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Display lines joined by '\n'
    pub text: String,
}

impl SubtitleBlock {
    /// Creates a new subtitle block
    pub fn new(index: usize, start_time_ms: u64, end_time_ms: u64, text: impl Into<String>) -> Self {
        SubtitleBlock {
            index,
            start_time_ms,
            end_time_ms,
            text: text.into(),
        }
    }

    /// Parse a `[HH:]MM:SS,mmm` timestamp (a '.' millisecond separator is
    /// accepted too, as written by WebVTT) into milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, SubtitleError> {
        let invalid = || SubtitleError::InvalidTimestamp(timestamp.to_string());
        let caps = TIMESTAMP_REGEX.captures(timestamp.trim()).ok_or_else(invalid)?;

        let field = |i: usize| -> u64 {
            caps.get(i)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0)
        };
        let (hours, minutes, seconds, millis) = (field(1), field(2), field(3), field(4));

        if minutes >= 60 || seconds >= 60 {
            return Err(invalid());
        }

        Ok(hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// The SRT timing line for this block
    pub fn timing_line(&self) -> String {
        format!("{} --> {}", self.format_start_time(), self.format_end_time())
    }
}

impl fmt::Display for SubtitleBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.index)?;
        writeln!(f, "{}", self.timing_line())?;
        write!(f, "{}", self.text)
    }
}

/// An ordered subtitle track with its language metadata
#[derive(Debug, Clone)]
pub struct Track {
    /// File the track was read from
    pub source_path: PathBuf,

    /// ISO 639-1 language code of the text
    pub language_code: String,

    /// Blocks in playback order
    pub blocks: Vec<SubtitleBlock>,
}

impl Track {
    /// Create an empty track
    pub fn new(source_path: impl Into<PathBuf>, language_code: impl Into<String>) -> Self {
        Track {
            source_path: source_path.into(),
            language_code: language_code.into(),
            blocks: Vec::new(),
        }
    }

    /// Create a track from existing blocks
    pub fn with_blocks(
        source_path: impl Into<PathBuf>,
        language_code: impl Into<String>,
        blocks: Vec<SubtitleBlock>,
    ) -> Self {
        let mut track = Self::new(source_path, language_code);
        track.blocks = blocks;
        track
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Check the track-level invariants: contiguous 1-based indices,
    /// ordered start times and non-inverted ranges
    pub fn is_well_formed(&self) -> bool {
        let indices_ok = self.blocks.iter().enumerate().all(|(i, b)| b.index == i + 1);
        let ranges_ok = self.blocks.iter().all(|b| b.start_time_ms <= b.end_time_ms);
        let order_ok = self.blocks.windows(2).all(|w| w[0].start_time_ms <= w[1].start_time_ms);
        indices_ok && ranges_ok && order_ok
    }

    /// Render the track as an SRT document
    ///
    /// Blocks are joined by a single blank line and the document ends with
    /// one trailing newline.
    pub fn to_srt_string(&self) -> String {
        if self.blocks.is_empty() {
            return String::new();
        }

        let mut out = self
            .blocks
            .iter()
            .map(|block| block.to_string())
            .collect::<Vec<_>>()
            .join(BLOCK_SEPARATOR);
        out.push('\n');
        out
    }

    /// Write the track to an SRT file, replacing it atomically
    pub fn write_to_srt<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if self.blocks.is_empty() {
            warn!("Writing empty subtitle track to {}", path.display());
        }

        FileManager::write_atomic(path, &self.to_srt_string())
            .with_context(|| format!("Failed to write subtitle file: {}", path.display()))?;

        debug!("Wrote {} blocks to {}", self.blocks.len(), path.display());
        Ok(())
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Track")?;
        writeln!(f, "Source: {:?}", self.source_path)?;
        writeln!(f, "Language: {}", self.language_code)?;
        writeln!(f, "Blocks: {}", self.blocks.len())?;
        Ok(())
    }
}
