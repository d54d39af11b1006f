use anyhow::{Result, Context, anyhow};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::language_utils;

// @module: File and directory utilities

/// Subtitle container formats the pipeline understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    /// WebVTT, needs conversion before cleaning
    Vtt,
    /// SubRip, the canonical output format
    Srt,
}

impl SubtitleFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "vtt" => Some(Self::Vtt),
            "srt" => Some(Self::Srt),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Vtt => "vtt",
            Self::Srt => "srt",
        }
    }
}

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Write a string to a file through a temporary sibling and rename it
    /// into place, so readers never observe a half-written file
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir(&dir)?;

        let mut temp = NamedTempFile::new_in(&dir)
            .with_context(|| format!("Failed to create temporary file in {:?}", dir))?;
        temp.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write temporary file for {:?}", path))?;
        temp.persist(path)
            .map_err(|e| anyhow!("Failed to move temporary file to {:?}: {}", path, e.error))?;

        Ok(())
    }

    /// Recursively find VTT and SRT files under a directory, sorted by path
    pub fn find_subtitle_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && SubtitleFormat::from_path(path).is_some() {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Path of the SRT file produced from a timed-text file: the final
    /// extension is replaced by `.srt`
    pub fn srt_path_for<P: AsRef<Path>>(path: P) -> PathBuf {
        path.as_ref().with_extension(SubtitleFormat::Srt.extension())
    }

    /// The language segment of a `name.<lang>.<ext>` filename as an ISO
    /// 639-1 code
    ///
    /// Three-letter segments count only when the language also has a
    /// two-letter code, so title words like `The` are not read as languages.
    pub fn language_from_filename<P: AsRef<Path>>(path: P) -> Option<String> {
        let stem = path.as_ref().file_stem()?.to_string_lossy().to_string();
        let (_, segment) = stem.rsplit_once('.')?;
        language_utils::to_part1(segment)
    }

    // @generates: Output path for a translated subtitle
    // @params: cleaned_file, source_language, target_language
    ///
    /// When the stem ends with `.<source_language>` that segment is replaced,
    /// otherwise `.<target_language>` is inserted before the extension. The
    /// result never equals `cleaned_file` as long as the languages differ.
    pub fn translated_output_path<P: AsRef<Path>>(
        cleaned_file: P,
        source_language: &str,
        target_language: &str,
    ) -> PathBuf {
        let cleaned_file = cleaned_file.as_ref();
        let stem = cleaned_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = cleaned_file
            .extension()
            .map(|e| e.to_string_lossy().to_string())
            .unwrap_or_else(|| SubtitleFormat::Srt.extension().to_string());

        let base = match stem.rsplit_once('.') {
            Some((base, segment)) if language_utils::language_codes_match(segment, source_language)
                || segment.eq_ignore_ascii_case(source_language) =>
            {
                base.to_string()
            }
            _ => stem,
        };

        let output_filename = format!("{}.{}.{}", base, target_language, extension);
        cleaned_file.with_file_name(output_filename)
    }
}
