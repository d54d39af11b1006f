use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::dedup::{self, DedupStats};
use crate::errors::AppError;
use crate::file_utils::{FileManager, SubtitleFormat};
use crate::language_utils;
use crate::normalizer::{FfmpegConverter, FormatNormalizer};
use crate::providers;
use crate::subtitle_processor::Track;
use crate::translation::BatchTranslator;

// @module: Application controller for subtitle processing

/// One track handed over for processing
#[derive(Debug, Clone, PartialEq)]
pub struct TrackRequest {
    // @field: Downloaded subtitle file (.vtt or .srt)
    pub path: PathBuf,

    // @field: Track language, inferred from the filename when absent
    pub source_language: Option<String>,

    // @field: Whether to run the translation stage
    pub translate: bool,

    // @field: Translation target, required when translating
    pub target_language: Option<String>,
}

impl TrackRequest {
    /// Request that only normalizes and cleans `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source_language: None,
            translate: false,
            target_language: None,
        }
    }

    pub fn with_source_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = Some(language.into());
        self
    }

    /// Also translate the cleaned track into `target_language`
    pub fn with_translation(mut self, target_language: impl Into<String>) -> Self {
        self.translate = true;
        self.target_language = Some(target_language.into());
        self
    }
}

/// What happened to the translation stage of a track
#[derive(Debug, Clone, PartialEq)]
pub enum TranslationStatus {
    /// Translation was not requested
    NotRequested,
    /// Translated file written to the given path
    Translated(PathBuf),
    /// Translated file already existed and overwriting was not forced
    AlreadyExists(PathBuf),
    /// Stage aborted; the cleaned file is kept
    Failed(String),
}

/// Result of processing one track
#[derive(Debug, Clone, PartialEq)]
pub struct TrackOutcome {
    // @field: The requested input file
    pub source_path: PathBuf,

    // @field: Cleaned SRT file, `None` when conversion failed
    pub cleaned_path: Option<PathBuf>,

    // @field: Whether a timed-text file was converted to SRT
    pub converted: bool,

    // @field: Deduplication counters for the cleaned track
    pub stats: Option<DedupStats>,

    // @field: Translation stage result
    pub translation: TranslationStatus,
}

impl TrackOutcome {
    fn new(source_path: &Path) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            cleaned_path: None,
            converted: false,
            stats: None,
            translation: TranslationStatus::NotRequested,
        }
    }

    pub fn is_cleaned(&self) -> bool {
        self.cleaned_path.is_some()
    }

    pub fn translated_path(&self) -> Option<&Path> {
        match &self.translation {
            TranslationStatus::Translated(path) => Some(path),
            _ => None,
        }
    }
}

/// Counters for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub converted: usize,
    pub cleaned: usize,
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &TrackOutcome) {
        self.processed += 1;
        if outcome.converted {
            self.converted += 1;
        }
        if outcome.is_cleaned() {
            self.cleaned += 1;
        } else if outcome.translation == TranslationStatus::NotRequested {
            self.failed += 1;
        }
        match outcome.translation {
            TranslationStatus::Translated(_) => self.translated += 1,
            TranslationStatus::AlreadyExists(_) => self.skipped += 1,
            TranslationStatus::Failed(_) => self.failed += 1,
            TranslationStatus::NotRequested => {}
        }
    }

    fn record_failure(&mut self) {
        self.processed += 1;
        self.failed += 1;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed, {} converted, {} cleaned, {} translated, {} skipped, {} failed",
            self.processed, self.converted, self.cleaned, self.translated, self.skipped, self.failed
        )
    }
}

/// Main application controller for subtitle processing
#[derive(Debug)]
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: VTT to SRT stage
    normalizer: FormatNormalizer,

    // @field: Translation stage, built once per run
    translator: Option<BatchTranslator>,

    // @field: Overwrite existing translated files
    force_overwrite: bool,

    // @field: Draw batch progress bars
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let normalizer = FormatNormalizer::new(Box::new(FfmpegConverter::from_config(&config.converter)));

        let translator = if config.translate {
            let provider = providers::from_config(&config.translation)?;
            Some(BatchTranslator::from_config(provider, &config.translation))
        } else {
            None
        };

        Ok(Self::with_components(config, normalizer, translator).with_progress(true))
    }

    /// Create a controller from explicit stage implementations
    pub fn with_components(
        config: Config,
        normalizer: FormatNormalizer,
        translator: Option<BatchTranslator>,
    ) -> Self {
        Self {
            config,
            normalizer,
            translator,
            force_overwrite: false,
            show_progress: false,
        }
    }

    pub fn with_force_overwrite(mut self, force_overwrite: bool) -> Self {
        self.force_overwrite = force_overwrite;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the request the configuration implies for `path`
    pub fn request_for(&self, path: &Path) -> TrackRequest {
        let request = TrackRequest::new(path);
        if self.config.translate {
            request.with_translation(self.config.target_language.clone())
        } else {
            request
        }
    }

    /// Normalize, clean and optionally translate one track
    ///
    /// A conversion failure is reported in the outcome with no cleaned file.
    /// A malformed track is an error for this file only. A translation
    /// failure is reported in the outcome and leaves the cleaned file in
    /// place.
    pub async fn process_track(&self, request: &TrackRequest) -> Result<TrackOutcome, AppError> {
        let input = request.path.as_path();
        if !FileManager::file_exists(input) {
            return Err(AppError::File(format!("Input file does not exist: {}", input.display())));
        }

        let source_language = request
            .source_language
            .clone()
            .or_else(|| FileManager::language_from_filename(input))
            .unwrap_or_else(|| self.config.source_language.clone());
        let mut outcome = TrackOutcome::new(input);

        let Some(cleaned_path) = self.normalizer.normalize(input).await else {
            return Ok(outcome);
        };
        outcome.converted = cleaned_path != input;

        let content = FileManager::read_to_string(&cleaned_path)
            .map_err(|e| AppError::File(format!("{:#}", e)))?;
        let (track, stats) = dedup::clean_document(&content, &cleaned_path, &source_language)?;
        track
            .write_to_srt(&cleaned_path)
            .map_err(|e| AppError::File(format!("{:#}", e)))?;

        info!(
            "Cleaned subtitles written to: {} ({} cues -> {} blocks)",
            cleaned_path.display(),
            stats.cues_in,
            stats.blocks_out
        );
        outcome.cleaned_path = Some(cleaned_path.clone());
        outcome.stats = Some(stats);

        if request.translate {
            outcome.translation = match request.target_language.as_deref() {
                Some(target) if !target.trim().is_empty() => {
                    match self.existing_translation(&cleaned_path, &source_language, target) {
                        Some(existing) => {
                            warn!(
                                "Not translating {}, translation already exists at {} (use --force-overwrite to replace it)",
                                input.display(),
                                existing.display()
                            );
                            TranslationStatus::AlreadyExists(existing)
                        }
                        None => self.translate_cleaned(&track, &cleaned_path, target).await,
                    }
                }
                _ => {
                    error!("Translation requested for {} without a target language", input.display());
                    TranslationStatus::Failed("no target language".to_string())
                }
            };
        }

        Ok(outcome)
    }

    /// Path of an already translated output for this request, when it must
    /// not be overwritten
    fn existing_translation(&self, cleaned_path: &Path, source_language: &str, target: &str) -> Option<PathBuf> {
        if self.force_overwrite {
            return None;
        }
        let output = FileManager::translated_output_path(cleaned_path, source_language, target);
        FileManager::file_exists(&output).then_some(output)
    }

    async fn translate_cleaned(&self, track: &Track, cleaned_path: &Path, target: &str) -> TranslationStatus {
        let Some(translator) = &self.translator else {
            error!("Translation requested but no translation backend is configured");
            return TranslationStatus::Failed("no translation backend configured".to_string());
        };

        if language_utils::language_codes_match(&track.language_code, target) {
            warn!("Source and target language are both '{}', not translating", target);
            return TranslationStatus::Failed(format!("target language '{}' equals the source", target));
        }

        let output_path = FileManager::translated_output_path(cleaned_path, &track.language_code, target);
        let start_time = Instant::now();

        info!(
            "Translating {} blocks {} -> {} with {}",
            track.len(),
            track.language_code,
            target,
            translator.provider().name()
        );

        let progress_bar = self.progress_bar(translator.batch_count(track.len()) as u64);
        let pb = progress_bar.clone();
        let result = translator
            .translate_track_with_progress(track, target, move |completed, _total| {
                pb.set_position(completed as u64);
            })
            .await;
        progress_bar.finish_and_clear();

        let translated = match result {
            Ok(translated) => translated,
            Err(e) => {
                error!("Translation of {} failed: {}", cleaned_path.display(), e);
                return TranslationStatus::Failed(e.to_string());
            }
        };

        if let Err(e) = translated.write_to_srt(&output_path) {
            error!("Failed to write translated subtitles: {:#}", e);
            return TranslationStatus::Failed(format!("{:#}", e));
        }

        info!(
            "Translated subtitles written to: {} in {}",
            output_path.display(),
            Self::format_duration(start_time.elapsed())
        );
        TranslationStatus::Translated(output_path)
    }

    fn progress_bar(&self, batches: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(batches);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} batches ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");
        progress_bar
    }

    /// Expand files and directories into the subtitle files to process
    ///
    /// Inside directories, an SRT file is left out when a VTT file with the
    /// same stem sits next to it (it is regenerated from the VTT), and so are
    /// files already carrying the target language when translating.
    pub fn collect_inputs(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for input in inputs {
            if input.is_dir() {
                let found = FileManager::find_subtitle_files(input)?;
                files.extend(found.into_iter().filter(|path| self.is_primary_input(path)));
            } else if input.is_file() {
                files.push(input.clone());
            } else {
                warn!("Skipping {}: no such file or directory", input.display());
            }
        }

        debug!("Collected {} subtitle files", files.len());
        Ok(files)
    }

    fn is_primary_input(&self, path: &Path) -> bool {
        if SubtitleFormat::from_path(path) == Some(SubtitleFormat::Srt)
            && path.with_extension(SubtitleFormat::Vtt.extension()).is_file()
        {
            return false;
        }

        if self.config.translate {
            if let Some(language) = FileManager::language_from_filename(path) {
                return !language_utils::language_codes_match(&language, &self.config.target_language);
            }
        }

        true
    }

    /// Process every subtitle file under `inputs`, one at a time
    ///
    /// Failures are logged per file and never stop the run.
    pub async fn run(&self, inputs: &[PathBuf]) -> Result<RunSummary> {
        let start_time = Instant::now();
        let files = self.collect_inputs(inputs)?;

        if files.is_empty() {
            warn!("No subtitle files found");
        } else if self.config.translate {
            self.check_backend().await;
        }

        let mut summary = RunSummary::default();
        for file in &files {
            let request = self.request_for(file);
            match self.process_track(&request).await {
                Ok(outcome) => summary.record(&outcome),
                Err(e) => {
                    error!("Failed to process {}: {}", file.display(), e);
                    summary.record_failure();
                }
            }
        }

        info!("{} - Duration: {}", summary, Self::format_duration(start_time.elapsed()));
        Ok(summary)
    }

    // Reachability check before the first batch; failures only warn
    async fn check_backend(&self) {
        let Some(translator) = &self.translator else {
            return;
        };
        match translator.provider().test_connection().await {
            Ok(()) => debug!("Translation backend '{}' is reachable", translator.provider().name()),
            Err(e) => warn!(
                "Translation backend '{}' did not answer the connection check: {}",
                translator.provider().name(),
                e
            ),
        }
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
