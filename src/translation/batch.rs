/*!
 * Batch translation processing.
 *
 * Blocks are submitted to the backend in fixed-size batches. The texts of a
 * batch are joined with the SRT block separator into one payload, and the
 * response is split back on blank lines and paired with the original blocks
 * by position. Batches run strictly one after another.
 */

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::app_config::{MismatchPolicy, TranslationConfig};
use crate::errors::TranslationError;
use crate::language_utils;
use crate::providers::Provider;
use crate::subtitle_processor::{SubtitleBlock, Track, BLOCK_SEPARATOR};

use super::throttle::{BackoffPolicy, ExponentialBackoff};

/// Default number of blocks per backend call
pub const DEFAULT_BATCH_SIZE: usize = 10;

// @const: One or more blank (or whitespace-only) lines
static SEGMENT_SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n[ \t]*(?:\n[ \t]*)+").expect("segment separator regex is valid")
});

/// Join the texts of a batch into a single backend payload
pub fn combine_batch(blocks: &[SubtitleBlock]) -> String {
    blocks
        .iter()
        .map(|block| block.text.as_str())
        .collect::<Vec<_>>()
        .join(BLOCK_SEPARATOR)
}

/// Split a backend response back into per-block segments
///
/// Segments are trimmed and empty ones dropped.
pub fn split_segments(response: &str) -> Vec<String> {
    let normalized = response.replace("\r\n", "\n");
    SEGMENT_SEPARATOR
        .split(&normalized)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Batch translator for subtitle tracks
#[derive(Debug)]
pub struct BatchTranslator {
    /// Backend handle, built once per run
    provider: Box<dyn Provider>,

    /// Pacing and retry policy
    backoff: Box<dyn BackoffPolicy>,

    /// Blocks per backend call
    batch_size: usize,

    /// Handling of segment-count mismatches
    mismatch_policy: MismatchPolicy,
}

impl BatchTranslator {
    /// Create a new batch translator with default batching
    pub fn new(provider: Box<dyn Provider>, backoff: Box<dyn BackoffPolicy>) -> Self {
        Self {
            provider,
            backoff,
            batch_size: DEFAULT_BATCH_SIZE,
            mismatch_policy: MismatchPolicy::default(),
        }
    }

    /// Create a translator configured from the translation section
    pub fn from_config(provider: Box<dyn Provider>, config: &TranslationConfig) -> Self {
        Self::new(provider, Box::new(ExponentialBackoff::from_config(&config.throttle)))
            .with_batch_size(config.batch_size)
            .with_mismatch_policy(config.mismatch_policy)
    }

    /// Set the number of blocks per batch (at least 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_mismatch_policy(mut self, policy: MismatchPolicy) -> Self {
        self.mismatch_policy = policy;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn provider(&self) -> &dyn Provider {
        self.provider.as_ref()
    }

    /// Number of batches a track of `blocks` blocks is split into
    pub fn batch_count(&self, blocks: usize) -> usize {
        blocks.div_ceil(self.batch_size)
    }

    /// Translate a track into `target_language`
    pub async fn translate_track(
        &self,
        track: &Track,
        target_language: &str,
    ) -> Result<Track, TranslationError> {
        self.translate_track_with_progress(track, target_language, |_, _| {}).await
    }

    /// Translate a track, reporting `(completed_batches, total_batches)`
    /// after every batch
    ///
    /// Every output block keeps the index and timing of its source block.
    /// Any backend failure aborts the whole track and nothing partial is
    /// returned.
    pub async fn translate_track_with_progress(
        &self,
        track: &Track,
        target_language: &str,
        progress_callback: impl Fn(usize, usize),
    ) -> Result<Track, TranslationError> {
        let source_language = track.language_code.as_str();
        if target_language.trim().is_empty() {
            return Err(TranslationError::InvalidRequest(
                "target language is empty".to_string(),
            ));
        }

        let right_to_left = language_utils::is_right_to_left(target_language);
        let total_batches = self.batch_count(track.len());
        let mut translated = Vec::with_capacity(track.len());

        for (batch_index, batch) in track.blocks.chunks(self.batch_size).enumerate() {
            if batch_index > 0 {
                let delay = self.backoff.inter_batch_delay();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            let batch_number = batch_index + 1;
            debug!(
                "Translating batch {}/{} ({} blocks) with {}",
                batch_number,
                total_batches,
                batch.len(),
                self.provider.name()
            );

            let payload = combine_batch(batch);
            let response = self
                .submit(&payload, source_language, target_language, batch_number)
                .await?;
            let segments = split_segments(&response);

            translated.extend(self.pair_segments(batch, segments, right_to_left, batch_number)?);
            progress_callback(batch_number, total_batches);
        }

        Ok(Track::with_blocks(
            track.source_path.clone(),
            target_language,
            translated,
        ))
    }

    /// Send one payload, retrying as long as the backoff policy allows
    async fn submit(
        &self,
        payload: &str,
        source_language: &str,
        target_language: &str,
        batch_number: usize,
    ) -> Result<String, TranslationError> {
        let mut attempt = 0u32;
        loop {
            match self
                .provider
                .translate(payload, source_language, target_language)
                .await
            {
                Ok(text) => return Ok(text),
                Err(e) => {
                    attempt += 1;
                    match self.backoff.retry_delay(attempt, &e) {
                        Some(delay) => {
                            warn!(
                                "Batch {} failed ({}), retrying in {:?} (attempt {})",
                                batch_number, e, delay, attempt
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => return Err(e.into()),
                    }
                }
            }
        }
    }

    /// Pair translated segments with their source blocks by position
    fn pair_segments(
        &self,
        batch: &[SubtitleBlock],
        segments: Vec<String>,
        right_to_left: bool,
        batch_number: usize,
    ) -> Result<Vec<SubtitleBlock>, TranslationError> {
        let expected = batch.len();
        let received = segments.len();

        if expected != received {
            match self.mismatch_policy {
                MismatchPolicy::Fail => {
                    return Err(TranslationError::SegmentCountMismatch {
                        batch: batch_number,
                        expected,
                        received,
                    });
                }
                MismatchPolicy::Truncate => warn!(
                    "Batch {} returned {} segments for {} blocks, keeping {}",
                    batch_number,
                    received,
                    expected,
                    expected.min(received)
                ),
                MismatchPolicy::KeepSource => warn!(
                    "Batch {} returned {} segments for {} blocks, keeping source text for the rest",
                    batch_number, received, expected
                ),
            }
        }

        let mut segments = segments.into_iter();
        let mut paired = Vec::with_capacity(expected);

        for block in batch {
            let text = match segments.next() {
                Some(segment) if right_to_left => language_utils::wrap_right_to_left(&segment),
                Some(segment) => segment,
                None if self.mismatch_policy == MismatchPolicy::KeepSource => block.text.clone(),
                None => break,
            };

            paired.push(SubtitleBlock {
                text,
                ..block.clone()
            });
        }

        Ok(paired)
    }
}
