/*!
 * Common test utilities for the subtidy test suite
 */

use anyhow::Result;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use subtidy::app_config::Config;
use subtidy::app_controller::Controller;
use subtidy::errors::ConversionError;
use subtidy::normalizer::{FormatNormalizer, SubtitleConverter};
use subtidy::providers::mock::MockProvider;
use subtidy::translation::{BatchTranslator, NoDelay};

/// Rolling auto-captions as downloaded: the same line repeated across
/// abutting cues, with positioning annotations
pub const ROLLING_VTT: &str = "WEBVTT
Kind: captions
Language: en

00:00:01.000 --> 00:00:02.000 align:start position:0%
Hi

00:00:02.000 --> 00:00:03.000 align:start position:0%
Hi

00:00:03.000 --> 00:00:04.000 align:start position:0%
Bye
";

/// The cleaned form of [`ROLLING_VTT`]
pub const CLEANED_SRT: &str = "1
00:00:01,000 --> 00:00:03,000
Hi

2
00:00:03,000 --> 00:00:04,000
Bye
";

/// Three distinct blocks
pub const THREE_BLOCK_SRT: &str = "1
00:00:01,000 --> 00:00:04,000
This is a test subtitle.

2
00:00:05,000 --> 00:00:09,000
It contains multiple entries.

3
00:00:10,000 --> 00:00:14,000
For testing purposes.
";

/// Route library logs through the test harness output capture
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Converter that copies the source file unchanged; the parser reads
/// WebVTT directly, so this stands in for ffmpeg
#[derive(Debug, Clone, Default)]
pub struct CopyConverter {
    calls: Arc<AtomicUsize>,
}

impl CopyConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubtitleConverter for CopyConverter {
    async fn convert(&self, source: &Path, destination: &Path) -> Result<(), ConversionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::fs::copy(source, destination).await?;
        Ok(())
    }
}

/// Converter that always exits unsuccessfully
#[derive(Debug, Clone, Default)]
pub struct FailingConverter;

#[async_trait]
impl SubtitleConverter for FailingConverter {
    async fn convert(&self, source: &Path, _destination: &Path) -> Result<(), ConversionError> {
        Err(ConversionError::Failed {
            status: "exit status: 1".to_string(),
            stderr: format!("{}: Invalid data found when processing input", source.display()),
        })
    }
}

/// Configuration translating English into the given target
pub fn translating_config(target_language: &str, batch_size: usize) -> Config {
    let mut config = Config::default();
    config.translate = true;
    config.target_language = target_language.to_string();
    config.translation.batch_size = batch_size;
    config
}

/// Controller wired to a copying converter and the given mock backend
pub fn controller_with_mock(config: Config, provider: &MockProvider) -> Controller {
    init_test_logging();
    let translator = BatchTranslator::new(Box::new(provider.clone()), Box::new(NoDelay))
        .with_batch_size(config.translation.batch_size)
        .with_mismatch_policy(config.translation.mismatch_policy);
    let normalizer = FormatNormalizer::new(Box::new(CopyConverter::new()));
    Controller::with_components(config, normalizer, Some(translator))
}
