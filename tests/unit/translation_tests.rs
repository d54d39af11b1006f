/*!
 * Tests for batched translation
 */

use std::path::Path;
use std::time::Duration;

use subtidy::app_config::{MismatchPolicy, TranslationConfig};
use subtidy::dedup;
use subtidy::errors::{ProviderError, TranslationError};
use subtidy::language_utils::{POP_DIRECTIONAL_FORMATTING, RTL_EMBEDDING};
use subtidy::providers::mock::MockProvider;
use subtidy::subtitle_processor::Track;
use subtidy::translation::{BackoffPolicy, BatchTranslator, ExponentialBackoff, NoDelay};
use crate::common;

fn three_block_track() -> Track {
    let (track, _) = dedup::clean_document(common::THREE_BLOCK_SRT, Path::new("talk.en.srt"), "en").unwrap();
    track
}

fn translator(provider: &MockProvider, batch_size: usize) -> BatchTranslator {
    BatchTranslator::new(Box::new(provider.clone()), Box::new(NoDelay)).with_batch_size(batch_size)
}

#[tokio::test]
async fn test_translate_track_withBatchSizeTwo_shouldTranslateAllBlocks() {
    let provider = MockProvider::working();
    let source = three_block_track();

    let translated = translator(&provider, 2).translate_track(&source, "fr").await.unwrap();

    let requests = provider.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].text, "This is a test subtitle.\n\nIt contains multiple entries.");
    assert_eq!(requests[1].text, "For testing purposes.");
    assert_eq!(requests[0].source_language, "en");
    assert_eq!(requests[0].target_language, "fr");

    assert_eq!(translated.len(), 3);
    for (original, output) in source.blocks.iter().zip(&translated.blocks) {
        assert_eq!(output.index, original.index);
        assert_eq!(output.start_time_ms, original.start_time_ms);
        assert_eq!(output.end_time_ms, original.end_time_ms);
        assert_eq!(output.text, format!("[fr] {}", original.text));
    }
    assert!(translated.is_well_formed());
}

#[tokio::test]
async fn test_translate_track_withArabicTarget_shouldWrapEverySegment() {
    let provider = MockProvider::working();
    let translated = translator(&provider, 10).translate_track(&three_block_track(), "ar").await.unwrap();

    for block in &translated.blocks {
        assert!(block.text.starts_with(RTL_EMBEDDING));
        assert!(block.text.ends_with(POP_DIRECTIONAL_FORMATTING));
    }
}

#[tokio::test]
async fn test_translate_track_withLeftToRightTarget_shouldNotWrap() {
    let provider = MockProvider::working();
    let translated = translator(&provider, 10).translate_track(&three_block_track(), "es").await.unwrap();

    assert!(translated
        .blocks
        .iter()
        .all(|b| !b.text.contains(RTL_EMBEDDING) && !b.text.contains(POP_DIRECTIONAL_FORMATTING)));
}

#[tokio::test]
async fn test_translate_track_withFailureOnSecondBatch_shouldAbort() {
    let provider = MockProvider::failing_on_call(2);
    let result = translator(&provider, 1).translate_track(&three_block_track(), "fr").await;

    assert!(matches!(
        result,
        Err(TranslationError::Provider(ProviderError::RequestFailed(_)))
    ));
    assert_eq!(provider.request_count(), 2, "no batch may be sent after a failure");
}

#[tokio::test]
async fn test_translate_track_withTruncatePolicy_shouldDropUnpairedBlocks() {
    let provider = MockProvider::merging();
    let translated = translator(&provider, 3)
        .with_mismatch_policy(MismatchPolicy::Truncate)
        .translate_track(&three_block_track(), "fr")
        .await
        .unwrap();

    assert_eq!(translated.len(), 2);
    assert_eq!(translated.blocks[0].text, "[fr] This is a test subtitle.");
    assert_eq!(translated.blocks[1].index, 2);
}

#[tokio::test]
async fn test_translate_track_withEmptyTrack_shouldNotCallBackend() {
    let provider = MockProvider::working();
    let translated = translator(&provider, 10)
        .translate_track(&Track::new("x.en.srt", "en"), "fr")
        .await
        .unwrap();

    assert!(translated.is_empty());
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_translate_track_shouldReportProgressPerBatch() {
    let provider = MockProvider::working();
    let progress = std::sync::Mutex::new(Vec::new());

    translator(&provider, 2)
        .translate_track_with_progress(&three_block_track(), "fr", |done, total| {
            progress.lock().unwrap().push((done, total));
        })
        .await
        .unwrap();

    assert_eq!(progress.into_inner().unwrap(), vec![(1, 2), (2, 2)]);
}

#[tokio::test]
async fn test_translate_track_withRateLimitBeyondRetries_shouldFail() {
    let provider = MockProvider::rate_limited(5);
    let translator = BatchTranslator::new(Box::new(provider.clone()), Box::new(ExponentialBackoff::immediate(2)));

    let result = translator.translate_track(&three_block_track(), "fr").await;

    assert!(matches!(
        result,
        Err(TranslationError::Provider(ProviderError::RateLimitExceeded(_)))
    ));
    assert_eq!(provider.request_count(), 3);
}

#[test]
fn test_from_config_shouldApplyBatchSettings() {
    let mut config = TranslationConfig::default();
    config.batch_size = 4;
    let translator = BatchTranslator::from_config(Box::new(MockProvider::working()), &config);
    assert_eq!(translator.batch_size(), 4);
    assert_eq!(translator.provider().name(), "mock");
}

#[test]
fn test_exponential_backoff_from_config_shouldUseMilliseconds() {
    let config = TranslationConfig::default();
    let policy = ExponentialBackoff::from_config(&config.throttle);
    let error = ProviderError::ConnectionError("reset".to_string());
    assert_eq!(policy.inter_batch_delay(), Duration::from_millis(500));
    assert_eq!(policy.retry_delay(1, &error), Some(Duration::from_millis(1_000)));
    assert_eq!(policy.retry_delay(2, &error), Some(Duration::from_millis(2_000)));
    assert_eq!(policy.retry_delay(3, &error), None);
}
