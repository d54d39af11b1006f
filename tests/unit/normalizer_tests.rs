/*!
 * Tests for the VTT to SRT format normalizer
 */

use anyhow::Result;
use std::path::Path;
use std::time::Duration;

use subtidy::errors::ConversionError;
use subtidy::normalizer::{FfmpegConverter, FormatNormalizer};
use crate::common::{self, CopyConverter, FailingConverter};

#[tokio::test]
async fn test_normalize_withVtt_shouldWriteSrtNextToSource() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "talk.en.vtt", common::ROLLING_VTT)?;
    let converter = CopyConverter::new();
    let normalizer = FormatNormalizer::new(Box::new(converter.clone()));

    let srt = normalizer.normalize(&source).await;

    assert_eq!(srt, Some(temp_dir.path().join("talk.en.srt")));
    assert!(source.exists(), "source must never be removed");
    assert_eq!(converter.call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_normalize_withSrt_shouldSkipConverter() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "talk.en.srt", common::CLEANED_SRT)?;
    let converter = CopyConverter::new();
    let normalizer = FormatNormalizer::new(Box::new(converter.clone()));

    assert_eq!(normalizer.normalize(&source).await, Some(source.clone()));
    assert_eq!(converter.call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_normalize_withFailingConverter_shouldReturnNone() {
    let normalizer = FormatNormalizer::new(Box::new(FailingConverter));
    assert_eq!(normalizer.normalize(Path::new("talk.en.vtt")).await, None);

    let err = normalizer.try_normalize(Path::new("talk.en.vtt")).await.unwrap_err();
    assert!(matches!(err, ConversionError::Failed { .. }));
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> Result<std::path::PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = common::create_test_file(dir, name, &format!("#!/bin/sh\n{}\n", body))?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    Ok(path)
}

#[cfg(unix)]
#[tokio::test]
async fn test_ffmpeg_converter_withSuccessfulTool_shouldProduceDestination() -> Result<()> {
    use subtidy::normalizer::SubtitleConverter;

    let temp_dir = common::create_temp_dir()?;
    // Invoked as: <tool> -y -i <src> <dst>
    let tool = write_script(temp_dir.path(), "fake-ffmpeg", "cp \"$3\" \"$4\"")?;
    let source = common::create_test_file(temp_dir.path(), "talk.en.vtt", common::ROLLING_VTT)?;
    let destination = temp_dir.path().join("talk.en.srt");

    FfmpegConverter::new(&tool, Duration::from_secs(10))
        .convert(&source, &destination)
        .await?;

    assert_eq!(std::fs::read_to_string(&destination)?, common::ROLLING_VTT);
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_ffmpeg_converter_withFailingTool_shouldReportFilteredStderr() -> Result<()> {
    use subtidy::normalizer::SubtitleConverter;

    let temp_dir = common::create_temp_dir()?;
    let tool = write_script(
        temp_dir.path(),
        "fake-ffmpeg",
        "echo 'ffmpeg version 6.0' >&2\necho 'talk.en.vtt: Invalid data found' >&2\nexit 1",
    )?;

    let err = FfmpegConverter::new(&tool, Duration::from_secs(10))
        .convert(Path::new("talk.en.vtt"), &temp_dir.path().join("talk.en.srt"))
        .await
        .unwrap_err();

    match err {
        ConversionError::Failed { stderr, .. } => assert_eq!(stderr, "talk.en.vtt: Invalid data found"),
        other => panic!("expected Failed, got {:?}", other),
    }
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_ffmpeg_converter_withHangingTool_shouldTimeOut() -> Result<()> {
    use subtidy::normalizer::SubtitleConverter;

    let temp_dir = common::create_temp_dir()?;
    let tool = write_script(temp_dir.path(), "fake-ffmpeg", "sleep 5")?;

    let err = FfmpegConverter::new(&tool, Duration::from_millis(200))
        .convert(Path::new("talk.en.vtt"), &temp_dir.path().join("talk.en.srt"))
        .await
        .unwrap_err();

    assert!(matches!(err, ConversionError::Timeout(_)));
    Ok(())
}
