/*!
 * Tests for rolling-caption deduplication
 */

use std::path::Path;

use subtidy::dedup::{self, DedupStats};
use subtidy::errors::SubtitleError;
use subtidy::subtitle_processor::SubtitleBlock;
use crate::common;

#[test]
fn test_clean_document_withRollingCaptions_shouldMatchExpectedSrt() {
    let (track, stats) = dedup::clean_document(common::ROLLING_VTT, Path::new("talk.en.vtt"), "en").unwrap();

    assert_eq!(
        track.blocks,
        vec![
            SubtitleBlock::new(1, 1_000, 3_000, "Hi"),
            SubtitleBlock::new(2, 3_000, 4_000, "Bye"),
        ]
    );
    assert_eq!(track.to_srt_string(), common::CLEANED_SRT);
    assert_eq!(stats, DedupStats { cues_in: 3, blocks_out: 2, merged: 1, skipped: 0 });
}

#[test]
fn test_clean_document_onItsOwnOutput_shouldBeIdempotent() {
    let (first, _) = dedup::clean_document(common::ROLLING_VTT, Path::new("talk.en.vtt"), "en").unwrap();
    let rendered = first.to_srt_string();

    let (second, stats) = dedup::clean_document(&rendered, Path::new("talk.en.srt"), "en").unwrap();

    assert_eq!(second.blocks, first.blocks);
    assert_eq!(second.to_srt_string(), rendered);
    assert_eq!(stats.merged, 0);
}

#[test]
fn test_clean_document_withLongRollingRun_shouldProduceWellFormedTrack() {
    let mut content = String::from("WEBVTT\n\n");
    let lines = ["one", "one", "one", "two", "two", "one", "three", "three"];
    for (i, text) in lines.iter().enumerate() {
        let start = SubtitleBlock::format_timestamp(i as u64 * 500).replace(',', ".");
        let end = SubtitleBlock::format_timestamp((i as u64 + 1) * 500).replace(',', ".");
        content.push_str(&format!("{} --> {}\n{}\n\n", start, end, text));
    }

    let (track, stats) = dedup::clean_document(&content, Path::new("x.en.vtt"), "en").unwrap();

    let texts: Vec<&str> = track.blocks.iter().map(|b| b.text.as_str()).collect();
    assert_eq!(texts, vec!["one", "two", "one", "three"]);
    assert_eq!(track.blocks[0].end_time_ms, 1_500);
    assert_eq!(track.blocks[3].start_time_ms, 3_000);
    assert_eq!(track.blocks[3].end_time_ms, 4_000);
    assert!(track.is_well_formed());
    assert!(stats.blocks_out <= stats.cues_in);
    assert_eq!(stats.cues_in - stats.blocks_out, stats.merged);
}

#[test]
fn test_clean_document_withMalformedTiming_shouldFailWholeFile() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nfine\n\n2\n00:00:02,000 --> soon\nbroken\n";
    let result = dedup::clean_document(content, Path::new("x.en.srt"), "en");
    assert!(matches!(result, Err(SubtitleError::MalformedTrack { line: 6, .. })));
}

#[test]
fn test_clean_document_withEmptyDocument_shouldProduceEmptyTrack() {
    let (track, stats) = dedup::clean_document("", Path::new("x.en.srt"), "en").unwrap();
    assert!(track.is_empty());
    assert_eq!(stats, DedupStats::default());
}

#[test]
fn test_clean_document_withUnnumberedVttCueMissingSeparator_shouldFailWholeFile() {
    let content = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nok\n\n00:00:02.000 00:00:03.000\nbroken\n";
    let result = dedup::clean_document(content, Path::new("x.en.vtt"), "en");
    assert!(matches!(result, Err(SubtitleError::MalformedTrack { line: 6, .. })));
}

#[test]
fn test_clean_document_withOversizedHourField_shouldFailWholeFile() {
    let content = "1\n18446744073709551:00:00,000 --> 18446744073709551:00:01,000\nlate\n";
    let result = dedup::clean_document(content, Path::new("x.en.srt"), "en");
    assert!(matches!(result, Err(SubtitleError::MalformedTrack { line: 2, .. })));
}
