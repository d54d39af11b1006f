/*!
 * Tests for the SRT/WebVTT tokenizer and parser
 */

use subtidy::errors::SubtitleError;
use subtidy::srt_parser::{self, LineKind};
use crate::common;

#[test]
fn test_tokenize_shouldClassifyLines() {
    let lines = srt_parser::tokenize("\u{feff}1\n00:00:01,000 --> 00:00:02,000\nHello\n  \n");
    let kinds: Vec<LineKind> = lines.iter().map(|l| l.kind).collect();
    assert_eq!(kinds, vec![LineKind::Index, LineKind::Timing, LineKind::Text, LineKind::Blank]);
    assert_eq!(lines[0].content, "1");
    assert_eq!(lines[2].number, 3);
}

#[test]
fn test_parse_cues_withVttHeaderAndSettings_shouldStripBoth() {
    let cues = srt_parser::parse_cues(common::ROLLING_VTT).unwrap();
    assert_eq!(cues.len(), 3);
    assert_eq!(cues[0].start_time_ms, 1_000);
    assert_eq!(cues[0].end_time_ms, 2_000);
    assert_eq!(cues[0].text, "Hi");
    assert_eq!(cues[0].identifier, None);
}

#[test]
fn test_parse_cues_withSrtIndices_shouldKeepIdentifier() {
    let cues = srt_parser::parse_cues(common::THREE_BLOCK_SRT).unwrap();
    assert_eq!(cues.len(), 3);
    assert_eq!(cues[1].identifier.as_deref(), Some("2"));
    assert_eq!(cues[1].line, 6);
}

#[test]
fn test_parse_cues_withCrlfAndExtraBlankLines_shouldParse() {
    let content = "1\r\n00:00:01,000 --> 00:00:02,000\r\nA\r\nB\r\n\r\n\r\n\r\n2\r\n00:00:02,000 --> 00:00:03,000\r\nC\r\n";
    let cues = srt_parser::parse_cues(content).unwrap();
    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0].text, "A\nB");
}

#[test]
fn test_parse_cues_withMissingText_shouldSkipCue() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\n\n2\n00:00:02,000 --> 00:00:03,000\nkept\n";
    let document = srt_parser::parse_document(content).unwrap();
    assert_eq!(document.cues.len(), 1);
    assert_eq!(document.cues[0].text, "kept");
    assert_eq!(document.skipped, 1);
}

#[test]
fn test_parse_cues_withMissingSeparator_shouldRejectTrack() {
    let content = "1\n00:00:01,000 --> 00:00:02,000\nok\n\n2\n00:00:02,000 00:00:03,000\nbroken\n";
    match srt_parser::parse_cues(content) {
        Err(SubtitleError::MalformedTrack { line, content, .. }) => {
            assert_eq!(line, 6);
            assert_eq!(content, "00:00:02,000 00:00:03,000");
        }
        other => panic!("expected MalformedTrack, got {:?}", other),
    }
}

#[test]
fn test_parse_cues_withInvertedRange_shouldRejectTrack() {
    let content = "00:00:05,000 --> 00:00:01,000\ntext\n";
    assert!(matches!(
        srt_parser::parse_cues(content),
        Err(SubtitleError::MalformedTrack { line: 1, .. })
    ));
}

#[test]
fn test_parse_blocks_shouldRenumberFromOne() {
    let content = "17\n00:00:01,000 --> 00:00:02,000\nfirst\n\n42\n00:00:03,000 --> 00:00:04,000\nsecond\n";
    let blocks = srt_parser::parse_blocks(content).unwrap();
    assert_eq!(blocks.iter().map(|b| b.index).collect::<Vec<_>>(), vec![1, 2]);
}
