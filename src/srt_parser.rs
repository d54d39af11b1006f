/*!
 * Tokenizer and parser for SRT and WebVTT cue documents.
 *
 * Grammar accepted:
 *
 * ```text
 * track     := header? block*
 * block     := [identifier NL] timing NL text-line (NL text-line)*
 * timing    := timestamp WS* "-->" WS* timestamp (WS annotation)*
 * timestamp := [HH ":"] MM ":" SS ("," | ".") mmm
 * ```
 *
 * Blocks are separated by one or more blank lines. Positioning annotations
 * that follow the end timestamp (`align:start position:0%` ...) are dropped.
 */

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;
use crate::subtitle_processor::SubtitleBlock;

/// Separator between the start and end timestamps of a timing line
pub const TIMING_SEPARATOR: &str = "-->";

// @const: Start and end timestamps of a timing line, cue settings ignored
static TIMING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\S+?)\s*-->\s*(\S+)(?:\s.*)?$").expect("timing line regex is valid")
});

/// Classification of a single source line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Empty or whitespace-only
    Blank,
    /// Digits only, a cue index
    Index,
    /// Contains the `-->` separator
    Timing,
    /// Anything else
    Text,
}

/// A classified source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number in the document
    pub number: usize,
    pub kind: LineKind,
    /// Line content with surrounding whitespace removed
    pub content: &'a str,
}

/// A parsed but not yet cleaned cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCue {
    /// Index or VTT identifier line, when present
    pub identifier: Option<String>,
    pub start_time_ms: u64,
    pub end_time_ms: u64,
    /// Display lines joined by '\n'
    pub text: String,
    /// Line number of the timing line
    pub line: usize,
}

impl RawCue {
    /// Convert into a block with the given sequence number
    pub fn into_block(self, index: usize) -> SubtitleBlock {
        SubtitleBlock::new(index, self.start_time_ms, self.end_time_ms, self.text)
    }
}

fn classify(content: &str) -> LineKind {
    if content.is_empty() {
        LineKind::Blank
    } else if content.contains(TIMING_SEPARATOR) {
        LineKind::Timing
    } else if content.bytes().all(|b| b.is_ascii_digit()) {
        LineKind::Index
    } else {
        LineKind::Text
    }
}

/// Split a document into classified lines
pub fn tokenize(content: &str) -> Vec<Line<'_>> {
    content
        .trim_start_matches('\u{feff}')
        .lines()
        .enumerate()
        .map(|(i, raw)| {
            let content = raw.trim();
            Line {
                number: i + 1,
                kind: classify(content),
                content,
            }
        })
        .collect()
}

/// Parse a timing line into `(start_ms, end_ms)`, ignoring cue settings
pub fn parse_timing_line(line: &Line<'_>) -> Result<(u64, u64), SubtitleError> {
    let malformed = |reason: &str| SubtitleError::MalformedTrack {
        line: line.number,
        content: line.content.to_string(),
        reason: reason.to_string(),
    };

    if !line.content.contains(TIMING_SEPARATOR) {
        return Err(malformed("missing --> separator"));
    }
    let caps = TIMING_LINE
        .captures(line.content)
        .ok_or_else(|| malformed("missing timestamp"))?;

    let start_ms = SubtitleBlock::parse_timestamp(&caps[1])
        .map_err(|_| malformed("invalid start timestamp"))?;
    let end_ms = SubtitleBlock::parse_timestamp(&caps[2])
        .map_err(|_| malformed("invalid end timestamp"))?;

    if end_ms < start_ms {
        return Err(malformed("end time precedes start time"));
    }

    Ok((start_ms, end_ms))
}

fn is_header_block(first: &Line<'_>) -> bool {
    let content = first.content;
    content.starts_with("WEBVTT")
        || content == "NOTE"
        || content.starts_with("NOTE ")
        || content == "STYLE"
        || content == "REGION"
}

/// Turn one blank-line-delimited block into a cue
///
/// Returns `Ok(None)` for blocks that are skipped: VTT headers and cues
/// without enough lines to carry both timing and text. In a longer block
/// the timing line is the first or the second line, anything else is a
/// malformed track.
fn parse_block(lines: &[Line<'_>]) -> Result<Option<RawCue>, SubtitleError> {
    let Some(first) = lines.first() else {
        return Ok(None);
    };

    if is_header_block(first) {
        return Ok(None);
    }

    let timing_pos = if first.kind == LineKind::Timing {
        0
    } else if lines.len() < 2 {
        debug!("Skipping cue at line {}: no timing line", first.number);
        return Ok(None);
    } else {
        1
    };

    let (start_time_ms, end_time_ms) = parse_timing_line(&lines[timing_pos])?;

    let text_lines: Vec<&str> = lines[timing_pos + 1..].iter().map(|l| l.content).collect();
    if text_lines.is_empty() {
        debug!("Skipping cue at line {}: no text", lines[timing_pos].number);
        return Ok(None);
    }

    Ok(Some(RawCue {
        identifier: (timing_pos == 1).then(|| first.content.to_string()),
        start_time_ms,
        end_time_ms,
        text: text_lines.join("\n"),
        line: lines[timing_pos].number,
    }))
}

/// Cues of a document plus the number of cue blocks that were dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocument {
    pub cues: Vec<RawCue>,
    /// Blocks without a usable timing or text line (headers not counted)
    pub skipped: usize,
}

/// Parse an SRT or WebVTT document, counting skipped cue blocks
pub fn parse_document(content: &str) -> Result<ParsedDocument, SubtitleError> {
    let lines = tokenize(content);
    let mut document = ParsedDocument::default();

    for block in lines
        .split(|line| line.kind == LineKind::Blank)
        .filter(|block| !block.is_empty())
    {
        if is_header_block(&block[0]) {
            continue;
        }
        match parse_block(block)? {
            Some(cue) => document.cues.push(cue),
            None => document.skipped += 1,
        }
    }

    debug!(
        "Parsed {} cues ({} blocks skipped)",
        document.cues.len(),
        document.skipped
    );
    Ok(document)
}

/// Parse an SRT or WebVTT document into raw cues in document order
pub fn parse_cues(content: &str) -> Result<Vec<RawCue>, SubtitleError> {
    Ok(parse_document(content)?.cues)
}

/// Parse an SRT document into blocks, keeping cues as they are
///
/// Blocks are renumbered from 1 in document order.
pub fn parse_blocks(content: &str) -> Result<Vec<SubtitleBlock>, SubtitleError> {
    Ok(parse_cues(content)?
        .into_iter()
        .enumerate()
        .map(|(i, cue)| cue.into_block(i + 1))
        .collect())
}
