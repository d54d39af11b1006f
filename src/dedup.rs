/*!
 * Rolling-caption deduplication.
 *
 * Auto-generated captions repeat the same text across consecutive cues whose
 * time ranges abut (one cue ends exactly when the next starts). This module
 * collapses those runs into single blocks with a merged time range.
 */

use std::path::Path;
use log::debug;

use crate::errors::SubtitleError;
use crate::srt_parser::{self, RawCue};
use crate::subtitle_processor::{SubtitleBlock, Track};

/// Counters describing one deduplication pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DedupStats {
    /// Cues read from the source document
    pub cues_in: usize,
    /// Blocks emitted
    pub blocks_out: usize,
    /// Cues folded into a preceding block
    pub merged: usize,
    /// Cue blocks dropped by the parser for missing timing or text
    pub skipped: usize,
}

/// Collapse rolling captions into a minimal block sequence
///
/// A cue merges into the last accepted block when its full text is identical
/// and its start equals that block's end. The block's end is extended to the
/// cue's end, so chains of any length fold into one block. Every other cue
/// starts a new block; blocks are numbered from 1 in output order.
pub fn deduplicate<I>(cues: I) -> (Vec<SubtitleBlock>, DedupStats)
where
    I: IntoIterator<Item = RawCue>,
{
    let mut blocks: Vec<SubtitleBlock> = Vec::new();
    let mut stats = DedupStats::default();

    for cue in cues {
        stats.cues_in += 1;

        if let Some(last) = blocks.last_mut() {
            if last.text == cue.text && last.end_time_ms == cue.start_time_ms {
                last.end_time_ms = cue.end_time_ms;
                stats.merged += 1;
                continue;
            }
        }

        let index = blocks.len() + 1;
        blocks.push(cue.into_block(index));
    }

    stats.blocks_out = blocks.len();
    (blocks, stats)
}

/// Parse a raw SRT/VTT document and deduplicate it into a track
pub fn clean_document(
    content: &str,
    source_path: &Path,
    language_code: &str,
) -> Result<(Track, DedupStats), SubtitleError> {
    let document = srt_parser::parse_document(content)?;
    let (blocks, mut stats) = deduplicate(document.cues);
    stats.skipped = document.skipped;

    debug!(
        "Deduplicated {}: {} cues -> {} blocks ({} merged, {} skipped)",
        source_path.display(),
        stats.cues_in,
        stats.blocks_out,
        stats.merged,
        stats.skipped
    );

    Ok((Track::with_blocks(source_path, language_code, blocks), stats))
}
