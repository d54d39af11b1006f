/*!
 * Tests for file and folder utilities
 */

use anyhow::Result;
use std::path::PathBuf;

use subtidy::file_utils::FileManager;
use crate::common;

#[test]
fn test_srt_path_for_shouldReplaceFinalExtension() {
    assert_eq!(FileManager::srt_path_for("/d/Talk.en.vtt"), PathBuf::from("/d/Talk.en.srt"));
}

#[test]
fn test_language_from_filename_shouldReadLanguageSegment() {
    assert_eq!(FileManager::language_from_filename("/d/Talk.en.vtt").as_deref(), Some("en"));
    assert_eq!(FileManager::language_from_filename("/d/Talk.FR.srt").as_deref(), Some("fr"));
    assert_eq!(FileManager::language_from_filename("/d/Talk.srt"), None);
    assert_eq!(FileManager::language_from_filename("/d/Talk.part1.srt"), None);
    assert_eq!(FileManager::language_from_filename("/d/My.Movie.The.srt"), None);
    assert_eq!(FileManager::language_from_filename("/d/Talk.fre.srt").as_deref(), Some("fr"));
}

#[test]
fn test_translated_output_path_shouldNeverEqualInput() {
    let cases = [
        ("/d/Talk.en.srt", "en", "ar", "/d/Talk.ar.srt"),
        ("/d/Talk.srt", "en", "ar", "/d/Talk.ar.srt"),
        ("/d/Talk.fr.srt", "en", "ar", "/d/Talk.fr.ar.srt"),
        ("/d/en.talk.en.srt", "en", "es", "/d/en.talk.es.srt"),
    ];
    for (input, source, target, expected) in cases {
        let output = FileManager::translated_output_path(input, source, target);
        assert_eq!(output, PathBuf::from(expected));
        assert_ne!(output, PathBuf::from(input));
    }
}

#[test]
fn test_find_subtitle_files_shouldRecurseAndSort() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("season1");
    FileManager::ensure_dir(&nested)?;
    common::create_test_file(&nested, "b.en.vtt", common::ROLLING_VTT)?;
    common::create_test_file(temp_dir.path(), "a.en.srt", common::CLEANED_SRT)?;
    common::create_test_file(temp_dir.path(), "notes.txt", "not subtitles")?;

    let files = FileManager::find_subtitle_files(temp_dir.path())?;

    assert_eq!(files, vec![temp_dir.path().join("a.en.srt"), nested.join("b.en.vtt")]);
    Ok(())
}

#[test]
fn test_write_atomic_shouldReplaceExistingContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "x.en.srt", "old")?;

    FileManager::write_atomic(&path, "new")?;

    assert_eq!(FileManager::read_to_string(&path)?, "new");
    let leftovers = std::fs::read_dir(temp_dir.path())?.count();
    assert_eq!(leftovers, 1);
    Ok(())
}
