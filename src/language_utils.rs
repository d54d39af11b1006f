use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Subtitle tracks carry ISO 639-1 (2-letter) codes in their filenames, but
/// users and configs sometimes provide ISO 639-2 codes. These helpers
/// validate, normalize and compare both forms.
/// ISO 639-2/B codes that differ from their 639-2/T counterpart
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Languages written right-to-left that get bidi embedding on translation
const RIGHT_TO_LEFT: &[&str] = &["ara"];

/// Right-to-left embedding (U+202B)
pub const RTL_EMBEDDING: char = '\u{202B}';

/// Pop directional formatting (U+202C)
pub const POP_DIRECTIONAL_FORMATTING: char = '\u{202C}';

fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    PART2B_TO_PART2T
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<()> {
    normalize_to_part2t(code).map(|_| ())
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = part2b_to_part2t(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let part2t = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&part2t)
        .ok_or_else(|| anyhow!("Cannot normalize invalid language code: {}", code))?;

    Ok(lang.to_639_1().map(str::to_string).unwrap_or(part2t))
}

/// The ISO 639-1 code of a language, for languages that have one
pub fn to_part1(code: &str) -> Option<String> {
    let part2t = normalize_to_part2t(code).ok()?;
    Language::from_639_3(&part2t)?.to_639_1().map(str::to_string)
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the English language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Whether subtitles in this language must be wrapped for right-to-left display
pub fn is_right_to_left(code: &str) -> bool {
    normalize_to_part2t(code)
        .map(|part2t| RIGHT_TO_LEFT.contains(&part2t.as_str()))
        .unwrap_or(false)
}

/// Wrap text in an RTL embedding so renderers keep reading order around
/// left-to-right punctuation
pub fn wrap_right_to_left(text: &str) -> String {
    let mut wrapped = String::with_capacity(text.len() + 6);
    wrapped.push(RTL_EMBEDDING);
    wrapped.push_str(text);
    wrapped.push(POP_DIRECTIONAL_FORMATTING);
    wrapped
}
