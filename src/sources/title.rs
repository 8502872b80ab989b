//! Title and attribution conventions of listing entries

use crate::{ArchiveError, Result};
use regex::Regex;
use std::sync::OnceLock;

fn title_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(.*)\((.*)\)$").expect("title pattern is valid"))
}

/// Splits `"Primary(Variant)"` into its two halves
///
/// The match is greedy: with nested or repeated parentheses the variant is
/// the text inside the last pair.
///
/// # Returns
///
/// * `Ok((primary, variant))` - Both halves, trimmed
/// * `Err(ArchiveError::DataFormat)` - The title has no trailing `(...)`
pub fn split_title(raw: &str) -> Result<(String, String)> {
    let trimmed = raw.trim();
    let caps = title_pattern()
        .captures(trimmed)
        .ok_or_else(|| ArchiveError::DataFormat {
            field: "title".to_string(),
            raw: raw.to_string(),
        })?;

    Ok((caps[1].trim().to_string(), caps[2].trim().to_string()))
}

/// Returns the second `" | "`-delimited field of a title attribute
///
/// `"국역 연려실기술 | 이긍익"` yields `Some("이긍익")`; an attribute without the
/// delimiter yields `None`.
pub fn split_attribution(raw: &str) -> Option<String> {
    raw.split(" | ")
        .nth(1)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_title() {
        let (primary, variant) = split_title("제목(題目)").unwrap();
        assert_eq!(primary, "제목");
        assert_eq!(variant, "題目");
    }

    #[test]
    fn test_split_title_greedy() {
        let (primary, variant) = split_title("연려실기술(燃藜室記述)(별집)").unwrap();
        assert_eq!(primary, "연려실기술(燃藜室記述)");
        assert_eq!(variant, "별집");
    }

    #[test]
    fn test_split_title_without_parentheses() {
        let err = split_title("제목").unwrap_err();
        assert!(matches!(err, ArchiveError::DataFormat { ref raw, .. } if raw == "제목"));
    }

    #[test]
    fn test_split_title_trailing_text() {
        assert!(split_title("제목(題目) 끝").is_err());
    }

    #[test]
    fn test_split_attribution() {
        assert_eq!(
            split_attribution("국역 연려실기술 | 이긍익").as_deref(),
            Some("이긍익")
        );
        assert_eq!(split_attribution("a | b | c").as_deref(), Some("b"));
        assert_eq!(split_attribution("no delimiter"), None);
        assert_eq!(split_attribution("a | "), None);
    }
}
