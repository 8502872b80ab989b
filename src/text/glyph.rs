//! Glyph code resolution
//!
//! The ITKC pages render characters missing from their fonts as inline images
//! whose path embeds a code such as `KC01783`. This module maps those codes
//! back to the Unicode character they stand for.

use crate::ArchiveError;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Codes known to map to a specific character
pub const BUILTIN_GLYPHS: &[(&str, char)] = &[("KC01783", '楸')];

fn code_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"KC[0-9]+").expect("glyph code pattern is valid"))
}

/// Extracts the glyph code from an image reference
///
/// When several codes appear the last one wins, since the code is the file
/// name at the end of the path.
///
/// # Example
///
/// ```
/// use archive_tree::text::extract_code;
///
/// assert_eq!(extract_code("/images/newchar/KC01783.gif"), Some("KC01783"));
/// assert_eq!(extract_code("/images/blank.gif"), None);
/// ```
pub fn extract_code(src: &str) -> Option<&str> {
    code_pattern().find_iter(src).last().map(|m| m.as_str())
}

/// Lookup table from glyph codes to characters
#[derive(Debug, Clone)]
pub struct GlyphResolver {
    table: HashMap<String, char>,
}

impl Default for GlyphResolver {
    fn default() -> Self {
        Self {
            table: BUILTIN_GLYPHS
                .iter()
                .map(|(code, ch)| (code.to_string(), *ch))
                .collect(),
        }
    }
}

impl GlyphResolver {
    /// Creates a resolver with the built-in table plus `extra` entries
    ///
    /// Extra entries override built-in ones with the same code.
    pub fn with_extra(extra: &HashMap<String, char>) -> Self {
        let mut resolver = Self::default();
        for (code, ch) in extra {
            resolver.table.insert(code.clone(), *ch);
        }
        resolver
    }

    /// Resolves one code
    ///
    /// # Returns
    ///
    /// * `Ok(char)` - The mapped character
    /// * `Err(ArchiveError::UnknownGlyphCode)` - The code is not in the table
    pub fn resolve(&self, code: &str) -> Result<char, ArchiveError> {
        self.table
            .get(code)
            .copied()
            .ok_or_else(|| ArchiveError::UnknownGlyphCode(code.to_string()))
    }

    /// Replaces known codes embedded in a plain string
    ///
    /// Listing `title` attributes carry raw codes instead of images. Unknown
    /// codes are left in place and reported.
    pub fn substitute_codes(&self, text: &str) -> String {
        code_pattern()
            .replace_all(text, |caps: &regex::Captures| {
                let code = &caps[0];
                match self.resolve(code) {
                    Ok(ch) => ch.to_string(),
                    Err(_) => {
                        tracing::warn!("Unknown glyph code in text: {}", code);
                        code.to_string()
                    }
                }
            })
            .into_owned()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
