//! Text reconstruction from source markup
//!
//! This module turns parsed HTML fragments back into readable text:
//! - Glyph resolution for inline images that stand in for rare characters
//! - Recursive flattening with per-source container and exclusion rules

mod flatten;
mod glyph;

pub use flatten::{Flattened, FlattenRules, Flattener};
pub use glyph::{extract_code, GlyphResolver, BUILTIN_GLYPHS};
