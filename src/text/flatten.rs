//! Recursive DOM-to-text flattening
//!
//! Source pages mix free text, `<br>` line breaks, nested containers, footnote
//! markers and glyph images. Each source nests its text in a different tag
//! vocabulary, so the containers to descend into and the subtrees to drop are
//! supplied per source through [`FlattenRules`].
//!
//! # Rules
//!
//! | Child | Output |
//! |-------|--------|
//! | text run | trimmed at both ends, inner whitespace kept |
//! | `<br>` | `\n` |
//! | excluded tag or class | nothing (following sibling text is kept) |
//! | glyph `<img>` | the resolved character, or nothing for unknown codes |
//! | allow-listed container | its own flattened children, in place |
//! | anything else | nothing |

use crate::text::glyph::{extract_code, GlyphResolver};
use scraper::node::{Element, Node};
use scraper::ElementRef;
use std::collections::HashSet;

/// Per-source flattening configuration
#[derive(Debug, Clone)]
pub struct FlattenRules {
    containers: HashSet<String>,
    exclude_tags: HashSet<String>,
    exclude_classes: HashSet<String>,
    glyph_class: String,
}

impl Default for FlattenRules {
    fn default() -> Self {
        Self::new(&["div", "span", "h1", "h2", "h3", "h4", "h5", "h6"])
    }
}

impl FlattenRules {
    /// Creates rules that descend into the given container tags
    pub fn new(containers: &[&str]) -> Self {
        Self {
            containers: containers.iter().map(|t| t.to_ascii_lowercase()).collect(),
            exclude_tags: HashSet::new(),
            exclude_classes: HashSet::new(),
            glyph_class: "newchar".to_string(),
        }
    }

    /// Drops whole subtrees rooted at these tags
    pub fn with_excluded_tags(mut self, tags: &[&str]) -> Self {
        self.exclude_tags
            .extend(tags.iter().map(|t| t.to_ascii_lowercase()));
        self
    }

    /// Drops whole subtrees rooted at elements carrying any of these classes
    pub fn with_excluded_classes(mut self, classes: &[&str]) -> Self {
        self.exclude_classes
            .extend(classes.iter().map(|c| c.to_string()));
        self
    }

    fn is_excluded(&self, element: &Element) -> bool {
        self.exclude_tags.contains(element.name())
            || element.classes().any(|c| self.exclude_classes.contains(c))
    }

    fn is_container(&self, element: &Element) -> bool {
        self.containers.contains(element.name())
    }

    fn is_glyph(&self, element: &Element) -> bool {
        element.name() == "img" && element.classes().any(|c| c == self.glyph_class)
    }
}

/// Flattened text together with the glyph codes that could not be resolved
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flattened {
    pub text: String,
    pub unknown_glyphs: Vec<String>,
}

/// Converts parsed markup fragments into plain text
pub struct Flattener<'a> {
    rules: &'a FlattenRules,
    glyphs: &'a GlyphResolver,
}

impl<'a> Flattener<'a> {
    pub fn new(rules: &'a FlattenRules, glyphs: &'a GlyphResolver) -> Self {
        Self { rules, glyphs }
    }

    /// Flattens the children of `fragment` into a single string
    ///
    /// Never fails: unknown glyph codes are logged and omitted, and
    /// unrecognized nodes are skipped.
    pub fn flatten(&self, fragment: ElementRef<'_>) -> String {
        let flattened = self.flatten_with_report(fragment);
        for code in &flattened.unknown_glyphs {
            tracing::warn!("Unknown glyph code: {}", code);
        }
        flattened.text
    }

    /// Like [`Flattener::flatten`], but returns the unknown glyph codes
    /// instead of logging them
    pub fn flatten_with_report(&self, fragment: ElementRef<'_>) -> Flattened {
        let mut out = Flattened::default();
        self.visit_children(fragment, &mut out);
        out
    }

    fn visit_children(&self, element: ElementRef<'_>, out: &mut Flattened) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => out.text.push_str(text.trim()),
                Node::Element(el) => {
                    if self.rules.is_excluded(el) {
                        continue;
                    }

                    if el.name() == "br" {
                        out.text.push('\n');
                    } else if self.rules.is_glyph(el) {
                        self.push_glyph(el, out);
                    } else if self.rules.is_container(el) {
                        if let Some(child_ref) = ElementRef::wrap(child) {
                            self.visit_children(child_ref, out);
                        }
                    } else {
                        tracing::trace!("Skipping <{}> while flattening", el.name());
                    }
                }
                _ => {}
            }
        }
    }

    fn push_glyph(&self, img: &Element, out: &mut Flattened) {
        let src = img.attr("src").unwrap_or("");
        let Some(code) = extract_code(src) else {
            out.unknown_glyphs.push(src.to_string());
            return;
        };

        match self.glyphs.resolve(code) {
            Ok(ch) => out.text.push(ch),
            Err(_) => out.unknown_glyphs.push(code.to_string()),
        }
    }
}
