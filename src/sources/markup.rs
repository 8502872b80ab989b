//! Small helpers over `scraper` shared by the adapters

use crate::{ArchiveError, Result};
use scraper::{ElementRef, Html, Selector};

/// Parses a response body as an HTML document
///
/// Bodies are decoded as UTF-8; invalid sequences are replaced rather than
/// rejected.
pub fn parse_html(raw: &[u8]) -> Html {
    Html::parse_document(&String::from_utf8_lossy(raw))
}

/// Compiles a CSS selector, reporting failures as malformed markup
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ArchiveError::MalformedMarkup {
        context: "selector".to_string(),
        detail: format!("invalid selector `{}`: {:?}", css, e),
    })
}

/// Returns the first element matching `css` below `root`
///
/// # Returns
///
/// * `Ok(ElementRef)` - The first match in document order
/// * `Err(ArchiveError::MalformedMarkup)` - Nothing matched
pub fn select_first<'a>(root: ElementRef<'a>, css: &str, context: &str) -> Result<ElementRef<'a>> {
    select_optional(root, css)?.ok_or_else(|| ArchiveError::missing(context, css))
}

/// Returns the first element matching `css` below `root`, if any
pub fn select_optional<'a>(root: ElementRef<'a>, css: &str) -> Result<Option<ElementRef<'a>>> {
    let sel = selector(css)?;
    let found = root.select(&sel).next();
    Ok(found)
}

/// Returns every element matching `css` below `root`, in document order
pub fn select_all<'a>(root: ElementRef<'a>, css: &str) -> Result<Vec<ElementRef<'a>>> {
    let sel = selector(css)?;
    let found = root.select(&sel).collect();
    Ok(found)
}

/// Returns the first direct child element of `parent` named `tag`
pub fn child_element<'a>(parent: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    parent
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == tag)
}
