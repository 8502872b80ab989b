//! Annals of the Joseon Dynasty (sillok.history.go.kr)
//!
//! The annals are browsed by reign, then year and month, down to daily
//! records. Month listings are served by `/search/inspectionMonthList.do`
//! as a `ul.ins_list` of anchors. An anchor pointing at `/id/{record}` opens
//! a record page; one calling `javascript:search('{id}')` drills down into
//! another listing.
//!
//! Record pages show the Korean translation in `div.ins_left_in` and the
//! original in `div.ins_right_in`, each inside a `div.ins_view_pd`, with the
//! record date in `span.tit_loc`. Footnote markers (`sup`,
//! `a.footnote_super`) are dropped.

use crate::model::{LeafDocument, ListingPage, Node, NodeKind};
use crate::sources::markup::{child_element, parse_html, select_all, select_first, select_optional};
use crate::sources::{origin_of, SourceAdapter};
use crate::text::{FlattenRules, Flattener, GlyphResolver};
use crate::{ArchiveError, Result};
use regex::Regex;
use scraper::ElementRef;
use std::sync::OnceLock;
use url::Url;

const RECORD_PATH: &str = "/id/";

fn drilldown_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"search\('([^']+)'\)").expect("drilldown pattern is valid"))
}

/// Extracts the node id from a listing anchor's `href`
fn node_id_from_href(href: &str) -> Option<String> {
    if let Some(pos) = href.find(RECORD_PATH) {
        let rest = &href[pos + RECORD_PATH.len()..];
        let id = rest.split(['?', '#', '/']).next().unwrap_or("");
        return (!id.is_empty()).then(|| id.to_string());
    }

    drilldown_pattern()
        .captures(href)
        .map(|caps| caps[1].to_string())
}

/// Adapter for the Annals of the Joseon Dynasty
#[derive(Debug, Clone)]
pub struct SillokAdapter {
    base_url: Url,
    origin: String,
    glyphs: GlyphResolver,
    rules: FlattenRules,
}

impl SillokAdapter {
    pub fn new(base_url: &str, glyphs: GlyphResolver) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|_| ArchiveError::DataFormat {
            field: "Sillok base URL".to_string(),
            raw: base_url.to_string(),
        })?;

        let rules = FlattenRules::new(&["div", "span", "p", "h1", "h2", "h3", "h4", "h5", "h6"])
            .with_excluded_tags(&["sup", "script", "style"])
            .with_excluded_classes(&["footnote_super"]);

        Ok(Self {
            origin: origin_of(&base_url),
            base_url,
            glyphs,
            rules,
        })
    }

    /// Flattens a record body, one line per `p.paragraph`
    fn flatten_body(&self, flattener: &Flattener<'_>, body: ElementRef<'_>) -> Result<String> {
        let paragraphs = select_all(body, "p.paragraph")?;
        if paragraphs.is_empty() {
            return Ok(flattener.flatten(body));
        }

        let lines: Vec<String> = paragraphs
            .into_iter()
            .map(|p| flattener.flatten(p))
            .filter(|line| !line.is_empty())
            .collect();
        Ok(lines.join("\n"))
    }
}

impl SourceAdapter for SillokAdapter {
    fn source_id(&self) -> &str {
        "sillok"
    }

    fn origin(&self) -> &str {
        &self.origin
    }

    fn listing_url(&self, node_id: &str) -> String {
        let mut url = self.base_url.clone();
        url.set_path("/search/inspectionMonthList.do");
        url.query_pairs_mut().clear().append_pair("id", node_id);
        url.to_string()
    }

    fn leaf_url(&self, leaf_id: &str) -> String {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{}{}", RECORD_PATH, leaf_id));
        url.set_query(None);
        url.to_string()
    }

    fn parse_listing(&self, parent_id: &str, raw: &[u8]) -> Result<ListingPage> {
        let document = parse_html(raw);
        let flattener = Flattener::new(&self.rules, &self.glyphs);
        let mut nodes = Vec::new();

        for item in select_all(document.root_element(), "ul.ins_list li")? {
            // Footnote links may follow; the entry is its first direct anchor
            let Some(anchor) = child_element(item, "a") else {
                tracing::debug!("Skipping Sillok listing entry without a link under {}", parent_id);
                continue;
            };
            let href = anchor
                .value()
                .attr("href")
                .ok_or_else(|| ArchiveError::missing("Sillok listing entry", "a[href]"))?;
            let id = node_id_from_href(href).ok_or_else(|| ArchiveError::DataFormat {
                field: "navigation reference".to_string(),
                raw: href.to_string(),
            })?;

            let mut node = Node::new(id, flattener.flatten(anchor), NodeKind::Container, Some(parent_id));
            node.nav_ref = Some(href.to_string());
            node.kind = self.classify(&node);
            nodes.push(node);
        }

        tracing::debug!("Parsed {} entries under {} (sillok)", nodes.len(), parent_id);

        Ok(ListingPage::new(nodes))
    }

    fn classify(&self, node: &Node) -> NodeKind {
        match node.nav_ref.as_deref() {
            Some(nav) if nav.contains(RECORD_PATH) => NodeKind::Leaf,
            _ => NodeKind::Container,
        }
    }

    fn parse_leaf(&self, raw: &[u8]) -> Result<LeafDocument> {
        let document = parse_html(raw);
        let root = document.root_element();
        let flattener = Flattener::new(&self.rules, &self.glyphs);

        let title = select_first(root, "h3.search_tit", "Sillok record title")?;
        let body = select_first(root, "div.ins_left_in div.ins_view_pd", "Sillok translation")?;
        let original = select_optional(root, "div.ins_right_in div.ins_view_pd")?;
        let date = select_optional(root, "span.tit_loc")?;

        let secondary_text = match original {
            Some(el) => Some(self.flatten_body(&flattener, el)?).filter(|t| !t.is_empty()),
            None => None,
        };

        let mut tags = vec!["ko".to_string()];
        if secondary_text.is_some() {
            tags.push("lzh".to_string());
        }
        if let Some(date) = date.map(|el| flattener.flatten(el)).filter(|d| !d.is_empty()) {
            tags.push(date);
        }

        Ok(LeafDocument {
            primary_text: self.flatten_body(&flattener, body)?,
            secondary_text,
            title: flattener.flatten(title),
            secondary_title: None,
            tags,
        })
    }
}
