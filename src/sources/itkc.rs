//! ITKC classical-texts database (db.itkc.or.kr)
//!
//! Both series share one tree endpoint, `/dir/treeAjax`, which answers with a
//! bare `<li>` list:
//!
//! ```html
//! <li data-dataid="ITKC_BT_1300A_0010" data-url="...">
//!   <span title="제1권 | 이긍익">제1권(第一卷)</span>
//! </li>
//! ```
//!
//! The series root listing (`depth=1`) lists collections; their display text
//! is `Title(Variant)` and the span `title` attribute carries the attribution
//! after a `" | "`. Deeper listings take their title from the `title`
//! attribute. A node is a text leaf when its `data-url` carries the
//! percent-encoded marker "최종정보" (final information).

use crate::model::{LeafDocument, ListingPage, Node, NodeKind, SeriesInfo};
use crate::sources::markup::{child_element, parse_html, select_all, select_first, select_optional};
use crate::sources::title::{split_attribution, split_title};
use crate::sources::{origin_of, SourceAdapter};
use crate::text::{FlattenRules, Flattener, GlyphResolver};
use crate::{ArchiveError, Result};
use url::Url;

/// Percent-encoded "최종정보", present in the `data-url` of text nodes
pub const ITKC_TEXT_MARKER: &str = "%EC%B5%9C%EC%A2%85%EC%A0%95%EB%B3%B4";

/// The ITKC series this crate can walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItkcSeries {
    /// 고전번역서, translated classics
    Bt,
    /// 한국문집총간, collected works in the original
    Mo,
}

impl ItkcSeries {
    pub const ALL: [ItkcSeries; 2] = [ItkcSeries::Bt, ItkcSeries::Mo];

    /// The series id used by the remote site, also the root node id
    pub fn id(&self) -> &'static str {
        match self {
            ItkcSeries::Bt => "BT",
            ItkcSeries::Mo => "MO",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ItkcSeries::Bt => "고전번역서",
            ItkcSeries::Mo => "한국문집총간",
        }
    }

    pub fn source_id(&self) -> &'static str {
        match self {
            ItkcSeries::Bt => "itkc-bt",
            ItkcSeries::Mo => "itkc-mo",
        }
    }
}

/// Returns the fixed ITKC series catalog
///
/// # Example
///
/// ```
/// let catalog = archive_tree::sources::series_catalog();
/// assert_eq!(catalog[0].id, "BT");
/// ```
pub fn series_catalog() -> Vec<SeriesInfo> {
    ItkcSeries::ALL
        .iter()
        .map(|series| SeriesInfo {
            id: series.id().to_string(),
            name: series.name().to_string(),
        })
        .collect()
}

/// Tree navigation shared by both series
#[derive(Debug, Clone)]
struct ItkcTree {
    base_url: Url,
    origin: String,
    series: ItkcSeries,
    glyphs: GlyphResolver,
    rules: FlattenRules,
}

impl ItkcTree {
    fn new(base_url: &str, series: ItkcSeries, glyphs: GlyphResolver) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|_| ArchiveError::DataFormat {
            field: "ITKC base URL".to_string(),
            raw: base_url.to_string(),
        })?;

        Ok(Self {
            origin: origin_of(&base_url),
            base_url,
            series,
            glyphs,
            rules: FlattenRules::default(),
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> String {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url.query_pairs_mut().clear().extend_pairs(params);
        url.to_string()
    }

    fn is_root(&self, node_id: &str) -> bool {
        node_id == self.series.id()
    }

    fn listing_url(&self, node_id: &str) -> String {
        let series = self.series.id();
        if self.is_root(node_id) {
            self.endpoint(
                "/dir/treeAjax",
                &[
                    ("grpId", ""),
                    ("itemId", series),
                    ("gubun", "book"),
                    ("depth", "1"),
                ],
            )
        } else {
            self.endpoint(
                "/dir/treeAjax",
                &[("grpId", ""), ("itemId", series), ("dataId", node_id)],
            )
        }
    }

    fn parse_listing(&self, parent_id: &str, raw: &[u8]) -> Result<ListingPage> {
        let document = parse_html(raw);
        let flattener = Flattener::new(&self.rules, &self.glyphs);
        let root = self.is_root(parent_id);
        let mut nodes = Vec::new();

        for item in select_all(document.root_element(), "li[data-dataid]")? {
            let id = item.value().attr("data-dataid").unwrap_or("").trim();
            if id.is_empty() {
                return Err(ArchiveError::DataFormat {
                    field: "data-dataid".to_string(),
                    raw: item.html(),
                });
            }

            let span = child_element(item, "span")
                .ok_or_else(|| ArchiveError::missing("ITKC listing entry", "li > span"))?;
            let title_attr = span.value().attr("title");

            let mut node = if root {
                let (title, variant) = split_title(&flattener.flatten(span))?;
                let mut node = Node::new(id, title, NodeKind::Container, Some(parent_id));
                node.variant_title = Some(variant);
                node.attribution = title_attr.and_then(split_attribution);
                node
            } else {
                let title = match title_attr {
                    Some(attr) => self.glyphs.substitute_codes(attr.trim()),
                    None => flattener.flatten(span),
                };
                Node::new(id, title, NodeKind::Container, Some(parent_id))
            };

            node.nav_ref = item.value().attr("data-url").map(str::to_string);
            node.kind = self.classify(&node);
            nodes.push(node);
        }

        tracing::debug!(
            "Parsed {} entries under {} ({})",
            nodes.len(),
            parent_id,
            self.series.source_id()
        );

        Ok(ListingPage::new(nodes))
    }

    fn classify(&self, node: &Node) -> NodeKind {
        match node.nav_ref.as_deref() {
            Some(nav) if nav.contains(ITKC_TEXT_MARKER) => NodeKind::Leaf,
            _ => NodeKind::Container,
        }
    }
}

/// Adapter for the translated classics series (`BT`)
///
/// Leaf pages carry the Korean translation with the original text beside it.
#[derive(Debug, Clone)]
pub struct ItkcBookAdapter {
    tree: ItkcTree,
}

impl ItkcBookAdapter {
    pub fn new(base_url: &str, glyphs: GlyphResolver) -> Result<Self> {
        Ok(Self {
            tree: ItkcTree::new(base_url, ItkcSeries::Bt, glyphs)?,
        })
    }
}

impl SourceAdapter for ItkcBookAdapter {
    fn source_id(&self) -> &str {
        ItkcSeries::Bt.source_id()
    }

    fn origin(&self) -> &str {
        &self.tree.origin
    }

    fn listing_url(&self, node_id: &str) -> String {
        self.tree.listing_url(node_id)
    }

    fn leaf_url(&self, leaf_id: &str) -> String {
        self.tree
            .endpoint("/dir/node", &[("dataId", leaf_id), ("viewSync", "OT")])
    }

    fn parse_listing(&self, parent_id: &str, raw: &[u8]) -> Result<ListingPage> {
        self.tree.parse_listing(parent_id, raw)
    }

    fn classify(&self, node: &Node) -> NodeKind {
        self.tree.classify(node)
    }

    fn parse_leaf(&self, raw: &[u8]) -> Result<LeafDocument> {
        let document = parse_html(raw);
        let root = document.root_element();
        let flattener = Flattener::new(&self.tree.rules, &self.tree.glyphs);

        let primary = select_first(root, "div[class='text_body ']", "ITKC translation body")?;
        let title = select_first(root, "div.text_body_tit:not(.ori)", "ITKC translation title")?;
        let secondary = select_optional(root, "div[class='text_body ori']")?;
        let secondary_title = select_optional(root, "div[class='text_body_tit ori']")?;

        let secondary_text = secondary.map(|el| flattener.flatten(el));
        let mut tags = vec!["ko".to_string()];
        if secondary_text.is_some() {
            tags.push("lzh".to_string());
        }

        Ok(LeafDocument {
            primary_text: flattener.flatten(primary),
            secondary_text,
            title: flattener.flatten(title),
            secondary_title: secondary_title.map(|el| flattener.flatten(el)),
            tags,
        })
    }
}

/// Adapter for the collected works series (`MO`)
///
/// Leaf pages carry only the original text.
#[derive(Debug, Clone)]
pub struct ItkcCollectionAdapter {
    tree: ItkcTree,
}

impl ItkcCollectionAdapter {
    pub fn new(base_url: &str, glyphs: GlyphResolver) -> Result<Self> {
        Ok(Self {
            tree: ItkcTree::new(base_url, ItkcSeries::Mo, glyphs)?,
        })
    }
}

impl SourceAdapter for ItkcCollectionAdapter {
    fn source_id(&self) -> &str {
        ItkcSeries::Mo.source_id()
    }

    fn origin(&self) -> &str {
        &self.tree.origin
    }

    fn listing_url(&self, node_id: &str) -> String {
        self.tree.listing_url(node_id)
    }

    fn leaf_url(&self, leaf_id: &str) -> String {
        self.tree.endpoint("/dir/node", &[("dataId", leaf_id)])
    }

    fn parse_listing(&self, parent_id: &str, raw: &[u8]) -> Result<ListingPage> {
        self.tree.parse_listing(parent_id, raw)
    }

    fn classify(&self, node: &Node) -> NodeKind {
        self.tree.classify(node)
    }

    fn parse_leaf(&self, raw: &[u8]) -> Result<LeafDocument> {
        let document = parse_html(raw);
        let root = document.root_element();
        let flattener = Flattener::new(&self.tree.rules, &self.tree.glyphs);

        let body = select_first(root, "div[class='text_body ori']", "ITKC original body")?;
        let title = select_first(
            root,
            "div[class='text_body_tit mt10 ori']",
            "ITKC original title",
        )?;

        // The title block repeats the location breadcrumb after the first line
        let title = flattener.flatten(title);
        let title = title.lines().next().unwrap_or("").to_string();

        Ok(LeafDocument {
            primary_text: flattener.flatten(body),
            secondary_text: None,
            title,
            secondary_title: None,
            tags: vec!["lzh".to_string()],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "http://db.itkc.or.kr";

    const ROOT_LISTING: &str = r#"
<ul>
  <li data-dataid="ITKC_BT_1300A" class="jstree-closed">
    <span title="국역 연려실기술 | 이긍익">국역 연려실기술(燃藜室記述)</span>
  </li>
  <li data-dataid="ITKC_BT_1301A">
    <span title="국역 동문선">국역 동문선(東文選)</span>
  </li>
</ul>"#;

    const VOLUME_LISTING: &str = r#"
<ul>
  <li data-dataid="ITKC_BT_1300A_0010" data-url="/dir/item?itemId=BT&amp;dataId=ITKC_BT_1300A_0010">
    <span title="제1권 태조조 고사본말">제1권</span>
  </li>
  <li data-dataid="ITKC_BT_1300A_0010_010_0010" data-url="/dir/node?dataId=ITKC_BT_1300A_0010_010_0010&amp;gubun=%EC%B5%9C%EC%A2%85%EC%A0%95%EB%B3%B4">
    <span title="KC01783子와 KC99999">추자</span>
  </li>
</ul>"#;

    const BT_LEAF: &str = r#"
<html><body>
  <div class="text_body_tit">태조조 고사본말<span>국역</span></div>
  <div class="text_body_tit ori">太祖朝故事本末</div>
  <div class="text_body ">첫째 줄<br>둘째 <span>줄</span><img class="newchar" src="/images/KC01783.gif"></div>
  <div class="text_body ori">原文<br>二行</div>
</body></html>"#;

    const MO_LEAF: &str = r#"
<html><body>
  <div class="text_body_tit mt10 ori">詩<br>卷一 ○ 詩</div>
  <div class="text_body ori">春風<br>秋月</div>
</body></html>"#;

    fn bt() -> ItkcBookAdapter {
        ItkcBookAdapter::new(BASE, GlyphResolver::default()).unwrap()
    }

    fn mo() -> ItkcCollectionAdapter {
        ItkcCollectionAdapter::new(BASE, GlyphResolver::default()).unwrap()
    }

    #[test]
    fn test_series_catalog() {
        let catalog = series_catalog();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].id, "BT");
        assert_eq!(catalog[0].name, "고전번역서");
        assert_eq!(catalog[1].id, "MO");
        assert_eq!(catalog[1].name, "한국문집총간");
    }

    #[test]
    fn test_listing_urls() {
        assert_eq!(
            bt().listing_url("BT"),
            "http://db.itkc.or.kr/dir/treeAjax?grpId=&itemId=BT&gubun=book&depth=1"
        );
        assert_eq!(
            mo().listing_url("ITKC_MO_0001A"),
            "http://db.itkc.or.kr/dir/treeAjax?grpId=&itemId=MO&dataId=ITKC_MO_0001A"
        );
    }

    #[test]
    fn test_origin_includes_default_port() {
        assert_eq!(bt().origin(), "db.itkc.or.kr:80");
        assert_eq!(mo().origin(), bt().origin());
    }

    #[test]
    fn test_leaf_urls() {
        assert_eq!(
            bt().leaf_url("ITKC_BT_1300A_0010_010_0010"),
            "http://db.itkc.or.kr/dir/node?dataId=ITKC_BT_1300A_0010_010_0010&viewSync=OT"
        );
        assert_eq!(
            mo().leaf_url("ITKC_MO_0001A_0010"),
            "http://db.itkc.or.kr/dir/node?dataId=ITKC_MO_0001A_0010"
        );
    }

    #[test]
    fn test_root_listing_splits_title_and_attribution() {
        let page = bt().parse_listing("BT", ROOT_LISTING.as_bytes()).unwrap();

        assert_eq!(page.len(), 2);
        let first = &page.nodes[0];
        assert_eq!(first.id, "ITKC_BT_1300A");
        assert_eq!(first.title, "국역 연려실기술");
        assert_eq!(first.variant_title.as_deref(), Some("燃藜室記述"));
        assert_eq!(first.attribution.as_deref(), Some("이긍익"));
        assert_eq!(first.parent_id.as_deref(), Some("BT"));
        assert_eq!(first.kind, NodeKind::Container);

        assert_eq!(page.nodes[1].attribution, None);
        assert!(page.continuation.is_none());
    }

    #[test]
    fn test_root_listing_without_variant_is_data_format_error() {
        let html = r#"<li data-dataid="X"><span title="a | b">괄호 없음</span></li>"#;
        let err = bt().parse_listing("BT", html.as_bytes()).unwrap_err();
        assert!(matches!(err, ArchiveError::DataFormat { .. }));
    }

    #[test]
    fn test_volume_listing_classifies_by_marker() {
        let page = bt()
            .parse_listing("ITKC_BT_1300A", VOLUME_LISTING.as_bytes())
            .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page.nodes[0].title, "제1권 태조조 고사본말");
        assert_eq!(page.nodes[0].kind, NodeKind::Container);

        // Known code substituted, unknown code kept
        assert_eq!(page.nodes[1].title, "楸子와 KC99999");
        assert_eq!(page.nodes[1].kind, NodeKind::Leaf);
        assert!(page.nodes[1]
            .nav_ref
            .as_deref()
            .unwrap()
            .contains(ITKC_TEXT_MARKER));
    }

    #[test]
    fn test_classify_without_nav_ref() {
        let node = Node::new("X", "x", NodeKind::Leaf, None);
        assert_eq!(bt().classify(&node), NodeKind::Container);
    }

    #[test]
    fn test_entry_without_span_is_malformed() {
        let html = r#"<li data-dataid="X"><b>no span</b></li>"#;
        let err = mo().parse_listing("ITKC_MO_1", html.as_bytes()).unwrap_err();
        assert!(matches!(err, ArchiveError::MalformedMarkup { .. }));
    }

    #[test]
    fn test_empty_listing() {
        let page = mo().parse_listing("ITKC_MO_1", b"<ul></ul>").unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_parse_bt_leaf() {
        let doc = bt().parse_leaf(BT_LEAF.as_bytes()).unwrap();

        assert_eq!(doc.title, "태조조 고사본말국역");
        assert_eq!(doc.secondary_title.as_deref(), Some("太祖朝故事本末"));
        assert_eq!(doc.primary_text, "첫째 줄\n둘째줄楸");
        assert_eq!(doc.secondary_text.as_deref(), Some("原文\n二行"));
        assert_eq!(doc.tags, vec!["ko", "lzh"]);
    }

    #[test]
    fn test_parse_bt_leaf_without_original() {
        let html = r#"<div class="text_body_tit">제목</div><div class="text_body ">본문</div>"#;
        let doc = bt().parse_leaf(html.as_bytes()).unwrap();

        assert!(!doc.has_secondary());
        assert_eq!(doc.secondary_title, None);
        assert_eq!(doc.tags, vec!["ko"]);
    }

    #[test]
    fn test_parse_bt_leaf_missing_body() {
        let html = r#"<div class="text_body_tit">제목</div>"#;
        let err = bt().parse_leaf(html.as_bytes()).unwrap_err();
        assert!(matches!(err, ArchiveError::MalformedMarkup { .. }));
    }

    #[test]
    fn test_parse_mo_leaf_takes_first_title_line() {
        let doc = mo().parse_leaf(MO_LEAF.as_bytes()).unwrap();

        assert_eq!(doc.title, "詩");
        assert_eq!(doc.primary_text, "春風\n秋月");
        assert_eq!(doc.secondary_text, None);
        assert_eq!(doc.tags, vec!["lzh"]);
    }

    #[test]
    fn test_parse_mo_leaf_missing_title() {
        let html = r#"<div class="text_body ori">春風</div>"#;
        assert!(mo().parse_leaf(html.as_bytes()).is_err());
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ItkcBookAdapter::new("not a url", GlyphResolver::default()).is_err());
    }
}
