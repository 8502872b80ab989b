//! Source adapters
//!
//! Each remote archive exposes its containment tree through its own mix of
//! listing endpoints, attribute conventions and markup. A [`SourceAdapter`]
//! knows how to address one archive's listings and leaf pages, how to parse
//! them into the uniform [`Node`]/[`LeafDocument`] model, and how to tell a
//! container from a leaf.
//!
//! # Sources
//!
//! | id | Archive | Adapter |
//! |----|---------|---------|
//! | `itkc-bt` | ITKC translated classics (고전번역서) | [`ItkcBookAdapter`] |
//! | `itkc-mo` | ITKC collected works (한국문집총간) | [`ItkcCollectionAdapter`] |
//! | `sillok` | Annals of the Joseon Dynasty | [`SillokAdapter`] |

mod itkc;
mod markup;
mod sillok;
mod title;

pub use itkc::{series_catalog, ItkcBookAdapter, ItkcCollectionAdapter, ItkcSeries, ITKC_TEXT_MARKER};
pub use markup::{child_element, parse_html, select_all, select_first, select_optional, selector};
pub use sillok::SillokAdapter;
pub use title::{split_attribution, split_title};

use crate::config::Config;
use crate::model::{LeafDocument, ListingPage, Node, NodeKind};
use crate::text::GlyphResolver;
use crate::{ArchiveError, Result};
use std::sync::Arc;
use url::Url;

/// Source ids accepted by [`adapter_for`]
pub const SOURCE_IDS: &[&str] = &["itkc-bt", "itkc-mo", "sillok"];

/// One remote archive's navigation and document conventions
pub trait SourceAdapter: Send + Sync {
    /// Stable identifier
    fn source_id(&self) -> &str;

    /// `host:port` of the remote archive this adapter talks to
    fn origin(&self) -> &str;

    /// The listing endpoint for the children of `node_id`
    fn listing_url(&self, node_id: &str) -> String;

    /// The document endpoint for `leaf_id`
    fn leaf_url(&self, leaf_id: &str) -> String;

    /// Parses a raw listing response into classified child nodes
    ///
    /// # Arguments
    ///
    /// * `parent_id` - The node whose children the listing holds
    /// * `raw` - The response body
    ///
    /// # Returns
    ///
    /// * `Ok(ListingPage)` - Children in listing order
    /// * `Err(ArchiveError)` - `MalformedMarkup` or `DataFormat`
    fn parse_listing(&self, parent_id: &str, raw: &[u8]) -> Result<ListingPage>;

    /// Decides whether `node` is a leaf document or a container
    fn classify(&self, node: &Node) -> NodeKind;

    /// Parses a raw leaf page into a document
    fn parse_leaf(&self, raw: &[u8]) -> Result<LeafDocument>;
}

/// Renders the `host:port` of `url`, with the scheme's default port filled in
pub(crate) fn origin_of(url: &Url) -> String {
    match (url.host_str(), url.port_or_known_default()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        _ => url.as_str().to_string(),
    }
}

/// Builds the adapter registered under `source_id`
///
/// # Arguments
///
/// * `source_id` - One of [`SOURCE_IDS`]
/// * `config` - Supplies base URLs and extra glyphs
///
/// # Returns
///
/// * `Ok(Arc<dyn SourceAdapter>)` - The adapter
/// * `Err(ArchiveError::UnknownSource)` - No such source
pub fn adapter_for(source_id: &str, config: &Config) -> Result<Arc<dyn SourceAdapter>> {
    let glyphs = GlyphResolver::with_extra(&config.glyph_table());

    let adapter: Arc<dyn SourceAdapter> = match source_id {
        "itkc-bt" => Arc::new(ItkcBookAdapter::new(&config.sources.itkc_base_url, glyphs)?),
        "itkc-mo" => Arc::new(ItkcCollectionAdapter::new(
            &config.sources.itkc_base_url,
            glyphs,
        )?),
        "sillok" => Arc::new(SillokAdapter::new(&config.sources.sillok_base_url, glyphs)?),
        other => return Err(ArchiveError::UnknownSource(other.to_string())),
    };

    Ok(adapter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adapter_for_known_sources() {
        let config = Config::default();
        for id in SOURCE_IDS {
            let adapter = adapter_for(id, &config).unwrap();
            assert_eq!(adapter.source_id(), *id);
        }
    }

    #[test]
    fn test_origin_follows_configured_base_url() {
        let mut config = Config::default();
        config.sources.itkc_base_url = "http://127.0.0.1:8089/".to_string();
        config.sources.sillok_base_url = "https://sillok.history.go.kr".to_string();

        assert_eq!(adapter_for("itkc-bt", &config).unwrap().origin(), "127.0.0.1:8089");
        assert_eq!(adapter_for("itkc-mo", &config).unwrap().origin(), "127.0.0.1:8089");
        assert_eq!(
            adapter_for("sillok", &config).unwrap().origin(),
            "sillok.history.go.kr:443"
        );
    }

    #[test]
    fn test_adapter_for_unknown_source() {
        let result = adapter_for("gutenberg", &Config::default());
        assert!(matches!(result, Err(ArchiveError::UnknownSource(s)) if s == "gutenberg"));
    }
}
