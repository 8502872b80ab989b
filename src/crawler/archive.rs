//! Archive service - ties one source adapter to the fetcher and the cache
//!
//! Every operation here is a top-level request: it either returns a complete
//! result or fails with the first error encountered, never a partial one.

use crate::cache::{CacheKey, FetchCache};
use crate::config::Config;
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::frontier;
use crate::model::{LeafDocument, ListingPage, Node};
use crate::sources::{adapter_for, SourceAdapter};
use crate::Result;
use std::sync::Arc;

/// A navigable view over one remote archive
#[derive(Clone)]
pub struct Archive {
    adapter: Arc<dyn SourceAdapter>,
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<FetchCache>,
}

impl Archive {
    pub fn new(
        adapter: Arc<dyn SourceAdapter>,
        fetcher: Arc<dyn Fetcher>,
        cache: Arc<FetchCache>,
    ) -> Self {
        Self {
            adapter,
            fetcher,
            cache,
        }
    }

    /// Opens `source_id` over HTTP with the given configuration
    ///
    /// # Arguments
    ///
    /// * `source_id` - One of the registered source ids
    /// * `config` - Supplies base URLs, glyphs and HTTP settings
    /// * `cache` - Shared cache; several archives may use the same one
    ///
    /// # Returns
    ///
    /// * `Ok(Archive)` - Ready to use
    /// * `Err(ArchiveError)` - Unknown source or client construction failure
    pub fn open(source_id: &str, config: &Config, cache: Arc<FetchCache>) -> Result<Self> {
        let adapter = adapter_for(source_id, config)?;
        let fetcher = Arc::new(HttpFetcher::new(&config.http)?);
        Ok(Self::new(adapter, fetcher, cache))
    }

    pub fn adapter(&self) -> &dyn SourceAdapter {
        self.adapter.as_ref()
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    /// Cache namespace: the source id qualified by the remote origin
    fn namespace(&self) -> String {
        format!("{}@{}", self.adapter.source_id(), self.adapter.origin())
    }

    /// Lists the classified children of `node_id`
    pub async fn list_children(&self, node_id: &str) -> Result<ListingPage> {
        let key = CacheKey::listing(&self.namespace(), node_id);
        let url = self.adapter.listing_url(node_id);
        let adapter = &self.adapter;

        self.cache
            .fetch_and_parse(
                &key,
                || self.fetcher.get(&url),
                |raw| adapter.parse_listing(node_id, raw),
            )
            .await
    }

    /// Enumerates every leaf below `root_id` in breadth-first order
    pub async fn enumerate_leaves(&self, root_id: &str) -> Result<Vec<Node>> {
        frontier::enumerate_leaves(root_id, |node_id| async move {
            self.list_children(&node_id).await.map(|page| page.nodes)
        })
        .await
    }

    /// Fetches and parses one leaf document
    pub async fn fetch_leaf(&self, leaf_id: &str) -> Result<LeafDocument> {
        let key = CacheKey::leaf(&self.namespace(), leaf_id);
        let url = self.adapter.leaf_url(leaf_id);
        let adapter = &self.adapter;

        self.cache
            .fetch_and_parse(&key, || self.fetcher.get(&url), |raw| adapter.parse_leaf(raw))
            .await
    }

    /// Fetches the document of every leaf, preserving order
    ///
    /// Documents are fetched one at a time to keep the load on the remote
    /// site low. The first failure aborts the whole request.
    pub async fn resolve_leaves(&self, leaves: &[Node]) -> Result<Vec<(Node, LeafDocument)>> {
        let mut resolved = Vec::with_capacity(leaves.len());

        for (i, leaf) in leaves.iter().enumerate() {
            tracing::debug!("Resolving leaf {}/{}: {}", i + 1, leaves.len(), leaf.id);
            let document = self.fetch_leaf(&leaf.id).await?;
            resolved.push((leaf.clone(), document));
        }

        tracing::info!("Resolved {} leaf documents", resolved.len());
        Ok(resolved)
    }
}
