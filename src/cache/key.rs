//! Cache key construction

use serde::{Deserialize, Serialize};
use std::fmt;

/// Deterministic cache key
///
/// Covers every parameter that affects a response: the source namespace,
/// the kind of page, and the remote resource id. Rendered as
/// `source/scope/resource`.
///
/// Archives build the namespace as `source_id@host:port`, so two archives
/// on different base URLs never share entries, even through a persisted
/// cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    source: String,
    scope: String,
    resource: String,
}

impl CacheKey {
    pub fn new(
        source: impl Into<String>,
        scope: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            scope: scope.into(),
            resource: resource.into(),
        }
    }

    /// Key for the listing of `node_id`'s children
    pub fn listing(source: &str, node_id: &str) -> Self {
        Self::new(source, "listing", node_id)
    }

    /// Key for the parsed document of `leaf_id`
    pub fn leaf(source: &str, leaf_id: &str) -> Self {
        Self::new(source, "leaf", leaf_id)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.source, self.scope, self.resource)
    }
}
