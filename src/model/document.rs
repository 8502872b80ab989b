/// Leaf document and catalog definitions
use serde::{Deserialize, Serialize};

/// Structured text of one leaf page
///
/// The `secondary_*` fields hold a parallel-language variant (usually the
/// Literary Chinese original beside a Korean translation). Not every source
/// provides one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafDocument {
    pub primary_text: String,
    pub secondary_text: Option<String>,
    pub title: String,
    pub secondary_title: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl LeafDocument {
    pub fn has_secondary(&self) -> bool {
        self.secondary_text.is_some()
    }
}

/// One series of an archive catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesInfo {
    pub id: String,
    pub name: String,
}
