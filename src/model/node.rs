/// Tree node definitions for remote navigation listings
///
/// Nodes are value objects produced while parsing a listing page. They are
/// never mutated after creation.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural classification of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Children must be fetched before any text is available
    Container,

    /// An addressable document
    Leaf,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Container => "container",
            Self::Leaf => "leaf",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "container" => Some(Self::Container),
            "leaf" => Some(Self::Leaf),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of a remote hierarchical listing
///
/// `id` is opaque and only unique within one source and series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub title: String,
    pub kind: NodeKind,
    pub parent_id: Option<String>,

    /// Parenthetical variant of the title (e.g. the hanja form)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_title: Option<String>,

    /// Author or attribution text, when the listing carries one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,

    /// Navigation reference the node was discovered through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nav_ref: Option<String>,
}

impl Node {
    /// Creates a node with only the required fields set
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: NodeKind,
        parent_id: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            parent_id: parent_id.map(str::to_string),
            variant_title: None,
            attribution: None,
            nav_ref: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.kind.is_leaf()
    }
}

/// Parsed result of one listing fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingPage {
    /// Child nodes, in the order the source site lists them
    pub nodes: Vec<Node>,

    /// Continuation token when the source paginates a listing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation: Option<String>,
}

impl ListingPage {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes,
            continuation: None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
