//! Data model shared by the crawler, the cache and the source adapters
//!
//! # Components
//!
//! - `Node`: one entry of a remote navigation tree, classified as container or leaf
//! - `ListingPage`: the parsed result of fetching one listing page
//! - `LeafDocument`: the structured text of a leaf page
//! - `SeriesInfo`: one series in an archive's catalog

mod document;
mod node;

pub use document::{LeafDocument, SeriesInfo};
pub use node::{ListingPage, Node, NodeKind};
