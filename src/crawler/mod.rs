//! Crawler module for walking remote archive trees
//!
//! This module contains the traversal logic, including:
//! - HTTP fetching behind the [`Fetcher`] trait
//! - Breadth-first leaf enumeration
//! - The [`Archive`] service combining a source adapter, fetcher and cache

mod archive;
mod fetcher;
mod frontier;

pub use archive::Archive;
pub use fetcher::{build_http_client, Fetcher, HttpFetcher};
pub use frontier::{enumerate_leaves, Frontier};
