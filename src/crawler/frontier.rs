//! Breadth-first leaf enumeration
//!
//! The crawler walks a remote containment tree starting from one node id.
//! Each popped id is expanded through an injected `expand` function that
//! returns the node's children, already classified. Leaves are collected,
//! containers go to the back of the frontier.
//!
//! The remote structure is assumed to be a strict tree. No cycle detection is
//! performed: a listing that re-introduces an ancestor id never terminates.

use crate::model::Node;
use crate::Result;
use std::collections::VecDeque;
use std::future::Future;

/// FIFO queue of container ids still to expand
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
}

impl Frontier {
    /// Creates a frontier holding only `root_id`
    pub fn new(root_id: &str) -> Self {
        let mut queue = VecDeque::new();
        queue.push_back(root_id.to_string());
        Self { queue }
    }

    pub fn push(&mut self, node_id: String) {
        self.queue.push_back(node_id);
    }

    pub fn pop(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Enumerates every leaf reachable from `root_id`, in breadth-first order
///
/// # Arguments
///
/// * `root_id` - The container to start from
/// * `expand` - Returns the classified children of a container id
///
/// # Returns
///
/// * `Ok(Vec<Node>)` - All leaves, left to right per level
/// * `Err(ArchiveError)` - The first expansion failure; leaves collected so
///   far are discarded
pub async fn enumerate_leaves<F, Fut>(root_id: &str, mut expand: F) -> Result<Vec<Node>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Vec<Node>>>,
{
    let mut frontier = Frontier::new(root_id);
    let mut leaves = Vec::new();
    let mut expanded = 0usize;

    while let Some(node_id) = frontier.pop() {
        tracing::debug!("Expanding {} ({} queued)", node_id, frontier.len());

        for child in expand(node_id).await? {
            if child.is_leaf() {
                leaves.push(child);
            } else {
                frontier.push(child.id);
            }
        }
        expanded += 1;
    }

    tracing::info!(
        "Enumerated {} leaves below {} across {} containers",
        leaves.len(),
        root_id,
        expanded
    );

    Ok(leaves)
}
