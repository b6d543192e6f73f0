//! Degree-capped link construction.
//!
//! Pairs are visited in lexicographic `(i, j)` order and a link is kept only
//! while both endpoints are below the cap, so lower indices get first pick.
//! This is greedy thinning, not a top-k selection per node.

use std::collections::HashMap;

use log::debug;
use serde::Serialize;

use super::matrix::{Node, NodeId, SimilarityMatrix};

/// Scores strictly above this produce a link.
pub const LINK_THRESHOLD: f64 = 0.2;

/// Default cap on links touching one node.
pub const DEFAULT_MAX_DEGREE: usize = 80;

/// Weighted undirected link between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Link {
	/// Lower-indexed endpoint.
	pub source: NodeId,
	/// Higher-indexed endpoint.
	pub target: NodeId,
	/// The score that qualified the link.
	pub weight: f64,
}

impl Link {
	/// True when `id` is either endpoint.
	pub fn touches(&self, id: &NodeId) -> bool {
		&self.source == id || &self.target == id
	}
}

/// Build links over `nodes`, indexed like `matrix`.
pub fn build(
	nodes: &[Node],
	matrix: &SimilarityMatrix,
	threshold: f64,
	max_degree: usize,
) -> Vec<Link> {
	debug_assert_eq!(nodes.len(), matrix.len());
	let n = nodes.len().min(matrix.len());
	let mut counts = vec![0usize; n];
	let mut links = Vec::new();

	for i in 0..n {
		for j in i + 1..n {
			let weight = matrix.get(i, j);
			if weight > threshold && counts[i] < max_degree && counts[j] < max_degree {
				links.push(Link {
					source: nodes[i].id.clone(),
					target: nodes[j].id.clone(),
					weight,
				});
				counts[i] += 1;
				counts[j] += 1;
			}
		}
	}

	debug!("build links: nodes={} links={}", n, links.len());
	links
}

/// Number of links touching each node id.
pub fn degrees(links: &[Link]) -> HashMap<&NodeId, usize> {
	let mut out = HashMap::new();
	for link in links {
		*out.entry(&link.source).or_insert(0) += 1;
		*out.entry(&link.target).or_insert(0) += 1;
	}
	out
}
