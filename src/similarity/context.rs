//! The single owner of everything derived from a loaded matrix.

use std::collections::HashMap;

use log::{info, warn};

use super::cluster::{self, ClusterAssignment};
use super::config::{ConfigUpdate, GraphConfig};
use super::error::Result;
use super::highlight::{HighlightController, Styling};
use super::links::{self, Link};
use super::matrix::{Node, NodeId, SimilarityGraph};

/// Nodes and links handed to the renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	/// Nodes in matrix order.
	pub nodes: Vec<Node>,
	/// Links in scan order.
	pub links: Vec<Link>,
}

#[derive(Clone, Debug)]
struct Loaded {
	graph: SimilarityGraph,
	index: HashMap<NodeId, usize>,
	clusters: ClusterAssignment,
	links: Vec<Link>,
}

impl Loaded {
	fn new(graph: SimilarityGraph, config: &GraphConfig) -> Self {
		let index = graph
			.nodes()
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), i))
			.collect();
		let mut loaded = Self {
			graph,
			index,
			clusters: ClusterAssignment::default(),
			links: Vec::new(),
		};
		loaded.derive(config);
		loaded
	}

	fn derive(&mut self, config: &GraphConfig) {
		let matrix = self.graph.matrix();
		self.clusters = cluster::assign(matrix, config.cluster_threshold);
		self.links = links::build(
			self.graph.nodes(),
			matrix,
			config.link_threshold,
			config.max_degree,
		);
	}
}

/// Config, current graph, and selection, behind one set of operations.
///
/// Every load is a full replace. A failed load leaves the previous graph in
/// place.
#[derive(Clone, Debug, Default)]
pub struct GraphContext {
	config: GraphConfig,
	loaded: Option<Loaded>,
	highlight: HighlightController,
	empty_index: HashMap<NodeId, usize>,
	empty_clusters: ClusterAssignment,
	generation: u64,
}

impl GraphContext {
	/// Context with no graph yet, rejecting an invalid `config`.
	pub fn new(config: GraphConfig) -> Result<Self> {
		config.validate()?;
		Ok(Self {
			config,
			..Self::default()
		})
	}

	/// Replace the current graph and clear the selection.
	pub fn load(&mut self, graph: SimilarityGraph) {
		let loaded = Loaded::new(graph, &self.config);
		info!(
			"loaded graph: {} nodes, {} links, {} clusters",
			loaded.graph.nodes().len(),
			loaded.links.len(),
			loaded.clusters.cluster_count()
		);
		self.loaded = Some(loaded);
		self.highlight.clear();
		self.generation += 1;
	}

	/// Parse, validate and load a document. On failure nothing changes.
	pub fn load_json(&mut self, text: &str) -> Result<()> {
		match SimilarityGraph::from_json(text) {
			Ok(graph) => {
				self.load(graph);
				Ok(())
			}
			Err(err) => {
				warn!("keeping previous graph: {err}");
				Err(err)
			}
		}
	}

	/// Bumped on every successful load.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Whether a graph has been loaded.
	pub fn is_loaded(&self) -> bool {
		self.loaded.is_some()
	}

	/// Current settings.
	pub fn config(&self) -> &GraphConfig {
		&self.config
	}

	/// Apply a validated settings change.
	pub fn apply(&mut self, update: ConfigUpdate) -> Result<()> {
		let rebuild = update.rebuilds_links();
		if let Err(err) = self.config.apply(update) {
			warn!("rejected setting: {err}");
			return Err(err);
		}
		if rebuild {
			if let Some(loaded) = self.loaded.as_mut() {
				loaded.derive(&self.config);
				self.generation += 1;
			}
		}
		Ok(())
	}

	/// Nodes and links for the renderer.
	pub fn graph_data(&self) -> GraphData {
		self.loaded
			.as_ref()
			.map(|l| GraphData {
				nodes: l.graph.nodes().to_vec(),
				links: l.links.clone(),
			})
			.unwrap_or_default()
	}

	/// Number of loaded nodes.
	pub fn node_count(&self) -> usize {
		self.loaded.as_ref().map_or(0, |l| l.graph.nodes().len())
	}

	/// Current cluster assignment, if loaded.
	pub fn clusters(&self) -> Option<&ClusterAssignment> {
		self.loaded.as_ref().map(|l| &l.clusters)
	}

	/// Current links.
	pub fn links(&self) -> &[Link] {
		self.loaded.as_ref().map(|l| l.links.as_slice()).unwrap_or(&[])
	}

	/// Select a node and return the resulting styling.
	pub fn select(&mut self, id: &NodeId) -> Styling<'_> {
		let index = self.loaded.as_ref().map_or(&self.empty_index, |l| &l.index);
		self.highlight.select(id, index);
		self.styling()
	}

	/// Clear the selection and return the default styling.
	pub fn clear_selection(&mut self) -> Styling<'_> {
		self.highlight.clear();
		self.styling()
	}

	/// Styling for the current state.
	pub fn styling(&self) -> Styling<'_> {
		let (clusters, index) = match self.loaded.as_ref() {
			Some(l) => (&l.clusters, &l.index),
			None => (&self.empty_clusters, &self.empty_index),
		};
		Styling::new(clusters, index, self.highlight.selected(), &self.config)
	}

	/// The selected node, if any.
	pub fn selected_node(&self) -> Option<&Node> {
		let loaded = self.loaded.as_ref()?;
		let id = self.highlight.selected()?;
		loaded.index.get(id).map(|&i| &loaded.graph.nodes()[i])
	}
}
