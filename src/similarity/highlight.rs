//! Selection state and the styling derived from it.

use std::collections::HashMap;

use log::{debug, warn};

use super::cluster::{ClusterAssignment, UNCLUSTERED_COLOR};
use super::config::GraphConfig;
use super::links::Link;
use super::matrix::NodeId;

/// Color of the selected node.
pub const SELECTED_COLOR: &str = "#ffffff";

/// Width of links touching the selected node.
pub const EMPHASIZED_LINK_WIDTH: f64 = 5.0;

/// At most one selected node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HighlightController {
	selected: Option<NodeId>,
}

impl HighlightController {
	/// Select `id` if it is one of `known`. Unknown ids are ignored.
	///
	/// Returns whether the selection changed.
	pub fn select(&mut self, id: &NodeId, known: &HashMap<NodeId, usize>) -> bool {
		if !known.contains_key(id) {
			warn!("ignoring selection of unknown node {id}");
			return false;
		}
		if self.selected.as_ref() == Some(id) {
			return false;
		}
		debug!("selected node {id}");
		self.selected = Some(id.clone());
		true
	}

	/// Drop the selection.
	pub fn clear(&mut self) {
		self.selected = None;
	}

	/// The selected id, if any.
	pub fn selected(&self) -> Option<&NodeId> {
		self.selected.as_ref()
	}
}

/// Per-frame styling for the renderer.
///
/// A snapshot of the clusters, the selection and the link settings; every
/// method is a pure function of its argument and this snapshot.
#[derive(Clone, Copy, Debug)]
pub struct Styling<'a> {
	clusters: &'a ClusterAssignment,
	index: &'a HashMap<NodeId, usize>,
	selected: Option<&'a NodeId>,
	config: &'a GraphConfig,
}

impl<'a> Styling<'a> {
	/// Snapshot for the given state.
	pub fn new(
		clusters: &'a ClusterAssignment,
		index: &'a HashMap<NodeId, usize>,
		selected: Option<&'a NodeId>,
		config: &'a GraphConfig,
	) -> Self {
		Self {
			clusters,
			index,
			selected,
			config,
		}
	}

	/// Fill color of node `id`.
	pub fn node_color(&self, id: &NodeId) -> &'a str {
		if self.selected == Some(id) {
			return SELECTED_COLOR;
		}
		self.index
			.get(id)
			.map_or(UNCLUSTERED_COLOR, |&i| self.clusters.color(i))
	}

	/// Stroke width of `link`. Hidden links are zero wide.
	pub fn link_width(&self, link: &Link) -> f64 {
		if !self.config.links_visible {
			return 0.0;
		}
		match self.selected {
			Some(id) if link.touches(id) => EMPHASIZED_LINK_WIDTH,
			_ => self.config.link_width,
		}
	}

	/// Uniform link color.
	pub fn link_color(&self) -> &'a str {
		&self.config.link_color
	}

	/// Whether links are drawn.
	pub fn link_visible(&self) -> bool {
		self.config.links_visible
	}

	/// The selected id.
	pub fn selected(&self) -> Option<&'a NodeId> {
		self.selected
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::similarity::cluster::assign;
	use crate::similarity::matrix::SimilarityMatrix;

	struct Fixture {
		clusters: ClusterAssignment,
		index: HashMap<NodeId, usize>,
		links: Vec<Link>,
		config: GraphConfig,
	}

	fn fixture() -> Fixture {
		let m = SimilarityMatrix::from_rows(
			&[vec![1.0, 0.9, 0.1], vec![0.9, 1.0, 0.3], vec![0.1, 0.3, 1.0]],
			3,
		)
		.unwrap();
		let index = (0..3).map(|i| (NodeId::Int(i as i64), i)).collect();
		let links = vec![
			Link {
				source: NodeId::Int(0),
				target: NodeId::Int(1),
				weight: 0.9,
			},
			Link {
				source: NodeId::Int(1),
				target: NodeId::Int(2),
				weight: 0.3,
			},
		];
		Fixture {
			clusters: assign(&m, 0.55),
			index,
			links,
			config: GraphConfig::default(),
		}
	}

	fn ids() -> Vec<NodeId> {
		vec![
			NodeId::Int(0),
			NodeId::Int(1),
			NodeId::Int(2),
			NodeId::from("stranger"),
		]
	}

	#[test]
	fn selection_overrides_color_and_width() {
		let f = fixture();
		let mut hl = HighlightController::default();
		assert!(hl.select(&NodeId::Int(2), &f.index));
		let s = Styling::new(&f.clusters, &f.index, hl.selected(), &f.config);

		assert_eq!(s.node_color(&NodeId::Int(2)), SELECTED_COLOR);
		assert_eq!(s.node_color(&NodeId::Int(0)), f.clusters.color(0));
		assert_eq!(s.link_width(&f.links[0]), f.config.link_width);
		assert_eq!(s.link_width(&f.links[1]), EMPHASIZED_LINK_WIDTH);
	}

	#[test]
	fn new_selection_replaces_old() {
		let f = fixture();
		let mut hl = HighlightController::default();
		hl.select(&NodeId::Int(0), &f.index);
		hl.select(&NodeId::Int(2), &f.index);
		assert_eq!(hl.selected(), Some(&NodeId::Int(2)));
	}

	#[test]
	fn unknown_id_is_a_noop() {
		let f = fixture();
		let mut hl = HighlightController::default();
		hl.select(&NodeId::Int(1), &f.index);
		assert!(!hl.select(&NodeId::from("stranger"), &f.index));
		assert_eq!(hl.selected(), Some(&NodeId::Int(1)));
	}

	#[test]
	fn clear_restores_defaults() {
		let f = fixture();
		let mut hl = HighlightController::default();
		let before: Vec<_> = {
			let s = Styling::new(&f.clusters, &f.index, hl.selected(), &f.config);
			ids().iter().map(|id| s.node_color(id).to_string()).collect()
		};
		let widths_before: Vec<f64> = {
			let s = Styling::new(&f.clusters, &f.index, hl.selected(), &f.config);
			f.links.iter().map(|l| s.link_width(l)).collect()
		};

		hl.select(&NodeId::Int(1), &f.index);
		hl.clear();

		let s = Styling::new(&f.clusters, &f.index, hl.selected(), &f.config);
		let after: Vec<_> = ids().iter().map(|id| s.node_color(id).to_string()).collect();
		let widths_after: Vec<f64> = f.links.iter().map(|l| s.link_width(l)).collect();
		assert_eq!(before, after);
		assert_eq!(widths_before, widths_after);
		assert_eq!(s.node_color(&NodeId::from("stranger")), UNCLUSTERED_COLOR);
	}

	#[test]
	fn hidden_links_have_no_width() {
		let mut f = fixture();
		f.config.links_visible = false;
		let mut hl = HighlightController::default();
		hl.select(&NodeId::Int(1), &f.index);
		let s = Styling::new(&f.clusters, &f.index, hl.selected(), &f.config);
		assert!(f.links.iter().all(|l| s.link_width(l) == 0.0));
		assert!(!s.link_visible());
		assert_eq!(s.link_color(), "#ffffff");
	}
}
