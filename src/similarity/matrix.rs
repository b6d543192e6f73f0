//! Nodes, the similarity matrix, and validation of the input document.
//!
//! The document is produced upstream by the face-embedding pipeline:
//!
//! ```text
//! {
//!   "people": [ { "id": 0, "img": "/static/images/a.jpg" }, ... ],
//!   "similarities": [ [1.0, 0.42, ...], ... ]
//! }
//! ```
//!
//! Everything is checked here, at the boundary, so the clustering and link
//! passes can index the matrix without further guards.

use std::collections::HashSet;
use std::fmt;

use log::warn;
use serde::{Deserialize, Serialize};

use super::error::{Error, Result};

/// Node identifier as written by the pipeline, either an integer or a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
	/// Numeric id.
	Int(i64),
	/// String id.
	Text(String),
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeId::Int(i) => write!(f, "{i}"),
			NodeId::Text(s) => f.write_str(s),
		}
	}
}

impl From<i64> for NodeId {
	fn from(value: i64) -> Self {
		NodeId::Int(value)
	}
}

impl From<&str> for NodeId {
	fn from(value: &str) -> Self {
		NodeId::Text(value.to_string())
	}
}

/// One face image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	/// Stable id, unique within a load.
	pub id: NodeId,
	/// Image reference. Not interpreted by the core.
	#[serde(default)]
	pub img: String,
}

impl Node {
	/// Node with the given id and image path.
	pub fn new(id: impl Into<NodeId>, img: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			img: img.into(),
		}
	}
}

/// Square, row-major matrix of pairwise similarity scores.
///
/// Symmetry is a caller precondition. The algorithms only read cells with
/// `i < j`, and the diagonal is never read.
#[derive(Clone, Debug, PartialEq)]
pub struct SimilarityMatrix {
	n: usize,
	values: Vec<f64>,
}

impl SimilarityMatrix {
	/// Build from rows, requiring exactly `n` rows of `n` finite values.
	pub fn from_rows(rows: &[Vec<f64>], n: usize) -> Result<Self> {
		if rows.len() != n {
			return Err(Error::RowCount {
				expected: n,
				found: rows.len(),
			});
		}
		let mut values = Vec::with_capacity(n * n);
		for (row, cells) in rows.iter().enumerate() {
			if cells.len() != n {
				return Err(Error::RowLength {
					row,
					expected: n,
					found: cells.len(),
				});
			}
			if let Some(col) = (0..n).find(|&col| col != row && !cells[col].is_finite()) {
				return Err(Error::NonFinite { row, col });
			}
			values.extend_from_slice(cells);
		}
		Ok(Self { n, values })
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.n
	}

	/// True when the matrix has no rows.
	pub fn is_empty(&self) -> bool {
		self.n == 0
	}

	/// Score between `i` and `j`.
	#[inline]
	pub fn get(&self, i: usize, j: usize) -> f64 {
		self.values[i * self.n + j]
	}

	/// Number of `i < j` pairs where `sim[i][j] != sim[j][i]` beyond `tolerance`.
	pub fn asymmetric_pairs(&self, tolerance: f64) -> usize {
		let n = self.n;
		(0..n)
			.flat_map(|i| (i + 1..n).map(move |j| (i, j)))
			.filter(|&(i, j)| (self.get(i, j) - self.get(j, i)).abs() > tolerance)
			.count()
	}

	/// Number of off-diagonal scores outside `[0, 1]`.
	pub fn out_of_range(&self) -> usize {
		let n = self.n;
		(0..n)
			.flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
			.filter(|&(i, j)| !(0.0..=1.0).contains(&self.get(i, j)))
			.count()
	}
}

/// Raw input document, before validation.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SimilarityDocument {
	/// Node list; absent is treated like empty.
	#[serde(default)]
	pub people: Option<Vec<Node>>,
	/// NxN scores; absent is treated like an empty matrix.
	#[serde(default)]
	pub similarities: Option<Vec<Vec<f64>>>,
}

/// A validated node list and its matrix. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct SimilarityGraph {
	nodes: Vec<Node>,
	matrix: SimilarityMatrix,
}

impl SimilarityGraph {
	/// Pair a node list with its matrix, rejecting mismatched shapes.
	pub fn new(nodes: Vec<Node>, rows: &[Vec<f64>]) -> Result<Self> {
		if nodes.is_empty() {
			return Err(Error::NoPeople);
		}
		let mut seen = HashSet::with_capacity(nodes.len());
		if let Some(dup) = nodes.iter().find(|node| !seen.insert(&node.id)) {
			return Err(Error::DuplicateId(dup.id.clone()));
		}
		let matrix = SimilarityMatrix::from_rows(rows, nodes.len())?;

		let asymmetric = matrix.asymmetric_pairs(1e-9);
		if asymmetric > 0 {
			warn!("similarity matrix is not symmetric ({asymmetric} pairs); upper triangle wins");
		}
		let out_of_range = matrix.out_of_range();
		if out_of_range > 0 {
			warn!("{out_of_range} similarity scores fall outside [0, 1]");
		}

		Ok(Self { nodes, matrix })
	}

	/// Validate a parsed document.
	pub fn from_document(doc: SimilarityDocument) -> Result<Self> {
		let nodes = doc.people.unwrap_or_default();
		let rows = doc.similarities.unwrap_or_default();
		Self::new(nodes, &rows)
	}

	/// Parse and validate a JSON document.
	pub fn from_json(text: &str) -> Result<Self> {
		let doc: SimilarityDocument = serde_json::from_str(text)?;
		Self::from_document(doc)
	}

	/// Nodes in matrix order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// The score matrix.
	pub fn matrix(&self) -> &SimilarityMatrix {
		&self.matrix
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_mixed_ids() {
		let graph = SimilarityGraph::from_json(
			r#"{
				"people": [{"id": 0, "img": "a.jpg"}, {"id": "bob", "img": "b.jpg"}],
				"similarities": [[1.0, 0.3], [0.3, 1.0]]
			}"#,
		)
		.unwrap();
		assert_eq!(graph.nodes()[0].id, NodeId::Int(0));
		assert_eq!(graph.nodes()[1].id, NodeId::from("bob"));
		assert_eq!(graph.matrix().get(0, 1), 0.3);
	}

	#[test]
	fn rejects_missing_people() {
		let err = SimilarityGraph::from_json(r#"{"similarities": []}"#).unwrap_err();
		assert_eq!(err, Error::NoPeople);
		let err = SimilarityGraph::from_json(r#"{"people": [], "similarities": []}"#).unwrap_err();
		assert_eq!(err, Error::NoPeople);
	}

	#[test]
	fn missing_similarities_is_a_row_count_error() {
		let err = SimilarityGraph::from_json(r#"{"people": [{"id": 1, "img": "x"}]}"#).unwrap_err();
		assert_eq!(
			err,
			Error::RowCount {
				expected: 1,
				found: 0
			}
		);
	}

	#[test]
	fn rejects_ragged_rows() {
		let nodes = vec![Node::new(0, "a"), Node::new(1, "b")];
		let err = SimilarityGraph::new(nodes, &[vec![1.0, 0.5], vec![0.5]]).unwrap_err();
		assert_eq!(
			err,
			Error::RowLength {
				row: 1,
				expected: 2,
				found: 1
			}
		);
	}

	#[test]
	fn rejects_duplicate_ids() {
		let nodes = vec![Node::new(7, "a"), Node::new(7, "b")];
		let err = SimilarityGraph::new(nodes, &[vec![1.0, 0.5], vec![0.5, 1.0]]).unwrap_err();
		assert_eq!(err, Error::DuplicateId(NodeId::Int(7)));
	}

	#[test]
	fn diagonal_is_not_checked() {
		let nodes = vec![Node::new(0, "a"), Node::new(1, "b")];
		let graph = SimilarityGraph::new(nodes, &[vec![f64::NAN, 0.5], vec![0.5, f64::NAN]]);
		assert!(graph.is_ok());

		let nodes = vec![Node::new(0, "a"), Node::new(1, "b")];
		let err = SimilarityGraph::new(nodes, &[vec![1.0, f64::INFINITY], vec![0.5, 1.0]])
			.unwrap_err();
		assert_eq!(err, Error::NonFinite { row: 0, col: 1 });
	}

	#[test]
	fn asymmetry_and_range_are_reported_not_rejected() {
		let m = SimilarityMatrix::from_rows(&[vec![1.0, 0.9, -0.2], vec![0.1, 1.0, 0.4], vec![-0.2, 0.4, 1.0]], 3)
			.unwrap();
		assert_eq!(m.asymmetric_pairs(1e-9), 1);
		assert_eq!(m.out_of_range(), 2);
	}

	#[test]
	fn malformed_json_is_a_parse_error() {
		let err = SimilarityGraph::from_json("{ not json").unwrap_err();
		assert!(matches!(err, Error::Parse(_)));
	}
}
