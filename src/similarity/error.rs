//! Error taxonomy for loading, configuring and fetching the graph.

use super::matrix::NodeId;

/// Result alias for the similarity core.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the similarity core and its I/O boundary.
///
/// None of these are fatal: callers log them and keep their last good state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	/// The document has no `people`, or the list is empty.
	#[error("document has no people")]
	NoPeople,

	/// The matrix does not have one row per node.
	#[error("similarity matrix has {found} rows, expected {expected}")]
	RowCount {
		/// Number of nodes.
		expected: usize,
		/// Number of rows found.
		found: usize,
	},

	/// A matrix row does not have one column per node.
	#[error("similarity row {row} has {found} columns, expected {expected}")]
	RowLength {
		/// Offending row index.
		row: usize,
		/// Number of nodes.
		expected: usize,
		/// Number of columns found.
		found: usize,
	},

	/// An off-diagonal score is NaN or infinite.
	#[error("similarity at ({row}, {col}) is not a finite number")]
	NonFinite {
		/// Row index.
		row: usize,
		/// Column index.
		col: usize,
	},

	/// Two nodes share an identifier.
	#[error("duplicate node id {0}")]
	DuplicateId(NodeId),

	/// The document is not valid JSON or has the wrong shape.
	#[error("malformed document: {0}")]
	Parse(String),

	/// A configuration value was rejected.
	#[error("invalid {name}: {message}")]
	InvalidParameter {
		/// Parameter name.
		name: &'static str,
		/// Why it was rejected.
		message: String,
	},

	/// Fetching the similarity document failed.
	#[error("fetch failed: {0}")]
	Fetch(String),

	/// Uploading images failed.
	#[error("upload failed: {0}")]
	Upload(String),
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::Parse(err.to_string())
	}
}
