//! Similarity-to-graph transform.
//!
//! A validated [`SimilarityGraph`] feeds two independent passes:
//! [`cluster::assign`] colors nodes by an ordered sweep and [`links::build`]
//! picks a degree-capped link set. [`GraphContext`] owns the results along
//! with the selection and settings; [`camera`] holds the framing geometry.

pub mod camera;
pub mod cluster;
pub mod config;
mod context;
mod error;
pub mod highlight;
pub mod links;
mod matrix;

pub use camera::CameraMove;
pub use cluster::{Cluster, ClusterAssignment};
pub use config::{ConfigUpdate, GraphConfig};
pub use context::{GraphContext, GraphData};
pub use error::{Error, Result};
pub use highlight::{HighlightController, Styling};
pub use links::Link;
pub use matrix::{Node, NodeId, SimilarityDocument, SimilarityGraph, SimilarityMatrix};
