//! Cluster assignment by a single ordered sweep over the matrix.
//!
//! Index `i` opens a new cluster if nothing has claimed it yet, then pulls
//! every later `j` with `sim[i][j] > threshold` into its own cluster,
//! overwriting whatever `j` had. A node therefore ends up with the cluster of
//! the largest `i < j` that clears the threshold, not the most similar one.
//! This is not a transitive closure; downstream colors depend on the exact
//! overwrite order, so it must stay this way.

use super::matrix::SimilarityMatrix;

/// Scores strictly above this join a cluster.
pub const CLUSTER_THRESHOLD: f64 = 0.55;

/// Cluster colors, cycled by cluster id.
pub const PALETTE: &[&str] = &[
	"#ff5252", "#ffd740", "#69f0ae", "#40c4ff", "#b388ff", "#ff8a65", "#18ffff", "#ff4081",
];

/// Color for ids without an assignment.
pub const UNCLUSTERED_COLOR: &str = "#999999";

/// Palette entry for a cluster id. Colors repeat past `PALETTE.len()` clusters.
pub fn palette_color(cluster_id: usize) -> &'static str {
	PALETTE[cluster_id % PALETTE.len()]
}

/// A node's cluster and its color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cluster {
	/// Dense id, in order of creation.
	pub id: usize,
	/// `palette_color(id)`.
	pub color: &'static str,
}

/// Cluster of every node index in `[0, N)`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterAssignment {
	clusters: Vec<Cluster>,
	count: usize,
}

impl ClusterAssignment {
	/// Cluster of node `index`.
	pub fn get(&self, index: usize) -> Option<Cluster> {
		self.clusters.get(index).copied()
	}

	/// Color of node `index`, or [`UNCLUSTERED_COLOR`].
	pub fn color(&self, index: usize) -> &'static str {
		self.get(index).map_or(UNCLUSTERED_COLOR, |c| c.color)
	}

	/// Number of distinct clusters.
	pub fn cluster_count(&self) -> usize {
		self.count
	}

	/// Number of assigned nodes.
	pub fn len(&self) -> usize {
		self.clusters.len()
	}

	/// True when nothing was assigned.
	pub fn is_empty(&self) -> bool {
		self.clusters.is_empty()
	}

	/// Clusters in node order.
	pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
		self.clusters.iter()
	}
}

/// Assign every node of `matrix` to a cluster.
pub fn assign(matrix: &SimilarityMatrix, threshold: f64) -> ClusterAssignment {
	let n = matrix.len();
	let mut groups: Vec<Option<usize>> = vec![None; n];
	let mut next = 0;

	for i in 0..n {
		let group = match groups[i] {
			Some(g) => g,
			None => {
				groups[i] = Some(next);
				next += 1;
				next - 1
			}
		};
		for j in i + 1..n {
			if matrix.get(i, j) > threshold {
				groups[j] = Some(group);
			}
		}
	}

	// every index was visited by the outer loop, so all slots are filled
	let clusters = groups
		.into_iter()
		.map(|g| {
			let id = g.unwrap_or_default();
			Cluster {
				id,
				color: palette_color(id),
			}
		})
		.collect();

	ClusterAssignment {
		clusters,
		count: next,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn matrix(rows: &[&[f64]]) -> SimilarityMatrix {
		let rows: Vec<Vec<f64>> = rows.iter().map(|r| r.to_vec()).collect();
		SimilarityMatrix::from_rows(&rows, rows.len()).unwrap()
	}

	#[test]
	fn last_qualifying_row_wins() {
		let m = matrix(&[
			&[1.0, 0.1, 0.9],
			&[0.1, 1.0, 0.6],
			&[0.9, 0.6, 1.0],
		]);
		let a = assign(&m, CLUSTER_THRESHOLD);
		assert_eq!(a.get(0).unwrap().id, 0);
		assert_eq!(a.get(1).unwrap().id, 1);
		assert_eq!(a.get(2).unwrap().id, a.get(1).unwrap().id);
		assert_eq!(a.cluster_count(), 2);
	}

	#[test]
	fn no_transitive_closure() {
		// 0~1 and 1~2, but 0 and 2 are unrelated: chains do follow the sweep
		let m = matrix(&[
			&[1.0, 0.8, 0.0, 0.0],
			&[0.8, 1.0, 0.8, 0.0],
			&[0.0, 0.8, 1.0, 0.0],
			&[0.0, 0.0, 0.0, 1.0],
		]);
		let a = assign(&m, CLUSTER_THRESHOLD);
		let ids: Vec<usize> = a.iter().map(|c| c.id).collect();
		assert_eq!(ids, vec![0, 0, 0, 1]);
	}

	#[test]
	fn threshold_is_strict() {
		let m = matrix(&[&[1.0, 0.55], &[0.55, 1.0]]);
		let a = assign(&m, CLUSTER_THRESHOLD);
		assert_eq!(a.cluster_count(), 2);
	}

	#[test]
	fn covers_every_node_with_dense_ids() {
		let n = 12;
		let rows: Vec<Vec<f64>> = (0..n)
			.map(|i| {
				(0..n)
					.map(|j| if (i * 7 + j * 3) % 5 == 0 { 0.9 } else { 0.1 })
					.collect()
			})
			.collect();
		let m = SimilarityMatrix::from_rows(&rows, n).unwrap();
		let a = assign(&m, CLUSTER_THRESHOLD);
		assert_eq!(a.len(), n);
		let max = a.iter().map(|c| c.id).max().unwrap();
		for id in 0..=max {
			assert!(a.iter().any(|c| c.id == id), "gap at cluster {id}");
		}
		assert_eq!(a.cluster_count(), max + 1);
	}

	#[test]
	fn colors_cycle_through_palette() {
		let n = PALETTE.len() + 2;
		let rows = vec![vec![0.0; n]; n];
		let m = SimilarityMatrix::from_rows(&rows, n).unwrap();
		let a = assign(&m, CLUSTER_THRESHOLD);
		assert_eq!(a.cluster_count(), n);
		assert_eq!(a.color(0), "#ff5252");
		assert_eq!(a.color(PALETTE.len()), "#ff5252");
		assert_eq!(a.color(PALETTE.len() + 1), "#ffd740");
		assert_eq!(a.color(n), UNCLUSTERED_COLOR);
	}

	#[test]
	fn repeated_runs_agree() {
		let m = matrix(&[
			&[1.0, 0.7, 0.2],
			&[0.7, 1.0, 0.56],
			&[0.2, 0.56, 1.0],
		]);
		assert_eq!(assign(&m, CLUSTER_THRESHOLD), assign(&m, CLUSTER_THRESHOLD));
	}
}
