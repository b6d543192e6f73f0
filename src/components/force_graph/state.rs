use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use nalgebra::{Isometry3, Point3, Vector3};

use crate::similarity::camera::{self, CameraMove, RESET_OFFSET};
use crate::similarity::{GraphData, Link, NodeId};

pub const NODE_RADIUS: f64 = 8.0;
pub const HIT_RADIUS: f64 = 12.0;

const FOV_Y: f64 = PI / 3.0;
const NEAR: f64 = 1.0;
const MIN_DISTANCE: f64 = 10.0;
const MAX_DISTANCE: f64 = 10_000.0;
const DRAG_RADIANS_PER_PX: f64 = 0.005;
// a press that moves less than this is a click
const CLICK_SLOP_PX: f64 = 4.0;

const BASE_DISTANCE: f64 = 120.0;
const BASE_CHARGE: f32 = 150.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Layout spacing grows with the cube root of charge over spring strength.
fn simulation_parameters(node_distance: f64) -> SimulationParameters {
	let scale = (node_distance / BASE_DISTANCE) as f32;
	SimulationParameters {
		force_charge: BASE_CHARGE * scale.powi(3),
		force_spring: 0.05,
		force_max: 100.0,
		node_speed: 3000.0,
		damping_factor: 0.9,
	}
}

#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub id: NodeId,
}

#[derive(Clone, Debug)]
pub struct Edge {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub link: Link,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
	pub eye: Point3<f64>,
	pub look_at: Point3<f64>,
}

impl Default for Camera {
	fn default() -> Self {
		let look_at = Point3::origin();
		Self {
			eye: look_at + RESET_OFFSET,
			look_at,
		}
	}
}

#[derive(Clone, Debug)]
struct CameraTransition {
	from: Camera,
	to: CameraMove,
	elapsed_ms: f64,
}

#[derive(Clone, Debug, Default)]
pub struct OrbitDrag {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub last_x: f64,
	pub moved: bool,
}

/// A node as seen from the camera.
#[derive(Clone, Debug)]
pub struct Projected {
	pub idx: DefaultNodeIdx,
	pub id: NodeId,
	pub x: f64,
	pub y: f64,
	/// Screen pixels per world unit at this depth.
	pub scale: f64,
	pub depth: f64,
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub camera: Camera,
	pub drag: OrbitDrag,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	data: GraphData,
	edges: Vec<Edge>,
	transition: Option<CameraTransition>,
}

impl ForceGraphState {
	pub fn new(data: GraphData, node_distance: f64, width: f64, height: f64) -> Self {
		let mut state = Self {
			graph: ForceGraph::new(simulation_parameters(node_distance)),
			camera: Camera::default(),
			drag: OrbitDrag::default(),
			width,
			height,
			animation_running: true,
			data,
			edges: Vec::new(),
			transition: None,
		};
		let n = state.data.nodes.len().max(1) as f64;
		state.populate(node_distance, |i| {
			let angle = (i as f64) * 2.0 * PI / n;
			((100.0 * angle.cos()) as f32, (100.0 * angle.sin()) as f32)
		});
		state
	}

	/// Rebuild the simulation from `data`, placing node `i` at `position(i)`.
	fn populate(&mut self, node_distance: f64, position: impl Fn(usize) -> (f32, f32)) {
		let mut graph = ForceGraph::new(simulation_parameters(node_distance));
		let mut id_to_idx = HashMap::with_capacity(self.data.nodes.len());

		for (i, node) in self.data.nodes.iter().enumerate() {
			let (x, y) = position(i);
			let idx = graph.add_node(NodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
				},
			});
			id_to_idx.insert(node.id.clone(), idx);
		}

		self.edges.clear();
		for link in &self.data.links {
			if let (Some(&source), Some(&target)) =
				(id_to_idx.get(&link.source), id_to_idx.get(&link.target))
			{
				graph.add_edge(source, target, EdgeData::default());
				self.edges.push(Edge {
					source,
					target,
					link: link.clone(),
				});
			}
		}
		self.graph = graph;
	}

	/// Forward a new spacing to the layout, keeping current positions.
	pub fn set_node_distance(&mut self, node_distance: f64) {
		let mut current = HashMap::with_capacity(self.data.nodes.len());
		self.graph.visit_nodes(|node| {
			current.insert(node.data.user_data.id.clone(), (node.x(), node.y()));
		});
		let ids: Vec<NodeId> = self.data.nodes.iter().map(|n| n.id.clone()).collect();
		self.populate(node_distance, |i| {
			current.get(&ids[i]).copied().unwrap_or_default()
		});
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Layout positions mapped onto the horizontal world plane.
	pub fn world_positions(&self) -> HashMap<DefaultNodeIdx, Point3<f64>> {
		let mut out = HashMap::with_capacity(self.data.nodes.len());
		self.graph.visit_nodes(|node| {
			out.insert(node.index(), Point3::new(node.x() as f64, 0.0, node.y() as f64));
		});
		out
	}

	fn focal_length(&self) -> f64 {
		self.height / 2.0 / (FOV_Y / 2.0).tan()
	}

	/// Screen position, pixel scale and depth of a world point, if in front of the camera.
	pub fn project(&self, p: &Point3<f64>) -> Option<(f64, f64, f64, f64)> {
		let view = Isometry3::look_at_rh(&self.camera.eye, &self.camera.look_at, &Vector3::y());
		let v = view.transform_point(p);
		let depth = -v.z;
		if depth < NEAR {
			return None;
		}
		let scale = self.focal_length() / depth;
		Some((
			self.width / 2.0 + v.x * scale,
			self.height / 2.0 - v.y * scale,
			scale,
			depth,
		))
	}

	/// Visible nodes, farthest first.
	pub fn projected_nodes(&self) -> Vec<Projected> {
		let mut out = Vec::with_capacity(self.data.nodes.len());
		self.graph.visit_nodes(|node| {
			let p = Point3::new(node.x() as f64, 0.0, node.y() as f64);
			if let Some((x, y, scale, depth)) = self.project(&p) {
				out.push(Projected {
					idx: node.index(),
					id: node.data.user_data.id.clone(),
					x,
					y,
					scale,
					depth,
				});
			}
		});
		out.sort_by(|a, b| b.depth.total_cmp(&a.depth));
		out
	}

	/// Nearest node under a screen point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeId> {
		// projected_nodes is farthest first, so the last hit is the nearest
		self.projected_nodes()
			.into_iter()
			.filter(|p| {
				let (dx, dy) = (p.x - sx, p.y - sy);
				(dx * dx + dy * dy).sqrt() < (HIT_RADIUS * p.scale).max(4.0)
			})
			.last()
			.map(|p| p.id)
	}

	pub fn begin_drag(&mut self, x: f64, y: f64) {
		self.drag = OrbitDrag {
			active: true,
			start_x: x,
			start_y: y,
			last_x: x,
			moved: false,
		};
	}

	/// Orbit by horizontal mouse travel.
	pub fn drag_to(&mut self, x: f64, y: f64) {
		if !self.drag.active {
			return;
		}
		let (dx, dy) = (x - self.drag.start_x, y - self.drag.start_y);
		if (dx * dx + dy * dy).sqrt() > CLICK_SLOP_PX {
			self.drag.moved = true;
		}
		let angle = (x - self.drag.last_x) * DRAG_RADIANS_PER_PX;
		self.drag.last_x = x;
		self.transition = None;
		self.camera.eye = camera::orbit(&self.camera.eye, &self.camera.look_at, angle);
	}

	/// Finish a press. Returns true if it was a click rather than a drag.
	pub fn end_drag(&mut self) -> bool {
		let click = self.drag.active && !self.drag.moved;
		self.drag = OrbitDrag::default();
		click
	}

	/// Move the eye toward or away from the look-at point.
	pub fn dolly(&mut self, factor: f64) {
		let offset = self.camera.eye - self.camera.look_at;
		let distance = (offset.norm() * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
		self.transition = None;
		self.camera.eye = self.camera.look_at + offset.normalize() * distance;
	}

	/// Ease the camera back onto the node centroid. No-op without nodes.
	pub fn reset_camera(&mut self) {
		let positions = self.world_positions();
		if let Some(to) = camera::reset_to_centroid(positions.into_values().map(Some)) {
			self.transition = Some(CameraTransition {
				from: self.camera,
				to,
				elapsed_ms: 0.0,
			});
		}
	}

	pub fn tick(&mut self, dt_ms: f64, auto_rotate: bool) {
		if self.animation_running {
			self.graph.update((dt_ms / 1000.0) as f32);
		}

		if let Some(tr) = self.transition.as_mut() {
			tr.elapsed_ms += dt_ms;
			let t = ease_out_cubic((tr.elapsed_ms / tr.to.duration_ms).min(1.0));
			self.camera = Camera {
				eye: tr.from.eye.lerp(&tr.to.eye, t),
				look_at: tr.from.look_at.lerp(&tr.to.look_at, t),
			};
			if t >= 1.0 {
				self.transition = None;
			}
		}

		if auto_rotate && !self.drag.active {
			self.camera.eye = camera::orbit_step(&self.camera.eye, &self.camera.look_at);
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use approx::assert_relative_eq;

	use super::*;
	use crate::similarity::Node;

	fn data() -> GraphData {
		GraphData {
			nodes: vec![Node::new(0, "a"), Node::new(1, "b"), Node::new(2, "c")],
			links: vec![Link {
				source: NodeId::Int(0),
				target: NodeId::Int(1),
				weight: 0.7,
			}],
		}
	}

	#[test]
	fn builds_edges_for_known_endpoints() {
		let mut d = data();
		d.links.push(Link {
			source: NodeId::Int(0),
			target: NodeId::Int(99),
			weight: 0.5,
		});
		let state = ForceGraphState::new(d, 120.0, 800.0, 600.0);
		assert_eq!(state.edges().len(), 1);
		assert_eq!(state.world_positions().len(), 3);
	}

	#[test]
	fn look_at_point_projects_to_center() {
		let state = ForceGraphState::new(data(), 120.0, 800.0, 600.0);
		let (x, y, _, _) = state.project(&state.camera.look_at).unwrap();
		assert_relative_eq!(x, 400.0, epsilon = 1e-9);
		assert_relative_eq!(y, 300.0, epsilon = 1e-9);
	}

	#[test]
	fn points_behind_the_eye_are_culled() {
		let state = ForceGraphState::new(data(), 120.0, 800.0, 600.0);
		let behind = state.camera.eye + (state.camera.eye - state.camera.look_at);
		assert!(state.project(&behind).is_none());
	}

	#[test]
	fn reset_eases_onto_centroid() {
		let mut state = ForceGraphState::new(data(), 120.0, 800.0, 600.0);
		state.animation_running = false;
		state.camera.eye = Point3::new(-40.0, 10.0, 0.0);
		state.reset_camera();
		state.tick(500.0, false);
		state.tick(600.0, false);

		let sum = state.world_positions().into_values().fold(Vector3::zeros(), |s, p| s + p.coords);
		let centroid = Point3::from(sum / 3.0);
		assert_relative_eq!(state.camera.look_at, centroid, epsilon = 1e-6);
		assert_relative_eq!(state.camera.eye, centroid + RESET_OFFSET, epsilon = 1e-6);
	}

	#[test]
	fn auto_rotate_only_when_enabled() {
		let mut state = ForceGraphState::new(data(), 120.0, 800.0, 600.0);
		state.animation_running = false;
		let eye = state.camera.eye;
		state.tick(16.0, false);
		assert_eq!(state.camera.eye, eye);
		state.tick(16.0, true);
		assert_ne!(state.camera.eye, eye);
	}

	#[test]
	fn short_press_is_a_click() {
		let mut state = ForceGraphState::new(data(), 120.0, 800.0, 600.0);
		state.begin_drag(10.0, 10.0);
		state.drag_to(11.0, 10.0);
		assert!(state.end_drag());

		state.begin_drag(10.0, 10.0);
		state.drag_to(60.0, 10.0);
		assert!(!state.end_drag());
	}

	#[test]
	fn dolly_is_clamped() {
		let mut state = ForceGraphState::new(data(), 120.0, 800.0, 600.0);
		for _ in 0..200 {
			state.dolly(0.5);
		}
		let d = (state.camera.eye - state.camera.look_at).norm();
		assert_relative_eq!(d, MIN_DISTANCE, epsilon = 1e-9);
	}
}
