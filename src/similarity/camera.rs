//! Camera framing: orbit about a vertical axis and reset onto the centroid.
//!
//! These only compute target positions; the renderer owns the camera.

use nalgebra::{Point3, Rotation3, Vector3};

/// Radians turned per animation tick while auto-rotate is on.
pub const ORBIT_STEP: f64 = 0.004;

/// Eye offset from the centroid after a reset.
pub const RESET_OFFSET: Vector3<f64> = Vector3::new(350.0, 350.0, 350.0);

/// Transition length suggested for a reset, in milliseconds.
pub const RESET_DURATION_MS: f64 = 1000.0;

/// Where the camera should go.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraMove {
	/// New eye position.
	pub eye: Point3<f64>,
	/// New look-at point.
	pub look_at: Point3<f64>,
	/// Suggested transition length.
	pub duration_ms: f64,
}

/// Rotate `eye` by `angle` about the vertical axis through `target`.
///
/// Positive angles take `+x` toward `+z`. Height is unchanged.
pub fn orbit(eye: &Point3<f64>, target: &Point3<f64>, angle: f64) -> Point3<f64> {
	// nalgebra's positive y rotation takes +z toward +x, hence the sign flip
	let rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), -angle);
	target + rotation * (eye - target)
}

/// One auto-rotate tick.
pub fn orbit_step(eye: &Point3<f64>, target: &Point3<f64>) -> Point3<f64> {
	orbit(eye, target, ORBIT_STEP)
}

/// Frame the mean of the resolved positions. `None` when nothing is resolved.
pub fn reset_to_centroid<I>(positions: I) -> Option<CameraMove>
where
	I: IntoIterator<Item = Option<Point3<f64>>>,
{
	let (sum, count) = positions
		.into_iter()
		.flatten()
		.fold((Vector3::zeros(), 0usize), |(sum, count), p| (sum + p.coords, count + 1));
	if count == 0 {
		return None;
	}
	let centroid = Point3::from(sum / count as f64);
	Some(CameraMove {
		eye: centroid + RESET_OFFSET,
		look_at: centroid,
		duration_ms: RESET_DURATION_MS,
	})
}
