//! User-facing options, validated before they reach the graph.

use super::cluster::CLUSTER_THRESHOLD;
use super::error::{Error, Result};
use super::links::{DEFAULT_MAX_DEGREE, LINK_THRESHOLD};

/// Current graph settings.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphConfig {
	/// Draw links at all.
	pub links_visible: bool,
	/// Baseline link width.
	pub link_width: f64,
	/// Uniform link color, `#rrggbb`.
	pub link_color: String,
	/// Target spacing forwarded to the layout engine.
	pub node_distance: f64,
	/// Slowly orbit the camera every frame.
	pub auto_rotate: bool,
	/// Per-node link cap.
	pub max_degree: usize,
	/// Clustering threshold.
	pub cluster_threshold: f64,
	/// Link threshold.
	pub link_threshold: f64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			links_visible: true,
			link_width: 1.0,
			link_color: "#ffffff".into(),
			node_distance: 120.0,
			auto_rotate: false,
			max_degree: DEFAULT_MAX_DEGREE,
			cluster_threshold: CLUSTER_THRESHOLD,
			link_threshold: LINK_THRESHOLD,
		}
	}
}

/// A single change coming from the controls.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigUpdate {
	/// Show or hide links.
	LinksVisible(bool),
	/// New baseline link width.
	LinkWidth(f64),
	/// New link color.
	LinkColor(String),
	/// New layout spacing.
	NodeDistance(f64),
	/// Toggle auto-rotate.
	AutoRotate(bool),
	/// New link cap.
	MaxDegree(usize),
}

impl ConfigUpdate {
	/// True when the update changes which links exist.
	pub fn rebuilds_links(&self) -> bool {
		matches!(self, ConfigUpdate::MaxDegree(_))
	}
}

impl GraphConfig {
	/// Check every field.
	pub fn validate(&self) -> Result<()> {
		positive("link width", self.link_width)?;
		positive("node distance", self.node_distance)?;
		hex_color("link color", &self.link_color)?;
		nonzero_degree(self.max_degree)?;
		finite("cluster threshold", self.cluster_threshold)?;
		finite("link threshold", self.link_threshold)?;
		Ok(())
	}

	/// Apply `update` if it is valid, otherwise leave `self` untouched.
	pub fn apply(&mut self, update: ConfigUpdate) -> Result<()> {
		match update {
			ConfigUpdate::LinksVisible(v) => self.links_visible = v,
			ConfigUpdate::LinkWidth(w) => self.link_width = positive("link width", w)?,
			ConfigUpdate::LinkColor(c) => {
				hex_color("link color", &c)?;
				self.link_color = c;
			}
			ConfigUpdate::NodeDistance(d) => self.node_distance = positive("node distance", d)?,
			ConfigUpdate::AutoRotate(v) => self.auto_rotate = v,
			ConfigUpdate::MaxDegree(d) => self.max_degree = nonzero_degree(d)?,
		}
		Ok(())
	}
}

fn finite(name: &'static str, value: f64) -> Result<f64> {
	if value.is_finite() {
		Ok(value)
	} else {
		Err(Error::InvalidParameter {
			name,
			message: format!("{value} is not a finite number"),
		})
	}
}

fn positive(name: &'static str, value: f64) -> Result<f64> {
	if finite(name, value)? > 0.0 {
		Ok(value)
	} else {
		Err(Error::InvalidParameter {
			name,
			message: format!("{value} must be greater than zero"),
		})
	}
}

fn nonzero_degree(value: usize) -> Result<usize> {
	if value == 0 {
		return Err(Error::InvalidParameter {
			name: "max degree",
			message: "must be at least 1".into(),
		});
	}
	Ok(value)
}

fn hex_color(name: &'static str, value: &str) -> Result<()> {
	let ok = value.len() == 7
		&& value.starts_with('#')
		&& value[1..].chars().all(|c| c.is_ascii_hexdigit());
	if ok {
		Ok(())
	} else {
		Err(Error::InvalidParameter {
			name,
			message: format!("{value:?} is not a #rrggbb color"),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_valid() {
		GraphConfig::default().validate().unwrap();
	}

	#[test]
	fn applies_valid_updates() {
		let mut cfg = GraphConfig::default();
		cfg.apply(ConfigUpdate::LinkWidth(2.5)).unwrap();
		cfg.apply(ConfigUpdate::LinkColor("#00ff7f".into())).unwrap();
		cfg.apply(ConfigUpdate::AutoRotate(true)).unwrap();
		assert_eq!(cfg.link_width, 2.5);
		assert_eq!(cfg.link_color, "#00ff7f");
		assert!(cfg.auto_rotate);
	}

	#[test]
	fn rejected_updates_leave_config_alone() {
		let mut cfg = GraphConfig::default();
		let before = cfg.clone();
		for update in [
			ConfigUpdate::LinkWidth(0.0),
			ConfigUpdate::LinkWidth(f64::NAN),
			ConfigUpdate::NodeDistance(-5.0),
			ConfigUpdate::LinkColor("white".into()),
			ConfigUpdate::LinkColor("#12345g".into()),
			ConfigUpdate::MaxDegree(0),
		] {
			assert!(matches!(cfg.apply(update), Err(Error::InvalidParameter { .. })));
		}
		assert_eq!(cfg, before);
	}
}
