use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{DocumentError, Result};

/// Size of the drawing surface.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasSize {
	Fixed { width: f64, height: f64 },
	/// Fill the browser viewport and follow window resizes.
	Viewport,
}

/// Tunables for layout, physics and interaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	pub canvas: CanvasSize,
	/// Inset of the white frame drawn behind the scene.
	pub frame_padding: f64,
	pub region_margin: f64,

	pub link_distance: f64,
	pub link_strength: f64,
	pub charge_strength: f64,
	pub center_strength: f64,
	/// Visual radius is `radius_scale * sqrt(footprint)`.
	pub radius_scale: f64,
	pub collision_padding: f64,
	pub collision_iterations: usize,

	pub alpha_min: f64,
	pub alpha_decay: f64,
	pub velocity_decay: f64,
	pub reheat_alpha: f64,

	pub zoom_extent: (f64, f64),
	pub label_gap: f64,
	pub cursor_radius: f64,
	/// Pointer travel (screen pixels) below which a press counts as a click.
	pub click_tolerance: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			canvas: CanvasSize::Fixed {
				width: 960.0,
				height: 500.0,
			},
			frame_padding: 20.0,
			region_margin: 20.0,
			link_distance: 100.0,
			link_strength: 0.5,
			charge_strength: -50.0,
			center_strength: 0.1,
			radius_scale: 4.0,
			collision_padding: 20.0,
			collision_iterations: 3,
			alpha_min: 0.001,
			alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
			velocity_decay: 0.4,
			reheat_alpha: 0.3,
			zoom_extent: (0.5, 2.0),
			label_gap: 4.0,
			cursor_radius: 10.0,
			click_tolerance: 3.0,
		}
	}
}

impl LayoutConfig {
	pub fn viewport() -> Self {
		Self {
			canvas: CanvasSize::Viewport,
			zoom_extent: (0.5, 1.0),
			..Self::default()
		}
	}

	/// Applies a JSON object of overrides on top of `self`; absent keys keep their values.
	pub fn with_overrides(&self, text: &str) -> Result<Self> {
		let mut merged = serde_json::to_value(self)?;
		let Value::Object(overrides) = serde_json::from_str::<Value>(text)? else {
			return Err(DocumentError::Parse(
				"layout overrides must be a JSON object".into(),
			));
		};
		if let Value::Object(fields) = &mut merged {
			fields.extend(overrides);
		}
		Ok(serde_json::from_value(merged)?)
	}

	pub fn node_radius(&self, footprint: f64) -> f64 {
		self.radius_scale * footprint.max(0.0).sqrt()
	}

	pub fn collision_radius(&self, footprint: f64) -> f64 {
		self.node_radius(footprint) + self.collision_padding
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_json_keeps_defaults() {
		let cfg = LayoutConfig::default().with_overrides(
			r#"{"canvas": "viewport", "link_distance": 80, "zoom_extent": [0.25, 4]}"#,
		)
		.unwrap();
		assert_eq!(cfg.canvas, CanvasSize::Viewport);
		assert_eq!(cfg.link_distance, 80.0);
		assert_eq!(cfg.zoom_extent, (0.25, 4.0));
		assert_eq!(cfg.charge_strength, -50.0);
	}

	#[test]
	fn fixed_canvas_from_json() {
		let cfg = LayoutConfig::default()
			.with_overrides(r#"{"canvas": {"fixed": {"width": 640, "height": 480}}}"#)
			.unwrap();
		assert_eq!(
			cfg.canvas,
			CanvasSize::Fixed {
				width: 640.0,
				height: 480.0
			}
		);
	}

	#[test]
	fn overrides_apply_on_top_of_the_viewport_variant() {
		let cfg = LayoutConfig::viewport()
			.with_overrides(r#"{"link_distance": 60}"#)
			.unwrap();
		assert_eq!(cfg.canvas, CanvasSize::Viewport);
		assert_eq!(cfg.zoom_extent, (0.5, 1.0));
		assert_eq!(cfg.link_distance, 60.0);

		assert_eq!(LayoutConfig::viewport().with_overrides("{}").unwrap(), LayoutConfig::viewport());
	}

	#[test]
	fn non_object_overrides_are_rejected() {
		assert!(matches!(
			LayoutConfig::default().with_overrides("[1, 2]"),
			Err(DocumentError::Parse(_))
		));
		assert!(matches!(
			LayoutConfig::default().with_overrides(r#"{"charge_strength": "strong"}"#),
			Err(DocumentError::Parse(_))
		));
	}

	#[test]
	fn radius_grows_with_square_root_of_footprint() {
		let cfg = LayoutConfig::default();
		assert_eq!(cfg.node_radius(25.0), 20.0);
		assert_eq!(cfg.collision_radius(25.0), 40.0);
	}
}
