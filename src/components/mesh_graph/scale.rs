//! Zoom-dependent scaling configuration for graph visuals.
//!
//! This module centralizes all zoom-dependent visual parameters, making it
//! easy to understand and tune how elements behave at different zoom levels.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: The coordinate system of the graph. Values in
//!   world-space scale proportionally with zoom (appear larger zoomed in).
//! - **Screen-space**: Pixel coordinates on the canvas. Values in
//!   screen-space remain constant regardless of zoom level.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
#[allow(
	dead_code,
	reason = "World/Screen variants complete the API for users customizing ScaleConfig"
)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	/// Use `f64::NEG_INFINITY` or `f64::INFINITY` for unbounded sides.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// Compute the world-space value for a given base value and zoom level.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => {
				// screen_size = world_size * k, so the clamp bounds divide.
				let min_world = min_screen / k;
				let max_world = max_screen / k;
				base.clamp(min_world, max_world)
			}
		}
	}
}

/// Defines how alpha/opacity scales with zoom level.
#[derive(Clone, Debug)]
#[allow(
	dead_code,
	reason = "Constant/Fade variants available for custom alpha behaviors"
)]
pub enum AlphaBehavior {
	/// Constant alpha regardless of zoom.
	Constant,
	/// Alpha scales linearly with zoom, clamped to [0, 1].
	ScaleWithZoom,
	/// Fully visible at `full_alpha_k`, fades to zero at `zero_alpha_k`.
	Fade {
		zero_alpha_k: f64,
		full_alpha_k: f64,
	},
}

impl AlphaBehavior {
	/// Compute alpha multiplier for a given zoom level.
	pub fn apply(&self, k: f64) -> f64 {
		match self {
			AlphaBehavior::Constant => 1.0,
			AlphaBehavior::ScaleWithZoom => k.clamp(0.0, 1.0),
			AlphaBehavior::Fade {
				zero_alpha_k,
				full_alpha_k,
			} => {
				if zero_alpha_k == full_alpha_k {
					return 1.0;
				}
				let t = (k - zero_alpha_k) / (full_alpha_k - zero_alpha_k);
				t.clamp(0.0, 1.0)
			}
		}
	}
}

/// Configuration for node visual scaling.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Base node radius in world units.
	pub radius: f64,
	/// How the node radius scales with zoom.
	pub radius_behavior: ScaleBehavior,
	/// Hit detection radius in world units.
	pub hit_radius: f64,
	/// How hit radius scales with zoom.
	pub hit_behavior: ScaleBehavior,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Minimum zoom level for label font scaling.
	pub label_min_k: f64,
}

/// Configuration for edge visual scaling.
#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Base line width in screen pixels.
	pub line_width: f64,
	/// Hit distance from the path in screen pixels.
	pub hit_distance: f64,
	/// Arrow size in world units.
	pub arrow_size: f64,
	/// How arrow size scales with zoom.
	pub arrow_behavior: ScaleBehavior,
	/// How arrow alpha scales with zoom.
	pub arrow_alpha_behavior: AlphaBehavior,
	/// Minimum alpha to bother drawing arrows.
	pub arrow_cull_alpha: f64,
}

/// Configuration for the small status badges (rank numbers, mTLS locks).
#[derive(Clone, Debug)]
pub struct BadgeScaleConfig {
	/// Badge font size in screen pixels.
	pub font_size: f64,
	/// Badge disc radius in world units.
	pub radius: f64,
	pub radius_behavior: ScaleBehavior,
}

/// Complete scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub node: NodeScaleConfig,
	pub edge: EdgeScaleConfig,
	pub badge: BadgeScaleConfig,
	/// Zoom levels at which label visibility flips. Crossing any of these
	/// while zooming triggers a label refresh.
	pub zoom_label_thresholds: Vec<f64>,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				radius: 6.0,
				radius_behavior: ScaleBehavior::Clamped {
					min_screen: 5.0,
					max_screen: f64::INFINITY,
				},
				hit_radius: 12.0,
				hit_behavior: ScaleBehavior::Clamped {
					min_screen: 5.0,
					max_screen: f64::INFINITY,
				},
				label_size: 10.0,
				label_min_k: 0.5,
			},
			edge: EdgeScaleConfig {
				line_width: 1.5,
				hit_distance: 6.0,
				arrow_size: 5.0,
				arrow_behavior: ScaleBehavior::Clamped {
					min_screen: 0.0,
					max_screen: 18.0,
				},
				arrow_alpha_behavior: AlphaBehavior::ScaleWithZoom,
				arrow_cull_alpha: 0.05,
			},
			badge: BadgeScaleConfig {
				font_size: 8.0,
				radius: 5.0,
				radius_behavior: ScaleBehavior::Clamped {
					min_screen: 4.0,
					max_screen: 14.0,
				},
			},
			zoom_label_thresholds: vec![0.4, 0.7],
		}
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering functions.
/// All sizes are in world-space (ready to use after the canvas transform).
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Current zoom level.
	pub k: f64,
	/// Node radius in world-space.
	pub node_radius: f64,
	/// Hit detection radius in world-space.
	pub hit_radius: f64,
	/// Label font string (e.g. "10px sans-serif").
	pub label_font: String,
	/// Whether labels are visible at this zoom at all.
	pub labels_visible: bool,
	/// Edge line width in world-space.
	pub edge_line_width: f64,
	/// Edge hit distance in world-space.
	pub edge_hit_distance: f64,
	/// Arrow size in world-space.
	pub arrow_size: f64,
	/// Arrow alpha multiplier [0, 1].
	pub arrow_alpha: f64,
	/// Whether to skip drawing arrows (alpha below threshold).
	pub cull_arrows: bool,
	/// Badge disc radius in world-space.
	pub badge_radius: f64,
	/// Badge font string.
	pub badge_font: String,
}

impl ScaledValues {
	/// Compute scaled values from configuration and current zoom level.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let node_radius = config.node.radius_behavior.apply(config.node.radius, k);
		let hit_radius = config.node.hit_behavior.apply(config.node.hit_radius, k);
		let label_font_size = config.node.label_size / k.max(config.node.label_min_k);
		let arrow_alpha = config.edge.arrow_alpha_behavior.apply(k);
		// Below the lowest threshold labels are hidden entirely.
		let labels_visible = config
			.zoom_label_thresholds
			.iter()
			.fold(true, |visible, &threshold| visible && k > threshold);

		Self {
			k,
			node_radius,
			hit_radius,
			label_font: format!("{label_font_size}px sans-serif"),
			labels_visible,
			edge_line_width: config.edge.line_width / k,
			edge_hit_distance: config.edge.hit_distance / k,
			arrow_size: config.edge.arrow_behavior.apply(config.edge.arrow_size, k),
			arrow_alpha,
			cull_arrows: arrow_alpha < config.edge.arrow_cull_alpha,
			badge_radius: config.badge.radius_behavior.apply(config.badge.radius, k),
			badge_font: format!("{}px sans-serif", config.badge.font_size / k.max(0.5)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clamped_behavior_bounds_screen_size() {
		let behavior = ScaleBehavior::Clamped {
			min_screen: 5.0,
			max_screen: 20.0,
		};
		// Zoomed far out, world value grows so screen size stays >= 5.
		assert_eq!(behavior.apply(6.0, 0.1), 50.0);
		// Zoomed far in, world value shrinks so screen size stays <= 20.
		assert_eq!(behavior.apply(6.0, 10.0), 2.0);
	}

	#[test]
	fn labels_hide_below_the_lowest_threshold() {
		let config = ScaleConfig::default();
		assert!(!ScaledValues::new(&config, 0.3).labels_visible);
		assert!(!ScaledValues::new(&config, 0.5).labels_visible);
		assert!(ScaledValues::new(&config, 0.8).labels_visible);
	}
}
