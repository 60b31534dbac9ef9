//! Visual theming for the mesh graph.
//!
//! Colors are organized by what they mean in the mesh: protocol hues for
//! edges, health hues for node status rings, grain tints for boxes, and the
//! marker colors the traffic animation paints with.

use super::types::{BoxKind, HealthStatus, NodeKind, Protocol};

/// RGBA color representation.
#[derive(Clone, Copy, Debug)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for gradients
	pub color_secondary: Color,
	/// Whether to use radial gradient
	pub use_gradient: bool,
	/// Vignette intensity (0.0 = none, 1.0 = strong)
	pub vignette: f64,
}

/// Edge stroke colors, keyed by protocol.
#[derive(Clone, Debug)]
pub struct EdgeStyle {
	pub http: Color,
	pub grpc: Color,
	pub tcp: Color,
	/// Edges with no recognized protocol.
	pub idle: Color,
	/// Stroke for edges carrying errors above the warning level.
	pub degraded: Color,
	pub failure: Color,
	/// Small badge drawn at the midpoint of mTLS-protected edges.
	pub mtls_badge: Color,
}

impl EdgeStyle {
	pub fn protocol_color(&self, protocol: Option<Protocol>) -> Color {
		match protocol {
			Some(Protocol::Http) => self.http,
			Some(Protocol::Grpc) => self.grpc,
			Some(Protocol::Tcp) => self.tcp,
			None => self.idle,
		}
	}
}

/// Node visual style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Whether nodes have inner gradients
	pub use_gradient: bool,
	/// Fill per node kind.
	pub app: Color,
	pub service: Color,
	pub workload: Color,
	pub aggregate: Color,
	/// Ring stroke width for the health indicator.
	pub health_ring_width: f64,
	/// Stroke drawn around the selected element.
	pub selected_border: Color,
	/// Badge background for rank numbers.
	pub rank_badge: Color,
	pub label_color: Color,
}

impl NodeStyle {
	pub fn kind_color(&self, kind: NodeKind) -> Color {
		match kind {
			NodeKind::App => self.app,
			NodeKind::Service => self.service,
			NodeKind::Workload | NodeKind::Box => self.workload,
			NodeKind::Aggregate => self.aggregate,
		}
	}
}

/// Health ring colors.
#[derive(Clone, Debug)]
pub struct HealthStyle {
	pub healthy: Color,
	pub degraded: Color,
	pub failure: Color,
	pub idle: Color,
	pub not_available: Color,
}

impl HealthStyle {
	pub fn status_color(&self, status: HealthStatus) -> Color {
		match status {
			HealthStatus::Healthy => self.healthy,
			HealthStatus::Degraded => self.degraded,
			HealthStatus::Failure => self.failure,
			HealthStatus::Idle => self.idle,
			HealthStatus::NotAvailable => self.not_available,
		}
	}
}

/// Fill tints for grouping boxes, one per grain.
#[derive(Clone, Debug)]
pub struct BoxStyle {
	pub app: Color,
	pub namespace: Color,
	pub cluster: Color,
	pub border: Color,
}

impl BoxStyle {
	pub fn grain_color(&self, kind: Option<BoxKind>) -> Color {
		match kind {
			Some(BoxKind::App) | None => self.app,
			Some(BoxKind::Namespace) => self.namespace,
			Some(BoxKind::Cluster) => self.cluster,
		}
	}
}

/// Colors for the animated traffic markers.
#[derive(Clone, Debug)]
pub struct MarkerStyle {
	/// Core of a successful request marker; the halo takes the edge color.
	pub success_core: Color,
	/// Error marker color.
	pub danger: Color,
	pub tcp_fill: Color,
	pub tcp_border: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub edge: EdgeStyle,
	pub node: NodeStyle,
	pub health: HealthStyle,
	pub boxes: BoxStyle,
	pub markers: MarkerStyle,
}

impl Theme {
	/// Dark dashboard theme (default).
	pub fn dark() -> Self {
		Self {
			name: "dark",
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				color_secondary: Color::rgb(30, 35, 42),
				use_gradient: true,
				vignette: 0.15,
			},
			edge: EdgeStyle {
				http: Color::rgba(110, 159, 255, 0.7),
				grpc: Color::rgba(137, 209, 133, 0.7),
				tcp: Color::rgba(160, 140, 200, 0.7),
				idle: Color::rgba(140, 150, 160, 0.4),
				degraded: Color::rgba(240, 171, 0, 0.8),
				failure: Color::rgba(201, 25, 11, 0.8),
				mtls_badge: Color::rgb(61, 199, 181),
			},
			node: NodeStyle {
				use_gradient: true,
				app: Color::rgb(94, 129, 172),
				service: Color::rgb(100, 148, 160),
				workload: Color::rgb(108, 142, 173),
				aggregate: Color::rgb(143, 163, 180),
				health_ring_width: 2.0,
				selected_border: Color::rgb(255, 255, 255),
				rank_badge: Color::rgba(40, 45, 55, 0.9),
				label_color: Color::rgba(255, 255, 255, 0.85),
			},
			health: HealthStyle {
				healthy: Color::rgb(62, 134, 53),
				degraded: Color::rgb(240, 171, 0),
				failure: Color::rgb(201, 25, 11),
				idle: Color::rgb(140, 150, 160),
				not_available: Color::rgb(100, 105, 115),
			},
			boxes: BoxStyle {
				app: Color::rgba(255, 255, 255, 0.04),
				namespace: Color::rgba(110, 159, 255, 0.05),
				cluster: Color::rgba(137, 209, 133, 0.04),
				border: Color::rgba(160, 170, 185, 0.35),
			},
			markers: MarkerStyle {
				success_core: Color::rgb(255, 255, 255),
				danger: Color::rgb(201, 25, 11),
				tcp_fill: Color::rgb(30, 30, 30),
				tcp_border: Color::rgb(120, 120, 120),
			},
		}
	}

	/// Light theme for embedding in bright host pages.
	pub fn light() -> Self {
		Self {
			name: "light",
			background: BackgroundStyle {
				color: Color::rgb(245, 246, 248),
				color_secondary: Color::rgb(235, 237, 240),
				use_gradient: false,
				vignette: 0.0,
			},
			edge: EdgeStyle {
				http: Color::rgba(0, 102, 204, 0.7),
				grpc: Color::rgba(38, 128, 30, 0.7),
				tcp: Color::rgba(90, 70, 140, 0.7),
				idle: Color::rgba(120, 125, 135, 0.4),
				degraded: Color::rgba(200, 140, 0, 0.85),
				failure: Color::rgba(180, 20, 10, 0.85),
				mtls_badge: Color::rgb(0, 136, 120),
			},
			node: NodeStyle {
				use_gradient: false,
				app: Color::rgb(70, 105, 150),
				service: Color::rgb(75, 125, 140),
				workload: Color::rgb(85, 120, 150),
				aggregate: Color::rgb(120, 140, 160),
				health_ring_width: 2.0,
				selected_border: Color::rgb(30, 30, 30),
				rank_badge: Color::rgba(230, 232, 236, 0.95),
				label_color: Color::rgba(25, 28, 32, 0.9),
			},
			health: HealthStyle {
				healthy: Color::rgb(62, 134, 53),
				degraded: Color::rgb(222, 158, 0),
				failure: Color::rgb(190, 22, 10),
				idle: Color::rgb(130, 135, 145),
				not_available: Color::rgb(150, 155, 165),
			},
			boxes: BoxStyle {
				app: Color::rgba(0, 0, 0, 0.03),
				namespace: Color::rgba(0, 102, 204, 0.05),
				cluster: Color::rgba(38, 128, 30, 0.04),
				border: Color::rgba(90, 95, 105, 0.4),
			},
			markers: MarkerStyle {
				success_core: Color::rgb(255, 255, 255),
				danger: Color::rgb(190, 22, 10),
				tcp_fill: Color::rgb(40, 40, 40),
				tcp_border: Color::rgb(110, 110, 110),
			},
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::dark()
	}
}
