//! Host-provided tuning constants for interaction and animation.
//!
//! Everything here is supplied by the host application at startup and never
//! mutated by the graph component.

/// Timing and animation constants for the mesh graph.
#[derive(Clone, Debug)]
pub struct GraphConfig {
	/// Window for a second tap to count as a double tap.
	pub double_tap_ms: f64,
	/// Dwell time before a hover-in gesture fires.
	pub hover_in_ms: f64,
	/// Grace period before a hover-out gesture fires.
	pub hover_out_ms: f64,
	/// Reference edge length for speed normalization: markers on an edge of
	/// this pixel length travel at their nominal speed.
	pub base_edge_length: f64,
	/// Slowest marker speed, in edge lengths per second.
	pub speed_rate_min: f64,
	/// Fastest marker speed, in edge lengths per second.
	pub speed_rate_max: f64,
	/// Response times are clamped into this range (ms) before being mapped
	/// onto the speed band.
	pub speed_response_time_min: f64,
	pub speed_response_time_max: f64,
	/// Nominal speed for TCP markers, which carry no response time.
	pub tcp_speed: f64,
	/// Upper bound of the random spawn jitter, in milliseconds.
	pub spawn_jitter_ms: f64,
	/// Scatter radius for TCP markers around the path, in pixels.
	pub tcp_scatter_px: f64,
	/// Marker-launch interval band for request-rate (http/grpc) edges:
	/// `(shortest_ms, longest_ms)`.
	pub rps_delay_ms: (f64, f64),
	/// Marker-launch interval band for byte-rate (tcp) edges.
	pub tcp_delay_ms: (f64, f64),
	/// Smallest angular gap (radians) a self-loop will be moved into; below
	/// this the node is considered too busy and the loop is left alone.
	pub loop_busy_threshold: f64,
}

impl Default for GraphConfig {
	fn default() -> Self {
		Self {
			double_tap_ms: 350.0,
			hover_in_ms: 260.0,
			hover_out_ms: 100.0,
			base_edge_length: 50.0,
			speed_rate_min: 0.1,
			speed_rate_max: 2.0,
			speed_response_time_min: 0.0,
			speed_response_time_max: 10_000.0,
			tcp_speed: 1.0,
			spawn_jitter_ms: 200.0,
			tcp_scatter_px: 1.5,
			rps_delay_ms: (50.0, 2000.0),
			tcp_delay_ms: (150.0, 2500.0),
			loop_busy_threshold: 1.0,
		}
	}
}
