//! Live traffic animation along edges.
//!
//! Every edge with renderable traffic owns a set of markers traveling its
//! on-screen path. Marker launch cadence comes from the per-protocol-group
//! calibration in [`super::timing`], travel speed from the edge's response
//! time normalized against its pixel length so long and short edges read at
//! comparable rates. The whole pipeline is rebuilt on every `start`; there
//! is no handoff between overlapping runs.
//!
//! Error discipline: a geometry failure on one edge is logged and skips that
//! edge for the tick, everything else keeps animating. A failure in the
//! outer tick loop is fatal: the animation stops and the error surfaces to
//! the caller, which must call `start` again to resume.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::warn;
use thiserror::Error;
use web_sys::CanvasRenderingContext2d;

use super::config::GraphConfig;
use super::geom::{clamp, EdgePath, Point};
use super::model::GraphModel;
use super::theme::{Color, Theme};
use super::timing::AnimationTimerConfig;
use super::types::Protocol;

/// Nominal frame interval for the 60 Hz tick, used when no wall-clock step
/// is available yet.
const FRAME_MS: f64 = 1000.0 / 60.0;

/// Fatal animation failures. Anything recoverable is logged instead.
#[derive(Debug, Error)]
pub enum TrafficError {
	#[error("animation state references unknown edge {0:?}")]
	UnknownEdge(String),
}

/// How an edge's traffic is rendered, derived from its protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrafficEdgeType {
	/// Requests per second (http, grpc).
	Rps,
	/// Bytes per second.
	Tcp,
	/// No renderable traffic.
	None,
}

fn classify(protocol: Option<Protocol>) -> TrafficEdgeType {
	match protocol {
		Some(Protocol::Http) | Some(Protocol::Grpc) => TrafficEdgeType::Rps,
		Some(Protocol::Tcp) => TrafficEdgeType::Tcp,
		None => TrafficEdgeType::None,
	}
}

/// Deterministic pseudo-random stream for spawn jitter, error draws, and
/// marker scatter. Seeded per edge so tests can pin the sequence.
#[derive(Clone, Debug)]
pub struct JitterSource {
	salt: f64,
	counter: f64,
}

impl JitterSource {
	pub fn new(seed: f64) -> Self {
		Self {
			salt: seed,
			counter: 0.0,
		}
	}

	/// Next value in `[0, 1)`.
	pub fn next_unit(&mut self) -> f64 {
		self.counter += 1.0;
		let seed = self.salt * 7.31 + self.counter * 1.177;
		let x = (seed * 12.9898 + seed * 78.233).sin() * 43758.5453;
		x - x.floor()
	}
}

/// A filled diamond used by the error marker.
#[derive(Clone, Copy, Debug)]
pub struct Diamond {
	pub radius: f64,
	pub fill: Color,
	pub border: Color,
	pub line_width: f64,
}

/// Shape and colors of one traffic marker.
#[derive(Clone, Debug)]
pub enum PointRenderer {
	Circle {
		radius: f64,
		fill: Color,
		border: Color,
		line_width: f64,
	},
	/// Two nested diamonds, the error style.
	ConcentricDiamond { outer: Diamond, inner: Diamond },
}

impl PointRenderer {
	/// Paint the marker at `position` on the overlay context.
	pub fn render(&self, ctx: &CanvasRenderingContext2d, position: Point) {
		match self {
			PointRenderer::Circle {
				radius,
				fill,
				border,
				line_width,
			} => {
				ctx.begin_path();
				let _ = ctx.arc(position.x, position.y, *radius, 0.0, 2.0 * PI);
				ctx.set_fill_style_str(&fill.to_css());
				ctx.fill();
				ctx.set_stroke_style_str(&border.to_css());
				ctx.set_line_width(*line_width);
				ctx.stroke();
			}
			PointRenderer::ConcentricDiamond { outer, inner } => {
				for diamond in [outer, inner] {
					ctx.begin_path();
					ctx.move_to(position.x, position.y - diamond.radius);
					ctx.line_to(position.x + diamond.radius, position.y);
					ctx.line_to(position.x, position.y + diamond.radius);
					ctx.line_to(position.x - diamond.radius, position.y);
					ctx.close_path();
					ctx.set_fill_style_str(&diamond.fill.to_css());
					ctx.fill();
					ctx.set_stroke_style_str(&diamond.border.to_css());
					ctx.set_line_width(diamond.line_width);
					ctx.stroke();
				}
			}
		}
	}
}

/// Marker shapes resolved once per edge at setup time.
#[derive(Clone, Debug)]
struct MarkerPalette {
	success: PointRenderer,
	error: PointRenderer,
	tcp: PointRenderer,
}

impl MarkerPalette {
	fn for_edge(theme: &Theme, protocol: Option<Protocol>) -> Self {
		let line = theme.edge.protocol_color(protocol);
		Self {
			success: PointRenderer::Circle {
				radius: 2.0,
				fill: line.with_alpha(1.0),
				border: theme.markers.success_core,
				line_width: 2.0,
			},
			error: PointRenderer::ConcentricDiamond {
				outer: Diamond {
					radius: 5.0,
					fill: theme.markers.success_core,
					border: theme.markers.danger,
					line_width: 1.0,
				},
				inner: Diamond {
					radius: 2.0,
					fill: theme.markers.danger,
					border: theme.markers.danger,
					line_width: 1.0,
				},
			},
			tcp: PointRenderer::Circle {
				radius: 1.6,
				fill: theme.markers.tcp_fill,
				border: theme.markers.tcp_border,
				line_width: 1.0,
			},
		}
	}
}

/// One marker in flight.
///
/// `speed` is the fraction of the edge traveled per second: 1 crosses the
/// edge in exactly one second, 0.5 in two. `delta` is the normalized
/// position in `[0, 1]`; the marker is retired once it passes 1. `offset`
/// is a small rendering displacement, used to scatter TCP markers so they
/// don't stack exactly on the path.
#[derive(Clone, Debug)]
pub struct TrafficPoint {
	pub speed: f64,
	pub delta: f64,
	pub offset: Point,
	renderer: PointRenderer,
}

/// Spawns markers on a countdown. The countdown resets to the calibrated
/// launch interval each time it fires, and firing is allowed slightly early
/// by a random amount so marker trains don't look synchronized.
#[derive(Clone, Debug)]
struct TrafficPointGenerator {
	launch_interval: Option<f64>,
	countdown: Option<f64>,
	speed: f64,
	error_rate: f64,
	kind: TrafficEdgeType,
	palette: MarkerPalette,
	jitter: JitterSource,
	jitter_cap_ms: f64,
	scatter_px: f64,
}

impl TrafficPointGenerator {
	fn set_timer(&mut self, interval: Option<f64>) {
		self.launch_interval = interval;
		// Start as soon as possible, unless there is no traffic.
		if self.countdown.is_none() {
			self.countdown = interval;
		}
	}

	fn process_step(&mut self, step_ms: f64) -> Option<TrafficPoint> {
		let countdown = self.countdown.as_mut()?;
		*countdown -= step_ms;
		if *countdown <= self.jitter.next_unit() * self.jitter_cap_ms {
			self.countdown = self.launch_interval;
			return Some(self.next_point());
		}
		None
	}

	fn next_point(&mut self) -> TrafficPoint {
		let is_error = self.jitter.next_unit() <= self.error_rate;
		let (renderer, offset) = match self.kind {
			TrafficEdgeType::Tcp => {
				let scatter = Point::new(
					(self.jitter.next_unit() * 2.0 - 1.0) * self.scatter_px,
					(self.jitter.next_unit() * 2.0 - 1.0) * self.scatter_px,
				);
				(self.palette.tcp.clone(), scatter)
			}
			_ if is_error => (self.palette.error.clone(), Point::default()),
			_ => (self.palette.success.clone(), Point::default()),
		};
		TrafficPoint {
			speed: self.speed,
			delta: 0.0,
			offset,
			renderer,
		}
	}
}

/// Per-edge animation state: active markers plus their generator.
#[derive(Clone, Debug)]
pub struct TrafficEdge {
	kind: TrafficEdgeType,
	points: Vec<TrafficPoint>,
	generator: TrafficPointGenerator,
}

impl TrafficEdge {
	fn new(kind: TrafficEdgeType, palette: MarkerPalette, jitter: JitterSource, config: &GraphConfig) -> Self {
		Self {
			kind,
			points: Vec::new(),
			generator: TrafficPointGenerator {
				launch_interval: None,
				countdown: None,
				speed: 0.0,
				error_rate: 0.0,
				kind,
				palette,
				jitter,
				jitter_cap_ms: config.spawn_jitter_ms,
				scatter_px: config.tcp_scatter_px,
			},
		}
	}

	pub fn points(&self) -> &[TrafficPoint] {
		&self.points
	}

	/// Advance every marker and maybe spawn a new one.
	fn process_step(&mut self, step_ms: f64) {
		for point in &mut self.points {
			point.delta += step_ms * point.speed / 1000.0;
		}
		if let Some(point) = self.generator.process_step(step_ms) {
			self.points.push(point);
		}
	}

	/// Markers past the end of the path are done; they are never rendered
	/// beyond progress 1.
	fn remove_finished(&mut self) {
		self.points.retain(|point| point.delta <= 1.0);
	}
}

/// Drives the markers for every edge with traffic.
///
/// Within one tick all edges advance and render in a single synchronous
/// pass; the component schedules ticks on a fixed interval so a slow tick
/// skips frames rather than stacking.
#[derive(Debug)]
pub struct TrafficRenderer {
	rps_timer: AnimationTimerConfig,
	tcp_timer: AnimationTimerConfig,
	edges: HashMap<String, TrafficEdge>,
	previous_timestamp: Option<f64>,
	running: bool,
}

impl TrafficRenderer {
	pub fn new(config: &GraphConfig) -> Self {
		Self {
			rps_timer: AnimationTimerConfig::new(config.rps_delay_ms.0, config.rps_delay_ms.1),
			tcp_timer: AnimationTimerConfig::new(config.tcp_delay_ms.0, config.tcp_delay_ms.1),
			edges: HashMap::new(),
			previous_timestamp: None,
			running: false,
		}
	}

	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Build the per-edge pipelines and begin animating. Any previous run
	/// is discarded first, markers included, and both timer configs are
	/// recalibrated from scratch against the current edge set.
	pub fn start(
		&mut self,
		model: &GraphModel,
		paths: &HashMap<String, EdgePath>,
		theme: &Theme,
		config: &GraphConfig,
	) {
		self.pause();
		self.edges.clear();

		self.rps_timer.reset_calibration();
		self.tcp_timer.reset_calibration();
		for edge in model.edges() {
			match edge.data.protocol {
				Some(Protocol::Grpc) => self.rps_timer.calibrate(edge.data.grpc),
				Some(Protocol::Http) => self.rps_timer.calibrate(edge.data.http),
				Some(Protocol::Tcp) => self.tcp_timer.calibrate(edge.data.tcp),
				None => {}
			}
		}

		for (idx, entry) in model.edges().iter().enumerate() {
			let kind = classify(entry.data.protocol);
			if kind == TrafficEdgeType::None {
				continue;
			}
			let palette = MarkerPalette::for_edge(theme, entry.data.protocol);
			let jitter = JitterSource::new(idx as f64 + 1.0);
			let mut traffic_edge = TrafficEdge::new(kind, palette, jitter, config);
			self.configure_edge(&mut traffic_edge, entry, paths, config);
			self.edges.insert(entry.data.id.clone(), traffic_edge);
		}

		self.running = true;
	}

	/// Stop ticking but keep the edge pipelines.
	pub fn pause(&mut self) {
		self.running = false;
		self.previous_timestamp = None;
	}

	/// Stop ticking and discard all animation state.
	pub fn stop(&mut self) {
		self.pause();
		self.edges.clear();
	}

	fn configure_edge(
		&self,
		traffic_edge: &mut TrafficEdge,
		entry: &super::model::EdgeEntry,
		paths: &HashMap<String, EdgePath>,
		config: &GraphConfig,
	) {
		// Long and short edges should read at comparable angular rates, so
		// nominal speed is scaled by the reference length over the actual
		// pixel length.
		let length_factor = match paths.get(&entry.data.id).map(|path| path.length()) {
			Some(Ok(length)) => config.base_edge_length / length.max(1.0),
			Some(Err(error)) => {
				warn!(
					"mesh-graph: cannot measure edge {:?} for animation: {error}",
					entry.data.id
				);
				1.0
			}
			None => {
				warn!("mesh-graph: no path for edge {:?} yet", entry.data.id);
				1.0
			}
		};

		let generator = &mut traffic_edge.generator;
		match traffic_edge.kind {
			TrafficEdgeType::Rps => {
				let is_http = entry.data.protocol == Some(Protocol::Http);
				let rate = if is_http { entry.data.http } else { entry.data.grpc };
				let percent_err = if is_http {
					entry.data.http_percent_err
				} else {
					entry.data.grpc_percent_err
				};
				generator.speed =
					speed_from_response_time(entry.data.response_time, config) * length_factor;
				generator.error_rate = if percent_err.is_nan() {
					0.0
				} else {
					percent_err / 100.0
				};
				generator.set_timer(self.rps_timer.compute_delay(rate));
			}
			TrafficEdgeType::Tcp => {
				generator.speed = config.tcp_speed * length_factor;
				generator.error_rate = 0.0;
				generator.set_timer(self.tcp_timer.compute_delay(entry.data.tcp));
			}
			TrafficEdgeType::None => {}
		}
	}

	/// One animation tick: advance and expire every edge's markers.
	///
	/// An edge present in the animation state but missing from the model is
	/// an inconsistency the loop cannot recover from; the caller should
	/// stop the animation on `Err`.
	pub fn process_step(&mut self, now_ms: f64, model: &GraphModel) -> Result<(), TrafficError> {
		if !self.running {
			return Ok(());
		}
		let step = match self.previous_timestamp {
			Some(previous) if now_ms > previous => now_ms - previous,
			_ => FRAME_MS,
		};
		for (edge_id, traffic_edge) in &mut self.edges {
			if model.edge_by_id(edge_id).is_none() {
				return Err(TrafficError::UnknownEdge(edge_id.clone()));
			}
			traffic_edge.process_step(step);
			traffic_edge.remove_finished();
		}
		self.previous_timestamp = Some(now_ms);
		Ok(())
	}

	/// Paint every marker onto the overlay context. Hovered and
	/// de-emphasized edges suppress their markers; a geometry failure skips
	/// only the affected edge.
	pub fn render_markers(
		&self,
		ctx: &CanvasRenderingContext2d,
		model: &GraphModel,
		paths: &HashMap<String, EdgePath>,
	) {
		for (edge_id, traffic_edge) in &self.edges {
			let Some(idx) = model.edge_by_id(edge_id) else {
				continue;
			};
			let flags = model.edge(idx).flags;
			if flags.hovered || flags.unhighlighted {
				continue;
			}
			let Some(path) = paths.get(edge_id) else {
				continue;
			};
			for point in &traffic_edge.points {
				match path.point_at(point.delta) {
					Ok(position) => point.renderer.render(ctx, position.offset_by(point.offset)),
					Err(error) => {
						warn!(
							"mesh-graph: skipping markers on edge {edge_id:?} this frame: {error}"
						);
						break;
					}
				}
			}
		}
	}

	#[cfg(test)]
	fn edge_state(&self, edge_id: &str) -> Option<&TrafficEdge> {
		self.edges.get(edge_id)
	}
}

/// Map a response time onto the speed band: fast responses animate fast,
/// and an unknown (NaN) response time counts as "as fast as possible".
fn speed_from_response_time(response_time: f64, config: &GraphConfig) -> f64 {
	if response_time.is_nan() {
		return config.speed_rate_max;
	}
	let delta = clamp(
		response_time,
		config.speed_response_time_min,
		config.speed_response_time_max,
	) / config.speed_response_time_max;
	config.speed_rate_min + (1.0 - delta) * (config.speed_rate_max - config.speed_rate_min)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::mesh_graph::test_fixtures::{elements, node, traffic_edge};

	fn straight_paths(model: &GraphModel, length: f64) -> HashMap<String, EdgePath> {
		model
			.edges()
			.iter()
			.map(|edge| {
				(
					edge.data.id.clone(),
					EdgePath::new(vec![Point::new(0.0, 0.0), Point::new(length, 0.0)]),
				)
			})
			.collect()
	}

	fn started_renderer(model: &GraphModel, length: f64) -> (TrafficRenderer, GraphConfig) {
		let config = GraphConfig::default();
		let mut renderer = TrafficRenderer::new(&config);
		renderer.start(model, &straight_paths(model, length), &Theme::default(), &config);
		(renderer, config)
	}

	#[test]
	fn http_edge_without_traffic_produces_no_markers() {
		let model = GraphModel::build(&elements(
			vec![node("a"), node("b")],
			vec![traffic_edge("e0", "a", "b", Protocol::Http, 0.0)],
		));
		let (mut renderer, _) = started_renderer(&model, 50.0);
		for tick in 0..600 {
			renderer.process_step(tick as f64 * FRAME_MS, &model).unwrap();
		}
		assert!(renderer.edge_state("e0").unwrap().points().is_empty());
	}

	#[test]
	fn unknown_protocol_edge_is_not_animated() {
		let mut edge = traffic_edge("e0", "a", "b", Protocol::Http, 5.0);
		edge.protocol = None;
		let model = GraphModel::build(&elements(vec![node("a"), node("b")], vec![edge]));
		let (renderer, _) = started_renderer(&model, 50.0);
		assert!(renderer.edge_state("e0").is_none());
	}

	#[test]
	fn busy_edge_spawns_and_retires_markers() {
		let model = GraphModel::build(&elements(
			vec![node("a"), node("b")],
			vec![traffic_edge("e0", "a", "b", Protocol::Http, 100.0)],
		));
		let (mut renderer, _) = started_renderer(&model, 50.0);

		let mut saw_marker = false;
		for tick in 1..=240 {
			renderer.process_step(tick as f64 * FRAME_MS, &model).unwrap();
			let points = renderer.edge_state("e0").unwrap().points();
			saw_marker |= !points.is_empty();
			for point in points {
				// Expired markers were swept before we could observe them.
				assert!(point.delta <= 1.0);
			}
			// All markers on an edge share a speed, so spawn order is
			// progress order: oldest first.
			for pair in points.windows(2) {
				assert!(pair[0].delta >= pair[1].delta);
			}
		}
		assert!(saw_marker);
	}

	#[test]
	fn marker_progress_is_monotonic_until_retirement() {
		let config = GraphConfig::default();
		let mut edge = TrafficEdge::new(
			TrafficEdgeType::Rps,
			MarkerPalette::for_edge(&Theme::default(), Some(Protocol::Http)),
			JitterSource::new(1.0),
			&config,
		);
		let renderer = edge.generator.palette.success.clone();
		edge.points.push(TrafficPoint {
			speed: 2.0,
			delta: 0.0,
			offset: Point::default(),
			renderer,
		});

		let mut last = 0.0;
		let mut ticks = 0;
		while !edge.points.is_empty() && ticks < 1000 {
			edge.process_step(FRAME_MS);
			edge.remove_finished();
			if let Some(point) = edge.points.first() {
				assert!(point.delta >= last);
				last = point.delta;
			}
			ticks += 1;
		}
		// Retired exactly once it passed the end of the path.
		assert!(edge.points.is_empty());
		assert!(last <= 1.0);
		assert!(ticks < 1000, "marker never retired");
	}

	#[test]
	fn restart_discards_the_previous_marker_set() {
		let model = GraphModel::build(&elements(
			vec![node("a"), node("b")],
			vec![traffic_edge("e0", "a", "b", Protocol::Http, 100.0)],
		));
		let (mut renderer, config) = started_renderer(&model, 50.0);
		for tick in 1..=120 {
			renderer.process_step(tick as f64 * FRAME_MS, &model).unwrap();
		}
		renderer.start(&model, &straight_paths(&model, 50.0), &Theme::default(), &config);
		assert!(renderer.edge_state("e0").unwrap().points().is_empty());
	}

	#[test]
	fn vanished_edge_is_fatal_for_the_tick_loop() {
		let model = GraphModel::build(&elements(
			vec![node("a"), node("b")],
			vec![traffic_edge("e0", "a", "b", Protocol::Http, 100.0)],
		));
		let (mut renderer, _) = started_renderer(&model, 50.0);
		let empty = GraphModel::build(&elements(vec![], vec![]));
		let error = renderer.process_step(FRAME_MS, &empty).unwrap_err();
		assert!(matches!(error, TrafficError::UnknownEdge(id) if id == "e0"));
	}

	#[test]
	fn unknown_response_time_runs_at_full_speed() {
		let config = GraphConfig::default();
		assert_eq!(speed_from_response_time(f64::NAN, &config), 2.0);
		assert_eq!(speed_from_response_time(0.0, &config), 2.0);
		assert_eq!(speed_from_response_time(10_000.0, &config), 0.1);
		// Far beyond the clamp bound behaves like the bound.
		assert_eq!(speed_from_response_time(50_000.0, &config), 0.1);
	}

	#[test]
	fn long_edges_scale_marker_speed_down() {
		let model = GraphModel::build(&elements(
			vec![node("a"), node("b")],
			vec![traffic_edge("e0", "a", "b", Protocol::Http, 100.0)],
		));
		let (short, _) = started_renderer(&model, 50.0);
		let (long, _) = started_renderer(&model, 200.0);
		let short_speed = short.edge_state("e0").unwrap().generator.speed;
		let long_speed = long.edge_state("e0").unwrap().generator.speed;
		assert!((short_speed / long_speed - 4.0).abs() < 1e-9);
	}

	#[test]
	fn tcp_markers_scatter_around_the_path() {
		let model = GraphModel::build(&elements(
			vec![node("a"), node("b")],
			vec![traffic_edge("e0", "a", "b", Protocol::Tcp, 1024.0)],
		));
		let (mut renderer, config) = started_renderer(&model, 50.0);
		let mut offsets = Vec::new();
		for tick in 1..=1200 {
			renderer.process_step(tick as f64 * FRAME_MS, &model).unwrap();
			for point in renderer.edge_state("e0").unwrap().points() {
				offsets.push(point.offset);
			}
		}
		assert!(!offsets.is_empty());
		assert!(offsets
			.iter()
			.all(|o| o.x.abs() <= config.tcp_scatter_px && o.y.abs() <= config.tcp_scatter_px));
		// The scatter is actually scattered, not a single fixed offset.
		assert!(offsets.iter().any(|o| o.x != offsets[0].x || o.y != offsets[0].y));
	}
}
