//! Scene state: simulation, viewport, and per-frame edge geometry.
//!
//! Wraps the `force_graph` physics simulation with the indexed topology
//! model, view transforms for pan/zoom, and the per-frame derivation of
//! every edge's on-screen path (straight, bowed for parallel edges, or a
//! two-Bézier self-loop). Rebuilt wholesale on every data refresh.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{
	DefaultNodeIdx, EdgeData as SimEdgeData, ForceGraph, NodeData as SimNodeData,
	SimulationParameters,
};
use log::info;

use super::config::GraphConfig;
use super::declutter::{declutter_loop, LoopPlacement};
use super::geom::{distance, EdgePath, Point};
use super::model::{ElementRef, GraphModel};
use super::scale::ScaledValues;
use super::types::{BoxKind, GraphElements};

/// Per-node payload carried inside the simulation.
#[derive(Clone, Debug)]
pub struct NodeVisual {
	pub id: String,
	pub model_idx: usize,
	/// Size multiplier (1.0 = normal, >1.0 = more connected/important).
	pub size: f64,
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
	pub moved: bool,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
	pub moved: bool,
}

/// Per-edge scene data that persists across frames within one refresh.
#[derive(Clone, Debug)]
struct EdgeScene {
	loop_placement: LoopPlacement,
	/// Signed bow factor among parallel edges sharing the same endpoints;
	/// zero draws straight.
	bow_factor: f64,
}

/// Named presets for the layout capability. Layout itself is delegated to
/// the force simulation; a preset only tunes its parameters.
pub fn layout_parameters(name: &str) -> SimulationParameters {
	match name {
		"compact" => SimulationParameters {
			force_charge: 90.0,
			force_spring: 0.08,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		},
		// "mesh" and anything unrecognized.
		_ => SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		},
	}
}

/// Core scene state combining the topology model with the physics
/// simulation, interaction state, and derived edge geometry.
pub struct MeshGraphState {
	pub model: GraphModel,
	pub sim: ForceGraph<NodeVisual, ()>,
	id_to_sim: HashMap<String, DefaultNodeIdx>,
	/// Current pixel position per model node index, refreshed each frame.
	positions: HashMap<usize, Point>,
	edge_scene: Vec<EdgeScene>,
	/// Current on-screen path per edge id, refreshed each frame.
	pub paths: HashMap<String, EdgePath>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	pub flow_time: f64,
	/// Cached label visibility, refreshed on zoom-threshold crossings.
	pub labels_visible: bool,
	pub custom_viewport: bool,
}

impl MeshGraphState {
	pub fn new(elements: &GraphElements, width: f64, height: f64, layout: &str) -> Self {
		let model = GraphModel::build(elements);
		let mut sim = ForceGraph::new(layout_parameters(layout));
		let mut id_to_sim = HashMap::new();

		// Connection count drives node sizing, like importance at a glance.
		let mut edge_counts: HashMap<usize, usize> = HashMap::new();
		for edge in model.edges() {
			*edge_counts.entry(edge.source).or_insert(0) += 1;
			*edge_counts.entry(edge.target).or_insert(0) += 1;
		}
		let max_edges = edge_counts.values().copied().max().unwrap_or(1).max(1);

		let concrete: Vec<usize> = (0..model.nodes().len())
			.filter(|&idx| !model.node(idx).data.is_box())
			.collect();
		for (i, &model_idx) in concrete.iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / concrete.len().max(1) as f64;
			let (x, y) = (
				(width / 2.0 + 100.0 * angle.cos()) as f32,
				(height / 2.0 + 100.0 * angle.sin()) as f32,
			);
			let node_edges = edge_counts.get(&model_idx).copied().unwrap_or(0);
			let edge_factor = (node_edges as f64 / max_edges as f64).sqrt();
			let entry = model.node(model_idx);
			let sim_idx = sim.add_node(SimNodeData {
				x,
				y,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeVisual {
					id: entry.data.id.clone(),
					model_idx,
					size: 1.0 + 0.8 * edge_factor,
				},
			});
			id_to_sim.insert(entry.data.id.clone(), sim_idx);
		}

		for edge in model.edges() {
			if let (Some(&src), Some(&tgt)) = (
				id_to_sim.get(&model.node(edge.source).data.id),
				id_to_sim.get(&model.node(edge.target).data.id),
			) {
				if src != tgt {
					sim.add_edge(src, tgt, SimEdgeData::default());
				}
			}
		}

		let edge_scene = build_edge_scene(&model);

		Self {
			model,
			sim,
			id_to_sim,
			positions: HashMap::new(),
			edge_scene,
			paths: HashMap::new(),
			transform: ViewTransform {
				x: 0.0,
				y: 0.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
			animation_running: true,
			flow_time: 0.0,
			labels_visible: true,
			custom_viewport: false,
		}
	}

	pub fn sim_idx(&self, id: &str) -> Option<DefaultNodeIdx> {
		self.id_to_sim.get(id).copied()
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Advance the physics simulation and refresh derived geometry.
	pub fn tick(&mut self, dt: f32) {
		self.sim.update(dt);
		self.flow_time += dt as f64;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Pixel position of a node: its simulation position, or the center of
	/// its bounds for a box.
	pub fn node_position(&self, model_idx: usize) -> Option<Point> {
		if let Some(&position) = self.positions.get(&model_idx) {
			return Some(position);
		}
		self.box_bounds(model_idx)
			.map(|(min, max)| Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0))
	}

	/// Bounding rectangle of a box from its concrete members, padded by
	/// grain so nested boxes stay visually distinct.
	pub fn box_bounds(&self, model_idx: usize) -> Option<(Point, Point)> {
		let entry = self.model.node(model_idx);
		if !entry.data.is_box() {
			return None;
		}
		let padding = match entry.data.box_kind {
			Some(BoxKind::App) | None => 14.0,
			Some(BoxKind::Namespace) => 24.0,
			Some(BoxKind::Cluster) => 34.0,
		};
		let mut bounds: Option<(Point, Point)> = None;
		for member in self.model.descendants_of(model_idx) {
			let Some(&position) = self.positions.get(&member) else {
				continue;
			};
			bounds = Some(match bounds {
				None => (position, position),
				Some((min, max)) => (
					Point::new(min.x.min(position.x), min.y.min(position.y)),
					Point::new(max.x.max(position.x), max.y.max(position.y)),
				),
			});
		}
		bounds.map(|(min, max)| {
			(
				Point::new(min.x - padding, min.y - padding),
				Point::new(max.x + padding, max.y + padding),
			)
		})
	}

	/// Recompute node positions and every edge's control points for this
	/// frame. Must run before hit-testing, marker advancement, or painting.
	pub fn refresh_geometry(&mut self, scale: &ScaledValues) {
		self.positions.clear();
		let positions = &mut self.positions;
		self.sim.visit_nodes(|node| {
			positions.insert(
				node.data.user_data.model_idx,
				Point::new(node.x() as f64, node.y() as f64),
			);
		});

		self.paths.clear();
		for (edge_idx, edge) in self.model.edges().iter().enumerate() {
			let scene = &self.edge_scene[edge_idx];
			let Some(source) = self.node_position_inner(edge.source) else {
				continue;
			};
			if edge.data.is_loop() {
				let radius = scale.node_radius * self.visual_size(edge.source);
				self.paths.insert(
					edge.data.id.clone(),
					loop_path(source, radius, scene.loop_placement),
				);
				continue;
			}
			let Some(target) = self.node_position_inner(edge.target) else {
				continue;
			};
			let dist = distance(source, target);
			if dist < f64::EPSILON {
				continue;
			}
			let (ux, uy) = ((target.x - source.x) / dist, (target.y - source.y) / dist);
			let source_trim = scale.node_radius * self.visual_size(edge.source);
			let target_trim = scale.node_radius * self.visual_size(edge.target);
			let start = Point::new(source.x + ux * source_trim, source.y + uy * source_trim);
			let end = Point::new(target.x - ux * target_trim, target.y - uy * target_trim);
			let path = if scene.bow_factor == 0.0 {
				EdgePath::new(vec![start, end])
			} else {
				// Perpendicular bow spreads parallel edges apart.
				let bow = dist * 0.12 * scene.bow_factor;
				let mid = Point::new(
					(start.x + end.x) / 2.0 - uy * bow,
					(start.y + end.y) / 2.0 + ux * bow,
				);
				EdgePath::new(vec![start, mid, end])
			};
			self.paths.insert(edge.data.id.clone(), path);
		}
	}

	fn node_position_inner(&self, model_idx: usize) -> Option<Point> {
		self.positions.get(&model_idx).copied().or_else(|| {
			self.box_bounds(model_idx)
				.map(|(min, max)| Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0))
		})
	}

	fn visual_size(&self, model_idx: usize) -> f64 {
		let id = &self.model.node(model_idx).data.id;
		let mut size = 1.0;
		if let Some(&sim_idx) = self.id_to_sim.get(id) {
			self.sim.visit_nodes(|node| {
				if node.index() == sim_idx {
					size = node.data.user_data.size;
				}
			});
		}
		size
	}

	/// Re-angle self-loops that collide with sibling edges. Runs once the
	/// layout has settled; requires fresh geometry.
	pub fn fix_loop_overlaps(&mut self, scale: &ScaledValues, config: &GraphConfig) {
		let mut updates: Vec<(usize, LoopPlacement)> = Vec::new();
		for (edge_idx, edge) in self.model.edges().iter().enumerate() {
			if !edge.data.is_loop() {
				continue;
			}
			let Some(center) = self.node_position_inner(edge.source) else {
				continue;
			};
			let Some(path) = self.paths.get(&edge.data.id) else {
				continue;
			};
			let points = path.points();
			if points.len() != 5 {
				continue;
			}
			let loop_ends = (points[0], points[4]);

			// For every sibling, the endpoint nearest the shared node.
			let mut sibling_ends = Vec::new();
			for sibling_idx in self.model.incident_edges(edge.source) {
				if sibling_idx == edge_idx {
					continue;
				}
				let sibling = self.model.edge(sibling_idx);
				let Some(sibling_path) = self.paths.get(&sibling.data.id) else {
					continue;
				};
				let sibling_points = sibling_path.points();
				let (Some(&first), Some(&last)) =
					(sibling_points.first(), sibling_points.last())
				else {
					continue;
				};
				sibling_ends.push(if distance(first, center) <= distance(last, center) {
					first
				} else {
					last
				});
			}

			if let Some(placement) =
				declutter_loop(center, loop_ends, &sibling_ends, config.loop_busy_threshold)
			{
				updates.push((edge_idx, placement));
			}
		}
		if updates.is_empty() {
			return;
		}
		for (edge_idx, placement) in updates {
			self.edge_scene[edge_idx].loop_placement = placement;
		}
		self.refresh_geometry(scale);
	}

	/// Topmost element under a screen position: concrete nodes first, then
	/// edges, then boxes innermost grain first.
	pub fn element_at_position(&self, sx: f64, sy: f64, scale: &ScaledValues) -> Option<ElementRef> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let cursor = Point::new(gx, gy);

		let mut found: Option<ElementRef> = None;
		let positions = &self.positions;
		self.sim.visit_nodes(|node| {
			let user = &node.data.user_data;
			let Some(&position) = positions.get(&user.model_idx) else {
				return;
			};
			let hit_radius = scale.hit_radius * user.size;
			if distance(position, cursor) < hit_radius {
				found = Some(ElementRef::Node(user.id.clone()));
			}
		});
		if found.is_some() {
			return found;
		}

		for edge in self.model.edges() {
			let Some(path) = self.paths.get(&edge.data.id) else {
				continue;
			};
			if path_hit(path, cursor, scale.edge_hit_distance) {
				return Some(ElementRef::Edge(edge.data.id.clone()));
			}
		}

		// Innermost grain wins among nested boxes.
		let mut boxes: Vec<usize> = (0..self.model.nodes().len())
			.filter(|&idx| self.model.node(idx).data.is_box())
			.collect();
		boxes.sort_by_key(|&idx| std::cmp::Reverse(self.model.node(idx).data.box_kind));
		for idx in boxes {
			if let Some((min, max)) = self.box_bounds(idx) {
				if cursor.x >= min.x && cursor.x <= max.x && cursor.y >= min.y && cursor.y <= max.y
				{
					return Some(ElementRef::Node(self.model.node(idx).data.id.clone()));
				}
			}
		}

		None
	}

	/// Fit the viewport to the given node ids, or to everything when empty.
	pub fn fit_to(&mut self, ids: &[String]) {
		let mut bounds: Option<(Point, Point)> = None;
		let mut include = |position: Point| {
			bounds = Some(match bounds {
				None => (position, position),
				Some((min, max)) => (
					Point::new(min.x.min(position.x), min.y.min(position.y)),
					Point::new(max.x.max(position.x), max.y.max(position.y)),
				),
			});
		};
		if ids.is_empty() {
			for &position in self.positions.values() {
				include(position);
			}
		} else {
			for id in ids {
				if let Some(position) = self
					.model
					.node_by_id(id)
					.and_then(|idx| self.node_position_inner(idx))
				{
					include(position);
				}
			}
		}
		let Some((min, max)) = bounds else {
			return;
		};

		const FIT_PADDING: f64 = 60.0;
		let span_x = (max.x - min.x) + FIT_PADDING;
		let span_y = (max.y - min.y) + FIT_PADDING;
		let k = (self.width / span_x)
			.min(self.height / span_y)
			.clamp(0.1, 2.5);
		let center = Point::new((min.x + max.x) / 2.0, (min.y + max.y) / 2.0);
		self.transform.k = k;
		self.transform.x = self.width / 2.0 - center.x * k;
		self.transform.y = self.height / 2.0 - center.y * k;
	}

	/// Center the viewport on a requested focus target. Returns false when
	/// the selector matches nothing, so the host can tell the user.
	pub fn focus(&mut self, id: &str) -> bool {
		let Some(idx) = self.model.node_by_id(id) else {
			return false;
		};
		let Some(position) = self.node_position_inner(idx) else {
			return false;
		};
		info!("mesh-graph: focusing on {id:?}");
		self.transform.x = self.width / 2.0 - position.x * self.transform.k;
		self.transform.y = self.height / 2.0 - position.y * self.transform.k;
		true
	}

	/// Zoom about a screen-space anchor point, clamped to sane bounds.
	pub fn zoom_by(&mut self, factor: f64, anchor_x: f64, anchor_y: f64) -> f64 {
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = anchor_x - (anchor_x - self.transform.x) * ratio;
		self.transform.y = anchor_y - (anchor_y - self.transform.y) * ratio;
		self.transform.k = new_k;
		new_k
	}
}

/// Assign bow factors: edges sharing the same endpoint pair (in either
/// direction) spread apart; a pair's sole edge stays straight.
fn build_edge_scene(model: &GraphModel) -> Vec<EdgeScene> {
	let mut groups: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
	for (edge_idx, edge) in model.edges().iter().enumerate() {
		let key = (
			edge.source.min(edge.target),
			edge.source.max(edge.target),
		);
		groups.entry(key).or_default().push(edge_idx);
	}

	let mut scene: Vec<EdgeScene> = model
		.edges()
		.iter()
		.map(|_| EdgeScene {
			loop_placement: LoopPlacement::default(),
			bow_factor: 0.0,
		})
		.collect();
	for members in groups.values() {
		let count = members.len();
		for (i, &edge_idx) in members.iter().enumerate() {
			scene[edge_idx].bow_factor = i as f64 - (count - 1) as f64 / 2.0;
		}
	}
	scene
}

/// Build the 5-point self-loop path: out from the node circle along the
/// placement angles, meeting at an apex in the placement direction.
fn loop_path(center: Point, radius: f64, placement: LoopPlacement) -> EdgePath {
	let unit = |angle: f64| Point::new(angle.sin(), angle.cos());
	let half = placement.sweep.abs() / 2.0;
	let (a0, a1) = (placement.direction - half, placement.direction + half);
	let extent = radius.max(4.0) * 3.5;
	let u0 = unit(a0);
	let u1 = unit(a1);
	let apex = unit(placement.direction);
	EdgePath::new(vec![
		Point::new(center.x + u0.x * radius, center.y + u0.y * radius),
		Point::new(center.x + u0.x * extent, center.y + u0.y * extent),
		Point::new(center.x + apex.x * extent * 1.2, center.y + apex.y * extent * 1.2),
		Point::new(center.x + u1.x * extent, center.y + u1.y * extent),
		Point::new(center.x + u1.x * radius, center.y + u1.y * radius),
	])
}

/// Sampled distance test between a cursor and an edge path.
fn path_hit(path: &EdgePath, cursor: Point, max_distance: f64) -> bool {
	const SAMPLES: usize = 24;
	for i in 0..=SAMPLES {
		let t = i as f64 / SAMPLES as f64;
		if let Ok(point) = path.point_at(t) {
			if distance(point, cursor) <= max_distance {
				return true;
			}
		}
	}
	false
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::mesh_graph::scale::ScaleConfig;
	use crate::components::mesh_graph::test_fixtures::{edge, elements, node, traffic_edge};
	use crate::components::mesh_graph::types::Protocol;

	fn scale() -> ScaledValues {
		ScaledValues::new(&ScaleConfig::default(), 1.0)
	}

	fn two_node_state() -> MeshGraphState {
		let mut state = MeshGraphState::new(
			&elements(
				vec![node("a"), node("b")],
				vec![edge("e0", "a", "b")],
			),
			800.0,
			600.0,
			"mesh",
		);
		state.refresh_geometry(&scale());
		state
	}

	#[test]
	fn sole_edge_between_nodes_is_straight() {
		let state = two_node_state();
		assert_eq!(state.paths["e0"].points().len(), 2);
	}

	#[test]
	fn parallel_edges_bow_apart() {
		let mut state = MeshGraphState::new(
			&elements(
				vec![node("a"), node("b")],
				vec![edge("e0", "a", "b"), edge("e1", "b", "a")],
			),
			800.0,
			600.0,
			"mesh",
		);
		state.refresh_geometry(&scale());
		assert_eq!(state.paths["e0"].points().len(), 3);
		assert_eq!(state.paths["e1"].points().len(), 3);
		// The two bows land on opposite sides.
		let mid0 = state.paths["e0"].point_at(0.5).unwrap();
		let mid1 = state.paths["e1"].point_at(0.5).unwrap();
		assert!(distance(mid0, mid1) > 1.0);
	}

	#[test]
	fn self_loop_gets_a_five_point_path() {
		let mut state = MeshGraphState::new(
			&elements(
				vec![node("a"), node("b")],
				vec![edge("e0", "a", "a"), edge("e1", "a", "b")],
			),
			800.0,
			600.0,
			"mesh",
		);
		state.refresh_geometry(&scale());
		assert_eq!(state.paths["e0"].points().len(), 5);
	}

	#[test]
	fn hit_testing_finds_the_node_under_the_cursor() {
		let state = two_node_state();
		let a_idx = state.model.node_by_id("a").unwrap();
		let position = state.node_position(a_idx).unwrap();
		// Identity transform, so graph coords are screen coords.
		let hit = state.element_at_position(position.x, position.y, &scale());
		assert_eq!(hit, Some(ElementRef::Node("a".into())));
	}

	#[test]
	fn hit_testing_misses_empty_canvas() {
		let state = two_node_state();
		assert_eq!(state.element_at_position(-5000.0, -5000.0, &scale()), None);
	}

	#[test]
	fn edge_hit_testing_samples_the_path() {
		let state = two_node_state();
		let mid = state.paths["e0"].point_at(0.5).unwrap();
		let hit = state.element_at_position(mid.x, mid.y, &scale());
		assert_eq!(hit, Some(ElementRef::Edge("e0".into())));
	}

	#[test]
	fn focus_on_missing_target_reports_failure() {
		let mut state = two_node_state();
		assert!(!state.focus("nope"));
		assert!(state.focus("a"));
	}

	#[test]
	fn fit_to_centers_the_selection() {
		let mut state = two_node_state();
		state.fit_to(&["a".into(), "b".into()]);
		let a = state
			.node_position(state.model.node_by_id("a").unwrap())
			.unwrap();
		let screen_x = a.x * state.transform.k + state.transform.x;
		let screen_y = a.y * state.transform.k + state.transform.y;
		assert!((0.0..=800.0).contains(&screen_x));
		assert!((0.0..=600.0).contains(&screen_y));
	}

	#[test]
	fn zoom_is_clamped() {
		let mut state = two_node_state();
		for _ in 0..100 {
			state.zoom_by(1.5, 400.0, 300.0);
		}
		assert!(state.transform.k <= 10.0);
		for _ in 0..200 {
			state.zoom_by(0.5, 400.0, 300.0);
		}
		assert!(state.transform.k >= 0.1);
	}

	#[test]
	fn loop_with_conflicting_sibling_is_re_angled() {
		let mut state = MeshGraphState::new(
			&elements(
				vec![node("a"), node("b")],
				vec![
					traffic_edge("loop", "a", "a", Protocol::Http, 1.0),
					traffic_edge("e1", "a", "b", Protocol::Http, 1.0),
				],
			),
			800.0,
			600.0,
			"mesh",
		);
		let s = scale();
		state.refresh_geometry(&s);
		let before = state.edge_scene[0].loop_placement;

		// Drag "b" so its edge endpoint lands on the loop's start.
		let loop_start = state.paths["loop"].points()[0];
		let a_pos = state
			.node_position(state.model.node_by_id("a").unwrap())
			.unwrap();
		let away = Point::new(
			a_pos.x + (loop_start.x - a_pos.x) * 30.0,
			a_pos.y + (loop_start.y - a_pos.y) * 30.0,
		);
		let b_sim = state.sim_idx("b").unwrap();
		state.sim.visit_nodes_mut(|node| {
			if node.index() == b_sim {
				node.data.x = away.x as f32;
				node.data.y = away.y as f32;
				node.data.is_anchor = true;
			}
		});
		state.refresh_geometry(&s);
		state.fix_loop_overlaps(&s, &GraphConfig::default());
		let after = state.edge_scene[0].loop_placement;
		assert_ne!(before, after);

		// With the sibling gone entirely, a fresh loop stays at defaults.
		let mut lonely = MeshGraphState::new(
			&elements(vec![node("a")], vec![edge("loop", "a", "a")]),
			800.0,
			600.0,
			"mesh",
		);
		lonely.refresh_geometry(&s);
		lonely.fix_loop_overlaps(&s, &GraphConfig::default());
		assert_eq!(lonely.edge_scene[0].loop_placement, LoopPlacement::default());
	}
}
