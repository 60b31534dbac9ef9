//! Canvas rendering for the mesh graph.
//!
//! Handles all drawing operations in z-order passes per frame:
//! 1. Background (screen space)
//! 2. Grouping boxes, outermost grain first (world space)
//! 3. Edges with protocol/health coloring, then traffic markers
//! 4. Nodes with health rings, selection and rank badges, then labels
//!
//! The surface discipline is clear-then-redraw on every tick, never a
//! partial draw, and no painting outside the tick callback.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::geom::{EdgePath, Point};
use super::model::{EdgeEntry, ElementFlags};
use super::scale::{ScaleConfig, ScaledValues};
use super::state::MeshGraphState;
use super::theme::{Color, Theme};
use super::traffic::TrafficRenderer;
use super::types::{BoxKind, EdgeLabelMode, NodeKind, Protocol};

/// Error percentages at which an edge stroke turns degraded/failing.
const EDGE_DEGRADED_PERCENT: f64 = 0.1;
const EDGE_FAILURE_PERCENT: f64 = 20.0;

/// Per-refresh view configuration handed to the style passes: what badges
/// and labels to draw, and which namespaces are in scope.
#[derive(Clone, Debug, Default)]
pub struct RenderOptions {
	pub show_rank: bool,
	pub show_security: bool,
	pub edge_labels: EdgeLabelMode,
	/// When non-empty, nodes outside these namespaces render dimmed.
	pub active_namespaces: Vec<String>,
}

/// Renders the complete graph to the canvas.
pub fn render(
	state: &MeshGraphState,
	traffic: &TrafficRenderer,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
	options: &RenderOptions,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_boxes(state, ctx, &scale, theme);
	draw_edges(state, ctx, &scale, theme, options);
	traffic.render_markers(ctx, &state.model, &state.paths);
	draw_nodes(state, ctx, &scale, theme, options);

	ctx.restore();

	if theme.background.vignette > 0.0 {
		draw_vignette(state, ctx, theme);
	}
}

fn draw_background(state: &MeshGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	if theme.background.use_gradient {
		let gradient = ctx
			.create_radial_gradient(
				state.width / 2.0,
				state.height / 2.0,
				0.0,
				state.width / 2.0,
				state.height / 2.0,
				(state.width.max(state.height)) * 0.8,
			)
			.unwrap();

		gradient
			.add_color_stop(0.0, &theme.background.color_secondary.to_css())
			.unwrap();
		gradient
			.add_color_stop(1.0, &theme.background.color.to_css())
			.unwrap();

		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
	} else {
		ctx.set_fill_style_str(&theme.background.color.to_css());
	}

	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_vignette(state: &MeshGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let gradient = ctx
		.create_radial_gradient(
			state.width / 2.0,
			state.height / 2.0,
			state.width.min(state.height) * 0.3,
			state.width / 2.0,
			state.height / 2.0,
			state.width.max(state.height) * 0.7,
		)
		.unwrap();

	gradient.add_color_stop(0.0, "rgba(0, 0, 0, 0)").unwrap();
	gradient
		.add_color_stop(
			1.0,
			&format!("rgba(0, 0, 0, {})", theme.background.vignette),
		)
		.unwrap();

	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_boxes(
	state: &MeshGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	// Outermost grain first so nested boxes paint on top.
	let mut boxes: Vec<usize> = (0..state.model.nodes().len())
		.filter(|&idx| state.model.node(idx).data.is_box())
		.collect();
	boxes.sort_by_key(|&idx| state.model.node(idx).data.box_kind);

	for idx in boxes {
		let entry = state.model.node(idx);
		let Some((min, max)) = state.box_bounds(idx) else {
			continue;
		};
		let alpha = emphasis_alpha(entry.flags);
		let fill = theme.boxes.grain_color(entry.data.box_kind);
		ctx.set_global_alpha(alpha);
		ctx.set_fill_style_str(&fill.to_css());
		ctx.fill_rect(min.x, min.y, max.x - min.x, max.y - min.y);
		let border = if entry.flags.highlighted || entry.flags.selected {
			theme.node.selected_border
		} else {
			theme.boxes.border
		};
		ctx.set_stroke_style_str(&border.to_css());
		ctx.set_line_width(1.0 / scale.k);
		ctx.stroke_rect(min.x, min.y, max.x - min.x, max.y - min.y);

		if state.labels_visible && entry.data.box_kind != Some(BoxKind::App) {
			ctx.set_fill_style_str(&theme.node.label_color.to_css());
			ctx.set_font(&scale.label_font);
			let _ = ctx.fill_text(entry.data.display_name(), min.x + 4.0, min.y - 4.0);
		}
		ctx.set_global_alpha(1.0);
	}
}

fn edge_color(entry: &EdgeEntry, theme: &Theme) -> Color {
	let percent_err = entry.data.http_percent_err.max(entry.data.grpc_percent_err);
	if percent_err >= EDGE_FAILURE_PERCENT {
		theme.edge.failure
	} else if percent_err > EDGE_DEGRADED_PERCENT {
		theme.edge.degraded
	} else {
		theme.edge.protocol_color(entry.data.protocol)
	}
}

fn emphasis_alpha(flags: ElementFlags) -> f64 {
	if flags.unhighlighted { 0.25 } else { 1.0 }
}

/// The text an edge label mode produces for an edge, if any.
fn edge_label(entry: &EdgeEntry, mode: EdgeLabelMode) -> Option<String> {
	match mode {
		EdgeLabelMode::None => None,
		EdgeLabelMode::RequestRate => match entry.data.protocol {
			Some(Protocol::Tcp) if entry.data.tcp > 0.0 => {
				Some(format!("{:.0}B/s", entry.data.tcp))
			}
			Some(_) if entry.data.protocol_rate() > 0.0 => {
				Some(format!("{:.1}rps", entry.data.protocol_rate()))
			}
			_ => None,
		},
		EdgeLabelMode::ResponseTime => (entry.data.response_time.is_finite()
			&& entry.data.response_time > 0.0)
			.then(|| format!("{:.0}ms", entry.data.response_time)),
		EdgeLabelMode::Throughput => {
			(entry.data.throughput > 0.0).then(|| format!("{:.0}B/s", entry.data.throughput))
		}
	}
}

fn draw_edges(
	state: &MeshGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	options: &RenderOptions,
) {
	for entry in state.model.edges() {
		let Some(path) = state.paths.get(&entry.data.id) else {
			continue;
		};
		let points = path.points();
		if points.len() < 2 {
			continue;
		}

		let color = edge_color(entry, theme);
		let width = if entry.flags.highlighted {
			scale.edge_line_width * 1.6
		} else {
			scale.edge_line_width
		};
		ctx.set_global_alpha(emphasis_alpha(entry.flags));
		ctx.set_stroke_style_str(&color.to_css());
		ctx.set_line_width(width);

		ctx.begin_path();
		ctx.move_to(points[0].x, points[0].y);
		match points.len() {
			2 => ctx.line_to(points[1].x, points[1].y),
			3 => {
				let _ = ctx.quadratic_curve_to(points[1].x, points[1].y, points[2].x, points[2].y);
			}
			5 => {
				let _ = ctx.quadratic_curve_to(points[1].x, points[1].y, points[2].x, points[2].y);
				let _ = ctx.quadratic_curve_to(points[3].x, points[3].y, points[4].x, points[4].y);
			}
			_ => {
				// Unsupported geometry; the traffic layer logs it, the base
				// stroke just falls back to a chord.
				ctx.line_to(points[points.len() - 1].x, points[points.len() - 1].y);
			}
		}
		ctx.stroke();

		if !scale.cull_arrows {
			draw_arrow(ctx, path, scale, color);
		}

		if options.show_security && entry.data.is_mtls > 0.0 {
			if let Ok(mid) = path.point_at(0.5) {
				ctx.begin_path();
				let _ = ctx.arc(mid.x, mid.y, scale.badge_radius * 0.6, 0.0, 2.0 * PI);
				ctx.set_fill_style_str(&theme.edge.mtls_badge.to_css());
				ctx.fill();
			}
		}

		if state.labels_visible {
			if let (Some(text), Ok(mid)) =
				(edge_label(entry, options.edge_labels), path.point_at(0.5))
			{
				ctx.set_fill_style_str(&theme.node.label_color.to_css());
				ctx.set_font(&scale.badge_font);
				let _ = ctx.fill_text(&text, mid.x + 4.0, mid.y - 4.0);
			}
		}
		ctx.set_global_alpha(1.0);
	}
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, path: &EdgePath, scale: &ScaledValues, color: Color) {
	let (Ok(tip), Ok(back_sample)) = (path.point_at(1.0), path.point_at(0.92)) else {
		return;
	};
	let (dx, dy) = (tip.x - back_sample.x, tip.y - back_sample.y);
	let len = (dx * dx + dy * dy).sqrt();
	if len < f64::EPSILON {
		return;
	}
	let (ux, uy) = (dx / len, dy / len);
	let (back_x, back_y) = (tip.x - ux * scale.arrow_size, tip.y - uy * scale.arrow_size);
	let (px, py) = (-uy * scale.arrow_size * 0.5, ux * scale.arrow_size * 0.5);

	ctx.set_global_alpha(scale.arrow_alpha);
	ctx.set_fill_style_str(&color.to_css());
	ctx.begin_path();
	ctx.move_to(tip.x, tip.y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_nodes(
	state: &MeshGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	options: &RenderOptions,
) {
	let model = &state.model;
	state.sim.visit_nodes(|node| {
		let user = &node.data.user_data;
		let entry = model.node(user.model_idx);
		let position = Point::new(node.x() as f64, node.y() as f64);
		let radius = scale.node_radius * user.size;

		// Out-of-scope namespaces render muted.
		let in_scope = options.active_namespaces.is_empty()
			|| options
				.active_namespaces
				.iter()
				.any(|ns| ns == &entry.data.namespace);
		let scope_alpha = if in_scope { 1.0 } else { 0.55 };
		ctx.set_global_alpha(emphasis_alpha(entry.flags) * scope_alpha);
		draw_node_shape(ctx, position, radius, entry.data.node_type, theme);

		// Health ring.
		let ring = theme.health.status_color(entry.data.health_status);
		trace_node_shape(ctx, position, radius + 1.5 / scale.k, entry.data.node_type);
		ctx.set_stroke_style_str(&ring.to_css());
		ctx.set_line_width(theme.node.health_ring_width / scale.k);
		ctx.stroke();

		if entry.flags.selected || entry.flags.hovered {
			trace_node_shape(ctx, position, radius + 4.0 / scale.k, entry.data.node_type);
			ctx.set_stroke_style_str(&theme.node.selected_border.to_css());
			ctx.set_line_width(1.5 / scale.k);
			ctx.stroke();
		}

		if options.show_rank {
			if let Some(rank) = entry.rank {
				let badge = Point::new(position.x + radius, position.y - radius);
				ctx.begin_path();
				let _ = ctx.arc(badge.x, badge.y, scale.badge_radius, 0.0, 2.0 * PI);
				ctx.set_fill_style_str(&theme.node.rank_badge.to_css());
				ctx.fill();
				ctx.set_fill_style_str(&theme.node.label_color.to_css());
				ctx.set_font(&scale.badge_font);
				let _ = ctx.fill_text(&rank.to_string(), badge.x - 2.0, badge.y + 2.0);
			}
		}

		if state.labels_visible || entry.flags.highlighted {
			ctx.set_fill_style_str(&theme.node.label_color.to_css());
			ctx.set_font(&scale.label_font);
			let _ = ctx.fill_text(
				entry.data.display_name(),
				position.x + radius + 4.0,
				position.y + 3.0,
			);
		}
		ctx.set_global_alpha(1.0);
	});
}

fn draw_node_shape(
	ctx: &CanvasRenderingContext2d,
	position: Point,
	radius: f64,
	kind: NodeKind,
	theme: &Theme,
) {
	trace_node_shape(ctx, position, radius, kind);
	if theme.node.use_gradient {
		let base = theme.node.kind_color(kind);
		let gradient = ctx
			.create_radial_gradient(
				position.x - radius * 0.3,
				position.y - radius * 0.3,
				0.0,
				position.x,
				position.y,
				radius,
			)
			.unwrap();
		gradient
			.add_color_stop(0.0, &base.lighten(0.4).to_css())
			.unwrap();
		gradient.add_color_stop(0.7, &base.to_css()).unwrap();
		gradient
			.add_color_stop(1.0, &base.darken(0.2).to_css())
			.unwrap();
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
	} else {
		ctx.set_fill_style_str(&theme.node.kind_color(kind).to_css());
	}
	ctx.fill();
}

/// Trace the outline for a node kind: services are diamonds, aggregates
/// squares, everything else circles.
fn trace_node_shape(ctx: &CanvasRenderingContext2d, position: Point, radius: f64, kind: NodeKind) {
	ctx.begin_path();
	match kind {
		NodeKind::Service => {
			ctx.move_to(position.x, position.y - radius);
			ctx.line_to(position.x + radius, position.y);
			ctx.line_to(position.x, position.y + radius);
			ctx.line_to(position.x - radius, position.y);
			ctx.close_path();
		}
		NodeKind::Aggregate => {
			let r = radius * 0.85;
			ctx.rect(position.x - r, position.y - r, r * 2.0, r * 2.0);
		}
		_ => {
			let _ = ctx.arc(position.x, position.y, radius, 0.0, 2.0 * PI);
		}
	}
}
