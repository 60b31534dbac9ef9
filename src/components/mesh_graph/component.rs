//! Leptos component wrapping the mesh graph canvas.
//!
//! The component creates an HTML canvas element and wires mouse/wheel events
//! into the gesture dispatcher. An animation loop runs via
//! `requestAnimationFrame`, advancing the simulation, firing due gesture
//! timers, stepping the traffic animation, and repainting each frame. Every
//! change of the `data` signal is a full refresh: ranking, scene sync, loop
//! decluttering, and a traffic restart, in that order.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::config::GraphConfig;
use super::gesture::{Gesture, GestureDispatcher, GestureTarget, GestureTiming};
use super::geom::Point;
use super::highlight::{GraphHighlighter, Selection};
use super::model::{ElementRef, GraphModel};
use super::render::{self, RenderOptions};
use super::scale::{ScaleConfig, ScaledValues};
use super::score::{score_nodes, ScoringCriteria};
use super::state::MeshGraphState;
use super::theme::Theme;
use super::traffic::TrafficRenderer;
use super::types::{EdgeLabelMode, EdgeTapEvent, GraphElements, NodeTapEvent};

/// Pixels of pointer travel beyond which a press stops being a tap.
const TAP_SLOP_PX: f64 = 3.0;

/// Host callbacks for semantic gestures.
#[derive(Clone, Copy, Default)]
struct TapCallbacks {
	on_node_tap: Option<Callback<NodeTapEvent>>,
	on_node_double_tap: Option<Callback<NodeTapEvent>>,
	on_edge_tap: Option<Callback<EdgeTapEvent>>,
	on_info: Option<Callback<String>>,
}

/// Static view options captured at mount.
#[derive(Clone)]
struct ViewOptions {
	is_mini: bool,
	show_traffic: bool,
	render: RenderOptions,
	rank_by: Vec<ScoringCriteria>,
	layout: String,
}

/// An in-progress shift-drag box selection.
#[derive(Clone, Copy, Debug, Default)]
struct BoxSelect {
	active: bool,
	start: Point,
}

/// Bundles scene state with interaction machinery and visual configuration.
struct GraphContext {
	state: MeshGraphState,
	highlighter: GraphHighlighter,
	dispatcher: GestureDispatcher,
	traffic: TrafficRenderer,
	scale: ScaleConfig,
	theme: Theme,
	config: GraphConfig,
	options: ViewOptions,
	hover_target: Option<ElementRef>,
	box_select: BoxSelect,
	pending_focus: Option<String>,
}

/// Renders an interactive service-mesh topology graph on a canvas element.
///
/// Pass the decorated element set via the reactive `data` signal; each
/// change is treated as a wholesale refresh. The component sizes itself to
/// its parent container by default; set `fullscreen = true` to fill the
/// viewport and resize automatically with the window.
#[component]
pub fn MeshGraphCanvas(
	#[prop(into)] data: Signal<GraphElements>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
	/// Embedded sub-graph mode: background taps never deselect.
	#[prop(default = false)] is_mini: bool,
	/// Pin a node as the focal root and center on it after the first load.
	#[prop(default = None)] focus_node: Option<String>,
	#[prop(default = true)] show_traffic: bool,
	#[prop(default = false)] show_rank: bool,
	#[prop(default = false)] show_security: bool,
	#[prop(default = EdgeLabelMode::None)] edge_labels: EdgeLabelMode,
	/// Namespaces in scope for this view; nodes outside render dimmed.
	#[prop(default = vec![])] active_namespaces: Vec<String>,
	#[prop(default = vec![ScoringCriteria::InboundEdges])] rank_by: Vec<ScoringCriteria>,
	#[prop(default = String::from("mesh"))] layout: String,
	/// Visual theme; the host supplies this at startup, never mutated here.
	#[prop(default = Theme::default())] theme: Theme,
	/// Zoom scaling and label-threshold configuration.
	#[prop(default = ScaleConfig::default())] scale: ScaleConfig,
	/// Interaction and animation timing constants.
	#[prop(default = GraphConfig::default())] config: GraphConfig,
	#[prop(default = None)] on_node_tap: Option<Callback<NodeTapEvent>>,
	#[prop(default = None)] on_node_double_tap: Option<Callback<NodeTapEvent>>,
	#[prop(default = None)] on_edge_tap: Option<Callback<EdgeTapEvent>>,
	/// User-visible informational messages (focus misses and the like).
	#[prop(default = None)] on_info: Option<Callback<String>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let disposed: Rc<Cell<bool>> = Rc::new(Cell::new(false));
	let (context_init, animate_init, resize_cb_init, disposed_init) = (
		context.clone(),
		animate.clone(),
		resize_cb.clone(),
		disposed.clone(),
	);

	let callbacks = TapCallbacks {
		on_node_tap,
		on_node_double_tap,
		on_edge_tap,
		on_info,
	};
	let options = ViewOptions {
		is_mini,
		show_traffic,
		render: RenderOptions {
			show_rank,
			show_security,
			edge_labels,
			active_namespaces,
		},
		rank_by,
		layout,
	};

	Effect::new(move |_| {
		let elements = data.get();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();

		// Subsequent signal changes refresh the existing context in place
		// so selection and viewport survive where they should.
		if let Some(ref mut ctx) = *context_init.borrow_mut() {
			refresh_graph(ctx, &elements, callbacks);
			return;
		}

		let window: Window = web_sys::window().unwrap();
		let (w, h) = if fullscreen {
			(
				window.inner_width().unwrap().as_f64().unwrap(),
				window.inner_height().unwrap().as_f64().unwrap(),
			)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx2d: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		let scale = scale.clone();
		let config = config.clone();
		let dispatcher = GestureDispatcher::new(
			GestureTiming {
				double_tap_ms: config.double_tap_ms,
				hover_in_ms: config.hover_in_ms,
				hover_out_ms: config.hover_out_ms,
			},
			scale.zoom_label_thresholds.clone(),
			options.is_mini,
			focus_node.is_some(),
		);
		let mut graph_context = GraphContext {
			state: MeshGraphState::new(&elements, w, h, &options.layout),
			highlighter: GraphHighlighter::new(),
			dispatcher,
			traffic: TrafficRenderer::new(&config),
			scale,
			theme: theme.clone(),
			config,
			options: options.clone(),
			hover_target: None,
			box_select: BoxSelect::default(),
			pending_focus: focus_node.clone(),
		};
		refresh_graph(&mut graph_context, &elements, callbacks);
		*context_init.borrow_mut() = Some(graph_context);

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = (
					win.inner_width().unwrap().as_f64().unwrap(),
					win.inner_height().unwrap().as_f64().unwrap(),
				);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.state.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner, disposed_anim) = (
			context_init.clone(),
			animate_init.clone(),
			disposed_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if disposed_anim.get() {
				return;
			}
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				let now_ms = js_sys::Date::now();
				let dt = 0.016;
				if c.state.animation_running {
					c.state.tick(dt as f32);
				}
				let scaled = ScaledValues::new(&c.scale, c.state.transform.k);
				c.state.refresh_geometry(&scaled);

				for gesture in c.dispatcher.poll(now_ms) {
					handle_gesture(c, gesture, callbacks);
				}

				if c.traffic.is_running() {
					if let Err(traffic_error) = c.traffic.process_step(now_ms, &c.state.model) {
						error!("mesh-graph: traffic animation stopped: {traffic_error}");
						c.traffic.stop();
					}
				}

				render::render(&c.state, &c.traffic, &ctx2d, &c.scale, &c.theme, &c.options.render);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Teardown: stop the animation pipeline and let the dispatcher drop,
	// which cancels every pending gesture timer.
	// `on_cleanup` requires `Send + Sync`, but the teardown touches non-Send
	// `Rc` state. In single-threaded wasm the wrapper is never accessed off
	// its creating thread, so this only satisfies the bound.
	let cleanup_state =
		leptos::__reexports::send_wrapper::SendWrapper::new((context.clone(), disposed.clone()));
	on_cleanup(move || {
		let (context_cleanup, disposed_cleanup) = &*cleanup_state;
		disposed_cleanup.set(true);
		if let Some(ref mut c) = *context_cleanup.borrow_mut() {
			c.traffic.stop();
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = cursor_position(&ev, &canvas.into());

		if let Some(ref mut c) = *context_md.borrow_mut() {
			if ev.shift_key() {
				c.box_select = BoxSelect {
					active: true,
					start: Point::new(x, y),
				};
				c.dispatcher.on_box_start();
				// The incremental fits below emit transient zoom values.
				c.dispatcher.set_zoom_ignore(true, c.state.transform.k);
				return;
			}

			let scaled = ScaledValues::new(&c.scale, c.state.transform.k);
			let hit = c.state.element_at_position(x, y, &scaled);
			let node_hit = match &hit {
				Some(ElementRef::Node(id)) => {
					let is_box = c
						.state
						.model
						.node_by_id(id)
						.map(|idx| c.state.model.node(idx).data.is_box())
						.unwrap_or(false);
					if is_box { None } else { c.state.sim_idx(id) }
				}
				_ => None,
			};
			if let Some(sim_idx) = node_hit {
				c.state.drag.active = true;
				c.state.drag.moved = false;
				c.state.drag.node_idx = Some(sim_idx);
				c.state.drag.start_x = x;
				c.state.drag.start_y = y;
				c.state.sim.visit_nodes(|node| {
					if node.index() == sim_idx {
						c.state.drag.node_start_x = node.x();
						c.state.drag.node_start_y = node.y();
					}
				});
			} else {
				c.state.pan.active = true;
				c.state.pan.moved = false;
				c.state.pan.start_x = x;
				c.state.pan.start_y = y;
				c.state.pan.transform_start_x = c.state.transform.x;
				c.state.pan.transform_start_y = c.state.transform.y;
			}
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = cursor_position(&ev, &canvas.into());
		let now_ms = js_sys::Date::now();

		if let Some(ref mut c) = *context_mm.borrow_mut() {
			if c.box_select.active {
				let selected = nodes_in_rect(&c.state, c.box_select.start, Point::new(x, y));
				let gesture = c
					.dispatcher
					.on_box_select(selected.iter().map(|(id, is_box)| (id.as_str(), *is_box)));
				if let Some(gesture) = gesture {
					handle_gesture(c, gesture, callbacks);
				}
				return;
			}

			if c.state.drag.active {
				if let Some(sim_idx) = c.state.drag.node_idx {
					let (dx, dy) = (
						(x - c.state.drag.start_x) / c.state.transform.k,
						(y - c.state.drag.start_y) / c.state.transform.k,
					);
					if dx.abs().max(dy.abs()) * c.state.transform.k > TAP_SLOP_PX {
						c.state.drag.moved = true;
					}
					let (nx, ny) = (
						c.state.drag.node_start_x + dx as f32,
						c.state.drag.node_start_y + dy as f32,
					);
					c.state.sim.visit_nodes_mut(|node| {
						if node.index() == sim_idx {
							node.data.x = nx;
							node.data.y = ny;
							node.data.is_anchor = true;
						}
					});
				}
				return;
			}
			if c.state.pan.active {
				let (dx, dy) = (x - c.state.pan.start_x, y - c.state.pan.start_y);
				if dx.abs().max(dy.abs()) > TAP_SLOP_PX {
					c.state.pan.moved = true;
				}
				c.state.transform.x = c.state.pan.transform_start_x + dx;
				c.state.transform.y = c.state.pan.transform_start_y + dy;
				return;
			}

			// Plain movement drives the hover timers.
			let scaled = ScaledValues::new(&c.scale, c.state.transform.k);
			let over = c.state.element_at_position(x, y, &scaled);
			if over != c.hover_target {
				if let Some(previous) = c.hover_target.take() {
					c.dispatcher.on_mouse_out(previous, now_ms);
				}
				if let Some(ref element) = over {
					c.dispatcher.on_mouse_over(element.clone(), now_ms);
				}
				c.hover_target = over;
			}
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = cursor_position(&ev, &canvas.into());
		let now_ms = js_sys::Date::now();

		if let Some(ref mut c) = *context_mu.borrow_mut() {
			if c.box_select.active {
				c.box_select.active = false;
				c.dispatcher.set_zoom_ignore(false, c.state.transform.k);
				return;
			}

			let moved = (c.state.drag.active && c.state.drag.moved)
				|| (c.state.pan.active && c.state.pan.moved);
			if c.state.drag.active {
				if let Some(sim_idx) = c.state.drag.node_idx {
					c.state.sim.visit_nodes_mut(|node| {
						if node.index() == sim_idx {
							node.data.is_anchor = true;
						}
					});
				}
			}
			c.state.drag.active = false;
			c.state.drag.node_idx = None;
			c.state.pan.active = false;

			if !moved {
				let scaled = ScaledValues::new(&c.scale, c.state.transform.k);
				let target = match c.state.element_at_position(x, y, &scaled) {
					Some(element) => GestureTarget::Element(element),
					None => GestureTarget::Background,
				};
				if let Some(gesture) = c.dispatcher.on_tap(target, now_ms) {
					handle_gesture(c, gesture, callbacks);
				}
			}
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let now_ms = js_sys::Date::now();
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.drag.active = false;
			c.state.drag.node_idx = None;
			c.state.pan.active = false;
			c.box_select.active = false;
			if let Some(previous) = c.hover_target.take() {
				c.dispatcher.on_mouse_out(previous, now_ms);
			}
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = cursor_position(&ev, &canvas.into());

		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = c.state.zoom_by(factor, x, y);
			c.state.custom_viewport = true;
			if let Some(gesture) = c.dispatcher.on_zoom(new_k) {
				handle_gesture(c, gesture, callbacks);
			}
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="mesh-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}

fn cursor_position(ev: &MouseEvent, canvas: &HtmlCanvasElement) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Concrete nodes inside a screen-space rectangle, with their box-ness so
/// the dispatcher can filter.
fn nodes_in_rect(state: &MeshGraphState, a: Point, b: Point) -> Vec<(String, bool)> {
	let (gx0, gy0) = state.screen_to_graph(a.x.min(b.x), a.y.min(b.y));
	let (gx1, gy1) = state.screen_to_graph(a.x.max(b.x), a.y.max(b.y));
	let mut result = Vec::new();
	for idx in 0..state.model.nodes().len() {
		let entry = state.model.node(idx);
		let Some(position) = state.node_position(idx) else {
			continue;
		};
		if position.x >= gx0 && position.x <= gx1 && position.y >= gy0 && position.y <= gy1 {
			result.push((entry.data.id.clone(), entry.data.is_box()));
		}
	}
	result
}

/// Full refresh in dependency order: rank, rebind selection, sync scene,
/// declutter loops, restart traffic.
fn refresh_graph(ctx: &mut GraphContext, elements: &GraphElements, callbacks: TapCallbacks) {
	ctx.traffic.pause();

	let (w, h) = (ctx.state.width, ctx.state.height);
	let custom_viewport = ctx.state.custom_viewport;
	let transform = ctx.state.transform.clone();
	ctx.state = MeshGraphState::new(elements, w, h, &ctx.options.layout);
	ctx.state.custom_viewport = custom_viewport;
	ctx.state.transform = transform;
	ctx.hover_target = None;

	let criteria: &[ScoringCriteria] = if ctx.options.render.show_rank {
		&ctx.options.rank_by
	} else {
		&[]
	};
	score_nodes(&mut ctx.state.model, criteria);

	ctx.highlighter.on_data_refresh(&mut ctx.state.model);
	ctx.dispatcher.set_selection(match ctx.highlighter.selected() {
		Selection::Graph => GestureTarget::Background,
		Selection::Element(element) => GestureTarget::Element(element.clone()),
	});

	// Fitting and decluttering emit transient zoom values.
	ctx.dispatcher.set_zoom_ignore(true, ctx.state.transform.k);
	let scaled = ScaledValues::new(&ctx.scale, ctx.state.transform.k);
	ctx.state.refresh_geometry(&scaled);
	if !ctx.state.custom_viewport {
		ctx.state.fit_to(&[]);
	}
	let scaled = ScaledValues::new(&ctx.scale, ctx.state.transform.k);
	ctx.state.refresh_geometry(&scaled);
	ctx.state.fix_loop_overlaps(&scaled, &ctx.config);
	ctx.state.labels_visible = scaled.labels_visible;
	ctx.dispatcher.set_zoom_ignore(false, ctx.state.transform.k);

	if ctx.options.show_traffic {
		ctx.traffic
			.start(&ctx.state.model, &ctx.state.paths, &ctx.theme, &ctx.config);
	} else {
		ctx.traffic.stop();
	}

	if let Some(focus) = ctx.pending_focus.take() {
		if !ctx.state.focus(&focus) {
			if let Some(on_info) = callbacks.on_info {
				on_info.run(format!(
					"Could not focus on requested node {focus:?}. The node may be idle or hidden."
				));
			}
		}
	}
}

/// Route one disambiguated gesture to the highlighter and host callbacks.
fn handle_gesture(ctx: &mut GraphContext, gesture: Gesture, callbacks: TapCallbacks) {
	match gesture {
		Gesture::SingleTap(target) => {
			let selection = match &target {
				GestureTarget::Background => Selection::Graph,
				GestureTarget::Element(element) => Selection::Element(element.clone()),
			};
			if !ctx.options.is_mini {
				ctx.highlighter.on_click(&mut ctx.state.model, selection);
			}
			ctx.dispatcher.set_selection(match ctx.highlighter.selected() {
				Selection::Graph => GestureTarget::Background,
				Selection::Element(element) => GestureTarget::Element(element.clone()),
			});

			match &target {
				GestureTarget::Element(ElementRef::Node(id)) => {
					if let (Some(cb), Some(event)) =
						(callbacks.on_node_tap, node_tap_event(&ctx.state.model, id))
					{
						cb.run(event);
					}
				}
				GestureTarget::Element(ElementRef::Edge(id)) if ctx.options.is_mini => {
					if let (Some(cb), Some(event)) =
						(callbacks.on_edge_tap, edge_tap_event(&ctx.state.model, id))
					{
						cb.run(event);
					}
				}
				_ => {}
			}
		}
		Gesture::DoubleTap(GestureTarget::Element(ElementRef::Node(id))) => {
			if let (Some(cb), Some(event)) =
				(callbacks.on_node_double_tap, node_tap_event(&ctx.state.model, &id))
			{
				cb.run(event);
			}
		}
		Gesture::DoubleTap(_) => {}
		Gesture::HoverIn(element) => {
			ctx.highlighter.on_mouse_in(&mut ctx.state.model, element);
		}
		Gesture::HoverOut(element) => {
			ctx.highlighter.on_mouse_out(&mut ctx.state.model, &element);
		}
		Gesture::LabelRefresh => {
			let scaled = ScaledValues::new(&ctx.scale, ctx.state.transform.k);
			ctx.state.labels_visible = scaled.labels_visible;
		}
		Gesture::FitToSelection(ids) => {
			ctx.state.fit_to(&ids);
			ctx.state.custom_viewport = true;
		}
	}
}

/// Flatten a node or box into the tap-event payload.
fn node_tap_event(model: &GraphModel, id: &str) -> Option<NodeTapEvent> {
	let idx = model.node_by_id(id)?;
	let data = &model.node(idx).data;
	// A box is idle only when every descendant is.
	let is_idle = if data.is_box() {
		let members = model.descendants_of(idx);
		!members.is_empty()
			&& members
				.iter()
				.all(|&member| model.node(member).data.is_idle)
	} else {
		data.is_idle
	};
	Some(NodeTapEvent {
		namespace: data.namespace.clone(),
		node_type: data.node_type,
		app: data.app.clone(),
		service: data.service.clone(),
		workload: data.workload.clone(),
		cluster: (!data.cluster.is_empty()).then(|| data.cluster.clone()),
		version: if data.is_box() { None } else { data.version.clone() },
		is_box: data.box_kind,
		is_idle,
		is_inaccessible: data.is_inaccessible,
		is_out_of_mesh: data.is_out_of_mesh,
		is_outside: data.is_outside,
		is_service_entry: data.is_service_entry,
		is_waypoint: data.is_waypoint,
	})
}

/// Flatten an edge into the tap-event payload: the source node's namespace
/// and kind, plus kind-specific endpoint names.
fn edge_tap_event(model: &GraphModel, id: &str) -> Option<EdgeTapEvent> {
	let idx = model.edge_by_id(id)?;
	let edge = model.edge(idx);
	let source = &model.node(edge.source).data;
	let target = &model.node(edge.target).data;
	Some(EdgeTapEvent {
		namespace: source.namespace.clone(),
		node_type: source.node_type,
		source: source.display_name().to_owned(),
		target: target.display_name().to_owned(),
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::mesh_graph::test_fixtures::{app_box, edge, elements, node, node_in_box};
	use crate::components::mesh_graph::types::NodeKind;

	#[test]
	fn node_tap_event_flattens_kind_fields() {
		let mut workload = node("w1");
		workload.workload = Some("reviews-v1".into());
		workload.cluster = "east".into();
		workload.version = Some("v1".into());
		let model = GraphModel::build(&elements(vec![workload], vec![]));

		let event = node_tap_event(&model, "w1").unwrap();
		assert_eq!(event.node_type, NodeKind::Workload);
		assert_eq!(event.workload.as_deref(), Some("reviews-v1"));
		assert_eq!(event.cluster.as_deref(), Some("east"));
		assert_eq!(event.version.as_deref(), Some("v1"));
		assert_eq!(event.is_box, None);
		assert!(!event.is_idle);
	}

	#[test]
	fn box_tap_event_aggregates_idleness_and_drops_version() {
		let mut member_a = node_in_box("w1", "box-a");
		member_a.is_idle = true;
		member_a.version = Some("v1".into());
		let mut member_b = node_in_box("w2", "box-a");
		member_b.is_idle = true;
		let model = GraphModel::build(&elements(
			vec![app_box("box-a"), member_a, member_b],
			vec![],
		));

		let event = node_tap_event(&model, "box-a").unwrap();
		assert!(event.is_idle);
		assert_eq!(event.version, None);
		assert!(event.is_box.is_some());

		// One busy member flips the rollup.
		let mut busy = node_in_box("w2", "box-a");
		busy.is_idle = false;
		let model = GraphModel::build(&elements(
			vec![app_box("box-a"), {
				let mut m = node_in_box("w1", "box-a");
				m.is_idle = true;
				m
			}, busy],
			vec![],
		));
		assert!(!node_tap_event(&model, "box-a").unwrap().is_idle);
	}

	#[test]
	fn edge_tap_event_uses_kind_specific_names() {
		let mut source = node("s");
		source.node_type = NodeKind::Service;
		source.service = Some("productpage".into());
		let mut target = node("t");
		target.workload = Some("reviews-v2".into());
		let model = GraphModel::build(&elements(
			vec![source, target],
			vec![edge("e0", "s", "t")],
		));

		let event = edge_tap_event(&model, "e0").unwrap();
		assert_eq!(event.node_type, NodeKind::Service);
		assert_eq!(event.source, "productpage");
		assert_eq!(event.target, "reviews-v2");
	}
}
