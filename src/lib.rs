//! mesh-graph: interactive service-mesh topology visualization.
//!
//! This crate provides a WASM-based graph component that renders a mesh's
//! services, workloads, and observed traffic with physics-based layout,
//! pan/zoom, gesture-driven highlighting, and continuous per-edge traffic
//! animation.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::mesh_graph::{
	EdgeLabelMode, EdgeTapEvent, GraphConfig, GraphElements, MeshGraphCanvas, NodeTapEvent,
	ScoringCriteria, Theme,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("mesh-graph: logging initialized");
}

/// Load the decorated element set from a script element with
/// id="graph-data". Expected format: JSON with { nodes: [...], edges: [...] }
fn load_graph_elements() -> Option<GraphElements> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<GraphElements>(&json_text) {
		Ok(elements) => {
			info!(
				"mesh-graph: loaded {} nodes, {} edges",
				elements.nodes.len(),
				elements.edges.len()
			);
			Some(elements)
		}
		Err(e) => {
			warn!("mesh-graph: failed to parse graph data: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads the element set from the DOM and renders the topology.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let elements = load_graph_elements().unwrap_or_default();
	let graph_signal = Signal::derive(move || elements.clone());

	let on_node_tap = Callback::new(|event: NodeTapEvent| {
		info!(
			"mesh-graph: selected {:?} in namespace {:?}",
			event.node_type, event.namespace
		);
	});

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Mesh Topology" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<MeshGraphCanvas
				data=graph_signal
				fullscreen=true
				show_traffic=true
				show_rank=true
				show_security=true
				on_node_tap=Some(on_node_tap)
			/>
			<div class="graph-overlay">
				<h1>"Mesh Topology"</h1>
				<p class="subtitle">
					"Click to select, double-click to drill in. Shift-drag to box-select. Scroll to zoom."
				</p>
			</div>
		</div>
	}
}
