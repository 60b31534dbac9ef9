//! Interactive service-mesh topology graph component.
//!
//! Renders nodes (services, workloads, apps, grouping boxes) and edges
//! (observed traffic) on an HTML canvas with:
//! - Physics-based positioning via a force simulation
//! - Pan, zoom, node dragging, and drag-box selection
//! - Tap/double-tap/hover gesture disambiguation with debounce timers
//! - Topology-aware highlight propagation on hover and selection
//! - Continuous per-edge traffic animation driven by live rates
//! - Edge-count ranking with normalized importance badges
//!
//! # Example
//!
//! ```ignore
//! use mesh_graph::{GraphElements, MeshGraphCanvas};
//!
//! let elements: GraphElements = serde_json::from_str(payload)?;
//!
//! view! {
//!     <MeshGraphCanvas
//!         data=Signal::derive(move || elements.clone())
//!         fullscreen=true
//!         show_traffic=true
//!         show_rank=true
//!     />
//! }
//! ```

mod component;
pub mod config;
mod declutter;
mod gesture;
pub mod geom;
mod highlight;
mod model;
mod render;
pub mod scale;
mod score;
mod state;
pub mod theme;
mod timing;
mod traffic;
mod types;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use component::MeshGraphCanvas;
pub use config::GraphConfig;
pub use score::ScoringCriteria;
pub use theme::Theme;
pub use types::{
	BoxKind, EdgeData, EdgeLabelMode, EdgeTapEvent, GraphElements, HealthStatus, NodeData,
	NodeKind, NodeTapEvent, Protocol,
};
