//! Graph data structures for input to the mesh graph component.
//!
//! A decorated element set arrives on every refresh, already carrying the
//! metrics computed upstream (rates, response times, error percentages,
//! health). Numeric fields are deserialized leniently: a metric that arrives
//! as a string is parsed with a logged warning instead of failing the whole
//! refresh.

use std::fmt;

use log::warn;
use serde::de::{self, Deserializer, Visitor};
use serde::Deserialize;

/// Wire protocol observed on an edge.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
	Grpc,
	Http,
	Tcp,
}

/// Kind of entity a node represents.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	App,
	Service,
	#[default]
	Workload,
	Aggregate,
	Box,
}

/// Grouping grain of a box node, coarse to fine: cluster, namespace, app.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum BoxKind {
	Cluster,
	Namespace,
	App,
}

/// Health rollup decorated onto a node upstream. Unknown statuses coerce to
/// [`HealthStatus::NotAvailable`] rather than failing the refresh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HealthStatus {
	Healthy,
	Degraded,
	Failure,
	Idle,
	#[default]
	NotAvailable,
}

impl<'de> Deserialize<'de> for HealthStatus {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = String::deserialize(deserializer)?;
		Ok(match value.as_str() {
			"Healthy" => HealthStatus::Healthy,
			"Degraded" => HealthStatus::Degraded,
			"Failure" => HealthStatus::Failure,
			"Idle" => HealthStatus::Idle,
			_ => HealthStatus::NotAvailable,
		})
	}
}

/// What, if anything, to print along each edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EdgeLabelMode {
	#[default]
	None,
	RequestRate,
	ResponseTime,
	Throughput,
}

/// A node in the decorated element set.
#[derive(Clone, Debug, Deserialize)]
pub struct NodeData {
	/// Opaque id, stable across refreshes with unchanged topology.
	pub id: String,
	pub namespace: String,
	#[serde(default)]
	pub cluster: String,
	#[serde(default)]
	pub node_type: NodeKind,
	/// Present when `node_type` is [`NodeKind::Box`].
	#[serde(default)]
	pub box_kind: Option<BoxKind>,
	/// Id of the containing box, if any. Parent chains are acyclic and
	/// terminate at a box with no parent.
	#[serde(default)]
	pub parent: Option<String>,
	#[serde(default)]
	pub app: Option<String>,
	#[serde(default)]
	pub service: Option<String>,
	#[serde(default)]
	pub workload: Option<String>,
	#[serde(default)]
	pub version: Option<String>,
	#[serde(default)]
	pub aggregate: Option<String>,
	#[serde(default)]
	pub aggregate_value: Option<String>,
	#[serde(default)]
	pub is_idle: bool,
	#[serde(default)]
	pub is_inaccessible: bool,
	#[serde(default)]
	pub is_out_of_mesh: bool,
	#[serde(default)]
	pub is_outside: bool,
	#[serde(default)]
	pub is_service_entry: bool,
	#[serde(default)]
	pub is_waypoint: bool,
	#[serde(default)]
	pub health_status: HealthStatus,
	#[serde(default, deserialize_with = "lenient_f64")]
	pub http_in: f64,
	#[serde(default, deserialize_with = "lenient_f64")]
	pub http_out: f64,
	#[serde(default, deserialize_with = "lenient_f64")]
	pub grpc_in: f64,
	#[serde(default, deserialize_with = "lenient_f64")]
	pub grpc_out: f64,
	#[serde(default, deserialize_with = "lenient_f64")]
	pub tcp_in: f64,
	#[serde(default, deserialize_with = "lenient_f64")]
	pub tcp_out: f64,
}

impl NodeData {
	/// The kind-specific display name: the app/service/workload name the
	/// node represents, falling back to the id for boxes and aggregates.
	pub fn display_name(&self) -> &str {
		let name = match self.node_type {
			NodeKind::App | NodeKind::Box => self.app.as_deref(),
			NodeKind::Service => self.service.as_deref(),
			NodeKind::Workload => self.workload.as_deref(),
			NodeKind::Aggregate => self.aggregate.as_deref(),
		};
		name.unwrap_or(&self.id)
	}

	pub fn is_box(&self) -> bool {
		self.node_type == NodeKind::Box
	}
}

/// An observed traffic relationship between two nodes.
#[derive(Clone, Debug, Deserialize)]
pub struct EdgeData {
	pub id: String,
	pub source: String,
	pub target: String,
	#[serde(default, deserialize_with = "lenient_protocol")]
	pub protocol: Option<Protocol>,
	/// Requests per second over gRPC.
	#[serde(default, deserialize_with = "lenient_f64")]
	pub grpc: f64,
	#[serde(default, deserialize_with = "lenient_f64")]
	pub grpc_percent_err: f64,
	/// Requests per second over HTTP.
	#[serde(default, deserialize_with = "lenient_f64")]
	pub http: f64,
	#[serde(default, deserialize_with = "lenient_f64")]
	pub http_percent_err: f64,
	/// Bytes per second over TCP.
	#[serde(default, deserialize_with = "lenient_f64")]
	pub tcp: f64,
	/// Average response time in milliseconds. NaN when unknown.
	#[serde(default = "nan", deserialize_with = "lenient_f64")]
	pub response_time: f64,
	#[serde(default, deserialize_with = "lenient_f64")]
	pub throughput: f64,
	/// Percentage of the traffic protected by mTLS, in `[0, 100]`.
	#[serde(default, deserialize_with = "lenient_f64")]
	pub is_mtls: f64,
}

impl EdgeData {
	/// An edge is a self-loop when both endpoints are the same node.
	pub fn is_loop(&self) -> bool {
		self.source == self.target
	}

	/// The request/byte rate matching the edge protocol.
	pub fn protocol_rate(&self) -> f64 {
		match self.protocol {
			Some(Protocol::Grpc) => self.grpc,
			Some(Protocol::Http) => self.http,
			Some(Protocol::Tcp) => self.tcp,
			None => 0.0,
		}
	}
}

/// The decorated element set consumed on each refresh.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphElements {
	#[serde(default)]
	pub nodes: Vec<NodeData>,
	#[serde(default)]
	pub edges: Vec<EdgeData>,
}

/// Flattened payload handed to node and box tap callbacks.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeTapEvent {
	pub namespace: String,
	pub node_type: NodeKind,
	pub app: Option<String>,
	pub service: Option<String>,
	pub workload: Option<String>,
	pub cluster: Option<String>,
	/// Absent for boxes, which span versions.
	pub version: Option<String>,
	pub is_box: Option<BoxKind>,
	/// For a box this is true only when every descendant is idle.
	pub is_idle: bool,
	pub is_inaccessible: bool,
	pub is_out_of_mesh: bool,
	pub is_outside: bool,
	pub is_service_entry: bool,
	pub is_waypoint: bool,
}

/// Flattened payload handed to edge tap callbacks. `source` and `target`
/// carry the kind-specific names of the endpoint nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeTapEvent {
	pub namespace: String,
	pub node_type: NodeKind,
	pub source: String,
	pub target: String,
}

fn nan() -> f64 {
	f64::NAN
}

/// Accepts a JSON number, a numeric string, or null. Strings that fail to
/// parse coerce to NaN with a warning instead of failing the refresh.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
	D: Deserializer<'de>,
{
	struct LenientF64;

	impl<'de> Visitor<'de> for LenientF64 {
		type Value = f64;

		fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
			formatter.write_str("a number, a numeric string, or null")
		}

		fn visit_f64<E: de::Error>(self, value: f64) -> Result<f64, E> {
			Ok(value)
		}

		fn visit_i64<E: de::Error>(self, value: i64) -> Result<f64, E> {
			Ok(value as f64)
		}

		fn visit_u64<E: de::Error>(self, value: u64) -> Result<f64, E> {
			Ok(value as f64)
		}

		fn visit_str<E: de::Error>(self, value: &str) -> Result<f64, E> {
			Ok(value.trim().parse().unwrap_or_else(|_| {
				warn!("mesh-graph: non-numeric metric value {value:?}, coercing to NaN");
				f64::NAN
			}))
		}

		fn visit_none<E: de::Error>(self) -> Result<f64, E> {
			Ok(0.0)
		}

		fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
			Ok(0.0)
		}
	}

	deserializer.deserialize_any(LenientF64)
}

/// Unknown protocol strings decode to `None` with a warning; such edges
/// simply carry no renderable traffic.
fn lenient_protocol<'de, D>(deserializer: D) -> Result<Option<Protocol>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<String>::deserialize(deserializer)?;
	Ok(match value.as_deref() {
		Some("grpc") => Some(Protocol::Grpc),
		Some("http") => Some(Protocol::Http),
		Some("tcp") => Some(Protocol::Tcp),
		Some("") | None => None,
		Some(other) => {
			warn!("mesh-graph: unknown edge protocol {other:?}");
			None
		}
	})
}
