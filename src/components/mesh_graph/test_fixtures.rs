//! Shared element builders for unit tests.

use super::types::{BoxKind, EdgeData, GraphElements, HealthStatus, NodeData, NodeKind, Protocol};

pub fn node(id: &str) -> NodeData {
	NodeData {
		id: id.to_owned(),
		namespace: "default".to_owned(),
		cluster: String::new(),
		node_type: NodeKind::Workload,
		box_kind: None,
		parent: None,
		app: None,
		service: None,
		workload: None,
		version: None,
		aggregate: None,
		aggregate_value: None,
		is_idle: false,
		is_inaccessible: false,
		is_out_of_mesh: false,
		is_outside: false,
		is_service_entry: false,
		is_waypoint: false,
		health_status: HealthStatus::Healthy,
		http_in: 0.0,
		http_out: 0.0,
		grpc_in: 0.0,
		grpc_out: 0.0,
		tcp_in: 0.0,
		tcp_out: 0.0,
	}
}

pub fn node_in_box(id: &str, parent: &str) -> NodeData {
	NodeData {
		parent: Some(parent.to_owned()),
		..node(id)
	}
}

pub fn app_box(id: &str) -> NodeData {
	NodeData {
		node_type: NodeKind::Box,
		box_kind: Some(BoxKind::App),
		app: Some(id.to_owned()),
		..node(id)
	}
}

pub fn edge(id: &str, source: &str, target: &str) -> EdgeData {
	EdgeData {
		id: id.to_owned(),
		source: source.to_owned(),
		target: target.to_owned(),
		protocol: None,
		grpc: 0.0,
		grpc_percent_err: 0.0,
		http: 0.0,
		http_percent_err: 0.0,
		tcp: 0.0,
		response_time: f64::NAN,
		throughput: 0.0,
		is_mtls: 0.0,
	}
}

/// An edge carrying the given rate on its protocol's rate field.
pub fn traffic_edge(id: &str, source: &str, target: &str, protocol: Protocol, rate: f64) -> EdgeData {
	let mut data = edge(id, source, target);
	data.protocol = Some(protocol);
	match protocol {
		Protocol::Http => data.http = rate,
		Protocol::Grpc => data.grpc = rate,
		Protocol::Tcp => data.tcp = rate,
	}
	data
}

pub fn elements(nodes: Vec<NodeData>, edges: Vec<EdgeData>) -> GraphElements {
	GraphElements { nodes, edges }
}
