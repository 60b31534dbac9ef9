//! Hover and selection emphasis propagation.
//!
//! Given a clicked or hovered element, computes the closure of topologically
//! related elements to emphasize and flags everything else de-emphasized.
//! The computation is a pure function of the current model and the event
//! target, recomputed from scratch on every transition since topology can
//! change between events.

use super::model::{ElementRef, ElementSet, GraphModel};
use super::types::{BoxKind, NodeKind};

/// What the user currently has selected. The graph background is the
/// default and means "nothing of interest selected".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Selection {
	#[default]
	Graph,
	Element(ElementRef),
}

/// Tracks hover/selection state and drives the emphasis flags on the model.
///
/// At most one selection is active at a time, and hover is suppressed
/// entirely while something concrete is selected.
#[derive(Clone, Debug, Default)]
pub struct GraphHighlighter {
	selected: Selection,
	hovered: Option<ElementRef>,
}

impl GraphHighlighter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn selected(&self) -> &Selection {
		&self.selected
	}

	/// Select an element, or the graph background to deselect. Re-clicking
	/// the current selection is a no-op.
	pub fn on_click(&mut self, model: &mut GraphModel, target: Selection) {
		if target == self.selected {
			return;
		}
		if let Selection::Element(previous) = &self.selected {
			model.set_selected(previous, false);
		}
		if let Some(hovered) = self.hovered.take() {
			model.set_hovered(&hovered, false);
		}
		self.selected = target;
		model.clear_emphasis();
		if let Selection::Element(element) = self.selected.clone() {
			model.set_selected(&element, true);
			apply_emphasis(model, &element);
		}
	}

	/// Hover onto an element. Ignored while a concrete selection is active.
	pub fn on_mouse_in(&mut self, model: &mut GraphModel, target: ElementRef) {
		if self.selected != Selection::Graph {
			return;
		}
		if let Some(previous) = self.hovered.take() {
			model.set_hovered(&previous, false);
		}
		model.set_hovered(&target, true);
		self.hovered = Some(target.clone());
		model.clear_emphasis();
		apply_emphasis(model, &target);
	}

	/// Hover off an element. Only clears state if it matches the current
	/// hover target.
	pub fn on_mouse_out(&mut self, model: &mut GraphModel, target: &ElementRef) {
		if self.hovered.as_ref() != Some(target) {
			return;
		}
		model.set_hovered(target, false);
		self.hovered = None;
		model.clear_emphasis();
	}

	/// Rebind state to a freshly built model. A selection whose element
	/// vanished from the new snapshot resets to the background.
	pub fn on_data_refresh(&mut self, model: &mut GraphModel) {
		self.hovered = None;
		match self.selected.clone() {
			Selection::Element(element) if model.contains(&element) => {
				model.set_selected(&element, true);
				model.clear_emphasis();
				apply_emphasis(model, &element);
			}
			Selection::Element(_) => self.selected = Selection::Graph,
			Selection::Graph => {}
		}
	}
}

/// Flag the emphasis closure for `target` on the model.
fn apply_emphasis(model: &mut GraphModel, target: &ElementRef) {
	let Some((set, unhighlight_rest)) = emphasis_closure(model, target) else {
		return;
	};
	for idx in 0..model.nodes().len() {
		let included = set.nodes.contains(&idx);
		model.set_node_flags(idx, |flags| {
			flags.highlighted = included;
			flags.unhighlighted = unhighlight_rest && !included;
		});
	}
	for idx in 0..model.edges().len() {
		let included = set.edges.contains(&idx);
		model.set_edge_flags(idx, |flags| {
			flags.highlighted = included;
			flags.unhighlighted = unhighlight_rest && !included;
		});
	}
}

/// The set of elements to emphasize for `target`, plus whether the rest of
/// the graph should be de-emphasized.
fn emphasis_closure(model: &GraphModel, target: &ElementRef) -> Option<(ElementSet, bool)> {
	let mut set = ElementSet::default();
	let unhighlight_rest = match target {
		ElementRef::Node(id) => {
			let idx = model.node_by_id(id)?;
			match (model.node(idx).data.node_type, model.node(idx).data.box_kind) {
				(NodeKind::Box, Some(BoxKind::App)) => {
					// An app box lights up its members and everything they
					// talk to, both directions.
					set.nodes.insert(idx);
					for member in model.descendants_of(idx) {
						set.nodes.insert(member);
						set.merge(model.predecessors_closure(member));
						set.merge(model.successors_closure(member));
					}
					true
				}
				(NodeKind::Box, _) => {
					// Large-grain boxes emphasize only themselves; dimming
					// the whole graph at this grain just flashes.
					set.nodes.insert(idx);
					false
				}
				_ => {
					set.nodes.insert(idx);
					set.merge(model.predecessors_closure(idx));
					set.merge(model.successors_closure(idx));
					true
				}
			}
		}
		ElementRef::Edge(id) => {
			let idx = model.edge_by_id(id)?;
			let edge = model.edge(idx);
			set.edges.insert(idx);
			set.nodes.insert(edge.source);
			set.nodes.insert(edge.target);
			set.merge(model.predecessors_closure(edge.source));
			set.merge(model.successors_closure(edge.target));
			true
		}
	};

	// A highlighted element always lights up its containing boxes.
	let included: Vec<usize> = set.nodes.iter().copied().collect();
	for idx in included {
		set.nodes.extend(model.ancestors_of(idx));
	}
	Some((set, unhighlight_rest))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::mesh_graph::test_fixtures::{
		app_box, edge, elements, node, node_in_box,
	};

	fn flags_of(model: &GraphModel, id: &str) -> crate::components::mesh_graph::model::ElementFlags {
		model.node(model.node_by_id(id).unwrap()).flags
	}

	fn chain_model() -> GraphModel {
		// a -> b -> c
		GraphModel::build(&elements(
			vec![node("a"), node("b"), node("c")],
			vec![edge("e0", "a", "b"), edge("e1", "b", "c")],
		))
	}

	#[test]
	fn selecting_a_node_includes_itself_and_both_directions() {
		let mut model = chain_model();
		let mut highlighter = GraphHighlighter::new();
		highlighter.on_click(&mut model, Selection::Element(ElementRef::Node("b".into())));

		assert!(flags_of(&model, "b").highlighted);
		assert!(flags_of(&model, "a").highlighted);
		assert!(flags_of(&model, "c").highlighted);
		assert!(model.edges().iter().all(|e| e.flags.highlighted));
	}

	#[test]
	fn edge_emphasis_is_directional() {
		let mut model = chain_model();
		let mut highlighter = GraphHighlighter::new();
		highlighter.on_click(&mut model, Selection::Element(ElementRef::Edge("e1".into())));

		// e1 runs b -> c: b's upstream (a) is in, but nothing upstream of c
		// beyond the edge endpoints themselves gets re-included.
		assert!(flags_of(&model, "a").highlighted);
		assert!(flags_of(&model, "b").highlighted);
		assert!(flags_of(&model, "c").highlighted);
		let e0 = model.edge(model.edge_by_id("e0").unwrap());
		assert!(e0.flags.highlighted);
	}

	#[test]
	fn background_click_clears_all_emphasis() {
		let mut model = chain_model();
		let mut highlighter = GraphHighlighter::new();
		highlighter.on_click(&mut model, Selection::Element(ElementRef::Node("b".into())));
		highlighter.on_click(&mut model, Selection::Graph);

		assert!(model.nodes().iter().all(|n| !n.flags.highlighted));
		assert!(model.nodes().iter().all(|n| !n.flags.unhighlighted));
		assert!(model.edges().iter().all(|e| !e.flags.highlighted));
	}

	#[test]
	fn hover_is_suppressed_while_selected() {
		let mut model = chain_model();
		let mut highlighter = GraphHighlighter::new();
		highlighter.on_click(&mut model, Selection::Element(ElementRef::Node("a".into())));
		let before: Vec<_> = model.nodes().iter().map(|n| n.flags).collect();

		highlighter.on_mouse_in(&mut model, ElementRef::Node("c".into()));
		let after: Vec<_> = model.nodes().iter().map(|n| n.flags).collect();
		assert_eq!(before, after);
	}

	#[test]
	fn mouse_out_ignores_stale_targets() {
		let mut model = chain_model();
		let mut highlighter = GraphHighlighter::new();
		highlighter.on_mouse_in(&mut model, ElementRef::Node("a".into()));
		highlighter.on_mouse_out(&mut model, &ElementRef::Node("b".into()));
		// "a" is still hovered and emphasized.
		assert!(flags_of(&model, "a").hovered);
		assert!(flags_of(&model, "a").highlighted);
	}

	#[test]
	fn unrelated_nodes_are_dimmed() {
		let mut model = GraphModel::build(&elements(
			vec![node("a"), node("b"), node("lonely")],
			vec![edge("e0", "a", "b")],
		));
		let mut highlighter = GraphHighlighter::new();
		highlighter.on_mouse_in(&mut model, ElementRef::Node("a".into()));
		assert!(flags_of(&model, "lonely").unhighlighted);
		assert!(!flags_of(&model, "lonely").highlighted);
	}

	#[test]
	fn child_emphasis_lights_containing_boxes() {
		let mut model = GraphModel::build(&elements(
			vec![app_box("box-a"), node_in_box("w1", "box-a"), node("other")],
			vec![edge("e0", "other", "w1")],
		));
		let mut highlighter = GraphHighlighter::new();
		highlighter.on_click(&mut model, Selection::Element(ElementRef::Node("w1".into())));
		assert!(flags_of(&model, "box-a").highlighted);
	}

	#[test]
	fn namespace_box_does_not_dim_the_graph() {
		let mut ns = app_box("ns-box");
		ns.box_kind = Some(BoxKind::Namespace);
		let mut model = GraphModel::build(&elements(
			vec![ns, node_in_box("w1", "ns-box"), node("other")],
			vec![],
		));
		let mut highlighter = GraphHighlighter::new();
		highlighter.on_click(&mut model, Selection::Element(ElementRef::Node("ns-box".into())));
		assert!(flags_of(&model, "ns-box").highlighted);
		assert!(!flags_of(&model, "other").unhighlighted);
	}

	#[test]
	fn app_box_lights_members_and_their_peers() {
		let mut model = GraphModel::build(&elements(
			vec![
				app_box("box-a"),
				node_in_box("w1", "box-a"),
				node("upstream"),
				node("stranger"),
			],
			vec![edge("e0", "upstream", "w1")],
		));
		let mut highlighter = GraphHighlighter::new();
		highlighter.on_click(&mut model, Selection::Element(ElementRef::Node("box-a".into())));
		assert!(flags_of(&model, "w1").highlighted);
		assert!(flags_of(&model, "upstream").highlighted);
		assert!(flags_of(&model, "stranger").unhighlighted);
	}

	#[test]
	fn vanished_selection_resets_to_background() {
		let mut model = chain_model();
		let mut highlighter = GraphHighlighter::new();
		highlighter.on_click(&mut model, Selection::Element(ElementRef::Node("b".into())));

		let mut refreshed = GraphModel::build(&elements(vec![node("x")], vec![]));
		highlighter.on_data_refresh(&mut refreshed);
		assert_eq!(highlighter.selected(), &Selection::Graph);
		assert!(refreshed.nodes().iter().all(|n| !n.flags.highlighted));
	}
}
