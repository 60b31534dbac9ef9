//! Node ranking from edge topology.
//!
//! Nodes are scored per criterion as the fraction of the element set's edges
//! incident to them in the given direction, summed across criteria, then
//! densely ranked (ties share a rank) and normalized into `[1, 100]` with 1
//! the most important. Re-running with unchanged input yields identical
//! ranks; running with no criteria clears every rank.

use super::model::GraphModel;

/// Directions a node can be scored by. Criteria are additive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoringCriteria {
	InboundEdges,
	OutboundEdges,
}

/// The ceiling of the normalized rank scale.
const RANK_UPPER_BOUND: u32 = 100;

/// Score and rank every node in the model. Returns the upper bound of the
/// assigned ranks: the number of distinct score tiers, capped at 100, or 0
/// when ranking is disabled or there is nothing to rank.
pub fn score_nodes(model: &mut GraphModel, criteria: &[ScoringCriteria]) -> u32 {
	if criteria.is_empty() {
		for node in model.nodes_mut() {
			node.rank = None;
			node.score = None;
		}
		return 0;
	}
	if model.nodes().is_empty() {
		return 0;
	}

	let total_edges = model.edges().len();
	for idx in 0..model.nodes().len() {
		let node = model.node(idx);
		let mut score = 0.0;
		for criterion in criteria {
			let count = match criterion {
				ScoringCriteria::InboundEdges => node.in_edges.len(),
				ScoringCriteria::OutboundEdges => node.out_edges.len(),
			};
			if total_edges > 0 {
				score += count as f64 / total_edges as f64;
			}
		}
		model.node_mut(idx).score = Some(score);
	}

	// Stable sort keeps prior relative order for equal scores.
	let mut order: Vec<usize> = (0..model.nodes().len()).collect();
	order.sort_by(|&a, &b| {
		let (sa, sb) = (model.node(a).score, model.node(b).score);
		sb.partial_cmp(&sa).unwrap_or(std::cmp::Ordering::Equal)
	});

	// Dense ranks: equal scores share a rank, the next distinct score gets
	// predecessor rank + 1. Nodes that never got a score keep their position
	// but are skipped from numbering.
	let mut next_rank = 0u32;
	let mut previous_score: Option<f64> = None;
	for &idx in &order {
		let Some(score) = model.node(idx).score else {
			continue;
		};
		if previous_score != Some(score) {
			next_rank += 1;
			previous_score = Some(score);
		}
		model.node_mut(idx).rank = Some(next_rank);
	}

	let max_rank = next_rank;
	if max_rank <= RANK_UPPER_BOUND {
		return max_rank;
	}

	// Too many tiers for the scale: rescale linearly, keeping the best tier
	// pinned at 1 and the worst at 100.
	for node in model.nodes_mut() {
		if let Some(rank) = node.rank {
			let scaled =
				1.0 + (rank - 1) as f64 * (RANK_UPPER_BOUND - 1) as f64 / (max_rank - 1) as f64;
			node.rank = Some((scaled.ceil() as u32).min(RANK_UPPER_BOUND));
		}
	}
	RANK_UPPER_BOUND
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::mesh_graph::test_fixtures::{edge, elements, node};

	fn rank_of(model: &GraphModel, id: &str) -> Option<u32> {
		model.node(model.node_by_id(id).unwrap()).rank
	}

	#[test]
	fn two_parallel_edges_rank_target_first() {
		let mut model = GraphModel::build(&elements(
			vec![node("source"), node("target")],
			vec![edge("e0", "source", "target"), edge("e1", "source", "target")],
		));
		let upper = score_nodes(&mut model, &[ScoringCriteria::InboundEdges]);
		assert_eq!(rank_of(&model, "target"), Some(1));
		assert_eq!(rank_of(&model, "source"), Some(2));
		assert_eq!(upper, 2);
	}

	#[test]
	fn outbound_criterion_flips_the_order() {
		let mut model = GraphModel::build(&elements(
			vec![node("source"), node("target")],
			vec![edge("e0", "source", "target"), edge("e1", "source", "target")],
		));
		let upper = score_nodes(&mut model, &[ScoringCriteria::OutboundEdges]);
		assert_eq!(rank_of(&model, "source"), Some(1));
		assert_eq!(rank_of(&model, "target"), Some(2));
		assert_eq!(upper, 2);
	}

	#[test]
	fn summed_criteria_can_tie_everything() {
		let mut model = GraphModel::build(&elements(
			vec![node("source"), node("target")],
			vec![edge("e0", "source", "target"), edge("e1", "source", "target")],
		));
		let upper = score_nodes(
			&mut model,
			&[ScoringCriteria::OutboundEdges, ScoringCriteria::InboundEdges],
		);
		assert_eq!(rank_of(&model, "source"), Some(1));
		assert_eq!(rank_of(&model, "target"), Some(1));
		assert_eq!(upper, 1);
	}

	#[test]
	fn graph_without_edges_ties_at_rank_one() {
		let mut model = GraphModel::build(&elements(
			vec![node("a"), node("b"), node("c")],
			vec![],
		));
		let upper = score_nodes(&mut model, &[ScoringCriteria::InboundEdges]);
		for id in ["a", "b", "c"] {
			assert_eq!(rank_of(&model, id), Some(1));
		}
		assert_eq!(upper, 1);
	}

	#[test]
	fn nodes_without_qualifying_edges_land_in_worst_tier() {
		let mut model = GraphModel::build(&elements(
			vec![node("source"), node("target1"), node("target2")],
			vec![edge("e0", "source", "target1")],
		));
		let upper = score_nodes(&mut model, &[ScoringCriteria::InboundEdges]);
		assert_eq!(rank_of(&model, "target1"), Some(1));
		assert_eq!(rank_of(&model, "target2"), Some(2));
		assert_eq!(rank_of(&model, "source"), Some(2));
		assert_eq!(upper, 2);
	}

	#[test]
	fn empty_criteria_clears_previous_ranks() {
		let mut model = GraphModel::build(&elements(
			vec![node("source"), node("target")],
			vec![edge("e0", "source", "target")],
		));
		score_nodes(&mut model, &[ScoringCriteria::InboundEdges]);
		assert!(rank_of(&model, "target").is_some());
		let upper = score_nodes(&mut model, &[]);
		assert_eq!(upper, 0);
		assert!(model.nodes().iter().all(|n| n.rank.is_none()));
	}

	#[test]
	fn rescoring_unchanged_input_is_idempotent() {
		let mut model = GraphModel::build(&elements(
			vec![node("a"), node("b"), node("c")],
			vec![edge("e0", "a", "b"), edge("e1", "c", "b"), edge("e2", "a", "c")],
		));
		let first_upper = score_nodes(&mut model, &[ScoringCriteria::InboundEdges]);
		let first: Vec<_> = model.nodes().iter().map(|n| n.rank).collect();
		let second_upper = score_nodes(&mut model, &[ScoringCriteria::InboundEdges]);
		let second: Vec<_> = model.nodes().iter().map(|n| n.rank).collect();
		assert_eq!(first, second);
		assert_eq!(first_upper, second_upper);
	}

	#[test]
	fn more_than_a_hundred_tiers_normalize_into_bounds() {
		// Triangular edge pattern: target j receives one edge from every
		// source i >= j, so in-degrees run 150..1 and sources sit below.
		let count = 150;
		let mut nodes = Vec::new();
		let mut edges = Vec::new();
		for i in 0..count {
			nodes.push(node(&format!("source{i}")));
			nodes.push(node(&format!("target{i}")));
		}
		for i in 0..count {
			for j in 0..=i {
				edges.push(edge(
					&format!("edge{i}-{j}"),
					&format!("source{i}"),
					&format!("target{j}"),
				));
			}
		}
		let mut model = GraphModel::build(&elements(nodes, edges));
		let upper = score_nodes(&mut model, &[ScoringCriteria::InboundEdges]);

		assert_eq!(upper, 100);
		assert_eq!(rank_of(&model, "target0"), Some(1));
		assert_eq!(rank_of(&model, "source0"), Some(100));
		let mut previous = 0;
		for j in 0..count {
			let rank = rank_of(&model, &format!("target{j}")).unwrap();
			assert!((1..=100).contains(&rank));
			// Fewer inbound edges never improves the rank.
			assert!(rank >= previous);
			previous = rank;
		}
	}
}
