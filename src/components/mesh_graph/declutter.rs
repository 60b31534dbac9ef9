//! Self-loop decluttering.
//!
//! A self-loop drawn at its default angle can land on top of a sibling
//! edge's endpoint. When that happens the loop is swung into the largest
//! free angular gap around the node, shrinking its aperture if the gap is
//! narrower than the default sweep. Angles are measured from the 12 o'clock
//! position, normalized to `[0, 2PI)`.

use std::f64::consts::PI;

use super::geom::{angle_between_vectors, normalize, squared_distance, Point};

/// Default loop aperture in radians (a quarter turn, drawn clockwise).
pub const DEFAULT_LOOP_SWEEP: f64 = -1.5707;
/// Default loop direction relative to 12 o'clock.
pub const DEFAULT_LOOP_DIRECTION: f64 = -0.7854;

/// Endpoints closer than this (pixels) count as overlapping.
const MIN_CONFLICT_DISTANCE: f64 = 1.0;

/// Where to draw a self-loop: direction angle of its midpoint and the swept
/// aperture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoopPlacement {
	pub direction: f64,
	pub sweep: f64,
}

impl Default for LoopPlacement {
	fn default() -> Self {
		Self {
			direction: DEFAULT_LOOP_DIRECTION,
			sweep: DEFAULT_LOOP_SWEEP,
		}
	}
}

/// Decide a better placement for a self-loop at `node_position` whose
/// rendered endpoints are `loop_endpoints`, given the near endpoints of
/// every sibling edge incident to the same node.
///
/// Returns `None` when the loop should be left untouched: no siblings, no
/// sibling close enough to collide, or a node so busy that no usable gap
/// exists.
pub fn declutter_loop(
	node_position: Point,
	loop_endpoints: (Point, Point),
	sibling_endpoints: &[Point],
	busy_threshold: f64,
) -> Option<LoopPlacement> {
	if sibling_endpoints.is_empty() {
		return None;
	}

	let collides = sibling_endpoints.iter().any(|&endpoint| {
		squared_distance(endpoint, loop_endpoints.0) <= MIN_CONFLICT_DISTANCE
			|| squared_distance(endpoint, loop_endpoints.1) <= MIN_CONFLICT_DISTANCE
	});
	if !collides {
		return None;
	}

	// One conflicting sibling: dodge by half the default sweep.
	if sibling_endpoints.len() == 1 {
		return Some(LoopPlacement {
			direction: DEFAULT_LOOP_DIRECTION - DEFAULT_LOOP_SWEEP * 0.5,
			sweep: DEFAULT_LOOP_SWEEP,
		});
	}

	// Angular position of every sibling endpoint around the node.
	let mut angles: Vec<f64> = sibling_endpoints
		.iter()
		.map(|&endpoint| {
			let angle = angle_between_vectors(
				normalize(Point::new(
					endpoint.x - node_position.x,
					endpoint.y - node_position.y,
				)),
				Point::new(0.0, 1.0),
			);
			if angle < 0.0 { angle + 2.0 * PI } else { angle }
		})
		.collect();
	angles.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

	// Largest gap between consecutive siblings, wrapping past 12 o'clock.
	let mut gap_start = 0.0;
	let mut gap = 0.0;
	for i in 0..angles.len() {
		let start = angles[i];
		let end = if i + 1 < angles.len() {
			angles[i + 1]
		} else {
			angles[0] + 2.0 * PI
		};
		if end - start > gap {
			gap = end - start;
			gap_start = start;
		}
	}

	// Below the threshold the node is too busy; accept the overlap.
	if gap < busy_threshold {
		return None;
	}

	let mut start = gap_start;
	let mut end = gap_start + gap;
	let mut sweep = DEFAULT_LOOP_SWEEP;
	if gap <= -DEFAULT_LOOP_SWEEP {
		// The gap is narrower than the natural aperture: shrink to 90% of
		// the gap and inset both sides so the loop clears its neighbors.
		sweep = -(gap * 0.9);
		start += gap * 0.05;
		end -= gap * 0.05;
	}

	Some(LoopPlacement {
		direction: start + (end - start) * 0.5,
		sweep,
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	const NODE: Point = Point::new(0.0, 0.0);
	// Loop endpoints just above the node, near 12 o'clock.
	const LOOP_ENDS: (Point, Point) = (Point::new(-3.0, 10.0), Point::new(3.0, 10.0));

	/// A sibling endpoint at `angle` radians clockwise from 12 o'clock.
	fn sibling_at(angle: f64, radius: f64) -> Point {
		Point::new(radius * angle.sin(), radius * angle.cos())
	}

	#[test]
	fn lonely_loop_is_never_touched() {
		assert_eq!(declutter_loop(NODE, LOOP_ENDS, &[], 1.0), None);
	}

	#[test]
	fn distant_siblings_cause_no_move() {
		let siblings = [Point::new(100.0, 0.0), Point::new(0.0, -80.0)];
		assert_eq!(declutter_loop(NODE, LOOP_ENDS, &siblings, 1.0), None);
	}

	#[test]
	fn single_conflict_shifts_by_half_sweep() {
		let siblings = [Point::new(-3.0, 10.5)];
		let placement = declutter_loop(NODE, LOOP_ENDS, &siblings, 1.0).unwrap();
		assert_eq!(placement.sweep, DEFAULT_LOOP_SWEEP);
		let expected = DEFAULT_LOOP_DIRECTION - DEFAULT_LOOP_SWEEP * 0.5;
		assert!((placement.direction - expected).abs() < 1e-9);
	}

	#[test]
	fn loop_centers_in_the_widest_gap() {
		// One sibling collides with the loop's right endpoint, two more sit
		// at 3 and 6 o'clock. The widest gap opens from 6 o'clock back
		// around toward the colliding sibling.
		let colliding = Point::new(3.0, 10.5);
		let siblings = [colliding, sibling_at(PI / 2.0, 20.0), sibling_at(PI, 20.0)];
		let placement = declutter_loop(NODE, LOOP_ENDS, &siblings, 1.0).unwrap();
		let colliding_angle = (3.0f64 / 10.5).atan();
		let expected = (PI + colliding_angle + 2.0 * PI) / 2.0;
		assert!((placement.direction - expected).abs() < 0.05);
		assert_eq!(placement.sweep, DEFAULT_LOOP_SWEEP);
	}

	#[test]
	fn busy_node_keeps_its_overlap() {
		// Eight siblings spaced a quarter turn apart leave no gap of a full
		// radian, so even a colliding loop stays where it is.
		let mut siblings = vec![Point::new(3.0, 10.5)];
		siblings.extend((0..8).map(|i| sibling_at(i as f64 * PI / 4.0 + 0.01, 20.0)));
		assert_eq!(declutter_loop(NODE, LOOP_ENDS, &siblings, 1.0), None);
	}

	#[test]
	fn narrow_gap_shrinks_the_aperture() {
		// The widest gap (~1.2 rad) is narrower than the default sweep
		// magnitude (~1.57), so the aperture shrinks to fit.
		let siblings = [
			Point::new(3.0, 10.5),
			sibling_at(0.2, 20.0),
			sibling_at(1.4, 20.0),
			sibling_at(2.2, 20.0),
			sibling_at(3.0, 20.0),
			sibling_at(4.0, 20.0),
			sibling_at(4.9, 20.0),
			sibling_at(5.8, 20.0),
		];
		let placement = declutter_loop(NODE, LOOP_ENDS, &siblings, 1.0).unwrap();
		assert!(placement.sweep.abs() < -DEFAULT_LOOP_SWEEP);
		assert!(placement.sweep < 0.0);
	}
}
