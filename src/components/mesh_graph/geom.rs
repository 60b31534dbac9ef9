//! Pure 2D math for edge paths.
//!
//! Edge paths are short ordered control-point lists: 2 points for a straight
//! line, 3 for a single quadratic Bézier, 5 for a self-loop drawn as two
//! back-to-back Béziers. Everything here is allocation-free and side-effect
//! free so it can be exercised directly in tests.

use thiserror::Error;

/// A point in canvas coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Component-wise translation by `offset`.
	pub fn offset_by(self, offset: Point) -> Self {
		Self {
			x: self.x + offset.x,
			y: self.y + offset.y,
		}
	}
}

/// Clamp `value` into `[min, max]`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
	value.max(min).min(max)
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
	squared_distance(a, b).sqrt()
}

/// Squared distance, for comparisons that don't need the root.
pub fn squared_distance(a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	dx * dx + dy * dy
}

/// Normalize a vector to unit length. The zero vector stays zero.
pub fn normalize(v: Point) -> Point {
	let len = (v.x * v.x + v.y * v.y).sqrt();
	if len < f64::EPSILON {
		return Point::default();
	}
	Point::new(v.x / len, v.y / len)
}

/// Signed angle in radians between two vectors, in `(-PI, PI]`.
pub fn angle_between_vectors(a: Point, b: Point) -> f64 {
	let cross = a.x * b.y - a.y * b.x;
	let dot = a.x * b.x + a.y * b.y;
	cross.atan2(dot)
}

/// Linear interpolation between `p0` and `p1` at progress `t`.
pub fn linear_interpolation(p0: Point, p1: Point, t: f64) -> Point {
	Point::new(p0.x + (p1.x - p0.x) * t, p0.y + (p1.y - p0.y) * t)
}

/// Quadratic Bézier through control points `p0`, `p1`, `p2` at progress `t`.
pub fn quadratic_bezier(p0: Point, p1: Point, p2: Point, t: f64) -> Point {
	let mt = 1.0 - t;
	Point::new(
		mt * mt * p0.x + 2.0 * mt * t * p1.x + t * t * p2.x,
		mt * mt * p0.y + 2.0 * mt * t * p1.y + t * t * p2.y,
	)
}

const BEZIER_LENGTH_SEGMENTS: usize = 20;

/// Approximate arc length of a quadratic Bézier by flattening it into
/// straight segments.
pub fn bezier_length(p0: Point, p1: Point, p2: Point) -> f64 {
	let mut length = 0.0;
	let mut previous = p0;
	for i in 1..=BEZIER_LENGTH_SEGMENTS {
		let t = i as f64 / BEZIER_LENGTH_SEGMENTS as f64;
		let current = quadratic_bezier(p0, p1, p2, t);
		length += distance(previous, current);
		previous = current;
	}
	length
}

/// Geometry failures recoverable per edge: the affected edge is skipped for
/// the current tick, other edges keep animating.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PathError {
	#[error("unsupported control point count: {0}")]
	UnsupportedControlPoints(usize),
	#[error("degenerate path with no length")]
	DegeneratePath,
}

/// How a control-point list is interpolated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathKind {
	/// Two points, straight line.
	Straight,
	/// Three points, one quadratic Bézier.
	Curve,
	/// Five points, a self-loop split into two Béziers: the first covers
	/// progress `[0, 0.5)`, the second `[0.5, 1]`.
	Loop,
}

/// The on-screen path of an edge.
#[derive(Clone, Debug, Default)]
pub struct EdgePath {
	points: Vec<Point>,
}

impl EdgePath {
	pub fn new(points: Vec<Point>) -> Self {
		Self { points }
	}

	pub fn points(&self) -> &[Point] {
		&self.points
	}

	/// Classify the path by its control-point count. Any other count is an
	/// error for this edge, never a panic.
	pub fn kind(&self) -> Result<PathKind, PathError> {
		match self.points.len() {
			2 => Ok(PathKind::Straight),
			3 => Ok(PathKind::Curve),
			5 => Ok(PathKind::Loop),
			n => Err(PathError::UnsupportedControlPoints(n)),
		}
	}

	/// Interpolated position at normalized progress `t` in `[0, 1]`.
	pub fn point_at(&self, t: f64) -> Result<Point, PathError> {
		let p = &self.points;
		match self.kind()? {
			PathKind::Straight => Ok(linear_interpolation(p[0], p[1], t)),
			PathKind::Curve => Ok(quadratic_bezier(p[0], p[1], p[2], t)),
			PathKind::Loop => {
				// Each half is re-normalized to its own [0, 1] range.
				if t < 0.5 {
					Ok(quadratic_bezier(p[0], p[1], p[2], t / 0.5))
				} else {
					Ok(quadratic_bezier(p[2], p[3], p[4], (t - 0.5) * 2.0))
				}
			}
		}
	}

	/// Approximate pixel length of the full path.
	pub fn length(&self) -> Result<f64, PathError> {
		let p = &self.points;
		let length = match self.kind()? {
			PathKind::Straight => distance(p[0], p[1]),
			PathKind::Curve => bezier_length(p[0], p[1], p[2]),
			PathKind::Loop => bezier_length(p[0], p[1], p[2]) + bezier_length(p[2], p[3], p[4]),
		};
		if length < f64::EPSILON {
			return Err(PathError::DegeneratePath);
		}
		Ok(length)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn approx(a: Point, b: Point) -> bool {
		(a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
	}

	#[test]
	fn straight_path_midpoint() {
		let path = EdgePath::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 20.0)]);
		let mid = path.point_at(0.5).unwrap();
		assert!(approx(mid, Point::new(5.0, 10.0)));
	}

	#[test]
	fn loop_halves_meet_at_midpoint_control() {
		let path = EdgePath::new(vec![
			Point::new(0.0, 0.0),
			Point::new(10.0, -10.0),
			Point::new(20.0, 0.0),
			Point::new(30.0, 10.0),
			Point::new(40.0, 0.0),
		]);
		// Approaching 0.5 from both sides lands on the shared control point.
		let before = path.point_at(0.4999999).unwrap();
		let after = path.point_at(0.5).unwrap();
		assert!(distance(before, after) < 1e-3);
		assert!(approx(after, Point::new(20.0, 0.0)));
	}

	#[test]
	fn unsupported_control_point_count_is_an_error() {
		let path = EdgePath::new(vec![Point::default(); 4]);
		assert_eq!(path.kind(), Err(PathError::UnsupportedControlPoints(4)));
		assert!(path.point_at(0.5).is_err());
	}

	#[test]
	fn zero_length_path_is_degenerate() {
		let path = EdgePath::new(vec![Point::new(3.0, 3.0), Point::new(3.0, 3.0)]);
		assert_eq!(path.length(), Err(PathError::DegeneratePath));
	}

	#[test]
	fn angle_relative_to_noon_wraps_positive() {
		// A vector pointing right is a quarter turn from straight up.
		let up = Point::new(0.0, 1.0);
		let right = Point::new(1.0, 0.0);
		let angle = angle_between_vectors(right, up);
		assert!((angle - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
	}

	fn point_strategy() -> impl Strategy<Value = Point> {
		(-1000.0f64..1000.0, -1000.0f64..1000.0).prop_map(|(x, y)| Point::new(x, y))
	}

	proptest! {
		#[test]
		fn interpolation_hits_endpoints(
			points in prop::collection::vec(point_strategy(), 2..=5)
				.prop_filter("valid counts", |p| matches!(p.len(), 2 | 3 | 5))
		) {
			let first = points[0];
			let last = *points.last().unwrap();
			let path = EdgePath::new(points);
			let start = path.point_at(0.0).unwrap();
			let end = path.point_at(1.0).unwrap();
			prop_assert!(distance(start, first) < 1e-6);
			prop_assert!(distance(end, last) < 1e-6);
		}

		#[test]
		fn bezier_length_at_least_chord(
			p0 in point_strategy(),
			p1 in point_strategy(),
			p2 in point_strategy()
		) {
			prop_assert!(bezier_length(p0, p1, p2) + 1e-6 >= distance(p0, p2));
		}
	}
}
