//! Marker-launch interval calibration.
//!
//! Each animation start scans the visible edges once per protocol group and
//! records the fastest observed rate. `compute_delay` then maps an edge's
//! rate onto a launch-interval band relative to that maximum: the busiest
//! edge launches markers at the shortest interval, a barely-active edge at
//! the longest. Calibration is reset and redone from scratch on every start;
//! there is no incremental recalibration mid-run.

/// Maps raw traffic rates to marker-launch intervals for one protocol group.
#[derive(Clone, Debug)]
pub struct AnimationTimerConfig {
	min_delay_ms: f64,
	max_delay_ms: f64,
	observed_max_rate: f64,
}

impl AnimationTimerConfig {
	/// `min_delay_ms` is the interval used at the calibrated maximum rate,
	/// `max_delay_ms` the interval as the rate approaches zero.
	pub fn new(min_delay_ms: f64, max_delay_ms: f64) -> Self {
		Self {
			min_delay_ms,
			max_delay_ms,
			observed_max_rate: 0.0,
		}
	}

	/// Forget everything learned from the previous run.
	pub fn reset_calibration(&mut self) {
		self.observed_max_rate = 0.0;
	}

	/// Record one observed rate. NaN and non-positive rates are ignored.
	pub fn calibrate(&mut self, rate: f64) {
		if rate.is_finite() && rate > self.observed_max_rate {
			self.observed_max_rate = rate;
		}
	}

	/// The launch interval for an edge with the given rate, or `None` when
	/// the edge has no renderable traffic.
	pub fn compute_delay(&self, rate: f64) -> Option<f64> {
		if !rate.is_finite() || rate <= 0.0 {
			return None;
		}
		// An uncalibrated rate (nothing observed, or above the observed max)
		// counts as the maximum.
		let max_rate = self.observed_max_rate.max(rate);
		let ratio = rate / max_rate;
		let delay = self.max_delay_ms - ratio * (self.max_delay_ms - self.min_delay_ms);
		Some(delay.clamp(self.min_delay_ms, self.max_delay_ms))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn no_traffic_means_no_delay() {
		let config = AnimationTimerConfig::new(50.0, 2000.0);
		assert_eq!(config.compute_delay(0.0), None);
		assert_eq!(config.compute_delay(f64::NAN), None);
		assert_eq!(config.compute_delay(-3.0), None);
	}

	#[test]
	fn busier_edges_launch_faster() {
		let mut config = AnimationTimerConfig::new(50.0, 2000.0);
		config.calibrate(100.0);
		config.calibrate(10.0);
		let busy = config.compute_delay(100.0).unwrap();
		let quiet = config.compute_delay(10.0).unwrap();
		assert!(busy < quiet);
		assert_eq!(busy, 50.0);
	}

	#[test]
	fn delays_stay_inside_the_band() {
		let mut config = AnimationTimerConfig::new(50.0, 2000.0);
		config.calibrate(500.0);
		for rate in [0.0001, 1.0, 250.0, 500.0] {
			let delay = config.compute_delay(rate).unwrap();
			assert!((50.0..=2000.0).contains(&delay));
		}
	}

	#[test]
	fn reset_forgets_the_previous_run() {
		let mut config = AnimationTimerConfig::new(50.0, 2000.0);
		config.calibrate(1000.0);
		config.reset_calibration();
		// With nothing calibrated, any rate is treated as the maximum.
		assert_eq!(config.compute_delay(1.0), Some(50.0));
	}
}
