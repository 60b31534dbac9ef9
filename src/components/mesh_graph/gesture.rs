//! Pointer-event disambiguation into semantic graph gestures.
//!
//! Raw taps, mouse moves, scroll zooms, and drag-box selections come in;
//! single taps, double taps, debounced hover in/out, label refreshes, and
//! viewport fits come out. All disambiguation timers are owned by the
//! dispatcher instance as explicit deadlines and fire from `poll`, which the
//! animation loop calls once per frame. Dropping the dispatcher cancels
//! everything; no timer can fire after teardown.

use super::model::ElementRef;

/// What a pointer event landed on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GestureTarget {
	/// Empty canvas.
	Background,
	Element(ElementRef),
}

/// A disambiguated gesture, ready for routing.
#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
	SingleTap(GestureTarget),
	DoubleTap(GestureTarget),
	HoverIn(ElementRef),
	HoverOut(ElementRef),
	/// A zoom-label threshold was crossed; labels need refreshing.
	LabelRefresh,
	/// The accumulated box selection changed; fit the viewport to it.
	FitToSelection(Vec<String>),
}

/// Timing constants for gesture disambiguation, host-provided.
#[derive(Clone, Copy, Debug)]
pub struct GestureTiming {
	pub double_tap_ms: f64,
	pub hover_in_ms: f64,
	pub hover_out_ms: f64,
}

/// Converts a raw pointer/scroll event stream into semantic gestures.
#[derive(Debug)]
pub struct GestureDispatcher {
	timing: GestureTiming,
	zoom_thresholds: Vec<f64>,
	/// Sub-graph embedded in another view: background taps are ignored so
	/// an accidental click cannot deselect the host's context.
	mini: bool,
	/// A single node is pinned as the graph's focal root, which also makes
	/// background deselection undesirable.
	pinned_root: bool,
	/// Host-reported current selection, for toggle-off on re-tap.
	selection: GestureTarget,
	tap_target: Option<GestureTarget>,
	tap_deadline: Option<f64>,
	hover_in: Option<(f64, ElementRef)>,
	hover_out: Option<(f64, ElementRef)>,
	zoom: f64,
	zoom_ignore: bool,
	box_selection: Vec<String>,
}

impl GestureDispatcher {
	pub fn new(
		timing: GestureTiming,
		zoom_thresholds: Vec<f64>,
		mini: bool,
		pinned_root: bool,
	) -> Self {
		Self {
			timing,
			zoom_thresholds,
			mini,
			pinned_root,
			selection: GestureTarget::Background,
			tap_target: None,
			tap_deadline: None,
			hover_in: None,
			hover_out: None,
			zoom: 1.0,
			// The renderer emits junk zoom values before the first layout
			// settles, so start ignoring them.
			zoom_ignore: true,
			box_selection: Vec::new(),
		}
	}

	/// The host reports selection changes here so re-tapping the selected
	/// element can toggle it off.
	pub fn set_selection(&mut self, selection: GestureTarget) {
		self.selection = selection;
	}

	/// A completed pointer-down-up. May resolve immediately into a double
	/// tap; otherwise a single-tap timer starts.
	pub fn on_tap(&mut self, target: GestureTarget, now_ms: f64) -> Option<Gesture> {
		if self.tap_deadline.take().is_some() {
			// A tap while another is pending cancels the pending single tap
			// and any in-flight hover timers.
			self.hover_in = None;
			self.hover_out = None;
			if self.tap_target.as_ref() == Some(&target) {
				self.tap_target = None;
				return Some(Gesture::DoubleTap(target));
			}
		}
		self.tap_target = Some(target);
		self.tap_deadline = Some(now_ms + self.timing.double_tap_ms);
		None
	}

	/// Pointer entered an element.
	pub fn on_mouse_over(&mut self, target: ElementRef, now_ms: f64) {
		self.hover_out = None;
		self.hover_in = Some((now_ms + self.timing.hover_in_ms, target));
	}

	/// Pointer left an element.
	pub fn on_mouse_out(&mut self, target: ElementRef, now_ms: f64) {
		self.hover_in = None;
		self.hover_out = Some((now_ms + self.timing.hover_out_ms, target));
	}

	/// The renderer's zoom level changed. Crossing any label threshold
	/// triggers a refresh, unless zoom events are currently ignored.
	pub fn on_zoom(&mut self, new_zoom: f64) -> Option<Gesture> {
		if self.zoom_ignore {
			return None;
		}
		let old_zoom = self.zoom;
		self.zoom = new_zoom;
		let crossed = self.zoom_thresholds.iter().any(|&threshold| {
			(new_zoom < threshold && old_zoom >= threshold)
				|| (new_zoom >= threshold && old_zoom < threshold)
		});
		crossed.then_some(Gesture::LabelRefresh)
	}

	/// Suppress or re-enable zoom handling. Set before a layout run or a
	/// drag-box selection, cleared after; the renderer emits transient zoom
	/// values in between that must not feed back into label refreshes.
	pub fn set_zoom_ignore(&mut self, ignore: bool, current_zoom: f64) {
		if !ignore {
			// Re-sync so the next real zoom event diffs against reality.
			self.zoom = current_zoom;
		}
		self.zoom_ignore = ignore;
	}

	/// A drag-box selection started; begin a fresh accumulation.
	pub fn on_box_start(&mut self) {
		self.box_selection.clear();
	}

	/// Incremental box-selection contents. Box-kind elements are filtered
	/// out, everything else accumulates, and the viewport re-fits.
	pub fn on_box_select<'a>(
		&mut self,
		elements: impl IntoIterator<Item = (&'a str, bool)>,
	) -> Option<Gesture> {
		for (id, is_box) in elements {
			if !is_box && !self.box_selection.iter().any(|existing| existing == id) {
				self.box_selection.push(id.to_owned());
			}
		}
		if self.box_selection.is_empty() {
			return None;
		}
		Some(Gesture::FitToSelection(self.box_selection.clone()))
	}

	/// Fire any timer whose deadline has passed. Called once per animation
	/// frame; gesture timers interleave arbitrarily with animation ticks.
	pub fn poll(&mut self, now_ms: f64) -> Vec<Gesture> {
		let mut gestures = Vec::new();

		if self.tap_deadline.is_some_and(|deadline| now_ms >= deadline) {
			self.tap_deadline = None;
			if let Some(target) = self.tap_target.take() {
				if let Some(gesture) = self.resolve_single_tap(target) {
					gestures.push(gesture);
				}
			}
		}

		if self
			.hover_in
			.as_ref()
			.is_some_and(|(deadline, _)| now_ms >= *deadline)
		{
			let (_, target) = self.hover_in.take().unwrap();
			gestures.push(Gesture::HoverIn(target));
		}

		if self
			.hover_out
			.as_ref()
			.is_some_and(|(deadline, _)| now_ms >= *deadline)
		{
			let (_, target) = self.hover_out.take().unwrap();
			gestures.push(Gesture::HoverOut(target));
		}

		gestures
	}

	fn resolve_single_tap(&self, target: GestureTarget) -> Option<Gesture> {
		if target == GestureTarget::Background && (self.mini || self.pinned_root) {
			return None;
		}
		// Tapping the current selection again deselects instead of
		// re-firing the selection.
		if target != GestureTarget::Background && target == self.selection {
			return Some(Gesture::SingleTap(GestureTarget::Background));
		}
		Some(Gesture::SingleTap(target))
	}
}
