//! Viewport state and the input handlers that move it.
//!
//! Every handler funnels its candidate window through one commit step,
//! so the visible range is always integer-bounded, inside `1..=100` and at
//! least [`MIN_VISIBLE_SPAN`] ages wide.

mod zoom;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::model::{MAX_AGE, MIN_AGE};
use crate::core::windowing::{AgeWindow, MIN_VISIBLE_SPAN};
use crate::error::{KlineError, KlineResult};

pub use zoom::ZoomDirection;

use zoom::{
    WindowCandidate, resolve_brush_age, resolve_centered_window, resolve_pinch_span,
    resolve_wheel_anchor_age, resolve_wheel_direction, validate_pinch_distance,
};

/// Ages added or removed by one zoom step unless configured otherwise.
pub const DEFAULT_ZOOM_STEP: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// The step would land on a half age.
    FractionalBounds,
    /// The step would show fewer than the minimum number of ages.
    SpanTooNarrow,
    /// Start would not be before end.
    InvertedRange,
    /// A bound would fall outside the lifetime ages.
    OutOfRange,
}

/// Result of one viewport transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewportChange {
    Applied(AgeWindow),
    Unchanged,
    Rejected(RejectReason),
}

impl ViewportChange {
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Keyboard shortcuts understood by the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyCommand {
    ZoomIn,
    ZoomOut,
    Reset,
    ToggleFullscreen,
}

impl KeyCommand {
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "+" | "=" => Some(Self::ZoomIn),
            "-" => Some(Self::ZoomOut),
            "0" => Some(Self::Reset),
            "f" | "F" => Some(Self::ToggleFullscreen),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyResponse {
    /// Key unbound, or focus is in a text input.
    Ignored,
    Viewport(ViewportChange),
    Fullscreen(bool),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PinchGesture {
    initial_distance: f64,
    initial_span: i32,
    center: f64,
}

/// Owns the visible age window and the gesture state around it.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    window: AgeWindow,
    zoom_step: i32,
    fullscreen: bool,
    pinch: Option<PinchGesture>,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self {
            window: AgeWindow::FULL,
            zoom_step: DEFAULT_ZOOM_STEP,
            fullscreen: false,
            pinch: None,
        }
    }
}

impl ViewportController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_zoom_step(mut self, zoom_step: i32) -> KlineResult<Self> {
        if zoom_step <= 0 {
            return Err(KlineError::InvalidData(
                "zoom step must be > 0".to_owned(),
            ));
        }
        self.zoom_step = zoom_step;
        Ok(self)
    }

    #[must_use]
    pub fn window(&self) -> AgeWindow {
        self.window
    }

    #[must_use]
    pub fn zoom_step(&self) -> i32 {
        self.zoom_step
    }

    #[must_use]
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    #[must_use]
    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    /// Restores the full range and drops any gesture in flight.
    pub fn reset(&mut self) -> ViewportChange {
        self.pinch = None;
        self.commit(WindowCandidate::full())
    }

    pub fn zoom_in(&mut self) -> ViewportChange {
        self.zoom_discrete(ZoomDirection::In)
    }

    pub fn zoom_out(&mut self) -> ViewportChange {
        self.zoom_discrete(ZoomDirection::Out)
    }

    /// Span +/- one step around the current center, rounded to a whole age.
    pub fn zoom_discrete(&mut self, direction: ZoomDirection) -> ViewportChange {
        let center = self.window.center().round();
        self.zoom_around(center, direction)
    }

    /// Zooms one step toward the age under the cursor.
    pub fn wheel_zoom(
        &mut self,
        wheel_delta_y: f64,
        cursor_offset_px: f64,
        plot_width_px: f64,
    ) -> KlineResult<ViewportChange> {
        let anchor = resolve_wheel_anchor_age(self.window, cursor_offset_px, plot_width_px)?;
        let Some(direction) = resolve_wheel_direction(wheel_delta_y)? else {
            return Ok(ViewportChange::Unchanged);
        };
        trace!(wheel_delta_y, anchor, ?direction, "wheel zoom");
        Ok(self.zoom_around(anchor, direction))
    }

    /// Sets both bounds from an explicit edit. Bounds are truncated
    /// (`NaN` falls back to the full-range edge) and clamped, but the span
    /// is not adjusted: an inverted or too-narrow edit is rejected.
    pub fn set_range(&mut self, start: f64, end: f64) -> ViewportChange {
        let start = explicit_bound(start, MIN_AGE);
        let end = explicit_bound(end, MAX_AGE);
        self.commit(WindowCandidate { start, end })
    }

    pub fn set_start(&mut self, start: f64) -> ViewportChange {
        self.set_range(start, f64::from(self.window.end()))
    }

    pub fn set_end(&mut self, end: f64) -> ViewportChange {
        self.set_range(f64::from(self.window.start()), end)
    }

    pub fn begin_pinch(&mut self, distance: f64) -> KlineResult<()> {
        let initial_distance = validate_pinch_distance(distance)?;
        self.pinch = Some(PinchGesture {
            initial_distance,
            initial_span: self.window.span(),
            center: self.window.center().round(),
        });
        Ok(())
    }

    /// Rescales the pre-pinch span by finger distance; no-op without an
    /// active gesture.
    pub fn update_pinch(&mut self, distance: f64) -> KlineResult<ViewportChange> {
        let Some(gesture) = self.pinch else {
            return Ok(ViewportChange::Unchanged);
        };
        let span = resolve_pinch_span(
            gesture.initial_span,
            gesture.initial_distance,
            distance,
            MIN_VISIBLE_SPAN,
            AgeWindow::FULL.span(),
        )?;
        let start = gesture.center - f64::from(span / 2);
        Ok(self.commit(translate_into_range(WindowCandidate {
            start,
            end: start + f64::from(span) - 1.0,
        })))
    }

    pub fn end_pinch(&mut self) {
        self.pinch = None;
    }

    /// Applies brush handles given as ages: start floored, end ceiled.
    pub fn brush_to_ages(&mut self, start_age: f64, end_age: f64) -> KlineResult<ViewportChange> {
        if !start_age.is_finite() || !end_age.is_finite() {
            return Err(KlineError::InvalidData(
                "brush ages must be finite".to_owned(),
            ));
        }
        let (low, high) = if start_age <= end_age {
            (start_age, end_age)
        } else {
            (end_age, start_age)
        };
        let (min, max) = (f64::from(MIN_AGE), f64::from(MAX_AGE));
        Ok(self.commit(WindowCandidate {
            start: low.floor().clamp(min, max),
            end: high.ceil().clamp(min, max),
        }))
    }

    /// Applies brush handles given as pixels on a track spanning every age.
    pub fn brush_to_pixels(
        &mut self,
        start_px: f64,
        end_px: f64,
        track_width_px: f64,
    ) -> KlineResult<ViewportChange> {
        let start_age = resolve_brush_age(start_px, track_width_px)?;
        let end_age = resolve_brush_age(end_px, track_width_px)?;
        self.brush_to_ages(start_age, end_age)
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.fullscreen = !self.fullscreen;
        debug!(fullscreen = self.fullscreen, "toggled fullscreen");
        self.fullscreen
    }

    /// Dispatches a key press; everything is ignored while a text input
    /// has focus so typing into the range fields does not zoom.
    pub fn handle_key(&mut self, key: &str, text_input_focused: bool) -> KeyResponse {
        if text_input_focused {
            return KeyResponse::Ignored;
        }
        match KeyCommand::from_key(key) {
            Some(KeyCommand::ZoomIn) => KeyResponse::Viewport(self.zoom_in()),
            Some(KeyCommand::ZoomOut) => KeyResponse::Viewport(self.zoom_out()),
            Some(KeyCommand::Reset) => KeyResponse::Viewport(self.reset()),
            Some(KeyCommand::ToggleFullscreen) => KeyResponse::Fullscreen(self.toggle_fullscreen()),
            None => KeyResponse::Ignored,
        }
    }

    fn zoom_around(&mut self, center: f64, direction: ZoomDirection) -> ViewportChange {
        let span = direction.target_span(self.window.span(), self.zoom_step);
        if span < MIN_VISIBLE_SPAN {
            return self.reject(RejectReason::SpanTooNarrow);
        }
        if span >= AgeWindow::FULL.span() {
            return self.commit(WindowCandidate::full());
        }
        let candidate = resolve_centered_window(center, span);
        if candidate.start.fract() != 0.0 {
            return self.reject(RejectReason::FractionalBounds);
        }
        self.commit(translate_into_range(candidate))
    }

    /// The only place the window changes.
    fn commit(&mut self, candidate: WindowCandidate) -> ViewportChange {
        if candidate.start.fract() != 0.0 || candidate.end.fract() != 0.0 {
            return self.reject(RejectReason::FractionalBounds);
        }
        if candidate.start >= candidate.end {
            return self.reject(RejectReason::InvertedRange);
        }
        if candidate.end - candidate.start + 1.0 < f64::from(MIN_VISIBLE_SPAN) {
            return self.reject(RejectReason::SpanTooNarrow);
        }

        if candidate.start < f64::from(MIN_AGE) || candidate.end > f64::from(MAX_AGE) {
            return self.reject(RejectReason::OutOfRange);
        }

        // Whole and inside [MIN_AGE, MAX_AGE], so both casts are exact.
        let Ok(window) = AgeWindow::new(candidate.start as i32, candidate.end as i32) else {
            return self.reject(RejectReason::OutOfRange);
        };
        if window == self.window {
            return ViewportChange::Unchanged;
        }

        debug!(
            from_start = self.window.start(),
            from_end = self.window.end(),
            start = window.start(),
            end = window.end(),
            "viewport window applied"
        );
        self.window = window;
        ViewportChange::Applied(window)
    }

    fn reject(&self, reason: RejectReason) -> ViewportChange {
        trace!(
            start = self.window.start(),
            end = self.window.end(),
            ?reason,
            "viewport transition rejected"
        );
        ViewportChange::Rejected(reason)
    }
}

fn explicit_bound(value: f64, fallback: i32) -> f64 {
    let truncated = if value.is_nan() {
        f64::from(fallback)
    } else {
        value.trunc()
    };
    truncated.clamp(f64::from(MIN_AGE), f64::from(MAX_AGE))
}

/// Shifts (never rescales) a candidate so it lies inside `1..=100`.
fn translate_into_range(candidate: WindowCandidate) -> WindowCandidate {
    let min = f64::from(MIN_AGE);
    let max = f64::from(MAX_AGE);
    let shift = if candidate.start < min {
        min - candidate.start
    } else if candidate.end > max {
        max - candidate.end
    } else {
        0.0
    };
    WindowCandidate {
        start: candidate.start + shift,
        end: candidate.end + shift,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        KeyCommand, KeyResponse, RejectReason, ViewportChange, ViewportController,
        WindowCandidate,
    };
    use crate::core::windowing::AgeWindow;

    fn window(start: i32, end: i32) -> AgeWindow {
        AgeWindow::new(start, end).expect("window")
    }

    #[test]
    fn zoom_in_narrows_around_rounded_center() {
        let mut controller = ViewportController::new();
        assert_eq!(controller.zoom_in(), ViewportChange::Applied(window(6, 95)));
        assert_eq!(controller.zoom_in(), ViewportChange::Applied(window(11, 90)));
    }

    #[test]
    fn zoom_out_past_full_range_collapses_to_full() {
        let mut controller = ViewportController::new();
        assert_eq!(controller.zoom_out(), ViewportChange::Unchanged);
        controller.zoom_in();
        assert_eq!(controller.zoom_out(), ViewportChange::Applied(AgeWindow::FULL));
    }

    #[test]
    fn odd_span_zoom_is_rejected_as_fractional() {
        let mut controller = ViewportController::new();
        assert!(controller.set_range(1.0, 15.0).is_applied());
        assert_eq!(
            controller.zoom_out(),
            ViewportChange::Rejected(RejectReason::FractionalBounds)
        );
        assert_eq!(controller.window(), window(1, 15));
    }

    #[test]
    fn explicit_edits_truncate_clamp_and_reject_inverted() {
        let mut controller = ViewportController::new();
        assert_eq!(
            controller.set_range(-4.0, 30.9),
            ViewportChange::Applied(window(1, 30))
        );
        assert_eq!(
            controller.set_range(f64::NAN, f64::NAN),
            ViewportChange::Applied(AgeWindow::FULL)
        );
        assert_eq!(
            controller.set_range(60.0, 40.0),
            ViewportChange::Rejected(RejectReason::InvertedRange)
        );
        assert_eq!(
            controller.set_start(95.0),
            ViewportChange::Rejected(RejectReason::SpanTooNarrow)
        );
        assert_eq!(controller.window(), AgeWindow::FULL);
    }

    #[test]
    fn commit_rejects_bounds_outside_lifetime() {
        let mut controller = ViewportController::new();
        controller.zoom_in();
        let before = controller.window();
        for (start, end) in [(-5.0, 20.0), (90.0, 120.0), (-1e12, 50.0)] {
            assert_eq!(
                controller.commit(WindowCandidate { start, end }),
                ViewportChange::Rejected(RejectReason::OutOfRange)
            );
        }
        assert_eq!(controller.window(), before);
    }

    #[test]
    fn translation_keeps_span_near_edges() {
        let mut controller = ViewportController::new();
        controller.set_range(1.0, 20.0);
        assert_eq!(controller.zoom_out(), ViewportChange::Applied(window(1, 30)));
    }

    #[test]
    fn pinch_without_begin_is_a_no_op() {
        let mut controller = ViewportController::new();
        assert_eq!(
            controller.update_pinch(50.0).expect("pinch"),
            ViewportChange::Unchanged
        );
    }

    #[test]
    fn keyboard_respects_text_focus() {
        let mut controller = ViewportController::new();
        assert_eq!(controller.handle_key("+", true), KeyResponse::Ignored);
        assert_eq!(controller.window(), AgeWindow::FULL);
        assert!(matches!(
            controller.handle_key("=", false),
            KeyResponse::Viewport(ViewportChange::Applied(_))
        ));
        assert_eq!(controller.handle_key("F", false), KeyResponse::Fullscreen(true));
        assert_eq!(controller.handle_key("f", false), KeyResponse::Fullscreen(false));
        assert_eq!(KeyCommand::from_key("x"), None);
    }
}
