use crate::core::model::{MAX_AGE, MIN_AGE};
use crate::core::windowing::AgeWindow;
use crate::error::{KlineError, KlineResult};

/// Candidate bounds before the commit step sees them. Bounds stay `f64`
/// so a half-age result is detected instead of silently rounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct WindowCandidate {
    pub start: f64,
    pub end: f64,
}

impl WindowCandidate {
    pub(super) fn full() -> Self {
        Self {
            start: f64::from(MIN_AGE),
            end: f64::from(MAX_AGE),
        }
    }
}

/// Window of `span` ages around the integer `center`:
/// `start = center - span / 2`, `end = start + span - 1`.
pub(super) fn resolve_centered_window(center: f64, span: i32) -> WindowCandidate {
    let start = center - f64::from(span) / 2.0;
    WindowCandidate {
        start,
        end: start + f64::from(span) - 1.0,
    }
}

/// Direction of a discrete or wheel zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    #[must_use]
    pub fn target_span(self, span: i32, step: i32) -> i32 {
        match self {
            Self::In => span - step,
            Self::Out => span + step,
        }
    }
}

/// Negative wheel delta zooms in, positive zooms out, zero does nothing.
pub(super) fn resolve_wheel_direction(wheel_delta_y: f64) -> KlineResult<Option<ZoomDirection>> {
    if !wheel_delta_y.is_finite() {
        return Err(KlineError::InvalidData(
            "wheel delta must be finite".to_owned(),
        ));
    }
    Ok(if wheel_delta_y < 0.0 {
        Some(ZoomDirection::In)
    } else if wheel_delta_y > 0.0 {
        Some(ZoomDirection::Out)
    } else {
        None
    })
}

/// Age under the cursor, rounded to a whole age.
pub(super) fn resolve_wheel_anchor_age(
    window: AgeWindow,
    cursor_offset_px: f64,
    plot_width_px: f64,
) -> KlineResult<f64> {
    if !plot_width_px.is_finite() || plot_width_px <= 0.0 {
        return Err(KlineError::InvalidData(
            "plot width must be finite and > 0".to_owned(),
        ));
    }
    if !cursor_offset_px.is_finite() {
        return Err(KlineError::InvalidData(
            "cursor offset must be finite".to_owned(),
        ));
    }

    let ratio = (cursor_offset_px / plot_width_px).clamp(0.0, 1.0);
    Ok(window.interpolate_age(ratio).round())
}

/// Pre-pinch span scaled by `initial / current` finger distance, rounded
/// and clamped to the allowed span range.
pub(super) fn resolve_pinch_span(
    initial_span: i32,
    initial_distance: f64,
    current_distance: f64,
    min_span: i32,
    max_span: i32,
) -> KlineResult<i32> {
    validate_pinch_distance(current_distance)?;
    let scaled = (f64::from(initial_span) * initial_distance / current_distance).round();
    let clamped = scaled.clamp(f64::from(min_span), f64::from(max_span));
    Ok(clamped as i32)
}

pub(super) fn validate_pinch_distance(distance: f64) -> KlineResult<f64> {
    if !distance.is_finite() || distance <= 0.0 {
        return Err(KlineError::InvalidData(
            "pinch distance must be finite and > 0".to_owned(),
        ));
    }
    Ok(distance)
}

/// Maps a brush-track pixel onto the full `1..=100` age axis.
pub(super) fn resolve_brush_age(pixel: f64, track_width_px: f64) -> KlineResult<f64> {
    if !track_width_px.is_finite() || track_width_px <= 0.0 {
        return Err(KlineError::InvalidData(
            "brush track width must be finite and > 0".to_owned(),
        ));
    }
    if !pixel.is_finite() {
        return Err(KlineError::InvalidData(
            "brush handle position must be finite".to_owned(),
        ));
    }
    let ratio = (pixel / track_width_px).clamp(0.0, 1.0);
    Ok(AgeWindow::FULL.interpolate_age(ratio))
}
