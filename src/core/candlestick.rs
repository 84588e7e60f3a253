use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;

use crate::core::model::{TimelinePoint, Trend};
use crate::core::scale::{AgeBands, LinearScale, ValueScale};
use crate::core::types::PixelBand;
use crate::error::{KlineError, KlineResult};

/// Narrowest body a candle is drawn with.
pub const MIN_BODY_WIDTH_PX: f64 = 3.0;
/// Shortest body a candle is drawn with, so flat years stay visible.
pub const MIN_BODY_HEIGHT_PX: f64 = 3.0;

/// Price quadruple plus optional explicit trend tag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandleInput {
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub trend: Option<Trend>,
}

impl CandleInput {
    #[must_use]
    pub fn new(open: f64, close: f64, high: f64, low: f64) -> Self {
        Self {
            open,
            close,
            high,
            low,
            trend: None,
        }
    }

    #[must_use]
    pub fn with_trend(mut self, trend: Trend) -> Self {
        self.trend = Some(trend);
        self
    }

    #[must_use]
    pub fn from_point(point: &TimelinePoint) -> Self {
        Self {
            open: point.open,
            close: point.close,
            high: point.high,
            low: point.low,
            trend: point.extras.trend,
        }
    }

    #[must_use]
    pub fn trend(self) -> Trend {
        self.trend
            .unwrap_or_else(|| Trend::from_prices(self.open, self.close))
    }

    fn validate(self) -> KlineResult<Self> {
        if !self.open.is_finite()
            || !self.close.is_finite()
            || !self.high.is_finite()
            || !self.low.is_finite()
        {
            return Err(KlineError::InvalidData(
                "candle prices must be finite".to_owned(),
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WickKind {
    Upper,
    Lower,
}

/// Vertical wick line at `x`, drawn from the extreme toward the body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WickSegment {
    pub kind: WickKind,
    pub x: f64,
    pub y_from: f64,
    pub y_to: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BodyRect {
    #[must_use]
    pub fn top(self) -> f64 {
        self.y
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.y + self.height
    }
}

/// Drawable candle in pixel coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleGeometry {
    pub center_x: f64,
    pub body: BodyRect,
    pub wicks: SmallVec<[WickSegment; 2]>,
    pub trend: Trend,
    /// Set when the supplied scale was absent or failed.
    pub used_fallback_scale: bool,
}

impl CandleGeometry {
    #[must_use]
    pub fn wick(&self, kind: WickKind) -> Option<WickSegment> {
        self.wicks.iter().copied().find(|wick| wick.kind == kind)
    }
}

/// Candle geometry tagged with the year it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedCandle {
    pub age: i32,
    pub year: i32,
    pub geometry: CandleGeometry,
}

/// Body width for a horizontal band: wider share for narrow bands, never
/// below [`MIN_BODY_WIDTH_PX`].
#[must_use]
pub fn body_width_for_band(band_width: f64) -> f64 {
    let fraction = if band_width < 8.0 {
        0.7
    } else if band_width < 16.0 {
        0.6
    } else {
        0.5
    };
    (band_width * fraction).max(MIN_BODY_WIDTH_PX)
}

/// Maps one price quadruple onto drawable body and wick geometry.
///
/// A missing or failing `scale` degrades to [`fallback_pixels`] instead of
/// erroring; only non-finite inputs or bands are rejected.
pub fn project_candle(
    input: CandleInput,
    x_band: PixelBand,
    y_band: PixelBand,
    scale: Option<&dyn ValueScale>,
) -> KlineResult<CandleGeometry> {
    let input = input.validate()?;
    let x_band = x_band.validate()?;
    let y_band = y_band.validate()?;

    let (pixels, used_fallback_scale) = match scale.and_then(|scale| scaled_pixels(scale, input)) {
        Some(pixels) => (pixels, false),
        None => (fallback_pixels(input, y_band), true),
    };
    let [open_y, close_y, high_y, low_y] = pixels;

    let center_x = x_band.center();
    let body_width = body_width_for_band(x_band.extent);

    let mut body_top = open_y.min(close_y);
    let mut body_bottom = open_y.max(close_y);
    if body_bottom - body_top < MIN_BODY_HEIGHT_PX {
        let mid = (body_top + body_bottom) / 2.0;
        body_top = mid - MIN_BODY_HEIGHT_PX / 2.0;
        body_bottom = mid + MIN_BODY_HEIGHT_PX / 2.0;
    }

    let mut wicks = SmallVec::new();
    if high_y < body_top {
        wicks.push(WickSegment {
            kind: WickKind::Upper,
            x: center_x,
            y_from: high_y,
            y_to: body_top,
        });
    }
    if low_y > body_bottom {
        wicks.push(WickSegment {
            kind: WickKind::Lower,
            x: center_x,
            y_from: low_y,
            y_to: body_bottom,
        });
    }

    Ok(CandleGeometry {
        center_x,
        body: BodyRect {
            x: center_x - body_width / 2.0,
            y: body_top,
            width: body_width,
            height: body_bottom - body_top,
        },
        wicks,
        trend: input.trend(),
        used_fallback_scale,
    })
}

/// Projects visible timeline points through the age layout and fortune scale.
pub fn project_candles(
    points: &[&TimelinePoint],
    bands: AgeBands,
    scale: LinearScale,
) -> KlineResult<Vec<ProjectedCandle>> {
    #[cfg(feature = "parallel-projection")]
    {
        points
            .par_iter()
            .map(|point| project_point(point, bands, scale))
            .collect()
    }

    #[cfg(not(feature = "parallel-projection"))]
    {
        points
            .iter()
            .map(|point| project_point(point, bands, scale))
            .collect()
    }
}

fn project_point(
    point: &TimelinePoint,
    bands: AgeBands,
    scale: LinearScale,
) -> KlineResult<ProjectedCandle> {
    let geometry = project_candle(
        CandleInput::from_point(point),
        bands.band_for_age(point.age),
        scale.band(),
        Some(&scale as &dyn ValueScale),
    )?;
    Ok(ProjectedCandle {
        age: point.age,
        year: point.year,
        geometry,
    })
}

fn scaled_pixels(scale: &dyn ValueScale, input: CandleInput) -> Option<[f64; 4]> {
    let mut pixels = [0.0; 4];
    for (slot, value) in pixels
        .iter_mut()
        .zip([input.open, input.close, input.high, input.low])
    {
        match scale.value_to_pixel(value) {
            Ok(px) if px.is_finite() => *slot = px,
            Ok(px) => {
                trace!(value, px, "scale produced non-finite pixel, using fallback");
                return None;
            }
            Err(err) => {
                trace!(value, error = %err, "scale failed, using fallback");
                return None;
            }
        }
    }
    Some(pixels)
}

/// Degraded mapping that stretches the candle's own open/close range over
/// the vertical band; a flat body collapses everything to the band center.
#[must_use]
pub fn fallback_pixels(input: CandleInput, y_band: PixelBand) -> [f64; 4] {
    let body_min = input.open.min(input.close);
    let body_max = input.open.max(input.close);
    let span = body_max - body_min;
    let map = |value: f64| {
        if span <= f64::EPSILON {
            y_band.center()
        } else {
            y_band.end() - (value - body_min) / span * y_band.extent
        }
    };
    [
        map(input.open),
        map(input.close),
        map(input.high),
        map(input.low),
    ]
}

#[cfg(test)]
mod tests {
    use super::{MIN_BODY_WIDTH_PX, body_width_for_band, fallback_pixels, CandleInput};
    use crate::core::types::PixelBand;

    #[test]
    fn narrow_bands_get_a_larger_body_share() {
        assert!((body_width_for_band(6.0) - 4.2).abs() <= 1e-9);
        assert!((body_width_for_band(10.0) - 6.0).abs() <= 1e-9);
        assert!((body_width_for_band(40.0) - 20.0).abs() <= 1e-9);
        assert_eq!(body_width_for_band(2.0), MIN_BODY_WIDTH_PX);
    }

    #[test]
    fn fallback_stretches_body_over_band() {
        let pixels = fallback_pixels(CandleInput::new(40.0, 60.0, 70.0, 30.0), PixelBand::new(0.0, 100.0));
        assert!((pixels[0] - 100.0).abs() <= 1e-9);
        assert!((pixels[1] - 0.0).abs() <= 1e-9);
        assert!(pixels[2] < 0.0);
        assert!(pixels[3] > 100.0);
    }

    #[test]
    fn fallback_collapses_flat_body_to_center() {
        let pixels = fallback_pixels(CandleInput::new(50.0, 50.0, 70.0, 30.0), PixelBand::new(10.0, 100.0));
        assert!(pixels.iter().all(|px| (px - 60.0).abs() <= 1e-9));
    }
}
