use serde::{Deserialize, Serialize};

use crate::core::model::Trend;
use crate::core::{PlotRect, Viewport};
use crate::error::{KlineError, KlineResult};
use crate::interaction::DEFAULT_ZOOM_STEP;
use crate::render::Color;

/// Body and wick colors for one candle direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandlePalette {
    pub body: Color,
    pub wick: Color,
}

/// Candle colors and stroke widths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleStyle {
    pub up: CandlePalette,
    pub down: CandlePalette,
    pub wick_width_px: f64,
}

impl Default for CandleStyle {
    fn default() -> Self {
        Self {
            up: CandlePalette {
                body: Color::from_rgb8(0x22, 0xc5, 0x5e),
                wick: Color::from_rgb8(0x16, 0xa3, 0x4a),
            },
            down: CandlePalette {
                body: Color::from_rgb8(0xef, 0x44, 0x44),
                wick: Color::from_rgb8(0xdc, 0x26, 0x26),
            },
            wick_width_px: 1.0,
        }
    }
}

impl CandleStyle {
    #[must_use]
    pub fn palette(self, trend: Trend) -> CandlePalette {
        match trend {
            Trend::Bullish => self.up,
            Trend::Bearish => self.down,
        }
    }
}

/// Space reserved around the plot for axis labels, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlotMargins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for PlotMargins {
    fn default() -> Self {
        Self {
            left: 48.0,
            right: 16.0,
            top: 16.0,
            bottom: 32.0,
        }
    }
}

/// Host-facing chart setup, serializable so hosts can persist it as is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeChartConfig {
    pub viewport: Viewport,
    #[serde(default)]
    pub margins: PlotMargins,
    #[serde(default = "default_zoom_step")]
    pub zoom_step: i32,
    #[serde(default = "default_true")]
    pub show_key_years: bool,
    #[serde(default = "default_true")]
    pub show_moving_averages: bool,
    #[serde(default = "default_true")]
    pub show_period_boundaries: bool,
    #[serde(default)]
    pub candle_style: CandleStyle,
    #[serde(default = "default_axis_color")]
    pub axis_color: Color,
    #[serde(default = "default_label_color")]
    pub label_color: Color,
    #[serde(default = "default_font_size_px")]
    pub font_size_px: f64,
}

fn default_zoom_step() -> i32 {
    DEFAULT_ZOOM_STEP
}

fn default_true() -> bool {
    true
}

fn default_axis_color() -> Color {
    Color::from_rgb8(0xe5, 0xe7, 0xeb)
}

fn default_label_color() -> Color {
    Color::from_rgb8(0x6b, 0x72, 0x80)
}

fn default_font_size_px() -> f64 {
    11.0
}

impl LifeChartConfig {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            margins: PlotMargins::default(),
            zoom_step: default_zoom_step(),
            show_key_years: true,
            show_moving_averages: true,
            show_period_boundaries: true,
            candle_style: CandleStyle::default(),
            axis_color: default_axis_color(),
            label_color: default_label_color(),
            font_size_px: default_font_size_px(),
        }
    }

    #[must_use]
    pub fn with_margins(mut self, margins: PlotMargins) -> Self {
        self.margins = margins;
        self
    }

    #[must_use]
    pub fn with_zoom_step(mut self, zoom_step: i32) -> Self {
        self.zoom_step = zoom_step;
        self
    }

    #[must_use]
    pub fn with_key_years(mut self, show: bool) -> Self {
        self.show_key_years = show;
        self
    }

    #[must_use]
    pub fn with_moving_averages(mut self, show: bool) -> Self {
        self.show_moving_averages = show;
        self
    }

    #[must_use]
    pub fn with_period_boundaries(mut self, show: bool) -> Self {
        self.show_period_boundaries = show;
        self
    }

    #[must_use]
    pub fn with_candle_style(mut self, style: CandleStyle) -> Self {
        self.candle_style = style;
        self
    }

    /// Plot area left after margins.
    pub fn plot_rect(&self) -> KlineResult<PlotRect> {
        let width = f64::from(self.viewport.width) - self.margins.left - self.margins.right;
        let height = f64::from(self.viewport.height) - self.margins.top - self.margins.bottom;
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(KlineError::InvalidData(
                "margins must leave a plot area with width and height > 0".to_owned(),
            ));
        }
        Ok(PlotRect {
            left: self.margins.left,
            top: self.margins.top,
            width,
            height,
        })
    }

    pub fn validate(&self) -> KlineResult<()> {
        if !self.viewport.is_valid() {
            return Err(KlineError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        for (name, value) in [
            ("left", self.margins.left),
            ("right", self.margins.right),
            ("top", self.margins.top),
            ("bottom", self.margins.bottom),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(KlineError::InvalidData(format!(
                    "plot margin `{name}` must be finite and >= 0"
                )));
            }
        }
        self.plot_rect()?;
        if self.zoom_step <= 0 {
            return Err(KlineError::InvalidData(
                "zoom step must be > 0".to_owned(),
            ));
        }
        if !self.candle_style.wick_width_px.is_finite() || self.candle_style.wick_width_px <= 0.0
        {
            return Err(KlineError::InvalidData(
                "candle wick width must be finite and > 0".to_owned(),
            ));
        }
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(KlineError::InvalidData(
                "font size must be finite and > 0".to_owned(),
            ));
        }
        for color in [
            self.candle_style.up.body,
            self.candle_style.up.wick,
            self.candle_style.down.body,
            self.candle_style.down.wick,
            self.axis_color,
            self.label_color,
        ] {
            color.validate()?;
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> KlineResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| KlineError::InvalidData(format!("failed to serialize chart config: {e}")))
    }

    pub fn from_json_str(input: &str) -> KlineResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| KlineError::InvalidData(format!("failed to parse chart config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{LifeChartConfig, PlotMargins};
    use crate::core::Viewport;

    #[test]
    fn defaults_validate_and_leave_a_plot_area() {
        let config = LifeChartConfig::new(Viewport::new(800, 400));
        config.validate().expect("valid");
        let plot = config.plot_rect().expect("plot");
        assert_eq!((plot.left, plot.width, plot.height), (48.0, 736.0, 352.0));
    }

    #[test]
    fn oversized_margins_are_rejected() {
        let config = LifeChartConfig::new(Viewport::new(60, 400)).with_margins(PlotMargins {
            left: 40.0,
            right: 40.0,
            top: 0.0,
            bottom: 0.0,
        });
        let err = config.validate().expect_err("no plot area");
        assert!(format!("{err}").contains("plot area"));
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let config =
            LifeChartConfig::from_json_str(r#"{"viewport":{"width":640,"height":320}}"#)
                .expect("config");
        assert_eq!(config, LifeChartConfig::new(Viewport::new(640, 320)));
    }
}
