use serde::{Deserialize, Serialize};

use crate::error::{KlineError, KlineResult};

/// Surface size in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// One-dimensional pixel interval `[start, start + extent]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelBand {
    pub start: f64,
    pub extent: f64,
}

impl PixelBand {
    #[must_use]
    pub const fn new(start: f64, extent: f64) -> Self {
        Self { start, extent }
    }

    #[must_use]
    pub fn end(self) -> f64 {
        self.start + self.extent
    }

    #[must_use]
    pub fn center(self) -> f64 {
        self.start + self.extent / 2.0
    }

    pub fn validate(self) -> KlineResult<Self> {
        if !self.start.is_finite() || !self.extent.is_finite() || self.extent <= 0.0 {
            return Err(KlineError::InvalidData(
                "pixel band must be finite with extent > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Plot area inside the viewport, after margins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PlotRect {
    #[must_use]
    pub fn horizontal(self) -> PixelBand {
        PixelBand::new(self.left, self.width)
    }

    #[must_use]
    pub fn vertical(self) -> PixelBand {
        PixelBand::new(self.top, self.height)
    }

    #[must_use]
    pub fn right(self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(self) -> f64 {
        self.top + self.height
    }
}
