use crate::core::types::PixelBand;
use crate::core::windowing::AgeWindow;
use crate::error::{KlineError, KlineResult};

/// Lower bound of the fortune axis.
pub const FORTUNE_MIN: f64 = 0.0;
/// Upper bound of the fortune axis.
pub const FORTUNE_MAX: f64 = 100.0;

/// Value-to-pixel mapping for the vertical axis.
///
/// Candle projection treats any error (or non-finite pixel) as a signal to
/// fall back to a degraded mapping, so implementations may fail freely.
pub trait ValueScale {
    fn value_to_pixel(&self, value: f64) -> KlineResult<f64>;
}

impl<F> ValueScale for F
where
    F: Fn(f64) -> KlineResult<f64>,
{
    fn value_to_pixel(&self, value: f64) -> KlineResult<f64> {
        self(value)
    }
}

/// Linear mapping from a value domain onto a pixel band.
///
/// When `inverted`, `domain_start` maps to the band end (screen bottom),
/// which is how the fortune axis grows upward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    band: PixelBand,
    inverted: bool,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64, band: PixelBand) -> KlineResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(KlineError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }
        let band = band.validate()?;

        Ok(Self {
            domain_start,
            domain_end,
            band,
            inverted: false,
        })
    }

    /// Builds the fixed `0..=100` fortune axis growing upward inside `band`.
    pub fn fortune(band: PixelBand) -> KlineResult<Self> {
        Ok(Self::new(FORTUNE_MIN, FORTUNE_MAX, band)?.inverted())
    }

    #[must_use]
    pub fn inverted(mut self) -> Self {
        self.inverted = !self.inverted;
        self
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn band(self) -> PixelBand {
        self.band
    }

    pub fn domain_to_pixel(self, value: f64) -> KlineResult<f64> {
        if !value.is_finite() {
            return Err(KlineError::InvalidData("value must be finite".to_owned()));
        }

        let normalized = (value - self.domain_start) / (self.domain_end - self.domain_start);
        let offset = if self.inverted {
            1.0 - normalized
        } else {
            normalized
        };
        Ok(self.band.start + offset * self.band.extent)
    }

    pub fn pixel_to_domain(self, pixel: f64) -> KlineResult<f64> {
        if !pixel.is_finite() {
            return Err(KlineError::InvalidData("pixel must be finite".to_owned()));
        }

        let offset = (pixel - self.band.start) / self.band.extent;
        let normalized = if self.inverted { 1.0 - offset } else { offset };
        Ok(self.domain_start + normalized * (self.domain_end - self.domain_start))
    }
}

impl ValueScale for LinearScale {
    fn value_to_pixel(&self, value: f64) -> KlineResult<f64> {
        self.domain_to_pixel(value)
    }
}

/// Horizontal layout giving every visible age an equal-width band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeBands {
    window: AgeWindow,
    plot: PixelBand,
}

impl AgeBands {
    pub fn new(window: AgeWindow, plot: PixelBand) -> KlineResult<Self> {
        Ok(Self {
            window,
            plot: plot.validate()?,
        })
    }

    #[must_use]
    pub fn window(self) -> AgeWindow {
        self.window
    }

    #[must_use]
    pub fn band_width(self) -> f64 {
        self.plot.extent / f64::from(self.window.span())
    }

    #[must_use]
    pub fn band_for_age(self, age: i32) -> PixelBand {
        let width = self.band_width();
        PixelBand::new(
            self.plot.start + f64::from(age - self.window.start()) * width,
            width,
        )
    }

    #[must_use]
    pub fn center_x(self, age: i32) -> f64 {
        self.band_for_age(age).center()
    }
}
