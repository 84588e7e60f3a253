use serde::{Deserialize, Serialize};

use crate::core::model::{MAX_AGE, MIN_AGE, TimelinePoint};
use crate::error::{KlineError, KlineResult};

/// Smallest number of ages a window may show.
pub const MIN_VISIBLE_SPAN: i32 = 10;

/// Visible age range, inclusive on both ends.
///
/// Invariants: `MIN_AGE <= start < end <= MAX_AGE` and
/// `end - start + 1 >= MIN_VISIBLE_SPAN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAgeWindow")]
pub struct AgeWindow {
    start: i32,
    end: i32,
}

#[derive(Deserialize)]
struct RawAgeWindow {
    start: i32,
    end: i32,
}

impl TryFrom<RawAgeWindow> for AgeWindow {
    type Error = KlineError;

    fn try_from(raw: RawAgeWindow) -> KlineResult<Self> {
        Self::new(raw.start, raw.end)
    }
}

impl Default for AgeWindow {
    fn default() -> Self {
        Self::FULL
    }
}

impl AgeWindow {
    pub const FULL: Self = Self {
        start: MIN_AGE,
        end: MAX_AGE,
    };

    pub fn new(start: i32, end: i32) -> KlineResult<Self> {
        if start < MIN_AGE || end > MAX_AGE {
            return Err(KlineError::InvalidData(format!(
                "age window [{start}, {end}] must lie inside [{MIN_AGE}, {MAX_AGE}]"
            )));
        }
        if start >= end {
            return Err(KlineError::InvalidData(format!(
                "age window start {start} must be < end {end}"
            )));
        }
        if end - start + 1 < MIN_VISIBLE_SPAN {
            return Err(KlineError::InvalidData(format!(
                "age window [{start}, {end}] must span at least {MIN_VISIBLE_SPAN} ages"
            )));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(self) -> i32 {
        self.start
    }

    #[must_use]
    pub fn end(self) -> i32 {
        self.end
    }

    /// Number of ages shown (`end - start + 1`).
    #[must_use]
    pub fn span(self) -> i32 {
        self.end - self.start + 1
    }

    #[must_use]
    pub fn center(self) -> f64 {
        f64::from(self.start + self.end) / 2.0
    }

    #[must_use]
    pub fn contains(self, age: i32) -> bool {
        (self.start..=self.end).contains(&age)
    }

    #[must_use]
    pub fn is_full(self) -> bool {
        self == Self::FULL
    }

    /// Linear interpolation of a `0..=1` ratio onto the window's ages.
    #[must_use]
    pub fn interpolate_age(self, ratio: f64) -> f64 {
        f64::from(self.start) + ratio * f64::from(self.end - self.start)
    }
}

/// Returns points whose age falls inside the window, in timeline order.
#[must_use]
pub fn points_in_age_window(points: &[TimelinePoint], window: AgeWindow) -> Vec<&TimelinePoint> {
    points
        .iter()
        .filter(|point| window.contains(point.age))
        .collect()
}
