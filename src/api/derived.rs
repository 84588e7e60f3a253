//! Views recomputed from the timeline and the current window on every
//! request. Nothing here is cached, so a viewport change can never leave a
//! stale key-year or boundary marker behind.

use std::collections::HashSet;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::model::TimelinePoint;
use crate::core::windowing::AgeWindow;

/// Upper bound on each of the high and low key-year lists.
pub const KEY_YEARS_PER_SIDE: usize = 5;
pub const SHORT_MOVING_AVERAGE: usize = 5;
pub const LONG_MOVING_AVERAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeyYearKind {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyYear {
    pub age: i32,
    pub year: i32,
    pub score: f64,
    pub kind: KeyYearKind,
}

/// Highest and lowest scoring years of a range; the two lists never share an age.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyYears {
    pub top: Vec<KeyYear>,
    pub bottom: Vec<KeyYear>,
}

impl KeyYears {
    pub fn iter(&self) -> impl Iterator<Item = &KeyYear> {
        self.top.iter().chain(self.bottom.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.top.len() + self.bottom.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// First year of a new epoch inside a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodBoundary {
    pub age: i32,
    pub year: i32,
    pub period: String,
}

/// Moving averages of `score` sampled at one visible age.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSample {
    pub age: i32,
    pub short: Option<f64>,
    pub long: Option<f64>,
}

/// Top and bottom years by score.
///
/// Ties are broken by ascending age. With fewer than ten scored points the
/// top list takes the larger half and the bottom list the rest, so no age
/// appears twice. Points with a non-finite score are skipped.
#[must_use]
pub fn key_years(points: &[&TimelinePoint]) -> KeyYears {
    let mut ranked: Vec<&TimelinePoint> = points
        .iter()
        .copied()
        .filter(|point| point.score.is_finite())
        .collect();
    ranked.sort_by_key(|point| (std::cmp::Reverse(OrderedFloat(point.score)), point.age));
    let mut seen = HashSet::with_capacity(ranked.len());
    ranked.retain(|point| seen.insert(point.age));

    let count = ranked.len();
    let top_count = KEY_YEARS_PER_SIDE.min(count.div_ceil(2));
    let bottom_count = KEY_YEARS_PER_SIDE.min(count - top_count);

    let top = ranked[..top_count]
        .iter()
        .map(|point| key_year(point, KeyYearKind::High))
        .collect();

    let mut rest = ranked[top_count..].to_vec();
    rest.sort_by_key(|point| (OrderedFloat(point.score), point.age));
    let bottom = rest
        .iter()
        .take(bottom_count)
        .map(|point| key_year(point, KeyYearKind::Low))
        .collect();

    KeyYears { top, bottom }
}

fn key_year(point: &TimelinePoint, kind: KeyYearKind) -> KeyYear {
    KeyYear {
        age: point.age,
        year: point.year,
        score: point.score,
        kind,
    }
}

/// First point of each maximal run of equal `period` labels.
#[must_use]
pub fn period_boundaries(points: &[&TimelinePoint]) -> Vec<PeriodBoundary> {
    let mut previous: Option<&str> = None;
    let mut boundaries = Vec::new();
    for point in points {
        if previous != Some(point.period.as_str()) {
            boundaries.push(PeriodBoundary {
                age: point.age,
                year: point.year,
                period: point.period.clone(),
            });
        }
        previous = Some(point.period.as_str());
    }
    boundaries
}

/// Trailing mean of `score` over `window` points; `None` until enough points
/// exist or while the window holds a non-finite score.
#[must_use]
pub fn moving_average(timeline: &[TimelinePoint], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; timeline.len()];
    }
    (0..timeline.len())
        .map(|index| {
            let start = (index + 1).checked_sub(window)?;
            let slice = &timeline[start..=index];
            let sum: f64 = slice.iter().map(|point| point.score).sum();
            sum.is_finite().then(|| sum / window as f64)
        })
        .collect()
}

/// MA5/MA10 computed over the full timeline, sampled at visible ages.
#[must_use]
pub fn trend_samples(timeline: &[TimelinePoint], window: AgeWindow) -> Vec<TrendSample> {
    let short = moving_average(timeline, SHORT_MOVING_AVERAGE);
    let long = moving_average(timeline, LONG_MOVING_AVERAGE);
    timeline
        .iter()
        .zip(short.into_iter().zip(long))
        .filter(|(point, _)| window.contains(point.age))
        .map(|(point, (short, long))| TrendSample {
            age: point.age,
            short,
            long,
        })
        .collect()
}
