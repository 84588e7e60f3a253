//! Whole-timeline statistics for the summary panel.
//!
//! Flat years (`open == close`) carry no movement and are left out of every
//! figure except `total_years`.

use indexmap::IndexMap;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::core::model::{PRE_EPOCH_PERIOD, TimelinePoint, Trend};

/// Score delta between consecutive non-flat years that counts as a turn.
pub const TURNING_POINT_DELTA: f64 = 20.0;
pub const MAX_TURNING_POINTS: usize = 10;

/// Life stages as `(label, first_age, last_age)`.
pub const AGE_SEGMENTS: [(&str, i32, i32); 8] = [
    ("童年", 1, 12),
    ("青少年", 13, 24),
    ("青年", 25, 36),
    ("中年", 37, 48),
    ("中老年", 49, 60),
    ("老年", 61, 72),
    ("高龄", 73, 84),
    ("高寿", 85, 100),
];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearMark {
    pub age: i32,
    pub year: i32,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub count: usize,
    pub average_score: f64,
    pub ages: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentStats {
    pub label: String,
    pub first_age: i32,
    pub last_age: i32,
    pub count: usize,
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurningPoint {
    pub age: i32,
    pub year: i32,
    pub stem_branch: String,
    pub change: f64,
    pub from_score: f64,
    pub to_score: f64,
    pub direction: Trend,
}

/// Year counts per score band: `>= 80`, `60..80`, `40..60`, `< 40`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreDistribution {
    pub excellent: usize,
    pub good: usize,
    pub average: usize,
    pub poor: usize,
}

impl ScoreDistribution {
    fn record(&mut self, score: f64) {
        if score >= 80.0 {
            self.excellent += 1;
        } else if score >= 60.0 {
            self.good += 1;
        } else if score >= 40.0 {
            self.average += 1;
        } else {
            self.poor += 1;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineStatistics {
    /// Mean score of non-flat years, rounded to two decimals.
    pub average_score: f64,
    pub best_year: Option<YearMark>,
    pub worst_year: Option<YearMark>,
    /// Keyed by period label, in first-seen order.
    pub periods: IndexMap<String, PeriodStats>,
    pub segments: Vec<SegmentStats>,
    pub turning_points: Vec<TurningPoint>,
    pub distribution: ScoreDistribution,
    pub up_trends: usize,
    pub down_trends: usize,
    pub total_years: usize,
    pub valid_years: usize,
}

/// Computes the summary panel figures; `None` for an empty timeline.
#[must_use]
pub fn timeline_statistics(timeline: &[TimelinePoint]) -> Option<TimelineStatistics> {
    if timeline.is_empty() {
        return None;
    }
    let moving: Vec<&TimelinePoint> = timeline
        .iter()
        .filter(|point| !point.is_flat() && point.score.is_finite())
        .collect();

    let mut periods: IndexMap<String, PeriodStats> = IndexMap::new();
    let mut distribution = ScoreDistribution::default();
    for point in &moving {
        let label = if point.period.trim().is_empty() {
            PRE_EPOCH_PERIOD
        } else {
            point.period.as_str()
        };
        let stats = periods.entry(label.to_owned()).or_insert_with(|| PeriodStats {
            count: 0,
            average_score: 0.0,
            ages: Vec::new(),
        });
        stats.count += 1;
        stats.average_score += point.score;
        stats.ages.push(point.age);
        distribution.record(point.score);
    }
    for stats in periods.values_mut() {
        stats.average_score /= stats.count as f64;
    }

    let segments = AGE_SEGMENTS
        .iter()
        .map(|&(label, first_age, last_age)| {
            let scores: Vec<f64> = moving
                .iter()
                .filter(|point| (first_age..=last_age).contains(&point.age))
                .map(|point| point.score)
                .collect();
            SegmentStats {
                label: label.to_owned(),
                first_age,
                last_age,
                count: scores.len(),
                average_score: mean(&scores),
            }
        })
        .collect();

    let mut turning_points = Vec::new();
    let (mut up_trends, mut down_trends) = (0, 0);
    for pair in moving.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        let change = current.score - previous.score;
        if change > 0.0 {
            up_trends += 1;
        } else if change < 0.0 {
            down_trends += 1;
        }
        if change.abs() >= TURNING_POINT_DELTA && turning_points.len() < MAX_TURNING_POINTS {
            turning_points.push(TurningPoint {
                age: current.age,
                year: current.year,
                stem_branch: current.stem_branch.clone(),
                change,
                from_score: previous.score,
                to_score: current.score,
                direction: if change > 0.0 {
                    Trend::Bullish
                } else {
                    Trend::Bearish
                },
            });
        }
    }

    let scores: Vec<f64> = moving.iter().map(|point| point.score).collect();
    Some(TimelineStatistics {
        average_score: round_to_cents(mean(&scores)),
        best_year: extreme(&moving, |candidate, best| candidate > best),
        worst_year: extreme(&moving, |candidate, worst| candidate < worst),
        periods,
        segments,
        turning_points,
        distribution,
        up_trends,
        down_trends,
        total_years: timeline.len(),
        valid_years: moving.len(),
    })
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// First year holding the extreme score.
fn extreme(points: &[&TimelinePoint], better: impl Fn(f64, f64) -> bool) -> Option<YearMark> {
    let mut chosen: Option<&TimelinePoint> = None;
    for point in points {
        if chosen.is_none_or(|current| better(point.score, current.score)) {
            chosen = Some(*point);
        }
    }
    chosen.map(|point| YearMark {
        age: point.age,
        year: point.year,
        score: point.score,
    })
}

fn round_to_cents(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|decimal| decimal.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|decimal| decimal.to_f64())
        .unwrap_or(value)
}
