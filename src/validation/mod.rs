//! Structural checks over a normalized [`CanonicalResult`].
//!
//! Validation is total: every rule runs and every failure is collected, in
//! timeline order, each addressed by a dotted camelCase path such as
//! `timeline.3.narrative` or `scorecard.career.score`.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::model::{
    CanonicalResult, LIFETIME_YEARS, MAX_AGE, MIN_AGE, PILLAR_COUNT, Scorecard, TimelinePoint,
};
use crate::core::scale::{FORTUNE_MAX, FORTUNE_MIN};
use crate::core::stem_branch::is_stem_branch;
use crate::ingest::SCORE_MAX;

pub const MIN_PLAUSIBLE_YEAR: i32 = 1900;
pub const MAX_PLAUSIBLE_YEAR: i32 = 2100;
/// Shortest narrative accepted for one year, in characters.
pub const MIN_NARRATIVE_CHARS: usize = 10;

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Non-fatal advisory: the timeline is not the usual hundred years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointCountWarning {
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for PointCountWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "timeline has {} point(s), expected {}",
            self.actual, self.expected
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
    pub point_count: Option<PointCountWarning>,
}

impl ValidationReport {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// `"path: message"` lines, in rule order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(ToString::to_string).collect()
    }
}

/// Accumulates violations in rule order.
#[derive(Debug, Default)]
pub(crate) struct ViolationSink {
    violations: Vec<Violation>,
}

impl ViolationSink {
    pub(crate) fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.violations.push(Violation::new(path, message));
    }

    pub(crate) fn check_stem_branch(&mut self, path: impl Into<String>, label: &str) {
        if !is_stem_branch(label) {
            self.push(
                path,
                format!("`{label}` must be one heavenly stem followed by one earthly branch"),
            );
        }
    }

    pub(crate) fn check_range(
        &mut self,
        path: impl Into<String>,
        value: f64,
        min: f64,
        max: f64,
    ) -> bool {
        if value.is_finite() && (min..=max).contains(&value) {
            return true;
        }
        if value.is_nan() {
            self.push(path, "is missing or not a number");
        } else {
            self.push(path, format!("{value} must be finite and within [{min}, {max}]"));
        }
        false
    }

    pub(crate) fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

/// Runs every structural rule against `result`.
#[must_use]
pub fn validate(result: &CanonicalResult) -> ValidationReport {
    let mut sink = ViolationSink::default();

    if result.timeline.is_empty() {
        sink.push("timeline", "must contain at least one point");
    }
    let mut first_seen: HashMap<i32, usize> = HashMap::with_capacity(result.timeline.len());
    for (index, point) in result.timeline.iter().enumerate() {
        validate_point(&mut sink, index, point, &mut first_seen);
    }
    validate_scorecard(&mut sink, &result.scorecard);

    let actual = result.timeline.len();
    let point_count = (actual != LIFETIME_YEARS).then_some(PointCountWarning {
        expected: LIFETIME_YEARS,
        actual,
    });

    let report = ValidationReport {
        violations: sink.into_violations(),
        point_count,
    };
    debug!(
        points = actual,
        violations = report.violations.len(),
        count_warning = report.point_count.is_some(),
        "validated canonical result"
    );
    report
}

fn validate_point(
    sink: &mut ViolationSink,
    index: usize,
    point: &TimelinePoint,
    first_seen: &mut HashMap<i32, usize>,
) {
    let path = |field: &str| format!("timeline.{index}.{field}");

    if !(MIN_AGE..=MAX_AGE).contains(&point.age) {
        sink.push(
            path("age"),
            format!("{} must be within [{MIN_AGE}, {MAX_AGE}]", point.age),
        );
    } else {
        match first_seen.entry(point.age) {
            Entry::Occupied(previous) => sink.push(
                path("age"),
                format!("{} duplicates timeline.{}.age", point.age, previous.get()),
            ),
            Entry::Vacant(slot) => {
                slot.insert(index);
            }
        }
    }

    if !(MIN_PLAUSIBLE_YEAR..=MAX_PLAUSIBLE_YEAR).contains(&point.year) {
        sink.push(
            path("year"),
            format!(
                "{} must be within [{MIN_PLAUSIBLE_YEAR}, {MAX_PLAUSIBLE_YEAR}]",
                point.year
            ),
        );
    }

    sink.check_stem_branch(path("stemBranch"), &point.stem_branch);

    let mut prices_in_range = true;
    for (field, value) in [
        ("open", point.open),
        ("close", point.close),
        ("high", point.high),
        ("low", point.low),
    ] {
        prices_in_range &= sink.check_range(path(field), value, FORTUNE_MIN, FORTUNE_MAX);
    }
    if prices_in_range {
        if point.high < point.open.max(point.close) {
            sink.push(path("high"), "must be >= max(open, close)");
        }
        if point.low > point.open.min(point.close) {
            sink.push(path("low"), "must be <= min(open, close)");
        }
    }

    // A score derived from a missing close is reported once, at `close`.
    if !(point.score.is_nan() && point.close.is_nan()) {
        sink.check_range(path("score"), point.score, FORTUNE_MIN, FORTUNE_MAX);
    }

    let narrative_chars = point.narrative.trim().chars().count();
    if narrative_chars < MIN_NARRATIVE_CHARS {
        sink.push(
            path("narrative"),
            format!("must be at least {MIN_NARRATIVE_CHARS} characters (got {narrative_chars})"),
        );
    }
}

fn validate_scorecard(sink: &mut ViolationSink, scorecard: &Scorecard) {
    for (dimension, entry) in scorecard.dimensions() {
        let key = dimension.key();
        if entry.label.trim().is_empty() {
            sink.push(format!("scorecard.{key}.label"), "must not be empty");
        }
        sink.check_range(format!("scorecard.{key}.score"), entry.score, 0.0, SCORE_MAX);
    }

    if scorecard.pillars.len() != PILLAR_COUNT {
        sink.push(
            "scorecard.pillars",
            format!(
                "must hold exactly {PILLAR_COUNT} pillars (got {})",
                scorecard.pillars.len()
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::{Violation, validate};
    use crate::core::model::{
        CanonicalResult, DimensionScore, PointExtras, Scorecard, TimelinePoint,
    };

    fn point(age: i32) -> TimelinePoint {
        TimelinePoint {
            age,
            year: 1989 + age,
            stem_branch: "甲子".to_owned(),
            period: "童限".to_owned(),
            open: 40.0,
            close: 60.0,
            high: 70.0,
            low: 30.0,
            score: 60.0,
            narrative: "流年运势平稳，稳中有升。".to_owned(),
            extras: PointExtras::default(),
        }
    }

    fn result(points: Vec<TimelinePoint>) -> CanonicalResult {
        let entry = || DimensionScore::new("平稳", 6.0);
        CanonicalResult {
            timeline: points,
            scorecard: Scorecard {
                overall: entry(),
                career: entry(),
                wealth: entry(),
                relationship: entry(),
                health: entry(),
                kinship: entry(),
                pillars: smallvec![
                    "甲子".to_owned(),
                    "乙丑".to_owned(),
                    "丙寅".to_owned(),
                    "丁卯".to_owned()
                ],
            },
            extras: None,
        }
    }

    #[test]
    fn violation_displays_as_path_and_message() {
        let violation = Violation::new("timeline.0.age", "bad");
        assert_eq!(violation.to_string(), "timeline.0.age: bad");
    }

    #[test]
    fn duplicate_ages_are_reported_at_later_index() {
        let report = validate(&result(vec![point(1), point(2), point(1)]));
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].path, "timeline.2.age");
        assert!(report.violations[0].message.contains("timeline.0.age"));
    }

    #[test]
    fn missing_close_is_reported_once() {
        let mut broken = point(1);
        broken.close = f64::NAN;
        broken.score = f64::NAN;
        let report = validate(&result(vec![broken]));
        assert_eq!(report.messages(), vec!["timeline.0.close: is missing or not a number"]);
    }

    #[test]
    fn ordering_is_checked_only_for_in_range_prices() {
        let mut inverted = point(1);
        inverted.high = 50.0;
        let report = validate(&result(vec![inverted]));
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[0].path, "timeline.0.high");

        let mut out_of_range = point(1);
        out_of_range.high = 120.0;
        let report = validate(&result(vec![out_of_range]));
        assert_eq!(report.violations.len(), 1);
    }

    #[test]
    fn empty_timeline_is_a_violation_and_a_count_warning() {
        let report = validate(&result(Vec::new()));
        assert!(!report.is_valid());
        assert_eq!(report.violations[0].path, "timeline");
        assert_eq!(report.point_count.map(|warning| warning.actual), Some(0));
    }
}
