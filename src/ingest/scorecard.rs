use serde_json::{Map, Value};

use super::coerce::{coerce_text, lookup, normalize_score, object_at, pillars_from};
use crate::core::model::{Dimension, DimensionScore, Pillars, Scorecard};

/// Label for the overall dimension when upstream gives no summary.
pub const MISSING_SUMMARY: &str = "无摘要";
/// Label for any other dimension without narrative.
pub const MISSING_NARRATIVE: &str = "无";

/// Keys an aggregate score object may use per dimension.
fn score_aliases(dimension: Dimension) -> &'static [&'static str] {
    match dimension {
        Dimension::Overall => &["overall", "total", "summary"],
        Dimension::Career => &["career", "industry"],
        Dimension::Wealth => &["wealth"],
        Dimension::Relationship => &["relationship", "marriage", "love"],
        Dimension::Health => &["health"],
        Dimension::Kinship => &["kinship", "family", "children"],
    }
}

/// Legacy top-level `(narrative, score)` field pair per dimension.
fn flat_fields(dimension: Dimension) -> (&'static str, &'static str) {
    match dimension {
        Dimension::Overall => ("summary", "summaryScore"),
        Dimension::Career => ("industry", "industryScore"),
        Dimension::Wealth => ("wealth", "wealthScore"),
        Dimension::Relationship => ("marriage", "marriageScore"),
        Dimension::Health => ("health", "healthScore"),
        Dimension::Kinship => ("family", "familyScore"),
    }
}

fn fallback_label(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::Overall => MISSING_SUMMARY,
        _ => MISSING_NARRATIVE,
    }
}

fn assemble(mut entry: impl FnMut(Dimension) -> DimensionScore, pillars: Pillars) -> Scorecard {
    Scorecard {
        overall: entry(Dimension::Overall),
        career: entry(Dimension::Career),
        wealth: entry(Dimension::Wealth),
        relationship: entry(Dimension::Relationship),
        health: entry(Dimension::Health),
        kinship: entry(Dimension::Kinship),
        pillars,
    }
}

/// Reads one dimension value: a bare number (legacy) or an object with
/// narrative and `score`.
fn dimension_entry(dimension: Dimension, raw: Option<&Value>) -> DimensionScore {
    match raw {
        Some(Value::Object(object)) => DimensionScore::new(
            coerce_text(lookup(object, &["content", "text", "summary", "label"]))
                .unwrap_or_else(|| fallback_label(dimension).to_owned()),
            normalize_score(object.get("score")),
        ),
        other => DimensionScore::new(fallback_label(dimension), normalize_score(other)),
    }
}

/// Scorecard for timeline-shape payloads: aggregate scores plus base-chart pillars.
pub(super) fn timeline_scorecard(root: &Map<String, Value>) -> Scorecard {
    let global = object_at(root, "globalDimensions");
    let scores = global
        .and_then(|global| object_at(global, "scores"))
        .or_else(|| object_at(root, "scores"));
    let summary = global.and_then(|global| coerce_text(global.get("summary")));

    let pillars = object_at(root, "baseChart")
        .and_then(|chart| chart.get("pillars"))
        .or_else(|| root.get("bazi"));

    assemble(
        |dimension| {
            let raw = scores.and_then(|scores| lookup(scores, score_aliases(dimension)));
            let mut entry = dimension_entry(dimension, raw);
            if dimension == Dimension::Overall {
                if let Some(summary) = &summary {
                    entry.label = summary.clone();
                }
            }
            entry
        },
        pillars_from(pillars),
    )
}

/// Scorecard for profile-shape payloads: `summary.dimensions` entries.
pub(super) fn profile_scorecard(root: &Map<String, Value>) -> Scorecard {
    let empty = Map::new();
    let summary = object_at(root, "summary").unwrap_or(&empty);
    let dimensions = object_at(summary, "dimensions").unwrap_or(summary);
    let profile = object_at(root, "profile").unwrap_or(&empty);

    let pillars = lookup(profile, &["bazi", "pillars"]).or_else(|| root.get("bazi"));

    assemble(
        |dimension| dimension_entry(dimension, lookup(dimensions, score_aliases(dimension))),
        pillars_from(pillars),
    )
}

/// Scorecard for flat payloads: `summary`/`summaryScore`-style pairs, with
/// a `scores` object as the fallback score source.
pub(super) fn flat_scorecard(root: &Map<String, Value>) -> Scorecard {
    let scores = object_at(root, "scores");

    assemble(
        |dimension| {
            let (label_key, score_key) = flat_fields(dimension);
            let score = lookup(root, &[score_key])
                .or_else(|| scores.and_then(|scores| lookup(scores, score_aliases(dimension))));
            DimensionScore::new(
                coerce_text(root.get(label_key))
                    .unwrap_or_else(|| fallback_label(dimension).to_owned()),
                normalize_score(score),
            )
        },
        pillars_from(root.get("bazi")),
    )
}
