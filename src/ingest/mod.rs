//! Upstream payload normalization.
//!
//! The generator behind the payloads is uncontrolled, so every field is
//! read loosely and every conversion is total: once a shape marker is
//! found, the result is always a [`CanonicalResult`], with missing data
//! left where the validator can point at it.

mod coerce;
mod points;
mod scorecard;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::model::{CanonicalResult, TimelinePoint};
use crate::error::{KlineError, KlineResult};

pub use coerce::{NEUTRAL_SCORE, SCORE_MAX, clean_pillar, clean_pillars, normalize_score};
pub use scorecard::{MISSING_NARRATIVE, MISSING_SUMMARY};

use coerce::{coerce_text, object_at};
use points::{infer_birth_year, map_flat_point, map_timeline_entry};
use scorecard::{flat_scorecard, profile_scorecard, timeline_scorecard};

/// Which upstream layout a payload was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UpstreamShape {
    /// `timeline[]` entries nesting `kLine` / `metaphysics` / `forecast`.
    Timeline,
    /// `profile` plus `summary` objects.
    Profile,
    /// Legacy top-level `chartPoints` / `chartData` with flat score fields.
    Flat,
}

/// A recognized shape and its canonical conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub shape: UpstreamShape,
    pub result: CanonicalResult,
}

const TIMELINE_ENTRY_MARKERS: [&str; 3] = ["kLine", "metaphysics", "forecast"];
const POINT_ARRAY_KEYS: [&str; 3] = ["chartPoints", "chartData", "timeline"];

/// Probes shape markers in priority order.
#[must_use]
pub fn detect_shape(root: &Map<String, Value>) -> Option<UpstreamShape> {
    let nested_timeline = root
        .get("timeline")
        .and_then(Value::as_array)
        .is_some_and(|entries| {
            entries.iter().filter_map(Value::as_object).any(|entry| {
                TIMELINE_ENTRY_MARKERS
                    .iter()
                    .any(|marker| entry.contains_key(*marker))
            })
        });
    if nested_timeline {
        return Some(UpstreamShape::Timeline);
    }

    if object_at(root, "profile").is_some() && object_at(root, "summary").is_some() {
        return Some(UpstreamShape::Profile);
    }

    if ["chartPoints", "chartData"]
        .iter()
        .any(|key| root.get(*key).is_some_and(Value::is_array))
    {
        return Some(UpstreamShape::Flat);
    }

    None
}

/// Parses raw upstream text and normalizes it.
///
/// A leading byte-order mark and a surrounding Markdown code fence are
/// tolerated, since chat transcripts are often pasted verbatim.
pub fn normalize_str(raw: &str) -> KlineResult<Normalized> {
    let body = strip_transport_noise(raw);
    let value: Value =
        serde_json::from_str(body).map_err(|err| KlineError::Parse(err.to_string()))?;
    normalize_value(&value)
}

/// Normalizes an already parsed upstream payload.
pub fn normalize_value(value: &Value) -> KlineResult<Normalized> {
    let Some(root) = value.as_object() else {
        return Err(KlineError::UnrecognizedShape { keys: Vec::new() });
    };
    let Some(shape) = detect_shape(root) else {
        return Err(KlineError::UnrecognizedShape {
            keys: root.keys().cloned().collect(),
        });
    };

    let result = match shape {
        UpstreamShape::Timeline => from_timeline(root),
        UpstreamShape::Profile => from_profile(root),
        UpstreamShape::Flat => from_flat(root),
    };
    debug!(
        ?shape,
        points = result.timeline.len(),
        has_extras = result.extras.is_some(),
        "normalized upstream payload"
    );

    Ok(Normalized { shape, result })
}

fn strip_transport_noise(raw: &str) -> &str {
    let trimmed = raw.trim_start_matches('\u{feff}').trim();
    let Some(fenced) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`) on the opening fence line.
    let body = fenced.split_once('\n').map_or("", |(_, rest)| rest);
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

fn from_timeline(root: &Map<String, Value>) -> CanonicalResult {
    let entries = array_at(root, "timeline");
    let birth_year = birth_year(root, entries);
    let timeline = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| map_timeline_entry(index, entry, birth_year))
        .collect();

    let mut extras = Map::new();
    copy_extra(&mut extras, "meta", root.get("meta"));
    if let Some(chart) = object_at(root, "baseChart") {
        copy_extra(&mut extras, "analysis", chart.get("analysis"));
        copy_extra(&mut extras, "elementDistribution", chart.get("elementDistribution"));
    }
    copy_subject_name(&mut extras, root);

    CanonicalResult {
        timeline,
        scorecard: timeline_scorecard(root),
        extras: non_empty(extras),
    }
}

fn from_profile(root: &Map<String, Value>) -> CanonicalResult {
    let entries = first_array(root, &POINT_ARRAY_KEYS);
    let mut extras = Map::new();
    for key in ["profile", "summaryOverview", "futureFocus", "share"] {
        copy_extra(&mut extras, key, root.get(key));
    }
    copy_subject_name(&mut extras, root);

    CanonicalResult {
        timeline: flat_points(entries, birth_year(root, entries)),
        scorecard: profile_scorecard(root),
        extras: non_empty(extras),
    }
}

fn from_flat(root: &Map<String, Value>) -> CanonicalResult {
    let entries = first_array(root, &POINT_ARRAY_KEYS[..2]);
    let mut extras = Map::new();
    for key in ["bazi_logic", "history_checkpoints"] {
        copy_extra(&mut extras, key, root.get(key));
    }
    copy_subject_name(&mut extras, root);

    CanonicalResult {
        timeline: flat_points(entries, birth_year(root, entries)),
        scorecard: flat_scorecard(root),
        extras: non_empty(extras),
    }
}

fn flat_points(entries: &[Value], birth_year: Option<i32>) -> Vec<TimelinePoint> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| map_flat_point(index, entry, birth_year))
        .collect()
}

fn birth_year(root: &Map<String, Value>, entries: &[Value]) -> Option<i32> {
    let explicit = root.get("birthYear").or_else(|| {
        object_at(root, "profile").and_then(|profile| profile.get("birthYear"))
    });
    infer_birth_year(explicit, entries)
}

fn array_at<'a>(root: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    root.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn first_array<'a>(root: &'a Map<String, Value>, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .find_map(|key| root.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn copy_extra(extras: &mut Map<String, Value>, key: &str, value: Option<&Value>) {
    if let Some(value) = value.filter(|value| !value.is_null()) {
        extras.insert(key.to_owned(), value.clone());
    }
}

fn copy_subject_name(extras: &mut Map<String, Value>, root: &Map<String, Value>) {
    let name = coerce_text(root.get("userName")).or_else(|| {
        object_at(root, "profile").and_then(|profile| coerce_text(profile.get("name")))
    });
    if let Some(name) = name {
        extras.insert("userName".to_owned(), Value::String(name.trim().to_owned()));
    }
}

fn non_empty(extras: Map<String, Value>) -> Option<Map<String, Value>> {
    (!extras.is_empty()).then_some(extras)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{UpstreamShape, detect_shape, strip_transport_noise};

    #[test]
    fn nested_timeline_wins_over_other_markers() {
        let root = json!({
            "timeline": [{"kLine": {}}],
            "profile": {}, "summary": {}, "chartPoints": []
        });
        assert_eq!(
            detect_shape(root.as_object().expect("root")),
            Some(UpstreamShape::Timeline)
        );
    }

    #[test]
    fn flat_timeline_array_alone_is_not_a_marker() {
        let root = json!({"timeline": [{"open": 1}]});
        assert_eq!(detect_shape(root.as_object().expect("root")), None);
    }

    #[test]
    fn profile_requires_both_objects() {
        let only_profile = json!({"profile": {}, "chartPoints": []});
        assert_eq!(
            detect_shape(only_profile.as_object().expect("root")),
            Some(UpstreamShape::Flat)
        );
    }

    #[test]
    fn code_fences_and_bom_are_stripped() {
        assert_eq!(strip_transport_noise("\u{feff} {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_transport_noise("```json\n{\"a\":1}\n```\n"), "{\"a\":1}");
        assert_eq!(strip_transport_noise("```\n[]"), "[]");
    }
}
