//! Every loose-to-strict conversion the normalizer performs lives here.

use serde_json::{Map, Value};

use crate::core::model::{PILLAR_COUNT, Pillars};

/// Scorecard value used when the upstream score is missing or non-numeric.
pub const NEUTRAL_SCORE: f64 = 5.0;
/// Upper bound of scorecard scores.
pub const SCORE_MAX: f64 = 10.0;

/// Maps a raw score onto the `0..=10` scorecard scale.
///
/// Values above 10 are read as `0..=100` scores and divided by 10; the
/// result is clamped; anything non-numeric becomes [`NEUTRAL_SCORE`].
#[must_use]
pub fn normalize_score(raw: Option<&Value>) -> f64 {
    match coerce_number(raw) {
        Some(value) => {
            let scaled = if value > SCORE_MAX { value / 10.0 } else { value };
            scaled.clamp(0.0, SCORE_MAX)
        }
        None => NEUTRAL_SCORE,
    }
}

/// Finite JSON number, or a string holding one.
#[must_use]
pub fn coerce_number(raw: Option<&Value>) -> Option<f64> {
    match raw? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|value| value.is_finite())
}

/// Whole number that fits an `i32`.
#[must_use]
pub fn coerce_integer(raw: Option<&Value>) -> Option<i32> {
    let value = coerce_number(raw)?;
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return None;
    }
    Some(value as i32)
}

/// Non-blank text; numbers and booleans are rendered as text.
#[must_use]
pub fn coerce_text(raw: Option<&Value>) -> Option<String> {
    let text = match raw? {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}

/// Array of texts, or a single text as a one-element list.
#[must_use]
pub fn coerce_text_list(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| coerce_text(Some(item)))
            .collect(),
        other => coerce_text(other).into_iter().collect(),
    }
}

/// First alias whose value is present and not `null`.
#[must_use]
pub fn lookup<'a>(object: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|alias| object.get(*alias))
        .find(|value| !value.is_null())
}

/// Object found at `key`, if it is one.
#[must_use]
pub fn object_at<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    object.get(key)?.as_object()
}

/// Strips `(...)` / `（...）` annotations and the whitespace around them.
#[must_use]
pub fn clean_pillar(label: &str) -> String {
    let mut cleaned = String::with_capacity(label.len());
    let mut rest = label;
    while let Some(open_idx) = rest.find(['(', '（']) {
        let Some(open) = rest[open_idx..].chars().next() else {
            break;
        };
        let close = if open == '(' { ')' } else { '）' };
        let inner = &rest[open_idx + open.len_utf8()..];
        let Some(close_idx) = inner.find(close) else {
            break;
        };
        cleaned.push_str(rest[..open_idx].trim_end());
        rest = inner[close_idx + close.len_utf8()..].trim_start();
    }
    cleaned.push_str(rest);
    cleaned.trim().to_owned()
}

/// Text form of a single pillar entry before cleaning.
#[must_use]
pub fn pillar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Object(object) => lookup(object, &["ganZhi", "stemBranch", "label"])
            .and_then(|inner| coerce_text(Some(inner)))
            .unwrap_or_default(),
        other => other.to_string(),
    }
}

/// Reads pillars from an array, a year/month/day/hour object, or a
/// whitespace-separated string, then cleans and sizes them to four.
#[must_use]
pub fn pillars_from(raw: Option<&Value>) -> Pillars {
    let texts: Vec<String> = match raw {
        Some(Value::Array(items)) => items.iter().map(pillar_text).collect(),
        Some(Value::Object(object)) => ["year", "month", "day", "hour"]
            .iter()
            .map(|key| object.get(*key).map(pillar_text).unwrap_or_default())
            .collect(),
        Some(Value::String(text)) => text.split_whitespace().map(str::to_owned).collect(),
        _ => Vec::new(),
    };
    clean_pillars(texts)
}

/// Cleans each label and truncates or pads the list to exactly four.
#[must_use]
pub fn clean_pillars(labels: impl IntoIterator<Item = String>) -> Pillars {
    let mut pillars: Pillars = labels
        .into_iter()
        .take(PILLAR_COUNT)
        .map(|label| clean_pillar(&label))
        .collect();
    while pillars.len() < PILLAR_COUNT {
        pillars.push(String::new());
    }
    pillars
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{clean_pillar, coerce_integer, coerce_number, normalize_score, pillars_from};

    #[test]
    fn score_rule_rescales_clamps_and_defaults() {
        assert_eq!(normalize_score(Some(&json!(85))), 8.5);
        assert_eq!(normalize_score(Some(&json!(7))), 7.0);
        assert_eq!(normalize_score(Some(&json!(10))), 10.0);
        assert_eq!(normalize_score(Some(&json!(250))), 10.0);
        assert_eq!(normalize_score(Some(&json!(-3))), 0.0);
        assert_eq!(normalize_score(Some(&json!(null))), 5.0);
        assert_eq!(normalize_score(Some(&json!("high"))), 5.0);
        assert_eq!(normalize_score(None), 5.0);
    }

    #[test]
    fn numeric_strings_are_numbers() {
        assert_eq!(coerce_number(Some(&json!(" 62.5 "))), Some(62.5));
        assert_eq!(coerce_number(Some(&json!("NaN"))), None);
        assert_eq!(coerce_integer(Some(&json!(12.0))), Some(12));
        assert_eq!(coerce_integer(Some(&json!(12.5))), None);
    }

    #[test]
    fn pillar_annotations_are_stripped() {
        assert_eq!(clean_pillar("甲子 (some note)"), "甲子");
        assert_eq!(clean_pillar("乙丑（月令）"), "乙丑");
        assert_eq!(clean_pillar("丙 (x) 寅"), "丙寅");
        assert_eq!(clean_pillar("  丁卯  "), "丁卯");
        assert_eq!(clean_pillar("戊辰 (unclosed"), "戊辰 (unclosed");
    }

    #[test]
    fn pillars_are_sized_to_four() {
        let short = pillars_from(Some(&json!(["甲子", 12, null])));
        assert_eq!(short.as_slice(), ["甲子", "12", "", ""]);

        let long = pillars_from(Some(&json!(["甲子", "乙丑", "丙寅", "丁卯", "戊辰"])));
        assert_eq!(long.len(), 4);
        assert_eq!(long[3], "丁卯");

        let keyed = pillars_from(Some(&json!({
            "year": {"ganZhi": "庚午 (year)"},
            "month": "辛巳",
            "hour": {"ganZhi": "癸亥"}
        })));
        assert_eq!(keyed.as_slice(), ["庚午", "辛巳", "", "癸亥"]);

        assert_eq!(pillars_from(None).as_slice(), ["", "", "", ""]);
    }
}
