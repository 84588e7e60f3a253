use serde_json::{Map, Value};
use tracing::trace;

use super::coerce::{
    coerce_integer, coerce_number, coerce_text, coerce_text_list, lookup, object_at,
};
use crate::core::model::{PRE_EPOCH_PERIOD, PointExtras, TimelinePoint, Trend};

/// Birth year from an explicit field, else from the first entry that
/// carries both `age` and `year`.
pub(super) fn infer_birth_year(explicit: Option<&Value>, entries: &[Value]) -> Option<i32> {
    coerce_integer(explicit).or_else(|| {
        entries.iter().filter_map(Value::as_object).find_map(|entry| {
            let age = coerce_integer(entry.get("age"))?;
            let year = coerce_integer(entry.get("year"))?;
            year.checked_sub(age)?.checked_add(1)
        })
    })
}

/// Maps a legacy year entry (`open/close/high/low/score/reason`, prices
/// optionally nested under `k_line` / `kLine`).
pub(super) fn map_flat_point(index: usize, raw: &Value, birth_year: Option<i32>) -> TimelinePoint {
    let empty = Map::new();
    let entry = raw.as_object().unwrap_or(&empty);
    let prices = object_at(entry, "k_line")
        .or_else(|| object_at(entry, "kLine"))
        .unwrap_or(entry);

    let (age, year) = age_and_year(index, entry, birth_year);
    let open = price(prices, "open");
    let close = price(prices, "close");
    let mut point = TimelinePoint {
        age,
        year,
        stem_branch: text(entry, &["ganZhi", "stemBranch"]).unwrap_or_default(),
        period: text(entry, &["daYun", "period"]).unwrap_or_else(|| PRE_EPOCH_PERIOD.to_owned()),
        open,
        close,
        high: price(prices, "high"),
        low: price(prices, "low"),
        score: coerce_number(lookup(entry, &["score"]).or_else(|| prices.get("score")))
            .unwrap_or(close),
        narrative: text(entry, &["reason", "narrative"]).unwrap_or_default(),
        extras: PointExtras {
            trend: trend(prices.get("trend").or_else(|| entry.get("trend"))),
            title: text(entry, &["title"]),
            tags: coerce_text_list(entry.get("tags")),
            advice: text(entry, &["advice"]),
            lucky_color: text(entry, &["luckyColor"]),
            lucky_direction: text(entry, &["luckyDirection"]),
            ten_god: text(entry, &["tenGod"]),
            interactions: coerce_text_list(entry.get("interaction")),
            shen_sha: coerce_text_list(entry.get("shenSha")),
            energy: text(entry, &["energy"]),
        },
    };
    widen_to_body(&mut point);
    point
}

/// Maps a timeline entry whose data is nested in `kLine`, `metaphysics`
/// and `forecast` objects.
pub(super) fn map_timeline_entry(
    index: usize,
    raw: &Value,
    birth_year: Option<i32>,
) -> TimelinePoint {
    let empty = Map::new();
    let entry = raw.as_object().unwrap_or(&empty);
    let k_line = object_at(entry, "kLine").unwrap_or(&empty);
    let metaphysics = object_at(entry, "metaphysics").unwrap_or(&empty);
    let forecast = object_at(entry, "forecast").unwrap_or(&empty);

    let (age, year) = age_and_year(index, entry, birth_year);
    let title = text(forecast, &["title"]);
    let narrative = text(forecast, &["content"])
        .or_else(|| title.clone())
        .unwrap_or_else(|| placeholder_narrative(age, year));
    let close = price(k_line, "close");

    let mut point = TimelinePoint {
        age,
        year,
        stem_branch: text(metaphysics, &["ganZhi"]).unwrap_or_default(),
        period: text(metaphysics, &["daYun"]).unwrap_or_else(|| PRE_EPOCH_PERIOD.to_owned()),
        open: price(k_line, "open"),
        close,
        high: price(k_line, "high"),
        low: price(k_line, "low"),
        score: close,
        narrative,
        extras: PointExtras {
            trend: trend(k_line.get("trend")),
            title,
            tags: coerce_text_list(forecast.get("tags")),
            advice: text(forecast, &["advice"]),
            lucky_color: text(forecast, &["luckyColor"]),
            lucky_direction: text(forecast, &["luckyDirection"]),
            ten_god: text(metaphysics, &["tenGod"]),
            interactions: coerce_text_list(metaphysics.get("interaction")),
            shen_sha: coerce_text_list(metaphysics.get("shenSha")),
            energy: text(metaphysics, &["energy"]),
        },
    };
    widen_to_body(&mut point);
    point
}

#[must_use]
pub(super) fn placeholder_narrative(age: i32, year: i32) -> String {
    format!("{year}年（{age}岁）暂无流年详批，上游数据未提供本年说明。")
}

fn age_and_year(index: usize, entry: &Map<String, Value>, birth_year: Option<i32>) -> (i32, i32) {
    let position = i32::try_from(index).map_or(i32::MAX, |index| index.saturating_add(1));
    let age = coerce_integer(entry.get("age")).unwrap_or(position);
    let year = coerce_integer(entry.get("year"))
        .or_else(|| birth_year.and_then(|birth| birth.checked_add(age)?.checked_sub(1)))
        .unwrap_or_default();
    (age, year)
}

fn price(object: &Map<String, Value>, key: &str) -> f64 {
    coerce_number(object.get(key)).unwrap_or(f64::NAN)
}

fn text(object: &Map<String, Value>, aliases: &[&str]) -> Option<String> {
    coerce_text(lookup(object, aliases)).map(|text| text.trim().to_owned())
}

fn trend(raw: Option<&Value>) -> Option<Trend> {
    raw.and_then(Value::as_str).and_then(Trend::parse)
}

/// Widens `high`/`low` so they enclose the body when all prices are known.
fn widen_to_body(point: &mut TimelinePoint) {
    let prices = [point.open, point.close, point.high, point.low];
    if prices.iter().any(|value| !value.is_finite()) {
        return;
    }

    let high = point.high.max(point.open).max(point.close);
    let low = point.low.min(point.open).min(point.close);
    if high != point.high || low != point.low {
        trace!(
            age = point.age,
            high_before = point.high,
            low_before = point.low,
            high,
            low,
            "widened candle extremes to enclose body"
        );
        point.high = high;
        point.low = low;
    }
}
