mod support;

use life_kline::KlineError;
use life_kline::core::model::{CanonicalResult, PRE_EPOCH_PERIOD};
use life_kline::ingest::{
    MISSING_NARRATIVE, UpstreamShape, clean_pillar, normalize_score, normalize_str,
    normalize_value,
};
use life_kline::validation::validate;
use serde_json::{Value, json};

fn assert_scorecard_in_range(result: &CanonicalResult) {
    for (dimension, entry) in result.scorecard.dimensions() {
        assert!(
            (0.0..=10.0).contains(&entry.score),
            "{dimension:?} score {} out of range",
            entry.score
        );
        assert!(!entry.label.is_empty());
    }
    assert_eq!(result.scorecard.pillars.len(), 4);
}

#[test]
fn all_three_shapes_normalize_to_a_valid_result() {
    for (payload, shape) in [
        (support::timeline_payload(100), UpstreamShape::Timeline),
        (support::profile_payload(100), UpstreamShape::Profile),
        (support::flat_payload(100), UpstreamShape::Flat),
    ] {
        let normalized = normalize_value(&payload).expect("normalize");
        assert_eq!(normalized.shape, shape);
        assert_eq!(normalized.result.timeline.len(), 100);
        assert_scorecard_in_range(&normalized.result);
        assert_eq!(
            normalized.result.scorecard.pillars.as_slice(),
            support::PILLARS.map(str::to_owned).as_slice()
        );

        let report = validate(&normalized.result);
        assert!(report.is_valid(), "{shape:?}: {:?}", report.messages());
        assert!(report.point_count.is_none());
    }
}

#[test]
fn shapes_carry_their_own_scorecard_conventions() {
    let timeline = normalize_value(&support::timeline_payload(100)).expect("timeline");
    assert_eq!(timeline.result.scorecard.overall.score, 7.2);
    assert_eq!(timeline.result.scorecard.relationship.label, MISSING_NARRATIVE);
    assert_eq!(timeline.result.subject_name(), Some("测试用户"));

    let profile = normalize_value(&support::profile_payload(100)).expect("profile");
    assert_eq!(profile.result.scorecard.career.score, 8.0);
    assert_eq!(profile.result.scorecard.relationship.label, "晚婚为宜");
    assert_eq!(profile.result.timeline[0].year, support::BIRTH_YEAR);

    let flat = normalize_value(&support::flat_payload(100)).expect("flat");
    assert_eq!(flat.result.scorecard.career.score, 8.5);
    assert_eq!(flat.result.scorecard.kinship.label, "六亲和睦");
}

#[test]
fn score_normalization_rules() {
    assert_eq!(normalize_score(Some(&json!(85))), 8.5);
    assert_eq!(normalize_score(Some(&json!(7))), 7.0);
    assert_eq!(normalize_score(Some(&Value::Null)), 5.0);
    assert_eq!(normalize_score(None), 5.0);
    assert_eq!(normalize_score(Some(&json!("6.5"))), 6.5);
}

#[test]
fn pillar_annotations_are_stripped() {
    assert_eq!(clean_pillar("甲子 (some note)"), "甲子");
    assert_eq!(clean_pillar("乙丑（年柱）"), "乙丑");
    assert_eq!(clean_pillar("  丙寅 "), "丙寅");
}

#[test]
fn fenced_chat_output_is_accepted() {
    let body = serde_json::to_string_pretty(&support::flat_payload(100)).expect("json");
    let pasted = format!("\u{feff}```json\n{body}\n```\n");
    let normalized = normalize_str(&pasted).expect("normalize");
    assert_eq!(normalized.shape, UpstreamShape::Flat);
}

#[test]
fn missing_period_becomes_pre_epoch_sentinel() {
    let mut payload = support::flat_payload(100);
    payload["chartData"][40]
        .as_object_mut()
        .expect("point")
        .remove("daYun");
    let normalized = normalize_value(&payload).expect("normalize");
    assert_eq!(normalized.result.timeline[40].period, PRE_EPOCH_PERIOD);
}

#[test]
fn malformed_json_is_a_parse_error() {
    let err = normalize_str("{\"chartData\": [").expect_err("parse error");
    assert!(matches!(err, KlineError::Parse(_)));
}

#[test]
fn unknown_shape_reports_top_level_keys() {
    let err = normalize_str(r#"{"foo": 1, "bar": []}"#).expect_err("no shape");
    match err {
        KlineError::UnrecognizedShape { keys } => {
            assert!(keys.contains(&"foo".to_owned()));
            assert!(keys.contains(&"bar".to_owned()));
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = normalize_str("[1, 2, 3]").expect_err("array root");
    assert!(matches!(err, KlineError::UnrecognizedShape { keys } if keys.is_empty()));
}

#[test]
fn extreme_birth_year_and_age_yield_violations_instead_of_overflow() {
    let normalized = normalize_value(&json!({
        "birthYear": i64::from(i32::MAX),
        "chartData": [{"open": 1, "close": 2, "high": 3, "low": 0}]
    }))
    .expect("normalize");
    let report = validate(&normalized.result);
    assert!(report.violations.iter().any(|v| v.path == "timeline.0.year"));

    let normalized = normalize_value(&json!({
        "chartData": [{"age": i64::from(i32::MIN), "year": 5, "open": 1, "close": 2, "high": 3, "low": 0}]
    }))
    .expect("normalize");
    assert_eq!(normalized.result.timeline[0].age, i32::MIN);
    let report = validate(&normalized.result);
    assert!(report.violations.iter().any(|v| v.path == "timeline.0.age"));
    assert!(report.violations.iter().any(|v| v.path == "timeline.0.year"));
}
