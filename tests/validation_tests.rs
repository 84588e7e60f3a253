mod support;

use life_kline::ingest::normalize_value;
use life_kline::validation::{PointCountWarning, validate};

#[test]
fn well_formed_hundred_point_timeline_has_no_violations() {
    let normalized = normalize_value(&support::flat_payload(100)).expect("normalize");
    let report = validate(&normalized.result);
    assert!(report.is_valid(), "{:?}", report.messages());
    assert_eq!(report.point_count, None);
}

#[test]
fn removing_one_required_field_yields_exactly_one_violation() {
    let index = 37;
    for (field, path_field) in [
        ("open", "open"),
        ("close", "close"),
        ("high", "high"),
        ("low", "low"),
        ("ganZhi", "stemBranch"),
        ("reason", "narrative"),
    ] {
        let mut payload = support::flat_payload(100);
        payload["chartData"][index]
            .as_object_mut()
            .expect("point")
            .remove(field);

        let normalized = normalize_value(&payload).expect("normalize");
        let report = validate(&normalized.result);
        let paths: Vec<&str> = report.violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(
            paths,
            vec![format!("timeline.{index}.{path_field}")],
            "removing `{field}`"
        );
    }
}

#[test]
fn messages_are_path_prefixed() {
    let mut payload = support::timeline_payload(100);
    payload["timeline"][0]["kLine"]["high"] = 120.into();
    let normalized = normalize_value(&payload).expect("normalize");
    let report = validate(&normalized.result);
    assert_eq!(report.violations.len(), 1);
    assert!(report.messages()[0].starts_with("timeline.0.high: "));
}

#[test]
fn short_timeline_is_only_a_warning() {
    let normalized = normalize_value(&support::profile_payload(99)).expect("normalize");
    let report = validate(&normalized.result);
    assert!(report.is_valid());
    assert_eq!(
        report.point_count,
        Some(PointCountWarning {
            expected: 100,
            actual: 99
        })
    );
}

#[test]
fn duplicate_ages_are_reported_at_the_later_point() {
    let mut payload = support::flat_payload(100);
    payload["chartData"][10]["age"] = 10.into();
    let normalized = normalize_value(&payload).expect("normalize");
    let report = validate(&normalized.result);
    let paths: Vec<&str> = report.violations.iter().map(|v| v.path.as_str()).collect();
    assert_eq!(paths, vec!["timeline.10.age"]);
}

#[test]
fn missing_pillars_pad_to_four_blank_labels() {
    let mut payload = support::flat_payload(100);
    payload.as_object_mut().expect("root").remove("bazi");
    let normalized = normalize_value(&payload).expect("normalize");
    assert_eq!(normalized.result.scorecard.pillars.len(), 4);
    assert!(normalized.result.scorecard.pillars.iter().all(String::is_empty));
    assert!(validate(&normalized.result).is_valid());
}

#[test]
fn out_of_range_scorecard_score_is_reported() {
    let mut result = normalize_value(&support::flat_payload(100))
        .expect("normalize")
        .result;
    result.scorecard.health.score = 11.0;
    let report = validate(&result);
    let paths: Vec<&str> = report.violations.iter().map(|v| v.path.as_str()).collect();
    assert_eq!(paths, vec!["scorecard.health.score"]);
}

#[test]
fn implausible_year_is_reported_at_its_point() {
    for (index, year) in [(12, 2150), (63, 1899)] {
        let mut payload = support::flat_payload(100);
        payload["chartData"][index]["year"] = year.into();
        let normalized = normalize_value(&payload).expect("normalize");
        let report = validate(&normalized.result);
        let paths: Vec<&str> = report.violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, vec![format!("timeline.{index}.year")], "year {year}");
    }
}

#[test]
fn reversed_stem_branch_label_is_reported() {
    let mut payload = support::flat_payload(100);
    payload["chartData"][5]["ganZhi"] = "子甲".into();
    let normalized = normalize_value(&payload).expect("normalize");
    let report = validate(&normalized.result);
    let paths: Vec<&str> = report.violations.iter().map(|v| v.path.as_str()).collect();
    assert_eq!(paths, vec!["timeline.5.stemBranch"]);
}
