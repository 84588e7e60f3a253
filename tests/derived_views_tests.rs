mod support;

use std::collections::HashSet;

use life_kline::api::{
    KeyYearKind, key_years, moving_average, period_boundaries, timeline_statistics,
    trend_samples,
};
use life_kline::core::{AgeWindow, TimelinePoint, points_in_age_window};
use life_kline::ingest::normalize_value;

fn timeline() -> Vec<TimelinePoint> {
    normalize_value(&support::timeline_payload(100))
        .expect("normalize")
        .result
        .timeline
}

#[test]
fn hundred_points_give_five_top_and_five_bottom_distinct_years() {
    let points = timeline();
    let all: Vec<&TimelinePoint> = points.iter().collect();
    let keys = key_years(&all);

    assert_eq!(keys.top.len(), 5);
    assert_eq!(keys.bottom.len(), 5);
    let ages: HashSet<i32> = keys.iter().map(|key| key.age).collect();
    assert_eq!(ages.len(), 10);
    assert!(keys.top.iter().all(|key| key.kind == KeyYearKind::High));

    let lowest_top = keys.top.iter().map(|key| key.score).fold(f64::INFINITY, f64::min);
    let highest_bottom = keys
        .bottom
        .iter()
        .map(|key| key.score)
        .fold(f64::NEG_INFINITY, f64::max);
    assert!(lowest_top >= highest_bottom);
    for pair in keys.top.windows(2) {
        assert!(
            pair[0].score > pair[1].score
                || (pair[0].score == pair[1].score && pair[0].age < pair[1].age)
        );
    }
}

#[test]
fn key_years_follow_the_window() {
    let points = timeline();
    let window = AgeWindow::new(41, 50).expect("window");
    let visible = points_in_age_window(&points, window);
    let keys = key_years(&visible);
    assert_eq!(keys.len(), 10);
    assert!(keys.iter().all(|key| window.contains(key.age)));
}

#[test]
fn boundaries_mark_first_year_of_each_epoch() {
    let points = timeline();
    let all: Vec<&TimelinePoint> = points.iter().collect();
    let boundaries = period_boundaries(&all);
    let ages: Vec<i32> = boundaries.iter().map(|boundary| boundary.age).collect();
    assert_eq!(ages[..3], [1, 4, 14]);
    assert_eq!(boundaries[0].period, "童限");

    let window = AgeWindow::new(20, 40).expect("window");
    let visible = points_in_age_window(&points, window);
    let ages: Vec<i32> = period_boundaries(&visible).iter().map(|b| b.age).collect();
    assert_eq!(ages, vec![20, 24, 34]);
}

#[test]
fn moving_averages_sample_the_full_timeline() {
    let points = timeline();
    let window = AgeWindow::new(1, 20).expect("window");
    let samples = trend_samples(&points, window);
    assert_eq!(samples.len(), 20);
    assert_eq!(samples[3].short, None);
    assert!(samples[4].short.is_some());
    assert_eq!(samples[8].long, None);
    assert!(samples[9].long.is_some());

    let later = trend_samples(&points, AgeWindow::new(50, 59).expect("window"));
    assert!(later.iter().all(|sample| sample.short.is_some() && sample.long.is_some()));

    let ma5 = moving_average(&points, 5);
    let expected = points[..5].iter().map(|point| point.score).sum::<f64>() / 5.0;
    assert_eq!(ma5[4], Some(expected));
}

#[test]
fn statistics_cover_every_non_flat_year() {
    let points = timeline();
    let stats = timeline_statistics(&points).expect("stats");
    let moving = points.iter().filter(|point| !point.is_flat()).count();
    assert_eq!(stats.total_years, 100);
    assert_eq!(stats.valid_years, moving);
    assert_eq!(stats.segments.len(), 8);
    assert_eq!(
        stats.segments.iter().map(|segment| segment.count).sum::<usize>(),
        moving
    );
    let distribution = stats.distribution;
    assert_eq!(
        distribution.excellent + distribution.good + distribution.average + distribution.poor,
        moving
    );
    assert!(stats.turning_points.len() <= 10);
    let best = stats.best_year.expect("best");
    let worst = stats.worst_year.expect("worst");
    assert!(best.score >= worst.score);
    assert_eq!(stats.periods.keys().next().map(String::as_str), Some("童限"));
}
