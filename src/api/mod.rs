mod chart;
mod chart_events;
mod config;
mod derived;
mod frame_builder;
mod snapshot;
mod statistics;

pub use chart::{IngestOutcome, LifeChart};
pub use config::{CandlePalette, CandleStyle, LifeChartConfig, PlotMargins};
pub use derived::{
    KEY_YEARS_PER_SIDE, KeyYear, KeyYearKind, KeyYears, LONG_MOVING_AVERAGE, PeriodBoundary,
    SHORT_MOVING_AVERAGE, TrendSample, key_years, moving_average, period_boundaries,
    trend_samples,
};
pub use snapshot::{CHART_SNAPSHOT_JSON_SCHEMA_V1, ChartSnapshot, ChartSnapshotJsonContractV1};
pub use statistics::{
    AGE_SEGMENTS, MAX_TURNING_POINTS, PeriodStats, ScoreDistribution, SegmentStats,
    TURNING_POINT_DELTA, TimelineStatistics, TurningPoint, YearMark, timeline_statistics,
};
