pub mod candlestick;
pub mod model;
pub mod scale;
pub mod stem_branch;
pub mod types;
pub mod windowing;

pub use candlestick::{
    BodyRect, CandleGeometry, CandleInput, ProjectedCandle, WickKind, WickSegment,
    project_candle, project_candles,
};
pub use model::{
    CanonicalResult, Dimension, DimensionScore, PointExtras, Scorecard, TimelinePoint, Trend,
};
pub use scale::{AgeBands, LinearScale, ValueScale};
pub use types::{PixelBand, PlotRect, Viewport};
pub use windowing::{AgeWindow, points_in_age_window};
