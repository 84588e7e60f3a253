//! life-kline-rs: life-fortune candlestick engine.
//!
//! Free-form upstream JSON is normalized into one canonical hundred-year
//! timeline, validated, and shown through an integer-bounded age viewport
//! as backend-agnostic candlestick draw commands.

pub mod api;
pub mod core;
pub mod error;
pub mod ingest;
pub mod interaction;
pub mod render;
pub mod services;
pub mod telemetry;
pub mod validation;

pub use api::{IngestOutcome, LifeChart, LifeChartConfig};
pub use error::{KlineError, KlineResult};
