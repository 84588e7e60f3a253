//! Collaborators the chart talks to but does not own: usage logging and
//! the persisted history of readings.

pub mod history;
pub mod usage;

pub use history::{BirthSignature, Gender, HistoryItem, HistoryLog, MAX_HISTORY_ITEMS};
pub use usage::{
    ChannelUsageSink, NoopUsageSink, UsageBeacon, UsageEvent, UsageLogger, UsageOperation,
    UsageSink,
};
