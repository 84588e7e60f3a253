//! Fire-and-forget usage events.
//!
//! The logger only serializes; delivery belongs to a host-owned transport
//! behind [`UsageSink`]. Nothing is returned to the caller, and failures are
//! traced and dropped.

use std::sync::mpsc::Sender;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UsageOperation {
    GeneratePrompt,
    UploadResult,
    LoadHistory,
    View,
    Feedback,
}

/// One usage event as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEvent {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    pub operation: UsageOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_data: Option<Map<String, Value>>,
}

impl UsageEvent {
    #[must_use]
    pub fn new(operation: UsageOperation) -> Self {
        Self {
            timestamp: Utc::now(),
            user_id: None,
            account: None,
            operation,
            page_data: None,
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    #[must_use]
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Adds one `pageData` entry.
    #[must_use]
    pub fn with_page_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.page_data
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Serialized event addressed to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageBeacon {
    pub endpoint: String,
    pub body: String,
}

/// Host-side delivery of usage beacons.
pub trait UsageSink {
    /// Hands a beacon to the transport. Must not block on delivery.
    fn dispatch(&self, beacon: UsageBeacon);
}

/// Drops every beacon.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopUsageSink;

impl UsageSink for NoopUsageSink {
    fn dispatch(&self, beacon: UsageBeacon) {
        trace!(endpoint = %beacon.endpoint, "usage beacon dropped by noop sink");
    }
}

/// Forwards beacons over a channel to a transport the host runs elsewhere.
#[derive(Debug, Clone)]
pub struct ChannelUsageSink {
    sender: Sender<UsageBeacon>,
}

impl ChannelUsageSink {
    #[must_use]
    pub fn new(sender: Sender<UsageBeacon>) -> Self {
        Self { sender }
    }
}

impl UsageSink for ChannelUsageSink {
    fn dispatch(&self, beacon: UsageBeacon) {
        if let Err(err) = self.sender.send(beacon) {
            warn!(endpoint = %err.0.endpoint, "usage beacon receiver is gone; event dropped");
        }
    }
}

/// Usage logger; a no-op while no endpoint is configured.
pub struct UsageLogger {
    endpoint: Option<String>,
    sink: Box<dyn UsageSink>,
}

impl std::fmt::Debug for UsageLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsageLogger")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl Default for UsageLogger {
    fn default() -> Self {
        Self::disabled()
    }
}

impl UsageLogger {
    /// Blank or missing endpoints disable logging.
    #[must_use]
    pub fn new(endpoint: Option<String>, sink: impl UsageSink + 'static) -> Self {
        Self {
            endpoint: endpoint.filter(|endpoint| !endpoint.trim().is_empty()),
            sink: Box::new(sink),
        }
    }

    #[must_use]
    pub fn disabled() -> Self {
        Self::new(None, NoopUsageSink)
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    pub fn log(&self, event: &UsageEvent) {
        let Some(endpoint) = &self.endpoint else {
            return;
        };
        match serde_json::to_string(event) {
            Ok(body) => self.sink.dispatch(UsageBeacon {
                endpoint: endpoint.clone(),
                body,
            }),
            Err(err) => warn!(operation = ?event.operation, error = %err, "usage event not serializable"),
        }
    }
}
