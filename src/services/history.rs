//! Client-local history of past readings, persisted by the host as an
//! opaque JSON blob.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::model::{CanonicalResult, MAX_AGE, MIN_AGE, PILLAR_COUNT, Pillars};
use crate::error::{KlineError, KlineResult};
use crate::validation::{Violation, ViolationSink};

pub const MAX_HISTORY_ITEMS: usize = 50;
pub const MIN_BIRTH_YEAR: i32 = 1900;
pub const MAX_BIRTH_YEAR: i32 = 2100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

/// The user-side input a reading is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BirthSignature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub gender: Gender,
    pub birth_year: i32,
    /// Year, month, day and hour pillars.
    pub pillars: Pillars,
    /// Age at which the first epoch starts.
    pub start_age: i32,
    /// Stem-branch label of the first epoch.
    pub first_epoch: String,
}

impl BirthSignature {
    #[must_use]
    pub fn validate(&self) -> Vec<Violation> {
        let mut sink = ViolationSink::default();
        if !(MIN_BIRTH_YEAR..=MAX_BIRTH_YEAR).contains(&self.birth_year) {
            sink.push(
                "birthYear",
                format!(
                    "{} must be within [{MIN_BIRTH_YEAR}, {MAX_BIRTH_YEAR}]",
                    self.birth_year
                ),
            );
        }
        if self.pillars.len() == PILLAR_COUNT {
            for (index, pillar) in self.pillars.iter().enumerate() {
                sink.check_stem_branch(format!("pillars.{index}"), pillar);
            }
        } else {
            sink.push(
                "pillars",
                format!(
                    "must hold exactly {PILLAR_COUNT} pillars (got {})",
                    self.pillars.len()
                ),
            );
        }
        if !(MIN_AGE..=MAX_AGE).contains(&self.start_age) {
            sink.push(
                "startAge",
                format!("{} must be within [{MIN_AGE}, {MAX_AGE}]", self.start_age),
            );
        }
        sink.check_stem_branch("firstEpoch", &self.first_epoch);
        sink.into_violations()
    }

    /// Name shown in the history list: the given name, else year and pillars.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_owned(),
            _ => format!("{}年 {}", self.birth_year, self.pillars.join(" ")),
        }
    }

    /// Two signatures naming the same chart replace each other in history.
    #[must_use]
    pub fn same_chart(&self, other: &Self) -> bool {
        self.birth_year == other.birth_year && self.pillars == other.pillars
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    pub signature: BirthSignature,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<CanonicalResult>,
    pub name: String,
}

/// Most-recent-first list capped at [`MAX_HISTORY_ITEMS`], one entry per chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryLog {
    items: Vec<HistoryItem>,
    next_sequence: u64,
}

impl HistoryLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Inserts at the front, replacing any entry for the same chart.
    pub fn save(
        &mut self,
        signature: BirthSignature,
        result: Option<CanonicalResult>,
    ) -> &HistoryItem {
        self.save_at(signature, result, Utc::now())
    }

    pub fn save_at(
        &mut self,
        signature: BirthSignature,
        result: Option<CanonicalResult>,
        timestamp: DateTime<Utc>,
    ) -> &HistoryItem {
        let id = format!(
            "history-{}-{}",
            timestamp.timestamp_millis(),
            self.next_sequence
        );
        self.next_sequence += 1;

        self.items.retain(|item| !item.signature.same_chart(&signature));
        let item = HistoryItem {
            id,
            timestamp,
            name: signature.display_name(),
            signature,
            result,
        };
        self.items.insert(0, item);
        self.items.truncate(MAX_HISTORY_ITEMS);
        debug!(items = self.items.len(), "history entry saved");
        &self.items[0]
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        before != self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Replaces the stored result of an entry; `false` when the id is unknown.
    pub fn update(&mut self, id: &str, result: CanonicalResult) -> bool {
        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                item.result = Some(result);
                true
            }
            None => false,
        }
    }

    /// Entries whose name (case-insensitive), pillars or birth year contain
    /// `query`; a blank query matches everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&HistoryItem> {
        let query = query.trim();
        if query.is_empty() {
            return self.items.iter().collect();
        }
        let lowered = query.to_lowercase();
        self.items
            .iter()
            .filter(|item| {
                item.name.to_lowercase().contains(&lowered)
                    || item
                        .signature
                        .pillars
                        .iter()
                        .any(|pillar| pillar.contains(query))
                    || item.signature.birth_year.to_string().contains(query)
            })
            .collect()
    }

    pub fn to_json(&self) -> KlineResult<String> {
        serde_json::to_string(&self.items)
            .map_err(|e| KlineError::InvalidData(format!("failed to serialize history: {e}")))
    }

    /// Restores a persisted blob; a malformed blob yields an empty log.
    #[must_use]
    pub fn from_json(blob: &str) -> Self {
        match serde_json::from_str::<Vec<HistoryItem>>(blob) {
            Ok(mut items) => {
                items.truncate(MAX_HISTORY_ITEMS);
                Self {
                    next_sequence: items.len() as u64,
                    items,
                }
            }
            Err(err) => {
                warn!(error = %err, "history blob unreadable; starting empty");
                Self::default()
            }
        }
    }
}
