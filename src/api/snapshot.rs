use serde::{Deserialize, Serialize};

use crate::core::model::TimelinePoint;
use crate::core::windowing::AgeWindow;
use crate::core::ProjectedCandle;
use crate::error::{KlineError, KlineResult};
use crate::render::Renderer;

use super::derived::{KeyYears, PeriodBoundary};
use super::LifeChart;

pub const CHART_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

/// Serializable view of what the chart currently shows, for regression
/// tests and host-side debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSnapshot {
    pub window: AgeWindow,
    pub visible_points: Vec<TimelinePoint>,
    pub key_years: KeyYears,
    pub period_boundaries: Vec<PeriodBoundary>,
    pub candles: Vec<ProjectedCandle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: ChartSnapshot,
}

impl ChartSnapshot {
    pub fn to_json_contract_v1_pretty(&self) -> KlineResult<String> {
        let payload = ChartSnapshotJsonContractV1 {
            schema_version: CHART_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            KlineError::InvalidData(format!("failed to serialize snapshot contract v1: {e}"))
        })
    }

    /// Accepts a bare snapshot or a versioned contract wrapper.
    pub fn from_json_compat_str(input: &str) -> KlineResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<ChartSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: ChartSnapshotJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            KlineError::InvalidData(format!("failed to parse snapshot json payload: {e}"))
        })?;
        if payload.schema_version != CHART_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(KlineError::InvalidData(format!(
                "unsupported snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}

impl<R: Renderer> LifeChart<R> {
    pub fn snapshot(&self) -> KlineResult<ChartSnapshot> {
        let visible = self.visible_points();
        Ok(ChartSnapshot {
            window: self.window(),
            candles: self.project_visible_candles()?,
            key_years: self.key_years(),
            period_boundaries: self.period_boundaries(),
            visible_points: visible.into_iter().cloned().collect(),
        })
    }

    pub fn snapshot_json_contract_v1_pretty(&self) -> KlineResult<String> {
        self.snapshot()?.to_json_contract_v1_pretty()
    }
}
