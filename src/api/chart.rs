use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::core::model::{CanonicalResult, TimelinePoint};
use crate::core::windowing::{AgeWindow, points_in_age_window};
use crate::core::{AgeBands, LinearScale, PlotRect, ProjectedCandle, project_candles};
use crate::error::{KlineError, KlineResult};
use crate::ingest::{self, Normalized, UpstreamShape};
use crate::interaction::ViewportController;
use crate::render::Renderer;
use crate::services::{BirthSignature, HistoryLog, UsageEvent, UsageLogger, UsageOperation};
use crate::validation::{self, PointCountWarning};

use super::derived::{
    KeyYears, PeriodBoundary, TrendSample, key_years, period_boundaries, trend_samples,
};
use super::statistics::{TimelineStatistics, timeline_statistics};
use super::LifeChartConfig;

/// What a successful ingestion installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    /// `None` when the result came from history rather than upstream text.
    pub shape: Option<UpstreamShape>,
    pub point_count: usize,
    pub warning: Option<PointCountWarning>,
}

/// Main facade consumed by host applications.
///
/// `LifeChart` owns the current canonical result and the viewport, runs
/// ingestion, answers derived-view queries and drives the renderer.
pub struct LifeChart<R: Renderer> {
    pub(super) renderer: R,
    pub(super) config: LifeChartConfig,
    pub(super) controller: ViewportController,
    pub(super) result: Option<CanonicalResult>,
    pub(super) usage: UsageLogger,
    pub(super) history: HistoryLog,
}

impl<R: Renderer> LifeChart<R> {
    pub fn new(renderer: R, config: LifeChartConfig) -> KlineResult<Self> {
        config.validate()?;
        let controller = ViewportController::new().with_zoom_step(config.zoom_step)?;
        Ok(Self {
            renderer,
            config,
            controller,
            result: None,
            usage: UsageLogger::disabled(),
            history: HistoryLog::new(),
        })
    }

    #[must_use]
    pub fn with_usage_logger(mut self, usage: UsageLogger) -> Self {
        self.usage = usage;
        self
    }

    #[must_use]
    pub fn with_history(mut self, history: HistoryLog) -> Self {
        self.history = history;
        self
    }

    #[must_use]
    pub fn config(&self) -> &LifeChartConfig {
        &self.config
    }

    #[must_use]
    pub fn result(&self) -> Option<&CanonicalResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn window(&self) -> AgeWindow {
        self.controller.window()
    }

    #[must_use]
    pub fn controller(&self) -> &ViewportController {
        &self.controller
    }

    #[must_use]
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut HistoryLog {
        &mut self.history
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Normalizes, validates and installs upstream JSON text.
    ///
    /// On any error the previous result and window stay untouched.
    pub fn ingest_str(&mut self, raw: &str) -> KlineResult<IngestOutcome> {
        let normalized = ingest::normalize_str(raw)?;
        self.accept(normalized)
    }

    pub fn ingest_value(&mut self, value: &Value) -> KlineResult<IngestOutcome> {
        let normalized = ingest::normalize_value(value)?;
        self.accept(normalized)
    }

    /// Re-installs the stored result of a history entry.
    pub fn load_history(&mut self, id: &str) -> KlineResult<IngestOutcome> {
        let Some(item) = self.history.get(id) else {
            return Err(KlineError::InvalidData(format!(
                "unknown history entry `{id}`"
            )));
        };
        let Some(result) = item.result.clone() else {
            return Err(KlineError::InvalidData(format!(
                "history entry `{id}` has no stored result"
            )));
        };
        let outcome = self.install(result, None)?;
        self.usage.log(
            &UsageEvent::new(UsageOperation::LoadHistory).with_page_data("historyId", id),
        );
        Ok(outcome)
    }

    /// Stores the current result under `signature`; returns the entry id.
    pub fn save_to_history(&mut self, signature: BirthSignature) -> KlineResult<String> {
        let violations = signature.validate();
        if !violations.is_empty() {
            return Err(KlineError::Validation(violations));
        }
        let item = self.history.save(signature, self.result.clone());
        Ok(item.id.clone())
    }

    fn accept(&mut self, normalized: Normalized) -> KlineResult<IngestOutcome> {
        let Normalized { shape, result } = normalized;
        let outcome = self.install(result, Some(shape))?;
        self.usage.log(
            &UsageEvent::new(UsageOperation::UploadResult)
                .with_page_data("shape", serde_json::to_value(shape).unwrap_or(Value::Null))
                .with_page_data("points", outcome.point_count),
        );
        Ok(outcome)
    }

    /// Validates, then swaps the result and resets the window together.
    fn install(
        &mut self,
        result: CanonicalResult,
        shape: Option<UpstreamShape>,
    ) -> KlineResult<IngestOutcome> {
        let report = validation::validate(&result);
        if !report.is_valid() {
            warn!(
                violations = report.violations.len(),
                "rejected canonical result"
            );
            return Err(KlineError::Validation(report.violations));
        }
        if let Some(warning) = report.point_count {
            warn!(%warning, "installing result with unusual point count");
        }

        let point_count = result.timeline.len();
        self.result = Some(result);
        self.controller.reset();
        debug!(?shape, point_count, "installed canonical result");

        Ok(IngestOutcome {
            shape,
            point_count,
            warning: report.point_count,
        })
    }

    #[must_use]
    pub(super) fn timeline(&self) -> &[TimelinePoint] {
        self.result
            .as_ref()
            .map(|result| result.timeline.as_slice())
            .unwrap_or_default()
    }

    /// Points with an age inside the current window.
    #[must_use]
    pub fn visible_points(&self) -> Vec<&TimelinePoint> {
        points_in_age_window(self.timeline(), self.controller.window())
    }

    #[must_use]
    pub fn key_years(&self) -> KeyYears {
        key_years(&self.visible_points())
    }

    #[must_use]
    pub fn period_boundaries(&self) -> Vec<PeriodBoundary> {
        period_boundaries(&self.visible_points())
    }

    #[must_use]
    pub fn trend_samples(&self) -> Vec<TrendSample> {
        trend_samples(self.timeline(), self.controller.window())
    }

    /// Whole-timeline figures; independent of the window.
    #[must_use]
    pub fn statistics(&self) -> Option<TimelineStatistics> {
        timeline_statistics(self.timeline())
    }

    /// Candle geometry for every visible point in viewport pixels.
    pub fn project_visible_candles(&self) -> KlineResult<Vec<ProjectedCandle>> {
        let (bands, scale) = self.plot_layout()?;
        project_candles(&self.visible_points(), bands, scale)
    }

    pub(super) fn plot_rect(&self) -> KlineResult<PlotRect> {
        self.config.plot_rect()
    }

    pub(super) fn plot_layout(&self) -> KlineResult<(AgeBands, LinearScale)> {
        let plot = self.plot_rect()?;
        let bands = AgeBands::new(self.controller.window(), plot.horizontal())?;
        let scale = LinearScale::fortune(plot.vertical())?;
        Ok((bands, scale))
    }
}
