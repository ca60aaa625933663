//! Evaluation pipeline: replay feature records through the obstacle store,
//! score each classified obstacle, and aggregate per-context metrics.
//!
//! # Per-record steps
//! 1. Insert-or-merge the record into the obstacle container
//! 2. Classify the obstacle's motion context (junction wins over lane)
//! 3. Score the latest snapshot against its recorded true future
//! 4. Fold the outcome into the accumulator of that context
//!
//! Unclassifiable obstacles are skipped and counted. A missing true future
//! is a zero-sample observation, never an error: the frame still lands in
//! the recall denominator.

use crate::error::ConfigError;
use crate::metrics::{EvaluationMetrics, MetricsSummary};
use crate::obstacle::ObstacleContainer;
use crate::scoring::{MotionContext, ScorerConfig, TrajectoryScorer};
use crate::types::FeatureRecord;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// Configuration of one evaluation run.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Future time window over which correctness is measured (seconds)
    pub horizon_s: f64,
    pub scorer: ScorerConfig,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self { horizon_s: 3.0, scorer: ScorerConfig::default() }
    }
}

impl EvaluationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.horizon_s.is_finite() || self.horizon_s <= 0.0 {
            return Err(ConfigError::InvalidHorizon(self.horizon_s));
        }
        for (name, value) in [
            ("lateral tolerance", self.scorer.lateral_tolerance_m),
            ("longitudinal tolerance", self.scorer.longitudinal_tolerance_m),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidTolerance { name, value });
            }
        }
        Ok(())
    }
}

/// Raw counters and finalized scores for one context bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextReport {
    pub counters: EvaluationMetrics,
    pub summary: MetricsSummary,
}

/// Counts that never enter the metrics but matter when diagnosing a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationDiagnostics {
    /// Feature records consumed
    pub n_records: u64,
    /// Distinct obstacles in the container after the pass
    pub n_obstacles: u64,
    /// Records whose obstacle matched neither context predicate
    pub n_skipped_unclassified: u64,
    /// Scored records whose obstacle had no true future at all
    pub n_missing_future: u64,
}

/// The output of an evaluation run: one bucket per motion context.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub on_lane: ContextReport,
    pub junction: ContextReport,
    pub diagnostics: EvaluationDiagnostics,
}

/// Single-pass evaluation driver.
///
/// Owns the scorer; the obstacle container is an explicit dependency so
/// callers control obstacle lifetime across batches and tests run without
/// any shared state.
#[derive(Clone, Debug)]
pub struct EvaluationPipeline {
    config: EvaluationConfig,
    scorer: TrajectoryScorer,
}

impl EvaluationPipeline {
    /// Build a pipeline, rejecting configurations that would corrupt every
    /// accumulated metric.
    pub fn new(config: EvaluationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, scorer: TrajectoryScorer::new(config.scorer) })
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Replay `records` in order and report per-context metrics.
    pub fn evaluate<I>(&self, container: &mut ObstacleContainer, records: I) -> EvaluationReport
    where
        I: IntoIterator<Item = FeatureRecord>,
    {
        let mut on_lane = EvaluationMetrics::default();
        let mut junction = EvaluationMetrics::default();
        let mut diagnostics = EvaluationDiagnostics::default();

        for record in records {
            diagnostics.n_records += 1;
            let id = record.obstacle_id;
            container.insert_record(record);
            let Some(obstacle) = container.get(id) else {
                continue;
            };
            let Some(context) = MotionContext::of(obstacle) else {
                trace!(obstacle = %id, "skipping unclassifiable obstacle");
                diagnostics.n_skipped_unclassified += 1;
                continue;
            };
            if obstacle.true_future().is_empty() {
                debug!(obstacle = %id, "no true future recorded, zero-sample observation");
                diagnostics.n_missing_future += 1;
            }
            let outcome = self.scorer.score(obstacle, context, self.config.horizon_s);
            trace!(
                obstacle = %id,
                ?context,
                portion = outcome.correct_portion,
                samples = outcome.sample_count,
                "scored frame"
            );
            match context {
                MotionContext::Junction => junction.update(&outcome),
                MotionContext::OnLane => on_lane.update(&outcome),
            }
        }

        diagnostics.n_obstacles = container.len() as u64;
        info!(
            records = diagnostics.n_records,
            obstacles = diagnostics.n_obstacles,
            skipped = diagnostics.n_skipped_unclassified,
            "evaluation pass complete"
        );
        EvaluationReport {
            on_lane: ContextReport { counters: on_lane, summary: on_lane.finalize() },
            junction: ContextReport { counters: junction, summary: junction.finalize() },
            diagnostics,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
