//! Per-context evaluation metrics: raw counters and the scores derived from
//! them.
//!
//! Counters only ever grow during a pass. The derived scores never write
//! back into the counters, so summarizing is idempotent and accumulators for
//! disjoint shards of a dataset can be merged field-wise before summarizing.

use crate::scoring::ScoreOutcome;
use serde::{Deserialize, Serialize};

/// Running counters for one motion-context bucket.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Obstacle-frames that were scored
    pub n_frame_obstacles: u64,
    /// Total in-horizon true-future samples across the scored frames
    pub n_predicted_samples: u64,
    /// Sum of per-frame correct portions
    pub sum_correct_portion: f64,
    /// Sum of squared position errors over compared samples (m²)
    pub sum_sq_error: f64,
}

impl EvaluationMetrics {
    /// Fold one scored obstacle-frame into the counters. A zero-sample
    /// outcome still counts as an observation.
    pub fn update(&mut self, outcome: &ScoreOutcome) {
        self.n_frame_obstacles += 1;
        self.n_predicted_samples += outcome.sample_count as u64;
        self.sum_correct_portion += outcome.correct_portion;
        self.sum_sq_error += outcome.sum_sq_error;
    }

    /// Field-wise sum, for combining accumulators built over disjoint record
    /// shards.
    pub fn merge(&mut self, other: &EvaluationMetrics) {
        self.n_frame_obstacles += other.n_frame_obstacles;
        self.n_predicted_samples += other.n_predicted_samples;
        self.sum_correct_portion += other.sum_correct_portion;
        self.sum_sq_error += other.sum_sq_error;
    }

    /// Average correct portion over scored frames, each frame weighted
    /// equally. `None` until at least one frame was scored.
    pub fn recall(&self) -> Option<f64> {
        if self.n_frame_obstacles == 0 {
            return None;
        }
        Some(self.sum_correct_portion / self.n_frame_obstacles as f64)
    }

    /// Mean squared position error over in-horizon samples (m²). `None`
    /// until at least one sample was counted. Guarded independently of
    /// `recall`: frames can be scored without contributing any sample.
    pub fn mean_squared_error(&self) -> Option<f64> {
        if self.n_predicted_samples == 0 {
            return None;
        }
        Some(self.sum_sq_error / self.n_predicted_samples as f64)
    }

    /// Derive the final summary. Pure: calling this twice, or interleaving
    /// it with further updates, never changes the counters.
    pub fn finalize(&self) -> MetricsSummary {
        MetricsSummary { recall: self.recall(), mean_squared_error: self.mean_squared_error() }
    }
}

/// Finalized scores for one context bucket. `None` marks a score that never
/// received a contribution, which is different from a genuine zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub recall: Option<f64>,
    pub mean_squared_error: Option<f64>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
