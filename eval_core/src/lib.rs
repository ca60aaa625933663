//! `eval_core` — Offline scoring of recorded motion predictions against
//! ground-truth obstacle futures.
//!
//! A recorded drive is replayed as a stream of [`types::FeatureRecord`]s:
//! observed obstacle snapshots augmented with the positions the obstacle
//! actually reached afterwards and the trajectories a predictor produced at
//! that instant. The [`pipeline::EvaluationPipeline`] classifies every
//! obstacle by motion context, scores the prediction against the true
//! future, and aggregates recall and mean squared error per context.
//!
//! # Module layout
//! - [`types`]    — Dataset types: feature records, futures, predictions
//! - [`obstacle`] — Obstacle store: per-id history and context predicates
//! - [`scoring`]  — Correctness scoring, on-lane and junction variants
//! - [`metrics`]  — Per-context accumulators and derived scores
//! - [`pipeline`] — The single-pass evaluation driver and its report
//! - [`error`]    — Fatal configuration errors

pub mod error;
pub mod metrics;
pub mod obstacle;
pub mod pipeline;
pub mod scoring;
pub mod types;

pub use error::ConfigError;
pub use metrics::{EvaluationMetrics, MetricsSummary};
pub use obstacle::{Obstacle, ObstacleContainer};
pub use pipeline::{
    ContextReport, EvaluationConfig, EvaluationDiagnostics, EvaluationPipeline, EvaluationReport,
};
pub use scoring::{MotionContext, ScoreOutcome, ScorerConfig, TrajectoryScorer};
pub use types::{
    FeatureRecord, FutureState, JunctionExit, JunctionSnapshot, LaneSnapshot, ObstacleId,
    PredictedTrajectory, TrajectoryPoint,
};
