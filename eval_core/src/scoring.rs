//! Trajectory correctness scoring: what fraction of an obstacle's true
//! future did the recorded prediction get right.
//!
//! # Correctness criterion
//! Each true-future sample within the horizon is matched by time against the
//! interpolated predicted position, and the deviation is split in a
//! context-specific frame:
//! - **on-lane**: Frenet decomposition along the lane centerline; a sample is
//!   correct when both |Δl| <= lateral tolerance and |Δs| <= longitudinal
//!   tolerance.
//! - **junction**: along/across the heading of the exit the true future
//!   actually took, with the same tolerance pair. The taken exit is selected
//!   from the true future alone, so predictions that track the obstacle up to
//!   the branching point keep those samples.
//!
//! When an obstacle has several recorded candidate trajectories, the best
//! scoring candidate represents the prediction. A zero-sample outcome
//! `(0.0, 0)` stands for "no signal": empty true future, nothing within the
//! horizon, or no non-empty prediction.

use crate::obstacle::Obstacle;
use crate::types::{FutureState, PredictedTrajectory};
use lane_models::{select_taken_exit, Centerline, ExitCandidate};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Slack applied to the horizon boundary (seconds).
const HORIZON_EPS: f64 = 1e-9;

/// Motion context an obstacle is scored under.
///
/// Junction takes precedence: an obstacle approaching a junction usually
/// still satisfies the lane predicate, and the branching behavior is the
/// harder thing to predict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionContext {
    OnLane,
    Junction,
}

impl MotionContext {
    /// Classify an obstacle from its latest snapshot, junction first.
    /// `None` means the obstacle matches neither context and is skipped.
    pub fn of(obstacle: &Obstacle) -> Option<MotionContext> {
        if obstacle.has_junction_context_with_exits() {
            Some(MotionContext::Junction)
        } else if obstacle.is_on_lane() {
            Some(MotionContext::OnLane)
        } else {
            None
        }
    }
}

/// Geometric tolerances of the correctness criterion.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Max lateral / across-exit deviation of a correct sample (m).
    /// Default is half a standard 3.5 m lane width.
    pub lateral_tolerance_m: f64,
    /// Max longitudinal / along-exit deviation of a correct sample (m)
    pub longitudinal_tolerance_m: f64,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self { lateral_tolerance_m: 1.75, longitudinal_tolerance_m: 10.0 }
    }
}

/// Result of scoring one obstacle-frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreOutcome {
    /// Fraction of in-horizon samples deemed correct, in `[0, 1]`
    pub correct_portion: f64,
    /// Number of true-future samples within the horizon
    pub sample_count: usize,
    /// Sum of squared position errors over the compared samples (m²)
    pub sum_sq_error: f64,
}

impl ScoreOutcome {
    /// The no-signal outcome: nothing to compare.
    fn zero() -> Self {
        Self::default()
    }
}

/// Scores one obstacle's recorded predictions against its true future.
#[derive(Clone, Debug, Default)]
pub struct TrajectoryScorer {
    config: ScorerConfig,
}

impl TrajectoryScorer {
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Score under an already selected context.
    pub fn score(
        &self,
        obstacle: &Obstacle,
        context: MotionContext,
        horizon_s: f64,
    ) -> ScoreOutcome {
        match context {
            MotionContext::Junction => self.score_junction(obstacle, horizon_s),
            MotionContext::OnLane => self.score_on_lane(obstacle, horizon_s),
        }
    }

    /// On-lane variant: deviations are measured laterally and longitudinally
    /// along the obstacle's lane centerline.
    pub fn score_on_lane(&self, obstacle: &Obstacle, horizon_s: f64) -> ScoreOutcome {
        let record = obstacle.latest();
        let in_horizon = in_horizon_samples(obstacle.true_future(), record.timestamp, horizon_s);
        if in_horizon.is_empty() {
            return ScoreOutcome::zero();
        }
        let Some(lane) = record.lane.as_ref() else {
            return ScoreOutcome::zero();
        };
        let Some(centerline) = Centerline::new(&lane.centerline) else {
            return ScoreOutcome::zero();
        };
        self.best_candidate(
            record.timestamp,
            &in_horizon,
            obstacle.predicted_trajectories(),
            |pred, truth| {
                let fp = centerline.project(pred);
                let ft = centerline.project(truth);
                (ft.s - fp.s, ft.l - fp.l)
            },
        )
    }

    /// Junction variant: deviations are measured in the frame of the exit the
    /// true future actually took.
    pub fn score_junction(&self, obstacle: &Obstacle, horizon_s: f64) -> ScoreOutcome {
        let record = obstacle.latest();
        let in_horizon = in_horizon_samples(obstacle.true_future(), record.timestamp, horizon_s);
        if in_horizon.is_empty() {
            return ScoreOutcome::zero();
        }
        let Some(junction) = record.junction.as_ref() else {
            return ScoreOutcome::zero();
        };
        let exits: Vec<ExitCandidate> = junction
            .exits
            .iter()
            .map(|e| ExitCandidate { position: e.position, heading: e.heading })
            .collect();
        let anchor = record.position_v();
        // Samples are time-ordered, so the last one is the furthest out.
        let terminal = in_horizon[in_horizon.len() - 1].position_v();
        let Some(taken) = select_taken_exit(&exits, &anchor, &terminal) else {
            return ScoreOutcome::zero();
        };
        let exit = exits[taken];
        self.best_candidate(
            record.timestamp,
            &in_horizon,
            obstacle.predicted_trajectories(),
            |pred, truth| exit.decompose(&(pred - truth)),
        )
    }

    /// Score every non-empty candidate trajectory against the in-horizon
    /// samples and keep the best outcome: highest correct portion, then
    /// lowest squared error.
    fn best_candidate<F>(
        &self,
        base_time: f64,
        in_horizon: &[FutureState],
        candidates: &[PredictedTrajectory],
        deviation: F,
    ) -> ScoreOutcome
    where
        F: Fn(&Vector2<f64>, &Vector2<f64>) -> (f64, f64),
    {
        let sample_count = in_horizon.len();
        let mut best: Option<ScoreOutcome> = None;
        for trajectory in candidates.iter().filter(|t| !t.is_empty()) {
            let mut correct = 0usize;
            let mut sum_sq = 0.0f64;
            for sample in in_horizon {
                let truth = sample.position_v();
                let Some(pred) = trajectory.position_at(sample.timestamp - base_time) else {
                    // Beyond the predicted range: incorrect, nothing to compare.
                    continue;
                };
                let (lon, lat) = deviation(&pred, &truth);
                if lat.abs() <= self.config.lateral_tolerance_m
                    && lon.abs() <= self.config.longitudinal_tolerance_m
                {
                    correct += 1;
                }
                sum_sq += (pred - truth).norm_squared();
            }
            let outcome = ScoreOutcome {
                correct_portion: correct as f64 / sample_count as f64,
                sample_count,
                sum_sq_error: sum_sq,
            };
            let replace = match &best {
                None => true,
                Some(b) => {
                    outcome.correct_portion > b.correct_portion
                        || (outcome.correct_portion == b.correct_portion
                            && outcome.sum_sq_error < b.sum_sq_error)
                }
            };
            if replace {
                best = Some(outcome);
            }
        }
        best.unwrap_or_else(ScoreOutcome::zero)
    }
}

/// True-future samples strictly after `base_time` and within the horizon,
/// in their original time order.
fn in_horizon_samples(future: &[FutureState], base_time: f64, horizon_s: f64) -> Vec<FutureState> {
    future
        .iter()
        .filter(|f| {
            let dt = f.timestamp - base_time;
            dt > HORIZON_EPS && dt <= horizon_s + HORIZON_EPS
        })
        .copied()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
