//! Evaluation dataset types: observed obstacle snapshots augmented with true
//! future status and the predictions recorded for them.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interpolation slack at the ends of a predicted trajectory (seconds).
const TIME_EPS: f64 = 1e-6;

/// Unique obstacle identifier, stable across all of an obstacle's records.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ObstacleId(pub u64);

impl fmt::Display for ObstacleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "O{}", self.0)
    }
}

/// One observed snapshot of one obstacle, identified by
/// `(obstacle_id, timestamp)`.
///
/// Offline datasets augment the live observation with hindsight: the
/// positions the obstacle actually reached afterwards (`future_states`) and
/// the trajectories a predictor produced at this instant
/// (`predicted_trajectories`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub obstacle_id: ObstacleId,
    /// Observation timestamp (absolute seconds)
    pub timestamp: f64,
    /// Observed position `[x, y]` (m)
    pub position: [f64; 2],
    /// Observed velocity `[vx, vy]` (m/s)
    pub velocity: [f64; 2],
    /// Observed heading (radians)
    pub theta: f64,
    /// Current-lane context, when the obstacle follows a lane
    pub lane: Option<LaneSnapshot>,
    /// Junction context, when the obstacle approaches a junction
    pub junction: Option<JunctionSnapshot>,
    /// True future positions, ordered by timestamp
    pub future_states: Vec<FutureState>,
    /// Trajectories the predictor produced for this snapshot
    pub predicted_trajectories: Vec<PredictedTrajectory>,
}

impl FeatureRecord {
    pub fn position_v(&self) -> Vector2<f64> {
        Vector2::new(self.position[0], self.position[1])
    }

    pub fn velocity_v(&self) -> Vector2<f64> {
        Vector2::new(self.velocity[0], self.velocity[1])
    }
}

/// One true future sample, stamped with its absolute timestamp.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FutureState {
    pub timestamp: f64,
    pub position: [f64; 2],
}

impl FutureState {
    pub fn position_v(&self) -> Vector2<f64> {
        Vector2::new(self.position[0], self.position[1])
    }
}

/// One sample of a predicted trajectory. `relative_time` is the offset from
/// the owning record's timestamp (seconds).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    pub relative_time: f64,
    pub position: [f64; 2],
}

impl TrajectoryPoint {
    pub fn position_v(&self) -> Vector2<f64> {
        Vector2::new(self.position[0], self.position[1])
    }
}

/// What a predictor claims the obstacle will do, with the confidence it
/// assigned. Points are ordered by `relative_time`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictedTrajectory {
    pub probability: f64,
    pub points: Vec<TrajectoryPoint>,
}

impl PredictedTrajectory {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Linearly interpolated position at `relative_time`, or `None` outside
    /// the sampled range.
    pub fn position_at(&self, relative_time: f64) -> Option<Vector2<f64>> {
        let first = self.points.first()?;
        let last = self.points.last()?;
        if relative_time < first.relative_time - TIME_EPS
            || relative_time > last.relative_time + TIME_EPS
        {
            return None;
        }
        let t = relative_time.clamp(first.relative_time, last.relative_time);
        let idx = self.points.partition_point(|p| p.relative_time <= t);
        if idx == 0 {
            return Some(first.position_v());
        }
        if idx >= self.points.len() {
            return Some(last.position_v());
        }
        let a = &self.points[idx - 1];
        let b = &self.points[idx];
        let span = b.relative_time - a.relative_time;
        if span <= TIME_EPS {
            return Some(a.position_v());
        }
        let w = (t - a.relative_time) / span;
        Some(a.position_v() + (b.position_v() - a.position_v()) * w)
    }
}

/// The obstacle's current lane, reduced to its sampled centerline.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LaneSnapshot {
    pub lane_id: String,
    /// Ordered `[x, y]` centerline samples of the current lane sequence (m)
    pub centerline: Vec<[f64; 2]>,
}

/// The junction ahead of the obstacle and its topological exits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JunctionSnapshot {
    pub junction_id: String,
    pub exits: Vec<JunctionExit>,
}

/// One way out of a junction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JunctionExit {
    pub exit_lane_id: String,
    /// Exit position `[x, y]` (m)
    pub position: [f64; 2],
    /// Exit-lane heading at the exit point (radians)
    pub heading: f64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
