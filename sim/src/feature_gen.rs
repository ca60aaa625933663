//! Feature-record generation: derives observed snapshots, hindsight futures,
//! and recorded predictions from the ground-truth routes of a scenario.
//!
//! Records without any remaining future are dropped, mirroring how offline
//! datasets are labeled: the tail of a recording has no hindsight to score
//! against.

use crate::agent::{RouteAgent, RoutePlan};
use crate::dataset::FeatureDataset;
use crate::scenarios::Scenario;
use eval_core::types::{
    FeatureRecord, FutureState, JunctionExit, JunctionSnapshot, LaneSnapshot, ObstacleId,
    PredictedTrajectory, TrajectoryPoint,
};
use lane_models::Centerline;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sampling step of synthesized futures and predictions (seconds).
const SAMPLE_DT: f64 = 0.5;
/// Future/prediction samples per record (4 s at `SAMPLE_DT`).
const SAMPLE_LEN: usize = 8;
/// Uniform half-width of the `Noisy` model's position perturbation (m).
const NOISE_BAND_M: f64 = 0.8;

/// How recorded predictions are synthesized into a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum PredictionModel {
    /// Replay the ground-truth route
    Perfect,
    /// Extrapolate the observed velocity
    ConstantVelocity,
    /// Ground-truth route with bounded position noise
    Noisy,
    /// At junctions, follow a different exit than the true one
    WrongExit,
    /// Record no prediction at all
    Absent,
}

impl std::fmt::Display for PredictionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PredictionModel::Perfect => "perfect",
            PredictionModel::ConstantVelocity => "constant-velocity",
            PredictionModel::Noisy => "noisy",
            PredictionModel::WrongExit => "wrong-exit",
            PredictionModel::Absent => "absent",
        };
        f.write_str(name)
    }
}

/// Synthesize the full feature dataset of a scenario.
pub fn generate_dataset(scenario: &Scenario, model: PredictionModel, seed: u64) -> FeatureDataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut records = Vec::new();
    let n_frames = (scenario.duration / scenario.frame_dt).ceil() as usize;

    let paths: Vec<Option<Centerline>> = scenario.agents.iter().map(|a| a.path()).collect();

    for frame in 0..n_frames {
        let t = frame as f64 * scenario.frame_dt;
        for (agent, path) in scenario.agents.iter().zip(&paths) {
            let Some(path) = path.as_ref() else { continue };
            if agent.speed <= 0.0 {
                continue;
            }
            let total_time = path.length() / agent.speed;
            if t > total_time {
                continue;
            }
            if let Some(record) = make_record(agent, path, t, total_time, model, &mut rng) {
                records.push(record);
            }
        }
    }
    debug!(
        scenario = %scenario.name,
        records = records.len(),
        ?model,
        "generated feature dataset"
    );
    FeatureDataset { name: scenario.name.clone(), seed, frame_dt: scenario.frame_dt, records }
}

fn make_record(
    agent: &RouteAgent,
    path: &Centerline,
    t: f64,
    total_time: f64,
    model: PredictionModel,
    rng: &mut ChaCha8Rng,
) -> Option<FeatureRecord> {
    let s = agent.speed * t;
    let position = path.point_at(s);
    let heading = path.heading_at(s);

    let mut future_states = Vec::new();
    for k in 1..=SAMPLE_LEN {
        let tf = t + k as f64 * SAMPLE_DT;
        if tf > total_time {
            break;
        }
        let p = path.point_at(agent.speed * tf);
        future_states.push(FutureState { timestamp: tf, position: [p.x, p.y] });
    }
    if future_states.is_empty() {
        // Past the labeling horizon: the recording tail is dropped.
        return None;
    }

    let (lane, junction) = context_snapshots(agent);
    let predicted_trajectories = synthesize_predictions(agent, path, t, total_time, model, rng);

    Some(FeatureRecord {
        obstacle_id: ObstacleId(agent.id),
        timestamp: t,
        position: [position.x, position.y],
        velocity: [agent.speed * heading.cos(), agent.speed * heading.sin()],
        theta: heading,
        lane,
        junction,
        future_states,
        predicted_trajectories,
    })
}

/// Map context: what the perception stack would attach to the snapshot.
fn context_snapshots(agent: &RouteAgent) -> (Option<LaneSnapshot>, Option<JunctionSnapshot>) {
    match &agent.plan {
        RoutePlan::LaneFollow { lane_id, centerline } => (
            Some(LaneSnapshot { lane_id: lane_id.clone(), centerline: centerline.clone() }),
            None,
        ),
        RoutePlan::JunctionTransit { junction_id, approach, exits, .. } => (
            // The approach is itself a lane; junction context must win.
            Some(LaneSnapshot {
                lane_id: format!("{junction_id}/approach"),
                centerline: approach.clone(),
            }),
            Some(JunctionSnapshot {
                junction_id: junction_id.clone(),
                exits: exits
                    .iter()
                    .map(|e| JunctionExit {
                        exit_lane_id: e.exit_lane_id.clone(),
                        position: e.position,
                        heading: e.heading,
                    })
                    .collect(),
            }),
        ),
        RoutePlan::FreeRoam { .. } => (None, None),
    }
}

fn synthesize_predictions(
    agent: &RouteAgent,
    path: &Centerline,
    t: f64,
    total_time: f64,
    model: PredictionModel,
    rng: &mut ChaCha8Rng,
) -> Vec<PredictedTrajectory> {
    match model {
        PredictionModel::Absent => Vec::new(),
        PredictionModel::Perfect => {
            vec![trajectory_along(path, agent.speed, t, total_time, 1.0)]
        }
        PredictionModel::Noisy => {
            let mut trajectory = trajectory_along(path, agent.speed, t, total_time, 0.9);
            for point in &mut trajectory.points {
                point.position[0] += rng.gen::<f64>() * NOISE_BAND_M * 2.0 - NOISE_BAND_M;
                point.position[1] += rng.gen::<f64>() * NOISE_BAND_M * 2.0 - NOISE_BAND_M;
            }
            vec![trajectory]
        }
        PredictionModel::ConstantVelocity => vec![cv_prediction(path, agent.speed, t)],
        PredictionModel::WrongExit => match &agent.plan {
            RoutePlan::JunctionTransit { exits, taken_exit, .. } if exits.len() > 1 => {
                let other = (taken_exit + 1) % exits.len();
                let wrong_points =
                    agent.path_points_via_exit(other).unwrap_or_else(|| agent.path_points());
                match Centerline::new(&wrong_points) {
                    Some(wrong_path) => {
                        let wrong_total = wrong_path.length() / agent.speed;
                        vec![trajectory_along(&wrong_path, agent.speed, t, wrong_total, 0.7)]
                    }
                    None => Vec::new(),
                }
            }
            _ => vec![cv_prediction(path, agent.speed, t)],
        },
    }
}

/// Sample a trajectory along a route, starting just after `t`.
fn trajectory_along(
    path: &Centerline,
    speed: f64,
    t: f64,
    total_time: f64,
    probability: f64,
) -> PredictedTrajectory {
    let mut points = Vec::with_capacity(SAMPLE_LEN);
    for k in 1..=SAMPLE_LEN {
        let rel = k as f64 * SAMPLE_DT;
        if t + rel > total_time {
            break;
        }
        let p = path.point_at(speed * (t + rel));
        points.push(TrajectoryPoint { relative_time: rel, position: [p.x, p.y] });
    }
    PredictedTrajectory { probability, points }
}

/// Straight-line extrapolation of the current speed and heading.
fn cv_prediction(path: &Centerline, speed: f64, t: f64) -> PredictedTrajectory {
    let s = speed * t;
    let p0 = path.point_at(s);
    let heading = path.heading_at(s);
    let v = [speed * heading.cos(), speed * heading.sin()];
    let points = (1..=SAMPLE_LEN)
        .map(|k| {
            let rel = k as f64 * SAMPLE_DT;
            TrajectoryPoint {
                relative_time: rel,
                position: [p0.x + v[0] * rel, p0.y + v[1] * rel],
            }
        })
        .collect();
    PredictedTrajectory { probability: 1.0, points }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
