//! Ground-truth route agents: where a simulated obstacle truly goes.
//!
//! Each agent follows a fixed route at constant speed, with positions sampled
//! by arc length along the route polyline. Observed snapshots, true future
//! states, and recorded predictions are all derived from the same route, so
//! generated datasets are self-consistent by construction.

use lane_models::Centerline;
use serde::{Deserialize, Serialize};

/// Length of the synthetic exit leg appended after a junction (m).
const EXIT_LEG_LEN: f64 = 60.0;

/// One way out of a simulated junction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExitSpec {
    pub exit_lane_id: String,
    pub position: [f64; 2],
    pub heading: f64,
}

/// How an agent moves through the scene.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum RoutePlan {
    /// Follow a lane centerline end to end.
    LaneFollow { lane_id: String, centerline: Vec<[f64; 2]> },
    /// Drive the approach polyline, then leave through `exits[taken_exit]`.
    JunctionTransit {
        junction_id: String,
        approach: Vec<[f64; 2]>,
        exits: Vec<ExitSpec>,
        taken_exit: usize,
    },
    /// Wander with no lane or junction context (pedestrian, debris).
    FreeRoam { waypoints: Vec<[f64; 2]> },
}

/// A simulated obstacle with a known route.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteAgent {
    pub id: u64,
    pub plan: RoutePlan,
    /// Constant ground speed (m/s)
    pub speed: f64,
}

impl RouteAgent {
    /// The full ground-truth polyline the agent drives.
    pub fn path_points(&self) -> Vec<[f64; 2]> {
        match &self.plan {
            RoutePlan::LaneFollow { centerline, .. } => centerline.clone(),
            RoutePlan::FreeRoam { waypoints } => waypoints.clone(),
            RoutePlan::JunctionTransit { approach, exits, taken_exit, .. } => {
                match exits.get(*taken_exit) {
                    Some(exit) => junction_path(approach, exit),
                    None => approach.clone(),
                }
            }
        }
    }

    /// The polyline the agent would drive if it left through `exit_index`
    /// instead of its planned exit. `None` for non-junction plans.
    pub fn path_points_via_exit(&self, exit_index: usize) -> Option<Vec<[f64; 2]>> {
        match &self.plan {
            RoutePlan::JunctionTransit { approach, exits, .. } => {
                exits.get(exit_index).map(|exit| junction_path(approach, exit))
            }
            _ => None,
        }
    }

    /// The route as a centerline for arc-length sampling. `None` for
    /// degenerate routes.
    pub fn path(&self) -> Option<Centerline> {
        Centerline::new(&self.path_points())
    }

    /// Seconds the agent needs for its whole route.
    pub fn total_time(&self) -> f64 {
        match self.path() {
            Some(path) if self.speed > 0.0 => path.length() / self.speed,
            _ => 0.0,
        }
    }
}

/// Approach polyline extended through an exit and a straight leg beyond it.
fn junction_path(approach: &[[f64; 2]], exit: &ExitSpec) -> Vec<[f64; 2]> {
    let mut points = approach.to_vec();
    let dir = [exit.heading.cos(), exit.heading.sin()];
    points.push(exit.position);
    points.push([
        exit.position[0] + EXIT_LEG_LEN * dir[0],
        exit.position[1] + EXIT_LEG_LEN * dir[1],
    ]);
    points
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn junction_agent() -> RouteAgent {
        RouteAgent {
            id: 1,
            speed: 10.0,
            plan: RoutePlan::JunctionTransit {
                junction_id: "j1".into(),
                approach: vec![[0.0, 0.0], [40.0, 0.0]],
                exits: vec![
                    ExitSpec { exit_lane_id: "east".into(), position: [50.0, 0.0], heading: 0.0 },
                    ExitSpec {
                        exit_lane_id: "north".into(),
                        position: [40.0, 10.0],
                        heading: FRAC_PI_2,
                    },
                ],
                taken_exit: 1,
            },
        }
    }

    #[test]
    fn junction_route_runs_through_the_taken_exit() {
        let agent = junction_agent();
        let points = agent.path_points();
        assert_eq!(points.last(), Some(&[40.0, 10.0 + 60.0]));

        let path = agent.path().expect("route is a valid polyline");
        // 40 m approach + ~14.1 m to the north exit + 60 m exit leg.
        assert_relative_eq!(path.length(), 40.0 + 200.0f64.sqrt() + 60.0, epsilon = 1e-9);
    }

    #[test]
    fn alternate_exit_route_diverges_after_the_approach() {
        let agent = junction_agent();
        let east = agent.path_points_via_exit(0).expect("exit 0 exists");
        assert_eq!(&east[..2], &[[0.0, 0.0], [40.0, 0.0]]);
        assert_eq!(east.last(), Some(&[50.0 + 60.0, 0.0]));

        assert!(agent.path_points_via_exit(5).is_none());
    }

    #[test]
    fn total_time_scales_with_speed() {
        let agent = RouteAgent {
            id: 2,
            speed: 5.0,
            plan: RoutePlan::LaneFollow {
                lane_id: "lane".into(),
                centerline: vec![[0.0, 0.0], [100.0, 0.0]],
            },
        };
        assert_relative_eq!(agent.total_time(), 20.0);

        let stopped = RouteAgent { speed: 0.0, ..agent };
        assert_relative_eq!(stopped.total_time(), 0.0);
    }
}
