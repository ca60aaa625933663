//! Junction exit geometry: taken-exit selection and exit-frame decomposition.
//!
//! A junction is reduced to the set of positions and headings at which its
//! exit lanes leave the junction area. The exit an obstacle actually took is
//! inferred from its true future alone, by alignment between the travel
//! direction and the direction towards each exit.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Alignment difference below which two exits are considered tied.
const ALIGNMENT_TIE_EPS: f64 = 1e-9;

/// One topological exit of a junction, reduced to its geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExitCandidate {
    /// Exit position in world coordinates (m)
    pub position: [f64; 2],
    /// Heading of the exit lane at the exit point (radians)
    pub heading: f64,
}

impl ExitCandidate {
    pub fn position_v(&self) -> Vector2<f64> {
        Vector2::new(self.position[0], self.position[1])
    }

    /// Unit direction of the exit heading.
    pub fn direction(&self) -> Vector2<f64> {
        Vector2::new(self.heading.cos(), self.heading.sin())
    }

    /// Split a deviation vector into `(along, across)` components of the exit
    /// frame. `across` is signed positive to the left of the exit heading.
    pub fn decompose(&self, deviation: &Vector2<f64>) -> (f64, f64) {
        let dir = self.direction();
        (dir.dot(deviation), dir.perp(deviation))
    }
}

/// Pick the exit the true trajectory actually took.
///
/// `anchor` is the obstacle position at scoring time and `terminal` the last
/// in-horizon true-future position. The exit maximizing the cosine between
/// `exit - anchor` and `terminal - anchor` wins; near-ties fall back to the
/// smaller terminal-to-exit distance, then to the lower index. Returns `None`
/// only when `exits` is empty.
pub fn select_taken_exit(
    exits: &[ExitCandidate],
    anchor: &Vector2<f64>,
    terminal: &Vector2<f64>,
) -> Option<usize> {
    if exits.is_empty() {
        return None;
    }
    let travel = terminal - anchor;
    let travel_norm = travel.norm();
    if travel_norm <= f64::EPSILON {
        // The obstacle did not move: nearest exit to where it sits.
        return nearest_exit(exits, terminal);
    }
    let travel_dir = travel / travel_norm;

    // (index, alignment, distance of the exit to the terminal point)
    let mut best: Option<(usize, f64, f64)> = None;
    for (idx, exit) in exits.iter().enumerate() {
        let to_exit = exit.position_v() - anchor;
        let norm = to_exit.norm();
        let alignment = if norm <= f64::EPSILON {
            1.0 // the anchor sits on the exit itself
        } else {
            travel_dir.dot(&(to_exit / norm))
        };
        let dist = (exit.position_v() - terminal).norm();
        let better = match best {
            None => true,
            Some((_, best_align, best_dist)) => {
                alignment > best_align + ALIGNMENT_TIE_EPS
                    || ((alignment - best_align).abs() <= ALIGNMENT_TIE_EPS && dist < best_dist)
            }
        };
        if better {
            best = Some((idx, alignment, dist));
        }
    }
    best.map(|(idx, _, _)| idx)
}

fn nearest_exit(exits: &[ExitCandidate], p: &Vector2<f64>) -> Option<usize> {
    exits
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let da = (a.position_v() - p).norm_squared();
            let db = (b.position_v() - p).norm_squared();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(idx, _)| idx)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
