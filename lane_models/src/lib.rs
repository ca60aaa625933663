//! `lane_models` — Lane centerline and junction-exit geometry models.

pub mod centerline;
pub mod junction;

pub use centerline::{Centerline, FrenetCoord};
pub use junction::{select_taken_exit, ExitCandidate};
