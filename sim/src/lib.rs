//! `sim` — Synthetic evaluation scenes: route agents, feature-record
//! generation, dataset persistence.

pub mod agent;
pub mod dataset;
pub mod feature_gen;
pub mod scenarios;

pub use agent::{ExitSpec, RouteAgent, RoutePlan};
pub use dataset::{load_dataset, save_dataset, FeatureDataset};
pub use feature_gen::{generate_dataset, PredictionModel};
pub use scenarios::{Scenario, ScenarioKind};
