//! Dataset persistence: recorded feature datasets as JSON files.

use anyhow::{Context, Result};
use eval_core::types::FeatureRecord;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// A recorded batch of feature records with true future status.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeatureDataset {
    pub name: String,
    pub seed: u64,
    /// Seconds between frames at recording time
    pub frame_dt: f64,
    /// All records in chronological order
    pub records: Vec<FeatureRecord>,
}

/// Write a dataset to a JSON file.
pub fn save_dataset(dataset: &FeatureDataset, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating dataset file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), dataset)
        .with_context(|| format!("writing dataset {}", path.display()))?;
    Ok(())
}

/// Read a dataset back from a JSON file.
pub fn load_dataset(path: &Path) -> Result<FeatureDataset> {
    let file =
        File::open(path).with_context(|| format!("opening dataset file {}", path.display()))?;
    let dataset = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing dataset {}", path.display()))?;
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature_gen::{generate_dataset, PredictionModel};
    use crate::scenarios::{Scenario, ScenarioKind};

    #[test]
    fn saved_datasets_load_back_identically() {
        let scenario = Scenario::build(ScenarioKind::MixedTraffic, 13);
        let dataset = generate_dataset(&scenario, PredictionModel::Noisy, 13);

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("mixed_traffic.json");
        save_dataset(&dataset, &path).expect("save succeeds");

        let loaded = load_dataset(&path).expect("load succeeds");
        assert_eq!(loaded.name, dataset.name);
        assert_eq!(loaded.seed, dataset.seed);
        assert_eq!(loaded.records.len(), dataset.records.len());

        for (a, b) in loaded.records.iter().zip(&dataset.records) {
            assert_eq!(a.obstacle_id, b.obstacle_id);
            assert_eq!(a.timestamp, b.timestamp);
            assert_eq!(a.future_states, b.future_states);
            assert_eq!(
                a.predicted_trajectories.len(),
                b.predicted_trajectories.len()
            );
        }
    }

    #[test]
    fn loading_a_missing_file_fails_with_context() {
        let err = load_dataset(Path::new("/nonexistent/dataset.json"))
            .expect_err("missing file must not load");
        assert!(err.to_string().contains("dataset"), "error names the file role: {err}");
    }

    #[test]
    fn loading_garbage_fails() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("garbage.json");
        std::fs::write(&path, b"{ not json ").expect("write garbage");

        assert!(load_dataset(&path).is_err());
    }
}
