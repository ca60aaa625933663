//! Obstacle store: per-id feature history and motion-context predicates.
//!
//! Obstacles accumulate feature records in arrival order. Every decision
//! taken downstream (context classification, scoring) reads the latest
//! record only; the bounded history is kept for diagnostics.

use crate::types::{FeatureRecord, FutureState, ObstacleId, PredictedTrajectory};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use tracing::trace;

/// Maximum number of feature records kept per obstacle.
const FEATURE_HISTORY_LEN: usize = 100;

/// The accumulated view of one obstacle, newest record last.
#[derive(Clone, Debug)]
pub struct Obstacle {
    id: ObstacleId,
    history: VecDeque<FeatureRecord>,
}

impl Obstacle {
    fn new(record: FeatureRecord) -> Self {
        let id = record.obstacle_id;
        let mut history = VecDeque::with_capacity(8);
        history.push_back(record);
        Self { id, history }
    }

    /// Merge one more record. Stale timestamps are dropped; a repeated
    /// timestamp replaces the latest record, since `(id, timestamp)` is the
    /// record identity.
    fn merge(&mut self, record: FeatureRecord) {
        let latest_ts = self.latest().timestamp;
        if record.timestamp < latest_ts {
            trace!(
                obstacle = %self.id,
                ts = record.timestamp,
                latest = latest_ts,
                "dropping stale feature record"
            );
            return;
        }
        if record.timestamp == latest_ts {
            self.history.pop_back();
        }
        self.history.push_back(record);
        if self.history.len() > FEATURE_HISTORY_LEN {
            self.history.pop_front();
        }
    }

    pub fn id(&self) -> ObstacleId {
        self.id
    }

    /// Latest observed snapshot.
    pub fn latest(&self) -> &FeatureRecord {
        self.history.back().expect("obstacle history is never empty")
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// True when the latest snapshot puts the obstacle on a lane with a
    /// usable centerline.
    pub fn is_on_lane(&self) -> bool {
        self.latest()
            .lane
            .as_ref()
            .map_or(false, |lane| lane.centerline.len() >= 2)
    }

    /// True when the latest snapshot carries a junction context with at least
    /// one topological exit.
    pub fn has_junction_context_with_exits(&self) -> bool {
        self.latest()
            .junction
            .as_ref()
            .map_or(false, |junction| !junction.exits.is_empty())
    }

    /// True future positions recorded for the latest snapshot.
    pub fn true_future(&self) -> &[FutureState] {
        &self.latest().future_states
    }

    /// Trajectories the predictor produced for the latest snapshot.
    pub fn predicted_trajectories(&self) -> &[PredictedTrajectory] {
        &self.latest().predicted_trajectories
    }
}

/// Insert-or-merge store of all obstacles seen during an evaluation pass.
#[derive(Debug, Default)]
pub struct ObstacleContainer {
    obstacles: HashMap<ObstacleId, Obstacle>,
}

impl ObstacleContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, merging into the existing obstacle with the same id.
    pub fn insert_record(&mut self, record: FeatureRecord) {
        match self.obstacles.entry(record.obstacle_id) {
            Entry::Occupied(mut entry) => entry.get_mut().merge(record),
            Entry::Vacant(entry) => {
                entry.insert(Obstacle::new(record));
            }
        }
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(&id)
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.obstacles.values()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{JunctionExit, JunctionSnapshot, LaneSnapshot};

    fn record(id: u64, ts: f64) -> FeatureRecord {
        FeatureRecord {
            obstacle_id: ObstacleId(id),
            timestamp: ts,
            position: [ts, 0.0],
            velocity: [1.0, 0.0],
            theta: 0.0,
            lane: None,
            junction: None,
            future_states: vec![],
            predicted_trajectories: vec![],
        }
    }

    #[test]
    fn inserts_then_merges_by_id() {
        let mut container = ObstacleContainer::new();
        container.insert_record(record(1, 0.0));
        container.insert_record(record(1, 0.5));
        container.insert_record(record(2, 0.5));

        assert_eq!(container.len(), 2);
        let obstacle = container.get(ObstacleId(1)).expect("obstacle 1 present");
        assert_eq!(obstacle.history_len(), 2);
        assert_eq!(obstacle.latest().timestamp, 0.5);
    }

    #[test]
    fn stale_records_are_dropped() {
        let mut container = ObstacleContainer::new();
        container.insert_record(record(1, 1.0));
        container.insert_record(record(1, 0.5));

        let obstacle = container.get(ObstacleId(1)).expect("obstacle 1 present");
        assert_eq!(obstacle.history_len(), 1);
        assert_eq!(obstacle.latest().timestamp, 1.0);
    }

    #[test]
    fn repeated_timestamp_replaces_latest() {
        let mut container = ObstacleContainer::new();
        container.insert_record(record(1, 1.0));

        let mut updated = record(1, 1.0);
        updated.position = [99.0, 0.0];
        container.insert_record(updated);

        let obstacle = container.get(ObstacleId(1)).expect("obstacle 1 present");
        assert_eq!(obstacle.history_len(), 1);
        assert_eq!(obstacle.latest().position, [99.0, 0.0]);
    }

    #[test]
    fn history_is_bounded() {
        let mut container = ObstacleContainer::new();
        for k in 0..150 {
            container.insert_record(record(1, k as f64 * 0.1));
        }
        let obstacle = container.get(ObstacleId(1)).expect("obstacle 1 present");
        assert_eq!(obstacle.history_len(), FEATURE_HISTORY_LEN);
    }

    #[test]
    fn context_predicates_read_the_latest_record() {
        let mut container = ObstacleContainer::new();

        let mut lane_record = record(1, 0.0);
        lane_record.lane = Some(LaneSnapshot {
            lane_id: "lane_a".into(),
            centerline: vec![[0.0, 0.0], [10.0, 0.0]],
        });
        container.insert_record(lane_record);

        let obstacle = container.get(ObstacleId(1)).expect("obstacle 1 present");
        assert!(obstacle.is_on_lane());
        assert!(!obstacle.has_junction_context_with_exits());

        // The next record moves the obstacle into a junction.
        let mut junction_record = record(1, 0.5);
        junction_record.junction = Some(JunctionSnapshot {
            junction_id: "j1".into(),
            exits: vec![JunctionExit {
                exit_lane_id: "exit_e".into(),
                position: [10.0, 0.0],
                heading: 0.0,
            }],
        });
        container.insert_record(junction_record);

        let obstacle = container.get(ObstacleId(1)).expect("obstacle 1 present");
        assert!(!obstacle.is_on_lane());
        assert!(obstacle.has_junction_context_with_exits());
    }

    #[test]
    fn degenerate_contexts_do_not_classify() {
        let mut container = ObstacleContainer::new();

        let mut r = record(1, 0.0);
        r.lane = Some(LaneSnapshot { lane_id: "stub".into(), centerline: vec![[0.0, 0.0]] });
        r.junction = Some(JunctionSnapshot { junction_id: "empty".into(), exits: vec![] });
        container.insert_record(r);

        let obstacle = container.get(ObstacleId(1)).expect("obstacle 1 present");
        assert!(!obstacle.is_on_lane(), "single-point centerline is unusable");
        assert!(
            !obstacle.has_junction_context_with_exits(),
            "junction without exits is unusable"
        );
    }
}
