use criterion::{black_box, criterion_group, criterion_main, Criterion};
use eval_core::{
    EvaluationConfig, EvaluationPipeline, FeatureRecord, FutureState, LaneSnapshot,
    ObstacleContainer, ObstacleId, PredictedTrajectory, TrajectoryPoint,
};

/// One on-lane record per obstacle, each with a 4 s future and a slightly
/// offset constant-velocity prediction.
fn make_records(n_obstacles: usize) -> Vec<FeatureRecord> {
    (0..n_obstacles)
        .map(|i| {
            let y = i as f64 * 3.5;
            let future: Vec<FutureState> = (1..=8)
                .map(|k| {
                    let dt = k as f64 * 0.5;
                    FutureState { timestamp: dt, position: [12.0 * dt, y] }
                })
                .collect();
            let points: Vec<TrajectoryPoint> = (1..=8)
                .map(|k| {
                    let dt = k as f64 * 0.5;
                    TrajectoryPoint { relative_time: dt, position: [12.0 * dt + 0.5, y + 0.4] }
                })
                .collect();
            FeatureRecord {
                obstacle_id: ObstacleId(i as u64),
                timestamp: 0.0,
                position: [0.0, y],
                velocity: [12.0, 0.0],
                theta: 0.0,
                lane: Some(LaneSnapshot {
                    lane_id: format!("lane_{i}"),
                    centerline: (0..=30).map(|k| [k as f64 * 10.0, y]).collect(),
                }),
                junction: None,
                future_states: future,
                predicted_trajectories: vec![PredictedTrajectory { probability: 0.9, points }],
            }
        })
        .collect()
}

fn bench_evaluate(c: &mut Criterion) {
    let pipeline =
        EvaluationPipeline::new(EvaluationConfig::default()).expect("default config is valid");

    let mut group = c.benchmark_group("evaluate");
    for n in [10usize, 100, 1000] {
        let records = make_records(n);
        group.bench_function(format!("{n}_obstacles"), |b| {
            b.iter(|| {
                let mut container = ObstacleContainer::new();
                black_box(pipeline.evaluate(&mut container, records.iter().cloned()))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate);
criterion_main!(benches);
