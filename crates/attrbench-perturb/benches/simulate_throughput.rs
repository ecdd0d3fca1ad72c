use attrbench_core::{AttributionSource, LinearModel, MaskingAdapter, Perturbation, SortOrder};
use attrbench_perturb::{AggregatedCurve, SequentialPerturbation, StepCurve};
use criterion::{criterion_group, criterion_main, Criterion};

const FEATURES: usize = 16;

fn make_inputs() -> (LinearModel, MaskingAdapter, Vec<Vec<f64>>, AttributionSource) {
    let weights: Vec<f64> = (0..FEATURES).map(|j| (j as f64 - 7.5) / 4.0).collect();
    let background: Vec<Vec<f64>> = (0..8)
        .map(|row| (0..FEATURES).map(|j| ((row * j) % 5) as f64 * 0.1).collect())
        .collect();
    let samples: Vec<Vec<f64>> = (0..32)
        .map(|row| (0..FEATURES).map(|j| ((row + 3 * j) % 7) as f64).collect())
        .collect();
    let attributions: Vec<Vec<f64>> = samples
        .iter()
        .map(|sample| sample.iter().zip(&weights).map(|(x, w)| x * w).collect())
        .collect();
    (
        LinearModel::new(weights, 0.25),
        MaskingAdapter::from_background(background).expect("masker"),
        samples,
        AttributionSource::precomputed(attributions),
    )
}

fn bench_simulate(c: &mut Criterion) {
    let (model, masker, samples, source) = make_inputs();
    let sim = SequentialPerturbation::new(&masker, SortOrder::Absolute, Perturbation::Remove)
        .with_silent(true);
    c.bench_function("simulate_remove_absolute", |b| {
        b.iter(|| {
            let _ = sim.score(&model, &samples, &source).expect("score");
        });
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let curves: Vec<StepCurve> = (0..256)
        .map(|idx| StepCurve::new((0..(idx % 40) + 2).map(|v| (v as f64).sin()).collect()))
        .collect();
    c.bench_function("aggregate_256_curves", |b| {
        b.iter(|| {
            let _ = AggregatedCurve::from_curves(&curves).expect("aggregate");
        });
    });
}

criterion_group!(benches, bench_simulate, bench_aggregate);
criterion_main!(benches);
