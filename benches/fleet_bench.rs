//! Criterion benchmarks for u-fleet sequencing and planning.
//!
//! Uses synthetic instances (stops scattered on a square, unit speed) so the
//! numbers reflect search overhead rather than travel-provider latency.

use std::time::{Duration, Instant};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use u_fleet::cluster::{ClusterConfig, ClusterMethod};
use u_fleet::matrix::TravelMatrix;
use u_fleet::models::{GeoPoint, Order, Vehicle};
use u_fleet::planner::{FleetPlanner, PlannerConfig};
use u_fleet::random::create_rng;
use u_fleet::sequence::{
    anneal, cheapest_arc, evolve, guided_local_search, nearest_neighbor, AnnealConfig, GeneticConfig, GlsConfig,
    RouteProblem, SequencerConfig, StopCondition, StopSpec,
};

// ===========================================================================
// Instances
// ===========================================================================

fn instance(n: usize, seed: u64) -> (TravelMatrix, Vec<StopSpec>) {
    let mut rng = create_rng(seed);
    let mut pts = vec![GeoPoint::new(50.0, 50.0)];
    pts.extend((0..n).map(|_| GeoPoint::new(rng.random_range(0.0..100.0), rng.random_range(0.0..100.0))));
    let matrix = TravelMatrix::planar(&pts, 1.0);
    let stops = (0..n)
        .map(|k| StopSpec {
            order_id: format!("S{k}"),
            node: k + 1,
            weight: 1.0,
            volume: 0.0,
            window: None,
        })
        .collect();
    (matrix, stops)
}

fn budget() -> StopCondition {
    StopCondition::new(Instant::now() + Duration::from_secs(60), None)
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("construction");
    group.sample_size(10);

    for &n in &[20usize, 50, 100] {
        let (matrix, stops) = instance(n, 42);
        let problem = RouteProblem::new(&matrix, 0, &stops, 1_800.0, 0.0, true);
        group.bench_with_input(BenchmarkId::new("nearest_neighbor", n), &problem, |b, p| {
            b.iter(|| black_box(nearest_neighbor(black_box(p))))
        });
        group.bench_with_input(BenchmarkId::new("cheapest_arc", n), &problem, |b, p| {
            b.iter(|| black_box(cheapest_arc(black_box(p), &budget())))
        });
    }
    group.finish();
}

fn bench_gls(c: &mut Criterion) {
    let mut group = c.benchmark_group("guided_local_search");
    group.sample_size(10);

    for &n in &[20usize, 50] {
        let (matrix, stops) = instance(n, 42);
        let problem = RouteProblem::new(&matrix, 0, &stops, 1_800.0, 0.0, true);
        let initial = nearest_neighbor(&problem);
        let config = GlsConfig {
            max_rounds: 20,
            ..GlsConfig::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(n), &problem, |b, p| {
            b.iter(|| black_box(guided_local_search(p, initial.clone(), &config, &budget())))
        });
    }
    group.finish();
}

fn bench_anneal(c: &mut Criterion) {
    let mut group = c.benchmark_group("anneal");
    group.sample_size(10);

    for &n in &[20usize, 50, 100] {
        let (matrix, stops) = instance(n, 42);
        let problem = RouteProblem::new(&matrix, 0, &stops, 1_800.0, 0.0, true);
        let initial = nearest_neighbor(&problem);
        let config = AnnealConfig::default();
        group.bench_with_input(BenchmarkId::from_parameter(n), &problem, |b, p| {
            b.iter(|| {
                let mut rng = create_rng(42);
                black_box(anneal(p, initial.clone(), &config, &mut rng, &budget()))
            })
        });
    }
    group.finish();
}

fn bench_genetic(c: &mut Criterion) {
    let mut group = c.benchmark_group("genetic");
    group.sample_size(10);

    for &n in &[20usize, 50] {
        let (matrix, stops) = instance(n, 42);
        let problem = RouteProblem::new(&matrix, 0, &stops, 1_800.0, 0.0, true);
        let initial = nearest_neighbor(&problem);
        let config = GeneticConfig {
            population_size: 40,
            generations: 50,
            parallel: false,
            ..GeneticConfig::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(n), &problem, |b, p| {
            b.iter(|| {
                let mut rng = create_rng(42);
                black_box(evolve(p, initial.clone(), &config, &mut rng, &budget()))
            })
        });
    }
    group.finish();
}

fn bench_planner(c: &mut Criterion) {
    let mut group = c.benchmark_group("planner");
    group.sample_size(10);

    for &n in &[50usize, 150] {
        let mut rng = create_rng(7);
        let orders: Vec<Order> = (0..n)
            .map(|i| {
                Order::new(
                    format!("P{i}"),
                    rng.random_range(1.0..30.0),
                    -23.5 - rng.random_range(0.0..0.2),
                    -46.6 - rng.random_range(0.0..0.2),
                )
            })
            .collect();
        let fleet: Vec<Vehicle> = (0..5)
            .map(|i| Vehicle::new(format!("V{i}"), 400.0, 10.0, -23.6, -46.7))
            .collect();
        let config = PlannerConfig::fast()
            .with_cluster(ClusterConfig::default().with_method(ClusterMethod::Centroid { k: 5 }))
            .with_sequencer(SequencerConfig::fast().with_seed(42));
        let planner = FleetPlanner::new(config);
        group.bench_with_input(BenchmarkId::from_parameter(n), &(orders, fleet), |b, (o, f)| {
            b.iter(|| black_box(planner.solve(black_box(o), black_box(f))))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_construction,
    bench_gls,
    bench_anneal,
    bench_genetic,
    bench_planner
);
criterion_main!(benches);
