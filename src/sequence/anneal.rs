//! Simulated annealing on a single tour.

use rand::Rng;

use super::config::AnnealConfig;
use super::evaluator::RouteProblem;
use super::operators::swap_mutation;
use super::types::{SearchOutcome, StopCondition};

/// Anneals `initial` with pairwise swaps, Metropolis acceptance and
/// geometric cooling until the temperature reaches its floor or `stop` fires.
///
/// The cost is the penalized tour length, so tours that break a time window
/// are accepted only while the temperature is high enough to climb out of
/// them. The returned tour may still need window repair.
pub fn anneal<R: Rng>(
    problem: &RouteProblem<'_>,
    initial: Vec<usize>,
    config: &AnnealConfig,
    rng: &mut R,
    stop: &StopCondition,
) -> SearchOutcome {
    let mut current_cost = problem.penalized_cost(&initial);
    let mut current = initial;
    let mut best = current.clone();
    let mut best_cost = current_cost;
    let mut iterations = 0usize;
    let mut interrupted = false;

    if current.len() < 2 {
        return SearchOutcome {
            tour: best,
            cost: best_cost,
            iterations,
            interrupted,
        };
    }

    let mut temperature = config.initial_temperature;
    while temperature > config.min_temperature {
        if stop.should_stop() {
            interrupted = true;
            break;
        }

        for _ in 0..config.iterations_per_temperature {
            let mut neighbor = current.clone();
            swap_mutation(&mut neighbor, rng);
            let neighbor_cost = problem.penalized_cost(&neighbor);
            let delta = neighbor_cost - current_cost;

            // Metropolis acceptance criterion
            let accept = delta < 0.0 || rng.random_range(0.0..1.0) < (-delta / temperature).exp();
            if accept {
                current = neighbor;
                current_cost = neighbor_cost;
                if current_cost < best_cost {
                    best = current.clone();
                    best_cost = current_cost;
                }
            }
            iterations += 1;
        }

        temperature *= config.cooling_rate;
    }

    SearchOutcome {
        tour: best,
        cost: best_cost,
        iterations,
        interrupted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::TravelMatrix;
    use crate::models::GeoPoint;
    use crate::random::create_rng;
    use crate::sequence::StopSpec;
    use std::time::{Duration, Instant};

    fn grid() -> (TravelMatrix, Vec<StopSpec>) {
        let mut pts = vec![GeoPoint::new(0.0, 0.0)];
        for i in 0..3 {
            for j in 0..3 {
                if i + j > 0 {
                    pts.push(GeoPoint::new(i as f64 * 100.0, j as f64 * 100.0));
                }
            }
        }
        let m = TravelMatrix::planar(&pts, 10.0);
        let stops = (1..pts.len())
            .map(|node| StopSpec {
                order_id: format!("G{node}"),
                node,
                weight: 1.0,
                volume: 0.0,
                window: None,
            })
            .collect();
        (m, stops)
    }

    fn budget() -> StopCondition {
        StopCondition::new(Instant::now() + Duration::from_secs(10), None)
    }

    #[test]
    fn test_never_worse_than_initial() {
        let (m, stops) = grid();
        let p = RouteProblem::new(&m, 0, &stops, 1_800.0, 0.0, true);
        let initial = vec![7, 0, 5, 2, 6, 1, 4, 3];
        let start = p.length(&initial);
        let out = anneal(&p, initial, &AnnealConfig::default(), &mut create_rng(42), &budget());
        assert!(out.cost <= start);
        assert_eq!(out.tour.len(), 8);
        assert!(out.iterations > 0);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let (m, stops) = grid();
        let p = RouteProblem::new(&m, 0, &stops, 1_800.0, 0.0, true);
        let initial: Vec<usize> = (0..8).rev().collect();
        let a = anneal(&p, initial.clone(), &AnnealConfig::default(), &mut create_rng(3), &budget());
        let b = anneal(&p, initial, &AnnealConfig::default(), &mut create_rng(3), &budget());
        assert_eq!(a.tour, b.tour);
    }

    #[test]
    fn test_stopped_immediately() {
        let (m, stops) = grid();
        let p = RouteProblem::new(&m, 0, &stops, 1_800.0, 0.0, true);
        let expired = StopCondition::new(Instant::now(), None);
        let initial: Vec<usize> = (0..8).collect();
        let out = anneal(&p, initial.clone(), &AnnealConfig::default(), &mut create_rng(1), &expired);
        assert!(out.interrupted);
        assert_eq!(out.tour, initial);
        assert_eq!(out.iterations, 0);
    }
}
