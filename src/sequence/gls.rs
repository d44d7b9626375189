//! Guided local search over feasible tours.
//!
//! Descends with 2-opt and relocate moves on an augmented cost
//! `length + λ·Σ penalty(arc)`. At each local optimum the arcs with the
//! highest utility `cost / (1 + penalty)` are penalized, pushing the search
//! out of the basin. Only moves that keep every time window satisfied are
//! accepted, so the incumbent is always a valid tour and the search can be
//! stopped at any point.
//!
//! # References
//!
//! - Voudouris & Tsang (1999), "Guided local search and its application to
//!   the traveling salesman problem"

use super::config::GlsConfig;
use super::evaluator::RouteProblem;
use super::operators::{relocate, two_opt};
use super::types::{SearchOutcome, StopCondition};

const EPS: f64 = 1e-9;

struct Search<'p, 'a> {
    problem: &'p RouteProblem<'a>,
    size: usize,
    penalties: Vec<u32>,
    lambda: f64,
    best: Vec<usize>,
    best_cost: f64,
}

impl Search<'_, '_> {
    fn augmented(&self, tour: &[usize]) -> f64 {
        let penalty: u32 = self
            .problem
            .arcs(tour)
            .iter()
            .map(|&(a, b)| self.penalties[a * self.size + b])
            .sum();
        self.problem.length(tour) + self.lambda * penalty as f64
    }

    fn record(&mut self, tour: &[usize]) {
        let cost = self.problem.length(tour);
        if cost < self.best_cost - EPS {
            self.best = tour.to_vec();
            self.best_cost = cost;
        }
    }

    /// First-improvement descent. Returns `false` when stopped early.
    fn descend(&mut self, current: &mut Vec<usize>, stop: &StopCondition) -> bool {
        let n = current.len();
        'improve: loop {
            let current_aug = self.augmented(current);

            for i in 0..n {
                if stop.should_stop() {
                    return false;
                }
                for j in (i + 1)..n {
                    let candidate = two_opt(current, i, j);
                    if self.accepts(&candidate, current_aug) {
                        *current = candidate;
                        self.record(current);
                        continue 'improve;
                    }
                }
                for to in (0..n).filter(|&to| to != i) {
                    let candidate = relocate(current, i, to);
                    if self.accepts(&candidate, current_aug) {
                        *current = candidate;
                        self.record(current);
                        continue 'improve;
                    }
                }
            }
            return true;
        }
    }

    fn accepts(&self, candidate: &[usize], current_aug: f64) -> bool {
        self.augmented(candidate) < current_aug - EPS && self.problem.is_feasible(candidate)
    }

    fn penalize(&mut self, tour: &[usize]) {
        let arcs = self.problem.arcs(tour);
        let utility = |&(a, b): &(usize, usize)| {
            self.problem.arc(a, b) / (1.0 + self.penalties[a * self.size + b] as f64)
        };
        let max_util = arcs.iter().map(utility).fold(0.0f64, f64::max);
        let targets: Vec<(usize, usize)> = arcs
            .iter()
            .filter(|arc| utility(arc) >= max_util - EPS)
            .copied()
            .collect();
        for (a, b) in targets {
            self.penalties[a * self.size + b] += 1;
        }
    }
}

/// Improves a feasible `initial` tour until `config.max_rounds` penalization
/// rounds have run or `stop` fires. Returns the shortest feasible tour seen.
pub fn guided_local_search(
    problem: &RouteProblem<'_>,
    initial: Vec<usize>,
    config: &GlsConfig,
    stop: &StopCondition,
) -> SearchOutcome {
    let best_cost = problem.length(&initial);
    if initial.len() < 2 {
        return SearchOutcome {
            tour: initial,
            cost: best_cost,
            iterations: 0,
            interrupted: false,
        };
    }

    let size = problem.len() + 1;
    let mut search = Search {
        problem,
        size,
        penalties: vec![0; size * size],
        lambda: 0.0,
        best: initial.clone(),
        best_cost,
    };
    let mut current = initial;
    let mut rounds = 0;
    let mut interrupted = false;

    loop {
        if !search.descend(&mut current, stop) {
            interrupted = true;
            break;
        }
        if rounds >= config.max_rounds {
            break;
        }
        if rounds == 0 {
            let local_opt = problem.length(&current);
            search.lambda = config.lambda * local_opt / problem.arcs(&current).len() as f64;
            if search.lambda <= 0.0 {
                break;
            }
        }
        search.penalize(&current);
        rounds += 1;
    }

    SearchOutcome {
        tour: search.best,
        cost: search.best_cost,
        iterations: rounds,
        interrupted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::TravelMatrix;
    use crate::models::{GeoPoint, TimeWindow};
    use crate::sequence::StopSpec;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn circle(n: usize) -> (TravelMatrix, Vec<StopSpec>) {
        // depot at the centre, stops on a circle.
        let mut pts = vec![GeoPoint::new(0.0, 0.0)];
        for k in 0..n {
            let a = 2.0 * std::f64::consts::PI * k as f64 / n as f64;
            pts.push(GeoPoint::new(a.sin() * 10.0, a.cos() * 10.0));
        }
        let m = TravelMatrix::planar(&pts, 1.0);
        let stops = (0..n)
            .map(|k| StopSpec {
                order_id: format!("C{k}"),
                node: k + 1,
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
    fn test_improves_scrambled_tour() {
        let (m, stops) = circle(10);
        let p = RouteProblem::new(&m, 0, &stops, 1_800.0, 0.0, true);
        let scrambled = vec![0, 5, 2, 7, 4, 9, 6, 1, 8, 3];
        let start = p.length(&scrambled);
        let out = guided_local_search(&p, scrambled, &GlsConfig::default(), &budget());
        assert!(out.cost < start);
        // Optimal: around the circle, 9 chords plus two radii.
        let chord = 2.0 * 10.0 * (std::f64::consts::PI / 10.0).sin();
        assert!(out.cost <= 9.0 * chord + 20.0 + 1e-6);
        assert!(!out.interrupted);
    }

    #[test]
    fn test_keeps_windows_feasible() {
        let (m, mut stops) = circle(8);
        // The stop opposite the natural start must be served early.
        stops[4].window = TimeWindow::new(0.0, 12.0);
        let p = RouteProblem::new(&m, 0, &stops, 1_800.0, 0.0, true);
        let initial = vec![4, 5, 6, 7, 0, 1, 2, 3];
        assert!(p.is_feasible(&initial));
        let out = guided_local_search(&p, initial, &GlsConfig::default(), &budget());
        assert!(p.is_feasible(&out.tour));
        assert_eq!(out.tour[0], 4);
    }

    #[test]
    fn test_cancelled_returns_initial_feasible() {
        let (m, stops) = circle(12);
        let p = RouteProblem::new(&m, 0, &stops, 1_800.0, 0.0, true);
        let flag = Arc::new(AtomicBool::new(true));
        let stop = StopCondition::new(Instant::now() + Duration::from_secs(10), Some(flag));
        let initial: Vec<usize> = (0..12).rev().collect();
        let out = guided_local_search(&p, initial.clone(), &GlsConfig::default(), &stop);
        assert!(out.interrupted);
        assert_eq!(out.tour, initial);
    }

    #[test]
    fn test_trivial_tours() {
        let (m, stops) = circle(1);
        let p = RouteProblem::new(&m, 0, &stops, 1_800.0, 0.0, true);
        let out = guided_local_search(&p, vec![0], &GlsConfig::default(), &budget());
        assert_eq!(out.tour, vec![0]);
        assert!((out.cost - 20.0).abs() < 1e-9);
    }
}
