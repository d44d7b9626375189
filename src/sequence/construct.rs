//! Initial tour construction.

use super::evaluator::RouteProblem;
use super::types::{StopCondition, Violation};

/// Construction stopped before every stop was placed or rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

/// Nearest-neighbour tour: start at the depot and repeatedly move to the
/// closest unvisited stop. Ties go to the lower stop index.
///
/// Time windows are ignored.
///
/// # Examples
///
/// ```
/// use u_fleet::matrix::TravelMatrix;
/// use u_fleet::models::GeoPoint;
/// use u_fleet::sequence::{nearest_neighbor, RouteProblem, StopSpec};
///
/// let pts = [GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0), GeoPoint::new(1.0, 1.0)];
/// let matrix = TravelMatrix::planar(&pts, 1.0);
/// let stops: Vec<StopSpec> = (1..3)
///     .map(|node| StopSpec { order_id: format!("P{node}"), node, weight: 1.0, volume: 0.0, window: None })
///     .collect();
/// let problem = RouteProblem::new(&matrix, 0, &stops, 1_800.0, 0.0, true);
///
/// let tour = nearest_neighbor(&problem);
/// assert_eq!(tour, vec![0, 1]);
/// assert!((problem.length(&tour) - (2.0 + 2f64.sqrt())).abs() < 1e-12);
/// ```
pub fn nearest_neighbor(problem: &RouteProblem<'_>) -> Vec<usize> {
    let n = problem.len();
    let mut visited = vec![false; n];
    let mut tour = Vec::with_capacity(n);
    let mut current = 0; // local index of the depot

    for _ in 0..n {
        let mut best: Option<(usize, f64)> = None;
        for s in (0..n).filter(|&s| !visited[s]) {
            let d = problem.arc(current, s + 1);
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((s, d));
            }
        }
        let Some((s, _)) = best else { break };
        visited[s] = true;
        tour.push(s);
        current = s + 1;
    }
    tour
}

/// Window-aware cheapest-arc construction.
///
/// The route is extended from its last stop along the shortest arc that
/// keeps the appended stop on time. Stops that can never be appended are
/// then tried at their cheapest feasible insertion point; the remainder are
/// rejected with the violation they would cause at the end of the route.
///
/// Returns a feasible tour and the rejected stops, or [`Interrupted`] if the
/// stop condition fires first.
pub fn cheapest_arc(
    problem: &RouteProblem<'_>,
    stop: &StopCondition,
) -> Result<(Vec<usize>, Vec<(usize, Violation)>), Interrupted> {
    let n = problem.len();
    let mut placed = vec![false; n];
    let mut tour: Vec<usize> = Vec::with_capacity(n);
    let mut clock = 0.0;
    let mut current = 0;

    // Path extension
    loop {
        if stop.should_stop() {
            return Err(Interrupted);
        }
        let mut best: Option<(usize, f64, f64)> = None;
        for s in (0..n).filter(|&s| !placed[s]) {
            let arrival = clock + problem.arc_time(current, s + 1);
            let Ok(wait) = problem.check_arrival(s, arrival) else {
                continue;
            };
            let d = problem.arc(current, s + 1);
            if best.map_or(true, |(_, bd, _)| d < bd) {
                best = Some((s, d, arrival + wait + problem.service_time()));
            }
        }
        let Some((s, _, departure)) = best else { break };
        placed[s] = true;
        tour.push(s);
        clock = departure;
        current = s + 1;
    }

    // Insertion for the leftovers
    let mut rejected = Vec::new();
    for s in 0..n {
        if placed[s] {
            continue;
        }
        if stop.should_stop() {
            return Err(Interrupted);
        }
        match cheapest_insertion(problem, &tour, s) {
            Some(pos) => {
                tour.insert(pos, s);
                placed[s] = true;
            }
            None => {
                let mut probe = tour.clone();
                probe.push(s);
                let violation = problem
                    .schedule(&probe)
                    .violation
                    .map(|(_, v)| v)
                    .unwrap_or(Violation::Late {
                        arrival: f64::INFINITY,
                        end: 0.0,
                    });
                rejected.push((s, violation));
            }
        }
    }

    Ok((tour, rejected))
}

/// Position where inserting `s` keeps the tour feasible at least added length.
fn cheapest_insertion(problem: &RouteProblem<'_>, tour: &[usize], s: usize) -> Option<usize> {
    let base = problem.length(tour);
    let mut best: Option<(usize, f64)> = None;
    let mut candidate = Vec::with_capacity(tour.len() + 1);
    for pos in 0..=tour.len() {
        candidate.clear();
        candidate.extend_from_slice(&tour[..pos]);
        candidate.push(s);
        candidate.extend_from_slice(&tour[pos..]);
        if !problem.is_feasible(&candidate) {
            continue;
        }
        let added = problem.length(&candidate) - base;
        if best.map_or(true, |(_, b)| added < b) {
            best = Some((pos, added));
        }
    }
    best.map(|(pos, _)| pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::TravelMatrix;
    use crate::models::{GeoPoint, TimeWindow};
    use crate::sequence::StopSpec;
    use std::time::{Duration, Instant};

    fn line_problem_stops(windows: &[Option<(f64, f64)>]) -> (TravelMatrix, Vec<StopSpec>) {
        // depot at x=0, stops at x=1..=n, unit speed.
        let pts: Vec<GeoPoint> = (0..=windows.len()).map(|i| GeoPoint::new(0.0, i as f64)).collect();
        let m = TravelMatrix::planar(&pts, 1.0);
        let stops = windows
            .iter()
            .enumerate()
            .map(|(i, w)| StopSpec {
                order_id: format!("S{i}"),
                node: i + 1,
                weight: 1.0,
                volume: 0.0,
                window: w.and_then(|(a, b)| TimeWindow::new(a, b)),
            })
            .collect();
        (m, stops)
    }

    fn open_ended() -> StopCondition {
        StopCondition::new(Instant::now() + Duration::from_secs(60), None)
    }

    #[test]
    fn test_nearest_neighbor_visits_all() {
        let (m, stops) = line_problem_stops(&[None, None, None, None]);
        let p = RouteProblem::new(&m, 0, &stops, 1_800.0, 0.0, true);
        assert_eq!(nearest_neighbor(&p), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_nearest_neighbor_empty() {
        let (m, stops) = line_problem_stops(&[]);
        let p = RouteProblem::new(&m, 0, &stops, 1_800.0, 0.0, true);
        assert!(nearest_neighbor(&p).is_empty());
    }

    #[test]
    fn test_cheapest_arc_respects_windows() {
        // S2 at x=3 must be reached by t=3.5.
        let (m, stops) = line_problem_stops(&[None, None, Some((0.0, 3.5))]);
        let p = RouteProblem::new(&m, 0, &stops, 1_800.0, 0.0, true);
        let (tour, rejected) = cheapest_arc(&p, &open_ended()).unwrap();
        assert!(rejected.is_empty());
        assert_eq!(tour.len(), 3);
        assert!(p.is_feasible(&tour));
    }

    #[test]
    fn test_cheapest_arc_rejects_impossible() {
        // S0 at x=1 closes before the vehicle can possibly arrive.
        let (m, stops) = line_problem_stops(&[Some((0.0, 0.5)), None]);
        let p = RouteProblem::new(&m, 0, &stops, 1_800.0, 0.0, true);
        let (tour, rejected) = cheapest_arc(&p, &open_ended()).unwrap();
        assert_eq!(tour, vec![1]);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].0, 0);
        assert!(matches!(rejected[0].1, Violation::Late { .. }));
    }

    #[test]
    fn test_cheapest_arc_defers_late_window() {
        // S1 opens late and the wait limit is short, so it can only follow
        // the stops further out.
        let (m, stops) = line_problem_stops(&[None, Some((8.0, 20.0)), None, None, None, None, None, None]);
        let p = RouteProblem::new(&m, 0, &stops, 2.0, 0.0, true);
        let (tour, rejected) = cheapest_arc(&p, &open_ended()).unwrap();
        assert!(rejected.is_empty());
        assert_eq!(tour.len(), 8);
        assert!(p.is_feasible(&tour));
    }

    #[test]
    fn test_cheapest_arc_interrupted() {
        let (m, stops) = line_problem_stops(&[None, None]);
        let p = RouteProblem::new(&m, 0, &stops, 1_800.0, 0.0, true);
        let expired = StopCondition::new(Instant::now(), None);
        assert_eq!(cheapest_arc(&p, &expired), Err(Interrupted));
    }
}
