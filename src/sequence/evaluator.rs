//! Tour evaluation: distance, schedule and time-window feasibility.

use super::types::{StopSpec, Violation};
use crate::feedback::ModelSnapshot;
use crate::matrix::TravelMatrix;
use crate::models::{Route, Stop, Vehicle};

/// Timing of one visit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visit {
    pub arrival: f64,
    pub wait: f64,
    pub departure: f64,
}

/// Full evaluation of a tour.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub visits: Vec<Visit>,
    /// Metres, including the return leg for closed tours.
    pub distance: f64,
    /// Seconds from departure to the end of the route.
    pub duration: f64,
    /// First infeasible position and why.
    pub violation: Option<(usize, Violation)>,
    pub violation_count: usize,
}

impl Schedule {
    pub fn is_feasible(&self) -> bool {
        self.violation.is_none()
    }
}

/// A single-vehicle sequencing problem over a shared matrix.
///
/// Tours are permutations of `0..stops.len()`; the depot is implicit at
/// the start and, for closed tours, at the end.
#[derive(Debug, Clone)]
pub struct RouteProblem<'a> {
    matrix: &'a TravelMatrix,
    depot: usize,
    stops: &'a [StopSpec],
    max_wait: f64,
    service_time: f64,
    closed: bool,
    penalty: f64,
}

impl<'a> RouteProblem<'a> {
    pub fn new(
        matrix: &'a TravelMatrix,
        depot: usize,
        stops: &'a [StopSpec],
        max_wait: f64,
        service_time: f64,
        closed: bool,
    ) -> Self {
        let mut longest = 0.0f64;
        let nodes: Vec<usize> = std::iter::once(depot).chain(stops.iter().map(|s| s.node)).collect();
        for &a in &nodes {
            for &b in &nodes {
                longest = longest.max(matrix.distance(a, b));
            }
        }
        Self {
            matrix,
            depot,
            stops,
            max_wait,
            service_time,
            closed,
            // Any window violation outweighs every possible distance difference.
            penalty: longest.max(1.0) * (nodes.len() as f64 + 1.0),
        }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn stops(&self) -> &[StopSpec] {
        self.stops
    }

    pub fn service_time(&self) -> f64 {
        self.service_time
    }

    /// Matrix node of local index `l` (0 = depot, `k + 1` = stop `k`).
    pub fn local_node(&self, l: usize) -> usize {
        if l == 0 {
            self.depot
        } else {
            self.stops[l - 1].node
        }
    }

    /// Distance between local indices.
    pub fn arc(&self, from: usize, to: usize) -> f64 {
        self.matrix.distance(self.local_node(from), self.local_node(to))
    }

    /// Travel time between local indices.
    pub fn arc_time(&self, from: usize, to: usize) -> f64 {
        self.matrix.time(self.local_node(from), self.local_node(to))
    }

    /// Arcs of a tour as local index pairs.
    pub fn arcs(&self, tour: &[usize]) -> Vec<(usize, usize)> {
        let mut arcs = Vec::with_capacity(tour.len() + 1);
        let mut prev = 0;
        for &s in tour {
            arcs.push((prev, s + 1));
            prev = s + 1;
        }
        if self.closed && !tour.is_empty() {
            arcs.push((prev, 0));
        }
        arcs
    }

    /// Tour length in metres.
    pub fn length(&self, tour: &[usize]) -> f64 {
        self.arcs(tour).iter().map(|&(a, b)| self.arc(a, b)).sum()
    }

    /// Checks a single arrival against the stop's window.
    pub fn check_arrival(&self, stop: usize, arrival: f64) -> Result<f64, Violation> {
        let Some(tw) = self.stops[stop].window else {
            return Ok(0.0);
        };
        if tw.is_violated(arrival) {
            return Err(Violation::Late {
                arrival,
                end: tw.end(),
            });
        }
        let wait = tw.waiting_time(arrival);
        if wait > self.max_wait {
            return Err(Violation::ExcessWait {
                wait,
                limit: self.max_wait,
            });
        }
        Ok(wait)
    }

    /// Simulates the tour from departure at time zero.
    ///
    /// An infeasible stop is still visited (arrival without waiting) so the
    /// rest of the schedule stays defined.
    pub fn schedule(&self, tour: &[usize]) -> Schedule {
        let mut visits = Vec::with_capacity(tour.len());
        let mut violation = None;
        let mut violation_count = 0;
        let mut now = 0.0;
        let mut distance = 0.0;
        let mut prev = 0;

        for (pos, &s) in tour.iter().enumerate() {
            let arrival = now + self.arc_time(prev, s + 1);
            distance += self.arc(prev, s + 1);
            let wait = match self.check_arrival(s, arrival) {
                Ok(w) => w,
                Err(v) => {
                    violation_count += 1;
                    violation.get_or_insert((pos, v));
                    0.0
                }
            };
            let departure = arrival + wait + self.service_time;
            visits.push(Visit {
                arrival,
                wait,
                departure,
            });
            now = departure;
            prev = s + 1;
        }

        if self.closed && !tour.is_empty() {
            now += self.arc_time(prev, 0);
            distance += self.arc(prev, 0);
        }

        Schedule {
            visits,
            distance,
            duration: now,
            violation,
            violation_count,
        }
    }

    pub fn is_feasible(&self, tour: &[usize]) -> bool {
        let mut now = 0.0;
        let mut prev = 0;
        for &s in tour {
            let arrival = now + self.arc_time(prev, s + 1);
            match self.check_arrival(s, arrival) {
                Ok(wait) => now = arrival + wait + self.service_time,
                Err(_) => return false,
            }
            prev = s + 1;
        }
        true
    }

    /// Length plus a dominating penalty per window violation.
    pub fn penalized_cost(&self, tour: &[usize]) -> f64 {
        let s = self.schedule(tour);
        s.distance + s.violation_count as f64 * self.penalty
    }

    /// Removes infeasible stops one at a time until the tour is feasible.
    ///
    /// Returns the repaired tour and the removed stops with the violation
    /// observed at removal.
    pub fn repair(&self, tour: &[usize]) -> (Vec<usize>, Vec<(usize, Violation)>) {
        let mut tour = tour.to_vec();
        let mut removed = Vec::new();
        while let Some((pos, v)) = self.schedule(&tour).violation {
            removed.push((tour.remove(pos), v));
        }
        (tour, removed)
    }

    /// Materializes a feasible tour as a [`Route`].
    ///
    /// `total_time` adds the model's predicted delay when a snapshot is given.
    pub fn to_route(&self, vehicle: &Vehicle, tour: &[usize], model: Option<&ModelSnapshot>) -> Route {
        let schedule = self.schedule(tour);
        let mut route = Route::new(vehicle.plate.clone());
        route.closed = self.closed;

        let mut load = 0.0;
        for (&s, visit) in tour.iter().zip(&schedule.visits) {
            load += self.stops[s].weight;
            route.push_stop(Stop {
                order_id: self.stops[s].order_id.clone(),
                arrival: visit.arrival,
                wait: visit.wait,
                departure: visit.departure,
                load_after: load,
            });
        }

        let km = schedule.distance / 1_000.0;
        route.total_distance = schedule.distance;
        route.estimated_time = schedule.duration;
        route.total_time = schedule.duration
            + model.map_or(0.0, |m| m.predicted_delay(schedule.distance, schedule.duration));
        route.total_cost = km * vehicle.cost_per_km;
        route.total_emissions = km * vehicle.emission_kg_per_km;
        route
    }
}
