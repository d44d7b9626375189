//! Sequencing execution across a fleet.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::anneal::anneal;
use super::config::{SequencerConfig, Strategy};
use super::construct::{cheapest_arc, nearest_neighbor};
use super::evaluator::RouteProblem;
use super::genetic::evolve;
use super::gls::guided_local_search;
use super::types::{StopCondition, VehiclePlan, Violation};
use crate::error::{FleetError, Result};
use crate::feedback::ModelSnapshot;
use crate::matrix::TravelMatrix;
use crate::models::{OrderLedger, Route};
use crate::random::create_rng;

const CAPACITY_EPS: f64 = 1e-6;

/// Outcome for one vehicle.
#[derive(Debug, Clone)]
pub struct VehicleSequence {
    pub vehicle_id: String,

    /// `None` when no stop could be sequenced.
    pub route: Option<Route>,

    /// [`FleetError::InfeasibleWindow`] per dropped stop.
    pub unscheduled: Vec<FleetError>,

    /// [`FleetError::SolverTimeout`] when construction did not finish.
    pub timeout: Option<FleetError>,

    /// Orders left unsequenced by the timeout.
    pub timed_out_orders: Vec<String>,

    /// Strategy actually used.
    pub strategy: Strategy,

    /// Search iterations (GLS rounds, SA moves or GA generations).
    pub iterations: usize,

    /// Whether the improvement search was cut short.
    pub interrupted: bool,
}

impl VehicleSequence {
    fn empty(vehicle_id: &str, strategy: Strategy) -> Self {
        Self {
            vehicle_id: vehicle_id.to_string(),
            route: None,
            unscheduled: Vec::new(),
            timeout: None,
            timed_out_orders: Vec::new(),
            strategy,
            iterations: 0,
            interrupted: false,
        }
    }
}

/// Result of sequencing every vehicle.
#[derive(Debug, Clone)]
pub struct SequenceResult {
    /// One entry per plan, in plan order.
    pub vehicles: Vec<VehicleSequence>,
    pub elapsed: Duration,
}

impl SequenceResult {
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.vehicles.iter().filter_map(|v| v.route.as_ref())
    }

    pub fn unscheduled(&self) -> impl Iterator<Item = &FleetError> {
        self.vehicles.iter().flat_map(|v| v.unscheduled.iter())
    }

    pub fn timeouts(&self) -> impl Iterator<Item = &FleetError> {
        self.vehicles.iter().filter_map(|v| v.timeout.as_ref())
    }

    /// Orders left without a route because their vehicle timed out.
    pub fn timed_out_orders(&self) -> impl Iterator<Item = &str> {
        self.vehicles
            .iter()
            .flat_map(|v| v.timed_out_orders.iter().map(String::as_str))
    }

    /// Stops this run did not place on a route.
    pub fn dropped_count(&self) -> usize {
        self.vehicles
            .iter()
            .map(|v| v.unscheduled.len() + v.timed_out_orders.len())
            .sum()
    }

    pub fn total_distance(&self) -> f64 {
        self.routes().map(|r| r.total_distance).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.routes().map(|r| r.total_cost).sum()
    }

    pub fn total_time(&self) -> f64 {
        self.routes().map(|r| r.total_time).sum()
    }

    pub fn total_emissions(&self) -> f64 {
        self.routes().map(|r| r.total_emissions).sum()
    }

    /// Moves every allocated order to its terminal state in `ledger`.
    pub fn record(&self, ledger: &mut OrderLedger) {
        for v in &self.vehicles {
            if let Some(route) = &v.route {
                for (pos, stop) in route.stops.iter().enumerate() {
                    ledger.sequence(&stop.order_id, &v.vehicle_id, pos);
                }
            }
            for err in &v.unscheduled {
                if let Some(id) = err.order_id() {
                    ledger.unschedule(id, err.clone());
                }
            }
            if let Some(timeout) = &v.timeout {
                for id in &v.timed_out_orders {
                    ledger.unschedule(id, timeout.clone());
                }
            }
        }
    }
}

/// Orders each vehicle's stops.
///
/// Vehicles are sequenced independently against a shared read-only matrix;
/// stops never move between vehicles.
///
/// # Examples
///
/// ```
/// use u_fleet::matrix::TravelMatrix;
/// use u_fleet::models::{GeoPoint, Vehicle};
/// use u_fleet::sequence::{RouteSequencer, SequencerConfig, StopSpec, Strategy, VehiclePlan};
///
/// let pts = [GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 0.01), GeoPoint::new(0.01, 0.01)];
/// let matrix = TravelMatrix::haversine(&pts, 10.0);
/// let plan = VehiclePlan {
///     vehicle: Vehicle::new("V1", 100.0, 1.0, 0.0, 0.0),
///     depot: 0,
///     stops: vec![
///         StopSpec { order_id: "A".into(), node: 1, weight: 10.0, volume: 0.1, window: None },
///         StopSpec { order_id: "B".into(), node: 2, weight: 10.0, volume: 0.1, window: None },
///     ],
/// };
///
/// let config = SequencerConfig::fast()
///     .with_strategy(Strategy::Annealing)
///     .with_closed_tour(false)
///     .with_seed(42);
/// let result = RouteSequencer::new(&matrix, config).run(&[plan]).unwrap();
/// let route = result.vehicles[0].route.as_ref().unwrap();
/// assert_eq!(route.order_ids(), vec!["A", "B"]);
/// ```
pub struct RouteSequencer<'m> {
    matrix: &'m TravelMatrix,
    config: SequencerConfig,
    model: Option<Arc<ModelSnapshot>>,
}

impl<'m> RouteSequencer<'m> {
    pub fn new(matrix: &'m TravelMatrix, config: SequencerConfig) -> Self {
        Self {
            matrix,
            config,
            model: None,
        }
    }

    /// Uses `model` to predict delays on top of matrix travel times.
    pub fn with_model(mut self, model: Option<Arc<ModelSnapshot>>) -> Self {
        self.model = model;
        self
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Sequences every plan.
    pub fn run(&self, plans: &[VehiclePlan]) -> Result<SequenceResult> {
        self.run_with_cancel(plans, None)
    }

    /// Sequences every plan with an optional cancellation flag.
    ///
    /// Cancellation and the time budget stop the searches cooperatively;
    /// every returned route is still feasible.
    ///
    /// # Errors
    /// [`FleetError::Input`] for an invalid configuration, a node outside
    /// the matrix, or a plan that exceeds its vehicle's capacity.
    pub fn run_with_cancel(&self, plans: &[VehiclePlan], cancel: Option<Arc<AtomicBool>>) -> Result<SequenceResult> {
        self.config.validate().map_err(FleetError::Input)?;
        self.check_plans(plans)?;

        let started = Instant::now();
        let stop = StopCondition::new(started + self.config.time_budget, cancel);
        let base_seed = self.config.seed.unwrap_or_else(rand::random);

        let vehicles = if self.config.parallel {
            self.run_parallel(plans, &stop, base_seed)
        } else {
            self.run_serial(plans, &stop, base_seed)
        };

        let result = SequenceResult {
            vehicles,
            elapsed: started.elapsed(),
        };
        info!(
            vehicles = plans.len(),
            routes = result.routes().count(),
            unscheduled = result.unscheduled().count(),
            timeouts = result.timeouts().count(),
            distance_m = result.total_distance(),
            elapsed_ms = result.elapsed.as_millis() as u64,
            "sequencing complete"
        );
        Ok(result)
    }

    /// Each vehicle gets an equal share of what is left of the budget.
    fn run_serial(&self, plans: &[VehiclePlan], stop: &StopCondition, base_seed: u64) -> Vec<VehicleSequence> {
        let mut out = Vec::with_capacity(plans.len());
        for (i, plan) in plans.iter().enumerate() {
            let now = Instant::now();
            let share = stop.deadline().saturating_duration_since(now) / (plans.len() - i) as u32;
            let slice = stop.until(now + share);
            out.push(self.sequence_vehicle(plan, &slice, base_seed.wrapping_add(i as u64)));
        }
        out
    }

    #[cfg(feature = "parallel")]
    fn run_parallel(&self, plans: &[VehiclePlan], stop: &StopCondition, base_seed: u64) -> Vec<VehicleSequence> {
        plans
            .par_iter()
            .enumerate()
            .map(|(i, plan)| self.sequence_vehicle(plan, stop, base_seed.wrapping_add(i as u64)))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn run_parallel(&self, plans: &[VehiclePlan], stop: &StopCondition, base_seed: u64) -> Vec<VehicleSequence> {
        self.run_serial(plans, stop, base_seed)
    }

    /// Sequences a single vehicle within `stop`.
    pub fn sequence_vehicle(&self, plan: &VehiclePlan, stop: &StopCondition, seed: u64) -> VehicleSequence {
        let cfg = &self.config;
        let vehicle_id = plan.vehicle.plate.as_str();
        let strategy = match cfg.strategy {
            Strategy::Auto if plan.has_windows() => Strategy::GuidedLocalSearch,
            Strategy::Auto => Strategy::Annealing,
            s => s,
        };
        if plan.stops.is_empty() {
            return VehicleSequence::empty(vehicle_id, strategy);
        }

        let problem = RouteProblem::new(
            self.matrix,
            plan.depot,
            &plan.stops,
            cfg.max_wait_s,
            cfg.service_time_s,
            cfg.closed_tour,
        );
        let mut rng = create_rng(seed);

        let (tour, removed, iterations, interrupted) = match strategy {
            Strategy::GuidedLocalSearch => match cheapest_arc(&problem, stop) {
                Ok((initial, rejected)) => {
                    let out = guided_local_search(&problem, initial, &cfg.gls, stop);
                    (out.tour, rejected, out.iterations, out.interrupted)
                }
                Err(_) if cfg.strategy == Strategy::Auto && !stop.is_cancelled() => {
                    warn!(vehicle = %vehicle_id, "guided search ran out of time; using nearest-neighbour tour");
                    let (tour, removed) = problem.repair(&nearest_neighbor(&problem));
                    (tour, removed, 0, true)
                }
                Err(_) => {
                    let budget_ms = cfg.time_budget.as_millis() as u64;
                    warn!(vehicle = %vehicle_id, budget_ms, stops = plan.stops.len(), "no feasible route within budget");
                    let mut result = VehicleSequence::empty(vehicle_id, strategy);
                    result.timeout = Some(FleetError::SolverTimeout {
                        vehicle_id: vehicle_id.to_string(),
                        budget_ms,
                    });
                    result.timed_out_orders = plan.stops.iter().map(|s| s.order_id.clone()).collect();
                    result.interrupted = true;
                    return result;
                }
            },
            Strategy::Annealing | Strategy::Auto => {
                let out = anneal(&problem, nearest_neighbor(&problem), &cfg.anneal, &mut rng, stop);
                let (tour, removed) = problem.repair(&out.tour);
                (tour, removed, out.iterations, out.interrupted)
            }
            Strategy::Genetic => {
                let out = evolve(&problem, nearest_neighbor(&problem), &cfg.genetic, &mut rng, stop);
                let (tour, removed) = problem.repair(&out.tour);
                (tour, removed, out.iterations, out.interrupted)
            }
        };

        let unscheduled = self.window_errors(&problem, vehicle_id, &removed);
        let route = (!tour.is_empty()).then(|| problem.to_route(&plan.vehicle, &tour, self.model.as_deref()));

        debug!(
            vehicle = %vehicle_id,
            strategy = strategy.name(),
            stops = tour.len(),
            dropped = unscheduled.len(),
            iterations,
            interrupted,
            distance_m = route.as_ref().map_or(0.0, |r| r.total_distance),
            "vehicle sequenced"
        );

        VehicleSequence {
            vehicle_id: vehicle_id.to_string(),
            route,
            unscheduled,
            timeout: None,
            timed_out_orders: Vec::new(),
            strategy,
            iterations,
            interrupted,
        }
    }

    fn window_errors(&self, problem: &RouteProblem<'_>, vehicle_id: &str, removed: &[(usize, Violation)]) -> Vec<FleetError> {
        removed
            .iter()
            .map(|(s, v)| {
                let order_id = problem.stops()[*s].order_id.clone();
                warn!(order = %order_id, vehicle = %vehicle_id, reason = %v, "stop unscheduled");
                FleetError::InfeasibleWindow {
                    order_id,
                    vehicle_id: vehicle_id.to_string(),
                    reason: v.to_string(),
                }
            })
            .collect()
    }

    fn check_plans(&self, plans: &[VehiclePlan]) -> Result<()> {
        let size = self.matrix.size();
        for plan in plans {
            let v = &plan.vehicle;
            if plan.depot >= size {
                return Err(FleetError::input(format!(
                    "vehicle {}: depot node {} outside matrix of size {size}",
                    v.plate, plan.depot
                )));
            }
            if let Some(s) = plan.stops.iter().find(|s| s.node >= size) {
                return Err(FleetError::input(format!(
                    "order {}: node {} outside matrix of size {size}",
                    s.order_id, s.node
                )));
            }
            if plan.load_kg() > v.capacity_kg + CAPACITY_EPS || plan.load_m3() > v.capacity_m3 + CAPACITY_EPS {
                return Err(FleetError::input(format!(
                    "vehicle {}: plan load {} kg / {} m3 exceeds capacity {} kg / {} m3",
                    v.plate,
                    plan.load_kg(),
                    plan.load_m3(),
                    v.capacity_kg,
                    v.capacity_m3
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GeoPoint, OrderStatus, TimeWindow, Vehicle};
    use crate::sequence::StopSpec;

    fn matrix() -> TravelMatrix {
        // depot, (0,1), (1,1), (1,0), (2,2); unit speed.
        let pts = [
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(2.0, 2.0),
        ];
        TravelMatrix::planar(&pts, 1.0)
    }

    fn spec(id: &str, node: usize, window: Option<(f64, f64)>) -> StopSpec {
        StopSpec {
            order_id: id.into(),
            node,
            weight: 10.0,
            volume: 0.1,
            window: window.and_then(|(a, b)| TimeWindow::new(a, b)),
        }
    }

    fn plan(stops: Vec<StopSpec>) -> VehiclePlan {
        VehiclePlan {
            vehicle: Vehicle::new("V1", 100.0, 10.0, 0.0, 0.0),
            depot: 0,
            stops,
        }
    }

    fn config(strategy: Strategy) -> SequencerConfig {
        SequencerConfig::fast().with_strategy(strategy).with_seed(42)
    }

    fn assert_valid(route: &Route, expected: usize) {
        let mut ids: Vec<&str> = route.order_ids();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), expected, "each stop exactly once");
        assert!(route.closed);
    }

    #[test]
    fn test_each_strategy_visits_all() {
        let m = matrix();
        let stops = vec![spec("A", 1, None), spec("B", 2, None), spec("C", 3, None), spec("D", 4, None)];
        for strategy in [Strategy::GuidedLocalSearch, Strategy::Annealing, Strategy::Genetic] {
            let result = RouteSequencer::new(&m, config(strategy)).run(&[plan(stops.clone())]).unwrap();
            let route = result.vehicles[0].route.as_ref().unwrap();
            assert_valid(route, 4);
            // Three unit edges plus the detour through (2,2).
            let optimum = 3.0 + 5f64.sqrt() + 2f64.sqrt();
            assert!(route.total_distance <= optimum + 1e-6, "{strategy:?}: {}", route.total_distance);
        }
    }

    #[test]
    fn test_window_violation_unscheduled() {
        let m = matrix();
        // D at (2,2) is at least 2.83 away but must be reached by t=1.
        let stops = vec![spec("A", 1, None), spec("D", 4, Some((0.0, 1.0)))];
        for strategy in [Strategy::GuidedLocalSearch, Strategy::Annealing] {
            let result = RouteSequencer::new(&m, config(strategy)).run(&[plan(stops.clone())]).unwrap();
            let v = &result.vehicles[0];
            assert_eq!(v.route.as_ref().unwrap().order_ids(), vec!["A"]);
            assert_eq!(v.unscheduled.len(), 1);
            assert_eq!(v.unscheduled[0].order_id(), Some("D"));
        }
    }

    #[test]
    fn test_auto_picks_by_windows() {
        let m = matrix();
        let seq = RouteSequencer::new(&m, config(Strategy::Auto));
        let r = seq.run(&[plan(vec![spec("A", 1, None), spec("B", 2, None)])]).unwrap();
        assert_eq!(r.vehicles[0].strategy, Strategy::Annealing);
        let r = seq.run(&[plan(vec![spec("A", 1, Some((0.0, 100.0))), spec("B", 2, None)])]).unwrap();
        assert_eq!(r.vehicles[0].strategy, Strategy::GuidedLocalSearch);
    }

    #[test]
    fn test_cancelled_gls_times_out() {
        let m = matrix();
        let flag = Arc::new(AtomicBool::new(true));
        let seq = RouteSequencer::new(&m, config(Strategy::GuidedLocalSearch));
        let result = seq
            .run_with_cancel(&[plan(vec![spec("A", 1, None), spec("B", 2, None)])], Some(flag))
            .unwrap();
        let v = &result.vehicles[0];
        assert!(v.route.is_none());
        assert!(matches!(v.timeout, Some(FleetError::SolverTimeout { .. })));
        assert_eq!(v.timed_out_orders, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn test_cancelled_annealing_still_valid() {
        let m = matrix();
        let flag = Arc::new(AtomicBool::new(true));
        let seq = RouteSequencer::new(&m, config(Strategy::Annealing));
        let stops = vec![spec("A", 1, None), spec("B", 2, None), spec("C", 3, None)];
        let result = seq.run_with_cancel(&[plan(stops)], Some(flag)).unwrap();
        let v = &result.vehicles[0];
        assert!(v.interrupted);
        assert_valid(v.route.as_ref().unwrap(), 3);
    }

    #[test]
    fn test_over_capacity_rejected() {
        let m = matrix();
        let mut p = plan(vec![spec("A", 1, None)]);
        p.vehicle.capacity_kg = 5.0;
        let err = RouteSequencer::new(&m, config(Strategy::Annealing)).run(&[p]).unwrap_err();
        assert!(matches!(err, FleetError::Input(_)));
    }

    #[test]
    fn test_node_outside_matrix() {
        let m = matrix();
        let p = plan(vec![spec("A", 9, None)]);
        assert!(RouteSequencer::new(&m, config(Strategy::Annealing)).run(&[p]).is_err());
    }

    #[test]
    fn test_empty_plan_has_no_route() {
        let m = matrix();
        let result = RouteSequencer::new(&m, config(Strategy::Auto)).run(&[plan(vec![])]).unwrap();
        assert!(result.vehicles[0].route.is_none());
        assert_eq!(result.routes().count(), 0);
    }

    #[test]
    fn test_record_into_ledger() {
        let m = matrix();
        let stops = vec![spec("A", 1, None), spec("D", 4, Some((0.0, 1.0)))];
        let result = RouteSequencer::new(&m, config(Strategy::GuidedLocalSearch))
            .run(&[plan(stops)])
            .unwrap();
        let mut ledger = OrderLedger::new(["A", "D"]);
        ledger.allocate("A", "V1");
        ledger.allocate("D", "V1");
        result.record(&mut ledger);
        assert!(matches!(ledger.status("A"), Some(OrderStatus::Sequenced { position: 0, .. })));
        assert!(matches!(ledger.status("D"), Some(OrderStatus::Unscheduled { .. })));
        assert!(ledger.is_settled());
    }

    #[test]
    fn test_model_adds_delay() {
        use crate::feedback::DelayModel;
        let m = matrix();
        let snapshot = Arc::new(ModelSnapshot {
            version: 3,
            trained_at: chrono::Utc::now(),
            model: DelayModel {
                intercept: 5.0,
                coef_distance: 0.0,
                coef_time: 0.0,
                mae: 0.0,
                samples: 10,
            },
        });
        let result = RouteSequencer::new(&m, config(Strategy::Annealing))
            .with_model(Some(snapshot))
            .run(&[plan(vec![spec("A", 1, None)])])
            .unwrap();
        let route = result.vehicles[0].route.as_ref().unwrap();
        assert!((route.total_time - route.estimated_time - 5.0).abs() < 1e-9);
    }
}
