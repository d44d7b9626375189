//! The end-to-end solve.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{info, warn};

use super::config::PlannerConfig;
use super::history::{HistoryEntry, HistoryStore};
use crate::allocate::{Allocation, LoadAllocator};
use crate::cluster::{ClusterResult, RegionClusterer};
use crate::error::{FleetError, Result};
use crate::feedback::FeedbackLearner;
use crate::matrix::{HaversineProvider, MatrixBuilder, TravelProvider};
use crate::models::record::{available_fleet, check_orders, validate_orders, validate_vehicles};
use crate::models::{GeoPoint, Order, OrderLedger, OrderRecord, Route, Vehicle, VehicleRecord};
use crate::rules::{BusinessRules, ClientRules};
use crate::select::{Candidate, MultiObjectiveSelector, ScoredCandidate};
use crate::sequence::{RouteSequencer, SequenceResult, StopSpec, Strategy, VehiclePlan};

/// Everything a solve produced.
#[derive(Debug, Clone)]
pub struct SolveReport {
    /// Routes of the selected candidate, in fleet order.
    pub routes: Vec<Route>,

    pub clusters: ClusterResult,

    /// [`FleetError::Rejected`] per order excluded by a client rule.
    pub rejected: Vec<FleetError>,

    /// [`FleetError::Capacity`] per order no vehicle could take.
    pub unallocated: Vec<FleetError>,

    /// [`FleetError::InfeasibleWindow`] per stop dropped by sequencing.
    pub unscheduled: Vec<FleetError>,

    /// [`FleetError::SolverTimeout`] per vehicle left without a route.
    pub timeouts: Vec<FleetError>,

    /// Orders left unscheduled because their vehicle timed out.
    pub timed_out_orders: Vec<String>,

    /// [`FleetError::Provider`] per matrix cell that fell back to haversine.
    pub provider_failures: Vec<FleetError>,

    /// Whether any matrix cell is an estimate.
    pub degraded: bool,

    /// Final status of every order.
    pub ledger: OrderLedger,

    /// Candidate ranking, best first.
    pub scores: Vec<ScoredCandidate>,

    /// Strategy of the selected candidate.
    pub strategy: Strategy,

    /// Version of the delay model used, if any.
    pub model_version: Option<u64>,

    pub elapsed: Duration,
}

impl SolveReport {
    pub fn total_distance(&self) -> f64 {
        self.routes.iter().map(|r| r.total_distance).sum()
    }

    pub fn total_cost(&self) -> f64 {
        self.routes.iter().map(|r| r.total_cost).sum()
    }

    pub fn total_time(&self) -> f64 {
        self.routes.iter().map(|r| r.total_time).sum()
    }

    pub fn total_emissions(&self) -> f64 {
        self.routes.iter().map(|r| r.total_emissions).sum()
    }

    pub fn route(&self, vehicle_id: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.vehicle_id == vehicle_id)
    }

    /// Orders placed on a route.
    pub fn routed_count(&self) -> usize {
        self.routes.iter().map(Route::len).sum()
    }

    /// Orders not placed on any route, whatever the reason.
    pub fn unserved_count(&self) -> usize {
        self.rejected.len() + self.unallocated.len() + self.unscheduled.len() + self.timed_out_orders.len()
    }
}

/// Runs clustering, allocation, sequencing and selection in strict order.
///
/// Allocation is final before sequencing starts; sequencing never moves an
/// order to another vehicle.
///
/// # Examples
///
/// ```
/// use u_fleet::cluster::{ClusterConfig, ClusterMethod};
/// use u_fleet::models::{Order, Vehicle};
/// use u_fleet::planner::{FleetPlanner, PlannerConfig};
///
/// let orders = vec![
///     Order::new("P1", 40.0, -23.550, -46.630),
///     Order::new("P2", 30.0, -23.552, -46.632),
///     Order::new("P3", 20.0, -23.600, -46.700),
/// ];
/// let fleet = vec![Vehicle::new("ABC1234", 100.0, 10.0, -23.55, -46.63)];
///
/// let config = PlannerConfig::fast()
///     .with_cluster(ClusterConfig::default().with_method(ClusterMethod::Centroid { k: 2 }));
/// let report = FleetPlanner::new(config).solve(&orders, &fleet).unwrap();
///
/// assert_eq!(report.routes.len(), 1);
/// assert_eq!(report.routes[0].len(), 3);
/// assert!(report.ledger.is_settled());
/// ```
pub struct FleetPlanner<P: TravelProvider = HaversineProvider> {
    provider: P,
    config: PlannerConfig,
    rules: Option<ClientRules>,
    learner: Option<Arc<FeedbackLearner>>,
    history: Option<Arc<dyn HistoryStore>>,
}

impl FleetPlanner<HaversineProvider> {
    /// A planner using great-circle travel estimates.
    pub fn new(config: PlannerConfig) -> Self {
        let provider = HaversineProvider {
            speed_mps: config.retry.fallback_speed_mps,
        };
        Self::with_provider(provider, config)
    }
}

impl<P: TravelProvider> FleetPlanner<P> {
    pub fn with_provider(provider: P, config: PlannerConfig) -> Self {
        Self {
            provider,
            config,
            rules: None,
            learner: None,
            history: None,
        }
    }

    /// Applies client business rules to every solve's orders before
    /// clustering.
    pub fn with_rules(mut self, rules: ClientRules) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Reads the learner's latest delay model at the start of each solve.
    pub fn with_learner(mut self, learner: Arc<FeedbackLearner>) -> Self {
        self.learner = Some(learner);
        self
    }

    /// Appends a [`HistoryEntry`] after each solve.
    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Validates raw records, then solves.
    ///
    /// # Errors
    /// [`FleetError::Input`] naming the first invalid record.
    pub fn solve_records(&self, orders: &[OrderRecord], vehicles: &[VehicleRecord]) -> Result<SolveReport> {
        let orders = validate_orders(orders)?;
        let vehicles = validate_vehicles(vehicles)?;
        self.solve(&orders, &vehicles)
    }

    pub fn solve(&self, orders: &[Order], vehicles: &[Vehicle]) -> Result<SolveReport> {
        self.solve_with_cancel(orders, vehicles, None)
    }

    /// Solves with an optional cancellation flag for the sequencing phase.
    ///
    /// # Errors
    /// [`FleetError::Input`] for invalid configuration or input, or an
    /// empty available fleet. Capacity, window, timeout and provider
    /// problems are reported in the [`SolveReport`] instead.
    pub fn solve_with_cancel(
        &self,
        orders: &[Order],
        vehicles: &[Vehicle],
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SolveReport> {
        let started = Instant::now();
        self.config.validate().map_err(FleetError::Input)?;
        check_orders(orders)?;
        let fleet = available_fleet(vehicles)?;
        let mut ledger = OrderLedger::new(orders.iter().map(|o| o.id.as_str()));

        // 0. Client rules
        let (mut orders, rejected) = match &self.rules {
            Some(rules) => {
                let outcome = BusinessRules::apply(orders, rules)?;
                for err in &outcome.rejected {
                    if let Some(id) = err.order_id() {
                        ledger.reject(id, err.clone());
                    }
                }
                (outcome.orders, outcome.rejected)
            }
            None => (orders.to_vec(), Vec::new()),
        };
        if orders.is_empty() {
            warn!(rejected = rejected.len(), "client rules rejected every order");
            return Ok(SolveReport {
                routes: Vec::new(),
                clusters: ClusterResult {
                    clusters: Vec::new(),
                    unclustered: Vec::new(),
                },
                rejected,
                unallocated: Vec::new(),
                unscheduled: Vec::new(),
                timeouts: Vec::new(),
                timed_out_orders: Vec::new(),
                provider_failures: Vec::new(),
                degraded: false,
                ledger,
                scores: Vec::new(),
                strategy: self.config.sequencer.strategy,
                model_version: None,
                elapsed: started.elapsed(),
            });
        }

        // 1. Cluster
        let clusters = RegionClusterer::run(&mut orders, &self.config.cluster)?;
        info!(orders = orders.len(), clusters = clusters.clusters.len(), "clustering phase done");

        // 2. Allocate
        let allocation = LoadAllocator::run(&orders, &fleet, &self.config.allocation)?;
        allocation.record(&mut ledger);
        info!(
            allocated = allocation.allocated_count(),
            unallocated = allocation.unallocated.len(),
            "allocation phase done"
        );

        // 3. Matrix: vehicle starts first, then orders.
        let points: Vec<GeoPoint> = fleet
            .iter()
            .map(|v| v.start)
            .chain(orders.iter().map(|o| o.location))
            .collect();
        let (matrix, provider_failures) = MatrixBuilder::new(&self.provider, self.config.retry.clone())
            .with_depots(fleet.len())
            .build(&points);
        if matrix.is_degraded() {
            warn!(cells = matrix.degraded_count(), "travel matrix partially estimated");
        }

        // 4. Sequence each candidate strategy
        let plans = build_plans(&fleet, &orders, &allocation);
        let model = self.learner.as_ref().and_then(|l| l.latest_model());
        let strategies = self.config.strategies();
        let share = self.config.sequencer.time_budget / strategies.len() as u32;

        let mut results: Vec<(Strategy, SequenceResult)> = Vec::with_capacity(strategies.len());
        for strategy in strategies {
            let config = self
                .config
                .sequencer
                .clone()
                .with_strategy(strategy)
                .with_time_budget(share);
            let result = RouteSequencer::new(&matrix, config)
                .with_model(model.clone())
                .run_with_cancel(&plans, cancel.clone())?;
            results.push((strategy, result));
        }

        // 5. Select
        let candidates: Vec<Candidate> = results
            .iter()
            .map(|(s, r)| Candidate::from_sequence(s.name(), r))
            .collect();
        let scores = MultiObjectiveSelector::rank(&candidates, &self.config.weights)?;
        let winner = scores.first().map_or(0, |s| s.index);
        let (strategy, selected) = results.swap_remove(winner);
        selected.record(&mut ledger);

        let report = SolveReport {
            routes: selected.routes().cloned().collect(),
            clusters,
            rejected,
            unallocated: allocation.unallocated,
            unscheduled: selected.unscheduled().cloned().collect(),
            timeouts: selected.timeouts().cloned().collect(),
            timed_out_orders: selected.timed_out_orders().map(str::to_string).collect(),
            provider_failures,
            degraded: matrix.is_degraded(),
            ledger,
            scores,
            strategy,
            model_version: model.as_ref().map(|m| m.version),
            elapsed: started.elapsed(),
        };
        info!(
            strategy = strategy.name(),
            routes = report.routes.len(),
            cost = report.total_cost(),
            distance_m = report.total_distance(),
            unserved = report.unserved_count(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "solve complete"
        );

        if let Some(history) = &self.history {
            if let Err(message) = history.append(HistoryEntry::new(Utc::now(), report.routes.clone())) {
                warn!(%message, "could not record solve history");
            }
        }
        Ok(report)
    }
}

/// Turns assignments into sequencing input. Vehicle `i` of `fleet` is
/// matrix node `i`; order `j` is node `fleet.len() + j`.
fn build_plans(fleet: &[Vehicle], orders: &[Order], allocation: &Allocation) -> Vec<VehiclePlan> {
    let order_index: HashMap<&str, usize> = orders.iter().enumerate().map(|(j, o)| (o.id.as_str(), j)).collect();
    fleet
        .iter()
        .enumerate()
        .map(|(depot, vehicle)| {
            let stops = allocation
                .assignment(&vehicle.plate)
                .map(|a| {
                    a.order_ids
                        .iter()
                        .filter_map(|id| order_index.get(id.as_str()))
                        .map(|&j| StopSpec::from_order(&orders[j], fleet.len() + j))
                        .collect()
                })
                .unwrap_or_default();
            VehiclePlan {
                vehicle: vehicle.clone(),
                depot,
                stops,
            }
        })
        .collect()
}
