//! What-if scenarios.
//!
//! Perturbs an order book and a fleet before planning: grow the order book
//! by resampling existing orders, and take a share of the fleet out of
//! service. Both draws are seeded.

use std::collections::HashSet;

use rand::seq::index;
use rand::Rng;
use tracing::info;

use crate::error::{self, FleetError};
use crate::models::{Order, Vehicle};
use crate::random::rng_from;

/// Perturbation parameters.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenarioConfig {
    /// Extra orders as a fraction of the current count (0.2 = 20% more),
    /// sampled with replacement.
    pub order_growth: f64,

    /// Fraction of the fleet marked unavailable, rounded down.
    pub unavailable_fraction: f64,

    pub seed: Option<u64>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            order_growth: 0.0,
            unavailable_fraction: 0.0,
            seed: Some(42),
        }
    }
}

impl ScenarioConfig {
    pub fn with_order_growth(mut self, fraction: f64) -> Self {
        self.order_growth = fraction;
        self
    }

    pub fn with_unavailable_fraction(mut self, fraction: f64) -> Self {
        self.unavailable_fraction = fraction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.order_growth.is_finite() || self.order_growth < 0.0 {
            return Err(format!("order_growth must be non-negative, got {}", self.order_growth));
        }
        if !(0.0..=1.0).contains(&self.unavailable_fraction) {
            return Err(format!(
                "unavailable_fraction must be within [0, 1], got {}",
                self.unavailable_fraction
            ));
        }
        Ok(())
    }
}

/// A perturbed copy of the input.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Original orders followed by the copies.
    pub orders: Vec<Order>,
    pub vehicles: Vec<Vehicle>,
    /// Ids given to the copies.
    pub added: Vec<String>,
    /// Plates taken out of service.
    pub withdrawn: Vec<String>,
}

impl Scenario {
    /// Builds a scenario from `orders` and `vehicles`.
    ///
    /// Copies keep every field of their source except the id, which gets a
    /// `-sim{n}` suffix, and clustering output, which is cleared.
    ///
    /// # Errors
    /// [`FleetError::Input`] for an invalid configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_fleet::models::{Order, Vehicle};
    /// use u_fleet::scenario::{Scenario, ScenarioConfig};
    ///
    /// let orders: Vec<Order> = (0..10).map(|i| Order::new(format!("P{i}"), 5.0, 0.0, 0.0)).collect();
    /// let fleet: Vec<Vehicle> = (0..4).map(|i| Vehicle::new(format!("V{i}"), 100.0, 1.0, 0.0, 0.0)).collect();
    ///
    /// let config = ScenarioConfig::default().with_order_growth(0.2).with_unavailable_fraction(0.5);
    /// let s = Scenario::build(&orders, &fleet, &config).unwrap();
    /// assert_eq!(s.orders.len(), 12);
    /// assert_eq!(s.vehicles.iter().filter(|v| !v.available).count(), 2);
    /// ```
    pub fn build(orders: &[Order], vehicles: &[Vehicle], config: &ScenarioConfig) -> error::Result<Self> {
        config.validate().map_err(FleetError::Input)?;
        let mut rng = rng_from(config.seed);

        let extra = (orders.len() as f64 * config.order_growth).round() as usize;
        let mut taken: HashSet<String> = orders.iter().map(|o| o.id.clone()).collect();
        let mut grown = orders.to_vec();
        let mut added = Vec::with_capacity(extra);
        if !orders.is_empty() {
            let mut serial = 0;
            for _ in 0..extra {
                let source = &orders[rng.random_range(0..orders.len())];
                let id = loop {
                    serial += 1;
                    let candidate = format!("{}-sim{serial}", source.id);
                    if taken.insert(candidate.clone()) {
                        break candidate;
                    }
                };
                let mut copy = source.clone();
                copy.id = id.clone();
                copy.cluster = None;
                copy.priority_rank = None;
                grown.push(copy);
                added.push(id);
            }
        }

        let withdraw = (vehicles.len() as f64 * config.unavailable_fraction).floor() as usize;
        let mut fleet = vehicles.to_vec();
        let mut picked: Vec<usize> = index::sample(&mut rng, fleet.len(), withdraw).into_vec();
        picked.sort_unstable();
        let withdrawn: Vec<String> = picked
            .into_iter()
            .map(|i| {
                fleet[i].available = false;
                fleet[i].plate.clone()
            })
            .collect();

        info!(added = added.len(), withdrawn = withdrawn.len(), "scenario built");
        Ok(Self {
            orders: grown,
            vehicles: fleet,
            added,
            withdrawn,
        })
    }
}
