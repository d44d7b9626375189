//! First-fit-decreasing allocation.

use tracing::{debug, info, warn};

use super::config::{AllocationConfig, AllocationCriterion};
use crate::error::{FleetError, Result};
use crate::models::{Order, OrderLedger, Vehicle};

/// Orders assigned to one vehicle, not yet sequenced.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Assignment {
    pub vehicle_id: String,
    /// Order ids in assignment order.
    pub order_ids: Vec<String>,
    pub load_kg: f64,
    pub load_m3: f64,
}

/// Result of an allocation run.
#[derive(Debug, Clone)]
pub struct Allocation {
    /// One entry per available vehicle, in fleet order (possibly empty).
    pub assignments: Vec<Assignment>,

    /// [`FleetError::Capacity`] for each order that fit no vehicle.
    pub unallocated: Vec<FleetError>,
}

impl Allocation {
    pub fn assignment(&self, vehicle_id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.vehicle_id == vehicle_id)
    }

    /// Number of orders placed on some vehicle.
    pub fn allocated_count(&self) -> usize {
        self.assignments.iter().map(|a| a.order_ids.len()).sum()
    }

    /// Records the outcome of every order in `ledger`.
    pub fn record(&self, ledger: &mut OrderLedger) {
        for a in &self.assignments {
            for id in &a.order_ids {
                ledger.allocate(id, &a.vehicle_id);
            }
        }
        for err in &self.unallocated {
            if let Some(id) = err.order_id() {
                ledger.unallocate(id, err.clone());
            }
        }
    }
}

struct Bin {
    remaining_kg: f64,
    remaining_m3: f64,
}

/// Assigns clustered orders to vehicles without exceeding capacity.
pub struct LoadAllocator;

impl LoadAllocator {
    /// Runs first-fit-decreasing over `orders`.
    ///
    /// Clusters are processed by ascending priority rank; orders without a
    /// rank (noise under the trailing policy, or never clustered) come last.
    /// Within a group, orders are sorted descending by the configured
    /// criterion and each goes to the first vehicle, in fleet order, whose
    /// remaining weight and volume both cover it. Unavailable vehicles are
    /// skipped.
    ///
    /// # Errors
    /// [`FleetError::Input`] for an invalid configuration or when no vehicle
    /// is available.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_fleet::allocate::{AllocationConfig, LoadAllocator};
    /// use u_fleet::models::{Order, Vehicle};
    ///
    /// let orders = vec![
    ///     Order::new("A", 60.0, 0.0, 0.0),
    ///     Order::new("B", 50.0, 0.0, 0.0),
    ///     Order::new("C", 500.0, 0.0, 0.0),
    /// ];
    /// let fleet = vec![
    ///     Vehicle::new("V1", 100.0, 10.0, 0.0, 0.0),
    ///     Vehicle::new("V2", 100.0, 10.0, 0.0, 0.0),
    /// ];
    /// let alloc = LoadAllocator::run(&orders, &fleet, &AllocationConfig::default()).unwrap();
    ///
    /// assert_eq!(alloc.assignments[0].order_ids, vec!["A"]);
    /// assert_eq!(alloc.assignments[1].order_ids, vec!["B"]);
    /// assert_eq!(alloc.unallocated.len(), 1);
    /// ```
    pub fn run(orders: &[Order], vehicles: &[Vehicle], config: &AllocationConfig) -> Result<Allocation> {
        config.validate().map_err(FleetError::Input)?;

        let fleet: Vec<&Vehicle> = vehicles.iter().filter(|v| v.available).collect();
        if fleet.is_empty() {
            return Err(FleetError::input("no available vehicles"));
        }

        let mut bins: Vec<Bin> = fleet
            .iter()
            .map(|v| Bin {
                remaining_kg: v.capacity_kg,
                remaining_m3: v.capacity_m3,
            })
            .collect();
        let mut assignments: Vec<Assignment> = fleet
            .iter()
            .map(|v| Assignment {
                vehicle_id: v.plate.clone(),
                order_ids: Vec::new(),
                load_kg: 0.0,
                load_m3: 0.0,
            })
            .collect();
        let mut unallocated = Vec::new();

        for idx in Self::processing_order(orders, config.criterion) {
            let order = &orders[idx];
            let slot = bins.iter().position(|b| {
                order.weight <= b.remaining_kg + config.tolerance && order.volume <= b.remaining_m3 + config.tolerance
            });

            match slot {
                Some(v) => {
                    bins[v].remaining_kg -= order.weight;
                    bins[v].remaining_m3 -= order.volume;
                    let a = &mut assignments[v];
                    a.order_ids.push(order.id.clone());
                    a.load_kg += order.weight;
                    a.load_m3 += order.volume;
                }
                None => {
                    warn!(
                        order = %order.id,
                        cluster = ?order.cluster_id(),
                        weight = order.weight,
                        volume = order.volume,
                        "order fits no vehicle"
                    );
                    unallocated.push(FleetError::Capacity {
                        order_id: order.id.clone(),
                        cluster_id: order.cluster_id(),
                        weight: order.weight,
                        volume: order.volume,
                    });
                }
            }
        }

        for a in &assignments {
            debug!(vehicle = %a.vehicle_id, orders = a.order_ids.len(), load_kg = a.load_kg, load_m3 = a.load_m3, "vehicle loaded");
        }
        info!(
            orders = orders.len(),
            vehicles = fleet.len(),
            unallocated = unallocated.len(),
            "allocation complete"
        );

        Ok(Allocation {
            assignments,
            unallocated,
        })
    }

    /// Indices of `orders` in processing order: rank ascending (unranked
    /// last), then criterion descending, then input order.
    fn processing_order(orders: &[Order], criterion: AllocationCriterion) -> Vec<usize> {
        let key = |o: &Order| match criterion {
            AllocationCriterion::Weight => o.weight,
            AllocationCriterion::Volume => o.volume,
        };
        let mut idx: Vec<usize> = (0..orders.len()).collect();
        idx.sort_by(|&a, &b| {
            let (oa, ob) = (&orders[a], &orders[b]);
            let ra = oa.priority_rank.unwrap_or(usize::MAX);
            let rb = ob.priority_rank.unwrap_or(usize::MAX);
            ra.cmp(&rb)
                .then_with(|| key(ob).total_cmp(&key(oa)))
                .then(a.cmp(&b))
        });
        idx
    }
}
