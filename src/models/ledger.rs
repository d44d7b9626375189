//! Per-order lifecycle tracking for a single solve.
//!
//! Every order starts `Pending` and must finish in exactly one terminal
//! state:
//!
//! ```text
//! Pending ──► Allocated ──► Sequenced
//!    │  │          │
//!    │  ▼          ▼
//!    │ Unallocated Unscheduled
//!    ▼
//! Rejected
//! ```
//!
//! Illegal transitions are rejected (and logged), never applied.

use std::collections::HashMap;

use tracing::warn;

use crate::error::FleetError;

/// Lifecycle state of one order within a solve.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderStatus {
    Pending,
    Allocated { vehicle_id: String },
    Sequenced { vehicle_id: String, position: usize },
    Unallocated(FleetError),
    Unscheduled { vehicle_id: String, cause: FleetError },
    /// Excluded by a client business rule before clustering.
    Rejected(FleetError),
}

impl OrderStatus {
    /// Whether no further transition is possible this run.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Sequenced { .. }
                | OrderStatus::Unallocated(_)
                | OrderStatus::Unscheduled { .. }
                | OrderStatus::Rejected(_)
        )
    }

    fn name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Allocated { .. } => "allocated",
            OrderStatus::Sequenced { .. } => "sequenced",
            OrderStatus::Unallocated(_) => "unallocated",
            OrderStatus::Unscheduled { .. } => "unscheduled",
            OrderStatus::Rejected(_) => "rejected",
        }
    }
}

/// Tracks the status of every order in input order.
#[derive(Debug, Clone, Default)]
pub struct OrderLedger {
    ids: Vec<String>,
    statuses: Vec<OrderStatus>,
    index: HashMap<String, usize>,
}

impl OrderLedger {
    /// Starts every id in `Pending`.
    pub fn new<'a>(ids: impl IntoIterator<Item = &'a str>) -> Self {
        let mut ledger = Self::default();
        for id in ids {
            if ledger.index.contains_key(id) {
                continue;
            }
            ledger.index.insert(id.to_string(), ledger.ids.len());
            ledger.ids.push(id.to_string());
            ledger.statuses.push(OrderStatus::Pending);
        }
        ledger
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn status(&self, id: &str) -> Option<&OrderStatus> {
        self.index.get(id).map(|&i| &self.statuses[i])
    }

    /// `Pending → Allocated`.
    pub fn allocate(&mut self, id: &str, vehicle_id: &str) -> bool {
        self.transition(id, |s| match s {
            OrderStatus::Pending => Some(OrderStatus::Allocated {
                vehicle_id: vehicle_id.to_string(),
            }),
            _ => None,
        })
    }

    /// `Pending → Unallocated`.
    pub fn unallocate(&mut self, id: &str, cause: FleetError) -> bool {
        self.transition(id, |s| match s {
            OrderStatus::Pending => Some(OrderStatus::Unallocated(cause)),
            _ => None,
        })
    }

    /// `Pending → Rejected`.
    pub fn reject(&mut self, id: &str, cause: FleetError) -> bool {
        self.transition(id, |s| match s {
            OrderStatus::Pending => Some(OrderStatus::Rejected(cause)),
            _ => None,
        })
    }

    /// `Allocated → Sequenced`; the vehicle must match the allocation.
    pub fn sequence(&mut self, id: &str, vehicle_id: &str, position: usize) -> bool {
        self.transition(id, |s| match s {
            OrderStatus::Allocated { vehicle_id: v } if v == vehicle_id => Some(OrderStatus::Sequenced {
                vehicle_id: vehicle_id.to_string(),
                position,
            }),
            _ => None,
        })
    }

    /// `Allocated → Unscheduled`.
    pub fn unschedule(&mut self, id: &str, cause: FleetError) -> bool {
        self.transition(id, |s| match s {
            OrderStatus::Allocated { vehicle_id } => Some(OrderStatus::Unscheduled {
                vehicle_id: vehicle_id.clone(),
                cause,
            }),
            _ => None,
        })
    }

    fn transition<F>(&mut self, id: &str, next: F) -> bool
    where
        F: FnOnce(&OrderStatus) -> Option<OrderStatus>,
    {
        let Some(&i) = self.index.get(id) else {
            warn!(order_id = id, "transition requested for unknown order");
            return false;
        };
        match next(&self.statuses[i]) {
            Some(status) => {
                self.statuses[i] = status;
                true
            }
            None => {
                warn!(order_id = id, from = self.statuses[i].name(), "illegal order transition rejected");
                false
            }
        }
    }

    /// Ids in a given state, in input order.
    pub fn ids_where<F: Fn(&OrderStatus) -> bool>(&self, pred: F) -> Vec<&str> {
        self.ids
            .iter()
            .zip(&self.statuses)
            .filter(|(_, s)| pred(s))
            .map(|(id, _)| id.as_str())
            .collect()
    }

    /// Whether every order reached a terminal state.
    pub fn is_settled(&self) -> bool {
        self.statuses.iter().all(OrderStatus::is_terminal)
    }

    /// `(id, status)` pairs in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OrderStatus)> {
        self.ids.iter().map(String::as_str).zip(self.statuses.iter())
    }
}
