//! Sequencing inputs, stop conditions and search results.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::models::{Order, TimeWindow, Vehicle};

/// A stop to be placed in a route.
#[derive(Debug, Clone, PartialEq)]
pub struct StopSpec {
    pub order_id: String,
    /// Row/column of this stop in the travel matrix.
    pub node: usize,
    pub weight: f64,
    pub volume: f64,
    pub window: Option<TimeWindow>,
}

impl StopSpec {
    pub fn from_order(order: &Order, node: usize) -> Self {
        Self {
            order_id: order.id.clone(),
            node,
            weight: order.weight,
            volume: order.volume,
            window: order.time_window,
        }
    }
}

/// The stops allocated to one vehicle.
#[derive(Debug, Clone)]
pub struct VehiclePlan {
    pub vehicle: Vehicle,
    /// Matrix node of the vehicle's start.
    pub depot: usize,
    pub stops: Vec<StopSpec>,
}

impl VehiclePlan {
    pub fn load_kg(&self) -> f64 {
        self.stops.iter().map(|s| s.weight).sum()
    }

    pub fn load_m3(&self) -> f64 {
        self.stops.iter().map(|s| s.volume).sum()
    }

    pub fn has_windows(&self) -> bool {
        self.stops.iter().any(|s| s.window.is_some())
    }
}

/// Deadline plus optional cooperative cancellation flag.
#[derive(Debug, Clone)]
pub struct StopCondition {
    deadline: Instant,
    cancel: Option<Arc<AtomicBool>>,
}

impl StopCondition {
    pub fn new(deadline: Instant, cancel: Option<Arc<AtomicBool>>) -> Self {
        Self { deadline, cancel }
    }

    /// Same cancellation flag, different deadline.
    pub fn until(&self, deadline: Instant) -> Self {
        Self {
            deadline,
            cancel: self.cancel.clone(),
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|c| c.load(Ordering::Relaxed))
    }

    pub fn should_stop(&self) -> bool {
        self.is_cancelled() || Instant::now() >= self.deadline
    }
}

/// Why a stop cannot be served at its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Violation {
    /// Arrival after the window closed.
    Late { arrival: f64, end: f64 },
    /// Arrival so early that the wait exceeds the allowed maximum.
    ExcessWait { wait: f64, limit: f64 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Late { arrival, end } => {
                write!(f, "arrives at {arrival:.0}s, window closes at {end:.0}s")
            }
            Violation::ExcessWait { wait, limit } => {
                write!(f, "would wait {wait:.0}s, limit is {limit:.0}s")
            }
        }
    }
}

/// Result of an improvement search on one tour.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Best tour found, as indices into the plan's stops.
    pub tour: Vec<usize>,
    pub cost: f64,
    pub iterations: usize,
    /// Whether the search stopped on the deadline or cancellation.
    pub interrupted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_stop_condition_cancel() {
        let flag = Arc::new(AtomicBool::new(false));
        let stop = StopCondition::new(Instant::now() + Duration::from_secs(60), Some(flag.clone()));
        assert!(!stop.should_stop());
        flag.store(true, Ordering::SeqCst);
        assert!(stop.is_cancelled());
        assert!(stop.should_stop());
    }

    #[test]
    fn test_stop_condition_deadline() {
        let stop = StopCondition::new(Instant::now(), None);
        assert!(stop.should_stop());
        assert!(!stop.is_cancelled());
    }

    #[test]
    fn test_violation_display() {
        let v = Violation::Late {
            arrival: 500.0,
            end: 300.0,
        };
        assert_eq!(v.to_string(), "arrives at 500s, window closes at 300s");
    }
}
