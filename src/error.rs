//! Error types shared by every stage of a solve.

use thiserror::Error;

/// Errors raised while planning routes.
///
/// `Input` and `Provider` (once retries and fallback are exhausted) are
/// fatal for the operation that returns them. `Rejected`, `Capacity`,
/// `InfeasibleWindow` and `SolverTimeout` are collected into the solve
/// report and never abort the remaining work.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FleetError {
    /// Missing or malformed input, or an invalid configuration.
    #[error("invalid input: {0}")]
    Input(String),

    /// A client business rule excluded the order before routing.
    #[error("order {order_id} of client {client_id} rejected: {reason}")]
    Rejected {
        order_id: String,
        client_id: String,
        reason: String,
    },

    /// An order fits no vehicle.
    #[error("order {order_id} (cluster {cluster_id:?}) fits no vehicle: weight {weight} kg, volume {volume} m3")]
    Capacity {
        order_id: String,
        cluster_id: Option<usize>,
        weight: f64,
        volume: f64,
    },

    /// A stop's time window cannot be met on its vehicle.
    #[error("order {order_id} cannot meet its time window on vehicle {vehicle_id}: {reason}")]
    InfeasibleWindow {
        order_id: String,
        vehicle_id: String,
        reason: String,
    },

    /// No feasible route was produced within the time budget.
    #[error("no feasible route for vehicle {vehicle_id} within {budget_ms} ms")]
    SolverTimeout { vehicle_id: String, budget_ms: u64 },

    /// The distance/time source failed for a pair of points.
    #[error("travel provider failed for pair ({from}, {to}) after {attempts} attempts: {message}")]
    Provider {
        from: usize,
        to: usize,
        attempts: u32,
        message: String,
    },
}

impl FleetError {
    /// Shorthand for [`FleetError::Input`].
    pub fn input(message: impl Into<String>) -> Self {
        FleetError::Input(message.into())
    }

    /// Returns `true` for errors that are reported but do not stop a solve.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FleetError::Rejected { .. }
                | FleetError::Capacity { .. }
                | FleetError::InfeasibleWindow { .. }
                | FleetError::SolverTimeout { .. }
        )
    }

    /// The order this error refers to, if any.
    pub fn order_id(&self) -> Option<&str> {
        match self {
            FleetError::Rejected { order_id, .. }
            | FleetError::Capacity { order_id, .. }
            | FleetError::InfeasibleWindow { order_id, .. } => Some(order_id),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FleetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(!FleetError::input("empty fleet").is_recoverable());
        assert!(FleetError::SolverTimeout {
            vehicle_id: "ABC1234".into(),
            budget_ms: 10,
        }
        .is_recoverable());
        let provider = FleetError::Provider {
            from: 0,
            to: 1,
            attempts: 3,
            message: "timeout".into(),
        };
        assert!(!provider.is_recoverable());
    }

    #[test]
    fn test_display_carries_identifiers() {
        let err = FleetError::Capacity {
            order_id: "P-17".into(),
            cluster_id: Some(2),
            weight: 900.0,
            volume: 1.5,
        };
        let text = err.to_string();
        assert!(text.contains("P-17"));
        assert!(text.contains("Some(2)"));
        assert_eq!(err.order_id(), Some("P-17"));
    }

    #[test]
    fn test_rejection_is_recoverable() {
        let err = FleetError::Rejected {
            order_id: "P-3".into(),
            client_id: "123".into(),
            reason: "zone Zona A is forbidden".into(),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.order_id(), Some("P-3"));
        assert!(err.to_string().contains("123"));
    }
}
