//! Client business rules applied before routing.
//!
//! A [`ClientRules`] table gives each client a service priority, a
//! preferred delivery window and zones its orders may not be delivered to.
//! [`BusinessRules::apply`] filters and orders an order book against it;
//! filtered orders come back as [`FleetError::Rejected`](crate::FleetError)
//! so they can be reported. Preferred windows can also be learned from past
//! deliveries with [`learn_preferred_windows`].

mod learn;
mod runner;
mod types;

pub use learn::{learn_preferred_windows, DeliveryObservation};
pub use runner::{BusinessRules, RuleOutcome};
pub use types::{ClientRule, ClientRules, DEFAULT_CLIENT_PRIORITY};
