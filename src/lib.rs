//! Fleet routing optimization.
//!
//! Plans delivery routes for a fleet of capacity-bounded vehicles:
//!
//! - **Client rules** ([`rules`]): per-client priority, preferred delivery
//!   windows and forbidden zones, applied before routing.
//! - **Clustering** ([`cluster`]): groups geocoded orders by seeded k-means
//!   or DBSCAN and ranks the groups by a priority criterion.
//! - **Allocation** ([`allocate`]): first-fit-decreasing assignment of
//!   orders to vehicles, never exceeding weight or volume capacity.
//! - **Sequencing** ([`sequence`]): per-vehicle visiting order under time
//!   windows, via guided local search, simulated annealing or a genetic
//!   algorithm, all bounded by a wall-clock budget and cancellable.
//! - **Selection** ([`select`]): ranks competing solutions by a weighted
//!   sum of max-normalised cost, time and emissions.
//! - **Feedback** ([`feedback`]): turns executed routes into delay and
//!   deviation records and fits a delay model published as versioned
//!   snapshots.
//!
//! [`planner::FleetPlanner`] runs the phases in order. The core performs no
//! network or file I/O: travel estimates come from a
//! [`matrix::TravelProvider`] and history goes to a
//! [`planner::HistoryStore`], both supplied by the caller.
//!
//! # Units
//!
//! Distances are metres, times are seconds, and time windows are offsets
//! from the vehicle's departure. Costs and emissions are per kilometre.
//!
//! # Features
//!
//! - `parallel`: sequences vehicles and evaluates genetic populations on
//!   the rayon thread pool.
//! - `serde`: serialization for records, configurations, routes, feedback
//!   and history.

pub mod allocate;
pub mod cluster;
pub mod error;
pub mod feedback;
pub mod matrix;
pub mod models;
pub mod planner;
pub mod random;
pub mod rules;
pub mod scenario;
pub mod select;
pub mod sequence;

pub use error::{FleetError, Result};
