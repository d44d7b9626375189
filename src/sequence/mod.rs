//! Per-vehicle route sequencing.
//!
//! Each vehicle's allocated stops are ordered independently against a
//! shared [`TravelMatrix`](crate::matrix::TravelMatrix). Three searches are
//! available:
//!
//! - **Guided local search**: cheapest-arc construction that respects time
//!   windows, then 2-opt/relocate descent with arc penalties. Every
//!   intermediate tour is feasible.
//! - **Simulated annealing**: nearest-neighbour construction, swap moves on
//!   a penalized cost, then window repair.
//! - **Genetic algorithm**: a nearest-neighbour seeded population with order
//!   crossover, then window repair.
//!
//! All searches honour a wall-clock budget and a cancellation flag, and
//! stops that cannot be served within their window are reported rather
//! than silently dropped.
//!
//! # References
//!
//! - Kirkpatrick et al. (1983), "Optimization by Simulated Annealing"
//! - Voudouris & Tsang (1999), "Guided local search and its application to
//!   the traveling salesman problem"

mod anneal;
mod config;
mod construct;
mod evaluator;
mod genetic;
mod gls;
pub mod operators;
mod runner;
mod types;

pub use anneal::anneal;
pub use config::{AnnealConfig, GeneticConfig, GlsConfig, SequencerConfig, Strategy};
pub use construct::{cheapest_arc, nearest_neighbor, Interrupted};
pub use evaluator::{RouteProblem, Schedule, Visit};
pub use genetic::evolve;
pub use gls::guided_local_search;
pub use runner::{RouteSequencer, SequenceResult, VehicleSequence};
pub use types::{SearchOutcome, StopCondition, StopSpec, VehiclePlan, Violation};
