//! End-to-end fleet planning.
//!
//! [`FleetPlanner`] validates the input, clusters orders, allocates them
//! to vehicles, builds the travel matrix, sequences every vehicle with one
//! or more strategies and keeps the candidate the
//! [`MultiObjectiveSelector`](crate::select::MultiObjectiveSelector) ranks
//! first. Non-fatal problems are collected in the [`SolveReport`].

mod config;
mod history;
mod runner;

pub use config::PlannerConfig;
pub use history::{HistoryEntry, HistoryStore, MemoryHistory};
pub use runner::{FleetPlanner, SolveReport};
