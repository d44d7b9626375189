//! Choosing among competing routing solutions.
//!
//! Candidates carry total cost, time and emissions. The selector ranks
//! them by a weighted sum of max-normalised metrics and reports each
//! candidate's Pareto front alongside the score.

mod pareto;
mod runner;
mod types;

pub use pareto::pareto_fronts;
pub use runner::MultiObjectiveSelector;
pub use types::{Candidate, ObjectiveWeights, ScoredCandidate, OBJECTIVES};
