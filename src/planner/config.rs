//! Planner configuration.

use crate::allocate::AllocationConfig;
use crate::cluster::ClusterConfig;
use crate::matrix::RetryPolicy;
use crate::select::ObjectiveWeights;
use crate::sequence::{SequencerConfig, Strategy};

/// Configuration for a full solve.
///
/// # Examples
///
/// ```
/// use u_fleet::cluster::{ClusterConfig, ClusterMethod};
/// use u_fleet::planner::PlannerConfig;
/// use u_fleet::sequence::Strategy;
///
/// let config = PlannerConfig::fast()
///     .with_cluster(ClusterConfig::default().with_method(ClusterMethod::Centroid { k: 3 }))
///     .with_candidates(vec![Strategy::Annealing, Strategy::Genetic]);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlannerConfig {
    pub cluster: ClusterConfig,
    pub allocation: AllocationConfig,
    pub sequencer: SequencerConfig,
    pub retry: RetryPolicy,
    pub weights: ObjectiveWeights,

    /// Strategies sequenced on the same allocation and compared by the
    /// selector. Empty means only `sequencer.strategy`. The time budget is
    /// split evenly between them.
    pub candidates: Vec<Strategy>,
}

impl PlannerConfig {
    pub fn fast() -> Self {
        Self {
            sequencer: SequencerConfig::fast(),
            ..Self::default()
        }
    }

    pub fn balanced() -> Self {
        Self::default()
    }

    /// Compares all three searches with the long budget.
    pub fn quality() -> Self {
        Self {
            sequencer: SequencerConfig::quality(),
            candidates: vec![Strategy::GuidedLocalSearch, Strategy::Annealing, Strategy::Genetic],
            ..Self::default()
        }
    }

    pub fn with_cluster(mut self, cluster: ClusterConfig) -> Self {
        self.cluster = cluster;
        self
    }

    pub fn with_allocation(mut self, allocation: AllocationConfig) -> Self {
        self.allocation = allocation;
        self
    }

    pub fn with_sequencer(mut self, sequencer: SequencerConfig) -> Self {
        self.sequencer = sequencer;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_weights(mut self, weights: ObjectiveWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_candidates(mut self, candidates: Vec<Strategy>) -> Self {
        self.candidates = candidates;
        self
    }

    /// The strategies a solve will run, in order.
    pub fn strategies(&self) -> Vec<Strategy> {
        if self.candidates.is_empty() {
            vec![self.sequencer.strategy]
        } else {
            self.candidates.clone()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        self.cluster.validate()?;
        self.allocation.validate()?;
        self.sequencer.validate()?;
        self.retry.validate()?;
        self.weights.validate()?;
        let strategies = self.strategies();
        if strategies.iter().enumerate().any(|(i, s)| strategies[..i].contains(s)) {
            return Err("candidate strategies must be distinct".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_single_strategy() {
        let config = PlannerConfig::default();
        assert_eq!(config.strategies(), vec![Strategy::Auto]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_quality_compares_all() {
        assert_eq!(PlannerConfig::quality().strategies().len(), 3);
    }

    #[test]
    fn test_duplicate_candidates_rejected() {
        let config = PlannerConfig::default().with_candidates(vec![Strategy::Annealing, Strategy::Annealing]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nested_validation() {
        let config = PlannerConfig::default().with_weights(ObjectiveWeights::new(f64::NAN, 0.0, 0.0));
        assert!(config.validate().is_err());
    }
}
