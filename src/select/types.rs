//! Candidates and objective weights.

use crate::sequence::SequenceResult;

/// Number of scored objectives.
pub const OBJECTIVES: usize = 3;

/// One competing solution, summarised by its totals.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Candidate {
    pub label: String,
    pub cost: f64,
    /// Seconds.
    pub time: f64,
    /// kg CO2.
    pub emissions: f64,
    /// Orders this solution leaves unserved (dropped or timed out).
    pub dropped: usize,
}

impl Candidate {
    pub fn new(label: impl Into<String>, cost: f64, time: f64, emissions: f64) -> Self {
        Self {
            label: label.into(),
            cost,
            time,
            emissions,
            dropped: 0,
        }
    }

    pub fn with_dropped(mut self, dropped: usize) -> Self {
        self.dropped = dropped;
        self
    }

    /// Totals over every route of a sequencing run, plus the number of
    /// stops it dropped or timed out on.
    pub fn from_sequence(label: impl Into<String>, result: &SequenceResult) -> Self {
        Self::new(label, result.total_cost(), result.total_time(), result.total_emissions())
            .with_dropped(result.dropped_count())
    }

    /// `[cost, time, emissions]`.
    pub fn metrics(&self) -> [f64; OBJECTIVES] {
        [self.cost, self.time, self.emissions]
    }
}

/// Relative importance of each objective. Need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectiveWeights {
    pub cost: f64,
    pub time: f64,
    pub emissions: f64,
}

impl Default for ObjectiveWeights {
    fn default() -> Self {
        Self {
            cost: 0.5,
            time: 0.3,
            emissions: 0.2,
        }
    }
}

impl ObjectiveWeights {
    pub fn new(cost: f64, time: f64, emissions: f64) -> Self {
        Self { cost, time, emissions }
    }

    pub fn as_array(&self) -> [f64; OBJECTIVES] {
        [self.cost, self.time, self.emissions]
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, w) in [("cost", self.cost), ("time", self.time), ("emissions", self.emissions)] {
            if !w.is_finite() || w < 0.0 {
                return Err(format!("{name} weight must be a non-negative number, got {w}"));
            }
        }
        Ok(())
    }
}

/// A candidate's position in the ranking.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScoredCandidate {
    /// Index into the input slice.
    pub index: usize,
    pub label: String,
    /// Unserved orders; ranked before the score.
    pub dropped: usize,
    /// Weighted sum of max-normalised metrics. Lower is better.
    pub score: f64,
    /// Normalised `[cost, time, emissions]`.
    pub normalized: [f64; OBJECTIVES],
    /// Pareto front, 0 for non-dominated candidates.
    pub front: usize,
}
