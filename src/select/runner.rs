//! Weighted ranking of candidates.

use tracing::{debug, info};

use super::pareto::pareto_fronts;
use super::types::{Candidate, ObjectiveWeights, ScoredCandidate, OBJECTIVES};
use crate::error::{FleetError, Result};

/// Ranks candidates by coverage, then by a weighted sum of max-normalised
/// metrics.
///
/// A candidate that leaves fewer orders unserved always ranks ahead, since
/// its totals cover more work. Among equal coverage, each metric is divided
/// by its maximum over the candidates (a maximum of 0 normalises to 0) and
/// the weighted sums are ranked ascending; ties keep input order.
///
/// # Examples
///
/// ```
/// use u_fleet::select::{Candidate, MultiObjectiveSelector, ObjectiveWeights};
///
/// let candidates = [
///     Candidate::new("a", 10.0, 5.0, 1.0),
///     Candidate::new("b", 20.0, 10.0, 2.0),
/// ];
/// let ranked = MultiObjectiveSelector::rank(&candidates, &ObjectiveWeights::new(0.5, 0.3, 0.2)).unwrap();
/// assert_eq!(ranked[0].label, "a");
/// assert!((ranked[0].score - 0.5).abs() < 1e-12);
/// assert!((ranked[1].score - 1.0).abs() < 1e-12);
/// ```
pub struct MultiObjectiveSelector;

impl MultiObjectiveSelector {
    /// Scores and sorts `candidates`, best first.
    ///
    /// # Errors
    /// [`FleetError::Input`] for a negative or non-finite weight or metric.
    pub fn rank(candidates: &[Candidate], weights: &ObjectiveWeights) -> Result<Vec<ScoredCandidate>> {
        weights.validate().map_err(FleetError::Input)?;
        for c in candidates {
            if c.metrics().iter().any(|m| !m.is_finite() || *m < 0.0) {
                return Err(FleetError::input(format!(
                    "candidate {}: metrics must be non-negative numbers, got {:?}",
                    c.label,
                    c.metrics()
                )));
            }
        }

        let metrics: Vec<[f64; OBJECTIVES]> = candidates.iter().map(Candidate::metrics).collect();
        let mut max = [0.0f64; OBJECTIVES];
        for row in &metrics {
            for (m, &v) in max.iter_mut().zip(row) {
                *m = m.max(v);
            }
        }

        let w = weights.as_array();
        let fronts = pareto_fronts(&metrics);
        let mut scored: Vec<ScoredCandidate> = candidates
            .iter()
            .zip(&metrics)
            .enumerate()
            .map(|(index, (c, row))| {
                let mut normalized = [0.0; OBJECTIVES];
                for k in 0..OBJECTIVES {
                    normalized[k] = if max[k] > 0.0 { row[k] / max[k] } else { 0.0 };
                }
                let score: f64 = normalized.iter().zip(&w).map(|(n, w)| n * w).sum();
                debug!(candidate = %c.label, score, front = fronts[index], "candidate scored");
                ScoredCandidate {
                    index,
                    label: c.label.clone(),
                    dropped: c.dropped,
                    score,
                    normalized,
                    front: fronts[index],
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            a.dropped
                .cmp(&b.dropped)
                .then(a.score.total_cmp(&b.score))
                .then(a.index.cmp(&b.index))
        });
        if let Some(best) = scored.first() {
            info!(candidates = scored.len(), best = %best.label, score = best.score, "selection complete");
        }
        Ok(scored)
    }

    /// The best-ranked candidate, if any.
    pub fn best(candidates: &[Candidate], weights: &ObjectiveWeights) -> Result<Option<ScoredCandidate>> {
        Ok(Self::rank(candidates, weights)?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dominant_candidate_first() {
        let candidates = [
            Candidate::new("first", 10.0, 5.0, 1.0),
            Candidate::new("second", 20.0, 10.0, 2.0),
        ];
        let ranked = MultiObjectiveSelector::rank(&candidates, &ObjectiveWeights::default()).unwrap();
        assert_eq!(ranked[0].index, 0);
        assert!(ranked[0].score < ranked[1].score);
        assert_eq!(ranked[0].front, 0);
        assert_eq!(ranked[1].front, 1);
    }

    #[test]
    fn test_zero_metric_normalises_to_zero() {
        let candidates = [Candidate::new("a", 0.0, 10.0, 0.0), Candidate::new("b", 0.0, 5.0, 0.0)];
        let ranked = MultiObjectiveSelector::rank(&candidates, &ObjectiveWeights::new(1.0, 1.0, 1.0)).unwrap();
        assert_eq!(ranked[0].label, "b");
        assert_eq!(ranked[0].normalized, [0.0, 0.5, 0.0]);
        assert!(ranked.iter().all(|s| s.score.is_finite()));
    }

    #[test]
    fn test_weights_change_winner() {
        let candidates = [Candidate::new("cheap", 10.0, 100.0, 1.0), Candidate::new("fast", 20.0, 50.0, 1.0)];
        let by_cost = MultiObjectiveSelector::best(&candidates, &ObjectiveWeights::new(1.0, 0.0, 0.0)).unwrap();
        let by_time = MultiObjectiveSelector::best(&candidates, &ObjectiveWeights::new(0.0, 1.0, 0.0)).unwrap();
        assert_eq!(by_cost.unwrap().label, "cheap");
        assert_eq!(by_time.unwrap().label, "fast");
    }

    #[test]
    fn test_ties_keep_input_order() {
        let candidates = [Candidate::new("x", 1.0, 1.0, 1.0), Candidate::new("y", 1.0, 1.0, 1.0)];
        let ranked = MultiObjectiveSelector::rank(&candidates, &ObjectiveWeights::default()).unwrap();
        assert_eq!(ranked[0].label, "x");
        assert_eq!(ranked[1].label, "y");
    }

    #[test]
    fn test_coverage_beats_cheaper_totals() {
        let candidates = [
            Candidate::new("empty", 0.0, 0.0, 0.0).with_dropped(3),
            Candidate::new("partial", 5.0, 50.0, 1.0).with_dropped(1),
            Candidate::new("full", 10.0, 100.0, 2.0),
        ];
        let ranked = MultiObjectiveSelector::rank(&candidates, &ObjectiveWeights::default()).unwrap();
        let labels: Vec<&str> = ranked.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, ["full", "partial", "empty"]);
        assert_eq!(ranked[0].dropped, 0);
        assert!(ranked[0].score > ranked[2].score);
    }

    #[test]
    fn test_empty_and_invalid() {
        assert!(MultiObjectiveSelector::rank(&[], &ObjectiveWeights::default()).unwrap().is_empty());
        let bad = ObjectiveWeights::new(-1.0, 0.0, 0.0);
        assert!(MultiObjectiveSelector::rank(&[], &bad).is_err());
        let nan = [Candidate::new("n", f64::NAN, 0.0, 0.0)];
        assert!(MultiObjectiveSelector::rank(&nan, &ObjectiveWeights::default()).is_err());
    }
}
