//! Priority ranking of clusters.

use super::config::PriorityCriterion;
use crate::error::{FleetError, Result};
use crate::models::Order;

/// The criterion value of a single order.
///
/// # Errors
/// [`FleetError::Input`] when ranking by urgency and the order has no priority.
pub fn criterion_value(order: &Order, criterion: PriorityCriterion) -> Result<f64> {
    match criterion {
        PriorityCriterion::Weight => Ok(order.weight),
        PriorityCriterion::Volume => Ok(order.volume),
        PriorityCriterion::OrderCount => Ok(1.0),
        PriorityCriterion::Urgency => order.priority.ok_or_else(|| {
            FleetError::input(format!(
                "order {}: priority is required to rank by urgency",
                order.id
            ))
        }),
    }
}

/// Ranks totals descending: the largest total gets rank 1.
///
/// Returns the rank of each input position. Equal totals keep their input
/// order, so the result is deterministic.
///
/// # Examples
///
/// ```
/// use u_fleet::cluster::rank_descending;
///
/// assert_eq!(rank_descending(&[5.0, 20.0, 10.0]), vec![3, 1, 2]);
/// ```
pub fn rank_descending(totals: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..totals.len()).collect();
    order.sort_by(|&a, &b| totals[b].total_cmp(&totals[a]).then(a.cmp(&b)));

    let mut ranks = vec![0; totals.len()];
    for (position, idx) in order.into_iter().enumerate() {
        ranks[idx] = position + 1;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_descending() {
        assert_eq!(rank_descending(&[1.0, 3.0, 2.0]), vec![3, 1, 2]);
        assert!(rank_descending(&[]).is_empty());
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        assert_eq!(rank_descending(&[4.0, 4.0, 9.0]), vec![2, 3, 1]);
    }

    #[test]
    fn test_criterion_values() {
        let o = Order::new("A", 12.0, 0.0, 0.0).with_volume(0.5);
        assert_eq!(criterion_value(&o, PriorityCriterion::Weight).ok(), Some(12.0));
        assert_eq!(criterion_value(&o, PriorityCriterion::Volume).ok(), Some(0.5));
        assert_eq!(criterion_value(&o, PriorityCriterion::OrderCount).ok(), Some(1.0));
    }

    #[test]
    fn test_urgency_requires_priority() {
        let o = Order::new("A", 12.0, 0.0, 0.0);
        let err = criterion_value(&o, PriorityCriterion::Urgency).unwrap_err();
        assert!(matches!(err, FleetError::Input(_)));
        let o = o.with_priority(3.0);
        assert_eq!(criterion_value(&o, PriorityCriterion::Urgency).ok(), Some(3.0));
    }
}
