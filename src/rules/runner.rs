//! Applying client rules to an order book.

use tracing::{debug, info};

use super::types::ClientRules;
use crate::error::{FleetError, Result};
use crate::models::Order;

/// Orders that passed the rules, and one [`FleetError::Rejected`] per order
/// that did not.
#[derive(Debug, Clone, Default)]
pub struct RuleOutcome {
    /// Accepted orders, by ascending client priority; input order within
    /// a priority.
    pub orders: Vec<Order>,
    pub rejected: Vec<FleetError>,
}

/// Applies [`ClientRules`] before routing.
///
/// For each order whose client has a rule:
///
/// 1. If the client prefers a delivery window, an order whose own window
///    does not overlap it is rejected. Otherwise the order's window becomes
///    the overlap (or the client's window, if the order had none).
/// 2. An order in one of the client's forbidden zones is rejected.
///
/// Accepted orders are then stably sorted by client priority, so the
/// allocator's input-order tie-break favours higher-priority clients.
///
/// # Examples
///
/// ```
/// use u_fleet::models::Order;
/// use u_fleet::rules::{BusinessRules, ClientRule, ClientRules};
///
/// let rules = ClientRules::new()
///     .with_rule("vip", ClientRule::default().with_priority(1))
///     .with_rule("c2", ClientRule::default().with_priority(2).with_forbidden_zone("Zona A"));
/// let orders = vec![
///     Order::new("P1", 5.0, 0.0, 0.0).with_client("c2").with_zone("Zona A"),
///     Order::new("P2", 5.0, 0.0, 0.0).with_client("c2"),
///     Order::new("P3", 5.0, 0.0, 0.0).with_client("vip"),
/// ];
///
/// let outcome = BusinessRules::apply(&orders, &rules).unwrap();
/// let ids: Vec<&str> = outcome.orders.iter().map(|o| o.id.as_str()).collect();
/// assert_eq!(ids, ["P3", "P2"]);
/// assert_eq!(outcome.rejected[0].order_id(), Some("P1"));
/// ```
pub struct BusinessRules;

impl BusinessRules {
    /// # Errors
    /// [`FleetError::Input`] for a malformed rule table.
    pub fn apply(orders: &[Order], rules: &ClientRules) -> Result<RuleOutcome> {
        rules.validate().map_err(FleetError::Input)?;

        let mut accepted = Vec::with_capacity(orders.len());
        let mut rejected = Vec::new();
        for order in orders {
            let Some((client, rule)) = order
                .client_id
                .as_deref()
                .and_then(|c| rules.get(c).map(|r| (c, r)))
            else {
                accepted.push(order.clone());
                continue;
            };

            let reject = |reason: String| FleetError::Rejected {
                order_id: order.id.clone(),
                client_id: client.to_string(),
                reason,
            };

            let mut order = order.clone();
            if let Some(preferred) = rule.delivery_window {
                match order.time_window {
                    Some(own) => match own.intersect(&preferred) {
                        Some(overlap) => order.time_window = Some(overlap),
                        None => {
                            rejected.push(reject(format!(
                                "window [{}, {}] misses preferred window [{}, {}]",
                                own.start(),
                                own.end(),
                                preferred.start(),
                                preferred.end()
                            )));
                            continue;
                        }
                    },
                    None => order.time_window = Some(preferred),
                }
            }
            if let Some(zone) = order.zone.as_deref().filter(|z| rule.forbids(z)) {
                rejected.push(reject(format!("zone {zone} is forbidden")));
                continue;
            }
            accepted.push(order);
        }

        accepted.sort_by_key(|o| rules.priority_of(o.client_id.as_deref()));
        for err in &rejected {
            debug!(%err, "order rejected by client rule");
        }
        info!(
            accepted = accepted.len(),
            rejected = rejected.len(),
            "client rules applied"
        );
        Ok(RuleOutcome {
            orders: accepted,
            rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeWindow;
    use crate::rules::ClientRule;

    fn window(a: f64, b: f64) -> TimeWindow {
        TimeWindow::new(a, b).expect("valid")
    }

    fn rules() -> ClientRules {
        ClientRules::new()
            .with_rule(
                "123",
                ClientRule::default()
                    .with_priority(1)
                    .with_delivery_window(window(0.0, 14_400.0))
                    .with_forbidden_zone("Zona A"),
            )
            .with_rule("456", ClientRule::default().with_priority(2).with_delivery_window(window(21_600.0, 36_000.0)))
    }

    #[test]
    fn test_priority_order_is_stable() {
        let orders = vec![
            Order::new("A", 1.0, 0.0, 0.0),
            Order::new("B", 1.0, 0.0, 0.0).with_client("456"),
            Order::new("C", 1.0, 0.0, 0.0).with_client("123"),
            Order::new("D", 1.0, 0.0, 0.0),
            Order::new("E", 1.0, 0.0, 0.0).with_client("123"),
        ];
        let out = BusinessRules::apply(&orders, &rules()).unwrap();
        let ids: Vec<&str> = out.orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["C", "E", "B", "A", "D"]);
        assert!(out.rejected.is_empty());
    }

    #[test]
    fn test_window_narrowed_or_rejected() {
        let orders = vec![
            Order::new("in", 1.0, 0.0, 0.0).with_client("123").with_time_window(window(3_600.0, 20_000.0)),
            Order::new("out", 1.0, 0.0, 0.0).with_client("456").with_time_window(window(0.0, 3_600.0)),
            Order::new("open", 1.0, 0.0, 0.0).with_client("456"),
        ];
        let out = BusinessRules::apply(&orders, &rules()).unwrap();
        assert_eq!(out.orders[0].time_window, Some(window(3_600.0, 14_400.0)));
        assert_eq!(out.orders[1].id, "open");
        assert_eq!(out.orders[1].time_window, Some(window(21_600.0, 36_000.0)));
        assert_eq!(out.rejected.len(), 1);
        assert!(matches!(&out.rejected[0], FleetError::Rejected { order_id, client_id, .. } if order_id == "out" && client_id == "456"));
    }

    #[test]
    fn test_forbidden_zone_rejected() {
        let orders = vec![
            Order::new("P1", 1.0, 0.0, 0.0).with_client("123").with_zone("Zona A"),
            Order::new("P2", 1.0, 0.0, 0.0).with_client("123").with_zone("Zona B"),
            Order::new("P3", 1.0, 0.0, 0.0).with_client("456").with_zone("Zona A"),
        ];
        let out = BusinessRules::apply(&orders, &rules()).unwrap();
        let ids: Vec<&str> = out.orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["P2", "P3"]);
        assert_eq!(out.rejected.len(), 1);
        assert!(out.rejected[0].to_string().contains("Zona A"));
    }

    #[test]
    fn test_conserves_orders() {
        let orders: Vec<Order> = (0..12)
            .map(|i| {
                let o = Order::new(format!("P{i}"), 1.0, 0.0, 0.0).with_zone(if i % 3 == 0 { "Zona A" } else { "Zona C" });
                match i % 4 {
                    0 => o.with_client("123"),
                    1 => o.with_client("456").with_time_window(window(0.0, 100.0)),
                    _ => o,
                }
            })
            .collect();
        let out = BusinessRules::apply(&orders, &rules()).unwrap();
        assert_eq!(out.orders.len() + out.rejected.len(), orders.len());
    }
}
