//! Per-client rule tables.

use std::collections::HashMap;

use crate::models::TimeWindow;

/// Priority given to clients without a rule. Lower is served first.
pub const DEFAULT_CLIENT_PRIORITY: u32 = 999;

/// Business rules for one client.
///
/// # Examples
///
/// ```
/// use u_fleet::models::TimeWindow;
/// use u_fleet::rules::ClientRule;
///
/// let rule = ClientRule::default()
///     .with_priority(1)
///     .with_delivery_window(TimeWindow::new(0.0, 14_400.0).unwrap())
///     .with_forbidden_zone("Zona A");
/// assert!(rule.forbids("Zona A"));
/// assert!(!rule.forbids("Zona B"));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientRule {
    /// Service order among clients; 1 for the most important.
    pub priority: u32,

    /// Preferred delivery interval, seconds from departure. Orders whose
    /// own window misses it are rejected; the others are narrowed to it.
    pub delivery_window: Option<TimeWindow>,

    /// Zones this client's orders may not be delivered to.
    pub forbidden_zones: Vec<String>,
}

impl Default for ClientRule {
    fn default() -> Self {
        Self {
            priority: DEFAULT_CLIENT_PRIORITY,
            delivery_window: None,
            forbidden_zones: Vec::new(),
        }
    }
}

impl ClientRule {
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_delivery_window(mut self, window: TimeWindow) -> Self {
        self.delivery_window = Some(window);
        self
    }

    pub fn with_forbidden_zone(mut self, zone: impl Into<String>) -> Self {
        self.forbidden_zones.push(zone.into());
        self
    }

    pub fn forbids(&self, zone: &str) -> bool {
        self.forbidden_zones.iter().any(|z| z == zone)
    }
}

/// Rule table keyed by client id.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClientRules {
    rules: HashMap<String, ClientRule>,
}

impl ClientRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, client_id: impl Into<String>, rule: ClientRule) -> Self {
        self.insert(client_id, rule);
        self
    }

    pub fn insert(&mut self, client_id: impl Into<String>, rule: ClientRule) {
        self.rules.insert(client_id.into(), rule);
    }

    pub fn get(&self, client_id: &str) -> Option<&ClientRule> {
        self.rules.get(client_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Priority of an order's client; [`DEFAULT_CLIENT_PRIORITY`] when the
    /// order has no client or the client has no rule.
    pub fn priority_of(&self, client_id: Option<&str>) -> u32 {
        client_id
            .and_then(|c| self.get(c))
            .map_or(DEFAULT_CLIENT_PRIORITY, |r| r.priority)
    }

    /// Fills in learned delivery windows for clients that have none.
    /// Explicit windows are kept.
    pub fn with_learned_windows(mut self, preferred: &HashMap<String, TimeWindow>) -> Self {
        for (client, window) in preferred {
            let rule = self.rules.entry(client.clone()).or_default();
            if rule.delivery_window.is_none() {
                rule.delivery_window = Some(*window);
            }
        }
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        for (client, rule) in &self.rules {
            if client.trim().is_empty() {
                return Err("client rule with an empty client id".into());
            }
            if rule.forbidden_zones.iter().any(|z| z.trim().is_empty()) {
                return Err(format!("client {client}: empty forbidden zone name"));
            }
        }
        Ok(())
    }
}
