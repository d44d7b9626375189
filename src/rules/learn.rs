//! Preferred delivery windows learned from past deliveries.

use std::collections::HashMap;

use tracing::debug;

use crate::models::TimeWindow;

/// One past delivery: the client and the interval it was delivered in.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeliveryObservation {
    pub client_id: String,
    pub window: TimeWindow,
}

impl DeliveryObservation {
    pub fn new(client_id: impl Into<String>, window: TimeWindow) -> Self {
        Self {
            client_id: client_id.into(),
            window,
        }
    }
}

/// The most frequent delivery window per client.
///
/// Ties go to the window seen first for that client.
///
/// # Examples
///
/// ```
/// use u_fleet::models::TimeWindow;
/// use u_fleet::rules::{learn_preferred_windows, DeliveryObservation};
///
/// let morning = TimeWindow::new(0.0, 14_400.0).unwrap();
/// let afternoon = TimeWindow::new(21_600.0, 36_000.0).unwrap();
/// let history = [
///     DeliveryObservation::new("123", morning),
///     DeliveryObservation::new("123", afternoon),
///     DeliveryObservation::new("123", afternoon),
/// ];
/// let preferred = learn_preferred_windows(&history);
/// assert_eq!(preferred["123"], afternoon);
/// ```
pub fn learn_preferred_windows(observations: &[DeliveryObservation]) -> HashMap<String, TimeWindow> {
    let mut counts: HashMap<&str, Vec<(TimeWindow, usize)>> = HashMap::new();
    for obs in observations {
        let slots = counts.entry(obs.client_id.as_str()).or_default();
        match slots.iter_mut().find(|(w, _)| *w == obs.window) {
            Some((_, n)) => *n += 1,
            None => slots.push((obs.window, 1)),
        }
    }

    let preferred: HashMap<String, TimeWindow> = counts
        .into_iter()
        .filter_map(|(client, slots)| {
            let mut best: Option<(TimeWindow, usize)> = None;
            for (w, n) in slots {
                if best.map_or(true, |(_, m)| n > m) {
                    best = Some((w, n));
                }
            }
            best.map(|(w, _)| (client.to_string(), w))
        })
        .collect();
    debug!(observations = observations.len(), clients = preferred.len(), "delivery preferences learned");
    preferred
}
