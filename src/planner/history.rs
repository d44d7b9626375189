//! Solve history.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

use crate::models::Route;

/// One solve as persisted for later analysis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub routes: Vec<Route>,
    /// Per-route cost, aligned with `routes`.
    pub costs: Vec<f64>,
    /// Per-route estimated seconds, aligned with `routes`.
    pub estimated_times: Vec<f64>,
}

impl HistoryEntry {
    pub fn new(timestamp: DateTime<Utc>, routes: Vec<Route>) -> Self {
        let costs = routes.iter().map(|r| r.total_cost).collect();
        let estimated_times = routes.iter().map(|r| r.estimated_time).collect();
        Self {
            timestamp,
            routes,
            costs,
            estimated_times,
        }
    }

    pub fn total_cost(&self) -> f64 {
        self.costs.iter().sum()
    }
}

/// Append-only sink for solve history.
///
/// Implementations own their storage; a failed append is reported back to
/// the planner, which logs it and keeps the solve result.
pub trait HistoryStore: Send + Sync {
    fn append(&self, entry: HistoryEntry) -> Result<(), String>;

    /// Every entry, oldest first.
    fn read_all(&self) -> Result<Vec<HistoryEntry>, String>;
}

/// In-memory history.
#[derive(Debug, Default)]
pub struct MemoryHistory {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&self, entry: HistoryEntry) -> Result<(), String> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).push(entry);
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<HistoryEntry>, String> {
        Ok(self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(id: &str, cost: f64, time: f64) -> Route {
        let mut r = Route::new(id);
        r.total_cost = cost;
        r.estimated_time = time;
        r
    }

    #[test]
    fn test_entry_columns() {
        let entry = HistoryEntry::new(Utc::now(), vec![route("A", 3.0, 60.0), route("B", 4.5, 90.0)]);
        assert_eq!(entry.costs, vec![3.0, 4.5]);
        assert_eq!(entry.estimated_times, vec![60.0, 90.0]);
        assert_eq!(entry.total_cost(), 7.5);
    }

    #[test]
    fn test_memory_history_appends_in_order() {
        let history = MemoryHistory::new();
        assert!(history.is_empty());
        history.append(HistoryEntry::new(Utc::now(), vec![route("A", 1.0, 1.0)])).unwrap();
        history.append(HistoryEntry::new(Utc::now(), vec![])).unwrap();
        let all = history.read_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].routes.len(), 1);
        assert!(all[1].routes.is_empty());
    }
}
