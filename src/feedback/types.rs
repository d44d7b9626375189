//! Execution outcomes and derived metrics.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::models::Route;

/// What actually happened on a route, as reported after execution.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExecutedRoute {
    pub route_id: String,
    pub planned_stops: Vec<String>,
    pub executed_stops: Vec<String>,
    /// Planned duration in seconds.
    pub estimated_time: f64,
    /// Observed duration in seconds.
    pub actual_time: f64,
    /// Planned distance in metres.
    pub distance: f64,
}

impl ExecutedRoute {
    /// Builds an outcome for a planned route; the route id is the vehicle plate.
    pub fn from_route(route: &Route, executed_stops: Vec<String>, actual_time: f64) -> Self {
        Self {
            route_id: route.vehicle_id.clone(),
            planned_stops: route.stops.iter().map(|s| s.order_id.clone()).collect(),
            executed_stops,
            estimated_time: route.estimated_time,
            actual_time,
            distance: route.total_distance,
        }
    }
}

/// `max(0, actual - estimated)`.
pub fn delay(estimated_time: f64, actual_time: f64) -> f64 {
    (actual_time - estimated_time).max(0.0)
}

/// Size of the symmetric difference between planned and executed stop sets.
///
/// # Examples
///
/// ```
/// use u_fleet::feedback::deviation_count;
///
/// let planned = ["A", "B", "C"];
/// let executed = ["A", "C"];
/// assert_eq!(deviation_count(&planned, &executed), 1);
/// ```
pub fn deviation_count<S: AsRef<str>>(planned: &[S], executed: &[S]) -> usize {
    let p: HashSet<&str> = planned.iter().map(AsRef::as_ref).collect();
    let e: HashSet<&str> = executed.iter().map(AsRef::as_ref).collect();
    p.symmetric_difference(&e).count()
}

/// `estimated / actual × 100`, or 0 when nothing was measured.
pub fn efficiency(estimated_time: f64, actual_time: f64) -> f64 {
    if actual_time > 0.0 {
        estimated_time / actual_time * 100.0
    } else {
        0.0
    }
}

/// One immutable entry of the feedback log.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedbackRecord {
    route_id: String,
    timestamp: DateTime<Utc>,
    planned_time: f64,
    actual_time: f64,
    delay: f64,
    deviation_count: usize,
    planned_distance: f64,
    efficiency: f64,
}

impl FeedbackRecord {
    /// Derives the record for an executed route.
    pub fn from_execution(executed: &ExecutedRoute, timestamp: DateTime<Utc>) -> Self {
        Self {
            route_id: executed.route_id.clone(),
            timestamp,
            planned_time: executed.estimated_time,
            actual_time: executed.actual_time,
            delay: delay(executed.estimated_time, executed.actual_time),
            deviation_count: deviation_count(&executed.planned_stops, &executed.executed_stops),
            planned_distance: executed.distance,
            efficiency: efficiency(executed.estimated_time, executed.actual_time),
        }
    }

    pub fn route_id(&self) -> &str {
        &self.route_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn planned_time(&self) -> f64 {
        self.planned_time
    }

    pub fn actual_time(&self) -> f64 {
        self.actual_time
    }

    /// Seconds late, never negative.
    pub fn delay(&self) -> f64 {
        self.delay
    }

    pub fn deviation_count(&self) -> usize {
        self.deviation_count
    }

    pub fn planned_distance(&self) -> f64 {
        self.planned_distance
    }

    /// Percent; 0 when the actual time was zero.
    pub fn efficiency(&self) -> f64 {
        self.efficiency
    }
}

/// Aggregate performance over the feedback log.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerformanceSummary {
    pub deliveries: usize,
    /// Routes with a positive delay.
    pub delayed: usize,
    pub total_delay: f64,
    pub total_deviations: usize,
    pub mean_actual_time: f64,
    pub mean_efficiency: f64,
}

impl PerformanceSummary {
    pub fn from_records(records: &[FeedbackRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }
        let n = records.len() as f64;
        Self {
            deliveries: records.len(),
            delayed: records.iter().filter(|r| r.delay > 0.0).count(),
            total_delay: records.iter().map(|r| r.delay).sum(),
            total_deviations: records.iter().map(|r| r.deviation_count).sum(),
            mean_actual_time: records.iter().map(|r| r.actual_time).sum::<f64>() / n,
            mean_efficiency: records.iter().map(|r| r.efficiency).sum::<f64>() / n,
        }
    }
}
