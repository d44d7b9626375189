//! Sequenced routes.

/// A single visit within a route, with the timing computed by the evaluator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stop {
    pub order_id: String,
    /// Seconds from departure.
    pub arrival: f64,
    /// Seconds spent waiting for the window to open.
    pub wait: f64,
    /// Seconds from departure when the vehicle leaves the stop.
    pub departure: f64,
    /// Cumulative kilograms delivered after this stop.
    pub load_after: f64,
}

/// An ordered visiting sequence for one vehicle.
///
/// The depot is implied at both ends and not stored in `stops`.
/// Distances are metres, times seconds.
///
/// # Examples
///
/// ```
/// use u_fleet::models::{Route, Stop};
///
/// let mut route = Route::new("ABC1234");
/// route.push_stop(Stop {
///     order_id: "P1".into(),
///     arrival: 120.0,
///     wait: 0.0,
///     departure: 180.0,
///     load_after: 40.0,
/// });
/// assert_eq!(route.order_ids(), vec!["P1"]);
/// assert_eq!(route.load_kg(), 40.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Route {
    pub vehicle_id: String,
    pub stops: Vec<Stop>,
    pub total_distance: f64,
    /// Travel + wait + service time from the matrix.
    pub estimated_time: f64,
    /// `estimated_time` plus the learned delay, when a model is available.
    pub total_time: f64,
    pub total_cost: f64,
    /// Kilograms of CO2.
    pub total_emissions: f64,
    /// Whether the route returns to the depot.
    pub closed: bool,
}

impl Route {
    pub fn new(vehicle_id: impl Into<String>) -> Self {
        Self {
            vehicle_id: vehicle_id.into(),
            stops: Vec::new(),
            total_distance: 0.0,
            estimated_time: 0.0,
            total_time: 0.0,
            total_cost: 0.0,
            total_emissions: 0.0,
            closed: true,
        }
    }

    pub fn push_stop(&mut self, stop: Stop) {
        self.stops.push(stop);
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Order ids in visiting order.
    pub fn order_ids(&self) -> Vec<&str> {
        self.stops.iter().map(|s| s.order_id.as_str()).collect()
    }

    /// Kilograms carried on this route.
    pub fn load_kg(&self) -> f64 {
        self.stops.last().map_or(0.0, |s| s.load_after)
    }
}
