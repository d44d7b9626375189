//! Delivery orders and time windows.

use super::GeoPoint;

/// An allowed arrival interval, in seconds from the vehicle's departure.
///
/// The vehicle must arrive no later than `end` and may arrive before
/// `start`, in which case it waits.
///
/// # Examples
///
/// ```
/// use u_fleet::models::TimeWindow;
///
/// let tw = TimeWindow::new(3_600.0, 7_200.0).unwrap();
/// assert!(tw.contains(5_000.0));
/// assert_eq!(tw.waiting_time(3_000.0), 600.0);
/// assert!(tw.is_violated(7_201.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWindow {
    start: f64,
    end: f64,
}

impl TimeWindow {
    /// Creates a new window.
    ///
    /// Returns `None` if `start > end` or either bound is non-finite.
    pub fn new(start: f64, end: f64) -> Option<Self> {
        if !start.is_finite() || !end.is_finite() || start > end {
            return None;
        }
        Some(Self { start, end })
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }

    /// Waiting time when arriving at `arrival`; zero inside or after the window.
    pub fn waiting_time(&self, arrival: f64) -> f64 {
        (self.start - arrival).max(0.0)
    }

    /// Arrival after the window closes.
    pub fn is_violated(&self, arrival: f64) -> bool {
        arrival > self.end
    }

    /// The overlap of two windows, or `None` if they are disjoint.
    pub fn intersect(&self, other: &TimeWindow) -> Option<TimeWindow> {
        TimeWindow::new(self.start.max(other.start), self.end.min(other.end))
    }
}

/// Cluster membership of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClusterLabel {
    /// Member of the cluster with this id.
    Assigned(usize),
    /// Density clustering left this order as noise.
    Unclustered,
}

impl ClusterLabel {
    pub fn id(&self) -> Option<usize> {
        match self {
            ClusterLabel::Assigned(id) => Some(*id),
            ClusterLabel::Unclustered => None,
        }
    }
}

/// A geocoded delivery order.
///
/// `cluster` and `priority_rank` are empty until the order passes
/// through [`RegionClusterer`](crate::cluster::RegionClusterer).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Order {
    pub id: String,
    /// Kilograms.
    pub weight: f64,
    /// Cubic metres.
    pub volume: f64,
    pub location: GeoPoint,
    /// Urgency score; larger is more urgent.
    pub priority: Option<f64>,
    pub client_id: Option<String>,
    /// Delivery zone name, matched against client access restrictions.
    pub zone: Option<String>,
    pub time_window: Option<TimeWindow>,
    pub cluster: Option<ClusterLabel>,
    /// 1 = highest priority cluster.
    pub priority_rank: Option<usize>,
}

impl Order {
    pub fn new(id: impl Into<String>, weight: f64, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            weight,
            volume: 0.0,
            location: GeoPoint::new(lat, lon),
            priority: None,
            client_id: None,
            zone: None,
            time_window: None,
            cluster: None,
            priority_rank: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_client(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    pub fn with_zone(mut self, zone: impl Into<String>) -> Self {
        self.zone = Some(zone.into());
        self
    }

    pub fn with_time_window(mut self, tw: TimeWindow) -> Self {
        self.time_window = Some(tw);
        self
    }

    /// Cluster id, if the order belongs to a cluster.
    pub fn cluster_id(&self) -> Option<usize> {
        self.cluster.and_then(|c| c.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_window_invalid() {
        assert!(TimeWindow::new(20.0, 10.0).is_none());
        assert!(TimeWindow::new(f64::NAN, 10.0).is_none());
        assert!(TimeWindow::new(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn test_time_window_bounds_inclusive() {
        let tw = TimeWindow::new(10.0, 20.0).expect("valid");
        assert!(tw.contains(10.0));
        assert!(tw.contains(20.0));
        assert!(!tw.is_violated(20.0));
        assert!(tw.is_violated(20.5));
        assert_eq!(tw.waiting_time(15.0), 0.0);
    }

    #[test]
    fn test_time_window_intersect() {
        let a = TimeWindow::new(0.0, 100.0).expect("valid");
        let b = TimeWindow::new(50.0, 200.0).expect("valid");
        let c = TimeWindow::new(150.0, 200.0).expect("valid");
        assert_eq!(a.intersect(&b), TimeWindow::new(50.0, 100.0));
        assert!(a.intersect(&c).is_none());
    }

    #[test]
    fn test_order_builder() {
        let tw = TimeWindow::new(0.0, 600.0).expect("valid");
        let o = Order::new("P1", 12.5, -23.5, -46.6)
            .with_volume(0.3)
            .with_priority(2.0)
            .with_client("C9")
            .with_zone("Centro")
            .with_time_window(tw);
        assert_eq!(o.id, "P1");
        assert_eq!(o.volume, 0.3);
        assert_eq!(o.priority, Some(2.0));
        assert_eq!(o.client_id.as_deref(), Some("C9"));
        assert_eq!(o.zone.as_deref(), Some("Centro"));
        assert!(o.cluster_id().is_none());
    }

    #[test]
    fn test_cluster_label() {
        assert_eq!(ClusterLabel::Assigned(3).id(), Some(3));
        assert_eq!(ClusterLabel::Unclustered.id(), None);
    }
}
