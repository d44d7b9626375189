//! Travel matrix and provider abstraction.

use crate::models::GeoPoint;

/// Default speed for estimating travel time from distance (40 km/h).
pub const DEFAULT_SPEED_MPS: f64 = 40.0 / 3.6;

/// Distance and duration of a single leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leg {
    pub meters: f64,
    pub seconds: f64,
}

/// A source of point-to-point travel estimates (road router, cache, ...).
///
/// Implementations may fail; [`MatrixBuilder`](super::MatrixBuilder)
/// retries and falls back to great-circle estimates.
pub trait TravelProvider: Send + Sync {
    /// Returns the leg from `from` to `to`, or a description of the failure.
    fn leg(&self, from: &GeoPoint, to: &GeoPoint) -> Result<Leg, String>;
}

/// Great-circle distance with a constant speed. Never fails.
#[derive(Debug, Clone, Copy)]
pub struct HaversineProvider {
    pub speed_mps: f64,
}

impl Default for HaversineProvider {
    fn default() -> Self {
        Self {
            speed_mps: DEFAULT_SPEED_MPS,
        }
    }
}

impl TravelProvider for HaversineProvider {
    fn leg(&self, from: &GeoPoint, to: &GeoPoint) -> Result<Leg, String> {
        let meters = from.haversine_m(to);
        Ok(Leg {
            meters,
            seconds: meters / self.speed_mps,
        })
    }
}

/// Dense, immutable `n x n` matrix of distances (m) and times (s).
///
/// Built once per solve and shared read-only by every sequencing run.
///
/// # Examples
///
/// ```
/// use u_fleet::matrix::TravelMatrix;
/// use u_fleet::models::GeoPoint;
///
/// let pts = [GeoPoint::new(0.0, 0.0), GeoPoint::new(3.0, 4.0)];
/// let m = TravelMatrix::planar(&pts, 1.0);
/// assert_eq!(m.distance(0, 1), 5.0);
/// assert_eq!(m.time(1, 0), 5.0);
/// assert!(!m.is_degraded());
/// ```
#[derive(Debug, Clone)]
pub struct TravelMatrix {
    n: usize,
    distances: Vec<f64>,
    times: Vec<f64>,
    degraded: Vec<bool>,
}

impl TravelMatrix {
    /// Builds a matrix from a leg function; the diagonal is zero.
    pub fn from_fn<F>(n: usize, mut leg: F) -> Self
    where
        F: FnMut(usize, usize) -> Leg,
    {
        let mut distances = vec![0.0; n * n];
        let mut times = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    let l = leg(i, j);
                    distances[i * n + j] = l.meters;
                    times[i * n + j] = l.seconds;
                }
            }
        }
        Self {
            n,
            distances,
            times,
            degraded: vec![false; n * n],
        }
    }

    /// Planar (Euclidean) matrix over raw coordinates, time = distance / speed.
    pub fn planar(points: &[GeoPoint], speed: f64) -> Self {
        Self::from_fn(points.len(), |i, j| {
            let d = points[i].planar(&points[j]);
            Leg {
                meters: d,
                seconds: d / speed,
            }
        })
    }

    /// Great-circle matrix.
    pub fn haversine(points: &[GeoPoint], speed_mps: f64) -> Self {
        let provider = HaversineProvider { speed_mps };
        Self::from_fn(points.len(), |i, j| {
            provider
                .leg(&points[i], &points[j])
                .unwrap_or(Leg { meters: 0.0, seconds: 0.0 })
        })
    }

    /// Number of points.
    pub fn size(&self) -> usize {
        self.n
    }

    pub fn distance(&self, from: usize, to: usize) -> f64 {
        self.distances[from * self.n + to]
    }

    pub fn time(&self, from: usize, to: usize) -> f64 {
        self.times[from * self.n + to]
    }

    pub(crate) fn set_degraded(&mut self, from: usize, to: usize) {
        self.degraded[from * self.n + to] = true;
    }

    /// Whether the given cell came from the fallback estimate.
    pub fn is_cell_degraded(&self, from: usize, to: usize) -> bool {
        self.degraded[from * self.n + to]
    }

    /// Whether any cell came from the fallback estimate.
    pub fn is_degraded(&self) -> bool {
        self.degraded.iter().any(|&d| d)
    }

    /// Number of fallback cells.
    pub fn degraded_count(&self) -> usize {
        self.degraded.iter().filter(|&&d| d).count()
    }
}
