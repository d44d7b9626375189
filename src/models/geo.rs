//! Coordinates and great-circle distance.

/// Mean Earth radius in metres (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A WGS84 coordinate in decimal degrees.
///
/// # Examples
///
/// ```
/// use u_fleet::models::GeoPoint;
///
/// let sp = GeoPoint::new(-23.55052, -46.633308);
/// let pinheiros = GeoPoint::new(-23.561414, -46.655881);
/// let d = sp.haversine_m(&pinheiros);
/// assert!(d > 2_000.0 && d < 3_000.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns `true` when both components are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Great-circle distance in metres.
    pub fn haversine_m(&self, other: &GeoPoint) -> f64 {
        let phi1 = self.lat.to_radians();
        let phi2 = other.lat.to_radians();
        let d_phi = (other.lat - self.lat).to_radians();
        let d_lambda = (other.lon - self.lon).to_radians();

        let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Planar distance treating (lat, lon) as (x, y).
    ///
    /// Used for synthetic instances and as the clustering metric, where
    /// distances are compared rather than reported.
    pub fn planar(&self, other: &GeoPoint) -> f64 {
        self.planar_sq(other).sqrt()
    }

    /// Squared planar distance.
    pub fn planar_sq(&self, other: &GeoPoint) -> f64 {
        let dx = self.lat - other.lat;
        let dy = self.lon - other.lon;
        dx * dx + dy * dy
    }

    /// Arithmetic mean of a set of points, `None` when empty.
    pub fn centroid<'a, I>(points: I) -> Option<GeoPoint>
    where
        I: IntoIterator<Item = &'a GeoPoint>,
    {
        let (mut lat, mut lon, mut n) = (0.0, 0.0, 0usize);
        for p in points {
            lat += p.lat;
            lon += p.lon;
            n += 1;
        }
        (n > 0).then(|| GeoPoint::new(lat / n as f64, lon / n as f64))
    }
}
