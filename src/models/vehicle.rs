//! Fleet vehicles.

use super::GeoPoint;

/// Emission factor used when a vehicle record does not provide one (kg CO2 per km).
pub const DEFAULT_EMISSION_KG_PER_KM: f64 = 0.27;

/// A capacity-bounded vehicle identified by its plate.
///
/// Routes start at `start` and, in closed-tour mode, return to it.
///
/// # Examples
///
/// ```
/// use u_fleet::models::Vehicle;
///
/// let v = Vehicle::new("ABC1D23", 1_000.0, 8.0, -23.55, -46.63).with_cost_per_km(2.5);
/// assert_eq!(v.plate, "ABC1D23");
/// assert!(v.fits(900.0, 7.5));
/// assert!(!v.fits(1_200.0, 1.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    pub plate: String,
    pub capacity_kg: f64,
    pub capacity_m3: f64,
    pub cost_per_km: f64,
    pub emission_kg_per_km: f64,
    pub available: bool,
    pub start: GeoPoint,
}

impl Vehicle {
    /// Creates an available vehicle with unit cost per km.
    pub fn new(plate: impl Into<String>, capacity_kg: f64, capacity_m3: f64, lat: f64, lon: f64) -> Self {
        Self {
            plate: plate.into(),
            capacity_kg,
            capacity_m3,
            cost_per_km: 1.0,
            emission_kg_per_km: DEFAULT_EMISSION_KG_PER_KM,
            available: true,
            start: GeoPoint::new(lat, lon),
        }
    }

    pub fn with_cost_per_km(mut self, cost: f64) -> Self {
        self.cost_per_km = cost;
        self
    }

    pub fn with_emission_factor(mut self, kg_per_km: f64) -> Self {
        self.emission_kg_per_km = kg_per_km;
        self
    }

    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Whether an empty vehicle can carry the given load.
    pub fn fits(&self, weight: f64, volume: f64) -> bool {
        weight <= self.capacity_kg && volume <= self.capacity_m3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_defaults() {
        let v = Vehicle::new("XYZ", 500.0, 4.0, 0.0, 0.0);
        assert!(v.available);
        assert_eq!(v.cost_per_km, 1.0);
        assert_eq!(v.emission_kg_per_km, DEFAULT_EMISSION_KG_PER_KM);
    }

    #[test]
    fn test_vehicle_builder() {
        let v = Vehicle::new("XYZ", 500.0, 4.0, 0.0, 0.0)
            .with_cost_per_km(3.2)
            .with_emission_factor(0.9)
            .with_available(false);
        assert_eq!(v.cost_per_km, 3.2);
        assert_eq!(v.emission_kg_per_km, 0.9);
        assert!(!v.available);
    }

    #[test]
    fn test_fits_checks_both_dimensions() {
        let v = Vehicle::new("XYZ", 500.0, 4.0, 0.0, 0.0);
        assert!(v.fits(500.0, 4.0));
        assert!(!v.fits(100.0, 4.1));
    }
}
