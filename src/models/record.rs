//! Raw import records and the validation boundary.
//!
//! Records arrive from the import layer with every field optional. They
//! are checked once here and turned into [`Order`]s and [`Vehicle`]s;
//! the first schema problem becomes a single [`FleetError::Input`].

use std::collections::HashSet;

use super::{GeoPoint, Order, TimeWindow, Vehicle, DEFAULT_EMISSION_KG_PER_KM};
use crate::error::{FleetError, Result};

/// An order row as supplied by the import layer.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OrderRecord {
    pub id: Option<String>,
    pub weight: Option<f64>,
    pub volume: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub priority: Option<f64>,
    pub client_id: Option<String>,
    pub zone: Option<String>,
    pub time_window_start: Option<f64>,
    pub time_window_end: Option<f64>,
}

/// A vehicle row as supplied by the import layer.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VehicleRecord {
    pub plate: Option<String>,
    pub capacity_kg: Option<f64>,
    pub capacity_m3: Option<f64>,
    pub cost_per_km: Option<f64>,
    pub emission_kg_per_km: Option<f64>,
    pub available: Option<bool>,
    pub start_latitude: Option<f64>,
    pub start_longitude: Option<f64>,
}

fn required<T: Clone>(value: &Option<T>, field: &str, row: usize) -> Result<T> {
    value
        .clone()
        .ok_or_else(|| FleetError::input(format!("row {row}: missing required field '{field}'")))
}

fn non_negative(value: f64, field: &str, id: &str) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(FleetError::input(format!("{id}: '{field}' must be a non-negative number, got {value}")))
    }
}

impl OrderRecord {
    /// Validates this row into an [`Order`]. `row` is used in error messages.
    pub fn validate(&self, row: usize) -> Result<Order> {
        let id = required(&self.id, "id", row)?;
        if id.trim().is_empty() {
            return Err(FleetError::input(format!("row {row}: empty order id")));
        }
        let weight = non_negative(required(&self.weight, "weight", row)?, "weight", &id)?;
        let volume = non_negative(self.volume.unwrap_or(0.0), "volume", &id)?;
        let location = GeoPoint::new(
            required(&self.latitude, "latitude", row)?,
            required(&self.longitude, "longitude", row)?,
        );
        if !location.is_valid() {
            return Err(FleetError::input(format!(
                "{id}: invalid coordinates ({}, {})",
                location.lat, location.lon
            )));
        }

        let time_window = match (self.time_window_start, self.time_window_end) {
            (None, None) => None,
            (start, end) => {
                let start = start.unwrap_or(0.0);
                let end = end.unwrap_or(f64::MAX);
                Some(TimeWindow::new(start, end).ok_or_else(|| {
                    FleetError::input(format!("{id}: invalid time window [{start}, {end}]"))
                })?)
            }
        };

        if let Some(p) = self.priority {
            if !p.is_finite() {
                return Err(FleetError::input(format!("{id}: priority must be finite")));
            }
        }

        Ok(Order {
            id,
            weight,
            volume,
            location,
            priority: self.priority,
            client_id: self.client_id.clone(),
            zone: self.zone.clone(),
            time_window,
            cluster: None,
            priority_rank: None,
        })
    }
}

impl VehicleRecord {
    /// Validates this row into a [`Vehicle`]. `row` is used in error messages.
    pub fn validate(&self, row: usize) -> Result<Vehicle> {
        let plate = required(&self.plate, "plate", row)?;
        if plate.trim().is_empty() {
            return Err(FleetError::input(format!("row {row}: empty plate")));
        }
        let capacity_kg = non_negative(required(&self.capacity_kg, "capacity_kg", row)?, "capacity_kg", &plate)?;
        let capacity_m3 = non_negative(
            self.capacity_m3.unwrap_or(f64::MAX),
            "capacity_m3",
            &plate,
        )?;
        let cost_per_km = non_negative(self.cost_per_km.unwrap_or(1.0), "cost_per_km", &plate)?;
        let emission_kg_per_km = non_negative(
            self.emission_kg_per_km.unwrap_or(DEFAULT_EMISSION_KG_PER_KM),
            "emission_kg_per_km",
            &plate,
        )?;
        let start = GeoPoint::new(
            required(&self.start_latitude, "start_latitude", row)?,
            required(&self.start_longitude, "start_longitude", row)?,
        );
        if !start.is_valid() {
            return Err(FleetError::input(format!("{plate}: invalid start location")));
        }

        Ok(Vehicle {
            plate,
            capacity_kg,
            capacity_m3,
            cost_per_km,
            emission_kg_per_km,
            available: self.available.unwrap_or(true),
            start,
        })
    }
}

/// Validates all order rows; fails on the first bad row, an empty input,
/// or a duplicated id.
pub fn validate_orders(records: &[OrderRecord]) -> Result<Vec<Order>> {
    if records.is_empty() {
        return Err(FleetError::input("no orders supplied"));
    }
    let orders = records
        .iter()
        .enumerate()
        .map(|(row, r)| r.validate(row))
        .collect::<Result<Vec<_>>>()?;
    ensure_unique(orders.iter().map(|o| o.id.as_str()), "order id")?;
    Ok(orders)
}

/// Validates all vehicle rows; fails on the first bad row, an empty input,
/// or a duplicated plate.
pub fn validate_vehicles(records: &[VehicleRecord]) -> Result<Vec<Vehicle>> {
    if records.is_empty() {
        return Err(FleetError::input("no vehicles supplied"));
    }
    let vehicles = records
        .iter()
        .enumerate()
        .map(|(row, r)| r.validate(row))
        .collect::<Result<Vec<_>>>()?;
    ensure_unique(vehicles.iter().map(|v| v.plate.as_str()), "plate")?;
    Ok(vehicles)
}

/// Checks typed orders built directly in code (not via records).
pub fn check_orders(orders: &[Order]) -> Result<()> {
    if orders.is_empty() {
        return Err(FleetError::input("no orders supplied"));
    }
    for o in orders {
        non_negative(o.weight, "weight", &o.id)?;
        non_negative(o.volume, "volume", &o.id)?;
        if !o.location.is_valid() {
            return Err(FleetError::input(format!("{}: invalid coordinates", o.id)));
        }
    }
    ensure_unique(orders.iter().map(|o| o.id.as_str()), "order id")
}

/// Checks typed vehicles built directly in code and keeps the available ones.
///
/// Fails when no vehicle is available.
pub fn available_fleet(vehicles: &[Vehicle]) -> Result<Vec<Vehicle>> {
    ensure_unique(vehicles.iter().map(|v| v.plate.as_str()), "plate")?;
    for v in vehicles {
        non_negative(v.capacity_kg, "capacity_kg", &v.plate)?;
        non_negative(v.capacity_m3, "capacity_m3", &v.plate)?;
        non_negative(v.cost_per_km, "cost_per_km", &v.plate)?;
        if !v.start.is_valid() {
            return Err(FleetError::input(format!("{}: invalid start location", v.plate)));
        }
    }
    let fleet: Vec<Vehicle> = vehicles.iter().filter(|v| v.available).cloned().collect();
    if fleet.is_empty() {
        return Err(FleetError::input("no available vehicles in the fleet"));
    }
    Ok(fleet)
}

fn ensure_unique<'a>(ids: impl Iterator<Item = &'a str>, what: &str) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(FleetError::input(format!("duplicate {what} '{id}'")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order_row(id: &str) -> OrderRecord {
        OrderRecord {
            id: Some(id.into()),
            weight: Some(10.0),
            latitude: Some(-23.5),
            longitude: Some(-46.6),
            ..Default::default()
        }
    }

    fn vehicle_row(plate: &str) -> VehicleRecord {
        VehicleRecord {
            plate: Some(plate.into()),
            capacity_kg: Some(1000.0),
            capacity_m3: Some(10.0),
            start_latitude: Some(-23.5),
            start_longitude: Some(-46.6),
            ..Default::default()
        }
    }

    #[test]
    fn test_order_defaults() {
        let o = order_row("P1").validate(0).expect("valid");
        assert_eq!(o.volume, 0.0);
        assert!(o.time_window.is_none());
        assert!(o.cluster.is_none());
    }

    #[test]
    fn test_missing_coordinates_is_input_error() {
        let mut row = order_row("P1");
        row.latitude = None;
        let err = validate_orders(&[row]).unwrap_err();
        assert!(matches!(err, FleetError::Input(ref m) if m.contains("latitude")));
    }

    #[test]
    fn test_half_open_window_is_accepted() {
        let mut row = order_row("P1");
        row.time_window_end = Some(3600.0);
        let o = row.validate(0).expect("valid");
        let tw = o.time_window.expect("window");
        assert_eq!(tw.start(), 0.0);
        assert_eq!(tw.end(), 3600.0);
    }

    #[test]
    fn test_inverted_window_rejected() {
        let mut row = order_row("P1");
        row.time_window_start = Some(100.0);
        row.time_window_end = Some(50.0);
        assert!(row.validate(0).is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = validate_orders(&[order_row("P1"), order_row("P1")]).unwrap_err();
        assert!(matches!(err, FleetError::Input(ref m) if m.contains("duplicate")));
    }

    #[test]
    fn test_empty_inputs_rejected() {
        assert!(validate_orders(&[]).is_err());
        assert!(validate_vehicles(&[]).is_err());
    }

    #[test]
    fn test_vehicle_defaults() {
        let v = vehicle_row("ABC").validate(0).expect("valid");
        assert!(v.available);
        assert_eq!(v.cost_per_km, 1.0);
        assert_eq!(v.emission_kg_per_km, DEFAULT_EMISSION_KG_PER_KM);
    }

    #[test]
    fn test_negative_capacity_rejected() {
        let mut row = vehicle_row("ABC");
        row.capacity_kg = Some(-1.0);
        assert!(row.validate(0).is_err());
    }

    #[test]
    fn test_available_fleet_filters() {
        let mut off = vehicle_row("OFF");
        off.available = Some(false);
        let vehicles = validate_vehicles(&[vehicle_row("ON"), off]).expect("valid");
        let fleet = available_fleet(&vehicles).expect("one available");
        assert_eq!(fleet.len(), 1);
        assert_eq!(fleet[0].plate, "ON");
    }

    #[test]
    fn test_available_fleet_all_off() {
        let v = Vehicle::new("V", 10.0, 1.0, 0.0, 0.0).with_available(false);
        assert!(available_fleet(&[v]).is_err());
    }
}
