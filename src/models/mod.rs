//! Domain entities: orders, vehicles, routes and their lifecycle.
//!
//! Typed entities are validated once at the ingestion boundary
//! ([`record`]); the algorithms downstream never re-check schema.

mod geo;
mod ledger;
mod order;
pub mod record;
mod route;
mod vehicle;

pub use geo::{GeoPoint, EARTH_RADIUS_M};
pub use ledger::{OrderLedger, OrderStatus};
pub use order::{ClusterLabel, Order, TimeWindow};
pub use record::{OrderRecord, VehicleRecord};
pub use route::{Route, Stop};
pub use vehicle::{Vehicle, DEFAULT_EMISSION_KG_PER_KM};
