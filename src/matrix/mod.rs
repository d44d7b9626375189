//! Distance/time matrices.
//!
//! The core never performs network or file I/O itself: travel estimates
//! come from a caller-supplied [`TravelProvider`]. [`MatrixBuilder`]
//! tolerates provider failures by retrying with exponential backoff and
//! then degrading to a great-circle (haversine) estimate, flagging the
//! affected cells.

mod builder;
mod types;

pub use builder::{MatrixBuilder, RetryPolicy};
pub use types::{HaversineProvider, Leg, TravelMatrix, TravelProvider, DEFAULT_SPEED_MPS};
