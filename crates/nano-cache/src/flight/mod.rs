//! In-flight key tracking

mod in_flight;

pub use in_flight::InFlightSet;
