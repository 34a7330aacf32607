//! Google Maps geocoding client.
//!
//! This crate provides:
//! - Forward geocoding of city names
//! - Reverse geocoding of coordinates into a short "City, ST" name
//! - The [`LocationResolver`] seam used by the weather workflow

pub mod client;
pub mod error;
pub mod resolver;
pub mod types;

pub use client::{GeocodingClient, MapsConfig};
pub use error::{GeoError, GeoResult};
pub use resolver::LocationResolver;
pub use types::{CityLocation, GeocodeResponse, GeocodeResult};
