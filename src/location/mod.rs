//! Location subsystem for the provider directory.
//!
//! Extracts coordinates from map-link URLs, resolves free-form user
//! input (URL, raw coordinates, or address text) into a search
//! location, and talks to the Nominatim geocoding service.

pub mod extract;
pub mod geocode;
pub mod resolver;
pub mod types;

pub use extract::{extract_coordinates, is_valid_location_url};
pub use resolver::ProviderLocator;
pub use types::{LocationError, SearchLocation};
