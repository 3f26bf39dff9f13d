//! Core types for the location subsystem.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geo::Coordinates;

/// The user-chosen reference point for distance and radius filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchLocation {
    pub lat: f64,
    pub lng: f64,
    /// Human-readable label shown in the UI (display name from the
    /// geocoder, the echoed coordinate pair, or a generic map-link label).
    pub address: String,
}

impl SearchLocation {
    pub fn new(lat: f64, lng: f64, address: impl Into<String>) -> Self {
        Self { lat, lng, address: address.into() }
    }

    pub fn coords(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Location resolution errors.
///
/// These never cross the public resolver seam (callers see `Option`),
/// but the variants keep network and payload failures apart in logs.
#[derive(Debug)]
pub enum LocationError {
    Network(String),
    NotFound(String),
    InvalidResponse(String),
}

impl fmt::Display for LocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Network error: {}", msg),
            Self::NotFound(q) => write!(f, "Location not found: '{}'", q),
            Self::InvalidResponse(msg) => write!(f, "Invalid API response: {}", msg),
        }
    }
}

impl std::error::Error for LocationError {}
