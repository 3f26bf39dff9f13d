//! Location resolver — turns free-form user input into a search location.
//!
//! Chain: map-link URL → direct coordinate pair → Nominatim free-text
//! lookup. First success wins; every failure collapses to None so the
//! caller never has to tell "no result" from "service unreachable".

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

use super::extract::{extract_coordinates, is_valid_location_url};
use super::geocode;
use super::types::SearchLocation;
use crate::geo::Coordinates;

/// Label used when the input was a raw map link (the link itself
/// carries no human-readable place name).
pub const MAP_LINK_LABEL: &str = "Ubicación desde Google Maps";

/// Two signed decimals separated by a comma and/or whitespace,
/// anchored to the whole input.
static DIRECT_COORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(-?\d+\.?\d*)[,\s]+(-?\d+\.?\d*)$").unwrap());

/// The location resolver with its fallback pipeline and a
/// session-scoped geocode cache.
pub struct ProviderLocator {
    cache: HashMap<String, SearchLocation>,
    offline: bool,
}

impl Default for ProviderLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderLocator {
    pub fn new() -> Self {
        Self { cache: HashMap::new(), offline: false }
    }

    /// Set offline mode — skip network calls (tests, batch CLI runs).
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Pre-populate the geocode cache for a query.
    pub fn seed_cache(&mut self, query: &str, location: SearchLocation) {
        self.cache.insert(query.trim().to_lowercase(), location);
    }

    /// Resolve user input through the full chain. Single attempt, no
    /// retries; None covers both "no match" and network failure.
    pub fn resolve(&mut self, input: &str) -> Option<SearchLocation> {
        let input = input.trim();
        if input.is_empty() {
            return None;
        }

        // 1. Map-link URL
        if is_valid_location_url(input) {
            if let Some(coords) = extract_coordinates(input) {
                return Some(SearchLocation::new(coords.lat, coords.lng, MAP_LINK_LABEL));
            }
            // Link without an embedded pair: fall through, the geocoder
            // occasionally knows the place slug.
        }

        // 2. Direct coordinate pair, echoed back as the label.
        // Out-of-range pairs are rejected here and fall through.
        if let Some(caps) = DIRECT_COORDS.captures(input) {
            if let (Ok(lat), Ok(lng)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) {
                if Coordinates::new(lat, lng).is_valid() {
                    return Some(SearchLocation::new(
                        lat,
                        lng,
                        format!("{}, {}", &caps[1], &caps[2]),
                    ));
                }
            }
        }

        // 3. Free-text geocoding
        let key = input.to_lowercase();
        if let Some(hit) = self.cache.get(&key) {
            return Some(hit.clone());
        }

        if self.offline {
            return None;
        }

        match geocode::geocode_search(input) {
            Ok(loc) => {
                self.cache.insert(key, loc.clone());
                Some(loc)
            }
            Err(e) => {
                eprintln!("  geocode '{}' failed: {}", input, e);
                None
            }
        }
    }
}
