//! Nominatim geocoding collaborator.
//!
//! Single-attempt forward geocoding: one query, top result only, no
//! retries. The service returns lat/lon as strings.

use serde::Deserialize;

use super::types::{LocationError, SearchLocation};

const NOMINATIM_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = "AtlasProveedores/0.4 (provider-directory)";

#[derive(Deserialize, Debug, Clone)]
pub struct NominatimResult {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

/// Geocode a free-text place query. Returns the best match or an error;
/// the resolver collapses every error into "not found".
pub fn geocode_search(query: &str) -> Result<SearchLocation, LocationError> {
    let url = format!(
        "{}?format=json&q={}&limit=1",
        NOMINATIM_ENDPOINT,
        urlencode(query),
    );

    let response = ureq::get(&url)
        .set("User-Agent", USER_AGENT)
        .set("Accept-Language", "es")
        .call()
        .map_err(|e| LocationError::Network(e.to_string()))?;

    let results: Vec<NominatimResult> = response
        .into_json()
        .map_err(|e| LocationError::InvalidResponse(e.to_string()))?;

    let top = results
        .first()
        .ok_or_else(|| LocationError::NotFound(query.to_string()))?;

    let lat: f64 = top
        .lat
        .parse()
        .map_err(|_| LocationError::InvalidResponse(format!("bad lat '{}'", top.lat)))?;
    let lng: f64 = top
        .lon
        .parse()
        .map_err(|_| LocationError::InvalidResponse(format!("bad lon '{}'", top.lon)))?;

    Ok(SearchLocation::new(lat, lng, top.display_name.clone()))
}

// Minimal percent-encoding for query strings, no extra dependency.
fn urlencode(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            ' ' => "%20".to_string(),
            '&' => "%26".to_string(),
            '=' => "%3D".to_string(),
            '+' => "%2B".to_string(),
            ',' => "%2C".to_string(),
            _ if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' || c == '~' => {
                c.to_string()
            }
            _ => {
                let mut buf = [0u8; 4];
                c.encode_utf8(&mut buf)
                    .bytes()
                    .map(|b| format!("%{:02X}", b))
                    .collect()
            }
        })
        .collect()
}
