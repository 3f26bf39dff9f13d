//! Coordinate extraction from map-link URLs.
//!
//! Map services encode the same coordinate pair in half a dozen URL
//! shapes. The extractor tries a fixed, ordered pattern table and takes
//! the first hit; the bare path segment form goes last because it
//! matches almost anything with two numbers in it.

use regex::Regex;
use std::sync::LazyLock;

use crate::geo::Coordinates;

/// Ordered pattern table. Order is load-bearing: a URL matching two
/// patterns must resolve through the higher-priority one.
static COORD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // @-34.6037,-58.3816 embedded anywhere ("centered on" marker)
        Regex::new(r"@(-?\d+\.?\d*),(-?\d+\.?\d*)").unwrap(),
        // !3d-34.6037!4d-58.3816 (place detail encoding)
        Regex::new(r"!3d(-?\d+\.?\d*)!4d(-?\d+\.?\d*)").unwrap(),
        // q=-34.6037,-58.3816 query parameter
        Regex::new(r"[?&]q=(-?\d+\.?\d*),(-?\d+\.?\d*)").unwrap(),
        // ll=-34.6037,-58.3816 legacy query parameter
        Regex::new(r"[?&]ll=(-?\d+\.?\d*),(-?\d+\.?\d*)").unwrap(),
        // /place/-34.6037,-58.3816/
        Regex::new(r"/place/(-?\d+\.?\d*),(-?\d+\.?\d*)").unwrap(),
        // bare /-34.6037,-58.3816/ path segment (directions URLs)
        Regex::new(r"/(-?\d+\.?\d*),(-?\d+\.?\d*)(?:/|$|\?)").unwrap(),
    ]
});

/// Hostname fragments of recognized map services (matched lowercased).
const MAP_HOST_PATTERNS: &[&str] = &[
    "google.com/maps",
    "maps.google.com",
    "goo.gl/maps",
    "maps.app.goo.gl",
];

/// Extract a coordinate pair from a map-link URL.
///
/// Returns None when no pattern matches or a matched number fails to
/// parse. Absence is an expected outcome, not an error.
pub fn extract_coordinates(url: &str) -> Option<Coordinates> {
    if url.is_empty() {
        return None;
    }

    for re in COORD_PATTERNS.iter() {
        if let Some(caps) = re.captures(url) {
            let lat = caps[1].parse::<f64>().ok()?;
            let lng = caps[2].parse::<f64>().ok()?;
            return Some(Coordinates::new(lat, lng));
        }
    }

    None
}

/// Whether the string points at a known map service.
///
/// Used as a pre-filter before extraction in the import pipeline;
/// independent of whether coordinates can actually be extracted.
pub fn is_valid_location_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }
    let lower = url.to_lowercase();
    MAP_HOST_PATTERNS.iter().any(|p| lower.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_at_marker() {
        let c = extract_coordinates("https://www.google.com/maps/@-34.6037,-58.3816,15z").unwrap();
        assert_eq!(c.lat, -34.6037);
        assert_eq!(c.lng, -58.3816);
    }

    #[test]
    fn test_extract_place_detail() {
        let c = extract_coordinates(
            "https://www.google.com/maps/place/Obelisco/data=!3d-34.6037!4d-58.3816",
        )
        .unwrap();
        assert_eq!(c.lat, -34.6037);
        assert_eq!(c.lng, -58.3816);
    }

    #[test]
    fn test_extract_q_param() {
        let c = extract_coordinates("https://maps.google.com/?q=-34.6037,-58.3816").unwrap();
        assert_eq!(c.lat, -34.6037);
        assert_eq!(c.lng, -58.3816);
    }

    #[test]
    fn test_extract_ll_param() {
        let c = extract_coordinates("https://maps.google.com/maps?ll=40.7128,-74.006&z=12").unwrap();
        assert_eq!(c.lat, 40.7128);
        assert_eq!(c.lng, -74.006);
    }

    #[test]
    fn test_extract_place_path() {
        let c = extract_coordinates("https://www.google.com/maps/place/-31.4201,-64.1888/").unwrap();
        assert_eq!(c.lat, -31.4201);
        assert_eq!(c.lng, -64.1888);
    }

    #[test]
    fn test_extract_bare_path_segment() {
        let c = extract_coordinates("https://www.google.com/maps/dir//-34.9214,-57.9544/").unwrap();
        assert_eq!(c.lat, -34.9214);
        assert_eq!(c.lng, -57.9544);
    }

    #[test]
    fn test_extract_bare_path_at_end_of_string() {
        let c = extract_coordinates("https://maps.app.goo.gl/x/-34.6,-58.38").unwrap();
        assert_eq!(c.lat, -34.6);
        assert_eq!(c.lng, -58.38);
    }

    #[test]
    fn test_at_marker_wins_over_place_detail() {
        // Both encodings present; the @ pair must win.
        let c = extract_coordinates(
            "https://www.google.com/maps/place/X/@-34.6037,-58.3816,17z/data=!3d-99.0!4d-99.0",
        )
        .unwrap();
        assert_eq!(c.lat, -34.6037);
        assert_eq!(c.lng, -58.3816);
    }

    #[test]
    fn test_place_detail_wins_over_q_param() {
        let c = extract_coordinates(
            "https://www.google.com/maps?q=-1.0,-2.0&data=!3d-34.6037!4d-58.3816",
        )
        .unwrap();
        assert_eq!(c.lat, -34.6037);
        assert_eq!(c.lng, -58.3816);
    }

    #[test]
    fn test_extract_integer_coordinates() {
        let c = extract_coordinates("https://maps.google.com/?q=-34,-58").unwrap();
        assert_eq!(c.lat, -34.0);
        assert_eq!(c.lng, -58.0);
    }

    #[test]
    fn test_extract_no_match() {
        assert!(extract_coordinates("https://www.google.com/maps/place/Rosario").is_none());
        assert!(extract_coordinates("not a url at all").is_none());
    }

    #[test]
    fn test_extract_empty() {
        assert!(extract_coordinates("").is_none());
    }

    #[test]
    fn test_valid_hosts() {
        assert!(is_valid_location_url("https://www.google.com/maps/@1,2,3z"));
        assert!(is_valid_location_url("https://maps.google.com/?q=1,2"));
        assert!(is_valid_location_url("https://goo.gl/maps/abc123"));
        assert!(is_valid_location_url("https://maps.app.goo.gl/xyz"));
    }

    #[test]
    fn test_valid_hosts_case_insensitive() {
        assert!(is_valid_location_url("HTTPS://MAPS.GOOGLE.COM/?q=1,2"));
        assert!(is_valid_location_url("https://Maps.App.Goo.Gl/XYZ"));
    }

    #[test]
    fn test_invalid_hosts() {
        assert!(!is_valid_location_url("https://openstreetmap.org/#map=12/-34.6/-58.4"));
        assert!(!is_valid_location_url("https://example.com/maps"));
        assert!(!is_valid_location_url(""));
    }
}
