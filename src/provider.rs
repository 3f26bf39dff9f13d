//! Domain records: providers, filters, and import results.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;

/// Category assigned when a row carries none.
pub const UNCATEGORIZED: &str = "Sin categoría";

/// Default radius filter in kilometres.
pub const DEFAULT_RADIUS_KM: f64 = 20.0;

/// One service-provider entity with a fixed geographic location.
///
/// Invariant: `lat`/`lng` are always present and in geographic range;
/// the importer rejects any row it cannot geolocate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    /// Empty on records that have not been through the catalog yet;
    /// `set_providers`/`add_provider` assign one.
    #[serde(default)]
    pub id: String,
    pub nombre_proveedor: String,
    #[serde(default)]
    pub nombre_contacto: String,
    #[serde(default)]
    pub numero_celular: String,
    pub ciudad: String,
    pub provincia: String,
    pub url_maps_ubicacion: String,
    #[serde(default = "default_categoria")]
    pub categoria: String,
    pub lat: f64,
    pub lng: f64,
    /// Km from the active search location. Transient: set by the
    /// catalog's derived view, never persisted with the record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

fn default_categoria() -> String {
    UNCATEGORIZED.to_string()
}

impl Provider {
    pub fn coords(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Partial field replacement for `update_provider`. Absent fields keep
/// their current value; the id is never touched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderUpdate {
    pub nombre_proveedor: Option<String>,
    pub nombre_contacto: Option<String>,
    pub numero_celular: Option<String>,
    pub ciudad: Option<String>,
    pub provincia: Option<String>,
    pub url_maps_ubicacion: Option<String>,
    pub categoria: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

impl ProviderUpdate {
    pub fn apply(&self, provider: &mut Provider) {
        if let Some(v) = &self.nombre_proveedor {
            provider.nombre_proveedor = v.clone();
        }
        if let Some(v) = &self.nombre_contacto {
            provider.nombre_contacto = v.clone();
        }
        if let Some(v) = &self.numero_celular {
            provider.numero_celular = v.clone();
        }
        if let Some(v) = &self.ciudad {
            provider.ciudad = v.clone();
        }
        if let Some(v) = &self.provincia {
            provider.provincia = v.clone();
        }
        if let Some(v) = &self.url_maps_ubicacion {
            provider.url_maps_ubicacion = v.clone();
        }
        if let Some(v) = &self.categoria {
            provider.categoria = v.clone();
        }
        if let Some(v) = self.lat {
            provider.lat = v;
        }
        if let Some(v) = self.lng {
            provider.lng = v;
        }
    }
}

/// Active filter configuration. Empty strings mean "unset".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub categoria: String,
    #[serde(default)]
    pub provincia: String,
    #[serde(default)]
    pub ciudad: String,
    #[serde(default)]
    pub search_query: String,
    /// Maximum km from the search location; None disables the cut.
    #[serde(default = "default_radius")]
    pub radius: Option<f64>,
}

fn default_radius() -> Option<f64> {
    Some(DEFAULT_RADIUS_KM)
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            categoria: String::new(),
            provincia: String::new(),
            ciudad: String::new(),
            search_query: String::new(),
            radius: Some(DEFAULT_RADIUS_KM),
        }
    }
}

/// Outcome of a bulk import. A pure value: the caller decides whether
/// to commit `providers` to the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportResult {
    pub success: bool,
    pub providers: Vec<Provider>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Sorted distinct categories seen among accepted rows.
    pub categories: Vec<String>,
}

impl ImportResult {
    /// A structural failure: no rows processed, one top-level error.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: vec![error.into()],
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_provider() -> Provider {
        Provider {
            id: "p-1".into(),
            nombre_proveedor: "Frigorífico Sur".into(),
            nombre_contacto: "Ana".into(),
            numero_celular: "221-555-0101".into(),
            ciudad: "La Plata".into(),
            provincia: "Buenos Aires".into(),
            url_maps_ubicacion: "https://maps.google.com/?q=-34.92,-57.95".into(),
            categoria: "Carnes".into(),
            lat: -34.92,
            lng: -57.95,
            distance: None,
        }
    }

    #[test]
    fn test_update_applies_only_present_fields() {
        let mut p = sample_provider();
        let update = ProviderUpdate {
            ciudad: Some("Berisso".into()),
            numero_celular: Some(String::new()),
            ..ProviderUpdate::default()
        };
        update.apply(&mut p);

        assert_eq!(p.ciudad, "Berisso");
        assert_eq!(p.numero_celular, "");
        assert_eq!(p.nombre_proveedor, "Frigorífico Sur");
        assert_eq!(p.id, "p-1");
    }

    #[test]
    fn test_distance_not_serialized_when_absent() {
        let p = sample_provider();
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("distance"));

        let mut with_distance = p;
        with_distance.distance = Some(3.2);
        let json = serde_json::to_string(&with_distance).unwrap();
        assert!(json.contains("\"distance\":3.2"));
    }

    #[test]
    fn test_provider_deserializes_without_optional_fields() {
        let json = r#"{
            "id": "x",
            "nombre_proveedor": "Verdulería Centro",
            "ciudad": "Rosario",
            "provincia": "Santa Fe",
            "url_maps_ubicacion": "https://maps.google.com/?q=-32.94,-60.65",
            "lat": -32.94,
            "lng": -60.65
        }"#;
        let p: Provider = serde_json::from_str(json).unwrap();
        assert_eq!(p.nombre_contacto, "");
        assert_eq!(p.categoria, UNCATEGORIZED);
        assert!(p.distance.is_none());
    }

    #[test]
    fn test_filter_state_default_radius() {
        let f = FilterState::default();
        assert_eq!(f.radius, Some(20.0));
        assert!(f.categoria.is_empty());
    }
}
