//! Atlas Proveedores — provider directory engine.
//!
//! Owns a catalog of geolocated service providers, resolves free-form
//! location input (map links, raw coordinates, addresses), filters and
//! sorts providers by distance from a search location, and bulk-imports
//! records from tabular spreadsheet data.
//!
//! The library is UI-agnostic: the map renderer and any frontend are
//! external consumers of [`catalog::ProviderCatalog`]'s derived view.

pub mod catalog;
pub mod geo;
pub mod ids;
pub mod import;
pub mod location;
pub mod provider;
pub mod server;
