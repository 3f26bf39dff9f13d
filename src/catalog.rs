//! Provider catalog: owned state plus the derived, filtered view.
//!
//! Owns the authoritative provider list, the active search location,
//! the filter state, and the selection. The view is recomputed on
//! demand: annotate with distance, cut by radius, apply exact and
//! free-text filters, sort by distance when a search location is set.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::geo::distance_km;
use crate::ids::{IdGenerator, UuidIds};
use crate::location::SearchLocation;
use crate::provider::{FilterState, Provider, ProviderUpdate};

pub struct ProviderCatalog {
    providers: Vec<Provider>,
    filters: FilterState,
    search_location: Option<SearchLocation>,
    selected_id: Option<String>,
    ids: Box<dyn IdGenerator>,
    /// Bumped on every search-location change; stale async resolutions
    /// carry an older value and are discarded by `apply_search`.
    search_generation: u64,
}

impl Default for ProviderCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderCatalog {
    pub fn new() -> Self {
        Self::with_ids(Box::new(UuidIds))
    }

    /// Catalog with a specific id generator (deterministic ids in tests).
    pub fn with_ids(ids: Box<dyn IdGenerator>) -> Self {
        Self {
            providers: Vec::new(),
            filters: FilterState::default(),
            search_location: None,
            selected_id: None,
            ids,
            search_generation: 0,
        }
    }

    // ─── Provider mutations ─────────────────────────────────────

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    /// Bulk replace. Incoming records without an id get one assigned.
    pub fn set_providers(&mut self, providers: Vec<Provider>) {
        self.providers = providers
            .into_iter()
            .map(|mut p| {
                if p.id.is_empty() {
                    p.id = self.ids.next_id();
                }
                p
            })
            .collect();
    }

    /// Append one provider under a freshly assigned id; returns the id.
    pub fn add_provider(&mut self, mut provider: Provider) -> String {
        provider.id = self.ids.next_id();
        let id = provider.id.clone();
        self.providers.push(provider);
        id
    }

    /// Partial merge by id. Unknown ids are a no-op, not an error.
    pub fn update_provider(&mut self, id: &str, update: &ProviderUpdate) -> bool {
        match self.providers.iter_mut().find(|p| p.id == id) {
            Some(p) => {
                update.apply(p);
                true
            }
            None => false,
        }
    }

    /// Remove by id. Clears the selection when it pointed at the
    /// deleted record.
    pub fn delete_provider(&mut self, id: &str) -> bool {
        let before = self.providers.len();
        self.providers.retain(|p| p.id != id);
        let removed = self.providers.len() < before;
        if removed && self.selected_id.as_deref() == Some(id) {
            self.selected_id = None;
        }
        removed
    }

    // ─── Selection ──────────────────────────────────────────────

    pub fn select_provider(&mut self, id: &str) -> bool {
        if self.providers.iter().any(|p| p.id == id) {
            self.selected_id = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    pub fn selected(&self) -> Option<&Provider> {
        let id = self.selected_id.as_deref()?;
        self.providers.iter().find(|p| p.id == id)
    }

    // ─── Search location ────────────────────────────────────────

    pub fn search_location(&self) -> Option<&SearchLocation> {
        self.search_location.as_ref()
    }

    pub fn set_search_location(&mut self, location: Option<SearchLocation>) {
        self.search_generation += 1;
        self.search_location = location;
    }

    /// Start an async resolution: returns the generation token the
    /// eventual completion must present to `apply_search`.
    pub fn begin_search(&mut self) -> u64 {
        self.search_generation += 1;
        self.search_generation
    }

    /// Apply a completed resolution. Returns false (and changes
    /// nothing) when a newer search superseded this one.
    pub fn apply_search(&mut self, generation: u64, location: Option<SearchLocation>) -> bool {
        if generation != self.search_generation {
            return false;
        }
        self.search_location = location;
        true
    }

    // ─── Filters ────────────────────────────────────────────────

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
    }

    // ─── Derived view ───────────────────────────────────────────

    /// The filtered, distance-annotated, sorted view consumed by the
    /// map and list UIs.
    pub fn filtered_providers(&self) -> Vec<Provider> {
        let mut result: Vec<Provider> = self
            .providers
            .iter()
            .cloned()
            .map(|mut p| {
                if let Some(loc) = &self.search_location {
                    p.distance = Some(distance_km(loc.coords(), p.coords()));
                }
                p
            })
            .collect();

        // Radius cut, inclusive at the boundary.
        if self.search_location.is_some() {
            if let Some(radius) = self.filters.radius {
                result.retain(|p| p.distance.unwrap_or(0.0) <= radius);
            }
        }

        if !self.filters.categoria.is_empty() {
            result.retain(|p| p.categoria == self.filters.categoria);
        }
        if !self.filters.provincia.is_empty() {
            result.retain(|p| p.provincia == self.filters.provincia);
        }
        if !self.filters.ciudad.is_empty() {
            result.retain(|p| p.ciudad == self.filters.ciudad);
        }

        if !self.filters.search_query.is_empty() {
            let query = self.filters.search_query.to_lowercase();
            result.retain(|p| {
                p.nombre_proveedor.to_lowercase().contains(&query)
                    || p.nombre_contacto.to_lowercase().contains(&query)
                    || p.ciudad.to_lowercase().contains(&query)
            });
        }

        // Stable sort keeps insertion order for equal distances and
        // for the no-location case (where no sort runs at all).
        if self.search_location.is_some() {
            result.sort_by(|a, b| {
                a.distance
                    .unwrap_or(0.0)
                    .partial_cmp(&b.distance.unwrap_or(0.0))
                    .unwrap_or(Ordering::Equal)
            });
        }

        result
    }

    // ─── Facets ─────────────────────────────────────────────────

    pub fn categories(&self) -> Vec<String> {
        distinct_sorted(self.providers.iter().map(|p| p.categoria.as_str()))
    }

    pub fn provinces(&self) -> Vec<String> {
        distinct_sorted(self.providers.iter().map(|p| p.provincia.as_str()))
    }

    /// Cities, restricted to the selected province when one is set.
    pub fn cities(&self) -> Vec<String> {
        let province = &self.filters.provincia;
        distinct_sorted(
            self.providers
                .iter()
                .filter(|p| province.is_empty() || p.provincia == *province)
                .map(|p| p.ciudad.as_str()),
        )
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
