use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::ids::UuidIds;
use crate::import::import_providers;
use crate::location::SearchLocation;
use crate::provider::{FilterState, ImportResult, Provider, ProviderUpdate};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

fn log_request(method: &str, path: &str, outcome: &str, start: Instant) {
    eprintln!(
        "[{}] {} {} -> {} ({:.1}ms)",
        Utc::now().format("%H:%M:%S"),
        method,
        path,
        outcome,
        start.elapsed().as_secs_f64() * 1000.0,
    );
}

// ─── GET /api/providers ──────────────────────────────────────────

#[derive(Serialize)]
pub struct ProvidersResponse {
    pub providers: Vec<Provider>,
    pub total: usize,
    pub search_location: Option<SearchLocation>,
    pub filters: FilterState,
}

pub async fn list_providers(State(state): State<Arc<AppState>>) -> Json<ProvidersResponse> {
    let catalog = state.catalog.lock().unwrap();
    let providers = catalog.filtered_providers();
    Json(ProvidersResponse {
        total: providers.len(),
        providers,
        search_location: catalog.search_location().cloned(),
        filters: catalog.filters().clone(),
    })
}

// ─── POST /api/providers ─────────────────────────────────────────

#[derive(Serialize)]
pub struct AddedResponse {
    pub id: String,
}

pub async fn add_provider(
    State(state): State<Arc<AppState>>,
    Json(provider): Json<Provider>,
) -> Result<Json<AddedResponse>, ApiError> {
    if provider.nombre_proveedor.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "nombre_proveedor is required"));
    }
    if provider.ciudad.trim().is_empty() || provider.provincia.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "ciudad and provincia are required"));
    }
    if !provider.coords().is_valid() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Invalid coordinates. Lat: -90..90, Lng: -180..180",
        ));
    }

    let mut catalog = state.catalog.lock().unwrap();
    let id = catalog.add_provider(provider);
    Ok(Json(AddedResponse { id }))
}

// ─── PUT /api/providers/{id} ─────────────────────────────────────

pub async fn update_provider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(update): Json<ProviderUpdate>,
) -> Result<StatusCode, ApiError> {
    if let (Some(lat), Some(lng)) = (update.lat, update.lng) {
        if !crate::geo::Coordinates::new(lat, lng).is_valid() {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "Invalid coordinates. Lat: -90..90, Lng: -180..180",
            ));
        }
    }

    let mut catalog = state.catalog.lock().unwrap();
    if catalog.update_provider(&id, &update) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(StatusCode::NOT_FOUND, format!("No provider with id '{}'", id)))
    }
}

// ─── DELETE /api/providers/{id} ──────────────────────────────────

pub async fn delete_provider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut catalog = state.catalog.lock().unwrap();
    if catalog.delete_provider(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(StatusCode::NOT_FOUND, format!("No provider with id '{}'", id)))
    }
}

// ─── POST /api/providers/select/{id}, DELETE /api/providers/select ──

pub async fn select_provider(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut catalog = state.catalog.lock().unwrap();
    if catalog.select_provider(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(StatusCode::NOT_FOUND, format!("No provider with id '{}'", id)))
    }
}

pub async fn clear_selection(State(state): State<Arc<AppState>>) -> StatusCode {
    state.catalog.lock().unwrap().clear_selection();
    StatusCode::NO_CONTENT
}

// ─── POST /api/import ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ImportQuery {
    /// Replace the catalog with the accepted rows. Defaults to true;
    /// false gives a validation-only dry run.
    pub commit: Option<bool>,
}

pub async fn import_file(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ImportQuery>,
    body: Bytes,
) -> Json<ImportResult> {
    let start = Instant::now();

    let mut ids = UuidIds;
    let result = import_providers(&body, &mut ids);

    if result.success && params.commit.unwrap_or(true) {
        let mut catalog = state.catalog.lock().unwrap();
        catalog.set_providers(result.providers.clone());
    }

    log_request(
        "POST",
        "/api/import",
        &format!(
            "{} accepted, {} errors",
            result.providers.len(),
            result.errors.len(),
        ),
        start,
    );

    Json(result)
}

// ─── GET /api/resolve ────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResolveQuery {
    pub query: Option<String>,
}

pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ResolveQuery>,
) -> Result<Json<SearchLocation>, ApiError> {
    let start = Instant::now();

    let query = params.query.as_deref().unwrap_or("").trim().to_string();
    if query.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Missing 'query' parameter"));
    }

    let resolved = {
        let mut locator = state.locator.lock().unwrap();
        locator.resolve(&query)
    };

    match resolved {
        Some(loc) => {
            log_request("GET", "/api/resolve", &loc.address, start);
            Ok(Json(loc))
        }
        None => {
            log_request("GET", "/api/resolve", "not found", start);
            Err(api_error(
                StatusCode::NOT_FOUND,
                format!("Location not found: '{}'", query),
            ))
        }
    }
}

// ─── POST/DELETE /api/search-location ────────────────────────────

#[derive(Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

/// Resolve a query and set it as the active search location, guarded
/// by the generation token: a request that was superseded while its
/// geocode call ran does not clobber the newer location.
pub async fn set_search_location(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchLocation>, ApiError> {
    let start = Instant::now();

    let generation = state.catalog.lock().unwrap().begin_search();

    let resolved = {
        let mut locator = state.locator.lock().unwrap();
        locator.resolve(&req.query)
    };

    let Some(location) = resolved else {
        log_request("POST", "/api/search-location", "not found", start);
        return Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Location not found: '{}'", req.query),
        ));
    };

    let applied = state
        .catalog
        .lock()
        .unwrap()
        .apply_search(generation, Some(location.clone()));

    log_request(
        "POST",
        "/api/search-location",
        if applied { location.address.as_str() } else { "superseded" },
        start,
    );

    if !applied {
        return Err(api_error(
            StatusCode::CONFLICT,
            "Superseded by a newer search",
        ));
    }

    Ok(Json(location))
}

pub async fn clear_search_location(State(state): State<Arc<AppState>>) -> StatusCode {
    state.catalog.lock().unwrap().set_search_location(None);
    StatusCode::NO_CONTENT
}

// ─── PUT /api/filters ────────────────────────────────────────────

pub async fn set_filters(
    State(state): State<Arc<AppState>>,
    Json(filters): Json<FilterState>,
) -> StatusCode {
    state.catalog.lock().unwrap().set_filters(filters);
    StatusCode::NO_CONTENT
}

// ─── GET /api/facets ─────────────────────────────────────────────

#[derive(Serialize)]
pub struct FacetsResponse {
    pub categories: Vec<String>,
    pub provinces: Vec<String>,
    pub cities: Vec<String>,
}

pub async fn facets(State(state): State<Arc<AppState>>) -> Json<FacetsResponse> {
    let catalog = state.catalog.lock().unwrap();
    Json(FacetsResponse {
        categories: catalog.categories(),
        provinces: catalog.provinces(),
        cities: catalog.cities(),
    })
}
