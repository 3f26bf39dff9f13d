//! HTTP JSON API over the provider catalog.
//!
//! State lives in process memory for the lifetime of the server; a map
//! frontend consumes the filtered view and posts imports, searches,
//! and filter changes.

mod handlers;
mod state;

use axum::routing::{delete, get, post, put};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use state::AppState;

pub fn build_router() -> Router {
    let state = Arc::new(AppState::new());

    Router::new()
        .route(
            "/api/providers",
            get(handlers::list_providers).post(handlers::add_provider),
        )
        .route(
            "/api/providers/{id}",
            put(handlers::update_provider).delete(handlers::delete_provider),
        )
        .route("/api/providers/select/{id}", post(handlers::select_provider))
        .route("/api/providers/select", delete(handlers::clear_selection))
        .route("/api/import", post(handlers::import_file))
        .route("/api/resolve", get(handlers::resolve))
        .route(
            "/api/search-location",
            post(handlers::set_search_location).delete(handlers::clear_search_location),
        )
        .route("/api/filters", put(handlers::set_filters))
        .route("/api/facets", get(handlers::facets))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start(host: &str, port: u16) {
    let app = build_router();
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot bind to {}: {}", addr, e);
            std::process::exit(1);
        });

    eprintln!("  Atlas Proveedores server listening on http://{}", addr);
    eprintln!("  Press Ctrl+C to stop.");

    axum::serve(listener, app)
        .await
        .unwrap_or_else(|e| {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        });
}
