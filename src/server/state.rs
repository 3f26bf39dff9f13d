use crate::catalog::ProviderCatalog;
use crate::location::ProviderLocator;
use std::sync::Mutex;

/// Shared server state. Handlers lock, mutate, unlock; no await points
/// while a lock is held.
pub struct AppState {
    pub catalog: Mutex<ProviderCatalog>,
    pub locator: Mutex<ProviderLocator>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            catalog: Mutex::new(ProviderCatalog::new()),
            locator: Mutex::new(ProviderLocator::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
