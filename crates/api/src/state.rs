use std::sync::Arc;

use perfman_store::Store;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (the store handle and config are behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Handle to the data directory.
    pub store: Store,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
