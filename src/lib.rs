pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod providers;
pub mod relay;
pub mod store;

pub use config::Config;
pub use error::RelayError;

use std::sync::Arc;

use clients::{GhlClient, PodiumClient};
use store::TokenStore;

/// Shared application state passed to all API handlers.
pub struct AppState {
    pub config: Config,
    pub store: Arc<TokenStore>,
    pub ghl: GhlClient,
    pub podium: PodiumClient,
}

impl AppState {
    /// Build the token store and both clients from configuration.
    ///
    /// The clients share one HTTP connection pool and one store handle.
    pub fn new(config: Config) -> Self {
        let store = Arc::new(TokenStore::new(config.token_file.clone()));
        let http = reqwest::Client::new();

        Self {
            ghl: GhlClient::new(&config, store.clone(), http.clone()),
            podium: PodiumClient::new(&config, store.clone(), http),
            store,
            config,
        }
    }
}

pub type SharedState = Arc<AppState>;
