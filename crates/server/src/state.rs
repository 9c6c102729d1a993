use std::sync::Arc;

use vibescout_core::{CatalogApi, Config, DiscoveryService, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    discovery: Arc<DiscoveryService>,
    catalog: Arc<dyn CatalogApi>,
}

impl AppState {
    pub fn new(
        config: Config,
        discovery: Arc<DiscoveryService>,
        catalog: Arc<dyn CatalogApi>,
    ) -> Self {
        Self {
            config,
            discovery,
            catalog,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn discovery(&self) -> &DiscoveryService {
        self.discovery.as_ref()
    }

    /// Direct catalog access for raw aggregation and passthrough lookups.
    pub fn catalog(&self) -> &Arc<dyn CatalogApi> {
        &self.catalog
    }
}
