use std::sync::Arc;

use super::builder::ServiceRegistryBuilder;
use super::cache::MethodCache;
use super::config::ContainerConfig;
use super::introspect::Introspector;

/// Owner of the process-scoped classification cache.
///
/// Create one per process (or per isolated test) and hand out builders from
/// it; every registry built through the same container shares one cache.
pub struct ServiceContainer {
    config: Arc<ContainerConfig>,
    cache: Arc<MethodCache>,
}

impl ServiceContainer {
    #[must_use]
    pub fn new(config: ContainerConfig) -> Self {
        let cache = MethodCache::with_introspector(Introspector::default(), config.cache_capacity);
        Self {
            config: Arc::new(config),
            cache: Arc::new(cache),
        }
    }

    /// Starts a registry builder backed by this container's cache.
    #[must_use]
    pub fn builder(&self) -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::new(
            Arc::clone(&self.cache),
            self.config.default_display_name.clone(),
        )
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<MethodCache> {
        &self.cache
    }

    #[must_use]
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new(ContainerConfig::default())
    }
}
