//! Accumulate-then-build composition of [`DefaultServiceRegistry`] instances.

use std::sync::Arc;

use servicekit_core::{Provider, ServiceError};

use super::cache::MethodCache;
use super::registry::{DefaultServiceRegistry, ProviderInstance};
use crate::traits::ServiceRegistry;

/// Collects a display name, parent registries, and providers, then builds a
/// [`DefaultServiceRegistry`] from them.
///
/// A builder is meant to be filled in by one thread and built once. Calling
/// [`build()`](Self::build) again is allowed and yields an independent
/// registry: the two share parents, provider values, and the classification
/// cache, but no registry state.
#[derive(Clone)]
pub struct ServiceRegistryBuilder {
    display_name: Option<String>,
    default_display_name: String,
    parents: Vec<Arc<dyn ServiceRegistry>>,
    providers: Vec<ProviderInstance>,
    cache: Arc<MethodCache>,
}

impl ServiceRegistryBuilder {
    /// Creates an empty builder whose registries classify through `cache`.
    #[must_use]
    pub fn new(cache: Arc<MethodCache>, default_display_name: impl Into<String>) -> Self {
        Self {
            display_name: None,
            default_display_name: default_display_name.into(),
            parents: Vec::new(),
            providers: Vec::new(),
            cache,
        }
    }

    /// Sets the display name. A later call replaces an earlier one.
    #[must_use]
    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Appends a parent registry.
    #[must_use]
    pub fn parent(mut self, parent: Arc<dyn ServiceRegistry>) -> Self {
        self.parents.push(parent);
        self
    }

    /// Appends a provider.
    #[must_use]
    pub fn provider<P: Provider>(self, provider: P) -> Self {
        self.provider_instance(ProviderInstance::new(provider))
    }

    /// Appends an already-wrapped provider.
    #[must_use]
    pub fn provider_instance(mut self, provider: ProviderInstance) -> Self {
        self.providers.push(provider);
        self
    }

    /// Builds the registry: seeds it with the display name and parents, then
    /// incorporates providers in the order they were added. Each provider's
    /// operations are published before the next provider is incorporated.
    ///
    /// # Errors
    ///
    /// Returns the first `ServiceError` raised while incorporating a
    /// provider. The partially built registry is discarded.
    pub fn build(&self) -> Result<DefaultServiceRegistry, ServiceError> {
        let display_name = self
            .display_name
            .clone()
            .unwrap_or_else(|| self.default_display_name.clone());
        let registry =
            DefaultServiceRegistry::new(display_name, self.parents.clone(), Arc::clone(&self.cache));
        for provider in &self.providers {
            registry.incorporate(provider.clone())?;
        }
        Ok(registry)
    }
}
