//! Per-type memoization of classified provider operations.

use std::sync::Arc;

use dashmap::DashMap;
use servicekit_core::{ServiceError, TypeDescriptor, TypeKey};
use tracing::{debug, trace, warn};

use super::classify::{classify, ClassifiedMethods};
use super::introspect::Introspector;

/// Process-scoped cache of [`ClassifiedMethods`], keyed by concrete provider type.
///
/// Entries are computed on first request and never evicted: a type's
/// descriptor cannot change while the process runs. Failed classifications
/// are not stored, so a later request retries from scratch.
///
/// Classification runs without holding any map lock. Concurrent first-time
/// requests for the same type may each classify; the first insert wins and
/// every caller receives that entry.
///
/// Shared as `Arc<MethodCache>` between the registries of one container.
pub struct MethodCache {
    introspector: Introspector,
    entries: DashMap<TypeKey, Arc<ClassifiedMethods>>,
}

impl MethodCache {
    /// Creates an empty cache using the default introspector.
    #[must_use]
    pub fn new() -> Self {
        Self::with_introspector(Introspector::default(), 0)
    }

    /// Creates an empty cache with a custom introspector and initial capacity.
    #[must_use]
    pub fn with_introspector(introspector: Introspector, capacity: usize) -> Self {
        Self {
            introspector,
            entries: DashMap::with_capacity(capacity),
        }
    }

    /// Returns the classified operations for the type `descriptor` describes,
    /// introspecting and classifying it on first request.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ContractViolation` if the type declares an
    /// operation that breaks a classification rule. The failure is not cached.
    pub fn get_classified(
        &self,
        descriptor: &TypeDescriptor,
    ) -> Result<Arc<ClassifiedMethods>, ServiceError> {
        let key = descriptor.key();
        if let Some(entry) = self.entries.get(&key) {
            trace!(provider = key.simple_name(), "classification cache hit");
            return Ok(Arc::clone(entry.value()));
        }

        let candidates = self.introspector.candidates(descriptor);
        let classified = classify(key, candidates).inspect_err(|err| {
            warn!(provider = key.name(), error = %err, "provider classification failed");
        })?;
        debug!(
            provider = key.name(),
            decorators = classified.decorators().len(),
            factories = classified.factories().len(),
            configurers = classified.configurers().len(),
            "classified provider type"
        );

        let entry = self
            .entries
            .entry(key)
            .or_insert_with(|| Arc::new(classified));
        Ok(Arc::clone(entry.value()))
    }

    #[must_use]
    pub fn contains(&self, key: TypeKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Number of provider types with a cached classification.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MethodCache {
    fn default() -> Self {
        Self::new()
    }
}
