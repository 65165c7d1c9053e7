use std::sync::Arc;

use servicekit_core::ServiceError;

use crate::service::{MethodKind, ProviderInstance, RegisteredMethod};

/// Registry abstraction consumed by the resolution engine.
///
/// A registry incorporates providers and exposes the operations they
/// contribute. Looking a service up by type is the resolution engine's job
/// and is not part of this trait.
pub trait ServiceRegistry: Send + Sync {
    /// Human-readable name used in diagnostics.
    fn display_name(&self) -> &str;

    /// Parent registries, in the order they were supplied.
    fn parents(&self) -> &[Arc<dyn ServiceRegistry>];

    /// Classifies `provider` and publishes its operations.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ContractViolation` if the provider's type breaks
    /// a classification rule. Nothing is published in that case.
    fn incorporate(&self, provider: ProviderInstance) -> Result<(), ServiceError>;

    /// Operations of `kind` contributed by incorporated providers, in
    /// incorporation order.
    fn methods(&self, kind: MethodKind) -> Vec<RegisteredMethod>;

    fn decorators(&self) -> Vec<RegisteredMethod> {
        self.methods(MethodKind::Decorator)
    }

    fn factories(&self) -> Vec<RegisteredMethod> {
        self.methods(MethodKind::Factory)
    }

    fn configurers(&self) -> Vec<RegisteredMethod> {
        self.methods(MethodKind::Configurer)
    }
}
