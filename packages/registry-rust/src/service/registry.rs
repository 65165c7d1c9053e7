use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use servicekit_core::{
    Instance, InvocationError, OperationHandle, Provider, ServiceError, TypeDescriptor, TypeKey,
};
use tracing::debug;

use super::cache::MethodCache;
use super::classify::{ClassifiedMethods, MethodKind};
use crate::traits::ServiceRegistry;

// ---------------------------------------------------------------------------
// ProviderInstance
// ---------------------------------------------------------------------------

/// A provider value paired with its type descriptor.
///
/// Cloning shares the underlying provider value.
#[derive(Clone)]
pub struct ProviderInstance {
    instance: Instance,
    descriptor: Arc<TypeDescriptor>,
}

impl ProviderInstance {
    #[must_use]
    pub fn new<P: Provider>(provider: P) -> Self {
        Self::from_arc(Arc::new(provider))
    }

    #[must_use]
    pub fn from_arc<P: Provider>(provider: Arc<P>) -> Self {
        Self {
            instance: provider,
            descriptor: P::descriptor(),
        }
    }

    #[must_use]
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    #[must_use]
    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn type_key(&self) -> TypeKey {
        self.descriptor.key()
    }
}

impl fmt::Debug for ProviderInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderInstance")
            .field("type", &self.type_key())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// RegisteredMethod
// ---------------------------------------------------------------------------

/// A classified operation bound to the provider instance that contributed it.
#[derive(Clone, Debug)]
pub struct RegisteredMethod {
    kind: MethodKind,
    provider: Instance,
    handle: OperationHandle,
}

impl RegisteredMethod {
    #[must_use]
    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    #[must_use]
    pub fn handle(&self) -> &OperationHandle {
        &self.handle
    }

    #[must_use]
    pub fn provider(&self) -> &Instance {
        &self.provider
    }

    /// Invokes the operation against its provider with resolved `args`.
    ///
    /// # Errors
    ///
    /// Propagates the `InvocationError` raised by the handle.
    pub fn invoke(&self, args: &[Instance]) -> Result<Option<Instance>, InvocationError> {
        self.handle.invoke(self.provider.as_ref(), args)
    }
}

// ---------------------------------------------------------------------------
// DefaultServiceRegistry
// ---------------------------------------------------------------------------

struct RegisteredProvider {
    provider: ProviderInstance,
    methods: Arc<ClassifiedMethods>,
}

/// Registry composed of parent registries and incorporated providers.
///
/// Providers are incorporated one at a time; a provider's operations are
/// visible through [`ServiceRegistry::methods`] as soon as its
/// incorporation returns. Classification goes through the shared
/// [`MethodCache`], so each provider type is introspected once per cache.
///
/// Also usable as a provider base: a provider type may embed a
/// `DefaultServiceRegistry` and declare it as its supertype. Introspection
/// stops at this type, so nothing it declares is mistaken for a provider
/// operation.
pub struct DefaultServiceRegistry {
    display_name: String,
    parents: Vec<Arc<dyn ServiceRegistry>>,
    cache: Arc<MethodCache>,
    providers: RwLock<Vec<RegisteredProvider>>,
}

impl DefaultServiceRegistry {
    #[must_use]
    pub fn new(
        display_name: impl Into<String>,
        parents: Vec<Arc<dyn ServiceRegistry>>,
        cache: Arc<MethodCache>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            parents,
            cache,
            providers: RwLock::new(Vec::new()),
        }
    }

    /// Incorporates `provider`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ContractViolation` if `P` breaks a
    /// classification rule.
    pub fn add_provider<P: Provider>(&self, provider: P) -> Result<(), ServiceError> {
        self.incorporate(ProviderInstance::new(provider))
    }

    /// Incorporated providers, in incorporation order.
    #[must_use]
    pub fn providers(&self) -> Vec<ProviderInstance> {
        self.providers
            .read()
            .iter()
            .map(|registered| registered.provider.clone())
            .collect()
    }

    #[must_use]
    pub fn provider_types(&self) -> Vec<TypeKey> {
        self.providers
            .read()
            .iter()
            .map(|registered| registered.provider.type_key())
            .collect()
    }

    #[must_use]
    pub fn cache(&self) -> &Arc<MethodCache> {
        &self.cache
    }
}

impl ServiceRegistry for DefaultServiceRegistry {
    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn parents(&self) -> &[Arc<dyn ServiceRegistry>] {
        &self.parents
    }

    fn incorporate(&self, provider: ProviderInstance) -> Result<(), ServiceError> {
        let methods = self.cache.get_classified(provider.descriptor())?;
        debug!(
            registry = %self.display_name,
            provider = provider.type_key().name(),
            operations = methods.len(),
            "incorporated provider"
        );
        self.providers
            .write()
            .push(RegisteredProvider { provider, methods });
        Ok(())
    }

    fn methods(&self, kind: MethodKind) -> Vec<RegisteredMethod> {
        self.providers
            .read()
            .iter()
            .flat_map(|registered| {
                registered
                    .methods
                    .of_kind(kind)
                    .iter()
                    .map(move |handle| RegisteredMethod {
                        kind,
                        provider: Arc::clone(registered.provider.instance()),
                        handle: handle.clone(),
                    })
            })
            .collect()
    }
}

impl Provider for DefaultServiceRegistry {
    fn descriptor() -> Arc<TypeDescriptor> {
        TypeDescriptor::builder::<Self>().build()
    }
}

impl fmt::Display for DefaultServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}

impl fmt::Debug for DefaultServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultServiceRegistry")
            .field("display_name", &self.display_name)
            .field("parents", &self.parents.len())
            .field("providers", &self.provider_types())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
