//! Provider introspection and registry composition.
//!
//! A provider passes through these stages on its way into a registry:
//!
//! 1. **Introspection** (`introspect`): `TypeDescriptor` -> ordered candidate operations
//! 2. **Classification** (`classify`): candidates -> decorators, factories, configurers
//! 3. **Caching** (`cache`): one classification per provider type, shared by all registries
//! 4. **Composition** (`builder`, `registry`): providers incorporated in registration order

pub mod builder;
pub mod cache;
pub mod classify;
pub mod config;
pub mod container;
pub mod introspect;
pub mod registry;

// Re-export key types for convenient access.
pub use builder::ServiceRegistryBuilder;
pub use cache::MethodCache;
pub use classify::{classify, ClassifiedMethods, MethodKind};
pub use config::ContainerConfig;
pub use container::ServiceContainer;
pub use introspect::Introspector;
pub use registry::{DefaultServiceRegistry, ProviderInstance, RegisteredMethod};
