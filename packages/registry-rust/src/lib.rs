//! `servicekit` registry: provider classification and service registry composition.

pub mod service;
pub mod traits;

pub use service::{
    ClassifiedMethods, ContainerConfig, DefaultServiceRegistry, MethodCache, MethodKind,
    ProviderInstance, RegisteredMethod, ServiceContainer, ServiceRegistryBuilder,
};
pub use servicekit_core::{
    Instance, InvocationError, OperationHandle, Provider, ServiceError, TypeDescriptor, TypeKey,
};
pub use traits::ServiceRegistry;
