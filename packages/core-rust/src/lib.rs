//! `servicekit` core: type identity, provider manifests, and operation handles.

pub mod descriptor;
pub mod error;
pub mod operation;
pub mod types;

pub use descriptor::{DescriptorBuilder, Provider, TypeDescriptor};
pub use error::{InvocationError, ReturnRequirement, ServiceError};
pub use operation::{CandidateOperation, Invoker, OperationHandle, Signature};
pub use types::{Instance, Root, Target, TypeKey};

#[cfg(test)]
mod tests {
    #[test]
    fn crate_loads() {
        // Empty body: if this test runs, the crate compiles and loads.
    }
}
