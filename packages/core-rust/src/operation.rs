//! Declared operations and the handles exposed to the resolution engine.
//!
//! A [`CandidateOperation`] is one entry of a provider's manifest: the name,
//! parameter and return types, and a type-erased invoker. Classification
//! wraps the operations it keeps into [`OperationHandle`]s.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::InvocationError;
use crate::types::{Instance, Target, TypeKey};

/// Type-erased call into a provider operation.
///
/// Receives the provider instance (ignored by static operations) and the
/// already-resolved arguments in parameter order. Returns `None` for void
/// operations.
pub type Invoker =
    Arc<dyn Fn(&Target, &[Instance]) -> Result<Option<Instance>, InvocationError> + Send + Sync>;

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// Name plus ordered parameter types. Two operations with the same signature
/// along one inheritance chain are an override pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    name: Cow<'static, str>,
    parameter_types: Vec<TypeKey>,
}

impl Signature {
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>, parameter_types: Vec<TypeKey>) -> Self {
        Self {
            name: name.into(),
            parameter_types,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn parameter_types(&self) -> &[TypeKey] {
        &self.parameter_types
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for param in &self.parameter_types {
            write!(f, ",{}", param.name())?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CandidateOperation
// ---------------------------------------------------------------------------

/// One operation declared by a provider type.
#[derive(Clone)]
pub struct CandidateOperation {
    name: Cow<'static, str>,
    declaring_type: TypeKey,
    parameter_types: Vec<TypeKey>,
    return_type: TypeKey,
    is_static: bool,
    invoker: Invoker,
}

impl CandidateOperation {
    #[must_use]
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        declaring_type: TypeKey,
        parameter_types: Vec<TypeKey>,
        return_type: TypeKey,
        is_static: bool,
        invoker: Invoker,
    ) -> Self {
        Self {
            name: name.into(),
            declaring_type,
            parameter_types,
            return_type,
            is_static,
            invoker,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn declaring_type(&self) -> TypeKey {
        self.declaring_type
    }

    #[must_use]
    pub fn parameter_types(&self) -> &[TypeKey] {
        &self.parameter_types
    }

    #[must_use]
    pub fn return_type(&self) -> TypeKey {
        self.return_type
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    #[must_use]
    pub fn returns_void(&self) -> bool {
        self.return_type.is_void()
    }

    /// True when some parameter has exactly the return type.
    #[must_use]
    pub fn takes_return_type_as_parameter(&self) -> bool {
        self.parameter_types.contains(&self.return_type)
    }

    #[must_use]
    pub fn signature(&self) -> Signature {
        Signature::new(self.name.clone(), self.parameter_types.clone())
    }

    #[must_use]
    pub fn invoker(&self) -> &Invoker {
        &self.invoker
    }

    /// Same declaration, different invoker. Used when an inherited operation
    /// is re-targeted at a derived instance.
    #[must_use]
    pub fn with_invoker(&self, invoker: Invoker) -> Self {
        Self {
            invoker,
            ..self.clone()
        }
    }
}

impl fmt::Debug for CandidateOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CandidateOperation")
            .field("name", &self.name)
            .field("declaring_type", &self.declaring_type)
            .field("parameter_types", &self.parameter_types)
            .field("return_type", &self.return_type)
            .field("is_static", &self.is_static)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// OperationHandle
// ---------------------------------------------------------------------------

/// A classified operation, ready to be invoked by the resolution engine.
///
/// Cheap to clone; handles for one provider type are shared by every
/// registry that incorporates a provider of that type.
#[derive(Clone, Debug)]
pub struct OperationHandle {
    operation: Arc<CandidateOperation>,
}

impl OperationHandle {
    #[must_use]
    pub fn name(&self) -> &str {
        self.operation.name()
    }

    #[must_use]
    pub fn declaring_type(&self) -> TypeKey {
        self.operation.declaring_type()
    }

    #[must_use]
    pub fn parameter_types(&self) -> &[TypeKey] {
        self.operation.parameter_types()
    }

    #[must_use]
    pub fn return_type(&self) -> TypeKey {
        self.operation.return_type()
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.operation.is_static()
    }

    #[must_use]
    pub fn signature(&self) -> Signature {
        self.operation.signature()
    }

    /// Invokes the operation against `target` with resolved `args`.
    ///
    /// # Errors
    ///
    /// Returns `InvocationError::ArgumentCount` if `args` does not match the
    /// declared arity, and propagates any error raised by the invoker
    /// (wrong target or argument types, or a failing operation body).
    pub fn invoke(
        &self,
        target: &Target,
        args: &[Instance],
    ) -> Result<Option<Instance>, InvocationError> {
        let expected = self.operation.parameter_types().len();
        if args.len() != expected {
            return Err(InvocationError::ArgumentCount {
                expected,
                actual: args.len(),
            });
        }
        (self.operation.invoker())(target, args)
    }
}

impl From<CandidateOperation> for OperationHandle {
    fn from(operation: CandidateOperation) -> Self {
        Self {
            operation: Arc::new(operation),
        }
    }
}
