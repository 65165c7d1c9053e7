//! Provider manifests.
//!
//! Rust has no runtime reflection, so every provider type describes itself
//! with a [`TypeDescriptor`]: its declared operations in declaration order
//! and, optionally, the supertype it extends. A supertype is modelled as an
//! embedded base value plus a projection from the derived type to it;
//! inherited operations are re-targeted through that projection so they can
//! be invoked against the derived instance.
//!
//! ```
//! use std::sync::Arc;
//! use servicekit_core::{Provider, TypeDescriptor};
//!
//! struct Compiler {
//!     jobs: usize,
//! }
//!
//! struct BuildServices;
//!
//! impl Provider for BuildServices {
//!     fn descriptor() -> Arc<TypeDescriptor> {
//!         TypeDescriptor::builder::<Self>()
//!             .method0("createCompiler", |_: &Self| Compiler { jobs: 4 })
//!             .build()
//!     }
//! }
//!
//! let descriptor = BuildServices::descriptor();
//! assert_eq!(descriptor.operations().len(), 1);
//! assert_eq!(descriptor.operations()[0].name(), "createCompiler");
//! ```

use std::any::{type_name, Any};
use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::InvocationError;
use crate::operation::{CandidateOperation, Invoker};
use crate::types::{Instance, Target, TypeKey};

/// A type that can be registered with a service registry.
pub trait Provider: Any + Send + Sync {
    /// Describes the operations this type declares and the supertype it extends.
    fn descriptor() -> Arc<TypeDescriptor>
    where
        Self: Sized;
}

// ---------------------------------------------------------------------------
// TypeDescriptor
// ---------------------------------------------------------------------------

/// Declared operations of one type, linked to its supertype's descriptor.
#[derive(Debug)]
pub struct TypeDescriptor {
    key: TypeKey,
    operations: Vec<CandidateOperation>,
    supertype: Option<Arc<TypeDescriptor>>,
}

impl TypeDescriptor {
    /// Starts a descriptor for `P`. The supertype defaults to the root.
    #[must_use]
    pub fn builder<P: Any + Send + Sync>() -> DescriptorBuilder<P> {
        DescriptorBuilder {
            operations: Vec::new(),
            supertype: Self::root(),
            _provider: PhantomData,
        }
    }

    /// Descriptor of the universal root type.
    #[must_use]
    pub fn root() -> Arc<Self> {
        Arc::new(Self {
            key: TypeKey::root(),
            operations: Vec::new(),
            supertype: None,
        })
    }

    #[must_use]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Operations declared directly on this type, in declaration order.
    #[must_use]
    pub fn operations(&self) -> &[CandidateOperation] {
        &self.operations
    }

    #[must_use]
    pub fn supertype(&self) -> Option<&TypeDescriptor> {
        self.supertype.as_deref()
    }

    /// This descriptor followed by each successive supertype, ending at the root.
    pub fn chain(&self) -> impl Iterator<Item = &TypeDescriptor> {
        std::iter::successors(Some(self), |descriptor| descriptor.supertype())
    }
}

// ---------------------------------------------------------------------------
// DescriptorBuilder
// ---------------------------------------------------------------------------

/// Builder for a [`TypeDescriptor`] of provider type `P`.
///
/// The typed `method*` helpers derive parameter and return types from the
/// closure signature. A closure returning `()` declares a void operation.
pub struct DescriptorBuilder<P> {
    operations: Vec<CandidateOperation>,
    supertype: Arc<TypeDescriptor>,
    _provider: PhantomData<fn() -> P>,
}

impl<P: Any + Send + Sync> DescriptorBuilder<P> {
    /// Declares `B` as the supertype. `upcast` projects a `P` onto its
    /// embedded `B`; inherited operations are invoked through it.
    #[must_use]
    pub fn extends<B, F>(mut self, upcast: F) -> Self
    where
        B: Provider,
        F: Fn(&P) -> &B + Send + Sync + 'static,
    {
        let upcast = Arc::new(upcast);
        self.supertype = Arc::new(retarget::<P, B, F>(&B::descriptor(), &upcast));
        self
    }

    /// Declares an instance operation with an explicit manifest entry.
    #[must_use]
    pub fn operation(
        mut self,
        name: impl Into<Cow<'static, str>>,
        parameter_types: Vec<TypeKey>,
        return_type: TypeKey,
        invoker: Invoker,
    ) -> Self {
        self.operations.push(CandidateOperation::new(
            name,
            TypeKey::of::<P>(),
            parameter_types,
            return_type,
            false,
            invoker,
        ));
        self
    }

    /// Declares a static operation with an explicit manifest entry.
    #[must_use]
    pub fn static_operation(
        mut self,
        name: impl Into<Cow<'static, str>>,
        parameter_types: Vec<TypeKey>,
        return_type: TypeKey,
        invoker: Invoker,
    ) -> Self {
        self.operations.push(CandidateOperation::new(
            name,
            TypeKey::of::<P>(),
            parameter_types,
            return_type,
            true,
            invoker,
        ));
        self
    }

    #[must_use]
    pub fn method0<R, F>(self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        R: Any + Send + Sync,
        F: Fn(&P) -> R + Send + Sync + 'static,
    {
        self.try_method0(name, move |provider: &P| Ok(f(provider)))
    }

    #[must_use]
    pub fn method1<A, R, F>(self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        A: Any + Send + Sync,
        R: Any + Send + Sync,
        F: Fn(&P, Arc<A>) -> R + Send + Sync + 'static,
    {
        self.try_method1(name, move |provider: &P, a: Arc<A>| Ok(f(provider, a)))
    }

    #[must_use]
    pub fn method2<A1, A2, R, F>(self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        A1: Any + Send + Sync,
        A2: Any + Send + Sync,
        R: Any + Send + Sync,
        F: Fn(&P, Arc<A1>, Arc<A2>) -> R + Send + Sync + 'static,
    {
        let invoker: Invoker = Arc::new(
            move |target: &Target, args: &[Instance]| -> Result<Option<Instance>, InvocationError> {
                let provider = downcast_target::<P>(target)?;
                Ok(into_instance(f(provider, arg::<A1>(args, 0)?, arg::<A2>(args, 1)?)))
            },
        );
        self.operation(
            name,
            vec![TypeKey::of::<A1>(), TypeKey::of::<A2>()],
            TypeKey::of::<R>(),
            invoker,
        )
    }

    /// Like [`method0`](Self::method0), for operations that can fail.
    #[must_use]
    pub fn try_method0<R, F>(self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        R: Any + Send + Sync,
        F: Fn(&P) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        let invoker: Invoker = Arc::new(
            move |target: &Target, _args: &[Instance]| -> Result<Option<Instance>, InvocationError> {
                let provider = downcast_target::<P>(target)?;
                Ok(into_instance(f(provider)?))
            },
        );
        self.operation(name, Vec::new(), TypeKey::of::<R>(), invoker)
    }

    /// Like [`method1`](Self::method1), for operations that can fail.
    #[must_use]
    pub fn try_method1<A, R, F>(self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        A: Any + Send + Sync,
        R: Any + Send + Sync,
        F: Fn(&P, Arc<A>) -> anyhow::Result<R> + Send + Sync + 'static,
    {
        let invoker: Invoker = Arc::new(
            move |target: &Target, args: &[Instance]| -> Result<Option<Instance>, InvocationError> {
                let provider = downcast_target::<P>(target)?;
                Ok(into_instance(f(provider, arg::<A>(args, 0)?)?))
            },
        );
        self.operation(name, vec![TypeKey::of::<A>()], TypeKey::of::<R>(), invoker)
    }

    #[must_use]
    pub fn static_method0<R, F>(self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        R: Any + Send + Sync,
        F: Fn() -> R + Send + Sync + 'static,
    {
        let invoker: Invoker = Arc::new(
            move |_target: &Target, _args: &[Instance]| -> Result<Option<Instance>, InvocationError> {
                Ok(into_instance(f()))
            },
        );
        self.static_operation(name, Vec::new(), TypeKey::of::<R>(), invoker)
    }

    #[must_use]
    pub fn static_method1<A, R, F>(self, name: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        A: Any + Send + Sync,
        R: Any + Send + Sync,
        F: Fn(Arc<A>) -> R + Send + Sync + 'static,
    {
        let invoker: Invoker = Arc::new(
            move |_target: &Target, args: &[Instance]| -> Result<Option<Instance>, InvocationError> {
                Ok(into_instance(f(arg::<A>(args, 0)?)))
            },
        );
        self.static_operation(name, vec![TypeKey::of::<A>()], TypeKey::of::<R>(), invoker)
    }

    #[must_use]
    pub fn build(self) -> Arc<TypeDescriptor> {
        Arc::new(TypeDescriptor {
            key: TypeKey::of::<P>(),
            operations: self.operations,
            supertype: Some(self.supertype),
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Copies `descriptor` and its whole supertype chain, wrapping every instance
/// operation so it accepts a `P` target and forwards the projected `B`.
fn retarget<P, B, F>(descriptor: &TypeDescriptor, upcast: &Arc<F>) -> TypeDescriptor
where
    P: Any + Send + Sync,
    B: Any + Send + Sync,
    F: Fn(&P) -> &B + Send + Sync + 'static,
{
    let operations = descriptor
        .operations
        .iter()
        .map(|operation| {
            if operation.is_static() {
                return operation.clone();
            }
            let inner = Arc::clone(operation.invoker());
            let upcast = Arc::clone(upcast);
            operation.with_invoker(Arc::new(
                move |target: &Target, args: &[Instance]| -> Result<Option<Instance>, InvocationError> {
                    let derived = downcast_target::<P>(target)?;
                    let base: &Target = (*upcast)(derived);
                    inner(base, args)
                },
            ))
        })
        .collect();

    TypeDescriptor {
        key: descriptor.key,
        operations,
        supertype: descriptor
            .supertype
            .as_ref()
            .map(|supertype| Arc::new(retarget::<P, B, F>(supertype, upcast))),
    }
}

fn downcast_target<P: Any>(target: &Target) -> Result<&P, InvocationError> {
    target
        .downcast_ref::<P>()
        .ok_or(InvocationError::TargetType {
            expected: type_name::<P>(),
        })
}

fn arg<A: Any + Send + Sync>(args: &[Instance], index: usize) -> Result<Arc<A>, InvocationError> {
    let value = args.get(index).ok_or(InvocationError::ArgumentCount {
        expected: index + 1,
        actual: args.len(),
    })?;
    Arc::clone(value)
        .downcast::<A>()
        .map_err(|_| InvocationError::ArgumentType {
            index,
            expected: type_name::<A>(),
        })
}

fn into_instance<R: Any + Send + Sync>(value: R) -> Option<Instance> {
    if TypeKey::of::<R>().is_void() {
        None
    } else {
        Some(Arc::new(value) as Instance)
    }
}
