//! Operation classification: partitions a provider's candidate operations into
//! decorators, factories, and configurers.
//!
//! Classification runs three ordered passes over a shared working set. Each
//! pass removes what it claims, so an operation that fits two rules belongs to
//! whichever runs first:
//!
//! 1. **Decorator**: name starts with `create` or `decorate`, non-void, and
//!    some parameter has exactly the return type.
//! 2. **Factory**: name starts with `create`, non-static, non-void.
//! 3. **Configurer**: name is exactly `configure`, void.
//!
//! A `create*` operation that fails the decorator shape test falls through to
//! the factory pass. Operations no pass claims are dropped.

use std::collections::HashSet;

use servicekit_core::{
    CandidateOperation, OperationHandle, ReturnRequirement, ServiceError, Signature, TypeKey,
};
use tracing::trace;

const CREATE_PREFIX: &str = "create";
const DECORATE_PREFIX: &str = "decorate";
const CONFIGURE_NAME: &str = "configure";

// ---------------------------------------------------------------------------
// MethodKind
// ---------------------------------------------------------------------------

/// Role a classified operation plays in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodKind {
    /// Receives a service and returns an augmented service of the same type.
    Decorator,
    /// Produces a new service instance.
    Factory,
    /// Applies side-effecting configuration to resolved arguments.
    Configurer,
}

impl MethodKind {
    /// Pass order. Earlier rules claim an operation first.
    pub const PASSES: [Self; 3] = [Self::Decorator, Self::Factory, Self::Configurer];

    /// Tests `operation` against this rule. `Ok(false)` leaves it for later passes.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ContractViolation` when the name matches this
    /// rule but the return type breaks the rule's void/non-void requirement.
    pub fn accepts(
        self,
        type_name: &str,
        operation: &CandidateOperation,
    ) -> Result<bool, ServiceError> {
        let name = operation.name();
        match self {
            Self::Decorator => {
                if !name.starts_with(CREATE_PREFIX) && !name.starts_with(DECORATE_PREFIX) {
                    return Ok(false);
                }
                require(type_name, operation, ReturnRequirement::MustNotReturnVoid)?;
                Ok(operation.takes_return_type_as_parameter())
            }
            Self::Factory => {
                if !name.starts_with(CREATE_PREFIX) || operation.is_static() {
                    return Ok(false);
                }
                require(type_name, operation, ReturnRequirement::MustNotReturnVoid)?;
                Ok(true)
            }
            Self::Configurer => {
                if name != CONFIGURE_NAME {
                    return Ok(false);
                }
                require(type_name, operation, ReturnRequirement::MustReturnVoid)?;
                Ok(true)
            }
        }
    }
}

fn require(
    type_name: &str,
    operation: &CandidateOperation,
    requirement: ReturnRequirement,
) -> Result<(), ServiceError> {
    let satisfied = match requirement {
        ReturnRequirement::MustReturnVoid => operation.returns_void(),
        ReturnRequirement::MustNotReturnVoid => !operation.returns_void(),
    };
    if satisfied {
        Ok(())
    } else {
        Err(ServiceError::contract_violation(
            type_name,
            operation.name(),
            requirement,
        ))
    }
}

// ---------------------------------------------------------------------------
// ClassifiedMethods
// ---------------------------------------------------------------------------

/// Classified operations of one provider type. Immutable once built.
#[derive(Debug, Default)]
pub struct ClassifiedMethods {
    decorators: Vec<OperationHandle>,
    factories: Vec<OperationHandle>,
    configurers: Vec<OperationHandle>,
}

impl ClassifiedMethods {
    #[must_use]
    pub fn decorators(&self) -> &[OperationHandle] {
        &self.decorators
    }

    #[must_use]
    pub fn factories(&self) -> &[OperationHandle] {
        &self.factories
    }

    #[must_use]
    pub fn configurers(&self) -> &[OperationHandle] {
        &self.configurers
    }

    #[must_use]
    pub fn of_kind(&self, kind: MethodKind) -> &[OperationHandle] {
        match kind {
            MethodKind::Decorator => &self.decorators,
            MethodKind::Factory => &self.factories,
            MethodKind::Configurer => &self.configurers,
        }
    }

    /// All handles tagged with their kind: decorators, then factories, then
    /// configurers, each in classification order.
    pub fn iter(&self) -> impl Iterator<Item = (MethodKind, &OperationHandle)> {
        MethodKind::PASSES
            .into_iter()
            .flat_map(move |kind| self.of_kind(kind).iter().map(move |handle| (kind, handle)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.decorators.len() + self.factories.len() + self.configurers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn bucket_mut(&mut self, kind: MethodKind) -> &mut Vec<OperationHandle> {
        match kind {
            MethodKind::Decorator => &mut self.decorators,
            MethodKind::Factory => &mut self.factories,
            MethodKind::Configurer => &mut self.configurers,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Working state for classifying one provider type.
struct ClassificationBuilder {
    type_name: &'static str,
    remaining: Vec<CandidateOperation>,
    seen: HashSet<Signature>,
    methods: ClassifiedMethods,
}

impl ClassificationBuilder {
    fn new(provider_type: TypeKey, candidates: Vec<CandidateOperation>) -> Self {
        Self {
            type_name: provider_type.simple_name(),
            remaining: candidates,
            seen: HashSet::new(),
            methods: ClassifiedMethods::default(),
        }
    }

    fn run_pass(&mut self, kind: MethodKind) -> Result<(), ServiceError> {
        let candidates = std::mem::take(&mut self.remaining);
        for operation in candidates {
            if kind.accepts(self.type_name, &operation)? {
                self.add(kind, operation);
            } else {
                self.remaining.push(operation);
            }
        }
        Ok(())
    }

    /// Files `operation` under `kind` unless its signature was already
    /// claimed by a more-derived declaration or an earlier pass.
    fn add(&mut self, kind: MethodKind, operation: CandidateOperation) {
        if self.seen.insert(operation.signature()) {
            self.methods.bucket_mut(kind).push(OperationHandle::from(operation));
        } else {
            trace!(
                provider = self.type_name,
                operation = operation.name(),
                declared_by = operation.declaring_type().simple_name(),
                "skipping overridden operation"
            );
        }
    }
}

/// Classifies the candidate operations of `provider_type`.
///
/// `candidates` must be ordered most-derived first (see
/// [`Introspector::candidates`](super::introspect::Introspector::candidates)),
/// so that an override shadows the declaration it replaces.
///
/// # Errors
///
/// Returns `ServiceError::ContractViolation` if any operation matches a rule's
/// name pattern but breaks its return-type requirement. No partial result is
/// produced.
pub fn classify(
    provider_type: TypeKey,
    candidates: Vec<CandidateOperation>,
) -> Result<ClassifiedMethods, ServiceError> {
    let mut builder = ClassificationBuilder::new(provider_type, candidates);
    for kind in MethodKind::PASSES {
        builder.run_pass(kind)?;
    }
    trace!(
        provider = builder.type_name,
        unmatched = builder.remaining.len(),
        "dropping unclassified operations"
    );
    Ok(builder.methods)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;
    use servicekit_core::{Instance, InvocationError, Invoker, Target};

    use super::*;

    struct Services;
    struct BaseServices;
    struct Foo;
    struct Bar;

    fn noop() -> Invoker {
        Arc::new(
            |_target: &Target, _args: &[Instance]| -> Result<Option<Instance>, InvocationError> {
                Ok(None)
            },
        )
    }

    fn declared_on(
        declaring: TypeKey,
        name: &'static str,
        params: Vec<TypeKey>,
        ret: TypeKey,
        is_static: bool,
    ) -> CandidateOperation {
        CandidateOperation::new(name, declaring, params, ret, is_static, noop())
    }

    fn op(name: &'static str, params: Vec<TypeKey>, ret: TypeKey) -> CandidateOperation {
        declared_on(TypeKey::of::<Services>(), name, params, ret, false)
    }

    fn run(candidates: Vec<CandidateOperation>) -> Result<ClassifiedMethods, ServiceError> {
        classify(TypeKey::of::<Services>(), candidates)
    }

    fn names(handles: &[OperationHandle]) -> Vec<&str> {
        handles.iter().map(OperationHandle::name).collect()
    }

    #[test]
    fn no_arg_create_is_a_factory() {
        let methods = run(vec![op("create", vec![], TypeKey::of::<Foo>())]).unwrap();
        assert_eq!(names(methods.factories()), vec!["create"]);
        assert!(methods.decorators().is_empty());
    }

    #[test]
    fn create_taking_own_return_type_is_a_decorator() {
        let methods = run(vec![op(
            "createFoo",
            vec![TypeKey::of::<Foo>()],
            TypeKey::of::<Foo>(),
        )])
        .unwrap();
        assert_eq!(names(methods.decorators()), vec!["createFoo"]);
        assert!(methods.factories().is_empty());
    }

    #[test]
    fn decorate_prefix_is_a_decorator() {
        let methods = run(vec![op(
            "decorateFoo",
            vec![TypeKey::of::<Bar>(), TypeKey::of::<Foo>()],
            TypeKey::of::<Foo>(),
        )])
        .unwrap();
        assert_eq!(names(methods.decorators()), vec!["decorateFoo"]);
    }

    #[test]
    fn decorate_without_own_type_parameter_is_dropped() {
        let methods = run(vec![op(
            "decorateFoo",
            vec![TypeKey::of::<Bar>()],
            TypeKey::of::<Foo>(),
        )])
        .unwrap();
        assert!(methods.is_empty());
    }

    #[test]
    fn create_with_other_parameter_falls_through_to_factory() {
        let methods = run(vec![op(
            "createFoo",
            vec![TypeKey::of::<Bar>()],
            TypeKey::of::<Foo>(),
        )])
        .unwrap();
        assert_eq!(names(methods.factories()), vec!["createFoo"]);
        assert!(methods.decorators().is_empty());
    }

    #[test]
    fn static_create_is_not_a_factory() {
        let methods = run(vec![declared_on(
            TypeKey::of::<Services>(),
            "createFoo",
            vec![],
            TypeKey::of::<Foo>(),
            true,
        )])
        .unwrap();
        assert!(methods.is_empty());
    }

    #[test]
    fn static_create_decorator_is_still_a_decorator() {
        let methods = run(vec![declared_on(
            TypeKey::of::<Services>(),
            "createFoo",
            vec![TypeKey::of::<Foo>()],
            TypeKey::of::<Foo>(),
            true,
        )])
        .unwrap();
        assert_eq!(names(methods.decorators()), vec!["createFoo"]);
    }

    #[test]
    fn configure_returning_void_is_a_configurer() {
        let methods = run(vec![op(
            "configure",
            vec![TypeKey::of::<Foo>()],
            TypeKey::void(),
        )])
        .unwrap();
        assert_eq!(names(methods.configurers()), vec!["configure"]);
    }

    #[test]
    fn configure_prefix_is_not_a_configurer() {
        let methods = run(vec![
            op("configureX", vec![], TypeKey::void()),
            op("configureFoo", vec![], TypeKey::of::<Foo>()),
        ])
        .unwrap();
        assert!(methods.is_empty());
    }

    #[test]
    fn ordinary_operations_are_dropped() {
        let methods = run(vec![
            op("getFoo", vec![], TypeKey::of::<Foo>()),
            op("close", vec![], TypeKey::void()),
        ])
        .unwrap();
        assert!(methods.is_empty());
    }

    #[test]
    fn configure_returning_value_is_a_contract_violation() {
        let err = run(vec![op("configure", vec![], TypeKey::of::<Foo>())]).unwrap_err();
        assert_eq!(
            err,
            ServiceError::contract_violation(
                "Services",
                "configure",
                ReturnRequirement::MustReturnVoid
            )
        );
        assert!(err.to_string().contains("must return void"));
    }

    #[test]
    fn void_create_is_a_contract_violation() {
        let err = run(vec![op("createBar", vec![], TypeKey::void())]).unwrap_err();
        assert_eq!(err.to_string(), "Method Services.createBar() must not return void.");
    }

    #[test]
    fn void_decorate_is_a_contract_violation() {
        let err = run(vec![op(
            "decorateFoo",
            vec![TypeKey::of::<Foo>()],
            TypeKey::void(),
        )])
        .unwrap_err();
        assert!(err.to_string().contains("must not return void"));
    }

    #[test]
    fn violation_aborts_whole_classification() {
        let result = run(vec![
            op("createFoo", vec![], TypeKey::of::<Foo>()),
            op("configure", vec![], TypeKey::of::<Bar>()),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn override_keeps_most_derived_declaration() {
        let methods = run(vec![
            declared_on(TypeKey::of::<Services>(), "createFoo", vec![], TypeKey::of::<Foo>(), false),
            declared_on(TypeKey::of::<BaseServices>(), "createFoo", vec![], TypeKey::of::<Foo>(), false),
            declared_on(TypeKey::of::<BaseServices>(), "createBar", vec![], TypeKey::of::<Bar>(), false),
        ])
        .unwrap();
        assert_eq!(methods.factories().len(), 2);
        assert_eq!(methods.factories()[0].name(), "createFoo");
        assert_eq!(
            methods.factories()[0].declaring_type(),
            TypeKey::of::<Services>()
        );
        assert_eq!(methods.factories()[1].name(), "createBar");
    }

    #[test]
    fn overloads_with_different_parameters_are_kept() {
        let methods = run(vec![
            op("createFoo", vec![], TypeKey::of::<Foo>()),
            op("createFoo", vec![TypeKey::of::<Bar>()], TypeKey::of::<Foo>()),
        ])
        .unwrap();
        assert_eq!(methods.factories().len(), 2);
    }

    #[test]
    fn signature_claimed_by_decorator_is_not_reused_by_factory() {
        // The base re-declares the decorator's signature with a different
        // return type, which would otherwise make it a factory.
        let methods = run(vec![
            declared_on(
                TypeKey::of::<Services>(),
                "createFoo",
                vec![TypeKey::of::<Foo>()],
                TypeKey::of::<Foo>(),
                false,
            ),
            declared_on(
                TypeKey::of::<BaseServices>(),
                "createFoo",
                vec![TypeKey::of::<Foo>()],
                TypeKey::of::<Bar>(),
                false,
            ),
        ])
        .unwrap();
        assert_eq!(methods.decorators().len(), 1);
        assert!(methods.factories().is_empty());
    }

    #[test]
    fn buckets_preserve_candidate_order() {
        let methods = run(vec![
            op("createB", vec![], TypeKey::of::<Bar>()),
            op("configure", vec![], TypeKey::void()),
            op("createA", vec![], TypeKey::of::<Foo>()),
            op("decorateFoo", vec![TypeKey::of::<Foo>()], TypeKey::of::<Foo>()),
        ])
        .unwrap();
        assert_eq!(names(methods.factories()), vec!["createB", "createA"]);
        let tagged: Vec<(MethodKind, &str)> =
            methods.iter().map(|(kind, handle)| (kind, handle.name())).collect();
        assert_eq!(
            tagged,
            vec![
                (MethodKind::Decorator, "decorateFoo"),
                (MethodKind::Factory, "createB"),
                (MethodKind::Factory, "createA"),
                (MethodKind::Configurer, "configure"),
            ]
        );
        assert_eq!(methods.len(), 4);
    }

    #[test]
    fn empty_candidates_classify_to_empty() {
        let methods = run(Vec::new()).unwrap();
        assert!(methods.is_empty());
    }

    // ---- Property tests ----

    const NAMES: [&str; 9] = [
        "create",
        "createFoo",
        "createBar",
        "decorateFoo",
        "configure",
        "configureX",
        "getFoo",
        "decorate",
        "close",
    ];

    fn type_pool() -> [TypeKey; 4] {
        [
            TypeKey::of::<Foo>(),
            TypeKey::of::<Bar>(),
            TypeKey::of::<Services>(),
            TypeKey::void(),
        ]
    }

    fn arb_operation() -> impl Strategy<Value = CandidateOperation> {
        (
            0..NAMES.len(),
            prop::collection::vec(0..3_usize, 0..3),
            0..4_usize,
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(name, params, ret, is_static, from_base)| {
                let pool = type_pool();
                let declaring = if from_base {
                    TypeKey::of::<BaseServices>()
                } else {
                    TypeKey::of::<Services>()
                };
                declared_on(
                    declaring,
                    NAMES[name],
                    params.into_iter().map(|i| pool[i]).collect(),
                    pool[ret],
                    is_static,
                )
            })
    }

    proptest! {
        #[test]
        fn handles_have_unique_signatures(ops in prop::collection::vec(arb_operation(), 0..24)) {
            if let Ok(methods) = run(ops) {
                let mut seen = HashSet::new();
                for (_, handle) in methods.iter() {
                    prop_assert!(seen.insert(handle.signature()));
                }
                prop_assert_eq!(seen.len(), methods.len());
            }
        }

        #[test]
        fn every_handle_satisfies_its_bucket_rule(ops in prop::collection::vec(arb_operation(), 0..24)) {
            if let Ok(methods) = run(ops) {
                for handle in methods.decorators() {
                    prop_assert!(handle.name().starts_with("create") || handle.name().starts_with("decorate"));
                    prop_assert!(!handle.return_type().is_void());
                    prop_assert!(handle.parameter_types().contains(&handle.return_type()));
                }
                for handle in methods.factories() {
                    prop_assert!(handle.name().starts_with("create"));
                    prop_assert!(!handle.is_static());
                    prop_assert!(!handle.return_type().is_void());
                }
                for handle in methods.configurers() {
                    prop_assert_eq!(handle.name(), "configure");
                    prop_assert!(handle.return_type().is_void());
                }
            }
        }

        #[test]
        fn classification_is_deterministic(ops in prop::collection::vec(arb_operation(), 0..24)) {
            let first = run(ops.clone());
            let second = run(ops);
            match (first, second) {
                (Ok(a), Ok(b)) => {
                    let a: Vec<_> = a.iter().map(|(k, h)| (k, h.signature(), h.declaring_type())).collect();
                    let b: Vec<_> = b.iter().map(|(k, h)| (k, h.signature(), h.declaring_type())).collect();
                    prop_assert_eq!(a, b);
                }
                (Err(a), Err(b)) => {
                    prop_assert_eq!(a, b);
                }
                _ => {
                    prop_assert!(false, "classification outcome changed between runs");
                }
            }
        }
    }
}
