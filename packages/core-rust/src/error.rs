//! Error types for operation classification and invocation.

use std::fmt;

/// Return-type requirement a naming rule places on an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnRequirement {
    /// `configure` hooks.
    MustReturnVoid,
    /// `create*` factories and `create*`/`decorate*` decorators.
    MustNotReturnVoid,
}

impl fmt::Display for ReturnRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MustReturnVoid => f.write_str("must return void"),
            Self::MustNotReturnVoid => f.write_str("must not return void"),
        }
    }
}

/// Errors raised while discovering a provider's service operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// An operation matched a naming rule but its return type breaks that
    /// rule's void/non-void requirement.
    #[error("Method {type_name}.{method}() {requirement}.")]
    ContractViolation {
        type_name: String,
        method: String,
        requirement: ReturnRequirement,
    },
}

impl ServiceError {
    #[must_use]
    pub fn contract_violation(
        type_name: impl Into<String>,
        method: impl Into<String>,
        requirement: ReturnRequirement,
    ) -> Self {
        Self::ContractViolation {
            type_name: type_name.into(),
            method: method.into(),
            requirement,
        }
    }
}

/// Errors returned when an operation handle is invoked.
#[derive(Debug, thiserror::Error)]
pub enum InvocationError {
    #[error("invocation target is not an instance of {expected}")]
    TargetType { expected: &'static str },
    #[error("expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },
    #[error("argument {index} is not an instance of {expected}")]
    ArgumentType { index: usize, expected: &'static str },
    #[error("operation failed: {0}")]
    Failed(#[from] anyhow::Error),
}
