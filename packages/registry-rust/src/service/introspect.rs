//! Candidate discovery: walks a provider's descriptor chain.

use servicekit_core::{CandidateOperation, TypeDescriptor, TypeKey};

use super::registry::DefaultServiceRegistry;

/// Collects the operations a provider type declares along its supertype chain.
///
/// Types are visited most-derived first; within a type, operations keep their
/// declaration order. The walk stops before the first boundary type. The
/// universal root is always a boundary; by default the registry base type
/// [`DefaultServiceRegistry`] is one too, since its operations are structural.
#[derive(Debug, Clone)]
pub struct Introspector {
    boundaries: Vec<TypeKey>,
}

impl Introspector {
    /// Creates an introspector that stops at the root and at each of `boundaries`.
    #[must_use]
    pub fn with_boundaries(boundaries: impl IntoIterator<Item = TypeKey>) -> Self {
        let mut keys = vec![TypeKey::root()];
        for key in boundaries {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Self { boundaries: keys }
    }

    #[must_use]
    pub fn is_boundary(&self, key: TypeKey) -> bool {
        self.boundaries.contains(&key)
    }

    /// Returns the ordered candidate list for `descriptor`. A provider that
    /// declares nothing yields an empty list.
    #[must_use]
    pub fn candidates(&self, descriptor: &TypeDescriptor) -> Vec<CandidateOperation> {
        descriptor
            .chain()
            .take_while(|visited| !self.is_boundary(visited.key()))
            .flat_map(|visited| visited.operations().iter().cloned())
            .collect()
    }
}

impl Default for Introspector {
    fn default() -> Self {
        Self::with_boundaries([TypeKey::of::<DefaultServiceRegistry>()])
    }
}
