use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Type-erased service value handed to and returned from operations.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Type-erased provider reference an operation is invoked against.
pub type Target = dyn Any + Send + Sync;

/// Marker for the universal root type.
///
/// Every descriptor chain terminates at the root. It declares no operations
/// and is never visited by introspection.
#[derive(Debug)]
pub enum Root {}

/// Runtime identity of a Rust type.
///
/// Equality and hashing use the `TypeId` only; the name is carried for
/// diagnostics and error messages.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Returns the key for `T`.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The void-equivalent return type, `()`.
    #[must_use]
    pub fn void() -> Self {
        Self::of::<()>()
    }

    /// The universal root type that bounds every descriptor chain.
    #[must_use]
    pub fn root() -> Self {
        Self::of::<Root>()
    }

    #[must_use]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, as reported by `std::any::type_name`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Unqualified type name with module path and generic arguments removed.
    ///
    /// ```
    /// use servicekit_core::TypeKey;
    ///
    /// struct BuildCache;
    /// assert_eq!(TypeKey::of::<BuildCache>().simple_name(), "BuildCache");
    /// assert_eq!(TypeKey::of::<Vec<String>>().simple_name(), "Vec");
    /// ```
    #[must_use]
    pub fn simple_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }

    #[must_use]
    pub fn is_void(&self) -> bool {
        self.id == TypeId::of::<()>()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    struct Compiler;

    mod nested {
        pub struct Compiler;
    }

    #[test]
    fn same_type_same_key() {
        assert_eq!(TypeKey::of::<Compiler>(), TypeKey::of::<Compiler>());
    }

    #[test]
    fn same_simple_name_different_types_are_distinct() {
        let a = TypeKey::of::<Compiler>();
        let b = TypeKey::of::<nested::Compiler>();
        assert_ne!(a, b);
        assert_eq!(a.simple_name(), b.simple_name());
    }

    #[test]
    fn void_is_unit() {
        assert!(TypeKey::void().is_void());
        assert!(TypeKey::of::<()>().is_void());
        assert!(!TypeKey::of::<String>().is_void());
    }

    #[test]
    fn root_is_not_void() {
        assert!(!TypeKey::root().is_void());
        assert_eq!(TypeKey::root(), TypeKey::of::<Root>());
    }

    #[test]
    fn simple_name_strips_path_and_generics() {
        assert_eq!(TypeKey::of::<String>().simple_name(), "String");
        assert_eq!(
            TypeKey::of::<std::collections::HashMap<String, u32>>().simple_name(),
            "HashMap"
        );
        assert_eq!(TypeKey::of::<u64>().simple_name(), "u64");
    }

    #[test]
    fn hashes_by_type_identity() {
        let mut set = HashSet::new();
        set.insert(TypeKey::of::<Compiler>());
        set.insert(TypeKey::of::<Compiler>());
        set.insert(TypeKey::of::<nested::Compiler>());
        assert_eq!(set.len(), 2);
    }
}
