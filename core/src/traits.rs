//! Interfaces consumed by the linearizer and the resolver
//!
//! Both traits are supplied by whatever host mechanism declares parents and
//! owns method implementations. The core only reads through them.

use std::sync::Arc;

use crate::error::ConstructionError;
use crate::types::{ClassId, MethodSignature};

/// Provider of declared direct parents
///
/// Parent order is significant: it seeds the C3 tie-break. An id without
/// an entry is a root.
pub trait ClassGraph: Send + Sync {
    /// Direct parents of `class` in declaration order
    fn parents_of(&self, class: &ClassId) -> &[ClassId];

    /// Monotonic counter bumped whenever any entry changes
    ///
    /// Consumers that cache linearizations drop the whole cache when this
    /// value moves. Immutable graphs can keep the default.
    fn revision(&self) -> u64 {
        0
    }
}

/// Per-class method tables of the host dispatch mechanism
pub trait MethodTable: Send + Sync {
    /// Invocable implementation handle
    type Implementation;

    /// Dispatch target an implementation is invoked on
    type Instance;

    /// Implementation of `signature` declared directly on `class`
    ///
    /// Inherited implementations must not be reported here.
    fn lookup_own_implementation(
        &self,
        class: &ClassId,
        signature: &MethodSignature,
    ) -> Option<Self::Implementation>;

    /// Construct a dispatch target of `class`
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError`] when the class cannot be instantiated,
    /// e.g. because it is abstract.
    fn instantiate(&self, class: &ClassId) -> Result<Self::Instance, ConstructionError>;
}

impl<G: ClassGraph + ?Sized> ClassGraph for Arc<G> {
    fn parents_of(&self, class: &ClassId) -> &[ClassId] {
        (**self).parents_of(class)
    }

    fn revision(&self) -> u64 {
        (**self).revision()
    }
}

impl<G: ClassGraph + ?Sized> ClassGraph for &G {
    fn parents_of(&self, class: &ClassId) -> &[ClassId] {
        (**self).parents_of(class)
    }

    fn revision(&self) -> u64 {
        (**self).revision()
    }
}

impl<T: MethodTable + ?Sized> MethodTable for Arc<T> {
    type Implementation = T::Implementation;
    type Instance = T::Instance;

    fn lookup_own_implementation(
        &self,
        class: &ClassId,
        signature: &MethodSignature,
    ) -> Option<Self::Implementation> {
        (**self).lookup_own_implementation(class, signature)
    }

    fn instantiate(&self, class: &ClassId) -> Result<Self::Instance, ConstructionError> {
        (**self).instantiate(class)
    }
}

impl<T: MethodTable + ?Sized> MethodTable for &T {
    type Implementation = T::Implementation;
    type Instance = T::Instance;

    fn lookup_own_implementation(
        &self,
        class: &ClassId,
        signature: &MethodSignature,
    ) -> Option<Self::Implementation> {
        (**self).lookup_own_implementation(class, signature)
    }

    fn instantiate(&self, class: &ClassId) -> Result<Self::Instance, ConstructionError> {
        (**self).instantiate(class)
    }
}

/// A plain map from class to parents is a complete graph for small hosts.
impl ClassGraph for std::collections::HashMap<ClassId, Vec<ClassId>> {
    fn parents_of(&self, class: &ClassId) -> &[ClassId] {
        self.get(class).map(Vec::as_slice).unwrap_or_default()
    }
}
