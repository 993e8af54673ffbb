//! Cooperative dispatch along the method resolution order
//!
//! The resolver walks the MRO of a class, starting right after a given
//! class, and returns the first ancestor that declares the requested method
//! itself and can be instantiated. This is the "call the next
//! implementation after me" protocol.

use mro_core::error::DispatchError;
use mro_core::traits::{ClassGraph, MethodTable};
use mro_core::types::{ClassId, Linearization, MethodSignature};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::linearizer::Linearizer;

/// The implementation a walk settled on
#[derive(Debug, Clone)]
pub struct Resolved<I, S> {
    /// Ancestor that declares the implementation
    pub class: ClassId,
    /// Implementation handle from the method table
    pub implementation: I,
    /// Dispatch target built for `class`
    pub instance: S,
}

/// Resolved dispatch for a given method table
pub type ResolvedFor<T> =
    Resolved<<T as MethodTable>::Implementation, <T as MethodTable>::Instance>;

/// Next-in-MRO resolver
#[derive(Debug)]
pub struct Resolver<G, T> {
    linearizer: Arc<Linearizer<G>>,
    table: T,
}

impl<G: ClassGraph, T: MethodTable> Resolver<G, T> {
    /// Create a resolver sharing `linearizer`
    #[must_use]
    pub fn new(linearizer: Arc<Linearizer<G>>, table: T) -> Self {
        Self { linearizer, table }
    }

    pub fn linearizer(&self) -> &Arc<Linearizer<G>> {
        &self.linearizer
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    /// Method resolution order of `class`
    ///
    /// # Errors
    ///
    /// Propagates linearization failures.
    pub fn mro(&self, class: &ClassId) -> Result<Linearization, DispatchError> {
        Ok(self.linearizer.linearize(class)?)
    }

    /// Direct parents exactly as declared
    #[must_use]
    pub fn declared_parents(&self, class: &ClassId) -> Vec<ClassId> {
        self.linearizer.declared_parents(class)
    }

    /// Classes a walk from `start_after` would visit, in order
    ///
    /// # Errors
    ///
    /// - linearization failures
    /// - [`DispatchError::StartNotInOrder`] if `start_after` is not in the MRO
    ///   of `class`
    pub fn candidates(
        &self,
        class: &ClassId,
        start_after: &ClassId,
    ) -> Result<Vec<ClassId>, DispatchError> {
        let order = self.linearizer.linearize(class)?;
        let tail = order
            .after(start_after)
            .ok_or_else(|| DispatchError::StartNotInOrder {
                class: class.clone(),
                start_after: start_after.clone(),
            })?;
        Ok(tail.to_vec())
    }

    /// First implementation of `signature` after `class` itself
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve_next`].
    pub fn resolve(
        &self,
        class: &ClassId,
        signature: &MethodSignature,
    ) -> Result<ResolvedFor<T>, DispatchError> {
        self.resolve_next(class, signature, class)
    }

    /// First implementation of `signature` strictly after `start_after` in
    /// the MRO of `class`
    ///
    /// Candidates that declare the method but cannot be constructed are
    /// skipped; a construction failure never ends the walk.
    ///
    /// # Errors
    ///
    /// - linearization failures
    /// - [`DispatchError::StartNotInOrder`] if `start_after` is not in the MRO
    /// - [`DispatchError::NoImplementationFound`] if no later class provides a
    ///   usable implementation
    pub fn resolve_next(
        &self,
        class: &ClassId,
        signature: &MethodSignature,
        start_after: &ClassId,
    ) -> Result<ResolvedFor<T>, DispatchError> {
        for candidate in self.candidates(class, start_after)? {
            let Some(implementation) = self.table.lookup_own_implementation(&candidate, signature)
            else {
                trace!(candidate = %candidate, %signature, "no own implementation");
                continue;
            };

            match self.table.instantiate(&candidate) {
                Ok(instance) => {
                    debug!(class = %class, %signature, resolved = %candidate, "resolved next implementation");
                    return Ok(Resolved {
                        class: candidate,
                        implementation,
                        instance,
                    });
                }
                Err(err) => {
                    debug!(candidate = %candidate, error = %err, "skipping unconstructible candidate");
                }
            }
        }

        Err(DispatchError::NoImplementationFound {
            class: class.clone(),
            signature: signature.clone(),
            start_after: start_after.clone(),
        })
    }
}
