//! One resolution session
//!
//! A session owns the graph, the method registry and the linearization cache
//! for as long as the graph stays unchanged. Nothing here is process-global:
//! two sessions never share cached orders.

use mro_core::config::MroConfig;
use mro_core::error::{DispatchError, LinearizationError, Result};
use mro_core::traits::ClassGraph;
use mro_core::types::{ClassId, Linearization, MethodSignature};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::graph::HierarchyGraph;
use crate::linearizer::Linearizer;
use crate::registry::MethodRegistry;
use crate::resolver::{ResolvedFor, Resolver};

/// Graph, registry and cache bundled for one session
#[derive(Debug)]
pub struct DispatchSession<G = HierarchyGraph> {
    resolver: Resolver<G, Arc<MethodRegistry>>,
}

impl<G: ClassGraph> DispatchSession<G> {
    /// Start a session with the default configuration
    #[must_use]
    pub fn new(graph: G, registry: MethodRegistry) -> Self {
        Self::build(graph, registry, MroConfig::default())
    }

    /// Start a session with an explicit configuration
    ///
    /// # Errors
    ///
    /// Returns [`mro_core::MroError::Config`] when the configuration is invalid.
    pub fn with_config(graph: G, registry: MethodRegistry, config: MroConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(graph, registry, config))
    }

    fn build(graph: G, registry: MethodRegistry, config: MroConfig) -> Self {
        debug!(cache = config.cache.enabled, "starting dispatch session");
        let linearizer = Arc::new(Linearizer::with_config(graph, config));
        Self {
            resolver: Resolver::new(linearizer, Arc::new(registry)),
        }
    }

    pub fn graph(&self) -> &G {
        self.resolver.linearizer().graph()
    }

    pub fn registry(&self) -> &MethodRegistry {
        self.resolver.table()
    }

    pub fn resolver(&self) -> &Resolver<G, Arc<MethodRegistry>> {
        &self.resolver
    }

    /// Method resolution order of `class`
    ///
    /// # Errors
    ///
    /// See [`Linearizer::linearize`].
    pub fn linearize(&self, class: &ClassId) -> std::result::Result<Linearization, LinearizationError> {
        self.resolver.linearizer().linearize(class)
    }

    /// Direct parents exactly as declared
    #[must_use]
    pub fn declared_parents(&self, class: &ClassId) -> Vec<ClassId> {
        self.resolver.declared_parents(class)
    }

    /// See [`Resolver::resolve_next`]
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve_next`].
    pub fn resolve_next(
        &self,
        class: &ClassId,
        signature: &MethodSignature,
        start_after: &ClassId,
    ) -> std::result::Result<ResolvedFor<Arc<MethodRegistry>>, DispatchError> {
        self.resolver.resolve_next(class, signature, start_after)
    }

    /// See [`Resolver::call`]
    ///
    /// # Errors
    ///
    /// See [`Resolver::call`].
    pub fn call(
        &self,
        class: &ClassId,
        signature: &MethodSignature,
        args: &[Value],
    ) -> std::result::Result<Value, DispatchError> {
        self.resolver.call(class, signature, args)
    }

    /// See [`Resolver::call_next`]
    ///
    /// # Errors
    ///
    /// See [`Resolver::call_next`].
    pub fn call_next(
        &self,
        class: &ClassId,
        signature: &MethodSignature,
        args: &[Value],
    ) -> std::result::Result<Value, DispatchError> {
        self.resolver.call_next(class, signature, args)
    }
}
