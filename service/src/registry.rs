//! Explicit per-class method tables
//!
//! [`MethodRegistry`] is a ready-made [`MethodTable`] for hosts without their
//! own dispatch tables. Arguments and results travel as JSON values.
//! Implementations receive an [`Invocation`] through which they can continue
//! with the next implementation in the receiver's MRO.

use mro_core::error::{ConstructionError, DispatchError};
use mro_core::traits::{ClassGraph, MethodTable};
use mro_core::types::{ClassId, MethodSignature};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::resolver::Resolver;

/// Signature of a registered method body
pub type MethodFn =
    dyn Fn(&Invocation<'_>, &[Value]) -> Result<Value, DispatchError> + Send + Sync;

/// Signature of a registered constructor
pub type ConstructorFn = dyn Fn() -> Result<Value, String> + Send + Sync;

/// Dispatch target built for one class
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// Class the instance was built for
    pub class: ClassId,
    /// State returned by the class constructor
    pub state: Value,
}

/// Context handed to a method body
pub struct Invocation<'a> {
    receiver: &'a ClassId,
    instance: &'a Instance,
    next: &'a dyn Fn(&[Value]) -> Result<Value, DispatchError>,
}

impl Invocation<'_> {
    /// Class the call was made on; its MRO drives `call_next`
    #[must_use]
    pub fn receiver(&self) -> &ClassId {
        self.receiver
    }

    /// Instance of the class declaring the running implementation
    #[must_use]
    pub fn instance(&self) -> &Instance {
        self.instance
    }

    /// Continue with the next implementation after the running one
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NoImplementationFound`] when no later class in
    /// the receiver's MRO implements the method.
    pub fn call_next(&self, args: &[Value]) -> Result<Value, DispatchError> {
        (self.next)(args)
    }
}

/// Registered implementation of one signature on one class
#[derive(Clone)]
pub struct MethodHandle {
    class: ClassId,
    signature: MethodSignature,
    body: Arc<MethodFn>,
}

impl MethodHandle {
    /// Class declaring this implementation
    #[must_use]
    pub fn class(&self) -> &ClassId {
        &self.class
    }

    #[must_use]
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    /// Run the method body
    ///
    /// # Errors
    ///
    /// Whatever the body returns, typically a failed `call_next`.
    pub fn invoke(&self, invocation: &Invocation<'_>, args: &[Value]) -> Result<Value, DispatchError> {
        (self.body)(invocation, args)
    }
}

impl fmt::Debug for MethodHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodHandle")
            .field("class", &self.class)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

/// Per-class constructors and own method declarations
#[derive(Default)]
pub struct MethodRegistry {
    methods: HashMap<ClassId, HashMap<MethodSignature, Arc<MethodFn>>>,
    constructors: HashMap<ClassId, Arc<ConstructorFn>>,
    abstract_classes: HashSet<ClassId>,
}

impl MethodRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `signature` on `class`, replacing an earlier declaration
    pub fn register_method<F>(
        &mut self,
        class: impl Into<ClassId>,
        signature: MethodSignature,
        body: F,
    ) -> &mut Self
    where
        F: Fn(&Invocation<'_>, &[Value]) -> Result<Value, DispatchError> + Send + Sync + 'static,
    {
        self.methods
            .entry(class.into())
            .or_default()
            .insert(signature, Arc::new(body));
        self
    }

    /// Register how instances of `class` are built
    ///
    /// Classes without a constructor are built with `null` state.
    pub fn register_constructor<F>(&mut self, class: impl Into<ClassId>, constructor: F) -> &mut Self
    where
        F: Fn() -> Result<Value, String> + Send + Sync + 'static,
    {
        self.constructors.insert(class.into(), Arc::new(constructor));
        self
    }

    /// Make `class` impossible to instantiate
    ///
    /// Its methods stay registered but are never selected by a walk.
    pub fn mark_abstract(&mut self, class: impl Into<ClassId>) -> &mut Self {
        self.abstract_classes.insert(class.into());
        self
    }

    /// Whether `class` itself declares `signature`
    #[must_use]
    pub fn declares(&self, class: &ClassId, signature: &MethodSignature) -> bool {
        self.methods
            .get(class)
            .is_some_and(|own| own.contains_key(signature))
    }

    /// Signatures declared directly on `class`
    #[must_use]
    pub fn declared_methods(&self, class: &ClassId) -> Vec<&MethodSignature> {
        self.methods
            .get(class)
            .map(|own| own.keys().collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("classes", &self.methods.len())
            .field("constructors", &self.constructors.len())
            .field("abstract_classes", &self.abstract_classes)
            .finish()
    }
}

impl MethodTable for MethodRegistry {
    type Implementation = MethodHandle;
    type Instance = Instance;

    fn lookup_own_implementation(
        &self,
        class: &ClassId,
        signature: &MethodSignature,
    ) -> Option<MethodHandle> {
        let body = self.methods.get(class)?.get(signature)?;
        Some(MethodHandle {
            class: class.clone(),
            signature: signature.clone(),
            body: Arc::clone(body),
        })
    }

    fn instantiate(&self, class: &ClassId) -> Result<Instance, ConstructionError> {
        if self.abstract_classes.contains(class) {
            return Err(ConstructionError::new(class.clone(), "class is abstract"));
        }
        let state = match self.constructors.get(class) {
            Some(constructor) => {
                constructor().map_err(|reason| ConstructionError::new(class.clone(), reason))?
            }
            None => Value::Null,
        };
        Ok(Instance {
            class: class.clone(),
            state,
        })
    }
}

impl<G, T> Resolver<G, T>
where
    G: ClassGraph,
    T: MethodTable<Implementation = MethodHandle, Instance = Instance>,
{
    /// Call `signature` on `class` as a receiver would
    ///
    /// Runs the class's own implementation when it declares one and can be
    /// built, otherwise the next one in its MRO.
    ///
    /// # Errors
    ///
    /// Dispatch errors from the walk or from a body's `call_next`.
    pub fn call(
        &self,
        class: &ClassId,
        signature: &MethodSignature,
        args: &[Value],
    ) -> Result<Value, DispatchError> {
        if let Some(own) = self.table().lookup_own_implementation(class, signature)
            && let Ok(instance) = self.table().instantiate(class)
        {
            return self.run(class, &own, &instance, args);
        }
        self.call_next(class, signature, args)
    }

    /// Call the next implementation after `class` in its own MRO
    ///
    /// A void method yields `Value::Null`; any other result passes through
    /// unchanged.
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve_next`].
    pub fn call_next(
        &self,
        class: &ClassId,
        signature: &MethodSignature,
        args: &[Value],
    ) -> Result<Value, DispatchError> {
        self.call_next_after(class, signature, class, args)
    }

    /// Call the next implementation after `start_after` in the MRO of `class`
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve_next`].
    pub fn call_next_after(
        &self,
        class: &ClassId,
        signature: &MethodSignature,
        start_after: &ClassId,
        args: &[Value],
    ) -> Result<Value, DispatchError> {
        let resolved = self.resolve_next(class, signature, start_after)?;
        self.run(class, &resolved.implementation, &resolved.instance, args)
    }

    fn run(
        &self,
        receiver: &ClassId,
        handle: &MethodHandle,
        instance: &Instance,
        args: &[Value],
    ) -> Result<Value, DispatchError> {
        let next = |next_args: &[Value]| {
            self.call_next_after(receiver, handle.signature(), handle.class(), next_args)
        };
        let invocation = Invocation {
            receiver,
            instance,
            next: &next,
        };
        handle.invoke(&invocation, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::HierarchyGraph;
    use crate::linearizer::Linearizer;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    fn operation() -> MethodSignature {
        MethodSignature::with_params("operation", ["int", "int"])
    }

    fn arg(args: &[Value], idx: usize) -> i64 {
        args.get(idx).and_then(Value::as_i64).unwrap_or_default()
    }

    fn logger_hierarchy() -> Arc<Linearizer<HierarchyGraph>> {
        Arc::new(Linearizer::new(
            HierarchyGraph::new()
                .with_class("OperationRoot", Vec::<&str>::new())
                .with_class("Adder", ["OperationRoot"])
                .with_class("Multiplier", ["OperationRoot"])
                .with_class("Logger", ["Adder", "Multiplier"]),
        ))
    }

    #[test]
    fn test_lookup_and_instantiate() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut registry = MethodRegistry::new();
        registry
            .register_method("Adder", operation(), |_, args| Ok(json!(arg(args, 0) + arg(args, 1))))
            .register_constructor("Adder", || Ok(json!({"calls": 0})))
            .mark_abstract("OperationRoot");

        let handle = registry
            .lookup_own_implementation(&"Adder".into(), &operation())
            .ok_or("Adder declares operation")?;
        assert_eq!(handle.class().as_str(), "Adder");
        assert!(registry.lookup_own_implementation(&"Multiplier".into(), &operation()).is_none());
        assert!(registry.declares(&"Adder".into(), &operation()));
        assert_eq!(registry.declared_methods(&"Adder".into()), vec![&operation()]);

        let instance = registry.instantiate(&"Adder".into())?;
        assert_eq!(instance.state, json!({"calls": 0}));
        assert_eq!(registry.instantiate(&"Multiplier".into())?.state, Value::Null);
        assert!(registry.instantiate(&"OperationRoot".into()).is_err());
        Ok(())
    }

    #[test]
    fn test_failing_constructor_reports_reason() {
        let mut registry = MethodRegistry::new();
        registry.register_constructor("Broken", || Err("no default constructor".to_string()));
        let err = registry
            .instantiate(&"Broken".into())
            .expect_err("constructor fails");
        assert_eq!(err.reason, "no default constructor");
    }

    #[test]
    fn test_cooperative_chain() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let mut registry = MethodRegistry::new();

        let seen = Arc::clone(&trace);
        registry.register_method("Logger", operation(), move |inv, args| {
            if let Ok(mut log) = seen.lock() {
                log.push("Logger");
            }
            inv.call_next(args)
        });
        let seen = Arc::clone(&trace);
        registry.register_method("Adder", operation(), move |inv, args| {
            if let Ok(mut log) = seen.lock() {
                log.push("Adder");
            }
            let rest = inv.call_next(args)?;
            Ok(json!(arg(args, 0) + arg(args, 1) + rest.as_i64().unwrap_or_default()))
        });
        let seen = Arc::clone(&trace);
        registry.register_method("Multiplier", operation(), move |_, args| {
            if let Ok(mut log) = seen.lock() {
                log.push("Multiplier");
            }
            Ok(json!(arg(args, 0) * arg(args, 1)))
        });

        let resolver = Resolver::new(logger_hierarchy(), registry);
        let result = resolver.call(&"Logger".into(), &operation(), &[json!(3), json!(4)])?;

        // Adder adds its sum to Multiplier's product.
        assert_eq!(result, json!(19));
        let log = trace.lock().map_err(|e| e.to_string())?;
        assert_eq!(*log, vec!["Logger", "Adder", "Multiplier"]);
        Ok(())
    }

    #[test]
    fn test_call_next_skips_own_implementation() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let mut registry = MethodRegistry::new();
        registry
            .register_method("Logger", operation(), |_, _| Ok(json!("logger")))
            .register_method("Multiplier", operation(), |_, _| Ok(json!("multiplier")));
        let resolver = Resolver::new(logger_hierarchy(), registry);

        assert_eq!(resolver.call(&"Logger".into(), &operation(), &[])?, json!("logger"));
        assert_eq!(resolver.call_next(&"Logger".into(), &operation(), &[])?, json!("multiplier"));
        Ok(())
    }

    #[test]
    fn test_void_method_returns_null() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let some_method = MethodSignature::new("someMethod");
        let mut registry = MethodRegistry::new();
        registry.register_method("Adder", some_method.clone(), |_, _| Ok(Value::Null));
        let resolver = Resolver::new(logger_hierarchy(), registry);
        assert_eq!(resolver.call_next(&"Logger".into(), &some_method, &[])?, Value::Null);
        Ok(())
    }

    #[test]
    fn test_end_of_chain_surfaces_not_found() {
        let mut registry = MethodRegistry::new();
        registry.register_method("Adder", operation(), |inv, args| inv.call_next(args));
        let resolver = Resolver::new(logger_hierarchy(), registry);
        let err = resolver
            .call_next(&"Logger".into(), &operation(), &[])
            .expect_err("nothing after Adder implements operation");
        match err {
            DispatchError::NoImplementationFound { start_after, .. } => {
                assert_eq!(start_after.as_str(), "Adder");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_abstract_receiver_falls_through() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut registry = MethodRegistry::new();
        registry
            .register_method("Logger", operation(), |_, _| Ok(json!("logger")))
            .register_method("Adder", operation(), |_, _| Ok(json!("adder")))
            .mark_abstract("Logger");
        let resolver = Resolver::new(logger_hierarchy(), registry);
        assert_eq!(resolver.call(&"Logger".into(), &operation(), &[])?, json!("adder"));
        Ok(())
    }
}
