//! Tests for next-in-MRO dispatch

use mro_core::error::DispatchError;
use mro_core::types::{ClassId, MethodSignature};
use mro_service::{DispatchSession, HierarchyGraph, Invocation, MethodRegistry};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};

fn m() -> MethodSignature {
    MethodSignature::new("m")
}

fn diamond() -> HierarchyGraph {
    HierarchyGraph::new()
        .with_class("Root", Vec::<&str>::new())
        .with_class("A", ["Root"])
        .with_class("B", ["Root"])
        .with_class("C", ["A", "B"])
}

/// Method body that just names its class
fn answer(
    name: &'static str,
) -> impl Fn(&Invocation<'_>, &[Value]) -> Result<Value, DispatchError> + Send + Sync + 'static {
    move |_, _| Ok(json!(name))
}

#[test]
fn test_only_a_implements() -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = MethodRegistry::new();
    registry.register_method("A", m(), answer("A"));
    let session = DispatchSession::new(diamond(), registry);

    let resolved = session.resolve_next(&"C".into(), &m(), &"C".into())?;
    assert_eq!(resolved.class.as_str(), "A");
    assert_eq!(session.call_next(&"C".into(), &m(), &[])?, json!("A"));
    Ok(())
}

#[test]
fn test_falls_through_to_root() -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = MethodRegistry::new();
    registry.register_method("Root", m(), answer("Root"));
    let session = DispatchSession::new(diamond(), registry);

    let resolved = session.resolve_next(&"C".into(), &m(), &"C".into())?;
    assert_eq!(resolved.class.as_str(), "Root");
    Ok(())
}

#[test]
fn test_nobody_implements() {
    let session = DispatchSession::new(diamond(), MethodRegistry::new());
    let err = session
        .resolve_next(&"C".into(), &m(), &"C".into())
        .expect_err("no class implements m");
    assert_eq!(
        err,
        DispatchError::NoImplementationFound {
            class: "C".into(),
            signature: m(),
            start_after: "C".into(),
        }
    );
}

#[test]
fn test_b_wins_over_root_when_a_is_silent() -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = MethodRegistry::new();
    registry
        .register_method("B", m(), answer("B"))
        .register_method("Root", m(), answer("Root"));
    let session = DispatchSession::new(diamond(), registry);
    assert_eq!(session.call_next(&"C".into(), &m(), &[])?, json!("B"));
    Ok(())
}

#[test]
fn test_inherited_methods_are_not_own() -> Result<(), Box<dyn std::error::Error>> {
    // Root implements m; A inherits it but does not declare it. The walk
    // must still report Root as the declaring class.
    let mut registry = MethodRegistry::new();
    registry.register_method("Root", m(), answer("Root"));
    let session = DispatchSession::new(diamond(), registry);
    let resolved = session.resolve_next(&"C".into(), &m(), &"A".into())?;
    assert_eq!(resolved.class.as_str(), "Root");
    assert_eq!(resolved.implementation.class().as_str(), "Root");
    Ok(())
}

#[test]
fn test_inconsistent_hierarchy_blocks_dispatch() {
    let graph = HierarchyGraph::new()
        .with_class("X", ["A", "B"])
        .with_class("Y", ["B", "A"])
        .with_class("Z", ["X", "Y"]);
    let mut registry = MethodRegistry::new();
    registry.register_method("A", m(), answer("A"));
    let session = DispatchSession::new(graph, registry);

    let err = session
        .call_next(&"Z".into(), &m(), &[])
        .expect_err("Z has no MRO");
    assert!(matches!(err, DispatchError::Linearization(e) if e.is_inconsistent()));
}

#[test]
fn test_logging_operation_delegates_to_next() -> Result<(), Box<dyn std::error::Error>> {
    let operation = MethodSignature::with_params("operation", ["int", "int"]);
    let graph = HierarchyGraph::new()
        .with_class("OperationInterfaceRoot", Vec::<&str>::new())
        .with_class("ClassA", ["OperationInterfaceRoot"])
        .with_class("ClassB", ["OperationInterfaceRoot"])
        .with_class("ABLogger", ["ClassA", "ClassB"]);

    let log = Arc::new(Mutex::new(Vec::<String>::new()));
    let mut registry = MethodRegistry::new();
    let entries = Arc::clone(&log);
    registry
        .register_method("ABLogger", operation.clone(), move |inv, args| {
            if let Ok(mut entries) = entries.lock() {
                entries.push(format!("{} called", inv.receiver()));
            }
            inv.call_next(args)
        })
        .register_method("ClassA", operation.clone(), |_, args| {
            let a = args.first().and_then(Value::as_i64).unwrap_or_default();
            let b = args.get(1).and_then(Value::as_i64).unwrap_or_default();
            Ok(json!(a + b))
        })
        .register_method("ClassB", operation.clone(), |_, args| {
            let a = args.first().and_then(Value::as_i64).unwrap_or_default();
            let b = args.get(1).and_then(Value::as_i64).unwrap_or_default();
            Ok(json!(a * b))
        })
        .mark_abstract("OperationInterfaceRoot");

    let session = DispatchSession::new(graph, registry);
    let result = session.call(&"ABLogger".into(), &operation, &[json!(2), json!(5)])?;
    assert_eq!(result, json!(7));

    let entries = log.lock().map_err(|e| e.to_string())?;
    assert_eq!(*entries, vec!["ABLogger called".to_string()]);
    Ok(())
}

#[test]
fn test_constructor_state_reaches_body() -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = MethodRegistry::new();
    registry
        .register_constructor("A", || Ok(json!({"greeting": "hi"})))
        .register_method("A", m(), |inv, _| Ok(inv.instance().state["greeting"].clone()));
    let session = DispatchSession::new(diamond(), registry);
    assert_eq!(session.call_next(&"C".into(), &m(), &[])?, json!("hi"));
    Ok(())
}

#[test]
fn test_failed_construction_moves_on() -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = MethodRegistry::new();
    registry
        .register_constructor("A", || Err("missing default constructor".to_string()))
        .register_method("A", m(), answer("A"))
        .register_method("B", m(), answer("B"));
    let session = DispatchSession::new(diamond(), registry);
    assert_eq!(session.call_next(&"C".into(), &m(), &[])?, json!("B"));
    Ok(())
}

#[test]
fn test_declared_parents_diagnostic() {
    let session = DispatchSession::new(diamond(), MethodRegistry::new());
    assert_eq!(
        session.declared_parents(&"C".into()),
        vec![ClassId::from("A"), ClassId::from("B")]
    );
    assert!(session.declared_parents(&"Root".into()).is_empty());
}
