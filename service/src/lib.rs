//! # MRO Service
//!
//! C3 linearization and cooperative "next in MRO" dispatch for object models
//! that only have single inheritance natively.
//!
//! ## Overview
//!
//! - [`HierarchyGraph`] holds declared parent lists, in declaration order
//! - [`Linearizer`] computes and memoizes the C3 method resolution order
//! - [`Resolver`] walks that order to find the next implementation of a method
//! - [`MethodRegistry`] is an explicit method table for hosts without one
//! - [`DispatchSession`] bundles the above for one resolution session
//!
//! ## Quick Start
//!
//! ```rust
//! use mro_service::prelude::*;
//! use serde_json::json;
//!
//! # fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//! let graph = HierarchyGraph::new()
//!     .with_class("Root", Vec::<&str>::new())
//!     .with_class("A", ["Root"])
//!     .with_class("B", ["Root"])
//!     .with_class("C", ["A", "B"]);
//!
//! let greet = MethodSignature::new("greet");
//! let mut registry = MethodRegistry::new();
//! registry.register_method("B", greet.clone(), |_, _| Ok(json!("hello from B")));
//!
//! let session = DispatchSession::new(graph, registry);
//! assert_eq!(session.linearize(&"C".into())?.to_string(), "[C, A, B, Root]");
//! assert_eq!(session.call_next(&"C".into(), &greet, &[])?, json!("hello from B"));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Declared-parent graph
pub mod graph;

/// C3 linearization with memoization
pub mod linearizer;

/// Explicit method tables
pub mod registry;

/// Next-in-MRO resolution
pub mod resolver;

/// Resolution sessions
pub mod session;

/// Prelude for convenient imports
pub mod prelude;

pub use graph::HierarchyGraph;
pub use linearizer::{Linearizer, c3_merge};
pub use registry::{Instance, Invocation, MethodHandle, MethodRegistry};
pub use resolver::{Resolved, ResolvedFor, Resolver};
pub use session::DispatchSession;
