//! Prelude module for the MRO service
//!
//! Re-exports the core types together with the service implementations.

// Re-export core types and traits
pub use mro_core::prelude::*;

pub use crate::graph::HierarchyGraph;
pub use crate::linearizer::{Linearizer, c3_merge};
pub use crate::registry::{Instance, Invocation, MethodHandle, MethodRegistry};
pub use crate::resolver::{Resolved, ResolvedFor, Resolver};
pub use crate::session::DispatchSession;
