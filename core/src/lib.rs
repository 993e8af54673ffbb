//! # MRO Core
//!
//! Core types and traits for C3 method resolution order and cooperative
//! "next in MRO" dispatch over a multiple-inheritance object model.
//!
//! This crate holds the data model, the error taxonomy and the interfaces a
//! host supplies (parent declarations and per-class method tables). The
//! algorithms live in the service crate.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Core error types for linearization and dispatch
pub mod error;

/// Interfaces consumed from the host
pub mod traits;

/// Class ids, method signatures and linearizations
pub mod types;

/// Session configuration
pub mod config;

// Re-export commonly used types
pub use config::MroConfig;
pub use error::{ConstructionError, DispatchError, LinearizationError, MroError, Result};
pub use traits::{ClassGraph, MethodTable};
pub use types::{ClassId, Linearization, MethodSignature, TypeDescriptor};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::error::{
        ConstructionError, DispatchError, LinearizationError, MroError, Result,
    };
    pub use crate::traits::*;
    pub use crate::types::*;
}
