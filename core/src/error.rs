//! Error types for linearization and dispatch

use thiserror::Error;

use crate::types::{ClassId, MethodSignature};

/// Failure to compute a method resolution order
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinearizationError {
    /// The parent graph is not a DAG
    #[error("Cyclic hierarchy: class '{class}' is reachable from itself (path: {})", render_path(.path))]
    CyclicHierarchy {
        /// Class that was encountered twice on the recursion path
        class: ClassId,
        /// Recursion path from the query class down to the repeated class
        path: Vec<ClassId>,
    },

    /// The declared parent orders cannot be merged into one linear order
    #[error("Inconsistent hierarchy: cannot create a consistent method resolution order for '{class}'")]
    InconsistentHierarchy {
        /// Class whose merge failed
        class: ClassId,
        /// Sequences that were still non-empty when no good head was found
        remaining: Vec<Vec<ClassId>>,
    },

    /// Longest parent chain is longer than the configured limit
    #[error("Hierarchy of '{class}' is deeper than the configured limit of {limit}")]
    DepthExceeded {
        /// Queried class
        class: ClassId,
        /// Configured maximum depth
        limit: usize,
    },
}

impl LinearizationError {
    /// Class the error is about
    #[must_use]
    pub fn class(&self) -> &ClassId {
        match self {
            Self::CyclicHierarchy { class, .. }
            | Self::InconsistentHierarchy { class, .. }
            | Self::DepthExceeded { class, .. } => class,
        }
    }

    /// True for [`LinearizationError::CyclicHierarchy`]
    #[must_use]
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::CyclicHierarchy { .. })
    }

    /// True for [`LinearizationError::InconsistentHierarchy`]
    #[must_use]
    pub fn is_inconsistent(&self) -> bool {
        matches!(self, Self::InconsistentHierarchy { .. })
    }
}

/// Failure to find the next implementation in MRO
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The walk exhausted the MRO without a usable implementation
    #[error("No valid {signature} implementation found after '{start_after}' in the MRO of '{class}'")]
    NoImplementationFound {
        /// Class whose MRO was walked
        class: ClassId,
        /// Method that was looked up
        signature: MethodSignature,
        /// Class the walk started after
        start_after: ClassId,
    },

    /// The start class does not occur in the MRO being walked
    #[error("Class '{start_after}' does not appear in the MRO of '{class}'")]
    StartNotInOrder {
        /// Class whose MRO was walked
        class: ClassId,
        /// Requested start position
        start_after: ClassId,
    },

    /// The MRO itself could not be computed
    #[error(transparent)]
    Linearization(#[from] LinearizationError),
}

impl DispatchError {
    /// True when the caller should fall through to its own default
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NoImplementationFound { .. })
    }
}

/// A candidate class could not be instantiated
///
/// Never escapes a dispatch walk; the candidate is treated as providing
/// no implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to construct '{class}': {reason}")]
pub struct ConstructionError {
    /// Class that failed to construct
    pub class: ClassId,
    /// Reason reported by the method table
    pub reason: String,
}

impl ConstructionError {
    /// Create a new construction error
    #[must_use]
    pub fn new(class: ClassId, reason: impl Into<String>) -> Self {
        Self {
            class,
            reason: reason.into(),
        }
    }
}

/// Main error type for MRO operations
#[derive(Error, Debug)]
pub enum MroError {
    /// Linearization errors
    #[error(transparent)]
    Linearization(#[from] LinearizationError),

    /// Dispatch errors
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for MRO operations
pub type Result<T> = std::result::Result<T, MroError>;

impl MroError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a serialization error
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}

impl From<serde_json::Error> for MroError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for MroError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

fn render_path(path: &[ClassId]) -> String {
    path.iter()
        .map(ClassId::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_display_shows_path() {
        let err = LinearizationError::CyclicHierarchy {
            class: ClassId::from("A"),
            path: vec!["A".into(), "B".into(), "A".into()],
        };
        let display = err.to_string();
        assert!(display.contains("A -> B -> A"));
        assert!(err.is_cycle());
        assert!(!err.is_inconsistent());
        assert_eq!(err.class().as_str(), "A");
    }

    #[test]
    fn test_dispatch_error_wraps_linearization() {
        let inner = LinearizationError::InconsistentHierarchy {
            class: "Z".into(),
            remaining: vec![],
        };
        let err: DispatchError = inner.clone().into();
        assert_eq!(err, DispatchError::Linearization(inner));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_display() {
        let err = DispatchError::NoImplementationFound {
            class: "C".into(),
            signature: MethodSignature::with_params("operation", ["int", "int"]),
            start_after: "C".into(),
        };
        assert!(err.is_not_found());
        assert!(err.to_string().contains("operation(int, int)"));
    }

    #[test]
    fn test_error_conversions() {
        let Err(json_err) = serde_json::from_str::<serde_json::Value>("invalid") else {
            panic!("expected a parse failure");
        };
        let err: MroError = json_err.into();
        assert!(matches!(err, MroError::Serialization(_)));
    }
}
