//! Type definitions for class identifiers, method signatures and linearizations

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Opaque identifier of a class, typically its qualified name
///
/// Cloning is cheap; the name is shared behind an `Arc<str>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassId(Arc<str>);

impl ClassId {
    /// Create a new class id
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    /// The underlying name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ClassId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ClassId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClassId {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl From<String> for ClassId {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&ClassId> for ClassId {
    fn from(id: &ClassId) -> Self {
        id.clone()
    }
}

/// Exact name of a parameter type, e.g. `int` or `java.lang.String`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeDescriptor(String);

impl TypeDescriptor {
    /// Create a new type descriptor
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The descriptor text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeDescriptor {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for TypeDescriptor {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Method name plus ordered parameter types
///
/// Two signatures are equal only when the name and every parameter
/// descriptor match exactly. The return type is not part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MethodSignature {
    /// Method name
    pub name: String,

    /// Parameter types in declaration order
    #[serde(default)]
    pub params: Vec<TypeDescriptor>,
}

impl MethodSignature {
    /// Signature of a method without parameters
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Signature with the given parameter types
    #[must_use]
    pub fn with_params<I, T>(name: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeDescriptor>,
    {
        Self {
            name: name.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of parameters
    #[must_use]
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}

/// Method resolution order of one class
///
/// Starts with the query class itself and holds every ancestor exactly once.
/// Both constructors keep the order non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Linearization(Vec<ClassId>);

impl Linearization {
    /// `class` followed by its merged ancestors
    #[must_use]
    pub fn new(class: ClassId, ancestors: Vec<ClassId>) -> Self {
        let mut order = Vec::with_capacity(ancestors.len() + 1);
        order.push(class);
        order.extend(ancestors);
        Self(order)
    }

    /// Wrap a complete order whose first entry is the class itself
    ///
    /// Returns `None` for an empty order.
    #[must_use]
    pub fn from_merged(order: Vec<ClassId>) -> Option<Self> {
        (!order.is_empty()).then_some(Self(order))
    }

    /// The class this order was computed for
    #[must_use]
    pub fn class(&self) -> &ClassId {
        &self.0[0]
    }

    /// Proper ancestors in resolution order
    #[must_use]
    pub fn ancestors(&self) -> &[ClassId] {
        &self.0[1..]
    }

    /// Classes strictly after `class`, or `None` when `class` is absent
    #[must_use]
    pub fn after(&self, class: &ClassId) -> Option<&[ClassId]> {
        self.position(class).map(|idx| &self.0[idx + 1..])
    }

    /// Index of `class` in this order
    #[must_use]
    pub fn position(&self, class: &ClassId) -> Option<usize> {
        self.0.iter().position(|c| c == class)
    }

    /// Whether `class` occurs in this order
    #[must_use]
    pub fn contains(&self, class: &ClassId) -> bool {
        self.0.contains(class)
    }

    /// Number of classes including the query class
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ClassId> {
        self.0.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ClassId] {
        &self.0
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ClassId> {
        self.0
    }
}

impl Deref for Linearization {
    type Target = [ClassId];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'a> IntoIterator for &'a Linearization {
    type Item = &'a ClassId;
    type IntoIter = std::slice::Iter<'a, ClassId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Linearization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, class) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{class}")?;
        }
        f.write_str("]")
    }
}
