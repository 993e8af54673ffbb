//! Declared-parent graph
//!
//! [`HierarchyGraph`] is the in-memory [`ClassGraph`] used by sessions and the
//! `mro` tool. Classes keep their insertion order so diagnostics list them
//! the way they were declared.

use indexmap::{IndexMap, IndexSet};
use mro_core::error::{MroError, Result};
use mro_core::traits::ClassGraph;
use mro_core::types::ClassId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Mapping from class to its ordered direct parents
///
/// Deserializes from a mapping such as
///
/// ```yaml
/// Root:
/// A: [Root]
/// B: [Root]
/// C: [A, B]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "IndexMap<ClassId, Option<Vec<ClassId>>>",
    into = "IndexMap<ClassId, Vec<ClassId>>"
)]
pub struct HierarchyGraph {
    parents: IndexMap<ClassId, Vec<ClassId>>,
    revision: u64,
}

impl HierarchyGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a graph from `YAML` (or `JSON`, which is valid `YAML`)
    ///
    /// # Errors
    ///
    /// Returns [`MroError::Serialization`] if the text is not a mapping of
    /// class names to parent lists.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(MroError::from)
    }

    /// Declare `class` with the given parents, replacing any earlier entry
    pub fn declare<I, P>(&mut self, class: impl Into<ClassId>, parents: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<ClassId>,
    {
        let parents = parents.into_iter().map(Into::into).collect();
        self.parents.insert(class.into(), parents);
        self.revision += 1;
    }

    /// Builder form of [`HierarchyGraph::declare`]
    #[must_use]
    pub fn with_class<I, P>(mut self, class: impl Into<ClassId>, parents: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ClassId>,
    {
        self.declare(class, parents);
        self
    }

    /// Drop the entry for `class`, returning its parents
    pub fn remove(&mut self, class: &ClassId) -> Option<Vec<ClassId>> {
        let removed = self.parents.shift_remove(class);
        if removed.is_some() {
            self.revision += 1;
        }
        removed
    }

    /// Parents exactly as declared; empty for roots and unknown ids
    #[must_use]
    pub fn declared_parents(&self, class: &ClassId) -> &[ClassId] {
        self.parents.get(class).map(Vec::as_slice).unwrap_or_default()
    }

    /// Declared classes in insertion order
    pub fn classes(&self) -> impl Iterator<Item = &ClassId> {
        self.parents.keys()
    }

    #[must_use]
    pub fn contains(&self, class: &ClassId) -> bool {
        self.parents.contains_key(class)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Classes without parents
    ///
    /// Includes ids that only ever appear as a parent, since those are
    /// treated as roots too.
    #[must_use]
    pub fn roots(&self) -> Vec<ClassId> {
        let mut roots = IndexSet::new();
        for (class, parents) in &self.parents {
            if parents.is_empty() {
                roots.insert(class.clone());
            }
            for parent in parents {
                if !self.parents.contains_key(parent) {
                    roots.insert(parent.clone());
                }
            }
        }
        roots.into_iter().collect()
    }

    /// Declared classes naming `class` as a direct parent
    #[must_use]
    pub fn children_of(&self, class: &ClassId) -> Vec<ClassId> {
        self.parents
            .iter()
            .filter(|(_, parents)| parents.contains(class))
            .map(|(child, _)| child.clone())
            .collect()
    }

    /// Declared classes from which `root` cannot be reached
    ///
    /// Every class taking part in cooperative dispatch is expected to derive
    /// from one resolution root per contract family. Graph builders use this
    /// to check that before handing the graph to a session.
    #[must_use]
    pub fn unrooted_classes(&self, root: &ClassId) -> Vec<ClassId> {
        self.parents
            .keys()
            .filter(|class| *class != root && !self.reaches(class, root))
            .cloned()
            .collect()
    }

    fn reaches(&self, from: &ClassId, target: &ClassId) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(class) = stack.pop() {
            if class == target {
                return true;
            }
            if !seen.insert(class) {
                continue;
            }
            stack.extend(self.declared_parents(class));
        }
        false
    }
}

impl ClassGraph for HierarchyGraph {
    fn parents_of(&self, class: &ClassId) -> &[ClassId] {
        self.declared_parents(class)
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}

impl From<IndexMap<ClassId, Option<Vec<ClassId>>>> for HierarchyGraph {
    fn from(entries: IndexMap<ClassId, Option<Vec<ClassId>>>) -> Self {
        let parents = entries
            .into_iter()
            .map(|(class, parents)| (class, parents.unwrap_or_default()))
            .collect();
        Self {
            parents,
            revision: 0,
        }
    }
}

impl From<HierarchyGraph> for IndexMap<ClassId, Vec<ClassId>> {
    fn from(graph: HierarchyGraph) -> Self {
        graph.parents
    }
}

impl<C, I, P> FromIterator<(C, I)> for HierarchyGraph
where
    C: Into<ClassId>,
    I: IntoIterator<Item = P>,
    P: Into<ClassId>,
{
    fn from_iter<T: IntoIterator<Item = (C, I)>>(iter: T) -> Self {
        let mut graph = Self::new();
        for (class, parents) in iter {
            graph.declare(class, parents);
        }
        graph
    }
}
