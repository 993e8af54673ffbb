//! C3 linearization
//!
//! Computes the method resolution order of a class from its declared
//! parents. For a class `C` with parents `P1..Pn` the order is
//!
//! ```text
//! L[C] = C + merge(L[P1], ..., L[Pn], [P1, ..., Pn])
//! ```
//!
//! Results are memoized per class in a concurrent map. The map is dropped as
//! a whole whenever the graph reports a new revision. With the shared cache
//! disabled each query still memoizes its own ancestors, so shared ancestors
//! are merged once per query.
//!
//! The depth limit applies to the height of the queried class: the number of
//! classes on its longest parent chain, itself included. Heights are stored
//! next to cached orders, so a warm cache reports the same limit violations as
//! a cold one.

use dashmap::DashMap;
use indexmap::IndexSet;
use mro_core::config::MroConfig;
use mro_core::error::LinearizationError;
use mro_core::traits::ClassGraph;
use mro_core::types::{ClassId, Linearization};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// A computed order and the length of the longest parent chain behind it
#[derive(Debug, Clone)]
struct Memo {
    order: Linearization,
    height: usize,
}

/// State of one `linearize` call
#[derive(Default)]
struct Query {
    path: IndexSet<ClassId>,
    /// Used in place of the shared cache when that is disabled
    local: HashMap<ClassId, Memo>,
}

/// Memoizing C3 linearizer over a [`ClassGraph`]
#[derive(Debug)]
pub struct Linearizer<G> {
    graph: G,
    config: MroConfig,
    cache: DashMap<ClassId, Memo>,
    /// Graph revision the cache contents were computed against
    cached_revision: AtomicU64,
}

impl<G: ClassGraph> Linearizer<G> {
    /// Create a linearizer with the default configuration
    #[must_use]
    pub fn new(graph: G) -> Self {
        Self::with_config(graph, MroConfig::default())
    }

    /// Create a linearizer with an explicit configuration
    #[must_use]
    pub fn with_config(graph: G, config: MroConfig) -> Self {
        let cache = DashMap::with_capacity(config.cache.initial_capacity);
        let cached_revision = AtomicU64::new(graph.revision());
        Self {
            graph,
            config,
            cache,
            cached_revision,
        }
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    /// Mutable access to the graph
    ///
    /// Changes are picked up on the next query through the graph revision.
    pub fn graph_mut(&mut self) -> &mut G {
        &mut self.graph
    }

    pub fn config(&self) -> &MroConfig {
        &self.config
    }

    /// Method resolution order of `class`
    ///
    /// # Errors
    ///
    /// - [`LinearizationError::CyclicHierarchy`] if `class` reaches itself
    ///   through its parents
    /// - [`LinearizationError::InconsistentHierarchy`] if the parent orders
    ///   cannot be merged
    /// - [`LinearizationError::DepthExceeded`] if the hierarchy is deeper than
    ///   `linearization.max_depth`
    pub fn linearize(&self, class: &ClassId) -> Result<Linearization, LinearizationError> {
        self.sync_revision();
        let mut query = Query::default();
        self.linearize_in(class, &mut query)
            .map(|memo| memo.order)
            .map_err(|err| match err {
                LinearizationError::DepthExceeded { limit, .. } => {
                    LinearizationError::DepthExceeded {
                        class: class.clone(),
                        limit,
                    }
                }
                other => other,
            })
    }

    /// Direct parents exactly as the graph declares them
    #[must_use]
    pub fn declared_parents(&self, class: &ClassId) -> Vec<ClassId> {
        self.graph.parents_of(class).to_vec()
    }

    /// Drop every memoized linearization
    pub fn invalidate(&self) {
        self.cache.clear();
    }

    /// Number of memoized linearizations
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    fn sync_revision(&self) {
        let current = self.graph.revision();
        let previous = self.cached_revision.swap(current, Ordering::AcqRel);
        if previous != current {
            debug!(previous, current, "class graph changed, dropping linearization cache");
            self.cache.clear();
        }
    }

    fn lookup(&self, class: &ClassId, query: &Query) -> Option<Memo> {
        if self.config.cache.enabled {
            self.cache.get(class).map(|hit| hit.value().clone())
        } else {
            query.local.get(class).cloned()
        }
    }

    fn depth_exceeded(&self, class: &ClassId) -> LinearizationError {
        LinearizationError::DepthExceeded {
            class: class.clone(),
            limit: self.config.linearization.max_depth,
        }
    }

    fn linearize_in(&self, class: &ClassId, query: &mut Query) -> Result<Memo, LinearizationError> {
        let max_depth = self.config.linearization.max_depth;

        // A memoized class cannot be on the current path: its own
        // linearization would have failed with a cycle.
        if let Some(hit) = self.lookup(class, query) {
            trace!(class = %class, "linearization cache hit");
            if query.path.len() + hit.height > max_depth {
                return Err(self.depth_exceeded(class));
            }
            return Ok(hit);
        }

        if query.path.contains(class) {
            let mut cycle: Vec<ClassId> = query.path.iter().cloned().collect();
            cycle.push(class.clone());
            return Err(LinearizationError::CyclicHierarchy {
                class: class.clone(),
                path: cycle,
            });
        }
        if query.path.len() >= max_depth {
            return Err(self.depth_exceeded(class));
        }

        query.path.insert(class.clone());
        let parents = self.graph.parents_of(class);
        let mut sequences = Vec::with_capacity(parents.len() + 1);
        let mut parent_height = 0;
        for parent in parents {
            let memo = self.linearize_in(parent, query)?;
            parent_height = parent_height.max(memo.height);
            sequences.push(memo.order.into_vec());
        }
        sequences.push(parents.to_vec());
        query.path.pop();

        // The class leads its own order and occurs in no parent order, so it
        // is always the first pick of the full merge and is prepended here.
        let ancestors = c3_merge(sequences).map_err(|remaining| {
            LinearizationError::InconsistentHierarchy {
                class: class.clone(),
                remaining,
            }
        })?;
        let memo = Memo {
            order: Linearization::new(class.clone(), ancestors),
            height: parent_height + 1,
        };
        debug!(class = %class, mro = %memo.order, "computed linearization");

        if self.config.cache.enabled {
            // Racing threads compute the same order; first insert wins.
            self.cache
                .entry(class.clone())
                .or_insert_with(|| memo.clone());
        } else {
            query.local.insert(class.clone(), memo.clone());
        }
        Ok(memo)
    }
}

/// C3 merge of several orders into one
///
/// Repeatedly takes the first head (scanning sequences left to right) that
/// does not occur in the tail of any sequence, appends it, and removes it
/// from the head of every sequence it currently leads. Empty sequences are
/// dropped as they run out.
///
/// # Errors
///
/// When a full scan finds no good head, returns the sequences that were
/// still non-empty.
pub fn c3_merge<T>(sequences: Vec<Vec<T>>) -> Result<Vec<T>, Vec<Vec<T>>>
where
    T: Clone + PartialEq,
{
    let mut sequences: Vec<VecDeque<T>> = sequences.into_iter().map(VecDeque::from).collect();
    let mut result = Vec::new();

    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(result);
        }

        let candidate = sequences
            .iter()
            .filter_map(VecDeque::front)
            .find(|&head| is_good_head(head, &sequences))
            .cloned();
        let Some(candidate) = candidate else {
            return Err(sequences.into_iter().map(Vec::from).collect());
        };

        for seq in &mut sequences {
            if seq.front() == Some(&candidate) {
                seq.pop_front();
            }
        }
        result.push(candidate);
    }
}

fn is_good_head<T: PartialEq>(head: &T, sequences: &[VecDeque<T>]) -> bool {
    sequences
        .iter()
        .all(|seq| !seq.iter().skip(1).any(|item| item == head))
}
