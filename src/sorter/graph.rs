//! Element registry, relation bookkeeping, path search, and linearization

use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;

use crate::core::{Result, SortError};

/// Bound for sortable elements: an opaque, hashable identity for one unit
/// of work. Implemented for free by any suitable type.
pub trait Element: Clone + Eq + Hash + fmt::Debug {}

impl<T: Clone + Eq + Hash + fmt::Debug> Element for T {}

/// Arena slot of a registered element.
pub(crate) type NodeId = usize;

#[derive(Debug, Clone, Copy)]
pub(crate) struct RelationState {
    pub(crate) priority: u32,
    pub(crate) enabled: bool,
}

/// Nodes and relations touched by some path between two elements.
#[derive(Debug, Default)]
pub(crate) struct PathSet {
    pub(crate) nodes: BTreeSet<NodeId>,
    pub(crate) relations: BTreeSet<(NodeId, NodeId)>,
}

impl PathSet {
    pub(crate) fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

/// A set of elements under directed, prioritized ordering relations.
///
/// Relations are pair-unique: re-adding a pair merges into one relation
/// keeping the minimum (strongest) priority seen. A relation can be
/// disabled, which removes it from ordering decisions without forgetting
/// it; [`Self::break_loops`] uses exactly that to make cyclic graphs
/// sortable.
///
/// One graph serves one transaction: populate, [`Self::linearize`] once,
/// then [`Self::reset`] before any reuse.
pub struct RelationGraph<E> {
    pub(crate) nodes: Vec<E>,
    pub(crate) index: HashMap<E, NodeId>,
    /// Successor lists in relation insertion order.
    pub(crate) successors: Vec<Vec<NodeId>>,
    pub(crate) relations: HashMap<(NodeId, NodeId), RelationState>,
    /// Incoming-relation count per node, maintained on insertion.
    pred_count: Vec<usize>,
    pub(crate) max_priority: u32,
    linearized: bool,
}

impl<E: Element> Default for RelationGraph<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Element> RelationGraph<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            successors: Vec::new(),
            relations: HashMap::new(),
            pred_count: Vec::new(),
            max_priority: 0,
            linearized: false,
        }
    }

    fn intern(&mut self, element: &E) -> NodeId {
        if let Some(&node) = self.index.get(element) {
            return node;
        }
        let node = self.nodes.len();
        self.nodes.push(element.clone());
        self.index.insert(element.clone(), node);
        self.successors.push(Vec::new());
        self.pred_count.push(0);
        node
    }

    /// Register an element with no relations. Idempotent.
    pub fn add_element(&mut self, element: E) {
        debug_assert!(!self.linearized, "populate before linearize; reset() to reuse");
        self.intern(&element);
    }

    /// Record that `pred` must be placed before `succ`, registering both
    /// endpoints as needed. Lower priority values are stronger and survive
    /// loop breaking preferentially; re-adding a pair keeps the minimum
    /// priority seen.
    pub fn add_relation(&mut self, pred: &E, succ: &E, priority: u32) {
        debug_assert!(!self.linearized, "populate before linearize; reset() to reuse");
        let pred_node = self.intern(pred);
        let succ_node = self.intern(succ);
        self.max_priority = self.max_priority.max(priority);
        match self.relations.entry((pred_node, succ_node)) {
            Entry::Occupied(mut slot) => {
                let state = slot.get_mut();
                if priority < state.priority {
                    state.priority = priority;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(RelationState {
                    priority,
                    enabled: true,
                });
                self.successors[pred_node].push(succ_node);
                self.pred_count[succ_node] += 1;
            }
        }
    }

    /// Same as [`Self::add_relation`] with the arguments swapped.
    pub fn add_predecessor(&mut self, succ: &E, pred: &E, priority: u32) {
        self.add_relation(pred, succ, priority);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub fn contains(&self, element: &E) -> bool {
        self.index.contains_key(element)
    }

    /// Registered elements in registration order.
    #[must_use]
    pub fn elements(&self) -> &[E] {
        &self.nodes
    }

    #[must_use]
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// Highest priority value any relation was ever added with.
    #[must_use]
    pub fn max_priority(&self) -> u32 {
        self.max_priority
    }

    #[must_use]
    pub fn relation_priority(&self, pred: &E, succ: &E) -> Option<u32> {
        let pair = self.pair_ids(pred, succ)?;
        self.relations.get(&pair).map(|state| state.priority)
    }

    #[must_use]
    pub fn relation_enabled(&self, pred: &E, succ: &E) -> Option<bool> {
        let pair = self.pair_ids(pred, succ)?;
        self.relations.get(&pair).map(|state| state.enabled)
    }

    /// Enabled relations in insertion order.
    #[must_use]
    pub fn active_relations(&self) -> Vec<(E, E)> {
        self.collect_relations(true)
    }

    /// Disabled relations in insertion order.
    #[must_use]
    pub fn disabled_relations(&self) -> Vec<(E, E)> {
        self.collect_relations(false)
    }

    fn collect_relations(&self, enabled: bool) -> Vec<(E, E)> {
        let mut out = Vec::new();
        for (pred, succs) in self.successors.iter().enumerate() {
            for &succ in succs {
                let Some(state) = self.relations.get(&(pred, succ)) else {
                    continue;
                };
                if state.enabled == enabled {
                    out.push((self.nodes[pred].clone(), self.nodes[succ].clone()));
                }
            }
        }
        out
    }

    fn pair_ids(&self, pred: &E, succ: &E) -> Option<(NodeId, NodeId)> {
        Some((*self.index.get(pred)?, *self.index.get(succ)?))
    }

    fn describe_pair(pred: &E, succ: &E) -> String {
        format!("{pred:?} -> {succ:?}")
    }

    /// Ignore a relation for ordering purposes without forgetting it.
    pub fn disable_relation(&mut self, pred: &E, succ: &E) -> Result<()> {
        let Some(pair) = self.pair_ids(pred, succ) else {
            return Err(SortError::Disable(Self::describe_pair(pred, succ)));
        };
        match self.relations.get_mut(&pair) {
            Some(state) if state.enabled => {
                state.enabled = false;
                Ok(())
            }
            _ => Err(SortError::Disable(Self::describe_pair(pred, succ))),
        }
    }

    /// Restore a relation disabled with [`Self::disable_relation`].
    pub fn enable_relation(&mut self, pred: &E, succ: &E) -> Result<()> {
        let Some(pair) = self.pair_ids(pred, succ) else {
            return Err(SortError::Enable(Self::describe_pair(pred, succ)));
        };
        match self.relations.get_mut(&pair) {
            Some(state) if !state.enabled => {
                state.enabled = true;
                Ok(())
            }
            _ => Err(SortError::Enable(Self::describe_pair(pred, succ))),
        }
    }

    /// Restore every relation to the enabled state.
    pub fn enable_all_relations(&mut self) {
        for state in self.relations.values_mut() {
            state.enabled = true;
        }
    }

    /// Drop all elements and relations, returning the graph to its initial
    /// state for the next transaction.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.index.clear();
        self.successors.clear();
        self.relations.clear();
        self.pred_count.clear();
        self.max_priority = 0;
        self.linearized = false;
    }

    /// Break any dependency loops, then order every element so each enabled
    /// relation's predecessor comes first.
    ///
    /// Consumes the graph's single linearization; [`Self::reset`] before
    /// reuse. An [`SortError::Incomplete`] here means loop breaking left a
    /// cycle behind, which is a defect in this module, not caller error.
    pub fn linearize(&mut self) -> Result<Vec<E>> {
        if self.linearized {
            return Err(SortError::Consumed);
        }
        let dropped = self.break_loops();
        if dropped > 0 {
            tracing::debug!(dropped, "disabled relations to break ordering loops");
        }
        self.linearized = true;

        let total = self.nodes.len();
        let mut pending = self.pred_count.clone();
        for (&(_, succ), state) in &self.relations {
            if !state.enabled {
                pending[succ] -= 1;
            }
        }
        let mut ready: VecDeque<NodeId> = (0..total).filter(|&node| pending[node] == 0).collect();
        let mut sorted = Vec::with_capacity(total);
        while let Some(node) = ready.pop_front() {
            sorted.push(self.nodes[node].clone());
            for &succ in &self.successors[node] {
                let Some(state) = self.relations.get(&(node, succ)) else {
                    continue;
                };
                if !state.enabled {
                    continue;
                }
                pending[succ] -= 1;
                if pending[succ] == 0 {
                    ready.push_back(succ);
                }
            }
        }
        if sorted.len() != total {
            return Err(SortError::Incomplete {
                sorted: sorted.len(),
                total,
            });
        }
        Ok(sorted)
    }

    /// Every node and relation lying on some path from `start` to `end`
    /// over enabled relations that pass `filter` and, when a ceiling is
    /// given, have priority at or below it.
    ///
    /// With `start == end` the result is non-empty exactly when `start`
    /// sits on a cycle. Each node is visited at most once, so the result
    /// is sound but not an exhaustive enumeration of all paths; callers
    /// need membership, not every route, and the bound keeps the search
    /// polynomial on graphs dense with overlapping cycles.
    pub(crate) fn path_elements<F>(
        &self,
        start: NodeId,
        end: NodeId,
        ceiling: Option<u32>,
        filter: F,
    ) -> PathSet
    where
        F: Fn(NodeId, NodeId) -> bool,
    {
        #[derive(Clone, Copy, PartialEq)]
        enum Visit {
            Fresh,
            Active,
            Done,
        }

        let mut out = PathSet::default();
        if self.nodes.is_empty() {
            return out;
        }
        let mut visit = vec![Visit::Fresh; self.nodes.len()];
        let mut reaches = vec![false; self.nodes.len()];
        // Frame: node, the tree parent it was entered from, next successor slot.
        let mut stack: Vec<(NodeId, Option<NodeId>, usize)> = vec![(start, None, 0)];
        visit[start] = Visit::Active;

        while let Some(frame) = stack.last_mut() {
            let (node, parent, cursor) = *frame;
            if let Some(&next) = self.successors[node].get(cursor) {
                frame.2 += 1;
                if !self.relation_open(node, next, ceiling, &filter) {
                    continue;
                }
                if next == end {
                    reaches[node] = true;
                    out.relations.insert((node, next));
                } else {
                    match visit[next] {
                        Visit::Fresh => {
                            visit[next] = Visit::Active;
                            stack.push((next, Some(node), 0));
                        }
                        // A node already on the stack is not re-entered; its
                        // own frame attributes whatever it reaches.
                        Visit::Active => {}
                        Visit::Done => {
                            if reaches[next] {
                                reaches[node] = true;
                                out.relations.insert((node, next));
                            }
                        }
                    }
                }
            } else {
                stack.pop();
                visit[node] = Visit::Done;
                if reaches[node] {
                    if let Some(parent) = parent {
                        reaches[parent] = true;
                        out.relations.insert((parent, node));
                    }
                }
            }
        }
        for &(pred, succ) in &out.relations {
            out.nodes.insert(pred);
            out.nodes.insert(succ);
        }
        out
    }

    fn relation_open<F>(&self, pred: NodeId, succ: NodeId, ceiling: Option<u32>, filter: &F) -> bool
    where
        F: Fn(NodeId, NodeId) -> bool,
    {
        let Some(state) = self.relations.get(&(pred, succ)) else {
            return false;
        };
        if !state.enabled {
            return false;
        }
        if let Some(ceiling) = ceiling {
            if state.priority > ceiling {
                return false;
            }
        }
        filter(pred, succ)
    }
}
