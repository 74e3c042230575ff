//! Loop analysis and the relation-disabling heuristic
//!
//! A loop component is the maximal set of elements that can all reach
//! themselves again through enabled relations, together with every relation
//! lying on such a cycle. [`RelationGraph::break_loops`] disables the
//! cheapest subset of each component's relations so the graph becomes
//! acyclic while strong (low priority value) relations survive
//! preferentially.

use std::collections::{BTreeSet, HashMap};

use crate::sorter::graph::{Element, NodeId, RelationGraph};

/// One maximal group of mutually cyclic elements and the relations forming
/// their cycles, resolved to element values.
#[derive(Debug, Clone)]
pub struct Loop<E> {
    /// Members in registration order.
    pub elements: Vec<E>,
    /// Relations lying on some cycle within the component.
    pub relations: Vec<(E, E)>,
}

impl<E> Loop<E> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct LoopComponent {
    pub(crate) nodes: BTreeSet<NodeId>,
    pub(crate) relations: BTreeSet<(NodeId, NodeId)>,
}

impl<E: Element> RelationGraph<E> {
    /// Maximal loop components over the currently enabled relations.
    ///
    /// Loop breaking calls this on the fully enabled graph; do the same
    /// (see [`Self::enable_all_relations`]) when analysing a graph whose
    /// relations were toggled, otherwise partially disabled cycles are
    /// invisible.
    #[must_use]
    pub fn find_all_loops(&self) -> Vec<Loop<E>> {
        self.loop_components()
            .iter()
            .map(|component| Loop {
                elements: component
                    .nodes
                    .iter()
                    .map(|&node| self.nodes[node].clone())
                    .collect(),
                relations: component
                    .relations
                    .iter()
                    .map(|&(pred, succ)| (self.nodes[pred].clone(), self.nodes[succ].clone()))
                    .collect(),
            })
            .collect()
    }

    pub(crate) fn loop_components(&self) -> Vec<LoopComponent> {
        let mut in_loop = vec![false; self.nodes.len()];
        let mut components = Vec::new();
        for seed in 0..self.nodes.len() {
            if in_loop[seed] {
                continue;
            }
            let found = self.path_elements(seed, seed, None, |_, _| true);
            if found.is_empty() {
                continue;
            }
            let mut component = LoopComponent {
                nodes: found.nodes,
                relations: found.relations,
            };
            // One pass from the seed can miss members whose cycles the
            // memoized search did not attribute; querying every discovered
            // node until closure pulls in the rest of the component.
            let mut queue: Vec<NodeId> = component
                .nodes
                .iter()
                .copied()
                .filter(|&node| node != seed)
                .collect();
            while let Some(member) = queue.pop() {
                let more = self.path_elements(member, member, None, |_, _| true);
                for &node in &more.nodes {
                    if component.nodes.insert(node) {
                        queue.push(node);
                    }
                }
                component.relations.extend(more.relations.iter().copied());
            }
            for &node in &component.nodes {
                in_loop[node] = true;
            }
            components.push(component);
        }
        components
    }

    /// Render a loop as one or more explicit cycles, each starting and
    /// ending on the same element. Walking the first in-component successor
    /// from every not-yet-covered member yields at least one cycle and
    /// touches each member at most once; like the underlying search this is
    /// a readable sample, not an enumeration of every cycle.
    #[must_use]
    pub fn loop_paths(&self, lp: &Loop<E>) -> Vec<Vec<E>> {
        let members: BTreeSet<NodeId> = lp
            .elements
            .iter()
            .filter_map(|element| self.index.get(element).copied())
            .collect();
        let member_relations: BTreeSet<(NodeId, NodeId)> = lp
            .relations
            .iter()
            .filter_map(|(pred, succ)| {
                Some((*self.index.get(pred)?, *self.index.get(succ)?))
            })
            .collect();

        let mut covered: BTreeSet<NodeId> = BTreeSet::new();
        let mut paths = Vec::new();
        for &start in &members {
            if covered.contains(&start) {
                continue;
            }
            let mut walk: Vec<NodeId> = vec![start];
            let mut seen_at: HashMap<NodeId, usize> = HashMap::from([(start, 0)]);
            let mut current = start;
            loop {
                let next = self.successors[current]
                    .iter()
                    .copied()
                    .find(|&succ| member_relations.contains(&(current, succ)));
                let Some(next) = next else {
                    break;
                };
                if let Some(&at) = seen_at.get(&next) {
                    covered.extend(walk.iter().copied());
                    let mut cycle: Vec<E> = walk[at..]
                        .iter()
                        .map(|&node| self.nodes[node].clone())
                        .collect();
                    cycle.push(self.nodes[next].clone());
                    paths.push(cycle);
                    break;
                }
                seen_at.insert(next, walk.len());
                walk.push(next);
                current = next;
            }
        }
        paths
    }

    /// Make the graph acyclic by disabling relations, preferring to keep
    /// strong (low priority value) relations and, within a priority, the
    /// relations whose loss would break the fewest cycles. Returns how many
    /// relations were left disabled.
    ///
    /// Always starts from the fully enabled state; loop analysis needs the
    /// complete graph.
    pub fn break_loops(&mut self) -> usize {
        self.enable_all_relations();
        let components = self.loop_components();
        if components.is_empty() {
            return 0;
        }
        let max_priority = self.max_priority;
        let mut disabled = 0usize;
        for component in &components {
            // Reenable order: ascending by priority, then by how many
            // relations would still loop without this one at each priority
            // ceiling (negated, so the least load-bearing come first and the
            // decisive ones face an already-constrained component).
            let mut order: Vec<((NodeId, NodeId), Vec<i64>)> = component
                .relations
                .iter()
                .map(|&pair| {
                    let priority = self
                        .relations
                        .get(&pair)
                        .map_or(0, |state| state.priority);
                    let mut key = Vec::with_capacity(max_priority as usize + 2);
                    key.push(i64::from(priority));
                    for ceiling in 0..=max_priority {
                        let still_looping =
                            self.looping_relation_count(component, pair, ceiling);
                        key.push(-(still_looping as i64));
                    }
                    (pair, key)
                })
                .collect();
            order.sort_by(|a, b| a.1.cmp(&b.1));

            for &pair in &component.relations {
                if let Some(state) = self.relations.get_mut(&pair) {
                    state.enabled = false;
                }
            }
            for (pair, _) in order {
                let (pred, succ) = pair;
                // A self-relation cannot come back without restoring its loop.
                if pred == succ {
                    disabled += 1;
                    continue;
                }
                let back = self.path_elements(succ, pred, None, |from, to| {
                    component.relations.contains(&(from, to))
                });
                if back.is_empty() {
                    if let Some(state) = self.relations.get_mut(&pair) {
                        state.enabled = true;
                    }
                } else {
                    disabled += 1;
                    tracing::trace!(relation = ?pair, "relation stays disabled to keep the component acyclic");
                }
            }
        }
        tracing::debug!(
            components = components.len(),
            disabled,
            "loop breaking finished"
        );
        disabled
    }

    /// How many relations still lie on a cycle within `component` when
    /// `excluded` is ignored and only relations at or below `ceiling`
    /// count.
    fn looping_relation_count(
        &self,
        component: &LoopComponent,
        excluded: (NodeId, NodeId),
        ceiling: u32,
    ) -> usize {
        let mut looping: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();
        for &node in &component.nodes {
            let found = self.path_elements(node, node, Some(ceiling), |from, to| {
                (from, to) != excluded && component.relations.contains(&(from, to))
            });
            looping.extend(found.relations.iter().copied());
        }
        looping.len()
    }
}
