use std::collections::{BTreeMap, HashSet};

use serde_derive::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    IndexConfig, KeyType,
};

use node::{Node, NodeArena, NodeId};

pub(crate) mod node;
pub(crate) mod range_pointer;

/// Level of the root node. Keys inserted on this level are always added to the root.
pub const ROOT_LEVEL: usize = 1;

/// Multi-level index of half-open key ranges.
///
/// Each node splits the key space into ranges derived from its keys and every
/// range can own a child node one level deeper. Nodes on the same level are
/// linked from left to right, see [`RangeIndex::siblings`].
///
/// Nodes are neither split nor removed and duplicate keys are kept.
/// The index has no internal synchronization: it can be read from several
/// threads at once, but mutation needs exclusive access.
#[derive(Debug, Clone)]
pub struct RangeIndex<K = i64> {
    nodes: NodeArena<K>,
    root: Option<NodeId>,
    level_heads: BTreeMap<usize, NodeId>,
    config: IndexConfig,
}

/// Nested snapshot of the nodes reachable from the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeShape<K> {
    pub keys: Vec<K>,
    pub level: usize,
    pub children: Vec<NodeShape<K>>,
}

impl<K> Default for RangeIndex<K>
where
    K: KeyType,
{
    fn default() -> Self {
        RangeIndex::new()
    }
}

impl<K> RangeIndex<K>
where
    K: KeyType,
{
    /// Create an empty index with the default configuration.
    pub fn new() -> RangeIndex<K> {
        RangeIndex::with_config(IndexConfig::default())
    }

    /// Create an empty index with the given configuration.
    pub fn with_config(config: IndexConfig) -> RangeIndex<K> {
        RangeIndex {
            nodes: NodeArena::with_capacity(config.initial_capacity),
            root: None,
            level_heads: BTreeMap::new(),
            config,
        }
    }

    /// Insert a key on the root level.
    pub fn insert(&mut self, value: K) -> Result<&mut Self> {
        self.insert_at(value, ROOT_LEVEL)
    }

    /// Insert a key on the given level.
    ///
    /// Starting at the root, the first range of each node that contains the value
    /// is followed. The key is added to the child on the requested level, or a
    /// new node is created below the last node visited when the range has no
    /// child yet. Afterwards the sibling links of the level are recomputed.
    ///
    /// Returns the index itself to allow chaining insertions.
    pub fn insert_at(&mut self, value: K, level: usize) -> Result<&mut Self> {
        if level < ROOT_LEVEL {
            return Err(Error::InvalidLevel(level));
        }

        let landed = match self.root {
            None => {
                let root = self.nodes.allocate_node(ROOT_LEVEL);
                self.nodes.add_key(root, value)?;
                self.root = Some(root);
                Some(ROOT_LEVEL)
            }
            Some(root) if level == ROOT_LEVEL => {
                self.nodes.add_key(root, value)?;
                Some(ROOT_LEVEL)
            }
            Some(root) => self.insert_below(root, value, level)?,
        };

        self.set_right_links(level)?;
        if let Some(landed) = landed.filter(|l| *l != level) {
            self.set_right_links(landed)?;
        }

        if self.config.check_invariants {
            self.check_invariants()?;
        }
        Ok(self)
    }

    /// Walks down from `start` and returns the level the key was added to.
    fn insert_below(&mut self, start: NodeId, value: K, level: usize) -> Result<Option<usize>> {
        let mut current = start;
        loop {
            let node = self.nodes.get(current)?;
            let child = match node.route(&value) {
                Some(range) => range.child(),
                None => {
                    warn!(node = %current, key = ?value, "no range contains the key, nothing inserted");
                    return Ok(None);
                }
            };

            match child {
                Some(child) if self.nodes.get(child)?.level() == level => {
                    self.nodes.add_key(child, value)?;
                    return Ok(Some(level));
                }
                Some(child) => {
                    current = child;
                }
                None => {
                    let new_level = node.level() + 1;
                    let new_node = self.nodes.allocate_node(new_level);
                    self.nodes.add_key(new_node, value)?;
                    self.nodes.add_child(current, new_node)?;
                    debug!(node = %new_node, parent = %current, level = new_level, "created node");
                    return Ok(Some(new_level));
                }
            }
        }
    }

    /// Collect all nodes of a level in left to right order.
    ///
    /// Nodes are found by descending through the ranges of all nodes above
    /// the level. Each node is only contained once.
    pub fn gather_level(&self, level: usize) -> Result<Vec<NodeId>> {
        let mut visited = HashSet::new();
        let mut result = Vec::new();
        if let Some(root) = self.root {
            self.gather_node(root, level, &mut visited, &mut result)?;
        }
        Ok(result)
    }

    fn gather_node(
        &self,
        id: NodeId,
        level: usize,
        visited: &mut HashSet<NodeId>,
        result: &mut Vec<NodeId>,
    ) -> Result<()> {
        let node = self.nodes.get(id)?;
        if node.level() == level {
            if visited.insert(id) {
                result.push(id);
            }
        } else if node.level() < level {
            for child in node.children() {
                self.gather_node(child, level, visited, result)?;
            }
        }
        Ok(())
    }

    /// Recompute the sibling links of all nodes on a level.
    ///
    /// The last node of the level has no right link.
    pub fn set_right_links(&mut self, level: usize) -> Result<()> {
        let level_nodes = self.gather_level(level)?;
        debug!(level, nodes = level_nodes.len(), "setting right links");

        for (i, id) in level_nodes.iter().enumerate() {
            self.nodes.get_mut(*id)?.right_link = level_nodes.get(i + 1).copied();
        }
        match level_nodes.first() {
            Some(head) => {
                self.level_heads.insert(level, *head);
            }
            None => {
                self.level_heads.remove(&level);
            }
        }
        Ok(())
    }

    /// Returns an iterator over the nodes of a level, following the sibling links.
    pub fn siblings(&self, level: usize) -> Siblings<'_, K> {
        Siblings {
            nodes: &self.nodes,
            next: self.level_heads.get(&level).copied(),
        }
    }

    /// Returns the nodes visited when following the first matching range for the value,
    /// starting at the root and ending at the deepest node reached.
    pub fn path(&self, value: &K) -> Result<Vec<NodeId>> {
        let mut result = Vec::new();
        let mut next = self.root;
        while let Some(id) = next {
            result.push(id);
            next = self.nodes.get(id)?.route(value).and_then(|r| r.child());
        }
        Ok(result)
    }

    pub fn root(&self) -> Option<&Node<K>> {
        self.root.and_then(|id| self.nodes.get(id).ok())
    }

    pub fn node(&self, id: NodeId) -> Result<&Node<K>> {
        self.nodes.get(id)
    }

    /// Number of nodes in the index.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing has been inserted yet.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Deepest level of any node, or 0 for an empty index.
    pub fn height(&self) -> usize {
        self.nodes.iter().map(|n| n.level()).max().unwrap_or(0)
    }

    /// Returns a nested copy of the keys of all nodes reachable from the root.
    pub fn shape(&self) -> Result<Option<NodeShape<K>>> {
        self.root.map(|root| self.node_shape(root)).transpose()
    }

    fn node_shape(&self, id: NodeId) -> Result<NodeShape<K>> {
        let node = self.nodes.get(id)?;
        let children: Result<Vec<_>> = node.children().map(|c| self.node_shape(c)).collect();
        Ok(NodeShape {
            keys: node.keys().to_vec(),
            level: node.level(),
            children: children?,
        })
    }

    /// Verify the structure of all nodes reachable from the root.
    ///
    /// Each range must belong to the node holding it, each child must be owned
    /// by exactly one range, point back to its owner as parent and be exactly one
    /// level below it.
    pub fn check_invariants(&self) -> Result<()> {
        let root = match self.root {
            Some(root) => root,
            None => return Ok(()),
        };
        let root_node = self.nodes.get(root)?;
        if root_node.level() != ROOT_LEVEL || root_node.parent().is_some() {
            return Err(Error::InvariantViolation(format!(
                "root {} is on level {} with parent {:?}",
                root,
                root_node.level(),
                root_node.parent()
            )));
        }

        let mut owned = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.nodes.get(id)?;
            for range in node.range_pointers() {
                if range.owner() != id {
                    return Err(Error::InvariantViolation(format!(
                        "range of node {} is owned by {}",
                        id,
                        range.owner()
                    )));
                }
                let child = match range.child() {
                    Some(child) => child,
                    None => continue,
                };
                if !owned.insert(child) {
                    return Err(Error::InvariantViolation(format!(
                        "node {} is owned by more than one range",
                        child
                    )));
                }
                let child_node = self.nodes.get(child)?;
                if child_node.parent() != Some(id) {
                    return Err(Error::InvariantViolation(format!(
                        "node {} is a child of {} but has parent {:?}",
                        child,
                        id,
                        child_node.parent()
                    )));
                }
                if child_node.level() != node.level() + 1 {
                    return Err(Error::InvariantViolation(format!(
                        "node {} on level {} is a child of node {} on level {}",
                        child,
                        child_node.level(),
                        id,
                        node.level()
                    )));
                }
                stack.push(child);
            }
        }
        Ok(())
    }
}

/// Iterator over the nodes of one level, created by [`RangeIndex::siblings`].
pub struct Siblings<'a, K> {
    nodes: &'a NodeArena<K>,
    next: Option<NodeId>,
}

impl<'a, K> Iterator for Siblings<'a, K>
where
    K: KeyType,
{
    type Item = &'a Node<K>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.next?).ok()?;
        self.next = node.right_link();
        Some(node)
    }
}
