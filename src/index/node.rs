use std::fmt;

use serde_derive::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::KeyType;

use super::range_pointer::RangePointer;

/// Handle of a node inside the arena of a single index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A node of the index with its keys and the ranges derived from them.
///
/// Parent, sibling and range owner references are plain [`NodeId`] handles.
/// Only the `child` slot of a [`RangePointer`] owns a node.
#[derive(Debug, Clone)]
pub struct Node<K> {
    id: NodeId,
    keys: Vec<K>,
    level: usize,
    pub(crate) parent: Option<NodeId>,
    pub(crate) right_link: Option<NodeId>,
    pub(crate) range_pointers: Vec<RangePointer<K>>,
}

impl<K> Node<K>
where
    K: KeyType,
{
    fn new(id: NodeId, level: usize) -> Node<K> {
        Node {
            id,
            keys: Vec::new(),
            level,
            parent: None,
            right_link: None,
            range_pointers: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Keys in the order they were added.
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Next node on the same level, as of the last sibling recomputation of this level.
    pub fn right_link(&self) -> Option<NodeId> {
        self.right_link
    }

    pub fn range_pointers(&self) -> &[RangePointer<K>] {
        &self.range_pointers
    }

    pub fn max_key(&self) -> Option<&K> {
        self.keys.iter().max()
    }

    /// Returns whether any range of this node contains the value.
    pub fn in_range(&self, value: &K) -> bool {
        self.range_pointers.iter().any(|p| p.in_range(value))
    }

    /// The first range containing the value, which is the one the index follows.
    pub fn route(&self, value: &K) -> Option<&RangePointer<K>> {
        self.range_pointers.iter().find(|p| p.in_range(value))
    }

    /// Child nodes in the order of their ranges.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.range_pointers.iter().filter_map(|p| p.child)
    }
}

/// Storage for all nodes of an index.
///
/// Nodes are never removed, so a [`NodeId`] stays valid for the lifetime of the arena.
#[derive(Debug, Clone)]
pub(crate) struct NodeArena<K> {
    nodes: Vec<Node<K>>,
}

impl<K> NodeArena<K>
where
    K: KeyType,
{
    pub fn with_capacity(capacity: usize) -> NodeArena<K> {
        NodeArena {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Allocate a new node without keys on the given level.
    ///
    /// Returns the ID of the new node.
    pub fn allocate_node(&mut self, level: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(id, level));
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node<K>> {
        self.nodes.iter()
    }

    pub fn get(&self, id: NodeId) -> Result<&Node<K>> {
        self.nodes.get(id.0).ok_or(Error::UnknownNode(id))
    }

    pub fn get_mut(&mut self, id: NodeId) -> Result<&mut Node<K>> {
        self.nodes.get_mut(id.0).ok_or(Error::UnknownNode(id))
    }

    /// Append a key to a node and regenerate its ranges.
    ///
    /// Existing children are moved to the first new range that contains their
    /// maximum key and that has not been taken by an earlier child.
    /// A child without such a range is detached from the node.
    pub fn add_key(&mut self, id: NodeId, value: K) -> Result<()> {
        let node = self.get_mut(id)?;
        trace!(node = %id, key = ?value, "adding key");
        node.keys.push(value);
        let regenerated = RangePointer::generate(id, &node.keys);
        let previous = std::mem::replace(&mut node.range_pointers, regenerated);

        for child in previous.into_iter().filter_map(|p| p.child) {
            let max_key = self.get(child)?.max_key().cloned();
            let node = self.get_mut(id)?;
            let target = max_key.and_then(|max_key| {
                node.range_pointers
                    .iter()
                    .position(|p| p.child.is_none() && p.in_range(&max_key))
            });
            match target {
                Some(i) => node.range_pointers[i].child = Some(child),
                None => {
                    warn!(node = %id, child = %child, "no range left for child, detaching it");
                    self.get_mut(child)?.parent = None;
                }
            }
        }
        Ok(())
    }

    /// Attach a node as child to the first free range of the parent that contains its maximum key.
    ///
    /// Returns `false` if there is no such range, in which case nothing is changed.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<bool> {
        if parent == child {
            return Err(Error::AlreadyOwned { child, parent });
        }
        let parent_level = self.get(parent)?.level;
        let child_node = self.get(child)?;
        if let Some(owner) = child_node.parent {
            return Err(Error::AlreadyOwned {
                child,
                parent: owner,
            });
        }
        if child_node.level != parent_level + 1 {
            return Err(Error::LevelMismatch {
                parent_level,
                child_level: child_node.level,
            });
        }
        let max_key = child_node.max_key().cloned().ok_or(Error::EmptyNode(child))?;

        let parent_node = self.get_mut(parent)?;
        let slot = parent_node
            .range_pointers
            .iter()
            .position(|p| p.child.is_none() && p.in_range(&max_key));
        match slot {
            Some(i) => {
                parent_node.range_pointers[i].child = Some(child);
                self.get_mut(child)?.parent = Some(parent);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
