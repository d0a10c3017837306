//! The OID trie.
//!
//! Arena-backed sparse tree of integer arcs. Nodes hold an interned name
//! when a declaration owns their path and a table-entry marker for row
//! templates. Nodes are never removed; an unnamed placeholder created under
//! the synthesizing orphan policy is promoted in place when its declaration
//! arrives.

use super::ids::{NodeId, StrId};
use super::oid::Oid;
use crate::error::MibError;
use std::collections::BTreeMap;

/// What `insert` does when the parent path is absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrphanPolicy {
    /// Fail the insert with [`MibError::OrphanOid`].
    Reject,
    /// Create unnamed placeholder nodes for every missing intermediate arc.
    Synthesize,
}

/// One trie node.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrieNode {
    /// The arc at this position.
    pub arc: u32,
    /// Declared name, if any.
    pub name: Option<StrId>,
    /// Whether this node is a table row template.
    pub table_entry: bool,
    /// Parent node; `None` for top-level arcs.
    pub parent: Option<NodeId>,
    /// Children keyed (and therefore ordered) by arc.
    pub children: BTreeMap<u32, NodeId>,
    /// Full path from the root down to this node.
    pub path: Oid,
}

/// The trie. The conceptual root is external to the arena and not itself
/// addressable; top-level arcs hang off [`roots`](Self::roots).
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OidTree {
    nodes: Vec<TrieNode>,
    roots: BTreeMap<u32, NodeId>,
}

impl OidTree {
    /// An empty trie.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the trie has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Fetch a node.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&TrieNode> {
        self.nodes.get(id.to_index())
    }

    /// Fetch a node known to exist.
    ///
    /// # Panics
    ///
    /// Panics when `id` did not come from this trie.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id.to_index()]
    }

    /// Top-level arcs in order.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roots.values().copied()
    }

    /// Iterate over all `(NodeId, node)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TrieNode)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| NodeId::from_index(i).map(|id| (id, n)))
    }

    fn alloc(&mut self, node: TrieNode) -> NodeId {
        let id = NodeId::from_index(self.nodes.len()).expect("OID tree arena full");
        self.nodes.push(node);
        id
    }

    fn child_of(&self, parent: Option<NodeId>, arc: u32) -> Option<NodeId> {
        match parent {
            Some(p) => self.nodes[p.to_index()].children.get(&arc).copied(),
            None => self.roots.get(&arc).copied(),
        }
    }

    fn attach(&mut self, parent: Option<NodeId>, arc: u32, node: TrieNode) -> NodeId {
        let id = self.alloc(node);
        match parent {
            Some(p) => {
                self.nodes[p.to_index()].children.insert(arc, id);
            }
            None => {
                self.roots.insert(arc, id);
            }
        }
        id
    }

    /// Insert a node at `path`.
    ///
    /// Idempotent: an existing node is returned as-is, except that an
    /// unnamed placeholder adopts the offered name and a false table-entry
    /// marker may be raised to true. Missing intermediate arcs are handled
    /// per `policy`.
    pub fn insert(
        &mut self,
        path: &[u32],
        name: Option<StrId>,
        table_entry: bool,
        policy: OrphanPolicy,
    ) -> Result<NodeId, MibError> {
        let (&last, prefix) = path.split_last().ok_or(MibError::OrphanOid {
            path: Oid::default(),
        })?;

        // Locate (or synthesize) the parent chain.
        let mut parent: Option<NodeId> = None;
        for (depth, &arc) in prefix.iter().enumerate() {
            parent = match self.child_of(parent, arc) {
                Some(id) => Some(id),
                None => match policy {
                    OrphanPolicy::Reject => {
                        return Err(MibError::OrphanOid {
                            path: Oid::from_slice(path),
                        })
                    }
                    OrphanPolicy::Synthesize => {
                        let placeholder = TrieNode {
                            arc,
                            name: None,
                            table_entry: false,
                            parent,
                            children: BTreeMap::new(),
                            path: Oid::from_slice(&path[..=depth]),
                        };
                        Some(self.attach(parent, arc, placeholder))
                    }
                },
            };
        }

        if let Some(existing) = self.child_of(parent, last) {
            let node = &mut self.nodes[existing.to_index()];
            if node.name.is_none() {
                node.name = name;
            }
            node.table_entry |= table_entry;
            return Ok(existing);
        }

        let node = TrieNode {
            arc: last,
            name,
            table_entry,
            parent,
            children: BTreeMap::new(),
            path: Oid::from_slice(path),
        };
        Ok(self.attach(parent, last, node))
    }

    /// Exact-match lookup: every arc must exist and the node found must sit
    /// at the full depth of the query.
    #[must_use]
    pub fn find(&self, path: &[u32]) -> Option<NodeId> {
        let mut current: Option<NodeId> = None;
        for &arc in path {
            current = Some(self.child_of(current, arc)?);
        }
        current
    }

    /// Deepest-ancestor lookup: descend while arcs exist and return the
    /// deepest node reached, even when shorter than the query. `None` when
    /// not even the first arc matches.
    #[must_use]
    pub fn search(&self, path: &[u32]) -> Option<NodeId> {
        let mut current: Option<NodeId> = None;
        for &arc in path {
            match self.child_of(current, arc) {
                Some(next) => current = Some(next),
                None => break,
            }
        }
        current
    }

    /// The nearest self-or-ancestor flagged as a table entry.
    #[must_use]
    pub fn table_entry_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.get(node_id)?;
            if node.table_entry {
                return Some(node_id);
            }
            current = node.parent;
        }
        None
    }
}
