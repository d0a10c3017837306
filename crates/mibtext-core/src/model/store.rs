//! The immutable queryable store.
//!
//! A [`MibStore`] is what a finished load batch produces: the OID trie, the
//! codec registry, per-node object metadata and the trap table, behind the
//! query surface embedding adapters install into their protocol stack.
//! Once built it is never mutated; reloading builds a new instance.

use super::ids::{NodeId, StrId, SyntaxId};
use super::index::{Index, IndexColumnValue};
use super::interner::StringInterner;
use super::oid::Oid;
use super::symbol::Symbol;
use super::trie::OidTree;
use super::value::Value;
use crate::codec::{CodecContext, HostResolver, NoResolver, ResolvedSyntax, SyntaxRegistry};
use crate::decl::Constraint;
use crate::error::MibError;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

/// Metadata for a scalar, column or row node.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectInfo {
    /// The node's codec.
    pub syntax: SyntaxId,
    /// Effective constraint, after following the type reference chain.
    pub constraint: Option<Constraint>,
    /// Whether the node is a row template (has INDEX or AUGMENTS).
    pub indexed: bool,
    /// Resolved index columns, for row templates.
    pub index: Option<Index>,
    /// The augmented row, when the index is borrowed.
    pub augments: Option<NodeId>,
}

/// A named notification keyed by (enterprise node, specific number).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trap {
    /// Trap name.
    pub name: String,
    /// Variable names in declaration order.
    pub variables: Vec<String>,
}

/// The aggregate store. Safe for unsynchronized concurrent reads.
#[derive(Clone, Debug, Default)]
pub struct MibStore {
    pub(crate) trie: OidTree,
    pub(crate) strings: StringInterner,
    pub(crate) registry: SyntaxRegistry,
    pub(crate) name_index: BTreeMap<StrId, Vec<NodeId>>,
    pub(crate) node_syntax: BTreeMap<NodeId, SyntaxId>,
    pub(crate) objects: BTreeMap<NodeId, ObjectInfo>,
    pub(crate) traps: BTreeMap<NodeId, BTreeMap<i64, Trap>>,
    pub(crate) modules: BTreeSet<String>,
    pub(crate) unresolved: Vec<Symbol>,
}

impl MibStore {
    /// The OID trie.
    #[must_use]
    pub fn tree(&self) -> &OidTree {
        &self.trie
    }

    /// The interner holding node names.
    #[must_use]
    pub fn strings(&self) -> &StringInterner {
        &self.strings
    }

    /// The codec registry.
    #[must_use]
    pub fn registry(&self) -> &SyntaxRegistry {
        &self.registry
    }

    /// Names of every module in the batch, builtins included.
    #[must_use]
    pub fn modules(&self) -> &BTreeSet<String> {
        &self.modules
    }

    /// References that never resolved.
    #[must_use]
    pub fn unresolved(&self) -> &[Symbol] {
        &self.unresolved
    }

    /// A node's declared name.
    #[must_use]
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.trie.get(id)?.name.map(|s| self.strings.get(s))
    }

    /// All nodes declared under a name. Collisions across modules are
    /// possible, hence a list.
    #[must_use]
    pub fn nodes_by_name(&self, name: &str) -> Vec<NodeId> {
        self.strings
            .find(name)
            .and_then(|id| self.name_index.get(&id))
            .cloned()
            .unwrap_or_default()
    }

    /// The codec entry attached to a node.
    #[must_use]
    pub fn syntax_of(&self, id: NodeId) -> Option<&ResolvedSyntax> {
        self.node_syntax.get(&id).map(|&sid| self.registry.entry(sid))
    }

    /// Object metadata attached to a node.
    #[must_use]
    pub fn object(&self, id: NodeId) -> Option<&ObjectInfo> {
        self.objects.get(&id)
    }

    /// The resolved index of a row template.
    #[must_use]
    pub fn index_of(&self, id: NodeId) -> Option<&Index> {
        self.objects.get(&id)?.index.as_ref()
    }

    /// A trap by enterprise node and specific number.
    #[must_use]
    pub fn trap(&self, enterprise: NodeId, specific: i64) -> Option<&Trap> {
        self.traps.get(&enterprise)?.get(&specific)
    }

    /// Every trap registered under an enterprise node.
    #[must_use]
    pub fn traps_at(&self, enterprise: NodeId) -> Option<&BTreeMap<i64, Trap>> {
        self.traps.get(&enterprise)
    }

    // === OID text capability ===

    /// Render a numeric OID as `deepestName.suffix`. `None` when nothing
    /// along the path is named — the caller falls back to its previous
    /// formatter.
    #[must_use]
    pub fn format_oid(&self, oid: &[u32]) -> Option<String> {
        let deepest = self.trie.search(oid)?;

        // The deepest match may be an unnamed placeholder; back up to the
        // nearest named ancestor.
        let mut current = Some(deepest);
        let named = loop {
            let id = current?;
            let node = self.trie.node(id);
            if node.name.is_some() {
                break id;
            }
            current = node.parent;
        };

        let node = self.trie.node(named);
        let mut out = self.strings.get(node.name?).to_owned();
        for &arc in &oid[node.path.len()..] {
            let _ = write!(out, ".{arc}");
        }
        Some(out)
    }

    /// Parse `name.suffix` (or plain dotted) text into a numeric OID.
    #[must_use]
    pub fn parse_oid(&self, text: &str) -> Option<Vec<u32>> {
        let mut parts = text.trim().trim_start_matches('.').split('.');
        let first = parts.next()?;

        let mut path: Vec<u32> = Vec::new();
        if let Ok(arc) = first.parse::<u32>() {
            path.push(arc);
        } else {
            let candidates = self.nodes_by_name(first);
            let id = candidates.first()?;
            path.extend(self.trie.node(*id).path.arcs());
        }
        for part in parts {
            path.push(part.parse().ok()?);
        }
        Some(path)
    }

    // === Value text capability ===

    /// Render a value under the syntax of the closest known node. `None`
    /// when the OID is unknown or the node has no codec.
    #[must_use]
    pub fn format_value(&self, oid: &[u32], value: &Value) -> Option<String> {
        self.format_value_with(oid, value, &NoResolver)
    }

    /// [`format_value`](Self::format_value) with host resolution.
    #[must_use]
    pub fn format_value_with(
        &self,
        oid: &[u32],
        value: &Value,
        hosts: &dyn HostResolver,
    ) -> Option<String> {
        let id = self.trie.search(oid)?;
        let entry = self.syntax_of(id)?;
        let ctx = CodecContext::with_hosts(&self.registry, hosts);
        entry.syntax.format(value, &ctx)
    }

    /// Parse value text under the syntax of the closest known node.
    #[must_use]
    pub fn parse_value(&self, oid: &[u32], text: &str) -> Option<Value> {
        self.parse_value_with(oid, text, &NoResolver)
    }

    /// [`parse_value`](Self::parse_value) with host resolution.
    #[must_use]
    pub fn parse_value_with(
        &self,
        oid: &[u32],
        text: &str,
        hosts: &dyn HostResolver,
    ) -> Option<Value> {
        let id = self.trie.search(oid)?;
        let entry = self.syntax_of(id)?;
        let ctx = CodecContext::with_hosts(&self.registry, hosts);
        entry.syntax.parse(text, &ctx).ok()
    }

    // === Index decomposition ===

    /// Decompose an instance OID into its index column values.
    ///
    /// The deepest known node is matched first; its nearest table-entry
    /// ancestor supplies the column list. The decomposed tail starts after
    /// the matched node — when the match is the entry itself, the leading
    /// element is the column arc and is skipped.
    pub fn resolve_index(&self, oid: &[u32]) -> Result<Vec<IndexColumnValue>, MibError> {
        let not_instance = || MibError::BadValue {
            text: Oid::from_slice(oid).to_dotted(),
            expected: "table instance OID",
        };

        let deepest = self.trie.search(oid).ok_or_else(not_instance)?;
        let entry = self.trie.table_entry_of(deepest).ok_or_else(not_instance)?;
        let index = self.index_of(entry).ok_or_else(not_instance)?;

        let matched_len = self.trie.node(deepest).path.len().min(oid.len());
        let mut tail = &oid[matched_len..];
        if deepest == entry && !tail.is_empty() {
            tail = &tail[1..];
        }
        index.resolve(self, tail)
    }

    // === Serialization ===

    /// Decompose into serializable parts. Lookup indices are rebuilt on
    /// load.
    #[must_use]
    pub fn into_parts(self) -> StoreParts {
        let (strings_data, strings_offsets) = self.strings.into_parts();
        StoreParts {
            strings_data,
            strings_offsets,
            trie: self.trie,
            registry: self.registry,
            node_syntax: self.node_syntax,
            objects: self.objects,
            traps: self.traps,
            modules: self.modules,
            unresolved: self.unresolved,
        }
    }

    /// Clone-decompose into serializable parts.
    #[must_use]
    pub fn to_parts(&self) -> StoreParts {
        self.clone().into_parts()
    }

    /// Rebuild from parts, restoring the name index.
    #[must_use]
    pub fn from_parts(parts: StoreParts) -> Self {
        let mut store = Self {
            trie: parts.trie,
            strings: StringInterner::from_parts(parts.strings_data, parts.strings_offsets),
            registry: parts.registry,
            name_index: BTreeMap::new(),
            node_syntax: parts.node_syntax,
            objects: parts.objects,
            traps: parts.traps,
            modules: parts.modules,
            unresolved: parts.unresolved,
        };
        store.rebuild_name_index();
        store
    }

    pub(crate) fn rebuild_name_index(&mut self) {
        self.name_index.clear();
        let mut index: BTreeMap<StrId, Vec<NodeId>> = BTreeMap::new();
        for (id, node) in self.trie.iter() {
            if let Some(name) = node.name {
                index.entry(name).or_default().push(id);
            }
        }
        self.name_index = index;
    }
}

/// Decomposed store for serialization. The name index is derived data and
/// not carried.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StoreParts {
    /// Interner data.
    pub strings_data: String,
    /// Interner offsets.
    pub strings_offsets: Vec<u32>,
    /// The trie.
    pub trie: OidTree,
    /// The codec registry.
    pub registry: SyntaxRegistry,
    /// Node → codec bindings.
    pub node_syntax: BTreeMap<NodeId, SyntaxId>,
    /// Node → object metadata.
    pub objects: BTreeMap<NodeId, ObjectInfo>,
    /// Enterprise node → specific number → trap.
    pub traps: BTreeMap<NodeId, BTreeMap<i64, Trap>>,
    /// Module names.
    pub modules: BTreeSet<String>,
    /// Dangling references.
    pub unresolved: Vec<Symbol>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_store_is_share_safe() {
        assert_send_sync::<MibStore>();
    }

    #[test]
    fn test_empty_store_answers_nothing() {
        let store = MibStore::default();
        assert!(store.format_oid(&[1, 3, 6]).is_none());
        assert!(store.parse_oid("sysDescr.0").is_none());
        assert!(store.format_value(&[1, 3], &Value::Integer(1)).is_none());
    }

    #[test]
    fn test_parse_oid_plain_numeric() {
        let store = MibStore::default();
        assert_eq!(
            store.parse_oid("1.3.6.1"),
            Some(vec![1, 3, 6, 1]),
            "numeric OIDs need no model"
        );
    }
}
