//! The resolved model: identifiers, values, the trie and the store.
//!
//! ```text
//! Source → front end → ParseNode tree → builder → resolver → [MibStore]
//! ```
//!
//! Everything here is the *output* side of the pipeline: arena ids, the
//! store-owned interner, OIDs and symbols, protocol values, the OID trie,
//! index decomposition and the aggregate [`MibStore`].

mod ids;
mod index;
mod interner;
mod oid;
mod store;
mod symbol;
mod trie;
mod value;

pub use ids::{NodeId, StrId, SyntaxId};
pub use index::{Index, IndexColumnValue};
pub use interner::StringInterner;
pub use oid::{Oid, ParseOidError};
pub use store::{MibStore, ObjectInfo, StoreParts, Trap};
pub use symbol::Symbol;
pub use trie::{OidTree, OrphanPolicy, TrieNode};
pub use value::{SyntaxTag, Value};
