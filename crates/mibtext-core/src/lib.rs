//! mibtext-core: compile MIB modules into a queryable model and translate
//! protocol values to and from human-readable text.
//!
//! The pipeline:
//!
//! ```text
//! module source → front end (external) → ParseNode tree
//!     → ModuleWalker → ModuleDecls → Loader::build → MibStore
//! ```
//!
//! The grammar front end is out of scope: any parser that produces the
//! generic visitable tree in [`ast`] plugs in. The [`resolver::Loader`]
//! seeds every batch with the SMI base declarations, walks user modules,
//! and resolves types, OID paths, table indexes and traps into an
//! immutable [`model::MibStore`] that is safe for concurrent reads.
//!
//! Runtime translation runs through the [`codec`] layer: per-syntax
//! format/parse/convert, enumerated name substitution, and the
//! display-hint interpreter for byte-buffer renderings. The store exposes
//! the two capability pairs adapters install into an SNMP stack —
//! OID↔text and value↔text — returning `None` wherever the model has no
//! answer so the embedder can fall back.
//!
//! This crate performs no I/O. Filesystem loading, skip lists and model
//! caching live in `mibtext-std`.

pub mod ast;
pub mod builder;
pub mod codec;
pub mod decl;
pub mod error;
pub mod model;
pub mod report;
pub mod resolver;

pub use codec::{CodecContext, HostResolver, NoResolver, Syntax, SyntaxRegistry};
pub use error::MibError;
pub use model::{MibStore, NodeId, Oid, OrphanPolicy, Symbol, SyntaxTag, Value};
pub use report::{LoadEvent, LoadReporter, NullReporter, Severity};
pub use resolver::Loader;
