//! Error taxonomy for module loading and value translation.
//!
//! Errors are scoped: module-level errors abort only the module that raised
//! them, assignment-level errors abort only that assignment, and codec errors
//! surface to the caller of the query API. Nothing here ever invalidates a
//! previously built [`MibStore`](crate::model::MibStore).

use crate::model::{Oid, Symbol};

/// Errors raised while compiling modules or translating values.
#[derive(Debug, thiserror::Error)]
pub enum MibError {
    /// A second module with the same name appeared in one load batch.
    /// The duplicate is skipped; the batch continues.
    #[error("duplicate module {0}")]
    DuplicatedModule(String),

    /// A symbol was declared twice within one module. The first
    /// declaration wins.
    #[error("duplicate symbol {0}")]
    DuplicatedSymbol(Symbol),

    /// An OID insert whose parent path is not present, under the
    /// rejecting orphan policy.
    #[error("orphan OID insert at {path}: parent path not present")]
    OrphanOid {
        /// The path that was offered for insertion.
        path: Oid,
    },

    /// A referenced symbol was never declared by any module in the batch.
    #[error("unresolved symbol {0}")]
    UnresolvedSymbol(Symbol),

    /// A SIZE/VALUE/FROM clause that cannot be interpreted.
    #[error("invalid constraint: {0}")]
    InvalidConstraint(String),

    /// A display hint string that does not match the clause grammar.
    #[error("malformed display hint {hint:?}: {reason}")]
    MalformedDisplayHint {
        /// The offending hint string.
        hint: String,
        /// What made it unparseable.
        reason: &'static str,
    },

    /// Index decomposition consumed every declared column but the OID
    /// tail still has elements left.
    #[error("{left} trailing index element(s) after {resolved} resolved column(s)")]
    TrailingIndexElements {
        /// Number of unconsumed tail elements.
        left: usize,
        /// Number of columns that were resolved.
        resolved: usize,
    },

    /// A module source with no module name token.
    #[error("module has no name")]
    MissingModuleName,

    /// A macro assignment missing a structurally required clause.
    /// Aborts only that assignment.
    #[error("bad assignment {symbol}: {reason}")]
    BadAssignment {
        /// The assignment target.
        symbol: Symbol,
        /// What was missing or inconsistent.
        reason: String,
    },

    /// The hint uses repeat or implicit-length clauses, which are
    /// format-only. Parsing them back into bytes is not implemented.
    #[error("display hint {hint:?} cannot be parsed in reverse")]
    UnsupportedHintParse {
        /// The hint string.
        hint: String,
    },

    /// Text that does not parse as a value of the expected syntax.
    #[error("cannot parse {text:?} as {expected}")]
    BadValue {
        /// The rejected input.
        text: String,
        /// Human name of the expected form.
        expected: &'static str,
    },
}
