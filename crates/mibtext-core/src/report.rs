//! Load reporting.
//!
//! The core never logs on its own: the loader and builder hand structured
//! events to an explicit [`LoadReporter`] owned by the batch. The default
//! [`NullReporter`] discards everything; `mibtext-std` ships an adapter
//! that forwards to `tracing`.

use crate::error::MibError;
use crate::model::Symbol;
use std::fmt;

/// How important an event is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Something was dropped or failed.
    Error,
    /// Something was skipped or degraded.
    Warn,
    /// Progress of a batch.
    Info,
    /// Per-declaration detail.
    Debug,
}

/// A resolution phase of the batch build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Tree walking and declaration collection.
    Walk,
    /// Declared-type to codec resolution.
    Types,
    /// OID path resolution and trie construction.
    Oids,
    /// Object metadata and index construction.
    Objects,
    /// Trap table construction.
    Traps,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Walk => f.write_str("walk"),
            Self::Types => f.write_str("types"),
            Self::Oids => f.write_str("oids"),
            Self::Objects => f.write_str("objects"),
            Self::Traps => f.write_str("traps"),
        }
    }
}

/// Structured events emitted during a load batch.
#[derive(Debug)]
pub enum LoadEvent<'a> {
    /// A module walk is starting.
    ModuleStart {
        /// Module name.
        name: &'a str,
    },
    /// A module walk finished.
    ModuleLoaded {
        /// Module name.
        name: &'a str,
        /// Number of collected declarations.
        definitions: usize,
    },
    /// A module was skipped entirely.
    ModuleSkipped {
        /// Module name.
        name: &'a str,
        /// Why it was skipped.
        reason: &'a str,
    },
    /// A single declaration was dropped.
    Problem {
        /// Enclosing module, when known.
        module: Option<&'a str>,
        /// What went wrong.
        error: &'a MibError,
    },
    /// A symbol was still unresolved when the batch finished.
    Unresolved {
        /// The dangling reference.
        symbol: &'a Symbol,
    },
    /// A resolution phase is starting.
    PhaseStart {
        /// The phase.
        phase: Phase,
    },
    /// A resolution phase finished.
    PhaseEnd {
        /// The phase.
        phase: Phase,
    },
}

impl fmt::Display for LoadEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModuleStart { name } => write!(f, "loading module {name}"),
            Self::ModuleLoaded { name, definitions } => {
                write!(f, "loaded module {name} ({definitions} definitions)")
            }
            Self::ModuleSkipped { name, reason } => {
                write!(f, "skipping module {name}: {reason}")
            }
            Self::Problem {
                module: Some(m),
                error,
            } => write!(f, "{m}: {error}"),
            Self::Problem {
                module: None,
                error,
            } => write!(f, "{error}"),
            Self::Unresolved { symbol } => write!(f, "unresolved reference {symbol}"),
            Self::PhaseStart { phase } => write!(f, "phase {phase} started"),
            Self::PhaseEnd { phase } => write!(f, "phase {phase} finished"),
        }
    }
}

/// Sink for load events.
pub trait LoadReporter {
    /// Receive one event.
    fn report(&mut self, severity: Severity, event: LoadEvent<'_>);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullReporter;

impl LoadReporter for NullReporter {
    fn report(&mut self, _severity: Severity, _event: LoadEvent<'_>) {}
}

/// Collects event renderings; handy in tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryReporter {
    /// Rendered `(severity, message)` pairs in arrival order.
    pub events: Vec<(Severity, String)>,
}

impl LoadReporter for MemoryReporter {
    fn report(&mut self, severity: Severity, event: LoadEvent<'_>) {
        self.events.push((severity, event.to_string()));
    }
}
