//! Declared types and constraints.
//!
//! What the builder collects before resolution: structural type
//! declarations with their constraints and named numbers. The resolver
//! turns these into concrete codecs.

mod constraint;
mod types;

pub use constraint::{Constraint, ConstraintKind, ConstraintRange};
pub use types::{DeclaredKind, DeclaredType, ScalarKind};
