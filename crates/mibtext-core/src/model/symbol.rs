//! Module-qualified symbol names.

use std::fmt;

/// A qualified name: `module.name`.
///
/// Every cross-reference in a batch is anchored by one of these. A symbol
/// without a module part is a bare identifier still awaiting qualification
/// against the enclosing module's import table; two symbols are equal only
/// when both parts match.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Symbol {
    module: Option<String>,
    name: String,
}

impl Symbol {
    /// A symbol with an explicit module part.
    #[must_use]
    pub fn qualified(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            name: name.into(),
        }
    }

    /// A bare symbol, to be qualified lazily.
    #[must_use]
    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            module: None,
            name: name.into(),
        }
    }

    /// The module part, if qualified.
    #[must_use]
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// The identifier part.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the module part is present.
    #[must_use]
    pub fn is_qualified(&self) -> bool {
        self.module.is_some()
    }

    /// Return a qualified copy, filling a missing module part with
    /// `default_module`. An already-qualified symbol is returned as-is.
    #[must_use]
    pub fn qualify(&self, default_module: &str) -> Self {
        match &self.module {
            Some(_) => self.clone(),
            None => Self::qualified(default_module, self.name.clone()),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.module {
            Some(module) => write!(f, "{module}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_needs_both_parts() {
        let a = Symbol::qualified("IF-MIB", "ifIndex");
        let b = Symbol::qualified("IF-MIB", "ifIndex");
        let c = Symbol::qualified("OTHER-MIB", "ifIndex");
        let d = Symbol::unqualified("ifIndex");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[test]
    fn test_qualify() {
        let bare = Symbol::unqualified("ifIndex");
        let full = bare.qualify("IF-MIB");
        assert_eq!(full, Symbol::qualified("IF-MIB", "ifIndex"));

        // Already qualified: untouched.
        assert_eq!(full.qualify("OTHER-MIB"), full);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Symbol::qualified("SNMPv2-TC", "DisplayString").to_string(),
            "SNMPv2-TC.DisplayString"
        );
        assert_eq!(Symbol::unqualified("sysDescr").to_string(), "sysDescr");
    }
}
