//! Object identifier representation.

use std::fmt::{self, Write};
use std::str::FromStr;

/// A numeric object identifier: a sequence of non-negative integer arcs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Oid {
    arcs: Vec<u32>,
}

/// Error parsing dotted notation.
#[derive(Debug, thiserror::Error)]
#[error("invalid object identifier {0:?}")]
pub struct ParseOidError(pub String);

impl Oid {
    /// Create an OID from a vector of arcs.
    #[must_use]
    pub fn new(arcs: Vec<u32>) -> Self {
        Self { arcs }
    }

    /// Create an OID from a slice of arcs.
    #[must_use]
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: arcs.to_vec(),
        }
    }

    /// The arcs as a slice.
    #[must_use]
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Number of arcs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Whether the OID has no arcs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// The last arc, if any.
    #[must_use]
    pub fn last_arc(&self) -> Option<u32> {
        self.arcs.last().copied()
    }

    /// All arcs except the last; `None` for empty and single-arc OIDs.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.arcs.len() <= 1 {
            None
        } else {
            Some(Self::from_slice(&self.arcs[..self.arcs.len() - 1]))
        }
    }

    /// A new OID with `arc` appended.
    #[must_use]
    pub fn child(&self, arc: u32) -> Self {
        let mut arcs = Vec::with_capacity(self.arcs.len() + 1);
        arcs.extend_from_slice(&self.arcs);
        arcs.push(arc);
        Self::new(arcs)
    }

    /// Append an arc in place.
    pub fn push(&mut self, arc: u32) {
        self.arcs.push(arc);
    }

    /// Whether `self` is a prefix of `other`.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.arcs.starts_with(&self.arcs)
    }

    /// Dotted notation, e.g. `1.3.6.1.2.1`.
    #[must_use]
    pub fn to_dotted(&self) -> String {
        let mut out = String::with_capacity(self.arcs.len() * 4);
        for (i, arc) in self.arcs.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            let _ = write!(out, "{arc}");
        }
        out
    }
}

impl FromStr for Oid {
    type Err = ParseOidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::default());
        }
        let arcs: Result<Vec<u32>, _> = s
            .trim_start_matches('.')
            .split('.')
            .map(str::parse)
            .collect();
        arcs.map(Self::new).map_err(|_| ParseOidError(s.to_owned()))
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}

impl From<Vec<u32>> for Oid {
    fn from(arcs: Vec<u32>) -> Self {
        Self::new(arcs)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}
