//! SIZE/VALUE/FROM constraints.
//!
//! Constraints do double duty: they validate declared values, and the SIZE
//! form drives index decomposition by slicing the leading elements of an OID
//! tail that belong to one column (§ index resolution).

use crate::error::MibError;

/// Which clause a constraint came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstraintKind {
    /// `SIZE (…)` — byte-length restriction.
    Size,
    /// Plain value range, e.g. `INTEGER (0..2147483647)`.
    Value,
    /// `FROM (…)` — character repertoire restriction.
    From,
}

/// One range inside a constraint. `None` bounds are MIN/MAX.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintRange {
    /// Lower bound; `None` is open (MIN).
    pub min: Option<i64>,
    /// Upper bound; `None` is open (MAX).
    pub max: Option<i64>,
}

impl ConstraintRange {
    /// A single-value range.
    #[must_use]
    pub fn single(v: i64) -> Self {
        Self {
            min: Some(v),
            max: Some(v),
        }
    }

    /// A bounded `min..max` range.
    #[must_use]
    pub fn bounded(min: i64, max: i64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Whether the range pins exactly one value.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        matches!((self.min, self.max), (Some(a), Some(b)) if a == b)
    }

    /// The pinned value of a fixed range.
    #[must_use]
    pub fn fixed_value(&self) -> Option<i64> {
        if self.is_fixed() {
            self.min
        } else {
            None
        }
    }

    /// Whether `v` falls inside the range.
    #[must_use]
    pub fn contains(&self, v: i64) -> bool {
        self.min.is_none_or(|lo| v >= lo) && self.max.is_none_or(|hi| v <= hi)
    }
}

/// An ordered set of ranges under one clause kind.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Constraint {
    /// The clause kind.
    pub kind: ConstraintKind,
    /// Ranges in declaration order. Never empty.
    pub ranges: Vec<ConstraintRange>,
}

impl Constraint {
    /// Build a constraint, rejecting empty range lists and inverted ranges.
    pub fn new(kind: ConstraintKind, ranges: Vec<ConstraintRange>) -> Result<Self, MibError> {
        if ranges.is_empty() {
            return Err(MibError::InvalidConstraint("no ranges".into()));
        }
        for r in &ranges {
            if let (Some(lo), Some(hi)) = (r.min, r.max) {
                if lo > hi {
                    return Err(MibError::InvalidConstraint(format!(
                        "inverted range {lo}..{hi}"
                    )));
                }
            }
        }
        Ok(Self { kind, ranges })
    }

    /// A size constraint pinning one length.
    pub fn fixed_size(n: i64) -> Self {
        Self {
            kind: ConstraintKind::Size,
            ranges: vec![ConstraintRange::single(n)],
        }
    }

    /// A size constraint spanning `min..max`.
    pub fn size_range(min: i64, max: i64) -> Self {
        Self {
            kind: ConstraintKind::Size,
            ranges: vec![ConstraintRange::bounded(min, max)],
        }
    }

    /// A value constraint spanning `min..max`.
    pub fn value_range(min: i64, max: i64) -> Self {
        Self {
            kind: ConstraintKind::Value,
            ranges: vec![ConstraintRange::bounded(min, max)],
        }
    }

    /// True when the constrained size is not a single fixed length: more
    /// than one range, or one non-fixed range. Variable-size index columns
    /// are length-prefixed in instance OIDs.
    #[must_use]
    pub fn is_variable_size(&self) -> bool {
        self.ranges.len() > 1 || !self.ranges[0].is_fixed()
    }

    /// Whether `v` satisfies any range.
    #[must_use]
    pub fn contains(&self, v: i64) -> bool {
        self.ranges.iter().any(|r| r.contains(v))
    }

    /// Slice the leading elements of `tail` that belong to one index column.
    ///
    /// Returns `(content, remainder)`:
    /// - non-SIZE kinds consume exactly one element;
    /// - a fixed SIZE consumes the first range length that fits the
    ///   remaining tail;
    /// - a variable SIZE reads the first element as a length prefix and
    ///   consumes that many following elements (a zero prefix yields empty
    ///   content).
    ///
    /// `None` means no interpretation fits; the caller stops decomposing.
    #[must_use]
    pub fn extract<'a>(&self, tail: &'a [u32]) -> Option<(Vec<u32>, &'a [u32])> {
        if tail.is_empty() {
            return None;
        }
        match self.kind {
            ConstraintKind::Size if self.is_variable_size() => {
                let n = tail[0] as usize;
                if tail.len() < 1 + n {
                    return None;
                }
                Some((tail[1..=n].to_vec(), &tail[1 + n..]))
            }
            ConstraintKind::Size => {
                let n = self
                    .ranges
                    .iter()
                    .filter_map(ConstraintRange::fixed_value)
                    .filter_map(|v| usize::try_from(v).ok())
                    .find(|&n| n <= tail.len())?;
                Some((tail[..n].to_vec(), &tail[n..]))
            }
            ConstraintKind::Value | ConstraintKind::From => {
                Some((vec![tail[0]], &tail[1..]))
            }
        }
    }
}
