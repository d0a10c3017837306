//! String interner owned by the store.
//!
//! One interner lives for the duration of a load batch and ends up inside the
//! finished store; there is no process-wide interning. Short strings (names,
//! enum labels) are deduplicated; longer ones are appended verbatim.

use super::ids::StrId;
use std::collections::BTreeMap;

/// Strings shorter than this are deduplicated through a lookup table.
const DEDUP_LIMIT: usize = 64;

/// Append-only string storage with stable [`StrId`]s.
#[derive(Clone, Debug)]
pub struct StringInterner {
    /// Concatenated string bytes.
    data: String,
    /// `offsets[i]..offsets[i + 1]` is the extent of string `i`.
    offsets: Vec<u32>,
    /// Dedup table for short strings.
    dedup: BTreeMap<String, StrId>,
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl StringInterner {
    /// Create an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: String::new(),
            offsets: vec![0],
            dedup: BTreeMap::new(),
        }
    }

    /// Intern a string and return its id.
    pub fn intern(&mut self, s: &str) -> StrId {
        if s.len() < DEDUP_LIMIT {
            if let Some(&id) = self.dedup.get(s) {
                return id;
            }
        }

        self.data.push_str(s);
        self.offsets
            .push(u32::try_from(self.data.len()).expect("interner data overflow"));
        let id = StrId::from_index(self.offsets.len() - 2).expect("interner full");

        if s.len() < DEDUP_LIMIT {
            self.dedup.insert(s.to_owned(), id);
        }
        id
    }

    /// Resolve an id back to its string.
    #[must_use]
    pub fn get(&self, id: StrId) -> &str {
        let idx = id.to_index();
        let start = self.offsets[idx] as usize;
        let end = self.offsets[idx + 1] as usize;
        &self.data[start..end]
    }

    /// Find the id of an already-interned string.
    ///
    /// Short strings hit the dedup table; anything else falls back to a
    /// linear scan.
    #[must_use]
    pub fn find(&self, s: &str) -> Option<StrId> {
        if s.len() < DEDUP_LIMIT {
            if let Some(&id) = self.dedup.get(s) {
                return Some(id);
            }
            // Dedup table may be absent after deserialization.
            if !self.dedup.is_empty() {
                return None;
            }
        }
        (0..self.len())
            .filter_map(StrId::from_index)
            .find(|&id| self.get(id) == s)
    }

    /// Number of interned strings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Whether no strings have been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decompose into raw `(data, offsets)` for serialization.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<u32>) {
        (self.data, self.offsets)
    }

    /// Rebuild from raw parts.
    ///
    /// The dedup table is also rebuilt so that [`find`](Self::find) keeps its
    /// fast path after a cache load.
    #[must_use]
    pub fn from_parts(data: String, offsets: Vec<u32>) -> Self {
        let mut interner = Self {
            data,
            offsets,
            dedup: BTreeMap::new(),
        };
        for idx in 0..interner.len() {
            if let Some(id) = StrId::from_index(idx) {
                let s = interner.get(id);
                if s.len() < DEDUP_LIMIT && !interner.dedup.contains_key(s) {
                    let owned = s.to_owned();
                    interner.dedup.insert(owned, id);
                }
            }
        }
        interner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_get() {
        let mut i = StringInterner::new();
        let id = i.intern("sysDescr");
        assert_eq!(i.get(id), "sysDescr");
    }

    #[test]
    fn test_dedup_short() {
        let mut i = StringInterner::new();
        let a = i.intern("ifIndex");
        let b = i.intern("ifIndex");
        assert_eq!(a, b);
        assert_eq!(i.len(), 1);
    }

    #[test]
    fn test_long_not_deduped() {
        let mut i = StringInterner::new();
        let long = "y".repeat(80);
        let a = i.intern(&long);
        let b = i.intern(&long);
        assert_ne!(a, b);
    }

    #[test]
    fn test_find() {
        let mut i = StringInterner::new();
        let id = i.intern("enterprises");
        assert_eq!(i.find("enterprises"), Some(id));
        assert_eq!(i.find("unknown"), None);
    }

    #[test]
    fn test_parts_round_trip() {
        let mut i = StringInterner::new();
        let a = i.intern("iso");
        let (data, offsets) = i.into_parts();

        let rebuilt = StringInterner::from_parts(data, offsets);
        assert_eq!(rebuilt.get(a), "iso");
        assert_eq!(rebuilt.find("iso"), Some(a));
    }

    #[test]
    fn test_empty_string() {
        let mut i = StringInterner::new();
        let id = i.intern("");
        assert_eq!(i.get(id), "");
    }
}
