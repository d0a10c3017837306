//! Skip lists.
//!
//! A line-oriented resource naming modules that should not be loaded: one
//! entry per line, either `moduleName` or `rfcIdentifier:moduleName`.
//! `#` starts a comment; blank lines are ignored.

/// One skip entry.
#[derive(Clone, Debug, PartialEq, Eq)]
struct SkipEntry {
    /// Restricts the entry to modules extracted from one archive document.
    origin: Option<String>,
    /// The module name.
    module: String,
}

/// A parsed skip list.
#[derive(Clone, Debug, Default)]
pub struct SkipList {
    entries: Vec<SkipEntry>,
}

impl SkipList {
    /// Parse skip-list text. Unparseable lines are ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut entries = Vec::new();
        for line in text.lines() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            match line.split_once(':') {
                Some((origin, module)) => entries.push(SkipEntry {
                    origin: Some(origin.trim().to_owned()),
                    module: module.trim().to_owned(),
                }),
                None => entries.push(SkipEntry {
                    origin: None,
                    module: line.to_owned(),
                }),
            }
        }
        Self { entries }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a module is skipped regardless of origin.
    #[must_use]
    pub fn matches(&self, module: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.origin.is_none() && e.module == module)
    }

    /// Whether a module coming out of `origin` is skipped — either by a
    /// plain entry or an origin-qualified one.
    #[must_use]
    pub fn matches_origin(&self, origin: &str, module: &str) -> bool {
        self.entries.iter().any(|e| {
            e.module == module && e.origin.as_deref().map_or(true, |o| o == origin)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# modules that crash the vendor agent
BROKEN-MIB
rfc1213:RFC1213-MIB   # only the archive copy
   \n\
SPACED-MIB
";

    #[test]
    fn test_parse_ignores_comments_and_blanks() {
        let list = SkipList::parse(SAMPLE);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_plain_entry() {
        let list = SkipList::parse(SAMPLE);
        assert!(list.matches("BROKEN-MIB"));
        assert!(list.matches("SPACED-MIB"));
        assert!(!list.matches("IF-MIB"));
    }

    #[test]
    fn test_origin_qualified_entry() {
        let list = SkipList::parse(SAMPLE);
        assert!(!list.matches("RFC1213-MIB"), "qualified entry is origin-bound");
        assert!(list.matches_origin("rfc1213", "RFC1213-MIB"));
        assert!(!list.matches_origin("rfc9999", "RFC1213-MIB"));
        // Plain entries match under any origin.
        assert!(list.matches_origin("rfc1213", "BROKEN-MIB"));
    }

    #[test]
    fn test_empty_list() {
        let list = SkipList::parse("# nothing but comments\n");
        assert!(list.is_empty());
        assert!(!list.matches("ANY-MIB"));
    }
}
