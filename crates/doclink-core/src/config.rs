//! Caller-supplied schema data the builder and parser treat as configuration
//! rather than hard-coding, per the open question in the design notes: the
//! list of symbol-kind identifiers recognized as kind-only disambiguators is
//! owned by an upstream symbol-graph schema.

use std::collections::HashSet;

/// The set of symbol-kind identifiers the link parser treats as kind
/// disambiguators (e.g. the `struct` in `S-struct`).
///
/// `SymbolKindTable::default()` covers the common Swift-ish kinds; a
/// collaborator with a different upstream schema extends or replaces it
/// rather than forking the parser.
#[derive(Debug, Clone)]
pub struct SymbolKindTable {
    kinds: HashSet<String>,
}

impl SymbolKindTable {
    /// An empty table that recognizes no kind identifiers.
    pub fn empty() -> Self {
        Self {
            kinds: HashSet::new(),
        }
    }

    /// Register an additional kind identifier.
    pub fn insert(&mut self, kind: impl Into<String>) -> &mut Self {
        self.kinds.insert(kind.into());
        self
    }

    /// Register several kind identifiers at once.
    pub fn extend(&mut self, kinds: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        for kind in kinds {
            self.kinds.insert(kind.into());
        }
        self
    }

    /// Whether `text` is a recognized kind identifier.
    pub fn contains(&self, text: &str) -> bool {
        self.kinds.contains(text)
    }

    /// Number of registered kind identifiers.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl Default for SymbolKindTable {
    /// The common Swift-ish kind identifiers a documentation compiler sees
    /// most often. Not exhaustive by design — extend via [`SymbolKindTable::insert`].
    fn default() -> Self {
        let mut table = Self::empty();
        table.extend([
            "module",
            "struct",
            "class",
            "enum",
            "protocol",
            "func",
            "property",
            "typealias",
            "init",
            "subscript",
            "operator",
            "associatedtype",
            "case",
            "extension",
        ]);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_recognizes_common_kinds() {
        let table = SymbolKindTable::default();
        assert!(table.contains("struct"));
        assert!(table.contains("func"));
        assert!(!table.contains("not-a-kind"));
    }

    #[test]
    fn empty_table_recognizes_nothing_until_extended() {
        let mut table = SymbolKindTable::empty();
        assert!(table.is_empty());
        table.insert("widget");
        assert!(table.contains("widget"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn extend_adds_several_at_once() {
        let mut table = SymbolKindTable::empty();
        table.extend(["a", "b", "c"]);
        assert_eq!(table.len(), 3);
    }
}
