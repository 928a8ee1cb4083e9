//! Per-name storage holding every entry that shares one child name. This is
//! the sole site where disambiguation suffixes are interpreted: a container
//! never holds two elements with the same `(kind, hash, parameter_types,
//! return_types)` tuple (invariant 5).

use crate::interner::InternedStr;
use crate::node::NodeId;

/// One entry in a [`DisambiguationContainer`].
#[derive(Debug, Clone)]
pub struct Element {
    pub node: NodeId,
    pub kind: Option<InternedStr>,
    pub hash: Option<InternedStr>,
    pub parameter_types: Option<Vec<InternedStr>>,
    pub return_types: Option<Vec<InternedStr>>,
}

impl Element {
    fn key_eq(&self, kind: Option<InternedStr>, hash: Option<InternedStr>) -> bool {
        self.kind == kind && self.hash == hash
    }

    /// Whether this element's disambiguation key exactly matches another's,
    /// i.e. whether inserting both would collide per invariant 5.
    fn collides_with(&self, other: &Element) -> bool {
        self.key_eq(other.kind, other.hash)
            && self.parameter_types == other.parameter_types
            && self.return_types == other.return_types
    }
}

/// Outcome of inserting into a container.
pub enum Insertion {
    /// No existing element shared the new one's key; it was added.
    Inserted,
    /// An existing element at index `existing` has the identical key; the
    /// caller must merge the two nodes (builder §4.1 "insertion rules").
    Collided { existing: usize },
}

/// All entries sharing one child name under a parent node.
#[derive(Debug, Default)]
pub struct DisambiguationContainer {
    elements: Vec<Element>,
}

impl DisambiguationContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Insert `element`, preserving first-insertion order. Returns
    /// [`Insertion::Collided`] rather than inserting when the exact key
    /// already exists, so the builder can merge the two nodes.
    pub fn insert(&mut self, element: Element) -> Insertion {
        if let Some(existing) = self.elements.iter().position(|e| e.collides_with(&element)) {
            return Insertion::Collided { existing };
        }
        self.elements.push(element);
        Insertion::Inserted
    }

    /// Elements whose `(kind, hash)` matches exactly (both sides, treating
    /// `None` as a wildcard only when the caller passes `None`).
    pub fn matching_kind_hash(
        &self,
        kind: Option<InternedStr>,
        hash: Option<InternedStr>,
    ) -> Vec<&Element> {
        self.elements
            .iter()
            .filter(|e| {
                (kind.is_none() || e.kind == kind) && (hash.is_none() || e.hash == hash)
            })
            .collect()
    }

    /// Elements whose parameter/return type signature matches; `None` in
    /// either side of the query acts as "unconstrained".
    pub fn matching_signature(
        &self,
        parameter_types: Option<&[InternedStr]>,
        return_types: Option<&[InternedStr]>,
    ) -> Vec<&Element> {
        self.elements
            .iter()
            .filter(|e| {
                let params_ok = match parameter_types {
                    None => true,
                    Some(wanted) => e.parameter_types.as_deref() == Some(wanted),
                };
                let returns_ok = match return_types {
                    None => true,
                    Some(wanted) => e.return_types.as_deref() == Some(wanted),
                };
                params_ok && returns_ok
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }
}
