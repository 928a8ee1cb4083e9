//! The node arena: a tagged variant over symbol and non-symbol entities,
//! addressed by index rather than by reference, so that `parent` and
//! `counterpart` back-edges never need to own the node they point at.

use std::collections::HashMap;

use crate::container::DisambiguationContainer;
use crate::identifier::Identifier;
use crate::interner::InternedStr;

/// Index of a node within a [`crate::hierarchy::Hierarchy`]'s arena.
///
/// Every node — findable or sparse — has a `NodeId`. Only findable nodes
/// additionally carry an [`Identifier`]. Modeling `parent`/`counterpart` as
/// indices rather than references avoids the reference cycle implicit in an
/// object-graph model of a bidirectional tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Public so collaborator crates can build test fixtures (e.g.
    /// [`crate::container::Element`] values) without going through a
    /// `Hierarchy`'s allocator.
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Declaration fragments and precise-id metadata for a symbol node.
#[derive(Debug, Clone)]
pub struct SymbolData {
    pub precise_id: String,
    pub interface_language: String,
    pub kind_id: String,
    pub declaration_fragments: Vec<String>,
    pub parameter_types: Option<Vec<String>>,
    pub return_types: Option<Vec<String>>,
}

/// What kind of addressable entity a node represents.
///
/// The original design conflates symbols and non-symbols into one node
/// shape; this tagged variant keeps them distinct per the design notes.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Symbol(SymbolData),
    Article,
    Tutorial,
    Landmark,
    TaskGroup,
    Anchor,
    SparsePlaceholder,
}

impl NodeKind {
    pub fn is_symbol(&self) -> bool {
        matches!(self, NodeKind::Symbol(_))
    }

    pub fn is_sparse_placeholder(&self) -> bool {
        matches!(self, NodeKind::SparsePlaceholder)
    }

    pub fn symbol(&self) -> Option<&SymbolData> {
        match self {
            NodeKind::Symbol(data) => Some(data),
            _ => None,
        }
    }

    pub fn kind_id(&self) -> Option<&str> {
        self.symbol().map(|s| s.kind_id.as_str())
    }
}

/// Bitset of behaviors that modify how a node participates in collision
/// resolution and curation, without needing a new boolean field per flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecialBehaviors(u8);

impl SpecialBehaviors {
    pub const NONE: SpecialBehaviors = SpecialBehaviors(0);
    pub const DISFAVOR_IN_COLLISION: SpecialBehaviors = SpecialBehaviors(1 << 0);
    pub const EXCLUDE_FROM_AUTOMATIC_CURATION: SpecialBehaviors = SpecialBehaviors(1 << 1);

    pub fn contains(self, flag: SpecialBehaviors) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn insert(&mut self, flag: SpecialBehaviors) {
        self.0 |= flag.0;
    }

    pub fn union(self, other: SpecialBehaviors) -> SpecialBehaviors {
        SpecialBehaviors(self.0 | other.0)
    }

    pub fn raw(self) -> u8 {
        self.0
    }

    pub fn from_raw(raw: u8) -> Self {
        SpecialBehaviors(raw)
    }
}

/// Insertion-ordered map from child name to its disambiguation container.
///
/// Ordering matters: the file representation must be deterministic given a
/// deterministic symbol-graph input, so children are iterated in the order
/// they were first inserted rather than hash order.
#[derive(Debug, Default)]
pub struct ChildTable {
    order: Vec<InternedStr>,
    containers: HashMap<InternedStr, DisambiguationContainer>,
}

impl ChildTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: InternedStr) -> Option<&DisambiguationContainer> {
        self.containers.get(&name)
    }

    pub fn get_mut(&mut self, name: InternedStr) -> Option<&mut DisambiguationContainer> {
        self.containers.get_mut(&name)
    }

    pub fn entry_or_insert(&mut self, name: InternedStr) -> &mut DisambiguationContainer {
        if !self.containers.contains_key(&name) {
            self.order.push(name);
            self.containers.insert(name, DisambiguationContainer::new());
        }
        self.containers.get_mut(&name).expect("just inserted")
    }

    pub fn remove(&mut self, name: InternedStr) -> Option<DisambiguationContainer> {
        self.order.retain(|n| *n != name);
        self.containers.remove(&name)
    }

    /// Iterate children in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (InternedStr, &DisambiguationContainer)> {
        self.order
            .iter()
            .map(move |name| (*name, self.containers.get(name).expect("tracked in order")))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// One addressable entity in the hierarchy: a symbol, an article, a
/// tutorial, a landmark, a task group, or a sparse placeholder preserving a
/// path chain whose owning symbol is absent.
#[derive(Debug)]
pub struct Node {
    pub name: InternedStr,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: ChildTable,
    pub counterpart: Option<NodeId>,
    pub identifier: Option<Identifier>,
    pub special_behaviors: SpecialBehaviors,
    pub bundle_id: Option<InternedStr>,
}

impl Node {
    pub fn new(name: InternedStr, kind: NodeKind) -> Self {
        Self {
            name,
            kind,
            parent: None,
            children: ChildTable::new(),
            counterpart: None,
            identifier: None,
            special_behaviors: SpecialBehaviors::NONE,
            bundle_id: None,
        }
    }

    pub fn is_findable(&self) -> bool {
        self.identifier.is_some()
    }
}
