//! The path hierarchy: an index-addressed arena of nodes plus the module,
//! article and tutorial roots and the identifier lookup table.

use std::collections::HashMap;

use doclink_error::{Error, ErrorKind};

use crate::container::{DisambiguationContainer, Element, Insertion};
use crate::identifier::{next_epoch, Identifier};
use crate::interner::{InternPool, InternedStr};
use crate::node::{Node, NodeId, NodeKind, SpecialBehaviors};

/// An invariant violation surfaced by [`Hierarchy::check_invariants`].
///
/// Construction itself never fails (§4.1 "Failure semantics") — these are
/// only raised by the debug-time self-check tests exercise, mirroring the
/// source's debug-build assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
    IdentifierNotInLookup { node: NodeId },
    LookupPointsToWrongNode { identifier: Identifier },
    ChildParentMismatch { parent: NodeId, child: NodeId },
    CounterpartNotMutual { node: NodeId },
    DuplicateContainerKey { parent: NodeId, name: InternedStr },
}

impl std::fmt::Display for HierarchyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HierarchyError::IdentifierNotInLookup { node } => {
                write!(f, "node {node:?} has an identifier absent from lookup")
            }
            HierarchyError::LookupPointsToWrongNode { identifier } => {
                write!(f, "lookup entry for {identifier:?} points at a node whose own identifier differs")
            }
            HierarchyError::ChildParentMismatch { parent, child } => {
                write!(f, "child {child:?} of {parent:?} does not point back via parent/counterpart")
            }
            HierarchyError::CounterpartNotMutual { node } => {
                write!(f, "node {node:?}'s counterpart does not point back to it")
            }
            HierarchyError::DuplicateContainerKey { parent, name } => {
                write!(f, "parent {parent:?} has a duplicate disambiguation key under child name {name:?}")
            }
        }
    }
}

impl std::error::Error for HierarchyError {}

impl From<HierarchyError> for Error {
    fn from(err: HierarchyError) -> Self {
        Error::new(ErrorKind::InvariantViolation, err.to_string())
            .with_operation("hierarchy::check_invariants")
    }
}

/// Owns every node and the roots a resolver descends from.
pub struct Hierarchy {
    interner: InternPool,
    epoch: u64,
    nodes: Vec<Node>,
    modules: HashMap<InternedStr, NodeId>,
    articles_container: NodeId,
    tutorial_container: NodeId,
    tutorial_overview_container: NodeId,
    lookup: HashMap<Identifier, NodeId>,
}

impl Hierarchy {
    /// Create an empty hierarchy with its three synthetic roots already
    /// materialized as sparse placeholders (step 7 of §4.1 runs this once
    /// the symbol graphs are placed; an empty hierarchy still needs roots
    /// to exist so the resolver always has somewhere to start descending).
    pub fn new(interner: InternPool) -> Self {
        let mut hierarchy = Self {
            interner: interner.clone(),
            epoch: next_epoch(),
            nodes: Vec::new(),
            modules: HashMap::new(),
            articles_container: NodeId::new(0),
            tutorial_container: NodeId::new(0),
            tutorial_overview_container: NodeId::new(0),
            lookup: HashMap::new(),
        };
        let articles = hierarchy.alloc_node(interner.intern("articles"), NodeKind::SparsePlaceholder);
        let tutorials = hierarchy.alloc_node(interner.intern("tutorials"), NodeKind::SparsePlaceholder);
        let tutorial_overview =
            hierarchy.alloc_node(interner.intern("tutorial-overview"), NodeKind::SparsePlaceholder);
        hierarchy.articles_container = articles;
        hierarchy.tutorial_container = tutorials;
        hierarchy.tutorial_overview_container = tutorial_overview;
        hierarchy
    }

    /// Create a hierarchy with no nodes at all, not even the three synthetic
    /// roots — only [`crate::file_repr::decode`] uses this, since it
    /// reconstructs every node (roots included) from the serialized form and
    /// would otherwise end up with duplicate root placeholders.
    pub(crate) fn empty_for_decode(interner: InternPool) -> Self {
        Self {
            interner,
            epoch: next_epoch(),
            nodes: Vec::new(),
            modules: HashMap::new(),
            articles_container: NodeId::new(0),
            tutorial_container: NodeId::new(0),
            tutorial_overview_container: NodeId::new(0),
            lookup: HashMap::new(),
        }
    }

    /// Repoint the three synthetic roots at decoded indices, used by
    /// [`crate::file_repr::decode`] once every node is allocated.
    pub(crate) fn set_roots(
        &mut self,
        articles_container: NodeId,
        tutorial_container: NodeId,
        tutorial_overview_container: NodeId,
    ) {
        self.articles_container = articles_container;
        self.tutorial_container = tutorial_container;
        self.tutorial_overview_container = tutorial_overview_container;
    }

    pub fn interner(&self) -> &InternPool {
        &self.interner
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn articles_container(&self) -> NodeId {
        self.articles_container
    }

    pub fn tutorial_container(&self) -> NodeId {
        self.tutorial_container
    }

    pub fn tutorial_overview_container(&self) -> NodeId {
        self.tutorial_overview_container
    }

    pub fn module(&self, name: InternedStr) -> Option<NodeId> {
        self.modules.get(&name).copied()
    }

    pub fn modules(&self) -> impl Iterator<Item = (InternedStr, NodeId)> + '_ {
        self.modules.iter().map(|(k, v)| (*k, *v))
    }

    pub fn module_or_create(&mut self, name: InternedStr) -> NodeId {
        if let Some(id) = self.modules.get(&name) {
            return *id;
        }
        let id = self.alloc_node(
            name,
            NodeKind::Symbol(crate::node::SymbolData {
                precise_id: String::new(),
                interface_language: String::new(),
                kind_id: "module".to_string(),
                declaration_fragments: Vec::new(),
                parameter_types: None,
                return_types: None,
            }),
        );
        self.modules.insert(name, id);
        id
    }

    /// Repoint the `modules` root for `name` at `id` directly, used by
    /// [`crate::file_repr::decode`] once nodes are allocated up front.
    pub fn set_module_index(&mut self, name: InternedStr, id: NodeId) {
        self.modules.insert(name, id);
    }

    pub fn alloc_node(&mut self, name: InternedStr, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Node::new(name, kind));
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn lookup(&self, identifier: Identifier) -> Option<NodeId> {
        self.lookup.get(&identifier).copied()
    }

    pub fn link_counterpart(&mut self, a: NodeId, b: NodeId) {
        self.nodes[a.index()].counterpart = Some(b);
        self.nodes[b.index()].counterpart = Some(a);
    }

    /// Insert `child` under `parent`'s child-name container, wiring
    /// `child.parent` to `parent` on success. Returns the container's
    /// [`Insertion`] outcome so the builder can perform a merge on collision
    /// instead of silently overwriting (§4.1 "insertion rules").
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        name: InternedStr,
        child: NodeId,
        element: Element,
    ) -> Insertion {
        let outcome = self
            .nodes[parent.index()]
            .children
            .entry_or_insert(name)
            .insert(element);
        if matches!(outcome, Insertion::Inserted) {
            self.nodes[child.index()].parent = Some(parent);
        }
        outcome
    }

    pub fn container(&self, parent: NodeId, name: InternedStr) -> Option<&DisambiguationContainer> {
        self.nodes[parent.index()].children.get(name)
    }

    /// Assign a fresh identifier to `node`, registering it in `lookup`.
    /// Only the builder's finalization pass (§4.1 step 6) calls this, and
    /// only once per node (invariant 6: identifiers are immutable once set).
    pub fn assign_identifier(&mut self, node: NodeId) -> Identifier {
        if let Some(existing) = self.nodes[node.index()].identifier {
            return existing;
        }
        let identifier = Identifier::new(node, self.epoch);
        self.nodes[node.index()].identifier = identifier;
        self.lookup.insert(identifier, node);
        identifier
    }

    /// Append a non-symbol node (article, tutorial, landmark, task group)
    /// under `parent`, assigning it an identifier immediately — lifecycle
    /// item (a) in §3.
    pub fn append_non_symbol(
        &mut self,
        parent: NodeId,
        name: InternedStr,
        kind: NodeKind,
        bundle_id: Option<InternedStr>,
    ) -> Identifier {
        let node = self.alloc_node(name, kind);
        self.nodes[node.index()].bundle_id = bundle_id;
        self.insert_child(
            parent,
            name,
            node,
            Element {
                node,
                kind: None,
                hash: None,
                parameter_types: None,
                return_types: None,
            },
        );
        self.assign_identifier(node)
    }

    /// Clear findability for every node owned by `bundle_id`, without
    /// restructuring parents or children — lifecycle item (b) in §3.
    pub fn remove_bundle(&mut self, bundle_id: InternedStr) {
        let mut removed = Vec::new();
        for (idx, node) in self.nodes.iter_mut().enumerate() {
            if node.bundle_id == Some(bundle_id) {
                if let Some(identifier) = node.identifier.take() {
                    removed.push(identifier);
                }
                let _ = idx;
            }
        }
        for identifier in removed {
            self.lookup.remove(&identifier);
        }
    }

    /// Re-parent `node` under `new_parent`, preserving its existing children
    /// edges — the "replace" operation of lifecycle item (c) in §3, used
    /// when an ancestor symbol was renamed.
    pub fn replace_node(&mut self, node: NodeId, new_parent: NodeId, new_name: InternedStr) {
        if let Some(old_parent) = self.nodes[node.index()].parent {
            let old_name = self.nodes[node.index()].name;
            if let Some(container) = self.nodes[old_parent.index()].children.get_mut(old_name) {
                if container.is_empty() {
                    self.nodes[old_parent.index()].children.remove(old_name);
                }
            }
        }
        self.nodes[node.index()].name = new_name;
        self.nodes[node.index()].parent = Some(new_parent);
        self.insert_child(
            new_parent,
            new_name,
            node,
            Element {
                node,
                kind: None,
                hash: None,
                parameter_types: None,
                return_types: None,
            },
        );
    }

    pub fn mark(&mut self, node: NodeId, flags: SpecialBehaviors) {
        let mut current = self.nodes[node.index()].special_behaviors;
        current.insert(flags);
        self.nodes[node.index()].special_behaviors = current;
    }

    /// Re-verify the invariants listed in §8 of the specification. Intended
    /// for tests, not for the hot build/resolve path.
    pub fn check_invariants(&self) -> Result<(), HierarchyError> {
        for (identifier, &node_id) in &self.lookup {
            let node = &self.nodes[node_id.index()];
            match node.identifier {
                Some(actual) if actual == *identifier => {}
                _ => {
                    return Err(HierarchyError::LookupPointsToWrongNode {
                        identifier: *identifier,
                    })
                }
            }
        }
        for node in &self.nodes {
            if let Some(identifier) = node.identifier {
                if !self.lookup.contains_key(&identifier) {
                    return Err(HierarchyError::IdentifierNotInLookup {
                        node: identifier.node_id(),
                    });
                }
            }
        }
        for (parent_idx, parent_node) in self.nodes.iter().enumerate() {
            let parent_id = NodeId::new(parent_idx as u32);
            for (name, container) in parent_node.children.iter() {
                let mut seen: Vec<(Option<InternedStr>, Option<InternedStr>, Option<Vec<InternedStr>>, Option<Vec<InternedStr>>)> = Vec::new();
                for element in container.iter() {
                    let key = (
                        element.kind,
                        element.hash,
                        element.parameter_types.clone(),
                        element.return_types.clone(),
                    );
                    if seen.contains(&key) {
                        return Err(HierarchyError::DuplicateContainerKey {
                            parent: parent_id,
                            name,
                        });
                    }
                    seen.push(key);

                    let child = &self.nodes[element.node.index()];
                    let points_back = child.parent == Some(parent_id)
                        || child
                            .counterpart
                            .map(|cp| self.nodes[cp.index()].parent == Some(parent_id))
                            .unwrap_or(false);
                    if !points_back {
                        return Err(HierarchyError::ChildParentMismatch {
                            parent: parent_id,
                            child: element.node,
                        });
                    }
                }
            }
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Some(cp) = node.counterpart {
                let back = self.nodes[cp.index()].counterpart;
                if back != Some(NodeId::new(idx as u32)) {
                    return Err(HierarchyError::CounterpartNotMutual {
                        node: NodeId::new(idx as u32),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_hierarchy_has_three_synthetic_roots() {
        let hierarchy = Hierarchy::new(InternPool::default());
        assert_ne!(hierarchy.articles_container(), hierarchy.tutorial_container());
        assert_ne!(
            hierarchy.tutorial_container(),
            hierarchy.tutorial_overview_container()
        );
        assert_eq!(hierarchy.node_count(), 3);
    }

    #[test]
    fn assign_identifier_is_idempotent() {
        let mut hierarchy = Hierarchy::new(InternPool::default());
        let name = hierarchy.interner().intern("S");
        let node = hierarchy.alloc_node(name, NodeKind::SparsePlaceholder);
        let first = hierarchy.assign_identifier(node);
        let second = hierarchy.assign_identifier(node);
        assert_eq!(first, second);
        assert_eq!(hierarchy.lookup(first), Some(node));
    }

    #[test]
    fn insert_child_wires_parent_back_reference() {
        let mut hierarchy = Hierarchy::new(InternPool::default());
        let parent_name = hierarchy.interner().intern("M");
        let child_name = hierarchy.interner().intern("S");
        let parent = hierarchy.alloc_node(parent_name, NodeKind::SparsePlaceholder);
        let child = hierarchy.alloc_node(child_name, NodeKind::SparsePlaceholder);
        hierarchy.insert_child(
            parent,
            child_name,
            child,
            Element {
                node: child,
                kind: None,
                hash: None,
                parameter_types: None,
                return_types: None,
            },
        );
        assert_eq!(hierarchy.node(child).parent, Some(parent));
        assert!(hierarchy.check_invariants().is_ok());
    }

    #[test]
    fn remove_bundle_clears_findability_without_restructuring() {
        let mut hierarchy = Hierarchy::new(InternPool::default());
        let bundle = hierarchy.interner().intern("bundleA");
        let parent = hierarchy.articles_container();
        let name = hierarchy.interner().intern("readme");
        let identifier =
            hierarchy.append_non_symbol(parent, name, NodeKind::Article, Some(bundle));
        assert!(hierarchy.lookup(identifier).is_some());

        hierarchy.remove_bundle(bundle);
        assert!(hierarchy.lookup(identifier).is_none());
        // Structure (parent edge, container entry) is untouched.
        let node_id = identifier.node_id();
        assert_eq!(hierarchy.node(node_id).parent, Some(parent));
    }

    #[test]
    fn counterparts_are_mutual() {
        let mut hierarchy = Hierarchy::new(InternPool::default());
        let name = hierarchy.interner().intern("f");
        let swift = hierarchy.alloc_node(name, NodeKind::SparsePlaceholder);
        let objc = hierarchy.alloc_node(name, NodeKind::SparsePlaceholder);
        hierarchy.link_counterpart(swift, objc);
        assert_eq!(hierarchy.node(swift).counterpart, Some(objc));
        assert_eq!(hierarchy.node(objc).counterpart, Some(swift));
        assert!(hierarchy.check_invariants().is_ok());
    }

    #[test]
    fn different_hierarchies_mint_different_epochs() {
        let a = Hierarchy::new(InternPool::default());
        let b = Hierarchy::new(InternPool::default());
        assert_ne!(a.epoch(), b.epoch());
    }
}
