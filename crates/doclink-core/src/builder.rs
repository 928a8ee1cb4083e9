//! The hierarchy builder: places symbols from one or more symbol graphs
//! into a [`Hierarchy`], following relationships where present and falling
//! back to raw path components (materializing sparse placeholders) where
//! not (§4.1).

use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::config::SymbolKindTable;
use crate::container::{Element, Insertion};
use crate::hierarchy::Hierarchy;
use crate::interner::InternPool;
use crate::node::{NodeId, NodeKind, SpecialBehaviors, SymbolData};
use crate::type_sig::{extract_parameter_types, extract_return_types, FunctionSignature};

/// One symbol as supplied by the symbol-graph collaborator (§6).
#[derive(Debug, Clone)]
pub struct SymbolInput {
    pub precise_id: String,
    pub interface_language: String,
    pub path_components: Vec<String>,
    pub kind_id: String,
    pub declaration_fragments: Vec<String>,
    pub function_signature: Option<FunctionSignature>,
}

/// The relationship kinds the builder understands. Hierarchical kinds
/// place a symbol under a parent; `DefaultImplementationOf` places it under
/// the parent of the requirement it implements; everything else is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationshipKind {
    MemberOf,
    OptionalMemberOf,
    RequirementOf,
    OptionalRequirementOf,
    ExtensionTo,
    DeclaredIn,
    DefaultImplementationOf,
    Other,
}

impl RelationshipKind {
    fn is_hierarchical(self) -> bool {
        matches!(
            self,
            RelationshipKind::MemberOf
                | RelationshipKind::OptionalMemberOf
                | RelationshipKind::RequirementOf
                | RelationshipKind::OptionalRequirementOf
                | RelationshipKind::ExtensionTo
                | RelationshipKind::DeclaredIn
        )
    }
}

/// `source` is a member/child of `target` (the edge direction the symbol
/// graph format uses; "source is related to target").
#[derive(Debug, Clone)]
pub struct RelationshipInput {
    pub source: String,
    pub target: String,
    pub kind: RelationshipKind,
}

/// One symbol graph, keyed by module name (§4.1 input).
#[derive(Debug, Clone)]
pub struct SymbolGraphInput {
    pub module_name: String,
    pub symbols: Vec<SymbolInput>,
    pub relationships: Vec<RelationshipInput>,
}

const SYNTHESIZED_MARKER: &str = "::SYNTHESIZED::";

/// Builds a [`Hierarchy`] out of one or more symbol graphs.
pub struct HierarchyBuilder {
    kinds: SymbolKindTable,
    known_disambiguated_path_components: HashMap<String, Vec<String>>,
}

impl HierarchyBuilder {
    pub fn new(kinds: SymbolKindTable) -> Self {
        Self {
            kinds,
            known_disambiguated_path_components: HashMap::new(),
        }
    }

    /// Supply already-computed disambiguations for a partial build (§4.1).
    pub fn with_known_disambiguated_path_components(
        mut self,
        overrides: HashMap<String, Vec<String>>,
    ) -> Self {
        self.known_disambiguated_path_components = overrides;
        self
    }

    pub fn kinds(&self) -> &SymbolKindTable {
        &self.kinds
    }

    /// Run the builder over `graphs`, producing a complete hierarchy.
    pub fn build(&self, mut graphs: Vec<SymbolGraphInput>) -> Hierarchy {
        // Step 1: stable order, non-extension graphs first.
        graphs.sort_by(|a, b| {
            let a_is_extension = a.module_name.contains('@');
            let b_is_extension = b.module_name.contains('@');
            a_is_extension
                .cmp(&b_is_extension)
                .then_with(|| a.module_name.cmp(&b.module_name))
        });

        let interner = InternPool::default();
        let mut hierarchy = Hierarchy::new(interner.clone());

        let mut by_precise_id: HashMap<String, NodeId> = HashMap::new();
        // Counterpart anchors keyed by (root module, last path component, kind id).
        let mut counterpart_anchor: HashMap<(String, String, String), NodeId> = HashMap::new();

        for graph in &graphs {
            let root_module_name = graph.module_name.split('@').next().unwrap_or(&graph.module_name);
            let module_sym = interner.intern(root_module_name);
            let module_node = hierarchy.module_or_create(module_sym);
            debug!(module = root_module_name, symbols = graph.symbols.len(), "placing symbol graph");

            // Step 2: create or reuse a node per symbol.
            let signature_fragments: Vec<(usize, Vec<String>, Vec<String>)> = graph
                .symbols
                .par_iter()
                .enumerate()
                .filter_map(|(idx, symbol)| {
                    let signature = symbol.function_signature.as_ref()?;
                    let is_swift = symbol.interface_language.eq_ignore_ascii_case("swift");
                    let params = extract_parameter_types(signature, is_swift);
                    let returns = extract_return_types(signature, is_swift);
                    Some((idx, params, returns))
                })
                .collect();
            let mut signatures: HashMap<usize, (Vec<String>, Vec<String>)> = HashMap::new();
            for (idx, params, returns) in signature_fragments {
                signatures.insert(idx, (params, returns));
            }

            for (idx, symbol) in graph.symbols.iter().enumerate() {
                if by_precise_id.contains_key(&symbol.precise_id) {
                    continue;
                }
                let last_component = symbol
                    .path_components
                    .last()
                    .cloned()
                    .unwrap_or_else(|| symbol.precise_id.clone());
                let anchor_key = (
                    root_module_name.to_string(),
                    last_component.clone(),
                    symbol.kind_id.clone(),
                );

                let (params, returns) = signatures
                    .remove(&idx)
                    .unwrap_or_else(|| (Vec::new(), Vec::new()));

                let name_sym = interner.intern(&last_component);
                let node = hierarchy.alloc_node(
                    name_sym,
                    NodeKind::Symbol(SymbolData {
                        precise_id: symbol.precise_id.clone(),
                        interface_language: symbol.interface_language.clone(),
                        kind_id: symbol.kind_id.clone(),
                        declaration_fragments: symbol.declaration_fragments.clone(),
                        parameter_types: if params.is_empty() { None } else { Some(params) },
                        return_types: if returns.is_empty() { None } else { Some(returns) },
                    }),
                );

                if symbol.precise_id.contains(SYNTHESIZED_MARKER) {
                    hierarchy.mark(node, SpecialBehaviors::DISFAVOR_IN_COLLISION);
                    trace!(precise_id = %symbol.precise_id, "marked synthesized symbol disfavor-in-collision");
                }

                // Reusing an existing node as the counterpart anchor covers
                // both conditions §4.1 step 2 names: languages differ, or
                // the last path component and kind id match (which the key
                // itself already guarantees).
                if let Some(&anchor) = counterpart_anchor.get(&anchor_key) {
                    hierarchy.link_counterpart(anchor, node);
                } else {
                    counterpart_anchor.insert(anchor_key.clone(), node);
                }

                by_precise_id.insert(symbol.precise_id.clone(), node);
            }

            // Step 3 + 4: place symbols using hierarchical relationships,
            // falling back to path_components, and handling default
            // implementations separately.
            let mut parent_of: HashMap<String, String> = HashMap::new();
            let mut default_impl_of: HashMap<String, String> = HashMap::new();
            for rel in &graph.relationships {
                if rel.kind == RelationshipKind::DefaultImplementationOf {
                    default_impl_of.insert(rel.source.clone(), rel.target.clone());
                } else if rel.kind.is_hierarchical() {
                    parent_of.entry(rel.source.clone()).or_insert_with(|| rel.target.clone());
                }
            }

            for symbol in &graph.symbols {
                let Some(&node) = by_precise_id.get(&symbol.precise_id) else {
                    continue;
                };
                if hierarchy.node(node).parent.is_some() {
                    continue;
                }

                if let Some(requirement_id) = default_impl_of.get(&symbol.precise_id) {
                    if let Some(&requirement_node) = by_precise_id.get(requirement_id) {
                        if let Some(parent) = hierarchy.node(requirement_node).parent {
                            self.place(&mut hierarchy, parent, node);
                            hierarchy.mark(node, SpecialBehaviors::DISFAVOR_IN_COLLISION);
                            continue;
                        }
                    }
                }

                if let Some(parent_id) = parent_of.get(&symbol.precise_id) {
                    if let Some(&parent_node) = by_precise_id.get(parent_id) {
                        self.place(&mut hierarchy, parent_node, node);
                        continue;
                    }
                }

                // Fall back to path_components (or a caller-supplied
                // override for a partial build, §4.1), materializing sparse
                // placeholders for any missing intermediate element. The
                // leading component is often the module name itself
                // (module-prefixed paths); skip it so symbols land directly
                // under the module instead of under a duplicate child node.
                let path_components = self
                    .known_disambiguated_path_components
                    .get(&symbol.precise_id)
                    .unwrap_or(&symbol.path_components);
                let path_components: &[String] =
                    match path_components.first().map(String::as_str) {
                        Some(first) if first == root_module_name => &path_components[1..],
                        _ => path_components.as_slice(),
                    };
                let mut cursor = module_node;
                let depth = path_components.len();
                for (i, component) in path_components.iter().enumerate() {
                    let is_last = i + 1 == depth;
                    let comp_sym = interner.intern(component);
                    if is_last {
                        self.place(&mut hierarchy, cursor, node);
                    } else {
                        cursor = self.sparse_child(&mut hierarchy, cursor, comp_sym);
                    }
                }
                if depth == 0 {
                    self.place(&mut hierarchy, module_node, node);
                }
            }
        }

        // Step 6: depth-first identifier assignment from every root.
        let roots: Vec<NodeId> = hierarchy.modules().map(|(_, id)| id).collect();
        for root in roots {
            self.assign_identifiers_dfs(&mut hierarchy, root);
        }

        hierarchy
    }

    /// Insert `child` under `parent`'s container keyed by name, merging
    /// on an exact-key collision by re-homing the loser's children.
    fn place(&self, hierarchy: &mut Hierarchy, parent: NodeId, child: NodeId) {
        let name = hierarchy.node(child).name;
        let kind_id = hierarchy.node(child).kind.kind_id().map(|s| s.to_string());
        let kind_sym = kind_id.map(|k| hierarchy.interner().intern(k));
        let (param_syms, return_syms, hash_sym) = {
            let node = hierarchy.node(child);
            let interner = hierarchy.interner().clone();
            let symbol = node.kind.symbol();
            let params = symbol
                .and_then(|s| s.parameter_types.clone())
                .map(|v| v.iter().map(|t| interner.intern(t)).collect::<Vec<_>>());
            let returns = symbol
                .and_then(|s| s.return_types.clone())
                .map(|v| v.iter().map(|t| interner.intern(t)).collect::<Vec<_>>());
            let hash = symbol
                .filter(|s| !s.precise_id.is_empty())
                .map(|s| interner.intern(crate::hash::precise_id_hash(&s.precise_id)));
            (params, returns, hash)
        };

        let element = Element {
            node: child,
            kind: kind_sym,
            hash: hash_sym,
            parameter_types: param_syms,
            return_types: return_syms,
        };

        match hierarchy.insert_child(parent, name, child, element) {
            Insertion::Inserted => {}
            Insertion::Collided { existing } => {
                self.merge_into_existing(hierarchy, parent, name, existing, child);
            }
        }
    }

    /// Merge `loser` into the existing container element at `existing`:
    /// the existing (`lhs`) node wins, and the loser's children are
    /// recursively re-homed under it.
    fn merge_into_existing(
        &self,
        hierarchy: &mut Hierarchy,
        parent: NodeId,
        name: crate::interner::InternedStr,
        existing: usize,
        loser: NodeId,
    ) {
        let winner = hierarchy
            .container(parent, name)
            .map(|c| c.elements()[existing].node)
            .expect("container must exist after a reported collision");

        let loser_children: Vec<NodeId> = hierarchy
            .node(loser)
            .children
            .iter()
            .flat_map(|(_, container)| container.elements().iter().map(|e| e.node).collect::<Vec<_>>())
            .collect();
        for grandchild in loser_children {
            self.place(hierarchy, winner, grandchild);
        }
    }

    fn sparse_child(
        &self,
        hierarchy: &mut Hierarchy,
        parent: NodeId,
        name: crate::interner::InternedStr,
    ) -> NodeId {
        if let Some(container) = hierarchy.container(parent, name) {
            if let Some(existing) = container.elements().first() {
                return existing.node;
            }
        }
        let node = hierarchy.alloc_node(name, NodeKind::SparsePlaceholder);
        hierarchy.mark(node, SpecialBehaviors::DISFAVOR_IN_COLLISION);
        let element = Element {
            node,
            kind: None,
            hash: None,
            parameter_types: None,
            return_types: None,
        };
        hierarchy.insert_child(parent, name, node, element);
        node
    }

    fn assign_identifiers_dfs(&self, hierarchy: &mut Hierarchy, root: NodeId) {
        let mut stack = vec![root];
        let mut visited = std::collections::HashSet::new();
        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }
            if hierarchy.node(node).kind.is_symbol() {
                hierarchy.assign_identifier(node);
            }
            let children: Vec<NodeId> = hierarchy
                .node(node)
                .children
                .iter()
                .flat_map(|(_, c)| c.elements().iter().map(|e| e.node).collect::<Vec<_>>())
                .collect();
            stack.extend(children);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbol(precise_id: &str, path: &[&str], kind: &str) -> SymbolInput {
        SymbolInput {
            precise_id: precise_id.to_string(),
            interface_language: "swift".to_string(),
            path_components: path.iter().map(|s| s.to_string()).collect(),
            kind_id: kind.to_string(),
            declaration_fragments: Vec::new(),
            function_signature: None,
        }
    }

    #[test]
    fn struct_under_module_gets_identifier() {
        let graph = SymbolGraphInput {
            module_name: "M".to_string(),
            symbols: vec![symbol("p:M.S", &["S"], "struct")],
            relationships: vec![],
        };
        let builder = HierarchyBuilder::new(SymbolKindTable::default());
        let hierarchy = builder.build(vec![graph]);
        assert!(hierarchy.check_invariants().is_ok());

        let module_sym = hierarchy.interner().intern("M");
        let module = hierarchy.module(module_sym).unwrap();
        let s_sym = hierarchy.interner().intern("S");
        let container = hierarchy.container(module, s_sym).unwrap();
        assert_eq!(container.len(), 1);
        let node = container.elements()[0].node;
        assert!(hierarchy.node(node).is_findable());
    }

    #[test]
    fn member_of_relationship_places_under_parent() {
        let graph = SymbolGraphInput {
            module_name: "M".to_string(),
            symbols: vec![
                symbol("p:M.S", &["S"], "struct"),
                symbol("p:M.S.m", &["S", "m"], "func"),
            ],
            relationships: vec![RelationshipInput {
                source: "p:M.S.m".to_string(),
                target: "p:M.S".to_string(),
                kind: RelationshipKind::MemberOf,
            }],
        };
        let builder = HierarchyBuilder::new(SymbolKindTable::default());
        let hierarchy = builder.build(vec![graph]);
        assert!(hierarchy.check_invariants().is_ok());

        let module_sym = hierarchy.interner().intern("M");
        let module = hierarchy.module(module_sym).unwrap();
        let s_sym = hierarchy.interner().intern("S");
        let s_node = hierarchy.container(module, s_sym).unwrap().elements()[0].node;
        let m_sym = hierarchy.interner().intern("m");
        let m_container = hierarchy.container(s_node, m_sym).unwrap();
        assert_eq!(m_container.len(), 1);
    }

    #[test]
    fn missing_parent_creates_sparse_placeholder() {
        // Symbol's path implies an intermediate "Inner" that never appears
        // as its own symbol.
        let graph = SymbolGraphInput {
            module_name: "M".to_string(),
            symbols: vec![symbol("p:M.Outer.Inner.leaf", &["Outer", "Inner", "leaf"], "property")],
            relationships: vec![],
        };
        let builder = HierarchyBuilder::new(SymbolKindTable::default());
        let hierarchy = builder.build(vec![graph]);

        let module_sym = hierarchy.interner().intern("M");
        let module = hierarchy.module(module_sym).unwrap();
        let outer_sym = hierarchy.interner().intern("Outer");
        let outer_node = hierarchy.container(module, outer_sym).unwrap().elements()[0].node;
        assert!(hierarchy.node(outer_node).kind.is_sparse_placeholder());
        assert!(!hierarchy.node(outer_node).is_findable());
    }

    #[test]
    fn synthesized_symbol_is_marked_disfavor_in_collision() {
        let graph = SymbolGraphInput {
            module_name: "M".to_string(),
            symbols: vec![symbol(
                "p:M.S::SYNTHESIZED::copy",
                &["S"],
                "struct",
            )],
            relationships: vec![],
        };
        let builder = HierarchyBuilder::new(SymbolKindTable::default());
        let hierarchy = builder.build(vec![graph]);
        let module_sym = hierarchy.interner().intern("M");
        let module = hierarchy.module(module_sym).unwrap();
        let s_sym = hierarchy.interner().intern("S");
        let node = hierarchy.container(module, s_sym).unwrap().elements()[0].node;
        assert!(hierarchy
            .node(node)
            .special_behaviors
            .contains(SpecialBehaviors::DISFAVOR_IN_COLLISION));
    }

    #[test]
    fn non_extension_graphs_are_placed_before_extension_graphs() {
        let base = SymbolGraphInput {
            module_name: "M".to_string(),
            symbols: vec![symbol("p:M.S", &["S"], "struct")],
            relationships: vec![],
        };
        let extension = SymbolGraphInput {
            module_name: "M@Extra".to_string(),
            symbols: vec![symbol("p:M.S.extra", &["S", "extra"], "property")],
            relationships: vec![],
        };
        let builder = HierarchyBuilder::new(SymbolKindTable::default());
        // Pass extension first; builder must still place base module first.
        let hierarchy = builder.build(vec![extension, base]);
        assert!(hierarchy.check_invariants().is_ok());
    }
}
