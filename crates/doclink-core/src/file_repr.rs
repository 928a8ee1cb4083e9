//! Stable, versioned serialization of a hierarchy for sharing resolved
//! link information across documentation builds (§4.6).

use std::collections::HashMap;

use doclink_error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};

use crate::container::Element;
use crate::hierarchy::Hierarchy;
use crate::interner::InternPool;
use crate::node::{Node, NodeId, NodeKind, SpecialBehaviors, SymbolData};

/// `{major, minor, patch}` version of the file format. A minor bump
/// preserves backward compatibility of readable fields (§6 "Version").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: u16,
}

/// The version this crate writes and the newest version it reads.
pub const CURRENT_VERSION: FormatVersion = FormatVersion {
    major: 1,
    minor: 0,
    patch: 0,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SerializedChildEntry {
    kind: Option<String>,
    hash: Option<String>,
    parameter_types: Option<Vec<String>>,
    return_types: Option<Vec<String>>,
    node_index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SerializedSymbol {
    precise_id: String,
    interface_language: String,
    kind_id: String,
    declaration_fragments: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SerializedNode {
    name: String,
    raw_special_behavior: u8,
    children: Vec<(String, Vec<SerializedChildEntry>)>,
    symbol: Option<SerializedSymbol>,
    parent: Option<u32>,
    counterpart: Option<u32>,
}

/// The stable on-disk shape of a hierarchy (§4.6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializedHierarchy {
    version: FormatVersion,
    nodes: Vec<SerializedNode>,
    modules: Vec<(String, u32)>,
    articles_container: u32,
    tutorial_container: u32,
    tutorial_overview_container: u32,
    /// `node_index -> url_string` for nodes whose resolved reference cannot
    /// be regenerated from the symbol graph alone.
    non_symbol_paths: HashMap<u32, String>,
    /// `node_index -> render-ready metadata`, for external lookups that
    /// want title/kind/platform availability without re-walking the
    /// symbol graph (§4.6).
    entity_summaries: HashMap<u32, EntitySummary>,
}

impl SerializedHierarchy {
    pub fn non_symbol_paths(&self) -> &HashMap<u32, String> {
        &self.non_symbol_paths
    }

    pub fn entity_summaries(&self) -> &HashMap<u32, EntitySummary> {
        &self.entity_summaries
    }
}

/// Render-ready metadata attached per entity for external lookups, kept
/// alongside but independent of the structural encoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntitySummary {
    pub title: String,
    pub kind: String,
    pub platforms: Vec<String>,
}

fn encode_node(hierarchy: &Hierarchy, node: &Node) -> SerializedNode {
    let symbol = node.kind.symbol().map(|s: &SymbolData| SerializedSymbol {
        precise_id: s.precise_id.clone(),
        interface_language: s.interface_language.clone(),
        kind_id: s.kind_id.clone(),
        declaration_fragments: s.declaration_fragments.clone(),
    });

    let children = node
        .children
        .iter()
        .map(|(name, container)| {
            let name = hierarchy.interner().resolve_owned(name).unwrap_or_default();
            let entries = container
                .elements()
                .iter()
                .map(|e: &Element| SerializedChildEntry {
                    kind: e.kind.and_then(|k| hierarchy.interner().resolve_owned(k)),
                    hash: e.hash.and_then(|h| hierarchy.interner().resolve_owned(h)),
                    parameter_types: e.parameter_types.as_ref().map(|v| {
                        v.iter()
                            .filter_map(|t| hierarchy.interner().resolve_owned(*t))
                            .collect()
                    }),
                    return_types: e.return_types.as_ref().map(|v| {
                        v.iter()
                            .filter_map(|t| hierarchy.interner().resolve_owned(*t))
                            .collect()
                    }),
                    node_index: e.node.index() as u32,
                })
                .collect();
            (name, entries)
        })
        .collect();

    SerializedNode {
        name: hierarchy.interner().resolve_owned(node.name).unwrap_or_default(),
        raw_special_behavior: node.special_behaviors.raw(),
        children,
        symbol,
        parent: node.parent.map(|p| p.index() as u32),
        counterpart: node.counterpart.map(|c| c.index() as u32),
    }
}

/// Encode `hierarchy` into its stable file representation.
///
/// `non_symbol_paths` supplies the URL string for each non-symbol node (the
/// builder itself does not know how to regenerate these).
pub fn encode(
    hierarchy: &Hierarchy,
    non_symbol_paths: HashMap<NodeId, String>,
    entity_summaries: HashMap<NodeId, EntitySummary>,
) -> SerializedHierarchy {
    let nodes = (0..hierarchy.node_count())
        .map(|i| encode_node(hierarchy, hierarchy.node(NodeId::new(i as u32))))
        .collect();

    let modules = hierarchy
        .modules()
        .map(|(name, id)| {
            (
                hierarchy.interner().resolve_owned(name).unwrap_or_default(),
                id.index() as u32,
            )
        })
        .collect();

    SerializedHierarchy {
        version: CURRENT_VERSION,
        nodes,
        modules,
        articles_container: hierarchy.articles_container().index() as u32,
        tutorial_container: hierarchy.tutorial_container().index() as u32,
        tutorial_overview_container: hierarchy.tutorial_overview_container().index() as u32,
        non_symbol_paths: non_symbol_paths
            .into_iter()
            .map(|(id, url)| (id.index() as u32, url))
            .collect(),
        entity_summaries: entity_summaries
            .into_iter()
            .map(|(id, summary)| (id.index() as u32, summary))
            .collect(),
    }
}

/// Decode a [`SerializedHierarchy`] back into a live [`Hierarchy`].
///
/// `on_identifier` is invoked once per reconstructed node with its freshly
/// minted identifier and original node index, letting the caller attach a
/// resolved reference without the file format needing to carry one.
pub fn decode(
    serialized: &SerializedHierarchy,
    mut on_identifier: impl FnMut(u32, crate::identifier::Identifier),
) -> Result<Hierarchy, Error> {
    if serialized.version.major != CURRENT_VERSION.major {
        return Err(Error::new(
            ErrorKind::DeserializationFailed,
            format!(
                "unsupported major version {}.{}.{}",
                serialized.version.major, serialized.version.minor, serialized.version.patch
            ),
        )
        .with_operation("file_repr::decode"));
    }

    let interner = InternPool::default();
    let mut hierarchy = Hierarchy::empty_for_decode(interner.clone());

    // First pass: allocate every node (including the three synthetic roots,
    // which are ordinary entries in `serialized.nodes`) so indices line up
    // with the input.
    let mut index_map: Vec<NodeId> = Vec::with_capacity(serialized.nodes.len());
    for serialized_node in &serialized.nodes {
        let name = interner.intern(&serialized_node.name);
        let kind = match &serialized_node.symbol {
            Some(s) => NodeKind::Symbol(SymbolData {
                precise_id: s.precise_id.clone(),
                interface_language: s.interface_language.clone(),
                kind_id: s.kind_id.clone(),
                declaration_fragments: s.declaration_fragments.clone(),
                parameter_types: None,
                return_types: None,
            }),
            None => NodeKind::SparsePlaceholder,
        };
        let id = hierarchy.alloc_node(name, kind);
        hierarchy.node_mut(id).special_behaviors =
            SpecialBehaviors::from_raw(serialized_node.raw_special_behavior);
        index_map.push(id);
    }

    // Second pass: rewire children, parent and counterpart using indices,
    // now that every index resolves to a real `NodeId`.
    for (i, serialized_node) in serialized.nodes.iter().enumerate() {
        let id = index_map[i];
        if let Some(parent_idx) = serialized_node.parent {
            hierarchy.node_mut(id).parent = Some(index_map[parent_idx as usize]);
        }
        if let Some(counterpart_idx) = serialized_node.counterpart {
            hierarchy.node_mut(id).counterpart = Some(index_map[counterpart_idx as usize]);
        }
        for (child_name, entries) in &serialized_node.children {
            let name_sym = interner.intern(child_name);
            for entry in entries {
                let element = Element {
                    node: index_map[entry.node_index as usize],
                    kind: entry.kind.as_ref().map(|k| interner.intern(k)),
                    hash: entry.hash.as_ref().map(|h| interner.intern(h)),
                    parameter_types: entry
                        .parameter_types
                        .as_ref()
                        .map(|v| v.iter().map(|t| interner.intern(t)).collect()),
                    return_types: entry
                        .return_types
                        .as_ref()
                        .map(|v| v.iter().map(|t| interner.intern(t)).collect()),
                };
                hierarchy
                    .node_mut(id)
                    .children
                    .entry_or_insert(name_sym)
                    .insert(element);
            }
        }
    }

    hierarchy.set_roots(
        index_map[serialized.articles_container as usize],
        index_map[serialized.tutorial_container as usize],
        index_map[serialized.tutorial_overview_container as usize],
    );

    for (module_name, idx) in &serialized.modules {
        let name_sym = interner.intern(module_name);
        hierarchy.set_module_index(name_sym, index_map[*idx as usize]);
    }

    for node_id in &index_map {
        if hierarchy.node(*node_id).kind.is_symbol() {
            let identifier = hierarchy.assign_identifier(*node_id);
            on_identifier(node_id.index() as u32, identifier);
        }
    }

    Ok(hierarchy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind as NK;

    #[test]
    fn encode_decode_round_trip_preserves_node_count_and_names() {
        let interner = InternPool::default();
        let mut hierarchy = Hierarchy::new(interner.clone());
        let module_sym = interner.intern("M");
        let module = hierarchy.module_or_create(module_sym);
        let s_sym = interner.intern("S");
        let s_node = hierarchy.alloc_node(
            s_sym,
            NK::Symbol(SymbolData {
                precise_id: "p:M.S".into(),
                interface_language: "swift".into(),
                kind_id: "struct".into(),
                declaration_fragments: vec![],
                parameter_types: None,
                return_types: None,
            }),
        );
        hierarchy.insert_child(
            module,
            s_sym,
            s_node,
            Element {
                node: s_node,
                kind: None,
                hash: None,
                parameter_types: None,
                return_types: None,
            },
        );
        hierarchy.assign_identifier(s_node);

        let serialized = encode(&hierarchy, HashMap::new(), HashMap::new());
        let mut seen = Vec::new();
        let decoded = decode(&serialized, |idx, id| seen.push((idx, id))).unwrap();

        assert_eq!(decoded.node_count(), hierarchy.node_count());
        assert_eq!(seen.len(), 1);
    }

    #[test]
    fn decode_rejects_newer_major_version() {
        let interner = InternPool::default();
        let hierarchy = Hierarchy::new(interner);
        let mut serialized = encode(&hierarchy, HashMap::new(), HashMap::new());
        serialized.version.major = CURRENT_VERSION.major + 1;
        let result = decode(&serialized, |_, _| {});
        assert!(result.is_err());
    }
}
