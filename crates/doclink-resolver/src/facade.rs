//! The `LinkResolver` facade (§6): the single entry point a documentation
//! build embeds. Ties together the hierarchy, the descent resolver, the
//! minimal-disambiguation engine, the `Reference` intern pool and the
//! per-parent resolution cache, and exposes exactly the external interface
//! §6 names.

use std::collections::HashMap;

use doclink_core::{Hierarchy, Identifier, NodeId, SymbolKindTable};

use crate::cache::ResolutionCache;
use crate::disambiguation::minimal_disambiguator;
use crate::error::ResolutionError;
use crate::reference::{Reference, ReferencePool};
use crate::resolver::Resolver;

/// Bundle metadata supplied by the collaborator that owns documentation
/// bundles (§6 "Bundle info").
#[derive(Debug, Clone)]
pub struct BundleInfo {
    pub id: String,
    pub display_name: String,
    pub articles_root: String,
    pub tutorials_root: String,
    pub tutorial_toc_root: String,
    pub documentation_root: String,
}

/// One authored anchor section (§6 "Anchor sections"): a fragment title
/// attached under an already-resolved parent.
#[derive(Debug, Clone)]
pub struct AnchorSectionInput {
    pub parent: Identifier,
    pub fragment_title: String,
}

/// The facade a documentation build embeds once a hierarchy has been
/// constructed: every operation in §6's "Outputs exposed to collaborators"
/// table is a method here.
pub struct LinkResolver {
    hierarchy: Hierarchy,
    kinds: SymbolKindTable,
    bundle: BundleInfo,
    references: ReferencePool,
    cache: ResolutionCache,
}

impl LinkResolver {
    pub fn new(hierarchy: Hierarchy, kinds: SymbolKindTable, bundle: BundleInfo) -> Self {
        Self {
            hierarchy,
            kinds,
            bundle,
            references: ReferencePool::new(),
            cache: ResolutionCache::new(),
        }
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn hierarchy_mut(&mut self) -> &mut Hierarchy {
        &mut self.hierarchy
    }

    pub fn bundle(&self) -> &BundleInfo {
        &self.bundle
    }

    /// `resolve(raw, parent?, only_symbols) -> Result<Identifier, Error>`
    /// (§6). Memoized per `(parent, raw, only_symbols)` in the per-parent
    /// resolution cache (§5); the cache is cleared wholesale whenever a
    /// bundle is unregistered via [`LinkResolver::unregister_bundle`].
    pub fn resolve(
        &self,
        raw: &str,
        parent: Option<Identifier>,
        only_symbols: bool,
    ) -> Result<Identifier, ResolutionError> {
        if let Some(cached) = self.cache.get(parent, raw, only_symbols) {
            return cached;
        }
        let resolver = Resolver::new(&self.hierarchy, &self.kinds);
        let result = resolver.resolve(raw, parent, only_symbols);
        self.cache.insert(parent, raw, only_symbols, result.clone());
        result
    }

    /// `reference_of(identifier) -> Reference` (§6).
    pub fn reference_of(&self, identifier: Identifier) -> Reference {
        let node_id = identifier.node_id();
        let (path, fragment) = self.path_and_fragment_for(node_id);
        let source_languages = self.source_languages_for(node_id);
        self.references.intern(Reference {
            bundle_id: self.bundle.id.clone(),
            path,
            fragment,
            source_languages,
        })
    }

    /// Attach authored anchor sections under their already-resolved
    /// parents, returning the freshly minted identifiers in input order
    /// (§6 "Anchor sections").
    pub fn attach_anchor_sections(&mut self, sections: Vec<AnchorSectionInput>) -> Vec<Identifier> {
        sections
            .into_iter()
            .filter_map(|section| {
                let parent_node = self.hierarchy.lookup(section.parent)?;
                let name = self.hierarchy.interner().intern(&section.fragment_title);
                let bundle_id = self.hierarchy.interner().intern(&self.bundle.id);
                Some(self.hierarchy.append_non_symbol(
                    parent_node,
                    name,
                    doclink_core::NodeKind::Anchor,
                    Some(bundle_id),
                ))
            })
            .collect()
    }

    /// `disambiguated_paths(case_sensitive, include_language, allow_type_signature) -> map<precise_id, String>`
    /// (§6). Scans every findable symbol node, computing the minimal
    /// disambiguation suffix (§4.5) its own container requires.
    ///
    /// `case_sensitive` controls whether the rendered path preserves a
    /// symbol's original casing or is lower-cased for a case-insensitive
    /// consumer (e.g. a case-insensitive filesystem serving generated
    /// pages). `include_language` prefixes a kind disambiguator with the
    /// interface-language id when the node is part of a counterpart pair.
    /// `allow_type_signature` gates whether the engine may fall back past
    /// kind-only disambiguation into parameter/return-type suffixes; when
    /// `false`, a still-ambiguous entry falls straight to its hash.
    pub fn disambiguated_paths(
        &self,
        case_sensitive: bool,
        include_language: bool,
        allow_type_signature: bool,
    ) -> HashMap<String, String> {
        let mut out = HashMap::new();
        for node_index in 0..self.hierarchy.node_count() {
            let node_id = NodeId::new(node_index as u32);
            let node = self.hierarchy.node(node_id);
            let Some(symbol) = node.kind.symbol() else {
                continue;
            };
            if symbol.precise_id.is_empty() {
                // The synthetic "module" placeholder symbol carries no
                // precise id of its own.
                continue;
            }
            if !node.is_findable() {
                continue;
            }

            let suffix = self.minimal_suffix_for(node_id, include_language, allow_type_signature);
            let (mut path, _fragment) = self.path_and_fragment_for(node_id);
            if !suffix.is_empty() {
                path.push_str(&suffix);
            }
            if !case_sensitive {
                path = path.to_lowercase();
            }
            out.insert(symbol.precise_id.clone(), path);
        }
        out
    }

    /// `breadcrumbs(reference, language) -> [Reference]` (§6): the chain
    /// of ancestor references from the module root down to (but not
    /// including) `identifier` itself. When `language` is given and an
    /// ancestor has a counterpart in that language, the counterpart's
    /// reference is used instead.
    pub fn breadcrumbs(&self, identifier: Identifier, language: Option<&str>) -> Vec<Reference> {
        let mut chain = Vec::new();
        let mut current = self.hierarchy.node(identifier.node_id()).parent;
        while let Some(node_id) = current {
            let selected = self.select_language_variant(node_id, language);
            if let Some(ancestor_identifier) = self.hierarchy.node(selected).identifier {
                chain.push(self.reference_of(ancestor_identifier));
            }
            current = self.hierarchy.node(node_id).parent;
        }
        chain.reverse();
        chain
    }

    /// `overloads_of_group(reference) -> [Reference]` (§6): every sibling
    /// in `identifier`'s own disambiguation container that shares its kind,
    /// excluding `identifier` itself.
    pub fn overloads_of_group(&self, identifier: Identifier) -> Vec<Reference> {
        let node_id = identifier.node_id();
        let node = self.hierarchy.node(node_id);
        let Some(parent) = node.parent else {
            return Vec::new();
        };
        let Some(container) = self.hierarchy.container(parent, node.name) else {
            return Vec::new();
        };
        let target_kind = container
            .elements()
            .iter()
            .find(|e| e.node == node_id)
            .and_then(|e| e.kind);

        container
            .elements()
            .iter()
            .filter(|e| e.node != node_id && e.kind == target_kind)
            .filter_map(|e| self.hierarchy.node(e.node).identifier)
            .map(|sibling| self.reference_of(sibling))
            .collect()
    }

    /// `prepare_for_serialization(bundle_id) -> SerializableLinkResolutionInformation`
    /// (§6). Non-symbol nodes get their resolved reference path recorded in
    /// `non_symbol_paths` since the file representation can't regenerate
    /// those from the symbol graph alone (§4.6).
    pub fn prepare_for_serialization(&self, bundle_id: &str) -> doclink_core::SerializedHierarchy {
        let mut non_symbol_paths = HashMap::new();
        let entity_summaries = HashMap::new();
        for node_index in 0..self.hierarchy.node_count() {
            let node_id = NodeId::new(node_index as u32);
            let node = self.hierarchy.node(node_id);
            if node.kind.is_symbol() {
                continue;
            }
            if node.identifier.is_none() {
                continue;
            }
            let owning_bundle = node
                .bundle_id
                .and_then(|b| self.hierarchy.interner().resolve_owned(b));
            if owning_bundle.as_deref() != Some(bundle_id) {
                continue;
            }
            let (path, fragment) = self.path_and_fragment_for(node_id);
            let rendered = match fragment {
                Some(fragment) => format!("{path}#{fragment}"),
                None => path,
            };
            non_symbol_paths.insert(node_id, rendered);
        }
        doclink_core::encode(&self.hierarchy, non_symbol_paths, entity_summaries)
    }

    /// Drop every cached resolution and interned reference for `bundle_id`
    /// and clear the bundle's nodes from findability (§5 "The cache is
    /// cleared when a bundle is unregistered").
    pub fn unregister_bundle(&mut self, bundle_id: &str) {
        let bundle_sym = self.hierarchy.interner().intern(bundle_id);
        self.hierarchy.remove_bundle(bundle_sym);
        self.references.clear_bundle(bundle_id);
        self.cache.clear();
    }

    fn minimal_suffix_for(
        &self,
        node_id: NodeId,
        include_language: bool,
        allow_type_signature: bool,
    ) -> String {
        let node = self.hierarchy.node(node_id);
        let Some(parent) = node.parent else {
            return String::new();
        };
        let Some(container) = self.hierarchy.container(parent, node.name) else {
            return String::new();
        };
        let Some(index) = container.elements().iter().position(|e| e.node == node_id) else {
            return String::new();
        };

        let mut suffix = minimal_disambiguator(container, self.hierarchy.interner(), index);
        if !allow_type_signature {
            if let crate::disambiguation::MinimalSuffix::TypeSignature { .. } = suffix {
                suffix = minimal_disambiguator_without_type_signature(
                    &self.hierarchy,
                    container,
                    index,
                );
            }
        }
        let rendered = suffix.render();
        if rendered.is_empty() {
            return rendered;
        }
        if include_language {
            if let Some(symbol) = node.kind.symbol() {
                if node.counterpart.is_some() {
                    return format!("-{}.{}", symbol.interface_language, rendered.trim_start_matches('-'));
                }
            }
        }
        rendered
    }

    fn path_and_fragment_for(&self, node_id: NodeId) -> (String, Option<String>) {
        let node = self.hierarchy.node(node_id);
        if matches!(node.kind, doclink_core::NodeKind::Anchor) {
            let fragment = self.hierarchy.interner().resolve_owned(node.name);
            let parent_path = node
                .parent
                .map(|p| self.path_and_fragment_for(p).0)
                .unwrap_or_default();
            return (parent_path, fragment);
        }

        let mut segments = Vec::new();
        let mut current = Some(node_id);
        while let Some(id) = current {
            let node = self.hierarchy.node(id);
            let name = self.hierarchy.interner().resolve_owned(node.name).unwrap_or_default();
            segments.push(name);
            current = node.parent;
        }
        segments.reverse();
        let root = self.bundle.documentation_root.trim_end_matches('/');
        (format!("{root}/{}", segments.join("/")), None)
    }

    fn source_languages_for(&self, node_id: NodeId) -> Vec<String> {
        let node = self.hierarchy.node(node_id);
        let mut languages = Vec::new();
        if let Some(symbol) = node.kind.symbol() {
            if !symbol.interface_language.is_empty() {
                languages.push(symbol.interface_language.clone());
            }
        }
        if let Some(counterpart) = node.counterpart {
            if let Some(symbol) = self.hierarchy.node(counterpart).kind.symbol() {
                if !symbol.interface_language.is_empty() && !languages.contains(&symbol.interface_language) {
                    languages.push(symbol.interface_language.clone());
                }
            }
        }
        languages
    }

    /// If `node_id` has a counterpart whose interface language matches
    /// `language`, return that counterpart instead; otherwise `node_id`.
    fn select_language_variant(&self, node_id: NodeId, language: Option<&str>) -> NodeId {
        let Some(wanted) = language else {
            return node_id;
        };
        let node = self.hierarchy.node(node_id);
        if let Some(symbol) = node.kind.symbol() {
            if symbol.interface_language.eq_ignore_ascii_case(wanted) {
                return node_id;
            }
        }
        if let Some(counterpart) = node.counterpart {
            if let Some(symbol) = self.hierarchy.node(counterpart).kind.symbol() {
                if symbol.interface_language.eq_ignore_ascii_case(wanted) {
                    return counterpart;
                }
            }
        }
        node_id
    }
}

/// Recompute a suffix ignoring the parameter/return-type strategy, used
/// when a caller passes `allow_type_signature: false` (§6). Falls back
/// straight from kind to hash, skipping §4.5's middle strategy.
fn minimal_disambiguator_without_type_signature(
    hierarchy: &Hierarchy,
    container: &doclink_core::DisambiguationContainer,
    target: usize,
) -> crate::disambiguation::MinimalSuffix {
    use crate::disambiguation::MinimalSuffix;

    let elements = container.elements();
    let target_element = &elements[target];
    let others_share_kind = elements
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != target)
        .all(|(_, e)| e.kind != target_element.kind);
    if let Some(kind) = target_element.kind {
        if others_share_kind {
            let rendered = hierarchy.interner().resolve_owned(kind).unwrap_or_default();
            return MinimalSuffix::Kind(rendered);
        }
    }
    let hash = target_element
        .hash
        .and_then(|h| hierarchy.interner().resolve_owned(h))
        .unwrap_or_default();
    MinimalSuffix::Hash(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use doclink_core::{HierarchyBuilder, RelationshipInput, RelationshipKind, SymbolGraphInput, SymbolInput};

    fn bundle() -> BundleInfo {
        BundleInfo {
            id: "com.example.docs".to_string(),
            display_name: "Example".to_string(),
            articles_root: "articles".to_string(),
            tutorials_root: "tutorials".to_string(),
            tutorial_toc_root: "tutorials/toc".to_string(),
            documentation_root: "documentation".to_string(),
        }
    }

    fn symbol(precise_id: &str, path: &[&str], kind: &str) -> SymbolInput {
        SymbolInput {
            precise_id: precise_id.to_string(),
            interface_language: "swift".to_string(),
            path_components: path.iter().map(|s| s.to_string()).collect(),
            kind_id: kind.to_string(),
            declaration_fragments: vec![],
            function_signature: None,
        }
    }

    fn build() -> LinkResolver {
        let kinds = SymbolKindTable::default();
        let builder = HierarchyBuilder::new(kinds.clone());
        let graph = SymbolGraphInput {
            module_name: "MyModule".to_string(),
            symbols: vec![
                symbol("s:MyModule.S", &["MyModule", "S"], "struct"),
                symbol("s:MyModule.S.member", &["MyModule", "S", "member"], "func"),
            ],
            relationships: vec![RelationshipInput {
                source: "s:MyModule.S.member".to_string(),
                target: "s:MyModule.S".to_string(),
                kind: RelationshipKind::MemberOf,
            }],
        };
        let hierarchy = builder.build(vec![graph]);
        LinkResolver::new(hierarchy, kinds, bundle())
    }

    #[test]
    fn resolve_then_reference_of_round_trips_a_path() {
        let resolver = build();
        let id = resolver
            .resolve("documentation/MyModule/S", None, false)
            .expect("should resolve");
        let reference = resolver.reference_of(id);
        assert_eq!(reference.path, "documentation/MyModule/S");
        assert_eq!(reference.bundle_id, "com.example.docs");
    }

    #[test]
    fn resolve_is_cached_on_repeat_calls() {
        let resolver = build();
        assert!(resolver.cache.is_empty());
        resolver.resolve("documentation/MyModule/S", None, false).unwrap();
        assert_eq!(resolver.cache.len(), 1);
        resolver.resolve("documentation/MyModule/S", None, false).unwrap();
        assert_eq!(resolver.cache.len(), 1, "second call must hit the cache");
    }

    #[test]
    fn breadcrumbs_walks_from_the_module_root_down_to_the_parent() {
        let resolver = build();
        let id = resolver
            .resolve("documentation/MyModule/S/member", None, true)
            .unwrap();
        let crumbs = resolver.breadcrumbs(id, None);
        assert_eq!(crumbs.len(), 2, "module and S, not member itself");
        assert_eq!(crumbs[0].path, "documentation/MyModule");
        assert_eq!(crumbs[1].path, "documentation/MyModule/S");
    }

    #[test]
    fn disambiguated_paths_is_injective_over_resolvable_entries() {
        let resolver = build();
        let paths = resolver.disambiguated_paths(true, false, true);
        let mut seen = std::collections::HashSet::new();
        for path in paths.values() {
            assert!(seen.insert(path.clone()), "duplicate path: {path}");
        }
        assert!(paths.contains_key("s:MyModule.S"));
        assert!(paths.contains_key("s:MyModule.S.member"));
    }

    #[test]
    fn unregister_bundle_clears_the_resolution_cache() {
        let mut resolver = build();
        resolver.resolve("documentation/MyModule/S", None, false).unwrap();
        assert_eq!(resolver.cache.len(), 1);
        resolver.unregister_bundle("com.example.docs");
        assert!(resolver.cache.is_empty());
    }

    #[test]
    fn overloads_of_group_excludes_the_node_itself() {
        let resolver = build();
        let id = resolver
            .resolve("documentation/MyModule/S", None, false)
            .unwrap();
        // `S` is the only struct named `S` under `MyModule`; no siblings.
        assert!(resolver.overloads_of_group(id).is_empty());
    }
}
