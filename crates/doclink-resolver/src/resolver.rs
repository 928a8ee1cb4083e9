//! The resolver (§4.4): descent from a root, look-ahead disambiguation,
//! walk-up for relative links, and the tie-breaking rules that apply when
//! a collision survives disambiguation.

use doclink_core::{
    Disambiguation, Element, Hierarchy, Identifier, InternPool, NodeId, ParsedPathComponent,
    SymbolKindTable,
};

use crate::disambiguation::{minimal_disambiguator, select};
use crate::error::{near_misses, Candidate, ErrorPayload, ResolutionError};

/// Runs §4.4's resolution algorithm against one [`Hierarchy`].
///
/// Holds only borrows: the hierarchy is built once and resolved against
/// many times without further mutation (§5), so a `Resolver` never needs
/// its own copy of the data it reads.
pub struct Resolver<'h> {
    hierarchy: &'h Hierarchy,
    kinds: &'h SymbolKindTable,
}

impl<'h> Resolver<'h> {
    pub fn new(hierarchy: &'h Hierarchy, kinds: &'h SymbolKindTable) -> Self {
        Self { hierarchy, kinds }
    }

    /// Resolve `raw` to an [`Identifier`], per §4.4's full algorithm.
    pub fn resolve(
        &self,
        raw: &str,
        parent: Option<Identifier>,
        only_symbols: bool,
    ) -> Result<Identifier, ResolutionError> {
        let parsed = doclink_core::parse_path(raw, self.kinds).map_err(|_| {
            ResolutionError::NotFound {
                payload: ErrorPayload {
                    path_prefix: raw.to_string(),
                    remaining: raw.to_string(),
                    solutions: vec![],
                    range_adjustment: (0, 0),
                },
                available_top_level_names: vec![],
            }
        })?;

        let mut components = parsed.components.as_slice();
        if let Some(first) = components.first() {
            if first.name == "documentation" || first.name == "tutorials" {
                components = &components[1..];
            }
        }

        if !only_symbols {
            for root in self.non_symbol_roots() {
                if self.root_matches(root, components) {
                    if let Ok(node) = self.search_for_node(root, components, only_symbols) {
                        return Ok(self.identifier_for(node));
                    }
                }
            }
        }

        if let Some(first) = components.first() {
            let name = self.hierarchy.interner().intern(&first.name);
            if let Some(module) = self.hierarchy.module(name) {
                match self.search_for_node(module, components, only_symbols) {
                    Ok(node) => return Ok(self.identifier_for(node)),
                    Err(err) if parsed.is_absolute => return Err(err),
                    Err(_) => {}
                }
            } else if parsed.is_absolute {
                let available: Vec<String> = self
                    .hierarchy
                    .modules()
                    .filter_map(|(name, _)| self.hierarchy.interner().resolve_owned(name))
                    .collect();
                return Err(ResolutionError::ModuleNotFound {
                    payload: ErrorPayload {
                        path_prefix: first.full.clone(),
                        remaining: render(&components[1..]),
                        solutions: vec![],
                        range_adjustment: (0, 0),
                    },
                    near_misses: near_misses(&first.name, &available, 3),
                });
            }
        }

        if !parsed.is_absolute {
            if let Some(parent) = parent {
                return self.walk_up(parent, components, only_symbols);
            }
        }

        let available: Vec<String> = self
            .hierarchy
            .modules()
            .filter_map(|(name, _)| self.hierarchy.interner().resolve_owned(name))
            .collect();
        Err(ResolutionError::NotFound {
            payload: ErrorPayload {
                path_prefix: raw.to_string(),
                remaining: render(components),
                solutions: vec![],
                range_adjustment: (0, 0),
            },
            available_top_level_names: available,
        })
    }

    /// `search_for_node` only ever returns a node that passed the
    /// sparse-placeholder and symbol-link checks, both of which imply the
    /// node already carries an identifier (every non-sparse node the
    /// builder produces gets one).
    fn identifier_for(&self, node: NodeId) -> Identifier {
        self.hierarchy
            .node(node)
            .identifier
            .expect("resolved node must be findable")
    }

    fn non_symbol_roots(&self) -> [NodeId; 3] {
        [
            self.hierarchy.articles_container(),
            self.hierarchy.tutorial_container(),
            self.hierarchy.tutorial_overview_container(),
        ]
    }

    /// A root matches if its own name matches the first component, or one
    /// of its direct children does (§4.4 step 2).
    fn root_matches(&self, root: NodeId, components: &[ParsedPathComponent]) -> bool {
        let Some(first) = components.first() else {
            return false;
        };
        let node = self.hierarchy.node(root);
        if let Some(name) = self.hierarchy.interner().resolve_owned(node.name) {
            if name == first.name {
                return true;
            }
        }
        self.child_container(root, first).is_some()
    }

    /// Try `children[component.full]` first, falling back to
    /// `children[component.name]` (§4.4 descent algorithm, step 1).
    fn child_container<'a>(
        &'a self,
        node: NodeId,
        component: &ParsedPathComponent,
    ) -> Option<&'a doclink_core::DisambiguationContainer> {
        let interner = self.hierarchy.interner();
        let full = interner.intern(&component.full);
        if let Some(c) = self.hierarchy.container(node, full) {
            return Some(c);
        }
        let name = interner.intern(&component.name);
        self.hierarchy.container(node, name)
    }

    fn child_names(&self, node: NodeId) -> Vec<String> {
        self.hierarchy
            .node(node)
            .children
            .iter()
            .filter_map(|(name, _)| self.hierarchy.interner().resolve_owned(name))
            .collect()
    }

    /// §4.4's descent loop: walk `components` from `start`, consuming one
    /// (or two, on a resolved look-ahead) component at a time.
    fn search_for_node(
        &self,
        start: NodeId,
        components: &[ParsedPathComponent],
        only_symbols: bool,
    ) -> Result<NodeId, ResolutionError> {
        let mut current = start;
        let mut index = 0usize;
        let mut consumed_prefix = String::new();

        while index < components.len() {
            let component = &components[index];
            if component.disambiguation == Disambiguation::Anchor {
                index += 1;
                continue;
            }

            let container = match self.child_container(current, component) {
                Some(c) => c,
                None => {
                    let available = self.child_names(current);
                    return Err(ResolutionError::UnknownName {
                        payload: ErrorPayload {
                            path_prefix: consumed_prefix,
                            remaining: render(&components[index..]),
                            solutions: vec![],
                            range_adjustment: (0, 0),
                        },
                        near_misses: near_misses(&component.name, &available, 3),
                    });
                }
            };

            let matches = select(container, self.hierarchy.interner(), &component.disambiguation);

            let winner = match matches.len() {
                0 => {
                    let candidates = self.candidates_for(container);
                    return Err(ResolutionError::UnknownDisambiguation {
                        payload: ErrorPayload {
                            path_prefix: consumed_prefix,
                            remaining: render(&components[index..]),
                            solutions: vec![],
                            range_adjustment: (0, 0),
                        },
                        candidates,
                    });
                }
                1 => matches[0],
                _ => match self.disambiguate_collision(&matches, &components[index + 1..], only_symbols) {
                    Some(Winner::One(element)) => element,
                    Some(Winner::TwoComponents(element)) => {
                        current = element.node;
                        index += 2;
                        consumed_prefix = extend_prefix(consumed_prefix, component);
                        continue;
                    }
                    None => {
                        let candidates = self.candidates_for(container);
                        return Err(ResolutionError::LookupCollision {
                            payload: ErrorPayload {
                                path_prefix: consumed_prefix,
                                remaining: render(&components[index..]),
                                solutions: vec![],
                                range_adjustment: (0, 0),
                            },
                            candidates,
                        });
                    }
                },
            };

            current = winner.node;
            index += 1;
            consumed_prefix = extend_prefix(consumed_prefix, component);
        }

        let node = self.hierarchy.node(current);
        if only_symbols && !node.kind.is_symbol() {
            return Err(ResolutionError::NonSymbolMatchForSymbolLink {
                payload: ErrorPayload {
                    path_prefix: consumed_prefix,
                    remaining: String::new(),
                    solutions: vec![],
                    range_adjustment: (0, 0),
                },
                matched_path: self
                    .hierarchy
                    .interner()
                    .resolve_owned(node.name)
                    .unwrap_or_default(),
            });
        }
        if node.kind.is_sparse_placeholder() {
            return Err(ResolutionError::UnfindableMatch {
                payload: ErrorPayload {
                    path_prefix: consumed_prefix,
                    remaining: String::new(),
                    solutions: vec![],
                    range_adjustment: (0, 0),
                },
                node_name: self
                    .hierarchy
                    .interner()
                    .resolve_owned(node.name)
                    .unwrap_or_default(),
            });
        }
        Ok(current)
    }

    /// Look-ahead and tie-breaking over a collision (§4.4 descent algorithm
    /// and "Tie-breaking"). Returns the single surviving candidate, either
    /// resolved at the current component or (via look-ahead) at the next.
    fn disambiguate_collision<'a>(
        &self,
        candidates: &[&'a Element],
        next: &[ParsedPathComponent],
        only_symbols: bool,
    ) -> Option<Winner<'a>> {
        if let Some(next_component) = next.first() {
            let mut resolved: Vec<&'a Element> = Vec::new();
            for candidate in candidates {
                if self.child_container(candidate.node, next_component).is_some() {
                    resolved.push(candidate);
                }
            }
            if resolved.len() == 1 {
                return Some(Winner::TwoComponents(resolved[0]));
            }
            if resolved.len() > 1 {
                if let Some(winner) = self.prefer_swift_counterpart(&resolved) {
                    return Some(Winner::TwoComponents(winner));
                }
            }
        }

        if let Some(winner) = self.tie_break(candidates, only_symbols) {
            return Some(Winner::One(winner));
        }
        None
    }

    /// If every remaining candidate is the counterpart of every other
    /// (same underlying symbol, different source language), prefer the one
    /// whose interface language is Swift.
    fn prefer_swift_counterpart<'a>(&self, candidates: &[&'a Element]) -> Option<&'a Element> {
        if candidates.len() < 2 {
            return None;
        }
        let first = candidates[0].node;
        let all_linked = candidates[1..]
            .iter()
            .all(|c| self.hierarchy.node(first).counterpart == Some(c.node));
        if !all_linked {
            return None;
        }
        candidates.iter().copied().find(|c| {
            self.hierarchy
                .node(c.node)
                .kind
                .symbol()
                .map(|s| s.interface_language == "swift")
                .unwrap_or(false)
        })
    }

    /// §4.4's tie-breaking rule: a non-disfavored candidate beats a
    /// disfavored one; failing that, `only_symbols` breaks the tie against
    /// the "has symbol" flag if it picks out exactly one candidate.
    fn tie_break<'a>(&self, candidates: &[&'a Element], only_symbols: bool) -> Option<&'a Element> {
        let favored: Vec<&&Element> = candidates
            .iter()
            .filter(|c| {
                !self
                    .hierarchy
                    .node(c.node)
                    .special_behaviors
                    .contains(doclink_core::SpecialBehaviors::DISFAVOR_IN_COLLISION)
            })
            .collect();
        if favored.len() == 1 {
            return Some(favored[0]);
        }

        let pool: &[&Element] = if favored.len() > 1 { &favored_slice(&favored) } else { candidates };
        let matching_only_symbols: Vec<&&Element> = pool
            .iter()
            .filter(|c| self.hierarchy.node(c.node).kind.is_symbol() == only_symbols)
            .collect();
        if matching_only_symbols.len() == 1 {
            return Some(matching_only_symbols[0]);
        }
        None
    }

    fn candidates_for(&self, container: &doclink_core::DisambiguationContainer) -> Vec<Candidate> {
        container
            .elements()
            .iter()
            .enumerate()
            .map(|(i, element)| {
                let suffix = minimal_disambiguator(container, self.hierarchy.interner(), i);
                Candidate {
                    path_description: self
                        .hierarchy
                        .interner()
                        .resolve_owned(self.hierarchy.node(element.node).name)
                        .unwrap_or_default(),
                    required_suffix: suffix.render(),
                }
            })
            .collect()
    }

    /// §4.4 step 4: walk up from `parent`, trying each ancestor with and
    /// without consuming the first path component, keeping the innermost
    /// (first encountered, i.e. closest-to-`parent`) error.
    fn walk_up(
        &self,
        parent: Identifier,
        components: &[ParsedPathComponent],
        only_symbols: bool,
    ) -> Result<Identifier, ResolutionError> {
        let mut ancestor = self.hierarchy.lookup(parent);
        let mut innermost_error = None;

        while let Some(node) = ancestor {
            match self.search_for_node(node, components, only_symbols) {
                Ok(found) => return Ok(self.identifier_for(found)),
                Err(err) => {
                    if innermost_error.is_none() {
                        innermost_error = Some(err);
                    }
                }
            }

            if components.len() > 1 {
                if let Ok(found) = self.search_for_node(node, &components[1..], only_symbols) {
                    return Ok(self.identifier_for(found));
                }
            }

            ancestor = self.hierarchy.node(node).parent;
        }

        innermost_error.unwrap_or(ResolutionError::NotFound {
            payload: ErrorPayload {
                path_prefix: render(components),
                remaining: String::new(),
                solutions: vec![],
                range_adjustment: (0, 0),
            },
            available_top_level_names: vec![],
        })
        .pipe(Err)
    }
}

enum Winner<'a> {
    One(&'a Element),
    TwoComponents(&'a Element),
}

fn favored_slice<'a>(favored: &[&&'a Element]) -> Vec<&'a Element> {
    favored.iter().map(|e| **e).collect()
}

fn extend_prefix(prefix: String, component: &ParsedPathComponent) -> String {
    if prefix.is_empty() {
        component.full.clone()
    } else {
        format!("{prefix}/{}", component.full)
    }
}

fn render(components: &[ParsedPathComponent]) -> String {
    components
        .iter()
        .map(|c| c.full.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

trait Pipe: Sized {
    fn pipe<R>(self, f: impl FnOnce(Self) -> R) -> R {
        f(self)
    }
}
impl<T> Pipe for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use doclink_core::{
        HierarchyBuilder, RelationshipInput, RelationshipKind, SymbolGraphInput, SymbolInput,
    };

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

    fn build_simple_hierarchy() -> (Hierarchy, SymbolKindTable, InternPool) {
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
        let interner = hierarchy.interner().clone();
        (hierarchy, kinds, interner)
    }

    #[test]
    fn resolves_a_simple_absolute_path() {
        let (hierarchy, kinds, _interner) = build_simple_hierarchy();
        let resolver = Resolver::new(&hierarchy, &kinds);
        let id = resolver
            .resolve("documentation/MyModule/S", None, false)
            .expect("should resolve");
        assert_eq!(hierarchy.node(id.node_id()).kind.kind_id(), Some("struct"));
    }

    #[test]
    fn resolves_a_nested_member() {
        let (hierarchy, kinds, _interner) = build_simple_hierarchy();
        let resolver = Resolver::new(&hierarchy, &kinds);
        let id = resolver
            .resolve("documentation/MyModule/S/member", None, true)
            .expect("should resolve");
        assert_eq!(hierarchy.node(id.node_id()).kind.kind_id(), Some("func"));
    }

    #[test]
    fn unknown_module_is_reported_with_near_misses() {
        let (hierarchy, kinds, _interner) = build_simple_hierarchy();
        let resolver = Resolver::new(&hierarchy, &kinds);
        let err = resolver
            .resolve("documentation/MyModul", None, false)
            .unwrap_err();
        assert!(matches!(err, ResolutionError::ModuleNotFound { .. }));
    }

    #[test]
    fn unknown_child_name_is_reported() {
        let (hierarchy, kinds, _interner) = build_simple_hierarchy();
        let resolver = Resolver::new(&hierarchy, &kinds);
        let err = resolver
            .resolve("documentation/MyModule/Nope", None, false)
            .unwrap_err();
        assert!(matches!(err, ResolutionError::UnknownName { .. }));
    }

    #[test]
    fn relative_link_resolves_against_a_parent() {
        let (hierarchy, kinds, _interner) = build_simple_hierarchy();
        let resolver = Resolver::new(&hierarchy, &kinds);
        let module_name = hierarchy.interner().intern("MyModule");
        let module = hierarchy.module(module_name).unwrap();
        let struct_name = hierarchy.interner().intern("S");
        let struct_container = hierarchy.container(module, struct_name).unwrap();
        let struct_node = struct_container.elements()[0].node;
        let parent_identifier = hierarchy.node(struct_node).identifier.unwrap();

        let id = resolver
            .resolve("member", Some(parent_identifier), true)
            .expect("should resolve relative to the struct");
        assert_eq!(hierarchy.node(id.node_id()).kind.kind_id(), Some("func"));
    }
}
