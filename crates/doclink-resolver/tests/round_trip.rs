//! Cross-module integration tests: build a hierarchy from raw symbol
//! graphs, resolve links against it, disambiguate overloads, and persist
//! it through the file representation.

use doclink_core::{
    decode, HierarchyBuilder, RelationshipInput, RelationshipKind, SymbolGraphInput, SymbolInput,
    SymbolKindTable,
};
use doclink_resolver::{BundleInfo, LinkResolver};
use pretty_assertions::assert_eq;

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

fn symbol(precise_id: &str, path: &[&str], kind: &str, language: &str) -> SymbolInput {
    SymbolInput {
        precise_id: precise_id.to_string(),
        interface_language: language.to_string(),
        path_components: path.iter().map(|s| s.to_string()).collect(),
        kind_id: kind.to_string(),
        declaration_fragments: vec![],
        function_signature: None,
    }
}

fn overloaded_module() -> SymbolGraphInput {
    SymbolGraphInput {
        module_name: "Kit".to_string(),
        symbols: vec![
            symbol("s:Kit.Widget", &["Kit", "Widget"], "struct", "swift"),
            symbol(
                "s:Kit.Widget.draw-int",
                &["Kit", "Widget", "draw"],
                "func",
                "swift",
            ),
            symbol(
                "s:Kit.Widget.draw-str",
                &["Kit", "Widget", "draw"],
                "func",
                "swift",
            ),
        ],
        relationships: vec![
            RelationshipInput {
                source: "s:Kit.Widget.draw-int".to_string(),
                target: "s:Kit.Widget".to_string(),
                kind: RelationshipKind::MemberOf,
            },
            RelationshipInput {
                source: "s:Kit.Widget.draw-str".to_string(),
                target: "s:Kit.Widget".to_string(),
                kind: RelationshipKind::MemberOf,
            },
        ],
    }
}

#[test]
fn resolve_descends_through_module_and_member_hierarchy() {
    let kinds = SymbolKindTable::default();
    let hierarchy = HierarchyBuilder::new(kinds.clone()).build(vec![overloaded_module()]);
    let resolver = LinkResolver::new(hierarchy, kinds, bundle());

    let widget = resolver
        .resolve("documentation/Kit/Widget", None, false)
        .expect("Widget should resolve");
    let reference = resolver.reference_of(widget);
    assert_eq!(reference.path, "documentation/Kit/Widget");
}

#[test]
fn overloaded_members_require_a_disambiguation_suffix() {
    let kinds = SymbolKindTable::default();
    let hierarchy = HierarchyBuilder::new(kinds.clone()).build(vec![overloaded_module()]);
    let resolver = LinkResolver::new(hierarchy, kinds, bundle());

    // A bare "draw" is ambiguous between the two overloads; resolving it
    // directly should fail, but the minimal-disambiguation engine should
    // still produce distinct rendered paths for each.
    let ambiguous = resolver.resolve("documentation/Kit/Widget/draw", None, true);
    assert!(ambiguous.is_err(), "bare overloaded name must not resolve");

    let paths = resolver.disambiguated_paths(true, false, true);
    let int_path = paths.get("s:Kit.Widget.draw-int").expect("int overload path");
    let str_path = paths.get("s:Kit.Widget.draw-str").expect("str overload path");
    assert_ne!(int_path, str_path, "overloads must disambiguate to distinct paths");
    assert!(int_path.starts_with("documentation/Kit/Widget/draw"));
    assert!(str_path.starts_with("documentation/Kit/Widget/draw"));
}

#[test]
fn overloads_of_group_surfaces_the_sibling_overload() {
    let kinds = SymbolKindTable::default();
    let hierarchy = HierarchyBuilder::new(kinds.clone()).build(vec![overloaded_module()]);
    let resolver = LinkResolver::new(hierarchy, kinds, bundle());

    let paths = resolver.disambiguated_paths(true, false, true);
    let int_path = paths.get("s:Kit.Widget.draw-int").unwrap().clone();
    let id = resolver
        .resolve(&int_path, None, true)
        .expect("disambiguated path must resolve back");

    let overloads = resolver.overloads_of_group(id);
    assert_eq!(overloads.len(), 1, "the other draw overload is the only sibling");
}

#[test]
fn breadcrumbs_exclude_the_node_itself_and_walk_to_the_module_root() {
    let kinds = SymbolKindTable::default();
    let hierarchy = HierarchyBuilder::new(kinds.clone()).build(vec![overloaded_module()]);
    let resolver = LinkResolver::new(hierarchy, kinds, bundle());

    let paths = resolver.disambiguated_paths(true, false, true);
    let draw_path = paths.get("s:Kit.Widget.draw-int").unwrap().clone();
    let id = resolver.resolve(&draw_path, None, true).unwrap();

    let crumbs = resolver.breadcrumbs(id, None);
    assert_eq!(crumbs.len(), 2);
    assert_eq!(crumbs[0].path, "documentation/Kit");
    assert_eq!(crumbs[1].path, "documentation/Kit/Widget");
}

#[test]
fn serialization_round_trip_preserves_node_count_and_non_symbol_paths() {
    let kinds = SymbolKindTable::default();
    let hierarchy = HierarchyBuilder::new(kinds.clone()).build(vec![overloaded_module()]);
    let node_count = hierarchy.node_count();
    let mut resolver = LinkResolver::new(hierarchy, kinds, bundle());

    resolver.attach_anchor_sections(vec![doclink_resolver::AnchorSectionInput {
        parent: resolver.resolve("documentation/Kit/Widget", None, false).unwrap(),
        fragment_title: "Overview".to_string(),
    }]);

    let serialized = resolver.prepare_for_serialization("com.example.docs");
    assert_eq!(serialized.non_symbol_paths().len(), 1);

    let mut seen = Vec::new();
    let decoded = decode(&serialized, |idx, id| seen.push((idx, id)))
        .expect("decode must succeed for a just-encoded hierarchy");
    assert_eq!(decoded.node_count(), node_count + 1, "anchor section adds one node");
}

#[test]
fn relative_link_walks_up_past_a_member_to_find_its_type() {
    let kinds = SymbolKindTable::default();
    let hierarchy = HierarchyBuilder::new(kinds.clone()).build(vec![overloaded_module()]);
    let resolver = LinkResolver::new(hierarchy, kinds, bundle());

    let widget = resolver.resolve("documentation/Kit/Widget", None, false).unwrap();
    let paths = resolver.disambiguated_paths(true, false, true);
    let draw_path = paths.get("s:Kit.Widget.draw-int").unwrap().clone();
    let draw = resolver.resolve(&draw_path, None, true).unwrap();

    // "Widget" is not a child of `draw`, so the resolver must walk up to
    // `draw`'s parent scope (Widget itself, then Kit) to find it.
    let from_draw = resolver
        .resolve("Widget", Some(draw), false)
        .expect("walk-up should find Widget from a nested member's scope");
    assert_eq!(from_draw, widget);
}
