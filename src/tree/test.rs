use std::rc::Rc;

use proptest::prelude::*;
use tracing_test::traced_test;

use super::*;
use crate::{
    equivalence::{ByIdentity, KeyFn},
    hierarchy::{descendants_post_order, descendants_pre_order},
};

/// ```text
/// /
/// ├── //foo
/// │   ├── //foo/bar
/// │   └── //foo/baz
/// └── //qux
/// ```
fn sample() -> RootedTree<&'static str> {
    let mut tree = RootedTree::new("/");
    let added = tree.add_edge_range([
        Edge::new("/", "//foo"),
        Edge::new("//foo", "//foo/bar"),
        Edge::new("//foo", "//foo/baz"),
        Edge::new("/", "//qux"),
    ]);
    assert_eq!(added, 4);
    tree
}

#[test]
fn new_tree_holds_only_the_root() {
    let tree = RootedTree::new("/");
    assert_eq!(tree.root(), &"/");
    assert_eq!(tree.vertex_count(), 1);
    assert!(tree.is_edges_empty());
    assert!(!tree.is_vertices_empty());
    assert_eq!(tree.depth(&"/"), Some(0));
    assert_eq!(tree.parent_and_edge_in(&"/"), Err(TreeError::NoParent("/")));
}

#[test]
fn add_edge_links_parent_and_depth() {
    let tree = sample();

    assert_eq!(tree.vertex_count(), tree.edge_count() + 1);
    assert_eq!(tree.depth(&"//foo/bar"), Some(2));
    assert_eq!(
        tree.parent_and_edge_in(&"//foo/bar"),
        Ok((&"//foo", &Edge::new("//foo", "//foo/bar")))
    );
    assert!(tree.contains_edge(&"//foo", &"//foo/baz"));
    assert!(!tree.contains_edge(&"/", &"//foo/baz"));
    tree.validate().unwrap();
}

#[test]
fn add_edge_rejections_leave_tree_untouched() {
    let mut tree = sample();

    // unknown source
    assert!(!tree.add_edge(Edge::new("//nope", "//nope/x")));
    // target already present, even under another parent
    assert!(!tree.add_edge(Edge::new("//qux", "//foo/bar")));
    // self-loop
    assert!(!tree.add_edge(Edge::new("//qux", "//qux")));
    // back to the root
    assert!(!tree.add_edge(Edge::new("//qux", "/")));

    assert_eq!(tree.vertex_count(), 5);
    assert_eq!(tree.depth(&"//foo/bar"), Some(2));
    tree.validate().unwrap();
}

#[test]
fn out_edges_keep_insertion_order() {
    let tree = sample();

    let children: Vec<_> = tree.child_get_many(&"//foo").unwrap().copied().collect();
    assert_eq!(children, vec!["//foo/bar", "//foo/baz"]);
    assert_eq!(tree.out_degree(&"/"), Some(2));
    assert_eq!(tree.out_edge(&"/", 1), Some(&Edge::new("/", "//qux")));
    assert_eq!(tree.out_edge(&"/", 2), None);
    assert!(tree.is_out_edges_empty(&"//qux"));
    assert!(tree.is_out_edges_empty(&"//nope"));
    assert!(tree.child_get_many(&"//nope").is_err());
}

#[test]
fn child_get_reports_what_is_missing() {
    let tree = sample();

    assert_eq!(tree.child_get(&"//foo", &"//foo/baz"), Ok(&"//foo/baz"));
    assert_eq!(
        tree.child_get(&"//qux", &"x"),
        Err(TreeError::ChildNotFound {
            parent: "//qux",
            child: "x"
        })
    );
    assert_eq!(
        tree.child_get(&"//nope", &"x"),
        Err(TreeError::VertexNotFound("//nope"))
    );
}

#[test]
fn remove_edge_truncates_subtree() {
    let mut tree = sample();

    assert!(tree.remove_edge(&Edge::new("/", "//foo")));
    assert!(!tree.contains_vertex(&"//foo"));
    assert!(!tree.contains_vertex(&"//foo/bar"));
    assert!(!tree.contains_vertex(&"//foo/baz"));
    assert_eq!(tree.depth(&"//foo/bar"), None);
    assert!(tree.contains_vertex(&"/"));
    assert!(tree.contains_vertex(&"//qux"));
    assert_eq!(tree.vertex_count(), 2);
    tree.validate().unwrap();

    // no longer an edge
    assert!(!tree.remove_edge(&Edge::new("/", "//foo")));
    // wrong parent
    assert!(!tree.remove_edge(&Edge::new("//foo", "//qux")));
    assert!(!tree.remove_edge(&Edge::new("/", "/")));
}

#[test]
fn truncate_returns_edges_children_first() {
    let mut tree = sample();

    let removed = tree.truncate(&Edge::new("/", "//foo")).unwrap();
    similar_asserts::assert_eq!(
        removed,
        vec![
            Edge::new("//foo", "//foo/bar"),
            Edge::new("//foo", "//foo/baz"),
            Edge::new("/", "//foo"),
        ]
    );
    assert_eq!(tree.truncate(&Edge::new("/", "//foo")), None);
}

#[test]
fn remove_edge_if_skips_already_truncated() {
    let mut tree = sample();
    assert_eq!(tree.remove_edge_if(|e| e.source == "//foo"), 2);
    assert_eq!(tree.vertex_count(), 3);

    let mut tree = sample();
    assert_eq!(tree.remove_edge_if(|_| true), 2);
    assert_eq!(tree.vertices().copied().collect::<Vec<_>>(), vec!["/"]);
}

#[test]
fn remove_out_edges() {
    let mut tree = sample();
    assert_eq!(
        tree.remove_out_edge_if(&"/", |e| e.target.ends_with("qux")),
        1
    );
    assert_eq!(tree.remove_out_edge_if(&"//nope", |_| true), 0);

    tree.clear_out_edges(&"//foo");
    assert!(tree.is_out_edges_empty(&"//foo"));
    assert_eq!(tree.edges().collect::<Vec<_>>(), vec![&Edge::new("/", "//foo")]);
}

#[test]
fn clear_is_idempotent() {
    let mut tree = sample();
    tree.clear();
    tree.clear();

    assert_eq!(tree.vertex_count(), 1);
    assert_eq!(tree.edge_count(), 0);
    assert_eq!(tree.depth(&"/"), Some(0));
    assert!(tree.add_edge(Edge::new("/", "//foo")));
    tree.validate().unwrap();
}

#[test]
fn descendants_in_pre_and_post_order() {
    let tree = sample();

    let pre: Vec<_> = descendants_pre_order(&tree, &"/").copied().collect();
    assert_eq!(pre, vec!["//foo", "//foo/bar", "//foo/baz", "//qux"]);

    let below_foo: Vec<_> = descendants_pre_order(&tree, &"//foo").copied().collect();
    assert_eq!(below_foo.first(), Some(&"//foo/bar"));
    assert_eq!(below_foo.last(), Some(&"//foo/baz"));

    let post: Vec<_> = descendants_post_order(&tree, &"/").copied().collect();
    assert_eq!(post, vec!["//foo/bar", "//foo/baz", "//foo", "//qux"]);
}

#[test]
fn ancestors_walk_to_the_root() {
    let tree = sample();
    let up: Vec<_> = tree.ancestors(&"//foo/baz").copied().collect();
    assert_eq!(up, vec!["//foo/baz", "//foo", "/"]);
    assert_eq!(tree.ancestors(&"//nope").count(), 1);
}

#[test]
fn traverse_try_follows_queries() {
    let tree = sample();

    assert_eq!(
        tree.traverse_try(&["//foo", "//foo/baz"]),
        Some(vec![&"//foo", &"//foo/baz"])
    );
    assert_eq!(tree.traverse_try(&["//foo", "//qux"]), None);
    assert_eq!(tree.traverse_try(&[]), Some(vec![]));
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct TestVertex {
    name: String,
}

fn vertex(name: &str) -> Rc<TestVertex> {
    Rc::new(TestVertex {
        name: name.to_string(),
    })
}

#[test]
fn shared_str_vertices_keep_lookups_cheap() {
    let root: Rc<str> = Rc::from("/");
    let foo: Rc<str> = Rc::from("//foo");
    let mut tree = RootedTree::new(root.clone());
    assert!(tree.add_edge(Edge::new(root.clone(), foo.clone())));

    let held = Rc::strong_count(&foo);
    let query: Rc<str> = Rc::from("//foo");
    for _ in 0..8 {
        assert!(tree.contains_vertex(&query));
        assert_eq!(tree.depth(&query), Some(1));
        assert!(tree.try_get_edge(&root, &query).is_some());
    }
    assert_eq!(Rc::strong_count(&foo), held);
    assert_eq!(Rc::strong_count(&query), 1);

    let stored = tree.try_get_vertex(&query).unwrap();
    assert!(Rc::ptr_eq(stored, &foo));
    assert_eq!(tree.try_get_vertex(&Rc::from("//bar")), None);
}

#[test]
fn local_lookup_finds_the_stored_child() {
    let root = vertex("/");
    let foo = vertex("foo");
    let mut tree = RootedTree::with_equivalence(
        root.clone(),
        ByIdentity,
        KeyFn::new(|v: &Rc<TestVertex>| v.name.clone()),
    );
    assert!(tree.add_edge(Edge::new(root.clone(), foo.clone())));

    let query = vertex("foo");
    let edge = tree.try_get_edge(&root, &query).unwrap();
    assert!(Rc::ptr_eq(&edge.target, &foo));
    assert!(Rc::ptr_eq(tree.try_child_get(&root, &query).unwrap(), &foo));

    // Globally the query is a different vertex.
    assert!(!tree.contains_vertex(&query));
    assert!(tree.contains_vertex(&foo));
    assert_eq!(tree.depth(&query), None);

    // Siblings must be locally distinct, cousins need not.
    assert!(!tree.add_edge(Edge::new(root.clone(), query.clone())));
    let bar = vertex("bar");
    assert!(tree.add_edge(Edge::new(root.clone(), bar.clone())));
    assert!(tree.add_edge(Edge::new(bar, query.clone())));
    assert_eq!(tree.depth(&query), Some(2));
    tree.validate().unwrap();
}

#[test]
fn debug_draw_sample() {
    let tree = sample();
    insta::assert_snapshot!(tree.debug_draw(|v| v.to_string()), @r"
    /
    ├── //foo
    │   ├── //foo/bar
    │   └── //foo/baz
    └── //qux
    ");
}

#[test]
#[traced_test]
fn truncation_is_traced() {
    let mut tree = sample();
    tree.remove_edge(&Edge::new("/", "//foo"));
    assert!(logs_contain("subtree truncated"));
}

proptest! {
    #[test]
    fn random_mutations_keep_a_tree(ops in prop::collection::vec((0u8..12, 0u8..12, any::<bool>()), 0..64)) {
        let mut tree = RootedTree::new(0u8);

        for (source, target, add) in ops {
            let edge = Edge::new(source, target);
            if add {
                let was_present = tree.contains_vertex(&target);
                let accepted = tree.add_edge(edge.clone());
                prop_assert!(!(accepted && was_present));
                if accepted {
                    prop_assert!(tree.contains_edge(&source, &target));
                }
            } else {
                tree.remove_edge(&edge);
                prop_assert!(!tree.contains_edge(&source, &target));
            }

            prop_assert!(tree.validate().is_ok());
            prop_assert_eq!(tree.vertex_count(), tree.edge_count() + 1);
            for v in tree.vertices() {
                prop_assert_eq!(tree.ancestors(v).last(), Some(&0));
                prop_assert_eq!(tree.ancestors(v).count(), tree.depth(v).unwrap_or(0) + 1);
            }
        }
    }
}
