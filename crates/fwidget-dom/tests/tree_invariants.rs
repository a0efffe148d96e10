//! Property invariants for document tree mutation.
//!
//! Random operation streams run against the public `Document` API; after each
//! step every live node's parent link must agree with its parent's child list
//! and the tree must stay acyclic.

use fwidget_dom::{Document, NodeId, PagePoint, Tag};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Create,
    Append { parent: usize, child: usize },
    InsertFirst { parent: usize, child: usize },
    Remove { child: usize },
    Destroy { node: usize },
    Move { node: usize, x: i32, y: i32 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::Create),
        3 => (0usize..32, 0usize..32).prop_map(|(parent, child)| Op::Append { parent, child }),
        1 => (0usize..32, 0usize..32).prop_map(|(parent, child)| Op::InsertFirst { parent, child }),
        1 => (0usize..32).prop_map(|child| Op::Remove { child }),
        1 => (0usize..32).prop_map(|node| Op::Destroy { node }),
        1 => (0usize..32, -500i32..500, -500i32..500).prop_map(|(node, x, y)| Op::Move { node, x, y }),
    ]
}

fn pick(pool: &[NodeId], index: usize) -> Option<NodeId> {
    if pool.is_empty() {
        None
    } else {
        Some(pool[index % pool.len()])
    }
}

fn apply(doc: &mut Document, pool: &mut Vec<NodeId>, op: &Op) {
    match *op {
        Op::Create => pool.push(doc.create_element(Tag::Div)),
        Op::Append { parent, child } => {
            if let (Some(p), Some(c)) = (pick(pool, parent), pick(pool, child)) {
                let _ = doc.append_child(p, c);
            }
        }
        Op::InsertFirst { parent, child } => {
            if let (Some(p), Some(c)) = (pick(pool, parent), pick(pool, child)) {
                let first = doc.first_child(p);
                let _ = doc.insert_before(p, c, first);
            }
        }
        Op::Remove { child } => {
            if let Some(c) = pick(pool, child)
                && let Some(p) = doc.parent(c)
            {
                doc.remove_child(p, c).expect("parent link is authoritative");
            }
        }
        Op::Destroy { node } => {
            if let Some(n) = pick(pool, node) {
                let _ = doc.destroy(n);
            }
        }
        Op::Move { node, x, y } => {
            if let Some(n) = pick(pool, node)
                && doc.exists(n)
            {
                doc.set_xy(n, PagePoint::new(x, y)).expect("live node");
                assert_eq!(doc.xy(n), Some(PagePoint::new(x, y)));
            }
        }
    }
}

fn assert_consistent(doc: &Document, pool: &[NodeId]) {
    for &node in pool.iter().chain([doc.root(), doc.body()].iter()) {
        if !doc.exists(node) {
            assert!(doc.children(node).is_empty());
            continue;
        }
        if let Some(parent) = doc.parent(node) {
            assert!(doc.exists(parent), "{node} points at a freed parent");
            let hits = doc.children(parent).iter().filter(|c| **c == node).count();
            assert_eq!(hits, 1, "{node} must appear once under {parent}");
        }
        for &child in doc.children(node) {
            assert_eq!(doc.parent(child), Some(node));
        }
        let path = doc.path_to_root(node);
        let mut dedup = path.clone();
        dedup.sort();
        dedup.dedup();
        assert_eq!(dedup.len(), path.len(), "cycle through {node}");
    }
}

proptest! {
    #[test]
    fn random_mutations_keep_links_consistent(ops in prop::collection::vec(op_strategy(), 1..80)) {
        let mut doc = Document::new();
        let mut pool = vec![doc.body()];
        for op in &ops {
            apply(&mut doc, &mut pool, op);
            assert_consistent(&doc, &pool);
        }
    }

    #[test]
    fn attached_ids_resolve_detached_ids_do_not(attach in any::<bool>()) {
        let mut doc = Document::new();
        let node = doc.create_element(Tag::Span);
        doc.set_id_attr(node, "probe").expect("id");
        if attach {
            doc.append_child(doc.body(), node).expect("append");
        }
        prop_assert_eq!(doc.get_element_by_id("probe").is_some(), attach);
    }
}

#[test]
fn text_nodes_reject_children() {
    let mut doc = Document::new();
    let text = doc.create_text("hello");
    let span = doc.create_element(Tag::Span);
    assert!(doc.append_child(text, span).is_err());
    assert_eq!(doc.text(text), Some("hello"));
}

#[test]
fn root_and_body_cannot_be_destroyed() {
    let mut doc = Document::new();
    assert!(doc.destroy(doc.root()).is_err());
    assert!(doc.destroy(doc.body()).is_err());
    assert!(doc.is_attached(doc.body()));
}
