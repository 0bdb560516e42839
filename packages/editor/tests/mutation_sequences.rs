//! Tests for longer mutation sequences: chains of moves, removals and
//! duplicates applied to the same tree

use trellis_editor::tree::{find_node, flatten_tree};
use trellis_editor::{Direction, Document, Mutation};

fn order(doc: &Document) -> Vec<String> {
    doc.root()
        .children
        .iter()
        .map(|n| n.label().to_string())
        .collect()
}

fn list() -> Document {
    Document::from_source(
        r#"
        <text name="A">a</text>
        <text name="B">b</text>
        <text name="C">c</text>
        "#,
    )
    .unwrap()
}

#[test]
fn test_move_down_to_the_end() {
    let mut doc = list();

    for _ in 0..5 {
        doc.apply(Mutation::Move {
            node_id: "el-1".to_string(),
            direction: Direction::Down,
        });
    }

    assert_eq!(order(&doc), vec!["B", "C", "A"]);
    // Only two of the five moves could happen
    assert_eq!(doc.version(), 2);
}

#[test]
fn test_move_then_delete_sequence() {
    let mut doc = list();

    let result = doc.apply_batch(vec![
        Mutation::Move {
            node_id: "el-3".to_string(),
            direction: Direction::Up,
        },
        Mutation::Remove {
            node_id: "el-1".to_string(),
        },
        Mutation::Move {
            node_id: "el-1".to_string(),
            direction: Direction::Down,
        },
    ]);

    assert!(result.changed);
    assert_eq!(result.version, 2);
    assert_eq!(order(&doc), vec!["C", "B"]);
    assert!(find_node(doc.root(), "el-1").is_none());
}

#[test]
fn test_duplicate_chain_keeps_copies_next_to_original() {
    let mut doc = list();

    doc.apply(Mutation::Duplicate {
        node_id: "el-2".to_string(),
    });
    doc.apply(Mutation::Duplicate {
        node_id: "el-2".to_string(),
    });

    assert_eq!(order(&doc), vec!["A", "B", "B", "B", "C"]);
    let ids: Vec<&str> = doc.root().children.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["el-1", "el-2", "el-5", "el-4", "el-3"]);
}

#[test]
fn test_remove_everything() {
    let mut doc = list();

    let ids: Vec<String> = flatten_tree(doc.root())
        .iter()
        .map(|n| n.id.clone())
        .collect();
    for id in ids {
        doc.apply(Mutation::Remove { node_id: id });
    }

    assert!(doc.root().children.is_empty());
    assert_eq!(doc.source(), "");
}
