use manos_plate_core::{
    ApplyError, Document, Editor, Node, Op, PluginRegistry, Position, Range, Selection, TextNode,
    Transaction,
};

fn editor_with_text(text: &str) -> Editor {
    let doc = Document {
        children: vec![Node::paragraph(text)],
    };
    let selection = Selection::caret(Position::new(vec![0], 0));
    Editor::new(doc, selection, PluginRegistry::richtext())
}

fn caret_offset(editor: &Editor) -> usize {
    let Selection::Caret { position, .. } = editor.selection() else {
        panic!("expected caret, got {:?}", editor.selection());
    };
    position.offset
}

#[test]
fn undo_redo_handles_multi_op_insert_order() {
    let mut editor = editor_with_text("");

    let tx = Transaction::new(vec![
        Op::ReplaceRuns {
            path: vec![0],
            range: 0..0,
            runs: vec![TextNode::plain("a")],
        },
        Op::ReplaceRuns {
            path: vec![0],
            range: 1..1,
            runs: vec![TextNode::plain("b")],
        },
    ])
    .selection_after(Selection::caret(Position::new(vec![0], 2)))
    .source("test:multi_insert");

    editor.apply(tx).unwrap();
    assert_eq!(editor.doc().children, vec![Node::paragraph("ab")]);
    assert_eq!(caret_offset(&editor), 2);

    assert!(editor.undo());
    assert_eq!(editor.doc().children, vec![Node::paragraph("")]);
    assert_eq!(caret_offset(&editor), 0);

    assert!(editor.redo());
    assert_eq!(editor.doc().children, vec![Node::paragraph("ab")]);
    assert_eq!(caret_offset(&editor), 2);
}

#[test]
fn failed_transaction_rolls_back_applied_ops() {
    let mut editor = editor_with_text("abc");

    let tx = Transaction::new(vec![
        Op::ReplaceRuns {
            path: vec![0],
            range: 0..0,
            runs: vec![TextNode::plain("x")],
        },
        Op::ReplaceRuns {
            path: vec![0],
            range: 10..12,
            runs: Vec::new(),
        },
    ]);

    let err = editor.apply(tx).unwrap_err();
    assert!(matches!(err, ApplyError::RangeOutOfBounds { len: 4, .. }));
    assert_eq!(editor.doc().children, vec![Node::paragraph("abc")]);
    assert!(!editor.can_undo());
}

#[test]
fn change_is_a_single_undo_step() {
    let mut editor = editor_with_text("abcde");

    editor
        .change("test:format", |writer| {
            writer.set_attribute(&Range::new(vec![0], 1, 3), "bold", true)?;
            writer.set_attribute(&Range::new(vec![0], 2, 4), "italic", true)?;
            Ok(())
        })
        .unwrap();

    let Node::Element(paragraph) = &editor.doc().children[0] else {
        panic!("expected paragraph element");
    };
    let runs: Vec<&TextNode> = paragraph.runs().collect();
    assert_eq!(runs.len(), 5);
    assert_eq!(runs[0], &TextNode::plain("a"));
    assert_eq!(runs[1], &TextNode::plain("b").with_attr("bold", true));
    assert_eq!(
        runs[2],
        &TextNode::plain("c")
            .with_attr("bold", true)
            .with_attr("italic", true)
    );
    assert_eq!(runs[3], &TextNode::plain("d").with_attr("italic", true));
    assert_eq!(runs[4], &TextNode::plain("e"));

    assert!(editor.undo());
    assert_eq!(editor.doc().children, vec![Node::paragraph("abcde")]);
    assert!(!editor.can_undo());
    assert!(editor.can_redo());
}

#[test]
fn change_without_effect_records_nothing() {
    let mut editor = editor_with_text("abc");

    editor
        .change("test:noop", |writer| {
            writer.remove_attribute(&Range::new(vec![0], 1, 1), "bold")?;
            Ok(())
        })
        .unwrap();

    assert!(!editor.can_undo());
}

#[test]
fn closure_error_discards_partial_change() {
    let mut editor = editor_with_text("abc");

    let result: Result<(), ApplyError> = editor.change("test:abort", |writer| {
        writer.set_attribute(&Range::new(vec![0], 0, 3), "bold", true)?;
        Err(ApplyError::NormalizeDidNotConverge)
    });

    assert!(result.is_err());
    assert_eq!(editor.doc().children, vec![Node::paragraph("abc")]);
    assert!(editor.selection_attributes().is_empty());
}
