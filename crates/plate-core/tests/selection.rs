use manos_plate_core::{
    AttrValue, Document, Editor, Gravity, Node, Op, PluginRegistry, Position, Range, Selection,
    TextNode, Transaction,
};

fn bold_split_editor(selection: Selection) -> Editor {
    let doc = Document {
        children: vec![Node::block(
            "paragraph",
            vec![
                TextNode::plain("ab"),
                TextNode::plain("cd").with_attr("bold", true),
            ],
        )],
    };
    Editor::new(doc, selection, PluginRegistry::richtext())
}

#[test]
fn caret_attributes_follow_gravity_at_run_boundary() {
    let editor = bold_split_editor(Selection::caret(Position::new(vec![0], 2)));
    assert!(editor.selection_attributes().is_empty());

    let editor = bold_split_editor(Selection::caret_with_gravity(
        Position::new(vec![0], 2),
        Gravity::Forward,
    ));
    assert_eq!(
        editor.selection_attributes().get("bold"),
        Some(&AttrValue::Bool(true))
    );
}

#[test]
fn caret_inside_run_takes_its_attributes() {
    let editor = bold_split_editor(Selection::caret(Position::new(vec![0], 3)));
    assert_eq!(
        editor.selection_attributes().get("bold"),
        Some(&AttrValue::Bool(true))
    );
}

#[test]
fn caret_at_block_start_falls_back_to_following_run() {
    let editor = bold_split_editor(Selection::caret(Position::new(vec![0], 0)));
    assert!(editor.selection_attributes().is_empty());

    let editor = bold_split_editor(Selection::caret(Position::new(vec![0], 4)));
    assert_eq!(
        editor.selection_attributes().get("bold"),
        Some(&AttrValue::Bool(true))
    );
}

#[test]
fn range_attributes_come_from_first_covered_run() {
    let editor = bold_split_editor(Selection::range(Range::new(vec![0], 2, 4)));
    assert_eq!(
        editor.selection_attributes().get("bold"),
        Some(&AttrValue::Bool(true))
    );
}

#[test]
fn single_empty_range_becomes_caret() {
    let editor = bold_split_editor(Selection::range(Range::new(vec![0], 1, 1)));
    assert_eq!(
        editor.selection(),
        &Selection::caret(Position::new(vec![0], 1))
    );
}

#[test]
fn out_of_bounds_positions_are_clamped() {
    let editor = bold_split_editor(Selection::caret(Position::new(vec![7], 99)));
    assert_eq!(
        editor.selection(),
        &Selection::caret(Position::new(vec![0], 4))
    );
}

#[test]
fn overlapping_ranges_are_merged_and_sorted() {
    let editor = bold_split_editor(Selection::ranges(vec![
        Range::new(vec![0], 2, 4),
        Range::new(vec![0], 0, 3),
    ]));
    assert_eq!(
        editor.selection(),
        &Selection::ranges(vec![Range::new(vec![0], 0, 4)])
    );
}

#[test]
fn typing_at_caret_inherits_selection_attributes() {
    let mut editor = bold_split_editor(Selection::caret(Position::new(vec![0], 4)));

    editor.type_text("e").unwrap();

    assert_eq!(
        editor.doc().children,
        vec![Node::block(
            "paragraph",
            vec![
                TextNode::plain("ab"),
                TextNode::plain("cde").with_attr("bold", true),
            ],
        )]
    );
    assert_eq!(
        editor.selection(),
        &Selection::caret(Position::new(vec![0], 5))
    );
}

#[test]
fn removing_the_caret_block_moves_caret_to_neighbour() {
    let doc = Document {
        children: vec![Node::paragraph("ab"), Node::paragraph("cd")],
    };
    let mut editor = Editor::new(
        doc,
        Selection::caret(Position::new(vec![1], 1)),
        PluginRegistry::core(),
    );

    editor
        .apply(Transaction::new(vec![Op::RemoveNode { path: vec![1] }]))
        .unwrap();

    assert_eq!(
        editor.selection(),
        &Selection::caret(Position::new(vec![0], 0))
    );
}

#[test]
fn caret_in_nested_container_resolves_to_text_block() {
    let doc = Document {
        children: vec![
            Node::paragraph("ab"),
            Node::container("blockquote", vec![Node::paragraph("quoted")]),
        ],
    };
    let editor = Editor::new(
        doc,
        Selection::caret(Position::new(vec![1], 3)),
        PluginRegistry::richtext(),
    );

    assert_eq!(
        editor.selection(),
        &Selection::caret(Position::new(vec![1, 0], 0))
    );
}

#[test]
fn empty_document_is_normalized_to_one_paragraph() {
    let editor = Editor::new(
        Document::default(),
        Selection::caret(Position::new(vec![0], 0)),
        PluginRegistry::core(),
    );
    assert_eq!(editor.doc().children, vec![Node::paragraph("")]);
}

#[test]
fn dropped_selection_attribute_is_not_typed_with() {
    let mut editor = bold_split_editor(Selection::caret(Position::new(vec![0], 4)));

    editor
        .change("test:drop_bold", |writer| {
            writer.remove_selection_attribute("bold");
            assert!(!writer.selection_attributes().contains_key("bold"));
            Ok(())
        })
        .unwrap();

    assert!(!editor.selection_attributes().contains_key("bold"));
    assert!(!editor.can_undo());

    editor.type_text("x").unwrap();

    let Node::Element(paragraph) = &editor.doc().children[0] else {
        panic!("expected paragraph");
    };
    assert_eq!(
        paragraph.runs().cloned().collect::<Vec<_>>(),
        vec![
            TextNode::plain("ab"),
            TextNode::plain("cd").with_attr("bold", true),
            TextNode::plain("x"),
        ]
    );
}
