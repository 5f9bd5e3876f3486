use manos_plate_core::{
    Document, Editor, Node, PluginRegistry, Position, Range, Selection, TextNode,
};
use manos_plate_link::{
    LINK_HREF, LinkConfig, LinkFeature,
    ui::{
        Bounds, EditingView, LinkPanel, LinkUiEvent, LinkUiState, PanelStack, PositionTarget,
        StackEntry, UiContext, VecPanelStack,
    },
};
use serde_json::json;

#[derive(Default)]
struct RecordingView {
    focused: Vec<String>,
    added: Vec<Range>,
    removed: Vec<Range>,
}

impl EditingView for RecordingView {
    fn anchor_for(&self, target: &PositionTarget) -> Option<Bounds> {
        let x = match target {
            PositionTarget::Run(range) => range.start.offset,
            PositionTarget::Selection(ranges) => ranges.first()?.start.offset,
        };
        Some(Bounds {
            x: x as f32 * 8.0,
            y: 0.0,
            width: 8.0,
            height: 16.0,
        })
    }

    fn focus_panel(&mut self, panel: LinkPanel) {
        self.focused.push(format!("{panel:?}"));
    }

    fn focus_editable(&mut self) {
        self.focused.push("editable".to_string());
    }

    fn add_highlight(&mut self, range: &Range) {
        self.added.push(range.clone());
    }

    fn remove_highlight(&mut self, range: &Range) {
        self.removed.push(range.clone());
    }
}

struct Session {
    feature: LinkFeature,
    editor: Editor,
    panels: VecPanelStack,
    view: RecordingView,
}

impl Session {
    fn new(config: serde_json::Value, doc: Document, selection: Selection) -> Self {
        let config: LinkConfig = serde_json::from_value(config).unwrap();
        let mut feature = LinkFeature::new(&config).unwrap();
        let mut registry = PluginRegistry::richtext();
        registry.register_plugin(Box::new(feature.plugin())).unwrap();
        let editor = Editor::new(doc, selection, registry);
        feature.refresh(&editor);

        Self {
            feature,
            editor,
            panels: VecPanelStack::new(),
            view: RecordingView::default(),
        }
    }

    fn send(&mut self, event: LinkUiEvent) {
        let mut cx = UiContext {
            editor: &mut self.editor,
            panels: &mut self.panels,
            view: &mut self.view,
        };
        self.feature.handle(&mut cx, event).unwrap();
    }

    fn select(&mut self, selection: Selection) {
        self.editor.set_selection(selection);
        self.send(LinkUiEvent::SelectionChanged);
    }

    fn state(&self) -> LinkUiState {
        self.feature.state(&self.panels)
    }

    fn last_focus(&self) -> Option<&str> {
        self.view.focused.last().map(String::as_str)
    }
}

fn decorators() -> serde_json::Value {
    json!({
        "decorators": [
            { "mode": "manual", "id": "download", "label": "Downloadable" },
            { "mode": "manual", "id": "gallery", "label": "Gallery", "default_value": true }
        ]
    })
}

fn caret(block: usize, offset: usize) -> Selection {
    Selection::caret(Position::new(vec![block], offset))
}

/// `see site now` with `site` linked to `a`.
fn linked_doc() -> Document {
    Document::new(vec![Node::block(
        "paragraph",
        vec![
            TextNode::plain("see "),
            TextNode::plain("site").with_attr(LINK_HREF, "a"),
            TextNode::plain(" now"),
        ],
    )])
}

fn open() -> LinkUiEvent {
    LinkUiEvent::Open { force: false }
}

#[test]
fn open_without_link_shows_form_and_empty_submit_hides() {
    let mut session = Session::new(
        json!({}),
        Document::new(vec![Node::paragraph("hello")]),
        caret(0, 5),
    );

    session.send(open());
    assert_eq!(session.state(), LinkUiState::FormShown);
    assert!(session.panels.contains(LinkPanel::Actions));
    assert!(session.panels.is_visible(LinkPanel::Form));
    assert_eq!(session.last_focus(), Some("Form"));
    assert_eq!(session.feature.ui().form().url, "");
    assert!(session.feature.ui().form().save_enabled);

    session.send(LinkUiEvent::Submit);

    assert_eq!(session.state(), LinkUiState::Hidden);
    assert_eq!(session.last_focus(), Some("editable"));
    assert_eq!(session.editor.doc().children, vec![Node::paragraph("hello")]);
    assert!(!session.editor.can_undo());
}

#[test]
fn submit_inserts_link_and_falls_back_to_actions() {
    let mut session = Session::new(
        json!({}),
        Document::new(vec![Node::paragraph("go ")]),
        caret(0, 3),
    );

    session.send(open());
    session.send(LinkUiEvent::UrlInput("https://x.org".to_string()));
    session.send(LinkUiEvent::Submit);

    assert_eq!(
        session.editor.doc().children,
        vec![Node::block(
            "paragraph",
            vec![
                TextNode::plain("go "),
                TextNode::plain("https://x.org").with_attr(LINK_HREF, "https://x.org"),
            ],
        )]
    );
    assert_eq!(session.state(), LinkUiState::ActionsShown);
    assert_eq!(
        session.feature.ui().actions().href.as_deref(),
        Some("https://x.org")
    );
    assert!(session.feature.ui().actions().unlink_enabled);

    session.send(LinkUiEvent::SelectionChanged);
    assert_eq!(session.state(), LinkUiState::ActionsShown);
    assert_eq!(
        session.panels.position_of(LinkPanel::Actions).map(|p| &p.target),
        Some(&PositionTarget::Run(Range::new(vec![0], 3, 16)))
    );
}

#[test]
fn submit_applies_default_protocol() {
    let mut session = Session::new(
        json!({ "default_protocol": "https://" }),
        Document::new(vec![Node::paragraph("")]),
        caret(0, 0),
    );

    session.send(open());
    session.send(LinkUiEvent::UrlInput("example.com".to_string()));
    session.send(LinkUiEvent::Submit);

    assert_eq!(
        session.editor.doc().children,
        vec![Node::block(
            "paragraph",
            vec![
                TextNode::plain("https://example.com").with_attr(LINK_HREF, "https://example.com"),
            ],
        )]
    );
}

#[test]
fn open_is_ignored_where_links_are_not_allowed() {
    let mut session = Session::new(
        json!({}),
        Document::new(vec![Node::block("code_block", vec![TextNode::plain("fn")])]),
        caret(0, 1),
    );

    session.send(open());

    assert_eq!(session.state(), LinkUiState::Hidden);
    assert!(session.panels.entries().is_empty());
    assert!(!session.feature.ui().form().save_enabled);
}

#[test]
fn open_inside_link_shows_actions_then_escape_hides() {
    let mut session = Session::new(json!({}), linked_doc(), caret(0, 6));

    session.send(open());
    assert_eq!(session.state(), LinkUiState::ActionsShown);
    assert_eq!(session.last_focus(), Some("Actions"));
    assert_eq!(session.feature.ui().actions().href.as_deref(), Some("a"));

    session.send(LinkUiEvent::Escape);
    assert_eq!(session.state(), LinkUiState::Hidden);
    assert_eq!(session.last_focus(), Some("editable"));
}

#[test]
fn opening_twice_escalates_to_form() {
    let mut session = Session::new(json!({}), linked_doc(), caret(0, 6));

    session.send(open());
    session.send(open());

    assert_eq!(session.state(), LinkUiState::FormShown);
    assert_eq!(session.feature.ui().form().url, "a");
    assert_eq!(session.last_focus(), Some("Form"));
}

#[test]
fn edit_switches_actions_to_form() {
    let mut session = Session::new(json!({}), linked_doc(), caret(0, 6));

    session.send(LinkUiEvent::Edit);
    assert_eq!(session.state(), LinkUiState::Hidden);

    session.send(open());
    session.send(LinkUiEvent::Edit);
    assert_eq!(session.state(), LinkUiState::FormShown);
    assert_eq!(session.feature.ui().form().url, "a");
}

#[test]
fn clicking_a_link_shows_actions_without_focus() {
    let mut session = Session::new(json!({}), linked_doc(), caret(0, 6));

    session.send(LinkUiEvent::LinkClicked);

    assert_eq!(session.state(), LinkUiState::ActionsShown);
    assert!(session.view.focused.is_empty());

    session.send(LinkUiEvent::ClickOutside);
    assert_eq!(session.state(), LinkUiState::Hidden);

    session.editor.set_selection(caret(0, 1));
    session.send(LinkUiEvent::LinkClicked);
    assert_eq!(session.state(), LinkUiState::Hidden);
}

#[test]
fn cancel_reverts_unsaved_decorator_toggles() {
    let mut session = Session::new(decorators(), linked_doc(), caret(0, 6));

    session.send(open());
    session.send(LinkUiEvent::Edit);
    session.send(LinkUiEvent::ToggleDecorator {
        id: "download".to_string(),
        value: true,
    });

    let switches = session
        .feature
        .ui()
        .decorator_switches(&session.feature.commands().link);
    assert!(switches[0].is_on);

    session.send(LinkUiEvent::Cancel);

    assert_eq!(session.state(), LinkUiState::ActionsShown);
    let switches = session
        .feature
        .ui()
        .decorator_switches(&session.feature.commands().link);
    assert_eq!(switches[0].id, "download");
    assert!(!switches[0].is_on);
    assert!(!switches[1].is_on);
    assert_eq!(session.editor.doc(), &linked_doc());
}

#[test]
fn cancel_without_link_hides_everything() {
    let mut session = Session::new(
        decorators(),
        Document::new(vec![Node::paragraph("plain")]),
        caret(0, 2),
    );

    session.send(open());
    let switches = session
        .feature
        .ui()
        .decorator_switches(&session.feature.commands().link);
    assert!(!switches[0].is_on);
    assert!(switches[1].is_on);

    session.send(LinkUiEvent::Cancel);
    assert_eq!(session.state(), LinkUiState::Hidden);
}

#[test]
fn submit_writes_decorator_switches() {
    let mut session = Session::new(
        decorators(),
        Document::new(vec![Node::paragraph("")]),
        caret(0, 0),
    );

    session.send(open());
    session.send(LinkUiEvent::UrlInput("b".to_string()));
    session.send(LinkUiEvent::ToggleDecorator {
        id: "download".to_string(),
        value: true,
    });
    session.send(LinkUiEvent::Submit);

    assert_eq!(
        session.editor.doc().children,
        vec![Node::block(
            "paragraph",
            vec![
                TextNode::plain("b")
                    .with_attr(LINK_HREF, "b")
                    .with_attr("linkDownload", true)
                    .with_attr("linkGallery", true),
            ],
        )]
    );
}

#[test]
fn leaving_the_link_hides_ui() {
    let mut session = Session::new(json!({}), linked_doc(), caret(0, 6));

    session.send(open());
    session.select(caret(0, 7));
    assert_eq!(session.state(), LinkUiState::ActionsShown);

    session.select(caret(0, 1));
    assert_eq!(session.state(), LinkUiState::Hidden);
}

#[test]
fn moving_to_another_block_hides_ui() {
    let mut session = Session::new(
        json!({}),
        Document::new(vec![Node::paragraph("one"), Node::paragraph("two")]),
        caret(0, 1),
    );

    session.send(open());
    session.select(caret(0, 3));
    assert_eq!(session.state(), LinkUiState::FormShown);
    assert_eq!(
        session.panels.position_of(LinkPanel::Form).map(|p| &p.target),
        Some(&PositionTarget::Selection(vec![Range::new(vec![0], 3, 3)]))
    );

    session.select(caret(1, 1));
    assert_eq!(session.state(), LinkUiState::Hidden);
}

#[test]
fn expanding_the_selection_hides_ui() {
    let mut session = Session::new(
        json!({}),
        Document::new(vec![Node::paragraph("plain")]),
        caret(0, 1),
    );

    session.send(open());
    session.select(Selection::range(Range::new(vec![0], 1, 3)));

    assert_eq!(session.state(), LinkUiState::Hidden);
}

#[test]
fn unlink_event_removes_link_and_hides() {
    let mut session = Session::new(json!({}), linked_doc(), caret(0, 6));

    session.send(open());
    assert!(session.feature.ui().actions().unlink_enabled);

    session.send(LinkUiEvent::Unlink);

    assert_eq!(
        session.editor.doc().children,
        vec![Node::paragraph("see site now")]
    );
    assert_eq!(session.state(), LinkUiState::Hidden);
    assert!(!session.feature.ui().actions().unlink_enabled);
    assert_eq!(session.feature.ui().actions().href, None);
}

#[test]
fn forced_open_brings_link_panels_to_front() {
    let mut session = Session::new(json!({}), linked_doc(), caret(0, 6));

    session.send(open());
    session.panels.push_foreign("toolbar");

    session.send(open());
    assert_eq!(
        session.panels.visible(),
        Some(&StackEntry::Foreign("toolbar".to_string()))
    );

    session.send(LinkUiEvent::Open { force: true });
    assert!(session.panels.is_visible(LinkPanel::Actions));
    assert_eq!(session.state(), LinkUiState::ActionsShown);
}

#[test]
fn forced_open_without_link_brings_form_to_front() {
    let mut session = Session::new(
        json!({}),
        Document::new(vec![Node::paragraph("plain")]),
        caret(0, 2),
    );

    session.send(open());
    session.panels.push_foreign("toolbar");

    session.send(open());
    assert_eq!(
        session.panels.visible(),
        Some(&StackEntry::Foreign("toolbar".to_string()))
    );

    session.send(LinkUiEvent::Open { force: true });
    assert!(session.panels.is_visible(LinkPanel::Form));
    assert!(session.panels.contains(LinkPanel::Actions));
    assert_eq!(session.state(), LinkUiState::FormShown);
}

#[test]
fn highlight_follows_caret_inside_link() {
    let mut session = Session::new(json!({}), linked_doc(), caret(0, 6));

    session.feature.render(&session.editor, &mut session.view);
    let link = Range::new(vec![0], 4, 8);
    assert_eq!(session.view.added, vec![link.clone()]);
    assert_eq!(session.feature.highlight().highlighted(), &[link.clone()]);

    session.editor.set_selection(caret(0, 1));
    session.feature.render(&session.editor, &mut session.view);
    assert_eq!(session.view.removed, vec![link.clone()]);
    assert!(session.feature.highlight().highlighted().is_empty());

    session.editor.set_selection(caret(0, 5));
    session.feature.render(&session.editor, &mut session.view);
    session.feature.before_structural_change(&mut session.view);
    assert_eq!(session.view.removed, vec![link.clone(), link]);
    assert!(session.feature.highlight().highlighted().is_empty());
}

#[test]
fn typing_after_inserted_link_does_not_extend_it() {
    let mut session = Session::new(
        json!({}),
        Document::new(vec![Node::paragraph("go ")]),
        caret(0, 3),
    );

    session
        .editor
        .change("paste", |writer| {
            writer.insert_content(
                &Position::new(vec![0], 3),
                vec![TextNode::plain("x").with_attr(LINK_HREF, "a")],
            )?;
            Ok(())
        })
        .unwrap();

    assert_eq!(session.editor.selection(), &caret(0, 4));
    assert!(!session.editor.selection_attributes().contains_key(LINK_HREF));

    session.editor.type_text("y").unwrap();

    assert_eq!(
        session.editor.doc().children,
        vec![Node::block(
            "paragraph",
            vec![
                TextNode::plain("go "),
                TextNode::plain("x").with_attr(LINK_HREF, "a"),
                TextNode::plain("y"),
            ],
        )]
    );
}

#[test]
fn inserting_inside_link_keeps_link_attributes() {
    let mut session = Session::new(
        json!({}),
        Document::new(vec![Node::block(
            "paragraph",
            vec![TextNode::plain("ab").with_attr(LINK_HREF, "a")],
        )]),
        caret(0, 1),
    );

    session
        .editor
        .change("paste", |writer| {
            writer.insert_content(
                &Position::new(vec![0], 1),
                vec![TextNode::plain("z").with_attr(LINK_HREF, "a")],
            )?;
            Ok(())
        })
        .unwrap();

    assert!(session.editor.selection_attributes().contains_key(LINK_HREF));
}
