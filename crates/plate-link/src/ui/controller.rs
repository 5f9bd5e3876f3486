use manos_plate_core::{Editor, Path, Range, Selection};
use tracing::debug;

use super::form::{DecoratorSwitch, LinkActionsState, LinkFormState};
use super::panels::{LinkPanel, PanelPosition, PanelStack, PositionTarget};
use super::view::EditingView;
use crate::attribute::LINK_HREF;
use crate::command::{Command, CommandChange};
use crate::config::add_protocol_if_applicable;
use crate::error::LinkError;
use crate::feature::LinkCommands;
use crate::link_command::{LinkArgs, LinkCommand};
use crate::range::find_attribute_range;
use crate::schema::LinkSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkUiState {
    #[default]
    Hidden,
    ActionsShown,
    FormShown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LinkUiEvent {
    /// Explicit request to open the link UI, e.g. a keystroke or toolbar button.
    Open { force: bool },
    LinkClicked,
    Edit,
    Submit,
    Cancel,
    Unlink,
    UrlInput(String),
    ToggleDecorator { id: String, value: bool },
    Escape,
    ClickOutside,
    SelectionChanged,
}

pub struct UiContext<'a> {
    pub editor: &'a mut Editor,
    pub panels: &'a mut dyn PanelStack,
    pub view: &'a mut dyn EditingView,
}

#[derive(Debug, Clone, PartialEq)]
struct SelectionSnapshot {
    selected_link: Option<Range>,
    parent: Option<Path>,
    collapsed: bool,
}

impl SelectionSnapshot {
    fn take(editor: &Editor) -> Self {
        Self {
            selected_link: selected_link(editor),
            parent: editor.selection().last_position().map(|p| p.path.clone()),
            collapsed: editor.selection().is_collapsed(),
        }
    }
}

/// The link that is "selected": the one containing the caret, or the one a
/// single range covers exactly.
pub fn selected_link(editor: &Editor) -> Option<Range> {
    let href = editor.selection_attributes().get(LINK_HREF)?;
    match editor.selection() {
        Selection::Caret { position, .. } => {
            let range = find_attribute_range(editor.doc(), position, LINK_HREF, href);
            (!range.is_collapsed()).then_some(range)
        }
        Selection::Ranges(ranges) => {
            let [range] = ranges.as_slice() else {
                return None;
            };
            let link = find_attribute_range(editor.doc(), &range.start, LINK_HREF, href);
            (link == *range).then_some(link)
        }
    }
}

/// Decides which link surface is shown. The membership of the two link
/// panels in the shared stack is the state; this type only drives it.
#[derive(Debug, Default)]
pub struct LinkUi {
    form: LinkFormState,
    actions: LinkActionsState,
    tracking: Option<SelectionSnapshot>,
}

impl LinkUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, panels: &dyn PanelStack) -> LinkUiState {
        if panels.contains(LinkPanel::Form) {
            LinkUiState::FormShown
        } else if panels.contains(LinkPanel::Actions) {
            LinkUiState::ActionsShown
        } else {
            LinkUiState::Hidden
        }
    }

    pub fn form(&self) -> &LinkFormState {
        &self.form
    }

    pub fn actions(&self) -> &LinkActionsState {
        &self.actions
    }

    pub fn decorator_switches(&self, link: &LinkCommand) -> Vec<DecoratorSwitch> {
        let link_defined = link.value().is_some();
        let registry = link.decorators();
        registry
            .iter()
            .map(|decorator| DecoratorSwitch {
                id: decorator.id.clone(),
                label: decorator.label.clone(),
                is_on: registry
                    .effective_value(&decorator.id, link_defined)
                    .unwrap_or(false),
            })
            .collect()
    }

    /// Drains pending command changes into the surface models.
    pub fn sync(&mut self, commands: &mut LinkCommands) {
        for change in commands.link.take_changes() {
            match change {
                CommandChange::Value(value) => self.actions.href = value,
                CommandChange::Enabled(enabled) => self.form.save_enabled = enabled,
                CommandChange::Decorator { .. } => {}
            }
        }
        for change in commands.unlink.take_changes() {
            if let CommandChange::Enabled(enabled) = change {
                self.actions.unlink_enabled = enabled;
            }
        }
    }

    pub fn handle(
        &mut self,
        cx: &mut UiContext<'_>,
        commands: &mut LinkCommands,
        schema: &LinkSchema,
        event: LinkUiEvent,
    ) -> Result<(), LinkError> {
        debug!(?event, state = ?self.state(cx.panels), "link ui event");

        match event {
            LinkUiEvent::Open { force } => {
                commands.refresh(cx.editor);
                self.sync(commands);
                if !commands.link.is_enabled() {
                    debug!("link command disabled, not opening");
                    return Ok(());
                }
                self.show(cx, commands, force, true);
            }
            LinkUiEvent::LinkClicked => {
                commands.refresh(cx.editor);
                self.sync(commands);
                if selected_link(cx.editor).is_some() {
                    self.show(cx, commands, false, false);
                }
            }
            LinkUiEvent::Edit => {
                if cx.panels.contains(LinkPanel::Actions) {
                    self.add_form(cx, commands);
                }
            }
            LinkUiEvent::Submit => {
                if !cx.panels.contains(LinkPanel::Form) {
                    return Ok(());
                }
                let href = add_protocol_if_applicable(&self.form.url, schema.default_protocol());
                let decorators = self
                    .decorator_switches(&commands.link)
                    .into_iter()
                    .map(|switch| (switch.id, switch.is_on))
                    .collect();
                commands
                    .link
                    .execute(cx.editor, LinkArgs { href, decorators })?;
                commands.unlink.refresh(cx.editor);
                self.sync(commands);
                self.close_form(cx, commands);
            }
            LinkUiEvent::Cancel => {
                if cx.panels.contains(LinkPanel::Form) {
                    self.close_form(cx, commands);
                }
            }
            LinkUiEvent::Unlink => {
                commands.unlink.execute(cx.editor, ())?;
                commands.link.refresh(cx.editor);
                self.sync(commands);
                self.hide(cx);
            }
            LinkUiEvent::UrlInput(url) => self.form.url = url,
            LinkUiEvent::ToggleDecorator { id, value } => {
                commands.link.set_decorator_value(&id, value);
                self.sync(commands);
            }
            LinkUiEvent::Escape | LinkUiEvent::ClickOutside => self.hide(cx),
            LinkUiEvent::SelectionChanged => {
                commands.refresh(cx.editor);
                self.sync(commands);
                self.update(cx);
            }
        }

        Ok(())
    }

    fn show(&mut self, cx: &mut UiContext<'_>, commands: &LinkCommands, force: bool, focus: bool) {
        if selected_link(cx.editor).is_none() {
            self.add_actions(cx, false);
            self.add_form(cx, commands);
        } else {
            if cx.panels.is_visible(LinkPanel::Actions) {
                self.add_form(cx, commands);
            } else {
                self.add_actions(cx, focus);
            }
        }
        if force {
            cx.panels.bring_to_front();
        }
        self.tracking = Some(SelectionSnapshot::take(cx.editor));
    }

    fn add_actions(&mut self, cx: &mut UiContext<'_>, focus: bool) {
        if cx.panels.contains(LinkPanel::Actions) {
            return;
        }
        let position = position_data(cx.editor, cx.view);
        cx.panels.add(LinkPanel::Actions, position);
        if focus {
            cx.view.focus_panel(LinkPanel::Actions);
        }
    }

    fn add_form(&mut self, cx: &mut UiContext<'_>, commands: &LinkCommands) {
        if cx.panels.contains(LinkPanel::Form) {
            return;
        }
        let position = position_data(cx.editor, cx.view);
        cx.panels.add(LinkPanel::Form, position);
        self.form.url = commands.link.value().unwrap_or_default().to_string();
        cx.view.focus_panel(LinkPanel::Form);
    }

    fn close_form(&mut self, cx: &mut UiContext<'_>, commands: &mut LinkCommands) {
        commands.link.restore_manual_decorator_states(cx.editor);
        self.sync(commands);

        if commands.link.value().is_some() {
            self.remove_form(cx);
            let position = position_data(cx.editor, cx.view);
            cx.panels.update_position(position);
            self.tracking = Some(SelectionSnapshot::take(cx.editor));
        } else {
            self.hide(cx);
        }
    }

    fn remove_form(&mut self, cx: &mut UiContext<'_>) {
        if !cx.panels.contains(LinkPanel::Form) {
            return;
        }
        cx.panels.remove(LinkPanel::Form);
        cx.view.focus_editable();
    }

    fn hide(&mut self, cx: &mut UiContext<'_>) {
        if !cx.panels.contains(LinkPanel::Form) && !cx.panels.contains(LinkPanel::Actions) {
            return;
        }
        self.form.url.clear();
        self.remove_form(cx);
        cx.panels.remove(LinkPanel::Actions);
        cx.view.focus_editable();
        self.tracking = None;
        debug!("link ui hidden");
    }

    fn update(&mut self, cx: &mut UiContext<'_>) {
        let Some(previous) = self.tracking.take() else {
            return;
        };
        let current = SelectionSnapshot::take(cx.editor);
        let visible =
            cx.panels.is_visible(LinkPanel::Actions) || cx.panels.is_visible(LinkPanel::Form);

        let left_link = previous.selected_link.is_some() && current.selected_link.is_none();
        let moved_block = previous.selected_link.is_none() && previous.parent != current.parent;
        let expanded = previous.collapsed && !current.collapsed && visible;

        if left_link || moved_block || expanded {
            debug!(left_link, moved_block, expanded, "selection moved away from link ui");
            self.hide(cx);
            return;
        }

        if visible {
            let position = position_data(cx.editor, cx.view);
            cx.panels.update_position(position);
        }
        self.tracking = Some(current);
    }
}

fn position_data(editor: &Editor, view: &dyn EditingView) -> PanelPosition {
    let target = match selected_link(editor) {
        Some(range) => PositionTarget::Run(range),
        None => PositionTarget::Selection(editor.selection().to_ranges()),
    };
    let bounds = view.anchor_for(&target);
    PanelPosition { target, bounds }
}
