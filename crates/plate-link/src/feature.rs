use std::sync::Arc;

use manos_plate_core::Editor;

use crate::command::Command;
use crate::config::LinkConfig;
use crate::error::{ConfigError, LinkError};
use crate::link_command::LinkCommand;
use crate::plugin::LinkPlugin;
use crate::schema::LinkSchema;
use crate::ui::{
    EditingView, LinkHighlight, LinkUi, LinkUiEvent, LinkUiState, PanelStack, UiContext,
};
use crate::unlink_command::UnlinkCommand;

pub struct LinkCommands {
    pub link: LinkCommand,
    pub unlink: UnlinkCommand,
}

impl LinkCommands {
    pub fn new(schema: Arc<LinkSchema>) -> Self {
        Self {
            link: LinkCommand::new(schema.clone()),
            unlink: UnlinkCommand::new(schema),
        }
    }

    pub fn refresh(&mut self, editor: &Editor) {
        self.link.refresh(editor);
        self.unlink.refresh(editor);
    }
}

/// Everything one editing session needs for links: schema, commands, the
/// panel controller and the caret highlight.
pub struct LinkFeature {
    schema: Arc<LinkSchema>,
    commands: LinkCommands,
    ui: LinkUi,
    highlight: LinkHighlight,
}

impl LinkFeature {
    pub fn new(config: &LinkConfig) -> Result<Self, ConfigError> {
        let schema = Arc::new(LinkSchema::from_config(config)?);
        Ok(Self {
            commands: LinkCommands::new(schema.clone()),
            schema,
            ui: LinkUi::new(),
            highlight: LinkHighlight::new(),
        })
    }

    pub fn schema(&self) -> &LinkSchema {
        &self.schema
    }

    /// The plugin to register with the editor's `PluginRegistry`.
    pub fn plugin(&self) -> LinkPlugin {
        LinkPlugin::new(self.schema.clone())
    }

    pub fn commands(&self) -> &LinkCommands {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut LinkCommands {
        &mut self.commands
    }

    pub fn ui(&self) -> &LinkUi {
        &self.ui
    }

    pub fn state(&self, panels: &dyn PanelStack) -> LinkUiState {
        self.ui.state(panels)
    }

    pub fn refresh(&mut self, editor: &Editor) {
        self.commands.refresh(editor);
        self.ui.sync(&mut self.commands);
    }

    pub fn handle(&mut self, cx: &mut UiContext<'_>, event: LinkUiEvent) -> Result<(), LinkError> {
        self.ui.handle(cx, &mut self.commands, &self.schema, event)
    }

    pub fn render(&mut self, editor: &Editor, view: &mut dyn EditingView) {
        self.highlight.render(editor, view);
    }

    pub fn highlight(&self) -> &LinkHighlight {
        &self.highlight
    }

    pub fn before_structural_change(&mut self, view: &mut dyn EditingView) {
        self.highlight.clear(view);
    }
}
