use manos_plate_core::Editor;

use crate::error::LinkError;

/// Observable state change published by a command. Subscribers drain them
/// with [`Command::take_changes`].
#[derive(Debug, Clone, PartialEq)]
pub enum CommandChange {
    Value(Option<String>),
    Enabled(bool),
    Decorator { id: String, value: Option<bool> },
}

pub trait Command {
    type Args;
    type Value: ?Sized;

    /// Recomputes the observable state from the editor's current selection.
    fn refresh(&mut self, editor: &Editor);

    /// Runs the command as one editor change, then refreshes.
    fn execute(&mut self, editor: &mut Editor, args: Self::Args) -> Result<(), LinkError>;

    fn is_enabled(&self) -> bool;

    fn value(&self) -> Option<&Self::Value>;

    fn take_changes(&mut self) -> Vec<CommandChange>;
}
