use std::sync::Arc;

use manos_plate_core::{Editor, Selection};
use tracing::{debug, trace};

use crate::attribute::LINK_HREF;
use crate::command::{Command, CommandChange};
use crate::error::LinkError;
use crate::range::find_attribute_range;
use crate::schema::LinkSchema;

/// Strips the href and every decorator from the link under the caret or
/// from all selected ranges.
pub struct UnlinkCommand {
    schema: Arc<LinkSchema>,
    is_enabled: bool,
    changes: Vec<CommandChange>,
}

impl UnlinkCommand {
    pub fn new(schema: Arc<LinkSchema>) -> Self {
        Self {
            schema,
            is_enabled: false,
            changes: Vec::new(),
        }
    }
}

impl Command for UnlinkCommand {
    type Args = ();
    type Value = ();

    fn refresh(&mut self, editor: &Editor) {
        let is_enabled = editor.selection_attributes().contains_key(LINK_HREF);
        if is_enabled != self.is_enabled {
            self.is_enabled = is_enabled;
            self.changes.push(CommandChange::Enabled(is_enabled));
        }
        trace!(is_enabled, "unlink command refreshed");
    }

    fn execute(&mut self, editor: &mut Editor, _args: ()) -> Result<(), LinkError> {
        let keys: Vec<&str> = self.schema.family_keys().collect();

        editor.change("link:remove", |writer| {
            let ranges = match writer.selection() {
                Selection::Caret { position, .. } => {
                    let Some(current) = writer.editor().selection_attributes().get(LINK_HREF)
                    else {
                        return Ok(());
                    };
                    vec![find_attribute_range(
                        writer.doc(),
                        position,
                        LINK_HREF,
                        current,
                    )]
                }
                Selection::Ranges(ranges) => ranges.clone(),
            };

            debug!(ranges = ranges.len(), "removing link");
            for range in &ranges {
                for key in &keys {
                    writer.remove_attribute(range, key)?;
                }
            }
            Ok(())
        })?;

        self.refresh(editor);
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    fn value(&self) -> Option<&()> {
        None
    }

    fn take_changes(&mut self) -> Vec<CommandChange> {
        std::mem::take(&mut self.changes)
    }
}
