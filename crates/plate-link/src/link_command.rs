use std::collections::BTreeMap;
use std::sync::Arc;

use manos_plate_core::{
    ApplyError, AttrValue, Attrs, Editor, Range, Selection, TextNode, Writer, text_in_range,
};
use tracing::{debug, trace, warn};

use crate::attribute::LINK_HREF;
use crate::command::{Command, CommandChange};
use crate::decorators::DecoratorRegistry;
use crate::error::LinkError;
use crate::range::find_attribute_range;
use crate::schema::LinkSchema;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkArgs {
    pub href: String,
    /// Manual decorator states to write. Ids left out are not touched.
    pub decorators: BTreeMap<String, bool>,
}

impl LinkArgs {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            decorators: BTreeMap::new(),
        }
    }

    pub fn decorator(mut self, id: impl Into<String>, value: bool) -> Self {
        self.decorators.insert(id.into(), value);
        self
    }
}

/// Creates links or updates the link under the selection.
pub struct LinkCommand {
    schema: Arc<LinkSchema>,
    decorators: DecoratorRegistry,
    value: Option<String>,
    is_enabled: bool,
    changes: Vec<CommandChange>,
}

impl LinkCommand {
    pub fn new(schema: Arc<LinkSchema>) -> Self {
        let decorators = DecoratorRegistry::new(&schema);
        Self {
            schema,
            decorators,
            value: None,
            is_enabled: false,
            changes: Vec::new(),
        }
    }

    pub fn decorators(&self) -> &DecoratorRegistry {
        &self.decorators
    }

    /// Records an unsaved toggle coming from the form.
    pub fn set_decorator_value(&mut self, id: &str, value: bool) {
        match self.decorators.set_current(id, value) {
            Some(change) => self.changes.push(change),
            None if self.decorators.get(id).is_none() => {
                warn!(id, "ignoring toggle for unknown link decorator");
            }
            None => {}
        }
    }

    pub fn restore_manual_decorator_states(&mut self, editor: &Editor) {
        let changes = self.decorators.restore_states(editor);
        self.changes.extend(changes);
    }

    fn split_toggles(&self, toggles: &BTreeMap<String, bool>) -> (Vec<String>, Vec<String>) {
        let mut enable = Vec::new();
        let mut disable = Vec::new();
        for (id, on) in toggles {
            let Some(decorator) = self.decorators.get(id) else {
                warn!(id = id.as_str(), "ignoring unknown link decorator");
                continue;
            };
            if *on {
                enable.push(decorator.attribute_key.clone());
            } else {
                disable.push(decorator.attribute_key.clone());
            }
        }
        (enable, disable)
    }
}

impl Command for LinkCommand {
    type Args = LinkArgs;
    type Value = str;

    fn refresh(&mut self, editor: &Editor) {
        let attrs = editor.selection_attributes();

        let value = attrs
            .get(LINK_HREF)
            .and_then(AttrValue::as_str)
            .map(str::to_string);
        if value != self.value {
            self.value = value.clone();
            self.changes.push(CommandChange::Value(value));
        }

        let changes = self.decorators.sync_from(attrs);
        self.changes.extend(changes);

        let is_enabled = editor.attribute_allowed_in_selection(LINK_HREF);
        if is_enabled != self.is_enabled {
            self.is_enabled = is_enabled;
            self.changes.push(CommandChange::Enabled(is_enabled));
        }

        trace!(value = ?self.value, is_enabled, "link command refreshed");
    }

    fn execute(&mut self, editor: &mut Editor, args: LinkArgs) -> Result<(), LinkError> {
        let (enable, disable) = self.split_toggles(&args.decorators);
        let href = args.href;
        let schema = &self.schema;

        editor.change("link:apply", |writer| {
            let caret = match writer.selection() {
                Selection::Caret { position, .. } => Some(position.clone()),
                Selection::Ranges(_) => None,
            };
            let Some(position) = caret else {
                let ranges = writer.editor().valid_ranges(LINK_HREF);
                debug!(ranges = ranges.len(), "applying link to selection");
                for range in &ranges {
                    write_link(writer, schema, range, &href, &enable, &disable)?;
                }
                return Ok(());
            };

            let current = writer
                .editor()
                .selection_attributes()
                .get(LINK_HREF)
                .cloned();

            if let Some(current) = current {
                let link_range =
                    find_attribute_range(writer.doc(), &position, LINK_HREF, &current);
                let mut target = link_range.clone();
                let old_href = current.as_str().unwrap_or_default();
                if !href.is_empty()
                    && old_href != href
                    && text_in_range(writer.doc(), &link_range).as_deref() == Some(old_href)
                {
                    target = writer.replace_text(&link_range, &href)?;
                }
                debug!(?target, "updating link under caret");
                write_link(writer, schema, &target, &href, &enable, &disable)?;
                writer.set_selection(Selection::range(target));
                return Ok(());
            }

            if href.is_empty() {
                debug!("empty href at caret outside a link, nothing to do");
                return Ok(());
            }
            if !writer.editor().attribute_allowed_in_selection(LINK_HREF) {
                debug!("links are not allowed at the caret");
                return Ok(());
            }

            let mut attrs: Attrs = writer
                .editor()
                .selection_attributes()
                .iter()
                .filter(|(key, _)| !schema.belongs_to_family(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            attrs.insert(LINK_HREF.to_string(), AttrValue::from(href.as_str()));
            for key in &enable {
                attrs.insert(key.clone(), AttrValue::Bool(true));
            }
            for (key, on) in schema.automatic_attributes(&href) {
                if on {
                    attrs.insert(key.to_string(), AttrValue::Bool(true));
                }
            }

            let run = TextNode::new(href.as_str(), attrs);
            let inserted = writer.insert_content(&position, vec![run])?;
            debug!(range = ?inserted, "inserted new link");
            writer.set_selection(Selection::range(inserted));
            Ok(())
        })?;

        self.refresh(editor);
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.is_enabled
    }

    fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    fn take_changes(&mut self) -> Vec<CommandChange> {
        std::mem::take(&mut self.changes)
    }
}

fn write_link(
    writer: &mut Writer<'_>,
    schema: &LinkSchema,
    range: &Range,
    href: &str,
    enable: &[String],
    disable: &[String],
) -> Result<(), ApplyError> {
    writer.set_attribute(range, LINK_HREF, href)?;
    for key in enable {
        writer.set_attribute(range, key, true)?;
    }
    for key in disable {
        writer.remove_attribute(range, key)?;
    }
    for (key, on) in schema.automatic_attributes(href) {
        if on {
            writer.set_attribute(range, key, true)?;
        } else {
            writer.remove_attribute(range, key)?;
        }
    }
    Ok(())
}
