use manos_plate_core::{AttrValue, Attrs, Editor};

use crate::command::CommandChange;
use crate::schema::LinkSchema;

/// A user-toggleable decorator and its state at the current selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    pub id: String,
    pub attribute_key: String,
    pub label: String,
    pub default_value: bool,
    current_value: Option<bool>,
}

impl Decorator {
    pub fn current_value(&self) -> Option<bool> {
        self.current_value
    }
}

/// Manual decorators in configuration order.
#[derive(Debug, Clone, Default)]
pub struct DecoratorRegistry {
    decorators: Vec<Decorator>,
}

impl DecoratorRegistry {
    pub fn new(schema: &LinkSchema) -> Self {
        let decorators = schema
            .manual_decorators()
            .iter()
            .map(|spec| Decorator {
                id: spec.id.clone(),
                attribute_key: spec.attribute_key.clone(),
                label: spec.label.clone(),
                default_value: spec.default_value,
                current_value: None,
            })
            .collect();
        Self { decorators }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Decorator> {
        self.decorators.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Decorator> {
        self.decorators.iter().find(|d| d.id == id)
    }

    pub fn len(&self) -> usize {
        self.decorators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorators.is_empty()
    }

    pub(crate) fn sync_from(&mut self, attrs: &Attrs) -> Vec<CommandChange> {
        let mut changes = Vec::new();
        for decorator in &mut self.decorators {
            let value = attrs
                .get(&decorator.attribute_key)
                .and_then(AttrValue::as_bool);
            if decorator.current_value != value {
                decorator.current_value = value;
                changes.push(CommandChange::Decorator {
                    id: decorator.id.clone(),
                    value,
                });
            }
        }
        changes
    }

    /// Re-reads every decorator from the model, discarding unsaved toggles.
    pub fn restore_states(&mut self, editor: &Editor) -> Vec<CommandChange> {
        self.sync_from(editor.selection_attributes())
    }

    pub(crate) fn set_current(&mut self, id: &str, value: bool) -> Option<CommandChange> {
        let decorator = self.decorators.iter_mut().find(|d| d.id == id)?;
        if decorator.current_value == Some(value) {
            return None;
        }
        decorator.current_value = Some(value);
        Some(CommandChange::Decorator {
            id: id.to_string(),
            value: Some(value),
        })
    }

    /// What a switch for `id` shows: the model value, or the configured
    /// default while no link is selected and the model holds nothing.
    pub fn effective_value(&self, id: &str, link_defined: bool) -> Option<bool> {
        let decorator = self.get(id)?;
        Some(match (decorator.current_value, link_defined) {
            (Some(value), _) => value,
            (None, false) => decorator.default_value,
            (None, true) => false,
        })
    }
}
