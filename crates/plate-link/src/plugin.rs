use std::sync::Arc;

use manos_plate_core::{
    AttributeSpec, FixContext, PlatePlugin, SelectionFixer, runs_around, text_block,
};

use crate::attribute::LINK_HREF;
use crate::schema::LinkSchema;

/// Registers the link attribute family with the editor schema and installs
/// the post-insertion selection fixer.
pub struct LinkPlugin {
    schema: Arc<LinkSchema>,
}

impl LinkPlugin {
    pub fn new(schema: Arc<LinkSchema>) -> Self {
        Self { schema }
    }
}

impl PlatePlugin for LinkPlugin {
    fn id(&self) -> &'static str {
        "link"
    }

    fn attribute_specs(&self) -> Vec<AttributeSpec> {
        self.schema
            .family_keys()
            .map(|key| {
                AttributeSpec::new(key).forbidden_with(self.schema.forbidden_with().iter().cloned())
            })
            .collect()
    }

    fn selection_fixers(&self) -> Vec<Box<dyn SelectionFixer>> {
        vec![Box::new(LinkSelectionFixer {
            schema: self.schema.clone(),
        })]
    }
}

/// After content lands right behind a link, stops the selection from
/// carrying the link into whatever is typed next.
struct LinkSelectionFixer {
    schema: Arc<LinkSchema>,
}

impl SelectionFixer for LinkSelectionFixer {
    fn id(&self) -> &'static str {
        "link.remove_selection_attributes_after_insert"
    }

    fn fix(&self, cx: &FixContext<'_>) -> Vec<String> {
        if !cx.inserted_content || !cx.selection_attributes.contains_key(LINK_HREF) {
            return Vec::new();
        }
        let Some(anchor) = cx.selection.first_position() else {
            return Vec::new();
        };
        let Some(block) = text_block(cx.doc, &anchor.path) else {
            return Vec::new();
        };

        let around = runs_around(block, anchor.offset);
        let Some(before) = around.before else {
            return Vec::new();
        };
        if !before.attrs.contains_key(LINK_HREF) {
            return Vec::new();
        }
        if around
            .after
            .is_some_and(|after| after.attrs.contains_key(LINK_HREF))
        {
            return Vec::new();
        }

        cx.selection_attributes
            .keys()
            .filter(|key| self.schema.belongs_to_family(key))
            .cloned()
            .collect()
    }
}
