use manos_plate_core::{Editor, Range, Selection};

use super::view::EditingView;
use crate::attribute::LINK_HREF;
use crate::range::find_attribute_range;

/// Marks the link the caret sits in. One per editing session.
#[derive(Debug, Default)]
pub struct LinkHighlight {
    highlighted: Vec<Range>,
}

impl LinkHighlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn highlighted(&self) -> &[Range] {
        &self.highlighted
    }

    /// Drops the previous highlight and re-applies it for the current selection.
    pub fn render(&mut self, editor: &Editor, view: &mut dyn EditingView) {
        self.clear(view);

        let Selection::Caret { position, .. } = editor.selection() else {
            return;
        };
        let Some(href) = editor.selection_attributes().get(LINK_HREF) else {
            return;
        };
        let range = find_attribute_range(editor.doc(), position, LINK_HREF, href);
        if range.is_collapsed() {
            return;
        }
        view.add_highlight(&range);
        self.highlighted.push(range);
    }

    pub fn clear(&mut self, view: &mut dyn EditingView) {
        for range in self.highlighted.drain(..) {
            view.remove_highlight(&range);
        }
    }
}
