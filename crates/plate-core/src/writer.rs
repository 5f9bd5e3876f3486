use crate::core::{AttrValue, Attrs, Document, Editor, Position, Range, Selection, TextNode};
use crate::error::ApplyError;
use crate::ops::Op;
use crate::query::{run_spans, selection_attributes, text_block};

/// Scoped mutation handle passed to [`Editor::change`]. Every op applied
/// through it is collected into the change's undo step.
pub struct Writer<'a> {
    editor: &'a mut Editor,
    inverse_ops: Vec<Op>,
    inserted_content: bool,
    dropped_selection_attrs: Vec<String>,
}

pub(crate) struct WriterOutcome {
    pub(crate) inverse_ops: Vec<Op>,
    pub(crate) inserted_content: bool,
    pub(crate) dropped_selection_attrs: Vec<String>,
}

impl<'a> Writer<'a> {
    pub(crate) fn new(editor: &'a mut Editor) -> Self {
        Self {
            editor,
            inverse_ops: Vec::new(),
            inserted_content: false,
            dropped_selection_attrs: Vec::new(),
        }
    }

    pub(crate) fn finish(self) -> WriterOutcome {
        WriterOutcome {
            inverse_ops: self.inverse_ops,
            inserted_content: self.inserted_content,
            dropped_selection_attrs: self.dropped_selection_attrs,
        }
    }

    pub fn editor(&self) -> &Editor {
        self.editor
    }

    pub fn doc(&self) -> &Document {
        self.editor.doc()
    }

    pub fn selection(&self) -> &Selection {
        self.editor.selection()
    }

    pub fn apply_op(&mut self, op: Op) -> Result<(), ApplyError> {
        let inverse = self.editor.apply_op(op)?;
        self.inverse_ops.push(inverse);
        Ok(())
    }

    /// Inserts typed text. Unlike [`Writer::insert_content`] this does not
    /// count as a content insertion for selection fixers.
    pub fn insert_text(
        &mut self,
        position: &Position,
        text: &str,
        attrs: Attrs,
    ) -> Result<(), ApplyError> {
        if text.is_empty() {
            return Ok(());
        }
        self.apply_op(Op::ReplaceRuns {
            path: position.path.clone(),
            range: position.offset..position.offset,
            runs: vec![TextNode::new(text, attrs)],
        })
    }

    /// Inserts runs at `position` and returns the range they now occupy.
    pub fn insert_content(
        &mut self,
        position: &Position,
        runs: Vec<TextNode>,
    ) -> Result<Range, ApplyError> {
        let len: usize = runs.iter().map(|r| r.text.len()).sum();
        self.apply_op(Op::ReplaceRuns {
            path: position.path.clone(),
            range: position.offset..position.offset,
            runs,
        })?;
        self.inserted_content = true;
        Ok(Range::new(
            position.path.clone(),
            position.offset,
            position.offset + len,
        ))
    }

    pub fn remove_content(&mut self, range: &Range) -> Result<(), ApplyError> {
        if range.is_collapsed() {
            return Ok(());
        }
        self.apply_op(Op::ReplaceRuns {
            path: range.path().to_vec(),
            range: range.offsets(),
            runs: Vec::new(),
        })
    }

    /// Replaces the text of `range`, keeping the attributes of its first run.
    /// Returns the range the new text occupies.
    pub fn replace_text(&mut self, range: &Range, text: &str) -> Result<Range, ApplyError> {
        let attrs = text_block(self.doc(), range.path())
            .and_then(|block| {
                run_spans(block)
                    .into_iter()
                    .find(|span| span.overlaps(&range.offsets()))
                    .map(|span| span.run.attrs.clone())
            })
            .unwrap_or_default();
        self.apply_op(Op::ReplaceRuns {
            path: range.path().to_vec(),
            range: range.offsets(),
            runs: vec![TextNode::new(text, attrs)],
        })?;
        Ok(Range::new(
            range.path().to_vec(),
            range.start.offset,
            range.start.offset + text.len(),
        ))
    }

    pub fn set_attribute(
        &mut self,
        range: &Range,
        key: &str,
        value: impl Into<AttrValue>,
    ) -> Result<(), ApplyError> {
        if range.is_collapsed() {
            return Ok(());
        }
        self.apply_op(Op::SetAttribute {
            path: range.path().to_vec(),
            range: range.offsets(),
            key: key.to_string(),
            value: Some(value.into()),
        })
    }

    pub fn remove_attribute(&mut self, range: &Range, key: &str) -> Result<(), ApplyError> {
        if range.is_collapsed() {
            return Ok(());
        }
        self.apply_op(Op::SetAttribute {
            path: range.path().to_vec(),
            range: range.offsets(),
            key: key.to_string(),
            value: None,
        })
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.editor.set_selection(selection);
    }

    /// Drops `key` from the selection attributes once the change commits.
    pub fn remove_selection_attribute(&mut self, key: &str) {
        self.dropped_selection_attrs.push(key.to_string());
    }

    pub fn selection_attributes(&self) -> Attrs {
        let mut attrs = selection_attributes(self.doc(), self.selection());
        for key in &self.dropped_selection_attrs {
            attrs.remove(key);
        }
        attrs
    }
}
