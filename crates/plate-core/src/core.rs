use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{ApplyError, PathError};
use crate::ops::{Op, Path, Transaction};
use crate::plugin::{FixContext, PluginRegistry};
use crate::query::selection_attributes;
use crate::writer::{Writer, WriterOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    String(String),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            AttrValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            AttrValue::String(_) => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::String(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::String(value)
    }
}

pub type Attrs = BTreeMap<String, AttrValue>;
pub type ElementKind = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Element(ElementNode),
    Text(TextNode),
}

impl Node {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::block("paragraph", vec![TextNode::plain(text)])
    }

    pub fn block(kind: impl Into<String>, runs: Vec<TextNode>) -> Self {
        Node::Element(ElementNode {
            kind: kind.into(),
            children: runs.into_iter().map(Node::Text).collect(),
        })
    }

    pub fn container(kind: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element(ElementNode {
            kind: kind.into(),
            children,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    pub kind: ElementKind,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl ElementNode {
    pub fn runs(&self) -> impl Iterator<Item = &TextNode> {
        self.children.iter().filter_map(|node| match node {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        })
    }

    pub fn text(&self) -> String {
        self.runs().map(|run| run.text.as_str()).collect()
    }

    pub fn text_len(&self) -> usize {
        self.runs().map(|run| run.text.len()).sum()
    }

    pub fn holds_only_text(&self) -> bool {
        self.children.iter().all(|n| matches!(n, Node::Text(_)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    #[serde(default)]
    pub attrs: Attrs,
}

impl TextNode {
    pub fn new(text: impl Into<String>, attrs: Attrs) -> Self {
        Self {
            text: text.into(),
            attrs,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Attrs::new())
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&AttrValue> {
        self.attrs.get(key)
    }
}

/// A location inside a text block. `path` addresses the block element and
/// `offset` is a byte offset into the block's concatenated run text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub path: Path,
    pub offset: usize,
}

impl Position {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(path: Path, start: usize, end: usize) -> Self {
        let (start, end) = if end < start {
            (end, start)
        } else {
            (start, end)
        };
        Self {
            start: Position::new(path.clone(), start),
            end: Position::new(path, end),
        }
    }

    pub fn collapsed(position: Position) -> Self {
        Self {
            start: position.clone(),
            end: position,
        }
    }

    pub fn path(&self) -> &[usize] {
        &self.start.path
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn offsets(&self) -> std::ops::Range<usize> {
        self.start.offset..self.end.offset
    }

    pub fn len(&self) -> usize {
        self.end.offset.saturating_sub(self.start.offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which neighbouring run a collapsed selection takes its attributes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gravity {
    #[default]
    Backward,
    Forward,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    Caret {
        position: Position,
        #[serde(default)]
        gravity: Gravity,
    },
    Ranges(Vec<Range>),
}

impl Selection {
    pub fn caret(position: Position) -> Self {
        Selection::Caret {
            position,
            gravity: Gravity::default(),
        }
    }

    pub fn caret_with_gravity(position: Position, gravity: Gravity) -> Self {
        Selection::Caret { position, gravity }
    }

    pub fn range(range: Range) -> Self {
        Selection::Ranges(vec![range])
    }

    pub fn ranges(ranges: Vec<Range>) -> Self {
        Selection::Ranges(ranges)
    }

    pub fn is_collapsed(&self) -> bool {
        match self {
            Selection::Caret { .. } => true,
            Selection::Ranges(ranges) => ranges.iter().all(Range::is_collapsed),
        }
    }

    pub fn first_position(&self) -> Option<&Position> {
        match self {
            Selection::Caret { position, .. } => Some(position),
            Selection::Ranges(ranges) => ranges.first().map(|r| &r.start),
        }
    }

    pub fn last_position(&self) -> Option<&Position> {
        match self {
            Selection::Caret { position, .. } => Some(position),
            Selection::Ranges(ranges) => ranges.last().map(|r| &r.end),
        }
    }

    pub fn gravity(&self) -> Gravity {
        match self {
            Selection::Caret { gravity, .. } => *gravity,
            Selection::Ranges(_) => Gravity::Backward,
        }
    }

    pub fn to_ranges(&self) -> Vec<Range> {
        match self {
            Selection::Caret { position, .. } => vec![Range::collapsed(position.clone())],
            Selection::Ranges(ranges) => ranges.clone(),
        }
    }

    pub(crate) fn positions_mut(&mut self) -> Vec<&mut Position> {
        match self {
            Selection::Caret { position, .. } => vec![position],
            Selection::Ranges(ranges) => ranges
                .iter_mut()
                .flat_map(|r| [&mut r.start, &mut r.end])
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UndoRecord {
    pub inverse_ops: Vec<Op>,
    pub selection_before: Selection,
    pub selection_after: Selection,
}

#[derive(Debug, Default)]
pub struct EditorConfig {
    pub max_undo: usize,
    pub max_normalize_iterations: usize,
}

impl EditorConfig {
    fn with_defaults(mut self) -> Self {
        if self.max_undo == 0 {
            self.max_undo = 200;
        }
        if self.max_normalize_iterations == 0 {
            self.max_normalize_iterations = 100;
        }
        self
    }
}

pub struct Editor {
    doc: Document,
    selection: Selection,
    selection_attrs: Attrs,
    registry: PluginRegistry,
    config: EditorConfig,
    undo_stack: Vec<UndoRecord>,
    redo_stack: Vec<UndoRecord>,
}

impl Editor {
    pub fn new(doc: Document, selection: Selection, registry: PluginRegistry) -> Self {
        let config = EditorConfig::default().with_defaults();
        let mut editor = Self {
            doc,
            selection,
            selection_attrs: Attrs::new(),
            registry,
            config,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        };
        editor.normalize_in_place();
        editor
    }

    pub fn with_core_plugins() -> Self {
        Self::empty(PluginRegistry::core())
    }

    pub fn with_richtext_plugins() -> Self {
        Self::empty(PluginRegistry::richtext())
    }

    fn empty(registry: PluginRegistry) -> Self {
        let doc = Document {
            children: vec![Node::paragraph("")],
        };
        let selection = Selection::caret(Position::new(vec![0], 0));
        Self::new(doc, selection, registry)
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Attributes the selection carries: those of the run at (or, for a caret,
    /// next to) its first position, minus anything a selection fixer dropped.
    pub fn selection_attributes(&self) -> &Attrs {
        &self.selection_attrs
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = self.registry.normalize_selection(&self.doc, &selection);
        self.selection_attrs = selection_attributes(&self.doc, &self.selection);
        trace!(selection = ?self.selection, "selection set");
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo(&mut self) -> bool {
        let Some(record) = self.undo_stack.pop() else {
            return false;
        };

        let UndoRecord {
            inverse_ops,
            selection_before,
            selection_after,
        } = record;

        let mut redo_ops: Vec<Op> = Vec::new();
        for op in inverse_ops.iter().cloned() {
            match self.apply_op(op) {
                Ok(inv) => redo_ops.push(inv),
                Err(err) => {
                    warn!(error = %err, "undo stopped at an op that no longer applies");
                    break;
                }
            }
        }
        redo_ops.reverse();

        self.selection = selection_before.clone();
        self.normalize_in_place();

        self.redo_stack.push(UndoRecord {
            selection_before,
            selection_after,
            inverse_ops: redo_ops,
        });
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(record) = self.redo_stack.pop() else {
            return false;
        };

        let UndoRecord {
            inverse_ops,
            selection_before,
            selection_after,
        } = record;

        let mut undo_ops: Vec<Op> = Vec::new();
        for op in inverse_ops.iter().cloned() {
            match self.apply_op(op) {
                Ok(inv) => undo_ops.push(inv),
                Err(err) => {
                    warn!(error = %err, "redo stopped at an op that no longer applies");
                    break;
                }
            }
        }
        undo_ops.reverse();

        self.selection = selection_after.clone();
        self.normalize_in_place();

        self.undo_stack.push(UndoRecord {
            selection_before,
            selection_after,
            inverse_ops: undo_ops,
        });
        true
    }

    pub fn apply(&mut self, tx: Transaction) -> Result<(), ApplyError> {
        let Transaction {
            ops,
            selection_after,
            meta,
        } = tx;
        let source = meta.source.unwrap_or_else(|| "transaction".to_string());
        self.change(&source, |writer| {
            for op in ops {
                writer.apply_op(op)?;
            }
            if let Some(selection) = selection_after {
                writer.set_selection(selection);
            }
            Ok(())
        })
    }

    /// Types `text` at the selection with the current selection attributes,
    /// replacing the first range if the selection is not collapsed.
    pub fn type_text(&mut self, text: &str) -> Result<(), ApplyError> {
        let caret_attrs = self.selection_attrs.clone();
        self.change("input:type_text", |writer| {
            let (position, attrs) = match writer.selection() {
                Selection::Caret { position, .. } => (position.clone(), caret_attrs),
                Selection::Ranges(ranges) => {
                    let Some(first) = ranges.first().cloned() else {
                        return Ok(());
                    };
                    writer.remove_content(&first)?;
                    (first.start, writer.selection_attributes())
                }
            };
            writer.insert_text(&position, text, attrs)?;
            writer.set_selection(Selection::caret(Position::new(
                position.path.clone(),
                position.offset + text.len(),
            )));
            Ok(())
        })
    }

    /// Runs `f` as one atomic change. Everything the writer applies is
    /// recorded as a single undo step; an error rolls every applied op back.
    pub fn change<R>(
        &mut self,
        source: &str,
        f: impl FnOnce(&mut Writer<'_>) -> Result<R, ApplyError>,
    ) -> Result<R, ApplyError> {
        let selection_before = self.selection.clone();
        let mut writer = Writer::new(self);
        let result = f(&mut writer);
        let outcome = writer.finish();

        match result {
            Ok(value) => {
                self.commit(source, selection_before, outcome)?;
                Ok(value)
            }
            Err(err) => {
                warn!(source, error = %err, "change failed, rolling back");
                self.rollback(outcome.inverse_ops, selection_before);
                Err(err)
            }
        }
    }

    fn commit(
        &mut self,
        source: &str,
        selection_before: Selection,
        outcome: WriterOutcome,
    ) -> Result<(), ApplyError> {
        let WriterOutcome {
            mut inverse_ops,
            inserted_content,
            dropped_selection_attrs,
        } = outcome;

        if let Err(err) = self.normalize_with_inverse_ops(&mut inverse_ops) {
            warn!(source, error = %err, "normalization failed, rolling back");
            self.rollback(inverse_ops, selection_before);
            return Err(err);
        }

        self.selection = self
            .registry
            .normalize_selection(&self.doc, &self.selection);
        self.selection_attrs = selection_attributes(&self.doc, &self.selection);
        for key in &dropped_selection_attrs {
            self.selection_attrs.remove(key);
        }
        self.run_selection_fixers(inserted_content);

        if inverse_ops.is_empty() && self.selection == selection_before {
            debug!(source, "change left the document untouched");
            return Ok(());
        }

        inverse_ops.reverse();
        debug!(source, ops = inverse_ops.len(), "change committed");

        let selection_after = self.selection.clone();
        self.undo_stack.push(UndoRecord {
            inverse_ops,
            selection_before,
            selection_after,
        });
        self.redo_stack.clear();
        if self.undo_stack.len() > self.config.max_undo {
            self.undo_stack.remove(0);
        }

        Ok(())
    }

    fn rollback(&mut self, inverse_ops: Vec<Op>, selection_before: Selection) {
        for op in inverse_ops.into_iter().rev() {
            if let Err(err) = self.apply_op(op) {
                warn!(error = %err, "failed to roll back op");
            }
        }
        self.selection = selection_before;
        self.selection_attrs = selection_attributes(&self.doc, &self.selection);
    }

    fn run_selection_fixers(&mut self, inserted_content: bool) {
        let dropped: Vec<String> = {
            let cx = FixContext {
                doc: &self.doc,
                selection: &self.selection,
                selection_attributes: &self.selection_attrs,
                inserted_content,
            };
            self.registry
                .selection_fixers()
                .iter()
                .flat_map(|fixer| {
                    let keys = fixer.fix(&cx);
                    if !keys.is_empty() {
                        trace!(fixer = fixer.id(), ?keys, "selection attributes dropped");
                    }
                    keys
                })
                .collect()
        };
        for key in dropped {
            self.selection_attrs.remove(&key);
        }
    }

    pub(crate) fn normalize_selection_now(&mut self) {
        self.selection = self
            .registry
            .normalize_selection(&self.doc, &self.selection);
    }

    fn normalize_in_place(&mut self) {
        let mut discarded = Vec::new();
        if let Err(err) = self.normalize_with_inverse_ops(&mut discarded) {
            warn!(error = %err, "document normalization failed");
        }
        self.normalize_selection_now();
        self.selection_attrs = selection_attributes(&self.doc, &self.selection);
    }

    fn normalize_with_inverse_ops(&mut self, inverse_ops: &mut Vec<Op>) -> Result<(), ApplyError> {
        for _ in 0..self.config.max_normalize_iterations {
            let ops = self.registry.normalize(&self.doc);
            if ops.is_empty() {
                return Ok(());
            }
            for op in ops {
                let inv = self.apply_op(op)?;
                inverse_ops.push(inv);
            }
        }
        Err(ApplyError::NormalizeDidNotConverge)
    }

    pub(crate) fn apply_op(&mut self, op: Op) -> Result<Op, ApplyError> {
        apply_op_to(&mut self.doc, &mut self.selection, op)
    }
}

fn apply_op_to(doc: &mut Document, selection: &mut Selection, op: Op) -> Result<Op, ApplyError> {
    match op {
        Op::InsertNode { path, node } => {
            insert_node(doc, &path, node)?;
            transform_selection_insert_node(selection, &path);
            Ok(Op::RemoveNode { path })
        }
        Op::RemoveNode { path } => {
            let removed = remove_node(doc, &path)?;
            transform_selection_remove_node(selection, &path);
            Ok(Op::InsertNode {
                path,
                node: removed,
            })
        }
        Op::ReplaceRuns { path, range, runs } => {
            let block = text_block_mut(doc, &path)?;
            let range = checked_range(block, &path, range)?;
            let inserted_len: usize = runs.iter().map(|r| r.text.len()).sum();
            let removed = splice_runs(block, range.clone(), runs);
            transform_selection_replace(selection, &path, range.clone(), inserted_len);
            Ok(Op::ReplaceRuns {
                path,
                range: range.start..range.start + inserted_len,
                runs: removed,
            })
        }
        Op::SetAttribute {
            path,
            range,
            key,
            value,
        } => {
            let block = text_block_mut(doc, &path)?;
            let range = checked_range(block, &path, range)?;
            let previous = slice_runs(block, range.clone());
            let updated = previous
                .iter()
                .cloned()
                .map(|mut run| {
                    match &value {
                        Some(value) => {
                            run.attrs.insert(key.clone(), value.clone());
                        }
                        None => {
                            run.attrs.remove(&key);
                        }
                    }
                    run
                })
                .collect();
            splice_runs(block, range.clone(), updated);
            Ok(Op::ReplaceRuns {
                path,
                range,
                runs: previous,
            })
        }
    }
}

pub(crate) fn clamp_to_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.min(s.len());
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

fn checked_range(
    block: &ElementNode,
    path: &[usize],
    range: std::ops::Range<usize>,
) -> Result<std::ops::Range<usize>, ApplyError> {
    let text = block.text();
    if range.start > range.end || range.end > text.len() {
        return Err(ApplyError::RangeOutOfBounds {
            path: path.to_vec(),
            range,
            len: text.len(),
        });
    }
    Ok(clamp_to_char_boundary(&text, range.start)..clamp_to_char_boundary(&text, range.end))
}

fn slice_runs(block: &ElementNode, range: std::ops::Range<usize>) -> Vec<TextNode> {
    let mut out = Vec::new();
    let mut cursor = 0usize;
    for run in block.runs() {
        let start = cursor;
        let end = cursor + run.text.len();
        cursor = end;

        let from = range.start.clamp(start, end) - start;
        let to = range.end.clamp(start, end) - start;
        if from < to {
            out.push(TextNode::new(&run.text[from..to], run.attrs.clone()));
        }
    }
    out
}

/// Replaces `range` of the block's inline content with `insert`, returning
/// the removed runs. The resulting runs are merged and pruned of empties.
fn splice_runs(
    block: &mut ElementNode,
    range: std::ops::Range<usize>,
    insert: Vec<TextNode>,
) -> Vec<TextNode> {
    let mut head: Vec<TextNode> = Vec::new();
    let mut removed: Vec<TextNode> = Vec::new();
    let mut tail: Vec<TextNode> = Vec::new();

    let mut cursor = 0usize;
    for node in block.children.drain(..) {
        let Node::Text(run) = node else {
            continue;
        };
        let start = cursor;
        let end = cursor + run.text.len();
        cursor = end;

        let from = range.start.clamp(start, end) - start;
        let to = range.end.clamp(start, end) - start;
        let (before, rest) = run.text.split_at(from);
        let (middle, after) = rest.split_at(to - from);

        if !before.is_empty() {
            head.push(TextNode::new(before, run.attrs.clone()));
        }
        if !middle.is_empty() {
            removed.push(TextNode::new(middle, run.attrs.clone()));
        }
        if !after.is_empty() {
            tail.push(TextNode::new(after, run.attrs));
        }
    }

    let mut runs = head;
    runs.extend(insert);
    runs.extend(tail);
    block.children = merge_runs(runs).into_iter().map(Node::Text).collect();
    if block.children.is_empty() {
        block.children.push(Node::Text(TextNode::plain("")));
    }

    merge_runs(removed)
}

fn merge_runs(runs: Vec<TextNode>) -> Vec<TextNode> {
    let mut out: Vec<TextNode> = Vec::with_capacity(runs.len());
    for run in runs {
        if run.text.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.attrs == run.attrs => last.text.push_str(&run.text),
            _ => out.push(run),
        }
    }
    out
}

fn transform_selection_replace(
    selection: &mut Selection,
    path: &[usize],
    range: std::ops::Range<usize>,
    inserted_len: usize,
) {
    let removed_len = range.end - range.start;
    for position in selection.positions_mut() {
        if position.path != path {
            continue;
        }
        let offset = position.offset;
        if offset < range.start || (offset == range.start && removed_len > 0) {
            continue;
        }
        if offset < range.end {
            position.offset = range.start + (offset - range.start).min(inserted_len);
        } else {
            position.offset = offset - removed_len + inserted_len;
        }
    }
}

fn transform_selection_insert_node(selection: &mut Selection, path: &[usize]) {
    let Some((index, parent_path)) = path.split_last() else {
        return;
    };

    for position in selection.positions_mut() {
        if position.path.len() <= parent_path.len() || !position.path.starts_with(parent_path) {
            continue;
        }
        let depth = parent_path.len();
        if position.path[depth] >= *index {
            position.path[depth] += 1;
        }
    }
}

fn transform_selection_remove_node(selection: &mut Selection, path: &[usize]) {
    let Some((index, parent_path)) = path.split_last() else {
        return;
    };

    for position in selection.positions_mut() {
        if position.path.len() <= parent_path.len() || !position.path.starts_with(parent_path) {
            continue;
        }
        let depth = parent_path.len();
        let ix = position.path[depth];
        if ix > *index {
            position.path[depth] = ix - 1;
            continue;
        }
        if ix < *index {
            continue;
        }

        // Position was inside the removed subtree. Park it on a neighbour and
        // let selection normalization resolve it to a text block.
        position.path.truncate(depth + 1);
        position.path[depth] = index.saturating_sub(1);
        position.offset = 0;
    }
}

fn node_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut Node, PathError> {
    let Some((first, rest)) = path.split_first() else {
        return Err(PathError("Empty path".into()));
    };

    let len = doc.children.len();
    let mut node = doc
        .children
        .get_mut(*first)
        .ok_or_else(|| PathError(format!("Path out of bounds at depth 0: {first} >= {len}")))?;

    for (depth, &ix) in rest.iter().enumerate() {
        node = match node {
            Node::Element(el) => {
                let len = el.children.len();
                el.children.get_mut(ix).ok_or_else(|| {
                    PathError(format!(
                        "Path out of bounds at depth {}: {ix} >= {len}",
                        depth + 1
                    ))
                })?
            }
            Node::Text(_) => {
                return Err(PathError(format!("Non-container node at depth {depth}")));
            }
        };
    }

    Ok(node)
}

fn text_block_mut<'a>(
    doc: &'a mut Document,
    path: &[usize],
) -> Result<&'a mut ElementNode, PathError> {
    match node_mut(doc, path)? {
        Node::Element(el) if el.holds_only_text() => Ok(el),
        _ => Err(PathError(format!("Expected text block at {path:?}"))),
    }
}

fn children_mut<'a>(
    doc: &'a mut Document,
    parent_path: &[usize],
) -> Result<&'a mut Vec<Node>, PathError> {
    if parent_path.is_empty() {
        return Ok(&mut doc.children);
    }
    match node_mut(doc, parent_path)? {
        Node::Element(el) => Ok(&mut el.children),
        Node::Text(_) => Err(PathError("Parent is not a container".into())),
    }
}

fn insert_node(doc: &mut Document, path: &[usize], node: Node) -> Result<(), PathError> {
    let Some((index, parent_path)) = path.split_last() else {
        return Err(PathError("Empty insert path".into()));
    };

    let children = children_mut(doc, parent_path)?;
    if *index > children.len() {
        return Err(PathError(format!(
            "Insert index out of bounds: {index} > {}",
            children.len()
        )));
    }
    children.insert(*index, node);
    Ok(())
}

fn remove_node(doc: &mut Document, path: &[usize]) -> Result<Node, PathError> {
    let Some((index, parent_path)) = path.split_last() else {
        return Err(PathError("Empty remove path".into()));
    };

    let children = children_mut(doc, parent_path)?;
    if *index >= children.len() {
        return Err(PathError(format!(
            "Remove index out of bounds: {index} >= {}",
            children.len()
        )));
    }
    Ok(children.remove(*index))
}
