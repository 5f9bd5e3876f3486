use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::{
    Attrs, Document, ElementNode, Node, Position, Range, Selection, clamp_to_char_boundary,
};
use crate::error::RegistryError;
use crate::ops::Op;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildConstraint {
    BlockOnly,
    InlineOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub kind: String,
    pub children: ChildConstraint,
    /// Whether runs inside this block may carry formatting attributes.
    pub allows_text_attributes: bool,
}

impl NodeSpec {
    pub fn text_block(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            children: ChildConstraint::InlineOnly,
            allows_text_attributes: true,
        }
    }

    pub fn container(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            children: ChildConstraint::BlockOnly,
            allows_text_attributes: false,
        }
    }

    pub fn text_attributes(mut self, allowed: bool) -> Self {
        self.allows_text_attributes = allowed;
        self
    }
}

/// A text attribute the schema knows about. A run carrying any key listed in
/// `forbidden_with` cannot also receive this attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    pub key: String,
    #[serde(default)]
    pub forbidden_with: Vec<String>,
}

impl AttributeSpec {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            forbidden_with: Vec::new(),
        }
    }

    pub fn forbidden_with<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.forbidden_with = keys.into_iter().map(Into::into).collect();
        self
    }
}

pub trait NormalizePass: Send + Sync {
    fn id(&self) -> &'static str;
    fn run(&self, doc: &Document, registry: &PluginRegistry) -> Vec<Op>;
}

/// State handed to selection fixers once a change has been applied.
pub struct FixContext<'a> {
    pub doc: &'a Document,
    pub selection: &'a Selection,
    pub selection_attributes: &'a Attrs,
    /// Set when the change inserted content (as opposed to typing or formatting).
    pub inserted_content: bool,
}

/// Runs after every committed change and returns selection attribute keys
/// that should be dropped.
pub trait SelectionFixer: Send + Sync {
    fn id(&self) -> &'static str;
    fn fix(&self, cx: &FixContext<'_>) -> Vec<String>;
}

pub trait PlatePlugin: Send + Sync {
    fn id(&self) -> &'static str;
    fn node_specs(&self) -> Vec<NodeSpec> {
        Vec::new()
    }
    fn attribute_specs(&self) -> Vec<AttributeSpec> {
        Vec::new()
    }
    fn normalize_passes(&self) -> Vec<Box<dyn NormalizePass>> {
        Vec::new()
    }
    fn selection_fixers(&self) -> Vec<Box<dyn SelectionFixer>> {
        Vec::new()
    }
}

#[derive(Default)]
pub struct PluginRegistry {
    node_specs: HashMap<String, NodeSpec>,
    attribute_specs: HashMap<String, AttributeSpec>,
    normalize_passes: Vec<Box<dyn NormalizePass>>,
    selection_fixers: Vec<Box<dyn SelectionFixer>>,
}

impl PluginRegistry {
    pub fn new(
        plugins: impl IntoIterator<Item = Box<dyn PlatePlugin>>,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self::default();
        for plugin in plugins {
            registry.register_plugin(plugin)?;
        }
        Ok(registry)
    }

    pub fn core() -> Self {
        let plugins: Vec<Box<dyn PlatePlugin>> =
            vec![Box::new(CoreParagraphPlugin), Box::new(CoreNormalizePlugin)];
        Self::new(plugins).expect("core registry must be valid")
    }

    pub fn richtext() -> Self {
        let plugins: Vec<Box<dyn PlatePlugin>> = vec![
            Box::new(CoreParagraphPlugin),
            Box::new(CoreNormalizePlugin),
            Box::new(MarksPlugin),
            Box::new(HeadingPlugin),
            Box::new(BlockquotePlugin),
            Box::new(CodeBlockPlugin),
        ];
        Self::new(plugins).expect("richtext registry must be valid")
    }

    pub fn register_plugin(&mut self, plugin: Box<dyn PlatePlugin>) -> Result<(), RegistryError> {
        for spec in plugin.node_specs() {
            if self.node_specs.contains_key(&spec.kind) {
                return Err(RegistryError::DuplicateNodeKind(spec.kind));
            }
            self.node_specs.insert(spec.kind.clone(), spec);
        }

        for spec in plugin.attribute_specs() {
            if self.attribute_specs.contains_key(&spec.key) {
                return Err(RegistryError::DuplicateAttribute(spec.key));
            }
            self.attribute_specs.insert(spec.key.clone(), spec);
        }

        self.normalize_passes.extend(plugin.normalize_passes());
        self.selection_fixers.extend(plugin.selection_fixers());

        tracing::debug!(plugin = plugin.id(), "plugin registered");
        Ok(())
    }

    pub fn node_specs(&self) -> &HashMap<String, NodeSpec> {
        &self.node_specs
    }

    pub fn attribute_specs(&self) -> &HashMap<String, AttributeSpec> {
        &self.attribute_specs
    }

    pub fn attribute_spec(&self, key: &str) -> Option<&AttributeSpec> {
        self.attribute_specs.get(key)
    }

    pub fn normalize_passes(&self) -> &[Box<dyn NormalizePass>] {
        &self.normalize_passes
    }

    pub fn selection_fixers(&self) -> &[Box<dyn SelectionFixer>] {
        &self.selection_fixers
    }

    pub fn is_known_kind(&self, kind: &str) -> bool {
        self.node_specs.contains_key(kind)
    }

    pub fn is_text_block(&self, el: &ElementNode) -> bool {
        match self.node_specs.get(&el.kind).map(|s| &s.children) {
            Some(ChildConstraint::InlineOnly) => true,
            Some(ChildConstraint::BlockOnly) => false,
            None => el.holds_only_text() && !el.children.is_empty(),
        }
    }

    /// Whether a run with `run_attrs` inside `block` may receive `key`.
    /// Unregistered keys are rejected.
    pub fn is_attribute_allowed(&self, block: &ElementNode, run_attrs: &Attrs, key: &str) -> bool {
        let Some(spec) = self.attribute_specs.get(key) else {
            return false;
        };
        let block_allows = self
            .node_specs
            .get(&block.kind)
            .map(|s| s.allows_text_attributes)
            .unwrap_or(true);
        if !block_allows {
            return false;
        }
        !spec
            .forbidden_with
            .iter()
            .any(|other| run_attrs.contains_key(other))
    }

    pub fn normalize(&self, doc: &Document) -> Vec<Op> {
        for pass in &self.normalize_passes {
            let ops = pass.run(doc, self);
            if !ops.is_empty() {
                tracing::trace!(pass = pass.id(), ops = ops.len(), "normalize pass fired");
                return ops;
            }
        }
        Vec::new()
    }

    /// Resolves every position to an existing text block, clamps offsets,
    /// sorts and merges ranges, and turns a lone empty range into a caret.
    pub fn normalize_selection(&self, doc: &Document, selection: &Selection) -> Selection {
        let fallback = first_text_position(doc, self).unwrap_or(Position {
            path: vec![0],
            offset: 0,
        });

        match selection {
            Selection::Caret { position, gravity } => Selection::Caret {
                position: self.resolve_position(doc, position).unwrap_or(fallback),
                gravity: *gravity,
            },
            Selection::Ranges(ranges) => {
                let mut resolved: Vec<Range> = ranges
                    .iter()
                    .filter_map(|r| self.resolve_range(doc, r))
                    .collect();
                resolved.sort_by(|a, b| a.start.cmp(&b.start));

                let mut merged: Vec<Range> = Vec::with_capacity(resolved.len());
                for range in resolved {
                    match merged.last_mut() {
                        Some(last)
                            if last.path() == range.path()
                                && range.start.offset <= last.end.offset =>
                        {
                            last.end.offset = last.end.offset.max(range.end.offset);
                        }
                        _ => merged.push(range),
                    }
                }
                if merged.iter().any(|r| !r.is_collapsed()) {
                    merged.retain(|r| !r.is_collapsed());
                }

                match merged.as_slice() {
                    [] => Selection::caret(fallback),
                    [only] if only.is_collapsed() => Selection::caret(only.start.clone()),
                    _ => Selection::Ranges(merged),
                }
            }
        }
    }

    fn resolve_range(&self, doc: &Document, range: &Range) -> Option<Range> {
        let start = self.resolve_position(doc, &range.start)?;
        let end = match self.resolve_position(doc, &range.end) {
            Some(end) if end.path == start.path => end.offset,
            _ => text_block_at(doc, &start.path)?.text_len(),
        };
        Some(Range::new(start.path, start.offset, end))
    }

    fn resolve_position(&self, doc: &Document, position: &Position) -> Option<Position> {
        if position.path.is_empty() || doc.children.is_empty() {
            return None;
        }

        let mut resolved_path: Vec<usize> = Vec::new();
        let mut children: &[Node] = &doc.children;

        for &wanted in &position.path {
            if children.is_empty() {
                break;
            }
            let ix = wanted.min(children.len() - 1);
            match &children[ix] {
                Node::Element(el) if self.is_text_block(el) => {
                    resolved_path.push(ix);
                    let text = el.text();
                    return Some(Position {
                        path: resolved_path,
                        offset: clamp_to_char_boundary(&text, position.offset),
                    });
                }
                Node::Element(el) => {
                    resolved_path.push(ix);
                    children = &el.children;
                }
                Node::Text(_) => break,
            }
        }

        first_text_position_in(children, &mut resolved_path, self)
    }
}

fn text_block_at<'a>(doc: &'a Document, path: &[usize]) -> Option<&'a ElementNode> {
    match crate::query::node_at_path(doc, path)? {
        Node::Element(el) => Some(el),
        Node::Text(_) => None,
    }
}

fn first_text_position(doc: &Document, registry: &PluginRegistry) -> Option<Position> {
    first_text_position_in(&doc.children, &mut Vec::new(), registry)
}

fn first_text_position_in(
    children: &[Node],
    path: &mut Vec<usize>,
    registry: &PluginRegistry,
) -> Option<Position> {
    for (ix, node) in children.iter().enumerate() {
        let Node::Element(el) = node else {
            continue;
        };
        path.push(ix);
        if registry.is_text_block(el) {
            return Some(Position {
                path: path.clone(),
                offset: 0,
            });
        }
        if let Some(position) = first_text_position_in(&el.children, path, registry) {
            return Some(position);
        }
        path.pop();
    }
    None
}

struct CoreParagraphPlugin;

impl PlatePlugin for CoreParagraphPlugin {
    fn id(&self) -> &'static str {
        "core.paragraph"
    }

    fn node_specs(&self) -> Vec<NodeSpec> {
        vec![NodeSpec::text_block("paragraph")]
    }
}

struct CoreNormalizePlugin;

impl PlatePlugin for CoreNormalizePlugin {
    fn id(&self) -> &'static str {
        "core.normalize"
    }

    fn normalize_passes(&self) -> Vec<Box<dyn NormalizePass>> {
        vec![
            Box::new(EnsureNonEmptyDocument),
            Box::new(EnsureTextBlockHasRun),
        ]
    }
}

struct EnsureNonEmptyDocument;

impl NormalizePass for EnsureNonEmptyDocument {
    fn id(&self) -> &'static str {
        "core.ensure_non_empty_document"
    }

    fn run(&self, doc: &Document, _registry: &PluginRegistry) -> Vec<Op> {
        if doc.children.is_empty() {
            return vec![Op::InsertNode {
                path: vec![0],
                node: Node::paragraph(""),
            }];
        }
        Vec::new()
    }
}

struct EnsureTextBlockHasRun;

impl NormalizePass for EnsureTextBlockHasRun {
    fn id(&self) -> &'static str {
        "core.ensure_text_block_has_run"
    }

    fn run(&self, doc: &Document, registry: &PluginRegistry) -> Vec<Op> {
        let mut ops = Vec::new();

        fn walk(
            children: &[Node],
            path: &mut Vec<usize>,
            registry: &PluginRegistry,
            ops: &mut Vec<Op>,
        ) {
            for (ix, node) in children.iter().enumerate() {
                let Node::Element(el) = node else {
                    continue;
                };

                path.push(ix);
                let inline_only = registry
                    .node_specs
                    .get(&el.kind)
                    .is_some_and(|s| s.children == ChildConstraint::InlineOnly);

                if inline_only {
                    if el.children.is_empty() {
                        let mut insert_path = path.clone();
                        insert_path.push(0);
                        ops.push(Op::InsertNode {
                            path: insert_path,
                            node: Node::Text(crate::core::TextNode::plain("")),
                        });
                    }
                } else {
                    walk(&el.children, path, registry, ops);
                }
                path.pop();
            }
        }

        walk(&doc.children, &mut Vec::new(), registry, &mut ops);
        ops
    }
}

/// Character formatting keys registered by [`PluginRegistry::richtext`].
pub const MARK_KEYS: [&str; 5] = ["bold", "italic", "underline", "strikethrough", "code"];

struct MarksPlugin;

impl PlatePlugin for MarksPlugin {
    fn id(&self) -> &'static str {
        "marks"
    }

    fn attribute_specs(&self) -> Vec<AttributeSpec> {
        MARK_KEYS.iter().map(|key| AttributeSpec::new(*key)).collect()
    }
}

struct HeadingPlugin;

impl PlatePlugin for HeadingPlugin {
    fn id(&self) -> &'static str {
        "heading"
    }

    fn node_specs(&self) -> Vec<NodeSpec> {
        vec![NodeSpec::text_block("heading")]
    }
}

struct BlockquotePlugin;

impl PlatePlugin for BlockquotePlugin {
    fn id(&self) -> &'static str {
        "blockquote"
    }

    fn node_specs(&self) -> Vec<NodeSpec> {
        vec![NodeSpec::container("blockquote")]
    }
}

struct CodeBlockPlugin;

impl PlatePlugin for CodeBlockPlugin {
    fn id(&self) -> &'static str {
        "code_block"
    }

    fn node_specs(&self) -> Vec<NodeSpec> {
        vec![NodeSpec::text_block("code_block").text_attributes(false)]
    }
}
