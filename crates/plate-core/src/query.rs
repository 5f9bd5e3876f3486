use crate::core::{
    Attrs, Document, Editor, ElementNode, Gravity, Node, Position, Range, Selection, TextNode,
};

pub fn node_at_path<'a>(doc: &'a Document, path: &[usize]) -> Option<&'a Node> {
    if path.is_empty() {
        return None;
    }

    let mut node = doc.children.get(path[0])?;
    for &ix in path.iter().skip(1) {
        node = match node {
            Node::Element(el) => el.children.get(ix)?,
            Node::Text(_) => return None,
        };
    }
    Some(node)
}

pub fn text_block<'a>(doc: &'a Document, path: &[usize]) -> Option<&'a ElementNode> {
    match node_at_path(doc, path)? {
        Node::Element(el) if el.holds_only_text() => Some(el),
        _ => None,
    }
}

/// A run together with its byte span inside the owning block.
#[derive(Debug, Clone, Copy)]
pub struct RunSpan<'a> {
    pub start: usize,
    pub end: usize,
    pub run: &'a TextNode,
}

impl RunSpan<'_> {
    pub fn overlaps(&self, range: &std::ops::Range<usize>) -> bool {
        self.start < range.end && self.end > range.start
    }
}

/// Non-empty runs of a text block in order.
pub fn run_spans(block: &ElementNode) -> Vec<RunSpan<'_>> {
    let mut out = Vec::new();
    let mut cursor = 0usize;
    for run in block.runs() {
        let start = cursor;
        cursor += run.text.len();
        if run.text.is_empty() {
            continue;
        }
        out.push(RunSpan {
            start,
            end: cursor,
            run,
        });
    }
    out
}

/// The runs touching a boundary or caret offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunsAround<'a> {
    pub before: Option<&'a TextNode>,
    pub inside: Option<&'a TextNode>,
    pub after: Option<&'a TextNode>,
}

pub fn runs_around(block: &ElementNode, offset: usize) -> RunsAround<'_> {
    let mut around = RunsAround::default();
    for span in run_spans(block) {
        if span.start < offset && offset < span.end {
            around.inside = Some(span.run);
        } else if span.end == offset {
            around.before = Some(span.run);
        } else if span.start == offset {
            around.after = Some(span.run);
        }
    }
    around
}

/// Attributes a caret at `position` picks up: those of the run containing
/// it, or of the neighbour its gravity points at.
pub fn attributes_at(doc: &Document, position: &Position, gravity: Gravity) -> Attrs {
    let Some(block) = text_block(doc, &position.path) else {
        return Attrs::new();
    };
    let around = runs_around(block, position.offset);
    let picked = around.inside.or(match gravity {
        Gravity::Backward => around.before.or(around.after),
        Gravity::Forward => around.after.or(around.before),
    });
    picked.map(|run| run.attrs.clone()).unwrap_or_default()
}

pub fn selection_attributes(doc: &Document, selection: &Selection) -> Attrs {
    match selection {
        Selection::Caret { position, gravity } => attributes_at(doc, position, *gravity),
        Selection::Ranges(ranges) => {
            for range in ranges.iter().filter(|r| !r.is_collapsed()) {
                let Some(block) = text_block(doc, range.path()) else {
                    continue;
                };
                if let Some(span) = run_spans(block)
                    .into_iter()
                    .find(|span| span.overlaps(&range.offsets()))
                {
                    return span.run.attrs.clone();
                }
            }
            selection
                .first_position()
                .map(|p| attributes_at(doc, p, Gravity::Backward))
                .unwrap_or_default()
        }
    }
}

pub fn text_in_range(doc: &Document, range: &Range) -> Option<String> {
    let block = text_block(doc, range.path())?;
    let text = block.text();
    text.get(range.offsets()).map(str::to_string)
}

impl Editor {
    pub fn text_block(&self, path: &[usize]) -> Option<&ElementNode> {
        text_block(self.doc(), path)
    }

    pub fn text_in_range(&self, range: &Range) -> Option<String> {
        text_in_range(self.doc(), range)
    }

    /// Whether `key` may be set somewhere in the current selection. A caret
    /// is judged by the attributes it would type with.
    pub fn attribute_allowed_in_selection(&self, key: &str) -> bool {
        let registry = self.registry();
        match self.selection() {
            Selection::Caret { position, .. } => self
                .text_block(&position.path)
                .is_some_and(|block| {
                    registry.is_attribute_allowed(block, self.selection_attributes(), key)
                }),
            Selection::Ranges(ranges) => ranges.iter().any(|range| {
                let Some(block) = self.text_block(range.path()) else {
                    return false;
                };
                if range.is_collapsed() {
                    return registry.is_attribute_allowed(block, &Attrs::new(), key);
                }
                run_spans(block).iter().any(|span| {
                    span.overlaps(&range.offsets())
                        && registry.is_attribute_allowed(block, &span.run.attrs, key)
                })
            }),
        }
    }

    /// Maximal sub-ranges of the selection where `key` may be set.
    pub fn valid_ranges(&self, key: &str) -> Vec<Range> {
        let registry = self.registry();
        let mut out = Vec::new();

        for range in self.selection().to_ranges() {
            if range.is_collapsed() {
                continue;
            }
            let Some(block) = self.text_block(range.path()) else {
                continue;
            };
            let path = range.path().to_vec();
            let mut current: Option<(usize, usize)> = None;

            for span in run_spans(block) {
                let start = span.start.max(range.start.offset);
                let end = span.end.min(range.end.offset);
                if start >= end {
                    continue;
                }
                if registry.is_attribute_allowed(block, &span.run.attrs, key) {
                    current = match current {
                        Some((s, e)) if e == start => Some((s, end)),
                        Some((s, e)) => {
                            out.push(Range::new(path.clone(), s, e));
                            Some((start, end))
                        }
                        None => Some((start, end)),
                    };
                } else if let Some((s, e)) = current.take() {
                    out.push(Range::new(path.clone(), s, e));
                }
            }

            if let Some((s, e)) = current {
                out.push(Range::new(path, s, e));
            }
        }

        out
    }
}
