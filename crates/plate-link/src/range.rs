use manos_plate_core::{AttrValue, Document, Position, Range, RunSpan, run_spans, text_block};

/// Maximal range around `position` whose runs all carry `key == value`.
///
/// `position` is expected to touch such a run; otherwise the result is the
/// collapsed range at `position`.
pub fn find_attribute_range(
    doc: &Document,
    position: &Position,
    key: &str,
    value: &AttrValue,
) -> Range {
    let Some(block) = text_block(doc, &position.path) else {
        return Range::collapsed(position.clone());
    };

    let spans = run_spans(block);
    let offset = position.offset;
    let matches = |span: &RunSpan<'_>| span.run.attr(key) == Some(value);
    let inside = spans.iter().position(|s| s.start < offset && offset < s.end);

    let mut start = offset;
    let mut ix = inside.or_else(|| spans.iter().position(|s| s.end == offset));
    while let Some(i) = ix {
        if !matches(&spans[i]) {
            break;
        }
        start = spans[i].start;
        ix = i.checked_sub(1);
    }

    let mut end = offset;
    let mut ix = inside.or_else(|| spans.iter().position(|s| s.start == offset));
    while let Some(i) = ix.filter(|i| *i < spans.len()) {
        if !matches(&spans[i]) {
            break;
        }
        end = spans[i].end;
        ix = Some(i + 1);
    }

    Range::new(position.path.clone(), start, end)
}
