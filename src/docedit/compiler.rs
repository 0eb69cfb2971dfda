use super::ops::{EditOperation, IndexRange, NamedStyle, TextStyle, utf16_len};

const BULLET_GLYPH: &str = "• ";
const BOLD_MARKER: &str = "**";

/// Operations produced for one block of text, plus the index span it covers.
///
/// `end_index - start_index` always equals the number of inserted index
/// positions, so the next block compiled at `end_index` neither overlaps
/// nor leaves a gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledBlock {
    pub operations: Vec<EditOperation>,
    pub start_index: usize,
    pub end_index: usize,
}

impl CompiledBlock {
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Compile markdown-flavoured text into edit operations anchored at
/// `start_index`.
pub fn compile(text: &str, start_index: usize) -> Vec<EditOperation> {
    compile_block(text, start_index).operations
}

/// Same as [`compile`], also reporting the cursor after the last insert.
pub fn compile_block(text: &str, start_index: usize) -> CompiledBlock {
    let mut operations = Vec::new();
    let mut cursor = start_index;

    for line in text.lines() {
        match classify(line) {
            Line::Blank => {
                operations.push(insert(cursor, "\n".to_string()));
                cursor += 1;
            }
            Line::Heading { style, text } => {
                let end = cursor + utf16_len(text) + 1;
                operations.push(insert(cursor, format!("{text}\n")));
                operations.push(EditOperation::SetParagraphStyle {
                    range: IndexRange::new(cursor, end),
                    style,
                });
                cursor = end;
            }
            Line::Bullet { text } => {
                let inserted = format!("{BULLET_GLYPH}{text}\n");
                let len = utf16_len(&inserted);
                operations.push(insert(cursor, inserted));
                cursor += len;
            }
            Line::Paragraph(raw) => {
                operations.push(insert(cursor, format!("{raw}\n")));
                for (open, close) in bold_spans(raw) {
                    let start = cursor + utf16_len(&raw[..open]) + 2;
                    let end = start + utf16_len(&raw[open + BOLD_MARKER.len()..close]);
                    operations.push(EditOperation::SetTextStyle {
                        range: IndexRange::new(start, end),
                        style: TextStyle::bold(),
                    });
                }
                cursor += utf16_len(raw) + 1;
            }
        }
    }

    CompiledBlock {
        operations,
        start_index,
        end_index: cursor,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Blank,
    Heading { style: NamedStyle, text: &'a str },
    Bullet { text: &'a str },
    Paragraph(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if line.trim().is_empty() {
        return Line::Blank;
    }
    if let Some((style, text)) = parse_heading(line) {
        return Line::Heading { style, text };
    }
    if let Some(text) = parse_bullet(line) {
        return Line::Bullet { text };
    }
    Line::Paragraph(line)
}

/// `#`-run, at least one whitespace, then non-empty text.
fn parse_heading(line: &str) -> Option<(NamedStyle, &str)> {
    let markers = line.len() - line.trim_start_matches('#').len();
    if markers == 0 {
        return None;
    }
    let text = marker_payload(&line[markers..])?;
    Some((NamedStyle::heading(markers), text))
}

/// One of `-`, `*`, `•`, at least one whitespace, then non-empty text.
fn parse_bullet(line: &str) -> Option<&str> {
    let mut chars = line.chars();
    let marker = chars.next()?;
    if !matches!(marker, '-' | '*' | '•') {
        return None;
    }
    marker_payload(chars.as_str())
}

fn marker_payload(rest: &str) -> Option<&str> {
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim_start();
    (!text.is_empty()).then_some(text)
}

/// Byte offsets `(open, close)` of each non-overlapping `**text**` span, where
/// `open` points at the opening marker and `close` at the closing one. The
/// enclosed text is never empty and the shortest closing marker wins.
fn bold_spans(line: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(found) = line[pos..].find(BOLD_MARKER) {
        let open = pos + found;
        let inner = open + BOLD_MARKER.len();
        let Some(first) = line[inner..].chars().next() else {
            break;
        };
        let search_from = inner + first.len_utf8();
        let Some(rel_close) = line[search_from..].find(BOLD_MARKER) else {
            break;
        };
        let close = search_from + rel_close;
        spans.push((open, close));
        pos = close + BOLD_MARKER.len();
    }

    spans
}

fn insert(at: usize, text: String) -> EditOperation {
    EditOperation::InsertText { at, text }
}
