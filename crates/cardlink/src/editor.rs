//! Editing surface abstraction
//!
//! The conversion routine only needs a handful of operations from the host
//! editor: read the selection, replace it, read the whole document and
//! replace a range. [`Editor`] captures those; [`TextBuffer`] is an
//! in-memory implementation used by the CLI and tests.
//!
//! Positions are zero-based `line`/`ch` pairs where `ch` counts characters.
//! Byte offsets are used only at the `&str` boundary.

use std::ops::Range;

/// Line/character position inside a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    /// Zero-based line number
    pub line: usize,
    /// Zero-based character offset within the line
    pub ch: usize,
}

impl Position {
    /// Create a new position
    pub fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

/// Convert a byte index into a line/character position
///
/// Indexes past the end of `text` map to the end of the document.
pub fn position_from_index(text: &str, index: usize) -> Position {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    let before = &text[..index];
    let line = before.matches('\n').count();
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let ch = before[line_start..].chars().count();
    Position { line, ch }
}

/// Convert a line/character position into a byte index
///
/// Clamps to the end of the line, and to the end of the document when
/// `pos.line` is past the last line.
pub fn offset_from_position(text: &str, pos: Position) -> usize {
    let mut line_start = 0;
    for _ in 0..pos.line {
        match text[line_start..].find('\n') {
            Some(i) => line_start += i + 1,
            None => return text.len(),
        }
    }
    let line = &text[line_start..];
    let line_len = line.find('\n').unwrap_or(line.len());
    let within = line[..line_len]
        .char_indices()
        .nth(pos.ch)
        .map(|(i, _)| i)
        .unwrap_or(line_len);
    line_start + within
}

/// Operations the conversion routine needs from a text editor
pub trait Editor {
    /// Currently selected text (empty when the selection is a cursor)
    fn selection(&self) -> String;

    /// Replace the selection with `text`, leaving the cursor after it
    fn replace_selection(&mut self, text: &str);

    /// Whole document text
    fn value(&self) -> String;

    /// Replace the text between `from` and `to` with `text`
    fn replace_range(&mut self, text: &str, from: Position, to: Position);

    /// Cursor position (the head of the selection)
    fn cursor(&self) -> Position;
}

/// In-memory document with a single selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    // byte offsets, always on char boundaries
    selection: Range<usize>,
}

impl TextBuffer {
    /// Create a buffer with the cursor at the end of `text`
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let end = text.len();
        Self {
            text,
            selection: end..end,
        }
    }

    /// Select the text between two positions
    pub fn select(&mut self, from: Position, to: Position) {
        let a = offset_from_position(&self.text, from);
        let b = offset_from_position(&self.text, to);
        self.selection = a.min(b)..a.max(b);
    }

    /// Collapse the selection to a cursor at `pos`
    pub fn set_cursor(&mut self, pos: Position) {
        self.select(pos, pos);
    }

    /// Document text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Consume the buffer, returning its text
    pub fn into_text(self) -> String {
        self.text
    }

    fn splice(&mut self, range: Range<usize>, replacement: &str) {
        let removed = range.end - range.start;
        let inserted = replacement.len();
        let map = |offset: usize| {
            if offset <= range.start {
                offset
            } else if offset >= range.end {
                offset - removed + inserted
            } else {
                range.start + inserted
            }
        };
        self.selection = map(self.selection.start)..map(self.selection.end);
        self.text.replace_range(range, replacement);
    }
}

impl Editor for TextBuffer {
    fn selection(&self) -> String {
        self.text[self.selection.clone()].to_string()
    }

    fn replace_selection(&mut self, text: &str) {
        let start = self.selection.start;
        let range = self.selection.clone();
        self.text.replace_range(range, text);
        let end = start + text.len();
        self.selection = end..end;
    }

    fn value(&self) -> String {
        self.text.clone()
    }

    fn replace_range(&mut self, text: &str, from: Position, to: Position) {
        let a = offset_from_position(&self.text, from);
        let b = offset_from_position(&self.text, to);
        self.splice(a.min(b)..a.max(b), text);
    }

    fn cursor(&self) -> Position {
        position_from_index(&self.text, self.selection.end)
    }
}
