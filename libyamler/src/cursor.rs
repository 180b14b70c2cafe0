//! Character cursor over the input.
//!
//! The cursor tracks line, column and the indentation of the current line.
//! Indentation is the run of spaces right after a newline; [`Cursor::next`]
//! skips it as part of stepping over the newline.

use tracing::trace;

use crate::error::{Location, ParseError};

/// Returned by [`Cursor::c`] past the end of the input.
pub const EOF: char = '\u{FFFF}';

/// Longest caret column shown before the excerpt is shifted left.
const MAX_CARET_COLUMN: usize = 60;

/// How many characters after the caret the excerpt shows.
const EXCERPT_TAIL: usize = 10;

/// Snapshot of the cursor position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CursorState {
    offset: usize,
    indent: usize,
    column: usize,
    line: usize,
}

/// Position-tracking reader over a character buffer.
#[derive(Debug)]
pub struct Cursor {
    input: Vec<char>,
    offset: usize,
    indent: usize,
    column: usize,
    line: usize,
    resets: u64,
}

/// Whitespace as the grammar sees it: non-breaking spaces and NEL are
/// content, and the end of input is not whitespace.
pub fn is_whitespace(c: char) -> bool {
    match c {
        EOF => false,
        '\u{85}' | '\u{A0}' | '\u{2007}' | '\u{202F}' => false,
        '\u{1C}'..='\u{1F}' => true,
        c => c.is_whitespace(),
    }
}

/// A space or a tab.
pub fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

impl Cursor {
    /// Create a cursor at the start of `text`. Windows line endings are
    /// read as plain newlines.
    pub fn new(text: &str) -> Self {
        let input = if text.contains("\r\n") {
            text.replace("\r\n", "\n").chars().collect()
        } else {
            text.chars().collect()
        };
        Self {
            input,
            offset: 0,
            indent: 0,
            column: 0,
            line: 0,
            resets: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Indentation of the current line.
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Column of the current position, 0-based.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Line of the current position, 0-based.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Number of times the cursor has been restored to a snapshot. Anything
    /// buffered against an older count is stale.
    pub fn resets(&self) -> u64 {
        self.resets
    }

    pub fn ended(&self) -> bool {
        self.offset >= self.input.len()
    }

    /// Whether the position `delta` characters ahead is past the end.
    pub fn ended_at(&self, delta: usize) -> bool {
        self.offset + delta >= self.input.len()
    }

    /// Character at the current position, or [`EOF`].
    pub fn c(&self) -> char {
        self.input.get(self.offset).copied().unwrap_or(EOF)
    }

    /// Character `delta` positions away, or [`EOF`] outside the input.
    pub fn c_at(&self, delta: isize) -> char {
        self.offset
            .checked_add_signed(delta)
            .and_then(|pos| self.input.get(pos))
            .copied()
            .unwrap_or(EOF)
    }

    /// Whether the input continues with `text` at the current position.
    pub fn is(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, ch)| self.input.get(self.offset + i) == Some(&ch))
    }

    /// Advance one character. Stepping over a newline also skips the
    /// indentation of the next line.
    pub fn next(&mut self) {
        if self.ended() {
            return;
        }
        if self.c() == '\n' {
            self.newline();
            while self.c() == ' ' {
                self.offset += 1;
                self.indent += 1;
                self.column += 1;
            }
        } else {
            self.offset += 1;
            self.column += 1;
        }
    }

    pub fn next_n(&mut self, n: usize) {
        for _ in 0..n {
            self.next();
        }
    }

    /// Advance one character without skipping indentation after a newline.
    pub fn next_raw(&mut self) {
        if self.ended() {
            return;
        }
        if self.c() == '\n' {
            self.newline();
        } else {
            self.offset += 1;
            self.column += 1;
        }
    }

    /// Advance one character. After a newline, spaces and tabs of the next
    /// line are counted as indentation and collected into `indent_text`.
    pub fn next_store_indent(&mut self, indent_text: &mut String) {
        if self.ended() {
            return;
        }
        if self.c() == '\n' {
            self.newline();
            indent_text.clear();
            while is_space(self.c()) {
                indent_text.push(self.c());
                self.offset += 1;
                self.indent += 1;
                self.column += 1;
            }
        } else {
            self.offset += 1;
            self.column += 1;
        }
    }

    fn newline(&mut self) {
        self.offset += 1;
        self.line += 1;
        self.indent = 0;
        self.column = 0;
    }

    /// Skip spaces and tabs.
    pub fn skip_spaces(&mut self) {
        while is_space(self.c()) {
            self.next();
        }
    }

    /// Skip all whitespace, newlines included.
    pub fn skip_whitespaces(&mut self) {
        while is_whitespace(self.c()) {
            self.next();
        }
    }

    /// Scan for `terminator` and return the text before it, leaving the
    /// cursor on the terminator. When the terminator is not found the input
    /// is consumed to the end and an empty string is returned.
    pub fn read_until(&mut self, terminator: &str) -> String {
        if terminator.is_empty() {
            return String::new();
        }
        let start = self.offset;
        while !self.ended() {
            if self.is(terminator) {
                return self.input[start..self.offset].iter().collect();
            }
            self.next();
        }
        String::new()
    }

    /// Skip whitespace, then read up to the next whitespace or any of the
    /// `stops` characters.
    pub fn read_string_until_whitespace_or(&mut self, stops: &str) -> String {
        self.skip_whitespaces();
        let mut text = String::new();
        while !self.ended() && !is_whitespace(self.c()) && !stops.contains(self.c()) {
            text.push(self.c());
            self.next();
        }
        text
    }

    /// Overwrite the indentation and column while keeping the offset, so
    /// that the text just read takes up no width.
    pub fn set_columns(&mut self, indent: usize, column: usize) {
        self.indent = indent;
        self.column = column;
    }

    pub fn state(&self) -> CursorState {
        CursorState {
            offset: self.offset,
            indent: self.indent,
            column: self.column,
            line: self.line,
        }
    }

    /// Return to an earlier snapshot. This counts as a reset.
    pub fn restore(&mut self, state: CursorState) {
        self.offset = state.offset;
        self.indent = state.indent;
        self.column = state.column;
        self.line = state.line;
        self.resets += 1;
        trace!(offset = state.offset, resets = self.resets, "cursor restored");
    }

    /// Describe the current position for an error message.
    pub fn location(&self) -> Location {
        let len = self.input.len();
        let mut pos = self.offset.min(len);
        if self.c() == '\n' {
            pos += 1;
        }
        let before = &self.input[..pos.min(len)];
        let line = 1 + before.iter().filter(|&&c| c == '\n').count();
        let line_start = before
            .iter()
            .rposition(|&c| c == '\n')
            .map_or(0, |i| i + 1);

        let mut window_start = line_start;
        let mut caret = pos - line_start;
        let mut prefix = "";
        if caret > MAX_CARET_COLUMN {
            window_start += caret - MAX_CARET_COLUMN;
            caret = MAX_CARET_COLUMN + 3;
            prefix = "...";
        }
        let window_end = (pos + EXCERPT_TAIL).min(len);
        let text: String = self.input[window_start.min(window_end)..window_end]
            .iter()
            .take_while(|&&c| c != '\n')
            .collect();

        Location {
            line,
            excerpt: format!("{}{}\n{}^", prefix, text, " ".repeat(caret)),
        }
    }

    /// Locate `error` at the current position.
    pub fn error(&self, error: ParseError) -> ParseError {
        error.with_location(self.location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_tracks_indent_and_lines() {
        let mut cursor = Cursor::new("ab\n  cd");
        cursor.next_n(2);
        assert_eq!(cursor.c(), '\n');
        cursor.next();
        assert_eq!(cursor.c(), 'c');
        assert_eq!(cursor.indent(), 2);
        assert_eq!(cursor.column(), 2);
        assert_eq!(cursor.line(), 1);
        cursor.next_n(5);
        assert!(cursor.ended());
        assert_eq!(cursor.c(), EOF);
    }

    #[test]
    fn next_raw_keeps_indentation() {
        let mut cursor = Cursor::new("\n  x");
        cursor.next_raw();
        assert_eq!(cursor.c(), ' ');
        assert_eq!(cursor.indent(), 0);
    }

    #[test]
    fn next_store_indent_collects_tabs() {
        let mut cursor = Cursor::new("\n \tx");
        let mut indent = String::new();
        cursor.next_store_indent(&mut indent);
        assert_eq!(indent, " \t");
        assert_eq!(cursor.indent(), 2);
        assert_eq!(cursor.c(), 'x');
    }

    #[test]
    fn peeking_around() {
        let cursor = Cursor::new("abc");
        assert_eq!(cursor.c_at(-1), EOF);
        assert_eq!(cursor.c_at(2), 'c');
        assert_eq!(cursor.c_at(3), EOF);
        assert!(cursor.is("ab"));
        assert!(!cursor.is("abcd"));
    }

    #[test]
    fn read_until() {
        let mut cursor = Cursor::new("abc\ndef");
        assert_eq!(cursor.read_until("\n"), "abc");
        assert_eq!(cursor.c(), '\n');

        let mut cursor = Cursor::new("abcdef");
        assert_eq!(cursor.read_until("cde"), "ab");
        assert_eq!(cursor.c(), 'c');

        let mut cursor = Cursor::new("abcdef");
        assert_eq!(cursor.read_until("def"), "abc");

        let mut cursor = Cursor::new("abcdef");
        assert_eq!(cursor.read_until("efg"), "");
        assert!(cursor.ended());

        let mut cursor = Cursor::new("abcdef");
        assert_eq!(cursor.read_until("abc"), "");
        assert_eq!(cursor.c(), 'a');
    }

    #[test]
    fn read_string_until_whitespace_or() {
        let mut cursor = Cursor::new("  name], rest");
        assert_eq!(cursor.read_string_until_whitespace_or("],"), "name");
        assert_eq!(cursor.c(), ']');
    }

    #[test]
    fn whitespace_classes() {
        assert!(is_whitespace(' '));
        assert!(is_whitespace('\t'));
        assert!(is_whitespace('\n'));
        assert!(!is_whitespace('\u{A0}'));
        assert!(!is_whitespace('\u{85}'));
        assert!(!is_whitespace(EOF));
    }

    #[test]
    fn restore_counts_resets() {
        let mut cursor = Cursor::new("a\n b");
        let start = cursor.state();
        cursor.next_n(2);
        assert_eq!(cursor.indent(), 1);
        cursor.restore(start);
        assert_eq!(cursor.c(), 'a');
        assert_eq!(cursor.indent(), 0);
        assert_eq!(cursor.resets(), 1);
    }

    #[test]
    fn location_points_at_column() {
        let mut cursor = Cursor::new("first\nsecond line\nthird");
        cursor.next_n(9);
        let loc = cursor.location();
        assert_eq!(loc.line, 2);
        assert_eq!(loc.excerpt, "second line\n   ^");
    }

    #[test]
    fn location_on_newline_moves_to_next_line() {
        let mut cursor = Cursor::new("ab\ncd");
        cursor.next_n(2);
        let loc = cursor.location();
        assert_eq!(loc.line, 2);
        assert_eq!(loc.excerpt, "cd\n^");
    }

    #[test]
    fn location_truncates_long_lines() {
        let text = format!("{}X{}", "a".repeat(80), "b".repeat(20));
        let mut cursor = Cursor::new(&text);
        cursor.next_n(80);
        let loc = cursor.location();
        let (line, caret) = loc.excerpt.split_once('\n').unwrap();
        assert!(line.starts_with("..."));
        assert_eq!(line.chars().nth(caret.len() - 1), Some('X'));
        assert_eq!(caret.trim_start(), "^");
    }
}
