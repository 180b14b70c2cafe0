//! Scalar reading.
//!
//! A scalar is quoted (`'`, `"` or a backtick, which behaves like `"`), a
//! block (`|` literal or `>` folded, with optional indent digit and chomp
//! indicator), or plain. Plain text is classified as a number, then as one
//! of the named constants, and is a string otherwise.

use crate::config::Config;
use crate::cursor::{is_space, is_whitespace, Cursor, CursorState};
use crate::error::{ParseError, Result};
use crate::number::to_number;
use crate::value::{Number, Value};

/// Flow nesting as seen by the scalar reader.
///
/// The depth counters are kept by the tokenizer; the `in_flow_*` flags say
/// whether the innermost collection being built by the parser is a flow
/// collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlowState {
    pub list_depth: usize,
    pub map_depth: usize,
    pub in_flow_list: bool,
    pub in_flow_map: bool,
    pub in_map_key: bool,
}

impl FlowState {
    fn in_flow(&self) -> bool {
        self.list_depth > 0 || self.map_depth > 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Chomp {
    /// Keep a single trailing newline.
    Clip,
    /// Drop all trailing whitespace.
    Strip,
    /// Keep everything.
    Keep,
}

#[derive(Clone, Copy, Debug)]
struct BlockHeader {
    folded: bool,
    chomp: Chomp,
    indent: usize,
}

/// Reads scalars at the cursor.
pub struct ScalarReader<'a> {
    pub(crate) cursor: Cursor,
    pub(crate) flow: FlowState,
    config: &'a Config,
    map_key: bool,
    indent_text: String,
}

impl<'a> ScalarReader<'a> {
    pub fn new(text: &str, config: &'a Config) -> Self {
        Self {
            cursor: Cursor::new(text),
            flow: FlowState::default(),
            config,
            map_key: false,
            indent_text: String::new(),
        }
    }

    pub fn config(&self) -> &'a Config {
        self.config
    }

    /// Read a scalar and render it as text. Null counts as absent.
    pub fn read_string(&mut self) -> Result<Option<String>> {
        Ok(match self.read_scalar()? {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        })
    }

    /// Read a scalar in which any `:` ends the text.
    pub fn read_scalar_map_key(&mut self) -> Result<Option<Value>> {
        self.map_key = true;
        let result = self.read_scalar();
        self.map_key = false;
        result
    }

    /// Read the next scalar. `None` means there was nothing to read, while
    /// `Some(Value::Null)` is an explicit or empty null.
    pub fn read_scalar(&mut self) -> Result<Option<Value>> {
        self.cursor.skip_whitespaces();
        if self.cursor.ended() {
            return Ok(None);
        }
        let value = match self.cursor.c() {
            quote @ ('"' | '\'' | '`') => Some(Value::String(self.read_quoted(quote)?)),
            '|' | '>' => match self.read_block_header() {
                Some(header) => self.read_block(header).map(Value::String),
                None => self.read_plain(),
            },
            _ => self.read_plain(),
        };
        Ok(value.map(|v| self.substitute(v)))
    }

    fn substitute(&self, value: Value) -> Value {
        match value {
            Value::String(text) => match self.config.substitute_variables(&text) {
                Some(replaced) => Value::String(replaced),
                None => Value::String(text),
            },
            other => other,
        }
    }

    fn read_quoted(&mut self, quote: char) -> Result<String> {
        let open = self.cursor.state();
        let escapes = quote != '\'';
        self.cursor.next_raw();
        let mut text = String::new();
        loop {
            if self.cursor.ended() {
                self.cursor.restore(open);
                return Err(self
                    .cursor
                    .error(ParseError::lexical("Unterminated quoted string")));
            }
            let c = self.cursor.c();
            if c == quote {
                if !escapes && self.cursor.c_at(1) == quote {
                    text.push(quote);
                    self.cursor.next_raw();
                    self.cursor.next_raw();
                    continue;
                }
                self.cursor.next_raw();
                return Ok(text);
            }
            match c {
                '\n' => self.fold_quoted_newlines(&mut text, escapes),
                '\\' if escapes => self.read_escape(&mut text)?,
                _ => {
                    text.push(c);
                    self.cursor.next_raw();
                }
            }
        }
    }

    /// One line break inside quotes becomes a space; `n` breaks become
    /// `n - 1` newlines.
    fn fold_quoted_newlines(&mut self, text: &mut String, escapes: bool) {
        trim_trailing_spaces(text);
        let mut breaks = 0;
        while self.cursor.c() == '\n' {
            self.cursor.next();
            self.cursor.skip_spaces();
            breaks += 1;
        }
        if breaks > 1 {
            text.push_str(&"\n".repeat(breaks - 1));
        } else if !(escapes && self.cursor.is("\\n")) {
            text.push(' ');
        }
    }

    fn read_escape(&mut self, text: &mut String) -> Result<()> {
        self.cursor.next_raw();
        if self.cursor.ended() {
            return Ok(());
        }
        let c = self.cursor.c();
        if c == '\n' {
            // line continuation
            self.cursor.next();
            return Ok(());
        }
        if let Some(unescaped) = unescape(c) {
            text.push(unescaped);
            self.cursor.next_raw();
            return Ok(());
        }
        let width = match c {
            'x' => 2,
            'u' => 4,
            'U' => 8,
            _ => {
                text.push('\\');
                text.push(c);
                self.cursor.next_raw();
                return Ok(());
            }
        };
        self.cursor.next_raw();
        let code = self.read_hex(width)?;
        let decoded = if (0xD800..0xDC00).contains(&code) && self.cursor.is("\\u") {
            self.cursor.next_raw();
            self.cursor.next_raw();
            let low = self.read_hex(4)?;
            if (0xDC00..0xE000).contains(&low) {
                char::from_u32(0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00))
            } else {
                None
            }
        } else {
            char::from_u32(code)
        };
        match decoded {
            Some(ch) => {
                text.push(ch);
                Ok(())
            }
            None => Err(self.cursor.error(ParseError::lexical(format!(
                "Invalid code point in escape: {:X}",
                code
            )))),
        }
    }

    fn read_hex(&mut self, width: usize) -> Result<u32> {
        let digits: String = (0..width as isize).map(|i| self.cursor.c_at(i)).collect();
        let code = if digits.chars().all(|c| c.is_ascii_hexdigit()) {
            u32::from_str_radix(&digits, 16).ok()
        } else {
            None
        };
        match code {
            Some(code) => {
                for _ in 0..width {
                    self.cursor.next_raw();
                }
                Ok(code)
            }
            None => Err(self.cursor.error(ParseError::lexical(format!(
                "Unable to convert hex to integer: {}",
                digits.trim_end_matches(crate::cursor::EOF)
            )))),
        }
    }

    /// Parse `|` or `>` with its indicators. When the header is not
    /// followed by a line break the cursor is restored and `None` returned,
    /// so the text is read as a plain scalar instead.
    fn read_block_header(&mut self) -> Option<BlockHeader> {
        let start = self.cursor.state();
        let line_indent = self.cursor.indent();
        let folded = self.cursor.c() == '>';
        self.cursor.next();

        let mut explicit = None;
        let mut chomp = None;
        for _ in 0..2 {
            match self.cursor.c() {
                d @ '1'..='9' if explicit.is_none() => {
                    explicit = d.to_digit(10).map(|d| d as usize);
                }
                '+' if chomp.is_none() => chomp = Some(Chomp::Keep),
                '-' if chomp.is_none() => chomp = Some(Chomp::Strip),
                _ => break,
            }
            self.cursor.next();
        }
        self.cursor.skip_spaces();
        if self.cursor.c() == '#'
            && (is_whitespace(self.cursor.c_at(1)) || self.cursor.ended_at(1))
        {
            self.cursor.read_until("\n");
        }
        if !self.cursor.ended() && self.cursor.c() != '\n' {
            self.cursor.restore(start);
            return None;
        }

        let indent = match explicit {
            Some(extra) => line_indent + extra,
            None => self.find_block_indent(),
        };
        Some(BlockHeader {
            folded,
            chomp: chomp.unwrap_or(Chomp::Clip),
            indent,
        })
    }

    /// Indentation of the first non-blank line after the header, or the
    /// widest blank line when the content starts at column 0.
    fn find_block_indent(&self) -> usize {
        let mut ahead = 0isize;
        while is_whitespace(self.cursor.c_at(ahead)) {
            ahead += 1;
        }
        let last_blank = ahead - 1;
        let mut back = last_blank;
        while is_whitespace(self.cursor.c_at(back)) && self.cursor.c_at(back) != '\n' {
            back -= 1;
        }
        let mut indent = (last_blank - back) as usize;

        if indent == 0 {
            let mut line_start = 0isize;
            for i in 0..last_blank {
                if self.cursor.c_at(i) == '\n' {
                    indent = indent.max((i - line_start) as usize);
                    line_start = i + 1;
                }
            }
        }
        indent
    }

    fn read_block(&mut self, header: BlockHeader) -> Option<String> {
        let mut text = String::new();
        let mut stop = false;
        if !self.cursor.ended() {
            self.cursor.next();
            let indent = self.cursor.indent();
            if indent > header.indent {
                text.push_str(&" ".repeat(indent - header.indent));
            } else if header.indent == 0 {
                let mut breaks = 0;
                while self.cursor.c() == '\n' {
                    breaks += 1;
                    self.cursor.next();
                }
                text.push_str(&"\n".repeat(breaks));
                stop = breaks > 0;
            }
        }

        if header.folded {
            self.read_folded(&mut text, header.indent, stop);
        } else {
            self.read_literal(&mut text, header.indent, stop);
        }
        chomp(&mut text, header.chomp);

        if text.is_empty() && self.cursor.ended() {
            None
        } else {
            Some(text)
        }
    }

    fn at_document_marker(&self) -> bool {
        self.cursor.indent() == 0
            && (self.cursor.is("---") || self.cursor.is("..."))
            && (is_whitespace(self.cursor.c_at(3)) || self.cursor.ended_at(3))
    }

    fn read_literal(&mut self, text: &mut String, indent: usize, mut stop: bool) {
        let start_len = text.len();
        while !stop && !self.cursor.ended() {
            let c = self.cursor.c();
            if self.cursor.indent() < indent && !is_whitespace(c) {
                break;
            }
            if c == '\n' {
                self.cursor.next();
                if self.at_document_marker() {
                    break;
                }
                let line_indent = self.cursor.indent();
                if self.cursor.c() == '\n' {
                    text.push('\n');
                    text.push_str(&" ".repeat(line_indent.saturating_sub(indent)));
                } else if line_indent < indent {
                    stop = true;
                } else {
                    text.push('\n');
                    text.push_str(&" ".repeat(line_indent - indent));
                }
            } else {
                text.push(c);
                self.cursor.next_raw();
            }
        }
        if text.len() > start_len {
            text.push('\n');
        }
    }

    fn read_folded(&mut self, text: &mut String, indent: usize, stop: bool) {
        if stop {
            return;
        }
        if self.cursor.c() == '\n' {
            text.push('\n');
        }
        while !self.cursor.ended() && (self.cursor.indent() >= indent || self.cursor.c() == '\n')
        {
            let c = self.cursor.c();
            if c != '\n' {
                text.push(c);
                self.cursor.next_raw();
                continue;
            }
            let previous_indent = self.cursor.indent();
            self.cursor.next_store_indent(&mut self.indent_text);
            while self.cursor.c() == '\n' {
                text.push('\n');
                self.cursor.next_store_indent(&mut self.indent_text);
            }
            let line_indent = self.cursor.indent();
            if line_indent < indent || self.at_document_marker() {
                break;
            }
            if line_indent == indent {
                if !text.ends_with('\n') {
                    text.push(' ');
                }
                if previous_indent > indent {
                    text.push('\n');
                }
            } else {
                text.push('\n');
                text.push_str(&self.indent_text[indent..]);
            }
        }
        if !text.is_empty() {
            text.push('\n');
        }
    }

    /// A number directly followed by a flow terminator is taken as is.
    /// Anything else restores the cursor for the plain scalar rules.
    fn read_flow_number(&mut self) -> Option<Value> {
        let start = self.cursor.state();
        let mut text = String::new();
        if matches!(self.cursor.c(), '-' | '+') {
            text.push(self.cursor.c());
            self.cursor.next();
        }
        let radix = if self.cursor.is("0x") || self.cursor.is("0o") {
            text.push('0');
            text.push(self.cursor.c_at(1));
            self.cursor.next_n(2);
            if text.ends_with('x') {
                16
            } else {
                8
            }
        } else {
            10
        };
        let (mut dot, mut exponent) = (false, false);
        loop {
            let c = self.cursor.c();
            let accepted = match radix {
                16 => c.is_ascii_hexdigit(),
                8 => ('0'..='7').contains(&c),
                _ => {
                    c.is_ascii_digit()
                        || (c == '.' && !dot && !exponent)
                        || (matches!(c, 'e' | 'E') && !exponent)
                        || (matches!(c, '+' | '-') && (text.ends_with('e') || text.ends_with('E')))
                }
            };
            if !accepted {
                break;
            }
            dot |= c == '.';
            exponent |= matches!(c, 'e' | 'E');
            text.push(c);
            self.cursor.next();
        }
        self.cursor.skip_spaces();
        let c = self.cursor.c();
        let terminated = (self.flow.in_flow() && c == ',') || c == ']' || c == '}';
        if terminated {
            if let Some(number) = to_number(&text) {
                return Some(Value::Number(number));
            }
        }
        if self.cursor.state() != start {
            self.cursor.restore(start);
        }
        None
    }

    fn read_plain(&mut self) -> Option<Value> {
        let start_indent = self.cursor.indent();
        let own_indent = start_indent == self.cursor.column();
        if let Some(number) = self.read_flow_number() {
            return Some(number);
        }

        let mut text = String::new();
        let mut last_newline: Option<(CursorState, usize)> = None;
        while !self.cursor.ended() {
            let c = self.cursor.c();

            if c == '#'
                && (is_space(self.cursor.c_at(-1)) || self.cursor.offset() == 0)
                && (is_whitespace(self.cursor.c_at(1)) || self.cursor.ended_at(1))
            {
                break;
            }

            if (self.flow.list_depth > 0 && c == ']')
                || (self.flow.map_depth > 0 && c == '}')
                || (self.flow.in_flow() && c == ',')
            {
                break;
            }

            if c == ':' && self.colon_ends_scalar(&text) {
                if let Some((state, len)) = last_newline {
                    if !self.map_key && !self.flow.in_flow_map {
                        // The key started on a previous line; end the value there.
                        self.cursor.restore(state);
                        text.truncate(len);
                    }
                }
                break;
            }

            if c == '-'
                && (is_whitespace(self.cursor.c_at(1)) || self.cursor.ended_at(1))
                && self.cursor.indent() == self.cursor.column()
            {
                break;
            }

            if c == '\n' {
                last_newline = Some((self.cursor.state(), text.len()));
                trim_trailing_whitespace(&mut text);
                let mut breaks = 0;
                loop {
                    self.cursor.next();
                    breaks += 1;
                    self.cursor.skip_spaces();
                    if self.cursor.c() != '\n' {
                        break;
                    }
                }
                let column = self.cursor.column();
                if !self.flow.in_flow_map
                    && ((own_indent && column < start_indent)
                        || (!own_indent && column <= start_indent))
                {
                    break;
                }
                if breaks > 1 {
                    text.push_str(&"\n".repeat(breaks - 1));
                } else {
                    text.push(' ');
                }
                if self.continuation_starts_new_token() {
                    break;
                }
                continue;
            }

            text.push(c);
            self.cursor.next_raw();
        }

        let trimmed = text.trim_matches(|c: char| c <= ' ');
        if let Some(known) = known_value(trimmed) {
            return Some(known);
        }
        trim_trailing_whitespace(&mut text);
        if text.is_empty() && self.cursor.ended() {
            return None;
        }
        if text.chars().all(|c| c.is_whitespace() || c == '\u{A0}') {
            return Some(Value::Null);
        }
        Some(Value::String(text))
    }

    fn colon_ends_scalar(&self, text: &str) -> bool {
        let next = self.cursor.c_at(1);
        self.map_key
            || is_whitespace(next)
            || self.cursor.ended_at(1)
            || matches!(next, ',' | ']' | '}')
            || constant(text).is_some()
    }

    /// Whether a continuation line of a plain scalar opens something else.
    fn continuation_starts_new_token(&self) -> bool {
        let cursor = &self.cursor;
        let c = cursor.c();
        let ws_or_end = |delta: isize| {
            is_whitespace(cursor.c_at(delta)) || cursor.ended_at(delta as usize)
        };
        match c {
            '{' | '[' => true,
            '-' | '.' => (cursor.is("---") || cursor.is("...")) && ws_or_end(3),
            '!' => {
                cursor.c_at(1) == '!' && cursor.c_at(2) != '!' && !ws_or_end(2)
            }
            '#' => ws_or_end(1) && is_whitespace(cursor.c_at(-1)),
            _ => false,
        }
    }
}

/// Decode a single-character escape.
fn unescape(c: char) -> Option<char> {
    Some(match c {
        '\\' => '\\',
        '"' => '"',
        '/' => '/',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'b' => '\u{8}',
        'f' => '\u{C}',
        '0' => '\0',
        'a' => '\u{7}',
        'v' => '\u{B}',
        'e' => '\u{1B}',
        ' ' => ' ',
        'N' => '\u{85}',
        '_' => '\u{A0}',
        'L' => '\u{2028}',
        'P' => '\u{2029}',
        _ => return None,
    })
}

/// Named constants.
fn constant(text: &str) -> Option<Value> {
    Some(match text {
        "true" | "True" | "TRUE" => Value::Bool(true),
        "false" | "False" | "FALSE" => Value::Bool(false),
        "null" | "Null" | "NULL" | "~" | "undefined" => Value::Null,
        ".inf" | ".Inf" | ".INF" => Value::Number(Number::Float(f64::INFINITY)),
        "-.inf" | "-.Inf" | "-.INF" => Value::Number(Number::Float(f64::NEG_INFINITY)),
        ".nan" | ".NaN" | ".NAN" => Value::Number(Number::Float(f64::NAN)),
        _ => return None,
    })
}

fn known_value(text: &str) -> Option<Value> {
    to_number(text).map(Value::Number).or_else(|| constant(text))
}

fn trim_trailing_whitespace(text: &mut String) {
    let len = text.trim_end_matches(is_whitespace).len();
    text.truncate(len);
}

fn trim_trailing_spaces(text: &mut String) {
    let len = text.trim_end_matches(is_space).len();
    text.truncate(len);
}

fn chomp(text: &mut String, chomp: Chomp) {
    match chomp {
        Chomp::Keep => {}
        Chomp::Strip => trim_trailing_whitespace(text),
        Chomp::Clip => {
            let content_end = text.trim_end_matches(is_whitespace).len();
            if let Some(newline) = text[content_end..].find('\n') {
                text.truncate(content_end + newline + 1);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `.` and `·` stand for spaces so indentation stays visible.
    fn spaced(s: &str) -> String {
        s.replace(['.', '·'], " ")
    }

    fn read(input: &str) -> Option<Value> {
        let config = Config::default();
        let mut reader = ScalarReader::new(input, &config);
        reader.read_scalar().unwrap()
    }

    fn read_str(input: &str) -> String {
        match read(input) {
            Some(Value::String(s)) => s,
            other => panic!("expected a string, got {:?}", other),
        }
    }

    #[test]
    fn quoted_strings() {
        assert_eq!(read_str("\"abc\""), "abc");
        assert_eq!(read_str("\"abc\ndef\""), "abc def");
        assert_eq!(read_str("'it''s'"), "it's");
        assert_eq!(read_str(r"'no \n escapes'"), r"no \n escapes");
        assert_eq!(read_str("`tick\\tescapes`"), "tick\tescapes");
        assert_eq!(read_str("\"\""), "");
    }

    #[test]
    fn quoted_line_folding() {
        assert_eq!(read_str("\"a  \n   b\""), "a b");
        assert_eq!(read_str("\"a\n\n  b\""), "a\nb");
        assert_eq!(read_str("\"a\n\n\n  b\""), "a\n\nb");
        assert_eq!(read_str("\"a\\\n   b\""), "ab");
        assert_eq!(read_str("\"a\n  \\nb\""), "a\nb");
    }

    #[test]
    fn escapes() {
        let input = r#""\\\"\n\r\t\b\f\0\a\v\e\u0020\N\_\L\P\x9A\uCAFE""#;
        let expected = "\\\"\n\r\t\u{8}\u{C}\0\u{7}\u{B}\u{1B} \u{85}\u{A0}\u{2028}\u{2029}\u{9A}\u{CAFE}";
        assert_eq!(read_str(input), expected);
        assert_eq!(read_str(r#""\U0001F600 \uD83D\uDE00""#), "\u{1F600} \u{1F600}");
        assert_eq!(read_str(r#""keep \q""#), r"keep \q");
    }

    #[test]
    fn bad_escapes_and_quotes() {
        let config = Config::default();
        let mut reader = ScalarReader::new(r#""\xZZ""#, &config);
        let err = reader.read_scalar().unwrap_err();
        assert!(matches!(err, ParseError::Lexical(..)));
        assert!(err.message().contains("ZZ"));

        let mut reader = ScalarReader::new("\"abc", &config);
        let err = reader.read_scalar().unwrap_err();
        assert!(matches!(err, ParseError::Lexical(..)));
        assert_eq!(err.line(), 1);
    }

    #[test]
    fn numbers_and_constants() {
        assert_eq!(read("123"), Some(Value::from(123)));
        assert_eq!(read("123.45"), Some(Value::from(123.45)));
        assert_eq!(read("true"), Some(Value::Bool(true)));
        assert_eq!(read("FALSE"), Some(Value::Bool(false)));
        assert_eq!(read("null"), Some(Value::Null));
        assert_eq!(read("~"), Some(Value::Null));
        assert_eq!(read("undefined"), Some(Value::Null));
        assert_eq!(read(".inf"), Some(Value::from(f64::INFINITY)));
        assert_eq!(read("-.inf"), Some(Value::from(f64::NEG_INFINITY)));
        assert_eq!(read(".NaN"), Some(Value::from(f64::NAN)));
        assert_eq!(read(".nana"), Some(Value::from(".nana")));
        assert_eq!(read(""), None);
        assert_eq!(read("   \n  "), None);
    }

    #[test]
    fn plain_stops_at_remark() {
        assert_eq!(read_str("explicit key # Empty value"), "explicit key");
        assert_eq!(read_str("a#b"), "a#b");
    }

    #[test]
    fn literal_blocks() {
        let input = spaced("|\n..aaa\n..bbb\n...\n..ccc\n..ddd\n.\n..eee\n..fff\nend");
        assert_eq!(read_str(&input), "aaa\nbbb\n \nccc\nddd\n\neee\nfff\n");
        assert_eq!(read_str(&spaced("|1\n..aaa\nend")), " aaa\n");
        assert_eq!(read_str(&spaced("|\n..'abc'\n..def\n..ghi\nend")), "'abc'\ndef\nghi\n");
        assert_eq!(read_str("|+\n\n\nend"), "\n\n");
        assert_eq!(read_str("  |\n  block key\n: - item"), "block key\n");
        assert_eq!(read_str("| # remark\n  text\n"), "text\n");
    }

    #[test]
    fn folded_blocks() {
        let input = spaced(">\n..aaa bbb\n..ccc ddd\n.\n..eee\n..fff\n\n..ggg\nend");
        assert_eq!(read_str(&input), "aaa bbb ccc ddd\neee fff\nggg\n");
        assert_eq!(read_str(&spaced(">\n.\n..\n..# aaa\nend")), "\n\n# aaa\n");
        assert_eq!(read_str(&spaced(">\n.\t\n.aaa\nend")), "\t aaa\n");
        let input = spaced(
            ">\n..folded\n..line\n..\n..next line\n....* bullet\n\n....* list\n....* lines\n\n..last\n..line\n..\n# commentend",
        );
        assert_eq!(
            read_str(&input),
            "folded line\nnext line\n  * bullet\n\n  * list\n  * lines\n\nlast line\n"
        );
        let input = ">\n  'abc'\n  def\n\n\n\n  ghi\n\nfoo: bar}\n";
        assert_eq!(read_str(input), "'abc' def\n\n\nghi\n");
        let input = ">\n aaa\n bbb\n\n   111\n   222\n\n ddd\n";
        assert_eq!(read_str(input), "aaa bbb\n\n  111\n  222\n\nddd\n");
        let input = spaced(">\n··foo·\n·\n··\t·bar\n\n··baz\n");
        assert_eq!(read_str(&input), "foo \n\n\t bar\n\nbaz\n");
    }

    #[test]
    fn folded_line_after_more_indented_run_keeps_separator_space() {
        // the fold space is kept before the newline that ends the run
        assert_eq!(read_str(">\n  d\n    more\n  e\n"), "d\n  more \ne\n");
    }

    #[test]
    fn chomping() {
        assert_eq!(read_str("|\n  X\n\n\nend"), "X\n");
        assert_eq!(read_str("|-\n  X\n\n\nend"), "X");
        assert_eq!(read_str("|+\n  X\n\n\nend"), "X\n\n\n");
        assert_eq!(read_str(">-\n  a\n  b\n"), "a b");
    }

    #[test]
    fn block_indicator_without_newline_is_plain() {
        assert_eq!(read_str("|x"), "|x");
        assert_eq!(read_str("> quoted reply"), "> quoted reply");
    }

    #[test]
    fn flow_numbers() {
        let config = Config::default();
        let mut reader = ScalarReader::new("12 ]", &config);
        reader.flow.list_depth = 1;
        assert_eq!(reader.read_scalar().unwrap(), Some(Value::from(12)));
        assert_eq!(reader.cursor.c(), ']');

        let mut reader = ScalarReader::new("1x, 2", &config);
        reader.flow.list_depth = 1;
        assert_eq!(reader.read_scalar().unwrap(), Some(Value::from("1x")));
        assert_eq!(reader.cursor.c(), ',');
    }

    #[test]
    fn variables_only_replace_strings() {
        let config = Config::default().with_variables([("name", "world"), ("n", "5")]);
        let mut reader = ScalarReader::new("\"hello ${name}\"", &config);
        assert_eq!(reader.read_scalar().unwrap(), Some(Value::from("hello world")));
        let mut reader = ScalarReader::new("hello ${nope}", &config);
        assert_eq!(reader.read_scalar().unwrap(), Some(Value::from("hello ?")));
        let mut reader = ScalarReader::new(r"\${name}", &config);
        assert_eq!(reader.read_scalar().unwrap(), Some(Value::from("${name}")));
    }
}
