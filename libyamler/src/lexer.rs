//! Tokenizer.
//!
//! Turns the character stream into structural tokens. One token of
//! lookahead is kept; entering or leaving a flow collection only takes
//! effect once the token that causes it is consumed, so peeking never
//! changes how the following scalar is read.

use std::fmt;

use tracing::trace;

use crate::config::Config;
use crate::cursor::is_whitespace;
use crate::error::{ParseError, Result};
use crate::scalar::{FlowState, ScalarReader};
use crate::value::Value;

/// Kind of a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A scalar value.
    Scalar,
    /// A position where a scalar could have been but none was found.
    Empty,
    /// `- ` starting a block list item.
    ListItem,
    ListStart,
    ListEnd,
    MapStart,
    MapEnd,
    /// `? ` announcing an explicit map key.
    MapKeyFollows,
    /// `:` between a key and its value.
    KeyValueSeparator,
    /// `,` in a flow collection.
    Separator,
    /// `&name`
    Anchor,
    /// `*name`
    Alias,
    /// `!!name`
    Tag,
    /// `# text` or `/* text */`
    Remark,
    /// `---` or `...`
    DocumentBoundary,
    End,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Scalar => "SCALAR",
            TokenKind::Empty => "EMPTY",
            TokenKind::ListItem => "LIST_ITEM",
            TokenKind::ListStart => "LIST_START",
            TokenKind::ListEnd => "LIST_END",
            TokenKind::MapStart => "MAP_START",
            TokenKind::MapEnd => "MAP_END",
            TokenKind::MapKeyFollows => "MAP_KEY_FOLLOWS",
            TokenKind::KeyValueSeparator => "SEPARATOR_KV",
            TokenKind::Separator => "SEPARATOR",
            TokenKind::Anchor => "REF",
            TokenKind::Alias => "USE_REF",
            TokenKind::Tag => "TAG",
            TokenKind::Remark => "REMARK",
            TokenKind::DocumentBoundary => "DOCUMENT_BOUNDARY",
            TokenKind::End => "END",
        };
        f.write_str(name)
    }
}

/// A token and where it starts.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Scalar value, or the name of an anchor, alias, tag or the text of a
    /// remark. `Null` for everything else.
    pub value: Value,
    pub offset: usize,
    pub line: usize,
    pub indent: usize,
    /// Column of the first character; `-1` for [`TokenKind::End`].
    pub column: isize,
}

impl Token {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    /// The name carried by anchors, aliases and tags.
    pub fn text(&self) -> &str {
        self.value.as_str().unwrap_or("")
    }
}

/// Flow state change caused by consuming a token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FlowEffect {
    EnterFlowMap,
    LeaveFlowMap,
    EnterFlowList,
    LeaveFlowList,
    EnterMapKey,
}

#[derive(Debug)]
struct Pending {
    token: Token,
    effect: Option<FlowEffect>,
    resets: u64,
}

/// Token stream over a document.
pub struct Lexer<'a> {
    pub(crate) reader: ScalarReader<'a>,
    pending: Option<Pending>,
    /// Closing bracket of each open flow collection, innermost last.
    closers: Vec<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &str, config: &'a Config) -> Self {
        Self {
            reader: ScalarReader::new(text, config),
            pending: None,
            closers: Vec::new(),
        }
    }

    pub fn flow(&self) -> &FlowState {
        &self.reader.flow
    }

    pub fn flow_mut(&mut self) -> &mut FlowState {
        &mut self.reader.flow
    }

    /// Build an error located at the current position.
    pub fn error(&self, error: ParseError) -> ParseError {
        self.reader.cursor.error(error)
    }

    /// The next token, without consuming it.
    pub fn peek(&mut self) -> Result<&Token> {
        self.discard_stale();
        let pending = match self.pending.take() {
            Some(pending) => pending,
            None => {
                let (token, effect) = self.read_token()?;
                Pending {
                    token,
                    effect,
                    resets: self.reader.cursor.resets(),
                }
            }
        };
        Ok(&self.pending.insert(pending).token)
    }

    pub fn peek_kind(&mut self) -> Result<TokenKind> {
        Ok(self.peek()?.kind)
    }

    /// Consume the next token and apply its flow effect.
    pub fn next_token(&mut self) -> Result<Token> {
        self.discard_stale();
        let (token, effect) = match self.pending.take() {
            Some(pending) => (pending.token, pending.effect),
            None => self.read_token()?,
        };
        if let Some(effect) = effect {
            self.apply(effect);
        }
        trace!(kind = %token.kind, line = token.line, column = token.column, "token");
        Ok(token)
    }

    /// Consume the remaining tokens, ending with [`TokenKind::End`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let end = token.is(TokenKind::End);
            tokens.push(token);
            if end {
                return Ok(tokens);
            }
        }
    }

    fn discard_stale(&mut self) {
        let resets = self.reader.cursor.resets();
        if self.pending.as_ref().is_some_and(|p| p.resets != resets) {
            self.pending = None;
        }
    }

    fn apply(&mut self, effect: FlowEffect) {
        let flow = &mut self.reader.flow;
        match effect {
            FlowEffect::EnterFlowMap => {
                flow.map_depth += 1;
                flow.in_map_key = true;
                self.closers.push('}');
            }
            FlowEffect::LeaveFlowMap => {
                flow.map_depth = flow.map_depth.saturating_sub(1);
                flow.in_map_key = false;
                self.closers.pop();
            }
            FlowEffect::EnterFlowList => {
                flow.list_depth += 1;
                self.closers.push(']');
            }
            FlowEffect::LeaveFlowList => {
                flow.list_depth = flow.list_depth.saturating_sub(1);
                self.closers.pop();
            }
            FlowEffect::EnterMapKey => flow.in_map_key = true,
        }
    }

    fn token(&self, kind: TokenKind) -> Token {
        let cursor = &self.reader.cursor;
        Token {
            kind,
            value: Value::Null,
            offset: cursor.offset(),
            line: cursor.line(),
            indent: cursor.indent(),
            column: cursor.column() as isize,
        }
    }

    fn read_token(&mut self) -> Result<(Token, Option<FlowEffect>)> {
        let strict_keys = self.reader.config().disallows_colons_in_unquoted_keys();
        let skip_remarks = self.reader.config().skips_remarks();
        loop {
            self.reader.cursor.skip_whitespaces();
            if self.reader.cursor.ended() {
                let mut token = self.token(TokenKind::End);
                token.column = -1;
                return Ok((token, None));
            }

            let flow = self.reader.flow;
            let in_flow_map = flow.map_depth > 0;
            let in_flow_list = flow.list_depth > 0;
            let (indent, column) = (self.reader.cursor.indent(), self.reader.cursor.column());
            let c = self.reader.cursor.c();

            let single = match c {
                '?' => Some((TokenKind::MapKeyFollows, FlowEffect::EnterMapKey)),
                '{' => Some((TokenKind::MapStart, FlowEffect::EnterFlowMap)),
                '}' => Some((TokenKind::MapEnd, FlowEffect::LeaveFlowMap)),
                '[' => Some((TokenKind::ListStart, FlowEffect::EnterFlowList)),
                ']' => Some((TokenKind::ListEnd, FlowEffect::LeaveFlowList)),
                _ => None,
            };
            if let Some((kind, effect)) = single {
                let token = self.token(kind);
                self.reader.cursor.next();
                return Ok((token, Some(effect)));
            }

            match c {
                '|' | '>' | '`' | '"' | '\'' => {
                    let mut token = self.token(TokenKind::Scalar);
                    match self.reader.read_string()? {
                        Some(text) => token.value = Value::String(text),
                        None => token.kind = TokenKind::Empty,
                    }
                    self.reader.flow.in_map_key = false;
                    return Ok((token, None));
                }
                '*' | '&' => {
                    self.reader.cursor.next();
                    let stops = if in_flow_list {
                        "],"
                    } else if in_flow_map {
                        "},"
                    } else {
                        ""
                    };
                    let name = self.reader.cursor.read_string_until_whitespace_or(stops);
                    self.reader.cursor.skip_spaces();
                    self.reader.cursor.set_columns(indent, column);
                    let kind = if c == '*' {
                        TokenKind::Alias
                    } else {
                        TokenKind::Anchor
                    };
                    let mut token = self.token(kind);
                    token.value = Value::String(name);
                    return Ok((token, None));
                }
                '%' => {
                    // directives are ignored
                    self.reader.cursor.read_until("\n");
                    continue;
                }
                _ => {}
            }

            if self.reader.cursor.is("/*") {
                let mut token = self.token(TokenKind::Remark);
                self.reader.cursor.next_n(2);
                token.value = Value::String(self.reader.cursor.read_until("*/"));
                self.reader.cursor.next_n(2);
                if skip_remarks {
                    continue;
                }
                return Ok((token, None));
            }

            if c == ',' && (in_flow_map || in_flow_list) {
                let token = self.token(TokenKind::Separator);
                self.reader.cursor.next();
                // a comma in a flow map is always followed by a key
                let in_map_entries = self.closers.last() == Some(&'}');
                let effect = (in_map_entries || (in_flow_map && strict_keys))
                    .then_some(FlowEffect::EnterMapKey);
                return Ok((token, effect));
            }

            if c == ':' && (in_flow_map || (flow.in_map_key && strict_keys)) {
                let token = self.token(TokenKind::KeyValueSeparator);
                self.reader.cursor.next();
                return Ok((token, None));
            }

            if c == '!' && self.reader.cursor.c_at(1) == '!' {
                let mut token = self.token(TokenKind::Tag);
                self.reader.cursor.next_n(2);
                token.value = Value::String(self.reader.cursor.read_string_until_whitespace_or(",[]{}"));
                self.reader.cursor.skip_spaces();
                self.reader.cursor.set_columns(indent, column);
                return Ok((token, None));
            }

            if c == '!' {
                self.reader.cursor.next();
                let next = self.reader.cursor.c();
                if !self.reader.cursor.ended() && !is_whitespace(next) {
                    let tag = self.reader.cursor.read_string_until_whitespace_or("");
                    if tag != "local" {
                        return Err(self.error(ParseError::unsupported_tag(format!(
                            "Non-local tags not supported by this implementation: !{}",
                            tag
                        ))));
                    }
                }
                self.reader.cursor.skip_spaces();
                self.reader.cursor.set_columns(indent, column);
                continue;
            }

            let followed_by_space =
                is_whitespace(self.reader.cursor.c_at(1)) || self.reader.cursor.ended_at(1);
            if followed_by_space {
                match c {
                    ':' => {
                        let token = self.token(TokenKind::KeyValueSeparator);
                        self.reader.cursor.next();
                        return Ok((token, None));
                    }
                    '-' => {
                        let token = self.token(TokenKind::ListItem);
                        self.reader.cursor.next();
                        return Ok((token, None));
                    }
                    '#' => {
                        let mut token = self.token(TokenKind::Remark);
                        self.reader.cursor.next();
                        let text = self.reader.cursor.read_until("\n");
                        let text = text.strip_prefix([' ', '\t']).unwrap_or(&text).to_string();
                        if skip_remarks {
                            continue;
                        }
                        token.value = Value::String(text);
                        return Ok((token, None));
                    }
                    _ => {}
                }
            }

            if (self.reader.cursor.is("---") || self.reader.cursor.is("..."))
                && (is_whitespace(self.reader.cursor.c_at(3)) || self.reader.cursor.ended_at(3))
            {
                let token = self.token(TokenKind::DocumentBoundary);
                self.reader.cursor.next_n(3);
                return Ok((token, None));
            }

            let mut token = self.token(TokenKind::Scalar);
            let start = self.reader.cursor.offset();
            let value = if flow.in_map_key {
                self.reader.read_scalar_map_key()?
            } else {
                self.reader.read_scalar()?
            };
            self.reader.flow.in_map_key = false;
            match value {
                Some(value) => token.value = value,
                None => token.kind = TokenKind::Empty,
            }
            if self.reader.cursor.offset() == start && !flow.in_map_key {
                return Err(self.error(ParseError::structural(format!(
                    "Unexpected character: '{}'",
                    c
                ))));
            }
            return Ok((token, None));
        }
    }
}
