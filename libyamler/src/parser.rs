//! Parser.
//!
//! Builds values from the token stream. Block collections are delimited by
//! token columns: a `map_depth` of `-1` means "not inside a block map", and
//! any key or item at a column below the collection's own column ends it.

use tracing::debug;

use crate::config::{Config, TagContext};
use crate::context::ReferenceContext;
use crate::error::{ParseError, Result};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::value::{Documents, Value};

/// One parse of one input.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    config: &'a Config,
    context: ReferenceContext,
    nesting: usize,
}

fn is_end(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::End | TokenKind::DocumentBoundary)
}

impl<'a> Parser<'a> {
    pub fn new(text: &str, config: &'a Config) -> Self {
        Self {
            lexer: Lexer::new(text, config),
            config,
            context: ReferenceContext::new(),
            nesting: 0,
        }
    }

    /// Parse every document in the input.
    ///
    /// Documents that come out as null are left out. Input without any
    /// non-null document yields a single null.
    pub fn parse(mut self) -> Result<Documents> {
        let mut documents: Option<Vec<Value>> = None;
        let mut result: Option<Value> = None;

        loop {
            let kind = self.peek_kind()?;
            if kind == TokenKind::End {
                break;
            }
            if kind == TokenKind::DocumentBoundary {
                while self.peek_kind()? == TokenKind::DocumentBoundary {
                    self.lexer.next_token()?;
                }
                let docs = documents.get_or_insert_with(Vec::new);
                if let Some(done) = result.take() {
                    docs.push(done);
                }
                self.context.reset();
                debug!(documents = docs.len(), "document boundary");
                continue;
            }

            let value = self.next_object(-1, true)?;
            let next = self.peek_kind()?;
            if !is_end(next) {
                return Err(self.error(format!("Illegal token: {}", next)));
            }
            if self.lexer.flow().list_depth > 0 {
                return Err(self.error("Unterminated list"));
            }
            if self.lexer.flow().map_depth > 0 {
                return Err(self.error("Unterminated map"));
            }
            if result.is_none() && !value.is_null() {
                result = Some(value);
            }
        }

        let docs = match documents {
            Some(mut docs) => {
                docs.extend(result);
                docs
            }
            None => vec![result.unwrap_or_default()],
        };
        let docs = if docs.is_empty() { vec![Value::Null] } else { docs };
        debug!(documents = docs.len(), "parsed");
        Ok(Documents::new(docs))
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        self.lexer.error(ParseError::structural(message))
    }

    /// Peek past remarks.
    fn peek(&mut self) -> Result<&Token> {
        while self.lexer.peek_kind()? == TokenKind::Remark {
            self.lexer.next_token()?;
        }
        self.lexer.peek()
    }

    fn peek_kind(&mut self) -> Result<TokenKind> {
        Ok(self.peek()?.kind)
    }

    fn peek_column(&mut self) -> Result<isize> {
        Ok(self.peek()?.column)
    }

    fn next_object(&mut self, map_depth: isize, check_colon: bool) -> Result<Value> {
        self.nesting += 1;
        if self.nesting > self.config.max_depth() {
            return Err(self.error("Maximum nesting depth exceeded"));
        }
        let result = self.read_object(map_depth, check_colon);
        self.nesting -= 1;
        result
    }

    fn read_object(&mut self, map_depth: isize, check_colon: bool) -> Result<Value> {
        let token = self.peek()?.clone();
        let depth = token.column;

        let result = match token.kind {
            TokenKind::ListStart => {
                self.lexer.next_token()?;
                self.parse_flow_list(map_depth)?
            }
            TokenKind::ListEnd => return Err(self.error("LIST_END while not in list")),
            TokenKind::ListItem => self.parse_block_list(map_depth)?,
            TokenKind::MapKeyFollows => {
                self.lexer.next_token()?;
                let key = match self.peek_kind()? {
                    TokenKind::Separator
                    | TokenKind::KeyValueSeparator
                    | TokenKind::MapEnd
                    | TokenKind::ListEnd => Value::Null,
                    _ => self.next_object(depth, false)?,
                };
                if depth > map_depth {
                    self.parse_block_map(depth, key)?
                } else {
                    key
                }
            }
            TokenKind::MapStart => {
                self.lexer.next_token()?;
                self.parse_flow_map(map_depth)?
            }
            TokenKind::MapEnd => return Err(self.error("MAP_END while not in map")),
            TokenKind::Separator => return Err(self.error("Unexpected separator")),
            TokenKind::KeyValueSeparator => {
                if depth == map_depth {
                    self.lexer.next_token()?;
                    Value::Null
                } else {
                    // map with an empty first key
                    self.parse_block_map(depth, Value::Null)?
                }
            }
            TokenKind::Scalar | TokenKind::Empty => {
                self.lexer.next_token()?;
                token.value
            }
            TokenKind::End | TokenKind::DocumentBoundary => Value::Null,
            TokenKind::Anchor => {
                self.lexer.next_token()?;
                let value = self.next_object(map_depth, check_colon)?;
                self.context.store(token.text(), value.clone());
                value
            }
            TokenKind::Alias => {
                let value = match self.context.get(token.text()) {
                    Some(value) => value.clone(),
                    None => {
                        return Err(self.lexer.error(ParseError::reference(format!(
                            "Unknown ref: \"{}\"",
                            token.text()
                        ))))
                    }
                };
                self.lexer.next_token()?;
                value
            }
            TokenKind::Tag => {
                self.lexer.next_token()?;
                let flow = self.lexer.flow();
                let tag_depth = if flow.in_flow_list {
                    flow.list_depth as isize + 1
                } else if flow.in_flow_map {
                    flow.map_depth as isize + 1
                } else {
                    map_depth
                };
                let scope = TagPosition {
                    depth: tag_depth,
                    line: token.line,
                    enclosing: map_depth,
                };
                self.handle_tag(token.text(), scope)?
            }
            TokenKind::Remark => {
                self.lexer.next_token()?;
                return self.read_object(map_depth, check_colon);
            }
        };

        if check_colon
            && !self.lexer.flow().in_flow_map
            && depth > map_depth
            && self.peek_kind()? == TokenKind::KeyValueSeparator
            && self.peek_column()? > map_depth
        {
            return self.parse_block_map(depth, result);
        }
        Ok(result)
    }

    fn handle_tag(&mut self, name: &str, position: TagPosition) -> Result<Value> {
        let handler = match self.config.tag_handler(name) {
            Some(handler) => handler,
            None => {
                return Err(self
                    .lexer
                    .error(ParseError::unsupported_tag(format!("Unsupported tag: {}", name))))
            }
        };
        debug!(tag = name, depth = position.depth, "tag");
        let outcome = handler(&mut TagScope {
            parser: self,
            position,
        });
        outcome.or_else(|err| match err.downcast::<ParseError>() {
            Ok(parse_error) => Err(*parse_error),
            Err(other) => Err(self.lexer.error(ParseError::conversion(other.to_string()))),
        })
    }

    fn parse_flow_list(&mut self, map_depth: isize) -> Result<Value> {
        let mut list = self.config.new_list();
        let outer = self.lexer.flow().in_flow_list;
        self.lexer.flow_mut().in_flow_list = true;

        loop {
            let kind = self.peek_kind()?;
            if kind == TokenKind::ListEnd {
                break;
            }
            if is_end(kind) {
                return Err(self.error("Unterminated list"));
            }
            // a comma right away means an empty item
            let item = if kind == TokenKind::Separator {
                Value::Null
            } else {
                self.next_object(map_depth, true)?
            };
            list.push(item);
            match self.peek_kind()? {
                TokenKind::ListEnd => break,
                TokenKind::Separator => {
                    self.lexer.next_token()?;
                }
                kind if is_end(kind) => return Err(self.error("Unterminated list")),
                kind => return Err(self.error(format!("Unexpected token in list: {}", kind))),
            }
        }
        self.lexer.next_token()?;

        self.lexer.flow_mut().in_flow_list = outer;
        Ok(Value::from(list))
    }

    fn parse_block_list(&mut self, map_depth: isize) -> Result<Value> {
        let mut list = self.config.new_list();
        let outer = *self.lexer.flow();
        self.lexer.flow_mut().in_flow_list = false;
        self.lexer.flow_mut().in_flow_map = false;
        let depth = self.peek_column()?;

        while self.at_list_item(depth)? {
            self.lexer.next_token()?;
            let item = if self.at_list_item(depth)? {
                Value::Null
            } else {
                self.next_object(map_depth, true)?
            };
            list.push(item);
        }
        if self.peek_kind()? == TokenKind::ListItem && self.peek_column()? > depth {
            let column = self.peek_column()?;
            return Err(self.error(format!("Illegal list indent ({} > {})", column, map_depth)));
        }

        let flow = self.lexer.flow_mut();
        flow.in_flow_list = outer.in_flow_list;
        flow.in_flow_map = outer.in_flow_map;
        Ok(Value::from(list))
    }

    fn at_list_item(&mut self, depth: isize) -> Result<bool> {
        let token = self.peek()?;
        Ok(token.kind == TokenKind::ListItem && token.column == depth)
    }

    fn parse_flow_map(&mut self, map_depth: isize) -> Result<Value> {
        let mut map = self.config.new_map();
        let outer = self.lexer.flow().in_flow_map;
        self.lexer.flow_mut().in_flow_map = true;

        loop {
            let kind = self.peek_kind()?;
            if kind == TokenKind::MapEnd {
                break;
            }
            if is_end(kind) {
                return Err(self.error("Unterminated map"));
            }
            let key = match kind {
                TokenKind::MapKeyFollows => {
                    self.lexer.next_token()?;
                    if self.peek_kind()? == TokenKind::MapEnd {
                        Value::Null
                    } else {
                        self.next_object(map_depth, false)?
                    }
                }
                TokenKind::KeyValueSeparator => Value::Null,
                _ => self.next_object(map_depth, false)?,
            };

            let value = if self.peek_kind()? == TokenKind::KeyValueSeparator {
                self.lexer.next_token()?;
                match self.peek_kind()? {
                    TokenKind::Separator | TokenKind::MapEnd | TokenKind::MapKeyFollows => {
                        Value::Null
                    }
                    _ => self.next_object(map_depth, true)?,
                }
            } else {
                Value::Null
            };
            if is_end(self.peek_kind()?) {
                return Err(self.error("Unterminated map"));
            }
            map.insert(key, value);
            if self.peek_kind()? == TokenKind::Separator {
                self.lexer.next_token()?;
            }
        }
        self.lexer.next_token()?;

        self.lexer.flow_mut().in_flow_map = outer;
        Ok(Value::from(map))
    }

    fn parse_block_map(&mut self, map_depth: isize, first_key: Value) -> Result<Value> {
        let mut map = self.config.new_map();
        let outer = *self.lexer.flow();
        self.lexer.flow_mut().in_flow_list = false;
        self.lexer.flow_mut().in_flow_map = false;
        let mut next_key = Some(first_key);

        loop {
            let colon = self.peek()?.clone();
            if colon.column < map_depth {
                break;
            }

            let value = if colon.kind != TokenKind::KeyValueSeparator {
                // a key without a colon, or followed by `?`, has no value
                Value::Null
            } else {
                self.lexer.next_token()?;
                let next = self.peek()?.clone();
                let no_value = next.kind == TokenKind::KeyValueSeparator
                    || (next.column <= map_depth
                        && (is_end(next.kind)
                            || !(next.column == map_depth && next.kind == TokenKind::ListItem)));
                if no_value {
                    Value::Null
                } else {
                    self.next_object(map_depth, true)?
                }
            };
            map.insert(next_key.take().unwrap_or_default(), value);

            let next = self.peek()?.clone();
            if is_end(next.kind) {
                break;
            }
            if next.kind == TokenKind::KeyValueSeparator
                && next.column >= map_depth
                && next.column <= colon.column
            {
                // empty key
                continue;
            }
            match next.kind {
                TokenKind::ListEnd => {
                    if self.lexer.flow().list_depth == 0 {
                        return Err(self.error("LIST_END (]) while not in flow list"));
                    }
                    break;
                }
                TokenKind::MapEnd => {
                    if self.lexer.flow().map_depth == 0 {
                        return Err(self.error("MAP_END (}) while not in flow map"));
                    }
                    break;
                }
                TokenKind::Separator => break,
                _ => {}
            }
            if next.column > map_depth {
                return Err(self.error(format!(
                    "Illegal map indent ({} > {})",
                    next.column, map_depth
                )));
            }
            if next.column < map_depth {
                break;
            }
            next_key = Some(self.next_object(map_depth, false)?);
        }
        if let Some(key) = next_key {
            map.insert(key, Value::Null);
        }

        let flow = self.lexer.flow_mut();
        flow.in_flow_list = outer.in_flow_list;
        flow.in_flow_map = outer.in_flow_map;
        Ok(Value::from(map))
    }
}

/// Where a tag appeared.
#[derive(Clone, Copy, Debug)]
struct TagPosition {
    /// Depth its value is parsed at.
    depth: isize,
    line: usize,
    /// Column of the enclosing block map, or -1.
    enclosing: isize,
}

/// What a tag handler sees of the parser.
struct TagScope<'p, 'a> {
    parser: &'p mut Parser<'a>,
    position: TagPosition,
}

impl TagContext for TagScope<'_, '_> {
    fn next_object(&mut self, follow_colon: bool) -> Result<Value> {
        // a tag at the end of its line with the next entry below it tags nothing
        let next = self.parser.peek()?;
        if next.line > self.position.line && next.column <= self.position.enclosing {
            return Ok(Value::Null);
        }
        self.parser.next_object(self.position.depth, follow_colon)
    }

    fn next_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        if len != 0 {
            return Err(self.parser.lexer.error(ParseError::unsupported_feature(format!(
                "Trying to read too many bytes: {}",
                len
            ))));
        }
        Ok(Vec::new())
    }

    fn error(&self, message: &str) -> ParseError {
        self.parser.error(message)
    }
}
