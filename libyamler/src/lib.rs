//! Yamler: a forgiving YAML superset and JSON reader, and a JSON writer.
//!
//! Input may hold several documents separated by `---` or `...`, with flow
//! (`[...]`, `{...}`) and block (indented) collections, quoted, plain,
//! literal (`|`) and folded (`>`) scalars, anchors (`&a`, `*a`), explicit
//! tags (`!!str`) and remarks (`#`, `/* */`). Any JSON text is valid input.
//!
//! # Parsing Pipeline
//!
//! 1. **Cursor**: walks the characters, tracking line, column and the
//!    indentation of the current line.
//!
//! 2. **Scalar reader**: reads one quoted, block or plain scalar and
//!    classifies plain text as number, constant or string.
//!
//! 3. **Lexer**: turns the input into structural tokens with one token of
//!    lookahead.
//!
//! 4. **Parser**: builds values from tokens, using token columns to find
//!    where block collections end.
//!
//! # Example
//!
//! ```
//! use libyamler::{parse_value, to_json_string};
//!
//! let value = parse_value("a: 1\nb: [x, y]\n").unwrap();
//! assert_eq!(to_json_string(&value, -1), r#"{"a":1,"b":["x","y"]}"#);
//! ```

mod config;
mod context;
mod cursor;
mod encode;
mod error;
mod lexer;
mod number;
mod parser;
mod scalar;
mod value;

pub use config::{
    Config, ListFactory, MapFactory, TagContext, TagHandler, TagResult, VariableGetter,
    VariableSource, DEFAULT_MAX_DEPTH, DEFAULT_VARIABLE_SYNTAX,
};
pub use encode::{format_float, to_json_string, AsDocument, Converter, Generator};
pub use error::{GenerateError, Location, ParseError, Result};
pub use lexer::{Token, TokenKind};
pub use number::to_number;
pub use parser::Parser;
pub use value::{Documents, Map, Number, Value};

/// Parse all documents in `text` with the default configuration.
pub fn parse(text: &str) -> Result<Documents> {
    parse_with_config(text, &Config::default())
}

/// Parse all documents in `text`.
pub fn parse_with_config(text: &str, config: &Config) -> Result<Documents> {
    Parser::new(text, config).parse()
}

/// Parse `text` into a single value: the only document, or a list of all
/// documents when there are several.
pub fn parse_value(text: &str) -> Result<Value> {
    parse(text).map(Documents::into_value)
}

/// The token stream of `text`, ending with [`TokenKind::End`]. Remarks are
/// included unless the configuration skips them.
pub fn tokenize(text: &str, config: &Config) -> Result<Vec<Token>> {
    lexer::Lexer::new(text, config).tokenize()
}
