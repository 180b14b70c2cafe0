//! Error types for parsing and JSON generation.

use std::fmt;

use thiserror::Error;

/// Result type for parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Where an error happened: the 1-based line number and a two-line
/// excerpt with a caret under the offending column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub excerpt: String,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            return Ok(());
        }
        write!(f, " on line {}:\n{}", self.line, self.excerpt)
    }
}

/// Error type for parsing.
///
/// Every variant carries the bare message and its [`Location`], so the
/// rendered error is directly printable.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Malformed quoting or escaping.
    #[error("{0}{1}")]
    Lexical(String, Location),

    /// Unbalanced brackets, illegal indentation, misplaced tokens.
    #[error("{0}{1}")]
    Structural(String, Location),

    /// Use of an anchor that was not defined earlier in the document.
    #[error("{0}{1}")]
    Reference(String, Location),

    /// Explicit tag with no registered handler.
    #[error("{0}{1}")]
    UnsupportedTag(String, Location),

    /// A capability the parser does not offer, like raw byte reads.
    #[error("{0}{1}")]
    UnsupportedFeature(String, Location),

    /// Failure raised by a tag handler that was not itself a parse error.
    #[error("{0}{1}")]
    Conversion(String, Location),
}

impl ParseError {
    pub fn lexical(message: impl Into<String>) -> Self {
        ParseError::Lexical(message.into(), Location::default())
    }

    pub fn structural(message: impl Into<String>) -> Self {
        ParseError::Structural(message.into(), Location::default())
    }

    pub fn reference(message: impl Into<String>) -> Self {
        ParseError::Reference(message.into(), Location::default())
    }

    pub fn unsupported_tag(message: impl Into<String>) -> Self {
        ParseError::UnsupportedTag(message.into(), Location::default())
    }

    pub fn unsupported_feature(message: impl Into<String>) -> Self {
        ParseError::UnsupportedFeature(message.into(), Location::default())
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        ParseError::Conversion(message.into(), Location::default())
    }

    /// Attach a location, replacing any previous one.
    pub fn with_location(self, location: Location) -> Self {
        match self {
            ParseError::Lexical(msg, _) => ParseError::Lexical(msg, location),
            ParseError::Structural(msg, _) => ParseError::Structural(msg, location),
            ParseError::Reference(msg, _) => ParseError::Reference(msg, location),
            ParseError::UnsupportedTag(msg, _) => ParseError::UnsupportedTag(msg, location),
            ParseError::UnsupportedFeature(msg, _) => {
                ParseError::UnsupportedFeature(msg, location)
            }
            ParseError::Conversion(msg, _) => ParseError::Conversion(msg, location),
        }
    }

    /// The message without location.
    pub fn message(&self) -> &str {
        match self {
            ParseError::Lexical(msg, _)
            | ParseError::Structural(msg, _)
            | ParseError::Reference(msg, _)
            | ParseError::UnsupportedTag(msg, _)
            | ParseError::UnsupportedFeature(msg, _)
            | ParseError::Conversion(msg, _) => msg,
        }
    }

    pub fn location(&self) -> &Location {
        match self {
            ParseError::Lexical(_, loc)
            | ParseError::Structural(_, loc)
            | ParseError::Reference(_, loc)
            | ParseError::UnsupportedTag(_, loc)
            | ParseError::UnsupportedFeature(_, loc)
            | ParseError::Conversion(_, loc) => loc,
        }
    }

    /// 1-based line number, or 0 when the error has no location.
    pub fn line(&self) -> usize {
        self.location().line
    }
}

/// Error type for JSON generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerateError {
    /// The value has no document representation and no conversion hook
    /// produced one.
    #[error("No JSON representation for {0}")]
    Serialization(String),
}
