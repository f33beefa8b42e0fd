//! Error types for parse and stringify operations.

use thiserror::Error;

/// The malformed-token class behind a syntax error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A character that cannot start or continue anything at this position.
    UnexpectedToken,
    /// A numeric literal that does not follow the interchange number grammar.
    InvalidNumber,
    /// A raw control character (code unit <= 0x1F) inside a string literal.
    InvalidStringChar(u16),
    /// A backslash sequence that is not one of the interchange escapes.
    InvalidEscape,
    /// Input ended while a value, name or delimiter was still required.
    UnexpectedEnd,
}

impl SyntaxErrorKind {
    /// Human-readable message, stable across releases.
    pub fn message(&self) -> String {
        match self {
            SyntaxErrorKind::UnexpectedToken => "Unexpected token".to_string(),
            SyntaxErrorKind::InvalidNumber => "Invalid number definition".to_string(),
            SyntaxErrorKind::InvalidStringChar(unit) => {
                format!("Invalid string char '\\u{:04x}'", unit)
            }
            SyntaxErrorKind::InvalidEscape => "Invalid escape sequence".to_string(),
            SyntaxErrorKind::UnexpectedEnd => "Unexpected end of string".to_string(),
        }
    }

    /// Short category label for diagnostics and log fields.
    pub fn category(&self) -> &'static str {
        match self {
            SyntaxErrorKind::UnexpectedToken => "unexpected-token",
            SyntaxErrorKind::InvalidNumber => "invalid-number",
            SyntaxErrorKind::InvalidStringChar(_) => "invalid-string",
            SyntaxErrorKind::InvalidEscape => "invalid-escape",
            SyntaxErrorKind::UnexpectedEnd => "unexpected-end",
        }
    }
}

/// Errors that can occur during parsing or stringifying.
#[derive(Error, Debug)]
pub enum Error {
    /// The input text was not well-formed interchange text.
    /// `position` is the UTF-16 code-unit offset where the error was detected.
    #[error("SyntaxError: {} at position {position}", kind.message())]
    Syntax {
        kind: SyntaxErrorKind,
        position: usize,
    },

    /// The value graph cannot be serialized (e.g., it is circular).
    #[error("TypeError: {0}")]
    Type(String),

    /// Nesting went past the configured depth limit.
    #[error("RangeError: maximum nesting depth of {limit} exceeded")]
    DepthLimit { limit: usize },

    /// A reviver, replacer, getter or `toJSON` method failed.
    #[error("{0}")]
    Thrown(String),

    /// A conversion to or from `serde_json` failed.
    #[error("serde_json interop error: {0}")]
    Interop(#[from] serde_json::Error),
}

impl Error {
    pub fn syntax(kind: SyntaxErrorKind, position: usize) -> Self {
        Error::Syntax { kind, position }
    }

    /// Error raised from inside a caller-supplied callable.
    pub fn thrown(message: impl Into<String>) -> Self {
        Error::Thrown(message.into())
    }

    pub fn circular() -> Self {
        Error::Type("Converting circular structure to JSON".to_string())
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, Error::Syntax { .. })
    }

    pub fn is_type(&self) -> bool {
        matches!(self, Error::Type(_))
    }

    /// The syntax error class, if this is a syntax error.
    pub fn syntax_kind(&self) -> Option<SyntaxErrorKind> {
        match self {
            Error::Syntax { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Convenience alias used throughout dynjson.
pub type Result<T> = std::result::Result<T, Error>;
