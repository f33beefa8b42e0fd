//! Knobs for parse and stringify calls.

use crate::value::{JsString, Value};

/// Default nesting limit for both directions.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Highest nesting limit a stringify call honors. The serializer recurses
/// once per level, so larger requests are clamped to this.
pub const MAX_STRINGIFY_DEPTH: usize = 1024;

/// Longest indent unit a space specifier can produce.
pub const MAX_INDENT: usize = 10;

/// Options for [`crate::parse_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum number of simultaneously open objects/arrays.
    pub max_depth: usize,
}

impl ParseOptions {
    /// No nesting limit. Memory still grows only with nesting depth.
    pub fn unbounded() -> Self {
        Self {
            max_depth: usize::MAX,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// The space specifier of a stringify call.
///
/// - `Count(n)`: `n` spaces, clamped to [`MAX_INDENT`]; `n <= 0` means no indentation.
/// - `Text(s)`: the first [`MAX_INDENT`] UTF-16 code units of `s`; empty means no indentation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Space {
    #[default]
    None,
    Count(i64),
    Text(JsString),
}

impl Space {
    /// The indent unit to repeat per nesting level, if any.
    pub fn indent_unit(&self) -> Option<String> {
        match self {
            Space::None => None,
            Space::Count(n) if *n <= 0 => None,
            Space::Count(n) => Some(" ".repeat((*n).min(MAX_INDENT as i64) as usize)),
            Space::Text(s) => {
                let units = &s.as_units()[..s.len().min(MAX_INDENT)];
                // A surrogate pair cut in half leaves U+FFFD in its place.
                (!units.is_empty()).then(|| String::from_utf16_lossy(units))
            }
        }
    }

    /// Interprets a runtime value as a space specifier: numbers are truncated
    /// toward zero, strings are used as text, anything else means none.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Number(n) if n.is_nan() => Space::None,
            // Float-to-int `as` saturates at the i64 bounds.
            Value::Number(n) => Space::Count(n.trunc() as i64),
            Value::String(s) => Space::Text(s.clone()),
            _ => Space::None,
        }
    }
}

impl From<usize> for Space {
    fn from(n: usize) -> Self {
        Space::Count(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<i64> for Space {
    fn from(n: i64) -> Self {
        Space::Count(n)
    }
}

impl From<i32> for Space {
    fn from(n: i32) -> Self {
        Space::Count(i64::from(n))
    }
}

impl From<&str> for Space {
    fn from(s: &str) -> Self {
        Space::Text(JsString::from(s))
    }
}

impl From<String> for Space {
    fn from(s: String) -> Self {
        Space::Text(JsString::from(s))
    }
}

/// Options for [`crate::stringify_with_options`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringifyOptions {
    pub space: Space,
    /// Maximum number of nested objects/arrays being written at once,
    /// never more than [`MAX_STRINGIFY_DEPTH`].
    pub max_depth: usize,
}

impl StringifyOptions {
    pub fn with_space(mut self, space: impl Into<Space>) -> Self {
        self.space = space.into();
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.min(MAX_STRINGIFY_DEPTH);
        self
    }
}

impl Default for StringifyOptions {
    fn default() -> Self {
        Self {
            space: Space::None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
