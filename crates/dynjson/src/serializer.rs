//! Converts a runtime [`Value`] graph into interchange text.
//!
//! A depth-first walk keyed by `(key, value)` pairs, starting from key `""`
//! and the root. For each pair:
//!
//! 1. the replacer (if any) is called as `replacer(key, value)` with the
//!    holder as receiver; `undefined` or `null` results drop the member;
//! 2. `undefined` and callables are dropped;
//! 3. objects exposing a callable `toJSON` are replaced by its result (which
//!    is neither re-replaced nor re-converted, though its children are);
//! 4. primitives are written directly;
//! 5. objects and arrays are written member by member.
//!
//! Circular structures are detected with an ancestor stack holding exactly
//! the composites currently being written. The same value reached through
//! two sibling paths is written twice; only a value that is its own ancestor
//! is an error.

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::format::{format_number, quote_into};
use crate::options::{Space, StringifyOptions, MAX_STRINGIFY_DEPTH};
use crate::value::{ArrayRef, Callable, JsString, ObjectRef, Value};

/// Serialize a value compactly. `Ok(None)` means the value has no textual
/// form (`undefined`, a callable, or an omitted root).
pub fn stringify(value: &Value) -> Result<Option<String>> {
    stringify_with_options(value, None, &StringifyOptions::default())
}

/// Serialize with an optional replacer and space specifier.
pub fn stringify_with(
    value: &Value,
    replacer: Option<&Callable>,
    space: impl Into<Space>,
) -> Result<Option<String>> {
    let options = StringifyOptions::default().with_space(space);
    stringify_with_options(value, replacer, &options)
}

pub fn stringify_with_options(
    value: &Value,
    replacer: Option<&Callable>,
    options: &StringifyOptions,
) -> Result<Option<String>> {
    trace!(
        replacer = replacer.is_some(),
        space = ?options.space,
        "stringify"
    );
    let mut serializer = Serializer {
        replacer,
        indent: options.space.indent_unit(),
        max_depth: options.max_depth.min(MAX_STRINGIFY_DEPTH),
        ancestors: Vec::new(),
    };
    let mut out = String::new();
    let root_key = JsString::default();
    let result = serializer.write_property(&Value::Undefined, &root_key, value.clone(), &mut out);
    debug_assert!(serializer.ancestors.is_empty());
    match result {
        Ok(true) => Ok(Some(out)),
        Ok(false) => Ok(None),
        Err(err) => {
            debug!(error = %err, "stringify failed");
            Err(err)
        }
    }
}

struct Serializer<'a> {
    replacer: Option<&'a Callable>,
    indent: Option<String>,
    max_depth: usize,
    /// Identities of the objects/arrays on the current write path.
    ancestors: Vec<usize>,
}

impl Serializer<'_> {
    /// Writes `value` found under `key` in `holder`. Returns `false` (having
    /// written nothing) when the member is omitted.
    fn write_property(
        &mut self,
        holder: &Value,
        key: &JsString,
        value: Value,
        out: &mut String,
    ) -> Result<bool> {
        let mut value = value;
        if let Some(replacer) = self.replacer {
            value = replacer.call(holder, &[Value::String(key.clone()), value])?;
            if value.is_undefined() || value.is_null() {
                return Ok(false);
            }
        }

        if let Value::Object(object) = &value {
            if let Some(method) = object.try_get_conversion_method()? {
                let converted = method.call(&value, &[])?;
                return self.write_value(converted, out);
            }
        }
        self.write_value(value, out)
    }

    /// Writes a value that has already been through the replacer and `toJSON`.
    fn write_value(&mut self, value: Value, out: &mut String) -> Result<bool> {
        match value {
            Value::Undefined | Value::Callable(_) => return Ok(false),
            Value::Null => out.push_str("null"),
            Value::Boolean(b) => out.push_str(if b { "true" } else { "false" }),
            Value::Number(n) if n.is_finite() => out.push_str(&format_number(n)),
            Value::Number(_) => out.push_str("null"),
            Value::String(s) => quote_into(out, s.as_units()),
            Value::Object(object) => self.write_object(&object, out)?,
            Value::Array(array) => self.write_array(&array, out)?,
        }
        Ok(true)
    }

    /// Runs `body` with `id` pushed on the ancestor stack, popping it again on
    /// every exit path.
    fn with_ancestor<F>(&mut self, id: usize, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if self.ancestors.contains(&id) {
            return Err(Error::circular());
        }
        if self.ancestors.len() >= self.max_depth {
            return Err(Error::DepthLimit {
                limit: self.max_depth,
            });
        }
        self.ancestors.push(id);
        let result = body(self);
        self.ancestors.pop();
        result
    }

    fn write_object(&mut self, object: &ObjectRef, out: &mut String) -> Result<()> {
        self.with_ancestor(object.id(), |this| {
            let holder = Value::Object(object.clone());
            out.push('{');
            let mut emitted = 0;
            for key in object.keys() {
                // Removed by a callback earlier in this walk.
                let Some(property) = object.get_own(&key) else {
                    continue;
                };
                let Some(member) = property.read(&holder)? else {
                    continue;
                };
                let mark = out.len();
                this.write_separator(emitted, out);
                quote_into(out, key.as_units());
                out.push(':');
                if this.indent.is_some() {
                    out.push(' ');
                }
                if this.write_property(&holder, &key, member, out)? {
                    emitted += 1;
                } else {
                    out.truncate(mark);
                }
            }
            this.write_closing_break(emitted, out);
            out.push('}');
            Ok(())
        })
    }

    fn write_array(&mut self, array: &ArrayRef, out: &mut String) -> Result<()> {
        self.with_ancestor(array.id(), |this| {
            let holder = Value::Array(array.clone());
            out.push('[');
            let mut emitted = 0;
            for index in 0..array.len() {
                // Holes have no value to write.
                let Some(element) = array.get(index) else {
                    continue;
                };
                let mark = out.len();
                this.write_separator(emitted, out);
                let key = JsString::from(index.to_string());
                if this.write_property(&holder, &key, element, out)? {
                    emitted += 1;
                } else {
                    out.truncate(mark);
                }
            }
            this.write_closing_break(emitted, out);
            out.push(']');
            Ok(())
        })
    }

    /// `,` between members, then a line break and indentation when indenting.
    fn write_separator(&self, emitted: usize, out: &mut String) {
        if emitted > 0 {
            out.push(',');
        }
        if let Some(unit) = &self.indent {
            out.push('\n');
            for _ in 0..self.ancestors.len() {
                out.push_str(unit);
            }
        }
    }

    /// Line break before the closing delimiter of a non-empty composite.
    fn write_closing_break(&self, emitted: usize, out: &mut String) {
        if let (Some(unit), true) = (&self.indent, emitted > 0) {
            out.push('\n');
            for _ in 1..self.ancestors.len() {
                out.push_str(unit);
            }
        }
    }
}
