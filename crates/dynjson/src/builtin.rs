//! The `JSON` built-in object: `parse` and `stringify` as runtime callables
//! taking dynamic argument lists.
//!
//! ```
//! use dynjson::builtin::{json_object, json_parse, json_stringify};
//! use dynjson::{JsString, Value};
//!
//! let value = json_parse(&Value::Undefined, &[Value::from("[1, 2]")]).unwrap();
//! let text = json_stringify(&Value::Undefined, &[value]).unwrap();
//! assert_eq!(text, Value::from("[1,2]"));
//!
//! let json = json_object();
//! assert_eq!(json.keys(), vec![JsString::from("parse"), JsString::from("stringify")]);
//! ```

use crate::format::format_number;
use crate::options::{ParseOptions, Space, StringifyOptions};
use crate::parser::parse_units;
use crate::serializer::stringify_with_options;
use crate::value::{Callable, JsString, ObjectRef, Value};
use crate::Result;

/// `JSON.parse(text, reviver?)`. A non-callable second argument is ignored.
pub fn json_parse(_this: &Value, args: &[Value]) -> Result<Value> {
    let text = args.first().map(to_text).unwrap_or_else(|| JsString::from("undefined"));
    let reviver = args.get(1).and_then(Value::as_callable);
    parse_units(text.as_units(), reviver, &ParseOptions::default())
}

/// `JSON.stringify(value, replacer?, space?)`. Returns `undefined` when the
/// value has no textual form.
pub fn json_stringify(_this: &Value, args: &[Value]) -> Result<Value> {
    let value = args.first().cloned().unwrap_or_default();
    let replacer = args.get(1).and_then(Value::as_callable);
    let space = args.get(2).map(Space::from_value).unwrap_or_default();
    let options = StringifyOptions::default().with_space(space);
    Ok(stringify_with_options(&value, replacer, &options)?
        .map(Value::from)
        .unwrap_or_default())
}

/// A fresh `JSON` object with `parse` and `stringify` members.
pub fn json_object() -> ObjectRef {
    let json = ObjectRef::new();
    json.set("parse", Value::Callable(Callable::new(json_parse)));
    json.set("stringify", Value::Callable(Callable::new(json_stringify)));
    json
}

/// Minimal text conversion for the `text` argument of `parse`.
fn to_text(value: &Value) -> JsString {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => JsString::from(format_number(*n)),
        Value::Boolean(b) => JsString::from(if *b { "true" } else { "false" }),
        Value::Null => JsString::from("null"),
        Value::Undefined => JsString::from("undefined"),
        Value::Object(_) | Value::Array(_) => JsString::from("[object Object]"),
        Value::Callable(_) => JsString::from("function () { [native code] }"),
    }
}
