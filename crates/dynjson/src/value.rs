//! Runtime value model the codec reads from and builds into.
//!
//! The model mirrors a dynamically-typed scripting runtime: primitives are
//! copied by value, while objects and arrays are shared, mutable references
//! (`Rc<RefCell<..>>`). Strings are UTF-16 code-unit sequences so that lone
//! surrogates survive a parse/stringify cycle untouched.
//!
//! The codec only talks to this module through a handful of capability
//! queries: ordered key enumeration, member reads (including getter dispatch
//! via [`Property::read`]), member writes, and
//! [`ObjectRef::try_get_conversion_method`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::Result;

/// Name of the duck-typed conversion method consulted during stringify.
pub const CONVERSION_METHOD: &str = "toJSON";

/// Immutable UTF-16 string. Clones are reference-counted.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct JsString(Rc<[u16]>);

impl JsString {
    pub fn from_units(units: &[u16]) -> Self {
        JsString(Rc::from(units))
    }

    pub fn as_units(&self) -> &[u16] {
        &self.0
    }

    /// Length in UTF-16 code units.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Converts to a Rust string, replacing lone surrogates with U+FFFD.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(&self.0)
    }
}

impl Default for JsString {
    fn default() -> Self {
        JsString(Rc::from(Vec::new()))
    }
}

impl From<Vec<u16>> for JsString {
    fn from(units: Vec<u16>) -> Self {
        JsString(Rc::from(units))
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        JsString::from(s.encode_utf16().collect::<Vec<u16>>())
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString::from(s.as_str())
    }
}

impl From<&String> for JsString {
    fn from(s: &String) -> Self {
        JsString::from(s.as_str())
    }
}

impl PartialEq<str> for JsString {
    fn eq(&self, other: &str) -> bool {
        self.0.iter().copied().eq(other.encode_utf16())
    }
}

impl PartialEq<&str> for JsString {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string_lossy())
    }
}

/// A runtime value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    Object(ObjectRef),
    Array(ArrayRef),
    /// Opaque invocable. Never serialized.
    Callable(Callable),
}

impl Value {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&JsString> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayRef> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Callable(c) => Some(c),
            _ => None,
        }
    }

    /// The runtime's `typeof` name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Object(_) | Value::Array(_) => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Callable(_) => "function",
        }
    }
}

/// Strict equality: primitives compare by value, composites and callables by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Callable(a), Value::Callable(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Boolean(b) => write!(f, "Boolean({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Object(o) => write!(f, "{o:?}"),
            Value::Array(a) => write!(f, "{a:?}"),
            Value::Callable(c) => write!(f, "{c:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(JsString::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(JsString::from(s))
    }
}

impl From<JsString> for Value {
    fn from(s: JsString) -> Self {
        Value::String(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

impl From<ArrayRef> for Value {
    fn from(a: ArrayRef) -> Self {
        Value::Array(a)
    }
}

impl From<Callable> for Value {
    fn from(c: Callable) -> Self {
        Value::Callable(c)
    }
}

type NativeFn = dyn Fn(&Value, &[Value]) -> Result<Value>;

/// A function-like value: invoked with a receiver and positional arguments.
#[derive(Clone)]
pub struct Callable(Rc<NativeFn>);

impl Callable {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value> + 'static,
    {
        Callable(Rc::new(f))
    }

    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value> {
        (self.0)(this, args)
    }

    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Rc::as_ptr(&self.0).cast::<()>() == Rc::as_ptr(&other.0).cast::<()>()
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable")
    }
}

/// An own property slot.
#[derive(Clone, Debug)]
pub enum Property {
    Data(Value),
    Accessor {
        get: Option<Callable>,
        set: Option<Callable>,
    },
}

impl Property {
    /// Reads the property as seen from `holder`, invoking the getter for
    /// accessors. A write-only accessor has no value and yields `None`.
    pub fn read(&self, holder: &Value) -> Result<Option<Value>> {
        match self {
            Property::Data(value) => Ok(Some(value.clone())),
            Property::Accessor { get: Some(get), .. } => get.call(holder, &[]).map(Some),
            Property::Accessor { get: None, .. } => Ok(None),
        }
    }
}

#[derive(Default)]
struct ObjectData {
    properties: IndexMap<JsString, Property>,
    prototype: Option<ObjectRef>,
}

impl ObjectData {
    fn drain_into(&mut self, pending: &mut Vec<Value>) {
        for (_, property) in self.properties.drain(..) {
            if let Property::Data(value) = property {
                defer_release(value, pending);
            }
        }
        if let Some(prototype) = self.prototype.take() {
            pending.push(Value::Object(prototype));
        }
    }
}

impl Drop for ObjectData {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.drain_into(&mut pending);
        release(pending);
    }
}

#[derive(Default)]
struct ArrayData {
    elements: Vec<Option<Value>>,
}

impl ArrayData {
    fn drain_into(&mut self, pending: &mut Vec<Value>) {
        for value in self.elements.drain(..).flatten() {
            defer_release(value, pending);
        }
    }
}

impl Drop for ArrayData {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.drain_into(&mut pending);
        release(pending);
    }
}

/// Queues composites for [`release`]; primitives drop on the spot.
fn defer_release(value: Value, pending: &mut Vec<Value>) {
    if matches!(value, Value::Object(_) | Value::Array(_)) {
        pending.push(value);
    }
}

/// Frees a graph of composites with a worklist instead of nested drops, so
/// releasing an arbitrarily deep document uses constant stack.
///
/// A handle held only by the worklist is emptied before it is dropped; its
/// storage then has nothing left to free. Shared handles just lose a count.
fn release(mut pending: Vec<Value>) {
    while let Some(value) = pending.pop() {
        match &value {
            Value::Object(object) if Rc::strong_count(&object.0) == 1 => {
                if let Ok(mut data) = object.0.try_borrow_mut() {
                    data.drain_into(&mut pending);
                }
            }
            Value::Array(array) if Rc::strong_count(&array.0) == 1 => {
                if let Ok(mut data) = array.0.try_borrow_mut() {
                    data.drain_into(&mut pending);
                }
            }
            _ => {}
        }
    }
}

/// Shared handle to an object with insertion-ordered properties.
#[derive(Clone, Default)]
pub struct ObjectRef(Rc<RefCell<ObjectData>>);

impl ObjectRef {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh object whose method lookups fall back to `prototype`.
    pub fn with_prototype(prototype: ObjectRef) -> Self {
        let object = Self::new();
        object.0.borrow_mut().prototype = Some(prototype);
        object
    }

    /// Builds an object from key/value pairs, in order.
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<JsString>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let object = Self::new();
        for (key, value) in entries {
            object.set(key, value);
        }
        object
    }

    /// Looks `key` up on the object, then along its prototype chain.
    /// Getters are not invoked.
    pub fn get(&self, key: &JsString) -> Option<Property> {
        let mut current = Some(self.clone());
        while let Some(object) = current {
            let data = object.0.borrow();
            if let Some(property) = data.properties.get(key) {
                return Some(property.clone());
            }
            current = data.prototype.clone();
        }
        None
    }

    pub fn get_own(&self, key: &JsString) -> Option<Property> {
        self.0.borrow().properties.get(key).cloned()
    }

    /// Assigns a data property. Existing keys keep their position.
    pub fn set(&self, key: impl Into<JsString>, value: Value) {
        self.0
            .borrow_mut()
            .properties
            .insert(key.into(), Property::Data(value));
    }

    pub fn define_accessor(
        &self,
        key: impl Into<JsString>,
        get: Option<Callable>,
        set: Option<Callable>,
    ) {
        self.0
            .borrow_mut()
            .properties
            .insert(key.into(), Property::Accessor { get, set });
    }

    /// Removes an own property, preserving the order of the rest.
    pub fn delete(&self, key: &JsString) -> bool {
        self.0.borrow_mut().properties.shift_remove(key).is_some()
    }

    /// Snapshot of own keys in insertion order.
    pub fn keys(&self) -> Vec<JsString> {
        self.0.borrow().properties.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().properties.is_empty()
    }

    /// The `toJSON` capability: present when the member resolves (through
    /// the prototype chain, getters included) to a callable.
    pub fn try_get_conversion_method(&self) -> Result<Option<Callable>> {
        let Some(property) = self.get(&JsString::from(CONVERSION_METHOD)) else {
            return Ok(None);
        };
        match property.read(&Value::Object(self.clone()))? {
            Some(Value::Callable(method)) => Ok(Some(method)),
            _ => Ok(None),
        }
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the underlying allocation, stable while the object lives.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object").field("keys", &self.keys()).finish()
    }
}

/// Shared handle to an index-keyed, possibly sparse array.
/// `None` slots are holes.
#[derive(Clone, Default)]
pub struct ArrayRef(Rc<RefCell<ArrayData>>);

impl ArrayRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values<I: IntoIterator<Item = Value>>(values: I) -> Self {
        let elements = values.into_iter().map(Some).collect();
        ArrayRef(Rc::new(RefCell::new(ArrayData { elements })))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().elements.is_empty()
    }

    /// The element at `index`; `None` for holes and out-of-range indices.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().elements.get(index).cloned().flatten()
    }

    /// Stores `value` at `index`, growing the array with holes as needed.
    pub fn set(&self, index: usize, value: Value) {
        let mut data = self.0.borrow_mut();
        let elements = &mut data.elements;
        if index >= elements.len() {
            elements.resize(index + 1, None);
        }
        elements[index] = Some(value);
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().elements.push(Some(value));
    }

    /// Turns the slot at `index` into a hole. The length is unchanged.
    pub fn delete(&self, index: usize) -> bool {
        match self.0.borrow_mut().elements.get_mut(index) {
            Some(slot) => slot.take().is_some(),
            None => false,
        }
    }

    /// Truncates, or pads with holes, to exactly `len` slots.
    pub fn set_len(&self, len: usize) {
        self.0.borrow_mut().elements.resize(len, None);
    }

    pub fn ptr_eq(&self, other: &ArrayRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for ArrayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Array(len={})", self.len())
    }
}
