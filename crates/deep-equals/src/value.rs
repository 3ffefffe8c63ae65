//! Dynamic values compared by the engine.
//!
//! Primitives are held inline. Arrays and objects are shared references, so
//! a [`Value`] can alias another one or contain itself; cloning a `Value`
//! clones the reference, never the structure.
//!
//! Reference counting does not reclaim cycles. Call [`Object::clear`] or
//! [`Array::clear`] to break one when it is no longer needed.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// Ordered field map of a keyed structure.
pub type Fields = IndexMap<String, Value>;

/// Fundamental runtime category of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeTag {
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl TypeTag {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Undefined => "undefined",
            TypeTag::Null => "null",
            TypeTag::Boolean => "boolean",
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
        }
    }

    /// Whether values of this tag are compared structurally.
    pub fn is_structured(self) -> bool {
        matches!(self, TypeTag::Array | TypeTag::Object)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A comparable datum.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Array),
    Object(Object),
}

impl Value {
    /// Builds an array value from anything convertible into values.
    pub fn array<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::Array(Array::new(items.into_iter().map(Into::into).collect()))
    }

    /// Builds a plain object value from key/value pairs.
    pub fn object<I, K, T>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
        T: Into<Value>,
    {
        Value::Object(Object::from_fields(
            fields.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ))
    }

    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Undefined => TypeTag::Undefined,
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Number(_) => TypeTag::Number,
            Value::String(_) => TypeTag::String,
            Value::Array(_) => TypeTag::Array,
            Value::Object(_) => TypeTag::Object,
        }
    }

    pub fn is_structured(&self) -> bool {
        self.type_tag().is_structured()
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Same type tag and identical: primitives by value with IEEE number
    /// semantics (`NaN` is never identical, `0 == -0`), structures by
    /// reference.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Address of the shared allocation behind a structured value.
    pub(crate) fn address(&self) -> Option<usize> {
        match self {
            Value::Array(a) => Some(a.address()),
            Value::Object(o) => Some(o.address()),
            _ => None,
        }
    }
}

/// Shared, mutable ordered sequence.
#[derive(Clone, Default)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

impl Array {
    pub fn new(items: Vec<Value>) -> Self {
        Array(Rc::new(RefCell::new(items)))
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    pub fn push(&self, value: impl Into<Value>) {
        self.0.borrow_mut().push(value.into());
    }

    pub fn set(&self, index: usize, value: impl Into<Value>) -> bool {
        match self.0.borrow_mut().get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn items(&self) -> Ref<'_, Vec<Value>> {
        self.0.borrow()
    }

    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn address(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

#[derive(Default)]
struct ObjectData {
    lineage: Vec<String>,
    fields: Fields,
}

/// Shared, mutable keyed structure, optionally an instance of a class.
///
/// The lineage lists the declared class first, then its ancestors. Plain
/// objects have an empty lineage.
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<ObjectData>>);

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fields(fields: Fields) -> Self {
        Object(Rc::new(RefCell::new(ObjectData {
            lineage: Vec::new(),
            fields,
        })))
    }

    /// An empty instance of `class`.
    pub fn instance(class: impl Into<String>) -> Self {
        Self::with_lineage([class.into()])
    }

    /// An empty instance whose class is `lineage[0]`, deriving from the rest.
    pub fn with_lineage<I, S>(lineage: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Object(Rc::new(RefCell::new(ObjectData {
            lineage: lineage.into_iter().map(Into::into).collect(),
            fields: Fields::new(),
        })))
    }

    pub fn class_name(&self) -> Option<String> {
        self.0.borrow().lineage.first().cloned()
    }

    pub fn is_instance_of(&self, class: &str) -> bool {
        self.0.borrow().lineage.iter().any(|c| c == class)
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.borrow_mut().fields.insert(key.into(), value.into())
    }

    /// Chaining form of [`Object::insert`].
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().fields.get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().fields.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.borrow().fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().fields.is_empty()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().fields.clear();
    }

    pub fn fields(&self) -> Ref<'_, Fields> {
        Ref::map(self.0.borrow(), |data| &data.fields)
    }

    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    fn address(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

// ── conversions ──────────────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
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

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Array> for Value {
    fn from(a: Array) -> Self {
        Value::Array(a)
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::array(items)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::array(items),
            serde_json::Value::Object(map) => Value::object(map),
        }
    }
}

// ── rendering ────────────────────────────────────────────────────────────

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        write!(f, "{n}")
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, seen: &mut Vec<usize>) -> fmt::Result {
    match value {
        Value::Undefined => f.write_str("undefined"),
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Number(n) => write_number(f, *n),
        Value::String(s) => write!(f, "{s:?}"),
        Value::Array(a) => {
            if seen.contains(&a.address()) {
                return f.write_str("[Circular]");
            }
            seen.push(a.address());
            f.write_str("[")?;
            for (i, item) in a.items().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_value(f, item, seen)?;
            }
            seen.pop();
            f.write_str("]")
        }
        Value::Object(o) => {
            if seen.contains(&o.address()) {
                return f.write_str("[Circular]");
            }
            seen.push(o.address());
            if let Some(class) = o.class_name() {
                write!(f, "{class} ")?;
            }
            let fields = o.fields();
            if fields.is_empty() {
                f.write_str("{}")?;
            } else {
                f.write_str("{ ")?;
                for (i, (key, item)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: ")?;
                    write_value(f, item, seen)?;
                }
                f.write_str(" }")?;
            }
            seen.pop();
            Ok(())
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, &mut Vec::new())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Value::Array(self.clone()), f)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Value::Object(self.clone()), f)
    }
}
