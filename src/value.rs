//! The dynamic value model shared by inputs, outputs and panic payloads.
//!
//! Functions under test are ordinary Rust functions. Their arguments and return
//! values cross the engine boundary as [`Value`]s, tagged with a [`ValueType`]
//! so the binder can check and coerce inputs before a call is made.

use im::OrdMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// ============================================================================
// VALUE TYPES
// ============================================================================

/// The static type of a parameter, as seen by the binder.
///
/// `Optional` is the pointer-like type (a Rust `Option<T>`) and `Dynamic` the
/// interface-like type (a parameter declared as [`Value`]). Those two are the
/// only types an untyped `Nil` input may bind to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Str,
    List(Box<ValueType>),
    Map(Box<ValueType>),
    Error,
    Optional(Box<ValueType>),
    Dynamic,
}

impl ValueType {
    /// Returns true if an absent value is a legal inhabitant of this type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ezcase::value::ValueType;
    /// assert!(ValueType::Dynamic.is_nilable());
    /// assert!(ValueType::Optional(Box::new(ValueType::Int)).is_nilable());
    /// assert!(!ValueType::Int.is_nilable());
    /// ```
    pub fn is_nilable(&self) -> bool {
        matches!(self, ValueType::Optional(_) | ValueType::Dynamic)
    }

    /// Returns the zero value of this type.
    pub fn zero(&self) -> Value {
        match self {
            ValueType::Bool => Value::Bool(false),
            ValueType::Int => Value::Int(0),
            ValueType::Float => Value::Float(0.0),
            ValueType::Str => Value::Str(String::new()),
            ValueType::List(_) => Value::List(Vec::new()),
            ValueType::Map(_) => Value::Map(OrdMap::new()),
            ValueType::Error | ValueType::Optional(_) | ValueType::Dynamic => Value::Nil,
        }
    }

    /// Returns true if `value` already inhabits this type without coercion.
    pub fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueType::Dynamic, _) => true,
            (ValueType::Optional(_), Value::Nil) => true,
            (ValueType::Optional(inner), v) => inner.admits(v),
            (ValueType::Bool, Value::Bool(_))
            | (ValueType::Int, Value::Int(_))
            | (ValueType::Float, Value::Float(_))
            | (ValueType::Str, Value::Str(_))
            | (ValueType::Error, Value::Error(_)) => true,
            (ValueType::List(elem), Value::List(items)) => items.iter().all(|v| elem.admits(v)),
            (ValueType::Map(elem), Value::Map(map)) => map.values().all(|v| elem.admits(v)),
            _ => false,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Bool => write!(f, "bool"),
            ValueType::Int => write!(f, "int"),
            ValueType::Float => write!(f, "float"),
            ValueType::Str => write!(f, "string"),
            ValueType::List(elem) => write!(f, "[{}]", elem),
            ValueType::Map(elem) => write!(f, "{{string: {}}}", elem),
            ValueType::Error => write!(f, "error"),
            ValueType::Optional(inner) => write!(f, "Option<{}>", inner),
            ValueType::Dynamic => write!(f, "any"),
        }
    }
}

// ============================================================================
// ERROR VALUES
// ============================================================================

/// A captured error: the value that satisfies the `Error` placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorValue {
    message: String,
    type_name: String,
}

impl ErrorValue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            type_name: "ErrorValue".to_string(),
        }
    }

    /// Captures the message and type name of any standard error.
    pub fn from_error<E: std::error::Error + ?Sized>(error: &E) -> Self {
        Self::from_display(error)
    }

    /// Captures the message and type name of anything returned on the `Err`
    /// side of a `Result`, including boxed trait objects and plain strings.
    pub fn from_display<E: fmt::Display + ?Sized>(error: &E) -> Self {
        Self {
            message: error.to_string(),
            type_name: short_type_name(std::any::type_name::<E>()).to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ErrorValue {}

/// Trims the module path off a type name, keeping generic arguments intact.
pub(crate) fn short_type_name(full: &str) -> &str {
    if full.starts_with("dyn ") || full.contains("::Box<dyn ") {
        return "Error";
    }
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(i) => &full[i + 2..],
        None => full,
    }
}

// ============================================================================
// VALUES
// ============================================================================

/// A dynamically typed value.
///
/// # Examples
///
/// ```rust
/// use ezcase::value::Value;
/// let n = Value::Int(3);
/// assert_eq!(n.type_name(), "Int");
/// assert!(Value::Str(String::new()).is_zero());
/// assert!(Value::default().is_nil());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum Value {
    /// An untyped absence.
    #[default]
    Nil,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Map(OrdMap<String, Value>),
    Error(ErrorValue),
}

impl Value {
    /// Builds an error value from any standard error.
    pub fn error<E: std::error::Error + ?Sized>(error: &E) -> Self {
        Value::Error(ErrorValue::from_error(error))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Str(_) => "Str",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Error(_) => "Error",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Returns true if this is the zero value of its own type.
    ///
    /// Absence counts as zero; an error never does.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Nil => true,
            Value::Bool(b) => !*b,
            Value::Int(n) => *n == 0,
            Value::Float(x) => *x == 0.0,
            Value::Str(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            Value::Error(_) => false,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Deep structural equality. Floats compare NaN-equal so that every value
    /// equals itself.
    pub fn structural_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.structural_eq(y))
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| v.structural_eq(w)))
            }
            (Value::Error(a), Value::Error(b)) => a == b,
            _ => false,
        }
    }

    /// Multi-line rendering used for diffs.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.write_pretty(&mut out, 0);
        out
    }

    pub(crate) fn write_pretty(&self, out: &mut String, indent: usize) {
        match self {
            Value::List(items) if !items.is_empty() => {
                out.push_str("[\n");
                for item in items {
                    push_indent(out, indent + 1);
                    item.write_pretty(out, indent + 1);
                    out.push_str(",\n");
                }
                push_indent(out, indent);
                out.push(']');
            }
            Value::Map(map) if !map.is_empty() => {
                out.push_str("{\n");
                for (k, v) in map.iter() {
                    push_indent(out, indent + 1);
                    out.push_str(&format!("{:?}: ", k));
                    v.write_pretty(out, indent + 1);
                    out.push_str(",\n");
                }
                push_indent(out, indent);
                out.push('}');
            }
            other => out.push_str(&other.to_string()),
        }
    }
}

pub(crate) fn push_indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("    ");
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.structural_eq(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                write!(f, "}}")
            }
            Value::Error(e) => write!(f, "{}({:?})", e.type_name(), e.message()),
        }
    }
}

// ============================================================================
// CONVERSIONS INTO VALUES
// ============================================================================

/// Conversion of a Rust value into a [`Value`].
///
/// Implemented for the primitive types, strings, vectors, maps, `Option`
/// (where `None` becomes `Nil`) and `Result` (where `Err` becomes an error
/// value).
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

macro_rules! int_into_value {
    ($($t:ty),*) => {
        $(impl IntoValue for $t {
            fn into_value(self) -> Value {
                Value::Int(self as i64)
            }
        })*
    };
}

int_into_value!(i8, i16, i32, i64, isize, u8, u16, u32);

macro_rules! wide_int_into_value {
    ($($t:ty),*) => {
        $(impl IntoValue for $t {
            fn into_value(self) -> Value {
                i64::try_from(self)
                    .map(Value::Int)
                    .unwrap_or(Value::Float(self as f64))
            }
        })*
    };
}

wide_int_into_value!(u64, usize);

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        Value::Float(self as f64)
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl IntoValue for char {
    fn into_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Str(self.to_string())
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Str(self)
    }
}

impl IntoValue for &String {
    fn into_value(self) -> Value {
        Value::Str(self.clone())
    }
}

impl IntoValue for ErrorValue {
    fn into_value(self) -> Value {
        Value::Error(self)
    }
}

impl IntoValue for Box<dyn std::error::Error + Send + Sync> {
    fn into_value(self) -> Value {
        Value::Error(ErrorValue::from_error(self.as_ref()))
    }
}

impl<T: IntoValue> IntoValue for Vec<T> {
    fn into_value(self) -> Value {
        Value::List(self.into_iter().map(IntoValue::into_value).collect())
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Nil,
        }
    }
}

/// `Err` always becomes an error value, whatever the error type: a
/// `std::error::Error`, a `Box<dyn Error>` or a bare message.
impl<T: IntoValue, E: fmt::Display> IntoValue for Result<T, E> {
    fn into_value(self) -> Value {
        match self {
            Ok(v) => v.into_value(),
            Err(e) => Value::Error(ErrorValue::from_display(&e)),
        }
    }
}

impl<T: IntoValue + Clone> IntoValue for OrdMap<String, T> {
    fn into_value(self) -> Value {
        Value::Map(self.into_iter().map(|(k, v)| (k, v.into_value())).collect())
    }
}

impl<T: IntoValue> IntoValue for BTreeMap<String, T> {
    fn into_value(self) -> Value {
        Value::Map(self.into_iter().map(|(k, v)| (k, v.into_value())).collect())
    }
}

impl<T: IntoValue, S> IntoValue for HashMap<String, T, S> {
    fn into_value(self) -> Value {
        Value::Map(self.into_iter().map(|(k, v)| (k, v.into_value())).collect())
    }
}

// ============================================================================
// CONVERSIONS FROM VALUES
// ============================================================================

/// Extraction of a typed Rust value from a [`Value`], plus the parameter type
/// the binder checks inputs against.
pub trait FromValue: Sized {
    fn value_type() -> ValueType;

    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for Value {
    fn value_type() -> ValueType {
        ValueType::Dynamic
    }

    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl FromValue for bool {
    fn value_type() -> ValueType {
        ValueType::Bool
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

macro_rules! int_from_value {
    ($($t:ty),*) => {
        $(impl FromValue for $t {
            fn value_type() -> ValueType {
                ValueType::Int
            }

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::Int(n) => <$t>::try_from(n).ok(),
                    _ => None,
                }
            }
        })*
    };
}

int_from_value!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn value_type() -> ValueType {
        ValueType::Float
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(x),
            Value::Int(n) => Some(n as f64),
            _ => None,
        }
    }
}

impl FromValue for f32 {
    fn value_type() -> ValueType {
        ValueType::Float
    }

    fn from_value(value: Value) -> Option<Self> {
        f64::from_value(value).map(|x| x as f32)
    }
}

impl FromValue for String {
    fn value_type() -> ValueType {
        ValueType::Str
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl FromValue for char {
    fn value_type() -> ValueType {
        ValueType::Str
    }

    fn from_value(value: Value) -> Option<Self> {
        let s = String::from_value(value)?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }
}

impl FromValue for ErrorValue {
    fn value_type() -> ValueType {
        ValueType::Error
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Error(e) => Some(e),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn value_type() -> ValueType {
        ValueType::List(Box::new(T::value_type()))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn value_type() -> ValueType {
        ValueType::Optional(Box::new(T::value_type()))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Nil => Some(None),
            v => T::from_value(v).map(Some),
        }
    }
}

impl<T: FromValue + Clone> FromValue for OrdMap<String, T> {
    fn value_type() -> ValueType {
        ValueType::Map(Box::new(T::value_type()))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Map(map) => map
                .into_iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn value_type() -> ValueType {
        ValueType::Map(Box::new(T::value_type()))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Map(map) => map
                .into_iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
            _ => None,
        }
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn value_type() -> ValueType {
        ValueType::Map(Box::new(T::value_type()))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Map(map) => map
                .into_iter()
                .map(|(k, v)| T::from_value(v).map(|v| (k, v)))
                .collect(),
            _ => None,
        }
    }
}
