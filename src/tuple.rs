//! Ordered, heterogeneous value sequences.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::location::Location;
use crate::value::{ErrorValue, IntoValue, Value};

/// An immutable, ordered sequence of values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tuple {
    xs: Vec<Value>,
}

impl Tuple {
    pub fn new(xs: Vec<Value>) -> Self {
        Self { xs }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Value> {
        self.xs.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.xs.iter()
    }

    pub fn values(&self) -> &[Value] {
        &self.xs
    }

    pub fn into_values(self) -> Vec<Value> {
        self.xs
    }

    /// Multi-line rendering used for diffs.
    pub fn pretty(&self) -> String {
        pretty_items(self.xs.iter().map(Value::pretty))
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, x) in self.xs.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", x)?;
        }
        write!(f, ")")
    }
}

impl From<Vec<Value>> for Tuple {
    fn from(xs: Vec<Value>) -> Self {
        Self::new(xs)
    }
}

impl FromIterator<Value> for Tuple {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Lays out already-rendered items one per line, indenting nested lines.
pub(crate) fn pretty_items(items: impl Iterator<Item = String>) -> String {
    let items: Vec<String> = items.collect();
    if items.is_empty() {
        return "()".to_string();
    }
    let mut out = String::from("(\n");
    for item in items {
        for (i, line) in item.lines().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str("    ");
            out.push_str(line);
        }
        out.push_str(",\n");
    }
    out.push(')');
    out
}

/// A tuple of call inputs plus where it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub tuple: Tuple,
    pub location: Option<Location>,
}

impl Input {
    pub fn new(xs: Vec<Value>) -> Self {
        Self {
            tuple: Tuple::new(xs),
            location: None,
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

// ============================================================================
// RETURN VALUES INTO TUPLES
// ============================================================================

/// Conversion of a function's return value into the tuple of returned values.
///
/// `()` returns nothing, a single value returns a one-element tuple, and Rust
/// tuples spread into one element per field. `Result<(), E>` returns one
/// element: `Nil` on success or the error.
pub trait IntoTuple {
    fn into_tuple(self) -> Tuple;
}

impl IntoTuple for () {
    fn into_tuple(self) -> Tuple {
        Tuple::empty()
    }
}

impl<E: std::fmt::Display> IntoTuple for Result<(), E> {
    fn into_tuple(self) -> Tuple {
        match self {
            Ok(()) => Tuple::new(vec![Value::Nil]),
            Err(e) => Tuple::new(vec![Value::Error(ErrorValue::from_display(&e))]),
        }
    }
}

impl<T: IntoValue> IntoTuple for T {
    fn into_tuple(self) -> Tuple {
        Tuple::new(vec![self.into_value()])
    }
}

macro_rules! tuple_into_tuple {
    ($($name:ident),+) => {
        impl<$($name: IntoValue),+> IntoTuple for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_tuple(self) -> Tuple {
                let ($($name,)+) = self;
                Tuple::new(vec![$($name.into_value()),+])
            }
        }
    };
}

tuple_into_tuple!(A);
tuple_into_tuple!(A, B);
tuple_into_tuple!(A, B, C);
tuple_into_tuple!(A, B, C, D);
tuple_into_tuple!(A, B, C, D, E);
tuple_into_tuple!(A, B, C, D, E, F);
