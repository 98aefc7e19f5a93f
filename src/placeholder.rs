//! Placeholders and the placeholder-aware equality rule.
//!
//! An expected output position is a [`Pattern`]: either an exact [`Value`] or
//! one of the four [`Placeholder`]s. Placeholders let a case say "don't care",
//! "must be absent", "must be the default" or "must be some error" without
//! overspecifying incidental values such as error message text.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::tuple::Tuple;
use crate::value::{IntoValue, Value};

/// The four sentinel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placeholder {
    /// Matches everything.
    Any,
    /// Matches only an absent value.
    Nil,
    /// Matches the zero value of the actual's own type.
    Zero,
    /// Matches any error value, regardless of its message.
    Error,
}

impl Placeholder {
    pub fn matches(&self, actual: &Value) -> bool {
        match self {
            Placeholder::Any => true,
            Placeholder::Nil => actual.is_nil(),
            Placeholder::Zero => actual.is_zero(),
            Placeholder::Error => actual.is_error(),
        }
    }
}

impl fmt::Display for Placeholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placeholder::Any => write!(f, "<any>"),
            Placeholder::Nil => write!(f, "<nil>"),
            Placeholder::Zero => write!(f, "<zero>"),
            Placeholder::Error => write!(f, "<error>"),
        }
    }
}

/// One expected position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    Exact(Value),
    Placeholder(Placeholder),
}

impl Pattern {
    fn is_nil_like(&self) -> bool {
        matches!(
            self,
            Pattern::Placeholder(Placeholder::Nil) | Pattern::Exact(Value::Nil)
        )
    }

    fn is_error_like(&self) -> bool {
        matches!(
            self,
            Pattern::Placeholder(Placeholder::Error) | Pattern::Exact(Value::Error(_))
        )
    }

    /// Matches a single element.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use ezcase::placeholder::{Pattern, Placeholder};
    /// use ezcase::value::Value;
    /// let zero = Pattern::Placeholder(Placeholder::Zero);
    /// assert!(zero.matches(&Value::Str(String::new())));
    /// assert!(!zero.matches(&Value::Int(1)));
    /// ```
    pub fn matches(&self, actual: &Value) -> bool {
        if let Pattern::Placeholder(Placeholder::Any) = self {
            return true;
        }
        if self.is_nil_like() && actual.is_nil() {
            return true;
        }
        if let Pattern::Placeholder(Placeholder::Zero) = self {
            return actual.is_zero();
        }
        if self.is_error_like() && actual.is_error() {
            return true;
        }
        match self {
            Pattern::Exact(expected) => expected.structural_eq(actual),
            Pattern::Placeholder(_) => false,
        }
    }

    pub fn pretty(&self) -> String {
        match self {
            Pattern::Exact(v) => v.pretty(),
            Pattern::Placeholder(p) => p.to_string(),
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Exact(v) => write!(f, "{}", v),
            Pattern::Placeholder(p) => write!(f, "{}", p),
        }
    }
}

/// Conversion into an expected position. Values convert to exact patterns.
pub trait IntoPattern {
    fn into_pattern(self) -> Pattern;
}

impl IntoPattern for Pattern {
    fn into_pattern(self) -> Pattern {
        self
    }
}

impl IntoPattern for Placeholder {
    fn into_pattern(self) -> Pattern {
        Pattern::Placeholder(self)
    }
}

impl<T: IntoValue> IntoPattern for T {
    fn into_pattern(self) -> Pattern {
        Pattern::Exact(self.into_value())
    }
}

/// Matches an expected pattern list against an actual tuple.
///
/// An absent tuple never matches. Lengths must agree, then every position must
/// match under [`Pattern::matches`].
pub fn tuple_matches(expected: &[Pattern], actual: Option<&Tuple>) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    expected.len() == actual.len()
        && expected
            .iter()
            .zip(actual.iter())
            .all(|(want, have)| want.matches(have))
}

/// Renders a pattern list the way a tuple is rendered.
pub fn render_patterns(patterns: &[Pattern]) -> String {
    let items: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
    format!("({})", items.join(", "))
}

/// Multi-line rendering of a pattern list for diffs.
pub fn pretty_patterns(patterns: &[Pattern]) -> String {
    crate::tuple::pretty_items(patterns.iter().map(Pattern::pretty))
}
