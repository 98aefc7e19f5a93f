//! # ezcase
//!
//! Declarative, table-driven test and benchmark cases.
//!
//! A case pairs a function with an input tuple and either an expected output
//! tuple or an expected panic. Inputs are loosely typed [`Value`]s that are
//! bound to the function's parameters at run time; outputs are compared with a
//! structural rule extended by four [`Placeholder`]s (`Any`, `Nil`, `Zero`,
//! `Error`).
//!
//! ```rust
//! use ezcase::{input, output, Placeholder};
//!
//! fn parse(s: String) -> Result<i64, std::num::ParseIntError> {
//!     s.parse()
//! }
//!
//! ezcase::test(parse)
//!     .case(input!["42"], output![42])
//!     .case(input!["x"], output![Placeholder::Error])
//!     .run();
//! ```
//!
//! ## Modules
//!
//! - [`value`], [`tuple`]: the dynamic value model and value sequences.
//! - [`placeholder`]: sentinels and the placeholder-aware equality rule.
//! - [`callable`], [`binder`], [`invoker`]: adapting, binding and calling
//!   functions under test.
//! - [`case`], [`unit`]: single cases and ordered sequences of them.
//! - [`report`], [`config`], [`location`]: presentation of failures.
//! - [`error`]: usage and binding errors.

pub use crate::callable::{Callable, IntoCallable, IntoVariadic, Signature};
pub use crate::case::{Case, Expectation, Failure, FailureKind, Verdict};
pub use crate::config::Config;
pub use crate::error::{BindError, EngineError, RunMode};
pub use crate::invoker::Outcome;
pub use crate::location::{Location, PathStyle};
pub use crate::placeholder::{IntoPattern, Pattern, Placeholder};
pub use crate::report::{DiffFn, Summary};
pub use crate::tuple::{Input, IntoTuple, Tuple};
pub use crate::unit::{test, test_variadic, Half, Unit};
pub use crate::value::{ErrorValue, FromValue, IntoValue, Value, ValueType};

pub mod binder;
pub mod callable;
pub mod case;
pub mod config;
pub mod error;
pub mod invoker;
pub mod location;
pub mod placeholder;
pub mod report;
pub mod tuple;
pub mod unit;
pub mod value;

/// Builds an [`Input`] from values, recording the file and line it was
/// written at.
///
/// ```rust
/// let input = ezcase::input![1, "two", None::<i64>];
/// assert_eq!(input.tuple.to_string(), "(1, \"two\", nil)");
/// assert!(input.location.is_some());
/// ```
#[macro_export]
macro_rules! input {
    ($($x:expr),* $(,)?) => {
        $crate::Input::new(::std::vec![$($crate::IntoValue::into_value($x)),*])
            .at($crate::Location::new(file!(), line!()))
    };
}

/// Builds an expected output list from values and placeholders.
///
/// ```rust
/// use ezcase::{output, Pattern, Placeholder, Value};
/// let out = output![1, Placeholder::Nil];
/// assert_eq!(out[0], Pattern::Exact(Value::Int(1)));
/// assert_eq!(out[1], Pattern::Placeholder(Placeholder::Nil));
/// ```
#[macro_export]
macro_rules! output {
    ($($x:expr),* $(,)?) => {{
        let patterns: ::std::vec::Vec<$crate::Pattern> =
            ::std::vec![$($crate::IntoPattern::into_pattern($x)),*];
        patterns
    }};
}
