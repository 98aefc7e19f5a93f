//! Engine error taxonomy.
//!
//! Only usage and binding errors are errors. Behavioral mismatches (wrong
//! output, wrong panic, unexpected panic) are reported as
//! [`Verdict`](crate::case::Verdict)s instead, so that one failing case never
//! prevents the rest of a unit from running.

use miette::Diagnostic;
use thiserror::Error;

use crate::value::{Value, ValueType};

/// Which run mode a one-shot guard belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Test,
    Benchmark,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Test => write!(f, "test"),
            RunMode::Benchmark => write!(f, "benchmark"),
        }
    }
}

/// A malformed test case: the inputs cannot be bound to the function's
/// parameters.
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum BindError {
    #[error("{function}: expected {expected} argument(s), given {given}")]
    #[diagnostic(
        code(ezcase::bind::arity),
        help("pass exactly as many inputs as the function has parameters, or register it with `variadic`")
    )]
    Arity {
        function: String,
        expected: String,
        given: usize,
    },

    #[error("{function}: argument #{position} expects {expected}, found {found}")]
    #[diagnostic(
        code(ezcase::bind::invalid_argument),
        help("nil can only stand in for an Option or Value parameter")
    )]
    InvalidArgument {
        function: String,
        position: usize,
        expected: ValueType,
        found: String,
    },
}

impl BindError {
    pub(crate) fn invalid_argument(
        function: &str,
        position: usize,
        expected: &ValueType,
        found: &Value,
    ) -> Self {
        BindError::InvalidArgument {
            function: function.to_string(),
            position,
            expected: expected.clone(),
            found: format!("{} ({})", found, found.type_name()),
        }
    }
}

/// Errors that abort a unit: defects in the test code itself.
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error("case #{index} has no function")]
    #[diagnostic(
        code(ezcase::usage::no_function),
        help("call `func` or `variadic` before adding cases")
    )]
    NoFunction { index: usize },

    #[error("{mode} already ran")]
    #[diagnostic(
        code(ezcase::usage::already_ran),
        help("build a new unit for every run")
    )]
    AlreadyRan { mode: RunMode },

    #[error("case #{index} at {location} cannot be bound")]
    #[diagnostic(code(ezcase::bind))]
    Bind {
        index: usize,
        location: String,
        #[source]
        #[diagnostic_source]
        source: BindError,
    },
}
