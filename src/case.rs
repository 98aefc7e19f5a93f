//! A single case: one input, one expectation, one callable.
//!
//! Running a case walks `bind -> invoke -> compare` exactly once and yields a
//! [`Verdict`]. A binding failure is returned as an error instead, since it
//! means the case itself is malformed.

use serde::Serialize;
use std::fmt;
use std::rc::Rc;

use crate::binder;
use crate::callable::{Callable, PreparedCall};
use crate::error::BindError;
use crate::invoker::{self, Outcome};
use crate::location::Location;
use crate::placeholder::{pretty_patterns, render_patterns, tuple_matches, IntoPattern, Pattern, Placeholder};
use crate::tuple::Input;

// ============================================================================
// EXPECTATIONS
// ============================================================================

/// What a case expects: returned values or a panic, never both.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expectation {
    Output {
        patterns: Vec<Pattern>,
        location: Option<Location>,
    },
    Panic {
        pattern: Pattern,
        location: Option<Location>,
    },
}

impl Expectation {
    pub fn output(patterns: Vec<Pattern>) -> Self {
        Expectation::Output {
            patterns,
            location: None,
        }
    }

    /// Expects a panic with any payload.
    #[track_caller]
    pub fn panic() -> Self {
        Self::panic_with(Placeholder::Any)
    }

    /// Expects a panic whose payload matches `pattern`.
    #[track_caller]
    pub fn panic_with(pattern: impl IntoPattern) -> Self {
        Expectation::Panic {
            pattern: pattern.into_pattern(),
            location: Some(Location::caller()),
        }
    }

    pub fn at(self, location: Location) -> Self {
        match self {
            Expectation::Output { patterns, .. } => Expectation::Output {
                patterns,
                location: Some(location),
            },
            Expectation::Panic { pattern, .. } => Expectation::Panic {
                pattern,
                location: Some(location),
            },
        }
    }

    pub fn expects_panic(&self) -> bool {
        matches!(self, Expectation::Panic { .. })
    }

    pub fn location(&self) -> Option<&Location> {
        match self {
            Expectation::Output { location, .. } | Expectation::Panic { location, .. } => {
                location.as_ref()
            }
        }
    }

    fn pretty(&self) -> String {
        match self {
            Expectation::Output { patterns, .. } => pretty_patterns(patterns),
            Expectation::Panic { pattern, .. } => format!("panic({})", pattern.pretty()),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Output { patterns, .. } => write!(f, "{}", render_patterns(patterns)),
            Expectation::Panic { pattern, .. } => write!(f, "panic({})", pattern),
        }
    }
}

// ============================================================================
// VERDICTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// Returned values differ from the expected ones.
    Mismatch,
    /// Values were expected, the call panicked.
    UnexpectedPanic,
    /// A panic was expected, the call returned.
    MissingPanic,
    /// The call panicked with the wrong payload.
    WrongPanic,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Mismatch => "have values, want other values",
            FailureKind::UnexpectedPanic => "have panic, want values",
            FailureKind::MissingPanic => "have values, want panic",
            FailureKind::WrongPanic => "have panic, want other panic",
        };
        write!(f, "{}", s)
    }
}

/// Everything the presentation layer needs to explain a failed case.
#[derive(Debug, Clone, Serialize)]
pub struct Failure {
    pub kind: FailureKind,
    pub function: String,
    pub input: String,
    pub input_location: Option<Location>,
    pub expectation_location: Option<Location>,
    /// Structural rendering of what was expected.
    pub expected: String,
    /// Structural rendering of what happened.
    pub actual: String,
    /// Backtrace of an unexpected panic.
    pub backtrace: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub enum Verdict {
    Pass,
    Fail(Box<Failure>),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Verdict::Pass => None,
            Verdict::Fail(f) => Some(f),
        }
    }
}

// ============================================================================
// CASES
// ============================================================================

/// A callable bound to one input and one expectation.
#[derive(Clone)]
pub struct Case {
    callable: Rc<dyn Callable>,
    input: Input,
    expectation: Expectation,
}

impl fmt::Debug for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Case")
            .field("function", &self.callable.name())
            .field("input", &self.input)
            .field("expectation", &self.expectation)
            .finish()
    }
}

impl Case {
    pub fn new(callable: Rc<dyn Callable>, input: Input, expectation: Expectation) -> Self {
        Self {
            callable,
            input,
            expectation,
        }
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn expectation(&self) -> &Expectation {
        &self.expectation
    }

    pub fn function(&self) -> &str {
        self.callable.name()
    }

    /// Binds the inputs and converts them into the callable's parameter
    /// types, without calling it.
    pub fn prepare(&self) -> Result<PreparedCall<'_>, BindError> {
        let args = binder::bind(self.callable.signature(), &self.input.tuple)?;
        self.callable.prepare(args)
    }

    /// Runs the full cycle once.
    pub fn run(&self) -> Result<Verdict, BindError> {
        let call = self.prepare()?;
        let outcome = invoker::invoke(call, self.expectation.expects_panic());
        let verdict = self.judge(outcome);
        tracing::debug!(
            function = self.function(),
            input = %self.input.tuple,
            pass = verdict.is_pass(),
            "case ran"
        );
        Ok(verdict)
    }

    /// Compares an outcome against the expectation.
    pub fn judge(&self, outcome: Outcome) -> Verdict {
        match (&self.expectation, outcome) {
            (Expectation::Output { patterns, .. }, Outcome::Returned(actual)) => {
                if tuple_matches(patterns, Some(&actual)) {
                    Verdict::Pass
                } else {
                    self.fail(FailureKind::Mismatch, actual.pretty(), None)
                }
            }
            (Expectation::Output { .. }, Outcome::UnexpectedPanic(report)) => self.fail(
                FailureKind::UnexpectedPanic,
                format!("panic({})", report.payload.pretty()),
                Some(report.backtrace),
            ),
            (Expectation::Output { .. }, Outcome::Panicked { payload }) => self.fail(
                FailureKind::UnexpectedPanic,
                format!("panic({})", payload.pretty()),
                None,
            ),
            (Expectation::Panic { .. }, Outcome::Returned(actual)) => {
                self.fail(FailureKind::MissingPanic, actual.pretty(), None)
            }
            (Expectation::Panic { pattern, .. }, Outcome::Panicked { payload }) => {
                if pattern.matches(&payload) {
                    Verdict::Pass
                } else {
                    self.fail(FailureKind::WrongPanic, format!("panic({})", payload.pretty()), None)
                }
            }
            (Expectation::Panic { pattern, .. }, Outcome::UnexpectedPanic(report)) => {
                if pattern.matches(&report.payload) {
                    Verdict::Pass
                } else {
                    self.fail(
                        FailureKind::WrongPanic,
                        format!("panic({})", report.payload.pretty()),
                        Some(report.backtrace),
                    )
                }
            }
        }
    }

    fn fail(&self, kind: FailureKind, actual: String, backtrace: Option<String>) -> Verdict {
        Verdict::Fail(Box::new(Failure {
            kind,
            function: self.function().to_string(),
            input: self.input.tuple.to_string(),
            input_location: self.input.location.clone(),
            expectation_location: self.expectation.location().cloned(),
            expected: self.expectation.pretty(),
            actual,
            backtrace,
        }))
    }
}
