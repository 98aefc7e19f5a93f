//! # Units
//!
//! A [`Unit`] is an ordered list of cases and steps for one or more functions,
//! built fluently and then run exactly once as a test and at most once as a
//! benchmark.
//!
//! ```rust
//! use ezcase::{input, output, Placeholder};
//!
//! fn div(x: i64, y: i64) -> i64 {
//!     x / y
//! }
//!
//! ezcase::test(div)
//!     .case(input![6, 3], output![2])
//!     .input(input![1, 2]).output(output![Placeholder::Zero])
//!     .input(input![1, 0]).panics()
//!     .run();
//! ```
//!
//! ## Lifecycle
//!
//! - Cases bind to the function current when they are registered; `func`
//!   may be called again to switch functions mid-unit.
//! - Steps run in order between cases and are never timed.
//! - A case registered before any function is a usage error, reported when
//!   the unit runs and before any case executes.
//! - Binding errors stop the unit; mismatches and panics do not.

use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::callable::{Callable, IntoCallable, IntoVariadic};
use crate::case::{Case, Expectation, Verdict};
use crate::config::Config;
use crate::error::{BindError, EngineError, RunMode};
use crate::invoker;
use crate::location::{Location, PathStyle};
use crate::placeholder::{IntoPattern, Pattern};
use crate::report::{render_failure, Summary};
use crate::tuple::Input;

// ============================================================================
// RUNNERS
// ============================================================================

enum Runner {
    Case { index: usize, case: Case },
    Step(Box<dyn FnMut()>),
    /// A case registered while no function was set.
    Orphan {
        index: usize,
        location: Option<Location>,
    },
}

// ============================================================================
// UNIT
// ============================================================================

/// An ordered sequence of cases and steps with a one-shot lifecycle.
#[must_use = "a unit does nothing until it is run"]
pub struct Unit {
    callable: Option<Rc<dyn Callable>>,
    runners: Vec<Runner>,
    cases: usize,
    config: Config,
    tested: bool,
    benched: bool,
}

/// Starts a unit for a fixed-arity function.
pub fn test<F, M>(f: F) -> Unit
where
    F: IntoCallable<M>,
{
    Unit::new().func(f)
}

/// Starts a unit for a function whose last parameter collects the remaining
/// inputs.
pub fn test_variadic<F, M>(f: F) -> Unit
where
    F: IntoVariadic<M>,
{
    Unit::new().variadic(f)
}

impl Default for Unit {
    fn default() -> Self {
        Self::new()
    }
}

impl Unit {
    /// An empty unit configured from the environment.
    pub fn new() -> Self {
        Self::with_config(Config::from_env())
    }

    pub fn with_config(config: Config) -> Self {
        Self {
            callable: None,
            runners: Vec::new(),
            cases: 0,
            config,
            tested: false,
            benched: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Sets the function subsequent cases bind to.
    pub fn func<F, M>(mut self, f: F) -> Self
    where
        F: IntoCallable<M>,
    {
        self.callable = Some(f.into_callable());
        self
    }

    /// Sets a variadic function for subsequent cases.
    pub fn variadic<F, M>(mut self, f: F) -> Self
    where
        F: IntoVariadic<M>,
    {
        self.callable = Some(f.into_variadic());
        self
    }

    /// Applies a helper to the builder, e.g. to share a block of cases
    /// between units.
    pub fn thru(self, f: impl FnOnce(Self) -> Self) -> Self {
        f(self)
    }

    /// Adds code to run at this point of the sequence.
    pub fn step(mut self, f: impl FnMut() + 'static) -> Self {
        self.runners.push(Runner::Step(Box::new(f)));
        self
    }

    /// Adds a case expecting `output`.
    #[track_caller]
    pub fn case(self, input: Input, output: Vec<Pattern>) -> Self {
        let expectation = Expectation::output(output).at(Location::caller());
        self.push_case(input, expectation)
    }

    /// Adds one case per pair, in iteration order.
    pub fn cases(self, cases: impl IntoIterator<Item = (Input, Expectation)>) -> Self {
        cases
            .into_iter()
            .fold(self, |unit, (input, expectation)| unit.push_case(input, expectation))
    }

    /// Starts a case; finish it with [`Half::output`], [`Half::panics`] or
    /// [`Half::panics_with`].
    pub fn input(self, input: Input) -> Half {
        Half { unit: self, input }
    }

    fn push_case(mut self, input: Input, expectation: Expectation) -> Self {
        let index = self.cases;
        self.cases += 1;
        let runner = match &self.callable {
            Some(callable) => Runner::Case {
                index,
                case: Case::new(Rc::clone(callable), input, expectation),
            },
            None => Runner::Orphan {
                index,
                location: input.location.or_else(|| expectation.location().cloned()),
            },
        };
        self.runners.push(runner);
        self
    }

    fn check_usage(&self) -> Result<(), EngineError> {
        self.runners.iter().try_for_each(|runner| match runner {
            Runner::Orphan { index, location } => {
                tracing::error!(
                    index,
                    location = %location.clone().unwrap_or_else(Location::unknown),
                    "case has no function"
                );
                Err(EngineError::NoFunction { index: *index })
            }
            _ => Ok(()),
        })
    }

    // ------------------------------------------------------------------------
    // Driving
    // ------------------------------------------------------------------------

    /// Runs every case and step once, in order.
    ///
    /// Returns one verdict per case. Fails on a second call, on a case without
    /// a function (before anything runs) and on the first binding error.
    pub fn run_test(&mut self) -> Result<Vec<Verdict>, EngineError> {
        if self.tested {
            return Err(EngineError::AlreadyRan {
                mode: RunMode::Test,
            });
        }
        self.tested = true;
        self.check_usage()?;

        let style = self.config.path_style;
        let mut verdicts = Vec::with_capacity(self.cases);
        for runner in self.runners.iter_mut() {
            match runner {
                Runner::Step(f) => f(),
                Runner::Case { index, case } => match case.run() {
                    Ok(verdict) => verdicts.push(verdict),
                    Err(source) => return Err(bind_error(style, *index, case, source)),
                },
                Runner::Orphan { .. } => {}
            }
        }
        let summary = Summary::from_verdicts(&verdicts);
        tracing::debug!(passed = summary.passed, failed = summary.failed, "unit ran");
        Ok(verdicts)
    }

    /// Replays the whole sequence `iterations` times and returns the time
    /// spent inside the functions under test.
    ///
    /// Binding and steps run outside the measured region. Panics are caught
    /// silently, without backtraces, and otherwise ignored.
    pub fn run_benchmark(&mut self, iterations: usize) -> Result<Duration, EngineError> {
        if self.benched {
            return Err(EngineError::AlreadyRan {
                mode: RunMode::Benchmark,
            });
        }
        self.benched = true;
        self.check_usage()?;

        let style = self.config.path_style;
        let mut elapsed = Duration::ZERO;
        for _ in 0..iterations {
            for runner in self.runners.iter_mut() {
                match runner {
                    Runner::Step(f) => f(),
                    Runner::Case { index, case } => {
                        let call = match case.prepare() {
                            Ok(call) => call,
                            Err(source) => return Err(bind_error(style, *index, case, source)),
                        };
                        let start = Instant::now();
                        let outcome = invoker::invoke_quiet(call);
                        elapsed += start.elapsed();
                        std::hint::black_box(outcome);
                    }
                    Runner::Orphan { .. } => {}
                }
            }
        }
        tracing::debug!(iterations, ?elapsed, "benchmark ran");
        Ok(elapsed)
    }

    /// Runs the unit as a test and panics with a rendering of every failure.
    ///
    /// Intended as the last call inside a `#[test]` function.
    #[track_caller]
    pub fn run(mut self) {
        let verdicts = match self.run_test() {
            Ok(verdicts) => verdicts,
            Err(err) => panic!("{:?}", miette::Report::new(err)),
        };
        let rendered: Vec<String> = verdicts
            .iter()
            .filter_map(Verdict::failure)
            .map(|failure| render_failure(failure, &self.config))
            .collect();
        if !rendered.is_empty() {
            let summary = Summary::from_verdicts(&verdicts);
            panic!(
                "{} of {} case(s) failed\n\n{}",
                summary.failed,
                summary.total(),
                rendered.join("\n")
            );
        }
    }
}

fn bind_error(style: PathStyle, index: usize, case: &Case, source: BindError) -> EngineError {
    let location = case
        .input()
        .location
        .as_ref()
        .or(case.expectation().location())
        .cloned()
        .unwrap_or_else(Location::unknown);
    EngineError::Bind {
        index,
        location: location.render(style),
        source,
    }
}

impl Drop for Unit {
    fn drop(&mut self) {
        if !self.tested && !self.benched && !std::thread::panicking() {
            tracing::warn!(cases = self.cases, "neither test nor benchmark ran");
        }
    }
}

/// A case with its input set and its expectation pending.
#[must_use = "finish the case with output, panics or panics_with"]
pub struct Half {
    unit: Unit,
    input: Input,
}

impl Half {
    #[track_caller]
    pub fn output(self, output: Vec<Pattern>) -> Unit {
        let expectation = Expectation::output(output).at(Location::caller());
        self.unit.push_case(self.input, expectation)
    }

    /// Expects the call to panic, with any payload.
    #[track_caller]
    pub fn panics(self) -> Unit {
        self.unit.push_case(self.input, Expectation::panic())
    }

    /// Expects the call to panic with a payload matching `pattern`.
    #[track_caller]
    pub fn panics_with(self, pattern: impl IntoPattern) -> Unit {
        self.unit.push_case(self.input, Expectation::panic_with(pattern))
    }
}
