//! End-to-end runs of units built through the public API.

mod common;

use common::unit;
use ezcase::{input, output, EngineError, ErrorValue, FailureKind, Placeholder, RunMode, Value};
use predicates::prelude::*;
use std::collections::HashMap;

fn add(x: i64, y: i64) -> i64 {
    x + y
}

fn div(x: i64, y: i64) -> i64 {
    if y == 0 {
        panic!("division by zero");
    }
    x / y
}

fn lookup(key: String) -> (String, Option<ErrorValue>) {
    let table: HashMap<&str, &str> = [("a", "alpha"), ("b", "beta")].into_iter().collect();
    match table.get(key.as_str()) {
        Some(v) => (v.to_string(), None),
        None => (String::new(), Some(ErrorValue::new(format!("no key {key:?}")))),
    }
}

fn identity(x: Value) -> Value {
    x
}

#[test]
fn add_passes_on_matching_output() {
    let verdicts = unit()
        .func(add)
        .case(input![2, 3], output![5])
        .run_test()
        .unwrap();
    assert!(verdicts[0].is_pass());
}

#[test]
fn div_by_zero_passes_when_any_panic_is_expected() {
    let mut unit = unit().func(div).input(input![4, 0]).panics();
    assert!(unit.run_test().unwrap()[0].is_pass());
}

#[test]
fn missing_key_matches_zero_and_error() {
    let mut unit = unit()
        .func(lookup)
        .case(input!["zzz"], output![Placeholder::Zero, Placeholder::Error])
        .case(input!["a"], output!["alpha", Placeholder::Nil]);
    let verdicts = unit.run_test().unwrap();
    assert!(verdicts.iter().all(|v| v.is_pass()), "{verdicts:?}");
}

#[test]
fn identity_of_absent_value_is_nil() {
    let mut unit = unit()
        .func(identity)
        .case(input![Value::Nil], output![Placeholder::Nil])
        .case(input![0], output![Placeholder::Nil]);
    let verdicts = unit.run_test().unwrap();
    assert!(verdicts[0].is_pass());
    assert!(!verdicts[1].is_pass());
}

#[test]
fn second_test_run_fails_fast() {
    let mut unit = unit().func(add).case(input![1, 1], output![2]);
    unit.run_test().unwrap();
    let err = unit.run_test().unwrap_err();
    assert!(matches!(err, EngineError::AlreadyRan { mode: RunMode::Test }));
    assert_eq!(err.to_string(), "test already ran");
}

#[test]
fn variadic_functions_take_any_number_of_trailing_inputs() {
    fn sum(label: String, xs: Vec<i64>) -> String {
        format!("{label}={}", xs.iter().sum::<i64>())
    }
    let mut unit = ezcase::Unit::with_config(common::plain())
        .variadic(sum)
        .case(input!["n"], output!["n=0"])
        .case(input!["n", 1], output!["n=1"])
        .case(input!["n", 1, 2, 3, 4, 5, 6, 7, 8], output!["n=36"]);
    assert!(unit.run_test().unwrap().iter().all(|v| v.is_pass()));
}

#[test]
fn result_returns_bind_to_single_values() {
    fn parse(s: String) -> Result<i64, std::num::ParseIntError> {
        s.parse()
    }
    let mut unit = unit()
        .func(parse)
        .case(input!["12"], output![12])
        .case(input!["twelve"], output![Placeholder::Error]);
    assert!(unit.run_test().unwrap().iter().all(|v| v.is_pass()));
}

#[test]
fn boxed_error_results_match_the_error_placeholder() {
    fn parse(s: String) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(s.trim().parse::<i64>()?)
    }
    let verdicts = unit()
        .func(parse)
        .case(input!["12"], output![12])
        .case(input!["twelve"], output![Placeholder::Error])
        .run_test()
        .unwrap();
    assert_eq!(verdicts.len(), 2);
    assert!(verdicts.iter().all(|v| v.is_pass()));
}

#[test]
fn unexpected_panic_is_reported_not_propagated() {
    let verdicts = unit()
        .func(div)
        .case(input![1, 0], output![Placeholder::Any])
        .run_test()
        .unwrap();
    let failure = verdicts[0].failure().unwrap();
    assert_eq!(failure.kind, FailureKind::UnexpectedPanic);
    assert!(predicate::str::contains("division by zero").eval(&failure.actual));
}

#[test]
fn unexpected_panic_does_not_stop_later_cases() {
    let verdicts = unit()
        .func(div)
        .case(input![1, 0], output![1])
        .case(input![4, 2], output![2])
        .run_test()
        .unwrap();
    assert_eq!(verdicts.len(), 2);
    assert_eq!(verdicts[0].failure().unwrap().kind, FailureKind::UnexpectedPanic);
    assert!(verdicts[1].is_pass());
}

#[test]
fn error_payload_panics_match_the_error_placeholder() {
    fn open(name: String) -> i64 {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, format!("no file {name}"));
        std::panic::panic_any(err)
    }
    fn fail(msg: String) -> i64 {
        let err: Box<dyn std::error::Error + Send + Sync> = msg.into();
        std::panic::panic_any(err)
    }
    let io = unit()
        .func(open)
        .input(input!["a.txt"])
        .panics_with(Placeholder::Error)
        .run_test()
        .unwrap();
    assert!(io[0].is_pass());
    let boxed = unit()
        .func(fail)
        .input(input!["bad"])
        .panics_with(Placeholder::Error)
        .run_test()
        .unwrap();
    assert!(boxed[0].is_pass());
}

#[test]
fn panics_with_checks_the_payload() {
    let verdicts = unit()
        .func(div)
        .input(input![1, 0])
        .panics_with("division by zero")
        .input(input![1, 0])
        .panics_with("overflow")
        .run_test()
        .unwrap();
    assert!(verdicts[0].is_pass());
    assert_eq!(verdicts[1].failure().unwrap().kind, FailureKind::WrongPanic);
}

#[test]
fn wrong_argument_type_stops_the_unit() {
    let err = unit()
        .func(add)
        .case(input!["two", 3], output![5])
        .case(input![1, 1], output![2])
        .run_test()
        .unwrap_err();
    match err {
        EngineError::Bind { index, location, .. } => {
            assert_eq!(index, 0);
            assert!(predicate::str::starts_with("scenario_tests.rs:").eval(&location));
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn thru_applies_shared_case_blocks() {
    fn commutative(unit: ezcase::Unit) -> ezcase::Unit {
        unit.case(input![1, 2], output![3]).case(input![2, 1], output![3])
    }
    let verdicts = unit().func(add).thru(commutative).run_test().unwrap();
    assert_eq!(verdicts.len(), 2);
    assert!(verdicts.iter().all(|v| v.is_pass()));
}

#[test]
fn benchmark_replays_cases_and_refuses_a_second_run() {
    let mut unit = unit()
        .func(add)
        .case(input![1, 2], output![3])
        .input(input![1, 0])
        .panics();
    let elapsed = unit.run_benchmark(100).unwrap();
    assert!(elapsed > std::time::Duration::ZERO);
    assert!(matches!(
        unit.run_benchmark(1),
        Err(EngineError::AlreadyRan {
            mode: RunMode::Benchmark
        })
    ));
}

#[test]
fn benchmark_survives_cases_that_panic_unexpectedly() {
    let mut unit = unit()
        .func(div)
        .case(input![1, 0], output![1])
        .case(input![6, 3], output![2]);
    assert!(unit.run_benchmark(10).is_ok());
}

#[test]
fn run_renders_every_failure() {
    let result = std::panic::catch_unwind(|| {
        unit()
            .func(add)
            .case(input![2, 2], output![5])
            .case(input![1, 1], output![2])
            .case(input![0, 0], output![1])
            .run();
    });
    let payload = result.unwrap_err();
    let message = payload
        .downcast_ref::<String>()
        .cloned()
        .unwrap_or_default();
    let pred = predicate::str::contains("2 of 3 case(s) failed")
        .and(predicate::str::contains("want (\n    5,\n)"))
        .and(predicate::str::contains("have (\n    4,\n)"))
        .and(predicate::str::contains("scenario_tests.rs:"));
    assert!(pred.eval(&message), "{message}");
}

#[test]
fn run_reports_usage_errors() {
    let result = std::panic::catch_unwind(|| {
        ezcase::Unit::with_config(common::plain())
            .case(input![1], output![1])
            .run();
    });
    let payload = result.unwrap_err();
    let message = payload.downcast_ref::<String>().cloned().unwrap_or_default();
    assert!(message.contains("case #0 has no function"), "{message}");
}
