//! Matching and binding properties checked over a spread of sample values.

mod common;

use common::samples;
use ezcase::binder::bind;
use ezcase::placeholder::tuple_matches;
use ezcase::{
    BindError, Case, Expectation, FailureKind, Input, IntoCallable, IntoPattern, Pattern,
    Placeholder, Signature, Tuple, Value, ValueType,
};

fn exact(values: &[Value]) -> Vec<Pattern> {
    values.iter().cloned().map(Pattern::Exact).collect()
}

#[test]
fn structural_equality_is_reflexive() {
    let all = samples();
    for v in &all {
        let t = Tuple::new(vec![v.clone()]);
        assert!(tuple_matches(&exact(t.values()), Some(&t)), "{v}");
    }
    let whole = Tuple::new(all.clone());
    assert!(tuple_matches(&exact(&all), Some(&whole)));
}

#[test]
fn length_mismatch_never_matches() {
    let all = samples();
    for n in 0..all.len() {
        for m in 0..all.len() {
            if n == m {
                continue;
            }
            let actual = Tuple::new(all[..m].to_vec());
            let anys = vec![Placeholder::Any.into_pattern(); n];
            assert!(!tuple_matches(&anys, Some(&actual)), "{n} vs {m}");
            assert!(!tuple_matches(&exact(&all[..n]), Some(&actual)));
        }
    }
}

#[test]
fn absent_tuple_never_matches() {
    assert!(!tuple_matches(&[], None));
    assert!(!tuple_matches(&[Placeholder::Any.into_pattern()], None));
}

#[test]
fn any_matches_every_position() {
    let all = samples();
    for (i, _) in all.iter().enumerate() {
        let mut expected = exact(&all);
        expected[i] = Placeholder::Any.into_pattern();
        assert!(tuple_matches(&expected, Some(&Tuple::new(all.clone()))));
    }
}

#[test]
fn nil_zero_and_error_placeholders() {
    let nil = Placeholder::Nil.into_pattern();
    let zero = Placeholder::Zero.into_pattern();
    let error = Placeholder::Error.into_pattern();
    for v in samples() {
        assert_eq!(nil.matches(&v), v.is_nil(), "nil vs {v}");
        assert_eq!(zero.matches(&v), v.is_zero(), "zero vs {v}");
        assert_eq!(error.matches(&v), v.is_error(), "error vs {v}");
    }
    assert!(zero.matches(&Value::Str(String::new())));
    assert!(!zero.matches(&Value::Str("x".into())));
    assert!(!nil.matches(&Value::Int(3)));
}

#[test]
fn fixed_arity_rejects_any_extra_input() {
    let sig = Signature::fixed("f", vec![ValueType::Dynamic, ValueType::Dynamic]);
    for extra in 1..10 {
        let input: Tuple = (0..2 + extra).map(Value::Int).collect();
        assert!(matches!(bind(&sig, &input), Err(BindError::Arity { .. })));
    }
}

#[test]
fn variadic_never_fails_on_count_past_prefix() {
    let sig = Signature::variadic("f", vec![ValueType::Int], ValueType::Dynamic);
    for extra in 0..32 {
        let mut xs = vec![Value::Int(1)];
        xs.extend(samples().into_iter().cycle().take(extra));
        assert!(bind(&sig, &Tuple::new(xs)).is_ok(), "{extra} extra inputs");
    }
}

#[test]
fn any_panic_passes_whatever_the_payload() {
    let payloads = samples();
    for payload in payloads {
        let raise = move || -> i64 { std::panic::panic_any(payload.clone()) };
        let case = Case::new(raise.into_callable(), Input::new(vec![]), Expectation::panic());
        assert!(case.run().unwrap().is_pass());
    }
}

#[test]
fn normal_return_under_panic_expectation_fails() {
    for v in samples() {
        let give = move || v.clone();
        let case = Case::new(give.into_callable(), Input::new(vec![]), Expectation::panic());
        let verdict = case.run().unwrap();
        assert_eq!(verdict.failure().unwrap().kind, FailureKind::MissingPanic);
    }
}
