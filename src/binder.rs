//! Binding of loosely-typed input tuples to a callable's parameters.

use crate::callable::Signature;
use crate::error::BindError;
use crate::tuple::Tuple;
use crate::value::{Value, ValueType};

/// Produces one argument per input, each coerced to the parameter type at its
/// position.
///
/// Positions past a fixed signature are an arity error; past a variadic one
/// they take the variadic element type. An untyped `Nil` binds to the zero
/// value of an `Option` or `Value` parameter and is rejected anywhere else.
pub fn bind(signature: &Signature, input: &Tuple) -> Result<Vec<Value>, BindError> {
    let given = input.len();
    if given < signature.params.len() {
        return Err(signature.arity_error(given));
    }
    input
        .iter()
        .enumerate()
        .map(|(position, x)| {
            let target = signature
                .param_type(position)
                .ok_or_else(|| signature.arity_error(given))?;
            coerce(target, x.clone()).ok_or_else(|| {
                BindError::invalid_argument(&signature.name, position, target, x)
            })
        })
        .collect()
}

/// Coerces a value to `target`, or returns `None` if it cannot stand in for
/// that type.
///
/// # Examples
///
/// ```rust
/// use ezcase::binder::coerce;
/// use ezcase::value::{Value, ValueType};
/// assert_eq!(coerce(&ValueType::Float, Value::Int(2)), Some(Value::Float(2.0)));
/// assert_eq!(coerce(&ValueType::Int, Value::Nil), None);
/// ```
pub fn coerce(target: &ValueType, value: Value) -> Option<Value> {
    match (target, value) {
        (ValueType::Dynamic, v) => Some(v),
        (t, Value::Nil) if t.is_nilable() => Some(t.zero()),
        (_, Value::Nil) => None,
        (ValueType::Optional(inner), v) => coerce(inner, v),
        (ValueType::Float, Value::Int(n)) => Some(Value::Float(n as f64)),
        (ValueType::List(elem), Value::List(items)) => items
            .into_iter()
            .map(|v| coerce(elem, v))
            .collect::<Option<Vec<_>>>()
            .map(Value::List),
        (ValueType::Map(elem), Value::Map(map)) => map
            .into_iter()
            .map(|(k, v)| coerce(elem, v).map(|v| (k, v)))
            .collect::<Option<im::OrdMap<_, _>>>()
            .map(Value::Map),
        (t, v) if t.admits(&v) => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod binder_tests {
    use super::*;
    use crate::value::IntoValue;

    fn ints(n: usize) -> Tuple {
        (0..n as i64).map(Value::Int).collect()
    }

    #[test]
    fn test_fixed_arity_rejects_extra_inputs() {
        let sig = Signature::fixed("add", vec![ValueType::Int, ValueType::Int]);
        assert!(bind(&sig, &ints(2)).is_ok());
        let err = bind(&sig, &ints(3)).unwrap_err();
        assert_eq!(
            err,
            BindError::Arity {
                function: "add".into(),
                expected: "2".into(),
                given: 3
            }
        );
    }

    #[test]
    fn test_missing_inputs_are_an_arity_error() {
        let sig = Signature::fixed("add", vec![ValueType::Int, ValueType::Int]);
        assert!(matches!(
            bind(&sig, &ints(1)),
            Err(BindError::Arity { given: 1, .. })
        ));
    }

    #[test]
    fn test_variadic_accepts_any_count_past_prefix() {
        let sig = Signature::variadic("sum", vec![ValueType::Str], ValueType::Int);
        for extra in [0, 1, 7, 40] {
            let mut xs = vec!["label".into_value()];
            xs.extend((0..extra).map(Value::Int));
            assert_eq!(bind(&sig, &Tuple::new(xs)).unwrap().len(), extra as usize + 1);
        }
    }

    #[test]
    fn test_nil_binds_to_nilable_types_only() {
        let sig = Signature::fixed(
            "f",
            vec![
                ValueType::Optional(Box::new(ValueType::Int)),
                ValueType::Dynamic,
            ],
        );
        let bound = bind(&sig, &Tuple::new(vec![Value::Nil, Value::Nil])).unwrap();
        assert_eq!(bound, vec![Value::Nil, Value::Nil]);

        let sig = Signature::fixed("g", vec![ValueType::Int]);
        let err = bind(&sig, &Tuple::new(vec![Value::Nil])).unwrap_err();
        assert!(matches!(err, BindError::InvalidArgument { position: 0, .. }));
    }

    #[test]
    fn test_type_mismatch_is_invalid_argument() {
        let sig = Signature::fixed("g", vec![ValueType::Str]);
        let err = bind(&sig, &Tuple::new(vec![Value::Int(4)])).unwrap_err();
        assert_eq!(err.to_string(), "g: argument #0 expects string, found 4 (Int)");
    }

    #[test]
    fn test_nested_coercion() {
        let ty = ValueType::List(Box::new(ValueType::Float));
        assert_eq!(
            coerce(&ty, vec![1, 2].into_value()),
            Some(Value::List(vec![Value::Float(1.0), Value::Float(2.0)]))
        );
        let ty = ValueType::List(Box::new(ValueType::Int));
        assert_eq!(coerce(&ty, Value::List(vec![Value::Nil])), None);
    }
}
