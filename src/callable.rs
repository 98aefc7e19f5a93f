//! # Callables
//!
//! A function under test sits behind the [`Callable`] trait: it publishes a
//! [`Signature`] for the binder and turns bound argument values into a
//! [`PreparedCall`] that the invoker runs.
//!
//! Plain Rust functions and closures of up to six owned parameters become
//! callables through [`IntoCallable`]; functions whose last parameter is a
//! `Vec<T>` can be registered as variadic through [`IntoVariadic`], in which
//! case inputs past the fixed prefix are collected into that vector.
//!
//! ## Calling Convention
//!
//! - Every parameter type implements [`FromValue`], which also names the
//!   [`ValueType`] the binder coerces inputs to.
//! - Every return type implements [`IntoTuple`].
//! - Conversion happens in [`Callable::prepare`], before the timed or guarded
//!   region; only the call itself runs inside the prepared closure.

use std::marker::PhantomData;
use std::rc::Rc;

use crate::error::BindError;
use crate::tuple::{IntoTuple, Tuple};
use crate::value::{FromValue, Value, ValueType};

// ============================================================================
// CORE TYPES AND TRAITS
// ============================================================================

/// A call whose arguments are already converted, ready to run exactly once.
pub type PreparedCall<'a> = Box<dyn FnOnce() -> Tuple + 'a>;

/// The parameter list of a callable.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    pub name: String,
    pub params: Vec<ValueType>,
    /// Element type of the trailing variadic parameter, if any.
    pub variadic: Option<ValueType>,
}

impl Signature {
    pub fn fixed(name: impl Into<String>, params: Vec<ValueType>) -> Self {
        Self {
            name: name.into(),
            params,
            variadic: None,
        }
    }

    pub fn variadic(name: impl Into<String>, params: Vec<ValueType>, rest: ValueType) -> Self {
        Self {
            name: name.into(),
            params,
            variadic: Some(rest),
        }
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic.is_some()
    }

    /// The type expected at `position`, or `None` past the end of a fixed
    /// signature.
    pub fn param_type(&self, position: usize) -> Option<&ValueType> {
        self.params.get(position).or(self.variadic.as_ref())
    }

    /// Human-readable arity, e.g. `2` or `at least 1`.
    pub fn arity(&self) -> String {
        if self.is_variadic() {
            format!("at least {}", self.params.len())
        } else {
            self.params.len().to_string()
        }
    }

    pub(crate) fn arity_error(&self, given: usize) -> BindError {
        BindError::Arity {
            function: self.name.clone(),
            expected: self.arity(),
            given,
        }
    }
}

/// A function under test behind a uniform interface.
pub trait Callable {
    fn signature(&self) -> &Signature;

    /// Converts bound argument values into the function's parameter types and
    /// returns the call without running it.
    fn prepare(&self, args: Vec<Value>) -> Result<PreparedCall<'_>, BindError>;

    fn name(&self) -> &str {
        &self.signature().name
    }
}

/// Conversion of a Rust function into a fixed-arity [`Callable`].
///
/// `M` is a marker (the function's pointer type) that keeps the impls for
/// different arities apart.
pub trait IntoCallable<M> {
    fn into_callable(self) -> Rc<dyn Callable>;
}

/// Conversion of a Rust function whose last parameter is a `Vec<T>` into a
/// variadic [`Callable`].
pub trait IntoVariadic<M> {
    fn into_variadic(self) -> Rc<dyn Callable>;
}

/// Display name of a function type: the last two path segments.
///
/// # Examples
///
/// ```rust
/// use ezcase::callable::display_name;
/// assert_eq!(display_name("my_crate::math::add"), "math::add");
/// assert_eq!(display_name("add"), "add");
/// ```
pub fn display_name(full: &str) -> String {
    let segments: Vec<&str> = full.split("::").collect();
    let start = segments.len().saturating_sub(2);
    segments[start..].join("::")
}

fn function_name<F>() -> String {
    display_name(std::any::type_name::<F>())
}

// ============================================================================
// ADAPTERS
// ============================================================================

/// A fixed-arity Rust function adapted to [`Callable`].
pub struct FnAdapter<F, M> {
    f: F,
    signature: Signature,
    _marker: PhantomData<fn() -> M>,
}

/// A variadic Rust function adapted to [`Callable`].
pub struct VariadicAdapter<F, M> {
    f: F,
    signature: Signature,
    _marker: PhantomData<fn() -> M>,
}

fn take_arg<T: FromValue>(
    signature: &Signature,
    args: &mut std::iter::Enumerate<std::vec::IntoIter<Value>>,
    given: usize,
) -> Result<T, BindError> {
    let (position, value) = args.next().ok_or_else(|| signature.arity_error(given))?;
    convert(signature, position, value)
}

fn convert<T: FromValue>(signature: &Signature, position: usize, value: Value) -> Result<T, BindError> {
    let shown = value.clone();
    T::from_value(value).ok_or_else(|| {
        BindError::invalid_argument(&signature.name, position, &T::value_type(), &shown)
    })
}

macro_rules! fixed_callable {
    ($($arg:ident),*) => {
        impl<Func, Ret, $($arg),*> Callable for FnAdapter<Func, fn($($arg),*) -> Ret>
        where
            Func: Fn($($arg),*) -> Ret,
            Ret: IntoTuple,
            $($arg: FromValue,)*
        {
            fn signature(&self) -> &Signature {
                &self.signature
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn prepare(&self, args: Vec<Value>) -> Result<PreparedCall<'_>, BindError> {
                let given = args.len();
                if given != self.signature.params.len() {
                    return Err(self.signature.arity_error(given));
                }
                let mut args = args.into_iter().enumerate();
                $(let $arg: $arg = take_arg(&self.signature, &mut args, given)?;)*
                Ok(Box::new(move || (self.f)($($arg),*).into_tuple()))
            }
        }

        impl<Func, Ret, $($arg),*> IntoCallable<fn($($arg),*) -> Ret> for Func
        where
            Func: Fn($($arg),*) -> Ret + 'static,
            Ret: IntoTuple + 'static,
            $($arg: FromValue + 'static,)*
        {
            fn into_callable(self) -> Rc<dyn Callable> {
                let signature = Signature::fixed(
                    function_name::<Func>(),
                    vec![$(<$arg as FromValue>::value_type()),*],
                );
                Rc::new(FnAdapter::<Func, fn($($arg),*) -> Ret> {
                    f: self,
                    signature,
                    _marker: PhantomData,
                })
            }
        }
    };
}

fixed_callable!();
fixed_callable!(A);
fixed_callable!(A, B);
fixed_callable!(A, B, C);
fixed_callable!(A, B, C, D);
fixed_callable!(A, B, C, D, E);
fixed_callable!(A, B, C, D, E, F);

macro_rules! variadic_callable {
    ($($arg:ident),*) => {
        impl<Func, Ret, Rest, $($arg),*> Callable for VariadicAdapter<Func, fn($($arg,)* Vec<Rest>) -> Ret>
        where
            Func: Fn($($arg,)* Vec<Rest>) -> Ret,
            Ret: IntoTuple,
            Rest: FromValue,
            $($arg: FromValue,)*
        {
            fn signature(&self) -> &Signature {
                &self.signature
            }

            #[allow(non_snake_case, unused_mut)]
            fn prepare(&self, args: Vec<Value>) -> Result<PreparedCall<'_>, BindError> {
                let given = args.len();
                if given < self.signature.params.len() {
                    return Err(self.signature.arity_error(given));
                }
                let mut args = args.into_iter().enumerate();
                $(let $arg: $arg = take_arg(&self.signature, &mut args, given)?;)*
                let rest = args
                    .map(|(position, value)| convert::<Rest>(&self.signature, position, value))
                    .collect::<Result<Vec<Rest>, BindError>>()?;
                Ok(Box::new(move || (self.f)($($arg,)* rest).into_tuple()))
            }
        }

        impl<Func, Ret, Rest, $($arg),*> IntoVariadic<fn($($arg,)* Vec<Rest>) -> Ret> for Func
        where
            Func: Fn($($arg,)* Vec<Rest>) -> Ret + 'static,
            Ret: IntoTuple + 'static,
            Rest: FromValue + 'static,
            $($arg: FromValue + 'static,)*
        {
            fn into_variadic(self) -> Rc<dyn Callable> {
                let signature = Signature::variadic(
                    function_name::<Func>(),
                    vec![$(<$arg as FromValue>::value_type()),*],
                    Rest::value_type(),
                );
                Rc::new(VariadicAdapter::<Func, fn($($arg,)* Vec<Rest>) -> Ret> {
                    f: self,
                    signature,
                    _marker: PhantomData,
                })
            }
        }
    };
}

variadic_callable!();
variadic_callable!(A);
variadic_callable!(A, B);
variadic_callable!(A, B, C);

#[cfg(test)]
mod callable_tests {
    use super::*;
    use crate::value::IntoValue;

    fn add(x: i64, y: i64) -> i64 {
        x + y
    }

    fn join(sep: String, parts: Vec<String>) -> String {
        parts.join(&sep)
    }

    #[test]
    fn test_fixed_signature() {
        let c = add.into_callable();
        assert_eq!(c.signature().params, vec![ValueType::Int, ValueType::Int]);
        assert!(!c.signature().is_variadic());
        assert!(c.name().ends_with("add"));
    }

    #[test]
    fn test_prepare_and_call() {
        let c = add.into_callable();
        let call = c.prepare(vec![Value::Int(2), Value::Int(3)]).unwrap();
        assert_eq!(call(), Tuple::new(vec![Value::Int(5)]));
    }

    #[test]
    fn test_prepare_rejects_wrong_count() {
        let c = add.into_callable();
        let err = c.prepare(vec![Value::Int(2)]).err().unwrap();
        assert!(matches!(err, BindError::Arity { given: 1, .. }));
    }

    #[test]
    fn test_variadic_collects_rest() {
        let c = join.into_variadic();
        assert_eq!(c.signature().arity(), "at least 1");
        let args = vec!["-".into_value(), "a".into_value(), "b".into_value()];
        let call = c.prepare(args).unwrap();
        assert_eq!(call(), Tuple::new(vec![Value::Str("a-b".into())]));
    }

    #[test]
    fn test_closure_names_and_unit_return() {
        let c = (|| ()).into_callable();
        assert!(c.signature().params.is_empty());
        let call = c.prepare(vec![]).unwrap();
        assert!(call().is_empty());
    }

    #[test]
    fn test_param_type_past_fixed_prefix() {
        let sig = Signature::variadic("f", vec![ValueType::Str], ValueType::Int);
        assert_eq!(sig.param_type(0), Some(&ValueType::Str));
        assert_eq!(sig.param_type(5), Some(&ValueType::Int));
        let sig = Signature::fixed("g", vec![ValueType::Str]);
        assert_eq!(sig.param_type(1), None);
    }
}
