//! Running prepared calls and capturing abnormal termination.
//!
//! A panic never escapes [`invoke`]. The outcome is an explicit three-way
//! [`Outcome`]: a normal return, an expected panic, or an unexpected panic
//! with its backtrace.

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};

use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::callable::PreparedCall;
use crate::tuple::Tuple;
use crate::value::{ErrorValue, Value};

/// What happened when a prepared call ran.
#[derive(Debug, Clone)]
pub enum Outcome {
    Returned(Tuple),
    /// The call panicked and a panic was expected.
    Panicked { payload: Value },
    /// The call panicked although values were expected.
    UnexpectedPanic(PanicReport),
}

impl Outcome {
    pub fn is_panic(&self) -> bool {
        !matches!(self, Outcome::Returned(_))
    }
}

impl From<Tuple> for Outcome {
    fn from(t: Tuple) -> Self {
        Outcome::Returned(t)
    }
}

/// Diagnostics for an unexpected panic.
#[derive(Debug, Clone, Serialize)]
pub struct PanicReport {
    pub payload: Value,
    /// `file:line` of the panic, when the hook saw it.
    pub location: Option<String>,
    pub backtrace: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    Off,
    /// Swallow the default panic message.
    Quiet,
    /// Swallow the message and record location and backtrace.
    Trace,
}

#[derive(Debug, Default)]
struct Captured {
    location: Option<String>,
    backtrace: Option<String>,
}

thread_local! {
    static CAPTURE: Cell<Capture> = const { Cell::new(Capture::Off) };
    static LAST_PANIC: RefCell<Captured> = RefCell::new(Captured::default());
}

static HOOK: OnceCell<()> = OnceCell::new();

/// Installs the process-wide panic hook once. Outside an invocation on the
/// current thread it defers to whatever hook was installed before.
fn install_hook() {
    HOOK.get_or_init(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let mode = CAPTURE.try_with(Cell::get).unwrap_or(Capture::Off);
            match mode {
                Capture::Off => previous(info),
                Capture::Quiet => {}
                Capture::Trace => {
                    let captured = Captured {
                        location: info.location().map(|l| format!("{}:{}", l.file(), l.line())),
                        backtrace: Some(Backtrace::force_capture().to_string()),
                    };
                    let _ = LAST_PANIC.try_with(|slot| *slot.borrow_mut() = captured);
                }
            }
        }));
    });
}

/// Sets the capture mode for the current thread. On drop it restores the
/// previous mode and whatever an enclosing invocation had captured, so nested
/// invocations behave.
struct CaptureGuard {
    previous: Capture,
    previous_captured: Captured,
}

impl CaptureGuard {
    fn enter(mode: Capture) -> Self {
        let previous = CAPTURE.with(|c| c.replace(mode));
        let previous_captured = LAST_PANIC.with(|slot| std::mem::take(&mut *slot.borrow_mut()));
        Self {
            previous,
            previous_captured,
        }
    }

    /// Takes what the hook recorded during this invocation.
    fn take_captured(&self) -> Captured {
        LAST_PANIC.with(|slot| std::mem::take(&mut *slot.borrow_mut()))
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        let previous = self.previous;
        let _ = CAPTURE.try_with(|c| c.set(previous));
        let captured = std::mem::take(&mut self.previous_captured);
        let _ = LAST_PANIC.try_with(|slot| *slot.borrow_mut() = captured);
    }
}

/// Runs `call` under `mode`. On a panic returns the payload together with
/// what the hook recorded for it.
fn run_captured(call: PreparedCall<'_>, mode: Capture) -> Result<Tuple, (Value, Captured)> {
    install_hook();
    let guard = CaptureGuard::enter(mode);
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(tuple) => Ok(tuple),
        Err(payload) => {
            let captured = guard.take_captured();
            drop(guard);
            Err((payload_value(payload), captured))
        }
    }
}

/// Runs `call`, capturing its returned values or its panic.
pub fn invoke(call: PreparedCall<'_>, panic_expected: bool) -> Outcome {
    if panic_expected {
        return invoke_quiet(call);
    }
    match run_captured(call, Capture::Trace) {
        Ok(tuple) => Outcome::Returned(tuple),
        Err((payload, captured)) => {
            let backtrace = captured
                .backtrace
                .unwrap_or_else(|| "<backtrace unavailable>".to_string());
            tracing::error!(
                payload = %payload,
                location = captured.location.as_deref().unwrap_or("???"),
                "PANIC:\n{}\n---",
                backtrace
            );
            Outcome::UnexpectedPanic(PanicReport {
                payload,
                location: captured.location,
                backtrace,
            })
        }
    }
}

/// Runs `call` without recording or logging anything about a panic. Used
/// where only the time spent matters.
pub(crate) fn invoke_quiet(call: PreparedCall<'_>) -> Outcome {
    match run_captured(call, Capture::Quiet) {
        Ok(tuple) => Outcome::Returned(tuple),
        Err((payload, _)) => Outcome::Panicked { payload },
    }
}

/// Converts a panic payload into a value.
///
/// String messages become strings; a [`Value`] or [`ErrorValue`] raised with
/// `std::panic::panic_any` is kept as is, as are plain numbers and booleans.
/// Boxed errors and `std::io::Error` become error values.
pub fn payload_value(payload: Box<dyn Any + Send>) -> Value {
    let payload = match payload.downcast::<Value>() {
        Ok(v) => return *v,
        Err(p) => p,
    };
    let payload = match payload.downcast::<String>() {
        Ok(s) => return Value::Str(*s),
        Err(p) => p,
    };
    let payload = match payload.downcast::<&'static str>() {
        Ok(s) => return Value::Str((*s).to_string()),
        Err(p) => p,
    };
    let payload = match payload.downcast::<ErrorValue>() {
        Ok(e) => return Value::Error(*e),
        Err(p) => p,
    };
    let payload = match payload.downcast::<Box<dyn std::error::Error + Send + Sync>>() {
        Ok(e) => return Value::Error(ErrorValue::from_error(&**e)),
        Err(p) => p,
    };
    let payload = match payload.downcast::<std::io::Error>() {
        Ok(e) => return Value::Error(ErrorValue::from_error(&*e)),
        Err(p) => p,
    };
    if let Some(n) = payload.downcast_ref::<i64>() {
        return Value::Int(*n);
    }
    if let Some(n) = payload.downcast_ref::<i32>() {
        return Value::Int(i64::from(*n));
    }
    if let Some(n) = payload.downcast_ref::<usize>() {
        return Value::Int(*n as i64);
    }
    if let Some(x) = payload.downcast_ref::<f64>() {
        return Value::Float(*x);
    }
    if let Some(b) = payload.downcast_ref::<bool>() {
        return Value::Bool(*b);
    }
    Value::Str("Box<dyn Any>".to_string())
}
