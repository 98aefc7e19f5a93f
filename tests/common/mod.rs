//! Shared helpers for the integration tests.

#![allow(dead_code)]

use ezcase::report::text_diff;
use ezcase::{Config, PathStyle, Unit, Value};

/// Routes `tracing` output through the test harness so it shows up only for
/// failing tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Colorless, path-truncating configuration with the in-process diff.
pub fn plain() -> Config {
    Config::default()
        .with_color(false)
        .with_path_style(PathStyle::Truncate)
        .with_diff(text_diff)
}

pub fn unit() -> Unit {
    init_tracing();
    Unit::with_config(plain())
}

/// One sample of every value shape, including nil and an error.
pub fn samples() -> Vec<Value> {
    vec![
        Value::Nil,
        Value::Bool(true),
        Value::Bool(false),
        Value::Int(0),
        Value::Int(-7),
        Value::Float(0.5),
        Value::Float(f64::NAN),
        Value::Str(String::new()),
        Value::Str("word".into()),
        Value::List(vec![Value::Int(1), Value::Nil]),
        Value::List(Vec::new()),
        Value::Map(im::ordmap! {"k".to_string() => Value::Int(1)}),
        Value::error(&std::fmt::Error),
    ]
}
