//! User-facing rendering of failed cases.
//!
//! Everything the engine hands over is already a string; this module only
//! lays it out, colors it and diffs the expected and actual renderings.

use std::io::Write;
use std::process::Command;

use difference::{Changeset, Difference};
use serde::Serialize;
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::case::{Failure, FailureKind, Verdict};
use crate::config::Config;
use crate::location::Location;

// ============================================================================
// DIFFS
// ============================================================================

/// Produces a human-readable difference between the actual and the expected
/// rendering, in that order.
pub type DiffFn = fn(have: &str, want: &str) -> String;

/// Line diff computed in process. Removed lines come from the actual value,
/// added lines from the expected one.
///
/// # Examples
///
/// ```rust
/// use ezcase::report::text_diff;
/// assert_eq!(text_diff("a\nb", "a\nc"), " a\n-b\n+c");
/// ```
pub fn text_diff(have: &str, want: &str) -> String {
    let changeset = Changeset::new(have, want, "\n");
    let mut lines = Vec::new();
    for diff in &changeset.diffs {
        let (prefix, text) = match diff {
            Difference::Same(x) => (' ', x),
            Difference::Rem(x) => ('-', x),
            Difference::Add(x) => ('+', x),
        };
        for line in text.split('\n') {
            lines.push(format!("{}{}", prefix, line));
        }
    }
    lines.join("\n")
}

const GIT_UNAVAILABLE: &str = "<unavailable: please install git>";

/// Word diff produced by `git diff --no-index`.
///
/// When git cannot be run the result is a short notice followed by
/// [`text_diff`].
pub fn git_diff(have: &str, want: &str) -> String {
    match run_git_diff(have, want) {
        Ok(out) => out,
        Err(err) => {
            tracing::warn!(error = %err, "git diff unavailable");
            with_fallback(have, want)
        }
    }
}

fn with_fallback(have: &str, want: &str) -> String {
    format!("{}\n{}", GIT_UNAVAILABLE, text_diff(have, want))
}

fn run_git_diff(have: &str, want: &str) -> std::io::Result<String> {
    let mut a = tempfile::Builder::new().prefix("A-").tempfile()?;
    let mut b = tempfile::Builder::new().prefix("B-").tempfile()?;
    a.write_all(have.as_bytes())?;
    b.write_all(want.as_bytes())?;
    a.flush()?;
    b.flush()?;

    let output = Command::new("git")
        .args(["diff", "--word-diff", "--no-color", "--no-index"])
        .arg(a.path())
        .arg(b.path())
        .output()?;
    // git exits with 1 whenever the files differ; only an empty output is an
    // actual failure.
    let text = String::from_utf8_lossy(&output.stdout).into_owned();
    if text.is_empty() && !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(std::io::Error::other(stderr.trim().to_string()));
    }
    // Skip the header: diff --git, index, ---, +++ and the hunk line.
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() >= 5 {
        Ok(lines[5..].join("\n"))
    } else {
        Ok("<empty>".to_string())
    }
}

// ============================================================================
// FAILURE RENDERING
// ============================================================================

const WHITE: u8 = 15;
const BLACK: u8 = 232;
const GREEN: u8 = 40;
const RED: u8 = 160;

fn color_spec(fg: u8, bg: u8) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(Color::Ansi256(fg)))
        .set_bg(Some(Color::Ansi256(bg)));
    spec
}

fn colored(out: &mut Buffer, fg: u8, bg: u8, text: &str) -> std::io::Result<()> {
    out.set_color(&color_spec(fg, bg))?;
    write!(out, "{}", text)?;
    out.reset()
}

/// Renders one failed case:
///
/// ```text
///  tests/math.rs:12
///  - math::add(2, 2)
/// want (..)
/// have (..)
/// diff ..
/// ```
pub fn render_failure(failure: &Failure, config: &Config) -> String {
    let mut out = if config.color {
        Buffer::ansi()
    } else {
        Buffer::no_color()
    };
    let _ = write_failure(&mut out, failure, config);
    String::from_utf8_lossy(out.as_slice()).into_owned()
}

fn write_failure(out: &mut Buffer, failure: &Failure, config: &Config) -> std::io::Result<()> {
    let location = failure
        .input_location
        .as_ref()
        .or(failure.expectation_location.as_ref())
        .cloned()
        .unwrap_or_else(Location::unknown);
    colored(out, WHITE, BLACK, &format!(" {} ", location.render(config.path_style)))?;
    writeln!(out)?;

    let (module, name) = match failure.function.rsplit_once("::") {
        Some((m, n)) => (format!("{}::", m), n),
        None => (String::new(), failure.function.as_str()),
    };
    write!(out, " - {}", module)?;
    colored(out, BLACK, WHITE, name)?;
    writeln!(out, "{}", failure.input)?;

    colored(out, GREEN, BLACK, &format!("want {}", failure.expected))?;
    writeln!(out)?;
    let mut have = format!("have {}", failure.actual);
    if let Some(backtrace) = &failure.backtrace {
        have.push('\n');
        have.push_str(backtrace);
    }
    colored(out, RED, BLACK, &have)?;
    writeln!(out)?;

    match failure.kind {
        FailureKind::Mismatch | FailureKind::WrongPanic => {
            writeln!(out, "diff {}", (config.diff)(&failure.actual, &failure.expected))?;
        }
        FailureKind::UnexpectedPanic | FailureKind::MissingPanic => {
            writeln!(out, "{}", failure.kind)?;
        }
    }
    Ok(())
}

// ============================================================================
// SUMMARY
// ============================================================================

/// Pass and fail counts of one test run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
}

impl Summary {
    pub fn from_verdicts<'a>(verdicts: impl IntoIterator<Item = &'a Verdict>) -> Self {
        verdicts
            .into_iter()
            .fold(Summary::default(), |mut summary, verdict| {
                if verdict.is_pass() {
                    summary.passed += 1;
                } else {
                    summary.failed += 1;
                }
                summary
            })
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn success_rate(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        (self.passed as f64 / self.total() as f64) * 100.0
    }

    pub fn to_json(&self) -> String {
        serde_json::json!({
            "passed": self.passed,
            "failed": self.failed,
            "total": self.total(),
            "success_rate": self.success_rate(),
        })
        .to_string()
    }
}
