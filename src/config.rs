//! Presentation settings.

use std::env;

use crate::location::PathStyle;
use crate::report::{git_diff, text_diff, DiffFn};

/// How failures are rendered. The default diff runs `git diff` and falls back
/// to the in-process line diff when git is missing.
#[derive(Clone, Copy)]
pub struct Config {
    pub color: bool,
    pub path_style: PathStyle,
    pub diff: DiffFn,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color: false,
            path_style: PathStyle::default(),
            diff: git_diff,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("color", &self.color)
            .field("path_style", &self.path_style)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Reads `EZCASE_COLOR`, `NO_COLOR`, `EZCASE_PATH_STYLE` and `EZCASE_DIFF`.
    /// Unset or unrecognized variables keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        let color = match lookup("EZCASE_COLOR").as_deref() {
            Some("always") => true,
            Some("never") => false,
            _ => lookup("NO_COLOR").is_none() && atty::is(atty::Stream::Stderr),
        };
        let path_style = match lookup("EZCASE_PATH_STYLE").map(|s| s.parse::<PathStyle>()) {
            Some(Ok(style)) => style,
            Some(Err(err)) => {
                tracing::warn!(%err, "ignoring EZCASE_PATH_STYLE");
                defaults.path_style
            }
            None => defaults.path_style,
        };
        let diff: DiffFn = match lookup("EZCASE_DIFF").as_deref() {
            Some("text") => text_diff,
            Some("git") | None => git_diff,
            Some(other) => {
                tracing::warn!(value = other, "ignoring EZCASE_DIFF");
                defaults.diff
            }
        };
        Config {
            color,
            path_style,
            diff,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_path_style(mut self, path_style: PathStyle) -> Self {
        self.path_style = path_style;
        self
    }

    pub fn with_diff(mut self, diff: DiffFn) -> Self {
        self.diff = diff;
        self
    }
}
