//! Source locations attached to inputs and expectations.
//!
//! Locations exist only for failure messages; the engine never compares them.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// How a location's file path is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PathStyle {
    /// The path exactly as the compiler recorded it.
    #[default]
    Absolute,
    /// The path from the first `src/` (or a known crate directory) onwards.
    Abstract,
    /// The path relative to the current working directory.
    Relative,
    /// The file name only.
    Truncate,
}

impl PathStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            PathStyle::Absolute => "Absolute",
            PathStyle::Abstract => "Abstract",
            PathStyle::Relative => "Relative",
            PathStyle::Truncate => "Truncate",
        }
    }
}

impl fmt::Display for PathStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PathStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "absolute" => Ok(PathStyle::Absolute),
            "abstract" => Ok(PathStyle::Abstract),
            "relative" => Ok(PathStyle::Relative),
            "truncate" => Ok(PathStyle::Truncate),
            other => Err(format!("unknown path style '{}'", other)),
        }
    }
}

/// A file and line in the test source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// The location of the caller of the enclosing `#[track_caller]` chain.
    #[track_caller]
    pub fn caller() -> Self {
        let here = std::panic::Location::caller();
        Self::new(here.file(), here.line())
    }

    /// Placeholder used when no location could be captured.
    pub fn unknown() -> Self {
        Self::new("???", 1)
    }

    /// Renders `file:line` with the given path style.
    pub fn render(&self, style: PathStyle) -> String {
        let file = match style {
            PathStyle::Absolute => self.file.clone(),
            PathStyle::Abstract => abstract_path(&self.file),
            PathStyle::Relative => relative_path(&self.file),
            PathStyle::Truncate => truncate_path(&self.file).to_string(),
        };
        format!("{}:{}", file, self.line)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

// Crate directory names a path may be anchored at, longest first so that
// e.g. "foobar" wins over "foo".
static ANCHORS: Lazy<Vec<String>> = Lazy::new(|| {
    let mut anchors: Vec<String> = std::env::var_os("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .into_iter()
        .flat_map(|dir| {
            let mut names = Vec::new();
            if let Some(name) = dir.file_name() {
                names.push(name.to_string_lossy().into_owned());
            }
            if let Ok(entries) = std::fs::read_dir(&dir) {
                for entry in entries.flatten() {
                    if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                        names.push(entry.file_name().to_string_lossy().into_owned());
                    }
                }
            }
            names
        })
        .collect();
    anchors.sort_by(|a, b| b.cmp(a));
    anchors
});

/// Strips everything up to the first `src/`, or up to a known anchor
/// directory.
pub fn abstract_path(path: &str) -> String {
    let path = path.trim_start_matches('_');
    if let Some((_, rest)) = path.split_once("src/") {
        return rest.to_string();
    }
    for anchor in ANCHORS.iter() {
        if let Some((_, rest)) = path.split_once(&format!("{}/", anchor)) {
            return format!("{}/{}", anchor, rest);
        }
    }
    path.to_string()
}

fn relative_path(path: &str) -> String {
    let p = Path::new(path);
    if p.is_relative() {
        return path.to_string();
    }
    std::env::current_dir()
        .ok()
        .and_then(|cwd| p.strip_prefix(cwd).ok().map(|r| r.to_string_lossy().into_owned()))
        .unwrap_or_else(|| path.to_string())
}

fn truncate_path(path: &str) -> &str {
    match path.rfind(['/', '\\']) {
        Some(i) => &path[i + 1..],
        None => path,
    }
}

#[cfg(test)]
mod location_tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_file_name() {
        let loc = Location::new("tests/math/add.rs", 12);
        assert_eq!(loc.render(PathStyle::Truncate), "add.rs:12");
        assert_eq!(truncate_path(r"C:\work\lib.rs"), "lib.rs");
    }

    #[test]
    fn test_abstract_strips_through_src() {
        assert_eq!(abstract_path("/home/me/proj/src/unit.rs"), "unit.rs");
        assert_eq!(abstract_path("plain.rs"), "plain.rs");
    }

    #[test]
    fn test_absolute_and_relative() {
        let loc = Location::new("tests/a.rs", 3);
        assert_eq!(loc.render(PathStyle::Absolute), "tests/a.rs:3");
        assert_eq!(loc.render(PathStyle::Relative), "tests/a.rs:3");
        let cwd = std::env::current_dir().unwrap();
        let abs = cwd.join("x").join("b.rs");
        let loc = Location::new(abs.to_string_lossy(), 9);
        assert_eq!(loc.render(PathStyle::Relative), format!("x{}b.rs:9", std::path::MAIN_SEPARATOR));
    }

    #[test]
    fn test_caller_is_this_file() {
        let loc = Location::caller();
        assert!(loc.file.ends_with("location.rs"));
        assert_eq!(loc.render(PathStyle::Truncate), format!("location.rs:{}", loc.line));
    }

    #[test]
    fn test_path_style_parsing() {
        assert_eq!("truncate".parse::<PathStyle>(), Ok(PathStyle::Truncate));
        assert!("sideways".parse::<PathStyle>().is_err());
        assert_eq!(PathStyle::Abstract.to_string(), "Abstract");
    }
}
