//! Candidate file discovery.

use std::path::PathBuf;

use glob::Pattern;
use tracing::debug;

use crate::error::CoverageResult;
use crate::flow::AnalysisTool;
use crate::process;

/// Paths never reported: Flow config, JSON, tests, generated code, library
/// definitions and dependencies. `*` also matches `/`.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    "*.flowconfig",
    "*.json",
    "*.test.js",
    "*/__generated__/*",
    "*/flow-typed/*",
    "*/node_modules/*",
];

pub const DEFAULT_MARKER: &str = "@flow";

/// Something that yields the ordered list of files to measure.
pub trait FileSource {
    fn files(&self) -> CoverageResult<Vec<String>>;
}

#[derive(Debug, Clone)]
pub struct IgnoreSet {
    patterns: Vec<Pattern>,
}

impl IgnoreSet {
    pub fn new<'a>(patterns: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            patterns: patterns
                .into_iter()
                .filter_map(|pattern| Pattern::new(pattern).ok())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(path))
    }

    /// Drop ignored paths, keeping the input order.
    pub fn filter(&self, paths: impl IntoIterator<Item = String>) -> Vec<String> {
        paths
            .into_iter()
            .filter(|path| {
                let ignored = self.is_ignored(path);
                if ignored {
                    debug!(%path, "ignored");
                }
                !ignored
            })
            .collect()
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self::new(DEFAULT_IGNORE_PATTERNS.iter().copied())
    }
}

/// Files tracked by git whose contents mention the marker.
#[derive(Debug, Clone)]
pub struct GitGrep {
    pub git: PathBuf,
    pub marker: String,
    pub ignore: IgnoreSet,
}

impl GitGrep {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            git: PathBuf::from("git"),
            marker: marker.into(),
            ignore: IgnoreSet::default(),
        }
    }
}

impl FileSource for GitGrep {
    fn files(&self) -> CoverageResult<Vec<String>> {
        let output = process::run(
            &self.git,
            &["grep", "--null", "--name-only", "--", self.marker.as_str()],
        )?;
        Ok(self.ignore.filter(split_null_separated(&output.stdout)))
    }
}

/// Files the analysis tool itself considers part of the project.
pub struct FlowLs<'a, T: AnalysisTool> {
    pub tool: &'a T,
    pub ignore: IgnoreSet,
}

impl<'a, T: AnalysisTool> FlowLs<'a, T> {
    pub fn new(tool: &'a T) -> Self {
        Self {
            tool,
            ignore: IgnoreSet::default(),
        }
    }
}

impl<T: AnalysisTool> FileSource for FlowLs<'_, T> {
    fn files(&self) -> CoverageResult<Vec<String>> {
        Ok(self.ignore.filter(self.tool.ls()?))
    }
}

fn split_null_separated(stdout: &str) -> impl Iterator<Item = String> + '_ {
    stdout
        .split('\0')
        .filter(|path| !path.is_empty())
        .map(str::to_string)
}
