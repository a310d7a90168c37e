use std::{fmt, io};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoverageError {
    #[error("failed to run {program}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("command failed: {command} (exit {}){}", display_code(.code), display_stderr(.stderr))]
    ExternalProcess {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    #[error("malformed output from {command}")]
    MalformedOutput {
        command: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write report")]
    Io(#[from] io::Error),
}

pub type CoverageResult<T> = Result<T, CoverageError>;

impl CoverageError {
    pub fn spawn(program: impl fmt::Display, source: io::Error) -> Self {
        Self::Spawn {
            program: program.to_string(),
            source,
        }
    }

    pub fn external(command: impl fmt::Display, code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::ExternalProcess {
            command: command.to_string(),
            code,
            stderr: stderr.into(),
        }
    }

    pub fn malformed(command: impl fmt::Display, source: serde_json::Error) -> Self {
        Self::MalformedOutput {
            command: command.to_string(),
            source,
        }
    }

    /// Exit code of a failed subprocess, if the process exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::ExternalProcess { code, .. } => *code,
            _ => None,
        }
    }
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

fn display_stderr(stderr: &str) -> String {
    let trimmed = stderr.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("\n{trimmed}")
    }
}

/// Total coverage fell below the requested minimum.
///
/// Not an operational failure; the `Display` output is the exact diagnostic
/// line written to stderr.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("expected at least {threshold}% coverage, but was {actual}%")]
pub struct ThresholdNotMet {
    pub threshold: u32,
    pub actual: String,
}
