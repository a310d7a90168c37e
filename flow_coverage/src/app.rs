use std::{
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    enumerate::{FileSource, FlowLs, GitGrep, DEFAULT_MARKER},
    error::{CoverageResult, ThresholdNotMet},
    flow::{self, AnalysisTool, FlowCli},
    report::{Aggregator, Summary},
};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_BELOW_THRESHOLD: u8 = 1;
pub const EXIT_OPERATIONAL_ERROR: u8 = 2;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "flow-coverage",
    author,
    version,
    about = "Report Flow type coverage per file and fail below a minimum",
    long_about = None
)]
pub struct Args {
    /// Minimum total coverage percentage
    pub threshold: u32,

    /// Path to the flow binary (defaults to node_modules/.bin/flow, then PATH)
    #[arg(long, env = "FLOW_BIN", value_name = "PATH")]
    pub flow_bin: Option<PathBuf>,

    /// Where the list of files to measure comes from
    #[arg(long, value_enum, default_value_t = SourceKind::GitGrep)]
    pub source: SourceKind,

    /// Marker comment searched for by git grep
    #[arg(long, default_value = DEFAULT_MARKER)]
    pub marker: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Files tracked by git containing the marker
    GitGrep,
    /// Files reported by `flow ls`
    FlowLs,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub threshold: u32,
    pub flow_bin: Option<PathBuf>,
    pub source: SourceKind,
    pub marker: String,
    pub root: PathBuf,
}

impl From<Args> for AppConfig {
    fn from(value: Args) -> Self {
        Self {
            threshold: value.threshold,
            flow_bin: value.flow_bin,
            source: value.source,
            marker: value.marker,
            root: PathBuf::from("."),
        }
    }
}

/// Outcome of a run that completed without an operational error.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Passed(Summary),
    BelowThreshold(ThresholdNotMet),
}

impl Verdict {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Passed(_) => EXIT_SUCCESS,
            Self::BelowThreshold(_) => EXIT_BELOW_THRESHOLD,
        }
    }
}

/// Logs go to stderr; stdout carries only the report.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Run against the real `flow` and `git`, writing the report to `out`.
pub fn run<W: Write>(config: &AppConfig, out: &mut W) -> Result<Verdict> {
    let bin = flow::locate_flow(config.flow_bin.as_deref(), &config.root)?;
    info!(bin = %bin.display(), threshold = config.threshold, "checking flow coverage");
    let tool = FlowCli::new(bin);

    let verdict = match config.source {
        SourceKind::GitGrep => {
            let source = GitGrep::new(config.marker.as_str());
            measure(&tool, &source, config.threshold, out)?
        }
        SourceKind::FlowLs => measure(&tool, &FlowLs::new(&tool), config.threshold, out)?,
    };
    Ok(verdict)
}

/// Measure every file from `source` and compare the total against `threshold`.
pub fn measure<T, S, W>(tool: &T, source: &S, threshold: u32, out: &mut W) -> CoverageResult<Verdict>
where
    T: AnalysisTool,
    S: FileSource,
    W: Write,
{
    let summary = Aggregator::new(tool, source).run(out)?;
    Ok(match summary.check(threshold) {
        Ok(()) => Verdict::Passed(summary),
        Err(shortfall) => Verdict::BelowThreshold(shortfall),
    })
}

/// Run with stdout as the report sink and map the outcome to an exit status.
pub fn main_with_exit(config: AppConfig) -> ExitCode {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match run(&config, &mut out) {
        Ok(Verdict::BelowThreshold(shortfall)) => {
            eprintln!("{shortfall}");
            ExitCode::from(EXIT_BELOW_THRESHOLD)
        }
        Ok(verdict) => ExitCode::from(verdict.exit_code()),
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(EXIT_OPERATIONAL_ERROR)
        }
    }
}
