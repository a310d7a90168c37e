//! Flow command-line contract.
//!
//! The orchestrator only sees [`AnalysisTool`]; [`FlowCli`] maps each
//! operation onto a `flow` subcommand.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, info};

use crate::coverage::{CoverageReport, ExpressionCounts};
use crate::error::{CoverageError, CoverageResult};
use crate::process;

/// `flow start` exits with this status when a server is already up.
pub const ALREADY_RUNNING_EXIT_CODE: i32 = 11;

/// Where the `flow-bin` package installs its launcher.
pub const NODE_MODULES_FLOW: &str = "node_modules/.bin/flow";

pub trait AnalysisTool {
    /// Start the background server and wait until it is ready.
    fn start(&self) -> CoverageResult<()>;

    /// Files the tool considers part of the project.
    fn ls(&self) -> CoverageResult<Vec<String>>;

    /// Expression counts for a single file.
    fn coverage(&self, path: &str) -> CoverageResult<ExpressionCounts>;
}

#[derive(Debug, Clone)]
pub struct FlowCli {
    bin: PathBuf,
}

impl FlowCli {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    pub fn bin(&self) -> &Path {
        &self.bin
    }
}

impl AnalysisTool for FlowCli {
    fn start(&self) -> CoverageResult<()> {
        match process::run(&self.bin, &["start", "--wait"]) {
            Ok(_) => {
                info!("flow server started");
                Ok(())
            }
            Err(err) if is_already_running(&err) => {
                debug!("flow server already running");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    fn ls(&self) -> CoverageResult<Vec<String>> {
        process::run_json(&self.bin, &["ls"])
    }

    fn coverage(&self, path: &str) -> CoverageResult<ExpressionCounts> {
        let report: CoverageReport = process::run_json(&self.bin, &["coverage", path])?;
        Ok(report.expressions)
    }
}

fn is_already_running(err: &CoverageError) -> bool {
    matches!(
        err,
        CoverageError::ExternalProcess {
            code: Some(ALREADY_RUNNING_EXIT_CODE),
            ..
        }
    )
}

/// Resolve the flow binary.
///
/// An explicit path wins; otherwise the project-local `flow-bin` launcher
/// under `root`, then `flow` on `PATH`.
pub fn locate_flow(explicit: Option<&Path>, root: &Path) -> anyhow::Result<PathBuf> {
    if let Some(bin) = explicit {
        debug!(bin = %bin.display(), "using configured flow binary");
        return Ok(bin.to_path_buf());
    }

    let local = root.join(NODE_MODULES_FLOW);
    if local.is_file() {
        debug!(bin = %local.display(), "found project-local flow binary");
        return Ok(local);
    }

    let bin = which::which("flow")
        .context("flow not found in node_modules/.bin or PATH; install flow-bin or pass --flow-bin")?;
    debug!(bin = %bin.display(), "found flow on PATH");
    Ok(bin)
}
