//! Drives a coverage run and streams the report.

use std::fmt;
use std::io::Write;

use tracing::{debug, info};

use crate::coverage::{format_percentage, FileCoverage, RunTotals};
use crate::enumerate::FileSource;
use crate::error::{CoverageResult, ThresholdNotMet};
use crate::flow::AnalysisTool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    ServiceStarting,
    Enumerating,
    /// Fetching the file at this index of the enumeration.
    Fetching(usize),
    Reported,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not started"),
            Self::ServiceStarting => write!(f, "starting service"),
            Self::Enumerating => write!(f, "enumerating"),
            Self::Fetching(index) => write!(f, "fetching #{index}"),
            Self::Reported => write!(f, "reported"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Totals of a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub totals: RunTotals,
    pub percentage: f64,
    pub files: usize,
}

impl Summary {
    /// NaN never falls below the threshold.
    pub fn check(&self, threshold: u32) -> Result<(), ThresholdNotMet> {
        if self.percentage < f64::from(threshold) {
            return Err(ThresholdNotMet {
                threshold,
                actual: format_percentage(self.percentage),
            });
        }
        Ok(())
    }
}

pub struct Aggregator<'a, T, S> {
    tool: &'a T,
    source: &'a S,
    phase: Phase,
}

impl<'a, T, S> Aggregator<'a, T, S>
where
    T: AnalysisTool,
    S: FileSource,
{
    pub fn new(tool: &'a T, source: &'a S) -> Self {
        Self {
            tool,
            source,
            phase: Phase::NotStarted,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Start the service, measure every file in order and write the report.
    ///
    /// Each file line is flushed as soon as it is known. The first failure
    /// aborts the run; lines already written stay written.
    pub fn run<W: Write>(&mut self, out: &mut W) -> CoverageResult<Summary> {
        self.advance(Phase::ServiceStarting);
        self.tool.start()?;

        self.advance(Phase::Enumerating);
        let files = self.source.files()?;
        info!(count = files.len(), "measuring files");

        let mut totals = RunTotals::default();
        for (index, path) in files.iter().enumerate() {
            self.advance(Phase::Fetching(index));
            let counts = self.tool.coverage(path)?;
            let result = FileCoverage::new(path.as_str(), counts);
            writeln!(out, "{}", result.report_line())?;
            out.flush()?;
            totals.add(&result);
        }

        let percentage = totals.percentage();
        writeln!(out, "{}\t(total)", format_percentage(percentage))?;
        out.flush()?;
        self.advance(Phase::Reported);

        let summary = Summary {
            totals,
            percentage,
            files: files.len(),
        };
        self.advance(Phase::Done);
        Ok(summary)
    }

    fn advance(&mut self, next: Phase) {
        debug!(from = %self.phase, to = %next, "phase");
        self.phase = next;
    }
}
