//! Per-file coverage figures and the running totals they reduce into.

use serde::Deserialize;

/// Percentage of covered expressions.
///
/// Yields NaN when both counts are zero. Callers carry the NaN through
/// instead of coercing it.
pub fn compute_coverage(covered: u64, uncovered: u64) -> f64 {
    100.0 * (covered as f64 / (covered + uncovered) as f64)
}

/// Round to the nearest integer (halves away from zero) for display.
pub fn format_percentage(percentage: f64) -> String {
    if percentage.is_nan() {
        return "NaN".to_string();
    }
    format!("{:.0}", percentage.round())
}

/// The `expressions` section of `flow coverage --json`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ExpressionCounts {
    pub covered_count: u64,
    pub uncovered_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CoverageReport {
    pub expressions: ExpressionCounts,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileCoverage {
    pub path: String,
    pub covered_count: u64,
    pub uncovered_count: u64,
    pub percentage: f64,
}

impl FileCoverage {
    pub fn new(path: impl Into<String>, counts: ExpressionCounts) -> Self {
        Self {
            path: path.into(),
            covered_count: counts.covered_count,
            uncovered_count: counts.uncovered_count,
            percentage: compute_coverage(counts.covered_count, counts.uncovered_count),
        }
    }

    /// The `<percentage>\t<path>` report line, without newline.
    pub fn report_line(&self) -> String {
        format!("{}\t{}", format_percentage(self.percentage), self.path)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub total_covered: u64,
    pub total_uncovered: u64,
}

impl RunTotals {
    pub fn add(&mut self, result: &FileCoverage) {
        self.total_covered += result.covered_count;
        self.total_uncovered += result.uncovered_count;
    }

    pub fn percentage(&self) -> f64 {
        compute_coverage(self.total_covered, self.total_uncovered)
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn compute_coverage__mixed_counts__then_ratio_times_hundred() {
        assert_eq!(compute_coverage(150, 50), 75.0);
        assert_eq!(compute_coverage(1, 2), 100.0 * (1.0 / 3.0));
    }

    #[test]
    fn compute_coverage__no_uncovered__then_hundred() {
        assert_eq!(compute_coverage(42, 0), 100.0);
    }

    #[test]
    fn compute_coverage__no_covered__then_zero() {
        assert_eq!(compute_coverage(0, 42), 0.0);
    }

    #[test]
    fn compute_coverage__no_expressions__then_nan() {
        assert!(compute_coverage(0, 0).is_nan());
    }

    #[test]
    fn compute_coverage__more_covered__then_monotonic() {
        for uncovered in [1u64, 7, 100] {
            let mut previous = compute_coverage(0, uncovered);
            for covered in 1..50u64 {
                let current = compute_coverage(covered, uncovered);
                assert!(current > previous);
                assert!(compute_coverage(covered, uncovered + 1) < current);
                previous = current;
            }
        }
    }

    #[test]
    fn format_percentage__halves__then_round_away_from_zero() {
        assert_eq!(format_percentage(74.5), "75");
        assert_eq!(format_percentage(74.49), "74");
        assert_eq!(format_percentage(0.5), "1");
        assert_eq!(format_percentage(100.0), "100");
        assert_eq!(format_percentage(0.0), "0");
    }

    #[test]
    fn format_percentage__nan__then_literal_nan() {
        assert_eq!(format_percentage(f64::NAN), "NaN");
    }

    #[test]
    fn coverage_report__flow_json__then_ignores_extra_fields() {
        let json = r#"{"expressions":{"covered_count":3,"uncovered_count":1,"uncovered_locs":[]}}"#;
        let report: CoverageReport = serde_json::from_str(json).unwrap();
        assert_eq!(
            report.expressions,
            ExpressionCounts {
                covered_count: 3,
                uncovered_count: 1
            }
        );
    }

    #[test]
    fn coverage_report__missing_expressions__then_parse_error() {
        assert!(serde_json::from_str::<CoverageReport>(r#"{"files":[]}"#).is_err());
    }

    #[test]
    fn file_coverage__report_line__then_tab_separated() {
        let result = FileCoverage::new(
            "src/a.js",
            ExpressionCounts {
                covered_count: 2,
                uncovered_count: 1,
            },
        );
        assert_eq!(result.report_line(), "67\tsrc/a.js");
    }

    #[test]
    fn run_totals__add__then_sums_counts_regardless_of_order() {
        let a = FileCoverage::new("a", ExpressionCounts { covered_count: 50, uncovered_count: 50 });
        let b = FileCoverage::new("b", ExpressionCounts { covered_count: 100, uncovered_count: 0 });

        let mut forward = RunTotals::default();
        forward.add(&a);
        forward.add(&b);
        let mut backward = RunTotals::default();
        backward.add(&b);
        backward.add(&a);

        assert_eq!(forward, backward);
        assert_eq!(forward.percentage(), 75.0);
    }

    #[test]
    fn run_totals__empty_file_contributes_nothing__then_nan_free_total() {
        let empty = FileCoverage::new("empty.js", ExpressionCounts::default());
        let full = FileCoverage::new("full.js", ExpressionCounts { covered_count: 9, uncovered_count: 1 });
        assert!(empty.percentage.is_nan());

        let mut totals = RunTotals::default();
        totals.add(&empty);
        totals.add(&full);
        assert_eq!(totals.percentage(), 90.0);
    }
}
