// Run reporting: one human-readable block per case plus a summary line,
// and an optional JSON document for tooling.
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use ctci_common::types::{CaseResult, Language, RunReport, Verdict};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use uuid::Uuid;

fn render_case(out: &mut String, result: &CaseResult) -> std::fmt::Result {
    let n = result.number;
    match &result.verdict {
        Verdict::Pass => writeln!(out, "Test {}: PASS", n),
        Verdict::Fail { expected, actual } => {
            writeln!(out, "Test {}: FAIL", n)?;
            writeln!(out, "Expected: '{}'", expected.trim())?;
            writeln!(out, "Actual:   '{}'", actual)
        }
        Verdict::Crash { exit_code, stderr } => {
            writeln!(out, "Test {}: CRASH (exit code {})", n, exit_code)?;
            if !stderr.trim().is_empty() {
                writeln!(out, "{}", stderr.trim_end())?;
            }
            Ok(())
        }
        Verdict::Timeout { limit_ms, .. } => writeln!(out, "Test {}: TIMEOUT ({}ms)", n, limit_ms),
    }
}

/// Summary line, e.g. `Passed 2/3 tests`
pub fn summary_line(report: &RunReport) -> String {
    let mut line = format!("Passed {}/{} tests", report.passed(), report.attempted());
    if report.aborted() && report.skipped() > 0 {
        line.push_str(&format!(" ({} skipped after abort)", report.skipped()));
    }
    line
}

/// Full human-readable report
pub fn render_human(report: &RunReport) -> String {
    let mut out = String::new();
    for result in &report.results {
        // Writing into a String cannot fail
        let _ = render_case(&mut out, result);
    }
    out.push_str(&summary_line(report));
    out.push('\n');
    out
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub attempted: usize,
    pub passed: usize,
    pub skipped: usize,
    pub aborted: bool,
}

/// Machine-readable run report
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub language: Language,
    pub problem: String,
    pub summary: Summary,
    pub results: &'a [CaseResult],
}

impl<'a> JsonReport<'a> {
    pub fn new(
        report: &'a RunReport,
        language: Language,
        problem: String,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at,
            language,
            problem,
            summary: Summary {
                total: report.total,
                attempted: report.attempted(),
                passed: report.passed(),
                skipped: report.skipped(),
                aborted: report.aborted(),
            },
            results: &report.results,
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }
}
