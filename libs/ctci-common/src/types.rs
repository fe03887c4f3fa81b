use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Languages the runner knows how to build and launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    CSharp,
    Python,
    TypeScript,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::CSharp, Language::Python, Language::TypeScript];

    /// Folder name under a problem directory, also the key in languages.json
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::CSharp => "csharp",
            Language::Python => "python",
            Language::TypeScript => "typescript",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.as_str() == lowered)
            .ok_or_else(|| {
                format!(
                    "Language must be one of: {}",
                    Language::ALL.map(|l| l.as_str()).join(", ")
                )
            })
    }
}

/// One recorded case from a fixture file.
///
/// Built by the fixture parser and consumed by the harness; fields are read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    inputs: Vec<String>,
    expected: String,
}

impl TestCase {
    pub fn new(inputs: Vec<String>, expected: impl Into<String>) -> Self {
        Self {
            inputs,
            expected: expected.into(),
        }
    }

    /// Lines delivered to the solution's stdin, in order
    pub fn inputs(&self) -> &[String] {
        &self.inputs
    }

    pub fn expected(&self) -> &str {
        &self.expected
    }

    pub fn into_expected(self) -> String {
        self.expected
    }
}

/// Outcome of a single case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail { expected: String, actual: String },
    Crash { exit_code: i32, stderr: String },
    Timeout { limit_ms: u64, stderr: String },
}

impl Verdict {
    /// Crashes and timeouts stop the run; remaining cases are skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Verdict::Crash { .. } | Verdict::Timeout { .. })
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Fail { .. } => "FAIL",
            Verdict::Crash { .. } => "CRASH",
            Verdict::Timeout { .. } => "TIMEOUT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseResult {
    /// 1-based position in the fixture
    pub number: usize,
    #[serde(flatten)]
    pub verdict: Verdict,
    pub elapsed_ms: u64,
}

/// Verdicts for one run, in fixture order.
///
/// `results` may be shorter than `total` when a fatal verdict aborted the run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub total: usize,
    pub results: Vec<CaseResult>,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.verdict.is_pass()).count()
    }

    pub fn attempted(&self) -> usize {
        self.results.len()
    }

    pub fn skipped(&self) -> usize {
        self.total - self.attempted()
    }

    pub fn aborted(&self) -> bool {
        self.results.last().is_some_and(|r| r.verdict.is_fatal())
    }

    pub fn all_passed(&self) -> bool {
        self.passed() == self.total
    }
}
