/// Run Executor - Sequential Orchestration
///
/// **Responsibility:**
/// Drive a Launcher over every test case in fixture order and collect verdicts.
///
/// **Run Rules:**
/// 1. One process per case, one case at a time
/// 2. Launch failures abort the run with an error, nothing is reported
/// 3. A CRASH or TIMEOUT verdict is recorded and the remaining cases are skipped
/// 4. FAIL verdicts are recorded and the run continues
///
/// This module is the glue layer - it knows nothing about:
/// - How processes are started (engine's job)
/// - How outputs are compared (evaluator's job)
use crate::engine::Launcher;
use crate::evaluator;
use ctci_common::error::HarnessError;
use ctci_common::types::{RunReport, TestCase};
use tracing::{debug, info, instrument, warn};

#[instrument(skip(cases, launcher), fields(test_count = cases.len()))]
pub async fn run_cases<L: Launcher>(
    cases: Vec<TestCase>,
    launcher: &L,
) -> Result<RunReport, HarnessError> {
    let total = cases.len();
    let timeout_ms = launcher.timeout().map_or(0, |t| t.as_millis() as u64);
    let mut results = Vec::with_capacity(total);

    for (idx, case) in cases.into_iter().enumerate() {
        let number = idx + 1;
        debug!(case = number, input_lines = case.inputs().len(), "Executing test");

        let output = launcher.launch(case.inputs()).await?;
        let result = evaluator::evaluate_case(number, case, output, timeout_ms);
        let fatal = result.verdict.is_fatal();

        debug!(
            case = number,
            verdict = result.verdict.label(),
            elapsed_ms = result.elapsed_ms,
            "Test evaluated"
        );
        results.push(result);

        if fatal {
            warn!(
                case = number,
                skipped = total - number,
                "Solution did not exit cleanly; aborting remaining tests"
            );
            break;
        }
    }

    let report = RunReport { total, results };

    info!(
        passed = report.passed(),
        attempted = report.attempted(),
        total,
        aborted = report.aborted(),
        "Run complete"
    );

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ProcessOutput;
    use ctci_common::types::Verdict;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Launcher that replays canned outputs and records the inputs it was given
    struct ScriptedLauncher {
        outputs: Mutex<VecDeque<Result<ProcessOutput, HarnessError>>>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl ScriptedLauncher {
        fn new(outputs: Vec<Result<ProcessOutput, HarnessError>>) -> Self {
            Self {
                outputs: Mutex::new(outputs.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Launcher for ScriptedLauncher {
        async fn launch(&self, inputs: &[String]) -> Result<ProcessOutput, HarnessError> {
            self.calls.lock().unwrap().push(inputs.to_vec());
            self.outputs
                .lock()
                .unwrap()
                .pop_front()
                .expect("launcher called more often than scripted")
        }
    }

    fn case(input: &str, expected: &str) -> TestCase {
        TestCase::new(vec![input.to_string()], expected)
    }

    fn exited(code: i32, stdout: &str, stderr: &str) -> Result<ProcessOutput, HarnessError> {
        Ok(ProcessOutput {
            exit_code: code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            timed_out: false,
            elapsed: Duration::from_millis(5),
        })
    }

    #[tokio::test]
    async fn test_all_pass() {
        let launcher = ScriptedLauncher::new(vec![exited(0, "true\n", ""), exited(0, "false\n", "")]);

        let report = run_cases(vec![case("abc", "true"), case("aa", "false")], &launcher)
            .await
            .unwrap();

        assert_eq!(report.passed(), 2);
        assert_eq!(report.attempted(), 2);
        assert!(report.all_passed());
        assert_eq!(launcher.calls(), vec![vec!["abc".to_string()], vec!["aa".to_string()]]);
    }

    #[tokio::test]
    async fn test_mismatch_continues_to_next_case() {
        let launcher = ScriptedLauncher::new(vec![exited(0, "wrong", ""), exited(0, "right", "")]);

        let report = run_cases(vec![case("1", "right"), case("2", "right")], &launcher)
            .await
            .unwrap();

        assert_eq!(report.attempted(), 2);
        assert_eq!(report.passed(), 1);
        assert!(!report.aborted());
        assert_eq!(report.results[0].verdict.label(), "FAIL");
        assert_eq!(report.results[1].verdict, Verdict::Pass);
    }

    #[tokio::test]
    async fn test_crash_short_circuits_remaining_cases() {
        let launcher = ScriptedLauncher::new(vec![
            exited(0, "one", ""),
            exited(134, "", "Unhandled exception"),
            exited(0, "three", ""),
        ]);

        let report = run_cases(
            vec![case("1", "one"), case("2", "two"), case("3", "three")],
            &launcher,
        )
        .await
        .unwrap();

        let crashes: Vec<_> = report
            .results
            .iter()
            .filter(|r| matches!(r.verdict, Verdict::Crash { .. }))
            .collect();
        assert_eq!(crashes.len(), 1);
        assert_eq!(crashes[0].number, 2);
        assert!(report.results.iter().all(|r| r.number != 3));
        assert_eq!(launcher.calls().len(), 2);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.attempted(), 2);
        assert_eq!(report.skipped(), 1);
        assert!(report.aborted());
    }

    #[tokio::test]
    async fn test_timeout_aborts_run() {
        let launcher = ScriptedLauncher::new(vec![Ok(ProcessOutput {
            exit_code: -1,
            stderr: "[Execution timed out]".to_string(),
            timed_out: true,
            ..ProcessOutput::default()
        })]);

        let report = run_cases(vec![case("1", "x"), case("2", "y")], &launcher)
            .await
            .unwrap();

        assert_eq!(report.attempted(), 1);
        assert!(matches!(report.results[0].verdict, Verdict::Timeout { .. }));
        assert!(report.aborted());
    }

    #[tokio::test]
    async fn test_launch_failure_propagates() {
        let launcher = ScriptedLauncher::new(vec![Err(HarnessError::ProcessLaunch {
            command: "python solution.py".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        })]);

        let err = run_cases(vec![case("1", "x"), case("2", "y")], &launcher)
            .await
            .unwrap_err();

        assert!(matches!(err, HarnessError::ProcessLaunch { .. }));
        assert_eq!(launcher.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_fixture_runs_nothing() {
        let launcher = ScriptedLauncher::new(vec![]);

        let report = run_cases(vec![], &launcher).await.unwrap();

        assert_eq!(report.total, 0);
        assert!(report.all_passed());
        assert!(launcher.calls().is_empty());
    }
}
