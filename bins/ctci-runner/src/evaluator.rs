/// Case Evaluator - Language-Agnostic Verdict Logic
///
/// **Core Responsibility:**
/// Turn the raw output of one solution process into a verdict for its test case.
///
/// **Critical Properties:**
/// - Knows nothing about processes or toolchains
/// - Pure function: (test case, process output) → verdict
///
/// **Verdict Rules (in priority order):**
/// - Timed out → TIMEOUT
/// - Non-zero exit code → CRASH (captured stderr kept)
/// - Trimmed stdout equals trimmed expected → PASS
/// - Otherwise → FAIL (expected and raw stdout kept)
///
/// **Normalization Rules:**
/// - Trim leading and trailing whitespace: YES
/// - Internal whitespace and case: preserved, exact match required
use crate::engine::ProcessOutput;
use ctci_common::types::{CaseResult, TestCase, Verdict};

/// Normalize output string for comparison
///
/// Removes leading/trailing whitespace, which also absorbs `\r\n` vs `\n`
/// differences at the end of the output. Empty lines inside the content stay.
pub fn normalize_output(output: &str) -> &str {
    output.trim()
}

/// Evaluate a single case.
///
/// `number` is the case's 1-based position in the fixture.
pub fn evaluate_case(
    number: usize,
    case: TestCase,
    output: ProcessOutput,
    timeout_ms: u64,
) -> CaseResult {
    let elapsed_ms = output.elapsed.as_millis() as u64;

    let verdict = if output.timed_out {
        Verdict::Timeout {
            limit_ms: timeout_ms,
            stderr: output.stderr,
        }
    } else if output.exit_code != 0 {
        Verdict::Crash {
            exit_code: output.exit_code,
            stderr: output.stderr,
        }
    } else if normalize_output(case.expected()) == normalize_output(&output.stdout) {
        Verdict::Pass
    } else {
        Verdict::Fail {
            expected: case.into_expected(),
            actual: output.stdout,
        }
    };

    CaseResult {
        number,
        verdict,
        elapsed_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    /// Helper to create a test case
    fn make_case(expected: &str) -> TestCase {
        TestCase::new(vec!["input".to_string()], expected)
    }

    /// Helper to create a clean exit with the given stdout
    fn make_output(stdout: &str) -> ProcessOutput {
        ProcessOutput {
            exit_code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
            timed_out: false,
            elapsed: Duration::from_millis(42),
        }
    }

    #[test]
    fn test_normalize_output() {
        assert_eq!(normalize_output("hello"), "hello");
        assert_eq!(normalize_output("  hello  "), "hello");
        assert_eq!(normalize_output("hello\r\n"), "hello");
        assert_eq!(normalize_output("\nhello\n"), "hello");
        assert_eq!(normalize_output("  hello world  \n"), "hello world");
        assert_eq!(normalize_output("   "), "");
    }

    #[test]
    fn test_exact_match_passes() {
        let result = evaluate_case(1, make_case("120"), make_output("120"), 0);

        assert_eq!(result.verdict, Verdict::Pass);
        assert_eq!(result.number, 1);
        assert_eq!(result.elapsed_ms, 42);
    }

    #[test]
    fn test_surrounding_whitespace_passes() {
        let result = evaluate_case(1, make_case("x"), make_output(" x \n"), 0);
        assert_eq!(result.verdict, Verdict::Pass);
    }

    #[test]
    fn test_whitespace_in_expected_is_trimmed_too() {
        let result = evaluate_case(1, make_case("  x\t"), make_output("x\n"), 0);
        assert_eq!(result.verdict, Verdict::Pass);
    }

    #[test]
    fn test_internal_difference_fails() {
        let result = evaluate_case(3, make_case("x"), make_output("x y"), 0);

        assert_eq!(
            result.verdict,
            Verdict::Fail {
                expected: "x".to_string(),
                actual: "x y".to_string(),
            }
        );
        assert_eq!(result.number, 3);
    }

    #[test]
    fn test_case_sensitivity() {
        let result = evaluate_case(1, make_case("Hello"), make_output("hello\n"), 0);
        assert!(matches!(result.verdict, Verdict::Fail { .. }));
    }

    #[test]
    fn test_multiline_output_keeps_internal_newlines() {
        let result = evaluate_case(1, make_case("line1"), make_output("line1\nline2\n"), 0);
        assert!(matches!(result.verdict, Verdict::Fail { .. }));
    }

    #[test]
    fn test_empty_expected_matches_blank_output() {
        let result = evaluate_case(1, make_case(""), make_output("   \n"), 0);
        assert_eq!(result.verdict, Verdict::Pass);
    }

    #[test]
    fn test_non_zero_exit_is_crash_even_with_matching_stdout() {
        let output = ProcessOutput {
            exit_code: 1,
            stdout: "120".to_string(),
            stderr: "Unhandled exception".to_string(),
            ..make_output("")
        };

        let result = evaluate_case(2, make_case("120"), output, 0);

        assert_eq!(
            result.verdict,
            Verdict::Crash {
                exit_code: 1,
                stderr: "Unhandled exception".to_string(),
            }
        );
        assert!(result.verdict.is_fatal());
    }

    #[test]
    fn test_timeout_takes_priority() {
        let output = ProcessOutput {
            exit_code: -1,
            stdout: String::new(),
            stderr: "[Execution timed out]".to_string(),
            timed_out: true,
            elapsed: Duration::from_millis(1001),
        };

        let result = evaluate_case(1, make_case("output"), output, 1000);

        assert_eq!(
            result.verdict,
            Verdict::Timeout {
                limit_ms: 1000,
                stderr: "[Execution timed out]".to_string(),
            }
        );
        assert_eq!(result.elapsed_ms, 1001);
    }
}
