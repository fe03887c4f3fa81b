use std::io;

/// A fixture file that does not follow the line-counted grammar.
///
/// Case and line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FixtureError {
    #[error("malformed fixture: file is empty")]
    Empty,

    #[error("malformed fixture: invalid test count {value:?} on line 1")]
    InvalidTestCount { value: String },

    #[error("malformed fixture: missing input line count for case {case} (line {line})")]
    MissingInputCount { case: usize, line: usize },

    #[error("malformed fixture: invalid input line count {value:?} for case {case} (line {line})")]
    InvalidInputCount {
        case: usize,
        line: usize,
        value: String,
    },

    #[error("malformed fixture: case {case} declares {declared} input lines but only {found} remain")]
    TruncatedInputs {
        case: usize,
        declared: usize,
        found: usize,
    },

    #[error("malformed fixture: missing expected output for case {case} (line {line})")]
    MissingExpected { case: usize, line: usize },
}

/// Errors that stop a run before or during execution
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("failed to launch `{command}`: {source}")]
    ProcessLaunch {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while talking to `{command}`: {source}")]
    Io {
        command: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} must not be empty")]
    EmptyValue { key: &'static str },

    #[error("cannot determine root directory: {0}")]
    NoRoot(String),
}
