// Harness configuration resolved from the environment.
// Command-line flags override these values in the runner.

use crate::error::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

pub const ROOT_VAR: &str = "CTCI_ROOT";
pub const TIMEOUT_VAR: &str = "CTCI_TIMEOUT_MS";
pub const LANGUAGES_VAR: &str = "CTCI_LANGUAGES";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Repository root holding `problems/`; defaults to the parent of the working directory
    pub root: Option<PathBuf>,
    /// Per-case limit; `None` waits for the child indefinitely
    pub case_timeout: Option<Duration>,
    /// Replacement for the built-in languages.json table
    pub languages_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve using an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let root = non_empty_path(ROOT_VAR, lookup(ROOT_VAR))?;
        let languages_path = non_empty_path(LANGUAGES_VAR, lookup(LANGUAGES_VAR))?;
        let case_timeout = match lookup(TIMEOUT_VAR) {
            Some(raw) => Some(parse_timeout_ms(TIMEOUT_VAR, &raw)?),
            None => None,
        };

        Ok(Self {
            root,
            case_timeout,
            languages_path,
        })
    }

    pub fn root_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(root) = &self.root {
            return Ok(root.clone());
        }
        let cwd = std::env::current_dir().map_err(|e| ConfigError::NoRoot(e.to_string()))?;
        cwd.parent()
            .map(|p| p.to_path_buf())
            .ok_or_else(|| ConfigError::NoRoot(format!("{} has no parent", cwd.display())))
    }

    pub fn problems_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.root_dir()?.join("problems"))
    }
}

fn non_empty_path(key: &'static str, value: Option<String>) -> Result<Option<PathBuf>, ConfigError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(ConfigError::EmptyValue { key }),
        Some(v) => Ok(Some(PathBuf::from(v))),
        None => Ok(None),
    }
}

/// Milliseconds, strictly positive
pub fn parse_timeout_ms(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: raw.to_string(),
        }),
    }
}
