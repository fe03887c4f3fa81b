// Problem discovery: <root>/problems/ChNN_<name>/NN_<name>/tests.txt
use anyhow::{bail, Context, Result};
use ctci_common::fixture;
use ctci_common::types::TestCase;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

pub const FIXTURE_FILE: &str = "tests.txt";

/// `<chapter>.<problem>`, both positive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemId {
    pub chapter: u32,
    pub problem: u32,
}

impl FromStr for ProblemId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || "Problem must be in format <chapter.problem>".to_string();

        let (chapter, problem) = s.split_once('.').ok_or_else(invalid)?;
        let chapter: u32 = chapter.trim().parse().map_err(|_| invalid())?;
        let problem: u32 = problem.trim().parse().map_err(|_| invalid())?;
        if chapter == 0 || problem == 0 {
            return Err(invalid());
        }

        Ok(Self { chapter, problem })
    }
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.chapter, self.problem)
    }
}

/// First subdirectory (by name) whose name starts with `prefix`
fn find_prefixed_dir(parent: &Path, prefix: &str) -> Result<Option<PathBuf>> {
    let mut matches = Vec::new();
    for entry in fs::read_dir(parent).with_context(|| format!("Failed to list {}", parent.display()))? {
        let entry = entry?;
        // Follows symlinks
        let path = entry.path();
        if path.is_dir() && entry.file_name().to_string_lossy().starts_with(prefix) {
            matches.push(path);
        }
    }
    matches.sort();
    Ok(matches.into_iter().next())
}

/// Resolve the folder holding a problem's fixture and per-language solutions
pub fn resolve_problem_folder(problems_dir: &Path, id: ProblemId) -> Result<PathBuf> {
    if !problems_dir.is_dir() {
        bail!("Problems directory not found: {}", problems_dir.display());
    }

    let chapter_prefix = format!("Ch{:02}_", id.chapter);
    let chapter_folder = match find_prefixed_dir(problems_dir, &chapter_prefix)? {
        Some(folder) => folder,
        None => bail!("Chapter folder not found: no {}* in {}", chapter_prefix, problems_dir.display()),
    };
    debug!(folder = %chapter_folder.display(), "Resolved chapter folder");

    let problem_prefix = format!("{:02}_", id.problem);
    match find_prefixed_dir(&chapter_folder, &problem_prefix)? {
        Some(folder) => Ok(folder),
        None => bail!("Problem folder not found: no {}* in {}", problem_prefix, chapter_folder.display()),
    }
}

/// Read and parse `tests.txt` from a problem folder
pub fn load_fixture(problem_folder: &Path) -> Result<Vec<TestCase>> {
    let path = problem_folder.join(FIXTURE_FILE);
    if !path.is_file() {
        bail!("{} not found in {}", FIXTURE_FILE, problem_folder.display());
    }

    // Decoded like solution output: invalid UTF-8 becomes U+FFFD
    let bytes = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let cases = fixture::parse(&text).with_context(|| format!("Invalid fixture {}", path.display()))?;
    Ok(cases)
}
