/// Toolchains - Turn a Language Folder into a Launch Command
///
/// Each language recipe comes from the languages.json table:
/// 1. Verify the entry file exists (interpreted languages)
/// 2. Run the build step and locate its artifact (compiled languages)
/// 3. Expand `{entry}` / `{artifact}` in the execution arguments
///
/// Build failures stop the run before any test case executes.
use crate::config::{BuildStep, LanguageConfig, ARTIFACT_PLACEHOLDER, ENTRY_PLACEHOLDER};
use crate::engine::{LaunchCommand, Launcher, ProcessLauncher};
use anyhow::{bail, Context, Result};
use ctci_common::types::Language;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Prepare the command that runs `language`'s solution in `language_folder`
pub async fn prepare(
    language: Language,
    config: &LanguageConfig,
    language_folder: &Path,
) -> Result<LaunchCommand> {
    let entry = match &config.entry_file {
        Some(entry) => {
            if !language_folder.join(entry).is_file() {
                bail!("{} not found in {}", entry, language_folder.display());
            }
            Some(entry.clone())
        }
        None => None,
    };

    let artifact = match &config.build {
        Some(build) => Some(build_project(language, build, language_folder).await?),
        None => None,
    };

    let args = expand_args(&config.execution.args, entry.as_deref(), artifact.as_deref())?;
    let (program, args) = if config.execution.windows_shell && cfg!(windows) {
        let mut wrapped = vec!["/c".to_string(), config.execution.command.clone()];
        wrapped.extend(args);
        ("cmd.exe".to_string(), wrapped)
    } else {
        (config.execution.command.clone(), args)
    };

    Ok(LaunchCommand::new(program, args, language_folder))
}

/// Replace placeholders in execution arguments
pub fn expand_args(args: &[String], entry: Option<&str>, artifact: Option<&Path>) -> Result<Vec<String>> {
    args.iter()
        .map(|arg| {
            let mut expanded = arg.clone();
            if expanded.contains(ENTRY_PLACEHOLDER) {
                let Some(entry) = entry else {
                    bail!("{} used but the language has no entry_file", ENTRY_PLACEHOLDER);
                };
                expanded = expanded.replace(ENTRY_PLACEHOLDER, entry);
            }
            if expanded.contains(ARTIFACT_PLACEHOLDER) {
                let Some(artifact) = artifact else {
                    bail!("{} used but the language has no build step", ARTIFACT_PLACEHOLDER);
                };
                expanded = expanded.replace(ARTIFACT_PLACEHOLDER, &artifact.to_string_lossy());
            }
            Ok(expanded)
        })
        .collect()
}

/// Run the build step and return the path of the produced artifact
async fn build_project(language: Language, build: &BuildStep, language_folder: &Path) -> Result<PathBuf> {
    let project = find_project_file(language_folder, &build.project_extension)?;
    let Some(project) = project else {
        bail!("No .{} found in {}", build.project_extension, language_folder.display());
    };

    println!("Building {} project...", language);
    info!(project = %project.display(), command = %build.command, "Building project");

    let command = LaunchCommand::new(build.command.clone(), build.args.clone(), language_folder);
    let output = ProcessLauncher::new(command.clone())
        .launch(&[])
        .await
        .with_context(|| format!("Failed to run build command `{}`", command))?;

    if output.exit_code != 0 {
        warn!(exit_code = output.exit_code, "Build failed");
        // Some toolchains report compile errors on stdout
        let diagnostics = if output.stderr.trim().is_empty() {
            output.stdout
        } else {
            output.stderr
        };
        bail!("Build failed:\n{}", diagnostics.trim_end());
    }

    println!("Build succeeded.");

    let artifact_dir = language_folder.join(&build.artifact_dir);
    if !artifact_dir.is_dir() {
        bail!("Build output folder not found: {}", artifact_dir.display());
    }

    match find_artifact(&artifact_dir, &build.artifact_extension, build.exclude_suffix.as_deref()) {
        Some(artifact) => {
            info!(artifact = %artifact.display(), "Located build artifact");
            Ok(artifact)
        }
        None => bail!(
            "Compiled .{} not found under {}",
            build.artifact_extension,
            artifact_dir.display()
        ),
    }
}

/// First file directly inside `folder` with the given extension
fn find_project_file(folder: &Path, extension: &str) -> Result<Option<PathBuf>> {
    let mut projects = Vec::new();
    for entry in fs::read_dir(folder).with_context(|| format!("Failed to list {}", folder.display()))? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            projects.push(path);
        }
    }
    projects.sort();
    Ok(projects.into_iter().next())
}

/// First matching file under `dir`, searched recursively in path order
pub fn find_artifact(dir: &Path, extension: &str, exclude_suffix: Option<&str>) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == extension))
        .filter(|path| {
            let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
            exclude_suffix.map_or(true, |suffix| !name.ends_with(suffix))
        })
        .collect();
    candidates.sort();
    candidates.into_iter().next()
}
