mod config;
mod engine;
mod evaluator;
mod executor;
mod locator;
mod report;
mod toolchain;


use anyhow::{bail, Result};
use chrono::Utc;
use clap::Parser;
use config::LanguageConfigManager;
use ctci_common::config::{parse_timeout_ms, Config};
use ctci_common::types::Language;
use engine::ProcessLauncher;
use locator::ProblemId;
use report::JsonReport;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "runner")]
#[command(about = "Run a problem's recorded tests against a solution", long_about = None)]
struct Cli {
    /// Solution language: csharp, python or typescript
    language: Language,

    /// Problem to run, as <chapter>.<problem> (e.g. 1.1)
    problem: ProblemId,

    /// Repository root containing problems/ (defaults to the parent directory)
    #[arg(long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Replacement languages.json recipe table
    #[arg(long, value_name = "FILE")]
    languages: Option<PathBuf>,

    /// Kill a solution that runs longer than this many milliseconds on one test
    #[arg(long = "timeout-ms", value_name = "MS", value_parser = parse_timeout)]
    timeout: Option<Duration>,

    /// Also write a JSON report to this file
    #[arg(long, value_name = "FILE")]
    json: Option<PathBuf>,
}

fn parse_timeout(raw: &str) -> Result<Duration, String> {
    parse_timeout_ms("--timeout-ms", raw).map_err(|e| e.to_string())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    // stdout carries the test report; logs go to stderr
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true);

    let json = std::env::var("CTCI_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing();

    let all_passed = run(cli).await?;
    Ok(if all_passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Resolve, build and test one problem. Returns whether every test passed.
async fn run(cli: Cli) -> Result<bool> {
    let started_at = Utc::now();

    let mut config = Config::from_env()?;
    if cli.root.is_some() {
        config.root = cli.root;
    }
    if cli.languages.is_some() {
        config.languages_path = cli.languages;
    }
    if cli.timeout.is_some() {
        config.case_timeout = cli.timeout;
    }
    debug!(?config, "Resolved configuration");

    let problems_dir = config.problems_dir()?;
    let problem_folder = locator::resolve_problem_folder(&problems_dir, cli.problem)?;
    println!("Resolved problem folder: {}", problem_folder.display());

    let cases = locator::load_fixture(&problem_folder)?;
    println!("Loaded {} tests.", cases.len());

    let language_folder = problem_folder.join(cli.language.as_str());
    if !language_folder.is_dir() {
        bail!("Language folder '{}' not found.", cli.language);
    }

    let config_manager = LanguageConfigManager::load_or_builtin(config.languages_path.as_deref())?;
    info!(languages = ?config_manager.list_languages(), "Loaded language recipes");

    let recipe = config_manager.get_config(&cli.language)?;
    let command = toolchain::prepare(cli.language, recipe, &language_folder).await?;

    let launcher = ProcessLauncher::new(command).with_timeout(config.case_timeout);
    info!(
        language = %cli.language,
        problem = %cli.problem,
        command = %launcher.command(),
        "Running tests"
    );

    let report = executor::run_cases(cases, &launcher).await?;
    print!("{}", report::render_human(&report));

    if let Some(path) = cli.json {
        JsonReport::new(&report, cli.language, cli.problem.to_string(), started_at).write_to(&path)?;
        info!(path = %path.display(), "Wrote JSON report");
    }

    Ok(report.all_passed())
}
