/// Process Engine - Launch Solutions and Exchange Standard Streams
///
/// **Core Responsibility:**
/// Start one solution process per test case, feed it the case's input lines,
/// and capture its exit code, stdout and stderr.
///
/// **Architectural Boundary:**
/// - Engine knows HOW to run a process (command, working directory, pipes)
/// - Engine does NOT compare outputs or assign verdicts
/// - Engine returns raw outputs for the Evaluator to judge
///
/// **Stream Handling:**
/// stdin is written from its own future while stdout and stderr are drained
/// concurrently, so a child that prints before consuming all of its input
/// cannot fill a pipe buffer and stall the run.
use ctci_common::error::HarnessError;
use std::fmt;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Raw result of one solution process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub elapsed: Duration,
}

/// Capability to run a solution once against a set of input lines.
///
/// The harness only depends on this trait, so tests can substitute scripted launchers.
pub trait Launcher {
    /// Limit applied to each launch, if any
    fn timeout(&self) -> Option<Duration> {
        None
    }

    async fn launch(&self, inputs: &[String]) -> Result<ProcessOutput, HarnessError>;
}

/// Program, arguments and working directory for a solution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl LaunchCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: working_dir.into(),
        }
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Launcher backed by real child processes
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    command: LaunchCommand,
    timeout: Option<Duration>,
}

impl ProcessLauncher {
    pub fn new(command: LaunchCommand) -> Self {
        Self {
            command,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &LaunchCommand {
        &self.command
    }

    fn io_error(&self, source: std::io::Error) -> HarnessError {
        HarnessError::Io {
            command: self.command.to_string(),
            source,
        }
    }
}

/// Each line is terminated with `\n`, including the last one
fn encode_input(inputs: &[String]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(inputs.iter().map(|l| l.len() + 1).sum());
    for line in inputs {
        payload.extend_from_slice(line.as_bytes());
        payload.push(b'\n');
    }
    payload
}

/// Exit code, or -1 with a note in stderr when the process died from a signal
fn classify_exit(status: ExitStatus, stderr: &mut String) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            let note = match signal {
                9 => " (killed)",
                11 => " (segmentation fault)",
                _ => "",
            };
            stderr.push_str(&format!("\n[terminated by signal {}{}]", signal, note));
        }
    }
    #[cfg(not(unix))]
    let _ = stderr;

    -1
}

impl Launcher for ProcessLauncher {
    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    #[instrument(skip(self, inputs), fields(command = %self.command, input_lines = inputs.len()))]
    async fn launch(&self, inputs: &[String]) -> Result<ProcessOutput, HarnessError> {
        let start_time = Instant::now();

        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .current_dir(&self.command.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| HarnessError::ProcessLaunch {
                command: self.command.to_string(),
                source,
            })?;

        let missing = |stream: &str| {
            self.io_error(std::io::Error::new(
                ErrorKind::Other,
                format!("child {} was not captured", stream),
            ))
        };
        let mut stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
        let mut stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
        let mut stderr = child.stderr.take().ok_or_else(|| missing("stderr"))?;

        let payload = encode_input(inputs);

        let feed = async move {
            let written = stdin.write_all(&payload).await;
            // Dropping stdin closes the pipe and signals end of input
            drop(stdin);
            match written {
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!("Child closed stdin before reading all input");
                    Ok(())
                }
                other => other,
            }
        };
        let drain_stdout = async {
            let mut buf = Vec::new();
            stdout.read_to_end(&mut buf).await.map(|_| buf)
        };
        let drain_stderr = async {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf).await.map(|_| buf)
        };

        let exchange = async {
            let (fed, out, err) = tokio::join!(feed, drain_stdout, drain_stderr);
            fed?;
            let (out, err) = (out?, err?);
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, out, err))
        };

        let exchanged = match self.timeout {
            None => exchange.await,
            Some(limit) => {
                let bounded = tokio::time::timeout(limit, exchange).await;
                match bounded {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(
                            timeout_ms = limit.as_millis() as u64,
                            "Solution timed out - killing process"
                        );
                        if let Err(e) = child.kill().await {
                            warn!(error = %e, "Failed to kill timed-out process");
                        }
                        return Ok(ProcessOutput {
                            exit_code: -1,
                            stdout: String::new(),
                            stderr: "[Execution timed out]".to_string(),
                            timed_out: true,
                            elapsed: start_time.elapsed(),
                        });
                    }
                }
            }
        };

        let (status, out, err) = exchanged.map_err(|e| self.io_error(e))?;
        let mut stderr = String::from_utf8_lossy(&err).into_owned();
        let exit_code = classify_exit(status, &mut stderr);
        let elapsed = start_time.elapsed();

        debug!(
            exit_code,
            elapsed_ms = elapsed.as_millis() as u64,
            stdout_bytes = out.len(),
            stderr_bytes = stderr.len(),
            "Solution exited"
        );

        Ok(ProcessOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&out).into_owned(),
            stderr,
            timed_out: false,
            elapsed,
        })
    }
}
