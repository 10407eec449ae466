/// Execution Engine - Abstraction for Code Evaluation
///
/// **Core Responsibility:**
/// Run a submitted `solve(input)` function against one input and report
/// either its output or an error message.
///
/// **Critical Architectural Boundary:**
/// - Engine knows HOW to execute (child process, container)
/// - Engine does NOT compare outputs or build verdicts
/// - Engine never fails by `Err`: every failure is an `Evaluation::Error`
///
/// **Trust boundary:**
/// Submitted code is arbitrary code. `ProcessEngine` only adds process
/// isolation and a wall-clock limit; `DockerEngine` adds memory, CPU and
/// network restrictions. Neither is a hardened sandbox.

use crate::capture::{self, CappedBuffer};
use crate::config::{EngineKind, JudgeConfig};
use crate::docker::DockerEngine;
use crate::harness;
use anyhow::Result;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

/// Safety limits to prevent pathological inputs from reaching the runtime
pub const MAX_SOURCE_CODE_BYTES: usize = 1024 * 1024; // 1MB
pub const MAX_TEST_INPUT_BYTES: usize = 10 * 1024 * 1024; // 10MB

/// Outcome of running `solve(input)` once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    /// `solve` returned; the value coerced to a string
    Output(String),
    /// `solve` was missing, threw, or could not be run
    Error(String),
}

impl Evaluation {
    pub fn is_ok(&self) -> bool {
        matches!(self, Evaluation::Output(_))
    }
}

#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    fn name(&self) -> &'static str;

    async fn evaluate(&self, code: &str, input: &str) -> Evaluation;
}

/// Reject sources and inputs over the engine limits
pub fn check_limits(code: &str, input: &str) -> Option<Evaluation> {
    if code.len() > MAX_SOURCE_CODE_BYTES {
        return Some(Evaluation::Error(format!(
            "Source code exceeds maximum size of {} bytes",
            MAX_SOURCE_CODE_BYTES
        )));
    }
    if input.len() > MAX_TEST_INPUT_BYTES {
        return Some(Evaluation::Error(format!(
            "Test input exceeds maximum size of {} bytes",
            MAX_TEST_INPUT_BYTES
        )));
    }
    None
}

pub fn timeout_message(timeout: Duration) -> String {
    format!("Execution timed out after {}ms", timeout.as_millis())
}

/// Turn a finished runner's streams into an evaluation
pub(crate) fn interpret_output(stdout: &str, stderr: &str, exit_code: Option<i64>) -> Evaluation {
    if let Some(evaluation) = harness::parse_result(stdout) {
        return evaluation;
    }

    let detail = stderr.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    match exit_code {
        Some(0) | None if detail.is_empty() => {
            Evaluation::Error("Runner produced no result".to_string())
        }
        Some(code) => {
            if detail.is_empty() {
                Evaluation::Error(format!("Runner exited with status {}", code))
            } else {
                Evaluation::Error(format!("Runner exited with status {}: {}", code, detail))
            }
        }
        None => Evaluation::Error(format!("Runner terminated: {}", detail)),
    }
}

/// Evaluates submissions in a local Node.js child process
///
/// The payload goes in on stdin, the harness result comes back on stdout.
/// The child is killed when the wall-clock limit expires.
pub struct ProcessEngine {
    node_bin: String,
    timeout: Duration,
}

impl ProcessEngine {
    pub fn new(node_bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            node_bin: node_bin.into(),
            timeout,
        }
    }

    pub fn from_config(config: &JudgeConfig) -> Self {
        Self::new(config.node_bin.clone(), config.timeout())
    }
}

#[async_trait]
impl ExecutionEngine for ProcessEngine {
    fn name(&self) -> &'static str {
        "process"
    }

    async fn evaluate(&self, code: &str, input: &str) -> Evaluation {
        if let Some(rejected) = check_limits(code, input) {
            return rejected;
        }

        let mut command = Command::new(&self.node_bin);
        command
            .arg("-e")
            .arg(harness::HARNESS_JS)
            .env_remove("SOURCE_CODE")
            .env_remove("TEST_INPUT")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(node_bin = %self.node_bin, error = %e, "Failed to start runner");
                return Evaluation::Error(format!("Failed to start {}: {}", self.node_bin, e));
            }
        };

        let payload = harness::stdin_payload(code, input);
        let start = Instant::now();

        // Dropping this future on timeout drops the child, which kills it
        let run = async move {
            let stdin = child.stdin.take();
            let stdout = child.stdout.take();
            let stderr = child.stderr.take();

            let feed = async move {
                if let Some(mut stdin) = stdin {
                    stdin.write_all(&payload).await?;
                    stdin.shutdown().await?;
                }
                Ok::<_, std::io::Error>(())
            };
            let out = async move {
                let buffer = CappedBuffer::tail(capture::STDOUT_CAPTURE_BYTES);
                match stdout {
                    Some(stdout) => capture::read_capped(stdout, buffer).await,
                    None => Ok(buffer),
                }
            };
            let err = async move {
                let buffer = CappedBuffer::head(capture::STDERR_CAPTURE_BYTES);
                match stderr {
                    Some(stderr) => capture::read_capped(stderr, buffer).await,
                    None => Ok(buffer),
                }
            };

            let (fed, stdout, stderr) = tokio::join!(feed, out, err);
            let (stdout, stderr) = (stdout?, stderr?);
            // A runner that exits without reading its payload closes the pipe
            if let Err(e) = fed {
                debug!(error = %e, "Runner did not take the whole payload");
            }
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, stdout, stderr))
        };

        match tokio::time::timeout(self.timeout, run).await {
            Ok(Ok((status, stdout, stderr))) => {
                debug!(
                    exit_code = ?status.code(),
                    execution_ms = start.elapsed().as_millis() as u64,
                    stdout_bytes = stdout.len(),
                    stdout_dropped = stdout.dropped(),
                    "Runner finished"
                );
                interpret_output(
                    &stdout.into_string(),
                    &stderr.into_string(),
                    status.code().map(i64::from),
                )
            }
            Ok(Err(e)) => Evaluation::Error(format!("Failed to communicate with runner: {}", e)),
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Runner timed out, killed");
                Evaluation::Error(timeout_message(self.timeout))
            }
        }
    }
}

/// Build the engine selected by configuration
pub fn build_engine(config: &JudgeConfig) -> Result<Box<dyn ExecutionEngine>> {
    match config.engine {
        EngineKind::Process => Ok(Box::new(ProcessEngine::from_config(config))),
        EngineKind::Docker => Ok(Box::new(DockerEngine::new(config)?)),
    }
}
