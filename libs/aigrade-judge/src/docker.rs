// Docker-backed engine using Bollard
// Runs the harness in a throwaway container per evaluation

use crate::capture::{self, CappedBuffer};
use crate::config::JudgeConfig;
use crate::engine::{check_limits, interpret_output, timeout_message, Evaluation, ExecutionEngine};
use crate::harness;
use anyhow::{Context, Result};
use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, KillContainerOptions, LogOutput, LogsOptions,
    RemoveContainerOptions, StartContainerOptions, WaitContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::Docker;
use futures_util::stream::StreamExt;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Largest source or input accepted through container environment variables.
/// A single env string is capped at 128 KiB and base64 inflates by 4/3.
pub const MAX_ENV_PAYLOAD_BYTES: usize = 90 * 1024;

/// Force-removes the container on drop, including when the evaluation is cancelled
struct ContainerGuard {
    docker: Docker,
    container_id: String,
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        // Drop cannot be async; hand removal to the runtime
        let container_id = self.container_id.clone();
        let docker = self.docker.clone();

        tokio::spawn(async move {
            let remove_options = RemoveContainerOptions {
                force: true,
                ..Default::default()
            };

            if let Err(e) = docker.remove_container(&container_id, Some(remove_options)).await {
                warn!(container_id = %container_id, error = %e, "Failed to clean up container");
            }
        });
    }
}

/// Docker-based engine
///
/// **Container Rules:**
/// 1. Pulls the Node.js image if not present
/// 2. Network disabled, memory and CPU capped
/// 3. Source and input injected as base64 environment variables
/// 4. Hard wall-clock timeout; the container is killed when it expires
/// 5. Container force-removed after every evaluation
pub struct DockerEngine {
    docker: Docker,
    image: String,
    memory_limit: i64,
    nano_cpus: i64,
    timeout: Duration,
}

impl DockerEngine {
    pub fn new(config: &JudgeConfig) -> Result<Self> {
        let docker = Docker::connect_with_local_defaults()
            .context("Failed to connect to Docker daemon")?;

        Ok(Self {
            docker,
            image: config.docker_image.clone(),
            memory_limit: config.memory_limit_bytes(),
            nano_cpus: config.nano_cpus(),
            timeout: config.timeout(),
        })
    }

    /// Ensure the image is available locally, pulling it on a cache miss
    async fn ensure_image(&self) -> Result<()> {
        if self.docker.inspect_image(&self.image).await.is_ok() {
            debug!(image = %self.image, "Image cache hit");
            return Ok(());
        }

        warn!(image = %self.image, "Image cache miss, pulling");

        let options = Some(CreateImageOptions {
            from_image: self.image.as_str(),
            ..Default::default()
        });

        let mut stream = self.docker.create_image(options, None, None);
        while let Some(result) = stream.next().await {
            result.context("Failed to pull Docker image")?;
        }

        info!(image = %self.image, "Image pulled");
        Ok(())
    }

    async fn run_container(&self, code: &str, input: &str) -> Result<Evaluation> {
        self.ensure_image()
            .await
            .with_context(|| format!("Failed to ensure Docker image '{}' is available", self.image))?;

        let container_name = format!("aigrade-{}", uuid::Uuid::new_v4());

        let config = Config {
            image: Some(self.image.clone()),
            cmd: Some(vec![
                "node".to_string(),
                "-e".to_string(),
                harness::HARNESS_JS.to_string(),
            ]),
            env: Some(harness::env_payload(code, input)),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            network_disabled: Some(true),
            host_config: Some(bollard::models::HostConfig {
                memory: Some(self.memory_limit),
                nano_cpus: Some(self.nano_cpus),
                readonly_rootfs: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        };

        let create_options = CreateContainerOptions {
            name: container_name.as_str(),
            platform: None,
        };

        let container = self
            .docker
            .create_container(Some(create_options), config)
            .await
            .context("Failed to create Docker container")?;

        let container_id = container.id.clone();
        let _guard = ContainerGuard {
            docker: self.docker.clone(),
            container_id: container_id.clone(),
        };

        let start = Instant::now();

        self.docker
            .start_container(&container_id, None::<StartContainerOptions<String>>)
            .await
            .context("Failed to start Docker container")?;

        let execution = async {
            let mut stdout = CappedBuffer::tail(capture::STDOUT_CAPTURE_BYTES);
            let mut stderr = CappedBuffer::head(capture::STDERR_CAPTURE_BYTES);

            let logs_options = Some(LogsOptions::<String> {
                stdout: true,
                stderr: true,
                follow: true,
                ..Default::default()
            });

            let mut logs = self.docker.logs(&container_id, logs_options);
            while let Some(chunk) = logs.next().await {
                match chunk {
                    Ok(LogOutput::StdOut { message }) => {
                        stdout.push(&message);
                    }
                    Ok(LogOutput::StdErr { message }) => {
                        stderr.push(&message);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "Error reading container logs");
                        break;
                    }
                }
            }

            let mut exit_code = None;
            let wait_options = WaitContainerOptions {
                condition: "not-running",
            };
            let mut wait = self.docker.wait_container(&container_id, Some(wait_options));
            match wait.next().await {
                Some(Ok(response)) => exit_code = Some(response.status_code),
                // Non-zero exits surface as a wait error carrying the code
                Some(Err(bollard::errors::Error::DockerContainerWaitError { code, .. })) => {
                    exit_code = Some(code)
                }
                Some(Err(e)) => warn!(error = %e, "Failed to get container exit code"),
                None => warn!("No wait response from container"),
            }

            (stdout.into_string(), stderr.into_string(), exit_code)
        };

        match tokio::time::timeout(self.timeout, execution).await {
            Ok((stdout, mut stderr, exit_code)) => {
                debug!(
                    container_id = %container_id,
                    exit_code = ?exit_code,
                    execution_ms = start.elapsed().as_millis() as u64,
                    "Container finished"
                );
                if exit_code == Some(137) {
                    stderr.insert_str(0, "Container killed: likely exceeded memory limit\n");
                }
                Ok(interpret_output(&stdout, &stderr, exit_code))
            }
            Err(_) => {
                warn!(container_id = %container_id, "Evaluation timed out, killing container");
                if let Err(e) = self
                    .docker
                    .kill_container(&container_id, None::<KillContainerOptions<String>>)
                    .await
                {
                    warn!(container_id = %container_id, error = %e, "Failed to kill timed-out container");
                }
                Ok(Evaluation::Error(timeout_message(self.timeout)))
            }
        }
    }
}

#[async_trait]
impl ExecutionEngine for DockerEngine {
    fn name(&self) -> &'static str {
        "docker"
    }

    async fn evaluate(&self, code: &str, input: &str) -> Evaluation {
        if let Some(rejected) = check_limits(code, input) {
            return rejected;
        }
        if code.len() > MAX_ENV_PAYLOAD_BYTES || input.len() > MAX_ENV_PAYLOAD_BYTES {
            return Evaluation::Error(format!(
                "Source code and input must each be at most {} bytes for container execution",
                MAX_ENV_PAYLOAD_BYTES
            ));
        }

        match self.run_container(code, input).await {
            Ok(evaluation) => evaluation,
            Err(e) => {
                warn!(error = %e, "Docker evaluation failed");
                Evaluation::Error(format!("Docker execution error: {:#}", e))
            }
        }
    }
}
