// Judge configuration: which engine evaluates submissions and with what limits
use aigrade_common::config::{env_number, ConfigError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/judge.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Local Node.js child process
    Process,
    /// Network-less Docker container with memory and CPU caps
    Docker,
}

impl EngineKind {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "process" | "node" => Some(EngineKind::Process),
            "docker" => Some(EngineKind::Docker),
            _ => None,
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Process => write!(f, "process"),
            EngineKind::Docker => write!(f, "docker"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    pub engine: EngineKind,
    pub node_bin: String,
    /// Wall-clock limit for a single evaluation
    pub timeout_ms: u64,
    pub docker_image: String,
    pub memory_limit_mb: u32,
    pub cpu_limit: f32,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::Process,
            node_bin: "node".to_string(),
            timeout_ms: 5000,
            docker_image: "node:20-alpine".to_string(),
            memory_limit_mb: 128,
            cpu_limit: 0.5,
        }
    }
}

impl JudgeConfig {
    /// Load judge settings from a JSON file; missing keys take defaults
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.display().to_string(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: config_path.display().to_string(),
            source,
        })
    }

    /// Load config/judge.json when it exists, defaults otherwise
    pub fn load_default() -> Result<Self, ConfigError> {
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            Self::load(default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Default file plus AIGRADE_* environment overrides
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load_default()?.with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        if let Ok(raw) = std::env::var("AIGRADE_ENGINE") {
            self.engine = EngineKind::from_str(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: "AIGRADE_ENGINE",
                value: raw.clone(),
                reason: "expected process or docker".to_string(),
            })?;
        }
        if let Ok(bin) = std::env::var("AIGRADE_NODE_BIN") {
            if !bin.trim().is_empty() {
                self.node_bin = bin;
            }
        }
        if let Some(ms) = env_number::<u64>("AIGRADE_EVAL_TIMEOUT_MS")? {
            self.timeout_ms = ms;
        }
        if let Ok(image) = std::env::var("AIGRADE_DOCKER_IMAGE") {
            if !image.trim().is_empty() {
                self.docker_image = image;
            }
        }
        if let Some(mb) = env_number::<u32>("AIGRADE_MEMORY_LIMIT_MB")? {
            self.memory_limit_mb = mb;
        }
        if let Some(cpu) = env_number::<f32>("AIGRADE_CPU_LIMIT")? {
            self.cpu_limit = cpu;
        }
        Ok(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn memory_limit_bytes(&self) -> i64 {
        (self.memory_limit_mb as i64) * 1024 * 1024
    }

    pub fn nano_cpus(&self) -> i64 {
        (self.cpu_limit as f64 * 1_000_000_000.0) as i64
    }
}
