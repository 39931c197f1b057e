// Configuration module

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_BASE_DELAY_MS, DEFAULT_DEADLINE_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY_MS,
    DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_TARGET_ASPECT, DEFAULT_TARGET_WIDTH,
};
use crate::retry::RetryPolicy;

/// Configuration errors (invalid YAML, unreadable file, bad values)
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("probe configuration error: {0}")]
    Probe(String),
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_base_delay_ms() -> u64 {
    DEFAULT_BASE_DELAY_MS
}

fn default_max_delay_ms() -> u64 {
    DEFAULT_MAX_DELAY_MS
}

fn default_deadline_ms() -> u64 {
    DEFAULT_DEADLINE_MS
}

/// Retry and deadline configuration for one analysis (YAML format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum number of probe attempts (including initial attempt)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Maximum backoff delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Wall-clock deadline in milliseconds; preempts retries unconditionally
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            deadline_ms: DEFAULT_DEADLINE_MS,
        }
    }
}

impl AnalysisConfig {
    /// Convert to RetryPolicy from retry module
    pub fn to_retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.base_delay_ms, self.max_delay_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_millis(self.deadline_ms)
    }
}

fn default_target_width() -> u32 {
    DEFAULT_TARGET_WIDTH
}

fn default_target_aspect() -> f64 {
    DEFAULT_TARGET_ASPECT
}

/// Target viewport geometry (YAML format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Target render width in CSS pixels
    #[serde(default = "default_target_width")]
    pub target_width: u32,
    /// Target aspect ratio (width / height)
    #[serde(default = "default_target_aspect")]
    pub target_aspect: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            target_aspect: DEFAULT_TARGET_ASPECT,
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_PROBE_TIMEOUT_SECS
}

fn default_origin() -> String {
    "https://localhost".to_string()
}

/// HTTP prober configuration (YAML format)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Origin header value sent on cross-origin-enabled probes
    #[serde(default = "default_origin")]
    pub origin: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            origin: default_origin(),
        }
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub probe: ProbeConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.analysis.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "analysis.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.analysis.deadline_ms == 0 {
            return Err(ConfigError::Invalid(
                "analysis.deadline_ms must be positive".to_string(),
            ));
        }
        if self.viewport.target_width == 0 {
            return Err(ConfigError::Invalid(
                "viewport.target_width must be positive".to_string(),
            ));
        }
        if self.viewport.target_aspect <= 0.0 || !self.viewport.target_aspect.is_finite() {
            return Err(ConfigError::Invalid(
                "viewport.target_aspect must be positive and finite".to_string(),
            ));
        }

        // The retry schedule must fit inside the deadline, otherwise the
        // deadline always wins and the attempt budget is unreachable.
        let policy = self.analysis.to_retry_policy();
        let backoff_total: Duration = (1..self.analysis.max_attempts)
            .map(|attempt| policy.backoff_duration(attempt))
            .sum();
        if backoff_total >= self.analysis.deadline() {
            return Err(ConfigError::Invalid(format!(
                "total worst-case backoff {}ms exceeds deadline {}ms",
                backoff_total.as_millis(),
                self.analysis.deadline_ms
            )));
        }

        Ok(())
    }
}
