use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::backoff::{
    BackoffConfig, Constant, Exponential, ExponentialConfig, JitterKind, Linear, LinearConfig,
    SharedBackoff,
};
use crate::tx::{IsolationLevel, TxOptions, DEFAULT_MAX_ATTEMPTS};

/// Which backoff family to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffKind {
    #[default]
    Exponential,
    Linear,
    /// Retry immediately.
    None,
}

/// Backoff parameters (`[backoff]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffSettings {
    pub strategy: BackoffKind,
    /// Delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Cap on any delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Exponential growth factor (exponential only).
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    /// Jitter applied on top of the exponential delay.
    #[serde(default = "default_jitter")]
    pub jitter: JitterKind,
    /// Per-attempt increment in milliseconds (linear only).
    #[serde(default)]
    pub increment_ms: u64,
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_jitter() -> JitterKind {
    JitterKind::Full
}

impl Default for BackoffSettings {
    fn default() -> Self {
        Self {
            strategy: BackoffKind::Exponential,
            base_delay_ms: 100,
            max_delay_ms: 5_000,
            multiplier: default_multiplier(),
            jitter: default_jitter(),
            increment_ms: 100,
        }
    }
}

impl BackoffSettings {
    /// Check the invariants the strategies rely on.
    pub fn validate(&self) -> Result<()> {
        if self.max_delay_ms < self.base_delay_ms {
            bail!(
                "backoff.max_delay_ms ({}) must be >= backoff.base_delay_ms ({})",
                self.max_delay_ms,
                self.base_delay_ms
            );
        }
        let bad_multiplier = self.multiplier.is_nan() || self.multiplier < 1.0;
        if self.strategy == BackoffKind::Exponential && bad_multiplier {
            bail!("backoff.multiplier must be >= 1.0, got {}", self.multiplier);
        }
        Ok(())
    }

    pub fn build(&self) -> SharedBackoff {
        let backoff = BackoffConfig {
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
        };
        match self.strategy {
            BackoffKind::Exponential => Arc::new(Exponential::new(ExponentialConfig {
                backoff,
                multiplier: self.multiplier,
                jitter: self.jitter,
            })),
            BackoffKind::Linear => Arc::new(Linear::new(LinearConfig {
                backoff,
                increment: Duration::from_millis(self.increment_ms),
            })),
            BackoffKind::None => Arc::new(Constant(Duration::ZERO)),
        }
    }
}

/// Global configuration loaded from `~/.config/txretry/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxRetryConfig {
    /// Attempts per transaction, including the first.
    pub max_attempts: u32,
    /// Isolation level; `default` is run as serializable.
    #[serde(default)]
    pub isolation: IsolationLevel,
    #[serde(default)]
    pub read_only: bool,
    /// Optional backoff section; if missing, built-in defaults are used.
    #[serde(default)]
    pub backoff: Option<BackoffSettings>,
}

impl Default for TxRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            isolation: IsolationLevel::Serializable,
            read_only: false,
            backoff: None,
        }
    }
}

impl TxRetryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        if let Some(b) = &self.backoff {
            b.validate()?;
        }
        Ok(())
    }

    pub fn backoff_settings(&self) -> BackoffSettings {
        self.backoff.clone().unwrap_or_default()
    }

    pub fn tx_options(&self) -> TxOptions {
        TxOptions {
            isolation: self.isolation,
            read_only: self.read_only,
            max_attempts: self.max_attempts,
            backoff: Some(self.backoff_settings().build()),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("txretry")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TxRetryConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = TxRetryConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: TxRetryConfig = toml::from_str(&data)?;
    cfg.validate()?;
    Ok(cfg)
}
