//! Argument groups and value enums shared by several subcommands.

use clap::{Args, ValueEnum};
use txretry_core::backoff::JitterKind;
use txretry_core::config::{BackoffKind, BackoffSettings};
use txretry_core::IsolationLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Exponential,
    Linear,
    None,
}

impl From<StrategyArg> for BackoffKind {
    fn from(s: StrategyArg) -> Self {
        match s {
            StrategyArg::Exponential => BackoffKind::Exponential,
            StrategyArg::Linear => BackoffKind::Linear,
            StrategyArg::None => BackoffKind::None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum JitterArg {
    None,
    Full,
    Equal,
}

impl From<JitterArg> for JitterKind {
    fn from(j: JitterArg) -> Self {
        match j {
            JitterArg::None => JitterKind::None,
            JitterArg::Full => JitterKind::Full,
            JitterArg::Equal => JitterKind::Equal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IsolationArg {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl From<IsolationArg> for IsolationLevel {
    fn from(i: IsolationArg) -> Self {
        match i {
            IsolationArg::ReadUncommitted => IsolationLevel::ReadUncommitted,
            IsolationArg::ReadCommitted => IsolationLevel::ReadCommitted,
            IsolationArg::RepeatableRead => IsolationLevel::RepeatableRead,
            IsolationArg::Serializable => IsolationLevel::Serializable,
        }
    }
}

/// Backoff overrides; anything left unset comes from config.toml.
#[derive(Debug, Clone, Default, Args)]
pub struct BackoffArgs {
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Delay before the first retry.
    #[arg(long, value_name = "MS")]
    pub base_ms: Option<u64>,

    /// Cap on any single delay.
    #[arg(long, value_name = "MS")]
    pub max_ms: Option<u64>,

    /// Exponential growth factor.
    #[arg(long)]
    pub multiplier: Option<f64>,

    #[arg(long, value_enum)]
    pub jitter: Option<JitterArg>,

    /// Per-retry increment for the linear strategy.
    #[arg(long, value_name = "MS")]
    pub increment_ms: Option<u64>,
}

impl BackoffArgs {
    pub fn apply(&self, mut settings: BackoffSettings) -> BackoffSettings {
        if let Some(s) = self.strategy {
            settings.strategy = s.into();
        }
        if let Some(ms) = self.base_ms {
            settings.base_delay_ms = ms;
        }
        if let Some(ms) = self.max_ms {
            settings.max_delay_ms = ms;
        }
        if let Some(m) = self.multiplier {
            settings.multiplier = m;
        }
        if let Some(j) = self.jitter {
            settings.jitter = j.into();
        }
        if let Some(ms) = self.increment_ms {
            settings.increment_ms = ms;
        }
        settings
    }
}
