//! CLI for txretry.

mod args;
mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Duration;
use txretry_core::config;

pub use args::{BackoffArgs, IsolationArg};
use commands::{run_backoff, run_classify, run_config, run_exec};

/// Top-level CLI for txretry.
#[derive(Debug, Parser)]
#[command(name = "txretry")]
#[command(about = "txretry: retryable serializable transactions", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Print the delay before each retry for a backoff strategy.
    Backoff {
        #[command(flatten)]
        backoff: BackoffArgs,

        /// Number of retries to show.
        #[arg(long, default_value = "10", value_name = "N")]
        retries: u32,
    },

    /// Classify a SQLSTATE code (and optional driver message).
    Classify {
        /// SQLSTATE code, e.g. 40001.
        code: String,

        /// Driver error message; the constraint name is extracted from it when --constraint is absent.
        #[arg(long, short)]
        message: Option<String>,

        /// Constraint name as reported in the structured error field.
        #[arg(long)]
        constraint: Option<String>,

        /// Print the classification as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the config file path and effective settings.
    Config,

    /// Execute SQL statements in one transaction, retrying on serialization failures.
    Exec {
        /// postgres://... or sqlite:...
        #[arg(long, value_name = "URL")]
        database_url: String,

        /// Statements, run in order inside the transaction.
        #[arg(required = true, value_name = "SQL")]
        sql: Vec<String>,

        /// Attempts including the first (overrides config).
        #[arg(long, value_name = "N")]
        max_attempts: Option<u32>,

        /// Isolation level (overrides config).
        #[arg(long, value_enum)]
        isolation: Option<IsolationArg>,

        /// Open the transaction read-only (PostgreSQL only).
        #[arg(long)]
        read_only: bool,

        /// Give up after this many seconds, including backoff waits.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Backoff { backoff, retries } => {
                let settings = backoff.apply(cfg.backoff_settings());
                run_backoff(&settings, retries).await?;
            }
            CliCommand::Classify {
                code,
                message,
                constraint,
                json,
            } => run_classify(&code, message.as_deref(), constraint.as_deref(), json).await?,
            CliCommand::Config => run_config(&cfg).await?,
            CliCommand::Exec {
                database_url,
                sql,
                max_attempts,
                isolation,
                read_only,
                timeout,
            } => {
                let mut opts = cfg.tx_options();
                if let Some(n) = max_attempts {
                    opts = opts.with_max_attempts(n);
                }
                if let Some(level) = isolation {
                    opts = opts.with_isolation(level.into());
                }
                if read_only {
                    opts = opts.read_only(true);
                }
                let timeout = timeout.map(Duration::from_secs);
                run_exec(&database_url, &sql, &opts, timeout).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
