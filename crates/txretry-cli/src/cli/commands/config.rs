//! `txretry config` – show the config file and the settings in effect.

use anyhow::Result;
use txretry_core::config::{self, TxRetryConfig};

pub async fn run_config(cfg: &TxRetryConfig) -> Result<()> {
    let path = config::config_path()?;
    println!("# {}", path.display());

    // Fill in the built-in backoff so the output shows what runs.
    let effective = TxRetryConfig {
        backoff: Some(cfg.backoff_settings()),
        ..cfg.clone()
    };
    print!("{}", toml::to_string_pretty(&effective)?);
    Ok(())
}
