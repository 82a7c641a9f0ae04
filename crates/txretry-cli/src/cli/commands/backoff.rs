//! `txretry backoff` – print a retry delay schedule.

use anyhow::Result;
use txretry_core::backoff::JitterKind;
use txretry_core::config::{BackoffKind, BackoffSettings};

pub async fn run_backoff(settings: &BackoffSettings, retries: u32) -> Result<()> {
    settings.validate()?;
    let strategy = settings.build();

    match settings.strategy {
        BackoffKind::Exponential => println!(
            "exponential: base {}ms, max {}ms, multiplier {}, jitter {:?}",
            settings.base_delay_ms, settings.max_delay_ms, settings.multiplier, settings.jitter
        ),
        BackoffKind::Linear => println!(
            "linear: base {}ms, max {}ms, increment {}ms",
            settings.base_delay_ms, settings.max_delay_ms, settings.increment_ms
        ),
        BackoffKind::None => println!("none: retry immediately"),
    }
    if settings.strategy == BackoffKind::Exponential && settings.jitter != JitterKind::None {
        println!("(jittered: delays below are one random draw)");
    }

    println!("{:<6} {:>12}", "RETRY", "DELAY");
    for retry in 0..retries {
        let delay = strategy.delay(retry);
        println!("{:<6} {:>12}", retry + 1, format!("{:?}", delay));
    }
    Ok(())
}
