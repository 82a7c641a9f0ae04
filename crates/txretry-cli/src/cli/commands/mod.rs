//! CLI command handlers, one per file.

mod backoff;
mod classify;
mod config;
mod exec;

pub use backoff::run_backoff;
pub use classify::run_classify;
pub use config::run_config;
pub use exec::run_exec;
