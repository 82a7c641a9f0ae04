//! Tests for backoff and classify.

use super::parse;
use crate::cli::args::{JitterArg, StrategyArg};
use crate::cli::{BackoffArgs, Cli, CliCommand};
use clap::Parser;
use txretry_core::backoff::JitterKind;
use txretry_core::config::{BackoffKind, BackoffSettings};

#[test]
fn cli_parse_backoff_defaults() {
    match parse(&["txretry", "backoff"]) {
        CliCommand::Backoff { backoff, retries } => {
            assert_eq!(retries, 10);
            assert!(backoff.strategy.is_none());
            assert!(backoff.base_ms.is_none());
            assert!(backoff.jitter.is_none());
        }
        _ => panic!("expected Backoff"),
    }
}

#[test]
fn cli_parse_backoff_overrides() {
    match parse(&[
        "txretry",
        "backoff",
        "--strategy",
        "exponential",
        "--base-ms",
        "20",
        "--max-ms",
        "2000",
        "--multiplier",
        "3",
        "--jitter",
        "equal",
        "--retries",
        "4",
    ]) {
        CliCommand::Backoff { backoff, retries } => {
            assert_eq!(retries, 4);
            assert_eq!(backoff.strategy, Some(StrategyArg::Exponential));
            assert_eq!(backoff.base_ms, Some(20));
            assert_eq!(backoff.max_ms, Some(2000));
            assert_eq!(backoff.multiplier, Some(3.0));
            assert_eq!(backoff.jitter, Some(JitterArg::Equal));
        }
        _ => panic!("expected Backoff"),
    }
}

#[test]
fn backoff_args_override_only_what_is_set() {
    let args = BackoffArgs {
        strategy: Some(StrategyArg::Linear),
        increment_ms: Some(250),
        ..BackoffArgs::default()
    };
    let base = BackoffSettings::default();
    let settings = args.apply(base.clone());
    assert_eq!(settings.strategy, BackoffKind::Linear);
    assert_eq!(settings.increment_ms, 250);
    assert_eq!(settings.base_delay_ms, base.base_delay_ms);
    assert_eq!(settings.max_delay_ms, base.max_delay_ms);
    assert_eq!(settings.jitter, JitterKind::Full);
}

#[test]
fn cli_parse_backoff_rejects_unknown_strategy() {
    let res = Cli::try_parse_from(["txretry", "backoff", "--strategy", "fibonacci"]);
    assert!(res.is_err());
}

#[test]
fn cli_parse_classify() {
    match parse(&["txretry", "classify", "40001"]) {
        CliCommand::Classify {
            code,
            message,
            constraint,
            json,
        } => {
            assert_eq!(code, "40001");
            assert!(message.is_none());
            assert!(constraint.is_none());
            assert!(!json);
        }
        _ => panic!("expected Classify"),
    }
}

#[test]
fn cli_parse_classify_with_message() {
    match parse(&[
        "txretry",
        "classify",
        "23505",
        "-m",
        "duplicate key value violates unique constraint \"users_email_key\"",
        "--json",
    ]) {
        CliCommand::Classify {
            code,
            message,
            constraint,
            json,
        } => {
            assert_eq!(code, "23505");
            assert!(message.unwrap().contains("users_email_key"));
            assert!(constraint.is_none());
            assert!(json);
        }
        _ => panic!("expected Classify"),
    }
}
