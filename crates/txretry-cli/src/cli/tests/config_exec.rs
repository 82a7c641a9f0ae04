//! Tests for config and exec.

use super::parse;
use crate::cli::{Cli, CliCommand, IsolationArg};
use clap::Parser;
use txretry_core::IsolationLevel;

#[test]
fn cli_parse_config() {
    match parse(&["txretry", "config"]) {
        CliCommand::Config => {}
        _ => panic!("expected Config"),
    }
}

#[test]
fn cli_parse_exec_minimal() {
    match parse(&[
        "txretry",
        "exec",
        "--database-url",
        "sqlite::memory:",
        "SELECT 1",
    ]) {
        CliCommand::Exec {
            database_url,
            sql,
            max_attempts,
            isolation,
            read_only,
            timeout,
        } => {
            assert_eq!(database_url, "sqlite::memory:");
            assert_eq!(sql, vec!["SELECT 1".to_string()]);
            assert!(max_attempts.is_none());
            assert!(isolation.is_none());
            assert!(!read_only);
            assert!(timeout.is_none());
        }
        _ => panic!("expected Exec"),
    }
}

#[test]
fn cli_parse_exec_all_flags() {
    match parse(&[
        "txretry",
        "exec",
        "--database-url",
        "postgres://localhost/app",
        "--max-attempts",
        "5",
        "--isolation",
        "repeatable-read",
        "--read-only",
        "--timeout",
        "30",
        "UPDATE accounts SET balance = balance - 10 WHERE id = 1",
        "UPDATE accounts SET balance = balance + 10 WHERE id = 2",
    ]) {
        CliCommand::Exec {
            sql,
            max_attempts,
            isolation,
            read_only,
            timeout,
            ..
        } => {
            assert_eq!(sql.len(), 2);
            assert_eq!(max_attempts, Some(5));
            assert_eq!(isolation, Some(IsolationArg::RepeatableRead));
            assert_eq!(
                IsolationLevel::from(IsolationArg::RepeatableRead),
                IsolationLevel::RepeatableRead
            );
            assert!(read_only);
            assert_eq!(timeout, Some(30));
        }
        _ => panic!("expected Exec"),
    }
}

#[test]
fn cli_parse_exec_requires_sql_and_url() {
    assert!(Cli::try_parse_from(["txretry", "exec", "--database-url", "sqlite::memory:"]).is_err());
    assert!(Cli::try_parse_from(["txretry", "exec", "SELECT 1"]).is_err());
}
