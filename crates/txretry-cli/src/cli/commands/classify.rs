//! `txretry classify <code>` – show how an error with this SQLSTATE is treated.

use anyhow::Result;
use txretry_core::classify::{sqlstate, ErrorClassification, SqlStateError};

pub async fn run_classify(
    code: &str,
    message: Option<&str>,
    constraint: Option<&str>,
    json: bool,
) -> Result<()> {
    let mut err = SqlStateError::new(code, message.unwrap_or_default());
    if let Some(name) = constraint {
        err = err.with_constraint(name);
    }
    let report = ErrorClassification::of(&err);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match report.sql_state.as_deref() {
        Some(state) => println!("sql_state:  {state}"),
        None if !sqlstate::is_valid(code) => {
            println!("sql_state:  - ({code:?} is not a SQLSTATE code)")
        }
        None => println!("sql_state:  -"),
    }
    println!("class:      {}", report.error_class().unwrap_or("-"));
    println!("kind:       {}", report.kind);
    let constraint = if report.constraint_name.is_empty() {
        "-"
    } else {
        report.constraint_name.as_str()
    };
    println!("constraint: {constraint}");
    let retry = if report.kind.is_retryable() { "yes" } else { "no" };
    println!("retryable:  {retry}");
    Ok(())
}
