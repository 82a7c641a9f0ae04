//! Constraint-name extraction from free-text driver messages.
//!
//! Used only when the driver does not expose the constraint as a field.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LAST_QUOTE: Regex = Regex::new(r#""([^"]*)"[^"]*$"#).unwrap();
    static ref CRDB_KEY: Regex = Regex::new(r"([0-9A-Za-z_]+@[0-9A-Za-z_]+)[^@]*$").unwrap();
}

/// Best-effort constraint name from a message; empty when nothing matches.
pub(crate) fn from_message(message: &str) -> String {
    if message.is_empty() {
        return String::new();
    }
    if let Some(key) = crdb_key(message) {
        return key.to_string();
    }
    last_quoted(message).unwrap_or_default().to_string()
}

/// CockroachDB reports the violated index as `table@index`, e.g.
/// `foreign key violation: value ['b'] not found in a@primary [id] (txn=...)`.
fn crdb_key(message: &str) -> Option<&str> {
    CRDB_KEY
        .captures(message)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Last double-quoted substring, e.g. `a_id_fkey` in
/// `insert or update on table "b" violates foreign key constraint "a_id_fkey"`.
fn last_quoted(message: &str) -> Option<&str> {
    LAST_QUOTE
        .captures(message)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}
