//! Classify database errors by SQLSTATE.
//!
//! All functions accept an opaque error and look through its `source()`
//! chain for a driver error. Nothing here fails: an error with no
//! recognizable state code is simply "other", and a constraint that cannot
//! be extracted is reported as the empty string.

mod constraint;
mod info;
pub mod sqlstate;

pub use info::{chain, find_database_error, DatabaseErrorInfo, DbErrorRef, SqlStateError};
pub use sqlstate::ErrorKind;

use serde::Serialize;
use std::error::Error as StdError;

/// The database error that answers for the whole chain: the first link with
/// a valid SQLSTATE, else the first database link of any kind.
fn primary_link<'a>(err: &'a (dyn StdError + 'static)) -> Option<DbErrorRef<'a>> {
    pick_primary(chain(err).filter_map(DbErrorRef::from_link))
}

fn pick_primary<'a>(links: impl Iterator<Item = DbErrorRef<'a>>) -> Option<DbErrorRef<'a>> {
    let mut first = None;
    for db in links {
        if valid_state(&db).is_some() {
            return Some(db);
        }
        if first.is_none() {
            first = Some(db);
        }
    }
    first
}

fn valid_state(db: &DbErrorRef<'_>) -> Option<String> {
    db.sql_state()
        .filter(|code| sqlstate::is_valid(code))
        .map(|code| code.into_owned())
}

/// First valid five-character SQLSTATE in the chain.
pub fn sql_state(err: &(dyn StdError + 'static)) -> Option<String> {
    primary_link(err).and_then(|db| valid_state(&db))
}

/// Two-character class of the state code, e.g. `"23"` for integrity violations.
pub fn error_class(err: &(dyn StdError + 'static)) -> Option<String> {
    sql_state(err).and_then(|code| sqlstate::class_of(&code).map(str::to_string))
}

/// Whether the error carries exactly `code`.
pub fn is_error_code(err: &(dyn StdError + 'static), code: &str) -> bool {
    sql_state(err).is_some_and(|c| c == code)
}

/// Whether the error's state code belongs to `class`.
pub fn is_error_class(err: &(dyn StdError + 'static), class: &str) -> bool {
    error_class(err).is_some_and(|c| c == class)
}

/// Name of the violated constraint, or `""` when unknown.
///
/// Read from the same link [`sql_state`] reports on. Tries the driver's
/// structured field first, then the message text.
pub fn constraint_name(err: &(dyn StdError + 'static)) -> String {
    let Some(db) = primary_link(err) else {
        return String::new();
    };
    if let Some(name) = db.constraint().filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    db.message()
        .map(constraint::from_message)
        .unwrap_or_default()
}

/// Semantic category of the error; `Other` when no state code is found.
pub fn classify(err: &(dyn StdError + 'static)) -> ErrorKind {
    sql_state(err)
        .map(|code| ErrorKind::from_sql_state(&code))
        .unwrap_or(ErrorKind::Other)
}

/// `unique_violation`, optionally restricted to the given constraint names.
pub fn is_unique_violation(err: &(dyn StdError + 'static), constraints: &[&str]) -> bool {
    is_code_with_constraint(err, sqlstate::UNIQUE_VIOLATION, constraints)
}

/// `foreign_key_violation`, optionally restricted to the given constraint names.
pub fn is_foreign_key_violation(err: &(dyn StdError + 'static), constraints: &[&str]) -> bool {
    is_code_with_constraint(err, sqlstate::FOREIGN_KEY_VIOLATION, constraints)
}

pub fn is_invalid_text_representation(err: &(dyn StdError + 'static)) -> bool {
    is_error_code(err, sqlstate::INVALID_TEXT_REPRESENTATION)
}

pub fn is_character_not_in_repertoire(err: &(dyn StdError + 'static)) -> bool {
    is_error_code(err, sqlstate::CHARACTER_NOT_IN_REPERTOIRE)
}

/// `query_canceled` (statement timeout or user cancel request).
pub fn is_query_canceled(err: &(dyn StdError + 'static)) -> bool {
    is_error_code(err, sqlstate::QUERY_CANCELED)
}

/// `serialization_failure`: the transaction lost a serializable conflict and
/// may succeed if run again.
pub fn is_serialization_failure(err: &(dyn StdError + 'static)) -> bool {
    is_error_code(err, sqlstate::SERIALIZATION_FAILURE)
}

fn is_code_with_constraint(err: &(dyn StdError + 'static), code: &str, constraints: &[&str]) -> bool {
    if !is_error_code(err, code) {
        return false;
    }
    if constraints.is_empty() {
        return true;
    }
    let name = constraint_name(err);
    constraints.contains(&name.as_str())
}

/// Snapshot of everything the classifier can say about one error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorClassification {
    pub sql_state: Option<String>,
    /// Empty when unknown.
    pub constraint_name: String,
    pub kind: ErrorKind,
}

impl ErrorClassification {
    pub fn of(err: &(dyn StdError + 'static)) -> Self {
        let sql_state = sql_state(err);
        let kind = sql_state
            .as_deref()
            .map(ErrorKind::from_sql_state)
            .unwrap_or(ErrorKind::Other);
        Self {
            sql_state,
            constraint_name: constraint_name(err),
            kind,
        }
    }

    pub fn error_class(&self) -> Option<&str> {
        self.sql_state.as_deref().and_then(sqlstate::class_of)
    }

    pub fn is_unique_violation(&self, constraints: &[&str]) -> bool {
        self.kind == ErrorKind::UniqueViolation
            && (constraints.is_empty() || constraints.contains(&self.constraint_name.as_str()))
    }

    pub fn is_foreign_key_violation(&self, constraints: &[&str]) -> bool {
        self.kind == ErrorKind::ForeignKeyViolation
            && (constraints.is_empty() || constraints.contains(&self.constraint_name.as_str()))
    }

    pub fn is_serialization_failure(&self) -> bool {
        self.kind == ErrorKind::SerializationFailure
    }

    pub fn is_query_canceled(&self) -> bool {
        self.kind == ErrorKind::QueryCanceled
    }

    pub fn is_invalid_text_representation(&self) -> bool {
        self.kind == ErrorKind::InvalidTextRepresentation
    }

    pub fn is_character_not_in_repertoire(&self) -> bool {
        self.kind == ErrorKind::CharacterNotInRepertoire
    }
}
