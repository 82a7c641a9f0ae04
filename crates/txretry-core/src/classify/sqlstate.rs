//! Standard SQLSTATE codes and the error kinds derived from them.

use serde::Serialize;
use std::fmt;

pub const UNIQUE_VIOLATION: &str = "23505";
pub const FOREIGN_KEY_VIOLATION: &str = "23503";
pub const INVALID_TEXT_REPRESENTATION: &str = "22P02";
pub const CHARACTER_NOT_IN_REPERTOIRE: &str = "22021";
pub const QUERY_CANCELED: &str = "57014";
pub const SERIALIZATION_FAILURE: &str = "40001";

/// A SQLSTATE is exactly five ASCII digits or uppercase letters.
pub fn is_valid(code: &str) -> bool {
    code.len() == 5
        && code
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase())
}

/// Two-character class prefix of a code (`"23"` for all integrity violations).
pub fn class_of(code: &str) -> Option<&str> {
    if is_valid(code) {
        Some(&code[..2])
    } else {
        None
    }
}

/// Semantic category of a database error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UniqueViolation,
    ForeignKeyViolation,
    InvalidTextRepresentation,
    CharacterNotInRepertoire,
    QueryCanceled,
    /// Aborted to preserve serializable isolation; the only retryable kind.
    SerializationFailure,
    /// Unknown code, or no code at all.
    Other,
}

impl ErrorKind {
    pub fn from_sql_state(code: &str) -> Self {
        match code {
            UNIQUE_VIOLATION => ErrorKind::UniqueViolation,
            FOREIGN_KEY_VIOLATION => ErrorKind::ForeignKeyViolation,
            INVALID_TEXT_REPRESENTATION => ErrorKind::InvalidTextRepresentation,
            CHARACTER_NOT_IN_REPERTOIRE => ErrorKind::CharacterNotInRepertoire,
            QUERY_CANCELED => ErrorKind::QueryCanceled,
            SERIALIZATION_FAILURE => ErrorKind::SerializationFailure,
            _ => ErrorKind::Other,
        }
    }

    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::SerializationFailure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::UniqueViolation => "unique_violation",
            ErrorKind::ForeignKeyViolation => "foreign_key_violation",
            ErrorKind::InvalidTextRepresentation => "invalid_text_representation",
            ErrorKind::CharacterNotInRepertoire => "character_not_in_repertoire",
            ErrorKind::QueryCanceled => "query_canceled",
            ErrorKind::SerializationFailure => "serialization_failure",
            ErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
