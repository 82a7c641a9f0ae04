//! Capability lookup: find a driver error that can report its SQLSTATE.
//!
//! Errors reach the classifier wrapped in arbitrary application error types.
//! We walk the `source()` chain and downcast each link against the driver
//! error types we know about.

use std::borrow::Cow;
use std::error::Error as StdError;

use sqlx::error::DatabaseError;

/// Narrow view of a driver error: state code, constraint and message.
pub trait DatabaseErrorInfo {
    /// Raw code as reported by the driver (not necessarily a SQLSTATE).
    fn sql_state(&self) -> Option<Cow<'_, str>>;

    /// Constraint name if the driver exposes it as a structured field.
    fn constraint(&self) -> Option<&str> {
        None
    }

    /// Human-readable message, used as the fallback for constraint extraction.
    fn message(&self) -> Option<&str> {
        None
    }
}

/// Portable database error for drivers without a built-in binding.
///
/// Adapters map their driver's error into this type (or keep it somewhere in
/// their error's `source()` chain) to make it visible to the classifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message} (SQLSTATE {code})")]
pub struct SqlStateError {
    code: String,
    message: String,
    constraint: Option<String>,
}

impl SqlStateError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            constraint: None,
        }
    }

    pub fn with_constraint(mut self, constraint: impl Into<String>) -> Self {
        self.constraint = Some(constraint.into());
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl DatabaseErrorInfo for SqlStateError {
    fn sql_state(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.code))
    }

    fn constraint(&self) -> Option<&str> {
        self.constraint.as_deref()
    }

    fn message(&self) -> Option<&str> {
        Some(&self.message)
    }
}

impl DatabaseErrorInfo for dyn DatabaseError {
    fn sql_state(&self) -> Option<Cow<'_, str>> {
        self.code()
    }

    fn constraint(&self) -> Option<&str> {
        DatabaseError::constraint(self)
    }

    fn message(&self) -> Option<&str> {
        Some(DatabaseError::message(self))
    }
}

/// A link of an error chain that exposes [`DatabaseErrorInfo`].
#[derive(Clone, Copy)]
pub enum DbErrorRef<'a> {
    Portable(&'a SqlStateError),
    Sqlx(&'a (dyn DatabaseError + 'static)),
}

impl<'a> DbErrorRef<'a> {
    /// Checked downcast of a single link (does not walk the chain).
    pub fn from_link(link: &'a (dyn StdError + 'static)) -> Option<Self> {
        if let Some(e) = link.downcast_ref::<SqlStateError>() {
            return Some(DbErrorRef::Portable(e));
        }
        if let Some(sqlx::Error::Database(db)) = link.downcast_ref::<sqlx::Error>() {
            return Some(DbErrorRef::Sqlx(&**db));
        }
        if let Some(e) = link.downcast_ref::<sqlx::postgres::PgDatabaseError>() {
            return Some(DbErrorRef::Sqlx(e));
        }
        if let Some(e) = link.downcast_ref::<sqlx::sqlite::SqliteError>() {
            return Some(DbErrorRef::Sqlx(e));
        }
        None
    }
}

impl DatabaseErrorInfo for DbErrorRef<'_> {
    fn sql_state(&self) -> Option<Cow<'_, str>> {
        match self {
            DbErrorRef::Portable(e) => e.sql_state(),
            DbErrorRef::Sqlx(e) => e.sql_state(),
        }
    }

    fn constraint(&self) -> Option<&str> {
        match self {
            DbErrorRef::Portable(e) => e.constraint(),
            DbErrorRef::Sqlx(e) => DatabaseErrorInfo::constraint(*e),
        }
    }

    fn message(&self) -> Option<&str> {
        match self {
            DbErrorRef::Portable(e) => e.message(),
            DbErrorRef::Sqlx(e) => DatabaseErrorInfo::message(*e),
        }
    }
}

impl std::fmt::Debug for DbErrorRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbErrorRef")
            .field("sql_state", &self.sql_state())
            .field("constraint", &self.constraint())
            .field("message", &self.message())
            .finish()
    }
}

/// Iterate `err` and its sources, outermost first.
pub fn chain<'a>(
    err: &'a (dyn StdError + 'static),
) -> impl Iterator<Item = &'a (dyn StdError + 'static)> {
    std::iter::successors(Some(err), |e| (*e).source())
}

/// First link in the chain that is a known database error.
pub fn find_database_error<'a>(err: &'a (dyn StdError + 'static)) -> Option<DbErrorRef<'a>> {
    chain(err).find_map(DbErrorRef::from_link)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    enum AppError {
        #[error("loading user")]
        Load(#[source] SqlStateError),
        #[error("io")]
        Io(#[from] std::io::Error),
    }

    #[test]
    fn finds_wrapped_portable_error() {
        let err = AppError::Load(SqlStateError::new("23505", "dup").with_constraint("k"));
        let found = find_database_error(&err).expect("db error in chain");
        assert_eq!(found.sql_state().as_deref(), Some("23505"));
        assert_eq!(found.constraint(), Some("k"));
        assert_eq!(found.message(), Some("dup"));
    }

    #[test]
    fn no_database_error_in_chain() {
        let err = AppError::Io(std::io::Error::other("disk"));
        assert!(find_database_error(&err).is_none());
    }

    #[test]
    fn non_database_sqlx_error_is_skipped() {
        let err = sqlx::Error::RowNotFound;
        assert!(find_database_error(&err).is_none());
    }

    #[test]
    fn chain_yields_outermost_first() {
        let err = AppError::Load(SqlStateError::new("40001", "conflict"));
        let links: Vec<String> = chain(&err).map(|e| e.to_string()).collect();
        assert_eq!(links, vec!["loading user", "conflict (SQLSTATE 40001)"]);
    }
}
