//! Store error taxonomy.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Failures surfaced by the repository layer.
///
/// Callers can tell "no such row" from "the write violated a constraint"
/// from "the store itself failed"; handlers map each kind to its own
/// HTTP response.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("constraint violation: {0}")]
    Constraint(String),

    #[error("database error: {0}")]
    Store(#[from] DbErr),
}

impl StoreError {
    /// Classify a database error. FK and uniqueness violations become
    /// `Constraint`; everything else stays a `Store` failure.
    pub fn from_db(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => StoreError::Constraint(msg),
            Some(SqlErr::UniqueConstraintViolation(msg)) => StoreError::Constraint(msg),
            _ => StoreError::Store(err),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Display messages ──────────────────────────────────────────────

    #[test]
    fn test_display_not_found() {
        assert_eq!(StoreError::NotFound.to_string(), "record not found");
    }

    #[test]
    fn test_display_validation() {
        let err = StoreError::validation("name is required");
        assert_eq!(err.to_string(), "invalid input: name is required");
    }

    #[test]
    fn test_display_constraint() {
        let err = StoreError::Constraint("fk_shows_artist_id".into());
        assert_eq!(err.to_string(), "constraint violation: fk_shows_artist_id");
    }

    // ── From conversions ──────────────────────────────────────────────

    #[test]
    fn test_from_db_error() {
        let db_err = DbErr::Custom("test db error".into());
        let err: StoreError = db_err.into();
        assert!(matches!(err, StoreError::Store(_)));
        assert!(err.to_string().contains("test db error"));
    }

    #[test]
    fn test_from_db_unclassified_stays_store() {
        let err = StoreError::from_db(DbErr::Custom("boom".into()));
        assert!(matches!(err, StoreError::Store(_)));
    }

    // ── Error trait source chain ──────────────────────────────────────

    #[test]
    fn test_error_source() {
        use std::error::Error;
        let err: StoreError = DbErr::Custom("inner".into()).into();
        assert!(err.source().is_some());
        assert!(StoreError::NotFound.source().is_none());
    }
}
