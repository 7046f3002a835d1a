//! Error types for the site ledger.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the ledger can surface. Each variant belongs to one
//! [`ErrorKind`], which callers use to decide how to report it.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use thiserror::Error;

/// Broad classification of an [`EngineError`].
///
/// None of these are retried automatically; every failure is terminal for
/// the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or out-of-policy input.
    Validation,
    /// A referenced record does not exist.
    NotFound,
    /// A record is missing required setup.
    State,
    /// The request conflicts with an existing record.
    Conflict,
    /// An unexpected constraint violation while committing.
    Integrity,
    /// Configuration could not be loaded.
    Config,
    /// The database could not be read or written.
    Storage,
}

/// The main error type for the site ledger.
///
/// # Example
///
/// ```
/// use site_ledger::error::{EngineError, ErrorKind};
///
/// let error = EngineError::NotFound {
///     entity: "employee",
///     id: "emp_404".to_string(),
/// };
/// assert_eq!(error.to_string(), "employee not found: emp_404");
/// assert_eq!(error.kind(), ErrorKind::NotFound);
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A configuration value is outside its accepted range.
    #[error("Invalid configuration value for '{field}': {message}")]
    InvalidConfig {
        /// The offending setting.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// A referenced record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of record that was looked up.
        entity: &'static str,
        /// The identifier that was looked up.
        id: String,
    },

    /// A record with the same identifier is already registered.
    #[error("{entity} already exists: {id}")]
    AlreadyExists {
        /// The kind of record.
        entity: &'static str,
        /// The clashing identifier.
        id: String,
    },

    /// The employee is missing setup the operation depends on.
    #[error("Employee '{employee_id}' is in an invalid state: {message}")]
    InvalidState {
        /// The employee concerned.
        employee_id: String,
        /// What is missing.
        message: String,
    },

    /// A ledger entry already exists for this employee and date.
    #[error("Ledger entry already exists for employee '{employee_id}' on {date}")]
    DuplicateEntry {
        /// The employee concerned.
        employee_id: String,
        /// The date that is already recorded.
        date: NaiveDate,
    },

    /// A ledger entry date falls outside the accepted entry window.
    #[error("Entry date {date} is outside the accepted window ({earliest} to {today})")]
    DateOutsideEntryWindow {
        /// The rejected date.
        date: NaiveDate,
        /// The earliest accepted date.
        earliest: NaiveDate,
        /// The processing date.
        today: NaiveDate,
    },

    /// A ledger entry date precedes the employee's join date.
    #[error("Entry date {date} is before employee '{employee_id}' joined on {joined}")]
    DateBeforeJoining {
        /// The employee concerned.
        employee_id: String,
        /// The rejected date.
        date: NaiveDate,
        /// The employee's join date.
        joined: NaiveDate,
    },

    /// A ledger entry date falls inside an already settled period.
    #[error("Entry date {date} is not after the last settled date {settled_until} for employee '{employee_id}'")]
    DateInSettledPeriod {
        /// The employee concerned.
        employee_id: String,
        /// The rejected date.
        date: NaiveDate,
        /// The end date of the latest settlement.
        settled_until: NaiveDate,
    },

    /// A presence fraction is not one of the configured levels.
    #[error("Presence {value} is not an accepted presence level")]
    InvalidPresence {
        /// The rejected value.
        value: Decimal,
    },

    /// An amount is negative or above its configured ceiling.
    #[error("Field '{field}' has out-of-range value {value}")]
    AmountOutOfRange {
        /// The field that was rejected.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    /// A comment is longer than the configured maximum.
    #[error("Comment has {length} characters, the maximum is {max}")]
    CommentTooLong {
        /// Length of the rejected comment in characters.
        length: usize,
        /// The configured maximum.
        max: usize,
    },

    /// A promotion date breaks the chronological ordering rules.
    #[error("Invalid promotion date {date}: {message}")]
    InvalidPromotionDate {
        /// The rejected date.
        date: NaiveDate,
        /// Which rule was broken.
        message: String,
    },

    /// A promotion can no longer be edited or deleted.
    #[error("Promotion '{promotion_id}' is locked: {message}")]
    PromotionLocked {
        /// The locked promotion.
        promotion_id: String,
        /// Why it is locked.
        message: String,
    },

    /// There are no open entries and no payment to record.
    #[error("Nothing to settle for employee '{employee_id}': no open entries and no payment")]
    NoOpSettlement {
        /// The employee concerned.
        employee_id: String,
    },

    /// The employee already has a settlement created today.
    #[error("Employee '{employee_id}' already has settlement '{settlement_id}' created at {created_at}")]
    DuplicateSettlementToday {
        /// The employee concerned.
        employee_id: String,
        /// The settlement that was already created today.
        settlement_id: String,
        /// When that settlement was created.
        created_at: NaiveDateTime,
    },

    /// A settlement field change was refused.
    #[error("Settlement '{settlement_id}' cannot be changed: {message}")]
    SettlementLocked {
        /// The settlement concerned.
        settlement_id: String,
        /// Why the change was refused.
        message: String,
    },

    /// A store constraint was violated while committing a transaction.
    #[error("Integrity violation: {message}")]
    Integrity {
        /// A description of the violated constraint.
        message: String,
    },

    /// The database failed, or holds a value that cannot be decoded.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Returns the broad classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. } => ErrorKind::Config,
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::InvalidState { .. } => ErrorKind::State,
            EngineError::DuplicateEntry { .. }
            | EngineError::DateOutsideEntryWindow { .. }
            | EngineError::DateBeforeJoining { .. }
            | EngineError::DateInSettledPeriod { .. }
            | EngineError::InvalidPresence { .. }
            | EngineError::AmountOutOfRange { .. }
            | EngineError::CommentTooLong { .. }
            | EngineError::InvalidPromotionDate { .. }
            | EngineError::NoOpSettlement { .. } => ErrorKind::Validation,
            EngineError::AlreadyExists { .. }
            | EngineError::PromotionLocked { .. }
            | EngineError::DuplicateSettlementToday { .. }
            | EngineError::SettlementLocked { .. } => ErrorKind::Conflict,
            EngineError::Integrity { .. } => ErrorKind::Integrity,
            EngineError::Storage { .. } => ErrorKind::Storage,
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub(crate) fn integrity(message: impl Into<String>) -> Self {
        EngineError::Integrity {
            message: message.into(),
        }
    }

    pub(crate) fn storage(message: impl Into<String>) -> Self {
        EngineError::Storage {
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for EngineError {
    /// Constraint violations surface as [`EngineError::Integrity`]; every
    /// other database failure is [`EngineError::Storage`].
    fn from(value: rusqlite::Error) -> Self {
        match &value {
            rusqlite::Error::SqliteFailure(err, message)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                EngineError::integrity(message.clone().unwrap_or_else(|| value.to_string()))
            }
            _ => EngineError::storage(value.to_string()),
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(value: std::io::Error) -> Self {
        EngineError::storage(value.to_string())
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_displays_path() {
        let error = EngineError::ConfigNotFound {
            path: "/missing/ledger.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/ledger.yaml"
        );
        assert_eq!(error.kind(), ErrorKind::Config);
    }

    #[test]
    fn test_duplicate_entry_displays_employee_and_date() {
        let error = EngineError::DuplicateEntry {
            employee_id: "emp_001".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        };
        assert_eq!(
            error.to_string(),
            "Ledger entry already exists for employee 'emp_001' on 2024-01-02"
        );
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_duplicate_settlement_is_conflict() {
        let error = EngineError::DuplicateSettlementToday {
            employee_id: "emp_001".to_string(),
            settlement_id: "s-1".to_string(),
            created_at: NaiveDate::from_ymd_opt(2024, 1, 10)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
        };
        assert!(error.to_string().contains("s-1"));
        assert!(error.to_string().contains("2024-01-10 09:30:00"));
        assert_eq!(error.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_no_op_settlement_is_validation() {
        let error = EngineError::NoOpSettlement {
            employee_id: "emp_001".to_string(),
        };
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_already_exists_is_conflict() {
        let error = EngineError::AlreadyExists {
            entity: "site",
            id: "site_x".to_string(),
        };
        assert_eq!(error.to_string(), "site already exists: site_x");
        assert_eq!(error.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_invalid_state_displays_message() {
        let error = EngineError::InvalidState {
            employee_id: "emp_001".to_string(),
            message: "no current site assigned".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Employee 'emp_001' is in an invalid state: no current site assigned"
        );
        assert_eq!(error.kind(), ErrorKind::State);
    }

    #[test]
    fn test_integrity_helper() {
        let error = EngineError::integrity("duplicate key");
        assert_eq!(error.to_string(), "Integrity violation: duplicate key");
        assert_eq!(error.kind(), ErrorKind::Integrity);
    }

    #[test]
    fn test_comment_too_long_is_validation() {
        let error = EngineError::CommentTooLong { length: 151, max: 150 };
        assert_eq!(error.to_string(), "Comment has 151 characters, the maximum is 150");
        assert_eq!(error.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_sqlite_constraint_violation_is_integrity() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id TEXT PRIMARY KEY); INSERT INTO t VALUES ('a');")
            .unwrap();
        let error: EngineError = conn
            .execute("INSERT INTO t VALUES ('a')", [])
            .unwrap_err()
            .into();
        assert_eq!(error.kind(), ErrorKind::Integrity);

        let error: EngineError = conn
            .execute("INSERT INTO missing VALUES ('a')", [])
            .unwrap_err()
            .into();
        assert_eq!(error.kind(), ErrorKind::Storage);
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<EngineError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn returns_not_found() -> EngineResult<()> {
            Err(EngineError::not_found("site", "site_x"))
        }

        fn propagates_error() -> EngineResult<()> {
            returns_not_found()?;
            Ok(())
        }

        assert!(propagates_error().is_err());
    }
}
