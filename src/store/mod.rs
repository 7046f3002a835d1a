//! SQLite-backed ledger store.
//!
//! The store owns one [`rusqlite::Connection`] behind a
//! [`parking_lot::Mutex`]. A [`transaction`] takes the database write lock
//! up front and commits only when its closure returns `Ok`; dropping the
//! uncommitted transaction rolls every change back, so no reader ever
//! observes a half-applied change. A [`read`] runs inside a deferred
//! transaction and sees one consistent snapshot.
//!
//! [`transaction`]: LedgerStore::transaction
//! [`read`]: LedgerStore::read

mod rows;
mod schema;
mod state;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use parking_lot::Mutex;
use rusqlite::{Connection, TransactionBehavior};
use tracing::info;

use crate::error::EngineResult;

pub use state::LedgerState;

/// How long a statement waits on a database locked by another process.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared, transactional home of the ledger tables.
#[derive(Debug)]
pub struct LedgerStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl LedgerStore {
    /// Opens (or creates) the database at `path`.
    ///
    /// Missing parent directories are created and the schema is applied.
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
        let store = Self::initialize(conn, Some(path.to_path_buf()))?;
        info!(path = %path.display(), "Ledger database opened");
        Ok(store)
    }

    /// Opens a private database that lives only as long as the store.
    ///
    /// Used by tests and tools; nothing written here survives a restart.
    pub fn in_memory() -> EngineResult<Self> {
        Self::initialize(Connection::open_in_memory()?, None)
    }

    fn initialize(conn: Connection, path: Option<PathBuf>) -> EngineResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(schema::SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path,
        })
    }

    /// The database file, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Runs `f` against one consistent snapshot of the tables.
    pub fn read<T>(&self, f: impl FnOnce(&LedgerState<'_>) -> EngineResult<T>) -> EngineResult<T> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let state = LedgerState::new(&tx);
        f(&state)
    }

    /// Runs `f` as one all-or-nothing transaction.
    ///
    /// Writers are serialized. If `f` fails, none of its changes are kept.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use site_ledger::error::EngineError;
    /// use site_ledger::models::Employee;
    /// use site_ledger::store::LedgerStore;
    ///
    /// let store = LedgerStore::in_memory().unwrap();
    /// let joined = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let employee = Employee::new("emp_001", "Rahim", joined);
    ///
    /// let result: Result<(), EngineError> = store.transaction(|state| {
    ///     state.insert_employee(&employee)?;
    ///     state.insert_employee(&employee)
    /// });
    ///
    /// assert!(result.is_err());
    /// assert!(store.read(|state| state.find_employee("emp_001")).unwrap().is_none());
    /// ```
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&LedgerState<'_>) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&LedgerState::new(&tx))?;
        tx.commit()?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::{Employee, Site};
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::thread;

    fn joined() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn site_x() -> Site {
        Site {
            id: "site_x".to_string(),
            name: "Tower A".to_string(),
            location: String::new(),
            start_at: joined(),
            handover: None,
        }
    }

    #[test]
    fn test_committed_transaction_is_visible() {
        let store = LedgerStore::in_memory().unwrap();
        store
            .transaction(|state| state.insert_employee(&Employee::new("emp_001", "Rahim", joined())))
            .unwrap();
        assert!(store.read(|state| state.employee("emp_001")).is_ok());
    }

    #[test]
    fn test_failed_transaction_leaves_no_trace() {
        let store = LedgerStore::in_memory().unwrap();
        let result = store.transaction(|state| {
            state.insert_site(&site_x())?;
            state.employee("ghost").map(|_| ())
        });

        assert!(matches!(result, Err(EngineError::NotFound { .. })));
        assert!(store.read(|state| state.find_site("site_x")).unwrap().is_none());
    }

    #[test]
    fn test_unknown_site_reference_is_rejected() {
        let store = LedgerStore::in_memory().unwrap();
        let employee = Employee::new("emp_001", "Rahim", joined()).with_site("nowhere");
        let result = store.transaction(|state| state.insert_employee(&employee));
        assert!(matches!(result, Err(EngineError::Integrity { .. })));
    }

    #[test]
    fn test_concurrent_writers_are_serialized() {
        let store = Arc::new(LedgerStore::in_memory().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store.transaction(|state| {
                        state.insert_employee(&Employee::new("emp_001", "Rahim", joined()))
                    })
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|r| r.is_ok())
            .count();
        assert_eq!(successes, 1);
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("ledger.db");

        {
            let store = LedgerStore::open(&path).unwrap();
            assert_eq!(store.path(), Some(path.as_path()));
            store
                .transaction(|state| {
                    state.insert_site(&site_x())?;
                    state.insert_employee(
                        &Employee::new("emp_001", "Rahim", joined()).with_site("site_x"),
                    )
                })
                .unwrap();
        }

        let reopened = LedgerStore::open(&path).unwrap();
        let employee = reopened.read(|state| state.employee("emp_001")).unwrap();
        assert_eq!(employee.current_site.as_deref(), Some("site_x"));
    }
}
