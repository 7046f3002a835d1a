//! The ledger engine.
//!
//! [`Ledger`] is the single entry point the application layer calls into.
//! It owns the store, the clock and the policy configuration, and runs every
//! write as one SQLite transaction. It performs no authorization of its own;
//! callers are trusted to have checked what the requester may do.

mod daily;
mod directory;
mod promotions;
mod settlement;
mod summary;

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::error::EngineResult;
use crate::store::LedgerStore;

/// Labour ledger and work-session settlement engine.
///
/// Cloning is cheap; clones share the same store.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use site_ledger::clock::FixedClock;
/// use site_ledger::config::LedgerConfig;
/// use site_ledger::ledger::Ledger;
/// use site_ledger::models::{Employee, NewLedgerEntry, Site};
/// use site_ledger::store::LedgerStore;
///
/// let today = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
/// let joined = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let ledger = Ledger::with_store(
///     Arc::new(LedgerStore::in_memory().unwrap()),
///     LedgerConfig::default(),
///     Arc::new(FixedClock::at_date(today)),
/// );
///
/// ledger
///     .register_site(Site {
///         id: "site_x".to_string(),
///         name: "Tower A".to_string(),
///         location: String::new(),
///         start_at: joined,
///         handover: None,
///     })
///     .unwrap();
/// ledger
///     .register_employee(Employee::new("emp_001", "Rahim", joined).with_site("site_x"))
///     .unwrap();
/// ledger.create_promotion("emp_001", joined, Decimal::from(100)).unwrap();
/// ledger
///     .create_ledger_entry("site_x", NewLedgerEntry::new("emp_001", today, Decimal::ONE))
///     .unwrap();
///
/// let settlement = ledger.create_settlement("emp_001", Decimal::ZERO).unwrap();
/// assert_eq!(settlement.rest_payable(), Decimal::from(100));
/// ```
#[derive(Clone)]
pub struct Ledger {
    store: Arc<LedgerStore>,
    clock: Arc<dyn Clock>,
    config: Arc<LedgerConfig>,
}

impl Ledger {
    /// Opens the ledger database named by `config.storage.database_path`.
    pub fn open(config: LedgerConfig, clock: Arc<dyn Clock>) -> EngineResult<Self> {
        config.validate()?;
        let store = LedgerStore::open(&config.storage.database_path)?;
        Ok(Self::with_store(Arc::new(store), config, clock))
    }

    /// Creates a ledger over an existing store.
    pub fn with_store(store: Arc<LedgerStore>, config: LedgerConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            config: Arc::new(config),
        }
    }

    /// Opens the configured ledger database on the system clock.
    pub fn with_system_clock(config: LedgerConfig) -> EngineResult<Self> {
        Self::open(config, Arc::new(SystemClock))
    }

    /// Returns the policy configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Returns the time source.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &LedgerStore {
        &self.store
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("store", &self.store)
            .field("now", &self.clock.now())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Shared fixtures for the ledger tests.

    use std::sync::Arc;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::Ledger;
    use crate::clock::FixedClock;
    use crate::config::LedgerConfig;
    use crate::models::{Employee, NewLedgerEntry, Site};
    use crate::store::LedgerStore;

    pub fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    pub fn site(id: &str) -> Site {
        Site {
            id: id.to_string(),
            name: format!("Site {id}"),
            location: String::new(),
            start_at: jan(1),
            handover: None,
        }
    }

    /// A ledger over `store` on 2024-01-02 with sites X and Y, and `emp_001`
    /// joined on 2024-01-01 at rate 100, assigned to site X.
    pub fn ledger_on(store: LedgerStore) -> (Ledger, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::at_date(jan(2)));
        let ledger = Ledger::with_store(Arc::new(store), LedgerConfig::default(), clock.clone());
        ledger.register_site(site("site_x")).unwrap();
        ledger.register_site(site("site_y")).unwrap();
        ledger
            .register_employee(Employee::new("emp_001", "Rahim", jan(1)).with_site("site_x"))
            .unwrap();
        ledger
            .create_promotion("emp_001", jan(1), Decimal::from(100))
            .unwrap();
        (ledger, clock)
    }

    /// [`ledger_on`] over an in-memory database.
    pub fn ledger() -> (Ledger, Arc<FixedClock>) {
        ledger_on(LedgerStore::in_memory().unwrap())
    }

    pub fn present(employee_id: &str, date: NaiveDate) -> NewLedgerEntry {
        NewLedgerEntry::new(employee_id, date, Decimal::ONE)
    }
}
