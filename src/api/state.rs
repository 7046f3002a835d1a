//! Application state for the site ledger API.

use crate::ledger::Ledger;

/// Shared application state.
///
/// Holds the ledger engine every handler calls into.
#[derive(Clone, Debug)]
pub struct AppState {
    ledger: Ledger,
}

impl AppState {
    /// Creates a new application state around `ledger`.
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    /// Returns the ledger engine.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}
