//! Core data models for the site ledger.
//!
//! This module contains all the domain models used throughout the ledger.

mod employee;
mod ledger_entry;
mod settlement;
mod site;
mod summary;

pub use employee::{Employee, Promotion};
pub use ledger_entry::{LedgerEntry, LedgerEntryUpdate, LedgerSnapshot, NewLedgerEntry};
pub use settlement::{AggregateResult, DayContribution, Settlement, SiteBreakdown, SiteWorkRecord};
pub use site::{CostKind, Site, SiteBill, SiteCash, SiteCost};
pub use summary::{
    DateSummary, DaySummary, ProfitBreakdown, RollingSummary, SummaryDetail, TotalSummary,
};
