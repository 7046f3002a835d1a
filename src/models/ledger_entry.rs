//! Daily ledger entry and snapshot models.
//!
//! A [`LedgerEntry`] is one employee's attendance and cash taken for one
//! calendar day. It stays open until a settlement consumes it. Entries dated
//! close to the settlement day are copied into [`LedgerSnapshot`]s first so
//! that same-day reporting keeps seeing them.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An open (unsettled) attendance record.
///
/// Unique per `(employee_id, date)` regardless of site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier.
    pub id: Uuid,
    /// The employee who worked.
    pub employee_id: String,
    /// The site the work was done at.
    pub site_id: String,
    /// The calendar day worked.
    pub date: NaiveDate,
    /// Fractional work-days (0, 0.5, 1, 1.5, ...).
    pub presence: Decimal,
    /// Subsistence allowance handed out that day.
    pub subsistence: Decimal,
    /// Advance handed out that day.
    pub advance: Decimal,
    /// Free-form note.
    pub comment: Option<String>,
    /// When the entry was recorded.
    pub created_at: NaiveDateTime,
}

impl LedgerEntry {
    /// Money taken by the employee that day.
    pub fn taken(&self) -> Decimal {
        self.subsistence + self.advance
    }
}

/// Input for creating a ledger entry.
///
/// The site is not part of the input; it is injected from the submitter's
/// site context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLedgerEntry {
    /// The employee who worked.
    pub employee_id: String,
    /// The calendar day worked.
    pub date: NaiveDate,
    /// Fractional work-days.
    pub presence: Decimal,
    /// Subsistence allowance handed out that day.
    #[serde(default)]
    pub subsistence: Decimal,
    /// Advance handed out that day.
    #[serde(default)]
    pub advance: Decimal,
    /// Free-form note.
    #[serde(default)]
    pub comment: Option<String>,
}

impl NewLedgerEntry {
    /// Creates an entry input with no money taken.
    pub fn new(employee_id: impl Into<String>, date: NaiveDate, presence: Decimal) -> Self {
        Self {
            employee_id: employee_id.into(),
            date,
            presence,
            subsistence: Decimal::ZERO,
            advance: Decimal::ZERO,
            comment: None,
        }
    }

    /// Sets the subsistence amount.
    pub fn with_subsistence(mut self, subsistence: Decimal) -> Self {
        self.subsistence = subsistence;
        self
    }

    /// Sets the advance amount.
    pub fn with_advance(mut self, advance: Decimal) -> Self {
        self.advance = advance;
        self
    }
}

/// New quantities for an open ledger entry.
///
/// The employee, site and date of an entry never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntryUpdate {
    /// Fractional work-days.
    pub presence: Decimal,
    /// Subsistence allowance handed out that day.
    #[serde(default)]
    pub subsistence: Decimal,
    /// Advance handed out that day.
    #[serde(default)]
    pub advance: Decimal,
    /// Free-form note.
    #[serde(default)]
    pub comment: Option<String>,
}

/// Immutable copy of a ledger entry taken just before a settlement deletes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Unique identifier.
    pub id: Uuid,
    /// The entry this snapshot was copied from.
    pub entry_id: Uuid,
    /// The settlement that consumed the entry.
    pub settlement_id: Uuid,
    /// The employee who worked.
    pub employee_id: String,
    /// The site the work was done at.
    pub site_id: String,
    /// The calendar day worked.
    pub date: NaiveDate,
    /// Fractional work-days.
    pub presence: Decimal,
    /// Subsistence allowance handed out that day.
    pub subsistence: Decimal,
    /// Advance handed out that day.
    pub advance: Decimal,
    /// Salary rate in force on `date`.
    pub salary_rate: Decimal,
    /// Free-form note.
    pub comment: Option<String>,
    /// When the snapshot was taken.
    pub created_at: NaiveDateTime,
}

impl LedgerSnapshot {
    /// Copies `entry` as consumed by `settlement_id`.
    pub fn of(
        entry: &LedgerEntry,
        settlement_id: Uuid,
        salary_rate: Decimal,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            entry_id: entry.id,
            settlement_id,
            employee_id: entry.employee_id.clone(),
            site_id: entry.site_id.clone(),
            date: entry.date,
            presence: entry.presence,
            subsistence: entry.subsistence,
            advance: entry.advance,
            salary_rate,
            comment: entry.comment.clone(),
            created_at,
        }
    }
}
