//! Settlement (work session) models.
//!
//! A [`Settlement`] closes all of an employee's open ledger entries into one
//! payable record. Its [`rest_payable`](Settlement::rest_payable) carries
//! forward as the next settlement's `last_settlement_payable`, so settled
//! figures are never recomputed.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::LedgerEntry;

/// One consumed day of work, as it contributed to a site's totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayContribution {
    /// The calendar day worked.
    pub date: NaiveDate,
    /// Fractional work-days.
    pub presence: Decimal,
    /// Salary rate in force on `date`.
    pub salary_rate: Decimal,
    /// `presence * salary_rate`, unrounded.
    pub earned_salary: Decimal,
    /// Subsistence allowance taken that day.
    pub subsistence: Decimal,
    /// Advance taken that day.
    pub advance: Decimal,
}

/// Per-site totals of an open or settled period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteBreakdown {
    /// The site where the work was done.
    pub site_id: String,
    /// Total presence at this site.
    pub presence: Decimal,
    /// Total subsistence taken at this site.
    pub subsistence: Decimal,
    /// Total advance taken at this site.
    pub advance: Decimal,
    /// Earned salary at this site, rounded to the currency scale.
    pub earned_salary: Decimal,
    /// `earned_salary - (subsistence + advance)`.
    pub payable: Decimal,
    /// The consumed days, oldest first.
    pub days: Vec<DayContribution>,
}

/// Everything needed to create the next settlement for an employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// The employee whose open entries were aggregated.
    pub employee_id: String,
    /// Earliest open entry date.
    pub start_date: NaiveDate,
    /// Latest open entry date.
    pub end_date: NaiveDate,
    /// Number of open entries.
    pub entry_count: usize,
    /// Total presence across all sites.
    pub total_presence: Decimal,
    /// Total subsistence across all sites.
    pub total_subsistence: Decimal,
    /// Total advance across all sites.
    pub total_advance: Decimal,
    /// Total earned salary across all sites.
    pub earned_salary: Decimal,
    /// Rate in force on `end_date`.
    pub session_salary_rate: Decimal,
    /// `rest_payable` of the previous settlement, or zero.
    pub last_settlement_payable: Decimal,
    /// Per-site breakdown, ordered by site id.
    pub sites: Vec<SiteBreakdown>,
    /// The latest open entry.
    pub last_entry: LedgerEntry,
}

impl AggregateResult {
    /// Subsistence plus advance across all sites.
    pub fn total_taken(&self) -> Decimal {
        self.total_subsistence + self.total_advance
    }

    /// Net amount earned in the open period.
    pub fn payable(&self) -> Decimal {
        self.earned_salary - self.total_taken()
    }

    /// Amount owed including the carried-forward balance.
    pub fn total_payable(&self) -> Decimal {
        self.last_settlement_payable + self.payable()
    }
}

/// A settled work session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Unique identifier.
    pub id: Uuid,
    /// The settled employee.
    pub employee_id: String,
    /// The site that initiated the settlement.
    pub site_id: String,
    /// Earliest consumed entry date (creation date if none).
    pub start_date: NaiveDate,
    /// Latest consumed entry date (creation date if none).
    pub end_date: NaiveDate,
    /// When the settlement was created.
    pub created_at: NaiveDateTime,
    /// Whether a one-off `pay_or_return` adjustment has been granted.
    pub update_permission: bool,
    /// Total presence consumed.
    pub total_presence: Decimal,
    /// Total subsistence consumed.
    pub total_subsistence: Decimal,
    /// Total advance consumed.
    pub total_advance: Decimal,
    /// Rate in force on `end_date`.
    pub session_salary_rate: Decimal,
    /// Earned salary, evaluated per entry at each entry's own rate.
    pub earned_salary: Decimal,
    /// `rest_payable` of the previous settlement.
    pub last_settlement_payable: Decimal,
    /// Money handed over (positive) or returned (negative) at settlement time.
    pub pay_or_return: Decimal,
}

impl Settlement {
    /// The local calendar day the settlement was created.
    pub fn created_date(&self) -> NaiveDate {
        self.created_at.date()
    }

    /// Subsistence plus advance consumed.
    pub fn total_taken(&self) -> Decimal {
        self.total_subsistence + self.total_advance
    }

    /// Net amount earned during this session.
    pub fn this_settlement_payable(&self) -> Decimal {
        self.earned_salary - self.total_taken()
    }

    /// Amount owed including the carried-forward balance.
    pub fn total_payable(&self) -> Decimal {
        self.last_settlement_payable + self.this_settlement_payable()
    }

    /// Balance left after `pay_or_return`; negative means the employee owes.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    /// use site_ledger::models::Settlement;
    /// use uuid::Uuid;
    ///
    /// let day = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    /// let settlement = Settlement {
    ///     id: Uuid::new_v4(),
    ///     employee_id: "emp_001".to_string(),
    ///     site_id: "site_x".to_string(),
    ///     start_date: day,
    ///     end_date: day,
    ///     created_at: day.and_hms_opt(9, 0, 0).unwrap(),
    ///     update_permission: false,
    ///     total_presence: Decimal::ZERO,
    ///     total_subsistence: Decimal::ZERO,
    ///     total_advance: Decimal::ZERO,
    ///     session_salary_rate: Decimal::from(100),
    ///     earned_salary: Decimal::ZERO,
    ///     last_settlement_payable: Decimal::from(500),
    ///     pay_or_return: Decimal::from(500),
    /// };
    /// assert_eq!(settlement.rest_payable(), Decimal::ZERO);
    /// ```
    pub fn rest_payable(&self) -> Decimal {
        self.total_payable() - self.pay_or_return
    }
}

/// One site's share of a settlement.
///
/// Only the row with `session_owner == true` carries a non-zero
/// `pay_or_return`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteWorkRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// The owning settlement.
    pub settlement_id: Uuid,
    /// The settled employee.
    pub employee_id: String,
    /// The site where the work was done.
    pub site_id: String,
    /// Whether this is the settlement's originating site.
    pub session_owner: bool,
    /// Total presence at this site.
    pub presence: Decimal,
    /// Earned salary at this site.
    pub earned_salary: Decimal,
    /// Subsistence taken at this site.
    pub subsistence: Decimal,
    /// Advance taken at this site.
    pub advance: Decimal,
    /// Money handed over or returned; zero unless `session_owner`.
    pub pay_or_return: Decimal,
    /// The day the settlement was created.
    pub created_date: NaiveDate,
    /// The settlement's start date.
    pub start_date: NaiveDate,
    /// The settlement's end date.
    pub end_date: NaiveDate,
    /// The consumed days, oldest first.
    pub days: Vec<DayContribution>,
}

impl SiteWorkRecord {
    /// `earned_salary - (subsistence + advance)`.
    pub fn payable(&self) -> Decimal {
        self.earned_salary - (self.subsistence + self.advance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn sample_settlement() -> Settlement {
        Settlement {
            id: Uuid::new_v4(),
            employee_id: "emp_001".to_string(),
            site_id: "site_x".to_string(),
            start_date: day(1),
            end_date: day(9),
            created_at: day(10).and_hms_opt(17, 0, 0).unwrap(),
            update_permission: false,
            total_presence: dec!(8.5),
            total_subsistence: dec!(400),
            total_advance: dec!(1000),
            session_salary_rate: dec!(600),
            earned_salary: dec!(5100),
            last_settlement_payable: dec!(300),
            pay_or_return: dec!(3000),
        }
    }

    #[test]
    fn test_settlement_derived_amounts() {
        let settlement = sample_settlement();
        assert_eq!(settlement.total_taken(), dec!(1400));
        assert_eq!(settlement.this_settlement_payable(), dec!(3700));
        assert_eq!(settlement.total_payable(), dec!(4000));
        assert_eq!(settlement.rest_payable(), dec!(1000));
        assert_eq!(settlement.created_date(), day(10));
    }

    #[test]
    fn test_overpayment_leaves_negative_rest_payable() {
        let mut settlement = sample_settlement();
        settlement.pay_or_return = dec!(4500);
        assert_eq!(settlement.rest_payable(), dec!(-500));
    }

    #[test]
    fn test_site_work_record_payable() {
        let record = SiteWorkRecord {
            id: Uuid::new_v4(),
            settlement_id: Uuid::new_v4(),
            employee_id: "emp_001".to_string(),
            site_id: "site_y".to_string(),
            session_owner: false,
            presence: dec!(2),
            earned_salary: dec!(1200),
            subsistence: dec!(100),
            advance: dec!(300),
            pay_or_return: Decimal::ZERO,
            created_date: day(10),
            start_date: day(1),
            end_date: day(9),
            days: vec![],
        };
        assert_eq!(record.payable(), dec!(800));
    }
}
