//! Employee and promotion models.
//!
//! An employee's salary rate is never stored on the employee itself; it is
//! always derived from the promotion history via
//! [`resolve_salary`](crate::calculation::resolve_salary).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A worker whose attendance is tracked in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The date the employee joined.
    pub date_joined: NaiveDate,
    /// The site the employee is currently assigned to, if any.
    #[serde(default)]
    pub current_site: Option<String>,
}

impl Employee {
    /// Creates an employee with no site assignment.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use site_ledger::models::Employee;
    ///
    /// let employee = Employee::new("emp_001", "Rahim", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
    ///     .with_site("site_x");
    /// assert_eq!(employee.current_site.as_deref(), Some("site_x"));
    /// ```
    pub fn new(id: impl Into<String>, name: impl Into<String>, date_joined: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            date_joined,
            current_site: None,
        }
    }

    /// Returns the employee assigned to `site_id`.
    pub fn with_site(mut self, site_id: impl Into<String>) -> Self {
        self.current_site = Some(site_id.into());
        self
    }
}

/// A salary rate that takes effect on a date.
///
/// Unique per `(employee_id, effective_date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    /// Unique identifier for the promotion.
    pub id: Uuid,
    /// The employee the promotion belongs to.
    pub employee_id: String,
    /// The first day the rate applies.
    pub effective_date: NaiveDate,
    /// Daily salary rate.
    pub salary_rate: Decimal,
}

impl Promotion {
    /// Creates a promotion with a fresh identifier.
    pub fn new(employee_id: impl Into<String>, effective_date: NaiveDate, salary_rate: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id: employee_id.into(),
            effective_date,
            salary_rate,
        }
    }
}
