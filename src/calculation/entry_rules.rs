//! Ledger entry validation rules.
//!
//! Entry dates are checked against the processing date, never trusted from
//! the client: an entry must fall inside the entry window, on or after the
//! employee's join date, and strictly after the last settled date.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::config::LedgerConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::Employee;

/// Checks that `date` is an acceptable ledger entry date for `employee`.
///
/// # Arguments
///
/// * `employee` - The employee the entry is for
/// * `date` - The proposed entry date
/// * `today` - The processing date
/// * `window_days` - How many days before `today` are still accepted
/// * `settled_until` - `end_date` of the employee's latest settlement, if any
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use site_ledger::calculation::check_entry_date;
/// use site_ledger::models::Employee;
///
/// let jan = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let employee = Employee::new("emp_001", "Rahim", jan(1));
///
/// assert!(check_entry_date(&employee, jan(10), jan(10), 1, None).is_ok());
/// assert!(check_entry_date(&employee, jan(9), jan(10), 1, None).is_ok());
/// assert!(check_entry_date(&employee, jan(8), jan(10), 1, None).is_err());
/// assert!(check_entry_date(&employee, jan(9), jan(10), 1, Some(jan(9))).is_err());
/// ```
pub fn check_entry_date(
    employee: &Employee,
    date: NaiveDate,
    today: NaiveDate,
    window_days: u32,
    settled_until: Option<NaiveDate>,
) -> EngineResult<()> {
    let earliest = window_start(today, window_days);
    if date < earliest || date > today {
        return Err(EngineError::DateOutsideEntryWindow {
            date,
            earliest,
            today,
        });
    }

    if date < employee.date_joined {
        return Err(EngineError::DateBeforeJoining {
            employee_id: employee.id.clone(),
            date,
            joined: employee.date_joined,
        });
    }

    if let Some(settled_until) = settled_until {
        if date <= settled_until {
            return Err(EngineError::DateInSettledPeriod {
                employee_id: employee.id.clone(),
                date,
                settled_until,
            });
        }
    }

    Ok(())
}

/// The first day of a window of `window_days` days ending on `today`.
///
/// Saturates at [`NaiveDate::MIN`] instead of overflowing.
pub fn window_start(today: NaiveDate, window_days: u32) -> NaiveDate {
    today
        .checked_sub_signed(Duration::days(i64::from(window_days)))
        .unwrap_or(NaiveDate::MIN)
}

/// Rejects comments longer than `attendance.max_comment_length` characters.
pub fn check_entry_comment(comment: Option<&str>, config: &LedgerConfig) -> EngineResult<()> {
    let max = config.attendance.max_comment_length;
    match comment.map(|c| c.chars().count()) {
        Some(length) if length > max => Err(EngineError::CommentTooLong { length, max }),
        _ => Ok(()),
    }
}

/// Checks presence and money amounts against the attendance policy.
pub fn check_entry_amounts(
    presence: Decimal,
    subsistence: Decimal,
    advance: Decimal,
    config: &LedgerConfig,
) -> EngineResult<()> {
    if !config.is_presence_level(presence) {
        return Err(EngineError::InvalidPresence { value: presence });
    }
    if subsistence < Decimal::ZERO || subsistence > config.attendance.max_subsistence {
        return Err(EngineError::AmountOutOfRange {
            field: "subsistence",
            value: subsistence,
        });
    }
    check_non_negative("advance", advance)
}

/// Rejects negative amounts.
pub fn check_non_negative(field: &'static str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::AmountOutOfRange { field, value });
    }
    Ok(())
}
