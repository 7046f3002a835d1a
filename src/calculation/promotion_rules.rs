//! Promotion ordering and locking rules.
//!
//! Settled totals were computed with the rates in force at the time, so a
//! promotion that a settlement depends on can never change. All checks take
//! the employee's promotions in any order plus `settled_until`, the
//! `end_date` of the employee's latest settlement.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::Promotion;

/// Checks a salary rate against `0..=max_salary_rate`.
pub fn check_salary_rate(salary_rate: Decimal, max_salary_rate: Decimal) -> EngineResult<()> {
    if salary_rate < Decimal::ZERO || salary_rate > max_salary_rate {
        return Err(EngineError::AmountOutOfRange {
            field: "salary_rate",
            value: salary_rate,
        });
    }
    Ok(())
}

/// Checks the date of a promotion about to be created.
///
/// The first promotion must be dated on the join date. Later ones must be
/// strictly after both the latest promotion and `settled_until`.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use site_ledger::calculation::check_new_promotion;
/// use site_ledger::models::Promotion;
///
/// let jan = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let existing = vec![Promotion::new("emp_001", jan(1), Decimal::from(100))];
///
/// assert!(check_new_promotion(&existing, jan(1), Some(jan(10)), jan(11)).is_ok());
/// assert!(check_new_promotion(&existing, jan(1), Some(jan(10)), jan(5)).is_err());
/// ```
pub fn check_new_promotion(
    existing: &[Promotion],
    date_joined: NaiveDate,
    settled_until: Option<NaiveDate>,
    date: NaiveDate,
) -> EngineResult<()> {
    let Some(latest) = existing.iter().map(|p| p.effective_date).max() else {
        if date != date_joined {
            return Err(EngineError::InvalidPromotionDate {
                date,
                message: format!("first promotion must be dated on the join date {date_joined}"),
            });
        }
        return Ok(());
    };

    if date <= latest {
        return Err(EngineError::InvalidPromotionDate {
            date,
            message: format!("must be after the latest promotion on {latest}"),
        });
    }
    check_after_settled(date, settled_until)
}

/// Checks that `target` may be edited and, if its date moves, that the new
/// date keeps the promotion between its neighbours.
pub fn check_promotion_update(
    existing: &[Promotion],
    target: &Promotion,
    new_date: NaiveDate,
    settled_until: Option<NaiveDate>,
) -> EngineResult<()> {
    check_unlocked(existing, target, settled_until)?;

    if new_date == target.effective_date {
        return Ok(());
    }

    let others = existing.iter().filter(|p| p.id != target.id);
    let previous = others
        .clone()
        .map(|p| p.effective_date)
        .filter(|d| *d < target.effective_date)
        .max();
    let next = others
        .map(|p| p.effective_date)
        .filter(|d| *d > target.effective_date)
        .min();

    if let Some(previous) = previous {
        if new_date <= previous {
            return Err(EngineError::InvalidPromotionDate {
                date: new_date,
                message: format!("must be after the previous promotion on {previous}"),
            });
        }
    }
    if let Some(next) = next {
        if new_date >= next {
            return Err(EngineError::InvalidPromotionDate {
                date: new_date,
                message: format!("must be before the next promotion on {next}"),
            });
        }
    }
    check_after_settled(new_date, settled_until)
}

/// Checks that `target` may be deleted.
pub fn check_promotion_delete(
    existing: &[Promotion],
    target: &Promotion,
    settled_until: Option<NaiveDate>,
) -> EngineResult<()> {
    check_unlocked(existing, target, settled_until)
}

fn check_unlocked(
    existing: &[Promotion],
    target: &Promotion,
    settled_until: Option<NaiveDate>,
) -> EngineResult<()> {
    let first = existing.iter().map(|p| p.effective_date).min();
    if first == Some(target.effective_date) {
        return Err(EngineError::PromotionLocked {
            promotion_id: target.id.to_string(),
            message: "the first promotion cannot be changed".to_string(),
        });
    }

    if let Some(settled_until) = settled_until {
        if target.effective_date <= settled_until {
            return Err(EngineError::PromotionLocked {
                promotion_id: target.id.to_string(),
                message: format!("used by a settlement ending {settled_until}"),
            });
        }
    }
    Ok(())
}

fn check_after_settled(date: NaiveDate, settled_until: Option<NaiveDate>) -> EngineResult<()> {
    match settled_until {
        Some(settled_until) if date <= settled_until => Err(EngineError::InvalidPromotionDate {
            date,
            message: format!("falls inside the period settled until {settled_until}"),
        }),
        _ => Ok(()),
    }
}
