//! Salary rate resolution.
//!
//! The rate in force on a date is the rate of the promotion with the latest
//! `effective_date` on or before that date, or zero if there is none.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::Promotion;

/// Returns the salary rate in force on `work_date`.
///
/// The promotions may be passed in any order.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use site_ledger::calculation::resolve_salary;
/// use site_ledger::models::Promotion;
///
/// let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
/// let promotions = vec![
///     Promotion::new("emp_001", feb, Decimal::from(120)),
///     Promotion::new("emp_001", jan, Decimal::from(100)),
/// ];
///
/// let mid_jan = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
/// assert_eq!(resolve_salary(&promotions, mid_jan), Decimal::from(100));
/// assert_eq!(resolve_salary(&promotions, feb), Decimal::from(120));
/// ```
pub fn resolve_salary(promotions: &[Promotion], work_date: NaiveDate) -> Decimal {
    promotions
        .iter()
        .filter(|p| p.effective_date <= work_date)
        .max_by_key(|p| p.effective_date)
        .map(|p| p.salary_rate)
        .unwrap_or(Decimal::ZERO)
}

/// One employee's promotions, sorted once for repeated lookups.
///
/// Bulk aggregation builds one timeline per employee instead of sorting
/// per ledger entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalaryTimeline {
    /// `(effective_date, salary_rate)`, oldest first.
    steps: Vec<(NaiveDate, Decimal)>,
}

impl SalaryTimeline {
    /// Builds a timeline from promotions in any order.
    pub fn new<'a>(promotions: impl IntoIterator<Item = &'a Promotion>) -> Self {
        let mut steps: Vec<(NaiveDate, Decimal)> = promotions
            .into_iter()
            .map(|p| (p.effective_date, p.salary_rate))
            .collect();
        steps.sort_by(|a, b| a.0.cmp(&b.0));
        Self { steps }
    }

    /// Returns the salary rate in force on `work_date`.
    pub fn rate_on(&self, work_date: NaiveDate) -> Decimal {
        // Sorted ascending, so the last qualifying step is the latest one.
        self.steps
            .iter()
            .rfind(|(effective_date, _)| *effective_date <= work_date)
            .map(|(_, rate)| *rate)
            .unwrap_or(Decimal::ZERO)
    }

    /// Returns true if the employee has no promotions.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn promotions() -> Vec<Promotion> {
        vec![
            Promotion::new("emp_001", date(2024, 1, 1), dec!(100)),
            Promotion::new("emp_001", date(2024, 3, 1), dec!(150)),
            Promotion::new("emp_001", date(2024, 2, 1), dec!(120)),
        ]
    }

    #[test]
    fn test_resolve_before_first_promotion_is_zero() {
        assert_eq!(resolve_salary(&promotions(), date(2023, 12, 31)), Decimal::ZERO);
    }

    #[test]
    fn test_resolve_with_no_promotions_is_zero() {
        assert_eq!(resolve_salary(&[], date(2024, 1, 1)), Decimal::ZERO);
        assert_eq!(SalaryTimeline::default().rate_on(date(2024, 1, 1)), Decimal::ZERO);
    }

    #[test]
    fn test_resolve_on_effective_date_uses_new_rate() {
        assert_eq!(resolve_salary(&promotions(), date(2024, 2, 1)), dec!(120));
        assert_eq!(resolve_salary(&promotions(), date(2024, 1, 31)), dec!(100));
    }

    #[test]
    fn test_resolve_after_last_promotion() {
        assert_eq!(resolve_salary(&promotions(), date(2025, 6, 1)), dec!(150));
    }

    #[test]
    fn test_timeline_matches_resolver() {
        let promotions = promotions();
        let timeline = SalaryTimeline::new(&promotions);
        for day in [
            date(2023, 12, 31),
            date(2024, 1, 1),
            date(2024, 2, 15),
            date(2024, 3, 1),
            date(2024, 12, 1),
        ] {
            assert_eq!(timeline.rate_on(day), resolve_salary(&promotions, day));
        }
    }

    fn arb_promotions() -> impl Strategy<Value = Vec<Promotion>> {
        // Keys are unique, mirroring the (employee, effective_date) constraint.
        prop::collection::btree_map(0i64..400, 1i64..5000, 0..12).prop_map(|steps| {
            let base = date(2024, 1, 1);
            steps
                .into_iter()
                .map(|(offset, rate)| {
                    Promotion::new(
                        "emp_001",
                        base + chrono::Duration::days(offset),
                        Decimal::from(rate),
                    )
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_resolution_ignores_input_order(promotions in arb_promotions(), offset in -10i64..420) {
            let work_date = date(2024, 1, 1) + chrono::Duration::days(offset);

            let expected = promotions
                .iter()
                .filter(|p| p.effective_date <= work_date)
                .map(|p| (p.effective_date, p.salary_rate))
                .max()
                .map(|(_, rate)| rate)
                .unwrap_or(Decimal::ZERO);

            let mut reversed = promotions.clone();
            reversed.reverse();

            prop_assert_eq!(resolve_salary(&promotions, work_date), expected);
            prop_assert_eq!(resolve_salary(&reversed, work_date), expected);
            prop_assert_eq!(SalaryTimeline::new(&reversed).rate_on(work_date), expected);
        }
    }
}
