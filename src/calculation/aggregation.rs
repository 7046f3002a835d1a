//! Open settlement aggregation.
//!
//! This module groups an employee's open ledger entries by site and computes
//! the per-site and employee-wide totals a new settlement is created from.
//! The salary rate is evaluated per entry, so a promotion that falls inside
//! the open window is respected exactly.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{AggregateResult, DayContribution, LedgerEntry, SiteBreakdown};

use super::SalaryTimeline;

/// Rounds a money amount to `scale` decimal places, midpoint away from zero.
///
/// # Example
///
/// ```
/// use rust_decimal::Decimal;
/// use site_ledger::calculation::round_money;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("312.5").unwrap(), 0), Decimal::from(313));
/// assert_eq!(round_money(Decimal::from_str("-312.5").unwrap(), 0), Decimal::from(-313));
/// ```
pub fn round_money(amount: Decimal, scale: u32) -> Decimal {
    amount.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Default)]
struct SiteAccumulator {
    presence: Decimal,
    subsistence: Decimal,
    advance: Decimal,
    earned_salary: Decimal,
    days: Vec<DayContribution>,
}

impl SiteAccumulator {
    fn add(&mut self, entry: &LedgerEntry, salary_rate: Decimal) {
        let earned_salary = entry.presence * salary_rate;
        self.presence += entry.presence;
        self.subsistence += entry.subsistence;
        self.advance += entry.advance;
        self.earned_salary += earned_salary;
        self.days.push(DayContribution {
            date: entry.date,
            presence: entry.presence,
            salary_rate,
            earned_salary,
            subsistence: entry.subsistence,
            advance: entry.advance,
        });
    }

    fn finish(self, site_id: String, currency_scale: u32) -> SiteBreakdown {
        let earned_salary = round_money(self.earned_salary, currency_scale);
        SiteBreakdown {
            site_id,
            presence: self.presence,
            subsistence: self.subsistence,
            advance: self.advance,
            earned_salary,
            payable: earned_salary - (self.subsistence + self.advance),
            days: self.days,
        }
    }
}

/// Aggregates an employee's open ledger entries.
///
/// Returns `None` when there are no entries; whether an empty settlement may
/// still be created is decided by the caller.
///
/// # Arguments
///
/// * `employee_id` - The employee the entries belong to
/// * `entries` - The employee's open entries, in any order
/// * `timeline` - The employee's promotion history
/// * `last_settlement_payable` - `rest_payable` of the previous settlement, or zero
/// * `currency_scale` - Decimal places each site's earned salary is rounded to
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use site_ledger::calculation::{aggregate_entries, SalaryTimeline};
/// use site_ledger::models::{LedgerEntry, Promotion};
/// use uuid::Uuid;
///
/// let jan = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
/// let promotions = vec![Promotion::new("emp_001", jan(1), Decimal::from(100))];
/// let entries: Vec<LedgerEntry> = (1..=2)
///     .map(|d| LedgerEntry {
///         id: Uuid::new_v4(),
///         employee_id: "emp_001".to_string(),
///         site_id: "site_x".to_string(),
///         date: jan(d),
///         presence: Decimal::ONE,
///         subsistence: Decimal::ZERO,
///         advance: Decimal::ZERO,
///         comment: None,
///         created_at: jan(d).and_hms_opt(18, 0, 0).unwrap(),
///     })
///     .collect();
///
/// let result = aggregate_entries(
///     "emp_001",
///     &entries,
///     &SalaryTimeline::new(&promotions),
///     Decimal::ZERO,
///     0,
/// )
/// .unwrap();
/// assert_eq!(result.total_presence, Decimal::from(2));
/// assert_eq!(result.payable(), Decimal::from(200));
/// ```
pub fn aggregate_entries(
    employee_id: &str,
    entries: &[LedgerEntry],
    timeline: &SalaryTimeline,
    last_settlement_payable: Decimal,
    currency_scale: u32,
) -> Option<AggregateResult> {
    let mut ordered: Vec<&LedgerEntry> = entries.iter().collect();
    ordered.sort_by(|a, b| a.date.cmp(&b.date));

    let first = ordered.first()?;
    let last = ordered.last()?;
    let start_date = first.date;
    let end_date = last.date;
    let last_entry = (*last).clone();

    let mut groups: BTreeMap<String, SiteAccumulator> = BTreeMap::new();
    for entry in &ordered {
        groups
            .entry(entry.site_id.clone())
            .or_default()
            .add(entry, timeline.rate_on(entry.date));
    }

    let sites: Vec<SiteBreakdown> = groups
        .into_iter()
        .map(|(site_id, acc)| acc.finish(site_id, currency_scale))
        .collect();

    Some(AggregateResult {
        employee_id: employee_id.to_string(),
        start_date,
        end_date,
        entry_count: ordered.len(),
        total_presence: sites.iter().map(|s| s.presence).sum(),
        total_subsistence: sites.iter().map(|s| s.subsistence).sum(),
        total_advance: sites.iter().map(|s| s.advance).sum(),
        earned_salary: sites.iter().map(|s| s.earned_salary).sum(),
        session_salary_rate: timeline.rate_on(end_date),
        last_settlement_payable,
        sites,
        last_entry,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Promotion;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn jan(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn entry(site: &str, d: u32, presence: Decimal, subsistence: Decimal, advance: Decimal) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::new_v4(),
            employee_id: "emp_001".to_string(),
            site_id: site.to_string(),
            date: jan(d),
            presence,
            subsistence,
            advance,
            comment: None,
            created_at: jan(d).and_hms_opt(18, 0, 0).unwrap(),
        }
    }

    fn flat_timeline() -> SalaryTimeline {
        SalaryTimeline::new(&[Promotion::new("emp_001", jan(1), dec!(100))])
    }

    /// Two full days at one site, rate 100.
    #[test]
    fn test_two_days_one_site() {
        let entries = vec![
            entry("site_x", 1, dec!(1), dec!(0), dec!(0)),
            entry("site_x", 2, dec!(1), dec!(0), dec!(0)),
        ];
        let result = aggregate_entries("emp_001", &entries, &flat_timeline(), dec!(0), 0).unwrap();

        assert_eq!(result.start_date, jan(1));
        assert_eq!(result.end_date, jan(2));
        assert_eq!(result.entry_count, 2);
        assert_eq!(result.total_presence, dec!(2));
        assert_eq!(result.total_subsistence, dec!(0));
        assert_eq!(result.payable(), dec!(200));
        assert_eq!(result.sites.len(), 1);
        assert_eq!(result.sites[0].days.len(), 2);
    }

    #[test]
    fn test_no_entries_returns_none() {
        assert!(aggregate_entries("emp_001", &[], &flat_timeline(), dec!(500), 0).is_none());
    }

    #[test]
    fn test_groups_by_site_in_site_order() {
        let entries = vec![
            entry("site_y", 3, dec!(0.5), dec!(20), dec!(0)),
            entry("site_x", 1, dec!(1), dec!(50), dec!(100)),
            entry("site_x", 2, dec!(1.5), dec!(50), dec!(0)),
        ];
        let result = aggregate_entries("emp_001", &entries, &flat_timeline(), dec!(40), 0).unwrap();

        assert_eq!(result.sites.len(), 2);
        let x = &result.sites[0];
        let y = &result.sites[1];
        assert_eq!(x.site_id, "site_x");
        assert_eq!(x.presence, dec!(2.5));
        assert_eq!(x.earned_salary, dec!(250));
        assert_eq!(x.payable, dec!(50));
        assert_eq!(y.site_id, "site_y");
        assert_eq!(y.earned_salary, dec!(50));
        assert_eq!(y.payable, dec!(30));

        assert_eq!(result.total_presence, dec!(3));
        assert_eq!(result.total_taken(), dec!(220));
        assert_eq!(result.earned_salary, dec!(300));
        assert_eq!(result.total_payable(), dec!(120));
        assert_eq!(result.last_entry.date, jan(3));
    }

    /// A promotion inside the open window changes the rate from its date on.
    #[test]
    fn test_promotion_mid_window_is_respected_per_entry() {
        let timeline = SalaryTimeline::new(&[
            Promotion::new("emp_001", jan(1), dec!(100)),
            Promotion::new("emp_001", jan(3), dec!(150)),
        ]);
        let entries = vec![
            entry("site_x", 2, dec!(1), dec!(0), dec!(0)),
            entry("site_x", 3, dec!(1), dec!(0), dec!(0)),
            entry("site_x", 4, dec!(1), dec!(0), dec!(0)),
        ];
        let result = aggregate_entries("emp_001", &entries, &timeline, dec!(0), 0).unwrap();

        assert_eq!(result.earned_salary, dec!(400));
        assert_eq!(result.session_salary_rate, dec!(150));
        let rates: Vec<Decimal> = result.sites[0].days.iter().map(|d| d.salary_rate).collect();
        assert_eq!(rates, vec![dec!(100), dec!(150), dec!(150)]);
    }

    #[test]
    fn test_earned_salary_rounded_per_site() {
        let timeline = SalaryTimeline::new(&[Promotion::new("emp_001", jan(1), dec!(625))]);
        let entries = vec![entry("site_x", 1, dec!(0.5), dec!(0), dec!(0))];
        let result = aggregate_entries("emp_001", &entries, &timeline, dec!(0), 0).unwrap();

        assert_eq!(result.sites[0].earned_salary, dec!(313));
        assert_eq!(result.sites[0].days[0].earned_salary, dec!(312.5));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let entries = vec![
            entry("site_x", 1, dec!(1), dec!(10), dec!(0)),
            entry("site_y", 2, dec!(2), dec!(0), dec!(30)),
        ];
        let first = aggregate_entries("emp_001", &entries, &flat_timeline(), dec!(0), 0);
        let second = aggregate_entries("emp_001", &entries, &flat_timeline(), dec!(0), 0);
        assert_eq!(first, second);
    }

    #[test]
    fn test_round_money_scale_two() {
        assert_eq!(round_money(dec!(10.005), 2), dec!(10.01));
        assert_eq!(round_money(dec!(10.004), 2), dec!(10.00));
    }
}
