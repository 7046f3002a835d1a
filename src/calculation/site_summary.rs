//! Site financial summaries.
//!
//! Every figure is a filtered sum over one of the site's sources: cash,
//! costs, bills, open ledger entries, snapshots of consumed entries and
//! settled work records. A sum over nothing is zero, so an empty site
//! summarizes to all-zero fields.
//!
//! Settled work is read in two ways. The rolling view uses snapshots, which
//! only exist for entries consumed close to their date. The date-based view
//! uses each work record's lifetime totals and backs out the days after the
//! requested date.

use std::collections::{BTreeSet, HashMap};

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{
    CostKind, DateSummary, DayContribution, DaySummary, LedgerEntry, LedgerSnapshot,
    ProfitBreakdown, RollingSummary, SiteBill, SiteCash, SiteCost, SiteWorkRecord, SummaryDetail,
    TotalSummary,
};

use super::SalaryTimeline;

/// Everything recorded against one site, plus the salary timelines of the
/// employees with open entries there.
#[derive(Debug, Clone, Default)]
pub struct SummarySources {
    /// Cash received by the site.
    pub cash: Vec<SiteCash>,
    /// Equipment and other costs of the site.
    pub costs: Vec<SiteCost>,
    /// Amounts billed for the site.
    pub bills: Vec<SiteBill>,
    /// Open ledger entries at the site.
    pub entries: Vec<LedgerEntry>,
    /// Snapshots of consumed entries at the site.
    pub snapshots: Vec<LedgerSnapshot>,
    /// Settled work records for the site.
    pub work_records: Vec<SiteWorkRecord>,
    /// Salary timelines keyed by employee id.
    pub timelines: HashMap<String, SalaryTimeline>,
}

/// Sums `value` over the items that pass `keep`; zero when none do.
fn sum_where<T>(
    items: &[T],
    keep: impl Fn(&T) -> bool,
    value: impl Fn(&T) -> Decimal,
) -> Decimal {
    items.iter().filter(|item| keep(item)).map(value).sum()
}

/// Labour figures for a day or a range of days.
#[derive(Debug, Default)]
struct Labour {
    presence: Decimal,
    subsistence: Decimal,
    advance: Decimal,
    salary_cost: Decimal,
    employees: BTreeSet<String>,
}

impl Labour {
    fn add(
        &mut self,
        employee_id: &str,
        presence: Decimal,
        subsistence: Decimal,
        advance: Decimal,
        salary_cost: Decimal,
    ) {
        self.presence += presence;
        self.subsistence += subsistence;
        self.advance += advance;
        self.salary_cost += salary_cost;
        if presence > Decimal::ZERO {
            self.employees.insert(employee_id.to_string());
        }
    }

    fn taken(&self) -> Decimal {
        self.subsistence + self.advance
    }
}

impl SummarySources {
    fn rate_on(&self, employee_id: &str, date: NaiveDate) -> Decimal {
        self.timelines
            .get(employee_id)
            .map(|timeline| timeline.rate_on(date))
            .unwrap_or(Decimal::ZERO)
    }

    fn live_labour(&self, keep: impl Fn(NaiveDate) -> bool) -> Labour {
        let mut labour = Labour::default();
        for entry in self.entries.iter().filter(|e| keep(e.date)) {
            let rate = self.rate_on(&entry.employee_id, entry.date);
            labour.add(
                &entry.employee_id,
                entry.presence,
                entry.subsistence,
                entry.advance,
                entry.presence * rate,
            );
        }
        labour
    }

    fn add_snapshots(&self, labour: &mut Labour, date: NaiveDate) {
        for snapshot in self.snapshots.iter().filter(|s| s.date == date) {
            labour.add(
                &snapshot.employee_id,
                snapshot.presence,
                snapshot.subsistence,
                snapshot.advance,
                snapshot.presence * snapshot.salary_rate,
            );
        }
    }

    fn add_settled_days(&self, labour: &mut Labour, date: NaiveDate) {
        for record in &self.work_records {
            for day in record.days.iter().filter(|d| d.date == date) {
                labour.add(
                    &record.employee_id,
                    day.presence,
                    day.subsistence,
                    day.advance,
                    day.earned_salary,
                );
            }
        }
    }

    /// Sums a settled figure up to `until`, or over all time.
    ///
    /// A record that started on or before `until` contributes its lifetime
    /// value minus the portion of its days after `until`.
    fn settled_sum(
        &self,
        until: Option<NaiveDate>,
        lifetime: impl Fn(&SiteWorkRecord) -> Decimal,
        per_day: impl Fn(&DayContribution) -> Decimal,
    ) -> Decimal {
        let Some(until) = until else {
            return self.work_records.iter().map(lifetime).sum();
        };

        let started: Vec<&SiteWorkRecord> = self
            .work_records
            .iter()
            .filter(|r| r.start_date <= until)
            .collect();
        let until_total: Decimal = started.iter().map(|r| lifetime(r)).sum();
        let after_date: Decimal = started
            .iter()
            .filter(|r| r.end_date > until)
            .flat_map(|r| r.days.iter())
            .filter(|d| d.date > until)
            .map(per_day)
            .sum();
        until_total - after_date
    }

    fn day(&self, date: NaiveDate, labour: Labour, detail: SummaryDetail) -> DaySummary {
        let cash = sum_where(&self.cash, |c| c.date == date, |c| c.amount);
        let equipment_cost = sum_where(
            &self.costs,
            |c| c.date == date && c.kind == CostKind::Equipment,
            |c| c.amount,
        );
        let other_cost = sum_where(
            &self.costs,
            |c| c.date == date && c.kind == CostKind::Other,
            |c| c.amount,
        );
        let site_cost = equipment_cost + other_cost;

        let owner_today = |r: &SiteWorkRecord| r.session_owner && r.created_date == date;
        let session_payment = sum_where(&self.work_records, owner_today, |r| r.pay_or_return);
        let sessions_created = self.work_records.iter().filter(|r| owner_today(r)).count();

        let employee_cost = labour.taken() + session_payment;
        let total_cost = site_cost + employee_cost;

        DaySummary {
            date,
            cash,
            equipment_cost,
            other_cost,
            site_cost,
            presence: labour.presence,
            employee_count: labour.employees.len(),
            subsistence: labour.subsistence,
            advance: labour.advance,
            session_payment,
            sessions_created,
            employee_cost,
            total_cost,
            balance: Decimal::ZERO,
            salary_cost: detail.is_detailed().then_some(labour.salary_cost),
        }
    }

    fn totals(&self, until: Option<NaiveDate>, detail: SummaryDetail) -> TotalSummary {
        let in_range = |date: NaiveDate| until.is_none_or(|until| date <= until);

        let cash = sum_where(&self.cash, |c| in_range(c.date), |c| c.amount);
        let equipment_cost = sum_where(
            &self.costs,
            |c| in_range(c.date) && c.kind == CostKind::Equipment,
            |c| c.amount,
        );
        let other_cost = sum_where(
            &self.costs,
            |c| in_range(c.date) && c.kind == CostKind::Other,
            |c| c.amount,
        );
        let site_cost = equipment_cost + other_cost;

        let live = self.live_labour(in_range);
        let settled_presence = self.settled_sum(until, |r| r.presence, |d| d.presence);
        let settled_taken = self.settled_sum(
            until,
            |r| r.subsistence + r.advance,
            |d| d.subsistence + d.advance,
        );
        let payments = sum_where(
            &self.work_records,
            |r| r.session_owner && in_range(r.created_date),
            |r| r.pay_or_return,
        );

        let employee_cost = live.taken() + settled_taken + payments;
        let total_cost = site_cost + employee_cost;

        let profit = detail.is_detailed().then(|| {
            let bill = sum_where(&self.bills, |b| in_range(b.date), |b| b.amount);
            let salary_cost = live.salary_cost
                + self.settled_sum(until, |r| r.earned_salary, |d| d.earned_salary);
            let actual_cost = site_cost + salary_cost;
            ProfitBreakdown {
                bill,
                salary_cost,
                actual_cost,
                profit: bill - actual_cost,
            }
        });

        TotalSummary {
            cash,
            equipment_cost,
            other_cost,
            site_cost,
            presence: live.presence + settled_presence,
            employee_cost,
            total_cost,
            balance: cash - total_cost,
            profit,
        }
    }
}

/// Builds the today/yesterday view of a site.
///
/// Today's balance is the running all-time balance. Yesterday's is rebuilt
/// from it by undoing today's cash and cost.
pub fn rolling_summary(
    site_id: &str,
    sources: &SummarySources,
    today: NaiveDate,
    detail: SummaryDetail,
) -> RollingSummary {
    let yesterday = today - Duration::days(1);
    let rolling_labour = |date: NaiveDate| {
        let mut labour = sources.live_labour(|d| d == date);
        sources.add_snapshots(&mut labour, date);
        labour
    };

    let totals = sources.totals(None, detail);

    let mut today_summary = sources.day(today, rolling_labour(today), detail);
    today_summary.balance = totals.balance;

    let mut yesterday_summary = sources.day(yesterday, rolling_labour(yesterday), detail);
    yesterday_summary.balance =
        today_summary.balance - today_summary.cash + today_summary.total_cost;

    RollingSummary {
        site_id: site_id.to_string(),
        today: today_summary,
        yesterday: yesterday_summary,
        total: detail.is_detailed().then_some(totals),
    }
}

/// Builds the view of a site as of `date`.
pub fn date_summary(
    site_id: &str,
    sources: &SummarySources,
    date: NaiveDate,
    detail: SummaryDetail,
) -> DateSummary {
    let until_date = sources.totals(Some(date), detail);

    let mut labour = sources.live_labour(|d| d == date);
    sources.add_settled_days(&mut labour, date);
    let mut day = sources.day(date, labour, detail);
    day.balance = until_date.balance;

    DateSummary {
        site_id: site_id.to_string(),
        date,
        day,
        until_date,
    }
}

/// Builds the lifetime view of a site, always in full detail.
pub fn total_summary(sources: &SummarySources) -> TotalSummary {
    sources.totals(None, SummaryDetail::Detailed)
}
