//! Site financial summaries.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::calculation::{SummarySources, date_summary, rolling_summary, total_summary};
use crate::error::EngineResult;
use crate::models::{DateSummary, RollingSummary, SummaryDetail, TotalSummary};
use crate::store::LedgerState;

use super::Ledger;

impl Ledger {
    /// Today and yesterday at a site.
    pub fn site_summary_rolling(
        &self,
        site_id: &str,
        detail: SummaryDetail,
    ) -> EngineResult<RollingSummary> {
        let sources = self.store.read(|state| summary_sources(state, site_id))?;
        Ok(rolling_summary(site_id, &sources, self.clock.today(), detail))
    }

    /// A site as of `date`.
    pub fn site_summary_for_date(
        &self,
        site_id: &str,
        date: NaiveDate,
        detail: SummaryDetail,
    ) -> EngineResult<DateSummary> {
        let sources = self.store.read(|state| summary_sources(state, site_id))?;
        Ok(date_summary(site_id, &sources, date, detail))
    }

    /// Lifetime totals of a site.
    pub fn site_summary_total(&self, site_id: &str) -> EngineResult<TotalSummary> {
        let sources = self.store.read(|state| summary_sources(state, site_id))?;
        Ok(total_summary(&sources))
    }
}

/// Reads everything recorded against `site_id` out of one consistent state.
fn summary_sources(state: &LedgerState<'_>, site_id: &str) -> EngineResult<SummarySources> {
    state.site(site_id)?;

    let entries = state.entries_for_site(site_id)?;
    let mut timelines = HashMap::new();
    for entry in &entries {
        if !timelines.contains_key(&entry.employee_id) {
            let timeline = state.salary_timeline(&entry.employee_id)?;
            timelines.insert(entry.employee_id.clone(), timeline);
        }
    }

    Ok(SummarySources {
        cash: state.cash_for_site(site_id)?,
        costs: state.costs_for_site(site_id)?,
        bills: state.bills_for_site(site_id)?,
        snapshots: state.snapshots_for_site(site_id, None)?,
        work_records: state.work_records_for_site(site_id)?,
        entries,
        timelines,
    })
}
