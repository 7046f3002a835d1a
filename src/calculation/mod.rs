//! Calculation logic for the site ledger.
//!
//! This module contains the pure functions behind the ledger: salary rate
//! resolution, aggregation of open ledger entries into settlement totals,
//! ledger entry and promotion validation rules, and site financial
//! summaries. Nothing here touches the store or the clock.

mod aggregation;
mod entry_rules;
mod promotion_rules;
mod salary;
mod site_summary;

pub use aggregation::{aggregate_entries, round_money};
pub use entry_rules::{
    check_entry_amounts, check_entry_comment, check_entry_date, check_non_negative, window_start,
};
pub use promotion_rules::{
    check_new_promotion, check_promotion_delete, check_promotion_update, check_salary_rate,
};
pub use salary::{SalaryTimeline, resolve_salary};
pub use site_summary::{SummarySources, date_summary, rolling_summary, total_summary};
