//! Site financial summary models.
//!
//! Every figure here is a sum that defaults to zero when nothing matches;
//! none of them is ever absent because a source table was empty.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How much detail a summary carries.
///
/// Decided once at the boundary from the caller's capabilities; the
/// summary engine itself never inspects roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryDetail {
    /// Cash, cost and balance only.
    Standard,
    /// Adds salary cost, billing and profit.
    Detailed,
}

impl SummaryDetail {
    /// Returns true for [`SummaryDetail::Detailed`].
    pub fn is_detailed(self) -> bool {
        self == SummaryDetail::Detailed
    }
}

/// Figures for a single calendar day at a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    /// The day summarized.
    pub date: NaiveDate,
    /// Cash received that day.
    pub cash: Decimal,
    /// Equipment cost that day.
    pub equipment_cost: Decimal,
    /// Other cost that day.
    pub other_cost: Decimal,
    /// `equipment_cost + other_cost`.
    pub site_cost: Decimal,
    /// Total presence recorded for that day.
    pub presence: Decimal,
    /// Distinct employees with non-zero presence that day.
    pub employee_count: usize,
    /// Subsistence handed out that day.
    pub subsistence: Decimal,
    /// Advances handed out that day.
    pub advance: Decimal,
    /// Settlement payments made by this site that day.
    pub session_payment: Decimal,
    /// Settlements created by this site that day.
    pub sessions_created: usize,
    /// `subsistence + advance + session_payment`.
    pub employee_cost: Decimal,
    /// `site_cost + employee_cost`.
    pub total_cost: Decimal,
    /// Running balance at the end of the day.
    pub balance: Decimal,
    /// Presence times rate for that day; detailed summaries only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_cost: Option<Decimal>,
}

/// Billing and profit figures, only present in detailed summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitBreakdown {
    /// Total billed to the client.
    pub bill: Decimal,
    /// Labour cost at salary rates (presence times rate).
    pub salary_cost: Decimal,
    /// `site_cost + salary_cost`.
    pub actual_cost: Decimal,
    /// `bill - actual_cost`.
    pub profit: Decimal,
}

/// Cumulative figures for a site, either lifetime or up to a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalSummary {
    /// Cash received.
    pub cash: Decimal,
    /// Equipment cost.
    pub equipment_cost: Decimal,
    /// Other cost.
    pub other_cost: Decimal,
    /// `equipment_cost + other_cost`.
    pub site_cost: Decimal,
    /// Presence worked, open and settled.
    pub presence: Decimal,
    /// Money paid out to employees (subsistence, advances, settlement payments).
    pub employee_cost: Decimal,
    /// `site_cost + employee_cost`.
    pub total_cost: Decimal,
    /// `cash - total_cost`.
    pub balance: Decimal,
    /// Billing and profit; detailed summaries only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profit: Option<ProfitBreakdown>,
}

/// Today/yesterday view of a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingSummary {
    /// The summarized site.
    pub site_id: String,
    /// Today's figures.
    pub today: DaySummary,
    /// Yesterday's figures.
    pub yesterday: DaySummary,
    /// Lifetime figures; detailed summaries only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<TotalSummary>,
}

/// View of a site as of a historical date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSummary {
    /// The summarized site.
    pub site_id: String,
    /// The requested date.
    pub date: NaiveDate,
    /// Figures for the requested date alone.
    pub day: DaySummary,
    /// Cumulative figures up to and including the requested date.
    pub until_date: TotalSummary,
}
