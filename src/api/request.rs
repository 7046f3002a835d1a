//! Request types for the site ledger API.
//!
//! Sites, employees and ledger entries are accepted in their model form;
//! this module defines the remaining JSON bodies and query strings.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{CostKind, NewLedgerEntry};

/// Body for `POST /entries`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEntriesRequest {
    /// The rows to record at the caller's site.
    pub entries: Vec<NewLedgerEntry>,
}

/// Body for `PUT /employees/:employee_id/site`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignSiteRequest {
    /// The new site, or `null` to clear the assignment.
    #[serde(default)]
    pub site_id: Option<String>,
}

/// Body for creating or updating a promotion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionRequest {
    /// The first day the rate applies.
    pub effective_date: NaiveDate,
    /// Daily salary rate.
    pub salary_rate: Decimal,
}

/// Body for `POST /employees/:employee_id/settlements`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementRequest {
    /// Money handed over (positive) or returned (negative).
    #[serde(default)]
    pub pay_or_return: Decimal,
}

/// Body for `PUT /settlements/:settlement_id/pay-or-return`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayOrReturnRequest {
    /// The corrected amount.
    pub pay_or_return: Decimal,
}

/// Body for recording cash or a bill.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoneyRequest {
    /// The day of the movement.
    pub date: NaiveDate,
    /// Short description.
    pub title: String,
    /// Amount.
    pub amount: Decimal,
}

/// Body for recording a cost.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostRequest {
    /// The day the cost was incurred.
    pub date: NaiveDate,
    /// Equipment or other.
    pub kind: CostKind,
    /// Short description.
    pub title: String,
    /// Amount spent.
    pub amount: Decimal,
}

/// Optional `?date=YYYY-MM-DD` filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateQuery {
    /// The requested day, if any.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_deserialize_bulk_entries() {
        let json = r#"{
            "entries": [
                {"employee_id": "emp_001", "date": "2024-01-02", "presence": "1"},
                {"employee_id": "emp_002", "date": "2024-01-02", "presence": "0.5", "advance": "200"}
            ]
        }"#;

        let request: CreateEntriesRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.entries.len(), 2);
        assert_eq!(request.entries[1].presence, dec!(0.5));
        assert_eq!(request.entries[1].advance, dec!(200));
    }

    #[test]
    fn test_settlement_request_defaults_to_no_payment() {
        let request: SettlementRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.pay_or_return, Decimal::ZERO);
    }

    #[test]
    fn test_cost_request_kind() {
        let json = r#"{"date": "2024-01-02", "kind": "equipment", "title": "rods", "amount": "700"}"#;
        let request: CostRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.kind, CostKind::Equipment);
    }

    #[test]
    fn test_missing_site_clears_assignment() {
        let request: AssignSiteRequest = serde_json::from_str(r#"{"site_id": null}"#).unwrap();
        assert!(request.site_id.is_none());
    }
}
