//! Response types for the site ledger API.
//!
//! This module defines the error response structures, the mapping from
//! engine errors to HTTP statuses, and the response bodies that add derived
//! figures to stored records.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, ErrorKind};
use crate::models::{AggregateResult, Settlement, SiteWorkRecord};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 500 response for failures outside the engine.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: ApiError::new("INTERNAL_ERROR", message),
        }
    }

    /// A 400 response with the given body.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, code) = match (&error, error.kind()) {
            (EngineError::NoOpSettlement { .. }, _) => (StatusCode::BAD_REQUEST, "NO_OP_SETTLEMENT"),
            (EngineError::DuplicateSettlementToday { .. }, _) => {
                (StatusCode::CONFLICT, "DUPLICATE_SETTLEMENT_TODAY")
            }
            (_, ErrorKind::Validation) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (_, ErrorKind::NotFound) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            (_, ErrorKind::State) => (StatusCode::CONFLICT, "INVALID_STATE"),
            (_, ErrorKind::Conflict) => (StatusCode::CONFLICT, "CONFLICT"),
            (_, ErrorKind::Integrity) => (StatusCode::INTERNAL_SERVER_ERROR, "INTEGRITY_ERROR"),
            (_, ErrorKind::Config) => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIG_ERROR"),
            (_, ErrorKind::Storage) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
        };

        let error = match error {
            EngineError::Integrity { .. } => ApiError::with_details(
                code,
                "Internal error while committing",
                message,
            ),
            EngineError::Storage { .. } => {
                ApiError::with_details(code, "Internal error while accessing storage", message)
            }
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. } => {
                ApiError::with_details(code, "Configuration error", message)
            }
            _ => ApiError::new(code, message),
        };
        ApiErrorResponse { status, error }
    }
}

/// A settlement with its derived amounts and per-site rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementResponse {
    /// The stored settlement.
    #[serde(flatten)]
    pub settlement: Settlement,
    /// Subsistence plus advance.
    pub total_taken: Decimal,
    /// Earned salary minus money taken.
    pub this_settlement_payable: Decimal,
    /// Including the carried-forward balance.
    pub total_payable: Decimal,
    /// Left after `pay_or_return`.
    pub rest_payable: Decimal,
    /// Per-site breakdown.
    pub site_work_records: Vec<SiteWorkRecord>,
}

impl SettlementResponse {
    /// Builds the response from a settlement and its rows.
    pub fn new(settlement: Settlement, site_work_records: Vec<SiteWorkRecord>) -> Self {
        Self {
            total_taken: settlement.total_taken(),
            this_settlement_payable: settlement.this_settlement_payable(),
            total_payable: settlement.total_payable(),
            rest_payable: settlement.rest_payable(),
            settlement,
            site_work_records,
        }
    }
}

/// A preview of the next settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResponse {
    /// The aggregated open entries.
    #[serde(flatten)]
    pub aggregate: AggregateResult,
    /// Subsistence plus advance.
    pub total_taken: Decimal,
    /// Earned salary minus money taken.
    pub payable: Decimal,
    /// Including the carried-forward balance.
    pub total_payable: Decimal,
}

impl From<AggregateResult> for AggregateResponse {
    fn from(aggregate: AggregateResult) -> Self {
        Self {
            total_taken: aggregate.total_taken(),
            payable: aggregate.payable(),
            total_payable: aggregate.total_payable(),
            aggregate,
        }
    }
}

/// A salary rate lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalaryResponse {
    /// The employee looked up.
    pub employee_id: String,
    /// The date looked up.
    pub date: NaiveDate,
    /// The rate in force that day.
    pub salary_rate: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_api_error_with_details_serialization() {
        let error = ApiError::with_details("TEST_ERROR", "Test message", "Some details");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"details\":\"Some details\""));
    }

    #[test]
    fn test_engine_error_status_mapping() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let cases = [
            (
                EngineError::DuplicateEntry {
                    employee_id: "emp_001".to_string(),
                    date,
                },
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (
                EngineError::NotFound {
                    entity: "employee",
                    id: "ghost".to_string(),
                },
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                EngineError::InvalidState {
                    employee_id: "emp_001".to_string(),
                    message: "no current site assigned".to_string(),
                },
                StatusCode::CONFLICT,
                "INVALID_STATE",
            ),
            (
                EngineError::NoOpSettlement {
                    employee_id: "emp_001".to_string(),
                },
                StatusCode::BAD_REQUEST,
                "NO_OP_SETTLEMENT",
            ),
            (
                EngineError::DuplicateSettlementToday {
                    employee_id: "emp_001".to_string(),
                    settlement_id: "s-1".to_string(),
                    created_at: date.and_hms_opt(9, 0, 0).unwrap(),
                },
                StatusCode::CONFLICT,
                "DUPLICATE_SETTLEMENT_TODAY",
            ),
            (
                EngineError::PromotionLocked {
                    promotion_id: "p-1".to_string(),
                    message: "the first promotion cannot be changed".to_string(),
                },
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                EngineError::Integrity {
                    message: "duplicate key".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTEGRITY_ERROR",
            ),
            (
                EngineError::Storage {
                    message: "disk I/O error".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
            ),
            (
                EngineError::CommentTooLong { length: 200, max: 150 },
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
        ];

        for (error, status, code) in cases {
            let response: ApiErrorResponse = error.into();
            assert_eq!(response.status, status);
            assert_eq!(response.error.code, code);
        }
    }

    #[test]
    fn test_integrity_error_keeps_cause_in_details() {
        let response: ApiErrorResponse = EngineError::Integrity {
            message: "duplicate key".to_string(),
        }
        .into();
        assert_eq!(response.error.message, "Internal error while committing");
        assert!(response.error.details.unwrap().contains("duplicate key"));
    }
}
