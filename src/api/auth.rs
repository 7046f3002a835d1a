//! Caller identity and authorization.
//!
//! The ledger engine trusts its callers, so every permission decision is
//! made here, once per request, from a fixed role to capability table.
//! The caller's identity arrives in request headers set by the fronting
//! authentication proxy.

use std::str::FromStr;

use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};

use crate::models::{Employee, SummaryDetail};

use super::response::{ApiError, ApiErrorResponse};

/// Header carrying the caller's employee id.
pub const CALLER_ID_HEADER: &str = "x-caller-id";
/// Header carrying the caller's role.
pub const CALLER_ROLE_HEADER: &str = "x-caller-role";
/// Header carrying the caller's assigned site, if any.
pub const CALLER_SITE_HEADER: &str = "x-caller-site";

/// The roles a caller can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Runs the whole operation.
    MainManager,
    /// Runs one site.
    SiteManager,
    /// A worker looking at their own records.
    Employee,
    /// Read-only access including salary cost and profit.
    Viewer,
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "main_manager" => Ok(Role::MainManager),
            "site_manager" => Ok(Role::SiteManager),
            "employee" => Ok(Role::Employee),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Things a caller may be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Register sites and employees, assign employees to sites.
    ManageDirectory,
    /// Create, edit and delete promotions.
    ManagePromotions,
    /// Record daily attendance at the caller's site.
    RecordAttendance,
    /// Record cash, cost and bills.
    RecordSiteMoney,
    /// Settle any employee.
    SettleAnyEmployee,
    /// Settle employees currently assigned to the caller's site.
    SettleSiteEmployees,
    /// Allow a one-off settlement adjustment.
    GrantSettlementUpdate,
    /// Apply a granted settlement adjustment.
    AdjustSettlement,
    /// Read any employee's records.
    ViewEmployeeRecords,
    /// Read site summaries.
    ViewSiteSummary,
    /// See salary cost and profit in summaries.
    ViewDetailedSummary,
    /// Read lifetime site totals.
    ViewTotalSummary,
}

impl Role {
    /// The capabilities granted to this role.
    pub fn capabilities(self) -> &'static [Capability] {
        use Capability::*;

        match self {
            Role::MainManager => &[
                ManageDirectory,
                ManagePromotions,
                RecordAttendance,
                RecordSiteMoney,
                SettleAnyEmployee,
                GrantSettlementUpdate,
                AdjustSettlement,
                ViewEmployeeRecords,
                ViewSiteSummary,
            ],
            Role::SiteManager => &[
                RecordAttendance,
                RecordSiteMoney,
                SettleSiteEmployees,
                AdjustSettlement,
                ViewEmployeeRecords,
                ViewSiteSummary,
            ],
            Role::Employee => &[],
            Role::Viewer => &[
                ViewEmployeeRecords,
                ViewSiteSummary,
                ViewDetailedSummary,
                ViewTotalSummary,
            ],
        }
    }

    /// Returns true if the role grants `capability`.
    pub fn can(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

/// Who is making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    /// The caller's employee id.
    pub caller_id: String,
    /// The caller's role.
    pub role: Role,
    /// The caller's assigned site.
    pub site_id: Option<String>,
}

fn unauthenticated(message: impl Into<String>) -> ApiErrorResponse {
    ApiErrorResponse {
        status: StatusCode::UNAUTHORIZED,
        error: ApiError::new("UNAUTHENTICATED", message),
    }
}

fn forbidden(message: impl Into<String>) -> ApiErrorResponse {
    ApiErrorResponse {
        status: StatusCode::FORBIDDEN,
        error: ApiError::new("FORBIDDEN", message),
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

impl CallerContext {
    /// Reads the caller from the request headers.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiErrorResponse> {
        let caller_id = header(headers, CALLER_ID_HEADER)
            .ok_or_else(|| unauthenticated(format!("missing header {CALLER_ID_HEADER}")))?;
        let role = header(headers, CALLER_ROLE_HEADER)
            .ok_or_else(|| unauthenticated(format!("missing header {CALLER_ROLE_HEADER}")))?
            .parse::<Role>()
            .map_err(unauthenticated)?;

        Ok(Self {
            caller_id: caller_id.to_string(),
            role,
            site_id: header(headers, CALLER_SITE_HEADER).map(str::to_string),
        })
    }

    /// Fails unless the caller's role grants `capability`.
    pub fn require(&self, capability: Capability) -> Result<(), ApiErrorResponse> {
        if self.role.can(capability) {
            Ok(())
        } else {
            Err(forbidden(format!("{:?} may not {:?}", self.role, capability)))
        }
    }

    /// Fails unless the caller's role grants at least one of `capabilities`.
    ///
    /// Checked before any lookup so a caller without the capability learns
    /// nothing about whether the target exists.
    pub fn require_any(&self, capabilities: &[Capability]) -> Result<(), ApiErrorResponse> {
        if capabilities.iter().any(|&capability| self.role.can(capability)) {
            Ok(())
        } else {
            Err(forbidden(format!("{:?} may not {:?}", self.role, capabilities)))
        }
    }

    /// The caller's site, required for site-scoped writes.
    pub fn require_site(&self) -> Result<&str, ApiErrorResponse> {
        self.site_id.as_deref().ok_or_else(|| ApiErrorResponse {
            status: StatusCode::BAD_REQUEST,
            error: ApiError::validation_error("caller has no assigned site"),
        })
    }

    /// Fails unless the caller may act on `site_id` with `capability`.
    ///
    /// Site managers are confined to their own site.
    pub fn authorize_site(&self, capability: Capability, site_id: &str) -> Result<(), ApiErrorResponse> {
        self.require(capability)?;
        if self.role == Role::SiteManager && self.site_id.as_deref() != Some(site_id) {
            return Err(forbidden(format!("site manager may not access site '{site_id}'")));
        }
        Ok(())
    }

    /// Fails unless the caller may read `employee_id`'s records.
    pub fn authorize_employee_records(&self, employee_id: &str) -> Result<(), ApiErrorResponse> {
        if self.caller_id == employee_id || self.role.can(Capability::ViewEmployeeRecords) {
            Ok(())
        } else {
            Err(forbidden("employees may only read their own records"))
        }
    }

    /// Fails unless the caller may settle `employee`.
    pub fn authorize_settlement(&self, employee: &Employee) -> Result<(), ApiErrorResponse> {
        if self.role.can(Capability::SettleAnyEmployee) {
            return Ok(());
        }
        self.require(Capability::SettleSiteEmployees)?;
        if employee.current_site.is_some() && employee.current_site == self.site_id {
            Ok(())
        } else {
            Err(forbidden(format!(
                "employee '{}' is not assigned to the caller's site",
                employee.id
            )))
        }
    }

    /// How much detail the caller sees in summaries.
    pub fn summary_detail(&self) -> SummaryDetail {
        if self.role.can(Capability::ViewDetailedSummary) {
            SummaryDetail::Detailed
        } else {
            SummaryDetail::Standard
        }
    }
}
