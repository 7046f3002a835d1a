//! HTTP API for the site ledger.
//!
//! Callers identify themselves through request headers; each endpoint
//! checks the caller's role before making one call into the [`Ledger`].
//!
//! [`Ledger`]: crate::ledger::Ledger

mod auth;
mod handlers;
mod request;
mod response;
mod state;

pub use auth::{
    CALLER_ID_HEADER, CALLER_ROLE_HEADER, CALLER_SITE_HEADER, CallerContext, Capability, Role,
};
pub use handlers::create_router;
pub use request::{
    AssignSiteRequest, CostRequest, CreateEntriesRequest, DateQuery, MoneyRequest,
    PayOrReturnRequest, PromotionRequest, SettlementRequest,
};
pub use response::{
    AggregateResponse, ApiError, ApiErrorResponse, SalaryResponse, SettlementResponse,
};
pub use state::AppState;
