//! HTTP request handlers for the site ledger API.
//!
//! Every handler reads the caller from the request headers, checks it
//! against the authorization table, and then makes exactly one call into
//! the ledger engine.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::{
    DateSummary, Employee, LedgerEntry, LedgerEntryUpdate, LedgerSnapshot, Promotion,
    RollingSummary, Settlement, Site, SiteBill, SiteCash, SiteCost, TotalSummary,
};

use super::auth::{CallerContext, Capability};
use super::request::{
    AssignSiteRequest, CostRequest, CreateEntriesRequest, DateQuery, MoneyRequest,
    PayOrReturnRequest, PromotionRequest, SettlementRequest,
};
use super::response::{
    AggregateResponse, ApiError, ApiErrorResponse, SalaryResponse, SettlementResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/sites", post(register_site_handler))
        .route("/sites/:site_id", get(get_site_handler))
        .route("/sites/:site_id/cash", post(record_cash_handler))
        .route("/sites/:site_id/costs", post(record_cost_handler))
        .route("/sites/:site_id/bills", post(record_bill_handler))
        .route("/sites/:site_id/entries", get(site_entries_handler))
        .route("/sites/:site_id/snapshots", get(site_snapshots_handler))
        .route("/sites/:site_id/summary", get(site_summary_handler))
        .route("/sites/:site_id/total", get(site_total_handler))
        .route("/employees", post(register_employee_handler))
        .route("/employees/:employee_id", get(get_employee_handler))
        .route("/employees/:employee_id/site", put(assign_site_handler))
        .route(
            "/employees/:employee_id/promotions",
            get(list_promotions_handler).post(create_promotion_handler),
        )
        .route("/employees/:employee_id/salary", get(salary_handler))
        .route("/employees/:employee_id/entries", get(employee_entries_handler))
        .route(
            "/employees/:employee_id/settlement-preview",
            get(settlement_preview_handler),
        )
        .route(
            "/employees/:employee_id/settlements",
            get(list_settlements_handler).post(create_settlement_handler),
        )
        .route(
            "/promotions/:promotion_id",
            put(update_promotion_handler).delete(delete_promotion_handler),
        )
        .route("/entries", post(create_entries_handler))
        .route(
            "/entries/:entry_id",
            put(update_entry_handler).delete(delete_entry_handler),
        )
        .route("/settlements/:settlement_id", get(get_settlement_handler))
        .route(
            "/settlements/:settlement_id/grant-update",
            post(grant_update_handler),
        )
        .route(
            "/settlements/:settlement_id/pay-or-return",
            put(adjust_pay_or_return_handler),
        )
        .with_state(state)
}

/// Runs one request: identifies the caller, runs `operation` on the
/// blocking pool, and renders the outcome as JSON under a fresh
/// correlation id.
///
/// Every ledger call touches SQLite, so it never runs on an async worker.
async fn run<T>(
    name: &'static str,
    status: StatusCode,
    headers: &HeaderMap,
    operation: impl FnOnce(&CallerContext) -> Result<T, ApiErrorResponse> + Send + 'static,
) -> Response
where
    T: Serialize + Send + 'static,
{
    let correlation_id = Uuid::new_v4();
    let start_time = Instant::now();
    info!(correlation_id = %correlation_id, operation = name, "Processing request");

    let outcome = match CallerContext::from_headers(headers) {
        Ok(caller) => tokio::task::spawn_blocking(move || operation(&caller))
            .await
            .unwrap_or_else(|err| {
                error!(
                    correlation_id = %correlation_id,
                    operation = name,
                    error = %err,
                    "Request task failed"
                );
                Err(ApiErrorResponse::internal("request could not be completed"))
            }),
        Err(err) => Err(err),
    };

    match outcome {
        Ok(body) => {
            info!(
                correlation_id = %correlation_id,
                operation = name,
                duration_us = start_time.elapsed().as_micros(),
                "Request completed"
            );
            (
                status,
                [(header::CONTENT_TYPE, "application/json")],
                Json(body),
            )
                .into_response()
        }
        Err(err) => {
            warn!(
                correlation_id = %correlation_id,
                operation = name,
                code = %err.error.code,
                error = %err.error.message,
                "Request rejected"
            );
            err.into_response()
        }
    }
}

/// Unwraps a JSON body, turning extractor rejections into API errors.
fn parse_json<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiErrorResponse> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            let error = match rejection {
                JsonRejection::JsonDataError(err) => {
                    let body_text = err.body_text();
                    if body_text.contains("missing field") {
                        ApiError::validation_error(body_text)
                    } else {
                        ApiError::malformed_json(body_text)
                    }
                }
                JsonRejection::JsonSyntaxError(err) => {
                    ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
                }
                JsonRejection::MissingJsonContentType(_) => {
                    ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
                }
                _ => ApiError::malformed_json("Failed to parse request body"),
            };
            Err(ApiErrorResponse::bad_request(error))
        }
    }
}

fn parse_query<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiErrorResponse> {
    query
        .map(|Query(query)| query)
        .map_err(|rejection| ApiErrorResponse::bad_request(ApiError::validation_error(rejection.body_text())))
}

// -----------------------------------------------------------------------------
// Sites
// -----------------------------------------------------------------------------

async fn register_site_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Site>, JsonRejection>,
) -> Response {
    run("register_site", StatusCode::CREATED, &headers, move |caller| {
        caller.require(Capability::ManageDirectory)?;
        let site = parse_json(payload)?;
        Ok(state.ledger().register_site(site)?)
    })
    .await
}

async fn get_site_handler(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    run("get_site", StatusCode::OK, &headers, move |caller| -> Result<Site, _> {
        caller.authorize_site(Capability::ViewSiteSummary, &site_id)?;
        Ok(state.ledger().site(&site_id)?)
    })
    .await
}

async fn record_cash_handler(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<MoneyRequest>, JsonRejection>,
) -> Response {
    run("record_cash", StatusCode::CREATED, &headers, move |caller| -> Result<SiteCash, _> {
        caller.authorize_site(Capability::RecordSiteMoney, &site_id)?;
        let request = parse_json(payload)?;
        Ok(state
            .ledger()
            .record_cash(&site_id, request.date, request.title, request.amount)?)
    })
    .await
}

async fn record_cost_handler(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<CostRequest>, JsonRejection>,
) -> Response {
    run("record_cost", StatusCode::CREATED, &headers, move |caller| -> Result<SiteCost, _> {
        caller.authorize_site(Capability::RecordSiteMoney, &site_id)?;
        let request = parse_json(payload)?;
        Ok(state.ledger().record_cost(
            &site_id,
            request.date,
            request.kind,
            request.title,
            request.amount,
        )?)
    })
    .await
}

async fn record_bill_handler(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<MoneyRequest>, JsonRejection>,
) -> Response {
    run("record_bill", StatusCode::CREATED, &headers, move |caller| -> Result<SiteBill, _> {
        caller.require(Capability::ManageDirectory)?;
        let request = parse_json(payload)?;
        Ok(state
            .ledger()
            .record_bill(&site_id, request.date, request.title, request.amount)?)
    })
    .await
}

async fn site_entries_handler(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    run("site_entries", StatusCode::OK, &headers, move |caller| -> Result<Vec<LedgerEntry>, _> {
        caller.authorize_site(Capability::ViewSiteSummary, &site_id)?;
        Ok(state.ledger().entries_for_site(&site_id)?)
    })
    .await
}

async fn site_snapshots_handler(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    headers: HeaderMap,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> Response {
    run("site_snapshots", StatusCode::OK, &headers, move |caller| -> Result<Vec<LedgerSnapshot>, _> {
        caller.authorize_site(Capability::ViewSiteSummary, &site_id)?;
        let query = parse_query(query)?;
        Ok(state.ledger().snapshots_for_site(&site_id, query.date)?)
    })
    .await
}

/// Summary of a site: the rolling today/yesterday view, or the view as of
/// `?date=` when given.
async fn site_summary_handler(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    headers: HeaderMap,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> Response {
    #[derive(Serialize)]
    #[serde(untagged)]
    enum SiteSummary {
        Rolling(RollingSummary),
        Date(DateSummary),
    }

    run("site_summary", StatusCode::OK, &headers, move |caller| {
        caller.authorize_site(Capability::ViewSiteSummary, &site_id)?;
        let detail = caller.summary_detail();
        let summary = match parse_query(query)?.date {
            Some(date) => SiteSummary::Date(
                state
                    .ledger()
                    .site_summary_for_date(&site_id, date, detail)?,
            ),
            None => SiteSummary::Rolling(state.ledger().site_summary_rolling(&site_id, detail)?),
        };
        Ok(summary)
    })
    .await
}

async fn site_total_handler(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    run("site_total", StatusCode::OK, &headers, move |caller| -> Result<TotalSummary, _> {
        caller.authorize_site(Capability::ViewTotalSummary, &site_id)?;
        Ok(state.ledger().site_summary_total(&site_id)?)
    })
    .await
}

// -----------------------------------------------------------------------------
// Employees and promotions
// -----------------------------------------------------------------------------

async fn register_employee_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Employee>, JsonRejection>,
) -> Response {
    run("register_employee", StatusCode::CREATED, &headers, move |caller| {
        caller.require(Capability::ManageDirectory)?;
        let employee = parse_json(payload)?;
        Ok(state.ledger().register_employee(employee)?)
    })
    .await
}

async fn get_employee_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    run("get_employee", StatusCode::OK, &headers, move |caller| -> Result<Employee, _> {
        caller.authorize_employee_records(&employee_id)?;
        Ok(state.ledger().employee(&employee_id)?)
    })
    .await
}

async fn assign_site_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<AssignSiteRequest>, JsonRejection>,
) -> Response {
    run("assign_site", StatusCode::OK, &headers, move |caller| -> Result<Employee, _> {
        caller.require(Capability::ManageDirectory)?;
        let request = parse_json(payload)?;
        Ok(state
            .ledger()
            .assign_current_site(&employee_id, request.site_id.as_deref())?)
    })
    .await
}

async fn list_promotions_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    run("list_promotions", StatusCode::OK, &headers, move |caller| -> Result<Vec<Promotion>, _> {
        caller.authorize_employee_records(&employee_id)?;
        Ok(state.ledger().promotions_for(&employee_id)?)
    })
    .await
}

async fn create_promotion_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<PromotionRequest>, JsonRejection>,
) -> Response {
    run("create_promotion", StatusCode::CREATED, &headers, move |caller| -> Result<Promotion, _> {
        caller.require(Capability::ManagePromotions)?;
        let request = parse_json(payload)?;
        Ok(state.ledger().create_promotion(
            &employee_id,
            request.effective_date,
            request.salary_rate,
        )?)
    })
    .await
}

async fn update_promotion_handler(
    State(state): State<AppState>,
    Path(promotion_id): Path<Uuid>,
    headers: HeaderMap,
    payload: Result<Json<PromotionRequest>, JsonRejection>,
) -> Response {
    run("update_promotion", StatusCode::OK, &headers, move |caller| -> Result<Promotion, _> {
        caller.require(Capability::ManagePromotions)?;
        let request = parse_json(payload)?;
        Ok(state.ledger().update_promotion(
            promotion_id,
            request.effective_date,
            request.salary_rate,
        )?)
    })
    .await
}

async fn delete_promotion_handler(
    State(state): State<AppState>,
    Path(promotion_id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    run("delete_promotion", StatusCode::OK, &headers, move |caller| -> Result<Promotion, _> {
        caller.require(Capability::ManagePromotions)?;
        Ok(state.ledger().delete_promotion(promotion_id)?)
    })
    .await
}

async fn salary_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    headers: HeaderMap,
    query: Result<Query<DateQuery>, QueryRejection>,
) -> Response {
    run("resolve_salary", StatusCode::OK, &headers, move |caller| {
        caller.authorize_employee_records(&employee_id)?;
        let date = parse_query(query)?
            .date
            .unwrap_or_else(|| state.ledger().clock().today());
        let salary_rate = state.ledger().resolve_salary(&employee_id, date)?;
        Ok(SalaryResponse {
            employee_id: employee_id.clone(),
            date,
            salary_rate,
        })
    })
    .await
}

// -----------------------------------------------------------------------------
// Daily ledger
// -----------------------------------------------------------------------------

async fn create_entries_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<CreateEntriesRequest>, JsonRejection>,
) -> Response {
    run("create_entries", StatusCode::CREATED, &headers, move |caller| -> Result<Vec<LedgerEntry>, _> {
        caller.require(Capability::RecordAttendance)?;
        let site_id = caller.require_site()?;
        let request = parse_json(payload)?;
        Ok(state.ledger().create_ledger_entries(site_id, request.entries)?)
    })
    .await
}

/// Fails unless the caller may change `entry_id`: site managers only touch
/// entries recorded at their own site.
fn authorize_entry_write(
    state: &AppState,
    caller: &CallerContext,
    entry_id: Uuid,
) -> Result<(), ApiErrorResponse> {
    let entry = state.ledger().ledger_entry(entry_id)?;
    caller.authorize_site(Capability::RecordAttendance, &entry.site_id)
}

async fn update_entry_handler(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
    headers: HeaderMap,
    payload: Result<Json<LedgerEntryUpdate>, JsonRejection>,
) -> Response {
    run("update_entry", StatusCode::OK, &headers, move |caller| -> Result<LedgerEntry, _> {
        authorize_entry_write(&state, caller, entry_id)?;
        let update = parse_json(payload)?;
        Ok(state.ledger().update_ledger_entry(entry_id, update)?)
    })
    .await
}

async fn delete_entry_handler(
    State(state): State<AppState>,
    Path(entry_id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    run("delete_entry", StatusCode::OK, &headers, move |caller| -> Result<LedgerEntry, _> {
        authorize_entry_write(&state, caller, entry_id)?;
        Ok(state.ledger().delete_ledger_entry(entry_id)?)
    })
    .await
}

async fn employee_entries_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    run("employee_entries", StatusCode::OK, &headers, move |caller| -> Result<Vec<LedgerEntry>, _> {
        caller.authorize_employee_records(&employee_id)?;
        Ok(state.ledger().entries_for_employee(&employee_id)?)
    })
    .await
}

// -----------------------------------------------------------------------------
// Settlements
// -----------------------------------------------------------------------------

async fn settlement_preview_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    run("settlement_preview", StatusCode::OK, &headers, move |caller| {
        caller.authorize_employee_records(&employee_id)?;
        let preview = state
            .ledger()
            .aggregate_open_settlement(&employee_id)?
            .map(AggregateResponse::from);
        Ok(preview)
    })
    .await
}

fn settlement_response(
    state: &AppState,
    settlement: Settlement,
) -> Result<SettlementResponse, ApiErrorResponse> {
    let records = state.ledger().site_work_records_for(settlement.id)?;
    Ok(SettlementResponse::new(settlement, records))
}

async fn create_settlement_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    headers: HeaderMap,
    payload: Result<Json<SettlementRequest>, JsonRejection>,
) -> Response {
    run("create_settlement", StatusCode::CREATED, &headers, move |caller| {
        caller.require_any(&[Capability::SettleAnyEmployee, Capability::SettleSiteEmployees])?;
        let employee = state.ledger().employee(&employee_id)?;
        caller.authorize_settlement(&employee)?;
        let request = parse_json(payload)?;
        let settlement = state
            .ledger()
            .create_settlement(&employee_id, request.pay_or_return)?;
        settlement_response(&state, settlement)
    })
    .await
}

async fn list_settlements_handler(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    run("list_settlements", StatusCode::OK, &headers, move |caller| {
        caller.authorize_employee_records(&employee_id)?;
        state
            .ledger()
            .settlements_for(&employee_id)?
            .into_iter()
            .map(|settlement| settlement_response(&state, settlement))
            .collect::<Result<Vec<_>, _>>()
    })
    .await
}

async fn get_settlement_handler(
    State(state): State<AppState>,
    Path(settlement_id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    run("get_settlement", StatusCode::OK, &headers, move |caller| {
        let settlement = state.ledger().settlement(settlement_id)?;
        caller.authorize_employee_records(&settlement.employee_id)?;
        settlement_response(&state, settlement)
    })
    .await
}

async fn grant_update_handler(
    State(state): State<AppState>,
    Path(settlement_id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    run("grant_settlement_update", StatusCode::OK, &headers, move |caller| {
        caller.require(Capability::GrantSettlementUpdate)?;
        let settlement = state.ledger().grant_settlement_update(settlement_id)?;
        settlement_response(&state, settlement)
    })
    .await
}

async fn adjust_pay_or_return_handler(
    State(state): State<AppState>,
    Path(settlement_id): Path<Uuid>,
    headers: HeaderMap,
    payload: Result<Json<PayOrReturnRequest>, JsonRejection>,
) -> Response {
    run("adjust_pay_or_return", StatusCode::OK, &headers, move |caller| {
        let settlement = state.ledger().settlement(settlement_id)?;
        caller.authorize_site(Capability::AdjustSettlement, &settlement.site_id)?;
        let request = parse_json(payload)?;
        let settlement = state
            .ledger()
            .adjust_pay_or_return(settlement_id, request.pay_or_return)?;
        settlement_response(&state, settlement)
    })
    .await
}
