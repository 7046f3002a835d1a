//! Conversions between rows and domain records.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Row;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    CostKind, DayContribution, Employee, LedgerEntry, LedgerSnapshot, Promotion, Settlement, Site,
    SiteBill, SiteCash, SiteCost, SiteWorkRecord,
};

const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub(super) const SITE_COLUMNS: &str = "id, name, location, start_at, handover";
pub(super) const EMPLOYEE_COLUMNS: &str = "id, name, date_joined, current_site";
pub(super) const PROMOTION_COLUMNS: &str = "id, employee_id, effective_date, salary_rate";
pub(super) const ENTRY_COLUMNS: &str =
    "id, employee_id, site_id, date, presence, subsistence, advance, comment, created_at";
pub(super) const SNAPSHOT_COLUMNS: &str = "id, entry_id, settlement_id, employee_id, site_id, \
     date, presence, subsistence, advance, salary_rate, comment, created_at";
pub(super) const SETTLEMENT_COLUMNS: &str = "id, employee_id, site_id, start_date, end_date, \
     created_at, update_permission, total_presence, total_subsistence, total_advance, \
     session_salary_rate, earned_salary, last_settlement_payable, pay_or_return";
pub(super) const WORK_RECORD_COLUMNS: &str = "id, settlement_id, employee_id, site_id, \
     session_owner, presence, earned_salary, subsistence, advance, pay_or_return, created_date, \
     start_date, end_date, days";
pub(super) const CASH_COLUMNS: &str = "id, site_id, date, title, amount";
pub(super) const COST_COLUMNS: &str = "id, site_id, date, kind, title, amount";

/// Formats a timestamp the way it is stored.
pub(super) fn datetime_text(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

/// Serializes a work record's day breakdown.
pub(super) fn days_text(days: &[DayContribution]) -> EngineResult<String> {
    serde_json::to_string(days)
        .map_err(|err| EngineError::storage(format!("cannot encode day breakdown: {err}")))
}

fn decimal(row: &Row<'_>, column: &str) -> EngineResult<Decimal> {
    let raw: String = row.get(column)?;
    Decimal::from_str(&raw)
        .map_err(|err| EngineError::storage(format!("invalid decimal in {column} '{raw}': {err}")))
}

fn date(row: &Row<'_>, column: &str) -> EngineResult<NaiveDate> {
    let raw: String = row.get(column)?;
    parse_date(column, &raw)
}

fn optional_date(row: &Row<'_>, column: &str) -> EngineResult<Option<NaiveDate>> {
    let raw: Option<String> = row.get(column)?;
    raw.map(|raw| parse_date(column, &raw)).transpose()
}

pub(super) fn parse_date(column: &str, raw: &str) -> EngineResult<NaiveDate> {
    NaiveDate::from_str(raw)
        .map_err(|err| EngineError::storage(format!("invalid date in {column} '{raw}': {err}")))
}

fn datetime(row: &Row<'_>, column: &str) -> EngineResult<NaiveDateTime> {
    let raw: String = row.get(column)?;
    NaiveDateTime::parse_from_str(&raw, DATETIME_FORMAT).map_err(|err| {
        EngineError::storage(format!("invalid timestamp in {column} '{raw}': {err}"))
    })
}

fn uuid(row: &Row<'_>, column: &str) -> EngineResult<Uuid> {
    let raw: String = row.get(column)?;
    Uuid::parse_str(&raw)
        .map_err(|err| EngineError::storage(format!("invalid id in {column} '{raw}': {err}")))
}

pub(super) fn site(row: &Row<'_>) -> EngineResult<Site> {
    Ok(Site {
        id: row.get("id")?,
        name: row.get("name")?,
        location: row.get("location")?,
        start_at: date(row, "start_at")?,
        handover: optional_date(row, "handover")?,
    })
}

pub(super) fn employee(row: &Row<'_>) -> EngineResult<Employee> {
    Ok(Employee {
        id: row.get("id")?,
        name: row.get("name")?,
        date_joined: date(row, "date_joined")?,
        current_site: row.get("current_site")?,
    })
}

pub(super) fn promotion(row: &Row<'_>) -> EngineResult<Promotion> {
    Ok(Promotion {
        id: uuid(row, "id")?,
        employee_id: row.get("employee_id")?,
        effective_date: date(row, "effective_date")?,
        salary_rate: decimal(row, "salary_rate")?,
    })
}

pub(super) fn entry(row: &Row<'_>) -> EngineResult<LedgerEntry> {
    Ok(LedgerEntry {
        id: uuid(row, "id")?,
        employee_id: row.get("employee_id")?,
        site_id: row.get("site_id")?,
        date: date(row, "date")?,
        presence: decimal(row, "presence")?,
        subsistence: decimal(row, "subsistence")?,
        advance: decimal(row, "advance")?,
        comment: row.get("comment")?,
        created_at: datetime(row, "created_at")?,
    })
}

pub(super) fn snapshot(row: &Row<'_>) -> EngineResult<LedgerSnapshot> {
    Ok(LedgerSnapshot {
        id: uuid(row, "id")?,
        entry_id: uuid(row, "entry_id")?,
        settlement_id: uuid(row, "settlement_id")?,
        employee_id: row.get("employee_id")?,
        site_id: row.get("site_id")?,
        date: date(row, "date")?,
        presence: decimal(row, "presence")?,
        subsistence: decimal(row, "subsistence")?,
        advance: decimal(row, "advance")?,
        salary_rate: decimal(row, "salary_rate")?,
        comment: row.get("comment")?,
        created_at: datetime(row, "created_at")?,
    })
}

pub(super) fn settlement(row: &Row<'_>) -> EngineResult<Settlement> {
    Ok(Settlement {
        id: uuid(row, "id")?,
        employee_id: row.get("employee_id")?,
        site_id: row.get("site_id")?,
        start_date: date(row, "start_date")?,
        end_date: date(row, "end_date")?,
        created_at: datetime(row, "created_at")?,
        update_permission: row.get("update_permission")?,
        total_presence: decimal(row, "total_presence")?,
        total_subsistence: decimal(row, "total_subsistence")?,
        total_advance: decimal(row, "total_advance")?,
        session_salary_rate: decimal(row, "session_salary_rate")?,
        earned_salary: decimal(row, "earned_salary")?,
        last_settlement_payable: decimal(row, "last_settlement_payable")?,
        pay_or_return: decimal(row, "pay_or_return")?,
    })
}

pub(super) fn work_record(row: &Row<'_>) -> EngineResult<SiteWorkRecord> {
    let days: String = row.get("days")?;
    let days = serde_json::from_str(&days)
        .map_err(|err| EngineError::storage(format!("invalid day breakdown: {err}")))?;

    Ok(SiteWorkRecord {
        id: uuid(row, "id")?,
        settlement_id: uuid(row, "settlement_id")?,
        employee_id: row.get("employee_id")?,
        site_id: row.get("site_id")?,
        session_owner: row.get("session_owner")?,
        presence: decimal(row, "presence")?,
        earned_salary: decimal(row, "earned_salary")?,
        subsistence: decimal(row, "subsistence")?,
        advance: decimal(row, "advance")?,
        pay_or_return: decimal(row, "pay_or_return")?,
        created_date: date(row, "created_date")?,
        start_date: date(row, "start_date")?,
        end_date: date(row, "end_date")?,
        days,
    })
}

pub(super) fn cash(row: &Row<'_>) -> EngineResult<SiteCash> {
    Ok(SiteCash {
        id: uuid(row, "id")?,
        site_id: row.get("site_id")?,
        date: date(row, "date")?,
        title: row.get("title")?,
        amount: decimal(row, "amount")?,
    })
}

pub(super) fn cost(row: &Row<'_>) -> EngineResult<SiteCost> {
    let kind: String = row.get("kind")?;
    Ok(SiteCost {
        id: uuid(row, "id")?,
        site_id: row.get("site_id")?,
        date: date(row, "date")?,
        kind: CostKind::from_str(&kind).map_err(EngineError::storage)?,
        title: row.get("title")?,
        amount: decimal(row, "amount")?,
    })
}

pub(super) fn bill(row: &Row<'_>) -> EngineResult<SiteBill> {
    Ok(SiteBill {
        id: uuid(row, "id")?,
        site_id: row.get("site_id")?,
        date: date(row, "date")?,
        title: row.get("title")?,
        amount: decimal(row, "amount")?,
    })
}
