//! Table definitions.
//!
//! Money is stored as decimal TEXT so nothing is lost to floating point.
//! Dates are `YYYY-MM-DD` and timestamps `YYYY-MM-DDTHH:MM:SS[.f]`, which
//! order correctly as text.

pub(super) const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS sites (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    location TEXT NOT NULL,
    start_at TEXT NOT NULL,
    handover TEXT
);

CREATE TABLE IF NOT EXISTS employees (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    date_joined TEXT NOT NULL,
    current_site TEXT REFERENCES sites(id)
);

CREATE TABLE IF NOT EXISTS promotions (
    id TEXT PRIMARY KEY,
    employee_id TEXT NOT NULL REFERENCES employees(id),
    effective_date TEXT NOT NULL,
    salary_rate TEXT NOT NULL,
    UNIQUE (employee_id, effective_date)
);

CREATE TABLE IF NOT EXISTS ledger_entries (
    id TEXT PRIMARY KEY,
    employee_id TEXT NOT NULL REFERENCES employees(id),
    site_id TEXT NOT NULL REFERENCES sites(id),
    date TEXT NOT NULL,
    presence TEXT NOT NULL,
    subsistence TEXT NOT NULL,
    advance TEXT NOT NULL,
    comment TEXT,
    created_at TEXT NOT NULL,
    UNIQUE (employee_id, date)
);
CREATE INDEX IF NOT EXISTS ledger_entries_idx_site_date
    ON ledger_entries(site_id, date);

CREATE TABLE IF NOT EXISTS settlements (
    id TEXT PRIMARY KEY,
    employee_id TEXT NOT NULL REFERENCES employees(id),
    site_id TEXT NOT NULL REFERENCES sites(id),
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    created_at TEXT NOT NULL,
    update_permission INTEGER NOT NULL DEFAULT 0 CHECK (update_permission IN (0, 1)),
    total_presence TEXT NOT NULL,
    total_subsistence TEXT NOT NULL,
    total_advance TEXT NOT NULL,
    session_salary_rate TEXT NOT NULL,
    earned_salary TEXT NOT NULL,
    last_settlement_payable TEXT NOT NULL,
    pay_or_return TEXT NOT NULL,
    CHECK (start_date <= end_date)
);
CREATE INDEX IF NOT EXISTS settlements_idx_employee_created
    ON settlements(employee_id, created_at);
-- At most one settlement per employee per calendar day.
CREATE UNIQUE INDEX IF NOT EXISTS settlements_idx_employee_day
    ON settlements(employee_id, substr(created_at, 1, 10));

CREATE TABLE IF NOT EXISTS site_work_records (
    id TEXT PRIMARY KEY,
    settlement_id TEXT NOT NULL REFERENCES settlements(id),
    employee_id TEXT NOT NULL REFERENCES employees(id),
    site_id TEXT NOT NULL REFERENCES sites(id),
    session_owner INTEGER NOT NULL CHECK (session_owner IN (0, 1)),
    presence TEXT NOT NULL,
    earned_salary TEXT NOT NULL,
    subsistence TEXT NOT NULL,
    advance TEXT NOT NULL,
    pay_or_return TEXT NOT NULL,
    created_date TEXT NOT NULL,
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    days TEXT NOT NULL,
    UNIQUE (settlement_id, site_id),
    CHECK (session_owner = 1 OR CAST(pay_or_return AS REAL) = 0)
);
CREATE INDEX IF NOT EXISTS site_work_records_idx_site
    ON site_work_records(site_id);

CREATE TABLE IF NOT EXISTS ledger_snapshots (
    id TEXT PRIMARY KEY,
    entry_id TEXT NOT NULL,
    settlement_id TEXT NOT NULL REFERENCES settlements(id),
    employee_id TEXT NOT NULL REFERENCES employees(id),
    site_id TEXT NOT NULL REFERENCES sites(id),
    date TEXT NOT NULL,
    presence TEXT NOT NULL,
    subsistence TEXT NOT NULL,
    advance TEXT NOT NULL,
    salary_rate TEXT NOT NULL,
    comment TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS ledger_snapshots_idx_site_date
    ON ledger_snapshots(site_id, date);

CREATE TABLE IF NOT EXISTS site_cash (
    id TEXT PRIMARY KEY,
    site_id TEXT NOT NULL REFERENCES sites(id),
    date TEXT NOT NULL,
    title TEXT NOT NULL,
    amount TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS site_cash_idx_site ON site_cash(site_id);

CREATE TABLE IF NOT EXISTS site_costs (
    id TEXT PRIMARY KEY,
    site_id TEXT NOT NULL REFERENCES sites(id),
    date TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('equipment', 'other')),
    title TEXT NOT NULL,
    amount TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS site_costs_idx_site ON site_costs(site_id);

CREATE TABLE IF NOT EXISTS site_bills (
    id TEXT PRIMARY KEY,
    site_id TEXT NOT NULL REFERENCES sites(id),
    date TEXT NOT NULL,
    title TEXT NOT NULL,
    amount TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS site_bills_idx_site ON site_bills(site_id);
"#;
