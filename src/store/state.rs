//! The ledger's tables, as seen from inside one transaction.

use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, Params, Row, params};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::calculation::SalaryTimeline;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    Employee, LedgerEntry, LedgerSnapshot, Promotion, Settlement, Site, SiteBill, SiteCash,
    SiteCost, SiteWorkRecord,
};

use super::rows::{
    self, CASH_COLUMNS, COST_COLUMNS, EMPLOYEE_COLUMNS, ENTRY_COLUMNS, PROMOTION_COLUMNS,
    SETTLEMENT_COLUMNS, SITE_COLUMNS, SNAPSHOT_COLUMNS, WORK_RECORD_COLUMNS, datetime_text,
    days_text,
};

/// Typed access to the ledger tables.
///
/// Every method runs inside the transaction the state was opened on.
/// Inserts rely on the schema's uniqueness and check constraints; a
/// violation fails with [`EngineError::Integrity`] and aborts the enclosing
/// transaction. Callers are expected to have validated the request already.
#[derive(Debug)]
pub struct LedgerState<'c> {
    conn: &'c Connection,
}

impl<'c> LedgerState<'c> {
    pub(super) fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    fn query_all<T, P: Params>(
        &self,
        sql: &str,
        params: P,
        decode: fn(&Row<'_>) -> EngineResult<T>,
    ) -> EngineResult<Vec<T>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(decode(row)?);
        }
        Ok(items)
    }

    fn query_first<T, P: Params>(
        &self,
        sql: &str,
        params: P,
        decode: fn(&Row<'_>) -> EngineResult<T>,
    ) -> EngineResult<Option<T>> {
        let mut stmt = self.conn.prepare_cached(sql)?;
        let mut rows = stmt.query(params)?;
        let row = rows.next()?;
        row.map(decode).transpose()
    }

    // -------------------------------------------------------------------------
    // Directory
    // -------------------------------------------------------------------------

    /// Looks up an employee, if registered.
    pub fn find_employee(&self, employee_id: &str) -> EngineResult<Option<Employee>> {
        self.query_first(
            &format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?1"),
            [employee_id],
            rows::employee,
        )
    }

    /// Looks up an employee.
    pub fn employee(&self, employee_id: &str) -> EngineResult<Employee> {
        self.find_employee(employee_id)?
            .ok_or_else(|| EngineError::not_found("employee", employee_id))
    }

    /// Adds an employee.
    pub fn insert_employee(&self, employee: &Employee) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO employees (id, name, date_joined, current_site) VALUES (?1, ?2, ?3, ?4)",
            params![
                employee.id,
                employee.name,
                employee.date_joined.to_string(),
                employee.current_site
            ],
        )?;
        Ok(())
    }

    /// Assigns the employee to `site_id`, or clears the assignment.
    pub fn set_current_site(
        &self,
        employee_id: &str,
        site_id: Option<&str>,
    ) -> EngineResult<Employee> {
        let changed = self.conn.execute(
            "UPDATE employees SET current_site = ?2 WHERE id = ?1",
            params![employee_id, site_id],
        )?;
        if changed == 0 {
            return Err(EngineError::not_found("employee", employee_id));
        }
        self.employee(employee_id)
    }

    /// Looks up a site, if registered.
    pub fn find_site(&self, site_id: &str) -> EngineResult<Option<Site>> {
        self.query_first(
            &format!("SELECT {SITE_COLUMNS} FROM sites WHERE id = ?1"),
            [site_id],
            rows::site,
        )
    }

    /// Looks up a site.
    pub fn site(&self, site_id: &str) -> EngineResult<Site> {
        self.find_site(site_id)?
            .ok_or_else(|| EngineError::not_found("site", site_id))
    }

    /// Adds a site.
    pub fn insert_site(&self, site: &Site) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO sites (id, name, location, start_at, handover) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                site.id,
                site.name,
                site.location,
                site.start_at.to_string(),
                site.handover.map(|d| d.to_string())
            ],
        )?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Promotions
    // -------------------------------------------------------------------------

    /// Looks up a promotion.
    pub fn promotion(&self, promotion_id: Uuid) -> EngineResult<Promotion> {
        self.query_first(
            &format!("SELECT {PROMOTION_COLUMNS} FROM promotions WHERE id = ?1"),
            [promotion_id.to_string()],
            rows::promotion,
        )?
        .ok_or_else(|| EngineError::not_found("promotion", promotion_id.to_string()))
    }

    /// The employee's promotions, latest first.
    pub fn promotions_for(&self, employee_id: &str) -> EngineResult<Vec<Promotion>> {
        self.query_all(
            &format!(
                "SELECT {PROMOTION_COLUMNS} FROM promotions WHERE employee_id = ?1 \
                 ORDER BY effective_date DESC"
            ),
            [employee_id],
            rows::promotion,
        )
    }

    /// The employee's salary timeline.
    pub fn salary_timeline(&self, employee_id: &str) -> EngineResult<SalaryTimeline> {
        Ok(SalaryTimeline::new(&self.promotions_for(employee_id)?))
    }

    /// Adds a promotion; unique per `(employee_id, effective_date)`.
    pub fn insert_promotion(&self, promotion: &Promotion) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO promotions (id, employee_id, effective_date, salary_rate) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                promotion.id.to_string(),
                promotion.employee_id,
                promotion.effective_date.to_string(),
                promotion.salary_rate.to_string()
            ],
        )?;
        Ok(())
    }

    /// Stores a promotion's new date and rate.
    pub fn update_promotion(&self, promotion: &Promotion) -> EngineResult<()> {
        let changed = self.conn.execute(
            "UPDATE promotions SET effective_date = ?2, salary_rate = ?3 WHERE id = ?1",
            params![
                promotion.id.to_string(),
                promotion.effective_date.to_string(),
                promotion.salary_rate.to_string()
            ],
        )?;
        if changed == 0 {
            return Err(EngineError::not_found("promotion", promotion.id.to_string()));
        }
        Ok(())
    }

    /// Removes a promotion.
    pub fn delete_promotion(&self, promotion_id: Uuid) -> EngineResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM promotions WHERE id = ?1",
            [promotion_id.to_string()],
        )?;
        if changed == 0 {
            return Err(EngineError::not_found("promotion", promotion_id.to_string()));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Ledger entries and snapshots
    // -------------------------------------------------------------------------

    /// Looks up an open entry.
    pub fn entry(&self, entry_id: Uuid) -> EngineResult<LedgerEntry> {
        self.query_first(
            &format!("SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE id = ?1"),
            [entry_id.to_string()],
            rows::entry,
        )?
        .ok_or_else(|| EngineError::not_found("ledger entry", entry_id.to_string()))
    }

    /// The employee's open entry for `date`, if any.
    pub fn entry_on(&self, employee_id: &str, date: NaiveDate) -> EngineResult<Option<LedgerEntry>> {
        self.query_first(
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE employee_id = ?1 AND date = ?2"
            ),
            params![employee_id, date.to_string()],
            rows::entry,
        )
    }

    /// The employee's open entries, oldest first.
    pub fn entries_for_employee(&self, employee_id: &str) -> EngineResult<Vec<LedgerEntry>> {
        self.query_all(
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE employee_id = ?1 ORDER BY date"
            ),
            [employee_id],
            rows::entry,
        )
    }

    /// Open entries recorded at a site, by date then employee.
    pub fn entries_for_site(&self, site_id: &str) -> EngineResult<Vec<LedgerEntry>> {
        self.query_all(
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM ledger_entries WHERE site_id = ?1 \
                 ORDER BY date, employee_id"
            ),
            [site_id],
            rows::entry,
        )
    }

    /// Adds an open entry; unique per `(employee_id, date)`.
    pub fn insert_entry(&self, entry: &LedgerEntry) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO ledger_entries (
                id, employee_id, site_id, date, presence, subsistence, advance, comment, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                entry.id.to_string(),
                entry.employee_id,
                entry.site_id,
                entry.date.to_string(),
                entry.presence.to_string(),
                entry.subsistence.to_string(),
                entry.advance.to_string(),
                entry.comment,
                datetime_text(entry.created_at)
            ],
        )?;
        Ok(())
    }

    /// Stores an entry's quantities and comment.
    pub fn update_entry(&self, entry: &LedgerEntry) -> EngineResult<()> {
        let changed = self.conn.execute(
            "UPDATE ledger_entries SET presence = ?2, subsistence = ?3, advance = ?4, comment = ?5 \
             WHERE id = ?1",
            params![
                entry.id.to_string(),
                entry.presence.to_string(),
                entry.subsistence.to_string(),
                entry.advance.to_string(),
                entry.comment
            ],
        )?;
        if changed == 0 {
            return Err(EngineError::not_found("ledger entry", entry.id.to_string()));
        }
        Ok(())
    }

    /// Removes one open entry.
    pub fn remove_entry(&self, entry_id: Uuid) -> EngineResult<LedgerEntry> {
        let entry = self.entry(entry_id)?;
        self.conn.execute(
            "DELETE FROM ledger_entries WHERE id = ?1",
            [entry_id.to_string()],
        )?;
        Ok(entry)
    }

    /// Removes all of the employee's open entries and returns how many went.
    pub fn remove_entries_for(&self, employee_id: &str) -> EngineResult<usize> {
        Ok(self.conn.execute(
            "DELETE FROM ledger_entries WHERE employee_id = ?1",
            [employee_id],
        )?)
    }

    /// Adds a snapshot of a consumed entry.
    pub fn insert_snapshot(&self, snapshot: &LedgerSnapshot) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO ledger_snapshots (
                id, entry_id, settlement_id, employee_id, site_id, date, presence, subsistence,
                advance, salary_rate, comment, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                snapshot.id.to_string(),
                snapshot.entry_id.to_string(),
                snapshot.settlement_id.to_string(),
                snapshot.employee_id,
                snapshot.site_id,
                snapshot.date.to_string(),
                snapshot.presence.to_string(),
                snapshot.subsistence.to_string(),
                snapshot.advance.to_string(),
                snapshot.salary_rate.to_string(),
                snapshot.comment,
                datetime_text(snapshot.created_at)
            ],
        )?;
        Ok(())
    }

    /// Snapshots taken at a site, optionally only those for `date`, by date
    /// then employee.
    pub fn snapshots_for_site(
        &self,
        site_id: &str,
        date: Option<NaiveDate>,
    ) -> EngineResult<Vec<LedgerSnapshot>> {
        self.query_all(
            &format!(
                "SELECT {SNAPSHOT_COLUMNS} FROM ledger_snapshots \
                 WHERE site_id = ?1 AND (?2 IS NULL OR date = ?2) \
                 ORDER BY date, employee_id"
            ),
            params![site_id, date.map(|d| d.to_string())],
            rows::snapshot,
        )
    }

    // -------------------------------------------------------------------------
    // Settlements
    // -------------------------------------------------------------------------

    /// Looks up a settlement.
    pub fn settlement(&self, settlement_id: Uuid) -> EngineResult<Settlement> {
        self.query_first(
            &format!("SELECT {SETTLEMENT_COLUMNS} FROM settlements WHERE id = ?1"),
            [settlement_id.to_string()],
            rows::settlement,
        )?
        .ok_or_else(|| EngineError::not_found("settlement", settlement_id.to_string()))
    }

    /// The employee's settlements, oldest first.
    pub fn settlements_for(&self, employee_id: &str) -> EngineResult<Vec<Settlement>> {
        self.query_all(
            &format!(
                "SELECT {SETTLEMENT_COLUMNS} FROM settlements WHERE employee_id = ?1 \
                 ORDER BY created_at, rowid"
            ),
            [employee_id],
            rows::settlement,
        )
    }

    /// The employee's latest settlement.
    pub fn last_settlement(&self, employee_id: &str) -> EngineResult<Option<Settlement>> {
        self.query_first(
            &format!(
                "SELECT {SETTLEMENT_COLUMNS} FROM settlements WHERE employee_id = ?1 \
                 ORDER BY created_at DESC, rowid DESC LIMIT 1"
            ),
            [employee_id],
            rows::settlement,
        )
    }

    /// The latest `end_date` across the employee's settlements.
    pub fn settled_until(&self, employee_id: &str) -> EngineResult<Option<NaiveDate>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT MAX(end_date) FROM settlements WHERE employee_id = ?1",
                [employee_id],
                |row| row.get(0),
            )
            .optional()?
            .flatten();
        raw.map(|raw| rows::parse_date("end_date", &raw)).transpose()
    }

    /// Adds a settlement.
    pub fn insert_settlement(&self, settlement: &Settlement) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO settlements (
                id, employee_id, site_id, start_date, end_date, created_at, update_permission,
                total_presence, total_subsistence, total_advance, session_salary_rate,
                earned_salary, last_settlement_payable, pay_or_return
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                settlement.id.to_string(),
                settlement.employee_id,
                settlement.site_id,
                settlement.start_date.to_string(),
                settlement.end_date.to_string(),
                datetime_text(settlement.created_at),
                settlement.update_permission,
                settlement.total_presence.to_string(),
                settlement.total_subsistence.to_string(),
                settlement.total_advance.to_string(),
                settlement.session_salary_rate.to_string(),
                settlement.earned_salary.to_string(),
                settlement.last_settlement_payable.to_string(),
                settlement.pay_or_return.to_string()
            ],
        )?;
        Ok(())
    }

    /// Stores a settlement's `pay_or_return` and update permission.
    pub fn update_settlement(&self, settlement: &Settlement) -> EngineResult<()> {
        let changed = self.conn.execute(
            "UPDATE settlements SET pay_or_return = ?2, update_permission = ?3 WHERE id = ?1",
            params![
                settlement.id.to_string(),
                settlement.pay_or_return.to_string(),
                settlement.update_permission
            ],
        )?;
        if changed == 0 {
            return Err(EngineError::not_found("settlement", settlement.id.to_string()));
        }
        Ok(())
    }

    /// Adds a per-site settlement row.
    ///
    /// Only the owner row may carry a `pay_or_return` amount, and a
    /// settlement has at most one row per site.
    pub fn insert_site_work_record(&self, record: &SiteWorkRecord) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO site_work_records (
                id, settlement_id, employee_id, site_id, session_owner, presence, earned_salary,
                subsistence, advance, pay_or_return, created_date, start_date, end_date, days
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                record.id.to_string(),
                record.settlement_id.to_string(),
                record.employee_id,
                record.site_id,
                record.session_owner,
                record.presence.to_string(),
                record.earned_salary.to_string(),
                record.subsistence.to_string(),
                record.advance.to_string(),
                record.pay_or_return.to_string(),
                record.created_date.to_string(),
                record.start_date.to_string(),
                record.end_date.to_string(),
                days_text(&record.days)?
            ],
        )?;
        Ok(())
    }

    /// The per-site rows of a settlement, by site.
    pub fn site_work_records_for(&self, settlement_id: Uuid) -> EngineResult<Vec<SiteWorkRecord>> {
        self.query_all(
            &format!(
                "SELECT {WORK_RECORD_COLUMNS} FROM site_work_records WHERE settlement_id = ?1 \
                 ORDER BY site_id"
            ),
            [settlement_id.to_string()],
            rows::work_record,
        )
    }

    /// Moves a new `pay_or_return` onto the settlement's owner row.
    pub fn set_owner_pay_or_return(
        &self,
        settlement_id: Uuid,
        pay_or_return: Decimal,
    ) -> EngineResult<()> {
        let changed = self.conn.execute(
            "UPDATE site_work_records SET pay_or_return = ?2 \
             WHERE settlement_id = ?1 AND session_owner = 1",
            params![settlement_id.to_string(), pay_or_return.to_string()],
        )?;
        if changed != 1 {
            return Err(EngineError::integrity(format!(
                "settlement '{settlement_id}' has {changed} owner rows"
            )));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Site money and summary sources
    // -------------------------------------------------------------------------

    /// Adds cash received by a site.
    pub fn insert_cash(&self, cash: &SiteCash) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO site_cash (id, site_id, date, title, amount) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                cash.id.to_string(),
                cash.site_id,
                cash.date.to_string(),
                cash.title,
                cash.amount.to_string()
            ],
        )?;
        Ok(())
    }

    /// Adds a site cost.
    pub fn insert_cost(&self, cost: &SiteCost) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO site_costs (id, site_id, date, kind, title, amount) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                cost.id.to_string(),
                cost.site_id,
                cost.date.to_string(),
                cost.kind.as_str(),
                cost.title,
                cost.amount.to_string()
            ],
        )?;
        Ok(())
    }

    /// Adds a site bill.
    pub fn insert_bill(&self, bill: &SiteBill) -> EngineResult<()> {
        self.conn.execute(
            "INSERT INTO site_bills (id, site_id, date, title, amount) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                bill.id.to_string(),
                bill.site_id,
                bill.date.to_string(),
                bill.title,
                bill.amount.to_string()
            ],
        )?;
        Ok(())
    }

    /// Cash received by a site.
    pub fn cash_for_site(&self, site_id: &str) -> EngineResult<Vec<SiteCash>> {
        self.query_all(
            &format!("SELECT {CASH_COLUMNS} FROM site_cash WHERE site_id = ?1 ORDER BY date"),
            [site_id],
            rows::cash,
        )
    }

    /// Costs of a site.
    pub fn costs_for_site(&self, site_id: &str) -> EngineResult<Vec<SiteCost>> {
        self.query_all(
            &format!("SELECT {COST_COLUMNS} FROM site_costs WHERE site_id = ?1 ORDER BY date"),
            [site_id],
            rows::cost,
        )
    }

    /// Amounts billed for a site.
    pub fn bills_for_site(&self, site_id: &str) -> EngineResult<Vec<SiteBill>> {
        self.query_all(
            &format!("SELECT {CASH_COLUMNS} FROM site_bills WHERE site_id = ?1 ORDER BY date"),
            [site_id],
            rows::bill,
        )
    }

    /// Settled work records attributed to a site.
    pub fn work_records_for_site(&self, site_id: &str) -> EngineResult<Vec<SiteWorkRecord>> {
        self.query_all(
            &format!(
                "SELECT {WORK_RECORD_COLUMNS} FROM site_work_records WHERE site_id = ?1 \
                 ORDER BY created_date"
            ),
            [site_id],
            rows::work_record,
        )
    }
}
