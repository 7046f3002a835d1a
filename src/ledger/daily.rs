//! Daily ledger entries.

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::calculation::{check_entry_amounts, check_entry_comment, check_entry_date, window_start};
use crate::error::{EngineError, EngineResult};
use crate::models::{LedgerEntry, LedgerEntryUpdate, LedgerSnapshot, NewLedgerEntry};
use crate::store::LedgerState;

use super::Ledger;

impl Ledger {
    /// Records one day of attendance at `site_id`.
    pub fn create_ledger_entry(
        &self,
        site_id: &str,
        input: NewLedgerEntry,
    ) -> EngineResult<LedgerEntry> {
        self.store
            .transaction(|state| self.stage_entry(state, site_id, input))
    }

    /// Records a batch of attendance at `site_id`, all or nothing.
    ///
    /// The site comes from the submitter's context, never from the rows.
    pub fn create_ledger_entries(
        &self,
        site_id: &str,
        inputs: Vec<NewLedgerEntry>,
    ) -> EngineResult<Vec<LedgerEntry>> {
        let entries = self.store.transaction(|state| {
            inputs
                .into_iter()
                .map(|input| self.stage_entry(state, site_id, input))
                .collect::<EngineResult<Vec<_>>>()
        })?;
        info!(site_id = %site_id, entry_count = entries.len(), "Ledger entries created");
        Ok(entries)
    }

    /// Changes the quantities and comment of an open entry.
    pub fn update_ledger_entry(
        &self,
        entry_id: Uuid,
        update: LedgerEntryUpdate,
    ) -> EngineResult<LedgerEntry> {
        check_entry_amounts(update.presence, update.subsistence, update.advance, &self.config)?;
        check_entry_comment(update.comment.as_deref(), &self.config)?;
        let today = self.clock.today();
        let window_days = self.config.attendance.entry_window_days;

        self.store.transaction(|state| {
            let mut entry = state.entry(entry_id)?;
            let employee = state.employee(&entry.employee_id)?;
            check_entry_date(
                &employee,
                entry.date,
                today,
                window_days,
                state.settled_until(&entry.employee_id)?,
            )?;

            entry.presence = update.presence;
            entry.subsistence = update.subsistence;
            entry.advance = update.advance;
            entry.comment = update.comment;
            state.update_entry(&entry)?;
            Ok(entry)
        })
    }

    /// Deletes an open entry.
    pub fn delete_ledger_entry(&self, entry_id: Uuid) -> EngineResult<LedgerEntry> {
        self.store.transaction(|state| state.remove_entry(entry_id))
    }

    /// Looks up an open entry.
    pub fn ledger_entry(&self, entry_id: Uuid) -> EngineResult<LedgerEntry> {
        self.store.read(|state| state.entry(entry_id))
    }

    /// The employee's open entries, oldest first.
    pub fn entries_for_employee(&self, employee_id: &str) -> EngineResult<Vec<LedgerEntry>> {
        self.store.read(|state| {
            state.employee(employee_id)?;
            state.entries_for_employee(employee_id)
        })
    }

    /// Open entries recorded at a site, by date then employee.
    pub fn entries_for_site(&self, site_id: &str) -> EngineResult<Vec<LedgerEntry>> {
        self.store.read(|state| {
            state.site(site_id)?;
            state.entries_for_site(site_id)
        })
    }

    /// Snapshots taken at a site, optionally only those for `date`.
    pub fn snapshots_for_site(
        &self,
        site_id: &str,
        date: Option<NaiveDate>,
    ) -> EngineResult<Vec<LedgerSnapshot>> {
        self.store.read(|state| {
            state.site(site_id)?;
            state.snapshots_for_site(site_id, date)
        })
    }

    /// Validates `input` against the staged state and inserts it.
    fn stage_entry(
        &self,
        state: &LedgerState<'_>,
        site_id: &str,
        input: NewLedgerEntry,
    ) -> EngineResult<LedgerEntry> {
        state.site(site_id)?;
        let employee = state.employee(&input.employee_id)?;
        check_entry_amounts(input.presence, input.subsistence, input.advance, &self.config)?;
        check_entry_comment(input.comment.as_deref(), &self.config)?;
        check_entry_date(
            &employee,
            input.date,
            self.clock.today(),
            self.config.attendance.entry_window_days,
            state.settled_until(&input.employee_id)?,
        )?;
        if state.entry_on(&input.employee_id, input.date)?.is_some() {
            return Err(EngineError::DuplicateEntry {
                employee_id: input.employee_id,
                date: input.date,
            });
        }

        let entry = LedgerEntry {
            id: Uuid::new_v4(),
            employee_id: input.employee_id,
            site_id: site_id.to_string(),
            date: input.date,
            presence: input.presence,
            subsistence: input.subsistence,
            advance: input.advance,
            comment: input.comment,
            created_at: self.clock.now(),
        };
        state.insert_entry(&entry)?;
        Ok(entry)
    }

    /// First date whose entries get snapshotted by a settlement created today.
    pub(crate) fn snapshot_window_start(&self, today: NaiveDate) -> NaiveDate {
        window_start(today, self.config.settlement.snapshot_window_days)
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::error::EngineError;
    use crate::ledger::test_support::{jan, ledger, present};
    use crate::models::{Employee, LedgerEntryUpdate, NewLedgerEntry};

    #[test]
    fn test_entry_gets_site_from_context() {
        let (ledger, _) = ledger();
        let entry = ledger.create_ledger_entry("site_y", present("emp_001", jan(2))).unwrap();
        assert_eq!(entry.site_id, "site_y");
        assert_eq!(ledger.entries_for_site("site_y").unwrap().len(), 1);
        assert!(ledger.entries_for_site("site_x").unwrap().is_empty());
    }

    /// Two entries for the same employee and date.
    #[test]
    fn test_duplicate_entry_rejected() {
        let (ledger, _) = ledger();
        ledger.create_ledger_entry("site_x", present("emp_001", jan(2))).unwrap();
        let result = ledger.create_ledger_entry("site_y", present("emp_001", jan(2)));
        assert!(matches!(result, Err(EngineError::DuplicateEntry { .. })));
    }

    #[test]
    fn test_entry_window_enforced_from_clock() {
        let (ledger, clock) = ledger();
        clock.advance_days(3);
        let result = ledger.create_ledger_entry("site_x", present("emp_001", jan(2)));
        assert!(matches!(result, Err(EngineError::DateOutsideEntryWindow { .. })));
    }

    #[test]
    fn test_bulk_create_is_atomic() {
        let (ledger, _) = ledger();
        ledger
            .register_employee(Employee::new("emp_002", "Karim", jan(1)).with_site("site_x"))
            .unwrap();

        let batch = vec![
            present("emp_002", jan(2)),
            present("emp_001", jan(2)),
            present("emp_001", jan(2)),
        ];
        let result = ledger.create_ledger_entries("site_x", batch);
        assert!(matches!(result, Err(EngineError::DuplicateEntry { .. })));
        assert!(ledger.entries_for_site("site_x").unwrap().is_empty());

        let batch = vec![present("emp_002", jan(2)), present("emp_001", jan(1))];
        let created = ledger.create_ledger_entries("site_x", batch).unwrap();
        assert_eq!(created.len(), 2);
    }

    #[test]
    fn test_update_changes_quantities_only() {
        let (ledger, _) = ledger();
        let entry = ledger
            .create_ledger_entry(
                "site_x",
                NewLedgerEntry::new("emp_001", jan(2), dec!(1)).with_advance(dec!(200)),
            )
            .unwrap();

        let updated = ledger
            .update_ledger_entry(
                entry.id,
                LedgerEntryUpdate {
                    presence: dec!(1.5),
                    subsistence: dec!(60),
                    advance: Decimal::ZERO,
                    comment: Some("overtime".to_string()),
                },
            )
            .unwrap();
        assert_eq!(updated.date, entry.date);
        assert_eq!(updated.site_id, entry.site_id);
        assert_eq!(updated.presence, dec!(1.5));
        assert_eq!(updated.taken(), dec!(60));
    }

    #[test]
    fn test_long_comment_rejected_on_create_and_update() {
        let (ledger, _) = ledger();
        let mut input = present("emp_001", jan(2));
        input.comment = Some("x".repeat(151));
        assert!(matches!(
            ledger.create_ledger_entry("site_x", input),
            Err(EngineError::CommentTooLong { length: 151, max: 150 })
        ));

        let entry = ledger.create_ledger_entry("site_x", present("emp_001", jan(2))).unwrap();
        let result = ledger.update_ledger_entry(
            entry.id,
            LedgerEntryUpdate {
                presence: dec!(1),
                subsistence: Decimal::ZERO,
                advance: Decimal::ZERO,
                comment: Some("y".repeat(151)),
            },
        );
        assert!(matches!(result, Err(EngineError::CommentTooLong { .. })));
        assert!(ledger.ledger_entry(entry.id).unwrap().comment.is_none());
    }

    #[test]
    fn test_delete_entry() {
        let (ledger, _) = ledger();
        let entry = ledger.create_ledger_entry("site_x", present("emp_001", jan(2))).unwrap();
        ledger.delete_ledger_entry(entry.id).unwrap();
        assert!(ledger.entries_for_employee("emp_001").unwrap().is_empty());
        assert!(matches!(
            ledger.delete_ledger_entry(entry.id),
            Err(EngineError::NotFound { .. })
        ));
    }
}
