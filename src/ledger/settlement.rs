//! Work-session settlement.
//!
//! Creating a settlement is the ledger's only state transition: every open
//! entry of the employee is folded into one [`Settlement`] with one
//! [`SiteWorkRecord`] per site, entries dated inside the snapshot window are
//! copied into [`LedgerSnapshot`]s, and the entries are deleted. All of it
//! happens in one SQLite transaction.

use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::calculation::aggregate_entries;
use crate::error::{EngineError, EngineResult};
use crate::models::{AggregateResult, LedgerSnapshot, Settlement, SiteWorkRecord};
use crate::store::LedgerState;

use super::Ledger;

impl Ledger {
    /// Aggregates the employee's open entries without changing anything.
    ///
    /// Returns `None` when the employee has no open entries.
    pub fn aggregate_open_settlement(
        &self,
        employee_id: &str,
    ) -> EngineResult<Option<AggregateResult>> {
        self.store
            .read(|state| self.aggregate_in(state, employee_id))
    }

    fn aggregate_in(
        &self,
        state: &LedgerState<'_>,
        employee_id: &str,
    ) -> EngineResult<Option<AggregateResult>> {
        state.employee(employee_id)?;
        let last_settlement_payable = state
            .last_settlement(employee_id)?
            .as_ref()
            .map(Settlement::rest_payable)
            .unwrap_or(Decimal::ZERO);

        Ok(aggregate_entries(
            employee_id,
            &state.entries_for_employee(employee_id)?,
            &state.salary_timeline(employee_id)?,
            last_settlement_payable,
            self.config.ledger.currency_scale,
        ))
    }

    /// Settles all of the employee's open entries.
    ///
    /// `pay_or_return` is the money that changed hands at settlement time:
    /// positive when paid to the employee, negative when returned. It is
    /// attributed to the employee's current site.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] if the employee does not exist
    /// - [`EngineError::InvalidState`] if the employee has no current site
    /// - [`EngineError::DuplicateSettlementToday`] if a settlement was
    ///   already created today
    /// - [`EngineError::NoOpSettlement`] if there are no open entries and
    ///   `pay_or_return` is zero
    pub fn create_settlement(
        &self,
        employee_id: &str,
        pay_or_return: Decimal,
    ) -> EngineResult<Settlement> {
        let now = self.clock.now();
        let today = now.date();

        let (settlement, entry_count) = self.store.transaction(|state| {
            let employee = state.employee(employee_id)?;
            let owner_site = employee.current_site.ok_or_else(|| EngineError::InvalidState {
                employee_id: employee_id.to_string(),
                message: "no current site assigned".to_string(),
            })?;

            let last_settlement = state.last_settlement(employee_id)?;
            if let Some(last) = &last_settlement {
                if last.created_date() == today {
                    return Err(EngineError::DuplicateSettlementToday {
                        employee_id: employee_id.to_string(),
                        settlement_id: last.id.to_string(),
                        created_at: last.created_at,
                    });
                }
            }

            let aggregate = self.aggregate_in(state, employee_id)?;
            if aggregate.is_none() && pay_or_return.is_zero() {
                return Err(EngineError::NoOpSettlement {
                    employee_id: employee_id.to_string(),
                });
            }

            let timeline = state.salary_timeline(employee_id)?;
            let last_settlement_payable = last_settlement
                .as_ref()
                .map(Settlement::rest_payable)
                .unwrap_or(Decimal::ZERO);

            let settlement_id = Uuid::new_v4();
            let settlement = match &aggregate {
                Some(a) => Settlement {
                    id: settlement_id,
                    employee_id: employee_id.to_string(),
                    site_id: owner_site.clone(),
                    start_date: a.start_date,
                    end_date: a.end_date,
                    created_at: now,
                    update_permission: false,
                    total_presence: a.total_presence,
                    total_subsistence: a.total_subsistence,
                    total_advance: a.total_advance,
                    session_salary_rate: a.session_salary_rate,
                    earned_salary: a.earned_salary,
                    last_settlement_payable: a.last_settlement_payable,
                    pay_or_return,
                },
                None => Settlement {
                    id: settlement_id,
                    employee_id: employee_id.to_string(),
                    site_id: owner_site.clone(),
                    start_date: today,
                    end_date: today,
                    created_at: now,
                    update_permission: false,
                    total_presence: Decimal::ZERO,
                    total_subsistence: Decimal::ZERO,
                    total_advance: Decimal::ZERO,
                    session_salary_rate: timeline.rate_on(today),
                    earned_salary: Decimal::ZERO,
                    last_settlement_payable,
                    pay_or_return,
                },
            };

            let mut records: Vec<SiteWorkRecord> = aggregate
                .iter()
                .flat_map(|a| a.sites.iter())
                .map(|site| {
                    let session_owner = site.site_id == owner_site;
                    SiteWorkRecord {
                        id: Uuid::new_v4(),
                        settlement_id,
                        employee_id: employee_id.to_string(),
                        site_id: site.site_id.clone(),
                        session_owner,
                        presence: site.presence,
                        earned_salary: site.earned_salary,
                        subsistence: site.subsistence,
                        advance: site.advance,
                        pay_or_return: if session_owner {
                            pay_or_return
                        } else {
                            Decimal::ZERO
                        },
                        created_date: today,
                        start_date: settlement.start_date,
                        end_date: settlement.end_date,
                        days: site.days.clone(),
                    }
                })
                .collect();

            // The payment is always attributed, even if no work was done at
            // the owner site in this session.
            if !records.iter().any(|r| r.session_owner) {
                records.push(SiteWorkRecord {
                    id: Uuid::new_v4(),
                    settlement_id,
                    employee_id: employee_id.to_string(),
                    site_id: owner_site.clone(),
                    session_owner: true,
                    presence: Decimal::ZERO,
                    earned_salary: Decimal::ZERO,
                    subsistence: Decimal::ZERO,
                    advance: Decimal::ZERO,
                    pay_or_return,
                    created_date: today,
                    start_date: settlement.start_date,
                    end_date: settlement.end_date,
                    days: Vec::new(),
                });
            }

            let window_start = self.snapshot_window_start(today);
            let snapshots: Vec<LedgerSnapshot> = state
                .entries_for_employee(employee_id)?
                .iter()
                .filter(|e| e.date >= window_start && e.date <= today)
                .map(|e| LedgerSnapshot::of(e, settlement_id, timeline.rate_on(e.date), now))
                .collect();

            state.insert_settlement(&settlement)?;
            for record in &records {
                state.insert_site_work_record(record)?;
            }
            for snapshot in &snapshots {
                state.insert_snapshot(snapshot)?;
            }
            let removed = state.remove_entries_for(employee_id)?;

            let expected = aggregate.as_ref().map_or(0, |a| a.entry_count);
            if removed != expected {
                return Err(EngineError::integrity(format!(
                    "settlement consumed {expected} entries but removed {removed}"
                )));
            }
            Ok((settlement, removed))
        })?;

        info!(
            employee_id = %employee_id,
            settlement_id = %settlement.id,
            entry_count,
            rest_payable = %settlement.rest_payable(),
            "Settlement created"
        );
        Ok(settlement)
    }

    /// Looks up a settlement.
    pub fn settlement(&self, settlement_id: Uuid) -> EngineResult<Settlement> {
        self.store.read(|state| state.settlement(settlement_id))
    }

    /// The employee's settlements, oldest first.
    pub fn settlements_for(&self, employee_id: &str) -> EngineResult<Vec<Settlement>> {
        self.store.read(|state| {
            state.employee(employee_id)?;
            state.settlements_for(employee_id)
        })
    }

    /// The employee's latest settlement, if any.
    pub fn last_settlement(&self, employee_id: &str) -> EngineResult<Option<Settlement>> {
        self.store.read(|state| {
            state.employee(employee_id)?;
            state.last_settlement(employee_id)
        })
    }

    /// The per-site rows of a settlement, by site.
    pub fn site_work_records_for(&self, settlement_id: Uuid) -> EngineResult<Vec<SiteWorkRecord>> {
        self.store.read(|state| {
            state.settlement(settlement_id)?;
            state.site_work_records_for(settlement_id)
        })
    }

    /// Allows one `pay_or_return` adjustment on a settlement.
    pub fn grant_settlement_update(&self, settlement_id: Uuid) -> EngineResult<Settlement> {
        self.store.transaction(|state| {
            let mut settlement = state.settlement(settlement_id)?;
            settlement.update_permission = true;
            state.update_settlement(&settlement)?;
            info!(settlement_id = %settlement_id, "Settlement update granted");
            Ok(settlement)
        })
    }

    /// Replaces the `pay_or_return` of the employee's latest settlement.
    ///
    /// Needs a prior [`grant_settlement_update`](Ledger::grant_settlement_update)
    /// and uses it up. Earlier settlements cannot be adjusted because their
    /// `rest_payable` has already been carried forward.
    pub fn adjust_pay_or_return(
        &self,
        settlement_id: Uuid,
        pay_or_return: Decimal,
    ) -> EngineResult<Settlement> {
        self.store.transaction(|state| {
            let mut settlement = state.settlement(settlement_id)?;

            let is_latest = state
                .last_settlement(&settlement.employee_id)?
                .is_some_and(|last| last.id == settlement_id);
            if !is_latest {
                return Err(EngineError::SettlementLocked {
                    settlement_id: settlement_id.to_string(),
                    message: "only the latest settlement can be adjusted".to_string(),
                });
            }
            if !settlement.update_permission {
                return Err(EngineError::SettlementLocked {
                    settlement_id: settlement_id.to_string(),
                    message: "update permission has not been granted".to_string(),
                });
            }

            state.set_owner_pay_or_return(settlement_id, pay_or_return)?;
            settlement.pay_or_return = pay_or_return;
            settlement.update_permission = false;
            state.update_settlement(&settlement)?;

            info!(
                settlement_id = %settlement_id,
                pay_or_return = %pay_or_return,
                rest_payable = %settlement.rest_payable(),
                "Settlement pay_or_return adjusted"
            );
            Ok(settlement)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;

    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::clock::{Clock, FixedClock};
    use crate::config::LedgerConfig;
    use crate::error::EngineError;
    use crate::ledger::Ledger;
    use crate::ledger::test_support::{jan, ledger, ledger_on, present};
    use crate::models::{Employee, NewLedgerEntry, SummaryDetail};
    use crate::store::LedgerStore;

    /// Entries on Jan 1 and Jan 2 at site X, rate 100.
    #[test]
    fn test_aggregate_two_days() {
        let (ledger, _) = ledger();
        ledger.create_ledger_entry("site_x", present("emp_001", jan(1))).unwrap();
        ledger.create_ledger_entry("site_x", present("emp_001", jan(2))).unwrap();

        let aggregate = ledger.aggregate_open_settlement("emp_001").unwrap().unwrap();
        assert_eq!(aggregate.total_presence, dec!(2));
        assert_eq!(aggregate.total_subsistence, Decimal::ZERO);
        assert_eq!(aggregate.payable(), dec!(200));

        let again = ledger.aggregate_open_settlement("emp_001").unwrap().unwrap();
        assert_eq!(aggregate, again);
    }

    #[test]
    fn test_settlement_consumes_entries_and_snapshots_recent_ones() {
        let (ledger, _) = ledger();
        ledger
            .create_ledger_entry(
                "site_x",
                NewLedgerEntry::new("emp_001", jan(1), dec!(1)).with_subsistence(dec!(50)),
            )
            .unwrap();
        ledger.create_ledger_entry("site_y", present("emp_001", jan(2))).unwrap();

        let settlement = ledger.create_settlement("emp_001", dec!(100)).unwrap();
        assert_eq!(settlement.start_date, jan(1));
        assert_eq!(settlement.end_date, jan(2));
        assert_eq!(settlement.total_presence, dec!(2));
        assert_eq!(settlement.this_settlement_payable(), dec!(150));
        assert_eq!(settlement.rest_payable(), dec!(50));
        assert!(ledger.entries_for_employee("emp_001").unwrap().is_empty());

        let records = ledger.site_work_records_for(settlement.id).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].site_id, "site_x");
        assert!(records[0].session_owner);
        assert_eq!(records[0].pay_or_return, dec!(100));
        assert_eq!(records[0].payable(), dec!(50));
        assert!(!records[1].session_owner);
        assert_eq!(records[1].pay_or_return, Decimal::ZERO);

        assert_eq!(ledger.snapshots_for_site("site_x", None).unwrap().len(), 1);
        assert_eq!(ledger.snapshots_for_site("site_y", Some(jan(2))).unwrap().len(), 1);
    }

    #[test]
    fn test_entries_outside_snapshot_window_are_not_snapshotted() {
        let (ledger, clock) = ledger();
        ledger.create_ledger_entry("site_x", present("emp_001", jan(1))).unwrap();
        clock.advance_days(2);

        ledger.create_settlement("emp_001", Decimal::ZERO).unwrap();
        assert!(ledger.snapshots_for_site("site_x", None).unwrap().is_empty());
    }

    /// Existing rest payable of 500 settled by a payment of 500.
    #[test]
    fn test_payment_only_settlement_clears_balance() {
        let (ledger, clock) = ledger();
        for d in 1..=2 {
            ledger
                .create_ledger_entry(
                    "site_x",
                    NewLedgerEntry::new("emp_001", jan(d), dec!(2.5)),
                )
                .unwrap();
        }
        let first = ledger.create_settlement("emp_001", Decimal::ZERO).unwrap();
        assert_eq!(first.rest_payable(), dec!(500));

        clock.advance_days(1);
        let second = ledger.create_settlement("emp_001", dec!(500)).unwrap();
        assert_eq!(second.last_settlement_payable, dec!(500));
        assert_eq!(second.start_date, jan(3));
        assert_eq!(second.end_date, jan(3));
        assert_eq!(second.rest_payable(), Decimal::ZERO);

        let records = ledger.site_work_records_for(second.id).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].session_owner);
        assert_eq!(records[0].pay_or_return, dec!(500));
    }

    #[test]
    fn test_no_op_settlement_rejected() {
        let (ledger, _) = ledger();
        let result = ledger.create_settlement("emp_001", Decimal::ZERO);
        assert!(matches!(result, Err(EngineError::NoOpSettlement { .. })));
        assert!(ledger.settlements_for("emp_001").unwrap().is_empty());
    }

    #[test]
    fn test_second_settlement_same_day_rejected() {
        let (ledger, _) = ledger();
        ledger.create_ledger_entry("site_x", present("emp_001", jan(2))).unwrap();
        let first = ledger.create_settlement("emp_001", Decimal::ZERO).unwrap();

        let result = ledger.create_settlement("emp_001", dec!(100));
        match result {
            Err(EngineError::DuplicateSettlementToday { settlement_id, .. }) => {
                assert_eq!(settlement_id, first.id.to_string());
            }
            other => panic!("expected DuplicateSettlementToday, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_employee_and_site() {
        let (ledger, _) = ledger();
        assert!(matches!(
            ledger.create_settlement("ghost", dec!(1)),
            Err(EngineError::NotFound { .. })
        ));

        ledger
            .register_employee(Employee::new("emp_002", "Karim", jan(1)))
            .unwrap();
        assert!(matches!(
            ledger.create_settlement("emp_002", dec!(1)),
            Err(EngineError::InvalidState { .. })
        ));
    }

    #[test]
    fn test_entry_in_settled_period_rejected() {
        let (ledger, clock) = ledger();
        ledger.create_ledger_entry("site_x", present("emp_001", jan(2))).unwrap();
        ledger.create_settlement("emp_001", Decimal::ZERO).unwrap();

        let result = ledger.create_ledger_entry("site_x", present("emp_001", jan(2)));
        assert!(matches!(result, Err(EngineError::DateInSettledPeriod { .. })));

        clock.advance_days(1);
        assert!(ledger.create_ledger_entry("site_x", present("emp_001", jan(3))).is_ok());
    }

    /// Settlement ending Jan 10 locks the first promotion and the settled period.
    #[test]
    fn test_promotions_locked_by_settlement() {
        let (ledger, clock) = ledger();
        clock.advance_days(8);
        ledger.create_ledger_entry("site_x", present("emp_001", jan(10))).unwrap();
        let settlement = ledger.create_settlement("emp_001", Decimal::ZERO).unwrap();
        assert_eq!(settlement.end_date, jan(10));

        let first = ledger.promotions_for("emp_001").unwrap().pop().unwrap();
        assert!(matches!(
            ledger.delete_promotion(first.id),
            Err(EngineError::PromotionLocked { .. })
        ));
        assert!(matches!(
            ledger.create_promotion("emp_001", jan(5), dec!(120)),
            Err(EngineError::InvalidPromotionDate { .. })
        ));
        assert!(ledger.create_promotion("emp_001", jan(11), dec!(120)).is_ok());
    }

    #[test]
    fn test_adjust_requires_permission_and_latest() {
        let (ledger, clock) = ledger();
        ledger.create_ledger_entry("site_x", present("emp_001", jan(2))).unwrap();
        let first = ledger.create_settlement("emp_001", Decimal::ZERO).unwrap();

        assert!(matches!(
            ledger.adjust_pay_or_return(first.id, dec!(100)),
            Err(EngineError::SettlementLocked { .. })
        ));

        ledger.grant_settlement_update(first.id).unwrap();
        let adjusted = ledger.adjust_pay_or_return(first.id, dec!(100)).unwrap();
        assert_eq!(adjusted.rest_payable(), Decimal::ZERO);
        assert!(!adjusted.update_permission);
        let owner = &ledger.site_work_records_for(first.id).unwrap()[0];
        assert_eq!(owner.pay_or_return, dec!(100));

        clock.advance_days(1);
        ledger.create_settlement("emp_001", dec!(10)).unwrap();
        ledger.grant_settlement_update(first.id).unwrap();
        assert!(matches!(
            ledger.adjust_pay_or_return(first.id, dec!(50)),
            Err(EngineError::SettlementLocked { .. })
        ));
    }

    #[test]
    fn test_settlement_chain_carries_rest_payable() {
        let (ledger, clock) = ledger();
        let mut previous_rest = Decimal::ZERO;
        for round in 0..4 {
            let today = clock.today();
            ledger.create_ledger_entry("site_x", present("emp_001", today)).unwrap();
            let settlement = ledger
                .create_settlement("emp_001", Decimal::from(round * 30))
                .unwrap();
            assert_eq!(settlement.last_settlement_payable, previous_rest);
            previous_rest = settlement.rest_payable();
            clock.advance_days(1);
        }
        assert_eq!(ledger.settlements_for("emp_001").unwrap().len(), 4);
    }

    #[test]
    fn test_concurrent_settlements_for_one_employee_admit_one() {
        let (ledger, _) = ledger();
        ledger.create_ledger_entry("site_x", present("emp_001", jan(1))).unwrap();
        ledger.create_ledger_entry("site_x", present("emp_001", jan(2))).unwrap();

        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));
        let handles: Vec<_> = (0..threads)
            .map(|i| {
                let ledger = ledger.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    ledger.create_settlement("emp_001", Decimal::from(i as i64 * 10))
                })
            })
            .collect();
        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        let created: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(created.len(), 1);
        for result in &results {
            match result {
                Ok(_) => {}
                Err(EngineError::DuplicateSettlementToday { settlement_id, .. }) => {
                    assert_eq!(*settlement_id, created[0].id.to_string());
                }
                Err(other) => panic!("expected DuplicateSettlementToday, got {other:?}"),
            }
        }

        assert_eq!(ledger.settlements_for("emp_001").unwrap().len(), 1);
        assert_eq!(ledger.site_work_records_for(created[0].id).unwrap().len(), 1);
        assert_eq!(ledger.snapshots_for_site("site_x", None).unwrap().len(), 2);
    }

    #[test]
    fn test_rolling_summary_during_settlement_sees_whole_states() {
        let (ledger, _) = ledger();
        ledger.record_cash("site_x", jan(2), "client", dec!(1000)).unwrap();
        ledger
            .create_ledger_entry(
                "site_x",
                NewLedgerEntry::new("emp_001", jan(1), dec!(1)).with_advance(dec!(40)),
            )
            .unwrap();
        ledger
            .create_ledger_entry(
                "site_x",
                NewLedgerEntry::new("emp_001", jan(2), dec!(1)).with_subsistence(dec!(25)),
            )
            .unwrap();

        let before = ledger
            .site_summary_rolling("site_x", SummaryDetail::Detailed)
            .unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let reader = {
            let ledger = ledger.clone();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut seen = Vec::new();
                while !done.load(Ordering::Acquire) || seen.is_empty() {
                    seen.push(
                        ledger
                            .site_summary_rolling("site_x", SummaryDetail::Detailed)
                            .unwrap(),
                    );
                }
                seen
            })
        };

        ledger.create_settlement("emp_001", dec!(100)).unwrap();
        done.store(true, Ordering::Release);
        let seen = reader.join().unwrap();

        let after = ledger
            .site_summary_rolling("site_x", SummaryDetail::Detailed)
            .unwrap();
        assert_eq!(after.today.session_payment, dec!(100));
        assert_eq!(after.today.balance, before.today.balance - dec!(100));
        assert_ne!(before, after);

        for summary in &seen {
            assert!(
                *summary == before || *summary == after,
                "partial settlement observed: {summary:?}"
            );
        }
    }

    #[test]
    fn test_huge_snapshot_window_keeps_every_entry() {
        let clock = Arc::new(FixedClock::at_date(jan(2)));
        let mut config = LedgerConfig::default();
        config.settlement.snapshot_window_days = u32::MAX;
        let ledger = Ledger::with_store(
            Arc::new(LedgerStore::in_memory().unwrap()),
            config,
            clock,
        );
        ledger.register_site(crate::ledger::test_support::site("site_x")).unwrap();
        ledger
            .register_employee(Employee::new("emp_001", "Rahim", jan(1)).with_site("site_x"))
            .unwrap();
        ledger.create_promotion("emp_001", jan(1), dec!(100)).unwrap();
        ledger.create_ledger_entry("site_x", present("emp_001", jan(1))).unwrap();

        ledger.create_settlement("emp_001", Decimal::ZERO).unwrap();
        assert_eq!(ledger.snapshots_for_site("site_x", None).unwrap().len(), 1);
    }

    #[test]
    fn test_settlement_survives_reopening_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");

        let settlement = {
            let (ledger, _) = ledger_on(LedgerStore::open(&path).unwrap());
            ledger.create_ledger_entry("site_x", present("emp_001", jan(2))).unwrap();
            ledger.create_settlement("emp_001", dec!(30)).unwrap()
        };

        let mut config = LedgerConfig::default();
        config.storage.database_path = path;
        let reopened = Ledger::open(config, Arc::new(FixedClock::at_date(jan(3)))).unwrap();

        assert_eq!(reopened.settlement(settlement.id).unwrap(), settlement);
        assert_eq!(
            reopened.last_settlement("emp_001").unwrap().map(|s| s.id),
            Some(settlement.id)
        );
        assert!(reopened.entries_for_employee("emp_001").unwrap().is_empty());
        assert!(matches!(
            reopened.create_ledger_entry("site_x", present("emp_001", jan(2))),
            Err(EngineError::DateInSettledPeriod { .. })
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_chain_carries_rest_and_consumes_entries(
            rounds in prop::collection::vec((0i64..=6, 0i64..=200, -500i64..=1500), 1..6)
        ) {
            let (ledger, clock) = ledger();
            let mut previous_rest = Decimal::ZERO;

            for (half_days, subsistence, pay) in rounds {
                let entry = NewLedgerEntry::new("emp_001", clock.today(), Decimal::new(half_days * 5, 1))
                    .with_subsistence(Decimal::from(subsistence));
                ledger.create_ledger_entry("site_x", entry).unwrap();

                let settlement = ledger.create_settlement("emp_001", Decimal::from(pay)).unwrap();
                prop_assert_eq!(settlement.last_settlement_payable, previous_rest);
                prop_assert_eq!(
                    settlement.rest_payable(),
                    previous_rest + settlement.this_settlement_payable() - Decimal::from(pay)
                );
                prop_assert!(ledger.entries_for_employee("emp_001").unwrap().is_empty());

                previous_rest = settlement.rest_payable();
                clock.advance_days(1);
            }
        }
    }
}
