//! Sites, employees and site money movements.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::calculation::check_non_negative;
use crate::error::{EngineError, EngineResult};
use crate::models::{CostKind, Employee, Site, SiteBill, SiteCash, SiteCost};

use super::Ledger;

impl Ledger {
    /// Registers a new site.
    pub fn register_site(&self, site: Site) -> EngineResult<Site> {
        self.store.transaction(|state| {
            if state.find_site(&site.id)?.is_some() {
                return Err(EngineError::AlreadyExists {
                    entity: "site",
                    id: site.id.clone(),
                });
            }
            state.insert_site(&site)?;
            info!(site_id = %site.id, "Site registered");
            Ok(site)
        })
    }

    /// Registers a new employee, optionally already assigned to a site.
    pub fn register_employee(&self, employee: Employee) -> EngineResult<Employee> {
        self.store.transaction(|state| {
            if state.find_employee(&employee.id)?.is_some() {
                return Err(EngineError::AlreadyExists {
                    entity: "employee",
                    id: employee.id.clone(),
                });
            }
            if let Some(site_id) = &employee.current_site {
                state.site(site_id)?;
            }
            state.insert_employee(&employee)?;
            info!(employee_id = %employee.id, "Employee registered");
            Ok(employee)
        })
    }

    /// Looks up an employee.
    pub fn employee(&self, employee_id: &str) -> EngineResult<Employee> {
        self.store.read(|state| state.employee(employee_id))
    }

    /// Looks up a site.
    pub fn site(&self, site_id: &str) -> EngineResult<Site> {
        self.store.read(|state| state.site(site_id))
    }

    /// Assigns the employee to `site_id`, or clears the assignment.
    pub fn assign_current_site(
        &self,
        employee_id: &str,
        site_id: Option<&str>,
    ) -> EngineResult<Employee> {
        self.store.transaction(|state| {
            if let Some(site_id) = site_id {
                state.site(site_id)?;
            }
            state.set_current_site(employee_id, site_id)
        })
    }

    /// Records cash received by a site.
    pub fn record_cash(
        &self,
        site_id: &str,
        date: NaiveDate,
        title: impl Into<String>,
        amount: Decimal,
    ) -> EngineResult<SiteCash> {
        check_non_negative("amount", amount)?;
        let cash = SiteCash {
            id: Uuid::new_v4(),
            site_id: site_id.to_string(),
            date,
            title: title.into(),
            amount,
        };
        self.store.transaction(|state| {
            state.site(site_id)?;
            state.insert_cash(&cash)?;
            Ok(cash)
        })
    }

    /// Records an equipment or other cost for a site.
    pub fn record_cost(
        &self,
        site_id: &str,
        date: NaiveDate,
        kind: CostKind,
        title: impl Into<String>,
        amount: Decimal,
    ) -> EngineResult<SiteCost> {
        check_non_negative("amount", amount)?;
        let cost = SiteCost {
            id: Uuid::new_v4(),
            site_id: site_id.to_string(),
            date,
            kind,
            title: title.into(),
            amount,
        };
        self.store.transaction(|state| {
            state.site(site_id)?;
            state.insert_cost(&cost)?;
            Ok(cost)
        })
    }

    /// Records an amount billed to the client for a site.
    pub fn record_bill(
        &self,
        site_id: &str,
        date: NaiveDate,
        title: impl Into<String>,
        amount: Decimal,
    ) -> EngineResult<SiteBill> {
        check_non_negative("amount", amount)?;
        let bill = SiteBill {
            id: Uuid::new_v4(),
            site_id: site_id.to_string(),
            date,
            title: title.into(),
            amount,
        };
        self.store.transaction(|state| {
            state.site(site_id)?;
            state.insert_bill(&bill)?;
            Ok(bill)
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use crate::ledger::test_support::{jan, ledger, site};
    use crate::error::EngineError;
    use crate::models::{CostKind, Employee};

    #[test]
    fn test_duplicate_site_is_conflict() {
        let (ledger, _) = ledger();
        let result = ledger.register_site(site("site_x"));
        assert!(matches!(result, Err(EngineError::AlreadyExists { entity: "site", .. })));
    }

    #[test]
    fn test_employee_with_unknown_site_rejected() {
        let (ledger, _) = ledger();
        let employee = Employee::new("emp_002", "Karim", jan(1)).with_site("nowhere");
        let result = ledger.register_employee(employee);
        assert!(matches!(result, Err(EngineError::NotFound { entity: "site", .. })));
        assert!(ledger.employee("emp_002").is_err());
    }

    #[test]
    fn test_assign_and_clear_current_site() {
        let (ledger, _) = ledger();
        let moved = ledger.assign_current_site("emp_001", Some("site_y")).unwrap();
        assert_eq!(moved.current_site.as_deref(), Some("site_y"));

        let cleared = ledger.assign_current_site("emp_001", None).unwrap();
        assert!(cleared.current_site.is_none());
    }

    #[test]
    fn test_money_movements_require_known_site_and_non_negative_amount() {
        let (ledger, _) = ledger();
        assert!(ledger.record_cash("site_x", jan(2), "advance from client", dec!(5000)).is_ok());
        assert!(ledger.record_cost("site_x", jan(2), CostKind::Equipment, "rods", dec!(700)).is_ok());
        assert!(ledger.record_bill("site_x", jan(2), "first bill", dec!(9000)).is_ok());

        assert!(matches!(
            ledger.record_cash("nowhere", jan(2), "cash", dec!(1)),
            Err(EngineError::NotFound { .. })
        ));
        assert!(matches!(
            ledger.record_cost("site_x", jan(2), CostKind::Other, "refund", dec!(-1)),
            Err(EngineError::AmountOutOfRange { field: "amount", .. })
        ));
    }
}
