//! Promotion history and salary lookups.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::calculation::{
    check_new_promotion, check_promotion_delete, check_promotion_update, check_salary_rate,
    resolve_salary,
};
use crate::error::EngineResult;
use crate::models::Promotion;

use super::Ledger;

impl Ledger {
    /// Returns the salary rate in force for the employee on `date`.
    pub fn resolve_salary(&self, employee_id: &str, date: NaiveDate) -> EngineResult<Decimal> {
        self.store.read(|state| {
            state.employee(employee_id)?;
            Ok(resolve_salary(&state.promotions_for(employee_id)?, date))
        })
    }

    /// The employee's promotions, latest first.
    pub fn promotions_for(&self, employee_id: &str) -> EngineResult<Vec<Promotion>> {
        self.store.read(|state| {
            state.employee(employee_id)?;
            state.promotions_for(employee_id)
        })
    }

    /// Adds a promotion to the end of the employee's history.
    pub fn create_promotion(
        &self,
        employee_id: &str,
        effective_date: NaiveDate,
        salary_rate: Decimal,
    ) -> EngineResult<Promotion> {
        check_salary_rate(salary_rate, self.config.promotions.max_salary_rate)?;

        self.store.transaction(|state| {
            let date_joined = state.employee(employee_id)?.date_joined;
            check_new_promotion(
                &state.promotions_for(employee_id)?,
                date_joined,
                state.settled_until(employee_id)?,
                effective_date,
            )?;

            let promotion = Promotion::new(employee_id, effective_date, salary_rate);
            state.insert_promotion(&promotion)?;
            info!(
                employee_id = %employee_id,
                effective_date = %effective_date,
                salary_rate = %salary_rate,
                "Promotion created"
            );
            Ok(promotion)
        })
    }

    /// Changes the date and rate of an unlocked promotion.
    pub fn update_promotion(
        &self,
        promotion_id: Uuid,
        effective_date: NaiveDate,
        salary_rate: Decimal,
    ) -> EngineResult<Promotion> {
        check_salary_rate(salary_rate, self.config.promotions.max_salary_rate)?;

        self.store.transaction(|state| {
            let mut promotion = state.promotion(promotion_id)?;
            check_promotion_update(
                &state.promotions_for(&promotion.employee_id)?,
                &promotion,
                effective_date,
                state.settled_until(&promotion.employee_id)?,
            )?;

            promotion.effective_date = effective_date;
            promotion.salary_rate = salary_rate;
            state.update_promotion(&promotion)?;
            info!(promotion_id = %promotion_id, "Promotion updated");
            Ok(promotion)
        })
    }

    /// Deletes an unlocked promotion.
    pub fn delete_promotion(&self, promotion_id: Uuid) -> EngineResult<Promotion> {
        self.store.transaction(|state| {
            let target = state.promotion(promotion_id)?;
            check_promotion_delete(
                &state.promotions_for(&target.employee_id)?,
                &target,
                state.settled_until(&target.employee_id)?,
            )?;
            state.delete_promotion(promotion_id)?;
            info!(promotion_id = %promotion_id, "Promotion deleted");
            Ok(target)
        })
    }
}
