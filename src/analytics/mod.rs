//! Client-side aggregation over the upstream HR collections.
//!
//! ```text
//! refresh ─▶ cache ─(miss)─▶ fetch_all (per entity, concurrently)
//!                                  │
//!                                  ▼
//!                         resolve employee refs ─▶ period filter ─▶ buckets / KPIs
//! ```

pub mod buckets;
pub mod cache;
pub mod engine;
pub mod fetcher;
pub mod kpi;
pub mod lists;
pub mod period;
pub mod resolver;

#[cfg(test)]
pub mod testing;

use std::collections::HashMap;

use crate::model::{Employee, Expense, Income, Payroll, WorkLog};

pub use engine::AnalyticsEngine;

/// One consistent snapshot of the five collections plus the employee lookup
/// used for every join.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Employees from the bulk fetch.
    pub employees: Vec<Employee>,
    /// Bulk employees plus those resolved by id.
    pub lookup: HashMap<String, Employee>,
    pub work_logs: Vec<WorkLog>,
    pub payrolls: Vec<Payroll>,
    pub incomes: Vec<Income>,
    pub expenses: Vec<Expense>,
    pub resolved_all: bool,
}

impl Dataset {
    pub fn orphan_work_logs(&self) -> usize {
        self.work_logs
            .iter()
            .filter(|w| !self.lookup.contains_key(&w.employee_id))
            .count()
    }

    pub fn orphan_payrolls(&self) -> usize {
        self.payrolls
            .iter()
            .filter(|p| !self.lookup.contains_key(&p.employee_id))
            .count()
    }
}
