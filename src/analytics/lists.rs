//! Joined rows for the work-log and payroll list screens.

use std::cmp::Reverse;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::period::{Period, filter_by_period, parse_timestamp};
use crate::model::{Employee, Payroll, WorkLog};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WorkLogRow {
    #[schema(example = "w1")]
    pub id: String,
    #[schema(example = "e1")]
    pub employee_id: String,
    #[schema(example = "John Doe")]
    pub employee_name: String,
    pub product_id: String,
    #[schema(nullable = true)]
    pub product_name: Option<String>,
    #[schema(example = 10.0)]
    pub quantity: f64,
    #[schema(example = 5000.0)]
    pub total_price: f64,
    #[schema(example = "2024-03-12T08:00:00Z", nullable = true)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollRow {
    #[schema(example = "p1")]
    pub id: String,
    #[schema(example = "e1")]
    pub employee_id: String,
    #[schema(example = "John Doe")]
    pub employee_name: String,
    #[schema(nullable = true)]
    pub position: Option<String>,
    pub total_quantity: f64,
    #[schema(example = 20000.0)]
    pub total_salary: f64,
    #[schema(example = "2024-03-01", nullable = true)]
    pub period: Option<String>,
}

/// Rows that joined, plus how many period-matching records did not.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Joined<T> {
    pub rows: Vec<T>,
    pub orphaned: usize,
}

/// Newest first; records without a usable date go last, in their original order.
fn newest_first<T>(rows: &mut [T], date_of: impl Fn(&T) -> Option<&str>) {
    rows.sort_by_key(|r| Reverse(date_of(r).and_then(parse_timestamp)));
}

pub fn work_log_rows(
    work_logs: &[WorkLog],
    lookup: &HashMap<String, Employee>,
    period: Period,
) -> Joined<WorkLogRow> {
    let in_period = filter_by_period(work_logs, |w| w.updated_at.as_deref(), period);
    let total = in_period.len();

    let mut rows: Vec<WorkLogRow> = in_period
        .into_iter()
        .filter_map(|w| {
            let employee = lookup.get(&w.employee_id)?;
            Some(WorkLogRow {
                id: w.id.clone(),
                employee_id: w.employee_id.clone(),
                employee_name: employee.name.clone(),
                product_id: w.product_id.clone(),
                product_name: w.product_name.clone(),
                quantity: w.quantity,
                total_price: w.total_price,
                updated_at: w.updated_at.clone(),
            })
        })
        .collect();
    newest_first(&mut rows, |r| r.updated_at.as_deref());

    Joined {
        orphaned: total - rows.len(),
        rows,
    }
}

pub fn payroll_rows(
    payrolls: &[Payroll],
    lookup: &HashMap<String, Employee>,
    period: Period,
) -> Joined<PayrollRow> {
    let in_period = filter_by_period(payrolls, |p| p.period.as_deref(), period);
    let total = in_period.len();

    let mut rows: Vec<PayrollRow> = in_period
        .into_iter()
        .filter_map(|p| {
            let employee = lookup.get(&p.employee_id)?;
            Some(PayrollRow {
                id: p.id.clone(),
                employee_id: p.employee_id.clone(),
                employee_name: employee.name.clone(),
                position: employee.position.clone(),
                total_quantity: p.total_quantity,
                total_salary: p.total_salary,
                period: p.period.clone(),
            })
        })
        .collect();
    newest_first(&mut rows, |r| r.period.as_deref());

    Joined {
        orphaned: total - rows.len(),
        rows,
    }
}

/// One 1-based page of `rows`; out-of-range pages are empty.
pub fn paginate<T: Clone>(rows: &[T], page: u32, per_page: u32) -> Vec<T> {
    let offset = (page.max(1) as usize - 1).saturating_mul(per_page as usize);
    rows.iter().skip(offset).take(per_page as usize).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::testing::{employee, payroll, work_log};

    fn lookup() -> HashMap<String, Employee> {
        [employee("e1", "2024-01-01")]
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect()
    }

    #[test]
    fn work_log_rows_join_sort_and_count_orphans() {
        let logs = vec![
            work_log("w1", "e1", 1.0, 10.0, "2024-03-02"),
            work_log("w2", "e2", 5.0, 50.0, "2024-03-03"),
            work_log("w3", "e1", 2.0, 20.0, "2024-03-09"),
            work_log("w4", "e1", 3.0, 30.0, "2024-04-01"),
        ];

        let joined = work_log_rows(&logs, &lookup(), Period::month_of(2, 2024));

        let ids: Vec<&str> = joined.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["w3", "w1"]);
        assert_eq!(joined.orphaned, 1);
        assert_eq!(joined.rows[0].employee_name, "Employee e1");
    }

    #[test]
    fn undated_payrolls_sort_last_under_all() {
        let pays = vec![
            payroll("p1", "e1", 1.0, "garbage"),
            payroll("p2", "e1", 2.0, "2024-01-01"),
            payroll("p3", "e1", 3.0, "2024-02-01"),
        ];

        let joined = payroll_rows(&pays, &lookup(), Period::all());

        let ids: Vec<&str> = joined.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["p3", "p2", "p1"]);
        assert_eq!(joined.orphaned, 0);
    }

    #[test]
    fn paginate_is_one_based_and_clamped() {
        let rows: Vec<u32> = (1..=25).collect();
        assert_eq!(paginate(&rows, 1, 10), (1..=10).collect::<Vec<_>>());
        assert_eq!(paginate(&rows, 3, 10), (21..=25).collect::<Vec<_>>());
        assert_eq!(paginate(&rows, 0, 10), paginate(&rows, 1, 10));
        assert!(paginate(&rows, 4, 10).is_empty());
    }
}
