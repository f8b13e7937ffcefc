pub mod cache;
pub mod dashboard;
pub mod payroll;
pub mod work_log;

use actix_web::error::ErrorBadRequest;

use crate::analytics::kpi::{EmployeeFilter, Selection};
use crate::analytics::period::Period;

/// Build a selection from raw query values. `month` is 0-based.
pub fn selection(
    month: Option<u32>,
    year: Option<i32>,
    employee_id: Option<&str>,
) -> actix_web::Result<Selection> {
    if month.is_some_and(|m| m > 11) {
        return Err(ErrorBadRequest("month must be between 0 (January) and 11 (December)"));
    }

    Ok(Selection {
        period: Period::new(month, year),
        employee: EmployeeFilter::parse(employee_id),
    })
}

/// `(page, per_page)` with the same defaults and bounds as the HR API.
pub fn paging(page: Option<u32>, per_page: Option<u32>) -> (u32, u32) {
    (page.unwrap_or(1).max(1), per_page.unwrap_or(10).clamp(1, 100))
}
