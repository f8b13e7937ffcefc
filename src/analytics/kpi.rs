//! Scalar dashboard figures.
//!
//! Every function here is pure over its inputs. Joins go through the employee
//! lookup: a work log or payroll whose employee is not in it does not count.

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::buckets::{WeekStart, WeeklyTrend, YearlyOverview, weekly_trend, yearly_overview};
use super::period::{Period, filter_by_period};
use super::Dataset;
use crate::model::{Employee, Expense, Income, Payroll, WorkLog};

/// Which employee(s) the performance card looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EmployeeFilter {
    #[default]
    All,
    One(String),
}

impl EmployeeFilter {
    /// `None`, empty or `all` select everybody.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => EmployeeFilter::All,
            Some(s) if s.eq_ignore_ascii_case("all") => EmployeeFilter::All,
            Some(id) => EmployeeFilter::One(id.to_string()),
        }
    }

    pub fn matches(&self, employee_id: &str) -> bool {
        match self {
            EmployeeFilter::All => true,
            EmployeeFilter::One(id) => id == employee_id,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            EmployeeFilter::All => None,
            EmployeeFilter::One(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub period: Period,
    pub employee: EmployeeFilter,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct PerformanceSummary {
    pub worklog_count: usize,
    #[schema(example = 10.0)]
    pub quantity: f64,
    #[schema(example = 5000.0)]
    pub total_value: f64,
    #[schema(example = 10.0)]
    pub avg_quantity_per_worklog: f64,
    #[schema(example = 20000.0)]
    pub payroll: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardReport {
    pub period: Period,
    #[schema(nullable = true)]
    pub employee_id: Option<String>,

    pub total_employees: usize,
    pub active_employees: usize,
    pub onboard_count: usize,

    pub monthly_income: f64,
    pub monthly_expense: f64,
    pub monthly_payroll: f64,
    pub monthly_profit: f64,

    pub performance: PerformanceSummary,
    pub weekly_trend: WeeklyTrend,
    pub yearly_overview: YearlyOverview,

    #[schema(nullable = true)]
    pub best_day: Option<String>,
    #[schema(nullable = true)]
    pub best_month: Option<String>,

    /// Period records left out because their employee no longer exists.
    pub orphan_work_logs: usize,
    pub orphan_payrolls: usize,
    pub references_resolved: bool,
}

pub fn onboard_count(employees: &[Employee], period: Period) -> usize {
    filter_by_period(employees, |e| e.joined_date.as_deref(), period).len()
}

/// Period records whose employee is not in the lookup.
fn orphans<T>(records: &[&T], lookup: &HashMap<String, Employee>, employee_of: impl Fn(&T) -> &str) -> usize {
    records
        .iter()
        .filter(|&&r| !lookup.contains_key(employee_of(r)))
        .count()
}

pub fn sum_incomes(incomes: &[&Income]) -> f64 {
    incomes.iter().map(|i| i.amount).sum()
}

pub fn sum_expenses(expenses: &[&Expense]) -> f64 {
    expenses.iter().map(|e| e.amount).sum()
}

/// Payroll total, counting only payrolls whose employee still exists.
pub fn sum_payroll(payrolls: &[&Payroll], lookup: &HashMap<String, Employee>) -> f64 {
    payrolls
        .iter()
        .filter(|p| lookup.contains_key(&p.employee_id))
        .map(|p| p.total_salary)
        .sum()
}

pub fn profit(income: f64, expense: f64, payroll: f64) -> f64 {
    income - expense - payroll
}

/// Work-log performance for one employee or everybody. `period_payroll` is the
/// already orphan-filtered payroll total used when everybody is selected.
pub fn performance(
    work_logs: &[&WorkLog],
    payrolls: &[&Payroll],
    lookup: &HashMap<String, Employee>,
    employee: &EmployeeFilter,
    period_payroll: f64,
) -> PerformanceSummary {
    let mut summary = PerformanceSummary::default();

    for w in work_logs
        .iter()
        .filter(|w| lookup.contains_key(&w.employee_id) && employee.matches(&w.employee_id))
    {
        summary.worklog_count += 1;
        summary.quantity += w.quantity;
        summary.total_value += w.total_price;
    }

    if summary.worklog_count > 0 {
        summary.avg_quantity_per_worklog = summary.quantity / summary.worklog_count as f64;
    }

    summary.payroll = match employee {
        EmployeeFilter::All => period_payroll,
        EmployeeFilter::One(id) => payrolls
            .iter()
            .filter(|p| &p.employee_id == id && lookup.contains_key(id))
            .map(|p| p.total_salary)
            .sum(),
    };

    summary
}

/// Everything the dashboard shows for one selection.
pub fn compute_dashboard(data: &Dataset, selection: &Selection, week_start: WeekStart) -> DashboardReport {
    let period = selection.period;

    let incomes = filter_by_period(&data.incomes, |i| i.date.as_deref(), period);
    let expenses = filter_by_period(&data.expenses, |e| e.date.as_deref(), period);
    let payrolls = filter_by_period(&data.payrolls, |p| p.period.as_deref(), period);
    let work_logs = filter_by_period(&data.work_logs, |w| w.updated_at.as_deref(), period);

    let monthly_income = sum_incomes(&incomes);
    let monthly_expense = sum_expenses(&expenses);
    let monthly_payroll = sum_payroll(&payrolls, &data.lookup);

    let performance = performance(
        &work_logs,
        &payrolls,
        &data.lookup,
        &selection.employee,
        monthly_payroll,
    );

    let joined_logs: Vec<&WorkLog> = work_logs
        .iter()
        .copied()
        .filter(|w| data.lookup.contains_key(&w.employee_id) && selection.employee.matches(&w.employee_id))
        .collect();
    let weekly_trend = weekly_trend(&joined_logs, week_start);

    // The overview always spans a whole year; only the year axis applies.
    let year_scope = Period::new(None, period.year);
    let year_incomes = filter_by_period(&data.incomes, |i| i.date.as_deref(), year_scope);
    let year_expenses = filter_by_period(&data.expenses, |e| e.date.as_deref(), year_scope);
    let year_payrolls: Vec<&Payroll> = filter_by_period(&data.payrolls, |p| p.period.as_deref(), year_scope)
        .into_iter()
        .filter(|p| data.lookup.contains_key(&p.employee_id))
        .collect();
    let yearly_overview = yearly_overview(period.year, &year_incomes, &year_expenses, &year_payrolls);

    DashboardReport {
        period,
        employee_id: selection.employee.id().map(str::to_string),
        total_employees: data.employees.len(),
        active_employees: data.employees.iter().filter(|e| e.is_active()).count(),
        onboard_count: onboard_count(&data.employees, period),
        monthly_income,
        monthly_expense,
        monthly_payroll,
        monthly_profit: profit(monthly_income, monthly_expense, monthly_payroll),
        performance,
        best_day: weekly_trend.best_day.clone(),
        best_month: yearly_overview.best_month.clone(),
        weekly_trend,
        yearly_overview,
        orphan_work_logs: orphans(&work_logs, &data.lookup, |w| w.employee_id.as_str()),
        orphan_payrolls: orphans(&payrolls, &data.lookup, |p| p.employee_id.as_str()),
        references_resolved: data.resolved_all,
    }
}
