use crate::analytics::buckets::{WeeklyTrend, YearlyOverview};
use crate::analytics::kpi::{DashboardReport, PerformanceSummary};
use crate::analytics::lists::{PayrollRow, WorkLogRow};
use crate::analytics::period::Period;
use crate::api::dashboard::DashboardQuery;
use crate::api::payroll::{PaginatedPayrollResponse, PayrollQuery};
use crate::api::work_log::{WorkLogListResponse, WorkLogQuery};
use crate::model::employee::Employee;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Analytics API",
        version = "0.1.0",
        description = r#"
## HRM Analytics

Dashboard figures and joined list views for the HR management console.
All numbers are computed here from the upstream HR REST API collections
(employees, work logs, payrolls, incomes, expenses).

### 🔹 Key Features
- **Dashboard**
  - Onboarding count, income, expense, payroll and profit for a month/year
  - Employee performance (quantity, value, average per work log)
  - Weekly work-log trend and yearly income/expense/payroll overview
- **Lists**
  - Work logs and payrolls joined with employee names
- **Cache**
  - Drop cached snapshots after a mutation

### 📅 Periods
`month` is 0-based (0 = January). Omit `month` or `year` for "All".

### ⚠️ Orphans
Work logs and payrolls whose employee no longer exists are left out of every
figure and reported as `orphan_*` / `orphaned` counts.

---
Built with **Rust**, **Actix Web**, **moka**, **reqwest** and **Utoipa**.
"#,
    ),
    paths(
        crate::api::dashboard::get_dashboard,
        crate::api::work_log::list_work_logs,
        crate::api::payroll::list_payrolls,
        crate::api::cache::invalidate_cache
    ),
    components(
        schemas(
            DashboardQuery,
            DashboardReport,
            PerformanceSummary,
            WeeklyTrend,
            YearlyOverview,
            Period,
            WorkLogQuery,
            WorkLogRow,
            WorkLogListResponse,
            PayrollQuery,
            PayrollRow,
            PaginatedPayrollResponse,
            Employee
        )
    ),
    tags(
        (name = "Dashboard", description = "Dashboard KPIs and trends"),
        (name = "Work log", description = "Joined work-log list"),
        (name = "Payroll", description = "Joined payroll list"),
        (name = "Cache", description = "Snapshot invalidation"),
    )
)]
pub struct ApiDoc;
