use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{paging, selection};
use crate::analytics::AnalyticsEngine;
use crate::analytics::lists::{PayrollRow, paginate};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct PayrollQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,

    /// 0-based month (0 = January)
    #[schema(example = 2)]
    pub month: Option<u32>,

    #[schema(example = 2024)]
    pub year: Option<i32>,

    #[schema(example = "e1")]
    pub employee_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedPayrollResponse {
    pub data: Vec<PayrollRow>,
    pub page: u32,
    pub per_page: u32,
    pub total: usize,
    pub total_salary: f64,
    pub orphaned: usize,
}

#[utoipa::path(
    get,
    path = "/api/payrolls",
    params(PayrollQuery),
    responses(
        (status = 200, body = PaginatedPayrollResponse),
        (status = 400, description = "Invalid month"),
        (status = 502, description = "Upstream HR API failed")
    ),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    engine: web::Data<AnalyticsEngine>,
    query: web::Query<PayrollQuery>,
) -> actix_web::Result<impl Responder> {
    let selection = selection(query.month, query.year, query.employee_id.as_deref())?;
    let (page, per_page) = paging(query.page, query.per_page);

    let joined = engine.payroll_list(&selection).await.map_err(|e| {
        tracing::error!(entity = %e.kind(), error = %e, "Failed to load payrolls");
        e
    })?;

    Ok(HttpResponse::Ok().json(PaginatedPayrollResponse {
        data: paginate(&joined.rows, page, per_page),
        page,
        per_page,
        total: joined.rows.len(),
        total_salary: joined.rows.iter().map(|r| r.total_salary).sum(),
        orphaned: joined.orphaned,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::sample_engine;
    use actix_web::{App, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn out_of_period_payrolls_are_not_listed() {
        let app = test::init_service(
            App::new()
                .app_data(sample_engine())
                .route("/payrolls", web::get().to(list_payrolls)),
        )
        .await;

        let req = test::TestRequest::get().uri("/payrolls?month=2&year=2024").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["total_salary"], 20000.0);

        let req = test::TestRequest::get().uri("/payrolls?month=3&year=2024").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total"], 0);
        assert_eq!(body["data"], Value::Array(vec![]));
    }
}
