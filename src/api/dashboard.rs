use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::analytics::AnalyticsEngine;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct DashboardQuery {
    /// 0-based month (0 = January); omit for all months
    #[schema(example = 2)]
    pub month: Option<u32>,

    /// Omit for all years
    #[schema(example = 2024)]
    pub year: Option<i32>,

    /// Employee id, or `all`
    #[schema(example = "all")]
    pub employee_id: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "KPIs and trends for the selection", body = crate::analytics::kpi::DashboardReport),
        (status = 400, description = "Invalid month"),
        (status = 502, description = "Upstream HR API failed", body = Object, example = json!({
            "error": "Failed to load dashboard data",
            "details": "failed to load payrolls: http://hr.local/payrolls?limit=100&page=1 answered with status 503"
        }))
    ),
    tag = "Dashboard"
)]
pub async fn get_dashboard(
    engine: web::Data<AnalyticsEngine>,
    query: web::Query<DashboardQuery>,
) -> actix_web::Result<impl Responder> {
    let selection = super::selection(query.month, query.year, query.employee_id.as_deref())?;

    let report = engine.dashboard(&selection).await.map_err(|e| {
        tracing::error!(entity = %e.kind(), error = %e, "Dashboard refresh failed");
        e
    })?;

    Ok(HttpResponse::Ok().json(report))
}
