use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::{paging, selection};
use crate::analytics::AnalyticsEngine;
use crate::analytics::lists::{WorkLogRow, paginate};

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct WorkLogQuery {
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
pub struct WorkLogListResponse {
    pub data: Vec<WorkLogRow>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    /// Rows matching the filters, orphans excluded
    #[schema(example = 1)]
    pub total: usize,
    /// Work logs in the period whose employee no longer exists
    #[schema(example = 0)]
    pub orphaned: usize,
}

#[utoipa::path(
    get,
    path = "/api/work-logs",
    params(WorkLogQuery),
    responses(
        (status = 200, body = WorkLogListResponse),
        (status = 400, description = "Invalid month"),
        (status = 502, description = "Upstream HR API failed")
    ),
    tag = "Work log"
)]
pub async fn list_work_logs(
    engine: web::Data<AnalyticsEngine>,
    query: web::Query<WorkLogQuery>,
) -> actix_web::Result<impl Responder> {
    let selection = selection(query.month, query.year, query.employee_id.as_deref())?;
    let (page, per_page) = paging(query.page, query.per_page);

    let joined = engine.work_log_list(&selection).await.map_err(|e| {
        tracing::error!(entity = %e.kind(), error = %e, "Failed to load work logs");
        e
    })?;

    Ok(HttpResponse::Ok().json(WorkLogListResponse {
        data: paginate(&joined.rows, page, per_page),
        page,
        per_page,
        total: joined.rows.len(),
        orphaned: joined.orphaned,
    }))
}
