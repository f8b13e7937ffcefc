use std::str::FromStr;

use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::analytics::AnalyticsEngine;
use crate::model::EntityKind;

/// Called by the CRUD screens after a create/update/delete so the next
/// dashboard or list refresh re-fetches that collection.
#[utoipa::path(
    delete,
    path = "/api/cache/{entity}",
    params(
        ("entity", description = "employees, worklogs, payrolls, incomes or expenses")
    ),
    responses(
        (status = 204, description = "Cached snapshots dropped"),
        (status = 400, description = "Unknown entity", body = Object, example = json!({
            "error": "Unknown entity: leave"
        }))
    ),
    tag = "Cache"
)]
pub async fn invalidate_cache(
    engine: web::Data<AnalyticsEngine>,
    path: web::Path<String>,
) -> impl Responder {
    let entity = path.into_inner();

    match EntityKind::from_str(&entity) {
        Ok(kind) => {
            engine.invalidate(kind);
            HttpResponse::NoContent().finish()
        }
        Err(_) => HttpResponse::BadRequest().json(json!({
            "error": format!("Unknown entity: {}", entity)
        })),
    }
}
