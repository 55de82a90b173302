use actix_web::{HttpResponse, Responder};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = Object, example = json!({
            "status": "Backend is running"
        }))
    ),
    tag = "Health"
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "Backend is running" }))
}

pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "Backend Running", "success": true }))
}

/// Answers CORS preflight requests; the headers themselves come from the app middleware.
pub async fn preflight() -> impl Responder {
    HttpResponse::Ok().json(json!({ "success": true }))
}
