use actix_web::{HttpResponse, web};
use serde_json::json;
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::model::fee_structure::FeeUpdate;
use crate::store::FeeSchedule;

#[utoipa::path(
    get,
    path = "/fees/setup_defaults",
    responses(
        (status = 200, description = "Missing default classes inserted", body = Object, example = json!({
            "success": true,
            "message": "Default fees inserted"
        }))
    ),
    tag = "Fees"
)]
pub async fn setup_default_fees(pool: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    FeeSchedule::seed_defaults(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Default fees inserted"
    })))
}

#[utoipa::path(
    get,
    path = "/fees/get",
    responses(
        (status = 200, description = "Fee table", body = Object, example = json!({
            "success": true,
            "fees": [{"class_name": "Nursery", "monthly_fee": 1200}]
        }))
    ),
    tag = "Fees"
)]
pub async fn get_fees(pool: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    let fees = FeeSchedule::get_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "fees": fees
    })))
}

/// Create or overwrite the fee for one class. A missing `monthly_fee` stores 0.
#[utoipa::path(
    post,
    path = "/fees/update",
    request_body = FeeUpdate,
    responses(
        (status = 200, description = "Fee stored", body = Object, example = json!({
            "success": true,
            "message": "Fee Updated"
        })),
        (status = 400, description = "Missing class name", body = Object, example = json!({
            "success": false,
            "message": "Missing class name"
        }))
    ),
    tag = "Fees"
)]
pub async fn update_fee(
    pool: web::Data<SqlitePool>,
    payload: web::Json<FeeUpdate>,
) -> AppResult<HttpResponse> {
    FeeSchedule::upsert(
        pool.get_ref(),
        payload.class_name.as_deref(),
        payload.monthly_fee.unwrap_or(0),
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Fee Updated"
    })))
}

#[utoipa::path(
    get,
    path = "/fees/reset",
    responses(
        (status = 200, description = "Fee table cleared", body = Object, example = json!({
            "success": true,
            "message": "Deleted 19 fee rows"
        }))
    ),
    tag = "Fees"
)]
pub async fn reset_fees(pool: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    let deleted = FeeSchedule::reset_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Deleted {deleted} fee rows")
    })))
}
