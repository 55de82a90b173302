use actix_web::{HttpResponse, web};
use serde_json::{Value, json};
use sqlx::SqlitePool;

use crate::error::AppResult;
use crate::model::receipt::{NewReceipt, ReceiptEntry};
use crate::store::{ReceiptLedger, ReceiptOutcome};

/// Add Receipt
///
/// All ten fields must be present. Re-sending a known `receiptKey` is answered
/// with `success: false` and leaves the ledger untouched.
#[utoipa::path(
    post,
    path = "/receipt/add",
    request_body = NewReceipt,
    responses(
        (status = 200, description = "Receipt saved, or duplicate ignored", body = Object, example = json!({
            "success": true,
            "message": "Receipt saved"
        })),
        (status = 400, description = "Missing field", body = Object, example = json!({
            "success": false,
            "message": "Missing field: date"
        }))
    ),
    tag = "Receipt"
)]
pub async fn add_receipt(
    pool: web::Data<SqlitePool>,
    payload: web::Json<Value>,
) -> AppResult<HttpResponse> {
    let receipt = NewReceipt::from_payload(payload.into_inner())?;

    let body = match ReceiptLedger::add(pool.get_ref(), &receipt).await? {
        ReceiptOutcome::Saved(_) => json!({
            "success": true,
            "message": "Receipt saved"
        }),
        ReceiptOutcome::DuplicateIgnored => json!({
            "success": false,
            "message": "Duplicate receipt ignored"
        }),
    };

    Ok(HttpResponse::Ok().json(body))
}

/// Receipt history, newest first
#[utoipa::path(
    get,
    path = "/receipt/history",
    responses(
        (status = 200, description = "Receipts, newest first", body = Object, example = json!({
            "success": true,
            "history": [{
                "id": 2, "student_id": null, "name": "Aarav Sharma", "father": "Rakesh Sharma",
                "class": "5th", "roll": "12", "date": "2025-04-10",
                "totalPaid": 1400, "totalDue": 0, "advance": 0, "months": []
            }]
        }))
    ),
    tag = "Receipt"
)]
pub async fn receipt_history(pool: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    let history: Vec<ReceiptEntry> = ReceiptLedger::list_newest_first(pool.get_ref())
        .await?
        .into_iter()
        .map(ReceiptEntry::from)
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "history": history
    })))
}

/// All receipts in insertion order, submission field names
#[utoipa::path(
    get,
    path = "/receipt/all",
    responses(
        (status = 200, description = "Receipts in insertion order", body = Object)
    ),
    tag = "Receipt"
)]
pub async fn list_receipts(pool: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    let receipts: Vec<ReceiptEntry> = ReceiptLedger::list_all(pool.get_ref())
        .await?
        .into_iter()
        .map(ReceiptEntry::from)
        .collect();

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "receipts": receipts
    })))
}

/// All receipts in insertion order, record field names
#[utoipa::path(
    get,
    path = "/receipts/all",
    responses(
        (status = 200, description = "Receipts in insertion order", body = Object)
    ),
    tag = "Receipt"
)]
pub async fn list_receipt_records(pool: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    let receipts = ReceiptLedger::list_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "receipts": receipts
    })))
}

#[utoipa::path(
    delete,
    path = "/receipt/delete/{id}",
    params(
        ("id", Path, description = "Receipt ID")
    ),
    responses(
        (status = 200, description = "Receipt deleted", body = Object, example = json!({
            "success": true,
            "message": "Receipt deleted"
        })),
        (status = 404, description = "Receipt not found", body = Object, example = json!({
            "success": false,
            "message": "Receipt not found"
        }))
    ),
    tag = "Receipt"
)]
pub async fn delete_receipt(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    ReceiptLedger::delete_one(pool.get_ref(), path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Receipt deleted"
    })))
}

#[utoipa::path(
    delete,
    path = "/receipt/delete_all",
    responses(
        (status = 200, description = "Ledger cleared", body = Object, example = json!({
            "success": true,
            "message": "Deleted 0 receipts"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Receipt"
)]
pub async fn delete_all_receipts(pool: web::Data<SqlitePool>) -> AppResult<HttpResponse> {
    let deleted = ReceiptLedger::delete_all(pool.get_ref()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": format!("Deleted {deleted} receipts")
    })))
}
