//! Receipt ledger: append-only payment events deduplicated by `receipt_key`.

use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::model::receipt::{NewReceipt, Receipt, ReceiptRow};
use crate::utils::db_utils::encode_blob;

const COLUMNS: &str = "id, student_id, name, father, class_name, roll, date, \
    total_paid, total_due, advance, months_json, receipt_key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiptOutcome {
    Saved(i64),
    /// A receipt with the same key is already recorded; nothing was written.
    DuplicateIgnored,
}

pub struct ReceiptLedger;

impl ReceiptLedger {
    /// Record a payment. `student_id` stays NULL: the ledger keeps a snapshot of the
    /// student's details instead of resolving the row.
    #[instrument(skip(pool, receipt), fields(receipt_key = %receipt.receipt_key))]
    pub async fn add(pool: &SqlitePool, receipt: &NewReceipt) -> AppResult<ReceiptOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO receipt
                (student_id, name, father, class_name, roll, date,
                 total_paid, total_due, advance, months_json, receipt_key)
            VALUES (NULL, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (receipt_key) DO NOTHING
            "#,
        )
        .bind(&receipt.name)
        .bind(&receipt.father)
        .bind(&receipt.class_name)
        .bind(&receipt.roll)
        .bind(&receipt.date)
        .bind(receipt.total_paid)
        .bind(receipt.total_due)
        .bind(receipt.advance)
        .bind(encode_blob(&receipt.months))
        .bind(&receipt.receipt_key)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!("Duplicate receipt ignored");
            return Ok(ReceiptOutcome::DuplicateIgnored);
        }

        let id = result.last_insert_rowid();
        info!(receipt_id = id, "Receipt saved");
        Ok(ReceiptOutcome::Saved(id))
    }

    /// Every receipt in insertion order.
    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<Receipt>> {
        Self::list(pool, "ASC").await
    }

    /// Every receipt, most recent first.
    pub async fn list_newest_first(pool: &SqlitePool) -> AppResult<Vec<Receipt>> {
        Self::list(pool, "DESC").await
    }

    async fn list(pool: &SqlitePool, direction: &str) -> AppResult<Vec<Receipt>> {
        let query = format!("SELECT {COLUMNS} FROM receipt ORDER BY id {direction}");
        let rows = sqlx::query_as::<_, ReceiptRow>(&query)
            .fetch_all(pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(Receipt::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    #[instrument(skip(pool))]
    pub async fn delete_one(pool: &SqlitePool, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM receipt WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Receipt not found".to_string()));
        }

        info!("Receipt deleted");
        Ok(())
    }

    /// Returns the number of receipts removed.
    pub async fn delete_all(pool: &SqlitePool) -> AppResult<u64> {
        let deleted = sqlx::query("DELETE FROM receipt")
            .execute(pool)
            .await?
            .rows_affected();

        info!(deleted, "Receipt ledger cleared");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use serde_json::json;

    fn receipt(key: &str) -> NewReceipt {
        NewReceipt {
            name: "Asha".into(),
            father: "Mohan".into(),
            class_name: "2nd".into(),
            roll: "5".into(),
            date: "2025-06-01".into(),
            total_paid: 2600,
            total_due: 0,
            advance: 100,
            months: json!([
                {"month": "June", "fee": 1300, "status": "paid"},
                {"month": "July", "fee": 1300, "status": "paid", "discount": null}
            ]),
            receipt_key: key.into(),
        }
    }

    #[actix_web::test]
    async fn same_key_is_stored_once() {
        let pool = test_pool().await;

        let first = ReceiptLedger::add(&pool, &receipt("2nd-5-1")).await.unwrap();
        assert!(matches!(first, ReceiptOutcome::Saved(_)));

        let mut again = receipt("2nd-5-1");
        again.total_paid = 1;
        let second = ReceiptLedger::add(&pool, &again).await.unwrap();
        assert_eq!(second, ReceiptOutcome::DuplicateIgnored);

        let all = ReceiptLedger::list_all(&pool).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].total_paid, 2600);
    }

    #[actix_web::test]
    async fn months_round_trip_and_student_stays_unlinked() {
        let pool = test_pool().await;
        let input = receipt("k");
        ReceiptLedger::add(&pool, &input).await.unwrap();

        let stored = &ReceiptLedger::list_all(&pool).await.unwrap()[0];
        assert_eq!(stored.months, input.months);
        assert_eq!(stored.student_id, None);
        assert_eq!(stored.receipt_key, "k");
        assert_eq!(stored.class_name, "2nd");
    }

    #[actix_web::test]
    async fn listings_differ_only_in_order() {
        let pool = test_pool().await;
        for key in ["a", "b", "c"] {
            ReceiptLedger::add(&pool, &receipt(key)).await.unwrap();
        }

        let oldest: Vec<_> = ReceiptLedger::list_all(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.receipt_key)
            .collect();
        let newest: Vec<_> = ReceiptLedger::list_newest_first(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.receipt_key)
            .collect();

        assert_eq!(oldest, vec!["a", "b", "c"]);
        assert_eq!(newest, vec!["c", "b", "a"]);
    }

    #[actix_web::test]
    async fn delete_one_then_missing() {
        let pool = test_pool().await;
        let ReceiptOutcome::Saved(id) = ReceiptLedger::add(&pool, &receipt("x")).await.unwrap()
        else {
            panic!("receipt should be saved");
        };

        ReceiptLedger::delete_one(&pool, id).await.unwrap();
        let err = ReceiptLedger::delete_one(&pool, id).await.unwrap_err();
        assert_eq!(err.to_string(), "Receipt not found");
    }

    #[actix_web::test]
    async fn delete_all_reports_count() {
        let pool = test_pool().await;
        assert_eq!(ReceiptLedger::delete_all(&pool).await.unwrap(), 0);

        ReceiptLedger::add(&pool, &receipt("1")).await.unwrap();
        ReceiptLedger::add(&pool, &receipt("2")).await.unwrap();
        assert_eq!(ReceiptLedger::delete_all(&pool).await.unwrap(), 2);
        assert!(ReceiptLedger::list_all(&pool).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn null_months_read_back_as_empty_list() {
        let pool = test_pool().await;
        sqlx::query("INSERT INTO receipt (receipt_key) VALUES ('legacy')")
            .execute(&pool)
            .await
            .unwrap();

        let stored = &ReceiptLedger::list_all(&pool).await.unwrap()[0];
        assert_eq!(stored.months, json!([]));
    }
}
