//! Per-class monthly fee table.

use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::error::{AppError, AppResult};
use crate::model::fee_structure::FeeStructure;

pub const DEFAULT_FEES: [(&str, i64); 19] = [
    ("Nursery", 1200),
    ("LKG", 1300),
    ("UKG", 1300),
    ("1st", 1300),
    ("2nd", 1300),
    ("3rd", 1300),
    ("4th", 1400),
    ("5th", 1400),
    ("6th", 1500),
    ("7th", 1500),
    ("8th", 1700),
    ("9th", 1900),
    ("10th", 1900),
    ("11th_Medical", 2200),
    ("11th_Commerce", 2100),
    ("11th_Art", 2100),
    ("12th_Medical", 2200),
    ("12th_Commerce", 2100),
    ("12th_Art", 2100),
];

pub struct FeeSchedule;

impl FeeSchedule {
    /// Insert the default fee for every class that has no row yet.
    /// Existing rows, edited or not, are left alone. Returns rows inserted.
    pub async fn seed_defaults(pool: &SqlitePool) -> AppResult<u64> {
        let mut tx = pool.begin().await?;
        let mut inserted = 0;

        for (class_name, monthly_fee) in DEFAULT_FEES {
            inserted += sqlx::query(
                "INSERT INTO fee_structure (class_name, monthly_fee) VALUES (?, ?)
                 ON CONFLICT (class_name) DO NOTHING",
            )
            .bind(class_name)
            .bind(monthly_fee)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;
        info!(inserted, "Default fees seeded");
        Ok(inserted)
    }

    pub async fn get_all(pool: &SqlitePool) -> AppResult<Vec<FeeStructure>> {
        Ok(sqlx::query_as::<_, FeeStructure>(
            "SELECT id, class_name, monthly_fee FROM fee_structure ORDER BY id",
        )
        .fetch_all(pool)
        .await?)
    }

    #[instrument(skip(pool))]
    pub async fn upsert(
        pool: &SqlitePool,
        class_name: Option<&str>,
        monthly_fee: i64,
    ) -> AppResult<()> {
        let class_name = class_name
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::Validation("Missing class name".to_string()))?;

        sqlx::query(
            "INSERT INTO fee_structure (class_name, monthly_fee) VALUES (?, ?)
             ON CONFLICT (class_name) DO UPDATE SET monthly_fee = excluded.monthly_fee",
        )
        .bind(class_name)
        .bind(monthly_fee)
        .execute(pool)
        .await?;

        info!("Fee updated");
        Ok(())
    }

    /// Returns the number of rows removed.
    pub async fn reset_all(pool: &SqlitePool) -> AppResult<u64> {
        let deleted = sqlx::query("DELETE FROM fee_structure")
            .execute(pool)
            .await?
            .rows_affected();

        info!(deleted, "Fee table cleared");
        Ok(deleted)
    }
}
