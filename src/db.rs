use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS student (
        id           INTEGER PRIMARY KEY AUTOINCREMENT,
        name         TEXT,
        father       TEXT,
        class_name   TEXT,
        roll         TEXT,
        previous_due INTEGER NOT NULL DEFAULT 0,
        advance      INTEGER NOT NULL DEFAULT 0,
        months       TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS receipt (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id  INTEGER REFERENCES student(id),
        name        TEXT,
        father      TEXT,
        class_name  TEXT,
        roll        TEXT,
        date        TEXT,
        total_paid  INTEGER NOT NULL DEFAULT 0,
        total_due   INTEGER NOT NULL DEFAULT 0,
        advance     INTEGER NOT NULL DEFAULT 0,
        months_json TEXT,
        receipt_key TEXT UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS fee_structure (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        class_name  TEXT UNIQUE,
        monthly_fee INTEGER NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_student_class_roll ON student (class_name, roll)",
    "CREATE INDEX IF NOT EXISTS idx_receipt_student ON receipt (student_id)",
];

/// Open the store and make sure every table exists.
pub async fn init_db(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    info!(database_url, "Database ready");

    Ok(pool)
}

pub async fn create_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in SCHEMA {
        sqlx::query(*statement).execute(&mut *tx).await?;
    }
    tx.commit().await
}

pub async fn close_db(pool: SqlitePool) {
    pool.close().await;
    info!("Database connections released");
}

/// Single-connection in-memory store; every connection to `:memory:` is its own database.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    init_db("sqlite::memory:", 1)
        .await
        .expect("in-memory sqlite should open")
}
