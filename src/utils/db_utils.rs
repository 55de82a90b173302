use serde_json::Value;
use sqlx::{Sqlite, SqliteConnection};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    I64(i64),
    Null,
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
///
/// Column names come from the caller's own field list, never from request keys.
/// `filter` is the WHERE clause; its placeholders are bound from `filter_values`.
/// Returns `None` when there is nothing to set.
pub fn build_update_sql(
    table: &str,
    assignments: Vec<(&'static str, SqlValue)>,
    filter: &str,
    filter_values: Vec<SqlValue>,
) -> Option<SqlUpdate> {
    if assignments.is_empty() {
        return None;
    }

    let set_clause = assignments
        .iter()
        .map(|(column, _)| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {}", table, set_clause, filter);

    let mut values: Vec<SqlValue> = assignments.into_iter().map(|(_, v)| v).collect();
    values.extend(filter_values);

    Some(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(
    conn: &mut SqliteConnection,
    update: SqlUpdate,
) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query::<Sqlite>(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::Text(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(conn).await?;
    Ok(result.rows_affected())
}

/// Serialize structured data into the text column that stores it.
pub fn encode_blob(value: &Value) -> String {
    value.to_string()
}

/// Inverse of [`encode_blob`]; a NULL column yields `None`.
pub fn decode_blob(raw: Option<&str>) -> Result<Option<Value>, sqlx::Error> {
    raw.map(serde_json::from_str::<Value>)
        .transpose()
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))
}
