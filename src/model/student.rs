use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::model::roll;
use crate::utils::db_utils::decode_blob;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "Aarav Sharma",
        "father": "Rakesh Sharma",
        "class_name": "5th",
        "roll": "12",
        "previous_due": 0,
        "advance": 0,
        "months": {"April": 1400}
    })
)]
pub struct Student {
    pub id: i64,
    pub name: String,
    pub father: String,
    pub class_name: String,
    pub roll: String,
    /// Negative when the family holds credit.
    pub previous_due: i64,
    pub advance: i64,
    #[schema(value_type = Object)]
    pub months: Value,
}

#[derive(FromRow)]
pub(crate) struct StudentRow {
    pub id: i64,
    pub name: Option<String>,
    pub father: Option<String>,
    pub class_name: Option<String>,
    pub roll: Option<String>,
    pub previous_due: i64,
    pub advance: i64,
    pub months: Option<String>,
}

impl TryFrom<StudentRow> for Student {
    type Error = sqlx::Error;

    fn try_from(row: StudentRow) -> Result<Self, Self::Error> {
        Ok(Student {
            id: row.id,
            name: row.name.unwrap_or_default(),
            father: row.father.unwrap_or_default(),
            class_name: row.class_name.unwrap_or_default(),
            roll: row.roll.unwrap_or_default(),
            previous_due: row.previous_due,
            advance: row.advance,
            months: decode_blob(row.months.as_deref())?.unwrap_or(Value::Null),
        })
    }
}

fn empty_months() -> Value {
    json!({})
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewStudent {
    #[schema(example = "Aarav Sharma")]
    pub name: String,
    #[schema(example = "Rakesh Sharma")]
    pub father: String,
    #[schema(example = "5th")]
    pub class_name: String,
    #[serde(deserialize_with = "roll::deserialize")]
    #[schema(example = "12", value_type = String)]
    pub roll: String,
    #[serde(default)]
    pub previous_due: i64,
    #[serde(default)]
    pub advance: i64,
    #[serde(default = "empty_months")]
    #[schema(value_type = Object)]
    pub months: Value,
}

/// Fields left as `None` keep their stored value.
///
/// `months` distinguishes an explicit `null` (clears the column) from an absent key.
/// A `null` for any other field is read as absent.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub father: Option<String>,
    pub previous_due: Option<i64>,
    pub advance: Option<i64>,
    #[serde(default, deserialize_with = "present_value")]
    #[schema(value_type = Option<Object>)]
    pub months: Option<Value>,
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
