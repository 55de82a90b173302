use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::model::roll;
use crate::utils::db_utils::decode_blob;

/// A stored payment event.
///
/// `name`, `father`, `class_name` and `roll` are a snapshot taken when the
/// payment was recorded and are never refreshed from the student row.
/// Serializes in the record shape (`class_name`, `total_paid`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Receipt {
    pub id: i64,
    pub student_id: Option<i64>,
    pub name: String,
    pub father: String,
    pub class_name: String,
    pub roll: String,
    pub date: String,
    pub total_paid: i64,
    pub total_due: i64,
    pub advance: i64,
    #[schema(value_type = Vec<Object>)]
    pub months: Value,
    #[serde(skip)]
    pub receipt_key: String,
}

#[derive(FromRow)]
pub(crate) struct ReceiptRow {
    pub id: i64,
    pub student_id: Option<i64>,
    pub name: Option<String>,
    pub father: Option<String>,
    pub class_name: Option<String>,
    pub roll: Option<String>,
    pub date: Option<String>,
    pub total_paid: i64,
    pub total_due: i64,
    pub advance: i64,
    pub months_json: Option<String>,
    pub receipt_key: Option<String>,
}

impl TryFrom<ReceiptRow> for Receipt {
    type Error = sqlx::Error;

    fn try_from(row: ReceiptRow) -> Result<Self, Self::Error> {
        Ok(Receipt {
            id: row.id,
            student_id: row.student_id,
            name: row.name.unwrap_or_default(),
            father: row.father.unwrap_or_default(),
            class_name: row.class_name.unwrap_or_default(),
            roll: row.roll.unwrap_or_default(),
            date: row.date.unwrap_or_default(),
            total_paid: row.total_paid,
            total_due: row.total_due,
            advance: row.advance,
            months: decode_blob(row.months_json.as_deref())?
                .unwrap_or_else(|| Value::Array(Vec::new())),
            receipt_key: row.receipt_key.unwrap_or_default(),
        })
    }
}

/// History entry shape, keyed the way the fee desk submits receipts.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptEntry {
    pub id: i64,
    #[serde(rename = "student_id")]
    pub student_id: Option<i64>,
    pub name: String,
    pub father: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub roll: String,
    pub date: String,
    pub total_paid: i64,
    pub total_due: i64,
    pub advance: i64,
    #[schema(value_type = Vec<Object>)]
    pub months: Value,
}

impl From<Receipt> for ReceiptEntry {
    fn from(r: Receipt) -> Self {
        ReceiptEntry {
            id: r.id,
            student_id: r.student_id,
            name: r.name,
            father: r.father,
            class_name: r.class_name,
            roll: r.roll,
            date: r.date,
            total_paid: r.total_paid,
            total_due: r.total_due,
            advance: r.advance,
            months: r.months,
        }
    }
}

/// Checked in this order; the first absent one is reported.
pub const REQUIRED_FIELDS: [&str; 10] = [
    "name",
    "father",
    "class",
    "roll",
    "date",
    "totalPaid",
    "totalDue",
    "advance",
    "months",
    "receiptKey",
];

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewReceipt {
    #[schema(example = "Aarav Sharma")]
    pub name: String,
    #[schema(example = "Rakesh Sharma")]
    pub father: String,
    #[serde(rename = "class")]
    #[schema(example = "5th")]
    pub class_name: String,
    #[serde(deserialize_with = "roll::deserialize")]
    #[schema(example = "12", value_type = String)]
    pub roll: String,
    #[schema(example = "2025-04-10")]
    pub date: String,
    #[schema(example = 1400)]
    pub total_paid: i64,
    #[schema(example = 0)]
    pub total_due: i64,
    #[schema(example = 0)]
    pub advance: i64,
    #[schema(value_type = Vec<Object>)]
    pub months: Value,
    #[schema(example = "5th-12-2025-04-10-1")]
    pub receipt_key: String,
}

impl NewReceipt {
    /// Presence check over the raw payload, then typed decoding.
    pub fn from_payload(payload: Value) -> AppResult<Self> {
        let obj = payload
            .as_object()
            .ok_or_else(|| AppError::Validation("Payload must be a JSON object".to_string()))?;

        if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !obj.contains_key(**f)) {
            return Err(AppError::missing_field(missing));
        }

        serde_json::from_value(payload).map_err(|e| AppError::Validation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload() -> Value {
        json!({
            "name": "Aarav", "father": "Rakesh", "class": "5th", "roll": 12,
            "date": "2025-04-10", "totalPaid": 1400, "totalDue": 0, "advance": 0,
            "months": [{"month": "April", "paid": 1400}], "receiptKey": "k-1"
        })
    }

    #[test]
    fn first_missing_field_is_reported() {
        let mut p = payload();
        let obj = p.as_object_mut().unwrap();
        obj.remove("date");
        obj.remove("receiptKey");

        let err = NewReceipt::from_payload(p).unwrap_err();
        assert_eq!(err.to_string(), "Missing field: date");
    }

    #[test]
    fn complete_payload_decodes() {
        let r = NewReceipt::from_payload(payload()).unwrap();
        assert_eq!(r.class_name, "5th");
        assert_eq!(r.roll, "12");
        assert_eq!(r.receipt_key, "k-1");
    }

    #[test]
    fn wrong_type_is_a_validation_error() {
        let mut p = payload();
        p["totalPaid"] = json!("lots");
        assert!(matches!(
            NewReceipt::from_payload(p),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn entry_uses_submission_keys() {
        let receipt = Receipt {
            id: 3,
            student_id: None,
            name: "Aarav".into(),
            father: "Rakesh".into(),
            class_name: "5th".into(),
            roll: "12".into(),
            date: "2025-04-10".into(),
            total_paid: 1400,
            total_due: 0,
            advance: 0,
            months: json!([]),
            receipt_key: "k-1".into(),
        };

        let record = serde_json::to_value(&receipt).unwrap();
        assert_eq!(record["class_name"], "5th");
        assert_eq!(record["total_paid"], 1400);
        assert!(record.get("receipt_key").is_none());

        let entry = serde_json::to_value(ReceiptEntry::from(receipt)).unwrap();
        assert_eq!(entry["class"], "5th");
        assert_eq!(entry["totalPaid"], 1400);
        assert_eq!(entry["student_id"], Value::Null);
    }
}
