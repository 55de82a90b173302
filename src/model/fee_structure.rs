use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[schema(example = json!({"class_name": "Nursery", "monthly_fee": 1200}))]
pub struct FeeStructure {
    #[serde(skip)]
    pub id: i64,
    pub class_name: String,
    pub monthly_fee: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FeeUpdate {
    #[schema(example = "Nursery")]
    pub class_name: Option<String>,
    #[schema(example = 1250)]
    pub monthly_fee: Option<i64>,
}
