use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PtoType {
    Personal,
    Sick,
    Holiday,
    Other,
}

impl PtoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PtoType::Personal => "personal",
            PtoType::Sick => "sick",
            PtoType::Holiday => "holiday",
            PtoType::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "personal" => Some(PtoType::Personal),
            "sick" => Some(PtoType::Sick),
            "holiday" => Some(PtoType::Holiday),
            "other" => Some(PtoType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PtoEntry {
    pub id: Uuid,
    pub timesheet_id: Uuid,
    pub pto_date: NaiveDate,
    pub pto_type: String,
    pub hours: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
