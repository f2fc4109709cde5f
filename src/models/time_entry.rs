use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Where the work was performed. Closed enumeration; anything else is a
/// validation error at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkMode {
    Remote,
    OnSite,
}

impl WorkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkMode::Remote => "remote",
            WorkMode::OnSite => "on_site",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "remote" => Some(WorkMode::Remote),
            "on_site" => Some(WorkMode::OnSite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TimeEntry {
    pub id: Uuid,
    pub timesheet_id: Uuid,
    pub work_date: NaiveDate,
    pub client_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub job_code_id: Option<Uuid>,
    pub service_type_id: Option<Uuid>,
    pub work_mode: String,
    pub hours: Decimal,
    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
    pub description: Option<String>,
    pub is_billable: bool,
    pub is_overtime: bool,
    pub vehicle_reimbursement_tier: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
