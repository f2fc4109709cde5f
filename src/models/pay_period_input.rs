use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::models::pay_period::{PayPeriodStatus, PeriodGroup};
use crate::{AppError, AppResult};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePayPeriodInput {
    pub period_group: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub payroll_run_date: Option<NaiveDate>,
}

impl CreatePayPeriodInput {
    pub fn validate(&self) -> AppResult<()> {
        if PeriodGroup::parse(&self.period_group).is_none() {
            return Err(AppError::Validation(
                "Period group must be 'A' or 'B'".to_string(),
            ));
        }
        if self.end_date < self.start_date {
            return Err(AppError::Validation(
                "End date must not precede start date".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePayPeriodInput {
    pub payroll_run_date: Option<NaiveDate>,
    pub status: Option<String>,
}

impl UpdatePayPeriodInput {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(status) = &self.status {
            if PayPeriodStatus::parse(status).is_none() {
                return Err(AppError::Validation(
                    "Status must be one of: open, closed, processed".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct GeneratePeriodsQuery {
    pub start_date: NaiveDate,
    /// Total weeks to cover; bi-weekly, so `weeks / 2` periods per group.
    #[serde(default = "default_weeks")]
    pub weeks: u32,
}

fn default_weeks() -> u32 {
    8
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPayPeriodsQuery {
    pub period_group: Option<String>,
    pub status: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}
