use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::entry_rules::{validate_date_in_period, validate_hours};
use crate::models::time_entry::WorkMode;
use crate::{AppError, AppResult};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTimeEntryInput {
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
    #[serde(default = "default_true")]
    pub is_billable: bool,
    #[serde(default)]
    pub is_overtime: bool,
    pub vehicle_reimbursement_tier: Option<String>,
}

fn default_true() -> bool {
    true
}

impl CreateTimeEntryInput {
    /// Field-level checks; the caller has already passed the timesheet
    /// state-machine gate.
    pub fn validate(&self, period_start: NaiveDate, period_end: NaiveDate) -> AppResult<()> {
        validate_hours(self.hours)?;
        validate_date_in_period(self.work_date, period_start, period_end, "Work date")?;
        if WorkMode::parse(&self.work_mode).is_none() {
            return Err(AppError::Validation(
                "Work mode must be 'remote' or 'on_site'".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTimeEntryInput {
    pub work_date: Option<NaiveDate>,
    pub client_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub job_code_id: Option<Uuid>,
    pub service_type_id: Option<Uuid>,
    pub work_mode: Option<String>,
    pub hours: Option<Decimal>,
    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
    pub description: Option<String>,
    pub is_billable: Option<bool>,
    pub is_overtime: Option<bool>,
    pub vehicle_reimbursement_tier: Option<String>,
}

impl UpdateTimeEntryInput {
    pub fn validate(&self, period_start: NaiveDate, period_end: NaiveDate) -> AppResult<()> {
        if let Some(hours) = self.hours {
            validate_hours(hours)?;
        }
        if let Some(work_date) = self.work_date {
            validate_date_in_period(work_date, period_start, period_end, "Work date")?;
        }
        if let Some(mode) = &self.work_mode {
            if WorkMode::parse(mode).is_none() {
                return Err(AppError::Validation(
                    "Work mode must be 'remote' or 'on_site'".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn input(work_date: NaiveDate, work_mode: &str, hours: Decimal) -> CreateTimeEntryInput {
        CreateTimeEntryInput {
            work_date,
            client_id: None,
            location_id: None,
            job_code_id: None,
            service_type_id: None,
            work_mode: work_mode.to_string(),
            hours,
            start_time: None,
            end_time: None,
            description: None,
            is_billable: true,
            is_overtime: false,
            vehicle_reimbursement_tier: None,
        }
    }

    #[test]
    fn test_entry_inside_period_passes() {
        let input = input(d(2025, 1, 10), "remote", Decimal::from(8));
        assert!(input.validate(d(2025, 1, 5), d(2025, 1, 18)).is_ok());
    }

    #[test]
    fn test_entry_before_period_start_rejected() {
        let input = input(d(2025, 1, 4), "remote", Decimal::from(8));
        let result = input.validate(d(2025, 1, 5), d(2025, 1, 18));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_unknown_work_mode_rejected() {
        let input = input(d(2025, 1, 10), "hybrid", Decimal::from(8));
        let result = input.validate(d(2025, 1, 5), d(2025, 1, 18));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_hours_out_of_range_rejected() {
        let input = input(d(2025, 1, 10), "on_site", Decimal::from(25));
        let result = input.validate(d(2025, 1, 5), d(2025, 1, 18));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_update_rechecks_date_when_supplied() {
        let update = UpdateTimeEntryInput {
            work_date: Some(d(2025, 1, 19)),
            client_id: None,
            location_id: None,
            job_code_id: None,
            service_type_id: None,
            work_mode: None,
            hours: None,
            start_time: None,
            end_time: None,
            description: None,
            is_billable: None,
            is_overtime: None,
            vehicle_reimbursement_tier: None,
        };
        let result = update.validate(d(2025, 1, 5), d(2025, 1, 18));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_update_without_date_skips_date_check() {
        let update = UpdateTimeEntryInput {
            work_date: None,
            client_id: None,
            location_id: None,
            job_code_id: None,
            service_type_id: None,
            work_mode: None,
            hours: Some(Decimal::from(6)),
            start_time: None,
            end_time: None,
            description: None,
            is_billable: None,
            is_overtime: None,
            vehicle_reimbursement_tier: None,
        };
        assert!(update.validate(d(2025, 1, 5), d(2025, 1, 18)).is_ok());
    }
}
