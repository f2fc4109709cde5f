use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::entry_rules::{validate_date_in_period, validate_hours};
use crate::models::pto_entry::PtoType;
use crate::{AppError, AppResult};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePtoEntryInput {
    pub pto_date: NaiveDate,
    pub pto_type: String,
    pub hours: Decimal,
    pub notes: Option<String>,
}

impl CreatePtoEntryInput {
    pub fn validate(&self, period_start: NaiveDate, period_end: NaiveDate) -> AppResult<()> {
        validate_hours(self.hours)?;
        validate_date_in_period(self.pto_date, period_start, period_end, "PTO date")?;
        if PtoType::parse(&self.pto_type).is_none() {
            return Err(AppError::Validation(
                "PTO type must be one of: personal, sick, holiday, other".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePtoEntryInput {
    pub pto_date: Option<NaiveDate>,
    pub pto_type: Option<String>,
    pub hours: Option<Decimal>,
    pub notes: Option<String>,
}

impl UpdatePtoEntryInput {
    pub fn validate(&self, period_start: NaiveDate, period_end: NaiveDate) -> AppResult<()> {
        if let Some(hours) = self.hours {
            validate_hours(hours)?;
        }
        if let Some(pto_date) = self.pto_date {
            validate_date_in_period(pto_date, period_start, period_end, "PTO date")?;
        }
        if let Some(pto_type) = &self.pto_type {
            if PtoType::parse(pto_type).is_none() {
                return Err(AppError::Validation(
                    "PTO type must be one of: personal, sick, holiday, other".to_string(),
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

    #[test]
    fn test_valid_pto_entry_passes() {
        let input = CreatePtoEntryInput {
            pto_date: d(2025, 1, 10),
            pto_type: "sick".to_string(),
            hours: Decimal::from(8),
            notes: None,
        };
        assert!(input.validate(d(2025, 1, 5), d(2025, 1, 18)).is_ok());
    }

    #[test]
    fn test_unknown_pto_type_rejected() {
        let input = CreatePtoEntryInput {
            pto_date: d(2025, 1, 10),
            pto_type: "vacation".to_string(),
            hours: Decimal::from(8),
            notes: None,
        };
        let result = input.validate(d(2025, 1, 5), d(2025, 1, 18));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_pto_date_outside_period_rejected() {
        let input = CreatePtoEntryInput {
            pto_date: d(2025, 1, 19),
            pto_type: "holiday".to_string(),
            hours: Decimal::from(8),
            notes: None,
        };
        let result = input.validate(d(2025, 1, 5), d(2025, 1, 18));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
