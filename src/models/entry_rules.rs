use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::{AppError, AppResult};

/// Hours are recorded to two decimal places and must fit in a single day.
pub fn validate_hours(hours: Decimal) -> AppResult<()> {
    if hours < Decimal::ZERO || hours > Decimal::from(24) {
        return Err(AppError::Validation(
            "Hours must be between 0 and 24".to_string(),
        ));
    }
    Ok(())
}

/// Entry dates must fall inside the parent timesheet's pay period. This is
/// re-checked on every mutation that supplies a date, not just on insert.
pub fn validate_date_in_period(
    date: NaiveDate,
    period_start: NaiveDate,
    period_end: NaiveDate,
    field: &str,
) -> AppResult<()> {
    if date < period_start || date > period_end {
        return Err(AppError::Validation(format!(
            "{} must be within pay period ({} to {})",
            field, period_start, period_end
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_hours_bounds() {
        assert!(validate_hours(Decimal::ZERO).is_ok());
        assert!(validate_hours(Decimal::from_f64(7.5).unwrap()).is_ok());
        assert!(validate_hours(Decimal::from(24)).is_ok());
        assert!(validate_hours(Decimal::from_f64(24.01).unwrap()).is_err());
        assert!(validate_hours(Decimal::from_f64(-0.25).unwrap()).is_err());
    }

    #[test]
    fn test_date_containment_is_inclusive() {
        let start = d(2025, 1, 5);
        let end = d(2025, 1, 18);

        assert!(validate_date_in_period(start, start, end, "Work date").is_ok());
        assert!(validate_date_in_period(end, start, end, "Work date").is_ok());
        assert!(validate_date_in_period(d(2025, 1, 10), start, end, "Work date").is_ok());
        assert!(validate_date_in_period(d(2025, 1, 4), start, end, "Work date").is_err());
        assert!(validate_date_in_period(d(2025, 1, 19), start, end, "Work date").is_err());
    }

    #[test]
    fn test_date_error_names_the_period() {
        let err = validate_date_in_period(
            d(2025, 1, 4),
            d(2025, 1, 5),
            d(2025, 1, 18),
            "Work date",
        )
        .unwrap_err();

        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("2025-01-05"));
                assert!(msg.contains("2025-01-18"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
