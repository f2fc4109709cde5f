use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::pay_period::PeriodGroup;
use crate::{AppError, AppResult};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployeeInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub hire_date: NaiveDate,
    pub pay_period_group: String,
    pub hourly_rate: Option<Decimal>,
    #[serde(default)]
    pub is_manager: bool,
    #[serde(default)]
    pub is_admin: bool,
}

impl CreateEmployeeInput {
    pub fn validate(&self) -> AppResult<()> {
        if self.email.trim().is_empty() || !self.email.contains('@') {
            return Err(AppError::Validation("A valid email is required".to_string()));
        }
        if self.password.len() < 6 {
            return Err(AppError::Validation(
                "Password must be at least 6 characters".to_string(),
            ));
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err(AppError::Validation(
                "First and last name are required".to_string(),
            ));
        }
        if PeriodGroup::parse(&self.pay_period_group).is_none() {
            return Err(AppError::Validation(
                "Pay period group must be 'A' or 'B'".to_string(),
            ));
        }
        Ok(())
    }
}

/// Partial update; `pay_period_group` is fixed at creation and absent here.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateEmployeeInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub hourly_rate: Option<Decimal>,
    pub is_manager: Option<bool>,
    pub is_admin: Option<bool>,
    pub is_active: Option<bool>,
}

impl UpdateEmployeeInput {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(email) = &self.email {
            if email.trim().is_empty() || !email.contains('@') {
                return Err(AppError::Validation("A valid email is required".to_string()));
            }
        }
        if let Some(password) = &self.password {
            if password.len() < 6 {
                return Err(AppError::Validation(
                    "Password must be at least 6 characters".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_input() -> CreateEmployeeInput {
        CreateEmployeeInput {
            email: "jane@example.com".to_string(),
            password: "hunter22".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            pay_period_group: "A".to_string(),
            hourly_rate: None,
            is_manager: false,
            is_admin: false,
        }
    }

    #[test]
    fn test_valid_input_passes() {
        assert!(valid_input().validate().is_ok());
    }

    #[test]
    fn test_unknown_period_group_rejected() {
        let mut input = valid_input();
        input.pay_period_group = "C".to_string();
        assert!(matches!(input.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_short_password_rejected() {
        let mut input = valid_input();
        input.password = "abc".to_string();
        assert!(matches!(input.validate(), Err(AppError::Validation(_))));
    }
}
