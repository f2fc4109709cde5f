use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{AppError, AppResult};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTimesheetInput {
    pub employee_id: Uuid,
    pub pay_period_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectTimesheetInput {
    pub reason: String,
}

impl RejectTimesheetInput {
    pub fn validate(&self) -> AppResult<()> {
        if self.reason.trim().is_empty() {
            return Err(AppError::Validation(
                "A rejection reason is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListTimesheetsQuery {
    pub pay_period_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_rejection_reason_rejected() {
        let input = RejectTimesheetInput {
            reason: "   ".to_string(),
        };
        assert!(matches!(input.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_non_empty_reason_accepted() {
        let input = RejectTimesheetInput {
            reason: "missing description".to_string(),
        };
        assert!(input.validate().is_ok());
    }
}
