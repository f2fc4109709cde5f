use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle of a timesheet.
///
/// `draft` is the initial state. `approved` is terminal. `rejected` is a
/// second editable state: the first entry mutation after a rejection
/// reopens the timesheet to `draft` and clears the rejection reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TimesheetStatus {
    Draft,
    Submitted,
    Approved,
    Rejected,
}

impl TimesheetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimesheetStatus::Draft => "draft",
            TimesheetStatus::Submitted => "submitted",
            TimesheetStatus::Approved => "approved",
            TimesheetStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(TimesheetStatus::Draft),
            "submitted" => Some(TimesheetStatus::Submitted),
            "approved" => Some(TimesheetStatus::Approved),
            "rejected" => Some(TimesheetStatus::Rejected),
            _ => None,
        }
    }

    /// Entries may be added, edited, or deleted only in these states.
    pub fn is_editable(&self) -> bool {
        matches!(self, TimesheetStatus::Draft | TimesheetStatus::Rejected)
    }

    pub fn can_submit(&self) -> bool {
        matches!(self, TimesheetStatus::Draft)
    }

    /// Approve and reject share the same precondition.
    pub fn can_review(&self) -> bool {
        matches!(self, TimesheetStatus::Submitted)
    }

    /// Mutating an entry under `rejected` reopens the timesheet.
    pub fn reopens_on_edit(&self) -> bool {
        matches!(self, TimesheetStatus::Rejected)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Timesheet {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub pay_period_id: Uuid,
    pub status: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_draft_can_submit() {
        assert!(TimesheetStatus::Draft.can_submit());
        assert!(!TimesheetStatus::Submitted.can_submit());
        assert!(!TimesheetStatus::Approved.can_submit());
        assert!(!TimesheetStatus::Rejected.can_submit());
    }

    #[test]
    fn test_only_submitted_can_be_reviewed() {
        assert!(TimesheetStatus::Submitted.can_review());
        assert!(!TimesheetStatus::Draft.can_review());
        assert!(!TimesheetStatus::Approved.can_review());
        assert!(!TimesheetStatus::Rejected.can_review());
    }

    #[test]
    fn test_draft_and_rejected_are_editable() {
        assert!(TimesheetStatus::Draft.is_editable());
        assert!(TimesheetStatus::Rejected.is_editable());
        assert!(!TimesheetStatus::Submitted.is_editable());
        assert!(!TimesheetStatus::Approved.is_editable());
    }

    #[test]
    fn test_only_rejected_reopens_on_edit() {
        assert!(TimesheetStatus::Rejected.reopens_on_edit());
        assert!(!TimesheetStatus::Draft.reopens_on_edit());
        assert!(!TimesheetStatus::Submitted.reopens_on_edit());
        assert!(!TimesheetStatus::Approved.reopens_on_edit());
    }

    #[test]
    fn test_parse_round_trip() {
        for status in [
            TimesheetStatus::Draft,
            TimesheetStatus::Submitted,
            TimesheetStatus::Approved,
            TimesheetStatus::Rejected,
        ] {
            assert_eq!(TimesheetStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(TimesheetStatus::parse("pending"), None);
    }
}
