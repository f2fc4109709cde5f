//! Best-effort email notifications. Delivery is a logging stub; dispatch is
//! queued after the owning transaction commits and never blocks or fails the
//! request that triggered it.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::AppError;

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError>;
}

/// Development sink: writes the rendered message to the log.
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        tracing::info!(to, subject, "email notification:\n{}", body);
        Ok(())
    }
}

#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Notifier { sink }
    }

    /// Spawns delivery and swallows failures. Notification problems are an
    /// operational concern, never a caller-visible one.
    fn dispatch(&self, to: String, subject: String, body: String) {
        let sink = self.sink.clone();
        tokio::spawn(async move {
            if let Err(e) = sink.deliver(&to, &subject, &body).await {
                tracing::warn!(error = %e, to, subject, "Notification delivery failed");
            }
        });
    }

    pub fn timesheet_submitted(
        &self,
        manager_email: String,
        manager_name: String,
        employee_name: &str,
        pay_period: &str,
        total_hours: Decimal,
    ) {
        let subject = format!("Timesheet Submitted: {}", employee_name);
        let body = format!(
            "Hello {},\n\n\
             {} has submitted their timesheet for review.\n\n\
             Pay Period: {}\n\
             Total Hours: {}\n\n\
             Please review and approve at your earliest convenience.\n\n\
             - MyHours System",
            manager_name, employee_name, pay_period, total_hours
        );
        self.dispatch(manager_email, subject, body);
    }

    pub fn timesheet_approved(
        &self,
        employee_email: String,
        employee_name: &str,
        pay_period: &str,
        approved_by: &str,
    ) {
        let subject = format!("Timesheet Approved - {}", pay_period);
        let body = format!(
            "Hello {},\n\n\
             Your timesheet for {} has been approved by {}.\n\n\
             No further action is required.\n\n\
             - MyHours System",
            employee_name, pay_period, approved_by
        );
        self.dispatch(employee_email, subject, body);
    }

    pub fn timesheet_rejected(
        &self,
        employee_email: String,
        employee_name: &str,
        pay_period: &str,
        rejected_by: &str,
        reason: &str,
    ) {
        let subject = format!("Timesheet Requires Changes - {}", pay_period);
        let body = format!(
            "Hello {},\n\n\
             Your timesheet for {} requires changes before it can be approved.\n\n\
             Rejected by: {}\n\
             Reason: {}\n\n\
             Please make the necessary corrections and resubmit.\n\n\
             - MyHours System",
            employee_name, pay_period, rejected_by, reason
        );
        self.dispatch(employee_email, subject, body);
    }

    pub fn password_reset(&self, email: String, name: &str, token: &str) {
        let subject = "Password Reset Request - MyHours".to_string();
        let body = format!(
            "Hello {},\n\n\
             We received a request to reset your password.\n\n\
             Reset token: {}\n\n\
             This token will expire in 1 hour. If you didn't request this,\n\
             you can safely ignore this email.\n\n\
             - MyHours System",
            name, token
        );
        self.dispatch(email, subject, body);
    }
}
