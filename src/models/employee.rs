use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Employee {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub hire_date: NaiveDate,
    pub pay_period_group: String,
    pub hourly_rate: Option<Decimal>,
    pub is_manager: bool,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Public view of an employee. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct EmployeeResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub hire_date: NaiveDate,
    pub pay_period_group: String,
    pub hourly_rate: Option<Decimal>,
    pub is_manager: bool,
    pub is_admin: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Employee> for EmployeeResponse {
    fn from(e: Employee) -> Self {
        EmployeeResponse {
            id: e.id,
            email: e.email,
            first_name: e.first_name,
            last_name: e.last_name,
            hire_date: e.hire_date,
            pay_period_group: e.pay_period_group,
            hourly_rate: e.hourly_rate,
            is_manager: e.is_manager,
            is_admin: e.is_admin,
            is_active: e.is_active,
            created_at: e.created_at,
            updated_at: e.updated_at,
        }
    }
}

pub const EMPLOYEE_RESPONSE_COLUMNS: &str = r#"
    id, email, first_name, last_name, hire_date, pay_period_group,
    hourly_rate, is_manager, is_admin, is_active, created_at, updated_at
"#;
