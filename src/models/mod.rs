pub mod auth_input;
pub mod employee;
pub mod employee_input;
pub mod entry_rules;
pub mod lookup;
pub mod lookup_input;
pub mod pay_period;
pub mod pay_period_input;
pub mod pto_entry;
pub mod pto_entry_input;
pub mod time_entry;
pub mod time_entry_input;
pub mod timesheet;
pub mod timesheet_input;

pub use auth_input::{
    ChangePasswordInput, LoginInput, MessageResponse, RequestResetInput, ResetPasswordInput,
    TokenResponse,
};
pub use employee::{Employee, EmployeeResponse, EMPLOYEE_RESPONSE_COLUMNS};
pub use employee_input::{CreateEmployeeInput, UpdateEmployeeInput};
pub use lookup::{Client, JobCode, Location, ServiceType};
pub use lookup_input::{
    CreateClientInput, CreateJobCodeInput, CreateLocationInput, CreateServiceTypeInput,
    UpdateClientInput, UpdateJobCodeInput, UpdateLocationInput, UpdateServiceTypeInput,
};
pub use pay_period::{plan_periods, PayPeriod, PayPeriodStatus, PeriodGroup};
pub use pay_period_input::{
    CreatePayPeriodInput, GeneratePeriodsQuery, ListPayPeriodsQuery, UpdatePayPeriodInput,
};
pub use pto_entry::{PtoEntry, PtoType};
pub use pto_entry_input::{CreatePtoEntryInput, UpdatePtoEntryInput};
pub use time_entry::{TimeEntry, WorkMode};
pub use time_entry_input::{CreateTimeEntryInput, UpdateTimeEntryInput};
pub use timesheet::{Timesheet, TimesheetStatus};
pub use timesheet_input::{CreateTimesheetInput, ListTimesheetsQuery, RejectTimesheetInput};
