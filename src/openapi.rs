use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::Modify;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MyHours API",
        version = "1.0.0",
        description = "Backend API for the MyHours timesheet and payroll system",
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // Health
        crate::handlers::health::health_check,

        // Auth
        crate::handlers::auth_handler::login,
        crate::handlers::auth_handler::get_me,
        crate::handlers::auth_handler::change_password,
        crate::handlers::auth_handler::request_password_reset,
        crate::handlers::auth_handler::reset_password,

        // Employees
        crate::handlers::employees_handler::list_employees,
        crate::handlers::employees_handler::get_employee,
        crate::handlers::employees_handler::create_employee,
        crate::handlers::employees_handler::update_employee,
        crate::handlers::employees_handler::deactivate_employee,

        // Pay periods
        crate::handlers::pay_periods_handler::list_pay_periods,
        crate::handlers::pay_periods_handler::get_current_pay_period,
        crate::handlers::pay_periods_handler::get_pay_period,
        crate::handlers::pay_periods_handler::create_pay_period,
        crate::handlers::pay_periods_handler::generate_pay_periods,
        crate::handlers::pay_periods_handler::update_pay_period,
        crate::handlers::pay_periods_handler::close_pay_period,

        // Timesheets
        crate::handlers::timesheets_handler::list_timesheets,
        crate::handlers::timesheets_handler::get_current_timesheet,
        crate::handlers::timesheets_handler::get_timesheet,
        crate::handlers::timesheets_handler::create_timesheet,
        crate::handlers::timesheets_handler::submit_timesheet,
        crate::handlers::timesheets_handler::approve_timesheet,
        crate::handlers::timesheets_handler::reject_timesheet,

        // Entries
        crate::handlers::entries_handler::list_time_entries,
        crate::handlers::entries_handler::create_time_entry,
        crate::handlers::entries_handler::update_time_entry,
        crate::handlers::entries_handler::delete_time_entry,
        crate::handlers::entries_handler::list_pto_entries,
        crate::handlers::entries_handler::create_pto_entry,
        crate::handlers::entries_handler::update_pto_entry,
        crate::handlers::entries_handler::delete_pto_entry,

        // Lookups
        crate::handlers::lookups_handler::list_clients,
        crate::handlers::lookups_handler::create_client,
        crate::handlers::lookups_handler::update_client,
        crate::handlers::lookups_handler::deactivate_client,
        crate::handlers::lookups_handler::list_locations,
        crate::handlers::lookups_handler::create_location,
        crate::handlers::lookups_handler::update_location,
        crate::handlers::lookups_handler::deactivate_location,
        crate::handlers::lookups_handler::list_job_codes,
        crate::handlers::lookups_handler::create_job_code,
        crate::handlers::lookups_handler::update_job_code,
        crate::handlers::lookups_handler::deactivate_job_code,
        crate::handlers::lookups_handler::list_service_types,
        crate::handlers::lookups_handler::create_service_type,
        crate::handlers::lookups_handler::update_service_type,
        crate::handlers::lookups_handler::deactivate_service_type,

        // Reports
        crate::handlers::reports_handler::payroll_report,
        crate::handlers::reports_handler::billing_report,
        crate::handlers::reports_handler::hours_by_employee,
        crate::handlers::reports_handler::hours_by_job_code,
    ),
    components(
        schemas(
            // Core models
            crate::models::EmployeeResponse,
            crate::models::PayPeriod,
            crate::models::Timesheet,
            crate::models::TimeEntry,
            crate::models::PtoEntry,
            crate::models::Client,
            crate::models::Location,
            crate::models::JobCode,
            crate::models::ServiceType,
            crate::models::WorkMode,
            crate::models::PtoType,

            // Input models
            crate::models::LoginInput,
            crate::models::TokenResponse,
            crate::models::ChangePasswordInput,
            crate::models::RequestResetInput,
            crate::models::ResetPasswordInput,
            crate::models::MessageResponse,
            crate::models::CreateEmployeeInput,
            crate::models::UpdateEmployeeInput,
            crate::models::CreatePayPeriodInput,
            crate::models::UpdatePayPeriodInput,
            crate::models::CreateTimesheetInput,
            crate::models::RejectTimesheetInput,
            crate::models::CreateTimeEntryInput,
            crate::models::UpdateTimeEntryInput,
            crate::models::CreatePtoEntryInput,
            crate::models::UpdatePtoEntryInput,
            crate::models::CreateClientInput,
            crate::models::UpdateClientInput,
            crate::models::CreateLocationInput,
            crate::models::UpdateLocationInput,
            crate::models::CreateJobCodeInput,
            crate::models::UpdateJobCodeInput,
            crate::models::CreateServiceTypeInput,
            crate::models::UpdateServiceTypeInput,

            // Handler-local types
            crate::handlers::timesheets_handler::TimesheetDetail,
            crate::handlers::reports_handler::PayrollReport,
            crate::handlers::reports_handler::PayrollReportLine,
            crate::handlers::reports_handler::BillingReport,
            crate::handlers::reports_handler::BillingReportLine,
            crate::handlers::reports_handler::BillingClientSummary,
            crate::handlers::reports_handler::EmployeeHoursSummary,
            crate::handlers::reports_handler::JobCodeHoursSummary,
            crate::handlers::reports_handler::ReportFormat,
        )
    ),
    tags(
        (name = "health", description = "Health check"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "employees", description = "Employee management"),
        (name = "pay-periods", description = "Bi-weekly pay period management"),
        (name = "timesheets", description = "Timesheet lifecycle"),
        (name = "entries", description = "Time and PTO entries"),
        (name = "lookups", description = "Clients, locations, job codes and service types"),
        (name = "reports", description = "Payroll reporting"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
