use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    extractors::AuthenticatedEmployee,
    models::{PayPeriod, PtoType},
    AppError, AppResult, AppState,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Csv,
}

impl Default for ReportFormat {
    fn default() -> Self {
        ReportFormat::Json
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct PayrollReportQuery {
    pub pay_period_id: Uuid,
    #[serde(default)]
    #[param(inline)]
    pub format: ReportFormat,
}

/// Filters shared by the billing and hours reports: optional client and
/// an optional inclusive work-date window.
#[derive(Debug, Deserialize, IntoParams)]
pub struct BillingReportQuery {
    pub client_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    #[param(inline)]
    pub format: ReportFormat,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HoursReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    #[param(inline)]
    pub format: ReportFormat,
}

/// One employee's totals for the period. Only approved timesheets feed
/// the report; drafts and submissions in flight are invisible to payroll.
#[derive(Debug, Serialize, ToSchema)]
pub struct PayrollReportLine {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub email: String,
    pub hourly_rate: Option<Decimal>,
    pub regular_hours: Decimal,
    pub overtime_hours: Decimal,
    pub pto_personal_hours: Decimal,
    pub pto_sick_hours: Decimal,
    pub pto_holiday_hours: Decimal,
    pub pto_other_hours: Decimal,
    pub total_hours: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PayrollReport {
    pub pay_period: PayPeriod,
    pub generated_at: DateTime<Utc>,
    pub lines: Vec<PayrollReportLine>,
}

#[derive(Debug, FromRow)]
struct EmployeeHoursRow {
    employee_id: Uuid,
    first_name: String,
    last_name: String,
    email: String,
    hourly_rate: Option<Decimal>,
    timesheet_id: Uuid,
    regular_hours: Decimal,
    overtime_hours: Decimal,
}

#[derive(Debug, FromRow)]
struct PtoHoursRow {
    timesheet_id: Uuid,
    pto_type: String,
    hours: Decimal,
}

/// One billable entry on an approved timesheet, denormalized for invoicing.
/// Unassigned references render as "Unassigned"/"General"/"N/A" so the CSV
/// has no holes.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct BillingReportLine {
    pub work_date: NaiveDate,
    pub client: String,
    pub employee_name: String,
    pub service_type: String,
    pub hours: Decimal,
    pub work_mode: String,
    pub description: String,
    pub is_overtime: bool,
}

#[derive(Debug, Default, Clone, Serialize, ToSchema)]
pub struct BillingClientSummary {
    pub total_hours: Decimal,
    pub overtime_hours: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BillingReport {
    pub generated_at: DateTime<Utc>,
    pub summary: BTreeMap<String, BillingClientSummary>,
    pub lines: Vec<BillingReportLine>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct EmployeeHoursSummary {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub email: String,
    pub total_hours: Decimal,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct JobCodeHoursSummary {
    pub client: String,
    pub service_type: String,
    pub job_code: String,
    pub total_hours: Decimal,
}

/// GET /api/reports/payroll?pay_period_id=&format=
#[utoipa::path(
    get,
    path = "/api/reports/payroll",
    params(PayrollReportQuery),
    responses(
        (status = 200, description = "Payroll totals for approved timesheets, JSON or CSV", body = PayrollReport),
        (status = 403, description = "Manager privileges required"),
        (status = 404, description = "Pay period not found")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn payroll_report(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Query(query): Query<PayrollReportQuery>,
) -> AppResult<Response> {
    auth.require_manager()?;

    let period = sqlx::query_as::<_, PayPeriod>("SELECT * FROM pay_periods WHERE id = $1")
        .bind(query.pay_period_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Pay period not found".to_string()))?;

    let hours_rows = sqlx::query_as::<_, EmployeeHoursRow>(
        r#"
        SELECT
            e.id AS employee_id,
            e.first_name,
            e.last_name,
            e.email,
            e.hourly_rate,
            t.id AS timesheet_id,
            COALESCE(SUM(te.hours) FILTER (WHERE NOT te.is_overtime), 0) AS regular_hours,
            COALESCE(SUM(te.hours) FILTER (WHERE te.is_overtime), 0) AS overtime_hours
        FROM timesheets t
        JOIN employees e ON e.id = t.employee_id
        LEFT JOIN time_entries te ON te.timesheet_id = t.id
        WHERE t.pay_period_id = $1 AND t.status = 'approved'
        GROUP BY e.id, e.first_name, e.last_name, e.email, e.hourly_rate, t.id
        ORDER BY e.last_name, e.first_name
        "#,
    )
    .bind(query.pay_period_id)
    .fetch_all(&state.db)
    .await?;

    let pto_rows = sqlx::query_as::<_, PtoHoursRow>(
        r#"
        SELECT t.id AS timesheet_id, pe.pto_type, COALESCE(SUM(pe.hours), 0) AS hours
        FROM timesheets t
        JOIN pto_entries pe ON pe.timesheet_id = t.id
        WHERE t.pay_period_id = $1 AND t.status = 'approved'
        GROUP BY t.id, pe.pto_type
        "#,
    )
    .bind(query.pay_period_id)
    .fetch_all(&state.db)
    .await?;

    let mut pto_by_timesheet: HashMap<Uuid, HashMap<String, Decimal>> = HashMap::new();
    for row in pto_rows {
        pto_by_timesheet
            .entry(row.timesheet_id)
            .or_default()
            .insert(row.pto_type, row.hours);
    }

    let lines: Vec<PayrollReportLine> = hours_rows
        .into_iter()
        .map(|row| {
            let pto = pto_by_timesheet.remove(&row.timesheet_id).unwrap_or_default();
            let pto_hours =
                |t: PtoType| pto.get(t.as_str()).copied().unwrap_or(Decimal::ZERO);

            let pto_personal_hours = pto_hours(PtoType::Personal);
            let pto_sick_hours = pto_hours(PtoType::Sick);
            let pto_holiday_hours = pto_hours(PtoType::Holiday);
            let pto_other_hours = pto_hours(PtoType::Other);
            let total_hours = row.regular_hours
                + row.overtime_hours
                + pto_personal_hours
                + pto_sick_hours
                + pto_holiday_hours
                + pto_other_hours;

            PayrollReportLine {
                employee_id: row.employee_id,
                employee_name: format!("{} {}", row.first_name, row.last_name),
                email: row.email,
                hourly_rate: row.hourly_rate,
                regular_hours: row.regular_hours,
                overtime_hours: row.overtime_hours,
                pto_personal_hours,
                pto_sick_hours,
                pto_holiday_hours,
                pto_other_hours,
                total_hours,
            }
        })
        .collect();

    tracing::info!(
        pay_period_id = %query.pay_period_id,
        employees = lines.len(),
        "Payroll report generated"
    );

    match query.format {
        ReportFormat::Json => {
            let report = PayrollReport {
                pay_period: period,
                generated_at: Utc::now(),
                lines,
            };
            Ok(Json(report).into_response())
        }
        ReportFormat::Csv => {
            let filename = format!(
                "payroll_{}_{}.csv",
                period.period_group, period.start_date
            );
            Ok(csv_response(&filename, render_csv(&lines)?))
        }
    }
}

/// GET /api/reports/billing?client_id=&start_date=&end_date=&format=
///
/// Invoicing detail: billable entries on approved timesheets, one row per
/// entry, with a per-client hours summary in the JSON body.
#[utoipa::path(
    get,
    path = "/api/reports/billing",
    params(BillingReportQuery),
    responses(
        (status = 200, description = "Billable hours by client, JSON or CSV", body = BillingReport),
        (status = 403, description = "Manager privileges required")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn billing_report(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Query(query): Query<BillingReportQuery>,
) -> AppResult<Response> {
    auth.require_manager()?;

    let mut sql = r#"
        SELECT
            te.work_date,
            COALESCE(c.name, 'Unassigned') AS client,
            e.first_name || ' ' || e.last_name AS employee_name,
            COALESCE(st.name, 'General') AS service_type,
            te.hours,
            te.work_mode,
            COALESCE(te.description, '') AS description,
            te.is_overtime
        FROM time_entries te
        JOIN timesheets t ON t.id = te.timesheet_id
        JOIN employees e ON e.id = t.employee_id
        LEFT JOIN clients c ON c.id = te.client_id
        LEFT JOIN service_types st ON st.id = te.service_type_id
        WHERE t.status = 'approved' AND te.is_billable = TRUE
        "#
    .to_string();

    let mut bind_count = 0;
    if query.client_id.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND te.client_id = ${}", bind_count));
    }
    if query.start_date.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND te.work_date >= ${}", bind_count));
    }
    if query.end_date.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND te.work_date <= ${}", bind_count));
    }
    sql.push_str(" ORDER BY te.work_date, client, employee_name");

    let mut query_builder = sqlx::query_as::<_, BillingReportLine>(&sql);
    if let Some(client_id) = query.client_id {
        query_builder = query_builder.bind(client_id);
    }
    if let Some(start_date) = query.start_date {
        query_builder = query_builder.bind(start_date);
    }
    if let Some(end_date) = query.end_date {
        query_builder = query_builder.bind(end_date);
    }

    let lines = query_builder.fetch_all(&state.db).await?;

    tracing::info!(entries = lines.len(), "Billing report generated");

    match query.format {
        ReportFormat::Json => {
            let report = BillingReport {
                generated_at: Utc::now(),
                summary: summarize_by_client(&lines),
                lines,
            };
            Ok(Json(report).into_response())
        }
        ReportFormat::Csv => Ok(csv_response("billing_report.csv", render_csv(&lines)?)),
    }
}

/// GET /api/reports/hours-by-employee?start_date=&end_date=&format=
#[utoipa::path(
    get,
    path = "/api/reports/hours-by-employee",
    params(HoursReportQuery),
    responses(
        (status = 200, description = "Total approved hours per employee", body = Vec<EmployeeHoursSummary>),
        (status = 403, description = "Manager privileges required")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn hours_by_employee(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Query(query): Query<HoursReportQuery>,
) -> AppResult<Response> {
    auth.require_manager()?;

    let mut sql = r#"
        SELECT
            e.id AS employee_id,
            e.first_name || ' ' || e.last_name AS employee_name,
            e.email,
            COALESCE(SUM(te.hours), 0) AS total_hours
        FROM employees e
        JOIN timesheets t ON t.employee_id = e.id
        JOIN time_entries te ON te.timesheet_id = t.id
        WHERE t.status = 'approved'
        "#
    .to_string();

    let mut bind_count = 0;
    if query.start_date.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND te.work_date >= ${}", bind_count));
    }
    if query.end_date.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND te.work_date <= ${}", bind_count));
    }
    sql.push_str(
        " GROUP BY e.id, e.first_name, e.last_name, e.email ORDER BY e.last_name, e.first_name",
    );

    let mut query_builder = sqlx::query_as::<_, EmployeeHoursSummary>(&sql);
    if let Some(start_date) = query.start_date {
        query_builder = query_builder.bind(start_date);
    }
    if let Some(end_date) = query.end_date {
        query_builder = query_builder.bind(end_date);
    }

    let rows = query_builder.fetch_all(&state.db).await?;

    match query.format {
        ReportFormat::Json => Ok(Json(rows).into_response()),
        ReportFormat::Csv => Ok(csv_response("hours_by_employee.csv", render_csv(&rows)?)),
    }
}

/// GET /api/reports/hours-by-job-code?start_date=&end_date=&format=
#[utoipa::path(
    get,
    path = "/api/reports/hours-by-job-code",
    params(HoursReportQuery),
    responses(
        (status = 200, description = "Approved hours grouped by client, service type and job code", body = Vec<JobCodeHoursSummary>),
        (status = 403, description = "Manager privileges required")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn hours_by_job_code(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Query(query): Query<HoursReportQuery>,
) -> AppResult<Response> {
    auth.require_manager()?;

    let mut sql = r#"
        SELECT
            COALESCE(c.name, 'Unassigned') AS client,
            COALESCE(st.name, 'General') AS service_type,
            COALESCE(jc.code, 'N/A') AS job_code,
            COALESCE(SUM(te.hours), 0) AS total_hours
        FROM time_entries te
        JOIN timesheets t ON t.id = te.timesheet_id
        LEFT JOIN clients c ON c.id = te.client_id
        LEFT JOIN service_types st ON st.id = te.service_type_id
        LEFT JOIN job_codes jc ON jc.id = te.job_code_id
        WHERE t.status = 'approved'
        "#
    .to_string();

    let mut bind_count = 0;
    if query.start_date.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND te.work_date >= ${}", bind_count));
    }
    if query.end_date.is_some() {
        bind_count += 1;
        sql.push_str(&format!(" AND te.work_date <= ${}", bind_count));
    }
    sql.push_str(
        r#" GROUP BY COALESCE(c.name, 'Unassigned'),
                     COALESCE(st.name, 'General'),
                     COALESCE(jc.code, 'N/A')
            ORDER BY client, service_type, job_code"#,
    );

    let mut query_builder = sqlx::query_as::<_, JobCodeHoursSummary>(&sql);
    if let Some(start_date) = query.start_date {
        query_builder = query_builder.bind(start_date);
    }
    if let Some(end_date) = query.end_date {
        query_builder = query_builder.bind(end_date);
    }

    let rows = query_builder.fetch_all(&state.db).await?;

    match query.format {
        ReportFormat::Json => Ok(Json(rows).into_response()),
        ReportFormat::Csv => Ok(csv_response("hours_by_job_code.csv", render_csv(&rows)?)),
    }
}

/// Per-client totals for the billing summary, ordered by client name.
fn summarize_by_client(
    lines: &[BillingReportLine],
) -> BTreeMap<String, BillingClientSummary> {
    let mut summary: BTreeMap<String, BillingClientSummary> = BTreeMap::new();
    for line in lines {
        let entry = summary.entry(line.client.clone()).or_default();
        entry.total_hours += line.hours;
        if line.is_overtime {
            entry.overtime_hours += line.hours;
        }
    }
    summary
}

fn render_csv<T: Serialize>(rows: &[T]) -> AppResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::Internal(format!("CSV serialization failed: {}", e)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Internal(format!("CSV serialization failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AppError::Internal(format!("CSV output not UTF-8: {}", e)))
}

fn csv_response(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(regular: i64, overtime: i64) -> PayrollReportLine {
        PayrollReportLine {
            employee_id: Uuid::nil(),
            employee_name: "Dana Reyes".to_string(),
            email: "dana@example.com".to_string(),
            hourly_rate: Some(Decimal::new(3250, 2)),
            regular_hours: Decimal::from(regular),
            overtime_hours: Decimal::from(overtime),
            pto_personal_hours: Decimal::ZERO,
            pto_sick_hours: Decimal::from(8),
            pto_holiday_hours: Decimal::ZERO,
            pto_other_hours: Decimal::ZERO,
            total_hours: Decimal::from(regular + overtime + 8),
        }
    }

    fn billing_line(client: &str, hours: i64, is_overtime: bool) -> BillingReportLine {
        BillingReportLine {
            work_date: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            client: client.to_string(),
            employee_name: "Dana Reyes".to_string(),
            service_type: "Consulting".to_string(),
            hours: Decimal::from(hours),
            work_mode: "remote".to_string(),
            description: String::new(),
            is_overtime,
        }
    }

    #[test]
    fn test_csv_has_header_and_one_row_per_line() {
        let csv = render_csv(&[line(72, 4), line(80, 0)]).unwrap();
        let rows: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].starts_with("employee_id,employee_name,email"));
        assert!(rows[1].contains("Dana Reyes"));
        assert!(rows[1].contains("72"));
    }

    #[test]
    fn test_empty_report_renders_no_rows() {
        let csv = render_csv::<PayrollReportLine>(&[]).unwrap();
        assert!(csv.trim_end().is_empty());
    }

    #[test]
    fn test_format_defaults_to_json() {
        assert_eq!(ReportFormat::default(), ReportFormat::Json);
    }

    #[test]
    fn test_billing_summary_totals_per_client() {
        let lines = vec![
            billing_line("Acme", 6, false),
            billing_line("Acme", 2, true),
            billing_line("Globex", 8, false),
        ];

        let summary = summarize_by_client(&lines);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary["Acme"].total_hours, Decimal::from(8));
        assert_eq!(summary["Acme"].overtime_hours, Decimal::from(2));
        assert_eq!(summary["Globex"].total_hours, Decimal::from(8));
        assert_eq!(summary["Globex"].overtime_hours, Decimal::ZERO);
    }

    #[test]
    fn test_billing_summary_is_ordered_by_client() {
        let lines = vec![
            billing_line("Globex", 8, false),
            billing_line("Acme", 4, false),
        ];

        let summary = summarize_by_client(&lines);
        let clients: Vec<&String> = summary.keys().collect::<Vec<_>>();
        assert_eq!(clients, vec!["Acme", "Globex"]);
    }

    #[test]
    fn test_billing_csv_keeps_entry_detail() {
        let csv = render_csv(&[billing_line("Acme", 6, false)]).unwrap();
        let rows: Vec<&str> = csv.trim_end().lines().collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].starts_with("work_date,client,employee_name,service_type"));
        assert!(rows[1].contains("Acme"));
        assert!(rows[1].contains("Consulting"));
    }
}
