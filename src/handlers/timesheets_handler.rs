use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::unique_conflict,
    extractors::AuthenticatedEmployee,
    handlers::pay_periods_handler::resolve_current_period,
    models::{
        CreateTimesheetInput, Employee, ListTimesheetsQuery, PayPeriod, PtoEntry,
        RejectTimesheetInput, TimeEntry, Timesheet, TimesheetStatus,
    },
    AppError, AppResult, AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct TimesheetDetail {
    #[serde(flatten)]
    pub timesheet: Timesheet,
    pub time_entries: Vec<TimeEntry>,
    pub pto_entries: Vec<PtoEntry>,
}

fn period_range(period: &PayPeriod) -> String {
    format!("{} to {}", period.start_date, period.end_date)
}

async fn fetch_timesheet(db: &sqlx::PgPool, id: Uuid) -> AppResult<Timesheet> {
    sqlx::query_as::<_, Timesheet>("SELECT * FROM timesheets WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Timesheet not found".to_string()))
}

/// GET /api/timesheets?pay_period_id=&employee_id=&status=
///
/// Non-managers only ever see their own timesheets regardless of filters.
#[utoipa::path(
    get,
    path = "/api/timesheets",
    params(ListTimesheetsQuery),
    responses(
        (status = 200, description = "Timesheets visible to the caller", body = Vec<Timesheet>)
    ),
    tag = "timesheets",
    security(("bearer_auth" = []))
)]
pub async fn list_timesheets(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Query(query): Query<ListTimesheetsQuery>,
) -> AppResult<Json<Vec<Timesheet>>> {
    let mut sql = "SELECT * FROM timesheets WHERE 1=1".to_string();
    let mut uuid_bindings: Vec<Uuid> = vec![];

    if !auth.is_manager && !auth.is_admin {
        sql.push_str(&format!(" AND employee_id = ${}", uuid_bindings.len() + 1));
        uuid_bindings.push(auth.id);
    } else if let Some(employee_id) = query.employee_id {
        sql.push_str(&format!(" AND employee_id = ${}", uuid_bindings.len() + 1));
        uuid_bindings.push(employee_id);
    }

    if let Some(pay_period_id) = query.pay_period_id {
        sql.push_str(&format!(" AND pay_period_id = ${}", uuid_bindings.len() + 1));
        uuid_bindings.push(pay_period_id);
    }

    let status_position = uuid_bindings.len() + 1;
    if query.status.is_some() {
        sql.push_str(&format!(" AND status = ${}", status_position));
    }

    sql.push_str(" ORDER BY created_at DESC");

    let mut query_builder = sqlx::query_as::<_, Timesheet>(&sql);
    for binding in uuid_bindings {
        query_builder = query_builder.bind(binding);
    }
    if let Some(status) = &query.status {
        query_builder = query_builder.bind(status);
    }

    let timesheets = query_builder.fetch_all(&state.db).await?;

    Ok(Json(timesheets))
}

/// GET /api/timesheets/current
///
/// Resolves the caller's open pay period and returns their timesheet for
/// it, creating an empty draft on first access. Safe to call repeatedly:
/// the unique (employee, period) constraint plus ON CONFLICT DO NOTHING
/// make the create race-proof, so the same row is returned every time.
#[utoipa::path(
    get,
    path = "/api/timesheets/current",
    responses(
        (status = 200, description = "The caller's timesheet for the current period", body = Timesheet),
        (status = 404, description = "No open pay period for the caller's group")
    ),
    tag = "timesheets",
    security(("bearer_auth" = []))
)]
pub async fn get_current_timesheet(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
) -> AppResult<Json<Timesheet>> {
    let period = resolve_current_period(&state.db, &auth.pay_period_group).await?;

    let existing = sqlx::query_as::<_, Timesheet>(
        "SELECT * FROM timesheets WHERE employee_id = $1 AND pay_period_id = $2",
    )
    .bind(auth.id)
    .bind(period.id)
    .fetch_optional(&state.db)
    .await?;

    if let Some(timesheet) = existing {
        return Ok(Json(timesheet));
    }

    let created = sqlx::query_as::<_, Timesheet>(
        r#"
        INSERT INTO timesheets (employee_id, pay_period_id, status)
        VALUES ($1, $2, 'draft')
        ON CONFLICT (employee_id, pay_period_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(auth.id)
    .bind(period.id)
    .fetch_optional(&state.db)
    .await?;

    match created {
        Some(timesheet) => {
            tracing::info!(timesheet_id = %timesheet.id, employee_id = %auth.id, "Draft timesheet created");
            Ok(Json(timesheet))
        }
        // Lost a creation race; the row exists now
        None => {
            let timesheet = sqlx::query_as::<_, Timesheet>(
                "SELECT * FROM timesheets WHERE employee_id = $1 AND pay_period_id = $2",
            )
            .bind(auth.id)
            .bind(period.id)
            .fetch_one(&state.db)
            .await?;
            Ok(Json(timesheet))
        }
    }
}

/// GET /api/timesheets/{id} - owner, manager, or admin
#[utoipa::path(
    get,
    path = "/api/timesheets/{id}",
    params(("id" = Uuid, Path, description = "Timesheet id")),
    responses(
        (status = 200, description = "Timesheet with its entries", body = TimesheetDetail),
        (status = 403, description = "Not authorized to view this timesheet"),
        (status = 404, description = "Timesheet not found")
    ),
    tag = "timesheets",
    security(("bearer_auth" = []))
)]
pub async fn get_timesheet(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TimesheetDetail>> {
    let timesheet = fetch_timesheet(&state.db, id).await?;

    if !auth.can_view_timesheet_of(timesheet.employee_id) {
        return Err(AppError::Forbidden(
            "Not authorized to view this timesheet".to_string(),
        ));
    }

    let time_entries = sqlx::query_as::<_, TimeEntry>(
        "SELECT * FROM time_entries WHERE timesheet_id = $1 ORDER BY work_date, created_at",
    )
    .bind(id)
    .fetch_all(&state.db)
    .await?;

    let pto_entries = sqlx::query_as::<_, PtoEntry>(
        "SELECT * FROM pto_entries WHERE timesheet_id = $1 ORDER BY pto_date",
    )
    .bind(id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(TimesheetDetail {
        timesheet,
        time_entries,
        pto_entries,
    }))
}

/// POST /api/timesheets
///
/// Explicit creation; employees may only create their own, admins anyone's.
#[utoipa::path(
    post,
    path = "/api/timesheets",
    request_body = CreateTimesheetInput,
    responses(
        (status = 200, description = "Timesheet created in draft", body = Timesheet),
        (status = 403, description = "Cannot create a timesheet for another employee"),
        (status = 409, description = "Timesheet already exists for this employee and period")
    ),
    tag = "timesheets",
    security(("bearer_auth" = []))
)]
pub async fn create_timesheet(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Json(input): Json<CreateTimesheetInput>,
) -> AppResult<Json<Timesheet>> {
    if input.employee_id != auth.id && !auth.is_admin {
        return Err(AppError::Forbidden(
            "Cannot create a timesheet for another employee".to_string(),
        ));
    }

    let timesheet = sqlx::query_as::<_, Timesheet>(
        r#"
        INSERT INTO timesheets (employee_id, pay_period_id, status)
        VALUES ($1, $2, 'draft')
        RETURNING *
        "#,
    )
    .bind(input.employee_id)
    .bind(input.pay_period_id)
    .fetch_one(&state.db)
    .await
    .map_err(|e| unique_conflict(e, "Timesheet already exists for this employee and pay period"))?;

    Ok(Json(timesheet))
}

/// POST /api/timesheets/{id}/submit
///
/// `draft -> submitted`, owner only. The status precondition is part of the
/// UPDATE's WHERE clause, so of two concurrent submits exactly one wins and
/// the other reports a conflict.
#[utoipa::path(
    post,
    path = "/api/timesheets/{id}/submit",
    params(("id" = Uuid, Path, description = "Timesheet id")),
    responses(
        (status = 200, description = "Timesheet submitted", body = Timesheet),
        (status = 403, description = "Can only submit your own timesheet"),
        (status = 404, description = "Timesheet not found"),
        (status = 409, description = "Timesheet is not in draft")
    ),
    tag = "timesheets",
    security(("bearer_auth" = []))
)]
pub async fn submit_timesheet(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Timesheet>> {
    let timesheet = fetch_timesheet(&state.db, id).await?;

    if timesheet.employee_id != auth.id {
        return Err(AppError::Forbidden(
            "Can only submit your own timesheet".to_string(),
        ));
    }

    let updated = sqlx::query_as::<_, Timesheet>(
        r#"
        UPDATE timesheets
        SET status = $1, submitted_at = $2, updated_at = now()
        WHERE id = $3 AND status = $4
        RETURNING *
        "#,
    )
    .bind(TimesheetStatus::Submitted.as_str())
    .bind(Utc::now())
    .bind(id)
    .bind(TimesheetStatus::Draft.as_str())
    .fetch_optional(&state.db)
    .await?;

    let updated = match updated {
        Some(t) => t,
        None => {
            let current = fetch_timesheet(&state.db, id).await?;
            return Err(AppError::Conflict(format!(
                "Cannot submit timesheet with status '{}'",
                current.status
            )));
        }
    };

    // Total hours feed the manager notification only
    let total_hours = sqlx::query_scalar::<_, Decimal>(
        "SELECT COALESCE(SUM(hours), 0) FROM time_entries WHERE timesheet_id = $1",
    )
    .bind(id)
    .fetch_one(&state.db)
    .await?;

    let period = sqlx::query_as::<_, PayPeriod>("SELECT * FROM pay_periods WHERE id = $1")
        .bind(updated.pay_period_id)
        .fetch_one(&state.db)
        .await?;

    let managers = sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees WHERE is_manager = TRUE AND is_active = TRUE",
    )
    .fetch_all(&state.db)
    .await?;

    let range = period_range(&period);
    for manager in managers {
        state.notifier.timesheet_submitted(
            manager.email.clone(),
            manager.full_name(),
            &auth.full_name(),
            &range,
            total_hours,
        );
    }

    tracing::info!(timesheet_id = %id, employee_id = %auth.id, %total_hours, "Timesheet submitted");

    Ok(Json(updated))
}

/// POST /api/timesheets/{id}/approve
///
/// `submitted -> approved`, manager/admin only. Terminal.
#[utoipa::path(
    post,
    path = "/api/timesheets/{id}/approve",
    params(("id" = Uuid, Path, description = "Timesheet id")),
    responses(
        (status = 200, description = "Timesheet approved", body = Timesheet),
        (status = 403, description = "Manager privileges required"),
        (status = 404, description = "Timesheet not found"),
        (status = 409, description = "Timesheet is not submitted")
    ),
    tag = "timesheets",
    security(("bearer_auth" = []))
)]
pub async fn approve_timesheet(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Timesheet>> {
    auth.require_manager()?;

    let timesheet = fetch_timesheet(&state.db, id).await?;

    let updated = sqlx::query_as::<_, Timesheet>(
        r#"
        UPDATE timesheets
        SET status = $1, approved_at = $2, approved_by = $3,
            rejection_reason = NULL, updated_at = now()
        WHERE id = $4 AND status = $5
        RETURNING *
        "#,
    )
    .bind(TimesheetStatus::Approved.as_str())
    .bind(Utc::now())
    .bind(auth.id)
    .bind(id)
    .bind(TimesheetStatus::Submitted.as_str())
    .fetch_optional(&state.db)
    .await?;

    let updated = match updated {
        Some(t) => t,
        None => {
            let current = fetch_timesheet(&state.db, id).await?;
            return Err(AppError::Conflict(format!(
                "Cannot approve timesheet with status '{}'",
                current.status
            )));
        }
    };

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
        .bind(timesheet.employee_id)
        .fetch_one(&state.db)
        .await?;

    let period = sqlx::query_as::<_, PayPeriod>("SELECT * FROM pay_periods WHERE id = $1")
        .bind(updated.pay_period_id)
        .fetch_one(&state.db)
        .await?;

    state.notifier.timesheet_approved(
        employee.email.clone(),
        &employee.full_name(),
        &period_range(&period),
        &auth.full_name(),
    );

    tracing::info!(timesheet_id = %id, approved_by = %auth.id, "Timesheet approved");

    Ok(Json(updated))
}

/// POST /api/timesheets/{id}/reject
///
/// `submitted -> rejected`, manager/admin only, reason required. The
/// timesheet becomes editable again; the next entry mutation reopens it
/// to draft.
#[utoipa::path(
    post,
    path = "/api/timesheets/{id}/reject",
    params(("id" = Uuid, Path, description = "Timesheet id")),
    request_body = RejectTimesheetInput,
    responses(
        (status = 200, description = "Timesheet rejected", body = Timesheet),
        (status = 403, description = "Manager privileges required"),
        (status = 404, description = "Timesheet not found"),
        (status = 409, description = "Timesheet is not submitted"),
        (status = 422, description = "Missing rejection reason")
    ),
    tag = "timesheets",
    security(("bearer_auth" = []))
)]
pub async fn reject_timesheet(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
    Json(input): Json<RejectTimesheetInput>,
) -> AppResult<Json<Timesheet>> {
    auth.require_manager()?;
    input.validate()?;

    let timesheet = fetch_timesheet(&state.db, id).await?;

    let updated = sqlx::query_as::<_, Timesheet>(
        r#"
        UPDATE timesheets
        SET status = $1, rejection_reason = $2, approved_by = $3, updated_at = now()
        WHERE id = $4 AND status = $5
        RETURNING *
        "#,
    )
    .bind(TimesheetStatus::Rejected.as_str())
    .bind(&input.reason)
    .bind(auth.id)
    .bind(id)
    .bind(TimesheetStatus::Submitted.as_str())
    .fetch_optional(&state.db)
    .await?;

    let updated = match updated {
        Some(t) => t,
        None => {
            let current = fetch_timesheet(&state.db, id).await?;
            return Err(AppError::Conflict(format!(
                "Cannot reject timesheet with status '{}'",
                current.status
            )));
        }
    };

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
        .bind(timesheet.employee_id)
        .fetch_one(&state.db)
        .await?;

    let period = sqlx::query_as::<_, PayPeriod>("SELECT * FROM pay_periods WHERE id = $1")
        .bind(updated.pay_period_id)
        .fetch_one(&state.db)
        .await?;

    state.notifier.timesheet_rejected(
        employee.email.clone(),
        &employee.full_name(),
        &period_range(&period),
        &auth.full_name(),
        &input.reason,
    );

    tracing::info!(timesheet_id = %id, rejected_by = %auth.id, "Timesheet rejected");

    Ok(Json(updated))
}
