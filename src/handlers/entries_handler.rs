use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    extractors::AuthenticatedEmployee,
    models::{
        CreatePtoEntryInput, CreateTimeEntryInput, MessageResponse, PayPeriod, PtoEntry, TimeEntry,
        Timesheet, TimesheetStatus, UpdatePtoEntryInput, UpdateTimeEntryInput,
    },
    AppError, AppResult, AppState,
};

/// Locks the timesheet row and returns it with its pay period, after the
/// full mutation gate: the timesheet exists, the caller owns it, and its
/// status is draft or rejected. Holding the row lock until commit means a
/// concurrent submit cannot slip between the check and the write.
async fn lock_editable_timesheet(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    timesheet_id: Uuid,
    caller: &AuthenticatedEmployee,
) -> AppResult<(Timesheet, PayPeriod)> {
    let timesheet =
        sqlx::query_as::<_, Timesheet>("SELECT * FROM timesheets WHERE id = $1 FOR UPDATE")
            .bind(timesheet_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Timesheet not found".to_string()))?;

    if timesheet.employee_id != caller.id {
        return Err(AppError::Forbidden(
            "Can only modify entries on your own timesheet".to_string(),
        ));
    }

    let status = TimesheetStatus::parse(&timesheet.status).ok_or_else(|| {
        AppError::Internal(format!("Unknown timesheet status '{}'", timesheet.status))
    })?;
    if !status.is_editable() {
        return Err(AppError::Conflict(format!(
            "Cannot modify entries on a timesheet with status '{}'",
            timesheet.status
        )));
    }

    let period = sqlx::query_as::<_, PayPeriod>("SELECT * FROM pay_periods WHERE id = $1")
        .bind(timesheet.pay_period_id)
        .fetch_one(&mut **tx)
        .await?;

    Ok((timesheet, period))
}

/// An entry mutation on a rejected timesheet reopens it to draft and
/// clears the rejection reason, inside the same transaction.
async fn reopen_if_rejected(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    timesheet: &Timesheet,
) -> AppResult<()> {
    let status = TimesheetStatus::parse(&timesheet.status);
    if status.is_some_and(|s| s.reopens_on_edit()) {
        sqlx::query(
            "UPDATE timesheets SET status = $1, rejection_reason = NULL, updated_at = now() WHERE id = $2",
        )
        .bind(TimesheetStatus::Draft.as_str())
        .bind(timesheet.id)
        .execute(&mut **tx)
        .await?;
        tracing::info!(timesheet_id = %timesheet.id, "Rejected timesheet reopened to draft");
    }
    Ok(())
}

fn check_read_access(caller: &AuthenticatedEmployee, timesheet: &Timesheet) -> AppResult<()> {
    if !caller.can_view_timesheet_of(timesheet.employee_id) {
        return Err(AppError::Forbidden(
            "Not authorized to view this timesheet".to_string(),
        ));
    }
    Ok(())
}

async fn fetch_timesheet(db: &sqlx::PgPool, id: Uuid) -> AppResult<Timesheet> {
    sqlx::query_as::<_, Timesheet>("SELECT * FROM timesheets WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Timesheet not found".to_string()))
}

/// GET /api/timesheets/{id}/entries
#[utoipa::path(
    get,
    path = "/api/timesheets/{id}/entries",
    params(("id" = Uuid, Path, description = "Timesheet id")),
    responses(
        (status = 200, description = "Time entries ordered by work date", body = Vec<TimeEntry>),
        (status = 403, description = "Not authorized to view this timesheet"),
        (status = 404, description = "Timesheet not found")
    ),
    tag = "entries",
    security(("bearer_auth" = []))
)]
pub async fn list_time_entries(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<TimeEntry>>> {
    let timesheet = fetch_timesheet(&state.db, id).await?;
    check_read_access(&auth, &timesheet)?;

    let entries = sqlx::query_as::<_, TimeEntry>(
        "SELECT * FROM time_entries WHERE timesheet_id = $1 ORDER BY work_date, created_at",
    )
    .bind(id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

/// POST /api/timesheets/{id}/entries
#[utoipa::path(
    post,
    path = "/api/timesheets/{id}/entries",
    params(("id" = Uuid, Path, description = "Timesheet id")),
    request_body = CreateTimeEntryInput,
    responses(
        (status = 200, description = "Time entry created", body = TimeEntry),
        (status = 403, description = "Not the timesheet owner"),
        (status = 404, description = "Timesheet not found"),
        (status = 409, description = "Timesheet is not editable"),
        (status = 422, description = "Invalid field value")
    ),
    tag = "entries",
    security(("bearer_auth" = []))
)]
pub async fn create_time_entry(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
    Json(input): Json<CreateTimeEntryInput>,
) -> AppResult<Json<TimeEntry>> {
    let mut tx = state.db.begin().await?;

    let (timesheet, period) = lock_editable_timesheet(&mut tx, id, &auth).await?;
    input.validate(period.start_date, period.end_date)?;

    let entry = sqlx::query_as::<_, TimeEntry>(
        r#"
        INSERT INTO time_entries (
            timesheet_id, work_date, client_id, location_id, job_code_id,
            service_type_id, work_mode, hours, start_time, end_time,
            description, is_billable, is_overtime, vehicle_reimbursement_tier
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.work_date)
    .bind(input.client_id)
    .bind(input.location_id)
    .bind(input.job_code_id)
    .bind(input.service_type_id)
    .bind(&input.work_mode)
    .bind(input.hours)
    .bind(input.start_time)
    .bind(input.end_time)
    .bind(&input.description)
    .bind(input.is_billable)
    .bind(input.is_overtime)
    .bind(&input.vehicle_reimbursement_tier)
    .fetch_one(&mut *tx)
    .await?;

    reopen_if_rejected(&mut tx, &timesheet).await?;
    tx.commit().await?;

    Ok(Json(entry))
}

/// PATCH /api/timesheets/{id}/entries/{entry_id}
#[utoipa::path(
    patch,
    path = "/api/timesheets/{id}/entries/{entry_id}",
    params(
        ("id" = Uuid, Path, description = "Timesheet id"),
        ("entry_id" = Uuid, Path, description = "Time entry id")
    ),
    request_body = UpdateTimeEntryInput,
    responses(
        (status = 200, description = "Time entry updated", body = TimeEntry),
        (status = 403, description = "Not the timesheet owner"),
        (status = 404, description = "Timesheet or entry not found"),
        (status = 409, description = "Timesheet is not editable"),
        (status = 422, description = "Invalid field value")
    ),
    tag = "entries",
    security(("bearer_auth" = []))
)]
pub async fn update_time_entry(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path((id, entry_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdateTimeEntryInput>,
) -> AppResult<Json<TimeEntry>> {
    let mut tx = state.db.begin().await?;

    let (timesheet, period) = lock_editable_timesheet(&mut tx, id, &auth).await?;
    input.validate(period.start_date, period.end_date)?;

    let mut updates = vec![];
    let mut bind_count = 1;

    if input.work_date.is_some() {
        updates.push(format!("work_date = ${}", bind_count));
        bind_count += 1;
    }
    if input.client_id.is_some() {
        updates.push(format!("client_id = ${}", bind_count));
        bind_count += 1;
    }
    if input.location_id.is_some() {
        updates.push(format!("location_id = ${}", bind_count));
        bind_count += 1;
    }
    if input.job_code_id.is_some() {
        updates.push(format!("job_code_id = ${}", bind_count));
        bind_count += 1;
    }
    if input.service_type_id.is_some() {
        updates.push(format!("service_type_id = ${}", bind_count));
        bind_count += 1;
    }
    if input.work_mode.is_some() {
        updates.push(format!("work_mode = ${}", bind_count));
        bind_count += 1;
    }
    if input.hours.is_some() {
        updates.push(format!("hours = ${}", bind_count));
        bind_count += 1;
    }
    if input.start_time.is_some() {
        updates.push(format!("start_time = ${}", bind_count));
        bind_count += 1;
    }
    if input.end_time.is_some() {
        updates.push(format!("end_time = ${}", bind_count));
        bind_count += 1;
    }
    if input.description.is_some() {
        updates.push(format!("description = ${}", bind_count));
        bind_count += 1;
    }
    if input.is_billable.is_some() {
        updates.push(format!("is_billable = ${}", bind_count));
        bind_count += 1;
    }
    if input.is_overtime.is_some() {
        updates.push(format!("is_overtime = ${}", bind_count));
        bind_count += 1;
    }
    if input.vehicle_reimbursement_tier.is_some() {
        updates.push(format!("vehicle_reimbursement_tier = ${}", bind_count));
        bind_count += 1;
    }

    if updates.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    updates.push("updated_at = now()".to_string());

    let sql = format!(
        "UPDATE time_entries SET {} WHERE id = ${} AND timesheet_id = ${} RETURNING *",
        updates.join(", "),
        bind_count,
        bind_count + 1
    );

    let mut query = sqlx::query_as::<_, TimeEntry>(&sql);

    if let Some(work_date) = input.work_date {
        query = query.bind(work_date);
    }
    if let Some(client_id) = input.client_id {
        query = query.bind(client_id);
    }
    if let Some(location_id) = input.location_id {
        query = query.bind(location_id);
    }
    if let Some(job_code_id) = input.job_code_id {
        query = query.bind(job_code_id);
    }
    if let Some(service_type_id) = input.service_type_id {
        query = query.bind(service_type_id);
    }
    if let Some(work_mode) = &input.work_mode {
        query = query.bind(work_mode);
    }
    if let Some(hours) = input.hours {
        query = query.bind(hours);
    }
    if let Some(start_time) = input.start_time {
        query = query.bind(start_time);
    }
    if let Some(end_time) = input.end_time {
        query = query.bind(end_time);
    }
    if let Some(description) = &input.description {
        query = query.bind(description);
    }
    if let Some(is_billable) = input.is_billable {
        query = query.bind(is_billable);
    }
    if let Some(is_overtime) = input.is_overtime {
        query = query.bind(is_overtime);
    }
    if let Some(tier) = &input.vehicle_reimbursement_tier {
        query = query.bind(tier);
    }

    query = query.bind(entry_id).bind(id);

    let entry = query
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Time entry not found".to_string()))?;

    reopen_if_rejected(&mut tx, &timesheet).await?;
    tx.commit().await?;

    Ok(Json(entry))
}

/// DELETE /api/timesheets/{id}/entries/{entry_id}
#[utoipa::path(
    delete,
    path = "/api/timesheets/{id}/entries/{entry_id}",
    params(
        ("id" = Uuid, Path, description = "Timesheet id"),
        ("entry_id" = Uuid, Path, description = "Time entry id")
    ),
    responses(
        (status = 200, description = "Time entry deleted", body = MessageResponse),
        (status = 403, description = "Not the timesheet owner"),
        (status = 404, description = "Timesheet or entry not found"),
        (status = 409, description = "Timesheet is not editable")
    ),
    tag = "entries",
    security(("bearer_auth" = []))
)]
pub async fn delete_time_entry(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path((id, entry_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<MessageResponse>> {
    let mut tx = state.db.begin().await?;

    let (timesheet, _period) = lock_editable_timesheet(&mut tx, id, &auth).await?;

    let result = sqlx::query("DELETE FROM time_entries WHERE id = $1 AND timesheet_id = $2")
        .bind(entry_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Time entry not found".to_string()));
    }

    reopen_if_rejected(&mut tx, &timesheet).await?;
    tx.commit().await?;

    Ok(Json(MessageResponse::new("Time entry deleted")))
}

/// GET /api/timesheets/{id}/pto
#[utoipa::path(
    get,
    path = "/api/timesheets/{id}/pto",
    params(("id" = Uuid, Path, description = "Timesheet id")),
    responses(
        (status = 200, description = "PTO entries ordered by date", body = Vec<PtoEntry>),
        (status = 403, description = "Not authorized to view this timesheet"),
        (status = 404, description = "Timesheet not found")
    ),
    tag = "entries",
    security(("bearer_auth" = []))
)]
pub async fn list_pto_entries(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<PtoEntry>>> {
    let timesheet = fetch_timesheet(&state.db, id).await?;
    check_read_access(&auth, &timesheet)?;

    let entries = sqlx::query_as::<_, PtoEntry>(
        "SELECT * FROM pto_entries WHERE timesheet_id = $1 ORDER BY pto_date",
    )
    .bind(id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

/// POST /api/timesheets/{id}/pto
#[utoipa::path(
    post,
    path = "/api/timesheets/{id}/pto",
    params(("id" = Uuid, Path, description = "Timesheet id")),
    request_body = CreatePtoEntryInput,
    responses(
        (status = 200, description = "PTO entry created", body = PtoEntry),
        (status = 403, description = "Not the timesheet owner"),
        (status = 404, description = "Timesheet not found"),
        (status = 409, description = "Timesheet is not editable"),
        (status = 422, description = "Invalid field value")
    ),
    tag = "entries",
    security(("bearer_auth" = []))
)]
pub async fn create_pto_entry(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
    Json(input): Json<CreatePtoEntryInput>,
) -> AppResult<Json<PtoEntry>> {
    let mut tx = state.db.begin().await?;

    let (timesheet, period) = lock_editable_timesheet(&mut tx, id, &auth).await?;
    input.validate(period.start_date, period.end_date)?;

    let entry = sqlx::query_as::<_, PtoEntry>(
        r#"
        INSERT INTO pto_entries (timesheet_id, pto_date, pto_type, hours, notes)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(input.pto_date)
    .bind(&input.pto_type)
    .bind(input.hours)
    .bind(&input.notes)
    .fetch_one(&mut *tx)
    .await?;

    reopen_if_rejected(&mut tx, &timesheet).await?;
    tx.commit().await?;

    Ok(Json(entry))
}

/// PATCH /api/timesheets/{id}/pto/{entry_id}
#[utoipa::path(
    patch,
    path = "/api/timesheets/{id}/pto/{entry_id}",
    params(
        ("id" = Uuid, Path, description = "Timesheet id"),
        ("entry_id" = Uuid, Path, description = "PTO entry id")
    ),
    request_body = UpdatePtoEntryInput,
    responses(
        (status = 200, description = "PTO entry updated", body = PtoEntry),
        (status = 403, description = "Not the timesheet owner"),
        (status = 404, description = "Timesheet or entry not found"),
        (status = 409, description = "Timesheet is not editable"),
        (status = 422, description = "Invalid field value")
    ),
    tag = "entries",
    security(("bearer_auth" = []))
)]
pub async fn update_pto_entry(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path((id, entry_id)): Path<(Uuid, Uuid)>,
    Json(input): Json<UpdatePtoEntryInput>,
) -> AppResult<Json<PtoEntry>> {
    let mut tx = state.db.begin().await?;

    let (timesheet, period) = lock_editable_timesheet(&mut tx, id, &auth).await?;
    input.validate(period.start_date, period.end_date)?;

    let mut updates = vec![];
    let mut bind_count = 1;

    if input.pto_date.is_some() {
        updates.push(format!("pto_date = ${}", bind_count));
        bind_count += 1;
    }
    if input.pto_type.is_some() {
        updates.push(format!("pto_type = ${}", bind_count));
        bind_count += 1;
    }
    if input.hours.is_some() {
        updates.push(format!("hours = ${}", bind_count));
        bind_count += 1;
    }
    if input.notes.is_some() {
        updates.push(format!("notes = ${}", bind_count));
        bind_count += 1;
    }

    if updates.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    updates.push("updated_at = now()".to_string());

    let sql = format!(
        "UPDATE pto_entries SET {} WHERE id = ${} AND timesheet_id = ${} RETURNING *",
        updates.join(", "),
        bind_count,
        bind_count + 1
    );

    let mut query = sqlx::query_as::<_, PtoEntry>(&sql);

    if let Some(pto_date) = input.pto_date {
        query = query.bind(pto_date);
    }
    if let Some(pto_type) = &input.pto_type {
        query = query.bind(pto_type);
    }
    if let Some(hours) = input.hours {
        query = query.bind(hours);
    }
    if let Some(notes) = &input.notes {
        query = query.bind(notes);
    }

    query = query.bind(entry_id).bind(id);

    let entry = query
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("PTO entry not found".to_string()))?;

    reopen_if_rejected(&mut tx, &timesheet).await?;
    tx.commit().await?;

    Ok(Json(entry))
}

/// DELETE /api/timesheets/{id}/pto/{entry_id}
#[utoipa::path(
    delete,
    path = "/api/timesheets/{id}/pto/{entry_id}",
    params(
        ("id" = Uuid, Path, description = "Timesheet id"),
        ("entry_id" = Uuid, Path, description = "PTO entry id")
    ),
    responses(
        (status = 200, description = "PTO entry deleted", body = MessageResponse),
        (status = 403, description = "Not the timesheet owner"),
        (status = 404, description = "Timesheet or entry not found"),
        (status = 409, description = "Timesheet is not editable")
    ),
    tag = "entries",
    security(("bearer_auth" = []))
)]
pub async fn delete_pto_entry(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path((id, entry_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<MessageResponse>> {
    let mut tx = state.db.begin().await?;

    let (timesheet, _period) = lock_editable_timesheet(&mut tx, id, &auth).await?;

    let result = sqlx::query("DELETE FROM pto_entries WHERE id = $1 AND timesheet_id = $2")
        .bind(entry_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("PTO entry not found".to_string()));
    }

    reopen_if_rejected(&mut tx, &timesheet).await?;
    tx.commit().await?;

    Ok(Json(MessageResponse::new("PTO entry deleted")))
}
