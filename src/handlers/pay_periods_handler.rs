use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::unique_conflict,
    extractors::AuthenticatedEmployee,
    models::{
        plan_periods, CreatePayPeriodInput, GeneratePeriodsQuery, ListPayPeriodsQuery, PayPeriod,
        PayPeriodStatus, UpdatePayPeriodInput,
    },
    AppError, AppResult, AppState,
};

/// GET /api/pay-periods?period_group=&status=&limit=
#[utoipa::path(
    get,
    path = "/api/pay-periods",
    params(ListPayPeriodsQuery),
    responses(
        (status = 200, description = "Pay periods, most recent first", body = Vec<PayPeriod>)
    ),
    tag = "pay-periods",
    security(("bearer_auth" = []))
)]
pub async fn list_pay_periods(
    State(state): State<Arc<AppState>>,
    _auth: AuthenticatedEmployee,
    Query(query): Query<ListPayPeriodsQuery>,
) -> AppResult<Json<Vec<PayPeriod>>> {
    let mut sql = "SELECT * FROM pay_periods WHERE 1=1".to_string();
    let mut bindings: Vec<String> = vec![];

    if let Some(group) = &query.period_group {
        sql.push_str(&format!(" AND period_group = ${}", bindings.len() + 1));
        bindings.push(group.clone());
    }
    if let Some(status) = &query.status {
        sql.push_str(&format!(" AND status = ${}", bindings.len() + 1));
        bindings.push(status.clone());
    }

    sql.push_str(&format!(
        " ORDER BY start_date DESC LIMIT ${}",
        bindings.len() + 1
    ));

    let mut query_builder = sqlx::query_as::<_, PayPeriod>(&sql);
    for binding in bindings {
        query_builder = query_builder.bind(binding);
    }
    query_builder = query_builder.bind(query.limit);

    let periods = query_builder.fetch_all(&state.db).await?;

    Ok(Json(periods))
}

/// Resolves the applicable open pay period for an employee's stagger group:
/// the open period containing `today`, else the nearest upcoming open
/// period. Never fabricates a period.
pub async fn resolve_current_period(
    db: &sqlx::PgPool,
    period_group: &str,
) -> AppResult<PayPeriod> {
    let today = Utc::now().date_naive();

    let current = sqlx::query_as::<_, PayPeriod>(
        r#"
        SELECT * FROM pay_periods
        WHERE period_group = $1
          AND status = 'open'
          AND start_date <= $2
          AND end_date >= $2
        LIMIT 1
        "#,
    )
    .bind(period_group)
    .bind(today)
    .fetch_optional(db)
    .await?;

    if let Some(period) = current {
        return Ok(period);
    }

    // Fallback: nearest upcoming open period
    let upcoming = sqlx::query_as::<_, PayPeriod>(
        r#"
        SELECT * FROM pay_periods
        WHERE period_group = $1
          AND status = 'open'
          AND start_date >= $2
        ORDER BY start_date ASC
        LIMIT 1
        "#,
    )
    .bind(period_group)
    .bind(today)
    .fetch_optional(db)
    .await?;

    upcoming.ok_or_else(|| {
        AppError::NotFound("No open pay period found for your pay period group".to_string())
    })
}

/// GET /api/pay-periods/current
#[utoipa::path(
    get,
    path = "/api/pay-periods/current",
    responses(
        (status = 200, description = "The caller's current open pay period", body = PayPeriod),
        (status = 404, description = "No open pay period for the caller's group")
    ),
    tag = "pay-periods",
    security(("bearer_auth" = []))
)]
pub async fn get_current_pay_period(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
) -> AppResult<Json<PayPeriod>> {
    let period = resolve_current_period(&state.db, &auth.pay_period_group).await?;
    Ok(Json(period))
}

/// GET /api/pay-periods/{id}
#[utoipa::path(
    get,
    path = "/api/pay-periods/{id}",
    params(("id" = Uuid, Path, description = "Pay period id")),
    responses(
        (status = 200, description = "Pay period detail", body = PayPeriod),
        (status = 404, description = "Pay period not found")
    ),
    tag = "pay-periods",
    security(("bearer_auth" = []))
)]
pub async fn get_pay_period(
    State(state): State<Arc<AppState>>,
    _auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PayPeriod>> {
    let period = sqlx::query_as::<_, PayPeriod>("SELECT * FROM pay_periods WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Pay period not found".to_string()))?;

    Ok(Json(period))
}

/// POST /api/pay-periods - manual creation, admin only
#[utoipa::path(
    post,
    path = "/api/pay-periods",
    request_body = CreatePayPeriodInput,
    responses(
        (status = 200, description = "Pay period created", body = PayPeriod),
        (status = 403, description = "Admin privileges required"),
        (status = 409, description = "Duplicate (group, start date)")
    ),
    tag = "pay-periods",
    security(("bearer_auth" = []))
)]
pub async fn create_pay_period(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Json(input): Json<CreatePayPeriodInput>,
) -> AppResult<Json<PayPeriod>> {
    auth.require_admin()?;
    input.validate()?;

    let period = sqlx::query_as::<_, PayPeriod>(
        r#"
        INSERT INTO pay_periods (period_group, start_date, end_date, payroll_run_date, status)
        VALUES ($1, $2, $3, $4, 'open')
        RETURNING *
        "#,
    )
    .bind(&input.period_group)
    .bind(input.start_date)
    .bind(input.end_date)
    .bind(input.payroll_run_date)
    .fetch_one(&state.db)
    .await
    .map_err(|e| unique_conflict(e, "Pay period already exists for this group and start date"))?;

    Ok(Json(period))
}

/// POST /api/pay-periods/generate?start_date=&weeks=
///
/// Creates bi-weekly periods for both stagger groups. Idempotent: periods
/// whose (group, start date) already exist are skipped without error, and
/// only newly created periods are returned.
#[utoipa::path(
    post,
    path = "/api/pay-periods/generate",
    params(GeneratePeriodsQuery),
    responses(
        (status = 200, description = "Newly created pay periods", body = Vec<PayPeriod>),
        (status = 403, description = "Admin privileges required")
    ),
    tag = "pay-periods",
    security(("bearer_auth" = []))
)]
pub async fn generate_pay_periods(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Query(query): Query<GeneratePeriodsQuery>,
) -> AppResult<Json<Vec<PayPeriod>>> {
    auth.require_admin()?;

    let spans = plan_periods(query.start_date, query.weeks);

    let mut tx = state.db.begin().await?;
    let mut created = Vec::new();

    for span in spans {
        let inserted = sqlx::query_as::<_, PayPeriod>(
            r#"
            INSERT INTO pay_periods (period_group, start_date, end_date, status)
            VALUES ($1, $2, $3, 'open')
            ON CONFLICT (period_group, start_date) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(span.group.as_str())
        .bind(span.start_date)
        .bind(span.end_date)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(period) = inserted {
            created.push(period);
        }
    }

    tx.commit().await?;

    tracing::info!(
        start_date = %query.start_date,
        weeks = query.weeks,
        created = created.len(),
        "Pay period generation complete"
    );

    Ok(Json(created))
}

/// PATCH /api/pay-periods/{id} - admin only; payroll run date and status
#[utoipa::path(
    patch,
    path = "/api/pay-periods/{id}",
    params(("id" = Uuid, Path, description = "Pay period id")),
    request_body = UpdatePayPeriodInput,
    responses(
        (status = 200, description = "Pay period updated", body = PayPeriod),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Pay period not found")
    ),
    tag = "pay-periods",
    security(("bearer_auth" = []))
)]
pub async fn update_pay_period(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePayPeriodInput>,
) -> AppResult<Json<PayPeriod>> {
    auth.require_admin()?;
    input.validate()?;

    if input.payroll_run_date.is_none() && input.status.is_none() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    let mut updates = vec![];
    let mut bind_count = 1;

    if input.payroll_run_date.is_some() {
        updates.push(format!("payroll_run_date = ${}", bind_count));
        bind_count += 1;
    }
    if input.status.is_some() {
        updates.push(format!("status = ${}", bind_count));
        bind_count += 1;
    }
    updates.push("updated_at = now()".to_string());

    let sql = format!(
        "UPDATE pay_periods SET {} WHERE id = ${} RETURNING *",
        updates.join(", "),
        bind_count
    );

    let mut query = sqlx::query_as::<_, PayPeriod>(&sql);
    if let Some(run_date) = input.payroll_run_date {
        query = query.bind(run_date);
    }
    if let Some(status) = &input.status {
        query = query.bind(status);
    }
    query = query.bind(id);

    let period = query
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Pay period not found".to_string()))?;

    Ok(Json(period))
}

/// POST /api/pay-periods/{id}/close
///
/// `open -> closed`, one-way. The precondition is re-checked inside the
/// UPDATE so two concurrent closes cannot both succeed.
#[utoipa::path(
    post,
    path = "/api/pay-periods/{id}/close",
    params(("id" = Uuid, Path, description = "Pay period id")),
    responses(
        (status = 200, description = "Pay period closed", body = PayPeriod),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Pay period not found"),
        (status = 409, description = "Pay period is not open")
    ),
    tag = "pay-periods",
    security(("bearer_auth" = []))
)]
pub async fn close_pay_period(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PayPeriod>> {
    auth.require_admin()?;

    let closed = sqlx::query_as::<_, PayPeriod>(
        r#"
        UPDATE pay_periods
        SET status = $1, updated_at = now()
        WHERE id = $2 AND status = $3
        RETURNING *
        "#,
    )
    .bind(PayPeriodStatus::Closed.as_str())
    .bind(id)
    .bind(PayPeriodStatus::Open.as_str())
    .fetch_optional(&state.db)
    .await?;

    if let Some(period) = closed {
        return Ok(Json(period));
    }

    // Distinguish missing from already closed/processed
    let existing = sqlx::query_as::<_, PayPeriod>("SELECT * FROM pay_periods WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Pay period not found".to_string()))?;

    Err(AppError::Conflict(format!(
        "Pay period is already '{}'",
        existing.status
    )))
}
