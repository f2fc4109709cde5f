use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    auth,
    error::unique_conflict,
    extractors::AuthenticatedEmployee,
    models::{
        CreateEmployeeInput, EmployeeResponse, UpdateEmployeeInput, EMPLOYEE_RESPONSE_COLUMNS,
    },
    AppError, AppResult, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListEmployeesQuery {
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}

fn default_active_only() -> bool {
    true
}

/// GET /api/employees?active_only=
#[utoipa::path(
    get,
    path = "/api/employees",
    params(ListEmployeesQuery),
    responses(
        (status = 200, description = "List of employees", body = Vec<EmployeeResponse>)
    ),
    tag = "employees",
    security(("bearer_auth" = []))
)]
pub async fn list_employees(
    State(state): State<Arc<AppState>>,
    _auth: AuthenticatedEmployee,
    Query(query): Query<ListEmployeesQuery>,
) -> AppResult<Json<Vec<EmployeeResponse>>> {
    let mut sql = format!(
        "SELECT {} FROM employees WHERE 1=1",
        EMPLOYEE_RESPONSE_COLUMNS
    );
    if query.active_only {
        sql.push_str(" AND is_active = TRUE");
    }
    sql.push_str(" ORDER BY last_name, first_name");

    let employees = sqlx::query_as::<_, EmployeeResponse>(&sql)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(employees))
}

/// GET /api/employees/{id}
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee detail", body = EmployeeResponse),
        (status = 404, description = "Employee not found")
    ),
    tag = "employees",
    security(("bearer_auth" = []))
)]
pub async fn get_employee(
    State(state): State<Arc<AppState>>,
    _auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EmployeeResponse>> {
    let sql = format!(
        "SELECT {} FROM employees WHERE id = $1",
        EMPLOYEE_RESPONSE_COLUMNS
    );

    let employee = sqlx::query_as::<_, EmployeeResponse>(&sql)
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    Ok(Json(employee))
}

/// POST /api/employees - admin only; pay period group is fixed here
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployeeInput,
    responses(
        (status = 200, description = "Employee created", body = EmployeeResponse),
        (status = 403, description = "Admin privileges required"),
        (status = 409, description = "Email already in use"),
        (status = 422, description = "Invalid field value")
    ),
    tag = "employees",
    security(("bearer_auth" = []))
)]
pub async fn create_employee(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Json(input): Json<CreateEmployeeInput>,
) -> AppResult<Json<EmployeeResponse>> {
    auth.require_admin()?;
    input.validate()?;

    let password_hash = auth::hash_password(&input.password)?;

    let sql = format!(
        r#"
        INSERT INTO employees (
            email, password_hash, first_name, last_name, hire_date,
            pay_period_group, hourly_rate, is_manager, is_admin
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {}
        "#,
        EMPLOYEE_RESPONSE_COLUMNS
    );

    let employee = sqlx::query_as::<_, EmployeeResponse>(&sql)
        .bind(&input.email)
        .bind(&password_hash)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(input.hire_date)
        .bind(&input.pay_period_group)
        .bind(input.hourly_rate)
        .bind(input.is_manager)
        .bind(input.is_admin)
        .fetch_one(&state.db)
        .await
        .map_err(|e| unique_conflict(e, "Employee with this email already exists"))?;

    tracing::info!(employee_id = %employee.id, "Employee created");

    Ok(Json(employee))
}

/// PATCH /api/employees/{id} - admin only
#[utoipa::path(
    patch,
    path = "/api/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee id")),
    request_body = UpdateEmployeeInput,
    responses(
        (status = 200, description = "Employee updated", body = EmployeeResponse),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Email already in use")
    ),
    tag = "employees",
    security(("bearer_auth" = []))
)]
pub async fn update_employee(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateEmployeeInput>,
) -> AppResult<Json<EmployeeResponse>> {
    auth.require_admin()?;
    input.validate()?;

    let password_hash = match &input.password {
        Some(password) => Some(auth::hash_password(password)?),
        None => None,
    };

    let mut updates = vec![];
    let mut bind_count = 1;

    if input.email.is_some() {
        updates.push(format!("email = ${}", bind_count));
        bind_count += 1;
    }
    if password_hash.is_some() {
        updates.push(format!("password_hash = ${}", bind_count));
        bind_count += 1;
    }
    if input.first_name.is_some() {
        updates.push(format!("first_name = ${}", bind_count));
        bind_count += 1;
    }
    if input.last_name.is_some() {
        updates.push(format!("last_name = ${}", bind_count));
        bind_count += 1;
    }
    if input.hire_date.is_some() {
        updates.push(format!("hire_date = ${}", bind_count));
        bind_count += 1;
    }
    if input.hourly_rate.is_some() {
        updates.push(format!("hourly_rate = ${}", bind_count));
        bind_count += 1;
    }
    if input.is_manager.is_some() {
        updates.push(format!("is_manager = ${}", bind_count));
        bind_count += 1;
    }
    if input.is_admin.is_some() {
        updates.push(format!("is_admin = ${}", bind_count));
        bind_count += 1;
    }
    if input.is_active.is_some() {
        updates.push(format!("is_active = ${}", bind_count));
        bind_count += 1;
    }

    if updates.is_empty() {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }

    updates.push("updated_at = now()".to_string());

    let sql = format!(
        "UPDATE employees SET {} WHERE id = ${} RETURNING {}",
        updates.join(", "),
        bind_count,
        EMPLOYEE_RESPONSE_COLUMNS
    );

    let mut query = sqlx::query_as::<_, EmployeeResponse>(&sql);

    if let Some(email) = &input.email {
        query = query.bind(email);
    }
    if let Some(hash) = &password_hash {
        query = query.bind(hash);
    }
    if let Some(first_name) = &input.first_name {
        query = query.bind(first_name);
    }
    if let Some(last_name) = &input.last_name {
        query = query.bind(last_name);
    }
    if let Some(hire_date) = input.hire_date {
        query = query.bind(hire_date);
    }
    if let Some(hourly_rate) = input.hourly_rate {
        query = query.bind(hourly_rate);
    }
    if let Some(is_manager) = input.is_manager {
        query = query.bind(is_manager);
    }
    if let Some(is_admin) = input.is_admin {
        query = query.bind(is_admin);
    }
    if let Some(is_active) = input.is_active {
        query = query.bind(is_active);
    }

    query = query.bind(id);

    let employee = query
        .fetch_optional(&state.db)
        .await
        .map_err(|e| unique_conflict(e, "Employee with this email already exists"))?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    Ok(Json(employee))
}

/// DELETE /api/employees/{id} - soft delete, sets is_active = false
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee deactivated", body = EmployeeResponse),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Employee not found")
    ),
    tag = "employees",
    security(("bearer_auth" = []))
)]
pub async fn deactivate_employee(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<EmployeeResponse>> {
    auth.require_admin()?;

    let sql = format!(
        "UPDATE employees SET is_active = FALSE, updated_at = now() WHERE id = $1 RETURNING {}",
        EMPLOYEE_RESPONSE_COLUMNS
    );

    let employee = sqlx::query_as::<_, EmployeeResponse>(&sql)
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    Ok(Json(employee))
}
