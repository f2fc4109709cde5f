use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    error::unique_conflict,
    extractors::AuthenticatedEmployee,
    models::{
        Client, CreateClientInput, CreateJobCodeInput, CreateLocationInput,
        CreateServiceTypeInput, JobCode, Location, ServiceType, UpdateClientInput,
        UpdateJobCodeInput, UpdateLocationInput, UpdateServiceTypeInput,
    },
    AppError, AppResult, AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListClientsQuery {
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListLocationsQuery {
    pub client_id: Option<Uuid>,
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListJobCodesQuery {
    pub location_id: Option<Uuid>,
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListServiceTypesQuery {
    #[serde(default = "default_active_only")]
    pub active_only: bool,
}

fn default_active_only() -> bool {
    true
}

// --- Clients ---

/// GET /api/clients?active_only=
#[utoipa::path(
    get,
    path = "/api/clients",
    params(ListClientsQuery),
    responses((status = 200, description = "Clients by name", body = Vec<Client>)),
    tag = "lookups",
    security(("bearer_auth" = []))
)]
pub async fn list_clients(
    State(state): State<Arc<AppState>>,
    _auth: AuthenticatedEmployee,
    Query(query): Query<ListClientsQuery>,
) -> AppResult<Json<Vec<Client>>> {
    let mut sql = "SELECT * FROM clients WHERE 1=1".to_string();
    if query.active_only {
        sql.push_str(" AND is_active = TRUE");
    }
    sql.push_str(" ORDER BY name");

    let clients = sqlx::query_as::<_, Client>(&sql).fetch_all(&state.db).await?;

    Ok(Json(clients))
}

/// POST /api/clients - admin only
#[utoipa::path(
    post,
    path = "/api/clients",
    request_body = CreateClientInput,
    responses(
        (status = 200, description = "Client created", body = Client),
        (status = 403, description = "Admin privileges required"),
        (status = 409, description = "Client name already in use")
    ),
    tag = "lookups",
    security(("bearer_auth" = []))
)]
pub async fn create_client(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Json(input): Json<CreateClientInput>,
) -> AppResult<Json<Client>> {
    auth.require_admin()?;
    input.validate()?;

    let client = sqlx::query_as::<_, Client>(
        "INSERT INTO clients (name, industry, is_active) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&input.name)
    .bind(&input.industry)
    .bind(input.is_active)
    .fetch_one(&state.db)
    .await
    .map_err(|e| unique_conflict(e, "Client with this name already exists"))?;

    Ok(Json(client))
}

/// PATCH /api/clients/{id} - admin only
#[utoipa::path(
    patch,
    path = "/api/clients/{id}",
    params(("id" = Uuid, Path, description = "Client id")),
    request_body = UpdateClientInput,
    responses(
        (status = 200, description = "Client updated", body = Client),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Client not found")
    ),
    tag = "lookups",
    security(("bearer_auth" = []))
)]
pub async fn update_client(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateClientInput>,
) -> AppResult<Json<Client>> {
    auth.require_admin()?;

    let mut updates = vec![];
    let mut bind_count = 1;

    if input.name.is_some() {
        updates.push(format!("name = ${}", bind_count));
        bind_count += 1;
    }
    if input.industry.is_some() {
        updates.push(format!("industry = ${}", bind_count));
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
        "UPDATE clients SET {} WHERE id = ${} RETURNING *",
        updates.join(", "),
        bind_count
    );

    let mut query = sqlx::query_as::<_, Client>(&sql);
    if let Some(name) = &input.name {
        query = query.bind(name);
    }
    if let Some(industry) = &input.industry {
        query = query.bind(industry);
    }
    if let Some(is_active) = input.is_active {
        query = query.bind(is_active);
    }
    query = query.bind(id);

    let client = query
        .fetch_optional(&state.db)
        .await
        .map_err(|e| unique_conflict(e, "Client with this name already exists"))?
        .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

    Ok(Json(client))
}

/// DELETE /api/clients/{id} - soft delete; time entries keep their reference
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    params(("id" = Uuid, Path, description = "Client id")),
    responses(
        (status = 200, description = "Client deactivated", body = Client),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Client not found")
    ),
    tag = "lookups",
    security(("bearer_auth" = []))
)]
pub async fn deactivate_client(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Client>> {
    auth.require_admin()?;

    let client = sqlx::query_as::<_, Client>(
        "UPDATE clients SET is_active = FALSE, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Client not found".to_string()))?;

    Ok(Json(client))
}

// --- Locations ---

/// GET /api/locations?client_id=&active_only=
#[utoipa::path(
    get,
    path = "/api/locations",
    params(ListLocationsQuery),
    responses((status = 200, description = "Locations by site name", body = Vec<Location>)),
    tag = "lookups",
    security(("bearer_auth" = []))
)]
pub async fn list_locations(
    State(state): State<Arc<AppState>>,
    _auth: AuthenticatedEmployee,
    Query(query): Query<ListLocationsQuery>,
) -> AppResult<Json<Vec<Location>>> {
    let mut sql = "SELECT * FROM locations WHERE 1=1".to_string();
    if query.active_only {
        sql.push_str(" AND is_active = TRUE");
    }
    if query.client_id.is_some() {
        sql.push_str(" AND client_id = $1");
    }
    sql.push_str(" ORDER BY site_name");

    let mut query_builder = sqlx::query_as::<_, Location>(&sql);
    if let Some(client_id) = query.client_id {
        query_builder = query_builder.bind(client_id);
    }

    let locations = query_builder.fetch_all(&state.db).await?;

    Ok(Json(locations))
}

/// POST /api/locations - admin only
#[utoipa::path(
    post,
    path = "/api/locations",
    request_body = CreateLocationInput,
    responses(
        (status = 200, description = "Location created", body = Location),
        (status = 400, description = "Unknown client"),
        (status = 403, description = "Admin privileges required")
    ),
    tag = "lookups",
    security(("bearer_auth" = []))
)]
pub async fn create_location(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Json(input): Json<CreateLocationInput>,
) -> AppResult<Json<Location>> {
    auth.require_admin()?;
    input.validate()?;

    let location = sqlx::query_as::<_, Location>(
        r#"
        INSERT INTO locations (client_id, region, site_name, is_active)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(input.client_id)
    .bind(&input.region)
    .bind(&input.site_name)
    .bind(input.is_active)
    .fetch_one(&state.db)
    .await
    .map_err(foreign_key_or_db("Unknown client"))?;

    Ok(Json(location))
}

/// PATCH /api/locations/{id} - admin only
#[utoipa::path(
    patch,
    path = "/api/locations/{id}",
    params(("id" = Uuid, Path, description = "Location id")),
    request_body = UpdateLocationInput,
    responses(
        (status = 200, description = "Location updated", body = Location),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Location not found")
    ),
    tag = "lookups",
    security(("bearer_auth" = []))
)]
pub async fn update_location(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateLocationInput>,
) -> AppResult<Json<Location>> {
    auth.require_admin()?;

    let mut updates = vec![];
    let mut bind_count = 1;

    if input.region.is_some() {
        updates.push(format!("region = ${}", bind_count));
        bind_count += 1;
    }
    if input.site_name.is_some() {
        updates.push(format!("site_name = ${}", bind_count));
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
        "UPDATE locations SET {} WHERE id = ${} RETURNING *",
        updates.join(", "),
        bind_count
    );

    let mut query = sqlx::query_as::<_, Location>(&sql);
    if let Some(region) = &input.region {
        query = query.bind(region);
    }
    if let Some(site_name) = &input.site_name {
        query = query.bind(site_name);
    }
    if let Some(is_active) = input.is_active {
        query = query.bind(is_active);
    }
    query = query.bind(id);

    let location = query
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Location not found".to_string()))?;

    Ok(Json(location))
}

/// DELETE /api/locations/{id} - soft delete
#[utoipa::path(
    delete,
    path = "/api/locations/{id}",
    params(("id" = Uuid, Path, description = "Location id")),
    responses(
        (status = 200, description = "Location deactivated", body = Location),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Location not found")
    ),
    tag = "lookups",
    security(("bearer_auth" = []))
)]
pub async fn deactivate_location(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Location>> {
    auth.require_admin()?;

    let location = sqlx::query_as::<_, Location>(
        "UPDATE locations SET is_active = FALSE, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Location not found".to_string()))?;

    Ok(Json(location))
}

// --- Job codes ---

/// GET /api/job-codes?location_id=&active_only=
#[utoipa::path(
    get,
    path = "/api/job-codes",
    params(ListJobCodesQuery),
    responses((status = 200, description = "Job codes by code", body = Vec<JobCode>)),
    tag = "lookups",
    security(("bearer_auth" = []))
)]
pub async fn list_job_codes(
    State(state): State<Arc<AppState>>,
    _auth: AuthenticatedEmployee,
    Query(query): Query<ListJobCodesQuery>,
) -> AppResult<Json<Vec<JobCode>>> {
    let mut sql = "SELECT * FROM job_codes WHERE 1=1".to_string();
    if query.active_only {
        sql.push_str(" AND is_active = TRUE");
    }
    if query.location_id.is_some() {
        sql.push_str(" AND location_id = $1");
    }
    sql.push_str(" ORDER BY code");

    let mut query_builder = sqlx::query_as::<_, JobCode>(&sql);
    if let Some(location_id) = query.location_id {
        query_builder = query_builder.bind(location_id);
    }

    let job_codes = query_builder.fetch_all(&state.db).await?;

    Ok(Json(job_codes))
}

/// POST /api/job-codes - admin only; code is unique within its location
#[utoipa::path(
    post,
    path = "/api/job-codes",
    request_body = CreateJobCodeInput,
    responses(
        (status = 200, description = "Job code created", body = JobCode),
        (status = 403, description = "Admin privileges required"),
        (status = 409, description = "Duplicate code for this location")
    ),
    tag = "lookups",
    security(("bearer_auth" = []))
)]
pub async fn create_job_code(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Json(input): Json<CreateJobCodeInput>,
) -> AppResult<Json<JobCode>> {
    auth.require_admin()?;
    input.validate()?;

    let job_code = sqlx::query_as::<_, JobCode>(
        r#"
        INSERT INTO job_codes (location_id, code, description, is_active)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(input.location_id)
    .bind(&input.code)
    .bind(&input.description)
    .bind(input.is_active)
    .fetch_one(&state.db)
    .await
    .map_err(|e| unique_conflict(e, "Job code already exists for this location"))?;

    Ok(Json(job_code))
}

/// PATCH /api/job-codes/{id} - admin only
#[utoipa::path(
    patch,
    path = "/api/job-codes/{id}",
    params(("id" = Uuid, Path, description = "Job code id")),
    request_body = UpdateJobCodeInput,
    responses(
        (status = 200, description = "Job code updated", body = JobCode),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Job code not found"),
        (status = 409, description = "Duplicate code for this location")
    ),
    tag = "lookups",
    security(("bearer_auth" = []))
)]
pub async fn update_job_code(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateJobCodeInput>,
) -> AppResult<Json<JobCode>> {
    auth.require_admin()?;

    let mut updates = vec![];
    let mut bind_count = 1;

    if input.code.is_some() {
        updates.push(format!("code = ${}", bind_count));
        bind_count += 1;
    }
    if input.description.is_some() {
        updates.push(format!("description = ${}", bind_count));
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
        "UPDATE job_codes SET {} WHERE id = ${} RETURNING *",
        updates.join(", "),
        bind_count
    );

    let mut query = sqlx::query_as::<_, JobCode>(&sql);
    if let Some(code) = &input.code {
        query = query.bind(code);
    }
    if let Some(description) = &input.description {
        query = query.bind(description);
    }
    if let Some(is_active) = input.is_active {
        query = query.bind(is_active);
    }
    query = query.bind(id);

    let job_code = query
        .fetch_optional(&state.db)
        .await
        .map_err(|e| unique_conflict(e, "Job code already exists for this location"))?
        .ok_or_else(|| AppError::NotFound("Job code not found".to_string()))?;

    Ok(Json(job_code))
}

/// DELETE /api/job-codes/{id} - soft delete
#[utoipa::path(
    delete,
    path = "/api/job-codes/{id}",
    params(("id" = Uuid, Path, description = "Job code id")),
    responses(
        (status = 200, description = "Job code deactivated", body = JobCode),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Job code not found")
    ),
    tag = "lookups",
    security(("bearer_auth" = []))
)]
pub async fn deactivate_job_code(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<JobCode>> {
    auth.require_admin()?;

    let job_code = sqlx::query_as::<_, JobCode>(
        "UPDATE job_codes SET is_active = FALSE, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Job code not found".to_string()))?;

    Ok(Json(job_code))
}

// --- Service types ---

/// GET /api/service-types?active_only=
#[utoipa::path(
    get,
    path = "/api/service-types",
    params(ListServiceTypesQuery),
    responses((status = 200, description = "Service types by name", body = Vec<ServiceType>)),
    tag = "lookups",
    security(("bearer_auth" = []))
)]
pub async fn list_service_types(
    State(state): State<Arc<AppState>>,
    _auth: AuthenticatedEmployee,
    Query(query): Query<ListServiceTypesQuery>,
) -> AppResult<Json<Vec<ServiceType>>> {
    let mut sql = "SELECT * FROM service_types WHERE 1=1".to_string();
    if query.active_only {
        sql.push_str(" AND is_active = TRUE");
    }
    sql.push_str(" ORDER BY name");

    let service_types = sqlx::query_as::<_, ServiceType>(&sql)
        .fetch_all(&state.db)
        .await?;

    Ok(Json(service_types))
}

/// POST /api/service-types - admin only
#[utoipa::path(
    post,
    path = "/api/service-types",
    request_body = CreateServiceTypeInput,
    responses(
        (status = 200, description = "Service type created", body = ServiceType),
        (status = 403, description = "Admin privileges required"),
        (status = 409, description = "Service type name already in use")
    ),
    tag = "lookups",
    security(("bearer_auth" = []))
)]
pub async fn create_service_type(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Json(input): Json<CreateServiceTypeInput>,
) -> AppResult<Json<ServiceType>> {
    auth.require_admin()?;
    input.validate()?;

    let service_type = sqlx::query_as::<_, ServiceType>(
        "INSERT INTO service_types (name, is_billable, is_active) VALUES ($1, $2, $3) RETURNING *",
    )
    .bind(&input.name)
    .bind(input.is_billable)
    .bind(input.is_active)
    .fetch_one(&state.db)
    .await
    .map_err(|e| unique_conflict(e, "Service type with this name already exists"))?;

    Ok(Json(service_type))
}

/// PATCH /api/service-types/{id} - admin only
#[utoipa::path(
    patch,
    path = "/api/service-types/{id}",
    params(("id" = Uuid, Path, description = "Service type id")),
    request_body = UpdateServiceTypeInput,
    responses(
        (status = 200, description = "Service type updated", body = ServiceType),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Service type not found")
    ),
    tag = "lookups",
    security(("bearer_auth" = []))
)]
pub async fn update_service_type(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateServiceTypeInput>,
) -> AppResult<Json<ServiceType>> {
    auth.require_admin()?;

    let mut updates = vec![];
    let mut bind_count = 1;

    if input.name.is_some() {
        updates.push(format!("name = ${}", bind_count));
        bind_count += 1;
    }
    if input.is_billable.is_some() {
        updates.push(format!("is_billable = ${}", bind_count));
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
        "UPDATE service_types SET {} WHERE id = ${} RETURNING *",
        updates.join(", "),
        bind_count
    );

    let mut query = sqlx::query_as::<_, ServiceType>(&sql);
    if let Some(name) = &input.name {
        query = query.bind(name);
    }
    if let Some(is_billable) = input.is_billable {
        query = query.bind(is_billable);
    }
    if let Some(is_active) = input.is_active {
        query = query.bind(is_active);
    }
    query = query.bind(id);

    let service_type = query
        .fetch_optional(&state.db)
        .await
        .map_err(|e| unique_conflict(e, "Service type with this name already exists"))?
        .ok_or_else(|| AppError::NotFound("Service type not found".to_string()))?;

    Ok(Json(service_type))
}

/// DELETE /api/service-types/{id} - soft delete
#[utoipa::path(
    delete,
    path = "/api/service-types/{id}",
    params(("id" = Uuid, Path, description = "Service type id")),
    responses(
        (status = 200, description = "Service type deactivated", body = ServiceType),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Service type not found")
    ),
    tag = "lookups",
    security(("bearer_auth" = []))
)]
pub async fn deactivate_service_type(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ServiceType>> {
    auth.require_admin()?;

    let service_type = sqlx::query_as::<_, ServiceType>(
        "UPDATE service_types SET is_active = FALSE, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound("Service type not found".to_string()))?;

    Ok(Json(service_type))
}

fn foreign_key_or_db(message: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |err| match &err {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            AppError::BadRequest(message.to_string())
        }
        _ => AppError::Database(err),
    }
}
