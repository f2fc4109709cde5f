use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use crate::{auth, models::Employee, AppError, AppResult, AppState};

fn extract_bearer_token(parts: &Parts) -> Option<String> {
    let auth_header = parts.headers.get(header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;
    auth_str.strip_prefix("Bearer ").map(|t| t.to_string())
}

/// The authenticated principal: a row from `employees`, loaded fresh on
/// every request so role and active flags are never stale.
#[derive(Debug, Clone)]
pub struct AuthenticatedEmployee {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub pay_period_group: String,
    pub is_manager: bool,
    pub is_admin: bool,
}

impl AuthenticatedEmployee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Manager capability; admins implicitly have it.
    pub fn require_manager(&self) -> AppResult<()> {
        if self.is_manager || self.is_admin {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Manager privileges required".to_string(),
            ))
        }
    }

    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin privileges required".to_string()))
        }
    }

    pub fn can_view_timesheet_of(&self, employee_id: Uuid) -> bool {
        self.id == employee_id || self.is_manager || self.is_admin
    }
}

impl From<Employee> for AuthenticatedEmployee {
    fn from(e: Employee) -> Self {
        AuthenticatedEmployee {
            id: e.id,
            email: e.email,
            first_name: e.first_name,
            last_name: e.last_name,
            pay_period_group: e.pay_period_group,
            is_manager: e.is_manager,
            is_admin: e.is_admin,
        }
    }
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedEmployee {
    type Rejection = (StatusCode, axum::Json<serde_json::Value>);

    fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = extract_bearer_token(parts);
        let state = state.clone();

        async move {
            let token = token.ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    axum::Json(json!({"error": "Missing Authorization header"})),
                )
            })?;

            let claims =
                auth::decode_access_token(&token, &state.config.jwt_secret).map_err(|e| {
                    (
                        StatusCode::UNAUTHORIZED,
                        axum::Json(json!({"error": e.to_string()})),
                    )
                })?;

            let employee_id: Uuid = claims.sub.parse().map_err(|_| {
                (
                    StatusCode::UNAUTHORIZED,
                    axum::Json(json!({"error": "Could not validate credentials"})),
                )
            })?;

            let employee = sqlx::query_as::<_, Employee>(
                "SELECT * FROM employees WHERE id = $1",
            )
            .bind(employee_id)
            .fetch_optional(&state.db)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, %employee_id, "Principal lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(json!({"error": "Database error"})),
                )
            })?
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    axum::Json(json!({"error": "Could not validate credentials"})),
                )
            })?;

            if !employee.is_active {
                return Err((
                    StatusCode::FORBIDDEN,
                    axum::Json(json!({"error": "Employee account is inactive"})),
                ));
            }

            tracing::debug!(%employee_id, "Authenticated request");

            Ok(AuthenticatedEmployee::from(employee))
        }
    }
}
