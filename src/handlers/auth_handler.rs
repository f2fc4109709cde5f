use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{
    auth,
    extractors::AuthenticatedEmployee,
    models::{
        ChangePasswordInput, Employee, EmployeeResponse, LoginInput, MessageResponse,
        RequestResetInput, ResetPasswordInput, TokenResponse,
    },
    AppError, AppResult, AppState,
};

/// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginInput,
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 401, description = "Incorrect email or password"),
        (status = 403, description = "Account is inactive")
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(input): Json<LoginInput>,
) -> AppResult<Json<TokenResponse>> {
    let employee = sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees WHERE LOWER(email) = LOWER($1)",
    )
    .bind(&input.email)
    .fetch_optional(&state.db)
    .await?;

    // Same error for unknown email and wrong password
    let employee = match employee {
        Some(e) if auth::verify_password(&input.password, &e.password_hash)? => e,
        _ => {
            return Err(AppError::Unauthorized(
                "Incorrect email or password".to_string(),
            ))
        }
    };

    if !employee.is_active {
        return Err(AppError::Forbidden(
            "Employee account is inactive".to_string(),
        ));
    }

    let expires_in = state.config.access_token_expiry_minutes * 60;
    let access_token = auth::create_access_token(
        employee.id,
        &employee.email,
        &state.config.jwt_secret,
        state.config.access_token_expiry_minutes,
    )?;

    tracing::info!(employee_id = %employee.id, "Employee logged in");

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in,
    }))
}

/// GET /api/auth/me
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "The authenticated employee", body = EmployeeResponse),
        (status = 401, description = "Not authenticated")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
) -> AppResult<Json<EmployeeResponse>> {
    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
        .bind(auth.id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(EmployeeResponse::from(employee)))
}

/// POST /api/auth/change-password
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordInput,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Current password is incorrect")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    auth: AuthenticatedEmployee,
    Json(input): Json<ChangePasswordInput>,
) -> AppResult<Json<MessageResponse>> {
    if input.new_password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
        .bind(auth.id)
        .fetch_one(&state.db)
        .await?;

    if !auth::verify_password(&input.current_password, &employee.password_hash)? {
        return Err(AppError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = auth::hash_password(&input.new_password)?;

    sqlx::query("UPDATE employees SET password_hash = $1, updated_at = now() WHERE id = $2")
        .bind(&new_hash)
        .bind(auth.id)
        .execute(&state.db)
        .await?;

    Ok(Json(MessageResponse::new("Password changed successfully")))
}

/// POST /api/auth/request-reset
///
/// Always answers with the same message so email addresses cannot be
/// enumerated.
#[utoipa::path(
    post,
    path = "/api/auth/request-reset",
    request_body = RequestResetInput,
    responses(
        (status = 200, description = "Generic acknowledgement", body = MessageResponse)
    ),
    tag = "auth"
)]
pub async fn request_password_reset(
    State(state): State<Arc<AppState>>,
    Json(input): Json<RequestResetInput>,
) -> AppResult<Json<MessageResponse>> {
    let employee = sqlx::query_as::<_, Employee>(
        "SELECT * FROM employees WHERE LOWER(email) = LOWER($1)",
    )
    .bind(&input.email)
    .fetch_optional(&state.db)
    .await?;

    if let Some(employee) = employee {
        if employee.is_active {
            let token = auth::generate_reset_token(employee.id, &state.config.jwt_secret)?;
            state
                .notifier
                .password_reset(employee.email.clone(), &employee.full_name(), &token);
        }
    }

    Ok(Json(MessageResponse::new(
        "If an account with that email exists, a reset link has been sent.",
    )))
}

/// POST /api/auth/reset-password
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordInput,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid or expired reset token")
    ),
    tag = "auth"
)]
pub async fn reset_password(
    State(state): State<Arc<AppState>>,
    Json(input): Json<ResetPasswordInput>,
) -> AppResult<Json<MessageResponse>> {
    if input.new_password.len() < 6 {
        return Err(AppError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let employee_id = auth::validate_reset_token(&input.token, &state.config.jwt_secret)?;
    let new_hash = auth::hash_password(&input.new_password)?;

    let result =
        sqlx::query("UPDATE employees SET password_hash = $1, updated_at = now() WHERE id = $2")
            .bind(&new_hash)
            .bind(employee_id)
            .execute(&state.db)
            .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest(
            "Invalid or expired reset token".to_string(),
        ));
    }

    tracing::info!(%employee_id, "Password reset completed");

    Ok(Json(MessageResponse::new(
        "Password has been reset successfully",
    )))
}
