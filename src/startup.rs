use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    response::Html,
    routing::{delete, get, patch, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::{handlers, middleware, openapi::ApiDoc};

pub fn build_router(state: Arc<crate::AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .cors_origin
                .parse::<HeaderValue>()
                .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:3000")),
        )
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true);

    // Auth routes
    let auth_routes = Router::new()
        .route("/login", post(handlers::auth_handler::login))
        .route("/me", get(handlers::auth_handler::get_me))
        .route("/change-password", post(handlers::auth_handler::change_password))
        .route("/request-reset", post(handlers::auth_handler::request_password_reset))
        .route("/reset-password", post(handlers::auth_handler::reset_password));

    // Employee routes
    let employee_routes = Router::new()
        .route("/", get(handlers::employees_handler::list_employees))
        .route("/", post(handlers::employees_handler::create_employee))
        .route("/{id}", get(handlers::employees_handler::get_employee))
        .route("/{id}", patch(handlers::employees_handler::update_employee))
        .route("/{id}", delete(handlers::employees_handler::deactivate_employee));

    // Pay period routes - /current and /generate before /{id} to prevent shadowing
    let pay_period_routes = Router::new()
        .route("/", get(handlers::pay_periods_handler::list_pay_periods))
        .route("/", post(handlers::pay_periods_handler::create_pay_period))
        .route("/current", get(handlers::pay_periods_handler::get_current_pay_period))
        .route("/generate", post(handlers::pay_periods_handler::generate_pay_periods))
        .route("/{id}", get(handlers::pay_periods_handler::get_pay_period))
        .route("/{id}", patch(handlers::pay_periods_handler::update_pay_period))
        .route("/{id}/close", post(handlers::pay_periods_handler::close_pay_period));

    // Timesheet routes, with time and PTO entries nested underneath
    let timesheet_routes = Router::new()
        .route("/", get(handlers::timesheets_handler::list_timesheets))
        .route("/", post(handlers::timesheets_handler::create_timesheet))
        .route("/current", get(handlers::timesheets_handler::get_current_timesheet))
        .route("/{id}", get(handlers::timesheets_handler::get_timesheet))
        .route("/{id}/submit", post(handlers::timesheets_handler::submit_timesheet))
        .route("/{id}/approve", post(handlers::timesheets_handler::approve_timesheet))
        .route("/{id}/reject", post(handlers::timesheets_handler::reject_timesheet))
        .route("/{id}/entries", get(handlers::entries_handler::list_time_entries))
        .route("/{id}/entries", post(handlers::entries_handler::create_time_entry))
        .route("/{id}/entries/{entry_id}", patch(handlers::entries_handler::update_time_entry))
        .route("/{id}/entries/{entry_id}", delete(handlers::entries_handler::delete_time_entry))
        .route("/{id}/pto", get(handlers::entries_handler::list_pto_entries))
        .route("/{id}/pto", post(handlers::entries_handler::create_pto_entry))
        .route("/{id}/pto/{entry_id}", patch(handlers::entries_handler::update_pto_entry))
        .route("/{id}/pto/{entry_id}", delete(handlers::entries_handler::delete_pto_entry));

    // Lookup routes; deletes are soft, flipping is_active
    let client_routes = Router::new()
        .route("/", get(handlers::lookups_handler::list_clients))
        .route("/", post(handlers::lookups_handler::create_client))
        .route("/{id}", patch(handlers::lookups_handler::update_client))
        .route("/{id}", delete(handlers::lookups_handler::deactivate_client));

    let location_routes = Router::new()
        .route("/", get(handlers::lookups_handler::list_locations))
        .route("/", post(handlers::lookups_handler::create_location))
        .route("/{id}", patch(handlers::lookups_handler::update_location))
        .route("/{id}", delete(handlers::lookups_handler::deactivate_location));

    let job_code_routes = Router::new()
        .route("/", get(handlers::lookups_handler::list_job_codes))
        .route("/", post(handlers::lookups_handler::create_job_code))
        .route("/{id}", patch(handlers::lookups_handler::update_job_code))
        .route("/{id}", delete(handlers::lookups_handler::deactivate_job_code));

    let service_type_routes = Router::new()
        .route("/", get(handlers::lookups_handler::list_service_types))
        .route("/", post(handlers::lookups_handler::create_service_type))
        .route("/{id}", patch(handlers::lookups_handler::update_service_type))
        .route("/{id}", delete(handlers::lookups_handler::deactivate_service_type));

    // Report routes
    let report_routes = Router::new()
        .route("/payroll", get(handlers::reports_handler::payroll_report))
        .route("/billing", get(handlers::reports_handler::billing_report))
        .route("/hours-by-employee", get(handlers::reports_handler::hours_by_employee))
        .route("/hours-by-job-code", get(handlers::reports_handler::hours_by_job_code));

    Router::new()
        .route("/api/health", get(handlers::health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api/employees", employee_routes)
        .nest("/api/pay-periods", pay_period_routes)
        .nest("/api/timesheets", timesheet_routes)
        .nest("/api/clients", client_routes)
        .nest("/api/locations", location_routes)
        .nest("/api/job-codes", job_code_routes)
        .nest("/api/service-types", service_type_routes)
        .nest("/api/reports", report_routes)
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/swagger-ui", get(swagger_ui))
        .layer(axum_middleware::from_fn(middleware::metrics_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn swagger_ui() -> Html<&'static str> {
    Html(r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>MyHours API Documentation</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({
                url: '/api-docs/openapi.json',
                dom_id: '#swagger-ui',
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
    "#)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{notify, AppConfig, AppState, Notifier};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use metrics_exporter_prometheus::PrometheusBuilder;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        // Lazy pool: never connects, routes under test fail at auth first
        let db = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();

        let recorder = PrometheusBuilder::new().build_recorder();

        Arc::new(AppState {
            db,
            config: AppConfig {
                database_url: "postgres://localhost/unused".to_string(),
                database_max_connections: 5,
                jwt_secret: "test_secret_key_at_least_32_chars_long".to_string(),
                access_token_expiry_minutes: 60,
                cors_origin: "http://localhost:3000".to_string(),
            },
            metrics: Arc::new(crate::MetricsState {
                handle: recorder.handle(),
            }),
            notifier: Notifier::new(Arc::new(notify::LogSink)),
        })
    }

    async fn status_for(method: &str, uri: &str) -> StatusCode {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn test_health_is_public() {
        assert_eq!(status_for("GET", "/api/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_lookup_deletes_are_registered_and_authenticated() {
        // 401 proves the route resolved to a handler behind auth; an
        // unregistered route would be 404, a wrong method 405
        let id = "00000000-0000-0000-0000-000000000000";
        for uri in [
            format!("/api/clients/{}", id),
            format!("/api/locations/{}", id),
            format!("/api/job-codes/{}", id),
            format!("/api/service-types/{}", id),
        ] {
            assert_eq!(
                status_for("DELETE", &uri).await,
                StatusCode::UNAUTHORIZED,
                "DELETE {}",
                uri
            );
        }
    }

    #[tokio::test]
    async fn test_report_routes_are_registered_and_authenticated() {
        for uri in [
            "/api/reports/payroll",
            "/api/reports/billing",
            "/api/reports/hours-by-employee",
            "/api/reports/hours-by-job-code",
        ] {
            assert_eq!(
                status_for("GET", uri).await,
                StatusCode::UNAUTHORIZED,
                "GET {}",
                uri
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        assert_eq!(
            status_for("GET", "/api/nonexistent").await,
            StatusCode::NOT_FOUND
        );
    }
}
