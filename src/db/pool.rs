use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

use crate::AppConfig;

/// Connection pool sized from configuration. The short acquire timeout
/// surfaces saturation as request errors instead of queueing callers behind
/// long report queries.
pub async fn create_pool(config: &AppConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .connect(&config.database_url)
        .await
}
