use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    pub access_token_expiry_minutes: i64,
    pub cors_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL must be set".to_string())?;

        // Sized for a single-instance deployment; raise per instance when
        // running more than one replica against the same database
        let database_max_connections = match env::var("DATABASE_MAX_CONNECTIONS") {
            Ok(v) => v
                .parse::<u32>()
                .map_err(|_| "DATABASE_MAX_CONNECTIONS must be an integer".to_string())?,
            Err(_) => 10,
        };

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET must be set".to_string())?;

        if jwt_secret.len() < 32 {
            return Err("JWT_SECRET must be at least 32 characters".to_string());
        }

        // Default: one week, matching the frontend session length
        let access_token_expiry_minutes = match env::var("ACCESS_TOKEN_EXPIRY_MINUTES") {
            Ok(v) => v
                .parse::<i64>()
                .map_err(|_| "ACCESS_TOKEN_EXPIRY_MINUTES must be an integer".to_string())?,
            Err(_) => 60 * 24 * 7,
        };

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            database_url,
            database_max_connections,
            jwt_secret,
            access_token_expiry_minutes,
            cors_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_reads_pool_size_and_defaults() {
        env::set_var("DATABASE_URL", "postgres://localhost/myhours_test");
        env::set_var("JWT_SECRET", "test_secret_key_at_least_32_chars_long");
        env::set_var("DATABASE_MAX_CONNECTIONS", "7");
        env::remove_var("ACCESS_TOKEN_EXPIRY_MINUTES");
        env::remove_var("CORS_ORIGIN");

        let config = AppConfig::from_env().unwrap();

        assert_eq!(config.database_max_connections, 7);
        assert_eq!(config.access_token_expiry_minutes, 60 * 24 * 7);
        assert_eq!(config.cors_origin, "http://localhost:3000");

        env::remove_var("DATABASE_MAX_CONNECTIONS");
    }
}
