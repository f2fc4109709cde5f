use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Employee id
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn create_access_token(
    employee_id: Uuid,
    email: &str,
    secret: &str,
    expiry_minutes: i64,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = AccessClaims {
        sub: employee_id.to_string(),
        email: email.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(expiry_minutes)).timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign access token: {}", e)))
}

pub fn decode_access_token(token: &str, secret: &str) -> Result<AccessClaims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<AccessClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized("Could not validate credentials".to_string()))?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_at_least_32_chars_long";

    #[test]
    fn test_create_and_decode_token() {
        let id = Uuid::new_v4();
        let token = create_access_token(id, "jane@example.com", SECRET, 60).unwrap();
        let claims = decode_access_token(&token, SECRET).unwrap();

        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.email, "jane@example.com");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_access_token(Uuid::new_v4(), "jane@example.com", SECRET, 60).unwrap();
        let result = decode_access_token(&token, "a_completely_different_secret_key_here");

        assert!(result.is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = create_access_token(Uuid::new_v4(), "jane@example.com", SECRET, -5).unwrap();
        let result = decode_access_token(&token, SECRET);

        assert!(result.is_err());
    }
}
