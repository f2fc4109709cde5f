use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::AppError;

type HmacSha256 = Hmac<Sha256>;

const RESET_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Generate a password-reset token valid for one hour.
/// Token format: base64url(employee_id:expiry_timestamp:hmac_signature)
pub fn generate_reset_token(employee_id: Uuid, secret: &str) -> Result<String, AppError> {
    let expiry_time = chrono::Utc::now().timestamp() + RESET_TOKEN_TTL_SECS;

    let payload = format!("{}:{}", employee_id, expiry_time);
    let signature = create_hmac_signature(&payload, secret)?;
    let token_data = format!("{}:{}", payload, signature);

    Ok(URL_SAFE_NO_PAD.encode(token_data.as_bytes()))
}

/// Validate a reset token and extract the employee id it was issued for.
pub fn validate_reset_token(token: &str, secret: &str) -> Result<Uuid, AppError> {
    let decoded_bytes = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| AppError::BadRequest("Invalid or expired reset token".to_string()))?;

    let decoded = String::from_utf8(decoded_bytes)
        .map_err(|_| AppError::BadRequest("Invalid or expired reset token".to_string()))?;

    // employee_id:expiry_time:signature
    let parts: Vec<&str> = decoded.split(':').collect();
    if parts.len() != 3 {
        return Err(AppError::BadRequest(
            "Invalid or expired reset token".to_string(),
        ));
    }

    let employee_id: Uuid = parts[0]
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid or expired reset token".to_string()))?;

    let expiry_time: i64 = parts[1]
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid or expired reset token".to_string()))?;

    let token_signature = parts[2];

    let payload = format!("{}:{}", employee_id, expiry_time);
    let expected_signature = create_hmac_signature(&payload, secret)?;

    // Constant-time comparison to prevent timing attacks
    if expected_signature
        .as_bytes()
        .ct_eq(token_signature.as_bytes())
        .unwrap_u8()
        != 1
    {
        return Err(AppError::BadRequest(
            "Invalid or expired reset token".to_string(),
        ));
    }

    if chrono::Utc::now().timestamp() > expiry_time {
        return Err(AppError::BadRequest(
            "Reset token has expired. Please request a new one.".to_string(),
        ));
    }

    Ok(employee_id)
}

fn create_hmac_signature(data: &str, secret: &str) -> Result<String, AppError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Internal(format!("HMAC initialization error: {}", e)))?;

    mac.update(data.as_bytes());

    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_for_testing_purposes";

    #[test]
    fn test_generate_and_validate_token() {
        let employee_id = Uuid::new_v4();

        let token = generate_reset_token(employee_id, SECRET).unwrap();
        let validated = validate_reset_token(&token, SECRET).unwrap();

        assert_eq!(employee_id, validated);
    }

    #[test]
    fn test_invalid_token_format() {
        assert!(validate_reset_token("not-a-token", SECRET).is_err());
    }

    #[test]
    fn test_token_with_wrong_secret() {
        let token = generate_reset_token(Uuid::new_v4(), SECRET).unwrap();
        assert!(validate_reset_token(&token, "some_other_secret_key").is_err());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = generate_reset_token(Uuid::new_v4(), SECRET).unwrap();
        let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(&token).unwrap()).unwrap();
        let mut parts: Vec<String> = decoded.split(':').map(String::from).collect();
        parts[0] = Uuid::new_v4().to_string();
        let forged = URL_SAFE_NO_PAD.encode(parts.join(":").as_bytes());

        assert!(validate_reset_token(&forged, SECRET).is_err());
    }
}
