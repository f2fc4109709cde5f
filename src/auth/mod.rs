pub mod jwt;
pub mod password;
pub mod reset_token;

pub use jwt::{create_access_token, decode_access_token, AccessClaims};
pub use password::{hash_password, verify_password};
pub use reset_token::{generate_reset_token, validate_reset_token};
