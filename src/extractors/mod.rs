pub mod auth;

pub use auth::AuthenticatedEmployee;
