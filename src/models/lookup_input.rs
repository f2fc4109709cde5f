use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{AppError, AppResult};

fn require_non_empty(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateClientInput {
    pub name: String,
    pub industry: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CreateClientInput {
    pub fn validate(&self) -> AppResult<()> {
        require_non_empty(&self.name, "Client name")
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateClientInput {
    pub name: Option<String>,
    pub industry: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLocationInput {
    pub client_id: Uuid,
    pub region: Option<String>,
    pub site_name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CreateLocationInput {
    pub fn validate(&self) -> AppResult<()> {
        require_non_empty(&self.site_name, "Site name")
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLocationInput {
    pub region: Option<String>,
    pub site_name: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateJobCodeInput {
    pub location_id: Uuid,
    pub code: String,
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CreateJobCodeInput {
    pub fn validate(&self) -> AppResult<()> {
        require_non_empty(&self.code, "Job code")
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateJobCodeInput {
    pub code: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateServiceTypeInput {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_billable: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CreateServiceTypeInput {
    pub fn validate(&self) -> AppResult<()> {
        require_non_empty(&self.name, "Service type name")
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateServiceTypeInput {
    pub name: Option<String>,
    pub is_billable: Option<bool>,
    pub is_active: Option<bool>,
}

fn default_true() -> bool {
    true
}
