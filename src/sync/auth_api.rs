use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::prelude::User;

use super::{RestClient, SyncError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

impl RestClient {
    /// Exchanges credentials for a session. The token is persisted before
    /// returning.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, SyncError> {
        let response: AuthResponse = self
            .send_json(Method::POST, "/api/auth/login", credentials)
            .await?;
        self.tokens().save(&response.token)?;
        info!(email = %credentials.email, "logged in");
        Ok(response)
    }

    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, SyncError> {
        let response: AuthResponse = self
            .send_json(Method::POST, "/api/auth/register", registration)
            .await?;
        self.tokens().save(&response.token)?;
        info!(email = %registration.email, "registered");
        Ok(response)
    }

    /// Checks the stored token with the backend and returns its user profile.
    pub async fn validate(&self) -> Result<User, SyncError> {
        self.get_json("/api/auth/validate").await
    }
}
