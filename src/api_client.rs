// HaushaltsApp terminal API client: auth probe + dashboard fetch over reqwest

use crate::error::{AuthError, FetchError};
use crate::models::{ConnectionConfig, DashboardSnapshot, HouseholdIdentity};
use crate::version::USER_AGENT;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::instrument;

pub const AUTH_PATH: &str = "/api/terminal/auth";
pub const DASHBOARD_PATH: &str = "/api/terminal/ha-dashboard";

/// Shared HTTP client for all households. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TerminalApi {
    http: reqwest::Client,
    auth_timeout: Duration,
    fetch_timeout: Duration,
}

impl TerminalApi {
    pub fn new(auth_timeout: Duration, fetch_timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(http, auth_timeout, fetch_timeout))
    }

    pub fn with_client(
        http: reqwest::Client,
        auth_timeout: Duration,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            http,
            auth_timeout,
            fetch_timeout,
        }
    }

    /// Single authenticated probe against `/api/terminal/auth`.
    /// 403 is `InvalidCredentials`; every other failure is `ConnectionFailed`.
    #[instrument(skip(self, token), fields(operation = "validate"))]
    pub async fn validate(
        &self,
        base_url: &str,
        token: &str,
    ) -> Result<HouseholdIdentity, AuthError> {
        let connection = ConnectionConfig::new(base_url, token);
        let resp = self
            .http
            .get(connection.endpoint(AUTH_PATH))
            .bearer_auth(&connection.token)
            .timeout(self.auth_timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "auth probe transport error");
                AuthError::ConnectionFailed
            })?;

        match resp.status() {
            StatusCode::OK => {
                let body: Value = resp.json().await.map_err(|e| {
                    tracing::debug!(error = %e, "auth probe body is not JSON");
                    AuthError::ConnectionFailed
                })?;
                Ok(HouseholdIdentity::from_auth_response(&body))
            }
            StatusCode::FORBIDDEN => Err(AuthError::InvalidCredentials),
            status => {
                tracing::debug!(status = status.as_u16(), "auth probe rejected");
                Err(AuthError::ConnectionFailed)
            }
        }
    }

    /// One GET of `/api/terminal/ha-dashboard`.
    #[instrument(skip(self, connection), fields(operation = "fetch_dashboard", base_url = %connection.base_url))]
    pub async fn fetch_dashboard(
        &self,
        connection: &ConnectionConfig,
    ) -> Result<DashboardSnapshot, FetchError> {
        let resp = self
            .http
            .get(connection.endpoint(DASHBOARD_PATH))
            .bearer_auth(&connection.token)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| self.connection_error(&e))?;

        match resp.status() {
            StatusCode::OK => {
                let body: Value = resp.json().await.map_err(|e| self.connection_error(&e))?;
                Ok(DashboardSnapshot::new(body))
            }
            StatusCode::FORBIDDEN => Err(FetchError::AuthFailed),
            status => Err(FetchError::ApiError(status.as_u16())),
        }
    }

    fn connection_error(&self, e: &reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::ConnectionError(format!(
                "timeout after {}s",
                self.fetch_timeout.as_secs_f64()
            ))
        } else {
            FetchError::ConnectionError(e.to_string())
        }
    }
}
