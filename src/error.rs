// Error taxonomy for setup (auth probe) and polling (dashboard fetch)

use serde::Serialize;

/// Auth probe failure during setup. Surfaced to the setup form, never logged as a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Probe answered 403.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Any other status, transport error or timeout.
    #[error("cannot connect to HaushaltsApp")]
    ConnectionFailed,
}

impl AuthError {
    /// Form error key shown by the setup flow.
    pub fn form_error(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_auth",
            AuthError::ConnectionFailed => "cannot_connect",
        }
    }
}

/// Dashboard fetch failure. Display text is the message reported to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FetchError {
    #[error("Authentifizierung fehlgeschlagen (403)")]
    AuthFailed,
    #[error("API Fehler: HTTP {0}")]
    ApiError(u16),
    #[error("Verbindungsfehler: {0}")]
    ConnectionError(String),
}
