use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error payload shape used by the remote story service:
/// `{ "error": { "title": ..., "message": ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteErrorBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteErrorEnvelope {
    pub error: RemoteErrorBody,
}

/// A non-success response from the remote service, with the remote message
/// passed through unmodified when the body carried one.
#[derive(Debug, Clone, Error)]
#[error("remote service returned {status}: {message}")]
pub struct RemoteServiceError {
    pub status: u16,
    pub message: String,
}

impl RemoteServiceError {
    /// Builds the error from a status code and whatever body text came back.
    /// Falls back to the raw body when it is not the documented envelope.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<RemoteErrorEnvelope>(body)
            .ok()
            .and_then(|envelope| envelope.error.message.or(envelope.error.title))
            .unwrap_or_else(|| body.trim().to_string());
        Self { status, message }
    }

    pub fn is_auth_failure(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}
