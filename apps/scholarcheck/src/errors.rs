use thiserror::Error;

use crate::api_client::ApiError;
use crate::store::StorageError;

/// Shown when the backend gave no usable error detail.
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Client-level error type.
/// Every flow returns `Result<T, ClientError>`; `describe` turns it into the
/// single line the user sees.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Busy: {0}")]
    Busy(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// True for 401/403 responses. The matching token has already been
    /// invalidated by the API client when this is observed.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            ClientError::Api(ApiError::Unauthorized { .. } | ApiError::Forbidden { .. })
        )
    }

    /// Stable code plus a human-readable message.
    pub fn describe(&self) -> (&'static str, String) {
        match self {
            ClientError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            ClientError::Busy(msg) => ("BUSY", msg.clone()),
            ClientError::Api(ApiError::Unauthorized { .. }) => (
                "UNAUTHORIZED",
                "Your session has expired. Please log in again.".to_string(),
            ),
            ClientError::Api(ApiError::Forbidden { .. }) => (
                "FORBIDDEN",
                "You do not have access to this page. Please log in again.".to_string(),
            ),
            ClientError::Api(ApiError::Status { message, .. }) => ("API_ERROR", message.clone()),
            ClientError::Api(ApiError::Timeout) => (
                "TIMEOUT",
                "The server did not respond in time. Please try again.".to_string(),
            ),
            ClientError::Api(ApiError::Http(e)) => {
                tracing::error!("HTTP transport error: {e}");
                (
                    "TRANSPORT_ERROR",
                    "Could not reach the server. Please try again.".to_string(),
                )
            }
            ClientError::Api(ApiError::Parse(e)) => {
                tracing::error!("Unexpected response shape: {e}");
                ("PARSE_ERROR", GENERIC_ERROR_MESSAGE.to_string())
            }
            ClientError::Api(ApiError::InvalidUrl(url)) => (
                "CONFIG_ERROR",
                format!("The backend URL '{url}' is not usable. Check SCHOLARCHECK_API_URL."),
            ),
            ClientError::Storage(e) => {
                tracing::error!("Storage error: {e}");
                (
                    "STORAGE_ERROR",
                    "Local session storage could not be updated.".to_string(),
                )
            }
            ClientError::Io(e) => ("IO_ERROR", e.to_string()),
        }
    }

    pub fn user_message(&self) -> String {
        self.describe().1
    }
}
