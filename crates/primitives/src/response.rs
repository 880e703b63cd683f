use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ErrorKind};

/// Error object inside a failed envelope.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: String,
}

/// The `{success, data, error}` wrapper every backend response arrives in.
///
/// `data` is kept as raw JSON until the caller names the type it expects, so
/// a payload of the wrong shape surfaces as [`ErrorKind::Unknown`] instead of
/// failing the whole envelope.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

impl ApiResponse {
    /// Envelope for an empty success body (e.g. `204 No Content`).
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    /// Unwraps the payload of a successful envelope.
    ///
    /// A missing `data` field decodes as JSON `null`, which is what unit
    /// results expect.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        if !self.success {
            let message = self.error.map(|e| e.message).unwrap_or_default();
            return Err(ApiError::new(ErrorKind::Unknown, message));
        }

        serde_json::from_value(self.data.unwrap_or(Value::Null)).map_err(|err| {
            ApiError::new(
                ErrorKind::Unknown,
                format!("Malformed response payload: {err}"),
            )
        })
    }

    /// The backend's own message, when it sent a non-blank one.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .map(|e| e.message.as_str())
            .filter(|m| !m.trim().is_empty())
    }
}
