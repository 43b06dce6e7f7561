//! The `{ success, message, data }` wrapper around every response body.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::ApiError;

/// Raw response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

const fn default_success() -> bool {
    true
}

impl Envelope {
    /// Reject `success: false` bodies.
    pub(crate) fn check(self) -> Result<Self, ApiError> {
        if self.success {
            Ok(self)
        } else {
            Err(ApiError::Rejected(
                self.message
                    .unwrap_or_else(|| "Request was not successful".to_string()),
            ))
        }
    }

    /// Decode `data`; a missing field decodes as JSON `null`.
    pub(crate) fn into_response<T: DeserializeOwned>(self) -> Result<ApiResponse<T>, ApiError> {
        let data = decode_data(self.data.unwrap_or(serde_json::Value::Null))?;
        Ok(ApiResponse {
            message: self.message,
            data,
        })
    }
}

pub(crate) fn decode_data<T: DeserializeOwned>(data: serde_json::Value) -> Result<T, ApiError> {
    serde_json::from_value(data).map_err(|e| {
        tracing::error!(error = %e, "Failed to decode response data");
        ApiError::Parse(e)
    })
}

/// A decoded mutation result and the server's message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse<T> {
    pub message: Option<String>,
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// The server message, or `fallback`.
    #[must_use]
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .clone()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_envelope() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"success": false, "message": "Invalid token"}"#).unwrap();
        let err = envelope.check().unwrap_err();
        assert_eq!(err.user_message(), "Invalid token");
    }

    #[test]
    fn test_missing_data_decodes_as_unit() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"success": true, "message": "Logged out"}"#).unwrap();
        let response: ApiResponse<()> = envelope.check().unwrap().into_response().unwrap();
        assert_eq!(response.message_or("Done"), "Logged out");
    }

    #[test]
    fn test_wrong_shape_is_parse_error() {
        let envelope: Envelope = serde_json::from_str(r#"{"data": {"items": 3}}"#).unwrap();
        let err = envelope.into_response::<Vec<String>>().unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }
}
