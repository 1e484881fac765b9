//! Error taxonomy of remote calls
//!
//! Every failure of a call ends up as one of these variants and is turned
//! into a notice at the action that issued it. Nothing is retried.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("not authenticated")]
    Unauthenticated,

    #[error("forbidden: {}", .detail.as_deref().unwrap_or("-"))]
    Forbidden { detail: Option<String> },

    #[error("not found: {}", .detail.as_deref().unwrap_or("-"))]
    NotFound { detail: Option<String> },

    #[error("rejected ({status}): {}", .detail.as_deref().unwrap_or("-"))]
    Rejected { status: u16, detail: Option<String> },

    #[error("server error ({status}): {}", .detail.as_deref().unwrap_or("-"))]
    Server { status: u16, detail: Option<String> },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("{0}")]
    InvalidInput(String),
}

impl ApiError {
    /// Classifies a non-success HTTP response
    pub fn from_status(status: StatusCode, body: &str, is_login: bool) -> Self {
        let detail = extract_detail(body);
        match status {
            StatusCode::UNAUTHORIZED if is_login => ApiError::InvalidCredentials,
            StatusCode::UNAUTHORIZED => ApiError::Unauthenticated,
            StatusCode::FORBIDDEN => ApiError::Forbidden { detail },
            StatusCode::NOT_FOUND => ApiError::NotFound { detail },
            s if s.is_server_error() => ApiError::Server {
                status: s.as_u16(),
                detail,
            },
            s => ApiError::Rejected {
                status: s.as_u16(),
                detail,
            },
        }
    }

    /// Whether the session must be dropped
    pub fn ends_session(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
    }

    /// Text shown to the user. `fallback` is the action's generic failure line.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::InvalidCredentials => "Invalid credentials".to_string(),
            ApiError::Unauthenticated => "Your session expired, please log in again".to_string(),
            ApiError::Forbidden { detail } => detail
                .clone()
                .unwrap_or_else(|| "You are not allowed to do that".to_string()),
            ApiError::NotFound { detail } | ApiError::Rejected { detail, .. } => {
                detail.clone().unwrap_or_else(|| fallback.to_string())
            }
            ApiError::Timeout => "The server did not answer in time".to_string(),
            ApiError::InvalidInput(msg) => msg.clone(),
            ApiError::Server { .. } | ApiError::Network(_) | ApiError::Decode(_) => fallback.to_string(),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else if e.is_connect() {
            ApiError::Network(format!("connection failed: {}", e))
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

/// Pulls the `detail` message out of an error body.
///
/// `detail` is either a plain string or a list of validation entries
/// carrying a `msg` each.
pub fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => {
            let messages: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string_and_list() {
        assert_eq!(
            extract_detail(r#"{"detail": "Order is not available"}"#).as_deref(),
            Some("Order is not available")
        );
        assert_eq!(
            extract_detail(r#"{"detail": [{"msg": "field required"}, {"msg": "value is not a valid float"}]}"#)
                .as_deref(),
            Some("field required; value is not a valid float")
        );
        assert_eq!(extract_detail("<html>oops</html>"), None);
        assert_eq!(extract_detail(r#"{"error": "x"}"#), None);
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "", true),
            ApiError::InvalidCredentials
        );
        assert_eq!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "", false),
            ApiError::Unauthenticated
        );
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "", false),
            ApiError::Forbidden { detail: None }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "", false),
            ApiError::Rejected { status: 422, .. }
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, "", false),
            ApiError::Server { status: 502, .. }
        ));
    }

    #[test]
    fn test_user_message_prefers_server_detail() {
        let err = ApiError::Rejected {
            status: 400,
            detail: Some("Payout already processed".into()),
        };
        assert_eq!(err.user_message("Could not process payout"), "Payout already processed");

        let err = ApiError::Rejected { status: 400, detail: None };
        assert_eq!(err.user_message("Could not process payout"), "Could not process payout");

        let err = ApiError::Server { status: 500, detail: Some("Database error: boom".into()) };
        assert_eq!(err.user_message("Could not load orders"), "Could not load orders");
    }
}
