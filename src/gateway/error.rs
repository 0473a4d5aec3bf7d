use thiserror::Error;

/// Uniform failure shape of every gateway call.
#[derive(Clone, Debug, Error, PartialEq)]
#[error("{message}")]
pub struct GatewayError {
    /// HTTP status, or 0 when the request never got a response.
    pub status: u16,
    pub message: String,
    /// Parsed JSON error body, when the server sent one.
    pub data: Option<serde_json::Value>,
}

impl GatewayError {
    pub const NETWORK_STATUS: u16 = 0;

    pub fn network(err: impl std::fmt::Display) -> Self {
        Self {
            status: Self::NETWORK_STATUS,
            message: err.to_string(),
            data: None,
        }
    }

    pub fn is_network(&self) -> bool {
        self.status == Self::NETWORK_STATUS
    }

    /// Error for a non-2xx response: the JSON body's `message` when present,
    /// otherwise the status text.
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        let data: Option<serde_json::Value> = serde_json::from_str(body).ok();
        let message = data
            .as_ref()
            .and_then(|d| d.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.as_str().to_string())
            });
        Self {
            status: status.as_u16(),
            message,
            data,
        }
    }
}

#[cfg(test)]
#[path = "../tests/gateway/error_tests.rs"]
mod tests;
