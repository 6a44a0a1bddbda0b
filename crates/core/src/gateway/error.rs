use std::fmt;

/// Failure of a single call to the remote recommendation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The request never produced a 2xx response. `status` is `None` for
    /// transport failures (DNS, connect, timeout, reset).
    RemoteCall {
        url: String,
        status: Option<u16>,
        reason: String,
    },
    /// The body of a successful response was not the expected JSON.
    Decode { url: String, detail: String },
}

impl GatewayError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::RemoteCall { status, .. } => *status,
            GatewayError::Decode { .. } => None,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            GatewayError::RemoteCall { url, .. } | GatewayError::Decode { url, .. } => url,
        }
    }

    pub(crate) fn transport(url: &str, err: &reqwest::Error) -> Self {
        GatewayError::RemoteCall {
            url: url.to_string(),
            status: err.status().map(|s| s.as_u16()),
            reason: err.to_string(),
        }
    }

    pub(crate) fn http(url: &str, status: reqwest::StatusCode) -> Self {
        GatewayError::RemoteCall {
            url: url.to_string(),
            status: Some(status.as_u16()),
            reason: status.canonical_reason().unwrap_or("Unknown Status").to_string(),
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::RemoteCall {
                url,
                status: Some(status),
                reason,
            } => write!(f, "remote call failed (url={url}): {status} {reason}"),
            GatewayError::RemoteCall {
                url,
                status: None,
                reason,
            } => write!(f, "remote call failed (url={url}): {reason}"),
            GatewayError::Decode { url, detail } => {
                write!(f, "failed to decode response (url={url}): {detail}")
            }
        }
    }
}

impl std::error::Error for GatewayError {}
