use thiserror::Error;

/// Outcome classes of a single upstream HTTP call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("upstream resource not found")]
    NotFound,

    #[error("upstream rejected the credential (status {0})")]
    Forbidden(u16),

    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream returned unexpected status {0}")]
    Status(u16),

    #[error("upstream request failed: {0}")]
    Transport(String),

    #[error("failed to decode upstream response: {0}")]
    Decode(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProxyError {
    #[error("unsupported region: {0}")]
    UnsupportedRegion(String),

    #[error("resource not found upstream")]
    NotFound,

    #[error("upstream credential invalid or expired")]
    Forbidden,

    #[error("upstream request timed out")]
    Timeout,

    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),
}

impl From<UpstreamError> for ProxyError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::NotFound => ProxyError::NotFound,
            UpstreamError::Forbidden(_) => ProxyError::Forbidden,
            UpstreamError::Timeout => ProxyError::Timeout,
            UpstreamError::Decode(detail) => ProxyError::MalformedResponse(detail),
            other @ (UpstreamError::Status(_) | UpstreamError::Transport(_)) => {
                ProxyError::Upstream(other.to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
