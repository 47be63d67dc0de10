//! Upstream client.
//!
//! [`Upstream`] is the seam between the proxy service and the network. The
//! production implementation is [`HttpUpstream`]; tests substitute a double that
//! records calls.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;

use crate::error::UpstreamError;

/// Header carrying the upstream API credential.
pub const TOKEN_HEADER: &str = "x-riot-token";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// A single GET against the upstream API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub url: Url,
    pub query: Vec<(&'static str, String)>,
    /// Whether the credential header is attached. Public CDN requests must not leak it.
    pub authenticated: bool,
}

impl UpstreamRequest {
    /// Build a request by appending percent-encoded path segments to `base`.
    pub fn new<I, S>(mut base: Url, segments: I) -> Result<Self, UpstreamError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        base.path_segments_mut()
            .map_err(|_| UpstreamError::Transport("base url cannot take path segments".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(Self {
            url: base,
            query: Vec::new(),
            authenticated: true,
        })
    }

    pub fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    pub fn unauthenticated(mut self) -> Self {
        self.authenticated = false;
        self
    }
}

#[async_trait]
pub trait Upstream: Send + Sync {
    /// Perform the request and return the parsed JSON body of a 2xx response.
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, UpstreamError>;
}

/// reqwest-backed upstream with a fixed credential and per-call timeout.
#[derive(Clone)]
pub struct HttpUpstream {
    client: Client,
    credential: Option<HeaderValue>,
}

impl HttpUpstream {
    pub fn new(api_key: Option<&str>, timeout: Duration) -> Result<Self, UpstreamError> {
        let credential = match api_key {
            Some(key) => {
                let mut value = HeaderValue::from_str(key).map_err(|_| {
                    UpstreamError::Transport("api key is not a valid header value".to_string())
                })?;
                value.set_sensitive(true);
                Some(value)
            }
            None => {
                tracing::warn!("no upstream API key configured; authenticated calls will be rejected");
                None
            }
        };

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpstreamError::Transport(format!("failed to build upstream client: {e}")))?;

        Ok(Self { client, credential })
    }

    fn headers_for(&self, request: &UpstreamRequest) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if request.authenticated {
            if let Some(credential) = &self.credential {
                headers.insert(TOKEN_HEADER, credential.clone());
            }
        }
        headers
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch(&self, request: &UpstreamRequest) -> Result<Value, UpstreamError> {
        tracing::debug!(url = %request.url, "upstream request");

        let response = self
            .client
            .get(request.url.clone())
            .query(&request.query)
            .headers(self.headers_for(request))
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if let Some(err) = classify_status(status) {
            tracing::warn!(url = %request.url, %status, "upstream returned non-success");
            return Err(err);
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

/// Map a non-success status to its error class. Returns `None` for 2xx.
pub fn classify_status(status: StatusCode) -> Option<UpstreamError> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::NOT_FOUND => UpstreamError::NotFound,
        StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
            UpstreamError::Forbidden(status.as_u16())
        }
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => UpstreamError::Timeout,
        other => UpstreamError::Status(other.as_u16()),
    })
}

fn classify_transport(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://americas.api.riotgames.com").unwrap()
    }

    #[test]
    fn test_segments_are_percent_encoded() {
        let request =
            UpstreamRequest::new(base(), ["riot", "account", "by-riot-id", "Faker fan", "KR#1"])
                .unwrap();
        assert_eq!(
            request.url.as_str(),
            "https://americas.api.riotgames.com/riot/account/by-riot-id/Faker%20fan/KR%231"
        );
        assert!(request.authenticated);
    }

    #[test]
    fn test_query_and_auth_flags() {
        let request = UpstreamRequest::new(base(), ["ids"])
            .unwrap()
            .query("start", 5)
            .query("count", 10)
            .unauthenticated();
        assert_eq!(
            request.query,
            vec![("start", "5".to_string()), ("count", "10".to_string())]
        );
        assert!(!request.authenticated);
    }

    #[test]
    fn test_status_classification() {
        assert_eq!(classify_status(StatusCode::OK), None);
        assert_eq!(
            classify_status(StatusCode::NOT_FOUND),
            Some(UpstreamError::NotFound)
        );
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN),
            Some(UpstreamError::Forbidden(403))
        );
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED),
            Some(UpstreamError::Forbidden(401))
        );
        assert_eq!(
            classify_status(StatusCode::GATEWAY_TIMEOUT),
            Some(UpstreamError::Timeout)
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            Some(UpstreamError::Status(429))
        );
    }

    #[test]
    fn test_credential_only_on_authenticated_requests() {
        let upstream = HttpUpstream::new(Some("RGAPI-test"), DEFAULT_TIMEOUT).unwrap();
        let authed = UpstreamRequest::new(base(), ["x"]).unwrap();
        let public = authed.clone().unauthenticated();

        assert_eq!(
            upstream.headers_for(&authed).get(TOKEN_HEADER).unwrap(),
            "RGAPI-test"
        );
        assert!(upstream.headers_for(&public).get(TOKEN_HEADER).is_none());
    }

    #[test]
    fn test_missing_key_sends_no_header() {
        let upstream = HttpUpstream::new(None, DEFAULT_TIMEOUT).unwrap();
        let authed = UpstreamRequest::new(base(), ["x"]).unwrap();
        assert!(upstream.headers_for(&authed).is_empty());
    }
}
