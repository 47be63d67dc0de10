use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use riftwatch_proxy::ProxyError;
use serde::Serialize;
use tower_governor::GovernorError;

/// API error response structure
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
  pub error: String,
  pub message: String,
}

impl ErrorResponse {
  pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      error: error.into(),
      message: message.into(),
    }
  }
}

/// What a failed lookup was about, for user-facing messages.
#[derive(Debug)]
pub struct Lookup {
  /// Noun phrase for generic failures, e.g. "profile data".
  pub resource: &'static str,
  /// Error title when the upstream has no such record, e.g. "Profile not found".
  pub not_found: &'static str,
  /// Sentence naming the requested subject.
  pub not_found_message: String,
}

impl Lookup {
  pub fn new(
    resource: &'static str,
    not_found: &'static str,
    not_found_message: impl Into<String>,
  ) -> Self {
    Self {
      resource,
      not_found,
      not_found_message: not_found_message.into(),
    }
  }
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
  Proxy { source: ProxyError, lookup: Lookup },
  ValidationError(String),
}

impl AppError {
  pub fn lookup(source: ProxyError, lookup: Lookup) -> Self {
    AppError::Proxy { source, lookup }
  }
}

impl IntoResponse for AppError {
  fn into_response(self) -> Response {
    match self {
      AppError::Proxy { source, lookup } => {
        let (status, body) = match source {
          ProxyError::UnsupportedRegion(region) => {
            tracing::warn!(%region, "unsupported region requested");
            (
              StatusCode::BAD_REQUEST,
              ErrorResponse::new(
                "Unsupported region",
                format!("Region \"{region}\" is not supported"),
              ),
            )
          }
          ProxyError::NotFound => {
            tracing::debug!(resource = lookup.resource, "upstream has no such record");
            (
              StatusCode::NOT_FOUND,
              ErrorResponse::new(lookup.not_found, lookup.not_found_message),
            )
          }
          ProxyError::Forbidden => {
            tracing::error!("upstream rejected the API key");
            (
              StatusCode::FORBIDDEN,
              ErrorResponse::new(
                "API key invalid or expired",
                "Please check your Riot API key configuration",
              ),
            )
          }
          ProxyError::Timeout | ProxyError::Upstream(_) | ProxyError::MalformedResponse(_) => {
            // Log the detail server-side; don't expose upstream internals
            tracing::error!(error = %source, resource = lookup.resource, "upstream lookup failed");
            (
              StatusCode::INTERNAL_SERVER_ERROR,
              ErrorResponse::new(
                "Internal server error",
                format!("Failed to fetch {}", lookup.resource),
              ),
            )
          }
        };
        (status, Json(body)).into_response()
      }
      AppError::ValidationError(msg) => {
        tracing::warn!(validation_error = %msg, "Validation failed");
        let error_response = ErrorResponse::new("Invalid request parameters", msg);
        (StatusCode::BAD_REQUEST, Json(error_response)).into_response()
      }
    }
  }
}

impl From<crate::validation::ValidationError> for AppError {
  fn from(err: crate::validation::ValidationError) -> Self {
    AppError::ValidationError(err.to_string())
  }
}

/// Renders rate limiter rejections in the API error shape.
pub fn rate_limited(err: GovernorError) -> Response {
  match err {
    GovernorError::TooManyRequests { wait_time, headers } => {
      tracing::warn!(wait_time, "client rate limited");
      let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse::new(
          "Too many requests",
          format!("Rate limit exceeded, retry in {wait_time}s"),
        )),
      )
        .into_response();
      if let Some(headers) = headers {
        response.headers_mut().extend(headers);
      }
      response
    }
    GovernorError::UnableToExtractKey => {
      tracing::error!("rate limiter could not determine the client address");
      (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(
          "Internal server error",
          "Unable to identify client",
        )),
      )
        .into_response()
    }
    GovernorError::Other { code, msg, headers } => {
      let mut response = (
        code,
        Json(ErrorResponse::new(
          "Request rejected",
          msg.unwrap_or_else(|| "Request rejected by rate limiter".to_string()),
        )),
      )
        .into_response();
      if let Some(headers) = headers {
        response.headers_mut().extend(headers);
      }
      response
    }
  }
}

/// `TimeoutLayer` answers with an empty 408; give it the API error shape.
pub async fn timeout_as_json(response: Response) -> Response {
  if response.status() != StatusCode::REQUEST_TIMEOUT {
    return response;
  }
  tracing::warn!("request timed out");
  (
    StatusCode::REQUEST_TIMEOUT,
    Json(ErrorResponse::new(
      "Request timeout",
      "The request took too long to complete",
    )),
  )
    .into_response()
}
