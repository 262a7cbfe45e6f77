//! # Order API Client
//!
//! The widget talks to two endpoints of the top-up backend:
//!
//! - `POST /topup` creates an order and returns its identifier and invoice link.
//! - `GET /topup/{id}` returns the current status of an order.
//!
//! [`OrderApi`] is the seam the widget depends on; [`HttpOrderApi`] is the
//! production implementation and [`MockOrderApi`](crate::clients::mock::MockOrderApi)
//! the test double.

use crate::model::{CreatedOrder, OrderId, OrderStatus, TopupRequest};
use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Errors returned by remote calls.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("Backend rejected request ({code}): {detail}")]
    Status { code: u16, detail: String },

    /// The response body was not the JSON shape we expect.
    #[error("Invalid response body: {0}")]
    Decode(String),

    /// The configured base URL cannot carry path segments.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// Builds a `Status` error from a backend error body.
    ///
    /// The backend reports failures as `{"detail": "..."}`; validation failures
    /// carry a structured `detail`, which is kept as compact JSON. Any other
    /// body is passed through trimmed.
    pub fn from_error_body(code: u16, body: &str) -> Self {
        let detail = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(serde_json::Value::Object(map)) => match map.get("detail") {
                Some(serde_json::Value::String(s)) => s.clone(),
                Some(other) => other.to_string(),
                None => body.trim().to_string(),
            },
            _ => body.trim().to_string(),
        };
        ApiError::Status { code, detail }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// Remote operations the widget needs from the order backend.
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Create a new top-up order.
    async fn create_order(&self, request: &TopupRequest) -> Result<CreatedOrder, ApiError>;

    /// Fetch the current status of an order.
    async fn fetch_status(&self, id: &OrderId) -> Result<OrderStatus, ApiError>;
}

/// `OrderApi` over HTTP+JSON using a pooled `reqwest::Client`.
#[derive(Clone)]
pub struct HttpOrderApi {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpOrderApi {
    /// Creates a client for the backend at `base_url`.
    ///
    /// Every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(2)
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let err = ApiError::from_error_body(status.as_u16(), &body);
            warn!(code = status.as_u16(), error = %err, "Request rejected");
            return Err(err);
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl OrderApi for HttpOrderApi {
    #[instrument(skip(self, request), fields(provider = %request.provider, nominal = %request.nominal))]
    async fn create_order(&self, request: &TopupRequest) -> Result<CreatedOrder, ApiError> {
        let url = self.endpoint(&["topup"])?;
        debug!(?request, %url, "Sending create request");
        let response = self.http.post(url).json(request).send().await?;
        Self::decode(response).await
    }

    #[instrument(skip(self))]
    async fn fetch_status(&self, id: &OrderId) -> Result<OrderStatus, ApiError> {
        let url = self.endpoint(&["topup", id.as_str()])?;
        debug!(%url, "Fetching status");
        let response = self.http.get(url).send().await?;
        Self::decode(response).await
    }
}
