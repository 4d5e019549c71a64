//! The single point of entry for every backend call.
//!
//! No other module talks HTTP to the backend directly. Each request carries
//! the bearer token of its scope, JSON bodies go out as JSON and multipart
//! bodies keep the boundary reqwest generates. A 401/403 clears the scope's
//! token before the error reaches the caller. Nothing is retried.

use std::sync::Arc;
use std::time::Duration;

use reqwest::multipart::Form;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, Instrument};
use uuid::Uuid;

use crate::errors::GENERIC_ERROR_MESSAGE;
use crate::store::{Session, TokenScope};

pub mod admin;
pub mod auth;
pub mod scholarships;

const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Query pairs; encoded by reqwest.
pub(crate) type Query<'a> = &'a [(&'a str, String)];

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("forbidden: {message}")]
    Forbidden { message: String },

    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid backend URL '{0}'")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Http(e)
        }
    }
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Forbidden { .. } => Some(403),
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub(crate) enum Body {
    Empty,
    Json(Value),
    Multipart(Form),
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, session: Arc<Session>) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::InvalidUrl(base_url.to_string()))?;
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            base_url,
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// `{base}/api/v1/{segments...}`. Each segment is percent-encoded, so an
    /// id containing `/` or `?` stays one segment.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: Query<'_>,
        scope: TokenScope,
    ) -> Result<T, ApiError> {
        self.send(Method::GET, segments, query, scope, Body::Empty)
            .await
    }

    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: Query<'_>,
        scope: TokenScope,
        body: Body,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        let request_id = Uuid::new_v4();
        let span = tracing::debug_span!("api_request", %request_id, %method, path = url.path());
        self.send_inner(method, url, query, scope, body, request_id)
            .instrument(span)
            .await
    }

    async fn send_inner<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        query: Query<'_>,
        scope: TokenScope,
        body: Body,
        request_id: Uuid,
    ) -> Result<T, ApiError> {
        let mut request = self
            .http
            .request(method, url)
            .header("x-request-id", request_id.to_string());

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(token) = self.session.token(scope) {
            request = request.bearer_auth(token);
        }

        request = match body {
            Body::Empty => request,
            Body::Json(value) => request.json(&value),
            Body::Multipart(form) => request.multipart(form),
        };

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "response received");

        if status.is_success() {
            return decode(&text);
        }

        let message = error_message(&text);
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                if let Err(e) = self.session.invalidate(scope) {
                    error!("failed to clear rejected token: {e}");
                }
                if status == StatusCode::UNAUTHORIZED {
                    Err(ApiError::Unauthorized { message })
                } else {
                    Err(ApiError::Forbidden { message })
                }
            }
            _ => Err(ApiError::Status {
                status: status.as_u16(),
                message,
            }),
        }
    }
}

/// Empty bodies decode as JSON `null`, so `()` and `Option<T>` accept them.
fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    if text.trim().is_empty() {
        return Ok(serde_json::from_value(Value::Null)?);
    }
    Ok(serde_json::from_str(text)?)
}

/// Picks the backend's error detail: `detail`, then `message`, then `error`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["detail", "message", "error"].iter().find_map(|key| {
                value
                    .get(*key)
                    .and_then(Value::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| GENERIC_ERROR_MESSAGE.to_string())
}
