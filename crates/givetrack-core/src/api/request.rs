//! Request and response descriptors for the API pipeline.
//!
//! A request is plain data rather than a built `reqwest::RequestBuilder`
//! so the pipeline can dispatch it a second time after refreshing the
//! access token.

use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use super::{ApiError, ApiResult};

/// Login endpoint: username + password in, access + refresh tokens out
pub const TOKEN_PATH: &str = "token/";

/// Refresh endpoint: refresh token in, new access token out
pub const TOKEN_REFRESH_PATH: &str = "token/refresh/";

/// Current user profile for the bearer token
pub const USER_PATH: &str = "user/";

/// One field of a multipart form body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        bytes: Vec<u8>,
        mime: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, e.g. `events/12/`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            method,
            path: path.trim_start_matches('/').to_string(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn post_json<B: Serialize>(path: impl Into<String>, body: &B) -> ApiResult<Self> {
        Self::new(Method::POST, path).with_json(body)
    }

    pub fn post_form(path: impl Into<String>, parts: Vec<FormPart>) -> Self {
        Self::new(Method::POST, path).with_form(parts)
    }

    pub fn put_form(path: impl Into<String>, parts: Vec<FormPart>) -> Self {
        Self::new(Method::PUT, path).with_form(parts)
    }

    pub fn with_json<B: Serialize>(mut self, body: &B) -> ApiResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode body: {}", e)))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn with_form(mut self, parts: Vec<FormPart>) -> Self {
        self.body = RequestBody::Multipart(parts);
        self
    }

    pub fn with_query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Requests to the token endpoints never go through refresh-and-retry,
    /// otherwise a rejected refresh would try to refresh itself.
    pub fn is_auth_endpoint(&self) -> bool {
        self.path == TOKEN_PATH || self.path == TOKEN_REFRESH_PATH
    }
}

/// A completed HTTP exchange: status plus the raw body text
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == StatusCode::UNAUTHORIZED
    }

    /// Convert non-success statuses into the matching `ApiError`
    pub fn error_for_status(self) -> ApiResult<Self> {
        if self.status.is_success() {
            Ok(self)
        } else {
            Err(ApiError::from_status(self.status, &self.body))
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response: {}", e))
        })
    }
}
