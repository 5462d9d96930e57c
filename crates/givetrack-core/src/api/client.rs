//! API client for the fundraising REST API.
//!
//! `ApiClient::send` is the single path every authenticated call takes:
//! it attaches the current access token, and when the server answers 401
//! it refreshes the token once and replays the request once. If the
//! refresh fails the session is torn down and subscribers receive
//! `SessionEvent::Invalidated`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{multipart, Client, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::auth::{SessionData, SessionManager};
use crate::models::UserProfile;

use super::request::{FormPart, RequestBody, TOKEN_PATH, TOKEN_REFRESH_PATH, USER_PATH};
use super::{ApiError, ApiRequest, ApiResponse, ApiResult, LoginError};

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenPair {
    access: String,
    refresh: String,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

/// API client with bearer-token session handling.
/// Clone is cheap - the HTTP client, session and refresh gate are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    session: Arc<SessionManager>,
    // Held while refreshing so concurrent 401s share one refresh call
    refresh_gate: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a client for the API rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration, session: Arc<SessionManager>) -> Result<Self> {
        // Url::join drops the last path segment unless the base ends in '/'
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized)
            .with_context(|| format!("Invalid API base URL: {}", base_url))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url,
            session,
            refresh_gate: Arc::new(Mutex::new(())),
        })
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ===== Request Pipeline =====

    /// Send a request with the current access token, recovering once from
    /// an expired token.
    ///
    /// Non-401 failures are returned unchanged. A 401 from the token
    /// endpoints, or from the replayed request, is returned as
    /// `ApiError::Unauthorized`. When the refresh itself fails the session
    /// is invalidated and the result is `ApiError::SessionExpired`.
    pub async fn send(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        let mut bearer = self.session.access_token().await;
        let mut retried = false;

        loop {
            let response = self.dispatch(request, bearer.as_deref()).await?;
            if !response.is_unauthorized() {
                return response.error_for_status();
            }

            if request.is_auth_endpoint() {
                debug!(path = %request.path, "Token endpoint returned 401");
                return Err(ApiError::Unauthorized);
            }
            if retried {
                warn!(path = %request.path, "Request rejected again after token refresh");
                return Err(ApiError::Unauthorized);
            }
            retried = true;

            debug!(path = %request.path, "Access token rejected, refreshing");
            match self.refresh_access_token(bearer.as_deref()).await {
                Ok(access) => bearer = Some(access),
                Err(e) => {
                    warn!(error = %e, "Token refresh failed");
                    self.session.invalidate().await;
                    return Err(ApiError::SessionExpired(Box::new(e)));
                }
            }
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// `rejected` is the access token the server just refused. If another
    /// request already replaced it while this one waited for the gate, the
    /// stored token is reused without a second refresh call.
    async fn refresh_access_token(&self, rejected: Option<&str>) -> ApiResult<String> {
        let _gate = self.refresh_gate.lock().await;

        let current = self.session.access_token().await;
        if let Some(ref token) = current {
            if rejected != Some(token.as_str()) {
                debug!("Access token already refreshed by a concurrent request");
                return Ok(token.clone());
            }
        }

        let Some(refresh) = self.session.refresh_token().await else {
            warn!("No refresh token available");
            return Err(ApiError::Unauthorized);
        };

        let request =
            ApiRequest::post_json(TOKEN_REFRESH_PATH, &RefreshRequest { refresh: &refresh })?;
        let tokens: RefreshResponse = self
            .dispatch(&request, current.as_deref())
            .await?
            .error_for_status()?
            .json()?;

        if !self.session.set_after_refresh(&tokens.access).await {
            return Err(ApiError::Unauthorized);
        }
        info!("Access token refreshed");
        Ok(tokens.access)
    }

    /// Perform one HTTP exchange. No session handling happens here.
    async fn dispatch(&self, request: &ApiRequest, bearer: Option<&str>) -> ApiResult<ApiResponse> {
        let url = self.base_url.join(&request.path).map_err(|e| {
            ApiError::InvalidRequest(format!("Invalid path {}: {}", request.path, e))
        })?;

        let mut builder = self.client.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(Self::build_form(parts)?),
        };

        debug!(method = %request.method, path = %request.path, "Sending request");
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(method = %request.method, path = %request.path, status = %status, "Response received");

        Ok(ApiResponse::new(status, body))
    }

    fn build_form(parts: &[FormPart]) -> ApiResult<multipart::Form> {
        let mut form = multipart::Form::new();
        for part in parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                FormPart::File {
                    name,
                    file_name,
                    bytes,
                    mime,
                } => {
                    let mut file = multipart::Part::bytes(bytes.clone()).file_name(file_name.clone());
                    if let Some(mime) = mime {
                        file = file.mime_str(mime).map_err(|e| {
                            ApiError::InvalidRequest(format!("Invalid content type {}: {}", mime, e))
                        })?;
                    }
                    form.part(name.clone(), file)
                }
            };
        }
        Ok(form)
    }

    // ===== Authentication =====

    /// Log in and persist the new session.
    ///
    /// Any stored credentials are cleared first so no stale bearer token
    /// accompanies the login call. Every failure maps to the same
    /// `InvalidCredentials` error so callers cannot tell which field was
    /// wrong; the cause is logged.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, LoginError> {
        self.session.clear().await;

        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(LoginError::MissingFields);
        }

        let data = match self.authenticate(username, password).await {
            Ok(data) => data,
            Err(e) => {
                error!(error = %e, "Login failed");
                self.session.clear().await;
                return Err(LoginError::InvalidCredentials);
            }
        };

        let user = data.user();
        if let Err(e) = self.session.set_after_login(data).await {
            error!(error = %e, "Failed to persist session");
            self.session.clear().await;
            return Err(LoginError::Storage(e.to_string()));
        }
        Ok(user)
    }

    /// Obtain a token pair and the matching profile without touching the
    /// session. The profile call uses the new token directly so a 401 here
    /// cannot start a refresh cycle.
    async fn authenticate(&self, username: &str, password: &str) -> ApiResult<SessionData> {
        let request = ApiRequest::post_json(TOKEN_PATH, &LoginRequest { username, password })?;
        let tokens: TokenPair = self.dispatch(&request, None).await?.error_for_status()?.json()?;

        let user: UserProfile = self
            .dispatch(&ApiRequest::get(USER_PATH), Some(&tokens.access))
            .await?
            .error_for_status()?
            .json()?;

        Ok(SessionData::new(tokens.access, tokens.refresh, user))
    }

    /// Clear the session. Safe to call when already logged out.
    pub async fn logout(&self) {
        self.session.logout().await;
    }

    /// Fetch the profile for the current access token
    pub async fn current_user(&self) -> ApiResult<UserProfile> {
        self.send(&ApiRequest::get(USER_PATH)).await?.json()
    }
}
