//! REST API client module for the fundraising service.
//!
//! This module provides the `ApiClient` for communicating with the API
//! to manage events and donations.
//!
//! The API uses JWT bearer tokens: a short-lived access token obtained
//! from `token/` and renewed through `token/refresh/`.

pub mod client;
pub mod error;
pub mod request;
pub mod resources;

pub use client::{ApiClient, REQUEST_TIMEOUT_SECS};
pub use error::{ApiError, ApiResult, LoginError};
pub use request::{ApiRequest, ApiResponse, FormPart, RequestBody};
