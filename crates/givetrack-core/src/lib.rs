//! Core library for givetrack.
//!
//! Provides the authenticated API client for the fundraising service,
//! session management with durable storage, and the event and donation
//! models shared by front ends.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, ApiResult, LoginError};
pub use auth::{SessionData, SessionEvent, SessionManager};
pub use config::Config;
