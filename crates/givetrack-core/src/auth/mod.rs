//! Authentication module for managing user sessions.
//!
//! This module provides:
//! - `SessionManager`: owner of the current credentials, emitting
//!   `SessionEvent`s for the view layer
//! - `SessionStore`: durable storage, backed by a JSON file, the OS
//!   keychain or memory

pub mod credentials;
pub mod session;
pub mod store;

pub use credentials::KeyringSessionStore;
pub use session::{SessionData, SessionEvent, SessionManager};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
