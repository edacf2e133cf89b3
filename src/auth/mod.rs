//! Session and credential storage.
//!
//! This module provides:
//! - `Session`: shared handle owning the bearer token, with a watch
//!   channel signaling authentication changes
//! - `CredentialStore`: OS-level token persistence via keyring

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::Session;
