//! taskdeck - a client for the Todolist REST API.
//!
//! The crate is built around an authenticated request gateway
//! ([`api::Gateway`]): every outbound call attaches the current bearer
//! token, and a 401 response triggers exactly one refresh-and-retry
//! cycle before the failure is surfaced. [`api::ApiClient`] layers the
//! typed endpoint operations (auth, user profile, todolist CRUD) on top
//! of the gateway, and [`auth::Session`] owns the credential with a
//! watch channel for authentication changes.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
