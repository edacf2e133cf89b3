//! HTTP client layer for the Todolist API.
//!
//! `Gateway` owns the request pipeline: bearer-token injection and the
//! one-shot refresh-and-retry cycle on 401 responses. `ApiClient`
//! provides the typed endpoint operations on top of it.

pub mod client;
pub mod envelope;
pub mod error;
pub mod gateway;

pub use client::ApiClient;
pub use envelope::Envelope;
pub use error::ApiError;
pub use gateway::Gateway;
