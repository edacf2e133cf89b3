//! Todo item model and its request payloads.

use serde::{Deserialize, Serialize};

/// A single todo item as the API returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Todo {
    pub id: String,
    pub todo: String,
    pub is_done: bool,
}

/// Payload for `POST todolist/add`.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TodoAddRequest {
    pub todo: String,
}

/// Payload for `PUT todolist/update/{id}`. The id travels in the path.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TodoUpdateRequest {
    pub todo: String,
    pub is_done: bool,
}
