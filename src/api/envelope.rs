//! Response envelope shared by every Todolist API endpoint.

use serde::Deserialize;
use serde_json::Value;

use super::ApiError;

/// Every response body has the shape `{ data?, message?, errors? }`.
///
/// `errors` is polymorphic on the wire: validation failures arrive as a
/// map of field name to a list of messages, everything else as a plain
/// string. It is kept as a raw [`Value`] and flattened for display with
/// [`errors_text`].
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Value>,
}

impl<T> Envelope<T> {
    /// Extract the data payload, treating its absence as a malformed response.
    pub fn into_data(self) -> Result<T, ApiError> {
        self.data
            .ok_or_else(|| ApiError::Invalid("response envelope is missing data".to_string()))
    }

    /// Extract the confirmation message for endpoints that return no data.
    pub fn into_message(self) -> Result<String, ApiError> {
        self.message
            .ok_or_else(|| ApiError::Invalid("response envelope is missing message".to_string()))
    }
}

/// Flatten the `errors` field into a single displayable line.
pub fn errors_text(errors: &Value) -> String {
    match errors {
        Value::String(text) => text.clone(),
        Value::Object(fields) => fields
            .iter()
            .map(|(field, messages)| match messages {
                Value::Array(list) => {
                    let joined = list
                        .iter()
                        .map(|m| m.as_str().map_or_else(|| m.to_string(), str::to_string))
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("{}: {}", field, joined)
                }
                other => format!("{}: {}", field, other),
            })
            .collect::<Vec<_>>()
            .join("; "),
        other => other.to_string(),
    }
}
