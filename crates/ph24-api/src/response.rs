//! Normalized response envelope
//!
//! Every endpoint call yields an [`ApiResponse`] regardless of how the call
//! went: transport failures carry `code == 0`, bodies that are not JSON are
//! kept verbatim, and decoded JSON is exposed through typed accessors.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// Decoded body of a response
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Body parsed as JSON
    Json(Value),
    /// Body text that failed to parse as JSON
    Malformed(String),
    /// The request never produced an HTTP status
    Transport(String),
}

/// `{code, data}` pair returned by every client call
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status, or 0 when the transport failed
    pub code: u16,
    pub data: Payload,
}

impl ApiResponse {
    /// Build a response from a received status and body text
    pub fn from_body(code: u16, body: &str) -> Self {
        let data = match serde_json::from_str::<Value>(body) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Malformed(body.to_string()),
        };
        Self { code, data }
    }

    /// Build the response for a request that failed below HTTP
    pub fn transport_error(message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "transport error".to_string();
        }
        Self {
            code: 0,
            data: Payload::Transport(message),
        }
    }

    /// Status is in `[200, 300)`
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(self.data, Payload::Transport(_))
    }

    /// Decoded JSON body, if the body was JSON
    pub fn json(&self) -> Option<&Value> {
        match &self.data {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Raw body text when it was not valid JSON
    pub fn raw(&self) -> Option<&str> {
        match &self.data {
            Payload::Malformed(raw) => Some(raw),
            _ => None,
        }
    }

    /// Transport error text
    pub fn transport_message(&self) -> Option<&str> {
        match &self.data {
            Payload::Transport(message) => Some(message),
            _ => None,
        }
    }

    /// Loosely-typed view of `data`: the JSON body, `{"raw": ..}` or `{"error": ..}`
    pub fn data_value(&self) -> Value {
        match &self.data {
            Payload::Json(value) => value.clone(),
            Payload::Malformed(raw) => json!({ "raw": raw }),
            Payload::Transport(message) => json!({ "error": message }),
        }
    }

    /// `data.message` from a JSON object body
    pub fn message(&self) -> Option<String> {
        match self.json()?.get("message")? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Suffix appended to a failure headline.
    ///
    /// `": <message>"` when the body carries a message, otherwise
    /// `" (response: <payload>)"` echoing the payload, or empty when there is
    /// nothing to echo.
    pub fn failure_detail(&self) -> String {
        if let Some(message) = self.message() {
            return format!(": {}", message);
        }

        let payload = match &self.data {
            Payload::Json(Value::Null) => String::new(),
            Payload::Json(Value::String(s)) => s.clone(),
            Payload::Json(value) => value.to_string(),
            Payload::Malformed(raw) => raw.clone(),
            Payload::Transport(message) => message.clone(),
        };

        if payload.is_empty() {
            String::new()
        } else {
            format!(" (response: {})", payload)
        }
    }

    /// Deserialize the JSON body into `T`
    pub fn parse<T: DeserializeOwned>(&self) -> Option<T> {
        self.json()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// Deserialize a JSON array body; `None` when the body is not an array.
    ///
    /// Elements that do not match `T` are skipped.
    pub fn list<T: DeserializeOwned>(&self) -> Option<Vec<T>> {
        let items = self.json()?.as_array()?;
        Some(
            items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
        )
    }

    /// `data.id`, falling back to `data.uuid`
    pub fn resource_id(&self) -> Option<String> {
        let value = self.json()?;
        crate::models::id_string(value.get("id"))
            .or_else(|| crate::models::id_string(value.get("uuid")))
    }
}
