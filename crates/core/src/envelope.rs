//! Wire shapes for the operation endpoint.
//!
//! Request: `{"query": <text>, "variables": <object, optional>}`.
//! Response: either `{"data": {<field>: <payload or null>}}` or
//! `{"errors": [{"message": <text>}, ...]}`, never both.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DispatchError;

/// A decoded request: the operation text and its variables.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDocument {
    pub query: String,
    pub variables: Map<String, Value>,
}

impl OperationDocument {
    pub fn new(query: impl Into<String>, variables: Map<String, Value>) -> Self {
        OperationDocument {
            query: query.into(),
            variables,
        }
    }
}

/// One entry of a failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub message: String,
}

/// The uniform response for every request on the operation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    Data { data: Map<String, Value> },
    Errors { errors: Vec<ErrorMessage> },
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Data { .. })
    }

    /// Messages of a failure envelope; empty for success.
    pub fn messages(&self) -> Vec<&str> {
        match self {
            Envelope::Data { .. } => Vec::new(),
            Envelope::Errors { errors } => errors.iter().map(|e| e.message.as_str()).collect(),
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({"errors": [{"message": format!("failed to encode response: {}", e)}]})
        })
    }
}

/// Decode a raw request body.
///
/// An absent or `null` `variables` entry is an empty map, not an error.
pub fn decode_request(body: &[u8]) -> Result<OperationDocument, DispatchError> {
    let parsed: Value =
        serde_json::from_slice(body).map_err(|e| DispatchError::MalformedBody(e.to_string()))?;

    let Value::Object(mut fields) = parsed else {
        return Err(DispatchError::MissingQuery);
    };

    let query = match fields.remove("query") {
        Some(Value::String(q)) => q,
        _ => return Err(DispatchError::MissingQuery),
    };

    let variables = match fields.remove("variables") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(vars)) => vars,
        Some(_) => {
            return Err(DispatchError::MalformedBody(
                "'variables' must be an object".to_string(),
            ))
        }
    };

    Ok(OperationDocument { query, variables })
}

/// Wrap a payload (possibly `null`) under `operation` in a data envelope.
pub fn encode_success(operation: &str, payload: Value) -> Envelope {
    let mut data = Map::new();
    data.insert(operation.to_string(), payload);
    Envelope::Data { data }
}

/// A failure envelope carrying a single message.
pub fn encode_failure(message: impl Into<String>) -> Envelope {
    encode_failures([message.into()])
}

/// A failure envelope carrying several messages, in order.
pub fn encode_failures(messages: impl IntoIterator<Item = String>) -> Envelope {
    Envelope::Errors {
        errors: messages
            .into_iter()
            .map(|message| ErrorMessage { message })
            .collect(),
    }
}
