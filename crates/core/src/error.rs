use repairdesk_storage::StorageError;

/// Why a dispatch failed. Each variant renders to the single message
/// placed in the failure envelope.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Missing 'query' in request body")]
    MissingQuery,

    #[error("Missing 'id' for {operation}")]
    MissingIdentifier { operation: &'static str },

    /// `reason` is the typed-decode failure when an `input` was supplied
    /// but did not fit the expected shape; `None` when it was absent.
    #[error("{}", missing_input_message(.operation, .reason.as_deref()))]
    MissingInput {
        operation: &'static str,
        reason: Option<String>,
    },

    #[error("Unsupported operation")]
    UnsupportedOperation,

    /// The domain service itself failed.
    #[error("{operation} failed: {source}")]
    Service {
        operation: &'static str,
        #[source]
        source: StorageError,
    },

    /// A service result could not be turned into JSON.
    #[error("{operation} failed: could not encode result: {reason}")]
    Encode {
        operation: &'static str,
        reason: String,
    },
}

/// Stable, transport-independent name for each failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    MalformedBody,
    MissingQuery,
    MissingIdentifier,
    MissingInput,
    UnsupportedOperation,
    Service,
}

impl ErrorCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::MalformedBody => "MALFORMED_BODY",
            ErrorCategory::MissingQuery => "MISSING_QUERY",
            ErrorCategory::MissingIdentifier => "MISSING_IDENTIFIER",
            ErrorCategory::MissingInput => "MISSING_INPUT",
            ErrorCategory::UnsupportedOperation => "UNSUPPORTED_OPERATION",
            ErrorCategory::Service => "SERVICE",
        }
    }
}

impl DispatchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DispatchError::MalformedBody(_) => ErrorCategory::MalformedBody,
            DispatchError::MissingQuery => ErrorCategory::MissingQuery,
            DispatchError::MissingIdentifier { .. } => ErrorCategory::MissingIdentifier,
            DispatchError::MissingInput { .. } => ErrorCategory::MissingInput,
            DispatchError::UnsupportedOperation => ErrorCategory::UnsupportedOperation,
            DispatchError::Service { .. } | DispatchError::Encode { .. } => ErrorCategory::Service,
        }
    }
}

fn missing_input_message(operation: &str, reason: Option<&str>) -> String {
    match reason {
        None => format!("Missing 'input' for {}", operation),
        Some(reason) => format!("Invalid 'input' for {}: {}", operation, reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            DispatchError::MissingIdentifier {
                operation: "deleteRepair"
            }
            .to_string(),
            "Missing 'id' for deleteRepair"
        );
        assert_eq!(
            DispatchError::MissingInput {
                operation: "createRepair",
                reason: None
            }
            .to_string(),
            "Missing 'input' for createRepair"
        );
        assert_eq!(
            DispatchError::MissingInput {
                operation: "createRepair",
                reason: Some("missing field `status`".to_string())
            }
            .to_string(),
            "Invalid 'input' for createRepair: missing field `status`"
        );
        assert_eq!(
            DispatchError::UnsupportedOperation.to_string(),
            "Unsupported operation"
        );
    }

    #[test]
    fn storage_failures_are_service_category() {
        let err = DispatchError::Service {
            operation: "repairs",
            source: StorageError::Backend("disk on fire".to_string()),
        };
        assert_eq!(err.category(), ErrorCategory::Service);
        assert_eq!(
            err.to_string(),
            "repairs failed: storage backend error: disk on fire"
        );
    }
}
