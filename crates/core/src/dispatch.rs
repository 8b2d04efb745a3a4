//! Request dispatch: classify, extract, call the store, render.
//!
//! Every request runs start to finish exactly once. The store is called at
//! most once per request and nothing is retried. All failures end up as a
//! failure envelope; nothing propagates past [`dispatch`].

use repairdesk_storage::{NewRepair, RepairPatch, RepairStore, StorageError};
use serde::Serialize;
use serde_json::Value;

use crate::classify::{classify, OperationKind};
use crate::envelope::{decode_request, encode_failure, encode_success, Envelope, OperationDocument};
use crate::error::DispatchError;
use crate::extract::{resolve_identifier, resolve_input, InputError};

/// What an executed operation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The operation produced a value (a record, a list, a boolean).
    Found(Value),
    /// The targeted record does not exist.
    Absent,
}

/// A successfully executed operation: the field it reports under and its
/// result.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub operation: &'static str,
    pub resolution: Resolution,
}

/// Handle one raw request body end to end.
pub async fn dispatch<S>(store: &S, body: &[u8]) -> Envelope
where
    S: RepairStore + ?Sized,
{
    match decode_request(body) {
        Ok(document) => dispatch_document(store, &document).await,
        Err(e) => render_error(&e),
    }
}

/// Handle an already-decoded document.
pub async fn dispatch_document<S>(store: &S, document: &OperationDocument) -> Envelope
where
    S: RepairStore + ?Sized,
{
    let kind = classify(&document.query);
    tracing::debug!(?kind, "classified operation document");
    match execute(store, kind, document).await {
        Ok(executed) => render(executed),
        Err(e) => render_error(&e),
    }
}

/// Resolve parameters for `kind` and make the single store call.
pub async fn execute<S>(
    store: &S,
    kind: OperationKind,
    document: &OperationDocument,
) -> Result<Executed, DispatchError>
where
    S: RepairStore + ?Sized,
{
    let Some(operation) = kind.field_name() else {
        return Err(DispatchError::UnsupportedOperation);
    };
    let service_err = |source: StorageError| DispatchError::Service { operation, source };

    let resolution = match kind {
        OperationKind::ListAll => {
            let repairs = store.list().await.map_err(service_err)?;
            Resolution::Found(to_payload(operation, &repairs)?)
        }
        OperationKind::GetOne => {
            let id = require_identifier(operation, document)?;
            let found = store.get(id).await.map_err(service_err)?;
            optional_payload(operation, found)?
        }
        OperationKind::Create => {
            let input: NewRepair = require_input(operation, document)?;
            let created = store.create(input).await.map_err(service_err)?;
            Resolution::Found(to_payload(operation, &created)?)
        }
        OperationKind::Update => {
            let id = require_identifier(operation, document)?;
            let patch: RepairPatch = require_input(operation, document)?;
            let updated = store.update(id, patch).await.map_err(service_err)?;
            optional_payload(operation, updated)?
        }
        OperationKind::Delete => {
            let id = require_identifier(operation, document)?;
            let removed = store.delete(id).await.map_err(service_err)?;
            Resolution::Found(Value::Bool(removed))
        }
        OperationKind::Unsupported => return Err(DispatchError::UnsupportedOperation),
    };

    Ok(Executed {
        operation,
        resolution,
    })
}

/// Turn an executed operation into a success envelope.
///
/// `Absent` renders as a success whose payload is `null`. The operation
/// endpoint reports a missing record as data, unlike the resource routes,
/// which answer 404.
pub fn render(executed: Executed) -> Envelope {
    let payload = match executed.resolution {
        Resolution::Found(value) => value,
        Resolution::Absent => Value::Null,
    };
    encode_success(executed.operation, payload)
}

/// Turn a dispatch failure into a failure envelope.
pub fn render_error(error: &DispatchError) -> Envelope {
    tracing::warn!(category = error.category().as_str(), "{}", error);
    encode_failure(error.to_string())
}

fn require_identifier(
    operation: &'static str,
    document: &OperationDocument,
) -> Result<u64, DispatchError> {
    resolve_identifier(document).ok_or(DispatchError::MissingIdentifier { operation })
}

fn require_input<T: serde::de::DeserializeOwned>(
    operation: &'static str,
    document: &OperationDocument,
) -> Result<T, DispatchError> {
    resolve_input(document).map_err(|e| DispatchError::MissingInput {
        operation,
        reason: match e {
            InputError::Absent => None,
            InputError::Invalid(e) => Some(e.to_string()),
        },
    })
}

fn to_payload<T: Serialize>(operation: &'static str, value: &T) -> Result<Value, DispatchError> {
    serde_json::to_value(value).map_err(|e| DispatchError::Encode {
        operation,
        reason: e.to_string(),
    })
}

fn optional_payload<T: Serialize>(
    operation: &'static str,
    value: Option<T>,
) -> Result<Resolution, DispatchError> {
    match value {
        Some(v) => Ok(Resolution::Found(to_payload(operation, &v)?)),
        None => Ok(Resolution::Absent),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use repairdesk_storage::{MemoryStore, Repair};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn new_repair(name: &str) -> NewRepair {
        NewRepair {
            customer_name: name.to_string(),
            phone_model: "iPhone 15".to_string(),
            issue: "Screen broken".to_string(),
            status: "PENDING".to_string(),
            estimated_cost: None,
        }
    }

    async fn seeded(names: &[&str]) -> MemoryStore {
        let store = MemoryStore::new();
        for name in names {
            store.create(new_repair(name)).await.unwrap();
        }
        store
    }

    async fn run(store: &MemoryStore, body: Value) -> Value {
        dispatch(store, body.to_string().as_bytes()).await.to_json()
    }

    #[tokio::test]
    async fn list_returns_full_listing_unchanged() {
        let store = seeded(&["Ann", "Bob", "Cy"]).await;
        let listing = serde_json::to_value(store.list().await.unwrap()).unwrap();
        let out = run(&store, json!({"query": "query { repairs { id } }"})).await;
        assert_eq!(out, json!({"data": {"repairs": listing}}));
    }

    #[tokio::test]
    async fn list_of_empty_store_is_empty_array() {
        let store = MemoryStore::new();
        let out = run(&store, json!({"query": "query { repairs { id } }"})).await;
        assert_eq!(out, json!({"data": {"repairs": []}}));
    }

    #[tokio::test]
    async fn get_by_inline_id() {
        let store = seeded(&["Ann", "Bob"]).await;
        let out = run(&store, json!({"query": "query { repair(id: 2) { id } }"})).await;
        assert_eq!(out["data"]["repair"]["customerName"], "Bob");
    }

    #[tokio::test]
    async fn get_prefers_variable_id() {
        let store = seeded(&["Ann", "Bob"]).await;
        let out = run(
            &store,
            json!({"query": "query { repair(id: 2) { id } }", "variables": {"id": 1}}),
        )
        .await;
        assert_eq!(out["data"]["repair"]["customerName"], "Ann");
    }

    #[tokio::test]
    async fn get_missing_record_is_null_data() {
        let store = MemoryStore::new();
        let out = run(&store, json!({"query": "query { repair(id: 5) { id } }"})).await;
        assert_eq!(out, json!({"data": {"repair": null}}));
    }

    #[tokio::test]
    async fn get_without_any_id_fails() {
        let store = MemoryStore::new();
        let out = run(
            &store,
            json!({"query": "query GetRepair($id: Int!) { repair(id: $id) { id } }"}),
        )
        .await;
        assert_eq!(
            out,
            json!({"errors": [{"message": "Missing 'id' for repair"}]})
        );
    }

    #[tokio::test]
    async fn create_returns_created_record() {
        let store = MemoryStore::new();
        let out = run(
            &store,
            json!({
                "query": "mutation { createRepair(input: {}) { id } }",
                "variables": {"input": {
                    "customerName": "John",
                    "phoneModel": "iPhone 15",
                    "issue": "Screen broken",
                    "status": "PENDING"
                }}
            }),
        )
        .await;
        let created = &out["data"]["createRepair"];
        assert_eq!(created["id"], 1);
        assert_eq!(created["customerName"], "John");
        assert_eq!(created["status"], "PENDING");
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_without_input_fails() {
        let store = MemoryStore::new();
        let out = run(&store, json!({"query": "mutation { createRepair { id } }"})).await;
        assert_eq!(
            out,
            json!({"errors": [{"message": "Missing 'input' for createRepair"}]})
        );
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_with_incomplete_input_reports_reason() {
        let store = MemoryStore::new();
        let out = run(
            &store,
            json!({
                "query": "mutation { createRepair { id } }",
                "variables": {"input": {"customerName": "John"}}
            }),
        )
        .await;
        let env: Envelope = serde_json::from_value(out).unwrap();
        let messages = env.messages();
        assert_eq!(messages.len(), 1);
        assert!(
            messages[0].starts_with("Invalid 'input' for createRepair: missing field"),
            "{}",
            messages[0]
        );
    }

    #[tokio::test]
    async fn update_applies_patch() {
        let store = seeded(&["Ann"]).await;
        let out = run(
            &store,
            json!({
                "query": "mutation { updateRepair(id: $id, input: $input) { id } }",
                "variables": {"id": 1, "input": {"status": "DONE"}}
            }),
        )
        .await;
        assert_eq!(out["data"]["updateRepair"]["status"], "DONE");
        assert_eq!(out["data"]["updateRepair"]["customerName"], "Ann");
    }

    #[tokio::test]
    async fn update_missing_record_is_null_data() {
        let store = MemoryStore::new();
        let out = run(
            &store,
            json!({
                "query": "mutation { updateRepair { id } }",
                "variables": {"id": 3, "input": {"status": "DONE"}}
            }),
        )
        .await;
        assert_eq!(out, json!({"data": {"updateRepair": null}}));
    }

    #[tokio::test]
    async fn update_checks_identifier_before_input() {
        let store = MemoryStore::new();
        let out = run(&store, json!({"query": "mutation { updateRepair { id } }"})).await;
        assert_eq!(
            out,
            json!({"errors": [{"message": "Missing 'id' for updateRepair"}]})
        );
        let out = run(
            &store,
            json!({"query": "mutation { updateRepair { id } }", "variables": {"id": 1}}),
        )
        .await;
        assert_eq!(
            out,
            json!({"errors": [{"message": "Missing 'input' for updateRepair"}]})
        );
    }

    #[tokio::test]
    async fn delete_reports_boolean() {
        let store = seeded(&["Ann"]).await;
        let body = json!({"query": "mutation { deleteRepair }", "variables": {"id": 1}});
        assert_eq!(
            run(&store, body.clone()).await,
            json!({"data": {"deleteRepair": true}})
        );
        assert_eq!(
            run(&store, body).await,
            json!({"data": {"deleteRepair": false}})
        );
    }

    #[tokio::test]
    async fn delete_without_resolvable_id_fails() {
        let store = seeded(&["Ann"]).await;
        let out = run(&store, json!({"query": "mutation { deleteRepair(id: 1) }"})).await;
        assert_eq!(
            out,
            json!({"errors": [{"message": "Missing 'id' for deleteRepair"}]})
        );
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn unsupported_document_fails() {
        let store = MemoryStore::new();
        let out = run(&store, json!({"query": "subscription { repairs }"})).await;
        assert_eq!(out, json!({"errors": [{"message": "Unsupported operation"}]}));
    }

    #[tokio::test]
    async fn malformed_body_fails_without_panicking() {
        let store = MemoryStore::new();
        let env = dispatch(&store, b"not json").await;
        let messages = env.messages();
        assert_eq!(messages.len(), 1);
        assert!(
            messages[0].starts_with("Malformed request body"),
            "{}",
            messages[0]
        );
    }

    #[tokio::test]
    async fn missing_query_fails() {
        let store = MemoryStore::new();
        let env = dispatch(&store, br#"{"variables": {}}"#).await;
        assert_eq!(env.messages(), vec!["Missing 'query' in request body"]);
    }

    /// Counts calls and fails every one of them.
    struct BrokenStore {
        calls: AtomicUsize,
    }

    impl BrokenStore {
        fn fail(&self) -> StorageError {
            self.calls.fetch_add(1, Ordering::SeqCst);
            StorageError::Backend("unavailable".to_string())
        }
    }

    #[async_trait]
    impl RepairStore for BrokenStore {
        async fn list(&self) -> Result<Vec<Repair>, StorageError> {
            Err(self.fail())
        }
        async fn get(&self, _id: u64) -> Result<Option<Repair>, StorageError> {
            Err(self.fail())
        }
        async fn create(&self, _new: NewRepair) -> Result<Repair, StorageError> {
            Err(self.fail())
        }
        async fn update(
            &self,
            _id: u64,
            _patch: RepairPatch,
        ) -> Result<Option<Repair>, StorageError> {
            Err(self.fail())
        }
        async fn delete(&self, _id: u64) -> Result<bool, StorageError> {
            Err(self.fail())
        }
    }

    #[tokio::test]
    async fn store_failure_becomes_single_error_without_retry() {
        let store = BrokenStore {
            calls: AtomicUsize::new(0),
        };
        let env = dispatch(&store, br#"{"query": "query { repairs { id } }"}"#).await;
        assert_eq!(
            env.messages(),
            vec!["repairs failed: storage backend error: unavailable"]
        );
        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unsupported_and_missing_params_never_reach_store() {
        let store = BrokenStore {
            calls: AtomicUsize::new(0),
        };
        for body in [
            &br#"{"query": "nothing here"}"#[..],
            br#"{"query": "mutation { deleteRepair }"}"#,
            br#"{"query": "mutation { createRepair }"}"#,
            b"{",
        ] {
            let env = dispatch(&store, body).await;
            assert!(!env.is_success());
        }
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn works_through_trait_object() {
        let store: std::sync::Arc<dyn RepairStore> = std::sync::Arc::new(seeded(&["Ann"]).await);
        let env = dispatch(store.as_ref(), br#"{"query": "query { repairs { id } }"}"#).await;
        assert!(env.is_success());
    }

    #[test]
    fn absent_renders_as_null_success() {
        let env = render(Executed {
            operation: "repair",
            resolution: Resolution::Absent,
        });
        assert_eq!(env.to_json(), json!({"data": {"repair": null}}));
    }
}
