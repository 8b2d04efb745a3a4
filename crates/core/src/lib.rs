//! repairdesk-core: the operation-document dispatcher.
//!
//! Turns a request body of the form `{"query": <text>, "variables": {...}}`
//! into one typed call against a [`RepairStore`] and renders the result as a
//! response [`Envelope`].
//!
//! # Public API
//!
//! - [`dispatch()`] -- raw body in, envelope out; never fails
//! - [`classify()`] -- document text to [`OperationKind`]
//! - [`resolve_identifier()`], [`resolve_input()`] -- parameter extraction
//! - [`decode_request()`], [`encode_success()`], [`encode_failure()`] -- wire codec
//! - [`DispatchError`] -- failure taxonomy
//!
//! [`RepairStore`]: repairdesk_storage::RepairStore

pub mod classify;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod lexer;

pub use classify::{classify, OperationKind};
pub use dispatch::{dispatch, dispatch_document, execute, render, render_error, Executed, Resolution};
pub use envelope::{
    decode_request, encode_failure, encode_failures, encode_success, Envelope, ErrorMessage,
    OperationDocument,
};
pub use error::{DispatchError, ErrorCategory};
pub use extract::{resolve_identifier, resolve_input, InputError};
