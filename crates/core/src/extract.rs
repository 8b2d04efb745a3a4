//! Parameter extraction from an operation document.
//!
//! The identifier lookup is the one place that reads arguments out of the
//! document text. It matches a single fixed shape, `repair(id: <digits>)`,
//! and is kept behind [`resolve_identifier`] so a real argument parser can
//! replace it without touching dispatch.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::envelope::OperationDocument;
use crate::lexer::{lex, Token};

/// Why an `input` variable could not be used.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("no 'input' variable supplied")]
    Absent,
    #[error("{0}")]
    Invalid(#[from] serde_json::Error),
}

/// Resolve the record identifier for a document.
///
/// `variables.id` wins when it is a non-negative JSON integer; otherwise
/// the text is scanned for `repair(id: N)`. Returns `None` when neither
/// source yields one.
pub fn resolve_identifier(document: &OperationDocument) -> Option<u64> {
    document
        .variables
        .get("id")
        .and_then(Value::as_u64)
        .or_else(|| inline_identifier(&document.query))
}

/// Scan the text for the literal call `repair(id: <digits>)`.
fn inline_identifier(text: &str) -> Option<u64> {
    let tokens = lex(text);
    tokens.windows(6).find_map(|w| match w {
        [Token::Word(callee), Token::LParen, Token::Word(arg), Token::Colon, Token::Int(n), Token::RParen]
            if callee == "repair" && arg == "id" =>
        {
            Some(*n)
        }
        _ => None,
    })
}

/// Decode `variables.input` into `T`.
///
/// A missing or `null` entry is [`InputError::Absent`]; an entry of the
/// wrong shape is [`InputError::Invalid`] carrying the decode error.
pub fn resolve_input<T: DeserializeOwned>(document: &OperationDocument) -> Result<T, InputError> {
    match document.variables.get("input") {
        None | Some(Value::Null) => Err(InputError::Absent),
        Some(raw) => Ok(T::deserialize(raw)?),
    }
}
