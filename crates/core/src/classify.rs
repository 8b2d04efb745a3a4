//! Operation classification.
//!
//! A document is matched against a fixed, ordered list of keyword rules and
//! the first rule that matches decides the operation:
//!
//! 1. `repairs` anywhere, and the document opens with `query` -> [`OperationKind::ListAll`]
//! 2. `repair(` anywhere, and `query` anywhere -> [`OperationKind::GetOne`]
//! 3. `mutation` and `createRepair` -> [`OperationKind::Create`]
//! 4. `mutation` and `updateRepair` -> [`OperationKind::Update`]
//! 5. `mutation` and `deleteRepair` -> [`OperationKind::Delete`]
//! 6. anything else -> [`OperationKind::Unsupported`]
//!
//! The order is load-bearing. A document that names two operations (say
//! `repairs` and `createRepair` under a `query` keyword) resolves to the
//! earlier rule, and existing clients depend on that. Matching is on whole
//! tokens, so names inside string literals or comments never count.

use crate::lexer::{lex, Token};

/// Field name the list operation is reported under.
pub const LIST_REPAIRS: &str = "repairs";
/// Field name of the single-item read.
pub const GET_REPAIR: &str = "repair";
pub const CREATE_REPAIR: &str = "createRepair";
pub const UPDATE_REPAIR: &str = "updateRepair";
pub const DELETE_REPAIR: &str = "deleteRepair";

const QUERY_KEYWORD: &str = "query";
const MUTATION_KEYWORD: &str = "mutation";

/// The outcome of classifying one document. Every document maps to
/// exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    ListAll,
    GetOne,
    Create,
    Update,
    Delete,
    Unsupported,
}

impl OperationKind {
    /// The key the result is reported under in a data envelope.
    /// `None` for [`OperationKind::Unsupported`].
    pub fn field_name(self) -> Option<&'static str> {
        match self {
            OperationKind::ListAll => Some(LIST_REPAIRS),
            OperationKind::GetOne => Some(GET_REPAIR),
            OperationKind::Create => Some(CREATE_REPAIR),
            OperationKind::Update => Some(UPDATE_REPAIR),
            OperationKind::Delete => Some(DELETE_REPAIR),
            OperationKind::Unsupported => None,
        }
    }
}

/// Classify a raw operation document.
pub fn classify(text: &str) -> OperationKind {
    classify_tokens(&lex(text))
}

pub(crate) fn classify_tokens(tokens: &[Token]) -> OperationKind {
    let has_word = |w: &str| tokens.iter().any(|t| matches!(t, Token::Word(x) if x == w));
    let opens_with_query = matches!(tokens.first(), Some(Token::Word(w)) if w == QUERY_KEYWORD);
    let calls_get = tokens.windows(2).any(|pair| {
        matches!(pair, [Token::Word(w), Token::LParen] if w == GET_REPAIR)
    });

    if opens_with_query && has_word(LIST_REPAIRS) {
        return OperationKind::ListAll;
    }
    if calls_get && has_word(QUERY_KEYWORD) {
        return OperationKind::GetOne;
    }
    if has_word(MUTATION_KEYWORD) {
        for (name, kind) in [
            (CREATE_REPAIR, OperationKind::Create),
            (UPDATE_REPAIR, OperationKind::Update),
            (DELETE_REPAIR, OperationKind::Delete),
        ] {
            if has_word(name) {
                return kind;
            }
        }
    }
    OperationKind::Unsupported
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_requires_leading_query_keyword() {
        assert_eq!(classify("query { repairs { id } }"), OperationKind::ListAll);
        assert_eq!(
            classify("  \n query AllRepairs { repairs { id status } }"),
            OperationKind::ListAll
        );
        // Shorthand without the keyword is not recognized.
        assert_eq!(classify("{ repairs { id } }"), OperationKind::Unsupported);
        assert_eq!(
            classify("mutation { repairs { id } }"),
            OperationKind::Unsupported
        );
    }

    #[test]
    fn get_requires_call_shape() {
        assert_eq!(
            classify("query { repair(id: 5) { id } }"),
            OperationKind::GetOne
        );
        assert_eq!(
            classify("query GetRepair($id: Int!) { repair (id: $id) { id } }"),
            OperationKind::GetOne
        );
        assert_eq!(classify("query { repair { id } }"), OperationKind::Unsupported);
    }

    #[test]
    fn get_accepts_query_keyword_anywhere() {
        // Rule 2 only needs the keyword somewhere in the document.
        assert_eq!(classify("{ repair(id: 1) { id } } query"), OperationKind::GetOne);
    }

    #[test]
    fn mutations_by_name() {
        assert_eq!(
            classify("mutation { createRepair(input: {}) { id } }"),
            OperationKind::Create
        );
        assert_eq!(
            classify("mutation Upd($id: Int!, $input: RepairPatch!) { updateRepair(id: $id, input: $input) { id } }"),
            OperationKind::Update
        );
        assert_eq!(
            classify("mutation { deleteRepair(id: 1) }"),
            OperationKind::Delete
        );
    }

    #[test]
    fn mutation_names_need_mutation_keyword() {
        assert_eq!(
            classify("{ createRepair(input: {}) { id } }"),
            OperationKind::Unsupported
        );
        assert_eq!(classify("query { deleteRepair }"), OperationKind::Unsupported);
    }

    // The rule order below is intentional and must not be "fixed": clients
    // rely on the earlier rule winning when a document names two operations.

    #[test]
    fn ambiguous_list_beats_create() {
        assert_eq!(
            classify("query { repairs { id } } mutation { createRepair { id } }"),
            OperationKind::ListAll
        );
    }

    #[test]
    fn ambiguous_get_beats_mutations() {
        assert_eq!(
            classify("mutation { deleteRepair(id: 2) } query { repair(id: 2) { id } }"),
            OperationKind::GetOne
        );
    }

    #[test]
    fn ambiguous_create_beats_update_and_delete() {
        assert_eq!(
            classify("mutation { deleteRepair(id: 1) updateRepair(id: 1) createRepair }"),
            OperationKind::Create
        );
        assert_eq!(
            classify("mutation { deleteRepair(id: 1) updateRepair(id: 1) }"),
            OperationKind::Update
        );
    }

    #[test]
    fn names_inside_strings_or_comments_do_not_match() {
        assert_eq!(
            classify("query { search(text: \"repairs\") }"),
            OperationKind::Unsupported
        );
        assert_eq!(
            classify("# mutation createRepair\nquery { nothing }"),
            OperationKind::Unsupported
        );
    }

    #[test]
    fn lexeme_match_is_whole_token() {
        // "repairsArchive" is a different name, not "repairs".
        assert_eq!(
            classify("query { repairsArchive { id } }"),
            OperationKind::Unsupported
        );
    }

    #[test]
    fn classification_is_total() {
        for text in ["", "   ", "not a document", "}{)(", "query", "mutation", "✓✓"] {
            let kind = classify(text);
            assert_eq!(kind, OperationKind::Unsupported, "{:?}", text);
            assert_eq!(kind.field_name(), None);
        }
    }

    #[test]
    fn field_names() {
        assert_eq!(OperationKind::ListAll.field_name(), Some("repairs"));
        assert_eq!(OperationKind::GetOne.field_name(), Some("repair"));
        assert_eq!(OperationKind::Create.field_name(), Some("createRepair"));
        assert_eq!(OperationKind::Update.field_name(), Some("updateRepair"));
        assert_eq!(OperationKind::Delete.field_name(), Some("deleteRepair"));
    }
}
