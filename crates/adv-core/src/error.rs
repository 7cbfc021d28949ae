use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Malformed or unknown node declaration.
    Schema,
    /// A `next` names an identifier the document never declares.
    Reference,
    /// Start or link entry identifier is absent from its graph.
    UnknownNode,
    /// The fetch transport failed.
    Fetch,
    /// The player picked a key the active fork does not offer. Recoverable.
    UnknownChoice,
    State,
    Io,
}

#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{code}: {message}")]
pub struct AdventureError {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
}

impl AdventureError {
    pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn schema(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Schema, code, message)
    }

    pub fn reference(identifier: &str, referrer: &str) -> Self {
        Self::new(
            ErrorKind::Reference,
            "COMPILE_REFERENCE_UNRESOLVED",
            format!(
                "Node \"{}\" referenced by \"{}\" does not exist.",
                identifier, referrer
            ),
        )
    }

    pub fn unknown_node(code: impl Into<String>, identifier: &str) -> Self {
        Self::new(
            ErrorKind::UnknownNode,
            code,
            format!("Node \"{}\" does not exist.", identifier),
        )
    }

    pub fn fetch(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fetch, code, message)
    }

    pub fn unknown_choice(key: &str) -> Self {
        Self::new(
            ErrorKind::UnknownChoice,
            "ENGINE_CHOICE_UNKNOWN",
            format!("Choice \"{}\" does not exist.", key),
        )
    }

    pub fn state(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::State, code, message)
    }

    pub fn io(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, code, message)
    }

    pub fn is_recoverable(&self) -> bool {
        self.kind == ErrorKind::UnknownChoice
    }
}
