use serde::Deserialize;

use crate::*;

pub const NODE_TYPES: [&str; 4] = ["road", "fork", "link", "file"];

/// A reference that has not been looked up yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawRef {
    Pending(String),
    Dead,
}

impl RawRef {
    fn from_next(next: Option<String>) -> Self {
        match next {
            Some(identifier) => Self::Pending(identifier),
            None => Self::Dead,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawOption {
    pub(crate) key: String,
    pub(crate) text: String,
    pub(crate) next: RawRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawNode {
    Road {
        text: String,
        next: RawRef,
    },
    Fork {
        text: String,
        options: Vec<RawOption>,
    },
    Link {
        url: String,
        entry_key: String,
    },
    File {
        path: String,
        entry_key: String,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum NodeDecl {
    Road {
        text: String,
        #[serde(default)]
        next: Option<String>,
    },
    Fork {
        text: String,
        options: Vec<(String, String, Option<String>)>,
    },
    Link {
        url: String,
        next: String,
    },
    File {
        path: String,
        next: String,
    },
}

/// First pass: build every declared node with its references left pending.
/// Entries come back sorted by identifier.
pub(crate) fn parse_document(
    document: &JsonValue,
) -> Result<BTreeMap<String, RawNode>, AdventureError> {
    let JsonValue::Object(entries) = document else {
        return Err(AdventureError::schema(
            "COMPILE_DOCUMENT_ROOT",
            "Story document must be a JSON object of node identifiers.",
        ));
    };

    let mut nodes = BTreeMap::new();
    for (identifier, entry) in entries {
        let node = parse_node(identifier, entry)?;
        nodes.insert(identifier.clone(), node);
    }
    Ok(nodes)
}

fn parse_node(identifier: &str, entry: &JsonValue) -> Result<RawNode, AdventureError> {
    let JsonValue::Object(fields) = entry else {
        return Err(AdventureError::schema(
            "COMPILE_NODE_NOT_OBJECT",
            format!("Node \"{}\" must be a JSON object.", identifier),
        ));
    };

    let Some(node_type) = fields.get("type").and_then(JsonValue::as_str) else {
        return Err(AdventureError::schema(
            "COMPILE_NODE_TYPE_MISSING",
            format!("Node \"{}\" has no string \"type\" field.", identifier),
        ));
    };

    if !NODE_TYPES.contains(&node_type) {
        return Err(AdventureError::schema(
            "COMPILE_NODE_TYPE_UNKNOWN",
            format!(
                "Node type \"{}\" does not exist (at node \"{}\").",
                node_type, identifier
            ),
        ));
    }

    let decl = NodeDecl::deserialize(entry).map_err(|error| {
        AdventureError::schema(
            "COMPILE_NODE_FIELD",
            format!("Node \"{}\" is malformed: {}", identifier, error),
        )
    })?;

    match decl {
        NodeDecl::Road { text, next } => Ok(RawNode::Road {
            text,
            next: RawRef::from_next(next),
        }),
        NodeDecl::Fork { text, options } => {
            if options.is_empty() {
                return Err(AdventureError::schema(
                    "COMPILE_FORK_EMPTY",
                    format!("Fork \"{}\" declares no options.", identifier),
                ));
            }

            let mut parsed: Vec<RawOption> = Vec::with_capacity(options.len());
            for (key, text, next) in options {
                if parsed.iter().any(|option| option.key == key) {
                    return Err(AdventureError::schema(
                        "COMPILE_FORK_KEY_DUPLICATE",
                        format!("Fork \"{}\" declares option \"{}\" twice.", identifier, key),
                    ));
                }
                parsed.push(RawOption {
                    key,
                    text,
                    next: RawRef::from_next(next),
                });
            }

            Ok(RawNode::Fork {
                text,
                options: parsed,
            })
        }
        NodeDecl::Link { url, next } => Ok(RawNode::Link {
            url,
            entry_key: next,
        }),
        NodeDecl::File { path, next } => Ok(RawNode::File {
            path,
            entry_key: next,
        }),
    }
}
