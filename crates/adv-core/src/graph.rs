use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AdventureError;

/// Position of a node inside the arena of the graph that compiled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Node(NodeId),
    Dead,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkOption {
    pub key: String,
    pub text: String,
    pub next: NodeRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Road { text: String, next: NodeRef },
    Fork { text: String, options: Vec<ForkOption> },
    Link { url: String, entry_key: String },
    File { path: String, entry_key: String },
    Dead,
}

pub const DEAD: Node = Node::Dead;

impl Node {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Road { .. } => "road",
            Self::Fork { .. } => "fork",
            Self::Link { .. } => "link",
            Self::File { .. } => "file",
            Self::Dead => "dead",
        }
    }

    pub fn option(&self, key: &str) -> Option<&ForkOption> {
        match self {
            Self::Fork { options, .. } => options.iter().find(|option| option.key == key),
            _ => None,
        }
    }

    pub fn successors(&self) -> Vec<NodeRef> {
        match self {
            Self::Road { next, .. } => vec![*next],
            Self::Fork { options, .. } => options.iter().map(|option| option.next).collect(),
            _ => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Locator {
    Url(String),
    Path(String),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => write!(f, "url:{}", url),
            Self::Path(path) => write!(f, "path:{}", path),
        }
    }
}

/// A compiled story document. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    identifiers: Vec<String>,
    nodes: Vec<Node>,
    index: HashMap<String, NodeId>,
}

impl Graph {
    /// Builds a graph from parallel identifier and node lists. Every `NodeRef`
    /// held by a node must point inside the list.
    pub fn new(entries: Vec<(String, Node)>) -> Result<Self, AdventureError> {
        let mut identifiers = Vec::with_capacity(entries.len());
        let mut nodes = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());

        for (slot, (identifier, node)) in entries.into_iter().enumerate() {
            if index.insert(identifier.clone(), NodeId(slot)).is_some() {
                return Err(AdventureError::state(
                    "GRAPH_IDENTIFIER_DUPLICATE",
                    format!("Identifier \"{}\" is declared twice.", identifier),
                ));
            }
            identifiers.push(identifier);
            nodes.push(node);
        }

        for (slot, node) in nodes.iter().enumerate() {
            for successor in node.successors() {
                if let NodeRef::Node(NodeId(target)) = successor {
                    if target >= nodes.len() {
                        return Err(AdventureError::state(
                            "GRAPH_NODE_OUT_OF_RANGE",
                            format!(
                                "Node \"{}\" links to slot {} outside the graph.",
                                identifiers[slot], target
                            ),
                        ));
                    }
                }
            }
        }

        Ok(Self {
            identifiers,
            nodes,
            index,
        })
    }

    pub fn get(&self, identifier: &str) -> Option<NodeRef> {
        self.index.get(identifier).copied().map(NodeRef::Node)
    }

    pub fn node(&self, node_ref: NodeRef) -> &Node {
        match node_ref {
            NodeRef::Node(NodeId(slot)) => self.nodes.get(slot).unwrap_or(&DEAD),
            NodeRef::Dead => &DEAD,
        }
    }

    pub fn identifier(&self, id: NodeId) -> Option<&str> {
        self.identifiers.get(id.0).map(String::as_str)
    }

    pub fn identifiers(&self) -> Vec<&str> {
        let mut identifiers = self
            .identifiers
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>();
        identifiers.sort_unstable();
        identifiers
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.identifiers
            .iter()
            .map(String::as_str)
            .zip(self.nodes.iter())
    }
}
