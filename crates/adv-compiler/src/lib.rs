//! Story graph compiler.
//!
//! A source document is a JSON object mapping node identifiers to node
//! records. Compilation runs in two passes: [`source_parse`] turns every
//! record into a raw node whose references are still textual, then
//! [`reference_resolve`] swaps each textual reference for the slot of the
//! node it names. Any failure aborts the whole document.

use std::collections::{BTreeMap, HashMap};

use adv_core::{AdventureError, ForkOption, Graph, Node, NodeId, NodeRef};
use serde_json::Value as JsonValue;

mod pipeline;
mod reference_resolve;
mod source_parse;

pub use pipeline::{compile_graph, compile_graph_from_value};
pub use source_parse::NODE_TYPES;

pub(crate) use reference_resolve::resolve_references;
pub(crate) use source_parse::{parse_document, RawNode, RawOption, RawRef};
