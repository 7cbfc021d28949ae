use crate::*;

/// Second pass: swap every pending reference for the slot of the node it
/// names. A single dangling reference fails the whole document.
pub(crate) fn resolve_references(
    raw_nodes: BTreeMap<String, RawNode>,
) -> Result<Graph, AdventureError> {
    let slots = raw_nodes
        .keys()
        .enumerate()
        .map(|(slot, identifier)| (identifier.clone(), NodeId(slot)))
        .collect::<HashMap<_, _>>();

    let mut entries = Vec::with_capacity(raw_nodes.len());
    for (identifier, raw) in raw_nodes {
        let node = resolve_node(&identifier, raw, &slots)?;
        entries.push((identifier, node));
    }

    Graph::new(entries)
}

fn resolve_node(
    identifier: &str,
    raw: RawNode,
    slots: &HashMap<String, NodeId>,
) -> Result<Node, AdventureError> {
    match raw {
        RawNode::Road { text, next } => Ok(Node::Road {
            text,
            next: resolve_ref(identifier, &next, slots)?,
        }),
        RawNode::Fork { text, options } => {
            let options = options
                .into_iter()
                .map(|RawOption { key, text, next }| -> Result<_, AdventureError> {
                    Ok(ForkOption {
                        next: resolve_ref(identifier, &next, slots)?,
                        key,
                        text,
                    })
                })
                .collect::<Result<Vec<_>, AdventureError>>()?;
            Ok(Node::Fork { text, options })
        }
        RawNode::Link { url, entry_key } => Ok(Node::Link { url, entry_key }),
        RawNode::File { path, entry_key } => Ok(Node::File { path, entry_key }),
    }
}

fn resolve_ref(
    referrer: &str,
    raw_ref: &RawRef,
    slots: &HashMap<String, NodeId>,
) -> Result<NodeRef, AdventureError> {
    match raw_ref {
        RawRef::Dead => Ok(NodeRef::Dead),
        RawRef::Pending(identifier) => slots
            .get(identifier)
            .map(|slot| NodeRef::Node(*slot))
            .ok_or_else(|| AdventureError::reference(identifier, referrer)),
    }
}
