use crate::*;

pub fn compile_graph(source: &str) -> Result<Graph, AdventureError> {
    let document = serde_json::from_str::<JsonValue>(source).map_err(|error| {
        AdventureError::schema(
            "COMPILE_JSON_INVALID",
            format!("Failed to parse story JSON: {}", error),
        )
    })?;
    compile_graph_from_value(&document)
}

pub fn compile_graph_from_value(document: &JsonValue) -> Result<Graph, AdventureError> {
    let raw_nodes = parse_document(document)?;
    let graph = resolve_references(raw_nodes)?;
    log::debug!("compiled story graph with {} nodes", graph.len());
    Ok(graph)
}
