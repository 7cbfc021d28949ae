use std::sync::Arc;

use adv_compiler::compile_graph;
use adv_core::{AdventureError, Graph, PlayId};
use adv_runtime::{
    Player, PlayerHandle, StoryDisplay, StoryEngine, StoryEngineOptions, StoryFetcher,
};

pub const DEFAULT_ENTRY: &str = "start";

#[derive(Debug, Clone, Default)]
pub struct CreateEngineOptions {
    pub story_json: String,
    pub entry: Option<String>,
    pub engine: StoryEngineOptions,
}

pub fn compile_story(story_json: &str) -> Result<Arc<Graph>, AdventureError> {
    compile_graph(story_json).map(Arc::new)
}

/// Compiles the story and returns an engine with the first play queued.
pub fn create_engine_from_json(
    options: CreateEngineOptions,
) -> Result<(StoryEngine, PlayId), AdventureError> {
    let graph = compile_story(&options.story_json)?;
    let entry = resolve_entry(&graph, options.entry)?;

    let mut engine = StoryEngine::new(options.engine);
    let play = engine.start(graph, &entry)?;
    Ok((engine, play))
}

pub fn create_player(
    options: CreateEngineOptions,
    display: Arc<dyn StoryDisplay>,
    fetcher: Arc<dyn StoryFetcher>,
) -> Result<(Player, PlayerHandle), AdventureError> {
    let (engine, play) = create_engine_from_json(options)?;
    log::debug!("player created with {} queued", play);
    Ok(Player::new(engine, display, fetcher))
}

fn resolve_entry(graph: &Graph, explicit: Option<String>) -> Result<String, AdventureError> {
    if let Some(entry) = explicit {
        if graph.get(&entry).is_none() {
            return Err(AdventureError::unknown_node("API_ENTRY_NOT_FOUND", &entry));
        }
        return Ok(entry);
    }

    if graph.get(DEFAULT_ENTRY).is_some() {
        return Ok(DEFAULT_ENTRY.to_string());
    }

    Err(AdventureError::unknown_node(
        "API_ENTRY_START_NOT_FOUND",
        DEFAULT_ENTRY,
    ))
}
