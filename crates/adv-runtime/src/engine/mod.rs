use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use adv_compiler::compile_graph;
use adv_core::{
    AdventureError, ChoiceItem, EngineOutput, EngineState, FetchRequest, FetchTicket, Graph,
    Locator, Node, NodeRef, PlayId,
};

mod boundary;
mod lifecycle;
mod step;

pub use lifecycle::{StoryEngine, StoryEngineOptions, DEFAULT_MAX_STEPS};

#[derive(Debug, Clone)]
enum QueueItem {
    Execute {
        play: PlayId,
        graph: Arc<Graph>,
        node: NodeRef,
    },
    Fail {
        play: PlayId,
        error: AdventureError,
    },
}

#[derive(Debug, Clone)]
enum Suspension {
    Choice {
        play: PlayId,
        graph: Arc<Graph>,
        node: NodeRef,
    },
    Acknowledge {
        play: PlayId,
        graph: Arc<Graph>,
        text: String,
        next: NodeRef,
    },
}

#[derive(Debug, Clone)]
struct PendingFetch {
    play: PlayId,
    locator: Locator,
    entry_key: String,
}
