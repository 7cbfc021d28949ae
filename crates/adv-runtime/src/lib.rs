mod engine;
mod player;

pub use engine::{StoryEngine, StoryEngineOptions, DEFAULT_MAX_STEPS};
pub use player::{
    NoFetcher, Player, PlayerHandle, PlayerSummary, StoryDisplay, StoryFetcher,
};
