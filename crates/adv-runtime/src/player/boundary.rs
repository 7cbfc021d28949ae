use async_trait::async_trait;

use adv_core::{AdventureError, Locator};

/// Presentation side of a running story.
///
/// Calls arrive from the player task one node execution at a time. Answers
/// travel back through [`PlayerHandle`](super::PlayerHandle).
pub trait StoryDisplay: Send + Sync {
    fn show_text(&self, text: &str);
    fn show_prompt(&self, text: &str);
    /// Called once per option, in declaration order.
    fn show_option(&self, key: &str, text: &str);
    fn request_choice(&self);
    fn request_acknowledge(&self) {}
    fn unknown_choice(&self, _key: &str) {}
    fn play_failed(&self, _error: &AdventureError) {}
    fn on_end(&self);
}

#[async_trait]
pub trait StoryFetcher: Send + Sync {
    async fn fetch(&self, locator: &Locator) -> Result<String, AdventureError>;
}

/// Fetcher for hosts that cannot load linked documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFetcher;

#[async_trait]
impl StoryFetcher for NoFetcher {
    async fn fetch(&self, locator: &Locator) -> Result<String, AdventureError> {
        Err(AdventureError::fetch(
            "FETCH_UNAVAILABLE",
            format!("No fetcher is configured to load {}.", locator),
        ))
    }
}
