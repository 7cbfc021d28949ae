use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use adv_core::{AdventureError, EngineOutput, EngineState, FetchRequest, FetchTicket, Graph, PlayId};

use crate::engine::StoryEngine;

mod boundary;

pub use boundary::{NoFetcher, StoryDisplay, StoryFetcher};

#[derive(Debug)]
enum PlayerCommand {
    Start {
        graph: Arc<Graph>,
        entry: String,
        reply: oneshot::Sender<Result<PlayId, AdventureError>>,
    },
    Choose(String),
    Acknowledge,
    FetchCompleted {
        ticket: FetchTicket,
        result: Result<String, AdventureError>,
    },
    Shutdown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerSummary {
    pub plays_ended: usize,
    pub plays_failed: usize,
    pub unknown_choices: usize,
}

/// Cloneable sender side of a [`Player`].
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    sender: mpsc::UnboundedSender<PlayerCommand>,
}

impl PlayerHandle {
    pub async fn start(
        &self,
        graph: Arc<Graph>,
        entry: impl Into<String>,
    ) -> Result<PlayId, AdventureError> {
        let (reply, answer) = oneshot::channel();
        self.send(PlayerCommand::Start {
            graph,
            entry: entry.into(),
            reply,
        })?;
        answer.await.map_err(|_| player_closed())?
    }

    pub fn choose(&self, key: impl Into<String>) -> Result<(), AdventureError> {
        self.send(PlayerCommand::Choose(key.into()))
    }

    pub fn acknowledge(&self) -> Result<(), AdventureError> {
        self.send(PlayerCommand::Acknowledge)
    }

    pub fn shutdown(&self) -> Result<(), AdventureError> {
        self.send(PlayerCommand::Shutdown)
    }

    fn send(&self, command: PlayerCommand) -> Result<(), AdventureError> {
        self.sender.send(command).map_err(|_| player_closed())
    }
}

fn player_closed() -> AdventureError {
    AdventureError::state("PLAYER_CLOSED", "Player is no longer running.")
}

/// Actor that owns one [`StoryEngine`] and drives it from a single inbox.
///
/// Player input and fetch completions are all messages on the same channel.
/// After each message the engine is drained until it suspends or runs dry,
/// so display calls for one node never interleave with another's.
pub struct Player {
    engine: StoryEngine,
    display: Arc<dyn StoryDisplay>,
    fetcher: Arc<dyn StoryFetcher>,
    inbox: mpsc::UnboundedReceiver<PlayerCommand>,
    outbox: mpsc::WeakUnboundedSender<PlayerCommand>,
    summary: PlayerSummary,
}

impl Player {
    pub fn new(
        engine: StoryEngine,
        display: Arc<dyn StoryDisplay>,
        fetcher: Arc<dyn StoryFetcher>,
    ) -> (Self, PlayerHandle) {
        let (sender, inbox) = mpsc::unbounded_channel();
        let player = Self {
            engine,
            display,
            fetcher,
            inbox,
            outbox: sender.downgrade(),
            summary: PlayerSummary::default(),
        };
        (player, PlayerHandle { sender })
    }

    pub fn engine(&self) -> &StoryEngine {
        &self.engine
    }

    /// Processes commands until every play has finished, a shutdown is
    /// requested, or all handles are dropped.
    ///
    /// A player serves one batch of plays. Once the engine terminates the
    /// actor stops, and later handle calls fail with `PLAYER_CLOSED`.
    pub async fn run(mut self) -> Result<PlayerSummary, AdventureError> {
        self.pump()?;

        while self.engine.state() != EngineState::Terminated {
            let Some(command) = self.inbox.recv().await else {
                log::debug!("all player handles dropped");
                break;
            };

            match command {
                PlayerCommand::Start {
                    graph,
                    entry,
                    reply,
                } => {
                    let started = self.engine.start(graph, &entry);
                    self.pump()?;
                    if reply.send(started).is_err() {
                        log::debug!("start requester went away before the reply");
                    }
                }
                PlayerCommand::Choose(key) => {
                    self.handle_choice(&key);
                    self.pump()?;
                }
                PlayerCommand::Acknowledge => {
                    if let Err(error) = self.engine.acknowledge() {
                        log::debug!("acknowledge discarded: {}", error);
                    }
                    self.pump()?;
                }
                PlayerCommand::FetchCompleted { ticket, result } => {
                    if let Err(error) = self.engine.complete_fetch(ticket, result) {
                        log::warn!("fetch completion discarded: {}", error);
                    }
                    self.pump()?;
                }
                PlayerCommand::Shutdown => {
                    log::debug!("player shutdown requested");
                    break;
                }
            }
        }

        Ok(self.summary)
    }

    fn handle_choice(&mut self, key: &str) {
        match self.engine.choose(key) {
            Ok(()) => {}
            Err(error) if error.is_recoverable() => {
                self.summary.unknown_choices += 1;
                self.display.unknown_choice(key);
                self.display.request_choice();
            }
            Err(error) => log::debug!("choice \"{}\" discarded: {}", key, error),
        }
    }

    fn pump(&mut self) -> Result<(), AdventureError> {
        while !self.engine.is_suspended() {
            match self.engine.next_output()? {
                EngineOutput::Text { text, .. } => {
                    self.display.show_text(&text);
                    if self.engine.state() == EngineState::AwaitingAcknowledge {
                        self.display.request_acknowledge();
                    }
                }
                EngineOutput::Fork {
                    prompt, options, ..
                } => {
                    self.display.show_prompt(&prompt);
                    for option in &options {
                        self.display.show_option(&option.key, &option.text);
                    }
                    self.display.request_choice();
                }
                EngineOutput::Fetch { request } => self.dispatch(request),
                EngineOutput::End { .. } => {
                    self.summary.plays_ended += 1;
                    self.display.on_end();
                }
                EngineOutput::PlayFailed { error, .. } => {
                    self.summary.plays_failed += 1;
                    self.display.play_failed(&error);
                }
                EngineOutput::Idle | EngineOutput::Finished => break,
            }
        }
        Ok(())
    }

    fn dispatch(&self, request: FetchRequest) {
        let Some(outbox) = self.outbox.upgrade() else {
            log::debug!("{} dropped: player is shutting down", request.ticket);
            return;
        };
        let fetcher = Arc::clone(&self.fetcher);

        tokio::spawn(async move {
            let result = fetcher.fetch(&request.locator).await;
            let completed = PlayerCommand::FetchCompleted {
                ticket: request.ticket,
                result,
            };
            if outbox.send(completed).is_err() {
                log::debug!("{} finished after the player stopped", request.ticket);
            }
        });
    }
}

#[cfg(test)]
mod tests;
