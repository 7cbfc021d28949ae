use super::*;

pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryEngineOptions {
    /// Hold each road until the display acknowledges it.
    pub acknowledge_text: bool,
    /// Executions one play may run without waiting on a choice, an
    /// acknowledgement or a fetch. Exceeding it fails that play only.
    pub max_steps: usize,
}

impl Default for StoryEngineOptions {
    fn default() -> Self {
        Self {
            acknowledge_text: false,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

/// Executes story nodes one at a time from a single FIFO queue.
///
/// Every way a play can move forward (a road's successor, a chosen option,
/// a fetched document, a fresh `start`) appends to the same queue. A pending
/// choice or acknowledgement blocks the queue until it is resolved.
#[derive(Debug)]
pub struct StoryEngine {
    pub(super) options: StoryEngineOptions,
    pub(super) queue: VecDeque<QueueItem>,
    pub(super) suspension: Option<Suspension>,
    pub(super) pending_fetches: BTreeMap<FetchTicket, PendingFetch>,
    pub(super) live_plays: BTreeSet<PlayId>,
    pub(super) play_counter: u64,
    pub(super) ticket_counter: u64,
    pub(super) play_steps: BTreeMap<PlayId, usize>,
}

impl StoryEngine {
    pub fn new(options: StoryEngineOptions) -> Self {
        Self {
            options,
            queue: VecDeque::new(),
            suspension: None,
            pending_fetches: BTreeMap::new(),
            live_plays: BTreeSet::new(),
            play_counter: 0,
            ticket_counter: 0,
            play_steps: BTreeMap::new(),
        }
    }

    pub fn options(&self) -> &StoryEngineOptions {
        &self.options
    }

    pub fn start(&mut self, graph: Arc<Graph>, entry: &str) -> Result<PlayId, AdventureError> {
        let Some(node) = graph.get(entry) else {
            return Err(AdventureError::unknown_node("ENGINE_ENTRY_NOT_FOUND", entry));
        };

        self.play_counter += 1;
        let play = PlayId(self.play_counter);
        self.live_plays.insert(play);
        self.queue.push_back(QueueItem::Execute { play, graph, node });
        log::debug!("{} queued at \"{}\"", play, entry);
        Ok(play)
    }

    pub fn state(&self) -> EngineState {
        match &self.suspension {
            Some(Suspension::Choice { .. }) => return EngineState::AwaitingChoice,
            Some(Suspension::Acknowledge { .. }) => return EngineState::AwaitingAcknowledge,
            None => {}
        }

        if !self.queue.is_empty() {
            EngineState::Running
        } else if !self.pending_fetches.is_empty() {
            EngineState::AwaitingFetch
        } else if self.play_counter > 0 && self.live_plays.is_empty() {
            EngineState::Terminated
        } else {
            EngineState::Idle
        }
    }

    pub fn is_suspended(&self) -> bool {
        self.suspension.is_some()
    }

    pub fn pending_fetches(&self) -> usize {
        self.pending_fetches.len()
    }

    pub fn live_plays(&self) -> usize {
        self.live_plays.len()
    }

    pub(super) fn suspend(&mut self, suspension: Suspension) {
        let play = match &suspension {
            Suspension::Choice { play, .. } | Suspension::Acknowledge { play, .. } => *play,
        };
        self.play_steps.remove(&play);
        self.suspension = Some(suspension);
        log::debug!("engine suspended: {:?}", self.state());
    }
}
