use super::*;

impl StoryEngine {
    /// Executes the node at the front of the queue. While a choice or
    /// acknowledgement is pending, re-reports it instead of executing.
    pub fn next_output(&mut self) -> Result<EngineOutput, AdventureError> {
        if let Some(suspension) = &self.suspension {
            return Ok(suspension_output(suspension));
        }

        let Some(item) = self.queue.pop_front() else {
            return Ok(match self.state() {
                EngineState::Terminated => EngineOutput::Finished,
                _ => EngineOutput::Idle,
            });
        };

        match item {
            QueueItem::Execute { play, graph, node } => {
                let steps = self.play_steps.entry(play).or_default();
                *steps += 1;
                if *steps > self.options.max_steps {
                    let error = AdventureError::state(
                        "ENGINE_GUARD_EXCEEDED",
                        format!(
                            "{} ran {} steps without waiting for the player.",
                            play, self.options.max_steps
                        ),
                    );
                    return Ok(self.fail(play, error));
                }
                Ok(self.execute(play, graph, node))
            }
            QueueItem::Fail { play, error } => Ok(self.fail(play, error)),
        }
    }

    fn fail(&mut self, play: PlayId, error: AdventureError) -> EngineOutput {
        self.live_plays.remove(&play);
        self.play_steps.remove(&play);
        log::warn!("{} failed: {}", play, error);
        EngineOutput::PlayFailed { play, error }
    }

    fn execute(&mut self, play: PlayId, graph: Arc<Graph>, node_ref: NodeRef) -> EngineOutput {
        let node = graph.node(node_ref).clone();
        log::trace!("{} executing {} node", play, node.kind_name());

        match node {
            Node::Road { text, next } => {
                if self.options.acknowledge_text {
                    self.suspend(Suspension::Acknowledge {
                        play,
                        graph,
                        text: text.clone(),
                        next,
                    });
                } else {
                    self.queue.push_back(QueueItem::Execute {
                        play,
                        graph,
                        node: next,
                    });
                }
                EngineOutput::Text { play, text }
            }
            Node::Fork { text, options } => {
                let output = EngineOutput::Fork {
                    play,
                    prompt: text,
                    options: options
                        .into_iter()
                        .map(|option| ChoiceItem {
                            key: option.key,
                            text: option.text,
                        })
                        .collect(),
                };
                self.suspend(Suspension::Choice {
                    play,
                    graph,
                    node: node_ref,
                });
                output
            }
            Node::Link { url, entry_key } => self.dispatch_fetch(play, Locator::Url(url), entry_key),
            Node::File { path, entry_key } => {
                self.dispatch_fetch(play, Locator::Path(path), entry_key)
            }
            Node::Dead => {
                self.live_plays.remove(&play);
                self.play_steps.remove(&play);
                log::debug!("{} reached the end", play);
                EngineOutput::End { play }
            }
        }
    }

    fn dispatch_fetch(&mut self, play: PlayId, locator: Locator, entry_key: String) -> EngineOutput {
        self.play_steps.remove(&play);
        self.ticket_counter += 1;
        let ticket = FetchTicket(self.ticket_counter);
        self.pending_fetches.insert(
            ticket,
            PendingFetch {
                play,
                locator: locator.clone(),
                entry_key: entry_key.clone(),
            },
        );
        log::debug!("{} waits on {} for {}", play, ticket, locator);
        EngineOutput::Fetch {
            request: FetchRequest {
                ticket,
                play,
                locator,
                entry_key,
            },
        }
    }
}

fn suspension_output(suspension: &Suspension) -> EngineOutput {
    match suspension {
        Suspension::Choice { play, graph, node } => match graph.node(*node) {
            Node::Fork { text, options } => EngineOutput::Fork {
                play: *play,
                prompt: text.clone(),
                options: options
                    .iter()
                    .map(|option| ChoiceItem {
                        key: option.key.clone(),
                        text: option.text.clone(),
                    })
                    .collect(),
            },
            _ => EngineOutput::Idle,
        },
        Suspension::Acknowledge { play, text, .. } => EngineOutput::Text {
            play: *play,
            text: text.clone(),
        },
    }
}
