use super::*;

impl StoryEngine {
    pub fn choose(&mut self, key: &str) -> Result<(), AdventureError> {
        let Some(Suspension::Choice { play, graph, node }) = &self.suspension else {
            return Err(AdventureError::state(
                "ENGINE_NO_PENDING_CHOICE",
                "No pending choice is available.",
            ));
        };

        let Some(option) = graph.node(*node).option(key) else {
            log::debug!("{} offered unknown choice \"{}\"", play, key);
            return Err(AdventureError::unknown_choice(key));
        };

        let item = QueueItem::Execute {
            play: *play,
            graph: Arc::clone(graph),
            node: option.next,
        };
        self.resume(item);
        Ok(())
    }

    pub fn acknowledge(&mut self) -> Result<(), AdventureError> {
        let Some(Suspension::Acknowledge {
            play, graph, next, ..
        }) = &self.suspension
        else {
            return Err(AdventureError::state(
                "ENGINE_NO_PENDING_ACKNOWLEDGE",
                "No pending acknowledgement is available.",
            ));
        };

        let item = QueueItem::Execute {
            play: *play,
            graph: Arc::clone(graph),
            node: *next,
        };
        self.resume(item);
        Ok(())
    }

    /// Feeds back the outcome of a fetch. A fetched document becomes a graph
    /// of its own and the play re-enters it at the link's entry key; any
    /// failure ends the play.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<String, AdventureError>,
    ) -> Result<(), AdventureError> {
        let Some(pending) = self.pending_fetches.remove(&ticket) else {
            return Err(AdventureError::state(
                "ENGINE_FETCH_TICKET_UNKNOWN",
                format!("No fetch is pending for {}.", ticket),
            ));
        };

        let item = match result.and_then(|document| enter_document(&document, &pending.entry_key))
        {
            Ok((graph, node)) => QueueItem::Execute {
                play: pending.play,
                graph,
                node,
            },
            Err(error) => {
                log::debug!("{} from {} failed: {}", ticket, pending.locator, error);
                QueueItem::Fail {
                    play: pending.play,
                    error,
                }
            }
        };

        self.queue.push_back(item);
        Ok(())
    }

    fn resume(&mut self, item: QueueItem) {
        self.suspension = None;
        self.queue.push_back(item);
    }
}

fn enter_document(document: &str, entry_key: &str) -> Result<(Arc<Graph>, NodeRef), AdventureError> {
    let graph = Arc::new(compile_graph(document)?);
    let node = graph
        .get(entry_key)
        .ok_or_else(|| AdventureError::unknown_node("ENGINE_LINK_ENTRY_NOT_FOUND", entry_key))?;
    Ok((graph, node))
}
