use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::timeout;

use super::*;
use crate::engine::StoryEngineOptions;
use adv_compiler::compile_graph;
use adv_core::Locator;

struct RecordingDisplay {
    events: UnboundedSender<String>,
}

impl RecordingDisplay {
    fn record(&self, event: String) {
        self.events.send(event).expect("test receiver should be alive");
    }
}

impl StoryDisplay for RecordingDisplay {
    fn show_text(&self, text: &str) {
        self.record(format!("text:{}", text));
    }

    fn show_prompt(&self, text: &str) {
        self.record(format!("prompt:{}", text));
    }

    fn show_option(&self, key: &str, text: &str) {
        self.record(format!("option:{}:{}", key, text));
    }

    fn request_choice(&self) {
        self.record("choose".to_string());
    }

    fn request_acknowledge(&self) {
        self.record("ack".to_string());
    }

    fn unknown_choice(&self, key: &str) {
        self.record(format!("unknown:{}", key));
    }

    fn play_failed(&self, error: &AdventureError) {
        self.record(format!("failed:{}", error.code));
    }

    fn on_end(&self) {
        self.record("end".to_string());
    }
}

/// Serves documents by path, each one only after its gate is opened.
struct GatedFetcher {
    gates: Mutex<HashMap<String, oneshot::Receiver<String>>>,
}

impl GatedFetcher {
    fn new(paths: &[&str]) -> (Self, HashMap<String, oneshot::Sender<String>>) {
        let mut gates = HashMap::new();
        let mut openers = HashMap::new();
        for path in paths {
            let (opener, gate) = oneshot::channel();
            gates.insert(path.to_string(), gate);
            openers.insert(path.to_string(), opener);
        }
        (
            Self {
                gates: Mutex::new(gates),
            },
            openers,
        )
    }
}

#[async_trait]
impl StoryFetcher for GatedFetcher {
    async fn fetch(&self, locator: &Locator) -> Result<String, AdventureError> {
        let Locator::Path(path) = locator else {
            return Err(AdventureError::fetch("FETCH_TEST", "urls are not served"));
        };
        let gate = self
            .gates
            .lock()
            .expect("gates lock")
            .remove(path)
            .expect("each path is fetched once");
        gate.await
            .map_err(|_| AdventureError::fetch("FETCH_TEST", "gate dropped"))
    }
}

const SINGLE_ROAD: &str = r#"{"start": {"type": "road", "text": "hi", "next": null}}"#;

const LEFT_RIGHT: &str = r#"{
  "start": {"type": "fork", "text": "pick", "options": [["1", "go left", "left"], ["2", "go right", "right"]]},
  "left": {"type": "road", "text": "L", "next": null},
  "right": {"type": "road", "text": "R", "next": null}
}"#;

fn graph(source: &str) -> Arc<Graph> {
    Arc::new(compile_graph(source).expect("story should compile"))
}

fn player_with(
    options: StoryEngineOptions,
    fetcher: Arc<dyn StoryFetcher>,
) -> (Player, PlayerHandle, UnboundedReceiver<String>) {
    let (events, receiver) = unbounded_channel();
    let display = Arc::new(RecordingDisplay { events });
    let (player, handle) = Player::new(StoryEngine::new(options), display, fetcher);
    (player, handle, receiver)
}

fn player() -> (Player, PlayerHandle, UnboundedReceiver<String>) {
    player_with(StoryEngineOptions::default(), Arc::new(NoFetcher))
}

async fn next_event(events: &mut UnboundedReceiver<String>) -> String {
    timeout(Duration::from_secs(5), events.recv())
        .await
        .expect("event should arrive in time")
        .expect("display should still be alive")
}

async fn expect_events(events: &mut UnboundedReceiver<String>, expected: &[&str]) {
    for want in expected {
        assert_eq!(next_event(events).await, *want);
    }
}

async fn remaining_events(mut events: UnboundedReceiver<String>) -> Vec<String> {
    let mut rest = Vec::new();
    while let Some(event) = events.recv().await {
        rest.push(event);
    }
    rest
}

#[tokio::test]
async fn single_road_shows_text_and_ends_once() {
    let (player, handle, events) = player();
    let run = tokio::spawn(player.run());

    handle.start(graph(SINGLE_ROAD), "start").await.expect("start");
    let summary = run.await.expect("join").expect("run");

    assert_eq!(summary.plays_ended, 1);
    assert_eq!(summary.plays_failed, 0);
    assert_eq!(remaining_events(events).await, vec!["text:hi", "end"]);
}

#[tokio::test]
async fn fork_offers_options_in_order_then_follows_the_choice() {
    for (key, expected) in [("1", "text:L"), ("2", "text:R")] {
        let (player, handle, mut events) = player();
        let run = tokio::spawn(player.run());

        handle.start(graph(LEFT_RIGHT), "start").await.expect("start");
        expect_events(
            &mut events,
            &["prompt:pick", "option:1:go left", "option:2:go right", "choose"],
        )
        .await;
        handle.choose(key).expect("choose");

        run.await.expect("join").expect("run");
        assert_eq!(remaining_events(events).await, vec![expected, "end"]);
    }
}

#[tokio::test]
async fn unknown_choice_asks_again_without_advancing() {
    let (player, handle, mut events) = player();
    let run = tokio::spawn(player.run());

    handle.start(graph(LEFT_RIGHT), "start").await.expect("start");
    expect_events(
        &mut events,
        &["prompt:pick", "option:1:go left", "option:2:go right", "choose"],
    )
    .await;

    handle.choose("9").expect("choose 9");
    expect_events(&mut events, &["unknown:9", "choose"]).await;
    handle.choose("1").expect("choose 1");

    let summary = run.await.expect("join").expect("run");
    assert_eq!(summary.unknown_choices, 1);
    assert_eq!(remaining_events(events).await, vec!["text:L", "end"]);
}

#[tokio::test]
async fn fetched_plays_never_interleave_with_a_pending_fork() {
    let (fetcher, mut openers) = GatedFetcher::new(&["a.json", "b.json"]);
    let (player, handle, mut events) =
        player_with(StoryEngineOptions::default(), Arc::new(fetcher));
    let run = tokio::spawn(player.run());

    let story = graph(
        r#"{
  "a": {"type": "file", "path": "a.json", "next": "in"},
  "b": {"type": "file", "path": "b.json", "next": "in"}
}"#,
    );
    handle.start(Arc::clone(&story), "a").await.expect("start a");
    handle.start(story, "b").await.expect("start b");

    openers
        .remove("b.json")
        .expect("b opener")
        .send(
            r#"{
  "in": {"type": "fork", "text": "b?", "options": [["1", "onward", "done"]]},
  "done": {"type": "road", "text": "B", "next": null}
}"#
            .to_string(),
        )
        .expect("open b");
    expect_events(&mut events, &["prompt:b?", "option:1:onward", "choose"]).await;

    openers
        .remove("a.json")
        .expect("a opener")
        .send(r#"{"in": {"type": "road", "text": "A", "next": null}}"#.to_string())
        .expect("open a");
    assert!(
        timeout(Duration::from_millis(50), events.recv()).await.is_err(),
        "nothing may run while the fork is pending"
    );

    handle.choose("1").expect("choose");
    let summary = run.await.expect("join").expect("run");
    assert_eq!(summary.plays_ended, 2);
    assert_eq!(
        remaining_events(events).await,
        vec!["text:A", "text:B", "end", "end"]
    );
}

#[tokio::test]
async fn failed_fetch_ends_only_that_play() {
    let (player, handle, events) = player();
    let run = tokio::spawn(player.run());

    handle
        .start(
            graph(
                r#"{
  "start": {"type": "road", "text": "x", "next": "away"},
  "away": {"type": "file", "path": "missing.json", "next": "start"}
}"#,
            ),
            "start",
        )
        .await
        .expect("start");

    let summary = run.await.expect("join").expect("run");
    assert_eq!(summary.plays_failed, 1);
    assert_eq!(summary.plays_ended, 0);
    assert_eq!(
        remaining_events(events).await,
        vec!["text:x", "failed:FETCH_UNAVAILABLE"]
    );
}

#[tokio::test]
async fn acknowledge_mode_waits_after_each_road() {
    let options = StoryEngineOptions {
        acknowledge_text: true,
        ..StoryEngineOptions::default()
    };
    let (player, handle, mut events) = player_with(options, Arc::new(NoFetcher));
    let run = tokio::spawn(player.run());

    handle
        .start(
            graph(
                r#"{
  "a": {"type": "road", "text": "A", "next": "b"},
  "b": {"type": "road", "text": "B", "next": null}
}"#,
            ),
            "a",
        )
        .await
        .expect("start");

    expect_events(&mut events, &["text:A", "ack"]).await;
    handle.choose("1").expect("stray choice is accepted by the inbox");
    handle.acknowledge().expect("ack a");
    expect_events(&mut events, &["text:B", "ack"]).await;
    handle.acknowledge().expect("ack b");

    run.await.expect("join").expect("run");
    assert_eq!(remaining_events(events).await, vec!["end"]);
}

#[tokio::test]
async fn start_with_unknown_entry_is_reported_to_the_caller() {
    let (player, handle, events) = player();
    let run = tokio::spawn(player.run());

    let error = handle
        .start(graph(SINGLE_ROAD), "missing")
        .await
        .expect_err("unknown entry");
    assert_eq!(error.code, "ENGINE_ENTRY_NOT_FOUND");

    handle.shutdown().expect("shutdown");
    let summary = run.await.expect("join").expect("run");
    assert_eq!(summary, PlayerSummary::default());
    assert!(remaining_events(events).await.is_empty());
}

#[tokio::test]
async fn handles_report_closed_after_the_player_stops() {
    let (player, handle, _events) = player();
    let run = tokio::spawn(player.run());

    handle.start(graph(SINGLE_ROAD), "start").await.expect("start");
    run.await.expect("join").expect("run");

    let error = handle.choose("1").expect_err("player stopped");
    assert_eq!(error.code, "PLAYER_CLOSED");

    let error = handle
        .start(graph(SINGLE_ROAD), "start")
        .await
        .expect_err("later batch needs a new player");
    assert_eq!(error.code, "PLAYER_CLOSED");
}

#[tokio::test]
async fn road_cycle_fails_its_play_without_stopping_the_player() {
    let (player, handle, events) = player_with(
        StoryEngineOptions {
            max_steps: 3,
            ..StoryEngineOptions::default()
        },
        Arc::new(NoFetcher),
    );
    let run = tokio::spawn(player.run());

    handle
        .start(
            graph(r#"{"start": {"type": "road", "text": "again", "next": "start"}}"#),
            "start",
        )
        .await
        .expect("looping start");
    let summary = run.await.expect("join").expect("run");

    assert_eq!(summary.plays_failed, 1);
    assert_eq!(
        remaining_events(events).await,
        vec![
            "text:again",
            "text:again",
            "text:again",
            "failed:ENGINE_GUARD_EXCEEDED"
        ]
    );
}

#[tokio::test]
async fn dropping_every_handle_stops_a_suspended_player() {
    let (player, handle, mut events) = player();
    let run = tokio::spawn(player.run());

    handle.start(graph(LEFT_RIGHT), "start").await.expect("start");
    expect_events(
        &mut events,
        &["prompt:pick", "option:1:go left", "option:2:go right", "choose"],
    )
    .await;
    drop(handle);

    let summary = timeout(Duration::from_secs(5), run)
        .await
        .expect("player should stop")
        .expect("join")
        .expect("run");
    assert_eq!(summary.plays_ended, 0);
}
