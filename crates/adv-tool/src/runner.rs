use std::fs;
use std::path::Path;

use adv_api::{create_engine_from_json, CreateEngineOptions};
use adv_core::{AdventureError, EngineOutput, EngineState, Locator};
use adv_runtime::{StoryEngine, StoryEngineOptions};

use crate::source::{read_story_from_dir, read_test_case};
use crate::{AdvToolError, ExpectedEvent, TestAction, TestCase};

const MAX_STEPS: usize = 5_000;
const PLAY_MAX_STEPS: usize = MAX_STEPS / 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub observed_events: Vec<ExpectedEvent>,
    pub consumed_actions: usize,
    pub steps: usize,
}

struct CaseActions<'a> {
    actions: &'a [TestAction],
    next: usize,
}

impl<'a> CaseActions<'a> {
    fn take(
        &mut self,
        event_index: usize,
        expected_action_kind: &str,
    ) -> Result<&'a TestAction, AdvToolError> {
        let action = self
            .actions
            .get(self.next)
            .ok_or_else(|| AdvToolError::MissingAction {
                event_index,
                expected_action_kind: expected_action_kind.to_string(),
            })?;
        self.next += 1;
        Ok(action)
    }
}

fn kind_mismatch(event_index: usize, expected: &str, actual: &TestAction) -> AdvToolError {
    AdvToolError::ActionKindMismatch {
        event_index,
        expected_action_kind: expected.to_string(),
        actual_action_kind: actual.kind_name().to_string(),
    }
}

/// Plays `story.json` from `story_dir` against the scripted actions. File
/// links resolve inside `story_dir`; URL links always fail.
pub fn run_case(story_dir: &Path, case: &TestCase) -> Result<RunReport, AdvToolError> {
    let story_json = read_story_from_dir(story_dir)?;
    let (mut engine, _play) = create_engine_from_json(CreateEngineOptions {
        story_json,
        entry: Some(case.entry.clone()),
        engine: StoryEngineOptions {
            acknowledge_text: case.acknowledge_text,
            max_steps: PLAY_MAX_STEPS,
        },
    })?;

    let mut observed_events = Vec::new();
    let mut actions = CaseActions {
        actions: &case.actions,
        next: 0,
    };

    for step in 1..=MAX_STEPS {
        match engine.next_output()? {
            EngineOutput::Text { text, .. } => {
                observed_events.push(ExpectedEvent::Text { text });
                if engine.state() == EngineState::AwaitingAcknowledge {
                    let event_index = observed_events.len() - 1;
                    match actions.take(event_index, "acknowledge")? {
                        TestAction::Acknowledge => engine.acknowledge()?,
                        other => return Err(kind_mismatch(event_index, "acknowledge", other)),
                    }
                }
            }
            EngineOutput::Fork {
                prompt, options, ..
            } => {
                observed_events.push(ExpectedEvent::Fork {
                    prompt,
                    options: options
                        .into_iter()
                        .map(|option| (option.key, option.text))
                        .collect(),
                });
                choose(&mut engine, &mut actions, &mut observed_events)?;
            }
            EngineOutput::Fetch { request } => {
                let result = fetch_from_dir(story_dir, &request.locator);
                engine.complete_fetch(request.ticket, result)?;
            }
            EngineOutput::End { .. } => observed_events.push(ExpectedEvent::End),
            EngineOutput::PlayFailed { error, .. } => {
                observed_events.push(ExpectedEvent::Failed { code: error.code });
            }
            EngineOutput::Finished => {
                if actions.next != case.actions.len() {
                    return Err(AdvToolError::UnusedActions {
                        used: actions.next,
                        total: case.actions.len(),
                    });
                }
                return Ok(RunReport {
                    observed_events,
                    consumed_actions: actions.next,
                    steps: step,
                });
            }
            EngineOutput::Idle => {
                return Err(AdvToolError::Stalled {
                    step,
                    pending: engine.pending_fetches(),
                })
            }
        }
    }

    Err(AdvToolError::GuardExceeded {
        max_steps: MAX_STEPS,
    })
}

/// Consumes choose actions until one names an offered option.
fn choose(
    engine: &mut StoryEngine,
    actions: &mut CaseActions<'_>,
    observed_events: &mut Vec<ExpectedEvent>,
) -> Result<(), AdvToolError> {
    loop {
        let event_index = observed_events.len() - 1;
        let key = match actions.take(event_index, "choose")? {
            TestAction::Choose { key } => key,
            other => return Err(kind_mismatch(event_index, "choose", other)),
        };
        match engine.choose(key) {
            Ok(()) => return Ok(()),
            Err(error) if error.is_recoverable() => {
                observed_events.push(ExpectedEvent::UnknownChoice { key: key.clone() });
            }
            Err(error) => return Err(error.into()),
        }
    }
}

fn fetch_from_dir(story_dir: &Path, locator: &Locator) -> Result<String, AdventureError> {
    match locator {
        Locator::Url(url) => Err(AdventureError::fetch(
            "TOOL_URL_UNAVAILABLE",
            format!("Case runner cannot fetch {}.", url),
        )),
        Locator::Path(path) => {
            let resolved = story_dir.join(path);
            fs::read_to_string(&resolved).map_err(|error| {
                AdventureError::fetch(
                    "TOOL_FILE_READ",
                    format!("{}: {}", resolved.display(), error),
                )
            })
        }
    }
}

pub fn assert_case(story_dir: &Path, case_path: &Path) -> Result<(), AdvToolError> {
    let case = read_test_case(case_path)?;
    let report = run_case(story_dir, &case)?;

    if report.observed_events.len() != case.expected_events.len() {
        let observed = serde_json::to_string_pretty(&report.observed_events)
            .map_err(AdvToolError::EventSerialize)?;
        return Err(AdvToolError::EventCountMismatch {
            expected: case.expected_events.len(),
            actual: report.observed_events.len(),
            observed,
        });
    }

    for (index, (expected, actual)) in case
        .expected_events
        .iter()
        .zip(report.observed_events.iter())
        .enumerate()
    {
        if expected != actual {
            let expected =
                serde_json::to_string(expected).map_err(AdvToolError::EventSerialize)?;
            let actual = serde_json::to_string(actual).map_err(AdvToolError::EventSerialize)?;
            return Err(AdvToolError::EventMismatch {
                index,
                expected,
                actual,
            });
        }
    }

    Ok(())
}
