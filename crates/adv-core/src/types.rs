use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AdventureError;
use crate::graph::Locator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayId(pub u64);

impl fmt::Display for PlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "play#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FetchTicket(pub u64);

impl fmt::Display for FetchTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fetch#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceItem {
    pub key: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub ticket: FetchTicket,
    pub play: PlayId,
    pub locator: Locator,
    pub entry_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum EngineOutput {
    Text {
        play: PlayId,
        text: String,
    },
    Fork {
        play: PlayId,
        prompt: String,
        options: Vec<ChoiceItem>,
    },
    Fetch {
        request: FetchRequest,
    },
    End {
        play: PlayId,
    },
    PlayFailed {
        play: PlayId,
        error: AdventureError,
    },
    /// Nothing is runnable right now; fetches may still be in flight.
    Idle,
    /// Every started play has ended or failed.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EngineState {
    Idle,
    Running,
    AwaitingAcknowledge,
    AwaitingChoice,
    AwaitingFetch,
    Terminated,
}

impl EngineState {
    pub fn is_suspended(self) -> bool {
        matches!(self, Self::AwaitingAcknowledge | Self::AwaitingChoice)
    }
}

#[cfg(test)]
mod types_tests {
    use super::*;

    #[test]
    fn engine_output_serializes_with_kind_tag() {
        let output = EngineOutput::Fork {
            play: PlayId(1),
            prompt: "pick".to_string(),
            options: vec![ChoiceItem {
                key: "1".to_string(),
                text: "left".to_string(),
            }],
        };
        let json = serde_json::to_value(&output).expect("output json");
        assert_eq!(json["kind"], "fork");
        assert_eq!(json["options"][0]["key"], "1");

        let idle = serde_json::to_value(EngineOutput::Idle).expect("idle json");
        assert_eq!(idle["kind"], "idle");
    }

    #[test]
    fn only_choice_and_acknowledge_suspend_the_queue() {
        assert!(EngineState::AwaitingChoice.is_suspended());
        assert!(EngineState::AwaitingAcknowledge.is_suspended());
        assert!(!EngineState::AwaitingFetch.is_suspended());
        assert!(!EngineState::Running.is_suspended());
    }

    #[test]
    fn ids_display_with_prefix() {
        assert_eq!(PlayId(3).to_string(), "play#3");
        assert_eq!(FetchTicket(7).to_string(), "fetch#7");
    }
}
