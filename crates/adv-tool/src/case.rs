use serde::{Deserialize, Serialize};

pub const TESTCASE_SCHEMA_V1: &str = "adv-tool-case.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub schema_version: String,
    #[serde(default = "default_entry")]
    pub entry: String,
    #[serde(default)]
    pub acknowledge_text: bool,
    #[serde(default)]
    pub actions: Vec<TestAction>,
    #[serde(default)]
    pub expected_events: Vec<ExpectedEvent>,
}

fn default_entry() -> String {
    adv_api::DEFAULT_ENTRY.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TestAction {
    Choose { key: String },
    Acknowledge,
}

impl TestAction {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Choose { .. } => "choose",
            Self::Acknowledge => "acknowledge",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ExpectedEvent {
    Text {
        text: String,
    },
    Fork {
        prompt: String,
        /// `[key, text]` pairs in declaration order.
        options: Vec<(String, String)>,
    },
    UnknownChoice {
        key: String,
    },
    Failed {
        code: String,
    },
    End,
}
