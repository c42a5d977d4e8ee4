//! Wire types for the quiz server's JSON surface.
//!
//! The server has shipped a few spellings of the same field over time
//! (`summary` / `stageSummary`, `text` / `question`, ...). Every alias is
//! folded in here so the rest of the crate sees one shape.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const STATE_PATH: &str = "/api/state";
pub const SUBMIT_PATH: &str = "/api/submit";
pub const START_STAGE_PATH: &str = "/api/start_stage";
pub const START_EVENT_PATH: &str = "/api/start_event";
pub const NEXT_PATH: &str = "/api/next";
pub const RESET_PATH: &str = "/api/reset";

const NOT_STARTED: &str = "NOT_STARTED";

// JSON `null` is treated like an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Snapshot of the server's game state as the client renders it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicState {
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage_title: String,
    #[serde(default, alias = "stageSummary", deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub current_index: usize,
    #[serde(default, alias = "total_questions", deserialize_with = "null_as_default")]
    pub total_questions: usize,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: i64,
    #[serde(default, alias = "intro")]
    pub stage_intro: Option<Value>,
    #[serde(default)]
    pub stage_outro: Option<Value>,
    #[serde(default)]
    pub events: Option<Vec<EventEntry>>,
    #[serde(default)]
    pub cleared_events: Option<Vec<String>>,
    #[serde(default)]
    pub completed_events: Option<Vec<String>>,
    #[serde(default)]
    pub current_event: Option<CurrentEvent>,
    #[serde(default)]
    pub event_intro: Option<Value>,
    #[serde(default, alias = "stage_cleared", deserialize_with = "null_as_default")]
    pub stage_cleared: bool,
    #[serde(default)]
    pub question: Option<Question>,
}

impl PublicState {
    pub fn current_event_title(&self) -> Option<&str> {
        self.current_event
            .as_ref()
            .and_then(|ce| ce.title.as_deref())
            .filter(|t| !t.is_empty())
    }

    /// Intro payload for the event in progress, if the server sent one.
    pub fn event_intro_payload(&self) -> Option<&Value> {
        self.current_event
            .as_ref()
            .and_then(|ce| ce.intro.as_ref())
            .or(self.event_intro.as_ref())
            .filter(|v| !v.is_null())
    }

    pub fn stage_intro_payload(&self) -> Option<&Value> {
        self.stage_intro.as_ref().filter(|v| !v.is_null())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEntry {
    pub key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cleared: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_index: usize,
    #[serde(default)]
    pub event_total: Option<usize>,
    #[serde(default)]
    pub intro: Option<Value>,
    #[serde(default)]
    pub outro: Option<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, alias = "question", deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub options: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub image_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_hint: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hint: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub explanation: String,
}

impl Question {
    /// Anything that is not `mcq` is answered through the short-answer input.
    pub fn is_mcq(&self) -> bool {
        self.kind == "mcq"
    }
}

/// Response body of `POST /api/submit`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub correct: bool,
    #[serde(default)]
    pub correct_choice_index: Option<usize>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_cleared: bool,
    #[serde(default)]
    pub event_outro: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stage_cleared: bool,
    #[serde(default)]
    pub stage_outro: Option<Value>,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub public_state: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SubmitResult {
    pub fn event_outro_payload(&self) -> Option<&Value> {
        self.event_outro.as_ref().filter(|v| !v.is_null())
    }

    pub fn stage_outro_payload(&self) -> Option<&Value> {
        self.stage_outro.as_ref().filter(|v| !v.is_null())
    }

    /// The next state bundled with the result, normalized like `GET /api/state`.
    pub fn next_state(&self) -> Result<Option<PublicState>, serde_json::Error> {
        match &self.public_state {
            Some(raw) => parse_state(raw.clone()),
            None => Ok(None),
        }
    }
}

/// Answer payload. Multiple choice sends the 0-based option index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SubmitRequest {
    Choice {
        #[serde(rename = "choiceIndex")]
        choice_index: usize,
    },
    Text {
        answer: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartStageRequest<'a> {
    pub stage_id: &'a str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartEventRequest<'a> {
    pub event_key: &'a str,
}

/// Normalize a state body. `{"status": "NOT_STARTED"}` and `null` mean
/// there is no run in progress.
pub fn parse_state(raw: Value) -> Result<Option<PublicState>, serde_json::Error> {
    if raw.is_null() {
        return Ok(None);
    }
    if raw.get("status").and_then(Value::as_str) == Some(NOT_STARTED) {
        return Ok(None);
    }
    serde_json::from_value(raw).map(Some)
}

/// Pull the `error` message out of a failed response body, if it has one.
pub fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("error")?.as_str().map(str::to_owned)
}
