//! Data model: heterogeneous JSONL records, chat messages, and the typed
//! results extracted from evaluator output.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::Error;

/// One row of a line-delimited JSON dataset. Datasets carry different column
/// sets per mode, so the row stays schemaless; pipeline stages attach output
/// fields in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

impl Record {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// True when the column is present and not null.
    pub fn has(&self, key: &str) -> bool {
        matches!(self.0.get(key), Some(v) if !v.is_null())
    }

    /// Text of a required column. Non-string scalars are rendered to their
    /// JSON form so numeric ids interpolate cleanly into prompts.
    pub fn text_field(&self, key: &str) -> Result<Cow<'_, str>, Error> {
        match self.0.get(key) {
            None | Some(Value::Null) => Err(Error::missing_column(key)),
            Some(Value::String(s)) => Ok(Cow::Borrowed(s)),
            Some(other) => Ok(Cow::Owned(other.to_string())),
        }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }
}

/// Message role; serialized lowercase to match the chat-completions wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One role-tagged segment of a prompt. A full prompt is a `Vec<ChatMessage>`,
/// immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Single-answer evaluation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Deceptive-question rubric: rate how well an answer exposes the flaw.
    Gen,
    /// Ordinary-question rubric: rate plain answer quality.
    Normal,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Gen => "gen",
            Mode::Normal => "normal",
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gen" => Ok(Mode::Gen),
            "normal" => Ok(Mode::Normal),
            other => Err(Error::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rubric score extracted from evaluator output. Only 0..=4 are valid scores;
/// `Unparseable` persists as -1 and is distinguishable from a genuine 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Score(u8),
    Unparseable,
}

impl Rating {
    pub fn from_candidate(value: i64) -> Self {
        if (0..=4).contains(&value) {
            Rating::Score(value as u8)
        } else {
            Rating::Unparseable
        }
    }

    pub fn as_i64(&self) -> i64 {
        match self {
            Rating::Score(n) => i64::from(*n),
            Rating::Unparseable => -1,
        }
    }
}

impl From<Rating> for Value {
    fn from(r: Rating) -> Self {
        Value::from(r.as_i64())
    }
}

/// Pairwise forced-choice result. The persisted column mixes the tag string
/// with the -1 sentinel, mirroring the published result files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    AnswerA,
    AnswerB,
    Unparseable,
}

impl Choice {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "AnswerA" => Choice::AnswerA,
            "AnswerB" => Choice::AnswerB,
            _ => Choice::Unparseable,
        }
    }
}

impl From<Choice> for Value {
    fn from(c: Choice) -> Self {
        match c {
            Choice::AnswerA => Value::from("AnswerA"),
            Choice::AnswerB => Value::from("AnswerB"),
            Choice::Unparseable => Value::from(-1),
        }
    }
}
