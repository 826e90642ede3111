//! Inbound command envelope
//!
//! Commands arrive as JSON objects discriminated by `type`. Settings fields
//! are kept as raw JSON values until [`SettingsPatch::normalize`] runs, so a
//! field of the wrong type is dropped on its own instead of failing the
//! whole message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::state::{Mode, Side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    PointA,
    PointB,
    TimeoutA,
    TimeoutB,
    EndTimeout,
    Undo,
    ResetMatch,
    ResetAll,
    UpdateSettings(SettingsPatch),
    StartMatch {
        #[serde(
            rename = "firstServer",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        first_server: Option<Value>,
    },
}

impl Command {
    /// Parses one text frame; unknown `type` values are an error
    pub fn parse(payload: &str) -> Result<Command, serde_json::Error> {
        serde_json::from_str(payload)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn point(side: Side) -> Command {
        match side {
            Side::A => Command::PointA,
            Side::B => Command::PointB,
        }
    }

    pub fn timeout(side: Side) -> Command {
        match side {
            Side::A => Command::TimeoutA,
            Side::B => Command::TimeoutB,
        }
    }

    pub fn start_match(side: Side) -> Command {
        Command::StartMatch {
            first_server: Some(side_value(side)),
        }
    }
}

fn side_value(side: Side) -> Value {
    match side {
        Side::A => Value::from("A"),
        Side::B => Value::from("B"),
    }
}

/// Raw `UPDATE_SETTINGS` payload as received on the wire
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<Value>,
    #[serde(rename = "A1", default, skip_serializing_if = "Option::is_none")]
    pub a1: Option<Value>,
    #[serde(rename = "A2", default, skip_serializing_if = "Option::is_none")]
    pub a2: Option<Value>,
    #[serde(rename = "B1", default, skip_serializing_if = "Option::is_none")]
    pub b1: Option<Value>,
    #[serde(rename = "B2", default, skip_serializing_if = "Option::is_none")]
    pub b2: Option<Value>,
    #[serde(rename = "bestOf", default, skip_serializing_if = "Option::is_none")]
    pub best_of: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<Value>,
}

/// Validated settings; `None` means "leave unchanged"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub mode: Option<Mode>,
    pub a1: Option<String>,
    pub a2: Option<String>,
    pub b1: Option<String>,
    pub b2: Option<String>,
    pub best_of: Option<u32>,
    pub server: Option<Side>,
}

impl SettingsPatch {
    /// Keeps only the fields that carry a permitted value
    pub fn normalize(&self) -> Settings {
        Settings {
            mode: self.mode.as_ref().and_then(Value::as_str).and_then(Mode::parse),
            a1: text(&self.a1),
            a2: text(&self.a2),
            b1: text(&self.b1),
            b2: text(&self.b2),
            best_of: self
                .best_of
                .as_ref()
                .and_then(Value::as_u64)
                .filter(|n| *n == 3 || *n == 5)
                .map(|n| n as u32),
            server: parse_side(self.server.as_ref()),
        }
    }
}

impl From<Settings> for SettingsPatch {
    fn from(settings: Settings) -> Self {
        SettingsPatch {
            mode: settings.mode.map(|mode| match mode {
                Mode::Singles => Value::from("singles"),
                Mode::Doubles => Value::from("doubles"),
            }),
            a1: settings.a1.map(Value::from),
            a2: settings.a2.map(Value::from),
            b1: settings.b1.map(Value::from),
            b2: settings.b2.map(Value::from),
            best_of: settings.best_of.map(Value::from),
            server: settings.server.map(side_value),
        }
    }
}

fn text(value: &Option<Value>) -> Option<String> {
    value.as_ref().and_then(Value::as_str).map(str::to_string)
}

/// Accepts only the exact wire spellings `"A"` and `"B"`
pub fn parse_side(value: Option<&Value>) -> Option<Side> {
    match value.and_then(Value::as_str) {
        Some("A") => Some(Side::A),
        Some("B") => Some(Side::B),
        _ => None,
    }
}
