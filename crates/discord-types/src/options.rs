//! Slash-command option snapshots captured by the receiver

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Typed value of a single slash-command option.
///
/// On the wire, strings, integers, numbers and booleans are plain JSON values.
/// Snowflake ids are tagged (`{"type": "user", "value": "1234"}`) and carried
/// as strings so they survive JSON consumers that only have 53-bit integers.
/// The tagged form is accepted for every kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(from = "WireValue", into = "WireValue")]
pub enum OptionValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(String),
    Channel(String),
    Role(String),
    Attachment(String),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum WireValue {
    Boolean(bool),
    Integer(i64),
    Number(f64),
    String(String),
    Tagged(TaggedValue),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
enum TaggedValue {
    String(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    User(String),
    Channel(String),
    Role(String),
    Attachment(String),
}

impl From<WireValue> for OptionValue {
    fn from(wire: WireValue) -> Self {
        match wire {
            WireValue::Boolean(b) => Self::Boolean(b),
            WireValue::Integer(i) => Self::Integer(i),
            WireValue::Number(n) => Self::Number(n),
            WireValue::String(s) => Self::String(s),
            WireValue::Tagged(tagged) => match tagged {
                TaggedValue::String(s) => Self::String(s),
                TaggedValue::Integer(i) => Self::Integer(i),
                TaggedValue::Number(n) => Self::Number(n),
                TaggedValue::Boolean(b) => Self::Boolean(b),
                TaggedValue::User(id) => Self::User(id),
                TaggedValue::Channel(id) => Self::Channel(id),
                TaggedValue::Role(id) => Self::Role(id),
                TaggedValue::Attachment(id) => Self::Attachment(id),
            },
        }
    }
}

impl From<OptionValue> for WireValue {
    fn from(value: OptionValue) -> Self {
        match value {
            OptionValue::String(s) => Self::String(s),
            OptionValue::Integer(i) => Self::Integer(i),
            OptionValue::Number(n) => Self::Number(n),
            OptionValue::Boolean(b) => Self::Boolean(b),
            OptionValue::User(id) => Self::Tagged(TaggedValue::User(id)),
            OptionValue::Channel(id) => Self::Tagged(TaggedValue::Channel(id)),
            OptionValue::Role(id) => Self::Tagged(TaggedValue::Role(id)),
            OptionValue::Attachment(id) => Self::Tagged(TaggedValue::Attachment(id)),
        }
    }
}

/// Tag-only view of [`OptionValue`], used to ask for a value of a given kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    String,
    Integer,
    Number,
    Boolean,
    User,
    Channel,
    Role,
    Attachment,
}

impl OptionValue {
    pub fn kind(&self) -> OptionKind {
        match self {
            Self::String(_) => OptionKind::String,
            Self::Integer(_) => OptionKind::Integer,
            Self::Number(_) => OptionKind::Number,
            Self::Boolean(_) => OptionKind::Boolean,
            Self::User(_) => OptionKind::User,
            Self::Channel(_) => OptionKind::Channel,
            Self::Role(_) => OptionKind::Role,
            Self::Attachment(_) => OptionKind::Attachment,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s)
            | Self::User(s)
            | Self::Channel(s)
            | Self::Role(s)
            | Self::Attachment(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to `f64`; Discord lets a `number` option carry either.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::User => "user",
            Self::Channel => "channel",
            Self::Role => "role",
            Self::Attachment => "attachment",
        };
        f.write_str(name)
    }
}

/// Option name → value, frozen when the interaction is received.
pub type OptionsSnapshot = BTreeMap<String, OptionValue>;
