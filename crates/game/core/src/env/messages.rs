//! In-game text output.
//!
//! This is the text a player reads, not diagnostics; diagnostics go through
//! `tracing`.

use strum::{Display, IntoStaticStr};

/// Category of a message, used for colouring and filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Channel {
    Plain,
    /// Something heard rather than seen.
    Sound,
    /// A deity intervening.
    God,
    Warning,
    Diagnostics,
}

/// Receives the messages a bolt produces.
pub trait MessageSink {
    fn emit(&mut self, channel: Channel, text: &str);
}

/// One recorded message.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Message {
    pub channel: Channel,
    pub text: String,
}

/// Collects every message in order.
#[derive(Clone, Debug, Default)]
pub struct MessageLog {
    entries: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|m| m.text.as_str())
    }

    /// Number of messages whose text equals `text`.
    pub fn count(&self, text: &str) -> usize {
        self.entries.iter().filter(|m| m.text == text).count()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.count(text) > 0
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl MessageSink for MessageLog {
    fn emit(&mut self, channel: Channel, text: &str) {
        self.entries.push(Message {
            channel,
            text: text.to_string(),
        });
    }
}

/// Drops everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl MessageSink for Silent {
    fn emit(&mut self, _channel: Channel, _text: &str) {}
}
