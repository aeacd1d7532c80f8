//! Administrator message carousel
//!
//! The home screen cycles through short announcements published by the
//! organisers. Navigation wraps around in both directions.

use serde::{Deserialize, Serialize};

use crate::constants::messages::{EMPTY, FALLBACK};

/// Direction of a carousel step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// One message back
    Previous,
    /// One message forward
    Next,
}

/// What the carousel shows
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageView {
    /// Message text
    pub text: String,
    /// Position as "i / n"
    pub counter: String,
}

/// The list of administrator messages and the one on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminMessages {
    messages: Vec<String>,
    index: usize,
}

impl Default for AdminMessages {
    fn default() -> Self {
        Self::new(FALLBACK.iter().map(ToString::to_string).collect())
    }
}

impl AdminMessages {
    /// Creates a carousel over `messages`, starting at the first one
    pub fn new(messages: Vec<String>) -> Self {
        Self { messages, index: 0 }
    }

    /// Creates a carousel from a backend answer, using the built-in
    /// messages when the backend did not provide a list
    pub fn from_response(messages: Option<Vec<String>>) -> Self {
        messages.map_or_else(Self::default, Self::new)
    }

    /// Returns all messages
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Returns the index of the message on screen
    pub fn index(&self) -> usize {
        self.index
    }

    /// Moves one step in `direction`, wrapping at both ends
    pub fn navigate(&mut self, direction: Direction) {
        let len = self.messages.len();
        if len == 0 {
            return;
        }
        self.index = match direction {
            Direction::Previous => (self.index + len - 1) % len,
            Direction::Next => (self.index + 1) % len,
        };
    }

    /// Returns the message on screen with its position
    pub fn view(&self) -> MessageView {
        match self.messages.get(self.index) {
            Some(text) => MessageView {
                text: text.clone(),
                counter: format!("{} / {}", self.index + 1, self.messages.len()),
            },
            None => MessageView {
                text: EMPTY.to_owned(),
                counter: "0 / 0".to_owned(),
            },
        }
    }
}
