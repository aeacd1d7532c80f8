//! # Trivial
//!
//! This library provides the core of a team trivia client: player login,
//! ten-question timed games drawn from a remote question pool, scoring with
//! a perfect-game bonus, anti-cheat on focus loss, and the ranking views
//! shown between games.
//!
//! The library renders nothing and never blocks on time. Display surfaces
//! receive [`UpdateMessage`]s through a [`session::Tunnel`], and timed
//! events come back as [`AlarmMessage`]s through a [`schedule::Scheduler`].

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
use serde::{Deserialize, Serialize};

pub mod constants;

pub mod anticheat;
pub mod app;
pub mod backend;
pub mod config;
pub mod game;
pub mod history;
pub mod identity;
pub mod leaderboard;
pub mod media;
pub mod messages;
pub mod question;
pub mod schedule;
pub mod session;
pub mod storage;
pub mod teams;
pub mod version;

#[cfg(test)]
mod testing;

/// Messages sent to the display surface
///
/// Each module that drives a part of the screen contributes its own message
/// type; this enum tags them so a surface can route them.
#[derive(Debug, Serialize, Clone, PartialEq, derive_more::From)]
pub enum UpdateMessage {
    /// Quiz progress
    Game(game::UpdateMessage),
    /// Interstitial clips
    Media(media::UpdateMessage),
    /// Screens around the quiz
    App(app::UpdateMessage),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// Alarm messages for timed events
///
/// These are handed to a [`schedule::Scheduler`] and delivered back to the
/// engine when they come due.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::From, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Quiz countdown and pacing alarms
    Game(game::AlarmMessage),
}
