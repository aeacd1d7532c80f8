//! Focus-loss detection
//!
//! Leaving the quiz (hiding the tab or blurring the window) while a game is
//! running ends that game. The engine applies the penalty; this module
//! names the events and policies and decides when an event counts.

use serde::{Deserialize, Serialize};

/// Ways the quiz can lose the foreground
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusEvent {
    /// The tab was hidden
    Hidden,
    /// The window lost focus
    Blur,
}

/// Penalty applied when the player leaves a running game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheatPolicy {
    /// The score is forfeited and the game ends on an expulsion screen
    #[default]
    Expel,
    /// The game is dropped and the client returns to idle
    Discard,
}

/// Returns whether losing focus now ends the game
///
/// Only a running game that has not already ended is affected, which also
/// makes repeated events for the same game harmless.
pub fn is_violation(is_active: bool, is_over: bool) -> bool {
    is_active && !is_over
}
