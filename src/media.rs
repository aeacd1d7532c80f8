//! Full-screen video interstitials
//!
//! Short clips can be shown between questions. The engine only tracks
//! whether a clip is on screen and tells the display surface to start or
//! stop it; playback itself belongs to the surface.

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::session::Tunnel;

fn default_allow_skip() -> bool {
    true
}

/// A video clip that can be shown full screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Clip {
    /// Path of the video, relative to the assets
    #[garde(length(min = 1, max = crate::constants::media::MAX_SOURCE_LENGTH))]
    pub src: String,
    /// Whether the player may skip the clip
    #[garde(skip)]
    #[serde(default = "default_allow_skip")]
    pub allow_skip: bool,
}

/// Messages telling the display surface to start or stop a clip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum UpdateMessage {
    /// Shows the clip full screen
    Play {
        /// Path of the video
        src: String,
        /// Whether a skip control is shown
        allow_skip: bool,
    },
    /// Hides the overlay and rewinds the video
    Stop,
}

/// Tracks the clip currently on screen
#[derive(Debug, Default, Clone)]
pub struct Interstitial {
    playing: Option<Clip>,
}

impl Interstitial {
    /// Starts `clip`, replacing anything already playing
    pub fn play<T: Tunnel>(&mut self, clip: &Clip, tunnel: &T) {
        self.playing = Some(clip.clone());
        tunnel.send_message(
            &UpdateMessage::Play {
                src: clip.src.clone(),
                allow_skip: clip.allow_skip,
            }
            .into(),
        );
    }

    /// Returns the clip on screen, if any
    pub fn current(&self) -> Option<&Clip> {
        self.playing.as_ref()
    }

    /// Returns whether a clip is on screen
    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }

    /// Handles the player pressing skip
    ///
    /// Returns whether the clip was stopped; unskippable clips keep playing.
    pub fn skip<T: Tunnel>(&mut self, tunnel: &T) -> bool {
        if self.playing.as_ref().is_some_and(|clip| clip.allow_skip) {
            self.stop(tunnel)
        } else {
            false
        }
    }

    /// Handles the clip reaching its end
    pub fn ended<T: Tunnel>(&mut self, tunnel: &T) -> bool {
        self.stop(tunnel)
    }

    /// Stops whatever is playing
    ///
    /// Returns `false` when nothing was on screen, in which case no message
    /// is sent.
    pub fn stop<T: Tunnel>(&mut self, tunnel: &T) -> bool {
        if self.playing.take().is_some() {
            tunnel.send_message(&UpdateMessage::Stop.into());
            true
        } else {
            false
        }
    }
}
