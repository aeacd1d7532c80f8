//! Player session
//!
//! This module holds who is playing: the phone and team captured at login,
//! the remembered phone used to prefill the next login, and the trait
//! through which the client talks to whatever displays it.

use serde::Serialize;
use thiserror::Error;

use super::UpdateMessage;
use crate::{
    constants::identity::STORAGE_KEY,
    identity::{self, Phone, PhoneError},
    storage::Storage,
    teams::Team,
};

/// Trait for sending messages to the display surface
///
/// Implementations might render to a DOM, a terminal, or record messages
/// for tests.
pub trait Tunnel {
    /// Sends an update message to the display surface
    ///
    /// # Arguments
    ///
    /// * `message` - The update message to send
    fn send_message(&self, message: &UpdateMessage);
}

/// Reasons a login cannot go through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoginError {
    /// The phone field does not hold a valid phone
    #[error("invalid phone: {0}")]
    InvalidPhone(#[from] PhoneError),
    /// No team was chosen
    #[error("a team must be chosen")]
    MissingTeam,
}

/// A logged-in player
///
/// The team is fixed for the whole session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    phone: Phone,
    team: Team,
}

impl User {
    /// Creates a player from an already validated phone
    pub fn new(phone: Phone, team: Team) -> Self {
        Self { phone, team }
    }

    /// Returns the player's phone
    pub fn phone(&self) -> &Phone {
        &self.phone
    }

    /// Returns the player's team
    pub fn team(&self) -> Team {
        self.team
    }
}

/// The login screen's input state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    phone: String,
    team: Option<Team>,
}

impl LoginForm {
    /// Creates a form prefilled with the phone remembered in `storage`
    pub fn prefilled<S: Storage + ?Sized>(storage: &S) -> Self {
        Self {
            phone: remembered_phone(storage)
                .map(|phone| phone.to_string())
                .unwrap_or_default(),
            team: None,
        }
    }

    /// Updates the phone field from raw input, keeping only digits
    pub fn input_phone(&mut self, raw: &str) {
        self.phone = identity::sanitize_input(raw);
    }

    /// Returns the phone field as shown
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Selects a team, replacing any previous choice
    pub fn choose_team(&mut self, team: Team) {
        self.team = Some(team);
    }

    /// Returns the selected team
    pub fn team(&self) -> Option<Team> {
        self.team
    }

    /// Returns whether the login button should be enabled
    pub fn is_ready(&self) -> bool {
        self.team.is_some() && self.phone.parse::<Phone>().is_ok()
    }

    /// Turns the form into a logged-in player
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::InvalidPhone`] when the phone is not nine
    /// digits and [`LoginError::MissingTeam`] when no team is chosen.
    pub fn submit(&self) -> Result<User, LoginError> {
        let phone: Phone = self.phone.parse()?;
        let team = self.team.ok_or(LoginError::MissingTeam)?;
        Ok(User::new(phone, team))
    }
}

/// Returns the phone entered at the last login on this device
pub fn remembered_phone<S: Storage + ?Sized>(storage: &S) -> Option<Phone> {
    storage.get(STORAGE_KEY)?.parse().ok()
}

/// Remembers `phone` for the next login on this device
pub fn remember_phone<S: Storage + ?Sized>(storage: &mut S, phone: &Phone) {
    storage.set(STORAGE_KEY, phone.to_string());
}
