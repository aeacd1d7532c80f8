//! Client facade
//!
//! [`App`] owns the collaborators and the per-session state and exposes one
//! method per user action or external event. It is what a display surface
//! embeds: login, the home screen (announcements, rankings, team totals),
//! and the quiz itself.

use serde::Serialize;

use crate::{
    anticheat::FocusEvent,
    backend::{Backend, ClientError},
    config::{ConfigError, Options},
    game::{Quiz, StartError},
    leaderboard::{RankedEntry, Standings},
    messages::{AdminMessages, Direction, MessageView},
    question::Label,
    schedule::Scheduler,
    session::{self, LoginError, LoginForm, Tunnel, User},
    storage::Storage,
    teams::Team,
    version::{self, VersionCheck},
};

/// Messages about the screens around the quiz
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UpdateMessage {
    /// A short notice for the player, such as a connection error
    Notice(String),
    /// A player logged in
    LoggedIn {
        /// Masked phone of the player
        phone: String,
        /// Chosen team
        team: Team,
    },
    /// The announcement on screen changed
    Message(MessageView),
    /// The dashboard ranking changed
    Dashboard(Vec<RankedEntry>),
    /// The full ranking was requested
    FullRanking(Vec<RankedEntry>),
    /// Team totals, highest first
    Teams(Vec<(Team, u64)>),
    /// The home screen is shown
    Home,
    /// A different version ran before; the surface should reload
    Reload {
        /// The version that ran before
        previous: String,
        /// The version now running
        current: String,
    },
}

/// Formats a backend failure for the player
pub fn connection_notice(error: &ClientError) -> String {
    format!("Error de conexión: {error}")
}

/// The trivia client
#[derive(Debug)]
pub struct App<B: Backend, S: Storage> {
    backend: B,
    storage: S,
    version: String,
    user: Option<User>,
    quiz: Quiz,
    messages: AdminMessages,
    standings: Standings,
}

impl<B: Backend, S: Storage> App<B, S> {
    /// Creates a client for `version` of the application
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `options` do not validate.
    pub fn new(
        backend: B,
        storage: S,
        options: Options,
        version: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            backend,
            storage,
            version: version.into(),
            user: None,
            quiz: Quiz::new(options)?,
            messages: AdminMessages::default(),
            standings: Standings::default(),
        })
    }

    /// Returns the logged-in player
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Returns the quiz engine
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    /// Returns the announcement carousel
    pub fn messages(&self) -> &AdminMessages {
        &self.messages
    }

    /// Returns the current standings
    pub fn standings(&self) -> &Standings {
        &self.standings
    }

    /// Returns the local storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns the backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Compares the running version with the one that ran before
    pub fn check_version<T: Tunnel>(&mut self, tunnel: &T) -> VersionCheck {
        let outcome = version::check(&mut self.storage, &self.version);
        if let VersionCheck::Updated { previous } = &outcome {
            tunnel.send_message(
                &UpdateMessage::Reload {
                    previous: previous.clone(),
                    current: self.version.clone(),
                }
                .into(),
            );
        }
        outcome
    }

    /// Returns a login form prefilled with the last phone used here
    pub fn login_form(&self) -> LoginForm {
        LoginForm::prefilled(&self.storage)
    }

    /// Logs in with the form's phone and team, then loads the home screen
    ///
    /// # Errors
    ///
    /// Returns a [`LoginError`] when the form is incomplete; nothing
    /// changes in that case.
    pub fn login<T: Tunnel>(&mut self, form: &LoginForm, tunnel: &T) -> Result<(), LoginError> {
        let user = form.submit()?;
        session::remember_phone(&mut self.storage, user.phone());
        log::info!("{} joined {}", user.phone().masked(), user.team());

        tunnel.send_message(
            &UpdateMessage::LoggedIn {
                phone: user.phone().masked(),
                team: user.team(),
            }
            .into(),
        );
        self.user = Some(user);
        self.refresh_home(tunnel);
        Ok(())
    }

    /// Reloads announcements and rankings and shows the home screen
    pub fn refresh_home<T: Tunnel>(&mut self, tunnel: &T) {
        tunnel.send_message(&UpdateMessage::Home.into());
        self.load_messages(tunnel);
        self.load_rankings(tunnel);
    }

    /// Fetches the announcements, falling back to the built-in ones
    pub fn load_messages<T: Tunnel>(&mut self, tunnel: &T) {
        let response = match self.backend.fetch_messages() {
            Ok(messages) => messages,
            Err(e) => {
                log::error!("cannot load messages: {e}");
                None
            }
        };
        self.messages = AdminMessages::from_response(response);
        tunnel.send_message(&UpdateMessage::Message(self.messages.view()).into());
    }

    /// Moves the announcement carousel
    pub fn navigate_message<T: Tunnel>(&mut self, direction: Direction, tunnel: &T) {
        self.messages.navigate(direction);
        tunnel.send_message(&UpdateMessage::Message(self.messages.view()).into());
    }

    /// Fetches the rankings and shows the dashboard and team totals
    ///
    /// On failure the previous standings stay on screen and a connection
    /// notice is shown. Missing in-person scores only shrink the merge.
    pub fn load_rankings<T: Tunnel>(&mut self, tunnel: &T) {
        let feed = match self.backend.fetch_rankings(None) {
            Ok(feed) => feed,
            Err(e) => {
                log::error!("cannot load rankings: {e}");
                tunnel.send_message(&UpdateMessage::Notice(connection_notice(&e)).into());
                return;
            }
        };
        let presence = self.backend.fetch_presence_scores().unwrap_or_else(|e| {
            log::warn!("cannot load in-person scores: {e}");
            Vec::new()
        });

        self.standings = Standings::new(feed, presence);
        let phone = self.user.as_ref().map(User::phone);
        tunnel.send_message(&UpdateMessage::Dashboard(self.standings.dashboard(phone)).into());
        tunnel.send_message(&UpdateMessage::Teams(self.standings.teams()).into());
    }

    /// Shows the complete ranking
    pub fn show_full_ranking<T: Tunnel>(&self, tunnel: &T) {
        let phone = self.user.as_ref().map(User::phone);
        tunnel.send_message(&UpdateMessage::FullRanking(self.standings.full(phone)).into());
    }

    /// Starts a game for the logged-in player
    ///
    /// # Errors
    ///
    /// Returns a [`StartError`] when nobody is logged in or no questions
    /// could be loaded; the latter is also shown as a connection notice.
    pub fn start_game<Sch, T>(&mut self, scheduler: &mut Sch, tunnel: &T) -> Result<(), StartError>
    where
        Sch: Scheduler + ?Sized,
        T: Tunnel,
    {
        let result = self.quiz.start(
            self.user.as_ref(),
            &self.backend,
            &mut self.storage,
            scheduler,
            tunnel,
        );
        if let Err(StartError::Client(e)) = &result {
            tunnel.send_message(&UpdateMessage::Notice(connection_notice(e)).into());
        }
        result
    }

    /// Handles the player picking an option
    pub fn answer<Sch: Scheduler + ?Sized, T: Tunnel>(
        &mut self,
        label: Label,
        scheduler: &mut Sch,
        tunnel: &T,
    ) -> bool {
        self.quiz.receive_answer(label, scheduler, tunnel)
    }

    /// Handles an alarm that came due
    pub fn receive_alarm<Sch: Scheduler + ?Sized, T: Tunnel>(
        &mut self,
        message: crate::AlarmMessage,
        scheduler: &mut Sch,
        tunnel: &T,
    ) {
        self.quiz
            .receive_alarm(message, &self.backend, scheduler, tunnel);
    }

    /// Handles the quiz losing the foreground
    pub fn focus_lost<Sch: Scheduler + ?Sized, T: Tunnel>(
        &mut self,
        event: FocusEvent,
        scheduler: &mut Sch,
        tunnel: &T,
    ) -> bool {
        self.quiz.focus_lost(event, scheduler, tunnel)
    }

    /// Handles the player skipping the clip on screen
    pub fn skip_video<T: Tunnel>(&mut self, tunnel: &T) -> bool {
        self.quiz.skip_clip(tunnel)
    }

    /// Handles the clip on screen reaching its end
    pub fn video_ended<T: Tunnel>(&mut self, tunnel: &T) -> bool {
        self.quiz.clip_ended(tunnel)
    }

    /// Leaves the quiz and goes back to the refreshed home screen
    pub fn back_home<Sch: Scheduler + ?Sized, T: Tunnel>(&mut self, scheduler: &mut Sch, tunnel: &T) {
        self.quiz.reset(scheduler, tunnel);
        self.refresh_home(tunnel);
    }
}
