//! Quiz engine
//!
//! This module runs one game at a time: it loads a question pool, picks the
//! questions for the game, presents them one by one under a countdown,
//! scores the answers, and submits the result when the game ends.
//!
//! The engine is driven entirely from the outside. Player input arrives
//! through [`Quiz::receive_answer`] and [`Quiz::focus_lost`], and time passes
//! through alarms the engine scheduled itself and gets back through
//! [`Quiz::receive_alarm`]. Each alarm carries the token of the game and the
//! question it was scheduled for, so alarms left over from an earlier game
//! or question are recognised and ignored even if cancelling them failed.

use garde::Validate;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;
use web_time::Duration;

use crate::{
    anticheat::{self, CheatPolicy, FocusEvent},
    backend::{Backend, ClientError, ScoreSubmission},
    config::{ConfigError, Options},
    constants::quiz::QUESTIONS_PER_GAME,
    history::RecentlyServed,
    media::Interstitial,
    question::{Label, Question},
    schedule::{Scheduler, TaskId},
    session::{Tunnel, User},
    storage::Storage,
};

/// Identifies one game so its alarms cannot leak into the next
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameToken(u64);

/// Where a game currently stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// No game is running
    #[default]
    Idle,
    /// The question pool is being fetched
    Loading,
    /// A question is on screen and the answer gate is open
    AwaitingAnswer(usize),
    /// A question was answered or timed out; the next one follows after a delay
    Resolved(usize),
    /// All questions were played and the score was submitted
    Finished,
    /// The player left the game and was expelled
    Expelled,
}

/// Alarms scheduled by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// One countdown step for a question
    Tick {
        /// Game the alarm belongs to
        game: GameToken,
        /// Question the countdown runs for
        index: usize,
    },
    /// End of the pause after a question resolved
    Advance {
        /// Game the alarm belongs to
        game: GameToken,
        /// Question that was resolved
        index: usize,
    },
}

/// Messages sent to the display surface while a game runs
#[serde_with::serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum UpdateMessage {
    /// The question pool is being fetched
    Loading,
    /// The question pool could not be loaded
    LoadFailed(String),
    /// A new question is on screen
    Question {
        /// Index of the question (0-based)
        index: usize,
        /// Number of questions in the game
        count: usize,
        /// The question text
        prompt: String,
        /// Options in presentation order
        options: Vec<(Label, String)>,
        /// Time allowed to answer
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        duration: Duration,
        /// Score so far
        score: u64,
    },
    /// The countdown moved
    Countdown {
        /// Time left
        #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
        remaining: Duration,
        /// Time left as a fraction of the full time
        fraction: f64,
    },
    /// A question was resolved
    Feedback {
        /// Option the player picked, absent on timeout
        selected: Option<Label>,
        /// The correct option
        correct: Label,
        /// Whether the player was right
        is_correct: bool,
        /// Score after this question
        score: u64,
    },
    /// The game ended normally
    Finished {
        /// Final score including any bonus
        score: u64,
        /// Number of correct answers
        correct_count: usize,
        /// Number of questions played
        total: usize,
        /// Whether the perfect-game bonus was awarded
        perfect_bonus: bool,
    },
    /// The player left the game
    Expelled {
        /// What gave the player away
        event: FocusEvent,
        /// Penalty that was applied
        policy: CheatPolicy,
    },
}

/// Errors that prevent a game from starting
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartError {
    /// Nobody is logged in
    #[error("no player is logged in")]
    NotLoggedIn,
    /// The question pool could not be loaded
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Per-question countdown, decremented in fixed steps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    total: Duration,
    step: Duration,
    remaining: Duration,
}

impl Countdown {
    /// Creates a full countdown of `total` that moves by `step` per tick
    pub fn new(total: Duration, step: Duration) -> Self {
        Self {
            total,
            step,
            remaining: total,
        }
    }

    /// Refills the countdown
    pub fn reset(&mut self) {
        self.remaining = self.total;
    }

    /// Moves the countdown one step and returns whether it ran out
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(self.step);
        self.remaining.is_zero()
    }

    /// Returns the time left
    pub fn remaining(&self) -> Duration {
        self.remaining
    }

    /// Returns the time left as a fraction of the full time
    pub fn fraction(&self) -> f64 {
        if self.total.is_zero() {
            0.
        } else {
            self.remaining.as_secs_f64() / self.total.as_secs_f64()
        }
    }
}

/// How one question went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuestionResult {
    /// Option the player picked, `None` on timeout
    pub selected: Option<Label>,
    /// Whether the player was right
    pub is_correct: bool,
}

/// State of the game in progress
#[derive(Debug, Clone)]
pub struct GameSession {
    token: GameToken,
    player: Option<User>,
    questions: Vec<Question>,
    index: usize,
    score: u64,
    correct_count: usize,
    results: Vec<QuestionResult>,
    countdown: Countdown,
    can_answer: bool,
    is_active: bool,
    is_over: bool,
    bonus_awarded: bool,
    phase: Phase,
}

impl GameSession {
    fn new(token: GameToken, options: &Options) -> Self {
        Self {
            token,
            player: None,
            questions: Vec::new(),
            index: 0,
            score: 0,
            correct_count: 0,
            results: Vec::new(),
            countdown: Countdown::new(options.question_time, options.tick),
            can_answer: false,
            is_active: false,
            is_over: false,
            bonus_awarded: false,
            phase: Phase::Idle,
        }
    }

    /// Returns the token of this game
    pub fn token(&self) -> GameToken {
        self.token
    }

    /// Returns the player of this game
    pub fn player(&self) -> Option<&User> {
        self.player.as_ref()
    }

    /// Returns the questions of this game
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Returns the index of the current question
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the score so far
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Returns the number of correct answers so far
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    /// Returns the results of the questions resolved so far
    pub fn results(&self) -> &[QuestionResult] {
        &self.results
    }

    /// Returns the countdown of the current question
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// Returns whether an answer would be accepted now
    pub fn can_answer(&self) -> bool {
        self.can_answer
    }

    /// Returns whether the quiz is on screen and running
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns whether the game has ended
    pub fn is_over(&self) -> bool {
        self.is_over
    }

    /// Returns the current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }
}

/// The quiz engine
#[derive(Debug)]
pub struct Quiz {
    options: Options,
    session: GameSession,
    countdown_task: Option<TaskId>,
    advance_task: Option<TaskId>,
    last_token: u64,
    interstitial: Interstitial,
}

impl Quiz {
    /// Creates an idle engine
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `options` are out of bounds,
    /// for instance a zero tick that would never let a countdown expire.
    pub fn new(options: Options) -> Result<Self, ConfigError> {
        options.validate()?;
        let session = GameSession::new(GameToken::default(), &options);
        Ok(Self {
            options,
            session,
            countdown_task: None,
            advance_task: None,
            last_token: 0,
            interstitial: Interstitial::default(),
        })
    }

    /// Returns the game in progress (or the last one played)
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Returns the interstitial player
    pub fn interstitial(&self) -> &Interstitial {
        &self.interstitial
    }

    /// Starts a new game for `user`
    ///
    /// Any game in progress is abandoned and its alarms cancelled. The
    /// question pool is fetched, filtered against the recently served
    /// history, and the history is updated before the first question is
    /// presented.
    ///
    /// # Errors
    ///
    /// Returns [`StartError::NotLoggedIn`] without a player and
    /// [`StartError::Client`] when no question could be loaded; the engine
    /// is idle again in both cases.
    pub fn start<B, S, Sch, T>(
        &mut self,
        user: Option<&User>,
        backend: &B,
        storage: &mut S,
        scheduler: &mut Sch,
        tunnel: &T,
    ) -> Result<(), StartError>
    where
        B: Backend + ?Sized,
        S: Storage + ?Sized,
        Sch: Scheduler + ?Sized,
        T: Tunnel,
    {
        let user = user.ok_or(StartError::NotLoggedIn)?;

        self.cancel_alarms(scheduler);
        self.interstitial.stop(tunnel);
        self.last_token += 1;
        self.session = GameSession::new(GameToken(self.last_token), &self.options);
        self.session.phase = Phase::Loading;
        tunnel.send_message(&UpdateMessage::Loading.into());

        let pool = match backend.fetch_questions() {
            Ok(pool) => pool,
            Err(e) => {
                log::error!("cannot load questions: {e}");
                self.session.phase = Phase::Idle;
                tunnel.send_message(&UpdateMessage::LoadFailed(e.to_string()).into());
                return Err(e.into());
            }
        };

        let mut history = RecentlyServed::load(storage, self.options.history_limit);
        let questions = history.select(pool, QUESTIONS_PER_GAME);
        history.record(&questions);
        history.save(storage);

        log::info!("starting game for {}", user.phone().masked());
        self.session.player = Some(user.clone());
        self.session.questions = questions;
        self.session.is_active = true;
        self.present(backend, scheduler, tunnel);

        Ok(())
    }

    /// Handles the player picking an option
    ///
    /// Returns whether the answer was accepted. Answers outside an open gate
    /// are ignored without any change.
    pub fn receive_answer<Sch: Scheduler + ?Sized, T: Tunnel>(
        &mut self,
        selected: Label,
        scheduler: &mut Sch,
        tunnel: &T,
    ) -> bool {
        let Phase::AwaitingAnswer(index) = self.session.phase else {
            log::debug!("ignoring answer {selected} outside a question");
            return false;
        };
        if !self.session.can_answer {
            log::debug!("ignoring answer {selected} after the gate closed");
            return false;
        }

        self.session.can_answer = false;
        self.stop_countdown(scheduler);
        self.resolve(index, Some(selected), scheduler, tunnel);
        true
    }

    /// Handles an alarm this engine scheduled earlier
    ///
    /// Alarms for another game or for a question that is no longer in the
    /// expected phase are ignored.
    pub fn receive_alarm<B, Sch, T>(
        &mut self,
        message: crate::AlarmMessage,
        backend: &B,
        scheduler: &mut Sch,
        tunnel: &T,
    ) where
        B: Backend + ?Sized,
        Sch: Scheduler + ?Sized,
        T: Tunnel,
    {
        match message {
            crate::AlarmMessage::Game(AlarmMessage::Tick { game, index }) => {
                if game != self.session.token
                    || self.session.phase != Phase::AwaitingAnswer(index)
                    || !self.session.can_answer
                {
                    log::debug!("ignoring stale countdown tick for question {index}");
                    return;
                }
                self.countdown_task = None;

                if self.session.countdown.tick() {
                    self.session.can_answer = false;
                    self.resolve(index, None, scheduler, tunnel);
                } else {
                    tunnel.send_message(
                        &UpdateMessage::Countdown {
                            remaining: self.session.countdown.remaining(),
                            fraction: self.session.countdown.fraction(),
                        }
                        .into(),
                    );
                    self.schedule_tick(index, scheduler);
                }
            }
            crate::AlarmMessage::Game(AlarmMessage::Advance { game, index }) => {
                if game != self.session.token || self.session.phase != Phase::Resolved(index) {
                    log::debug!("ignoring stale advance after question {index}");
                    return;
                }
                self.advance_task = None;
                self.interstitial.stop(tunnel);
                self.session.index = index + 1;
                self.present(backend, scheduler, tunnel);
            }
        }
    }

    /// Handles the quiz losing the foreground
    ///
    /// A running game is ended on the spot with the configured penalty:
    /// alarms are cancelled, the answer gate closes, and any clip stops.
    /// Returns whether the event ended a game.
    pub fn focus_lost<Sch: Scheduler + ?Sized, T: Tunnel>(
        &mut self,
        event: FocusEvent,
        scheduler: &mut Sch,
        tunnel: &T,
    ) -> bool {
        if !anticheat::is_violation(self.session.is_active, self.session.is_over) {
            return false;
        }

        self.cancel_alarms(scheduler);
        self.session.can_answer = false;
        self.session.is_over = true;
        self.session.is_active = false;
        self.interstitial.stop(tunnel);

        let policy = self.options.cheat_policy;
        log::warn!(
            "focus lost ({event:?}) during question {}, applying {policy:?}",
            self.session.index
        );
        match policy {
            CheatPolicy::Expel => {
                self.session.score = 0;
                self.session.correct_count = 0;
                self.session.phase = Phase::Expelled;
            }
            CheatPolicy::Discard => {
                self.session = GameSession::new(self.session.token, &self.options);
            }
        }

        tunnel.send_message(&UpdateMessage::Expelled { event, policy }.into());
        true
    }

    /// Abandons the current game and returns to idle
    pub fn reset<Sch: Scheduler + ?Sized, T: Tunnel>(&mut self, scheduler: &mut Sch, tunnel: &T) {
        self.cancel_alarms(scheduler);
        self.interstitial.stop(tunnel);
        self.session = GameSession::new(self.session.token, &self.options);
    }

    /// Handles the player skipping the clip on screen
    pub fn skip_clip<T: Tunnel>(&mut self, tunnel: &T) -> bool {
        self.interstitial.skip(tunnel)
    }

    /// Handles the clip on screen reaching its end
    pub fn clip_ended<T: Tunnel>(&mut self, tunnel: &T) -> bool {
        self.interstitial.ended(tunnel)
    }

    fn present<B, Sch, T>(&mut self, backend: &B, scheduler: &mut Sch, tunnel: &T)
    where
        B: Backend + ?Sized,
        Sch: Scheduler + ?Sized,
        T: Tunnel,
    {
        let index = self.session.index;
        let Some(question) = self.session.questions.get(index) else {
            self.finish(backend, tunnel);
            return;
        };

        tunnel.send_message(
            &UpdateMessage::Question {
                index,
                count: self.session.questions.len(),
                prompt: question.prompt.clone(),
                options: question.labeled_options(),
                duration: self.options.question_time,
                score: self.session.score,
            }
            .into(),
        );

        self.session.countdown.reset();
        self.session.can_answer = true;
        self.session.phase = Phase::AwaitingAnswer(index);
        self.schedule_tick(index, scheduler);
    }

    fn resolve<Sch: Scheduler + ?Sized, T: Tunnel>(
        &mut self,
        index: usize,
        selected: Option<Label>,
        scheduler: &mut Sch,
        tunnel: &T,
    ) {
        let Some(question) = self.session.questions.get(index) else {
            return;
        };
        let correct = question.correct;
        let is_correct = selected.is_some_and(|label| question.is_correct(label));

        if is_correct {
            self.session.score += self.options.points_per_question;
            self.session.correct_count += 1;
        }
        self.session.results.push(QuestionResult {
            selected,
            is_correct,
        });
        self.session.phase = Phase::Resolved(index);

        tunnel.send_message(
            &UpdateMessage::Feedback {
                selected,
                correct,
                is_correct,
                score: self.session.score,
            }
            .into(),
        );

        let clip = if is_correct {
            self.options.correct_clip.as_ref()
        } else {
            self.options.wrong_clip.as_ref()
        };
        if let Some(clip) = clip {
            self.interstitial.play(clip, tunnel);
        }

        self.advance_task = Some(scheduler.schedule(
            AlarmMessage::Advance {
                game: self.session.token,
                index,
            }
            .into(),
            self.options.feedback_delay,
        ));
    }

    fn finish<B: Backend + ?Sized, T: Tunnel>(&mut self, backend: &B, tunnel: &T) {
        self.session.phase = Phase::Finished;
        self.session.can_answer = false;
        self.session.is_over = true;
        self.session.is_active = false;

        let perfect = self.session.correct_count == QUESTIONS_PER_GAME;
        if perfect && !self.session.bonus_awarded {
            self.session.score += self.options.perfect_bonus;
            self.session.bonus_awarded = true;
        }

        tunnel.send_message(
            &UpdateMessage::Finished {
                score: self.session.score,
                correct_count: self.session.correct_count,
                total: self.session.questions.len(),
                perfect_bonus: self.session.bonus_awarded,
            }
            .into(),
        );
        log::info!(
            "game finished with {} points ({} correct)",
            self.session.score,
            self.session.correct_count
        );

        if let Some(player) = &self.session.player {
            let submission = ScoreSubmission {
                phone: player.phone().clone(),
                team: player.team(),
                score: self.session.score,
                correct: self.session.correct_count,
                total: QUESTIONS_PER_GAME,
            };
            if let Err(e) = backend.submit_score(&submission) {
                log::error!("failed to upload score: {e}");
            }
        }
    }

    fn schedule_tick<Sch: Scheduler + ?Sized>(&mut self, index: usize, scheduler: &mut Sch) {
        self.stop_countdown(scheduler);
        self.countdown_task = Some(scheduler.schedule(
            AlarmMessage::Tick {
                game: self.session.token,
                index,
            }
            .into(),
            self.options.tick,
        ));
    }

    fn stop_countdown<Sch: Scheduler + ?Sized>(&mut self, scheduler: &mut Sch) {
        if let Some(task) = self.countdown_task.take() {
            scheduler.cancel(task);
        }
    }

    fn cancel_alarms<Sch: Scheduler + ?Sized>(&mut self, scheduler: &mut Sch) {
        self.stop_countdown(scheduler);
        if let Some(task) = self.advance_task.take() {
            scheduler.cancel(task);
        }
    }
}
