//! Tunable client options
//!
//! The fixed rules live in [`crate::constants`]; this module exposes the
//! values a deployment may adjust, validated with `garde` so that a bad
//! configuration is rejected before any game starts.

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::Duration;

use crate::{
    anticheat::CheatPolicy,
    constants::{backend, history, quiz},
    media::Clip,
};

type ValidationResult = garde::Result;

/// Errors raised while loading options
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The options document is not valid JSON for [`Options`]
    #[error("cannot parse options: {0}")]
    Parse(#[from] serde_json::Error),
    /// The options parsed but violate a bound
    #[error("invalid options: {0}")]
    Invalid(#[from] garde::Report),
}

fn validate_millis<const MIN_MILLIS: u64, const MAX_MILLIS: u64>(
    field: &'static str,
    val: &Duration,
) -> ValidationResult {
    let millis = u64::try_from(val.as_millis()).unwrap_or(u64::MAX);
    if (MIN_MILLIS..=MAX_MILLIS).contains(&millis) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "{field} is outside of the bounds [{MIN_MILLIS}ms,{MAX_MILLIS}ms]",
        )))
    }
}

fn validate_question_time(val: &Duration) -> ValidationResult {
    validate_millis::<{ quiz::MIN_QUESTION_TIME * 1000 }, { quiz::MAX_QUESTION_TIME * 1000 }>(
        "question_time",
        val,
    )
}

fn validate_tick(val: &Duration) -> ValidationResult {
    validate_millis::<{ quiz::MIN_TICK_MS }, { quiz::MAX_TICK_MS }>("tick", val)
}

fn validate_feedback_delay(val: &Duration) -> ValidationResult {
    validate_millis::<0, { quiz::MAX_FEEDBACK_DELAY * 1000 }>("feedback_delay", val)
}

fn validate_endpoint(val: &str) -> ValidationResult {
    if val.starts_with("http://") || val.starts_with("https://") {
        Ok(())
    } else {
        Err(garde::Error::new("endpoint must be an http(s) URL"))
    }
}

/// Client options
///
/// Every field has a default equal to the game rules, so an empty JSON
/// object is a valid configuration.
#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Options {
    /// URL of the spreadsheet-backed service
    #[garde(length(min = 1, max = backend::MAX_ENDPOINT_LENGTH), custom(|v, _| validate_endpoint(v)))]
    pub endpoint: String,
    /// Time allowed to answer one question
    #[garde(custom(|v, _| validate_question_time(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub question_time: Duration,
    /// Interval between countdown ticks
    #[garde(custom(|v, _| validate_tick(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub tick: Duration,
    /// Pause after a question resolves, used for feedback and interstitials
    #[garde(custom(|v, _| validate_feedback_delay(v)))]
    #[serde_as(as = "serde_with::DurationMilliSeconds<u64>")]
    pub feedback_delay: Duration,
    /// Points for each correct answer
    #[garde(range(min = 1))]
    pub points_per_question: u64,
    /// Bonus for a perfect game
    #[garde(skip)]
    pub perfect_bonus: u64,
    /// How many served question ids are remembered between games
    #[garde(range(min = quiz::QUESTIONS_PER_GAME, max = history::MAX_RECENT_LIMIT))]
    pub history_limit: usize,
    /// What happens to a game when the player leaves the tab
    #[garde(skip)]
    pub cheat_policy: CheatPolicy,
    /// Clip played after a correct answer
    #[garde(dive)]
    pub correct_clip: Option<Clip>,
    /// Clip played after a wrong answer or a timeout
    #[garde(dive)]
    pub wrong_clip: Option<Clip>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            endpoint: backend::DEFAULT_ENDPOINT.to_owned(),
            question_time: Duration::from_millis(quiz::QUESTION_TIME_MS),
            tick: Duration::from_millis(quiz::TICK_MS),
            feedback_delay: Duration::from_millis(quiz::FEEDBACK_DELAY_MS),
            points_per_question: quiz::POINTS_PER_QUESTION,
            perfect_bonus: quiz::PERFECT_BONUS,
            history_limit: history::MAX_RECENT,
            cheat_policy: CheatPolicy::default(),
            correct_clip: None,
            wrong_clip: None,
        }
    }
}

impl Options {
    /// Parses options from JSON and validates them
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value is out of bounds.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }
}
