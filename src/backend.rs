//! Backend client
//!
//! All data lives behind a single spreadsheet-backed web endpoint. Requests
//! are plain GETs where the `action` query parameter selects the operation.
//! Any failure, whether from the transport, the body, or the backend's own
//! error envelope, comes back as a [`ClientError`] so callers can degrade
//! gracefully instead of aborting.

use itertools::Itertools;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use thiserror::Error;

use crate::{
    identity::Phone,
    leaderboard::{RankingEntry, RankingFeed},
    question::{Question, QuestionRecord},
    teams::Team,
};

/// Failures of a backend request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request did not complete or returned a non-success status
    #[error("transport error: {0}")]
    Transport(String),
    /// The body was not the JSON shape the action expects
    #[error("unexpected response: {0}")]
    Protocol(String),
    /// The action succeeded but returned nothing usable
    #[error("no {0} returned")]
    EmptyResult(&'static str),
    /// The backend answered with its own error envelope
    #[error("backend error: {0}")]
    Rejected(String),
}

/// Operations understood by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Fetches the question pool
    GetQuestions,
    /// Records a finished game
    UploadScore,
    /// Fetches player rankings and team aggregates
    ReadScores,
    /// Fetches the administrator messages
    GetMessages,
    /// Fetches scores earned at in-person events
    ReadPresenceScores,
}

impl Action {
    /// Returns the value of the `action` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            Action::GetQuestions => "get_questions",
            Action::UploadScore => "upload_score",
            Action::ReadScores => "read_scores",
            Action::GetMessages => "get_messages",
            Action::ReadPresenceScores => "read_presence_scores",
        }
    }
}

/// Final result of a game, sent once when it ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreSubmission {
    /// Player identifier
    pub phone: Phone,
    /// Team the player chose at login
    pub team: Team,
    /// Final score including any bonus
    pub score: u64,
    /// Number of correct answers
    pub correct: usize,
    /// Number of questions played
    pub total: usize,
}

impl ScoreSubmission {
    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("telefono", self.phone.to_string()),
            ("equipo", self.team.name().to_owned()),
            ("puntos", self.score.to_string()),
            ("aciertos", self.correct.to_string()),
            ("total", self.total.to_string()),
        ]
    }
}

#[derive(Deserialize)]
struct QuestionsResponse {
    #[serde(default)]
    questions: Vec<Value>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    messages: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct PresenceResponse {
    #[serde(default)]
    scores: Vec<RankingEntry>,
}

/// Checks the backend's envelope conventions
///
/// A response is a success when it carries `result: "success"` or, for
/// actions that do not report a result, when it has no `error` field.
pub fn check_envelope(body: Value) -> Result<Value, ClientError> {
    let Some(object) = body.as_object() else {
        return Err(ClientError::Protocol("expected a JSON object".to_owned()));
    };

    if let Some(error) = object.get("error") {
        if !matches!(error, Value::Null | Value::Bool(false)) {
            let message = object
                .get("message")
                .and_then(Value::as_str)
                .or_else(|| error.as_str())
                .unwrap_or("unknown error");
            return Err(ClientError::Rejected(message.to_owned()));
        }
    }

    if let Some(result) = object.get("result") {
        if result.as_str() != Some("success") {
            let message = object
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| format!("result was {result}"), str::to_owned);
            return Err(ClientError::Rejected(message));
        }
    }

    Ok(body)
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ClientError> {
    serde_json::from_value(body).map_err(|e| ClientError::Protocol(e.to_string()))
}

/// A connection to the scoring and question service
///
/// Implementors only provide [`Backend::request`]; the typed operations are
/// built on top of it.
pub trait Backend {
    /// Issues `action` with `params` and returns the checked JSON body
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] for transport failures, malformed bodies, and
    /// backend error envelopes.
    fn request(&self, action: Action, params: &[(&str, String)]) -> Result<Value, ClientError>;

    /// Fetches the question pool
    ///
    /// Records are decoded one by one; malformed records and records with an
    /// unusable answer label are dropped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::EmptyResult`] when no usable question remains.
    fn fetch_questions(&self) -> Result<Vec<Question>, ClientError> {
        let response: QuestionsResponse = decode(self.request(Action::GetQuestions, &[])?)?;
        let questions = response
            .questions
            .into_iter()
            .filter_map(|raw| {
                let record: QuestionRecord = serde_json::from_value(raw)
                    .map_err(|e| log::warn!("dropping malformed question: {e}"))
                    .ok()?;
                Question::try_from(record)
                    .map_err(|e| log::warn!("dropping question: {e}"))
                    .ok()
            })
            .collect_vec();

        if questions.is_empty() {
            Err(ClientError::EmptyResult("questions"))
        } else {
            Ok(questions)
        }
    }

    /// Records a finished game
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the backend did not accept the score.
    fn submit_score(&self, submission: &ScoreSubmission) -> Result<(), ClientError> {
        self.request(Action::UploadScore, &submission.params())
            .map(|_| ())
    }

    /// Fetches the player rankings and team aggregates
    ///
    /// When `phone` is given the backend may narrow the player list to it.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the rankings cannot be read.
    fn fetch_rankings(&self, phone: Option<&Phone>) -> Result<RankingFeed, ClientError> {
        let params = phone
            .map(|phone| vec![("telefono", phone.to_string())])
            .unwrap_or_default();
        decode(self.request(Action::ReadScores, &params)?)
    }

    /// Fetches the administrator messages
    ///
    /// `None` means the backend did not provide a list.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the messages cannot be read.
    fn fetch_messages(&self) -> Result<Option<Vec<String>>, ClientError> {
        let response: MessagesResponse = decode(self.request(Action::GetMessages, &[])?)?;
        Ok(response.messages)
    }

    /// Fetches the scores earned at in-person events
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] when the scores cannot be read.
    fn fetch_presence_scores(&self) -> Result<Vec<RankingEntry>, ClientError> {
        let response: PresenceResponse =
            decode(self.request(Action::ReadPresenceScores, &[])?)?;
        Ok(response.scores)
    }
}

/// Backend reached over HTTP
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::blocking::Client,
    endpoint: String,
}

#[cfg(not(target_arch = "wasm32"))]
impl HttpBackend {
    /// Creates a client for the service at `endpoint`
    pub fn new<S: Into<String>>(endpoint: S) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Creates a client for the endpoint named in `options`
    pub fn from_options(options: &crate::config::Options) -> Self {
        Self::new(options.endpoint.clone())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Backend for HttpBackend {
    fn request(&self, action: Action, params: &[(&str, String)]) -> Result<Value, ClientError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("action", action.as_str())])
            .query(params)
            .send()
            .map_err(|e| {
                log::error!("{} request failed: {e}", action.as_str());
                ClientError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            log::error!("{} returned HTTP {status}", action.as_str());
            return Err(ClientError::Transport(format!("HTTP error! status: {status}")));
        }

        let body: Value = response.json().map_err(|e| {
            log::error!("{} returned a malformed body: {e}", action.as_str());
            ClientError::Protocol(e.to_string())
        })?;

        check_envelope(body)
    }
}
