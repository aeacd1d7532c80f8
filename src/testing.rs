//! Test doubles for the collaborator traits

use std::{cell::RefCell, collections::HashMap};

use serde_json::{Value, json};

use crate::{
    UpdateMessage, app,
    backend::{Action, Backend, ClientError, check_envelope},
    game, media,
    session::Tunnel,
};

/// Backend answering each action with a scripted body
#[derive(Debug, Default)]
pub struct MockBackend {
    responses: HashMap<Action, Result<Value, ClientError>>,
    calls: RefCell<Vec<(Action, Vec<(String, String)>)>>,
}

impl MockBackend {
    pub fn with(mut self, action: Action, body: Value) -> Self {
        self.responses.insert(action, Ok(body));
        self
    }

    pub fn fail(mut self, action: Action, error: ClientError) -> Self {
        self.responses.insert(action, Err(error));
        self
    }

    pub fn calls(&self) -> Vec<(Action, Vec<(String, String)>)> {
        self.calls.borrow().clone()
    }

    pub fn calls_for(&self, action: Action) -> Vec<Vec<(String, String)>> {
        self.calls
            .borrow()
            .iter()
            .filter(|(called, _)| *called == action)
            .map(|(_, params)| params.clone())
            .collect()
    }
}

impl Backend for MockBackend {
    fn request(&self, action: Action, params: &[(&str, String)]) -> Result<Value, ClientError> {
        self.calls.borrow_mut().push((
            action,
            params
                .iter()
                .map(|(key, value)| ((*key).to_owned(), value.clone()))
                .collect(),
        ));

        match self.responses.get(&action) {
            Some(Ok(body)) => check_envelope(body.clone()),
            Some(Err(e)) => Err(e.clone()),
            None => Err(ClientError::Transport(format!(
                "no response for {}",
                action.as_str()
            ))),
        }
    }
}

/// Display surface that records everything it is sent
#[derive(Debug, Default)]
pub struct RecordingTunnel {
    messages: RefCell<Vec<UpdateMessage>>,
}

impl RecordingTunnel {
    pub fn messages(&self) -> Vec<UpdateMessage> {
        self.messages.borrow().clone()
    }

    pub fn game_messages(&self) -> Vec<game::UpdateMessage> {
        self.messages
            .borrow()
            .iter()
            .filter_map(|message| match message {
                UpdateMessage::Game(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn media_messages(&self) -> Vec<media::UpdateMessage> {
        self.messages
            .borrow()
            .iter()
            .filter_map(|message| match message {
                UpdateMessage::Media(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn app_messages(&self) -> Vec<app::UpdateMessage> {
        self.messages
            .borrow()
            .iter()
            .filter_map(|message| match message {
                UpdateMessage::App(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Tunnel for RecordingTunnel {
    fn send_message(&self, message: &UpdateMessage) {
        self.messages.borrow_mut().push(message.clone());
    }
}

/// Builds a `get_questions` body with `count` questions `q0..`, all
/// answered by `correct`
pub fn question_pool(count: usize, correct: &str) -> Value {
    let questions: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": format!("q{i}"),
                "question": format!("Pregunta {i}"),
                "optionA": "a",
                "optionB": "b",
                "optionC": "c",
                "optionD": "d",
                "correctAnswer": correct,
            })
        })
        .collect();
    json!({ "questions": questions })
}
