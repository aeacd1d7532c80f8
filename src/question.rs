//! Questions as served by the backend

use std::{fmt::Display, str::FromStr};

use enum_map::{Enum, EnumMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Label of one of the four options of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Option a
    A,
    /// Option b
    B,
    /// Option c
    C,
    /// Option d
    D,
}

/// The text is not an option label
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0:?} is not an option label")]
pub struct InvalidLabel(String);

impl Label {
    /// All labels in presentation order
    pub const ALL: [Label; 4] = [Label::A, Label::B, Label::C, Label::D];

    /// Returns the lowercase label
    pub fn as_str(self) -> &'static str {
        match self {
            Label::A => "a",
            Label::B => "b",
            Label::C => "c",
            Label::D => "d",
        }
    }
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = InvalidLabel;

    /// Parses a label ignoring case and surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Label::ALL
            .into_iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| InvalidLabel(s.to_owned()))
    }
}

/// A spreadsheet cell that may arrive as text, a number, or a boolean
#[derive(Deserialize)]
#[serde(untagged)]
enum RawCell {
    Text(String),
    Number(serde_json::Number),
    Flag(bool),
}

impl From<RawCell> for String {
    fn from(raw: RawCell) -> Self {
        match raw {
            RawCell::Text(text) => text,
            RawCell::Number(number) => number.to_string(),
            RawCell::Flag(flag) => flag.to_string(),
        }
    }
}

/// Text of a spreadsheet cell, whatever JSON type the backend used for it
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawCell")]
pub(crate) struct CellText(String);

impl From<RawCell> for CellText {
    fn from(raw: RawCell) -> Self {
        Self(raw.into())
    }
}

impl CellText {
    /// Returns the cell as text
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<CellText> for String {
    fn from(cell: CellText) -> Self {
        cell.0
    }
}

/// Identifier of a question, kept as text whatever the backend sent
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawCell")]
pub struct QuestionId(String);

impl From<RawCell> for QuestionId {
    fn from(raw: RawCell) -> Self {
        Self(raw.into())
    }
}

impl QuestionId {
    /// Returns the identifier as text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for QuestionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Question record as sent by the backend
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuestionRecord {
    id: QuestionId,
    question: CellText,
    #[serde(default)]
    option_a: CellText,
    #[serde(default)]
    option_b: CellText,
    #[serde(default)]
    option_c: CellText,
    #[serde(default)]
    option_d: CellText,
    correct_answer: CellText,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = InvalidLabel;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        let correct = record.correct_answer.0.parse()?;
        Ok(Question {
            id: record.id,
            prompt: record.question.into(),
            options: EnumMap::from_array([
                record.option_a.into(),
                record.option_b.into(),
                record.option_c.into(),
                record.option_d.into(),
            ]),
            correct,
        })
    }
}

/// A multiple choice question with four labeled options
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    /// Identifier used to avoid serving the question again too soon
    pub id: QuestionId,
    /// The question text
    pub prompt: String,
    /// Text of each option
    pub options: EnumMap<Label, String>,
    /// The label of the correct option
    pub correct: Label,
}

impl Question {
    /// Returns whether `selected` is the correct option
    pub fn is_correct(&self, selected: Label) -> bool {
        selected == self.correct
    }

    /// Returns the options in presentation order
    pub fn labeled_options(&self) -> Vec<(Label, String)> {
        self.options
            .iter()
            .map(|(label, text)| (label, text.clone()))
            .collect()
    }
}
