//! Recorded questionnaire answers.
//!
//! Answers are produced by the questionnaire screens and are unique per
//! question id within a questionnaire. Re-answering a question replaces the
//! stored value in place.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading answers.
#[derive(Error, Debug)]
pub enum AnswerError {
    #[error("Failed to read answers file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Unsupported answers file extension: {0}")]
    UnsupportedFormat(String),
}

/// A raw answer value: questionnaire screens store either numbers or text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Number(f64),
    Text(String),
}

impl AnswerValue {
    /// The numeric value, if this answer was stored as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(n) => Some(*n),
            AnswerValue::Text(_) => None,
        }
    }
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Number(n) => write!(f, "{}", n),
            AnswerValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        AnswerValue::Number(value)
    }
}

impl From<i32> for AnswerValue {
    fn from(value: i32) -> Self {
        AnswerValue::Number(f64::from(value))
    }
}

impl From<u32> for AnswerValue {
    fn from(value: u32) -> Self {
        AnswerValue::Number(f64::from(value))
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

/// One answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(alias = "questionId")]
    pub question_id: u32,
    pub answer: AnswerValue,
}

impl Answer {
    pub fn new(question_id: u32, answer: impl Into<AnswerValue>) -> Self {
        Self {
            question_id,
            answer: answer.into(),
        }
    }
}

/// Answers for one questionnaire, unique per question id, in recording order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Answer>", into = "Vec<Answer>")]
pub struct AnswerSet {
    answers: Vec<Answer>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer, replacing any earlier answer to the same question
    /// without changing its position.
    pub fn record(&mut self, answer: Answer) {
        match self
            .answers
            .iter_mut()
            .find(|a| a.question_id == answer.question_id)
        {
            Some(existing) => existing.answer = answer.answer,
            None => self.answers.push(answer),
        }
    }

    pub fn get(&self, question_id: u32) -> Option<&AnswerValue> {
        self.answers
            .iter()
            .find(|a| a.question_id == question_id)
            .map(|a| &a.answer)
    }

    /// Remove every answer ("start over").
    pub fn clear(&mut self) {
        self.answers.clear();
    }

    pub fn as_slice(&self) -> &[Answer] {
        &self.answers
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl From<Vec<Answer>> for AnswerSet {
    fn from(answers: Vec<Answer>) -> Self {
        answers.into_iter().collect()
    }
}

impl From<AnswerSet> for Vec<Answer> {
    fn from(set: AnswerSet) -> Self {
        set.answers
    }
}

impl FromIterator<Answer> for AnswerSet {
    fn from_iter<I: IntoIterator<Item = Answer>>(iter: I) -> Self {
        let mut set = AnswerSet::new();
        for answer in iter {
            set.record(answer);
        }
        set
    }
}

/// Both questionnaires' answers, as stored on the device or in a file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerSheet {
    #[serde(default)]
    pub quiz: AnswerSet,

    #[serde(default)]
    pub habits: AnswerSet,
}

impl AnswerSheet {
    /// Parse answers from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, AnswerError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse answers from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, AnswerError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load answers from a `.yaml`, `.yml` or `.json` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AnswerError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;

        let sheet = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content)?,
            Some("json") => Self::from_json(&content)?,
            other => {
                return Err(AnswerError::UnsupportedFormat(
                    other.unwrap_or("<none>").to_string(),
                ))
            }
        };

        tracing::debug!(
            path = %path.display(),
            quiz = sheet.quiz.len(),
            habits = sheet.habits.len(),
            "Loaded answer sheet"
        );
        Ok(sheet)
    }
}
