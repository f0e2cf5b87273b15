//! Wire shapes of the learning-management quiz API.
//!
//! Every response is wrapped in an [`Envelope`]. Field names follow the
//! service's camelCase JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Answer, Question, QuestionSet};

/// Applied when the service leaves a field out or reports zero.
pub const DEFAULT_DURATION_MINUTES: u32 = 10;
pub const DEFAULT_ATTEMPTS_ALLOWED: u32 = 3;
pub const DEFAULT_PASSING_PERCENTAGE: u32 = 70;

/// `{ success, message, data, error }` wrapper around every response.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    /// Best human-readable reason for a failed response.
    pub fn reason(&self) -> String {
        self.message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| "no reason given".to_string())
    }
}

/// A quiz as the service returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizDocument {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "_id", default)]
    pub object_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionDocument>,
    /// Minutes.
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub attempts_allowed: Option<u32>,
    #[serde(default)]
    pub passing_score: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionDocument {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("quiz document has no id")]
    MissingId,
}

impl QuizDocument {
    pub fn quiz_id(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.object_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// Convert to the engine's model, applying the service defaults.
    pub fn into_question_set(self) -> Result<QuestionSet, DecodeError> {
        let id = self.quiz_id().ok_or(DecodeError::MissingId)?.to_string();
        let minutes = non_zero_or(self.duration, DEFAULT_DURATION_MINUTES);

        Ok(QuestionSet {
            id,
            title: self.title,
            description: self.description,
            course_name: self.course_name,
            questions: self
                .questions
                .into_iter()
                .map(|q| Question {
                    prompt: q.question,
                    options: q.options,
                    explanation: q.explanation,
                })
                .collect(),
            duration_seconds: minutes.saturating_mul(60),
            attempts_allowed: non_zero_or(self.attempts_allowed, DEFAULT_ATTEMPTS_ALLOWED),
            passing_percentage: non_zero_or(self.passing_score, DEFAULT_PASSING_PERCENTAGE),
        })
    }
}

fn non_zero_or(value: Option<u32>, default: u32) -> u32 {
    value.filter(|v| *v > 0).unwrap_or(default)
}

/// Body of `POST /quizzes/{id}/submit`.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitRequest<'a> {
    pub answers: &'a [Answer],
}

/// `data` of a successful submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub score: u32,
    pub total_questions: u32,
    #[serde(default)]
    pub percentage: Option<u32>,
    #[serde(default)]
    pub passed: Option<bool>,
}
