//! The finalizing network call.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Answer, SubmissionResult};

/// Failures of a submission. All of them are transient for the attempt:
/// the answers stay sealed and the user may retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SubmitError {
    #[error("could not reach the quiz service: {0}")]
    Transport(String),
    #[error("quiz service answered {status}: {message}")]
    Status { status: u16, message: String },
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("unexpected response from the quiz service: {0}")]
    MalformedResponse(String),
}

/// Scores a sealed attempt.
///
/// Implementations perform exactly one call per invocation and never retry.
/// `answers` is read-only; there is one slot per question.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(
        &self,
        quiz_id: &str,
        answers: &[Answer],
    ) -> Result<SubmissionResult, SubmitError>;
}

/// Deterministic submitter for tests and demos.
///
/// Scripted failures are consumed first; after that every call is graded
/// against the answer key.
pub struct ScriptedSubmitter {
    answer_key: Vec<usize>,
    passing_percentage: u32,
    failures: Mutex<VecDeque<SubmitError>>,
    calls: Mutex<Vec<(String, Vec<Answer>)>>,
}

impl ScriptedSubmitter {
    pub fn grading(answer_key: Vec<usize>, passing_percentage: u32) -> Self {
        Self {
            answer_key,
            passing_percentage,
            failures: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Make the next call fail with `error`.
    pub fn fail_next(&self, error: SubmitError) {
        self.lock_failures().push_back(error);
    }

    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    pub fn calls(&self) -> Vec<(String, Vec<Answer>)> {
        self.lock_calls().clone()
    }

    /// Score `answers` the way the service would.
    pub fn grade(&self, answers: &[Answer]) -> SubmissionResult {
        let total = answers.len().min(self.answer_key.len());
        let correct = answers
            .iter()
            .zip(&self.answer_key)
            .filter(|&(answer, key)| answer.index() == Some(*key))
            .count();
        SubmissionResult::from_score(correct as u32, total as u32, self.passing_percentage)
    }

    fn lock_failures(&self) -> MutexGuard<'_, VecDeque<SubmitError>> {
        self.failures.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_calls(&self) -> MutexGuard<'_, Vec<(String, Vec<Answer>)>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Submitter for ScriptedSubmitter {
    async fn submit(
        &self,
        quiz_id: &str,
        answers: &[Answer],
    ) -> Result<SubmissionResult, SubmitError> {
        self.lock_calls().push((quiz_id.to_string(), answers.to_vec()));
        let failure = self.lock_failures().pop_front();
        if let Some(error) = failure {
            return Err(error);
        }
        Ok(self.grade(answers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_submitter_fails_then_grades() {
        let submitter = ScriptedSubmitter::grading(vec![0, 1], 50);
        submitter.fail_next(SubmitError::Transport("offline".into()));
        let answers = [Answer::Selected(0), Answer::Unanswered];

        let first = submitter.submit("quiz", &answers).await;
        assert!(matches!(first, Err(SubmitError::Transport(_))));

        let second = submitter.submit("quiz", &answers).await.unwrap();
        assert_eq!(second, SubmissionResult::from_score(1, 2, 50));
        assert_eq!(submitter.call_count(), 2);
        assert_eq!(submitter.calls()[1], ("quiz".to_string(), answers.to_vec()));
    }

    #[test]
    fn test_error_messages() {
        let error = SubmitError::Status {
            status: 503,
            message: "maintenance".into(),
        };
        assert_eq!(error.to_string(), "quiz service answered 503: maintenance");
    }
}
