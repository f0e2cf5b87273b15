use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::api::ApiError;
use crate::models::{QuestionSet, QuestionSetError};
use crate::protocol::DecodeError;

/// Why a quiz (or the quiz list) could not be loaded.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("quiz {id} is not usable: {source}")]
    Invalid { id: String, source: QuestionSetError },
    #[error("quiz {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Source of quizzes available to the student.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_quizzes(&self) -> Result<Vec<QuestionSet>, LoadError>;

    async fn fetch_quiz(&self, quiz_id: &str) -> Result<QuestionSet, LoadError>;
}

/// Reject question sets an attempt cannot run on.
pub(crate) fn checked(set: QuestionSet) -> Result<QuestionSet, LoadError> {
    match set.validate() {
        Ok(()) => Ok(set),
        Err(source) => Err(LoadError::Invalid { id: set.id, source }),
    }
}
