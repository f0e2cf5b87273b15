use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::catalog::{checked, Catalog, LoadError};
use crate::models::QuestionSet;
use crate::protocol::QuizDocument;

async fn read_documents(path: &Path) -> Result<Vec<QuizDocument>, LoadError> {
    let json_content = fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&json_content).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn usable(document: QuizDocument) -> Result<QuestionSet, LoadError> {
    document
        .into_question_set()
        .map_err(LoadError::from)
        .and_then(checked)
}

/// Read a JSON array of quiz documents, in the service's format.
///
/// Quizzes an attempt cannot run on are skipped with a warning. A missing or
/// malformed file is an error.
pub async fn load_question_sets_from_json<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<QuestionSet>, LoadError> {
    let path = path.as_ref();
    let documents = read_documents(path).await?;

    let mut sets = Vec::with_capacity(documents.len());
    for document in documents {
        let title = document.title.clone();
        match usable(document) {
            Ok(set) => sets.push(set),
            Err(err) => log::warn!("skipping quiz {:?} in {}: {}", title, path.display(), err),
        }
    }

    log::debug!("loaded {} quizzes from {}", sets.len(), path.display());
    Ok(sets)
}

/// Quiz list kept in a local JSON file.
///
/// The file is re-read on every call so edits show up on refresh.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Catalog for FileCatalog {
    async fn list_quizzes(&self) -> Result<Vec<QuestionSet>, LoadError> {
        load_question_sets_from_json(&self.path).await
    }

    async fn fetch_quiz(&self, quiz_id: &str) -> Result<QuestionSet, LoadError> {
        let document = read_documents(&self.path)
            .await?
            .into_iter()
            .find(|doc| doc.quiz_id() == Some(quiz_id))
            .ok_or_else(|| LoadError::NotFound(quiz_id.to_string()))?;
        usable(document)
    }
}
