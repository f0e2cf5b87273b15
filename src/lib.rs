//! # quiz-attempt
//!
//! Terminal client for timed quiz attempts against a learning-management
//! service.
//!
//! The engine lives in [`attempt`]: an [`AttemptSession`] state machine
//! driven by a [`Clock`] and scored by a [`Submitter`]. The rest of the
//! crate loads quizzes, talks to the service and draws the terminal UI.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use quiz_attempt::{run, Config, LaunchOptions, QuizError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), QuizError> {
//!     run(Config::default(), LaunchOptions::default()).await
//! }
//! ```

pub mod api;
pub mod app;
pub mod attempt;
pub mod config;
pub mod data;
pub mod models;
pub mod presenter;
pub mod protocol;
pub mod runtime;
pub mod terminal;
mod ui;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

pub use api::{ApiConfig, ApiError, ApiSubmitter, QuizApi};
pub use app::{App, Screen};
pub use attempt::{
    AttemptController, AttemptSession, AttemptStatus, Clock, FinishPolicy, IntervalClock,
    ManualClock, ScriptedSubmitter, SubmitError, Submitter,
};
pub use config::{Config, ConfigError, ConfigStore, FileConfigStore};
pub use data::{Catalog, FileCatalog, LoadError};
pub use models::{Answer, Question, QuestionSet, SubmissionResult};

/// Error type for running the client.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("failed to load quizzes: {0}")]
    Load(#[from] LoadError),
    #[error("quiz service error: {0}")]
    Api(#[from] ApiError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Per-run choices that are not stored in the config file.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Read the quiz list from this JSON file instead of the service.
    pub catalog_path: Option<PathBuf>,
    /// Start this quiz right away.
    pub quiz_id: Option<String>,
}

/// Take over the terminal and run until the user quits.
pub async fn run(config: Config, options: LaunchOptions) -> Result<(), QuizError> {
    let api = QuizApi::new(ApiConfig {
        base_url: config.api_base_url.clone(),
        token: config.auth_token.clone(),
        timeout: config.request_timeout(),
    })?;

    let catalog: Arc<dyn Catalog> = match &options.catalog_path {
        Some(path) => {
            log::info!("reading quizzes from {}", path.display());
            Arc::new(FileCatalog::new(path))
        }
        None => Arc::new(api.clone()),
    };
    let submitters: runtime::SubmitterFactory = Box::new(move |question_set: &QuestionSet| {
        Arc::new(api.submitter_for(question_set)) as Arc<dyn Submitter>
    });

    let runtime = runtime::Runtime::new(catalog, submitters, config.tick_interval());
    let mut app = App::new(config.finish_policy);

    let mut terminal = terminal::TerminalGuard::enter()?;
    runtime.run(&mut terminal, &mut app, options.quiz_id).await
}
