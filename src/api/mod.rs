//! Client of the learning-management service's quiz endpoints.

mod client;

pub use client::{ApiConfig, ApiError, ApiSubmitter, QuizApi};
