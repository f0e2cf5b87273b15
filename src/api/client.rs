use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::attempt::{SubmitError, Submitter};
use crate::data::{checked, Catalog, LoadError};
use crate::models::{Answer, QuestionSet, SubmissionResult};
use crate::protocol::{Envelope, QuizDocument, SubmitRequest, SubmitResponse};

/// Longest response body echoed into an error message.
const MAX_ERROR_BODY: usize = 200;

/// Errors talking to the quiz service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("invalid API base URL {0:?}")]
    InvalidBaseUrl(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("quiz service answered {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("{0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<ApiError> for SubmitError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, message } => SubmitError::Status {
                status: status.as_u16(),
                message,
            },
            ApiError::Rejected(message) => SubmitError::Rejected(message),
            ApiError::Malformed(message) => SubmitError::MalformedResponse(message),
            other => SubmitError::Transport(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

/// HTTP client of the learning-management quiz endpoints.
#[derive(Debug, Clone)]
pub struct QuizApi {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl QuizApi {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let base_url = Url::parse(&config.base_url)
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::InvalidBaseUrl(config.base_url.clone()))?;
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url,
            token: config.token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// `GET /quizzes/student`
    pub async fn student_quizzes(&self) -> Result<Vec<QuizDocument>, ApiError> {
        let request = self.request(Method::GET, &["quizzes", "student"])?;
        self.send(request).await
    }

    /// `GET /quizzes/{id}`
    pub async fn quiz(&self, quiz_id: &str) -> Result<QuizDocument, ApiError> {
        let request = self.request(Method::GET, &["quizzes", quiz_id])?;
        self.send(request).await
    }

    /// `POST /quizzes/{id}/submit`
    pub async fn submit_attempt(
        &self,
        quiz_id: &str,
        answers: &[Answer],
    ) -> Result<SubmitResponse, ApiError> {
        let request = self
            .request(Method::POST, &["quizzes", quiz_id, "submit"])?
            .json(&SubmitRequest { answers });
        self.send(request).await
    }

    /// A submitter that scores against `question_set`'s passing threshold.
    pub fn submitter_for(&self, question_set: &QuestionSet) -> ApiSubmitter {
        ApiSubmitter {
            api: self.clone(),
            passing_percentage: question_set.passing_percentage,
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(segments)?;
        log::debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_envelope(status, &body)
    }
}

fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, ApiError> {
    let envelope = serde_json::from_str::<Envelope<T>>(body);

    if !status.is_success() {
        let message = match &envelope {
            Ok(envelope) => envelope.reason(),
            Err(_) => truncate(body),
        };
        return Err(ApiError::Status { status, message });
    }

    let envelope = envelope.map_err(|err| ApiError::Malformed(err.to_string()))?;
    if !envelope.success {
        return Err(ApiError::Rejected(envelope.reason()));
    }
    envelope
        .data
        .ok_or_else(|| ApiError::Malformed("response has no data".to_string()))
}

fn truncate(body: &str) -> String {
    if body.trim().is_empty() {
        return "empty response".to_string();
    }
    let mut text: String = body.chars().take(MAX_ERROR_BODY).collect();
    if body.chars().count() > MAX_ERROR_BODY {
        text.push_str("...");
    }
    text
}

#[async_trait]
impl Catalog for QuizApi {
    async fn list_quizzes(&self) -> Result<Vec<QuestionSet>, LoadError> {
        let documents = self.student_quizzes().await?;
        let mut sets = Vec::with_capacity(documents.len());
        for document in documents {
            let title = document.title.clone();
            match document
                .into_question_set()
                .map_err(LoadError::from)
                .and_then(checked)
            {
                Ok(set) => sets.push(set),
                Err(err) => log::warn!("skipping quiz {:?}: {}", title, err),
            }
        }
        Ok(sets)
    }

    async fn fetch_quiz(&self, quiz_id: &str) -> Result<QuestionSet, LoadError> {
        let document = self.quiz(quiz_id).await?;
        checked(document.into_question_set()?)
    }
}

/// [`Submitter`] over the HTTP API for one quiz.
#[derive(Debug, Clone)]
pub struct ApiSubmitter {
    api: QuizApi,
    passing_percentage: u32,
}

impl ApiSubmitter {
    fn to_result(&self, response: &SubmitResponse) -> SubmissionResult {
        let result = SubmissionResult::from_score(
            response.score,
            response.total_questions,
            self.passing_percentage,
        );
        if response.percentage.is_some_and(|p| p != result.percentage) {
            log::warn!(
                "service reported {:?}% for {}/{}, using {}%",
                response.percentage,
                response.score,
                response.total_questions,
                result.percentage
            );
        }
        if response.passed.is_some_and(|p| p != result.passed) {
            log::warn!(
                "service pass flag {:?} disagrees with {}% against {}%",
                response.passed,
                result.percentage,
                self.passing_percentage
            );
        }
        result
    }
}

#[async_trait]
impl Submitter for ApiSubmitter {
    async fn submit(
        &self,
        quiz_id: &str,
        answers: &[Answer],
    ) -> Result<SubmissionResult, SubmitError> {
        let response = self.api.submit_attempt(quiz_id, answers).await?;
        Ok(self.to_result(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn api(base_url: &str) -> QuizApi {
        QuizApi::new(ApiConfig {
            base_url: base_url.to_string(),
            token: Some("secret".into()),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = api("https://lms.example.com/api/");
        let url = api.endpoint(&["quizzes", "auto-42", "submit"]).unwrap();
        assert_eq!(url.as_str(), "https://lms.example.com/api/quizzes/auto-42/submit");

        let api = self::api("https://lms.example.com/api");
        let url = api.endpoint(&["quizzes", "a b"]).unwrap();
        assert_eq!(url.as_str(), "https://lms.example.com/api/quizzes/a%20b");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = QuizApi::new(ApiConfig {
            base_url: "not a url".into(),
            token: None,
            timeout: Duration::from_secs(1),
        });
        assert_matches!(result, Err(ApiError::InvalidBaseUrl(_)));
    }

    #[test]
    fn test_decode_success() {
        let body = r#"{"success": true, "data": {"score": 2, "percentage": 67, "passed": false, "totalQuestions": 3}}"#;
        let data: SubmitResponse = decode_envelope(StatusCode::CREATED, body).unwrap();
        assert_eq!(data.score, 2);
        assert_eq!(data.total_questions, 3);
    }

    #[test]
    fn test_decode_failures() {
        let body = r#"{"success": false, "message": "You are not enrolled in this course"}"#;
        let err = decode_envelope::<SubmitResponse>(StatusCode::FORBIDDEN, body).unwrap_err();
        assert_matches!(err, ApiError::Status { status, ref message }
            if status == StatusCode::FORBIDDEN && message == "You are not enrolled in this course");

        let err = decode_envelope::<SubmitResponse>(StatusCode::BAD_GATEWAY, "").unwrap_err();
        assert_matches!(err, ApiError::Status { ref message, .. } if message == "empty response");

        let body = r#"{"success": false, "message": "Error submitting quiz"}"#;
        let err = decode_envelope::<SubmitResponse>(StatusCode::OK, body).unwrap_err();
        assert_matches!(err, ApiError::Rejected(ref m) if m == "Error submitting quiz");

        let err = decode_envelope::<SubmitResponse>(StatusCode::OK, "<html>").unwrap_err();
        assert_matches!(err, ApiError::Malformed(_));
    }

    #[test]
    fn test_submit_error_mapping() {
        let err = SubmitError::from(ApiError::Rejected("closed".into()));
        assert_matches!(err, SubmitError::Rejected(ref m) if m == "closed");

        let err = SubmitError::from(ApiError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "down".into(),
        });
        assert_matches!(err, SubmitError::Status { status: 503, .. });
    }

    #[test]
    fn test_submitter_recomputes_percentage() {
        let submitter = ApiSubmitter {
            api: api("http://localhost:5000/api"),
            passing_percentage: 80,
        };
        let response = SubmitResponse {
            score: 7,
            total_questions: 10,
            percentage: Some(70),
            passed: Some(true),
        };
        let result = submitter.to_result(&response);
        assert_eq!(result.percentage, 70);
        assert!(!result.passed);
    }
}
