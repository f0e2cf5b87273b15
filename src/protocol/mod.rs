mod messages;

pub use messages::{
    DecodeError, Envelope, QuestionDocument, QuizDocument, SubmitRequest, SubmitResponse,
    DEFAULT_ATTEMPTS_ALLOWED, DEFAULT_DURATION_MINUTES, DEFAULT_PASSING_PERCENTAGE,
};
