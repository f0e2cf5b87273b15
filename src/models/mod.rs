mod answer;
mod question;
mod result;

pub use answer::Answer;
pub use question::{Question, QuestionSet, QuestionSetError};
pub use result::SubmissionResult;
