use thiserror::Error;

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    pub explanation: Option<String>,
}

/// Immutable description of a fetched quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionSet {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub course_name: Option<String>,
    pub questions: Vec<Question>,
    pub duration_seconds: u32,
    pub attempts_allowed: u32,
    pub passing_percentage: u32,
}

/// Reasons a question set cannot be used for an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionSetError {
    #[error("quiz must allow at least one attempt")]
    NoAttempts,
    #[error("passing percentage {0} is above 100")]
    PassingOutOfRange(u32),
    #[error("question {0} has no options")]
    NoOptions(usize),
}

impl QuestionSet {
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Check the invariants an attempt relies on.
    ///
    /// A zero duration is accepted: such an attempt expires as soon as it
    /// starts.
    pub fn validate(&self) -> Result<(), QuestionSetError> {
        if self.attempts_allowed == 0 {
            return Err(QuestionSetError::NoAttempts);
        }
        if self.passing_percentage > 100 {
            return Err(QuestionSetError::PassingOutOfRange(self.passing_percentage));
        }
        if let Some(index) = self.questions.iter().position(|q| q.options.is_empty()) {
            return Err(QuestionSetError::NoOptions(index));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> QuestionSet {
        QuestionSet {
            id: "q1".into(),
            title: "Ownership".into(),
            description: None,
            course_name: None,
            questions: vec![Question {
                prompt: "Who owns a String?".into(),
                options: vec!["The binding".into(), "The heap".into()],
                explanation: None,
            }],
            duration_seconds: 60,
            attempts_allowed: 1,
            passing_percentage: 70,
        }
    }

    #[test]
    fn test_validate_accepts_sample() {
        assert_eq!(sample().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_bad_sets() {
        let mut set = sample();
        set.attempts_allowed = 0;
        assert_eq!(set.validate(), Err(QuestionSetError::NoAttempts));

        let mut set = sample();
        set.passing_percentage = 101;
        assert_eq!(set.validate(), Err(QuestionSetError::PassingOutOfRange(101)));

        let mut set = sample();
        set.questions[0].options.clear();
        assert_eq!(set.validate(), Err(QuestionSetError::NoOptions(0)));
    }

    #[test]
    fn test_zero_duration_is_valid() {
        let mut set = sample();
        set.duration_seconds = 0;
        assert!(set.validate().is_ok());
    }
}
