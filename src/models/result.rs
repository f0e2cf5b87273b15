/// Scored outcome of one completed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionResult {
    pub raw_score: u32,
    pub total_questions: u32,
    pub percentage: u32,
    pub passed: bool,
}

impl SubmissionResult {
    /// Build a result from a raw score.
    ///
    /// The percentage is `raw / total * 100` rounded half up, computed on
    /// integers so that e.g. 1/8 (12.5%) becomes 13 and 2/3 becomes 67.
    /// A quiz without questions scores 0%.
    pub fn from_score(raw_score: u32, total_questions: u32, passing_percentage: u32) -> Self {
        let percentage = if total_questions == 0 {
            0
        } else {
            let raw = u64::from(raw_score.min(total_questions));
            let total = u64::from(total_questions);
            ((200 * raw + total) / (2 * total)) as u32
        };

        Self {
            raw_score,
            total_questions,
            percentage,
            passed: percentage >= passing_percentage,
        }
    }

    /// The neutral 0/0 result of a quiz with no questions.
    pub fn empty(passing_percentage: u32) -> Self {
        Self::from_score(0, 0, passing_percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounding_rule() {
        let cases = [
            (0, 10, 0),
            (1, 8, 13),
            (1, 3, 33),
            (2, 3, 67),
            (7, 10, 70),
            (10, 10, 100),
            (1, 200, 1),
            (1, 201, 0),
        ];
        for (raw, total, expected) in cases {
            let result = SubmissionResult::from_score(raw, total, 70);
            assert_eq!(result.percentage, expected, "{raw}/{total}");
        }
    }

    #[test]
    fn test_passed_uses_threshold() {
        assert!(SubmissionResult::from_score(7, 10, 70).passed);
        assert!(!SubmissionResult::from_score(6, 10, 70).passed);
        assert!(SubmissionResult::from_score(0, 10, 0).passed);
    }

    #[test]
    fn test_empty_result() {
        let result = SubmissionResult::empty(70);
        assert_eq!(result.raw_score, 0);
        assert_eq!(result.total_questions, 0);
        assert_eq!(result.percentage, 0);
        assert!(!result.passed);
    }
}
