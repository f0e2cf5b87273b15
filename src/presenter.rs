//! Display models for results and the countdown.

use crate::models::SubmissionResult;

/// Seconds left below which the countdown is highlighted.
const LOW_TIME_SECONDS: u32 = 60;

/// Qualitative grade band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Excellent,
    Good,
    KeepPracticing,
    NeedsReview,
}

impl Band {
    pub fn for_percentage(percentage: u32) -> Self {
        match percentage {
            90.. => Band::Excellent,
            70..=89 => Band::Good,
            50..=69 => Band::KeepPracticing,
            _ => Band::NeedsReview,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::Excellent => "Excellent!",
            Band::Good => "Good Job!",
            Band::KeepPracticing => "Keep Practicing!",
            Band::NeedsReview => "Need More Study",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    Passed,
    Failed,
}

impl Banner {
    pub fn text(self) -> &'static str {
        match self {
            Banner::Passed => "You passed the quiz!",
            Banner::Failed => "Keep studying and try again!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub band: Band,
    pub percentage: u32,
    pub percentage_label: String,
    pub score_line: String,
    pub banner: Banner,
    pub threshold_line: String,
}

/// Turn a scored attempt into what the result screen shows.
pub fn present(result: &SubmissionResult, passing_percentage: u32) -> ResultView {
    let banner = if result.passed {
        Banner::Passed
    } else {
        Banner::Failed
    };

    ResultView {
        band: Band::for_percentage(result.percentage),
        percentage: result.percentage,
        percentage_label: format!("{}%", result.percentage),
        score_line: format!(
            "{} out of {} correct",
            result.raw_score, result.total_questions
        ),
        banner,
        threshold_line: format!("Passing score: {}%", passing_percentage),
    }
}

/// `m:ss`, minutes unbounded.
pub fn format_remaining(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn is_time_low(seconds: u32) -> bool {
    seconds < LOW_TIME_SECONDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bands() {
        let cases = [
            (100, Band::Excellent),
            (90, Band::Excellent),
            (89, Band::Good),
            (70, Band::Good),
            (69, Band::KeepPracticing),
            (50, Band::KeepPracticing),
            (49, Band::NeedsReview),
            (0, Band::NeedsReview),
        ];
        for (percentage, band) in cases {
            assert_eq!(Band::for_percentage(percentage), band, "{percentage}%");
        }
    }

    #[test]
    fn test_present_passed() {
        let view = present(&SubmissionResult::from_score(17, 20, 70), 70);
        assert_eq!(view.band, Band::Good);
        assert_eq!(view.percentage_label, "85%");
        assert_eq!(view.score_line, "17 out of 20 correct");
        assert_eq!(view.banner, Banner::Passed);
        assert_eq!(view.threshold_line, "Passing score: 70%");
    }

    #[test]
    fn test_present_failed_and_empty() {
        let view = present(&SubmissionResult::from_score(1, 4, 70), 70);
        assert_eq!(view.band, Band::NeedsReview);
        assert_eq!(view.banner, Banner::Failed);
        assert_eq!(view.banner.text(), "Keep studying and try again!");

        let view = present(&SubmissionResult::empty(70), 70);
        assert_eq!(view.percentage_label, "0%");
        assert_eq!(view.score_line, "0 out of 0 correct");
    }

    #[test]
    fn test_format_remaining() {
        let cases = [
            (0, "0:00"),
            (9, "0:09"),
            (60, "1:00"),
            (605, "10:05"),
            (3600, "60:00"),
        ];
        for (seconds, expected) in cases {
            assert_eq!(format_remaining(seconds), expected);
        }
    }

    #[test]
    fn test_time_low() {
        assert!(is_time_low(59));
        assert!(!is_time_low(60));
    }
}
