//! The attempt state machine.
//!
//! An [`AttemptSession`] is driven by two kinds of input: user commands
//! (select, navigate, finish, retry) and clock ticks. Both arrive on the same
//! event loop, so the `status` field is the only gate needed to make
//! finalization happen exactly once.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::models::{Answer, Question, QuestionSet, SubmissionResult};

/// Identifies one attempt. Outcomes carry it back to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(Uuid);

impl AttemptId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle of an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptStatus {
    NotStarted,
    InProgress,
    /// A submission is in flight. All mutating commands are refused.
    Submitting,
    Completed,
    SubmissionFailed,
}

/// What sealed the attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalizeTrigger {
    User,
    Timeout,
}

/// Whether an explicit finish needs an answer on the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishPolicy {
    AllowUnanswered,
    #[default]
    RequireSelection,
}

/// The sealed payload handed to the submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub attempt_id: AttemptId,
    pub quiz_id: String,
    pub answers: Vec<Answer>,
}

/// Result of a submitter call, tagged with the attempt it belongs to.
#[derive(Debug, Clone)]
pub struct SubmissionOutcome {
    pub attempt_id: AttemptId,
    pub result: Result<SubmissionResult, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The countdown is running.
    Running,
    /// The quiz has no questions; a neutral result was recorded.
    Completed(SubmissionResult),
    /// The quiz has no time; it was sealed on the spot.
    Expired(SubmissionRequest),
    /// The session had already been started.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Running(u32),
    Expired(SubmissionRequest),
    /// The session is not in progress; the tick was dropped.
    Ignored,
}

/// State of a single quiz attempt from start to scored result.
#[derive(Debug)]
pub struct AttemptSession {
    id: AttemptId,
    question_set: Arc<QuestionSet>,
    answers: Vec<Answer>,
    position: usize,
    pending_selection: Answer,
    remaining_seconds: u32,
    status: AttemptStatus,
    trigger: Option<FinalizeTrigger>,
    result: Option<SubmissionResult>,
    last_error: Option<String>,
}

impl AttemptSession {
    pub fn new(question_set: Arc<QuestionSet>) -> Self {
        let remaining_seconds = question_set.duration_seconds;
        Self {
            id: AttemptId::new(),
            answers: Vec::new(),
            position: 0,
            pending_selection: Answer::Unanswered,
            remaining_seconds,
            status: AttemptStatus::NotStarted,
            trigger: None,
            result: None,
            last_error: None,
            question_set,
        }
    }

    pub fn attempt_id(&self) -> AttemptId {
        self.id
    }

    pub fn question_set(&self) -> &QuestionSet {
        &self.question_set
    }

    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn pending_selection(&self) -> Answer {
        self.pending_selection
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn result(&self) -> Option<&SubmissionResult> {
        self.result.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn finalize_trigger(&self) -> Option<FinalizeTrigger> {
        self.trigger
    }

    pub fn total_questions(&self) -> usize {
        self.question_set.total_questions()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.question_set.question(self.position)
    }

    /// Committed answers, counting the pending selection for the current
    /// question while the attempt is still editable.
    pub fn answered_count(&self) -> usize {
        self.answers
            .iter()
            .enumerate()
            .filter(|&(index, answer)| {
                if self.status == AttemptStatus::InProgress && index == self.position {
                    self.pending_selection.is_answered()
                } else {
                    answer.is_answered()
                }
            })
            .count()
    }

    pub fn is_read_only(&self) -> bool {
        self.status != AttemptStatus::InProgress
    }

    /// Begin the attempt.
    pub fn start(&mut self) -> StartOutcome {
        if self.status != AttemptStatus::NotStarted {
            return StartOutcome::Ignored;
        }

        let total = self.total_questions();
        self.answers = vec![Answer::Unanswered; total];
        self.position = 0;
        self.pending_selection = Answer::Unanswered;
        self.remaining_seconds = self.question_set.duration_seconds;

        if total == 0 {
            let result = SubmissionResult::empty(self.question_set.passing_percentage);
            log::info!("attempt {}: quiz {} has no questions", self.id, self.question_set.id);
            self.status = AttemptStatus::Completed;
            self.result = Some(result);
            return StartOutcome::Completed(result);
        }

        self.status = AttemptStatus::InProgress;
        log::debug!(
            "attempt {}: started quiz {} ({} questions, {}s)",
            self.id,
            self.question_set.id,
            total,
            self.remaining_seconds
        );

        if self.remaining_seconds == 0 {
            return match self.finalize(FinalizeTrigger::Timeout) {
                Some(request) => StartOutcome::Expired(request),
                None => StartOutcome::Ignored,
            };
        }

        StartOutcome::Running
    }

    /// Tentatively choose an option for the current question.
    ///
    /// Returns `false` when the attempt no longer accepts input.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not an option of the current question.
    pub fn select_option(&mut self, index: usize) -> bool {
        if self.status != AttemptStatus::InProgress {
            return false;
        }
        let options = self.current_question().map_or(0, |q| q.options.len());
        assert!(
            index < options,
            "option {index} out of range for question {} ({options} options)",
            self.position
        );
        self.pending_selection = Answer::Selected(index);
        true
    }

    /// Commit the pending selection and move to `target`.
    ///
    /// Returns `false` when the attempt no longer accepts input.
    ///
    /// # Panics
    ///
    /// Panics if `target` is not a question index. Clamping would commit the
    /// pending selection against the wrong slot.
    pub fn navigate(&mut self, target: usize) -> bool {
        if self.status != AttemptStatus::InProgress {
            return false;
        }
        let total = self.total_questions();
        assert!(
            target < total,
            "navigation target {target} out of range ({total} questions)"
        );
        self.commit();
        self.position = target;
        self.pending_selection = self.answers[target];
        true
    }

    pub fn next(&mut self) -> bool {
        if self.position + 1 >= self.total_questions() {
            return false;
        }
        self.navigate(self.position + 1)
    }

    pub fn previous(&mut self) -> bool {
        if self.position == 0 {
            return false;
        }
        self.navigate(self.position - 1)
    }

    /// Whether an explicit finish is acceptable under `policy`.
    pub fn finish_allowed(&self, policy: FinishPolicy) -> bool {
        if self.status != AttemptStatus::InProgress {
            return false;
        }
        match policy {
            FinishPolicy::AllowUnanswered => true,
            FinishPolicy::RequireSelection => self.pending_selection.is_answered(),
        }
    }

    /// User-initiated finalize. `None` if the attempt was already sealed.
    pub fn finish(&mut self) -> Option<SubmissionRequest> {
        self.finalize(FinalizeTrigger::User)
    }

    /// Deliver one clock tick.
    pub fn tick(&mut self) -> TickOutcome {
        if self.status != AttemptStatus::InProgress {
            return TickOutcome::Ignored;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return TickOutcome::Running(self.remaining_seconds);
        }
        match self.finalize(FinalizeTrigger::Timeout) {
            Some(request) => TickOutcome::Expired(request),
            None => TickOutcome::Ignored,
        }
    }

    /// Apply the submitter's answer for this attempt.
    ///
    /// Returns `false` if the outcome was dropped: it belongs to another
    /// attempt or no submission is in flight.
    pub fn apply_outcome(&mut self, outcome: SubmissionOutcome) -> bool {
        if outcome.attempt_id != self.id || self.status != AttemptStatus::Submitting {
            return false;
        }
        match outcome.result {
            Ok(result) => {
                log::info!(
                    "attempt {}: completed with {}/{} ({}%)",
                    self.id,
                    result.raw_score,
                    result.total_questions,
                    result.percentage
                );
                self.result = Some(result);
                self.last_error = None;
                self.status = AttemptStatus::Completed;
            }
            Err(message) => {
                log::warn!("attempt {}: submission failed: {}", self.id, message);
                self.last_error = Some(message);
                self.status = AttemptStatus::SubmissionFailed;
            }
        }
        true
    }

    /// Re-enter `Submitting` after a failure with the same sealed answers.
    pub fn retry_submit(&mut self) -> Option<SubmissionRequest> {
        if self.status != AttemptStatus::SubmissionFailed {
            return None;
        }
        log::info!("attempt {}: retrying submission", self.id);
        self.status = AttemptStatus::Submitting;
        Some(self.request())
    }

    fn commit(&mut self) {
        if let Some(slot) = self.answers.get_mut(self.position) {
            *slot = self.pending_selection;
        }
    }

    /// The single check-and-set into `Submitting`.
    fn finalize(&mut self, trigger: FinalizeTrigger) -> Option<SubmissionRequest> {
        if self.status != AttemptStatus::InProgress {
            return None;
        }
        self.status = AttemptStatus::Submitting;
        self.trigger = Some(trigger);
        self.commit();
        self.seal();
        log::info!(
            "attempt {}: finalized by {:?} with {}/{} answered",
            self.id,
            trigger,
            self.answered_count(),
            self.total_questions()
        );
        Some(self.request())
    }

    /// Every slot ends up as a valid option index or `Unanswered`.
    fn seal(&mut self) {
        for (answer, question) in self.answers.iter_mut().zip(&self.question_set.questions) {
            if let Answer::Selected(index) = *answer {
                if index >= question.options.len() {
                    *answer = Answer::Unanswered;
                }
            }
        }
    }

    fn request(&self) -> SubmissionRequest {
        SubmissionRequest {
            attempt_id: self.id,
            quiz_id: self.question_set.id.clone(),
            answers: self.answers.clone(),
        }
    }
}
