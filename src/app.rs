use std::sync::Arc;

use crate::attempt::{
    AttemptController, AttemptEvent, AttemptStatus, Clock, FinishPolicy, IntervalClock,
    StartOutcome,
};
use crate::models::{Answer, QuestionSet};

/// Which screen the terminal shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Catalog,
    Loading(String),
    Attempt,
    Result,
}

/// Front-end state around at most one attempt.
pub struct App<C: Clock = IntervalClock> {
    pub screen: Screen,
    quizzes: Vec<Arc<QuestionSet>>,
    selected_quiz: usize,
    catalog_error: Option<String>,
    attempt: Option<AttemptController<C>>,
    notice: Option<String>,
    leave_armed: bool,
    finish_policy: FinishPolicy,
    result_scroll: usize,
}

impl<C: Clock> App<C> {
    pub fn new(finish_policy: FinishPolicy) -> Self {
        Self {
            screen: Screen::Catalog,
            quizzes: Vec::new(),
            selected_quiz: 0,
            catalog_error: None,
            attempt: None,
            notice: None,
            leave_armed: false,
            finish_policy,
            result_scroll: 0,
        }
    }

    pub fn quizzes(&self) -> &[Arc<QuestionSet>] {
        &self.quizzes
    }

    pub fn selected_quiz_index(&self) -> usize {
        self.selected_quiz
    }

    pub fn selected_quiz(&self) -> Option<Arc<QuestionSet>> {
        self.quizzes.get(self.selected_quiz).cloned()
    }

    pub fn catalog_error(&self) -> Option<&str> {
        self.catalog_error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn finish_policy(&self) -> FinishPolicy {
        self.finish_policy
    }

    pub fn leave_armed(&self) -> bool {
        self.leave_armed
    }

    pub fn result_scroll(&self) -> usize {
        self.result_scroll
    }

    pub fn scroll_results_down(&mut self) {
        let total = self
            .attempt
            .as_ref()
            .map_or(0, |a| a.session().total_questions());
        if self.result_scroll + 1 < total {
            self.result_scroll += 1;
        }
    }

    pub fn scroll_results_up(&mut self) {
        self.result_scroll = self.result_scroll.saturating_sub(1);
    }

    pub fn attempt(&self) -> Option<&AttemptController<C>> {
        self.attempt.as_ref()
    }

    pub fn attempt_mut(&mut self) -> Option<&mut AttemptController<C>> {
        self.attempt.as_mut()
    }

    pub fn show_loading(&mut self, message: impl Into<String>) {
        self.screen = Screen::Loading(message.into());
    }

    pub fn set_quizzes(&mut self, quizzes: Vec<QuestionSet>) {
        self.quizzes = quizzes.into_iter().map(Arc::new).collect();
        self.selected_quiz = 0;
        self.catalog_error = None;
        self.screen = Screen::Catalog;
    }

    /// Show a load failure on the catalog screen.
    pub fn set_catalog_error(&mut self, message: impl Into<String>) {
        self.catalog_error = Some(message.into());
        self.screen = Screen::Catalog;
    }

    pub fn select_next_quiz(&mut self) {
        if !self.quizzes.is_empty() {
            self.selected_quiz = (self.selected_quiz + 1) % self.quizzes.len();
        }
    }

    pub fn select_previous_quiz(&mut self) {
        if !self.quizzes.is_empty() {
            let len = self.quizzes.len();
            self.selected_quiz = (self.selected_quiz + len - 1) % len;
        }
    }

    /// Take ownership of a fresh controller and start its attempt.
    pub fn begin_attempt(&mut self, mut controller: AttemptController<C>) {
        if let Some(previous) = self.attempt.take() {
            previous.leave();
        }
        let outcome = controller.start();
        log::info!(
            "started quiz {:?}: {:?}",
            controller.session().question_set().title,
            outcome
        );
        self.attempt = Some(controller);
        self.notice = None;
        self.leave_armed = false;
        self.result_scroll = 0;
        self.screen = match outcome {
            StartOutcome::Completed(_) => Screen::Result,
            _ => Screen::Attempt,
        };
    }

    /// Discard the attempt. Never submits.
    pub fn leave_attempt(&mut self) {
        if let Some(controller) = self.attempt.take() {
            controller.leave();
        }
        self.notice = None;
        self.leave_armed = false;
        self.screen = Screen::Catalog;
    }

    /// First press arms, second press leaves. A finished attempt leaves at once.
    pub fn request_leave(&mut self) {
        let in_progress = self
            .status()
            .is_some_and(|status| status == AttemptStatus::InProgress);
        if in_progress && !self.leave_armed {
            self.leave_armed = true;
            self.notice = Some("Press Esc again to discard this attempt".to_string());
            return;
        }
        self.leave_attempt();
    }

    pub fn status(&self) -> Option<AttemptStatus> {
        self.attempt.as_ref().map(|a| a.session().status())
    }

    /// Move the pending selection up or down the option list.
    pub fn move_selection(&mut self, down: bool) {
        let Some(controller) = self.attempt.as_mut() else {
            return;
        };
        let session = controller.session();
        let Some(options) = session.current_question().map(|q| q.options.len()) else {
            return;
        };
        if options == 0 {
            return;
        }
        let next = match (session.pending_selection(), down) {
            (Answer::Unanswered, true) => 0,
            (Answer::Unanswered, false) => options - 1,
            (Answer::Selected(i), true) => (i + 1) % options,
            (Answer::Selected(i), false) => (i + options - 1) % options,
        };
        self.select_option(next);
    }

    /// Select an option by index, ignoring indexes the question lacks.
    pub fn select_option(&mut self, index: usize) {
        let Some(controller) = self.attempt.as_mut() else {
            return;
        };
        let options = controller
            .session()
            .current_question()
            .map_or(0, |q| q.options.len());
        if index < options && controller.select_option(index) {
            self.clear_transient();
        }
    }

    pub fn next_question(&mut self) {
        if let Some(controller) = self.attempt.as_mut() {
            controller.next();
        }
        self.clear_transient();
    }

    pub fn previous_question(&mut self) {
        if let Some(controller) = self.attempt.as_mut() {
            controller.previous();
        }
        self.clear_transient();
    }

    /// Advance, or finish on the last question.
    pub fn confirm(&mut self) {
        let Some(controller) = self.attempt.as_ref() else {
            return;
        };
        let session = controller.session();
        if session.position() + 1 < session.total_questions() {
            self.next_question();
        } else {
            self.finish();
        }
    }

    pub fn finish(&mut self) {
        let policy = self.finish_policy;
        let Some(controller) = self.attempt.as_mut() else {
            return;
        };
        match controller.finish(policy) {
            Ok(_) => self.clear_transient(),
            Err(blocked) => self.notice = Some(blocked.to_string()),
        }
    }

    pub fn retry_submission(&mut self) {
        if let Some(controller) = self.attempt.as_mut() {
            if controller.retry() {
                self.notice = None;
            }
        }
    }

    /// Wait for the attempt's next tick or outcome. Pending forever without one.
    pub async fn next_attempt_event(&mut self) -> AttemptEvent {
        match self.attempt.as_mut() {
            Some(controller) => controller.next_event().await,
            None => std::future::pending().await,
        }
    }

    pub fn handle_attempt_event(&mut self, event: AttemptEvent) {
        if let Some(controller) = self.attempt.as_mut() {
            controller.handle(event);
        }
        if self.status() == Some(AttemptStatus::Completed) {
            self.leave_armed = false;
            self.notice = None;
            self.screen = Screen::Result;
        }
    }

    fn clear_transient(&mut self) {
        self.notice = None;
        self.leave_armed = false;
    }
}
