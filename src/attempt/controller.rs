//! Wires a session to its clock and submitter.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use super::clock::Clock;
use super::session::{
    AttemptSession, AttemptStatus, FinishPolicy, StartOutcome, SubmissionOutcome,
    SubmissionRequest, TickOutcome,
};
use super::submitter::Submitter;
use crate::models::QuestionSet;

/// An explicit finish was refused by the finish policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("select an answer before finishing the quiz")]
pub struct FinishBlocked;

/// Something the controller has to react to.
#[derive(Debug)]
pub enum AttemptEvent {
    Tick,
    Outcome(SubmissionOutcome),
}

/// Owns one attempt: the session, its countdown and the outcome channel.
///
/// Dropping the controller discards the attempt. A submission already in
/// flight still runs to completion, but its outcome has nowhere to go and is
/// dropped.
pub struct AttemptController<C: Clock> {
    session: AttemptSession,
    clock: C,
    submitter: Arc<dyn Submitter>,
    outcome_tx: mpsc::UnboundedSender<SubmissionOutcome>,
    outcome_rx: mpsc::UnboundedReceiver<SubmissionOutcome>,
    dispatched: u32,
}

impl<C: Clock> AttemptController<C> {
    pub fn new(question_set: Arc<QuestionSet>, clock: C, submitter: Arc<dyn Submitter>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            session: AttemptSession::new(question_set),
            clock,
            submitter,
            outcome_tx,
            outcome_rx,
            dispatched: 0,
        }
    }

    pub fn session(&self) -> &AttemptSession {
        &self.session
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Number of submitter calls issued for this attempt.
    pub fn submissions_dispatched(&self) -> u32 {
        self.dispatched
    }

    pub fn start(&mut self) -> StartOutcome {
        let outcome = self.session.start();
        match &outcome {
            StartOutcome::Running => self.clock.start(),
            StartOutcome::Expired(request) => self.dispatch(request.clone()),
            StartOutcome::Completed(_) | StartOutcome::Ignored => {}
        }
        self.sync_clock();
        outcome
    }

    pub fn select_option(&mut self, index: usize) -> bool {
        self.session.select_option(index)
    }

    pub fn navigate(&mut self, target: usize) -> bool {
        self.session.navigate(target)
    }

    pub fn next(&mut self) -> bool {
        self.session.next()
    }

    pub fn previous(&mut self) -> bool {
        self.session.previous()
    }

    /// User-initiated finish.
    ///
    /// `Ok(false)` means the attempt was already sealed and nothing happened.
    pub fn finish(&mut self, policy: FinishPolicy) -> Result<bool, FinishBlocked> {
        if self.session.status() != AttemptStatus::InProgress {
            return Ok(false);
        }
        if !self.session.finish_allowed(policy) {
            return Err(FinishBlocked);
        }
        let Some(request) = self.session.finish() else {
            return Ok(false);
        };
        self.dispatch(request);
        Ok(true)
    }

    pub fn on_tick(&mut self) -> TickOutcome {
        let outcome = self.session.tick();
        if let TickOutcome::Expired(request) = &outcome {
            self.dispatch(request.clone());
        }
        self.sync_clock();
        outcome
    }

    /// Resubmit the sealed answers after a failure.
    pub fn retry(&mut self) -> bool {
        match self.session.retry_submit() {
            Some(request) => {
                self.dispatch(request);
                true
            }
            None => false,
        }
    }

    pub fn apply_outcome(&mut self, outcome: SubmissionOutcome) -> bool {
        let attempt_id = outcome.attempt_id;
        let applied = self.session.apply_outcome(outcome);
        if !applied {
            log::debug!(
                "attempt {}: dropped outcome for {} in status {:?}",
                self.session.attempt_id(),
                attempt_id,
                self.session.status()
            );
        }
        applied
    }

    /// Wait for the next clock tick or submission outcome.
    pub async fn next_event(&mut self) -> AttemptEvent {
        tokio::select! {
            () = self.clock.tick() => AttemptEvent::Tick,
            Some(outcome) = self.outcome_rx.recv() => AttemptEvent::Outcome(outcome),
        }
    }

    pub fn handle(&mut self, event: AttemptEvent) {
        match event {
            AttemptEvent::Tick => {
                self.on_tick();
            }
            AttemptEvent::Outcome(outcome) => {
                self.apply_outcome(outcome);
            }
        }
    }

    /// Wait for the in-flight submission and apply its outcome.
    pub async fn wait_for_outcome(&mut self) -> bool {
        match self.outcome_rx.recv().await {
            Some(outcome) => self.apply_outcome(outcome),
            None => false,
        }
    }

    /// Discard the attempt without submitting anything.
    pub fn leave(mut self) {
        self.clock.stop();
        log::info!(
            "attempt {}: left in status {:?}",
            self.session.attempt_id(),
            self.session.status()
        );
    }

    fn sync_clock(&mut self) {
        if self.session.status() != AttemptStatus::InProgress && self.clock.is_running() {
            self.clock.stop();
        }
    }

    fn dispatch(&mut self, request: SubmissionRequest) {
        self.clock.stop();
        self.dispatched += 1;

        let submitter = Arc::clone(&self.submitter);
        let outcome_tx = self.outcome_tx.clone();
        log::info!(
            "attempt {}: submitting {} answers for quiz {}",
            request.attempt_id,
            request.answers.len(),
            request.quiz_id
        );

        tokio::spawn(async move {
            let result = submitter
                .submit(&request.quiz_id, &request.answers)
                .await
                .map_err(|err| err.to_string());
            let outcome = SubmissionOutcome {
                attempt_id: request.attempt_id,
                result,
            };
            if outcome_tx.send(outcome).is_err() {
                log::debug!(
                    "attempt {} was discarded; dropping its outcome",
                    request.attempt_id
                );
            }
        });
    }
}
