//! Timed quiz attempt engine.
//!
//! [`AttemptSession`] is the state machine, [`Clock`] drives its countdown,
//! [`Submitter`] scores a sealed attempt and [`AttemptController`] ties the
//! three together on a single event loop.

mod clock;
mod controller;
mod session;
mod submitter;

pub use clock::{Clock, IntervalClock, ManualClock, TICK_INTERVAL};
pub use controller::{AttemptController, AttemptEvent, FinishBlocked};
pub use session::{
    AttemptId, AttemptSession, AttemptStatus, FinalizeTrigger, FinishPolicy, StartOutcome,
    SubmissionOutcome, SubmissionRequest, TickOutcome,
};
pub use submitter::{ScriptedSubmitter, SubmitError, Submitter};
