//! Cooperative event loop: terminal input, countdown ticks and submission
//! outcomes are all handled on one task.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures_util::{Stream, StreamExt};

use crate::app::{App, Screen};
use crate::attempt::{AttemptController, AttemptEvent, Clock, IntervalClock, Submitter};
use crate::data::Catalog;
use crate::models::QuestionSet;
use crate::terminal::AppTerminal;
use crate::ui;
use crate::QuizError;

/// Builds the submitter used for one quiz.
pub type SubmitterFactory = Box<dyn Fn(&QuestionSet) -> Arc<dyn Submitter>>;

/// What the loop must do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    LoadCatalog,
    StartQuiz(String),
}

#[derive(Debug)]
enum Step {
    Terminal(Option<io::Result<Event>>),
    Attempt(AttemptEvent),
}

pub struct Runtime {
    catalog: Arc<dyn Catalog>,
    submitters: SubmitterFactory,
    tick_interval: Duration,
}

impl Runtime {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        submitters: SubmitterFactory,
        tick_interval: Duration,
    ) -> Self {
        Self {
            catalog,
            submitters,
            tick_interval,
        }
    }

    /// Drive the terminal until the user quits.
    pub async fn run(
        &self,
        terminal: &mut AppTerminal,
        app: &mut App,
        initial_quiz: Option<String>,
    ) -> Result<(), QuizError> {
        self.perform(terminal, app, Action::LoadCatalog).await?;
        if let Some(quiz_id) = initial_quiz {
            self.perform(terminal, app, Action::StartQuiz(quiz_id)).await?;
        }

        let mut events = EventStream::new();
        loop {
            terminal.draw(|frame| ui::render(frame, app))?;

            let step = next_step(&mut events, app).await;

            let action = match step {
                Step::Attempt(event) => {
                    app.handle_attempt_event(event);
                    Action::None
                }
                Step::Terminal(Some(Ok(Event::Key(key)))) if key.kind == KeyEventKind::Press => {
                    handle_key(app, key)
                }
                Step::Terminal(Some(Ok(_))) => Action::None,
                Step::Terminal(Some(Err(err))) => return Err(err.into()),
                Step::Terminal(None) => Action::Quit,
            };

            if action == Action::Quit {
                app.leave_attempt();
                return Ok(());
            }
            self.perform(terminal, app, action).await?;
        }
    }

    async fn perform(
        &self,
        terminal: &mut AppTerminal,
        app: &mut App,
        action: Action,
    ) -> Result<(), QuizError> {
        match action {
            Action::None | Action::Quit => {}
            Action::LoadCatalog => {
                app.show_loading("Loading quizzes...");
                terminal.draw(|frame| ui::render(frame, app))?;
                self.load_catalog(app).await;
            }
            Action::StartQuiz(quiz_id) => {
                app.show_loading("Loading quiz...");
                terminal.draw(|frame| ui::render(frame, app))?;
                self.start_quiz(app, &quiz_id).await;
            }
        }
        Ok(())
    }

    pub async fn load_catalog(&self, app: &mut App) {
        match self.catalog.list_quizzes().await {
            Ok(quizzes) => {
                log::info!("loaded {} quizzes", quizzes.len());
                app.set_quizzes(quizzes);
            }
            Err(err) => {
                log::warn!("failed to load quizzes: {}", err);
                app.set_catalog_error(err.to_string());
            }
        }
    }

    /// Fetch a fresh copy of the quiz and start an attempt on it.
    pub async fn start_quiz(&self, app: &mut App, quiz_id: &str) {
        match self.catalog.fetch_quiz(quiz_id).await {
            Ok(question_set) => {
                let submitter = (self.submitters)(&question_set);
                let question_set = Arc::new(question_set);
                let clock = IntervalClock::new(self.tick_interval);
                app.begin_attempt(AttemptController::new(question_set, clock, submitter));
            }
            Err(err) => {
                log::warn!("failed to load quiz {}: {}", quiz_id, err);
                app.set_catalog_error(err.to_string());
            }
        }
    }
}

/// Wait for the next input or attempt event. Attempt events win ties so a
/// countdown reaching zero is applied before a key press of the same turn.
async fn next_step<S, C>(events: &mut S, app: &mut App<C>) -> Step
where
    S: Stream<Item = io::Result<Event>> + Unpin,
    C: Clock,
{
    tokio::select! {
        biased;
        event = app.next_attempt_event() => Step::Attempt(event),
        event = events.next() => Step::Terminal(event),
    }
}

pub fn handle_key<C: Clock>(app: &mut App<C>, key: KeyEvent) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }
    match app.screen {
        Screen::Catalog => handle_catalog_key(app, key.code),
        Screen::Loading(_) => Action::None,
        Screen::Attempt => handle_attempt_key(app, key.code),
        Screen::Result => handle_result_key(app, key.code),
    }
}

fn handle_catalog_key<C: Clock>(app: &mut App<C>, key: KeyCode) -> Action {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.select_next_quiz(),
        KeyCode::Up | KeyCode::Char('k') => app.select_previous_quiz(),
        KeyCode::Enter => {
            if let Some(quiz) = app.selected_quiz() {
                return Action::StartQuiz(quiz.id.clone());
            }
        }
        KeyCode::Char('r') | KeyCode::Char('R') => return Action::LoadCatalog,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Action::Quit,
        _ => {}
    }
    Action::None
}

fn handle_attempt_key<C: Clock>(app: &mut App<C>, key: KeyCode) -> Action {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(true),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(false),
        KeyCode::Char(c @ '1'..='9') => {
            if let Some(digit) = c.to_digit(10) {
                app.select_option(digit as usize - 1);
            }
        }
        KeyCode::Right | KeyCode::Char('l') => app.next_question(),
        KeyCode::Left | KeyCode::Char('h') => app.previous_question(),
        KeyCode::Enter | KeyCode::Char(' ') => app.confirm(),
        KeyCode::Char('f') | KeyCode::Char('F') => app.finish(),
        KeyCode::Char('r') | KeyCode::Char('R') => app.retry_submission(),
        KeyCode::Esc => app.request_leave(),
        _ => {}
    }
    Action::None
}

fn handle_result_key<C: Clock>(app: &mut App<C>, key: KeyCode) -> Action {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.scroll_results_down(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_results_up(),
        KeyCode::Enter | KeyCode::Esc => {
            app.leave_attempt();
            return Action::LoadCatalog;
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => return Action::Quit,
        _ => {}
    }
    Action::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attempt::{
        AttemptStatus, FinalizeTrigger, FinishPolicy, ManualClock, ScriptedSubmitter,
    };
    use crate::data::FileCatalog;
    use crate::models::{Answer, Question};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn quiz() -> QuestionSet {
        QuestionSet {
            id: "q1".into(),
            title: "Ownership".into(),
            description: None,
            course_name: None,
            questions: vec![
                Question {
                    prompt: "first".into(),
                    options: vec!["a".into(), "b".into()],
                    explanation: None,
                },
                Question {
                    prompt: "second".into(),
                    options: vec!["a".into(), "b".into()],
                    explanation: None,
                },
            ],
            duration_seconds: 60,
            attempts_allowed: 3,
            passing_percentage: 70,
        }
    }

    fn attempt_app() -> App<ManualClock> {
        let mut app = App::new(FinishPolicy::RequireSelection);
        app.set_quizzes(vec![quiz()]);
        let set = app.selected_quiz().unwrap();
        let submitter = Arc::new(ScriptedSubmitter::grading(vec![0, 1], 70));
        app.begin_attempt(AttemptController::new(set, ManualClock::new(), submitter));
        app
    }

    #[test]
    fn test_catalog_keys() {
        let mut app: App<ManualClock> = App::new(FinishPolicy::default());
        assert_eq!(handle_key(&mut app, press(KeyCode::Enter)), Action::None);
        app.set_quizzes(vec![quiz()]);
        assert_eq!(
            handle_key(&mut app, press(KeyCode::Enter)),
            Action::StartQuiz("q1".into())
        );
        assert_eq!(handle_key(&mut app, press(KeyCode::Char('r'))), Action::LoadCatalog);
        assert_eq!(handle_key(&mut app, press(KeyCode::Char('q'))), Action::Quit);
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let mut app = attempt_app();
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key(&mut app, key), Action::Quit);
    }

    #[test]
    fn test_attempt_keys() {
        let mut app = attempt_app();
        handle_key(&mut app, press(KeyCode::Char('2')));
        handle_key(&mut app, press(KeyCode::Char('l')));
        handle_key(&mut app, press(KeyCode::Down));
        handle_key(&mut app, press(KeyCode::Char('h')));

        let session = app.attempt().unwrap().session();
        assert_eq!(session.position(), 0);
        assert_eq!(session.pending_selection(), Answer::Selected(1));
        assert_eq!(session.answers(), &[Answer::Selected(1), Answer::Selected(0)]);

        // digits past the option list are ignored
        handle_key(&mut app, press(KeyCode::Char('9')));
        assert_eq!(
            app.attempt().unwrap().session().pending_selection(),
            Answer::Selected(1)
        );
    }

    #[test]
    fn test_escape_twice_discards_attempt() {
        let mut app = attempt_app();
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.status(), Some(AttemptStatus::InProgress));
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.screen, Screen::Catalog);
        assert!(app.attempt().is_none());
    }

    #[test]
    fn test_keys_ignored_while_loading() {
        let mut app: App<ManualClock> = App::new(FinishPolicy::default());
        app.show_loading("Loading quizzes...");
        assert_eq!(handle_key(&mut app, press(KeyCode::Char('q'))), Action::None);
    }

    const CATALOG: &str = r#"[
        {
            "id": "q1",
            "title": "Ownership",
            "duration": 1,
            "questions": [
                {"question": "first", "options": ["a", "b"]},
                {"question": "second", "options": ["a", "b"]}
            ]
        }
    ]"#;

    fn runtime(file: &NamedTempFile, submitter: Arc<ScriptedSubmitter>) -> Runtime {
        Runtime::new(
            Arc::new(FileCatalog::new(file.path())),
            Box::new(move |_: &QuestionSet| submitter.clone() as Arc<dyn Submitter>),
            Duration::from_millis(5),
        )
    }

    #[tokio::test]
    async fn test_expiry_tick_wins_over_key_press() {
        let mut app = attempt_app();
        let ticks = app.attempt().unwrap().session().remaining_seconds();
        app.attempt_mut().unwrap().clock_mut().advance(ticks);
        let mut keys = futures_util::stream::iter(vec![Ok(Event::Key(press(KeyCode::Char('1'))))]);

        for _ in 0..ticks {
            let step = next_step(&mut keys, &mut app).await;
            let Step::Attempt(event) = step else {
                panic!("expected a clock tick, got {step:?}");
            };
            app.handle_attempt_event(event);
        }
        assert_eq!(app.status(), Some(AttemptStatus::Submitting));
        assert_eq!(
            app.attempt().unwrap().session().finalize_trigger(),
            Some(FinalizeTrigger::Timeout)
        );

        let step = next_step(&mut keys, &mut app).await;
        assert!(matches!(step, Step::Terminal(Some(Ok(Event::Key(_))))));
    }

    #[tokio::test]
    async fn test_load_and_start_quiz() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();
        let submitter = Arc::new(ScriptedSubmitter::grading(vec![0, 1], 70));
        let runtime = runtime(&file, submitter.clone());

        let mut app = App::new(FinishPolicy::RequireSelection);
        runtime.load_catalog(&mut app).await;
        assert_eq!(app.quizzes().len(), 1);

        runtime.start_quiz(&mut app, "q1").await;
        assert_eq!(app.screen, Screen::Attempt);
        let session = app.attempt().unwrap().session();
        assert_eq!(session.remaining_seconds(), 60);
        assert_eq!(session.status(), AttemptStatus::InProgress);

        app.select_option(0);
        app.confirm();
        app.select_option(1);
        app.confirm();
        while app.screen != Screen::Result {
            let event = app.next_attempt_event().await;
            app.handle_attempt_event(event);
        }
        assert_eq!(submitter.call_count(), 1);
        let result = *app.attempt().unwrap().session().result().unwrap();
        assert_eq!(result.percentage, 100);
        assert!(result.passed);
    }

    #[tokio::test]
    async fn test_unknown_quiz_shows_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();
        let runtime = runtime(&file, Arc::new(ScriptedSubmitter::grading(vec![], 70)));

        let mut app = App::new(FinishPolicy::RequireSelection);
        runtime.start_quiz(&mut app, "missing").await;
        assert_eq!(app.screen, Screen::Catalog);
        assert!(app.attempt().is_none());
        assert!(app.catalog_error().unwrap().contains("missing"));
    }
}
