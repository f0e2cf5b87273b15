use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::attempt::Clock;
use crate::models::QuestionSet;

pub fn render<C: Clock>(frame: &mut Frame, area: Rect, app: &App<C>) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    render_header(frame, chunks[0]);

    if let Some(error) = app.catalog_error() {
        render_error(frame, chunks[1], error);
    } else if app.quizzes().is_empty() {
        render_empty(frame, chunks[1]);
    } else {
        render_list(frame, chunks[1], app);
    }

    render_controls(frame, chunks[2]);
}

fn render_header(frame: &mut Frame, area: Rect) {
    let content = vec![
        Line::from(Span::styled(
            "KNOWLEDGE QUIZ",
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from("Test your knowledge and track your progress".fg(Color::DarkGray)),
    ];
    frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), area);
}

fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Could not load quizzes",
            Style::default().fg(Color::Red).bold(),
        )),
        Line::from(""),
        Line::from(error.fg(Color::Gray)),
        Line::from(""),
        Line::from("Press [R] to try again".fg(Color::DarkGray)),
    ];
    let widget = Paragraph::new(content)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(widget, area);
}

fn render_empty(frame: &mut Frame, area: Rect) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No Quizzes Available",
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::from(""),
        Line::from("Enroll in courses to take quizzes.".fg(Color::DarkGray)),
    ];
    frame.render_widget(Paragraph::new(content).alignment(Alignment::Center), area);
}

fn render_list<C: Clock>(frame: &mut Frame, area: Rect, app: &App<C>) {
    let selected = app.selected_quiz_index();
    let mut lines: Vec<Line> = Vec::with_capacity(app.quizzes().len() * 3);

    for (index, quiz) in app.quizzes().iter().enumerate() {
        let is_selected = index == selected;
        let style = if is_selected {
            Style::default().fg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::White)
        };
        let marker = if is_selected { ">" } else { " " };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(quiz.title.as_str(), style),
        ]));
        lines.push(Line::from(Span::styled(
            format!("   {}", summary(quiz)),
            Style::default().fg(Color::DarkGray),
        )));
        if let Some(description) = quiz.description.as_deref().filter(|d| !d.is_empty()) {
            lines.push(Line::from(Span::styled(
                format!("   {}", description),
                Style::default().fg(Color::Gray).italic(),
            )));
        }
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Color::DarkGray)
            .title(" Quizzes ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn summary(quiz: &QuestionSet) -> String {
    let mut parts = Vec::with_capacity(5);
    if let Some(course) = &quiz.course_name {
        parts.push(course.clone());
    }
    parts.push(format!("{} questions", quiz.total_questions()));
    parts.push(format!("{} min", quiz.duration_seconds / 60));
    parts.push(format!("pass {}%", quiz.passing_percentage));
    parts.push(format!("{} attempts", quiz.attempts_allowed));
    parts.join("  ·  ")
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k choose  ·  enter start  ·  r refresh  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}
