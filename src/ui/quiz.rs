use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::attempt::{AttemptSession, AttemptStatus, Clock};
use crate::models::Answer;
use crate::presenter::{format_remaining, is_time_low};

pub fn render<C: Clock>(frame: &mut Frame, area: Rect, app: &App<C>) {
    let Some(controller) = app.attempt() else {
        return;
    };
    let session = controller.session();
    let Some(question) = session.current_question() else {
        return;
    };

    let chunks = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Min(6),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .margin(1)
    .split(area);

    render_progress(frame, chunks[0], session);
    render_question_text(frame, chunks[1], &question.prompt);
    render_options(
        frame,
        chunks[2],
        &question.options,
        session.pending_selection(),
        session.is_read_only(),
    );
    render_status(frame, chunks[3], session, app.notice());
    render_controls(frame, chunks[4], session.status());
}

fn render_progress(frame: &mut Frame, area: Rect, session: &AttemptSession) {
    let halves = Layout::horizontal([Constraint::Fill(1), Constraint::Fill(1)]).split(area);

    let progress = format!(
        "Question {} of {}  ·  {} answered",
        session.position() + 1,
        session.total_questions(),
        session.answered_count()
    );
    frame.render_widget(Paragraph::new(progress).fg(Color::DarkGray), halves[0]);

    let remaining = session.remaining_seconds();
    let color = if is_time_low(remaining) {
        Color::Red
    } else {
        Color::Cyan
    };
    let timer = Paragraph::new(format_remaining(remaining))
        .alignment(Alignment::Right)
        .fg(color)
        .bold();
    frame.render_widget(timer, halves[1]);
}

fn render_question_text(frame: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(text)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White).bold())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(widget, area);
}

fn option_label(index: usize) -> char {
    u8::try_from(index)
        .ok()
        .filter(|i| *i < 26)
        .map_or('?', |i| char::from(b'A' + i))
}

fn render_options(
    frame: &mut Frame,
    area: Rect,
    options: &[String],
    pending: Answer,
    read_only: bool,
) {
    let mut lines: Vec<Line> = Vec::with_capacity(options.len() * 2);

    for (index, option) in options.iter().enumerate() {
        let is_selected = pending == Answer::Selected(index);
        let style = match (is_selected, read_only) {
            (true, false) => Style::default().fg(Color::Cyan).bold(),
            (true, true) => Style::default().fg(Color::Gray).bold(),
            (false, _) => Style::default().fg(Color::Gray),
        };
        let marker = if is_selected { ">" } else { " " };

        lines.push(Line::from(vec![
            Span::styled(format!(" {} ", marker), style),
            Span::styled(format!("{}. ", option_label(index)), style),
            Span::styled(option.as_str(), style),
        ]));
        lines.push(Line::from(""));
    }

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Options ")
            .title_style(Style::default().fg(Color::Cyan))
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(widget, area);
}

fn render_status(frame: &mut Frame, area: Rect, session: &AttemptSession, notice: Option<&str>) {
    let line = match session.status() {
        AttemptStatus::Submitting => Line::from("Submitting...".fg(Color::Yellow)),
        AttemptStatus::SubmissionFailed => {
            let reason = session.last_error().unwrap_or("unknown error");
            Line::from(
                format!("Submission failed: {}. Your answers are kept.", reason).fg(Color::Red),
            )
        }
        _ => match notice {
            Some(notice) => Line::from(notice.to_string().fg(Color::Yellow)),
            None => Line::from(""),
        },
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_controls(frame: &mut Frame, area: Rect, status: AttemptStatus) {
    let text = match status {
        AttemptStatus::SubmissionFailed => "r retry  ·  esc leave",
        AttemptStatus::Submitting => "waiting for results",
        _ => "j/k select  ·  h/l previous/next  ·  enter next  ·  f finish  ·  esc leave",
    };
    let widget = Paragraph::new(text)
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_labels() {
        assert_eq!(option_label(0), 'A');
        assert_eq!(option_label(3), 'D');
        assert_eq!(option_label(25), 'Z');
        assert_eq!(option_label(26), '?');
    }
}
