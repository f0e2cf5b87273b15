use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph},
};

use crate::app::App;
use crate::attempt::{AttemptSession, Clock, FinalizeTrigger};
use crate::models::Answer;
use crate::presenter::{present, Band, Banner};

const QUESTION_PREVIEW_LENGTH: usize = 55;

pub fn render<C: Clock>(frame: &mut Frame, area: Rect, app: &App<C>) {
    let Some(controller) = app.attempt() else {
        return;
    };
    let session = controller.session();
    let Some(result) = session.result() else {
        return;
    };
    let view = present(result, session.question_set().passing_percentage);

    let chunks = Layout::vertical([
        Constraint::Length(10),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .margin(1)
    .split(area);

    let band_color = band_color(view.band);
    let banner_color = match view.banner {
        Banner::Passed => Color::Green,
        Banner::Failed => Color::Yellow,
    };

    let mut content = vec![
        Line::from(Span::styled(
            session.question_set().title.as_str(),
            Style::default().fg(Color::Cyan).bold(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            view.band.label(),
            Style::default().fg(band_color).bold(),
        )),
        Line::from(Span::styled(
            view.percentage_label.as_str(),
            Style::default().fg(band_color).bold(),
        )),
        Line::from(view.score_line.as_str().fg(Color::Gray)),
        Line::from(Span::styled(
            view.banner.text(),
            Style::default().fg(banner_color),
        )),
        Line::from(view.threshold_line.as_str().fg(Color::DarkGray)),
    ];
    if session.finalize_trigger() == Some(FinalizeTrigger::Timeout) {
        content.push(Line::from("Time ran out".fg(Color::Red)));
    }

    let summary = Paragraph::new(content).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Color::DarkGray),
    );
    frame.render_widget(summary, chunks[0]);

    render_answer_review(frame, chunks[1], session, app.result_scroll());
    render_controls(frame, chunks[2]);
}

fn band_color(band: Band) -> Color {
    match band {
        Band::Excellent => Color::Green,
        Band::Good => Color::Cyan,
        Band::KeepPracticing => Color::Yellow,
        Band::NeedsReview => Color::Red,
    }
}

fn render_answer_review(frame: &mut Frame, area: Rect, session: &AttemptSession, scroll: usize) {
    let mut lines: Vec<Line> = Vec::new();

    for (index, (answer, question)) in session
        .answers()
        .iter()
        .zip(session.question_set().questions.iter())
        .enumerate()
        .skip(scroll)
    {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:2}. ", index + 1),
                Style::default().fg(Color::DarkGray),
            ),
            Span::styled(truncate_question(&question.prompt), Style::default().fg(Color::Gray)),
        ]));

        let chosen = match answer {
            Answer::Selected(i) => question
                .options
                .get(*i)
                .map_or_else(|| format!("option {}", i + 1), Clone::clone),
            Answer::Unanswered => "no answer".to_string(),
        };
        let chosen_color = if answer.is_answered() {
            Color::White
        } else {
            Color::Red
        };
        lines.push(Line::from(Span::styled(
            format!("    {}", chosen),
            Style::default().fg(chosen_color),
        )));

        if let Some(explanation) = &question.explanation {
            lines.push(Line::from(Span::styled(
                format!("    {}", explanation),
                Style::default().fg(Color::DarkGray).italic(),
            )));
        }
    }

    let widget = Paragraph::new(lines).block(Block::default().padding(Padding::horizontal(1)));
    frame.render_widget(widget, area);
}

fn truncate_question(text: &str) -> String {
    if text.chars().count() > QUESTION_PREVIEW_LENGTH {
        let truncated: String = text.chars().take(QUESTION_PREVIEW_LENGTH).collect();
        format!("{}...", truncated)
    } else {
        text.to_string()
    }
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let widget = Paragraph::new("j/k scroll  ·  enter back to quizzes  ·  q quit")
        .alignment(Alignment::Center)
        .fg(Color::DarkGray);
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_question() {
        assert_eq!(truncate_question("short"), "short");
        let long = "x".repeat(QUESTION_PREVIEW_LENGTH + 5);
        let truncated = truncate_question(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), QUESTION_PREVIEW_LENGTH + 3);
    }
}
