mod catalog;
mod quiz;
mod result;

use ratatui::{prelude::*, widgets::Block, widgets::Paragraph};

use crate::app::{App, Screen};
use crate::attempt::Clock;

pub fn render<C: Clock>(frame: &mut Frame, app: &App<C>) {
    let area = frame.area();
    frame.render_widget(Block::default().bg(Color::Reset), area);

    match &app.screen {
        Screen::Catalog => catalog::render(frame, area, app),
        Screen::Loading(message) => render_loading(frame, area, message),
        Screen::Attempt => quiz::render(frame, area, app),
        Screen::Result => result::render(frame, area, app),
    }
}

fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let chunks = Layout::vertical([
        Constraint::Percentage(45),
        Constraint::Length(1),
        Constraint::Percentage(45),
    ])
    .split(area);

    let widget = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .fg(Color::Yellow);
    frame.render_widget(widget, chunks[1]);
}
