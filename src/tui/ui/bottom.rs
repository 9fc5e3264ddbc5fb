use ratatui::{prelude::*, widgets::*};

use crate::{
    i18n::{fill, lang},
    tui::{app::App, input::Mode},
};

pub fn render_count(f: &mut Frame, area: Rect, app: &App) {
    let text = fill(&lang().device_count, "count", app.ports.len());
    f.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
}

pub fn render_status(f: &mut Frame, area: Rect, app: &App) {
    let (text, style) = if app.is_monitoring() {
        (&lang().status_monitoring, Style::default().fg(Color::Green))
    } else {
        (&lang().status_idle, Style::default().fg(Color::DarkGray))
    };
    f.render_widget(
        Paragraph::new(text.as_str())
            .alignment(Alignment::Center)
            .style(style),
        area,
    );
}

pub fn render_hints(f: &mut Frame, area: Rect, app: &App) {
    let hint = match app.mode() {
        Mode::Main => &lang().hint_main,
        Mode::Form => &lang().hint_config,
        Mode::Popup => &lang().hint_popup,
    };
    let help = Paragraph::new(hint.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().bg(Color::Gray).fg(Color::White));
    f.render_widget(help, area);
}
