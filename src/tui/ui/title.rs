use ratatui::{prelude::*, widgets::*};
use unicode_width::UnicodeWidthStr;

use crate::{i18n::lang, tui::app::App};

pub fn render_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new(lang().title.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD));
    f.render_widget(title, area);
}

/// Two clickable buttons; their rects are recorded for mouse hit tests.
pub fn render_toolbar(f: &mut Frame, area: Rect, app: &mut App) {
    let toggle_label = if app.is_monitoring() {
        format!(" [s] {} ", lang().stop_monitoring)
    } else {
        format!(" [s] {} ", lang().start_monitoring)
    };
    let config_label = format!(" [c] {} ", lang().open_config);

    // Display width, not byte length, so CJK labels hit-test correctly
    let toggle_w = UnicodeWidthStr::width(toggle_label.as_str()) as u16;
    let config_w = UnicodeWidthStr::width(config_label.as_str()) as u16;

    let toggle_rect = Rect {
        x: area.x + 1,
        y: area.y,
        width: toggle_w.min(area.width.saturating_sub(1)),
        height: 1,
    };
    let config_x = toggle_rect.x + toggle_rect.width + 1;
    let config_rect = Rect {
        x: config_x.min(area.x + area.width),
        y: area.y,
        width: config_w.min((area.x + area.width).saturating_sub(config_x)),
        height: 1,
    };

    let button = Style::default().bg(Color::Gray).fg(Color::Black);
    let toggle_style = if app.is_monitoring() {
        button.bg(Color::LightRed)
    } else {
        button.bg(Color::LightGreen)
    };
    f.render_widget(Paragraph::new(toggle_label).style(toggle_style), toggle_rect);
    f.render_widget(Paragraph::new(config_label).style(button), config_rect);

    app.layout.toggle_button = toggle_rect;
    app.layout.config_button = config_rect;
}

pub fn render_info(f: &mut Frame, area: Rect) {
    let info = Paragraph::new(lang().info_line.as_str())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(info, area);
}
