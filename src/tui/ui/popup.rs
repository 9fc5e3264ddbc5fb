use ratatui::{prelude::*, widgets::*};
use unicode_width::UnicodeWidthStr;

use super::centered_rect;
use crate::{i18n::lang, tui::app::Popup};

/// Modal notice or error box drawn over everything else.
pub fn render_popup(f: &mut Frame, area: Rect, popup: &Popup) {
    let (title, message, color) = match popup {
        Popup::Notice(msg) => (&lang().notice_title, msg, Color::Blue),
        Popup::Error(msg) => (&lang().error_title, msg, Color::Red),
    };

    let width = (UnicodeWidthStr::width(message.as_str()) as u16 + 4).clamp(24, 70);
    let rect = centered_rect(area, width, 5);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    let body = Paragraph::new(vec![
        Line::raw(message.as_str()),
        Line::styled(lang().hint_popup.as_str(), Style::default().fg(Color::DarkGray)),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(block);
    f.render_widget(body, rect);
}
