use ratatui::{
    prelude::*,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{
    i18n::lang,
    tui::app::{App, LineKind},
};

/// Background for ports that appeared with the latest change.
const NEW_PORT_BG: Color = Color::Rgb(0xe6, 0xff, 0xe6);

pub fn render_ports(f: &mut Frame, area: Rect, app: &mut App) {
    let block = Block::default().borders(Borders::ALL).title(Line::from(vec![
        Span::raw(" "),
        Span::raw(lang().ports_title.as_str()),
        Span::raw(" "),
    ]));
    let inner = block.inner(area);
    app.layout.list_inner = inner;

    let display = app.display_lines();
    app.adjust_scroll(display.len(), inner.height as usize);

    let lines: Vec<Line> = display
        .into_iter()
        .skip(app.scroll)
        .take(inner.height as usize)
        .map(|l| match l.kind {
            LineKind::Timestamp => Line::styled(l.text, Style::default().fg(Color::Gray)),
            LineKind::Separator => Line::raw(l.text),
            LineKind::Placeholder => {
                Line::styled(l.text, Style::default().add_modifier(Modifier::ITALIC))
            }
            LineKind::Port { index, is_new } => {
                let mut style = Style::default().add_modifier(Modifier::UNDERLINED);
                if is_new {
                    style = style.bg(NEW_PORT_BG).fg(Color::Black);
                }
                if index == app.selected {
                    style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
                }
                Line::styled(l.text, style)
            }
        })
        .collect();

    f.render_widget(Paragraph::new(lines).block(block), area);
}
