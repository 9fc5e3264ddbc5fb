mod bottom;
mod config_panel;
mod popup;
mod ports;
mod title;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    prelude::*,
};

use crate::tui::app::App;

/// Centralized renderer: toolbar, info line, port list, labels and overlays.
pub fn render_ui(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Length(1), // Toolbar
            Constraint::Length(2), // Info
            Constraint::Min(3),    // Port list
            Constraint::Length(1), // Device count
            Constraint::Length(1), // Status
            Constraint::Length(1), // Hints
        ])
        .split(area);

    title::render_title(f, main_chunks[0]);
    title::render_toolbar(f, main_chunks[1], app);
    title::render_info(f, main_chunks[2]);
    ports::render_ports(f, main_chunks[3], app);
    bottom::render_count(f, main_chunks[4], app);
    bottom::render_status(f, main_chunks[5], app);
    bottom::render_hints(f, main_chunks[6], app);

    if let Some(form) = &app.form {
        config_panel::render_config_panel(f, area, form);
    }
    if let Some(p) = &app.popup {
        popup::render_popup(f, area, p);
    }
}

/// A `width` x `height` rectangle centered in `area`, clamped to fit.
pub(crate) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
