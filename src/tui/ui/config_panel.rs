use ratatui::{prelude::*, widgets::*};

use super::centered_rect;
use crate::{
    i18n::lang,
    tui::form::{ConfigForm, FormField},
};

fn field_line<'a>(label: &'a str, value: String, focused: bool, editable_text: bool) -> Line<'a> {
    let value_style = if focused {
        Style::default().bg(Color::LightGreen).fg(Color::Black).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let value = if focused && !editable_text {
        format!("< {value} >")
    } else if focused {
        format!("{value}_")
    } else {
        format!("  {value}  ")
    };
    Line::from(vec![
        Span::raw(format!(" {label:<14}")),
        Span::styled(value, value_style),
    ])
}

pub fn render_config_panel(f: &mut Frame, area: Rect, form: &ConfigForm) {
    let rect = centered_rect(area, 56, 16);
    f.render_widget(Clear, rect);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", lang().config_title));
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let c = &form.config;
    let focus = form.focus;
    let heading = Style::default().add_modifier(Modifier::BOLD);

    let button = |label: &str, field: FormField| {
        let style = if focus == field {
            Style::default().bg(Color::LightGreen).fg(Color::Black).add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(Color::Gray).fg(Color::Black)
        };
        Span::styled(format!(" {label} "), style)
    };

    let lines = vec![
        Line::styled(format!(" {}", lang().config_params), heading),
        field_line(&lang().label_baud, c.baudrate.to_string(), focus == FormField::BaudRate, false),
        field_line(
            &lang().label_data_bits,
            c.data_bits.to_string(),
            focus == FormField::DataBits,
            false,
        ),
        field_line(
            &lang().label_stop_bits,
            c.stop_bits.to_string(),
            focus == FormField::StopBits,
            false,
        ),
        field_line(&lang().label_parity, c.parity.to_string(), focus == FormField::Parity, false),
        field_line(
            &lang().label_flow_control,
            c.flow_control.to_string(),
            focus == FormField::FlowControl,
            false,
        ),
        Line::raw(""),
        Line::styled(format!(" {}", lang().config_program), heading),
        field_line(
            &lang().label_program_path,
            form.path_buffer.clone(),
            focus == FormField::ProgramPath,
            true,
        ),
        Line::raw(""),
        Line::from(vec![
            Span::raw(" "),
            button(&lang().save, FormField::Save),
            Span::raw("  "),
            button(&lang().cancel, FormField::Cancel),
        ])
        .alignment(Alignment::Right),
    ];

    f.render_widget(Paragraph::new(lines), inner);
}
