use chrono::{DateTime, Local};
use once_cell::sync::Lazy;
use ratatui::layout::{Position, Rect};
use regex::Regex;
use std::{collections::BTreeSet, time::Instant};

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};

use super::{
    form::{ConfigForm, FormAction, FormOutcome},
    input::{Action, ClickTracker, Mode},
};
use crate::{
    core::{
        bus::CoreToUi,
        launcher::{launch, LaunchError},
        monitor::PortMonitor,
        persistence::ConfigStore,
    },
    i18n::{fill, lang},
    utils::ports::PortDescriptor,
};

/// Indentation in front of every port line.
pub const PORT_INDENT: &str = "   ";
const SEPARATOR_WIDTH: usize = 20;

static COM_PORT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"COM\d+").ok());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popup {
    Notice(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Timestamp,
    Separator,
    Placeholder,
    Port { index: usize, is_new: bool },
}

/// One line of the port list as rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine {
    pub text: String,
    pub kind: LineKind,
}

/// Screen regions recorded during the last draw, used for mouse hit tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct LayoutCache {
    pub list_inner: Rect,
    pub toggle_button: Rect,
    pub config_button: Rect,
}

pub struct App {
    pub ports: Vec<PortDescriptor>,
    pub new_ports: BTreeSet<String>,
    pub last_update: Option<DateTime<Local>>,
    pub selected: usize,
    pub scroll: usize,
    pub follow_tail: bool,
    pub reveal_selected: bool,
    pub popup: Option<Popup>,
    pub form: Option<ConfigForm>,
    pub layout: LayoutCache,
    pub should_quit: bool,
    monitor: PortMonitor,
    store: ConfigStore,
    clicks: ClickTracker,
}

impl App {
    pub fn new(monitor: PortMonitor, store: ConfigStore) -> Self {
        Self {
            ports: Vec::new(),
            new_ports: BTreeSet::new(),
            last_update: None,
            selected: 0,
            scroll: 0,
            follow_tail: false,
            reveal_selected: false,
            popup: None,
            form: None,
            layout: LayoutCache::default(),
            should_quit: false,
            monitor,
            store,
            clicks: ClickTracker::default(),
        }
    }

    pub fn is_monitoring(&self) -> bool {
        self.monitor.is_monitoring()
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn mode(&self) -> Mode {
        if self.popup.is_some() {
            Mode::Popup
        } else if self.form.is_some() {
            Mode::Form
        } else {
            Mode::Main
        }
    }

    pub fn selected_port(&self) -> Option<&PortDescriptor> {
        self.ports.get(self.selected)
    }

    /// Apply a message from the polling thread.
    pub fn apply_core(&mut self, msg: CoreToUi) {
        match msg {
            CoreToUi::PortsChanged(change) => {
                let previously_selected = self.selected_port().map(|p| p.port_name.clone());
                self.ports = change.ports;
                self.new_ports = change.new_ports;
                self.last_update = Some(Local::now());
                self.selected = previously_selected
                    .and_then(|name| self.ports.iter().position(|p| p.port_name == name))
                    .unwrap_or(0);
                self.follow_tail = true;
            }
            CoreToUi::Stopped => {
                log::debug!("UI: polling thread reported stop");
            }
        }
    }

    /// Lines of the port list, in the order they are drawn.
    ///
    /// Empty until the first change event arrives.
    pub fn display_lines(&self) -> Vec<DisplayLine> {
        let Some(updated) = self.last_update else {
            return Vec::new();
        };

        if self.ports.is_empty() {
            return vec![DisplayLine {
                text: lang().no_ports.clone(),
                kind: LineKind::Placeholder,
            }];
        }

        let mut lines = Vec::with_capacity(self.ports.len() + 2);
        lines.push(DisplayLine {
            text: fill(&lang().updated_at, "time", updated.format("%H:%M:%S")),
            kind: LineKind::Timestamp,
        });
        lines.push(DisplayLine {
            text: "-".repeat(SEPARATOR_WIDTH),
            kind: LineKind::Separator,
        });
        for (index, port) in self.ports.iter().enumerate() {
            lines.push(DisplayLine {
                text: format!("{PORT_INDENT}{port}"),
                kind: LineKind::Port {
                    index,
                    is_new: self.new_ports.contains(&port.port_name),
                },
            });
        }
        lines
    }

    /// Index of the line that shows the selected port.
    fn selected_line(&self) -> Option<usize> {
        self.display_lines()
            .iter()
            .position(|l| matches!(l.kind, LineKind::Port { index, .. } if index == self.selected))
    }

    /// Clamp `scroll` for a viewport of `height` rows.
    pub fn adjust_scroll(&mut self, total_lines: usize, height: usize) {
        let max_scroll = total_lines.saturating_sub(height);
        if self.follow_tail {
            self.scroll = max_scroll;
            self.follow_tail = false;
        }
        if self.reveal_selected {
            if let Some(line) = self.selected_line() {
                if line < self.scroll {
                    self.scroll = line;
                } else if height > 0 && line >= self.scroll + height {
                    self.scroll = line + 1 - height;
                }
            }
            self.reveal_selected = false;
        }
        self.scroll = self.scroll.min(max_scroll);
    }

    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::ToggleMonitoring => self.toggle_monitoring(),
            Action::OpenConfig => self.open_config(),
            Action::MovePrev => self.move_selection(false),
            Action::MoveNext => self.move_selection(true),
            Action::LaunchSelected => {
                if let Some(name) = self.selected_port().map(|p| p.port_name.clone()) {
                    self.launch_port(&name);
                }
            }
            Action::ClosePopup => self.popup = None,
            Action::Form(form_action) => self.handle_form(form_action),
            Action::None => {}
        }
    }

    pub fn toggle_monitoring(&mut self) {
        match self.monitor.toggle() {
            Ok(state) => log::info!("UI: monitor is now {state:?}"),
            Err(err) => {
                log::error!("UI: failed to toggle monitoring: {err:#}");
                self.popup = Some(Popup::Error(fill(
                    &lang().monitor_failed,
                    "error",
                    format!("{err:#}"),
                )));
            }
        }
    }

    fn open_config(&mut self) {
        self.form = Some(ConfigForm::new(self.store.load()));
    }

    fn handle_form(&mut self, action: FormAction) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match form.handle(action) {
            FormOutcome::Continue => {}
            FormOutcome::Cancel => self.form = None,
            FormOutcome::Save(config) => {
                self.form = None;
                self.popup = Some(match self.store.save(&config) {
                    Ok(()) => Popup::Notice(lang().config_saved.clone()),
                    Err(err) => {
                        log::error!("UI: saving configuration failed: {err:#}");
                        Popup::Error(fill(&lang().config_save_failed, "error", format!("{err:#}")))
                    }
                });
            }
        }
    }

    fn move_selection(&mut self, forward: bool) {
        if self.ports.is_empty() {
            self.selected = 0;
            return;
        }
        let len = self.ports.len();
        self.selected = if forward {
            (self.selected + 1) % len
        } else {
            (self.selected + len - 1) % len
        };
        self.reveal_selected = true;
    }

    /// Reload the configuration from disk and start the terminal program.
    pub fn launch_port(&mut self, port_name: &str) {
        let config = self.store.load();
        if let Err(err) = launch(port_name, &config) {
            let message = match &err {
                LaunchError::ProgramNotFound { path } => {
                    fill(&lang().program_not_found, "path", path.display())
                }
                LaunchError::Spawn { source, .. } => fill(&lang().launch_failed, "error", source),
            };
            self.popup = Some(Popup::Error(message));
        }
    }

    /// Resolve a row inside the list viewport to the port identifier drawn there.
    pub fn port_at_row(&self, row: usize) -> Option<String> {
        let lines = self.display_lines();
        let line = lines.get(self.scroll + row)?;
        resolve_port_identifier(&line.text, &self.ports)
    }

    pub fn handle_mouse(&mut self, event: MouseEvent, now: Instant) {
        match self.mode() {
            Mode::Popup => {
                if matches!(event.kind, MouseEventKind::Down(MouseButton::Left)) {
                    self.popup = None;
                }
                return;
            }
            Mode::Form => return,
            Mode::Main => {}
        }

        let position = Position::new(event.column, event.row);
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.layout.toggle_button.contains(position) {
                    self.handle_action(Action::ToggleMonitoring);
                } else if self.layout.config_button.contains(position) {
                    self.handle_action(Action::OpenConfig);
                } else if self.layout.list_inner.contains(position) {
                    let row = (event.row - self.layout.list_inner.y) as usize;
                    let double = self.clicks.register(event.column, event.row, now);
                    if let Some(name) = self.port_at_row(row) {
                        if let Some(idx) = self.ports.iter().position(|p| p.port_name == name) {
                            self.selected = idx;
                        }
                        if double {
                            log::info!("UI: double-click on {name}");
                            self.launch_port(&name);
                        }
                    }
                }
            }
            MouseEventKind::ScrollUp => self.move_selection(false),
            MouseEventKind::ScrollDown => self.move_selection(true),
            _ => {}
        }
    }
}

/// Find the port identifier contained in a rendered line.
///
/// Prefers the longest known identifier the trimmed line starts with, then
/// falls back to a `COM<n>` pattern anywhere in the line.
pub fn resolve_port_identifier(line: &str, known: &[PortDescriptor]) -> Option<String> {
    let trimmed = line.trim_start();
    let by_prefix = known
        .iter()
        .map(|p| p.port_name.as_str())
        .filter(|name| {
            trimmed.starts_with(name)
                && trimmed[name.len()..]
                    .chars()
                    .next()
                    .map_or(true, char::is_whitespace)
        })
        .max_by_key(|name| name.len());
    if let Some(name) = by_prefix {
        return Some(name.to_string());
    }

    COM_PORT
        .as_ref()
        .and_then(|re| re.find(line))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{
            differ::PortChange,
            monitor::{MonitorConfig, PortMonitor},
        },
        utils::ports::PortSource,
    };
    use crossterm::event::KeyModifiers;
    use std::{path::PathBuf, sync::Arc, time::Duration};

    struct Empty;

    impl PortSource for Empty {
        fn enumerate(&self) -> anyhow::Result<Vec<PortDescriptor>> {
            Ok(Vec::new())
        }
    }

    fn app() -> App {
        let (tx, _rx) = flume::unbounded();
        let monitor = PortMonitor::new(Arc::new(Empty), tx, MonitorConfig::default());
        let store = ConfigStore::new(
            std::env::temp_dir().join(format!("comwatch_app_{}.json", std::process::id())),
        );
        App::new(monitor, store)
    }

    fn change(names: &[&str], new: &[&str]) -> CoreToUi {
        CoreToUi::PortsChanged(PortChange {
            ports: names.iter().map(|n| PortDescriptor::new(*n)).collect(),
            new_ports: new.iter().map(|n| n.to_string()).collect(),
        })
    }

    #[test]
    fn nothing_rendered_before_first_change() {
        assert!(app().display_lines().is_empty());
    }

    #[test]
    fn empty_change_renders_placeholder() {
        let mut app = app();
        app.apply_core(change(&[], &[]));
        let lines = app.display_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].kind, LineKind::Placeholder);
    }

    #[test]
    fn only_new_ports_are_marked() {
        let mut app = app();
        app.apply_core(change(&["COM1", "COM3"], &["COM3"]));
        let marks: Vec<_> = app
            .display_lines()
            .into_iter()
            .filter_map(|l| match l.kind {
                LineKind::Port { is_new, .. } => Some((l.text.trim().to_string(), is_new)),
                _ => None,
            })
            .collect();
        assert_eq!(
            marks,
            [("COM1".to_string(), false), ("COM3".to_string(), true)]
        );
    }

    #[test]
    fn header_and_indentation() {
        let mut app = app();
        app.apply_core(change(&["COM1"], &["COM1"]));
        let lines = app.display_lines();
        assert_eq!(lines[0].kind, LineKind::Timestamp);
        assert_eq!(lines[1].text, "-".repeat(20));
        assert_eq!(lines[2].text, "   COM1");
    }

    #[test]
    fn selection_follows_port_across_changes() {
        let mut app = app();
        app.apply_core(change(&["COM1", "COM2", "COM3"], &[]));
        app.handle_action(Action::MoveNext);
        app.handle_action(Action::MoveNext);
        assert_eq!(app.selected_port().unwrap().port_name, "COM3");
        app.apply_core(change(&["COM2", "COM3"], &[]));
        assert_eq!(app.selected_port().unwrap().port_name, "COM3");
        app.apply_core(change(&["COM2"], &[]));
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn selection_wraps() {
        let mut app = app();
        app.apply_core(change(&["COM1", "COM2"], &[]));
        app.handle_action(Action::MovePrev);
        assert_eq!(app.selected, 1);
        app.handle_action(Action::MoveNext);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn change_scrolls_to_end() {
        let mut app = app();
        let names: Vec<String> = (1..=10).map(|n| format!("COM{n}")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        app.apply_core(change(&refs, &[]));
        let total = app.display_lines().len();
        app.adjust_scroll(total, 5);
        assert_eq!(app.scroll, total - 5);
    }

    #[test]
    fn rows_resolve_to_ports() {
        let mut app = app();
        app.apply_core(change(&["COM2", "COM10"], &[]));
        assert_eq!(app.port_at_row(0), None);
        assert_eq!(app.port_at_row(2).as_deref(), Some("COM2"));
        assert_eq!(app.port_at_row(3).as_deref(), Some("COM10"));
        assert_eq!(app.port_at_row(9), None);
    }

    #[test]
    fn resolves_identifier_from_line_text() {
        let known = vec![
            PortDescriptor::new("COM1"),
            PortDescriptor::new("COM10").with_manufacturer("FTDI"),
            PortDescriptor::new("/dev/ttyUSB0"),
        ];
        assert_eq!(
            resolve_port_identifier("   COM10 [FTDI] - USB Serial", &known).as_deref(),
            Some("COM10")
        );
        assert_eq!(
            resolve_port_identifier("   /dev/ttyUSB0 - CP2102", &known).as_deref(),
            Some("/dev/ttyUSB0")
        );
        assert_eq!(
            resolve_port_identifier("   COM42", &known).as_deref(),
            Some("COM42")
        );
        assert_eq!(resolve_port_identifier("--------------------", &known), None);
    }

    #[test]
    fn launching_with_missing_program_shows_error() {
        let mut app = app();
        let store = ConfigStore::new(
            std::env::temp_dir().join(format!("comwatch_app_launch_{}.json", std::process::id())),
        );
        let config = crate::core::persistence::SerialConfig {
            putty_path: PathBuf::from("/no/such/terminal"),
            ..Default::default()
        };
        store.save(&config).unwrap();
        app.store = store.clone();
        app.launch_port("COM1");
        assert!(matches!(app.popup, Some(Popup::Error(_))));
        assert_eq!(app.mode(), Mode::Popup);
        app.handle_action(Action::ClosePopup);
        assert_eq!(app.mode(), Mode::Main);
        let _ = std::fs::remove_file(store.path());
    }

    fn left_click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn double_click_on_port_row_launches() {
        let mut app = app();
        let store = ConfigStore::new(
            std::env::temp_dir().join(format!("comwatch_app_click_{}.json", std::process::id())),
        );
        let config = crate::core::persistence::SerialConfig {
            putty_path: PathBuf::from("/no/such/terminal"),
            ..Default::default()
        };
        store.save(&config).unwrap();
        app.store = store.clone();
        app.apply_core(change(&["COM1", "COM2"], &[]));
        app.layout.list_inner = Rect::new(1, 3, 40, 10);

        // list rows: timestamp, separator, COM1, COM2
        let t0 = Instant::now();
        app.handle_mouse(left_click(5, 6), t0);
        assert_eq!(app.selected_port().unwrap().port_name, "COM2");
        assert!(app.popup.is_none());

        app.handle_mouse(left_click(6, 6), t0 + Duration::from_millis(150));
        assert!(matches!(app.popup, Some(Popup::Error(_))));

        // a click on the separator does nothing, even twice
        app.popup = None;
        app.handle_mouse(left_click(5, 4), t0 + Duration::from_secs(2));
        app.handle_mouse(left_click(5, 4), t0 + Duration::from_millis(2100));
        assert!(app.popup.is_none());
        let _ = std::fs::remove_file(store.path());
    }
}
