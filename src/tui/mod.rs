pub mod app;
pub mod form;
pub mod input;
pub mod ui;

use anyhow::Result;
use ratatui::{backend::CrosstermBackend, prelude::*};
use std::{
    io::{self, Stdout},
    sync::Arc,
    time::{Duration, Instant},
};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture, Event};

use crate::{
    core::{
        bus::Bus,
        monitor::{MonitorConfig, PortMonitor},
        persistence::ConfigStore,
    },
    i18n::lang,
    tui::input::map_key,
    utils::ports::PortSource,
};
use app::App;

pub fn start(store: ConfigStore, source: Arc<dyn PortSource>) -> Result<()> {
    log::info!("[TUI] comwatch TUI starting (config at {:?})", store.path());

    let bus = Bus::new();
    let monitor = PortMonitor::new(source, bus.core_tx.clone(), MonitorConfig::default());
    let mut app = App::new(monitor, store);

    // Setup terminal
    let mut stdout = io::stdout();
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        EnableMouseCapture
    )?;
    // Window decoration only; startup continues without it
    if let Err(err) = crossterm::execute!(
        stdout,
        crossterm::terminal::SetTitle(lang().title.as_str())
    ) {
        log::warn!("[TUI] failed to set terminal title: {err}");
    }
    let backend = CrosstermBackend::new(&mut stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &bus);

    // Restore terminal
    let mut stdout = io::stdout();
    crossterm::execute!(
        stdout,
        DisableMouseCapture,
        crossterm::terminal::LeaveAlternateScreen
    )?;
    crossterm::terminal::disable_raw_mode()?;

    log::info!("[TUI] comwatch TUI exited");
    res
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<&mut Stdout>>,
    app: &mut App,
    bus: &Bus,
) -> Result<()> {
    loop {
        // Apply everything the polling thread sent, in order
        for msg in bus.drain() {
            app.apply_core(msg);
        }

        terminal.draw(|f| ui::render_ui(f, app))?;

        if crossterm::event::poll(Duration::from_millis(100))? {
            match crossterm::event::read() {
                Ok(Event::Key(key)) => {
                    let action = map_key(key, app.mode());
                    app.handle_action(action);
                }
                Ok(Event::Mouse(event)) => app.handle_mouse(event, Instant::now()),
                Ok(_) => {}
                Err(e) => log::error!("[TUI] input read error: {e}"),
            }
        }

        if app.should_quit {
            break;
        }
    }

    terminal.clear()?;
    Ok(())
}
