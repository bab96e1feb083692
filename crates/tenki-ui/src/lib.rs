//! Terminal shell for tenki
//!
//! Area selector, "show" action, status line and result region, driven on a
//! single thread: each request runs to completion before the next key is read.

pub mod app;
pub mod models;
pub mod services;
pub mod ui;

pub use app::App;
pub use models::{ForecastModel, PendingAction};
pub use services::ForecastService;

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self as crossterm_event, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tenki_core::Config;

/// Run the terminal UI until the user quits
pub async fn run(config: &Config) -> Result<()> {
    let service = ForecastService::from_config(config)?;
    service.initialize()?;

    // Setup terminal
    enable_raw_mode()?;
    let mut terminal = setup_or_restore(
        || {
            let mut stdout = io::stdout();
            execute!(stdout, EnterAlternateScreen)?;
            Ok(Terminal::new(CrosstermBackend::new(stdout))?)
        },
        restore_terminal_mode,
    )?;

    let mut app = App::new(config.ui.title.clone(), service);
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Run `setup`; if it fails, run `restore` before returning the error
fn setup_or_restore<T>(setup: impl FnOnce() -> Result<T>, restore: impl FnOnce()) -> Result<T> {
    setup().map_err(|e| {
        restore();
        e
    })
}

/// Best-effort teardown for a half-initialized terminal
fn restore_terminal_mode() {
    if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen) {
        tracing::warn!(error = %e, "Failed to leave alternate screen");
    }
    if let Err(e) = disable_raw_mode() {
        tracing::warn!(error = %e, "Failed to disable raw mode");
    }
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::render(f, app))?;

        // Pending work runs after the draw so the loading text is visible
        if app.tick().await {
            continue;
        }

        if crossterm_event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = crossterm_event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(key) {
                    break;
                }
            }
        }
    }

    tracing::info!("Shell closed");
    Ok(())
}
