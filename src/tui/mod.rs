//! Terminal interface for the portfolio mini app
//!
//! One linear flow: resolve the setup state, then show the matching screen
//! (token entry, account selection or dashboard). All backend calls run as
//! spawned tasks and report back through the app event channel.

pub mod app;
pub mod events;
pub mod pages;
pub mod ui;

pub use app::{App, Screen};
pub use events::{AppEvent, EventHandler};

use std::io::{self, IsTerminal, Stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    terminal::{
        self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
    },
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::debug;

use crate::api::Backend;
use crate::data_paths::DataPaths;
use crate::session::Session;

const TICK_RATE: Duration = Duration::from_millis(250);

/// Check if we're running in a terminal environment
fn is_terminal_available() -> bool {
    debug!("Checking if terminal is available...");

    // Check for explicit non-terminal indicators
    if std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("BUILDKITE").is_ok()
    {
        debug!("CI environment detected, terminal not available");
        return false;
    }

    // Try to get terminal size as a more reliable indicator
    if let Ok((cols, rows)) = terminal::size() {
        if cols > 0 && rows > 0 {
            debug!(
                "Terminal size available: {}x{}, assuming terminal is available",
                cols, rows
            );
            return true;
        }
    }

    // Fallback to traditional check
    if io::stdout().is_terminal() {
        return true;
    }

    // Check if we're in a known terminal environment
    if let Ok(term) = std::env::var("TERM") {
        if !term.is_empty() && term != "dumb" {
            debug!("TERM env var set to '{}', attempting to use terminal", term);
            return true;
        }
    }

    false
}

/// Setup terminal with proper error handling.
///
/// Entering the alternate screen is the one viewport expansion of the app;
/// it happens exactly once per run.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;

    Ok(terminal)
}

/// Run the interactive client until the user quits
pub async fn run(
    session: Session,
    backend: Arc<dyn Backend>,
    data_paths: DataPaths,
    passphrase: String,
) -> Result<()> {
    if !is_terminal_available() {
        return Err(anyhow::anyhow!(
            "The interactive interface requires a terminal environment.\n\n\
            Please use one of these alternatives:\n\
            1. Run in a proper terminal (not in a pipe/redirect)\n\
            2. Print the summary directly: tinkview portfolio\n\
            3. Print an income report: tinkview income --period week"
        ));
    }

    let events = EventHandler::new(TICK_RATE);
    let mut app = App::new(session, backend, data_paths, passphrase, events.sender());

    // Kick off the setup check before the first frame
    app.spawn_resolve();

    let mut terminal = setup_terminal()?;

    debug!("Starting main UI loop");
    let result = run_loop(&mut app, events, &mut terminal).await;

    // Cleanup
    debug!("Cleaning up terminal");
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    app: &mut App,
    mut events: EventHandler,
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let Some(event) = events.next().await else {
            break;
        };
        app.handle_event(event);

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
