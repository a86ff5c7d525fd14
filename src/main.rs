use std::io::stdout;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use audit_assistant::config::AppConfig;
use audit_assistant::core::logging;
use audit_assistant::tui::app::AppState;
use audit_assistant::tui::services::Services;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Keep the guard alive for the whole run so buffered log lines flush
    let _log_guard = logging::init_tui()?;
    log::info!(
        "Starting {} v{}",
        audit_assistant::NAME,
        audit_assistant::VERSION
    );

    let config = AppConfig::load();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let services = Services::new(&config, event_tx);
    let tick_rate = Duration::from_millis(config.tui.tick_rate_ms);

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;

    let mut app = AppState::new(services, event_rx);
    let result = app.run(&mut terminal, tick_rate).await;

    // Always restore the terminal, even when the loop errored
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    if let Err(e) = result {
        log::error!("Event loop failed: {e}");
        eprintln!("audit-assistant: {e}");
        std::process::exit(1);
    }

    Ok(())
}
