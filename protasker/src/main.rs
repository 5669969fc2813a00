//! `ProTasker` terminal kanban board.
//!
//! Talks to the REST API and renders the caller's projects and a
//! drag-and-drop board. Configuration via CLI flags, environment
//! variables, or config file (`~/.config/protasker/config.toml`).
//!
//! ```bash
//! PROTASKER_TOKEN=t-alice cargo run --bin protasker -- --api-url http://127.0.0.1:5000/api
//! ```

use std::io;
use std::path::Path;

use clap::Parser;
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use protasker::app::App;
use protasker::config::{CliArgs, ClientConfig};
use protasker::http::HttpTaskStore;
use protasker::net::{self, NetCommand, NetEvent};
use protasker::session::AuthState;
use protasker::ui;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Logs go to a file; ratatui owns stdout.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    let store = match HttpTaskStore::new(&config.api_url, config.request_timeout) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Invalid API URL {}: {e}", config.api_url);
            return Err(io::Error::new(io::ErrorKind::InvalidInput, e.to_string()));
        }
    };
    tracing::info!(api_url = %store.base_url(), "protasker starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, store, &config);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    tracing::info!("protasker exiting");
    result
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown so buffered
/// entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("protasker.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Main application loop.
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    store: HttpTaskStore,
    config: &ClientConfig,
) -> io::Result<()> {
    let auth = AuthState::from_token(config.token.as_deref());
    let mut app = App::new(auth, config.drag_activation_distance)
        .with_date_format(config.date_format.clone());
    let (cmd_tx, mut evt_rx) = net::spawn_net(store, &config.net_config());

    if let Some(cmd) = app.startup_command() {
        dispatch(&mut app, &cmd_tx, cmd);
    }

    loop {
        let size = terminal.size()?;
        app.set_viewport(Rect::new(0, 0, size.width, size.height));
        terminal.draw(|frame| ui::draw(frame, &app))?;

        drain_net_events(&mut app, &cmd_tx, &mut evt_rx);

        if event::poll(config.poll_timeout)? {
            let command = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key_event(key),
                Event::Mouse(mouse) => app.handle_mouse_event(mouse),
                Event::FocusLost => {
                    app.cancel_drag();
                    None
                }
                _ => None,
            };
            if let Some(cmd) = command {
                dispatch(&mut app, &cmd_tx, cmd);
            }
        }

        if app.should_quit {
            let _ = cmd_tx.try_send(NetCommand::Shutdown);
            return Ok(());
        }
    }
}

/// Hand a command to the networking task.
fn dispatch(app: &mut App, tx: &mpsc::Sender<NetCommand>, cmd: NetCommand) {
    match tx.try_send(cmd) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(cmd)) => {
            tracing::warn!("command channel full, dropping request");
            app.command_dropped(cmd, "Network busy");
        }
        Err(mpsc::error::TrySendError::Closed(cmd)) => {
            tracing::error!("networking task is gone");
            app.command_dropped(cmd, "Network unavailable");
        }
    }
}

/// Apply every pending `NetEvent`, sending any follow-up request.
fn drain_net_events(
    app: &mut App,
    tx: &mpsc::Sender<NetCommand>,
    rx: &mut mpsc::Receiver<NetEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        if let Some(cmd) = app.apply_net_event(event) {
            dispatch(app, tx, cmd);
        }
    }
}
