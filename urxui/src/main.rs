// Terminal control panel for a urx robot controller.
// Run with: cargo run -p urxui
// Try it against the simulator: cargo run -p sim

use std::error::Error;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{
        self, DisableFocusChange, EnableFocusChange, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen, LeaveAlternateScreen,
        SetTitle,
    },
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use urx::drivers::{UrxConnector, UrxDriverConfig, DEFAULT_PORT};
use urxui::{
    keymap, ui::ui, Intent, Panel, PanelSettings, RobotCommand, RobotWorker, UiEvent, WorkerEvent, WorkerHandle,
};

/// Keyboard control panel for jogging and monitoring a robot arm.
#[derive(Parser, Debug)]
#[command(name = "urxui", version)]
struct Args {
    /// Port used for addresses that do not name one
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Settings file (default: <config dir>/urxui/settings.json)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log file (default: urxui.log next to the settings file)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Telemetry poll interval in milliseconds
    #[arg(long, default_value_t = 500)]
    poll_ms: u64,
}

const INPUT_POLL: Duration = Duration::from_millis(20);
const SHUTDOWN_WAIT: Duration = Duration::from_secs(3);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let settings_path = match args.settings {
        Some(path) => path,
        None => PanelSettings::default_path()?,
    };
    let log_path = args
        .log_file
        .unwrap_or_else(|| settings_path.with_file_name("urxui.log"));
    init_logging(&log_path)?;

    let settings = PanelSettings::load_or_default(&settings_path);
    let defaults = UrxDriverConfig::default();
    let connector = UrxConnector {
        default_port: args.port,
        request_timeout_ms: defaults.request_timeout_ms,
        connect_retries: defaults.connect_retries,
    };
    let (worker, events) = RobotWorker::spawn(connector, Duration::from_millis(args.poll_ms.max(1)));
    info!("Panel started, settings at {}", settings_path.display());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let releases = matches!(supports_keyboard_enhancement(), Ok(true));
    if releases {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut panel = Panel::new(settings);
    let res = run_app(&mut terminal, &mut panel, &worker, events, releases).await;

    // Restore terminal
    if releases {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    worker.shutdown(SHUTDOWN_WAIT).await;
    if let Err(e) = panel.settings.save(&settings_path) {
        error!("{}", e);
        eprintln!("Error: {}", e);
    }

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    panel: &mut Panel,
    worker: &WorkerHandle,
    mut events: mpsc::Receiver<WorkerEvent>,
    releases: bool,
) -> Result<(), Box<dyn Error>> {
    let mut title = String::new();

    loop {
        let now = Instant::now();
        loop {
            match events.try_recv() {
                Ok(event) => panel.apply(event, now),
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    warn!("Robot worker has exited");
                    panel.should_quit = true;
                    break;
                }
            }
        }
        if let Some(intent) = panel.tick(now) {
            forward(worker, intent);
        }

        // Render UI
        let current = panel.title();
        if current != title {
            execute!(terminal.backend_mut(), SetTitle(&current))?;
            title = current;
        }
        if panel.take_redraw() {
            terminal.draw(|f| ui(f, panel, releases))?;
        }
        if panel.should_quit {
            break;
        }

        // Handle input with timeout
        if event::poll(INPUT_POLL)? {
            let ui_events = match event::read()? {
                Event::Key(key) => keymap::translate(&key, panel.editing.is_some(), releases),
                Event::FocusLost => vec![UiEvent::FocusLost],
                Event::Resize(..) => {
                    panel.request_redraw();
                    Vec::new()
                }
                _ => Vec::new(),
            };
            for ui_event in ui_events {
                if let Some(intent) = panel.handle(ui_event, Instant::now()) {
                    forward(worker, intent);
                }
            }
        }
    }

    // Stop any active jog before leaving
    if panel.active_jog().is_some() {
        forward(worker, Intent::Command(RobotCommand::Stop));
    }
    Ok(())
}

fn forward(worker: &WorkerHandle, intent: Intent) {
    if !worker.send(intent) {
        warn!("Robot worker is gone, intent dropped");
    }
}
