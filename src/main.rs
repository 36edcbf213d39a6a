mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use fittr::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    fit::index_of_difficulty,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    FinishedSession, Measurement, SessionController,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    fs::{self, OpenOptions},
    io::{self, stdin},
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const TICK_RATE_MS: u64 = 100;

/// fitts's law pointing test in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Click randomized circular targets as fast as you can, then see a Fitts's-Law model fitted to your movement times."
)]
pub struct Cli {
    /// canvas width in pixels
    #[clap(long)]
    width: Option<u32>,

    /// canvas height in pixels
    #[clap(long)]
    height: Option<u32>,

    /// seed for a replayable sequence of targets
    #[clap(long)]
    seed: Option<u64>,

    /// what the results chart plots movement time against
    #[clap(short = 'a', long, value_enum, default_value_t = ChartAxis::Difficulty)]
    axis: ChartAxis,

    /// iteration budget for the model fit
    #[clap(long)]
    max_fit_iterations: Option<usize>,

    /// log at debug level
    #[clap(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    /// Overlay command line values on the stored config
    fn apply(&self, config: &mut Config) {
        if let Some(width) = self.width {
            config.canvas_width = width;
        }
        if let Some(height) = self.height {
            config.canvas_height = height;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if let Some(iterations) = self.max_fit_iterations {
            config.max_fit_iterations = iterations;
        }
    }
}

/// Config written back after startup. Overrides persist, but a `--seed` only
/// holds for the run it was given to.
fn persistable(config: &Config, stored: &Config) -> Config {
    Config {
        seed: stored.seed,
        ..config.clone()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum ChartAxis {
    #[value(alias = "id")]
    Difficulty,
    Distance,
    Width,
}

impl ChartAxis {
    pub fn value(&self, m: &Measurement) -> f64 {
        match self {
            ChartAxis::Difficulty => index_of_difficulty(m.distance, m.width),
            ChartAxis::Distance => m.distance,
            ChartAxis::Width => m.width,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChartAxis::Difficulty => "index of difficulty (bits)",
            ChartAxis::Distance => "distance (px)",
            ChartAxis::Width => "width (px)",
        }
    }

    pub fn next(self) -> Self {
        match self {
            ChartAxis::Difficulty => ChartAxis::Distance,
            ChartAxis::Distance => ChartAxis::Width,
            ChartAxis::Width => ChartAxis::Difficulty,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Testing,
    Results,
}

#[derive(Debug)]
pub struct App {
    pub config: Config,
    pub session: SessionController,
    pub finished: Option<FinishedSession>,
    pub state: AppState,
    pub axis: ChartAxis,
    pub last_error: Option<String>,
}

impl App {
    pub fn new(config: Config, axis: ChartAxis) -> fittr::Result<Self> {
        let session = Self::start_session(&config)?;
        Ok(Self {
            config,
            session,
            finished: None,
            state: AppState::Testing,
            axis,
            last_error: None,
        })
    }

    fn start_session(config: &Config) -> fittr::Result<SessionController> {
        Ok(SessionController::new(
            config.session_config(),
            config.target_generator(),
            Instant::now(),
        )?
        .with_fit_options(config.fit_options()))
    }

    pub fn reset(&mut self) {
        match Self::start_session(&self.config) {
            Ok(session) => {
                self.session = session;
                self.finished = None;
                self.state = AppState::Testing;
                self.last_error = None;
            }
            Err(err) => self.last_error = Some(err.to_string()),
        }
    }

    /// Forward a click on a terminal cell of a screen of size `area`
    pub fn click(&mut self, area: Rect, column: u16, row: u16) {
        if self.state != AppState::Testing {
            return;
        }

        let mapping = ui::canvas_mapping(area, &self.config);
        let aim = self.session.target().map(|t| t.center());
        let Some(point) = mapping.click_point(column, row, aim) else {
            return;
        };

        match self.session.on_click(point, Instant::now()) {
            Ok(_) => self.last_error = None,
            Err(err) => {
                warn!(error = %err, "click rejected");
                self.last_error = Some(err.to_string());
            }
        }
    }

    pub fn finish(&mut self) {
        match self.session.finish() {
            Ok(finished) => {
                self.finished = Some(finished);
                self.state = AppState::Results;
                self.last_error = None;
            }
            Err(err) => self.last_error = Some(err.to_string()),
        }
    }
}

fn init_tracing(verbose: bool) {
    let Some(path) = AppDirs::log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    // the TUI owns stdout, so traces go to a file
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_tracing(cli.verbose);

    let store = FileConfigStore::new();
    let stored = store.load();
    let mut config = stored.clone();
    cli.apply(&mut config);

    let mut app = match App::new(config.clone(), cli.axis) {
        Ok(app) => app,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ValueValidation, err.to_string()).exit();
        }
    };
    if let Err(err) = store.save(&persistable(&config, &stored)) {
        warn!(error = %err, path = %store.path().display(), "could not save config");
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

fn handle_key(app: &mut App, key: KeyEvent) -> Flow {
    if key.code == KeyCode::Esc
        || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
    {
        return Flow::Quit;
    }

    match app.state {
        AppState::Testing => {
            if matches!(key.code, KeyCode::Char('f') | KeyCode::Enter) {
                app.finish();
            }
        }
        AppState::Results => match key.code {
            KeyCode::Char('n') => {
                info!("starting a new session");
                app.reset();
            }
            KeyCode::Char('v') => app.axis = app.axis.next(),
            _ => {}
        },
    }
    Flow::Continue
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    let mut needs_draw = true;
    loop {
        if needs_draw {
            terminal.draw(|f| ui::screen::current_screen(&app.state).render(app, f))?;
        }

        needs_draw = match runner.step() {
            AppEvent::Tick => false,
            AppEvent::Resize => true,
            AppEvent::Click { column, row } => {
                let size = terminal.size()?;
                app.click(Rect::new(0, 0, size.width, size.height), column, row);
                true
            }
            AppEvent::Key(key) => {
                if handle_key(app, key) == Flow::Quit {
                    break;
                }
                true
            }
        };
    }

    Ok(())
}
