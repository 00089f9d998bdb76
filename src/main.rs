pub mod config;
pub mod game;
pub mod history;
pub mod mode;
pub mod runtime;
pub mod stats;
pub mod timing;
pub mod ui;
pub mod util;

use crate::{
    config::{Config, ConfigStore, FileConfigStore},
    game::{Game, Phase},
    history::{HistoryLog, Profile, ProfileStore},
    mode::GameMode,
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner},
    timing::SystemClock,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

/// Tick cadence of the app loop. Timers can fire at most one tick
/// late, so this stays far below the shortest display delay.
const TICK_RATE_MS: u64 = 16;

/// sleek reaction-time trainer with randomized stimuli and session analytics
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal reaction-time trainer: wait for the stimulus, hit any key (or click) as fast as you can, and track your statistics and personal best across sessions."
)]
pub struct Cli {
    /// game mode to play (defaults to the last configured mode)
    #[clap(short = 'm', long, value_enum)]
    mode: Option<GameMode>,

    /// skip writing session history and profile updates
    #[clap(long)]
    no_save: bool,
}

#[derive(Debug)]
pub struct App {
    pub cli: Option<Cli>,
    pub game: Game<SystemClock>,
    pub profile: Profile,
    pub new_personal_best: bool,
    pub session_recorded: bool,
    pub save_enabled: bool,
    pub history: HistoryLog,
    pub profile_store: ProfileStore,
    pub config_store: FileConfigStore,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        let config_store = FileConfigStore::new();
        let profile_store = ProfileStore::new();
        let mode = cli.mode.unwrap_or_else(|| config_store.load().game_mode());
        let save_enabled = !cli.no_save;

        Self {
            cli: Some(cli),
            game: Game::new(mode, SystemClock::new()),
            profile: profile_store.load(),
            new_personal_best: false,
            session_recorded: false,
            save_enabled,
            history: HistoryLog::new(),
            profile_store,
            config_store,
        }
    }

    /// The user's response signal: starts a session from the idle and
    /// summary screens, otherwise feeds the state machine.
    pub fn primary_action(&mut self) {
        match self.game.phase() {
            Phase::Idle | Phase::SessionComplete => {
                self.new_personal_best = false;
                self.session_recorded = false;
                self.game.start();
            }
            _ => self.game.handle_action(),
        }
    }

    pub fn select_mode(&mut self, mode: GameMode) {
        self.game.change_mode(mode);
        self.new_personal_best = false;
        self.session_recorded = false;
        if self.save_enabled {
            let _ = self.config_store.save(&Config { mode: mode.key() });
        }
    }

    pub fn on_tick(&mut self) {
        self.game.poll();

        if self.game.is_complete() && !self.session_recorded {
            self.session_recorded = true;
            if let Some(stats) = self.game.completed_stats() {
                self.new_personal_best = self.profile.record_session(&stats);
                if self.save_enabled {
                    let _ = self.history.append(self.game.mode(), &stats);
                    let _ = self.profile_store.save(&self.profile);
                }
            }
        }
    }

    /// Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('q') => return true,
            KeyCode::Char('r') => {
                self.new_personal_best = false;
                self.session_recorded = false;
                self.game.reset();
            }
            _ if self.in_session() => {
                // mid-session, every other key is the response signal
                self.game.handle_action();
            }
            KeyCode::Char('1') => self.select_mode(GameMode::Beginner),
            KeyCode::Char('2') => self.select_mode(GameMode::Standard),
            KeyCode::Char('3') => self.select_mode(GameMode::Advanced),
            KeyCode::Char('4') => self.select_mode(GameMode::Expert),
            KeyCode::Char(' ') | KeyCode::Enter => self.primary_action(),
            _ => {}
        }
        false
    }

    fn in_session(&self) -> bool {
        !matches!(self.game.phase(), Phase::Idle | Phase::SessionComplete)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cli);
    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match runner.step() {
            GameEvent::Key(key) => {
                if app.handle_key(key) {
                    break;
                }
            }
            GameEvent::Click => app.primary_action(),
            GameEvent::Resize => {}
            GameEvent::Tick => app.on_tick(),
        }
    }

    Ok(())
}
