//! BLOCKTRIS - a falling-block puzzle for the terminal

mod board;
mod control;
mod game;
mod highscore;
mod input;
mod piece;
mod score;
mod settings;
mod shape;
mod snapshot;
mod timer;
mod ui;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use game::Game;
use highscore::FileStore;
use input::{Input, InputHandler};
use ratatui::{backend::CrosstermBackend, Terminal};
use settings::Settings;
use snapshot::Snapshot;
use std::{
    io::{self, stdout},
    path::PathBuf,
    time::{Duration, Instant},
};
use timer::Scheduler;
use tracing_subscriber::EnvFilter;

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Get the blocktris temp directory, creating it if needed
fn blocktris_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("blocktris");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    let log_dir = blocktris_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("blocktris=debug"));
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    tracing::info!(
        "BLOCKTRIS starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let settings = Settings::load();

    let store = FileStore::locate(settings.high_score_path.as_deref());
    if let Some(path) = store.path() {
        tracing::info!("High score file: {}", path.display());
    }
    let mut game = Game::new(settings.gameplay.rules(), Box::new(store));

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut game, &settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    if let Err(e) = settings.save() {
        eprintln!("Warning: Could not save settings: {}", e);
    }

    if result.is_ok() {
        let score = game.score();
        println!("\nThanks for playing BLOCKTRIS!");
        println!("Final Score: {}", score.points);
        println!("Level: {} | Lines: {}", score.level, score.lines);
        println!("High Score: {}", game.high_score());
    }

    tracing::info!("BLOCKTRIS shutting down");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    game: &mut Game,
    settings: &Settings,
) -> io::Result<()> {
    let input = InputHandler::from_settings(settings);
    let mut scheduler = Scheduler::new(settings.gameplay.animation_frame());
    let mut dirty = true;

    loop {
        // Only redraw when something changed
        if dirty {
            let snapshot = Snapshot::capture(game);
            terminal.draw(|frame| ui::render_game(frame, &snapshot, settings))?;
            dirty = false;
        }

        // Wait for input, but never past the next scheduled tick
        let now = Instant::now();
        let wait = scheduler
            .until_next(now)
            .map_or(FRAME_DURATION, |due| due.min(FRAME_DURATION));

        if event::poll(wait)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match input.key_down(key) {
                    Some(Input::Quit) => {
                        tracing::info!("Quit requested");
                        return Ok(());
                    }
                    Some(Input::Command(command)) => {
                        let changed = control::dispatch(game, command);
                        tracing::trace!("{:?} -> {}", command, changed);
                        dirty |= changed;
                    }
                    None => {}
                },
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }

        let due = scheduler.run(game, Instant::now());
        dirty |= due.gravity || due.animation;
    }
}
