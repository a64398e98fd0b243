mod logging;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use ratatui::{
    crossterm::{
        cursor::Show,
        event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
};
use std::{
    io::{self, Stdout},
    ops::ControlFlow,
    path::PathBuf,
};
use tokio::sync::oneshot;
use tracing::{error, info};
use trap_world_core::{
    Direction,
    agent::trap::DisarmSignal,
    config::GameConfig,
    player::{self, InputEvent},
    scheduler::spawn_agents,
    state::{SharedGame, load_state_from_file},
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Map file to load
    #[arg(short, long, value_name = "MAP_FILE")]
    map: Option<PathBuf>,
    /// TOML file with timings and agent placement (defaults to ./trap_world.toml if present)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,
    /// Write tracing output to this file, filtered by RUST_LOG
    #[arg(long, value_name = "LOG_FILE")]
    log: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();
    if let Some(log_file) = &args.log {
        logging::init(log_file)?;
    }

    // Everything that can fail at startup happens before the terminal is touched
    let config = GameConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    let map_file = args.map.unwrap_or(PathBuf::from("maps/map01.txt"));
    let state = load_state_from_file(&map_file)
        .with_context(|| format!("Failed to load map {}", map_file.display()))?;

    let game = SharedGame::new(state);
    let agents = spawn_agents(&game, &config).context("Failed to start agents")?;
    info!(map = %map_file.display(), "game started");

    // Set up the terminal
    let terminal = setup_terminal()?;

    // The renderer owns the terminal until told to stop
    let (stop_tx, stop_rx) = oneshot::channel();
    let renderer = tokio::spawn(render_loop(terminal, game.clone(), stop_rx));

    // Run the blocking input loop off the async workers
    let input = tokio::task::spawn_blocking({
        let game = game.clone();
        let disarm = agents.disarm_signal();
        move || input_loop(&game, &disarm)
    })
    .await;

    let _ = stop_tx.send(());
    let rendered = renderer.await;
    agents.shutdown();

    // Restore the terminal state, whatever happened above
    restore_terminal()?;

    rendered.context("Renderer panicked")??;
    input.context("Input loop panicked")??;
    info!("game finished");
    Ok(())
}

/// Configures the terminal for TUI interaction.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    let mut stdout = io::stdout();
    enable_raw_mode()?; // Put terminal in raw mode
    execute!(stdout, EnterAlternateScreen)?; // Use alternate screen
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(Into::into) // Map io::Error to anyhow::Error
}

/// Restores the terminal to its original state.
fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, Show)?;
    Ok(())
}

/// Draws a fresh snapshot every time a redraw is requested.
async fn render_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    game: SharedGame,
    mut stop: oneshot::Receiver<()>,
) -> Result<()> {
    loop {
        let snapshot = game.snapshot();
        if let Err(err) = terminal.draw(|f| ui::draw(f, &snapshot)) {
            error!(%err, "failed to draw frame");
            return Err(err.into());
        }

        tokio::select! {
            _ = game.redraw_requested() => {}
            _ = &mut stop => return Ok(()),
        }
    }
}

/// Reads keyboard events until the player quits. Blocks the calling thread.
fn input_loop(game: &SharedGame, disarm: &DisarmSignal) -> Result<()> {
    loop {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                let Some(input) = map_key(key) else {
                    continue;
                };
                if let ControlFlow::Break(()) = player::apply(game, input, disarm) {
                    return Ok(());
                }
            }
            Event::Resize(..) => game.request_redraw(),
            _ => {}
        }
    }
}

fn map_key(key: KeyEvent) -> Option<InputEvent> {
    let input = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => InputEvent::Quit,
        KeyCode::Char('q') | KeyCode::Esc => InputEvent::Quit,
        KeyCode::Char('e') => InputEvent::Interact,
        KeyCode::Char('w') | KeyCode::Up => InputEvent::Move(Direction::Up),
        KeyCode::Char('s') | KeyCode::Down => InputEvent::Move(Direction::Down),
        KeyCode::Char('a') | KeyCode::Left => InputEvent::Move(Direction::Left),
        KeyCode::Char('d') | KeyCode::Right => InputEvent::Move(Direction::Right),
        _ => return None,
    };
    Some(input)
}
