//! Brick Breaker entry point
//!
//! Headless runner: drives the frame loop (input, fixed-step update, draw
//! into a recording canvas) without a window, optionally with an autopilot
//! at the controls, and reports how the run went.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use brick_breaker::consts::SIM_DT;
use brick_breaker::sim::{Game, GamePhase, InputEvent, Key, Level};
use brick_breaker::{DrawList, Settings};

#[derive(Parser, Debug)]
#[command(name = "brick-breaker")]
#[command(about = "Run the brick breaker simulation headless and report the outcome")]
struct Cli {
    /// Level file to choose from (repeatable); defaults to the settings' list
    #[arg(long = "level")]
    levels: Vec<PathBuf>,
    /// Settings JSON file
    #[arg(long)]
    settings: Option<PathBuf>,
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Simulated wall-clock seconds to run
    #[arg(long, default_value_t = 60.0)]
    seconds: f32,
    /// Let the autopilot play one game
    #[arg(long)]
    autoplay: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    if !(cli.seconds >= 0.0) {
        bail!("--seconds must be a non-negative number, got {}", cli.seconds);
    }

    let settings = match &cli.settings {
        Some(path) => Settings::read(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };

    let mut rng = Pcg32::seed_from_u64(cli.seed);
    let candidates = if cli.levels.is_empty() {
        settings.levels.clone()
    } else {
        cli.levels.clone()
    };
    let level = if candidates.is_empty() {
        log::info!("No level files given, using the built-in layout");
        Level::classic()
    } else {
        let path = &candidates[rng.random_range(0..candidates.len())];
        Level::load(path)
    };

    log::info!("Brick Breaker (headless) starting...");
    let mut game = Game::new(settings, level, rng.random());
    let mut canvas = DrawList::new();
    let frames = (cli.seconds / SIM_DT).round() as u64;
    let mut games_started = 0u32;
    let mut ticks = 0u64;
    let mut frames_run = 0u64;

    for _ in 0..frames {
        if cli.autoplay {
            for event in autopilot(&game, games_started) {
                if event == InputEvent::MouseClicked && game.phase == GamePhase::Start {
                    games_started += 1;
                }
                game.handle_input(event);
            }
        }
        if game.quit_requested {
            break;
        }

        ticks += u64::from(game.update(SIM_DT));
        canvas.clear();
        game.draw(&mut canvas);
        frames_run += 1;
    }

    let summary = format!(
        "{frames_run} frames, {ticks} ticks: score {}, lives {}, {} bricks left, {} balls, {} draw calls in last frame",
        game.score,
        game.lives,
        game.brick_count(),
        game.ball_count(),
        canvas.commands.len()
    );
    log::info!("{summary}");
    println!("{summary}");

    game.shutdown();
    Ok(())
}

/// Plays a single game: starts it, keeps the paddle under the lowest ball,
/// launches whenever the ball is attached and fires multiball when it can.
/// Quits when that game is over or the board is clear.
fn autopilot(game: &Game, games_started: u32) -> Vec<InputEvent> {
    let mut events = Vec::new();
    match game.phase {
        GamePhase::Start => {
            if games_started == 0 {
                events.push(InputEvent::MouseClicked);
            } else {
                events.push(InputEvent::KeyPressed(Key::Escape));
            }
        }
        GamePhase::Playing => {
            if game.brick_count() == 0 {
                events.push(InputEvent::KeyPressed(Key::Escape));
                return events;
            }

            let lowest = game
                .ball_positions()
                .into_iter()
                .min_by(|a, b| a.y.total_cmp(&b.y));
            if let Some(ball) = lowest {
                // Wander off-centre so rebounds are not all vertical
                let wobble = 24.0 * (game.time_ticks as f32 * 0.013).sin();
                events.push(InputEvent::CursorMoved {
                    x: ball.x + wobble,
                });
            }

            if game.ball_attached {
                events.push(InputEvent::MouseClicked);
            } else if game.power_cooldown <= 0.0 && game.ball_count() == 1 {
                events.push(InputEvent::KeyPressed(Key::Multiball));
            }
        }
    }
    events
}
