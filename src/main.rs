//! Slugrun entry point
//!
//! Runs the fixed-tick game without a window: scripted input goes in, the
//! per-tick draw list and events are built and logged. With `--realtime`
//! the loop is paced by the frame clock instead of running flat out.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;

use slugrun::game::{Game, tick};
use slugrun::input::InputScript;
use slugrun::{EngineError, Settings};

#[derive(Parser, Debug)]
#[command(version, about = "Slugrun: a fixed-tick side-scrolling action platformer")]
struct Args {
    /// Settings file (JSON); missing file means defaults
    #[arg(long, value_name = "PATH", default_value = "settings.json")]
    settings: PathBuf,

    /// Directory holding level files
    #[arg(long, value_name = "DIR")]
    levels_dir: Option<PathBuf>,

    /// Skip the title menu and start this level
    #[arg(long)]
    level: Option<String>,

    /// Enable the level editor
    #[arg(long)]
    editor: bool,

    /// Stop after this many ticks
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Input script (`<tick> down d`, `<tick> move 10 20`, ...)
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,

    /// Pace ticks to wall-clock time
    #[arg(long)]
    realtime: bool,
}

fn run(args: Args) -> Result<(), EngineError> {
    let mut settings = Settings::load(&args.settings)?;
    if let Some(dir) = args.levels_dir {
        settings.levels_dir = dir;
    }
    if args.editor {
        settings.editor_enabled = true;
    }

    let script = match &args.script {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
            InputScript::parse(&text)
        }
        None => InputScript::default(),
    };

    let mut game = Game::new(settings);
    if let Some(name) = &args.level {
        game.start_level(name)?;
    }

    let started = Instant::now();
    let mut last = started;
    while game.tick_count < args.ticks && !game.quit_requested {
        let substeps = if args.realtime {
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f32();
            last = now;
            game.clock.advance(dt)
        } else {
            1
        };

        for _ in 0..substeps {
            let events = script.events_at(game.tick_count + 1);
            tick(&mut game, events)?;
            for event in &game.events {
                log::debug!("tick {}: {:?}", game.tick_count, event);
            }
            if game.tick_count >= args.ticks || game.quit_requested {
                break;
            }
        }

        let frame = game.frame();
        if args.realtime {
            game.clock.record_frame(started.elapsed().as_secs_f64());
            std::thread::sleep(Duration::from_millis(1));
        }
        log::trace!(
            "frame: {} vertices, {} texts",
            frame.vertices.len(),
            frame.texts.len()
        );
    }

    log::info!(
        "Stopped after {} ticks ({} entities alive)",
        game.tick_count,
        game.world.entities().len()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Slugrun starting...");

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
