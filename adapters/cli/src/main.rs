#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the torus-life engine.

mod config;
mod keys;
mod presenter;

use std::thread;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use torus_life_core::{KeyCommand, TICK_INTERVAL};
use torus_life_pgm::IoHandle;
use torus_life_system_control::{ControlChannels, ControlLoop};
use torus_life_world::Board;

use crate::config::{BoardSource, Cli, Settings};

/// Events buffered between the control loop and the presenter before the loop blocks.
const EVENT_BUFFER: usize = 1024;

/// Entry point for the torus-life command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .init();

    let settings = cli.settings()?;
    run(&settings)
}

fn run(settings: &Settings) -> Result<()> {
    let board = initial_board(settings)?;
    let mut writer = IoHandle::spawn(&settings.out)
        .with_context(|| format!("failed to prepare {}", settings.out.display()))?;

    let (events, inbox) = crossbeam_channel::bounded(EVENT_BUFFER);
    let presenter = thread::Builder::new()
        .name("torus-life-events".to_owned())
        .spawn(move || presenter::present(inbox))
        .context("failed to start event presenter")?;

    let channels = ControlChannels {
        events,
        keys: keys::spawn_stdin_reader()?,
        ticks: crossbeam_channel::tick(TICK_INTERVAL),
    };
    tracing::info!(
        "type {} to save, {} to pause or resume, {} to quit, then press Enter",
        KeyCommand::Save.key(),
        KeyCommand::TogglePause.key(),
        KeyCommand::Quit.key(),
    );
    let outcome = ControlLoop::new(settings.run, board, channels, &mut writer)
        .and_then(|control| control.run());

    // Queued snapshots are flushed even when the run failed.
    let flushed = writer.shutdown();
    let presented = presenter
        .join()
        .map_err(|_| anyhow!("event presenter panicked"))?;
    let outcome = outcome.context("run aborted")?;
    flushed.context("failed to flush snapshots")?;

    tracing::info!(
        turn = outcome.turn(),
        alive = outcome.board().alive_count(),
        quit = outcome.quit(),
        events = presented.events,
        flips = presented.flips,
        snapshots = presented.snapshots,
        "done",
    );
    Ok(())
}

fn initial_board(settings: &Settings) -> Result<Board> {
    let width = settings.run.image_width();
    let height = settings.run.image_height();

    match settings.board_source {
        BoardSource::Image => torus_life_pgm::read_board(&settings.images, width, height)
            .with_context(|| format!("failed to load {}", settings.run.input_name())),
        BoardSource::Random { seed, density } => {
            tracing::info!(seed, density, "generating initial board");
            Ok(random_board(width, height, seed, density)?)
        }
    }
}

fn random_board(width: usize, height: usize, seed: u64, density: f64) -> Result<Board> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let cells = (0..width * height).map(|_| rng.gen_bool(density)).collect();
    Board::from_cells(width, height, cells).context("failed to generate board")
}
