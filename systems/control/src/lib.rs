#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Control loop that owns the board and the turn counter for a run.
//!
//! Each iteration polls the tick source, then the key source, without
//! blocking, and advances one generation when neither had anything pending.
//! Exactly one stimulus is handled per iteration and the resulting work is
//! chosen by the pure [`transition`] table. While paused the loop blocks on the
//! key source alone.

mod machine;
mod writer;

pub use machine::{transition, Action, Stimulus};
pub use writer::{SnapshotError, SnapshotWriter};

use std::time::Instant;

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;
use torus_life_core::{ControlState, Event, KeyCommand, RunConfig};
use torus_life_system_scheduler::{Scheduler, SchedulerError};
use torus_life_world::Board;

/// Conduits connecting the control loop with its environment.
#[derive(Debug)]
pub struct ControlChannels {
    /// Ordered event sink. Closed when the loop finishes.
    pub events: Sender<Event>,
    /// Key command codes, decoded with [`KeyCommand::from_key`].
    pub keys: Receiver<char>,
    /// Telemetry timer, typically `crossbeam_channel::tick(TICK_INTERVAL)`.
    pub ticks: Receiver<Instant>,
}

/// State machine driving a run from the initial board to shutdown.
#[derive(Debug)]
pub struct ControlLoop<W> {
    config: RunConfig,
    board: Board,
    scheduler: Scheduler,
    channels: ControlChannels,
    writer: W,
    state: ControlState,
    turn: u64,
}

impl<W> ControlLoop<W>
where
    W: SnapshotWriter,
{
    /// Prepares a run over `board`.
    ///
    /// Fails when the board dimensions disagree with `config` or the worker
    /// pool cannot be started.
    pub fn new(
        config: RunConfig,
        board: Board,
        channels: ControlChannels,
        writer: W,
    ) -> Result<Self, ControlError> {
        if board.width() != config.image_width() || board.height() != config.image_height() {
            return Err(ControlError::BoardMismatch {
                expected_width: config.image_width(),
                expected_height: config.image_height(),
                width: board.width(),
                height: board.height(),
            });
        }

        let scheduler = Scheduler::new(config.threads())?;
        Ok(Self {
            config,
            board,
            scheduler,
            channels,
            writer,
            state: ControlState::Executing,
            turn: 0,
        })
    }

    /// Runs until the configured number of turns completed or a quit key arrived.
    ///
    /// The event sink is closed exactly once, after the final
    /// `StateChange(Quitting)`, when this call returns.
    pub fn run(mut self) -> Result<RunOutcome, ControlError> {
        tracing::info!(
            width = self.config.image_width(),
            height = self.config.image_height(),
            turns = self.config.turns(),
            threads = self.config.threads(),
            "starting run",
        );

        for cell in self.board.alive_cells() {
            self.emit(Event::CellFlipped { turn: 0, cell })?;
        }

        while self.state != ControlState::Quitting && self.turn < self.config.turns() {
            let stimulus = self.poll();
            let (next, action) = transition(self.state, stimulus);
            self.state = next;
            self.perform(action)?;
        }

        let quit = self.state == ControlState::Quitting;
        if !quit {
            self.emit(Event::FinalTurnComplete {
                turn: self.turn,
                alive: self.board.alive_cells(),
            })?;
            self.snapshot()?;
        }

        self.writer.wait_idle()?;

        if !quit {
            self.state = ControlState::Quitting;
            self.emit(Event::StateChange {
                turn: self.turn,
                new_state: ControlState::Quitting,
            })?;
        }

        tracing::info!(turn = self.turn, quit, "run finished");

        let Self {
            board,
            turn,
            channels,
            ..
        } = self;
        drop(channels);

        Ok(RunOutcome { turn, board, quit })
    }

    fn poll(&mut self) -> Stimulus {
        match self.state {
            ControlState::Executing => {
                if self.channels.ticks.try_recv().is_ok() {
                    return Stimulus::Tick;
                }
                match self.channels.keys.try_recv() {
                    Ok(code) => decode(code),
                    Err(_) => Stimulus::Idle,
                }
            }
            ControlState::Paused => match self.channels.keys.recv() {
                Ok(code) => decode(code),
                Err(_) => {
                    tracing::warn!(turn = self.turn, "key source closed while paused; resuming");
                    Stimulus::KeysClosed
                }
            },
            ControlState::Quitting => Stimulus::Idle,
        }
    }

    fn perform(&mut self, action: Action) -> Result<(), ControlError> {
        match action {
            Action::ReportAliveCells => self.emit(Event::AliveCellsCount {
                turn: self.turn,
                count: self.board.alive_count(),
            }),
            Action::Snapshot => self.snapshot(),
            Action::Quit => {
                tracing::info!(turn = self.turn, "quit requested");
                self.snapshot()?;
                self.emit(Event::StateChange {
                    turn: self.turn,
                    new_state: ControlState::Quitting,
                })
            }
            Action::Pause => {
                tracing::info!(turn = self.turn, "paused");
                self.emit(Event::StateChange {
                    turn: self.turn,
                    new_state: ControlState::Paused,
                })
            }
            Action::Resume => {
                let dropped = self.channels.ticks.try_iter().count();
                tracing::info!(turn = self.turn, dropped_ticks = dropped, "resumed");
                self.emit(Event::StateChange {
                    turn: self.turn,
                    new_state: ControlState::Executing,
                })
            }
            Action::Advance => self.advance(),
            Action::Ignore => Ok(()),
        }
    }

    fn advance(&mut self) -> Result<(), ControlError> {
        let (board, flips) = self.scheduler.step(&self.board, self.turn)?.into_parts();
        self.board = board;
        for event in flips {
            self.emit(event)?;
        }
        self.turn += 1;
        self.emit(Event::TurnComplete { turn: self.turn })
    }

    fn snapshot(&mut self) -> Result<(), ControlError> {
        let filename = self.config.output_name(self.turn);
        self.writer.write(&filename, &self.board)?;
        tracing::debug!(turn = self.turn, %filename, "snapshot requested");
        self.emit(Event::ImageOutputComplete {
            turn: self.turn,
            filename,
        })
    }

    fn emit(&self, event: Event) -> Result<(), ControlError> {
        self.channels
            .events
            .send(event)
            .map_err(|_| ControlError::EventSinkClosed)
    }
}

fn decode(code: char) -> Stimulus {
    KeyCommand::from_key(code).map_or(Stimulus::UnknownKey, Stimulus::Key)
}

/// Final state of a finished run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    turn: u64,
    board: Board,
    quit: bool,
}

impl RunOutcome {
    /// Number of completed turns.
    #[must_use]
    pub const fn turn(&self) -> u64 {
        self.turn
    }

    /// Board after the last completed turn.
    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    /// Whether the run ended through the quit key.
    #[must_use]
    pub const fn quit(&self) -> bool {
        self.quit
    }
}

/// Failures that end a run early.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The supplied board does not have the configured dimensions.
    #[error("board is {width}x{height} but the run expects {expected_width}x{expected_height}")]
    BoardMismatch {
        /// Configured width.
        expected_width: usize,
        /// Configured height.
        expected_height: usize,
        /// Width of the supplied board.
        width: usize,
        /// Height of the supplied board.
        height: usize,
    },
    /// A generation could not be computed.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    /// The snapshot writer failed.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    /// Nobody is listening for events any more.
    #[error("event sink closed before the run finished")]
    EventSinkClosed,
}
