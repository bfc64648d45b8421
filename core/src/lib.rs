#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the torus-life engine.
//!
//! This crate defines the message surface that connects adapters, the board
//! model, and the turn engine. Adapters feed key command codes and timer ticks
//! into the control loop, the control loop drives the scheduler once per
//! generation, and every observable change is broadcast as an [`Event`] for the
//! presentation layer to consume in order.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Interval between two alive-cell telemetry ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(2);

/// Byte value used for alive cells in loader and writer streams.
pub const ALIVE_BYTE: u8 = 255;

/// Byte value used for dead cells in loader and writer streams.
pub const DEAD_BYTE: u8 = 0;

/// Location of a single board cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    /// Zero-based column index.
    pub x: usize,
    /// Zero-based row index.
    pub y: usize,
}

impl Cell {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Execution state reported by the control loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlState {
    /// Generations are being computed.
    Executing,
    /// Generation computation and telemetry are suspended until resumed.
    Paused,
    /// The run is shutting down. Terminal.
    Quitting,
}

impl fmt::Display for ControlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Executing => "Executing",
            Self::Paused => "Paused",
            Self::Quitting => "Quitting",
        };
        f.write_str(label)
    }
}

/// Commands recognised on the key command source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCommand {
    /// Requests a snapshot of the current board.
    Save,
    /// Requests a snapshot followed by an immediate shutdown.
    Quit,
    /// Pauses a running engine or resumes a paused one.
    TogglePause,
}

impl KeyCommand {
    /// Decodes a command code, returning `None` for codes that carry no meaning.
    #[must_use]
    pub const fn from_key(key: char) -> Option<Self> {
        match key {
            's' => Some(Self::Save),
            'q' => Some(Self::Quit),
            'p' => Some(Self::TogglePause),
            _ => None,
        }
    }

    /// Command code that decodes into this command.
    #[must_use]
    pub const fn key(self) -> char {
        match self {
            Self::Save => 's',
            Self::Quit => 'q',
            Self::TogglePause => 'p',
        }
    }
}

/// Events broadcast by the control loop, in emission order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// A cell changed between alive and dead while computing `turn`.
    CellFlipped {
        /// Turn that was being computed when the flip happened.
        turn: u64,
        /// Absolute board coordinate of the flipped cell.
        cell: Cell,
    },
    /// A generation finished and the turn counter advanced to `turn`.
    TurnComplete {
        /// Number of completed turns.
        turn: u64,
    },
    /// Periodic telemetry of the number of alive cells.
    AliveCellsCount {
        /// Number of completed turns when the count was taken.
        turn: u64,
        /// Alive cells on the board.
        count: usize,
    },
    /// The control loop entered a new state.
    StateChange {
        /// Number of completed turns at the transition.
        turn: u64,
        /// State that became active.
        new_state: ControlState,
    },
    /// A snapshot of the board was handed to the writer.
    ImageOutputComplete {
        /// Number of completed turns captured by the snapshot.
        turn: u64,
        /// Name the snapshot was written under.
        filename: String,
    },
    /// The run finished all configured turns.
    FinalTurnComplete {
        /// Number of completed turns.
        turn: u64,
        /// Alive cells of the final board in row-major order.
        alive: Vec<Cell>,
    },
}

impl Event {
    /// Turn the event is tagged with.
    #[must_use]
    pub const fn turn(&self) -> u64 {
        match self {
            Self::CellFlipped { turn, .. }
            | Self::TurnComplete { turn }
            | Self::AliveCellsCount { turn, .. }
            | Self::StateChange { turn, .. }
            | Self::ImageOutputComplete { turn, .. }
            | Self::FinalTurnComplete { turn, .. } => *turn,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CellFlipped { turn, cell } => write!(f, "turn {turn}: cell {cell} flipped"),
            Self::TurnComplete { turn } => write!(f, "turn {turn} complete"),
            Self::AliveCellsCount { turn, count } => {
                write!(f, "turn {turn}: {count} alive cells")
            }
            Self::StateChange { turn, new_state } => write!(f, "turn {turn}: {new_state}"),
            Self::ImageOutputComplete { turn, filename } => {
                write!(f, "turn {turn}: wrote snapshot {filename}")
            }
            Self::FinalTurnComplete { turn, alive } => {
                write!(f, "final turn {turn} complete with {} alive cells", alive.len())
            }
        }
    }
}

/// Validated parameters of a single run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RunConfig {
    image_width: usize,
    image_height: usize,
    turns: u64,
    threads: usize,
}

impl RunConfig {
    /// Validates and captures the run parameters.
    ///
    /// Zero dimensions and zero threads are rejected. More threads than board
    /// rows are rejected as well since some workers would receive empty bands.
    pub fn new(
        image_width: usize,
        image_height: usize,
        turns: u64,
        threads: usize,
    ) -> Result<Self, ConfigError> {
        if image_width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        if image_height == 0 {
            return Err(ConfigError::ZeroHeight);
        }
        if threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if threads > image_height {
            return Err(ConfigError::TooManyThreads {
                threads,
                image_height,
            });
        }

        Ok(Self {
            image_width,
            image_height,
            turns,
            threads,
        })
    }

    /// Board width in cells.
    #[must_use]
    pub const fn image_width(&self) -> usize {
        self.image_width
    }

    /// Board height in cells.
    #[must_use]
    pub const fn image_height(&self) -> usize {
        self.image_height
    }

    /// Number of generations to compute before terminating.
    #[must_use]
    pub const fn turns(&self) -> u64 {
        self.turns
    }

    /// Number of parallel workers per generation.
    #[must_use]
    pub const fn threads(&self) -> usize {
        self.threads
    }

    /// Name under which the initial board is loaded, `<W>x<H>`.
    #[must_use]
    pub fn input_name(&self) -> String {
        format!("{}x{}", self.image_width, self.image_height)
    }

    /// Name under which a snapshot taken after `turn` turns is written, `<W>x<H>x<T>`.
    #[must_use]
    pub fn output_name(&self, turn: u64) -> String {
        format!("{}x{}x{turn}", self.image_width, self.image_height)
    }
}

/// Reasons a run configuration is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The board must be at least one cell wide.
    #[error("image width must be positive")]
    ZeroWidth,
    /// The board must be at least one cell tall.
    #[error("image height must be positive")]
    ZeroHeight,
    /// At least one worker is required.
    #[error("thread count must be positive")]
    ZeroThreads,
    /// Every worker needs at least one row.
    #[error("{threads} threads exceed the {image_height} rows of the board")]
    TooManyThreads {
        /// Requested worker count.
        threads: usize,
        /// Rows available for partitioning.
        image_height: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cell, ConfigError, ControlState, Event, KeyCommand, RunConfig};

    #[test]
    fn key_codes_decode_into_commands() {
        assert_eq!(KeyCommand::from_key('s'), Some(KeyCommand::Save));
        assert_eq!(KeyCommand::from_key('q'), Some(KeyCommand::Quit));
        assert_eq!(KeyCommand::from_key('p'), Some(KeyCommand::TogglePause));
        assert_eq!(KeyCommand::from_key('k'), None);
        assert_eq!(KeyCommand::from_key('S'), None);

        for command in [KeyCommand::Save, KeyCommand::Quit, KeyCommand::TogglePause] {
            assert_eq!(KeyCommand::from_key(command.key()), Some(command));
        }
    }

    #[test]
    fn config_rejects_degenerate_values() {
        assert_eq!(RunConfig::new(0, 16, 1, 1), Err(ConfigError::ZeroWidth));
        assert_eq!(RunConfig::new(16, 0, 1, 1), Err(ConfigError::ZeroHeight));
        assert_eq!(RunConfig::new(16, 16, 1, 0), Err(ConfigError::ZeroThreads));
        assert_eq!(
            RunConfig::new(16, 4, 1, 5),
            Err(ConfigError::TooManyThreads {
                threads: 5,
                image_height: 4,
            })
        );
    }

    #[test]
    fn config_accepts_zero_turns_and_one_row_per_thread() {
        let config = RunConfig::new(3, 4, 0, 4).expect("valid config");
        assert_eq!(config.turns(), 0);
        assert_eq!(config.threads(), 4);
    }

    #[test]
    fn snapshot_names_encode_dimensions_and_turn() {
        let config = RunConfig::new(512, 256, 100, 8).expect("valid config");
        assert_eq!(config.input_name(), "512x256");
        assert_eq!(config.output_name(42), "512x256x42");
    }

    #[test]
    fn events_report_their_turn() {
        let events = [
            Event::CellFlipped {
                turn: 3,
                cell: Cell::new(1, 2),
            },
            Event::StateChange {
                turn: 3,
                new_state: ControlState::Paused,
            },
            Event::FinalTurnComplete {
                turn: 3,
                alive: Vec::new(),
            },
        ];
        assert!(events.iter().all(|event| event.turn() == 3));
    }

    #[test]
    fn final_turn_event_round_trips_through_bincode() {
        let event = Event::FinalTurnComplete {
            turn: 7,
            alive: vec![Cell::new(0, 0), Cell::new(4, 9)],
        };
        let bytes = bincode::serialize(&event).expect("serialize");
        let restored: Event = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, event);
    }

    #[test]
    fn state_display_matches_variant_names() {
        assert_eq!(ControlState::Executing.to_string(), "Executing");
        assert_eq!(ControlState::Paused.to_string(), "Paused");
        assert_eq!(ControlState::Quitting.to_string(), "Quitting");
    }
}
