//! Transition table of the control loop.

use torus_life_core::{ControlState, KeyCommand};

/// Input observed by the control loop during one iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stimulus {
    /// The telemetry timer fired.
    Tick,
    /// A recognised key command arrived.
    Key(KeyCommand),
    /// A key code without meaning arrived.
    UnknownKey,
    /// The key source hung up; no further commands can arrive.
    KeysClosed,
    /// Neither a tick nor a key was pending.
    Idle,
}

/// Work the control loop performs after a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Emit the current alive-cell count.
    ReportAliveCells,
    /// Write a snapshot of the current board.
    Snapshot,
    /// Write a snapshot and announce shutdown.
    Quit,
    /// Announce that execution is suspended.
    Pause,
    /// Announce that execution continues, discarding ticks received meanwhile.
    Resume,
    /// Compute the next generation.
    Advance,
    /// Do nothing.
    Ignore,
}

/// Maps the current state and an observed stimulus to the next state and its action.
#[must_use]
pub const fn transition(state: ControlState, stimulus: Stimulus) -> (ControlState, Action) {
    use ControlState::{Executing, Paused, Quitting};

    match (state, stimulus) {
        (Executing, Stimulus::Tick) => (Executing, Action::ReportAliveCells),
        (Executing, Stimulus::Key(KeyCommand::Save)) => (Executing, Action::Snapshot),
        (Executing, Stimulus::Key(KeyCommand::Quit)) => (Quitting, Action::Quit),
        (Executing, Stimulus::Key(KeyCommand::TogglePause)) => (Paused, Action::Pause),
        (Executing, Stimulus::Idle) => (Executing, Action::Advance),
        (Executing, Stimulus::UnknownKey | Stimulus::KeysClosed) => (Executing, Action::Ignore),
        (Paused, Stimulus::Key(KeyCommand::TogglePause) | Stimulus::KeysClosed) => {
            (Executing, Action::Resume)
        }
        (Paused, _) => (Paused, Action::Ignore),
        (Quitting, _) => (Quitting, Action::Ignore),
    }
}
