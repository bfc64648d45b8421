//! Logging presenter that consumes the event stream until it closes.

use crossbeam_channel::Receiver;
use torus_life_core::Event;

/// Totals gathered while presenting a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Presented {
    pub(crate) events: usize,
    pub(crate) flips: usize,
    pub(crate) snapshots: usize,
}

/// Logs every event and returns once the control loop closed the sink.
pub(crate) fn present(events: Receiver<Event>) -> Presented {
    let mut presented = Presented::default();
    for event in events {
        presented.events += 1;
        match &event {
            Event::CellFlipped { .. } => {
                presented.flips += 1;
                tracing::trace!("{event}");
            }
            Event::TurnComplete { .. } => tracing::trace!("{event}"),
            Event::AliveCellsCount { turn, count } => {
                tracing::info!(turn, count, "alive cells");
            }
            Event::StateChange { turn, new_state } => {
                tracing::info!(turn, state = %new_state, "state changed");
            }
            Event::ImageOutputComplete { turn, filename } => {
                presented.snapshots += 1;
                tracing::info!(turn, %filename, "snapshot written");
            }
            Event::FinalTurnComplete { turn, alive } => {
                tracing::info!(turn, alive = alive.len(), "final turn complete");
            }
        }
    }
    presented
}

#[cfg(test)]
mod tests {
    use super::{present, Presented};
    use crossbeam_channel::unbounded;
    use torus_life_core::{Cell, ControlState, Event};

    #[test]
    fn totals_cover_the_whole_stream() {
        let (sink, events) = unbounded();
        let stream = [
            Event::CellFlipped {
                turn: 0,
                cell: Cell::new(1, 1),
            },
            Event::TurnComplete { turn: 1 },
            Event::ImageOutputComplete {
                turn: 1,
                filename: "4x4x1".to_owned(),
            },
            Event::StateChange {
                turn: 1,
                new_state: ControlState::Quitting,
            },
        ];
        for event in stream {
            sink.send(event).expect("send");
        }
        drop(sink);

        assert_eq!(
            present(events),
            Presented {
                events: 4,
                flips: 1,
                snapshots: 1,
            }
        );
    }
}
