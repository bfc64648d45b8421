#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure transition system that computes the next state of one row band.

use torus_life_core::{Cell, Event};
use torus_life_world::{Board, BoardError, RowBand, ToroidalView};

/// Relative positions of the eight cells surrounding a cell.
const NEIGHBOUR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies the survival/birth rule to a single cell.
///
/// An alive cell survives with two or three alive neighbours; a dead cell is
/// born with exactly three. Everything else ends up dead.
#[must_use]
pub const fn next_state(alive: bool, neighbours: u8) -> bool {
    matches!((alive, neighbours), (true, 2) | (true, 3) | (false, 3))
}

/// Counts alive cells among the eight toroidal neighbours of `row`, `column`.
#[must_use]
pub fn live_neighbours<V>(view: &V, row: usize, column: usize) -> u8
where
    V: ToroidalView + ?Sized,
{
    let row = row as isize;
    let column = column as isize;
    NEIGHBOUR_OFFSETS
        .iter()
        .filter(|(dy, dx)| view.get(row + dy, column + dx))
        .count() as u8
}

/// Computes the next generation for the rows of a single band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransitionWorker {
    band: RowBand,
    turn: u64,
}

impl TransitionWorker {
    /// Creates a worker for `band` while the engine computes `turn`.
    #[must_use]
    pub const fn new(band: RowBand, turn: u64) -> Self {
        Self { band, turn }
    }

    /// Evaluates every cell of the band through `view`.
    ///
    /// The view is addressed with absolute board rows, so the same worker runs
    /// against the full board or against a halo band. Flip events carry
    /// absolute coordinates and are recorded in row-major order. Fails when the
    /// view does not cover the worker's band.
    pub fn run<V>(&self, view: &V) -> Result<BandOutcome, BoardError>
    where
        V: ToroidalView + ?Sized,
    {
        if !view.covers(self.band) {
            return Err(BoardError::BandNotCovered {
                start: self.band.start(),
                end: self.band.end(),
            });
        }

        let width = view.width();
        let mut cells = Vec::with_capacity(self.band.height() * width);
        let mut events = Vec::new();

        for y in self.band.start()..self.band.end() {
            for x in 0..width {
                let alive = view.get(y as isize, x as isize);
                let next = next_state(alive, live_neighbours(view, y, x));
                if next != alive {
                    events.push(Event::CellFlipped {
                        turn: self.turn,
                        cell: Cell::new(x, y),
                    });
                }
                cells.push(next);
            }
        }

        let rows = Board::from_cells(width, self.band.height(), cells)?;
        Ok(BandOutcome { rows, events })
    }
}

/// Freshly computed rows of a band and the flips observed while computing them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BandOutcome {
    rows: Board,
    events: Vec<Event>,
}

impl BandOutcome {
    /// Next-generation rows of the band.
    #[must_use]
    pub const fn rows(&self) -> &Board {
        &self.rows
    }

    /// Flip events in the order the worker produced them.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Consumes the outcome, yielding the rows and the events.
    #[must_use]
    pub fn into_parts(self) -> (Board, Vec<Event>) {
        (self.rows, self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::{live_neighbours, next_state};
    use torus_life_core::Cell;
    use torus_life_world::Board;

    #[test]
    fn rule_table_matches_b3_s23() {
        for neighbours in 0..=8u8 {
            assert_eq!(
                next_state(true, neighbours),
                neighbours == 2 || neighbours == 3,
                "alive cell with {neighbours} neighbours",
            );
            assert_eq!(
                next_state(false, neighbours),
                neighbours == 3,
                "dead cell with {neighbours} neighbours",
            );
        }
    }

    #[test]
    fn centre_cell_is_not_its_own_neighbour() {
        let board = Board::with_alive(3, 3, [Cell::new(1, 1)]).expect("board");
        assert_eq!(live_neighbours(&board, 1, 1), 0);
        assert_eq!(live_neighbours(&board, 0, 0), 1);
    }

    #[test]
    fn opposite_corners_are_adjacent() {
        let board = Board::with_alive(5, 4, [Cell::new(0, 0), Cell::new(4, 3)]).expect("board");
        assert_eq!(live_neighbours(&board, 0, 0), 1);
        assert_eq!(live_neighbours(&board, 3, 4), 1);
    }

    #[test]
    fn tiny_boards_count_wrapped_duplicates() {
        // On a 1x1 torus every offset lands on the single cell.
        let board = Board::with_alive(1, 1, [Cell::new(0, 0)]).expect("board");
        assert_eq!(live_neighbours(&board, 0, 0), 8);
    }
}
