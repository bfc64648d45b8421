//! Row bands and the halo rows a worker needs to evaluate them.

use crate::{wrap, Board, BoardError, ToroidalView};

/// Contiguous range `[start, end)` of board rows assigned to one worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RowBand {
    start: usize,
    end: usize,
}

impl RowBand {
    /// Creates a band covering rows `start..end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// First row of the band.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// One past the last row of the band.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Number of rows in the band.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// Private copy of a band plus one wrapped row above and below it.
///
/// Rows are addressed with absolute board indices through [`ToroidalView`], so
/// a worker reads its neighbours exactly as it would on the full board. Only
/// rows `start - 1..=end` (modulo the board height) are held; reads of any other
/// row do not reflect the board, and [`ToroidalView::covers`] rejects bands
/// that would need them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HaloBand {
    band: RowBand,
    rows: Board,
}

impl HaloBand {
    /// Copies `band` out of `board` together with its two halo rows.
    ///
    /// The row above is `(start - 1) mod H` and the row below is `end mod H`,
    /// so the first band sees the last board row and the last band sees row 0.
    pub fn slice(board: &Board, band: RowBand) -> Result<Self, BoardError> {
        let height = board.height();
        if band.height() == 0 || band.end() > height {
            return Err(BoardError::BandOutOfRange {
                start: band.start(),
                end: band.end(),
                height,
            });
        }

        let above = (band.start() + height - 1) % height;
        let below = band.end() % height;

        let mut cells = Vec::with_capacity((band.height() + 2) * board.width());
        cells.extend_from_slice(board.row(above));
        for y in band.start()..band.end() {
            cells.extend_from_slice(board.row(y));
        }
        cells.extend_from_slice(board.row(below));

        let rows = Board::from_cells(board.width(), band.height() + 2, cells)?;
        Ok(Self { band, rows })
    }

    /// Band whose rows this halo carries.
    #[must_use]
    pub const fn band(&self) -> RowBand {
        self.band
    }

    /// Materialised rows, halo rows included.
    #[must_use]
    pub const fn rows(&self) -> &Board {
        &self.rows
    }
}

impl ToroidalView for HaloBand {
    fn width(&self) -> usize {
        self.rows.width()
    }

    fn get(&self, row: isize, column: isize) -> bool {
        let local = wrap(row - self.band.start() as isize + 1, self.rows.height());
        self.rows.get(local as isize, column)
    }

    fn covers(&self, band: RowBand) -> bool {
        band.height() > 0 && band.start() >= self.band.start() && band.end() <= self.band.end()
    }
}

#[cfg(test)]
mod tests {
    use super::{HaloBand, RowBand};
    use crate::{Board, BoardError, ToroidalView};
    use torus_life_core::Cell;

    fn striped_board() -> Board {
        // Row y has its alive cell in column y.
        Board::with_alive(6, 6, (0..6).map(|y| Cell::new(y, y))).expect("board")
    }

    #[test]
    fn first_band_prepends_last_row() {
        let board = striped_board();
        let halo = HaloBand::slice(&board, RowBand::new(0, 2)).expect("halo");

        assert_eq!(halo.rows().height(), 4);
        assert_eq!(halo.rows().width(), 6);
        assert_eq!(halo.rows().row(0), board.row(5));
        assert_eq!(halo.rows().row(1), board.row(0));
        assert_eq!(halo.rows().row(3), board.row(2));
    }

    #[test]
    fn last_band_appends_first_row() {
        let board = striped_board();
        let halo = HaloBand::slice(&board, RowBand::new(4, 6)).expect("halo");

        assert_eq!(halo.rows().row(0), board.row(3));
        assert_eq!(halo.rows().row(3), board.row(0));
    }

    #[test]
    fn interior_band_uses_adjacent_rows() {
        let board = striped_board();
        let halo = HaloBand::slice(&board, RowBand::new(2, 4)).expect("halo");

        assert_eq!(halo.rows().row(0), board.row(1));
        assert_eq!(halo.rows().row(3), board.row(4));
    }

    #[test]
    fn absolute_addressing_matches_full_board() {
        let board = striped_board();
        for band in [RowBand::new(0, 2), RowBand::new(2, 5), RowBand::new(5, 6)] {
            let halo = HaloBand::slice(&board, band).expect("halo");
            let first = band.start() as isize - 1;
            let last = band.end() as isize;
            for row in first..=last {
                for column in -1..=6 {
                    assert_eq!(
                        halo.get(row, column),
                        board.get(row, column),
                        "row {row}, column {column} of band {band:?}",
                    );
                }
            }
        }
    }

    #[test]
    fn halo_covers_only_bands_inside_its_own() {
        let board = striped_board();
        let halo = HaloBand::slice(&board, RowBand::new(2, 4)).expect("halo");

        assert!(halo.covers(RowBand::new(2, 4)));
        assert!(halo.covers(RowBand::new(3, 4)));
        assert!(!halo.covers(RowBand::new(1, 4)));
        assert!(!halo.covers(RowBand::new(2, 5)));
        assert!(!halo.covers(RowBand::new(0, 6)));
        assert!(!halo.covers(RowBand::new(3, 3)));

        assert!(board.covers(RowBand::new(0, 6)));
        assert!(!board.covers(RowBand::new(4, 7)));
    }

    #[test]
    fn slicing_leaves_source_untouched() {
        let board = striped_board();
        let before = board.clone();
        let _halo = HaloBand::slice(&board, RowBand::new(1, 3)).expect("halo");
        assert_eq!(board, before);
    }

    #[test]
    fn bands_outside_board_are_rejected() {
        let board = striped_board();
        assert_eq!(
            HaloBand::slice(&board, RowBand::new(4, 7)),
            Err(BoardError::BandOutOfRange {
                start: 4,
                end: 7,
                height: 6,
            })
        );
        assert!(HaloBand::slice(&board, RowBand::new(3, 3)).is_err());
    }
}
