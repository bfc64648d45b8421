#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Board model and toroidal addressing for the torus-life engine.
//!
//! A [`Board`] is immutable once a generation starts reading it. Workers never
//! touch it directly; they read through a [`ToroidalView`], backed either by the
//! full board or by a [`HaloBand`] sliced out of it.

mod halo;

pub use halo::{HaloBand, RowBand};

use thiserror::Error;
use torus_life_core::{Cell, ALIVE_BYTE, DEAD_BYTE};

/// Read-only accessor with built-in wraparound on both axes.
pub trait ToroidalView {
    /// Number of columns visible through the view.
    fn width(&self) -> usize;

    /// Reports whether the cell at `row`, `column` is alive.
    ///
    /// Columns wrap modulo the width, so `-1` names the last column. Rows wrap
    /// modulo the board height for the rows the view can answer; a view that
    /// only holds part of the board answers the neighbourhood of the bands it
    /// [`covers`](ToroidalView::covers) and nothing else.
    fn get(&self, row: isize, column: isize) -> bool;

    /// Reports whether every cell of `band` and its eight neighbours can be
    /// read through this view.
    fn covers(&self, band: RowBand) -> bool;
}

/// Rectangular grid of alive and dead cells stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Board {
    /// Creates a board with every cell dead.
    pub fn new(width: usize, height: usize) -> Result<Self, BoardError> {
        let len = area(width, height)?;
        Ok(Self {
            width,
            height,
            cells: vec![false; len],
        })
    }

    /// Wraps row-major cell states.
    pub fn from_cells(width: usize, height: usize, cells: Vec<bool>) -> Result<Self, BoardError> {
        let expected = area(width, height)?;
        if cells.len() != expected {
            return Err(BoardError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }

        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Decodes a row-major byte stream where [`ALIVE_BYTE`] marks alive cells.
    pub fn from_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self, BoardError> {
        let cells = bytes.iter().map(|&byte| byte == ALIVE_BYTE).collect();
        Self::from_cells(width, height, cells)
    }

    /// Creates a board whose alive cells are exactly `alive`.
    pub fn with_alive(
        width: usize,
        height: usize,
        alive: impl IntoIterator<Item = Cell>,
    ) -> Result<Self, BoardError> {
        let mut board = Self::new(width, height)?;
        for cell in alive {
            board.set(cell, true)?;
        }
        Ok(board)
    }

    /// Stacks sub-boards of equal width on top of each other in iteration order.
    pub fn from_bands(
        width: usize,
        bands: impl IntoIterator<Item = Board>,
    ) -> Result<Self, BoardError> {
        let mut cells = Vec::new();
        let mut height = 0;
        for band in bands {
            if band.width != width {
                return Err(BoardError::WidthMismatch {
                    expected: width,
                    actual: band.width,
                });
            }
            height += band.height;
            cells.extend(band.cells);
        }

        Self::from_cells(width, height, cells)
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Reports whether `cell` is alive. Cells outside the board read as dead.
    #[must_use]
    pub fn is_alive(&self, cell: Cell) -> bool {
        self.index(cell).map_or(false, |index| self.cells[index])
    }

    /// Sets the state of a single cell.
    pub fn set(&mut self, cell: Cell, alive: bool) -> Result<(), BoardError> {
        let index = self.index(cell).ok_or(BoardError::OutOfBounds {
            cell,
            width: self.width,
            height: self.height,
        })?;
        self.cells[index] = alive;
        Ok(())
    }

    /// Cell states of row `y`. Rows past the bottom edge yield an empty slice.
    #[must_use]
    pub fn row(&self, y: usize) -> &[bool] {
        if y >= self.height {
            return &[];
        }
        let start = y * self.width;
        &self.cells[start..start + self.width]
    }

    /// Counts the alive cells.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }

    /// Lists the alive cells in row-major order.
    #[must_use]
    pub fn alive_cells(&self) -> Vec<Cell> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &alive)| alive)
            .map(|(index, _)| Cell::new(index % self.width, index / self.width))
            .collect()
    }

    /// Encodes the board as a binarised row-major byte stream.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.cells
            .iter()
            .map(|&alive| if alive { ALIVE_BYTE } else { DEAD_BYTE })
            .collect()
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        (cell.x < self.width && cell.y < self.height).then(|| cell.y * self.width + cell.x)
    }
}

impl ToroidalView for Board {
    fn width(&self) -> usize {
        self.width
    }

    fn get(&self, row: isize, column: isize) -> bool {
        let y = wrap(row, self.height);
        let x = wrap(column, self.width);
        self.cells[y * self.width + x]
    }

    fn covers(&self, band: RowBand) -> bool {
        band.height() > 0 && band.end() <= self.height
    }
}

/// Wraps a signed index into `0..extent`.
pub(crate) fn wrap(index: isize, extent: usize) -> usize {
    index.rem_euclid(extent as isize) as usize
}

fn area(width: usize, height: usize) -> Result<usize, BoardError> {
    if width == 0 || height == 0 {
        return Err(BoardError::ZeroDimension { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(BoardError::ZeroDimension { width, height })
}

/// Reasons a board cannot be constructed or modified.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    /// Boards need at least one row and one column.
    #[error("board dimensions {width}x{height} are not usable")]
    ZeroDimension {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },
    /// The supplied cell stream does not cover the board exactly.
    #[error("expected {expected} cells but received {actual}")]
    CellCountMismatch {
        /// Cells required by the dimensions.
        expected: usize,
        /// Cells supplied.
        actual: usize,
    },
    /// A stacked band had a different width than the board.
    #[error("band width {actual} does not match board width {expected}")]
    WidthMismatch {
        /// Width of the board being assembled.
        expected: usize,
        /// Width of the offending band.
        actual: usize,
    },
    /// A cell lies outside the board.
    #[error("cell {cell} lies outside the {width}x{height} board")]
    OutOfBounds {
        /// Offending cell.
        cell: Cell,
        /// Board width.
        width: usize,
        /// Board height.
        height: usize,
    },
    /// A row band reaches past the bottom of the board or is empty.
    #[error("row band {start}..{end} does not fit a board of {height} rows")]
    BandOutOfRange {
        /// First row of the band.
        start: usize,
        /// One past the last row of the band.
        end: usize,
        /// Board height.
        height: usize,
    },
    /// A view was asked to serve a band it holds no rows for.
    #[error("view cannot serve row band {start}..{end}")]
    BandNotCovered {
        /// First row of the band.
        start: usize,
        /// One past the last row of the band.
        end: usize,
    },
}
