#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Binary PGM (P5) adapter that loads initial boards and writes snapshots.
//!
//! Boards are stored as 8-bit greyscale images where 255 marks an alive cell.
//! Snapshot writes are handed to a background [`IoHandle`] thread so the turn
//! engine never blocks on storage until it explicitly waits for idle.

mod io_worker;

pub use io_worker::IoHandle;

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use torus_life_core::ALIVE_BYTE;
use torus_life_world::{Board, BoardError};

const MAGIC: &[u8] = b"P5";
const FILE_EXTENSION: &str = "pgm";

/// Path of the image stored under `name` inside `dir`.
#[must_use]
pub fn image_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{FILE_EXTENSION}"))
}

/// Loads the `<W>x<H>.pgm` board from `dir`.
///
/// The image must have exactly the requested dimensions.
pub fn read_board(dir: &Path, width: usize, height: usize) -> Result<Board, PgmError> {
    let path = image_path(dir, &format!("{width}x{height}"));
    let bytes = fs::read(&path).map_err(|source| PgmError::Io {
        path: path.clone(),
        source,
    })?;
    let board = decode(&bytes)?;
    if board.width() != width || board.height() != height {
        return Err(PgmError::DimensionMismatch {
            path,
            expected_width: width,
            expected_height: height,
            width: board.width(),
            height: board.height(),
        });
    }
    Ok(board)
}

/// Encodes a board as a binary PGM image.
#[must_use]
pub fn encode(board: &Board) -> Vec<u8> {
    let header = format!("P5\n{} {}\n{}\n", board.width(), board.height(), ALIVE_BYTE);
    let mut image = Vec::with_capacity(header.len() + board.width() * board.height());
    image.extend_from_slice(header.as_bytes());
    image.extend(board.to_bytes());
    image
}

/// Decodes a binary PGM image into a board.
pub fn decode(bytes: &[u8]) -> Result<Board, PgmError> {
    let mut header = HeaderReader::new(bytes);

    if header.token()? != MAGIC {
        return Err(PgmError::BadMagic);
    }
    let width = header.number()?;
    let height = header.number()?;
    let maxval = header.number()?;
    if maxval != usize::from(ALIVE_BYTE) {
        return Err(PgmError::UnsupportedMaxval(maxval));
    }

    let raster = header.raster()?;
    let expected = width.saturating_mul(height);
    if raster.len() < expected {
        return Err(PgmError::Truncated {
            expected,
            actual: raster.len(),
        });
    }

    Ok(Board::from_bytes(width, height, &raster[..expected])?)
}

/// Walks the whitespace-separated header fields, skipping `#` comments.
struct HeaderReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> HeaderReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn token(&mut self) -> Result<&'a [u8], PgmError> {
        self.skip_separators();
        let start = self.position;
        while self
            .bytes
            .get(self.position)
            .is_some_and(|byte| !byte.is_ascii_whitespace() && *byte != b'#')
        {
            self.position += 1;
        }
        if start == self.position {
            return Err(PgmError::BadHeader("unexpected end of header".to_owned()));
        }
        Ok(&self.bytes[start..self.position])
    }

    fn number(&mut self) -> Result<usize, PgmError> {
        let token = self.token()?;
        std::str::from_utf8(token)
            .ok()
            .and_then(|text| text.parse().ok())
            .ok_or_else(|| {
                PgmError::BadHeader(format!(
                    "expected a number, found `{}`",
                    String::from_utf8_lossy(token)
                ))
            })
    }

    /// Raster data starts after the single whitespace byte ending the header.
    fn raster(self) -> Result<&'a [u8], PgmError> {
        match self.bytes.get(self.position) {
            Some(byte) if byte.is_ascii_whitespace() => Ok(&self.bytes[self.position + 1..]),
            _ => Err(PgmError::BadHeader(
                "header must end with a whitespace byte".to_owned(),
            )),
        }
    }

    fn skip_separators(&mut self) {
        while let Some(&byte) = self.bytes.get(self.position) {
            if byte == b'#' {
                while self
                    .bytes
                    .get(self.position)
                    .is_some_and(|&byte| byte != b'\n')
                {
                    self.position += 1;
                }
            } else if byte.is_ascii_whitespace() {
                self.position += 1;
            } else {
                break;
            }
        }
    }
}

/// Failures while loading or storing PGM images.
#[derive(Debug, Error)]
pub enum PgmError {
    /// The image file could not be read or written.
    #[error("i/o failure on {}", .path.display())]
    Io {
        /// File being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The file does not start with the binary greyscale magic number.
    #[error("not a binary PGM image")]
    BadMagic,
    /// A header field is missing or malformed.
    #[error("malformed PGM header: {0}")]
    BadHeader(String),
    /// Only 8-bit images with a maximum value of 255 are supported.
    #[error("unsupported PGM maximum value {0}")]
    UnsupportedMaxval(usize),
    /// The raster holds fewer bytes than the header announces.
    #[error("PGM raster holds {actual} bytes but {expected} are required")]
    Truncated {
        /// Bytes announced by the header.
        expected: usize,
        /// Bytes present.
        actual: usize,
    },
    /// The image dimensions differ from the requested ones.
    #[error(
        "{} is {width}x{height} but {expected_width}x{expected_height} was requested",
        .path.display()
    )]
    DimensionMismatch {
        /// Image that was read.
        path: PathBuf,
        /// Requested width.
        expected_width: usize,
        /// Requested height.
        expected_height: usize,
        /// Width found in the header.
        width: usize,
        /// Height found in the header.
        height: usize,
    },
    /// The decoded raster does not form a valid board.
    #[error(transparent)]
    Board(#[from] BoardError),
    /// The background writer thread could not be started or panicked.
    #[error("snapshot writer thread failed")]
    WorkerFailed,
}
