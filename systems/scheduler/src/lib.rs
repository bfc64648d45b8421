#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic scheduler that computes one generation across row-band workers.
//!
//! With a single worker the whole board is evaluated synchronously. With `N`
//! workers the board is split into `N` bands, each band is copied out with its
//! halo rows, the bands are evaluated concurrently on a dedicated pool of `N`
//! threads, and the results are stitched back together in worker order. The
//! merged board is identical to the single-worker result for every `N`.

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use thiserror::Error;
use torus_life_core::Event;
use torus_life_system_transition::{BandOutcome, TransitionWorker};
use torus_life_world::{Board, BoardError, HaloBand, RowBand};

/// Splits `height` rows into `workers` contiguous bands.
///
/// Every band except the last holds `height / workers` rows; the last band
/// absorbs the remaining `height % workers` rows as well. Returns no bands when
/// `workers` is zero.
#[must_use]
pub fn partition(height: usize, workers: usize) -> Vec<RowBand> {
    if workers == 0 {
        return Vec::new();
    }

    let base = height / workers;
    (0..workers)
        .map(|worker| {
            let start = base * worker;
            let mut end = base * (worker + 1);
            if worker == workers - 1 {
                end += height % workers;
            }
            RowBand::new(start, end)
        })
        .collect()
}

/// Runs generations with a fixed number of workers.
#[derive(Debug)]
pub struct Scheduler {
    workers: usize,
    pool: Option<ThreadPool>,
}

impl Scheduler {
    /// Creates a scheduler that fans each generation out to `workers` tasks.
    ///
    /// A thread pool with exactly `workers` threads is built up front when more
    /// than one worker is requested, so every band runs truly in parallel.
    pub fn new(workers: usize) -> Result<Self, SchedulerError> {
        if workers == 0 {
            return Err(SchedulerError::NoWorkers);
        }

        let pool = if workers > 1 {
            Some(
                ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|index| format!("torus-life-worker-{index}"))
                    .build()?,
            )
        } else {
            None
        };

        Ok(Self { workers, pool })
    }

    /// Number of workers used per generation.
    #[must_use]
    pub const fn workers(&self) -> usize {
        self.workers
    }

    /// Computes the generation that follows `board`, tagging flips with `turn`.
    ///
    /// Blocks until every worker has delivered its band. Flip events are
    /// returned worker by worker in index order.
    pub fn step(&self, board: &Board, turn: u64) -> Result<Generation, SchedulerError> {
        let Some(pool) = &self.pool else {
            let (board, events) = TransitionWorker::new(RowBand::new(0, board.height()), turn)
                .run(board)?
                .into_parts();
            return Ok(Generation { board, events });
        };

        let halos = partition(board.height(), self.workers)
            .into_iter()
            .map(|band| HaloBand::slice(board, band))
            .collect::<Result<Vec<_>, _>>()?;

        let mut outcomes: Vec<Option<Result<BandOutcome, BoardError>>> =
            halos.iter().map(|_| None).collect();

        tracing::debug!(turn, workers = self.workers, "dispatching row bands");
        pool.scope(|scope| {
            for (halo, slot) in halos.iter().zip(outcomes.iter_mut()) {
                scope.spawn(move |_| {
                    *slot = Some(TransitionWorker::new(halo.band(), turn).run(halo));
                });
            }
        });

        let mut bands = Vec::with_capacity(self.workers);
        let mut events = Vec::new();
        for (worker, outcome) in outcomes.into_iter().enumerate() {
            let (rows, band_events) = outcome
                .ok_or(SchedulerError::WorkerLost { worker })??
                .into_parts();
            bands.push(rows);
            events.extend(band_events);
        }

        let board = Board::from_bands(board.width(), bands)?;
        Ok(Generation { board, events })
    }
}

/// Result of a single generation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generation {
    board: Board,
    events: Vec<Event>,
}

impl Generation {
    /// Consumes the generation, yielding the board and the flip events.
    #[must_use]
    pub fn into_parts(self) -> (Board, Vec<Event>) {
        (self.board, self.events)
    }
}

/// Failures that abort a generation.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// At least one worker is required.
    #[error("scheduler needs at least one worker")]
    NoWorkers,
    /// The worker thread pool could not be started.
    #[error("failed to build worker pool")]
    Pool(#[from] ThreadPoolBuildError),
    /// A worker finished without delivering its band.
    #[error("worker {worker} did not deliver its band")]
    WorkerLost {
        /// Index of the worker whose result is missing.
        worker: usize,
    },
    /// A band could not be sliced or assembled.
    #[error(transparent)]
    Board(#[from] BoardError),
}
