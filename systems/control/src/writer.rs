//! Contract with the external snapshot writer.

use thiserror::Error;
use torus_life_world::Board;

/// Destination for board snapshots requested by the control loop.
pub trait SnapshotWriter {
    /// Queues `board` to be written under `name`.
    ///
    /// Returning does not imply the snapshot reached storage; use
    /// [`SnapshotWriter::wait_idle`] for that.
    fn write(&mut self, name: &str, board: &Board) -> Result<(), SnapshotError>;

    /// Blocks until every previously queued snapshot has been processed.
    fn wait_idle(&mut self) -> Result<(), SnapshotError>;
}

impl<W> SnapshotWriter for &mut W
where
    W: SnapshotWriter + ?Sized,
{
    fn write(&mut self, name: &str, board: &Board) -> Result<(), SnapshotError> {
        (**self).write(name, board)
    }

    fn wait_idle(&mut self) -> Result<(), SnapshotError> {
        (**self).wait_idle()
    }
}

/// Failures reported by a snapshot writer.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The writer stopped accepting requests.
    #[error("snapshot writer is no longer running")]
    WriterGone,
}
