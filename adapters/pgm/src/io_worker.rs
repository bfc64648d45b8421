//! Background thread that writes snapshots in request order.

use std::{
    fs,
    path::PathBuf,
    thread::{self, JoinHandle},
};

use crossbeam_channel::{bounded, unbounded, Sender};
use torus_life_system_control::{SnapshotError, SnapshotWriter};
use torus_life_world::Board;

use crate::{encode, image_path, PgmError};

enum IoRequest {
    Output { name: String, image: Vec<u8> },
    CheckIdle { reply: Sender<()> },
}

/// Handle to the snapshot writer thread.
///
/// Requests are processed strictly in submission order, so an idle check
/// completes only after every earlier write has been attempted.
#[derive(Debug)]
pub struct IoHandle {
    requests: Sender<IoRequest>,
    thread: JoinHandle<()>,
}

impl IoHandle {
    /// Starts a writer thread that stores snapshots as `<out_dir>/<name>.pgm`.
    ///
    /// The output directory is created if it does not exist yet.
    pub fn spawn(out_dir: impl Into<PathBuf>) -> Result<Self, PgmError> {
        let out_dir = out_dir.into();
        fs::create_dir_all(&out_dir).map_err(|source| PgmError::Io {
            path: out_dir.clone(),
            source,
        })?;

        let (requests, inbox) = unbounded::<IoRequest>();
        let thread = thread::Builder::new()
            .name("torus-life-io".to_owned())
            .spawn(move || {
                for request in inbox {
                    match request {
                        IoRequest::Output { name, image } => {
                            let path = image_path(&out_dir, &name);
                            match fs::write(&path, image) {
                                Ok(()) => {
                                    tracing::debug!(path = %path.display(), "snapshot written");
                                }
                                Err(error) => tracing::error!(
                                    path = %path.display(),
                                    %error,
                                    "failed to write snapshot"
                                ),
                            }
                        }
                        IoRequest::CheckIdle { reply } => {
                            let _ = reply.send(());
                        }
                    }
                }
            })
            .map_err(|_| PgmError::WorkerFailed)?;

        Ok(Self { requests, thread })
    }

    /// Stops accepting requests and waits for queued writes to finish.
    pub fn shutdown(self) -> Result<(), PgmError> {
        let Self { requests, thread } = self;
        drop(requests);
        thread.join().map_err(|_| PgmError::WorkerFailed)
    }
}

impl SnapshotWriter for IoHandle {
    fn write(&mut self, name: &str, board: &Board) -> Result<(), SnapshotError> {
        self.requests
            .send(IoRequest::Output {
                name: name.to_owned(),
                image: encode(board),
            })
            .map_err(|_| SnapshotError::WriterGone)
    }

    fn wait_idle(&mut self) -> Result<(), SnapshotError> {
        let (reply, idle) = bounded(1);
        self.requests
            .send(IoRequest::CheckIdle { reply })
            .map_err(|_| SnapshotError::WriterGone)?;
        idle.recv().map_err(|_| SnapshotError::WriterGone)
    }
}
