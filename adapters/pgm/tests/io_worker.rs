use std::{fs, path::PathBuf};

use torus_life_core::Cell;
use torus_life_pgm::{decode, encode, image_path, read_board, IoHandle, PgmError};
use torus_life_system_control::SnapshotWriter;
use torus_life_world::Board;

fn scratch_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("torus-life-pgm-{}-{test}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn snapshots_are_on_disk_once_idle() {
    let dir = scratch_dir("idle");
    let mut writer = IoHandle::spawn(&dir).expect("writer");

    let first = Board::with_alive(5, 4, [Cell::new(1, 1)]).expect("board");
    let second = Board::with_alive(5, 4, [Cell::new(4, 3), Cell::new(0, 0)]).expect("board");
    writer.write("5x4x0", &first).expect("queue first");
    writer.write("5x4x7", &second).expect("queue second");
    writer.wait_idle().expect("idle");

    let stored = fs::read(image_path(&dir, "5x4x7")).expect("second snapshot");
    assert_eq!(stored, encode(&second));
    assert_eq!(
        decode(&fs::read(image_path(&dir, "5x4x0")).expect("first snapshot")).expect("decode"),
        first
    );

    writer.shutdown().expect("shutdown");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn shutdown_flushes_queued_snapshots_without_an_idle_wait() {
    let dir = scratch_dir("shutdown");
    let mut writer = IoHandle::spawn(&dir).expect("writer");
    let boards: Vec<Board> = (0..8)
        .map(|turn| Board::with_alive(8, 8, [Cell::new(turn, turn)]).expect("board"))
        .collect();

    for (turn, board) in boards.iter().enumerate() {
        writer.write(&format!("8x8x{turn}"), board).expect("queue");
    }
    writer.shutdown().expect("shutdown");

    for (turn, board) in boards.iter().enumerate() {
        let stored = fs::read(image_path(&dir, &format!("8x8x{turn}"))).expect("snapshot");
        assert_eq!(&decode(&stored).expect("decode"), board);
    }
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn snapshot_written_as_input_loads_back() {
    let dir = scratch_dir("reload");
    let mut writer = IoHandle::spawn(&dir).expect("writer");
    let board = Board::with_alive(6, 3, [Cell::new(5, 0), Cell::new(2, 2)]).expect("board");

    writer.write("6x3", &board).expect("queue");
    writer.wait_idle().expect("idle");
    writer.shutdown().expect("shutdown");

    assert_eq!(read_board(&dir, 6, 3).expect("load"), board);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_input_reports_the_path() {
    let dir = scratch_dir("missing");
    match read_board(&dir, 16, 16) {
        Err(PgmError::Io { path, .. }) => assert_eq!(path, image_path(&dir, "16x16")),
        other => panic!("expected an i/o error, got {other:?}"),
    }
}

#[test]
fn input_with_wrong_dimensions_is_rejected() {
    let dir = scratch_dir("dimensions");
    fs::create_dir_all(&dir).expect("scratch dir");
    let board = Board::new(4, 4).expect("board");
    fs::write(image_path(&dir, "4x5"), encode(&board)).expect("seed image");

    assert!(matches!(
        read_board(&dir, 4, 5),
        Err(PgmError::DimensionMismatch {
            width: 4,
            height: 4,
            ..
        })
    ));
    let _ = fs::remove_dir_all(&dir);
}
