//! Key command source backed by standard input.

use std::{
    io::{self, BufRead},
    thread,
};

use anyhow::{Context, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};

/// Starts a detached thread forwarding every non-whitespace character typed on stdin.
pub(crate) fn spawn_stdin_reader() -> Result<Receiver<char>> {
    let (keys, inbox) = unbounded();
    let _reader = thread::Builder::new()
        .name("torus-life-keys".to_owned())
        .spawn(move || forward_keys(io::stdin().lock(), &keys))
        .context("failed to start key reader")?;
    Ok(inbox)
}

/// Forwards key codes from `input` until it ends or nobody listens any more.
fn forward_keys(input: impl BufRead, keys: &Sender<char>) {
    for line in input.lines() {
        let Ok(line) = line else {
            break;
        };
        for code in line.chars().filter(|code| !code.is_whitespace()) {
            if keys.send(code).is_err() {
                return;
            }
        }
    }
}
