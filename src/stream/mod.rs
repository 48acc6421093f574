//! Detection intake transport (§6, §10.1): a named pipe fed by the
//! detection producer, one JSON record per line.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use tokio::sync::mpsc::Sender;

use crate::lib::detection::{parse_line, DetectionRecord};

/// Creates the FIFO at `path` if it does not already exist. Idempotent
/// across restarts, mirroring the producer's own `os.mkfifo` guard.
pub fn ensure_fifo(path: &str) -> std::io::Result<()> {
    if Path::new(path).exists() {
        return Ok(());
    }
    mkfifo(path, Mode::S_IRUSR | Mode::S_IWUSR | Mode::S_IRGRP | Mode::S_IWGRP)
        .map_err(|errno| std::io::Error::from_raw_os_error(errno as i32))
}

/// Reads newline-delimited detection records from the FIFO at `path` and
/// forwards parsed ones to `tx`, forever. A missing pipe, a read error, or
/// the writer closing its end are all treated as transient: the loop waits
/// `backoff` and reopens rather than giving up (§10.1).
pub async fn run(path: String, backoff: Duration, tx: Sender<DetectionRecord>) {
    loop {
        match tokio::task::spawn_blocking({
            let path = path.clone();
            let tx = tx.clone();
            move || read_until_closed(&path, &tx)
        })
        .await
        {
            Ok(Ok(())) => log::info!("detection pipe {} closed by writer, reopening", path),
            Ok(Err(err)) => log::warn!("detection pipe {} read error: {}", path, err),
            Err(join_err) => log::error!("detection pipe reader task panicked: {}", join_err),
        }
        tokio::time::sleep(backoff).await;
    }
}

fn read_until_closed(path: &str, tx: &Sender<DetectionRecord>) -> std::io::Result<()> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    for line in reader.lines() {
        let line = line?;
        match parse_line(&line) {
            Ok(Some(record)) => {
                if tx.blocking_send(record).is_err() {
                    return Ok(());
                }
            }
            Ok(None) => {}
            Err(err) => log::warn!("dropping malformed detection record: {}", err),
        }
    }
    Ok(())
}
