//! One-shot client for the daemon socket.
//!
//! Used by `gridsnap hotkey <id>` (the program the compositor runs when the
//! key combination fires) and the other control subcommands.

use crate::command::Command;
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("daemon not reachable at {path}: {source}")]
    Connect {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to send command: {0}")]
    Send(#[from] std::io::Error),
    #[error("failed to encode command: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Write `cmd` as one JSON line to the daemon listening at `path`.
pub fn send(path: &Path, cmd: &Command) -> Result<(), ClientError> {
    let mut stream = UnixStream::connect(path).map_err(|source| ClientError::Connect {
        path: path.display().to_string(),
        source,
    })?;
    let mut line = serde_json::to_string(cmd)?;
    line.push('\n');
    stream.write_all(line.as_bytes())?;
    stream.flush()?;
    Ok(())
}
