//! Unix-socket [`CommandSource`] implementation.
//!
//! Every connection may carry any number of newline-terminated JSON
//! commands:
//!
//! ```json
//! {"Hotkey":3}
//! "Toggle"
//! {"DragStart":{"row":1,"column":1}}
//! {"DragEnd":"3 4"}
//! "ReloadConfig"
//! ```
//!
//! Connections are served one after another.  A line that fails to parse is
//! logged and skipped; the connection stays open.

use crate::command::Command;
use crate::traits::CommandSource;
use log::{debug, info, warn};
use std::io::{BufRead, BufReader};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Errors produced by the Unix socket listener.
#[derive(Debug, thiserror::Error)]
pub enum UnixSocketError {
    #[error("failed to bind {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub struct UnixSocketListener {
    path: PathBuf,
}

impl UnixSocketListener {
    /// The socket file is created by [`run`](CommandSource::run), replacing
    /// a stale one, and removed again when `run` returns.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forward every command on `stream`.  Returns `false` once the sink is
    /// gone.
    fn serve(&self, stream: UnixStream, sink: &mpsc::Sender<Command>) -> bool {
        for line in BufReader::new(stream).lines() {
            let text = match line {
                Ok(text) => text,
                Err(e) => {
                    warn!("read error on {}: {}", self.path.display(), e);
                    return true;
                }
            };
            if text.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<Command>(&text) {
                Ok(cmd) => {
                    debug!("received {}", cmd);
                    if sink.send(cmd).is_err() {
                        return false;
                    }
                }
                Err(e) => warn!("ignoring bad command {:?}: {}", text, e),
            }
        }
        true
    }
}

impl CommandSource for UnixSocketListener {
    type Error = UnixSocketError;

    /// Blocks until the receiving end of `sink` is dropped.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        let _ = std::fs::remove_file(&self.path);
        let listener = UnixListener::bind(&self.path).map_err(|source| UnixSocketError::Bind {
            path: self.path.clone(),
            source,
        })?;
        info!("listening on {}", self.path.display());

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if !self.serve(stream, &sink) {
                        info!("daemon gone, closing {}", self.path.display());
                        break;
                    }
                }
                Err(e) => warn!("accept error: {}", e),
            }
        }

        let _ = std::fs::remove_file(&self.path);
        Ok(())
    }
}

//  Tests
