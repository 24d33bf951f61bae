//! Control socket.
//!
//! The daemon listens on a Unix socket for newline-delimited JSON
//! [`Command`](crate::command::Command)s; compositor keybinds, scripts and
//! the overlay-less headless mode all talk to it through [`client`].

pub mod client;
pub mod listener;

use std::path::PathBuf;

/// `$XDG_RUNTIME_DIR/gridsnap.sock`, or `/tmp/gridsnap.sock`.
pub fn default_socket_path() -> PathBuf {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(runtime).join("gridsnap.sock")
}
