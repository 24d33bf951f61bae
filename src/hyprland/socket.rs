//! Direct requests to Hyprland's command socket.
//!
//! Hyprland ≥ 0.40 listens at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.  Every
//! request is one short-lived connection: write the command, read until the
//! compositor closes.  No child processes are spawned.

use serde::de::DeserializeOwned;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandWmError(pub(crate) String);

/// Handle on the command socket.
///
/// Without an explicit path the socket is resolved from the environment on
/// every request, so a daemon started before the compositor recovers once
/// the variables are valid.
#[derive(Debug, Clone, Default)]
pub struct Hyprctl {
    socket: Option<PathBuf>,
}

impl Hyprctl {
    pub fn new() -> Self {
        Self { socket: None }
    }

    pub fn with_socket(path: impl Into<PathBuf>) -> Self {
        Self {
            socket: Some(path.into()),
        }
    }

    pub fn socket_path(&self) -> Result<PathBuf, HyprlandWmError> {
        if let Some(path) = &self.socket {
            return Ok(path.clone());
        }
        let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
            .map_err(|_| HyprlandWmError("XDG_RUNTIME_DIR not set".into()))?;
        let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
            .map_err(|_| HyprlandWmError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
        Ok(PathBuf::from(format!("{}/hypr/{}/.socket.sock", runtime_dir, his)))
    }

    /// Whether the socket accepts a connection right now.
    pub fn is_reachable(&self) -> bool {
        self.socket_path()
            .map(|path| UnixStream::connect(path).is_ok())
            .unwrap_or(false)
    }

    /// Send a raw command and return the response.
    pub fn request(&self, command: &str) -> Result<String, HyprlandWmError> {
        let path = self.socket_path()?;
        let mut stream = UnixStream::connect(&path)
            .map_err(|e| HyprlandWmError(format!("connect to {}: {}", path.display(), e)))?;

        stream
            .write_all(command.as_bytes())
            .map_err(|e| HyprlandWmError(format!("write: {}", e)))?;

        let mut response = Vec::new();
        stream
            .read_to_end(&mut response)
            .map_err(|e| HyprlandWmError(format!("read: {}", e)))?;

        String::from_utf8(response).map_err(|e| HyprlandWmError(format!("utf-8: {}", e)))
    }

    /// Send a JSON data query (`j/<query>`) and parse the answer.
    pub fn json<T: DeserializeOwned>(&self, query: &str) -> Result<T, HyprlandWmError> {
        let raw = self.request(&format!("j/{}", query))?;
        serde_json::from_str(&raw).map_err(|e| HyprlandWmError(format!("parse {}: {}", query, e)))
    }

    /// `/dispatch <args>`, expecting `ok`.
    pub fn dispatch(&self, args: &str) -> Result<(), HyprlandWmError> {
        expect_ok(&self.request(&format!("/dispatch {}", args))?, "dispatch")
    }

    /// `/keyword <args>`, expecting `ok`.
    pub fn keyword(&self, args: &str) -> Result<(), HyprlandWmError> {
        expect_ok(&self.request(&format!("/keyword {}", args))?, "keyword")
    }
}

fn expect_ok(response: &str, what: &str) -> Result<(), HyprlandWmError> {
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandWmError(format!("{} error: {}", what, response.trim())))
    }
}

/// A canned Hyprland for tests: answers each request from a fixed table and
/// records what it received.
#[cfg(test)]
pub(crate) mod fake {
    use super::Hyprctl;
    use std::io::{Read, Write};
    use std::os::unix::net::UnixListener;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    pub struct FakeHyprland {
        pub ctl: Hyprctl,
        pub received: Arc<Mutex<Vec<String>>>,
        path: std::path::PathBuf,
    }

    impl Drop for FakeHyprland {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    /// `answer` maps a request to its response; unmatched requests get
    /// `unknown request`.
    pub fn spawn(answer: fn(&str) -> Option<String>) -> FakeHyprland {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir().join(format!(
            "gridsnap-fake-hypr-{}-{}.sock",
            std::process::id(),
            id
        ));
        let _ = std::fs::remove_file(&path);
        let listener = UnixListener::bind(&path).unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));

        let log = received.clone();
        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut buf = [0u8; 4096];
                let n = stream.read(&mut buf).unwrap_or(0);
                if n == 0 {
                    continue;
                }
                let request = String::from_utf8_lossy(&buf[..n]).to_string();
                let response = answer(&request).unwrap_or_else(|| "unknown request".into());
                log.lock().unwrap().push(request);
                let _ = stream.write_all(response.as_bytes());
            }
        });

        FakeHyprland {
            ctl: Hyprctl::with_socket(&path),
            received,
            path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_socket_is_unreachable() {
        let ctl = Hyprctl::with_socket("/nonexistent/hypr/.socket.sock");
        assert!(!ctl.is_reachable());
        let err = ctl.request("j/monitors").unwrap_err();
        assert!(err.to_string().contains("connect to"));
    }

    #[test]
    fn dispatch_checks_ok() {
        let hypr = fake::spawn(|req| match req {
            "/dispatch focuswindow address:0x1" => Some("ok".into()),
            _ => Some("Invalid dispatcher".into()),
        });
        assert!(hypr.ctl.is_reachable());
        hypr.ctl.dispatch("focuswindow address:0x1").unwrap();
        let err = hypr.ctl.dispatch("nonsense").unwrap_err();
        assert!(err.to_string().contains("Invalid dispatcher"));
    }

    #[test]
    fn json_query_is_prefixed() {
        let hypr = fake::spawn(|req| (req == "j/version").then(|| r#"{"tag":"v0.41"}"#.into()));
        let v: serde_json::Value = hypr.ctl.json("version").unwrap();
        assert_eq!(v["tag"], "v0.41");
    }
}
