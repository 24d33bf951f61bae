//! Commands delivered to the daemon's owner thread.
//!
//! Every input, whether a hotkey firing, a pointer event on the overlay or a
//! control message on the socket, is turned into a [`Command`] and sent
//! through one channel, so the controller only ever runs on one thread.
//!
//! Cells on the wire accept either `{"row":1,"column":2}` or `"1 2"`.

use crate::hotkey::RegistrationId;
use crate::selection::GridCell;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

impl<'de> Deserialize<'de> for GridCell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Visitor;
        struct V;
        impl<'de> Visitor<'de> for V {
            type Value = GridCell;
            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "object {{row, column}} or string \"row column\"")
            }
            fn visit_map<A>(self, mut map: A) -> Result<GridCell, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut row = None;
                let mut column = None;
                while let Some(k) = map.next_key::<String>()? {
                    match k.as_str() {
                        "row" => row = Some(map.next_value()?),
                        "column" | "col" => column = Some(map.next_value()?),
                        _ => {
                            let _: serde::de::IgnoredAny = map.next_value()?;
                        }
                    }
                }
                Ok(GridCell {
                    row: row.ok_or_else(|| DeError::missing_field("row"))?,
                    column: column.ok_or_else(|| DeError::missing_field("column"))?,
                })
            }
            fn visit_str<E>(self, s: &str) -> Result<GridCell, E>
            where
                E: DeError,
            {
                let parts: Vec<&str> = s.split_whitespace().collect();
                if parts.len() != 2 {
                    return Err(DeError::custom(format!(
                        "cell: expected \"row column\", got {:?}",
                        s
                    )));
                }
                let row: usize = parts[0]
                    .parse()
                    .map_err(|_| DeError::custom("cell: row must be a non-negative integer"))?;
                let column: usize = parts[1]
                    .parse()
                    .map_err(|_| DeError::custom("cell: column must be a non-negative integer"))?;
                Ok(GridCell { row, column })
            }
        }
        deserializer.deserialize_any(V)
    }
}

/// Everything the daemon reacts to.
///
/// Produced by [`CommandSource`](crate::traits::CommandSource)
/// implementations and the overlay surface, consumed by
/// [`Daemon::handle`](crate::daemon::Daemon::handle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// The system-wide hotkey registered under this id fired.
    ///
    /// Ignored unless the id is still the live registration.
    Hotkey(RegistrationId),

    /// Same as a live hotkey trigger, without an id check.
    ///
    /// On the wire this is the JSON string `"Toggle"`.
    Toggle,

    /// Pointer pressed on a cell of the overlay.
    DragStart(GridCell),

    /// Pointer moved to a cell while pressed.
    DragUpdate(GridCell),

    /// Pointer released over a cell.
    DragEnd(GridCell),

    /// Escape, a click outside the grid, or an external cancel.
    Cancel,

    /// Re-read the configuration file.
    ReloadConfig,

    /// Unregister the hotkey and stop the daemon.
    Shutdown,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Hotkey(id) => write!(f, "hotkey {}", id),
            Command::Toggle => write!(f, "toggle"),
            Command::DragStart(c) => write!(f, "drag start {}", c),
            Command::DragUpdate(c) => write!(f, "drag update {}", c),
            Command::DragEnd(c) => write!(f, "drag end {}", c),
            Command::Cancel => write!(f, "cancel"),
            Command::ReloadConfig => write!(f, "reload config"),
            Command::Shutdown => write!(f, "shutdown"),
        }
    }
}
