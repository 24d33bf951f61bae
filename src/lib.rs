//! **gridsnap**: press a hotkey, drag across a grid, and the focused window
//! snaps to the selected cells.
//!
//! # Architecture
//!
//! The core is platform-independent:
//!
//! * [`selection`] turns pointer positions into cells and drags into
//!   [`GridRect`](selection::GridRect)s.
//! * [`transform`] maps a rectangle onto a display's visible area.
//! * [`mutator`] applies the resulting frame to a window.
//! * [`controller`] is the `Idle → SelectionActive → Resolving` state
//!   machine tying them together.
//!
//! Everything it needs from the outside world goes through the traits in
//! [`traits`].  [`daemon`] owns the controller and the [`hotkey`] table on a
//! single thread and consumes [`command::Command`]s from a channel.
//!
//! Concrete backends live in [`hyprland`] (Hyprland IPC), [`ipc`]
//! (Unix-socket control) and [`surface`] (headless or GTK4 overlay).

pub mod command;
pub mod config;
pub mod controller;
pub mod daemon;
pub mod error;
pub mod geometry;
pub mod hotkey;
pub mod hyprland;
pub mod ipc;
pub mod mutator;
pub mod selection;
pub mod surface;
pub mod traits;
pub mod transform;
