//! Hyprland-specific implementations.
//!
//! This module provides concrete backends for the
//! [`WindowManager`](crate::traits::WindowManager),
//! [`PermissionGate`](crate::traits::PermissionGate) and
//! [`HotkeyBackend`](crate::traits::HotkeyBackend) traits, powered by
//! Hyprland's IPC socket.
//!
//! Nothing outside this module should reference Hyprland directly.

pub mod keys;
pub mod socket;
pub mod wm;

pub use keys::HyprlandKeys;
pub use socket::{Hyprctl, HyprlandWmError};
pub use wm::{HyprlandAccess, HyprlandWm};
